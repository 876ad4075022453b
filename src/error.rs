/*!
error.rs - Crate-wide error taxonomy.

Mirrors the three user-facing error classes from the specification that are
allowed to propagate out of a constructor or `step` call:

1. Configuration errors (bad bank layout, bad symbol-table text, bad
   co-processor bank index) — fatal at the call site, never absorbed.
2. CPU-illegal opcode (NS8060 only; the 8008 has no illegal opcodes) — fatal
   with PC and opcode recorded.
3. Injection overflow (more than 3 bytes jammed into the 8008 inject
   buffer).

Runtime bus anomalies (write to ROM, read from unmapped space, unknown
port) are *not* represented here: per spec they are non-fatal and are
reported through the `log` facade instead of `Result`.
*/

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("bad bank configuration: {0}")]
    BankConfig(String),

    #[error("symbol table parse error at line {line}: {message}")]
    SymbolTable { line: usize, message: String },

    #[error("co-processor bank index out of range: {0}")]
    CoproBankRange(u8),

    #[error("illegal NS8060 opcode {opcode:#04x} at pc {pc:#06x}")]
    IllegalOpcode { pc: u16, opcode: u8 },

    #[error("instruction injection overflow: attempted {attempted} bytes, max 3")]
    InjectionOverflow { attempted: usize },
}
