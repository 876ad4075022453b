/*!
disasm - the two instruction disassemblers named in spec §1: 6502 (with
symbol-table annotation) and Z80 (plain mnemonic text).
*/

pub mod mos6502;
pub mod z80;

pub use mos6502::{disassemble as disassemble_6502, SymbolTable};
pub use z80::disassemble as disassemble_z80;
