/*!
mos6502.rs - 6502 disassembler and cycle-count table (spec §6, §8
scenario 6).

The opcode table below is transcribed from `dcc6502`'s `opcodes[]` array
(`examples/original_source/6502dis.c`), 151 entries, one row per legal
opcode. Two details are carried forward verbatim because spec §9 flags
them as open questions rather than bugs to silently fix:

- `EOR ($nn,X)` (0x41) has a `cycle_exceptions` of the literal `1`
  (`CYCLE_CROSS_PAGE` bit) where every other `IndexedIndirectX` entry
  uses `0`; this looks like a transcription bug in the source but is
  preserved and exercised by a dedicated test rather than normalised.
- Symbol annotation attaches `+1` when the operand address itself isn't
  found but `addr - 1` is, to label the high byte of a split 16-bit
  operand (`append_rcbus` in the source).

The symbol table format (`name addr-hex type`, whitespace separated) and
its *parsing from a file* are out of scope per spec §1 ("the
symbol-table loader ... is not reimplemented"); [`SymbolTable`] is the
owned, explicit-parameter in-memory structure spec §9 asks for, built by
the caller from whatever the caller likes rather than from a file this
crate reads itself.
*/

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Immediate,
    Absolute,
    ZeroPage,
    Implied,
    IndirectAbsolute,
    AbsoluteX,
    AbsoluteY,
    ZeroPageX,
    ZeroPageY,
    IndexedIndirectX,
    IndirectIndexedY,
    Relative,
    Accumulator,
}

use AddressingMode::*;

/// Cycle-exceptions bitmask, named after the source's `CYCLES_*` macros.
pub const CYCLES_CROSS_PAGE_ADDS_ONE: u8 = 1 << 0;
pub const CYCLES_BRANCH_TAKEN_ADDS_ONE: u8 = 1 << 1;

#[derive(Debug, Clone, Copy)]
pub struct OpcodeEntry {
    pub opcode: u8,
    pub mnemonic: &'static str,
    pub mode: AddressingMode,
    pub cycles: u8,
    pub cycle_exceptions: u8,
}

const fn e(opcode: u8, mnemonic: &'static str, mode: AddressingMode, cycles: u8, exc: u8) -> OpcodeEntry {
    OpcodeEntry { opcode, mnemonic, mode, cycles, cycle_exceptions: exc }
}

const XP: u8 = CYCLES_CROSS_PAGE_ADDS_ONE;
const BR: u8 = CYCLES_CROSS_PAGE_ADDS_ONE | CYCLES_BRANCH_TAKEN_ADDS_ONE;

pub static OPCODES: &[OpcodeEntry] = &[
    e(0x69, "ADC", Immediate, 2, 0),
    e(0x65, "ADC", ZeroPage, 3, 0),
    e(0x75, "ADC", ZeroPageX, 4, 0),
    e(0x6D, "ADC", Absolute, 4, 0),
    e(0x7D, "ADC", AbsoluteX, 4, XP),
    e(0x79, "ADC", AbsoluteY, 4, XP),
    e(0x61, "ADC", IndexedIndirectX, 6, 0),
    e(0x71, "ADC", IndirectIndexedY, 5, XP),
    e(0x29, "AND", Immediate, 2, 0),
    e(0x25, "AND", ZeroPage, 3, 0),
    e(0x35, "AND", ZeroPageX, 4, 0),
    e(0x2D, "AND", Absolute, 4, 0),
    e(0x3D, "AND", AbsoluteX, 4, XP),
    e(0x39, "AND", AbsoluteY, 4, XP),
    e(0x21, "AND", IndexedIndirectX, 6, 0),
    e(0x31, "AND", IndirectIndexedY, 5, XP),
    e(0x0A, "ASL", Accumulator, 2, 0),
    e(0x06, "ASL", ZeroPage, 5, 0),
    e(0x16, "ASL", ZeroPageX, 6, 0),
    e(0x0E, "ASL", Absolute, 6, 0),
    e(0x1E, "ASL", AbsoluteX, 7, 0),
    e(0x90, "BCC", Relative, 2, BR),
    e(0xB0, "BCS", Relative, 2, BR),
    e(0xF0, "BEQ", Relative, 2, BR),
    e(0x24, "BIT", ZeroPage, 3, 0),
    e(0x2C, "BIT", Absolute, 4, 0),
    e(0x30, "BMI", Relative, 2, BR),
    e(0xD0, "BNE", Relative, 2, BR),
    e(0x10, "BPL", Relative, 2, BR),
    e(0x00, "BRK", Implied, 7, 0),
    e(0x50, "BVC", Relative, 2, BR),
    e(0x70, "BVS", Relative, 2, BR),
    e(0x18, "CLC", Implied, 2, 0),
    e(0xD8, "CLD", Implied, 2, 0),
    e(0x58, "CLI", Implied, 2, 0),
    e(0xB8, "CLV", Implied, 2, 0),
    e(0xC9, "CMP", Immediate, 2, 0),
    e(0xC5, "CMP", ZeroPage, 3, 0),
    e(0xD5, "CMP", ZeroPageX, 4, 0),
    e(0xCD, "CMP", Absolute, 4, 0),
    e(0xDD, "CMP", AbsoluteX, 4, XP),
    e(0xD9, "CMP", AbsoluteY, 4, XP),
    e(0xC1, "CMP", IndexedIndirectX, 6, 0),
    e(0xD1, "CMP", IndirectIndexedY, 5, XP),
    e(0xE0, "CPX", Immediate, 2, 0),
    e(0xE4, "CPX", ZeroPage, 3, 0),
    e(0xEC, "CPX", Absolute, 4, 0),
    e(0xC0, "CPY", Immediate, 2, 0),
    e(0xC4, "CPY", ZeroPage, 3, 0),
    e(0xCC, "CPY", Absolute, 4, 0),
    e(0xC6, "DEC", ZeroPage, 5, 0),
    e(0xD6, "DEC", ZeroPageX, 6, 0),
    e(0xCE, "DEC", Absolute, 6, 0),
    e(0xDE, "DEC", AbsoluteX, 7, 0),
    e(0xCA, "DEX", Implied, 2, 0),
    e(0x88, "DEY", Implied, 2, 0),
    e(0x49, "EOR", Immediate, 2, 0),
    e(0x45, "EOR", ZeroPage, 3, 0),
    e(0x55, "EOR", ZeroPageX, 4, 0),
    e(0x4D, "EOR", Absolute, 4, 0),
    e(0x5D, "EOR", AbsoluteX, 4, XP),
    e(0x59, "EOR", AbsoluteY, 4, XP),
    // Open question (spec §9): source has literal `1` here, not the
    // `CYCLES_CROSS_PAGE_ADDS_ONE` mask every sibling entry uses. `1`
    // happens to equal that mask's value, but unlike every other
    // IndexedIndirectX entry (which use 0, since that mode never
    // crosses a page) this one sets the bit. Kept verbatim.
    e(0x41, "EOR", IndexedIndirectX, 6, 1),
    e(0x51, "EOR", IndirectIndexedY, 5, XP),
    e(0xE6, "INC", ZeroPage, 5, 0),
    e(0xF6, "INC", ZeroPageX, 6, 0),
    e(0xEE, "INC", Absolute, 6, 0),
    e(0xFE, "INC", AbsoluteX, 7, 0),
    e(0xE8, "INX", Implied, 2, 0),
    e(0xC8, "INY", Implied, 2, 0),
    e(0x4C, "JMP", Absolute, 3, 0),
    e(0x6C, "JMP", IndirectAbsolute, 5, 0),
    e(0x20, "JSR", Absolute, 6, 0),
    e(0xA9, "LDA", Immediate, 2, 0),
    e(0xA5, "LDA", ZeroPage, 3, 0),
    e(0xB5, "LDA", ZeroPageX, 4, 0),
    e(0xAD, "LDA", Absolute, 4, 0),
    e(0xBD, "LDA", AbsoluteX, 4, XP),
    e(0xB9, "LDA", AbsoluteY, 4, XP),
    e(0xA1, "LDA", IndexedIndirectX, 6, 0),
    e(0xB1, "LDA", IndirectIndexedY, 5, XP),
    e(0xA2, "LDX", Immediate, 2, 0),
    e(0xA6, "LDX", ZeroPage, 3, 0),
    e(0xB6, "LDX", ZeroPageY, 4, 0),
    e(0xAE, "LDX", Absolute, 4, 0),
    e(0xBE, "LDX", AbsoluteY, 4, XP),
    e(0xA0, "LDY", Immediate, 2, 0),
    e(0xA4, "LDY", ZeroPage, 3, 0),
    e(0xB4, "LDY", ZeroPageX, 4, 0),
    e(0xAC, "LDY", Absolute, 4, 0),
    e(0xBC, "LDY", AbsoluteX, 4, XP),
    e(0x4A, "LSR", Accumulator, 2, 0),
    e(0x46, "LSR", ZeroPage, 5, 0),
    e(0x56, "LSR", ZeroPageX, 6, 0),
    e(0x4E, "LSR", Absolute, 6, 0),
    e(0x5E, "LSR", AbsoluteX, 7, 0),
    e(0xEA, "NOP", Implied, 2, 0),
    e(0x09, "ORA", Immediate, 2, 0),
    e(0x05, "ORA", ZeroPage, 3, 0),
    e(0x15, "ORA", ZeroPageX, 4, 0),
    e(0x0D, "ORA", Absolute, 4, 0),
    e(0x1D, "ORA", AbsoluteX, 4, XP),
    e(0x19, "ORA", AbsoluteY, 4, XP),
    e(0x01, "ORA", IndexedIndirectX, 6, 0),
    e(0x11, "ORA", IndirectIndexedY, 5, XP),
    e(0x48, "PHA", Implied, 3, 0),
    e(0x08, "PHP", Implied, 3, 0),
    e(0x68, "PLA", Implied, 4, 0),
    e(0x28, "PLP", Implied, 4, 0),
    e(0x2A, "ROL", Accumulator, 2, 0),
    e(0x26, "ROL", ZeroPage, 5, 0),
    e(0x36, "ROL", ZeroPageX, 6, 0),
    e(0x2E, "ROL", Absolute, 6, 0),
    e(0x3E, "ROL", AbsoluteX, 7, 0),
    e(0x6A, "ROR", Accumulator, 2, 0),
    e(0x66, "ROR", ZeroPage, 5, 0),
    e(0x76, "ROR", ZeroPageX, 6, 0),
    e(0x6E, "ROR", Absolute, 6, 0),
    e(0x7E, "ROR", AbsoluteX, 7, 0),
    e(0x40, "RTI", Implied, 6, 0),
    e(0x60, "RTS", Implied, 6, 0),
    e(0xE9, "SBC", Immediate, 2, 0),
    e(0xE5, "SBC", ZeroPage, 3, 0),
    e(0xF5, "SBC", ZeroPageX, 4, 0),
    e(0xED, "SBC", Absolute, 4, 0),
    e(0xFD, "SBC", AbsoluteX, 4, XP),
    e(0xF9, "SBC", AbsoluteY, 4, XP),
    e(0xE1, "SBC", IndexedIndirectX, 6, 0),
    e(0xF1, "SBC", IndirectIndexedY, 5, XP),
    e(0x38, "SEC", Implied, 2, 0),
    e(0xF8, "SED", Implied, 2, 0),
    e(0x78, "SEI", Implied, 2, 0),
    e(0x85, "STA", ZeroPage, 3, 0),
    e(0x95, "STA", ZeroPageX, 4, 0),
    e(0x8D, "STA", Absolute, 4, 0),
    e(0x9D, "STA", AbsoluteX, 4, XP),
    e(0x99, "STA", AbsoluteY, 4, XP),
    e(0x81, "STA", IndexedIndirectX, 6, 0),
    e(0x91, "STA", IndirectIndexedY, 5, XP),
    e(0x86, "STX", ZeroPage, 3, 0),
    e(0x96, "STX", ZeroPageY, 4, 0),
    e(0x8E, "STX", Absolute, 4, 0),
    e(0x84, "STY", ZeroPage, 3, 0),
    e(0x94, "STY", ZeroPageX, 4, 0),
    e(0x8C, "STY", Absolute, 4, 0),
    e(0xAA, "TAX", Implied, 2, 0),
    e(0xA8, "TAY", Implied, 2, 0),
    e(0xBA, "TSX", Implied, 2, 0),
    e(0x8A, "TXA", Implied, 2, 0),
    e(0x9A, "TXS", Implied, 2, 0),
    e(0x98, "TYA", Implied, 2, 0),
];

fn find_opcode(opcode: u8) -> Option<&'static OpcodeEntry> {
    OPCODES.iter().find(|o| o.opcode == opcode)
}

/// A single `name addr-hex type` record (spec §6). The *parsing* of this
/// format from a file is out of scope (spec §1); callers build this
/// structure however they like and hand it to [`disassemble`].
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub addr: u16,
    pub kind: String,
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    by_addr: HashMap<u16, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, addr: u16, kind: impl Into<String>) {
        self.by_addr.insert(addr, Symbol { name: name.into(), addr, kind: kind.into() });
    }

    pub fn find(&self, addr: u16) -> Option<&Symbol> {
        self.by_addr.get(&addr)
    }
}

fn append_symbol(out: &mut String, lead: &str, addr: u16, tail: &str, symbols: &SymbolTable) {
    let (sym, plus_one) = match symbols.find(addr) {
        Some(s) => (Some(s), false),
        None => match symbols.find(addr.wrapping_sub(1)) {
            Some(s) => (Some(s), true),
            None => (None, false),
        },
    };
    if let Some(s) = sym {
        out.push_str("; ");
        out.push_str(lead);
        out.push_str(&s.name);
        if plus_one {
            out.push_str("+1");
        }
        out.push_str(tail);
    }
}

/// Disassemble the instruction whose opcode and (up to two) operand
/// bytes are `bytes[0..]`, at address `current_addr`, annotating with
/// `symbols` (spec §6, §8 scenario 6).
pub fn disassemble(current_addr: u16, bytes: &[u8; 3], symbols: &SymbolTable) -> String {
    let opcode = bytes[0];
    let byte_operand = bytes[1];
    let word_operand = (bytes[1] as u16) | ((bytes[2] as u16) << 8);

    let Some(entry) = find_opcode(opcode) else {
        return format!(".byte ${opcode:02X} ; invalid");
    };

    let m = entry.mnemonic;
    let mut out = match entry.mode {
        Immediate => format!("{m} #${byte_operand:02X}"),
        Absolute => format!("{m} ${word_operand:04X}"),
        ZeroPage => format!("{m} ${byte_operand:02X}"),
        Implied => m.to_string(),
        IndirectAbsolute => format!("{m} (${word_operand:04X})"),
        AbsoluteX => format!("{m} ${word_operand:04X},X"),
        AbsoluteY => format!("{m} ${word_operand:04X},Y"),
        ZeroPageX => format!("{m} ${byte_operand:02X},X"),
        ZeroPageY => format!("{m} ${byte_operand:02X},Y"),
        IndexedIndirectX => format!("{m} (${byte_operand:02X},X)"),
        IndirectIndexedY => format!("{m} (${byte_operand:02X}),Y"),
        Relative => {
            let base = current_addr.wrapping_add(2);
            let target = if byte_operand > 0x7F {
                base.wrapping_sub((!byte_operand & 0x7F) as u16 + 1)
            } else {
                base.wrapping_add((byte_operand & 0x7F) as u16)
            };
            format!("{m} ${target:04X}")
        }
        Accumulator => format!("{m} A"),
    };

    if let Some(cs) = symbols.find(current_addr) {
        out.push_str(&format!(";[{}] ", cs.name));
    }

    match entry.mode {
        Relative | Absolute | AbsoluteX | AbsoluteY => append_symbol(&mut out, "", word_operand, "", symbols),
        ZeroPage => append_symbol(&mut out, "", byte_operand as u16, "", symbols),
        ZeroPageX => append_symbol(&mut out, "", byte_operand as u16, ",X", symbols),
        ZeroPageY => append_symbol(&mut out, "", byte_operand as u16, ",Y", symbols),
        IndexedIndirectX => append_symbol(&mut out, "(", byte_operand as u16, ",X)", symbols),
        IndirectIndexedY => append_symbol(&mut out, "(", byte_operand as u16, "),Y", symbols),
        _ => {}
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_lda_absolute_x() {
        let out = disassemble(0x0800, &[0xBD, 0x34, 0x12], &SymbolTable::new());
        assert_eq!(out, "LDA $1234,X");
    }

    #[test]
    fn scenario_bcc_relative() {
        let out = disassemble(0x0800, &[0x90, 0x05, 0x00], &SymbolTable::new());
        assert_eq!(out, "BCC $0807");
    }

    #[test]
    fn relative_backward_branch_wraps_correctly() {
        let out = disassemble(0x0800, &[0x90, 0xFB, 0x00], &SymbolTable::new()); // -5
        assert_eq!(out, "BCC $07FD");
    }

    #[test]
    fn invalid_opcode_formats_as_a_byte_directive() {
        // 0x02 is not present in this 151-entry legal opcode table.
        let out = disassemble(0x0800, &[0x02, 0x00, 0x00], &SymbolTable::new());
        assert_eq!(out, ".byte $02 ; invalid");
    }

    #[test]
    fn symbol_annotation_matches_exact_address() {
        let mut syms = SymbolTable::new();
        syms.insert("SCREEN", 0x1234, "lbl");
        let out = disassemble(0x0800, &[0xAD, 0x34, 0x12], &syms); // LDA $1234
        assert_eq!(out, "LDA $1234; SCREEN");
    }

    #[test]
    fn symbol_annotation_falls_back_to_addr_minus_one_with_plus_one_suffix() {
        let mut syms = SymbolTable::new();
        syms.insert("TABLE", 0x1233, "lbl");
        let out = disassemble(0x0800, &[0xAD, 0x34, 0x12], &syms); // LDA $1234
        assert_eq!(out, "LDA $1234; TABLE+1");
    }

    #[test]
    fn eor_indirect_x_carries_the_undocumented_cycle_exception_bit_verbatim() {
        let entry = find_opcode(0x41).unwrap();
        assert_eq!(entry.mode, IndexedIndirectX);
        assert_eq!(entry.cycle_exceptions, 1, "preserved verbatim per the flagged open question");
        // every sibling IndexedIndirectX opcode uses 0, confirming 0x41 is the outlier
        for sibling in OPCODES.iter().filter(|o| o.mode == IndexedIndirectX && o.opcode != 0x41) {
            assert_eq!(sibling.cycle_exceptions, 0);
        }
    }

    #[test]
    fn every_table_entry_round_trips_mnemonic_and_well_formed_operand() {
        for entry in OPCODES {
            let bytes = [entry.opcode, 0x42, 0x13];
            let text = disassemble(0x0800, &bytes, &SymbolTable::new());
            assert!(text.starts_with(entry.mnemonic), "opcode {:#04x} -> {text}", entry.opcode);
            if entry.mode != Implied {
                assert!(text.len() > entry.mnemonic.len(), "opcode {:#04x} missing operand text", entry.opcode);
            }
        }
    }
}
