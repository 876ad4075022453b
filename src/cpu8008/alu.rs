/*!
alu.rs - 8008 ALU, increment/decrement and rotate semantics (spec §4.2).

Flags are set *only* by ALU, increment, decrement and rotate operations
(spec §4.2): increment/decrement never touch carry, and rotates affect
only carry. Parity is even-parity of the low eight bits of the (possibly
9-bit) result, computed before truncation matters since the low byte is
what's stored either way (spec §8 testable property).
*/

use super::state::{Cpu8008State, Flags};

/// The eight 8008 ALU opcodes selected by the `alu.3` field of a
/// `10 alu.3 src.3` instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbb,
    And,
    Xor,
    Or,
    Cmp,
}

impl AluOp {
    pub fn from_field(field: u8) -> Self {
        match field & 0x7 {
            0 => AluOp::Add,
            1 => AluOp::Adc,
            2 => AluOp::Sub,
            3 => AluOp::Sbb,
            4 => AluOp::And,
            5 => AluOp::Xor,
            6 => AluOp::Or,
            _ => AluOp::Cmp,
        }
    }
}

fn set_logic_flags(flags: &mut Flags, result: u8) {
    flags.carry = false;
    flags.zero = result == 0;
    flags.sign = result & 0x80 != 0;
    flags.parity = Cpu8008State::parity_even(result as u16);
}

fn set_arith_flags(flags: &mut Flags, result9: u16) {
    let result = result9 as u8;
    flags.carry = result9 > 0xFF;
    flags.zero = result == 0;
    flags.sign = result & 0x80 != 0;
    flags.parity = Cpu8008State::parity_even(result as u16);
}

/// Compute the result and flags of `a OP b` without mutating `a` (CMP uses
/// this without writing back; ALU register/immediate ops write back).
fn apply(op: AluOp, a: u8, b: u8, carry_in: bool) -> (u8, Flags) {
    let mut flags = Flags::default();
    let result = match op {
        AluOp::Add => {
            let r9 = a as u16 + b as u16;
            set_arith_flags(&mut flags, r9);
            r9 as u8
        }
        AluOp::Adc => {
            let r9 = a as u16 + b as u16 + carry_in as u16;
            set_arith_flags(&mut flags, r9);
            r9 as u8
        }
        AluOp::Sub => {
            let borrow = (a as u16) < (b as u16);
            let r = a.wrapping_sub(b);
            flags.carry = borrow;
            flags.zero = r == 0;
            flags.sign = r & 0x80 != 0;
            flags.parity = Cpu8008State::parity_even(r as u16);
            r
        }
        AluOp::Sbb => {
            let cin = carry_in as u16;
            let borrow = (a as u16) < (b as u16 + cin);
            let r = a.wrapping_sub(b).wrapping_sub(carry_in as u8);
            flags.carry = borrow;
            flags.zero = r == 0;
            flags.sign = r & 0x80 != 0;
            flags.parity = Cpu8008State::parity_even(r as u16);
            r
        }
        AluOp::And => {
            let r = a & b;
            set_logic_flags(&mut flags, r);
            r
        }
        AluOp::Xor => {
            let r = a ^ b;
            set_logic_flags(&mut flags, r);
            r
        }
        AluOp::Or => {
            let r = a | b;
            set_logic_flags(&mut flags, r);
            r
        }
        AluOp::Cmp => {
            let borrow = (a as u16) < (b as u16);
            let r = a.wrapping_sub(b);
            flags.carry = borrow;
            flags.zero = r == 0;
            flags.sign = r & 0x80 != 0;
            flags.parity = Cpu8008State::parity_even(r as u16);
            r
        }
    };
    (result, flags)
}

/// Execute `op` with the accumulator and `operand`, writing the result back
/// to A unless `op` is `Cmp` (compare never writes back, spec §4.2).
pub fn execute(state: &mut Cpu8008State, op: AluOp, operand: u8) {
    let (result, flags) = apply(op, state.a(), operand, state.flags.carry);
    state.flags = flags;
    if op != AluOp::Cmp {
        state.set_a(result);
    }
}

/// INC/DEC a register (never A, per spec §4.2): zero/sign/parity update,
/// carry is left untouched.
pub fn inc(state: &mut Cpu8008State, value: u8) -> u8 {
    let r = value.wrapping_add(1);
    state.flags.zero = r == 0;
    state.flags.sign = r & 0x80 != 0;
    state.flags.parity = Cpu8008State::parity_even(r as u16);
    r
}

pub fn dec(state: &mut Cpu8008State, value: u8) -> u8 {
    let r = value.wrapping_sub(1);
    state.flags.zero = r == 0;
    state.flags.sign = r & 0x80 != 0;
    state.flags.parity = Cpu8008State::parity_even(r as u16);
    r
}

/// The four 8008 rotate opcodes (RLC/RRC/RAL/RAR). Only carry is affected.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RotateOp {
    Rlc,
    Rrc,
    Ral,
    Rar,
}

pub fn rotate(state: &mut Cpu8008State, op: RotateOp, value: u8) -> u8 {
    let (result, carry_out) = match op {
        RotateOp::Rlc => {
            let carry = value & 0x80 != 0;
            (value.rotate_left(1), carry)
        }
        RotateOp::Rrc => {
            let carry = value & 0x01 != 0;
            (value.rotate_right(1), carry)
        }
        RotateOp::Ral => {
            let carry = value & 0x80 != 0;
            let r = (value << 1) | (state.flags.carry as u8);
            (r, carry)
        }
        RotateOp::Rar => {
            let carry = value & 0x01 != 0;
            let r = (value >> 1) | ((state.flags.carry as u8) << 7);
            (r, carry)
        }
    };
    state.flags.carry = carry_out;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sets_parity_per_even_parity_of_result() {
        let mut s = Cpu8008State::new();
        s.set_a(5);
        execute(&mut s, AluOp::Add, 0); // A = 5 -> 0b101, two set bits -> even parity
        assert_eq!(s.a(), 5);
        assert!(s.flags.parity);
        assert!(!s.flags.zero);
        assert!(!s.flags.sign);
        assert!(!s.flags.carry);
    }

    #[test]
    fn cmp_does_not_write_back() {
        let mut s = Cpu8008State::new();
        s.set_a(10);
        execute(&mut s, AluOp::Cmp, 10);
        assert_eq!(s.a(), 10);
        assert!(s.flags.zero);
    }

    #[test]
    fn inc_dec_leave_carry_untouched() {
        let mut s = Cpu8008State::new();
        s.flags.carry = true;
        let r = inc(&mut s, 0xFF);
        assert_eq!(r, 0x00);
        assert!(s.flags.zero);
        assert!(s.flags.carry, "INC must not touch carry");
        let r2 = dec(&mut s, r);
        assert_eq!(r2, 0xFF);
        assert!(s.flags.carry, "DEC must not touch carry");
    }

    #[test]
    fn rotate_only_affects_carry() {
        let mut s = Cpu8008State::new();
        s.flags.zero = true;
        s.flags.sign = true;
        s.flags.parity = true;
        let r = rotate(&mut s, RotateOp::Rlc, 0x80);
        assert_eq!(r, 0x01);
        assert!(s.flags.carry);
        assert!(s.flags.zero && s.flags.sign && s.flags.parity, "rotate must not touch Z/S/P");
    }

    #[test]
    fn sub_sets_borrow_as_carry() {
        let mut s = Cpu8008State::new();
        s.set_a(0x00);
        execute(&mut s, AluOp::Sub, 0x01);
        assert_eq!(s.a(), 0xFF);
        assert!(s.flags.carry, "borrow sets carry");
    }
}
