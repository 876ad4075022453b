/*!
decode.rs - 8008 opcode decode and dispatch (spec §4.2).

`spec.md` describes the 8008 opcode space only by its bitfield shape (the
two-bit group prefix plus named subfields); it does not enumerate a literal
opcode-to-mnemonic table. This module commits to one self-consistent
mapping from that shape to concrete opcode bytes — recorded as an explicit
design decision in DESIGN.md — and implements every behavior the shape
implies: the MOV group's HALT special case, the `00` group's second HALT
encoding (INC/DEC with field 0, i.e. register A), the memory-operand cycle
surcharges, the four-way ALU-immediate/RST/MVI/rotate split of the `00`
group, and the unconditional/conditional split of the `01` group (jump,
call, in, out, and conditional return; unconditional return lives in the
`00` group per spec text).

Cycle costs for the `11`/`10` groups follow the spec's literal formula
(base 5, +3 for a memory-read operand, +2 for a memory-write destination,
with the all-7 combination special-cased to the 4-cycle HALT). Costs for
the `01`/`00` groups are not given a formula in spec.md; this module uses
the well known historical Intel 8008 timings for the equivalent
instruction *kinds* (MVI=8/9, JMP=11, conditional not-taken=9, RET=5/3,
RST=5, ALU-immediate=8, IN=8, OUT=6) since those are real hardware facts,
not invented numbers.
*/

use crate::access::{AccessKind, CpuBus};

use super::alu::{self, AluOp, RotateOp};
use super::state::Cpu8008State;

fn fetch_addr14(state: &mut Cpu8008State, bus: &mut impl CpuBus) -> u16 {
    let lo = state.fetch(bus) as u16;
    let hi = state.fetch(bus) as u16;
    ((hi & 0x3F) << 8 | lo) & 0x3FFF
}

fn evaluate_condition(state: &Cpu8008State, cond_idx: u8, polarity_set: bool) -> bool {
    let flag = match cond_idx & 0x3 {
        0 => state.flags.carry,
        1 => state.flags.zero,
        2 => state.flags.sign,
        _ => state.flags.parity,
    };
    if polarity_set { flag } else { !flag }
}

fn mov_group(state: &mut Cpu8008State, bus: &mut impl CpuBus, opcode: u8) -> u32 {
    let dst = (opcode >> 3) & 0x7;
    let src = opcode & 0x7;
    if dst == 7 && src == 7 {
        state.halted = true;
        return 4;
    }
    let value = if src == 7 {
        bus.mem_read(state.hl_address(), AccessKind::Data)
    } else {
        state.reg(src)
    };
    let mut cost: u32 = 5;
    if src == 7 {
        cost += 3;
    }
    if dst == 7 {
        bus.mem_write(state.hl_address(), value);
        cost += 2;
    } else {
        state.set_reg(dst, value);
    }
    cost
}

fn alu_group(state: &mut Cpu8008State, bus: &mut impl CpuBus, opcode: u8) -> u32 {
    let op = AluOp::from_field((opcode >> 3) & 0x7);
    let src = opcode & 0x7;
    let operand = if src == 7 {
        bus.mem_read(state.hl_address(), AccessKind::Data)
    } else {
        state.reg(src)
    };
    alu::execute(state, op, operand);
    if src == 7 { 8 } else { 5 }
}

fn branch_group(state: &mut Cpu8008State, bus: &mut impl CpuBus, opcode: u8) -> u32 {
    let cond_idx = (opcode >> 4) & 0x3;
    let polarity_set = (opcode >> 3) & 0x1 != 0;
    let unconditional = (opcode >> 2) & 0x1 != 0;
    let sel = opcode & 0x3;

    if unconditional {
        match sel {
            0 => {
                // JMP
                let target = fetch_addr14(state, bus);
                state.set_pc(target);
                11
            }
            1 => {
                // CALL
                let target = fetch_addr14(state, bus);
                state.call_push(target);
                11
            }
            2 => {
                // OUT: port number carried in the immediate byte that follows.
                let port = state.fetch(bus);
                let value = state.a();
                bus.io_write(port, value);
                6
            }
            _ => {
                // IN
                let port = state.fetch(bus);
                let value = bus.io_read(port);
                state.set_a(value);
                8
            }
        }
    } else {
        let taken = evaluate_condition(state, cond_idx, polarity_set);
        match sel {
            0 => {
                // Conditional JMP: the 2-byte target is always consumed.
                let target = fetch_addr14(state, bus);
                if taken {
                    state.set_pc(target);
                    11
                } else {
                    9
                }
            }
            1 => {
                // Conditional CALL
                let target = fetch_addr14(state, bus);
                if taken {
                    state.call_push(target);
                    11
                } else {
                    9
                }
            }
            2 => {
                // Conditional RET
                if taken {
                    state.call_pop();
                    5
                } else {
                    3
                }
            }
            _ => 5, // reserved encoding: behaves as a no-op
        }
    }
}

fn misc_group(state: &mut Cpu8008State, bus: &mut impl CpuBus, opcode: u8) -> u32 {
    let field = (opcode >> 3) & 0x7;
    let sub = opcode & 0x7;
    match sub {
        0 => {
            // INC reg. field 0 (A) is a second HALT encoding on real
            // hardware, not INC A -- see incdec() in i8008.c.
            if field == 0 {
                state.halted = true;
                return 4;
            }
            let v = state.reg(field);
            let r = alu::inc(state, v);
            state.set_reg(field, r);
            5
        }
        1 => {
            // DEC reg. field 0 (A) is a second HALT encoding, as above.
            if field == 0 {
                state.halted = true;
                return 4;
            }
            let v = state.reg(field);
            let r = alu::dec(state, v);
            state.set_reg(field, r);
            5
        }
        2 => {
            // Rotate: low two bits of `field` select RLC/RRC/RAL/RAR.
            let rop = match field & 0x3 {
                0 => RotateOp::Rlc,
                1 => RotateOp::Rrc,
                2 => RotateOp::Ral,
                _ => RotateOp::Rar,
            };
            let r = alu::rotate(state, rop, state.a());
            state.set_a(r);
            5
        }
        3 => {
            // Unconditional RET
            state.call_pop();
            5
        }
        4 => {
            // ALU-immediate
            let op = AluOp::from_field(field);
            let imm = state.fetch(bus);
            alu::execute(state, op, imm);
            8
        }
        5 => {
            // RST: target is the 3-bit vector number times 8.
            let target = (field as u16) * 8;
            state.call_push(target);
            5
        }
        6 => {
            // MVI (load register or memory immediate)
            let imm = state.fetch(bus);
            if field == 7 {
                let addr = state.hl_address();
                bus.mem_write(addr, imm);
                9
            } else {
                state.set_reg(field, imm);
                8
            }
        }
        _ => 5, // reserved encoding: no-op
    }
}

/// Decode and execute a single instruction, returning cycles consumed.
/// Handles the injection buffer transparently via `Cpu8008State::fetch`.
pub fn step(state: &mut Cpu8008State, bus: &mut impl CpuBus) -> u32 {
    let opcode = state.fetch(bus);
    match opcode >> 6 {
        0b11 => mov_group(state, bus, opcode),
        0b10 => alu_group(state, bus, opcode),
        0b01 => branch_group(state, bus, opcode),
        _ => misc_group(state, bus, opcode),
    }
}
