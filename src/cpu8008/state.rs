/*!
state.rs - Canonical 8008 architectural state (spec §3, §4.2).

Deliberately excludes decode/dispatch and bus wiring; those live in
`decode.rs` and `cpu8008::Cpu8008`. Kept here:

- The seven general registers {A,B,C,D,E,H,L} in fixed index order, where
  register index 7 is not a register at all but "memory via HL" (bank is
  the low six bits of H, spec §3).
- The 8-deep hardware call stack as a genuine fixed-size ring (spec §9
  design note: "keep it as a fixed-size ring with a modulo-8 top index; do
  not grow it into an unbounded structure"). `ctop` is always the active PC
  slot.
- The four condition flip-flops {C,Z,S,P}. The hardware has no packed
  flags byte (spec §3), so these are plain booleans, not a bitfield.
- The instruction-injection buffer used to model the 8008's "jam
  instruction" interrupt protocol (spec §4.2, §9).
- The cycle accumulator, breakpoint and single-step flags used by `run`.
*/

use crate::access::{AccessKind, CpuBus};
use crate::error::CoreError;

/// Register index as it appears in the `dst`/`src` opcode fields.
/// Index 7 is not a physical register; it means "memory via HL".
pub const REG_A: u8 = 0;
pub const REG_B: u8 = 1;
pub const REG_C: u8 = 2;
pub const REG_D: u8 = 3;
pub const REG_E: u8 = 4;
pub const REG_H: u8 = 5;
pub const REG_L: u8 = 6;
pub const REG_MEM: u8 = 7;

/// Depth of the hardware call stack (8008 has 8 PC-sized slots, 7 usable
/// return addresses plus the always-active top slot).
pub const CALL_STACK_DEPTH: usize = 8;

/// Maximum number of bytes that can be jammed onto the bus by an external
/// interrupt controller in a single injection (spec §4.2, §7 class 4).
pub const MAX_INJECT_BYTES: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub carry: bool,
    pub zero: bool,
    pub sign: bool,
    pub parity: bool,
}

#[derive(Debug, Clone)]
pub struct Cpu8008State {
    /// A,B,C,D,E,H,L in that fixed order (index via `REG_*` constants).
    regs: [u8; 7],
    /// Hardware call stack: 8 program counters, 14 bits significant.
    call_stack: [u16; CALL_STACK_DEPTH],
    /// Index of the currently active PC slot (mod 8).
    ctop: u8,
    pub flags: Flags,
    pub halted: bool,
    /// Pending injected bytes (external "jam instruction" interrupt protocol).
    inject_buf: [u8; MAX_INJECT_BYTES],
    inject_len: u8,
    inject_pos: u8,
    /// Cycles executed in the current `run` call; reset to zero at the
    /// start of every call (spec §3 invariants).
    pub cycles: u64,
    pub breakpoint: Option<u16>,
    pub single_step: bool,
}

impl Default for Cpu8008State {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu8008State {
    pub fn new() -> Self {
        Self {
            regs: [0; 7],
            call_stack: [0; CALL_STACK_DEPTH],
            ctop: 0,
            flags: Flags::default(),
            halted: true,
            inject_buf: [0; MAX_INJECT_BYTES],
            inject_len: 0,
            inject_pos: 0,
            cycles: 0,
            breakpoint: None,
            single_step: false,
        }
    }

    /// Reset: zero registers, clear flags, halt (spec §3 lifecycle: 8008
    /// powers up / resets into the halted state), clear injection buffer.
    pub fn reset(&mut self) {
        self.regs = [0; 7];
        self.call_stack = [0; CALL_STACK_DEPTH];
        self.ctop = 0;
        self.flags = Flags::default();
        self.halted = true;
        self.inject_buf = [0; MAX_INJECT_BYTES];
        self.inject_len = 0;
        self.inject_pos = 0;
        self.cycles = 0;
    }

    #[inline]
    pub fn reg(&self, idx: u8) -> u8 {
        self.regs[idx as usize]
    }

    #[inline]
    pub fn set_reg(&mut self, idx: u8, v: u8) {
        self.regs[idx as usize] = v;
    }

    #[inline]
    pub fn a(&self) -> u8 {
        self.reg(REG_A)
    }
    #[inline]
    pub fn set_a(&mut self, v: u8) {
        self.set_reg(REG_A, v)
    }
    #[inline]
    pub fn h(&self) -> u8 {
        self.reg(REG_H)
    }
    #[inline]
    pub fn l(&self) -> u8 {
        self.reg(REG_L)
    }

    /// Effective address of "memory via HL": bank is the low six bits of
    /// H shifted to the high byte, L is the low byte (spec §3, §4.2).
    #[inline]
    pub fn hl_address(&self) -> u16 {
        (((self.h() & 0x3F) as u16) << 8) | self.l() as u16
    }

    // -------------------------------------------------------------------
    // Program counter / call stack
    // -------------------------------------------------------------------

    /// The active PC (top of the hardware call stack), wrapped to 14 bits.
    #[inline]
    pub fn pc(&self) -> u16 {
        self.call_stack[self.ctop as usize] & 0x3FFF
    }

    #[inline]
    pub fn set_pc(&mut self, v: u16) {
        self.call_stack[self.ctop as usize] = v & 0x3FFF;
    }

    /// Advance the active PC by one, wrapping within 14 bits (spec §3
    /// invariant: "8008 PC increments by exactly one on each fetch and
    /// wraps within 14 bits").
    #[inline]
    pub fn advance_pc(&mut self) {
        let pc = self.pc();
        self.set_pc(pc.wrapping_add(1) & 0x3FFF);
    }

    /// CALL: pre-increment `ctop` (mod 8), then write the target PC into
    /// the new top slot (spec §4.2).
    pub fn call_push(&mut self, target: u16) {
        self.ctop = (self.ctop + 1) % CALL_STACK_DEPTH as u8;
        self.set_pc(target);
    }

    /// RET: decrement `ctop` (mod 8); the previously-active slot becomes
    /// current again (spec §4.2).
    pub fn call_pop(&mut self) {
        self.ctop = (self.ctop + CALL_STACK_DEPTH as u8 - 1) % CALL_STACK_DEPTH as u8;
    }

    #[inline]
    pub fn call_depth_index(&self) -> u8 {
        self.ctop
    }

    // -------------------------------------------------------------------
    // Instruction injection ("jam instruction" interrupt protocol)
    // -------------------------------------------------------------------

    /// Inject up to three bytes to be consumed in place of the next
    /// fetches; the PC does not advance while injected bytes are
    /// consumed (spec §4.2). Clears halt. Returns an error if more than
    /// three bytes are supplied (spec §7 class 4).
    pub fn inject_bytes(&mut self, bytes: &[u8]) -> Result<(), CoreError> {
        if bytes.len() > MAX_INJECT_BYTES {
            return Err(CoreError::InjectionOverflow {
                attempted: bytes.len(),
            });
        }
        self.inject_buf = [0; MAX_INJECT_BYTES];
        self.inject_buf[..bytes.len()].copy_from_slice(bytes);
        self.inject_len = bytes.len() as u8;
        self.inject_pos = 0;
        self.halted = false;
        Ok(())
    }

    #[inline]
    pub fn has_pending_injection(&self) -> bool {
        self.inject_pos < self.inject_len
    }

    fn take_injected_byte(&mut self) -> u8 {
        let b = self.inject_buf[self.inject_pos as usize];
        self.inject_pos += 1;
        b
    }

    /// Fetch the next opcode/operand byte: either from the injection
    /// buffer (PC unchanged) or from memory at PC (PC advances).
    pub fn fetch(&mut self, bus: &mut impl CpuBus) -> u8 {
        if self.has_pending_injection() {
            return self.take_injected_byte();
        }
        let addr = self.pc();
        let b = bus.mem_read(addr, AccessKind::Fetch);
        self.advance_pc();
        b
    }

    // -------------------------------------------------------------------
    // Flags / parity
    // -------------------------------------------------------------------

    /// Even parity of the low eight bits of a 9-bit ALU result (spec §4.2,
    /// testable property in spec §8).
    #[inline]
    pub fn parity_even(value: u16) -> bool {
        (value as u8).count_ones() % 2 == 0
    }
}
