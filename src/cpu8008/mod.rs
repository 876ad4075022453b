/*!
cpu8008 - Intel 8008 instruction-level interpreter (spec §4.2).

Composition mirrors the teacher's `cpu::core::Cpu` façade: a thin wrapper
around the pure [`state::Cpu8008State`] that adds the `step`/`run` control
flow and delegates decode/execute to [`decode::step`].
*/

pub mod alu;
pub mod decode;
pub mod state;

pub use state::{Cpu8008State, Flags};

use crate::access::CpuBus;
use crate::error::CoreError;

pub struct Cpu8008 {
    state: Cpu8008State,
}

impl Default for Cpu8008 {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu8008 {
    pub fn new() -> Self {
        Self {
            state: Cpu8008State::new(),
        }
    }

    pub fn state(&self) -> &Cpu8008State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut Cpu8008State {
        &mut self.state
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub fn pc(&self) -> u16 {
        self.state.pc()
    }

    pub fn is_halted(&self) -> bool {
        self.state.halted
    }

    pub fn inject_bytes(&mut self, bytes: &[u8]) -> Result<(), CoreError> {
        self.state.inject_bytes(bytes)
    }

    /// Execute a single instruction, returning cycles consumed.
    pub fn step(&mut self, bus: &mut impl CpuBus) -> u32 {
        decode::step(&mut self.state, bus)
    }

    /// Run until the cycle accumulator reaches at least `n` or the CPU
    /// halts. The accumulator resets to zero at the start of every call
    /// (spec §3 invariant) and the returned total never exceeds
    /// `n + max_instruction_cost` since at most one instruction overruns
    /// the budget (spec §4.2, §8).
    pub fn run(&mut self, bus: &mut impl CpuBus, n: u64) -> u64 {
        self.state.cycles = 0;
        while self.state.cycles < n && !self.state.halted {
            let cycles = self.step(bus);
            self.state.cycles += cycles as u64;
            if let Some(bp) = self.state.breakpoint
                && self.state.pc() == bp
            {
                break;
            }
            if self.state.single_step {
                break;
            }
        }
        self.state.cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FlatBus;

    #[test]
    fn run_resets_cycle_accumulator_each_call() {
        let mut bus = FlatBus::with_program(&[0b1100_0000; 64]); // MOV A,A repeated, 5 cycles each
        let mut cpu = Cpu8008::new();
        cpu.reset();
        let total = cpu.run(&mut bus, 12);
        assert!(total >= 12);
        assert!(total <= 12 + 11, "never exceeds n + max_instruction_cost");
        let total2 = cpu.run(&mut bus, 5);
        assert_eq!(total2, 5, "accumulator reset at the start of the call");
    }

    #[test]
    fn run_stops_on_halt() {
        let mut bus = FlatBus::with_program(&[0b1100_0000, 0xFF]);
        let mut cpu = Cpu8008::new();
        cpu.reset();
        let total = cpu.run(&mut bus, 1000);
        assert!(cpu.is_halted());
        assert_eq!(total, 5 + 4);
    }

    #[test]
    fn injected_byte_is_consumed_without_pc_advance_even_mid_run() {
        let mut bus = FlatBus::new();
        let mut cpu = Cpu8008::new();
        cpu.reset();
        cpu.inject_bytes(&[0xFF]).unwrap(); // jam a HALT
        assert!(!cpu.is_halted());
        let pc_before = cpu.pc();
        cpu.step(&mut bus);
        assert!(cpu.is_halted());
        assert_eq!(cpu.pc(), pc_before);
    }
}
