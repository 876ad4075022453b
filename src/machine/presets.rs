/*!
presets.rs - illustrative machine assemblies (SPEC_FULL.md §2
"[SUPPLEMENT] ... two illustrative concrete assemblies ... demonstrations
of the composition pattern, not faithful full machine ports").

`smallz80_like` wires up the bank/device shape `smallz80.c` describes,
but since the Z80 execution core itself is vendored and out of scope
(spec §1), it returns a bare [`crate::bus::Bus`] rather than a
[`crate::machine::Machine`] -- there is no in-crate `CpuCore` to drive
it. `scelbi_like` is a full [`Machine`] since the 8008 interpreter is
in scope (spec §4.2) and `scelbi.c` is 8008-based.
*/

use super::{Machine, MachineConfig};
use crate::bus::bank::Bank;
use crate::bus::Bus;
use crate::cpu8008::Cpu8008;
use crate::peripherals::{Ctc, PioPort, SioChannel, Uart16550};

/// A bus wired the way `examples/original_source/smallz80.c` wires one:
/// 32K RAM, 16K ROM, a UART, an SIO pair, a CTC, and a PIO port.
pub fn smallz80_like() -> Bus {
    let mut bus = Bus::new();
    bus.add_bank(Bank::rom(0x0000, vec![0; 0x4000]));
    bus.add_bank(Bank::ram(0x4000, 0x8000));
    bus.attach_device(Box::new(Uart16550::new(0x00)));
    bus.attach_device(Box::new(Ctc::new(0x10)));
    bus.attach_device(Box::new(SioChannel::new(0x20, 0x21, true)));
    bus.attach_device(Box::new(SioChannel::new(0x22, 0x23, false)));
    bus.attach_device(Box::new(PioPort::new(0x30, 0x31)));
    bus
}

/// A `Machine<Cpu8008>` wired the way `examples/original_source/scelbi.c`
/// wires its RAM/ROM: a small ROM bootstrap bank plus RAM, no peripherals
/// (the real SCELBI front panel is switches/lights, out of scope here).
pub fn scelbi_like() -> Machine<Cpu8008> {
    let mut bus = Bus::new();
    bus.add_bank(Bank::rom(0x0000, vec![0; 0x0400]));
    bus.add_bank(Bank::ram(0x0400, 0x0400));
    Machine::new(Cpu8008::new(), bus, MachineConfig::cpu8008_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::CpuBus;
    use crate::bus::device::Device;

    #[test]
    fn smallz80_like_devices_answer_their_ports() {
        let mut bus = smallz80_like();
        assert_eq!(bus.io_read(0x02), 0x01); // UART IIR: no pending interrupt
        bus.io_write(0x21, 0b0001_1000); // SIO-A WR0 channel reset, harmless
        assert_eq!(bus.devices().len(), 5);
    }

    #[test]
    fn scelbi_like_runs_a_slice() {
        let mut machine = scelbi_like();
        machine.bus.mem_write(0x0400, 0xFF); // HALT (RAM, writable)
        machine.core.state_mut().set_pc(0x0400);
        machine.run_slice().unwrap();
        assert!(machine.core.is_halted());
    }
}
