#![doc = r#"
retrocore - the shared CPU-and-bus emulation core for a collection of
vintage microcomputer emulators.

This crate implements the instruction-level interpreters, bus/bank
decoding, interrupt arbitration and peripheral state machines common to
several whole-machine emulators (a Z80-based "LincC80", a Z80 "n8vem2",
a Z80 "SmallZ80", an 8008-based "SCELBI", and an NS8060 "SCMP2"). The
Z80 ISA core itself, GDB remote-serial support, rendering backends and
ROM/disk file loading are external collaborators and are not
reimplemented here.

Modules:
- access: the `CpuBus` capability interface every CPU core is built against
- bus: memory/IO decoding (banks + devices)
- cpu8008: the Intel 8008 interpreter
- ns8060: the National Semiconductor SC/MP (NS8060) interpreter
- irq: the Z80-family IM2 daisy-chain interrupt arbiter
- copro: the Z80 co-processor card's dual-latch protocol
- peripherals: UART-16550, Zilog SIO/CTC/PIO, Tarbell WD1771 FDC glue
- disasm: 6502 and Z80 instruction disassemblers
- machine: generic outer-loop composition and illustrative presets
- error: the crate-wide `CoreError` taxonomy
"#]

pub mod access;
pub mod bus;
pub mod copro;
pub mod cpu8008;
pub mod disasm;
pub mod error;
pub mod irq;
pub mod machine;
pub mod ns8060;
pub mod peripherals;

#[cfg(test)]
mod test_support;

pub use access::CpuBus;
pub use bus::Bus;
pub use cpu8008::Cpu8008;
pub use error::CoreError;
pub use machine::{CpuCore, Machine, MachineConfig};
pub use ns8060::Ns8060;
