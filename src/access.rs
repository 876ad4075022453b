/*!
access.rs - The CPU<->bus capability interface (spec §6 "CPU ↔ bus
contracts").

Every CPU core in this crate is generic over a `CpuBus` implementor rather
than holding a concrete `Bus` or a set of raw function pointers. This plays
the same role the teacher's `Mapper` trait plays for cartridge address
space: a small capability interface the core calls through, so there is no
process-global "current machine" pointer anywhere in this crate (spec §9
design note).

`AccessKind` distinguishes the three read intents named in spec §4.1:
fetch reads may carry extra cost or bank-selection semantics (8008 bank is
derived from the high byte of H), debug reads must never trigger side
effects (disassembly, GDB peek), and plain data reads are everything else.
*/

/// Intent behind a memory read, used by the bus decoder and by devices that
/// care about fetch-vs-data distinctions (spec §4.1, §4.2).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AccessKind {
    /// Opcode fetch. May carry bank-selection side information (8008).
    Fetch,
    /// Ordinary data read (operand, stack, DMA, etc).
    Data,
    /// Side-effect-free read for disassembly or debugger inspection.
    Debug,
}

/// Capability interface a CPU core is constructed with.
///
/// Implemented by [`crate::bus::Bus`]. Kept minimal and free of any
/// reference back to a concrete machine type so CPU cores stay unit
/// testable against small fixture buses.
pub trait CpuBus {
    /// Read a byte from memory space with the given access intent.
    fn mem_read(&mut self, addr: u16, kind: AccessKind) -> u8;

    /// Write a byte to memory space. Implementations drop writes to
    /// unwritable banks per spec §4.1.
    fn mem_write(&mut self, addr: u16, value: u8);

    /// Read a byte from IO/port space.
    fn io_read(&mut self, port: u8) -> u8;

    /// Write a byte to IO/port space.
    fn io_write(&mut self, port: u8, value: u8);
}

/// Convenience little-endian word read, used by reset-vector and indirect
/// addressing logic across both CPU cores.
pub fn read_word(bus: &mut impl CpuBus, addr: u16, kind: AccessKind) -> u16 {
    let lo = bus.mem_read(addr, kind) as u16;
    let hi = bus.mem_read(addr.wrapping_add(1), kind) as u16;
    (hi << 8) | lo
}
