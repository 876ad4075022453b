/*!
test_support.rs - Shared test-only fixtures, mirroring the teacher's
`test_utils` module: a minimal flat-address-space bus used by CPU core
unit tests that don't need full bank/device decoding.
*/
#![cfg(test)]

use crate::access::{AccessKind, CpuBus};

/// A trivial 64 KiB flat memory + 256-port IO space, fully readable and
/// writable everywhere. Used to unit test CPU cores in isolation from the
/// bank/device resolution machinery exercised separately in `bus::tests`.
pub struct FlatBus {
    pub mem: Vec<u8>,
    pub io: [u8; 256],
}

impl FlatBus {
    pub fn new() -> Self {
        Self {
            mem: vec![0; 0x4000],
            io: [0xFF; 256],
        }
    }

    pub fn with_program(bytes: &[u8]) -> Self {
        let mut bus = Self::new();
        bus.mem[..bytes.len()].copy_from_slice(bytes);
        bus
    }
}

impl Default for FlatBus {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuBus for FlatBus {
    fn mem_read(&mut self, addr: u16, _kind: AccessKind) -> u8 {
        self.mem[addr as usize % self.mem.len()]
    }

    fn mem_write(&mut self, addr: u16, value: u8) {
        let len = self.mem.len();
        self.mem[addr as usize % len] = value;
    }

    fn io_read(&mut self, port: u8) -> u8 {
        self.io[port as usize]
    }

    fn io_write(&mut self, port: u8, value: u8) {
        self.io[port as usize] = value;
    }
}
