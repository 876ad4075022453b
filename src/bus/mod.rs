/*!
bus/mod.rs - The memory/IO decoder shared by every machine (spec §4.1).

`Bus` owns a [`BankTable`] plus a list of attached [`Device`]s and
implements [`CpuBus`] so any CPU core in this crate can be constructed
against it. Resolution order, matching spec §4.1:

  1. For memory addresses: a device claiming the address via
     [`Device::mem_range`] handles the access.
  2. Otherwise the bank table resolves the most-specifically-sized bank.
  3. Otherwise the address is unmapped: reads return `0xFF`, writes are
     dropped (both optionally logged at trace level).

For IO ports there is no bank concept at all (spec §4.1: "per-bank gating
is checked... never for I/O"): a device claiming the port via
[`Device::io_ports`] handles it, else the port is unmapped.

Writes to a write-disabled bank are dropped and logged at trace level,
*except* under [`RomWritePolicy::Fatal`] (the SCMP2 policy flag, spec
§4.1/§7), where the write instead records a fault retrievable via
[`Bus::take_fault`] so the caller can terminate with PC/opcode context.
*/

pub mod bank;
pub mod device;

pub use bank::{Bank, BankTable, PagePerm};
pub use device::Device;

use crate::access::{AccessKind, CpuBus};

/// Policy for a write landing on a write-disabled bank.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RomWritePolicy {
    /// Default: drop the write, log at trace level (spec §4.1 default).
    Absorb,
    /// SCMP2 debugging policy: record a fault (spec §4.1 "hard fault").
    Fatal,
}

pub struct Bus {
    banks: BankTable,
    devices: Vec<Box<dyn Device>>,
    pub rom_write_policy: RomWritePolicy,
    fault: Option<String>,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    pub fn new() -> Self {
        Self {
            banks: BankTable::new(),
            devices: Vec::new(),
            rom_write_policy: RomWritePolicy::Absorb,
            fault: None,
        }
    }

    pub fn with_rom_write_policy(policy: RomWritePolicy) -> Self {
        let mut bus = Self::new();
        bus.rom_write_policy = policy;
        bus
    }

    pub fn banks(&self) -> &BankTable {
        &self.banks
    }

    pub fn banks_mut(&mut self) -> &mut BankTable {
        &mut self.banks
    }

    pub fn add_bank(&mut self, bank: Bank) -> usize {
        self.banks.push(bank)
    }

    pub fn attach_device(&mut self, device: Box<dyn Device>) {
        self.devices.push(device);
    }

    pub fn devices(&self) -> &[Box<dyn Device>] {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut [Box<dyn Device>] {
        &mut self.devices
    }

    /// Any outstanding "hard fault" recorded under [`RomWritePolicy::Fatal`].
    /// Consuming it clears it, mirroring `CoreError`-style one-shot faults.
    pub fn take_fault(&mut self) -> Option<String> {
        self.fault.take()
    }

    fn find_mem_device(&mut self, addr: u16) -> Option<usize> {
        self.devices.iter().position(|d| {
            d.mem_range()
                .is_some_and(|(lo, hi)| addr >= lo && addr <= hi)
        })
    }

    fn find_io_device(&mut self, port: u8) -> Option<usize> {
        self.devices.iter().position(|d| d.io_ports().contains(&port))
    }

    /// Advance every attached device's internal timer by `t_states`, in
    /// attachment order (spec §5: "Peripheral ticks are applied... in a
    /// fixed order"). Callers are responsible for attaching devices in the
    /// order their machine wants (UART, CTC chain, SIO, PIO).
    pub fn tick_devices(&mut self, t_states: u32) {
        for dev in &mut self.devices {
            dev.tick(t_states);
        }
    }

    /// OR of every attached device's interrupt request line.
    pub fn any_irq_asserted(&self) -> bool {
        self.devices.iter().any(|d| d.irq_asserted())
    }
}

impl CpuBus for Bus {
    fn mem_read(&mut self, addr: u16, kind: AccessKind) -> u8 {
        if let Some(idx) = self.find_mem_device(addr) {
            return self.devices[idx].mem_read(addr);
        }
        if let Some(idx) = self.banks.find(addr) {
            let bank = self.banks.get(idx).expect("index from find() is valid");
            if let Some(v) = bank.read(addr) {
                return v;
            }
        }
        if kind != AccessKind::Debug {
            log::trace!("bus: read from unmapped address {addr:#06x}");
        }
        0xFF
    }

    fn mem_write(&mut self, addr: u16, value: u8) {
        if let Some(idx) = self.find_mem_device(addr) {
            self.devices[idx].mem_write(addr, value);
            return;
        }
        if let Some(idx) = self.banks.find(addr) {
            let bank = self.banks.get_mut(idx).expect("index from find() is valid");
            if bank.write(addr, value) {
                return;
            }
            match self.rom_write_policy {
                RomWritePolicy::Absorb => {
                    log::trace!("bus: write to write-protected bank at {addr:#06x} dropped");
                }
                RomWritePolicy::Fatal => {
                    self.fault = Some(format!(
                        "write to write-protected bank at {addr:#06x} (value {value:#04x})"
                    ));
                }
            }
            return;
        }
        log::trace!("bus: write to unmapped address {addr:#06x} dropped");
    }

    fn io_read(&mut self, port: u8) -> u8 {
        if let Some(idx) = self.find_io_device(port) {
            self.devices[idx].io_read(port)
        } else {
            log::trace!("bus: read from unknown port {port:#04x}");
            0xFF
        }
    }

    fn io_write(&mut self, port: u8, value: u8) {
        if let Some(idx) = self.find_io_device(port) {
            self.devices[idx].io_write(port, value);
        } else {
            log::trace!("bus: write to unknown port {port:#04x} ({value:#04x}) dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_read_floats_high() {
        let mut bus = Bus::new();
        assert_eq!(bus.mem_read(0x1234, AccessKind::Data), 0xFF);
    }

    #[test]
    fn unmapped_write_is_a_silent_noop() {
        let mut bus = Bus::new();
        bus.mem_write(0x1234, 0x42);
        assert_eq!(bus.mem_read(0x1234, AccessKind::Data), 0xFF);
    }

    #[test]
    fn rom_bank_write_absorbed_by_default() {
        let mut bus = Bus::new();
        bus.add_bank(Bank::rom(0x0000, vec![0x11; 0x100]));
        bus.mem_write(0x0010, 0x99);
        assert_eq!(bus.mem_read(0x0010, AccessKind::Data), 0x11);
        assert!(bus.take_fault().is_none());
    }

    #[test]
    fn rom_bank_write_is_fatal_under_scmp2_policy() {
        let mut bus = Bus::with_rom_write_policy(RomWritePolicy::Fatal);
        bus.add_bank(Bank::rom(0x0000, vec![0x11; 0x100]));
        bus.mem_write(0x0010, 0x99);
        assert_eq!(bus.mem_read(0x0010, AccessKind::Data), 0x11);
        assert!(bus.take_fault().is_some());
        assert!(bus.take_fault().is_none(), "fault is one-shot");
    }

    #[test]
    fn unknown_port_reads_float_high_and_writes_are_dropped() {
        let mut bus = Bus::new();
        assert_eq!(bus.io_read(0x42), 0xFF);
        bus.io_write(0x42, 0x01); // must not panic
    }
}
