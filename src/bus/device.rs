/*!
device.rs - The `Device` trait peripherals implement to attach to a `Bus`.

Generalizes the teacher's `Mapper` trait (which only ever delegated
cartridge-space CPU/PPU reads) to the full peripheral set this spec needs:
IO-port devices (UART, SIO, CTC, PIO), memory-mapped devices (none of the
current peripherals need this, but the hook exists for e.g. a
memory-mapped FDC data register), and a per-slice `tick` for devices that
run their own timers (CTC prescalers, UART sticky-bit sampling).

Unknown ports/addresses are the `Bus`'s responsibility (spec §4.1, §4.6:
"unknown ports return 0xFF and optionally log; unknown writes are
discarded"); a `Device` only needs to answer for the ports it actually
claims via [`Device::io_ports`] / [`Device::mem_range`].
*/

/// A peripheral attachable to a [`crate::bus::Bus`].
pub trait Device {
    /// Human-readable name, used in trace logging.
    fn name(&self) -> &str;

    /// Inclusive port range this device answers on (empty slice = none).
    fn io_ports(&self) -> &[u8] {
        &[]
    }

    /// Memory-mapped range this device answers on, if any.
    fn mem_range(&self) -> Option<(u16, u16)> {
        None
    }

    fn io_read(&mut self, _port: u8) -> u8 {
        0xFF
    }

    fn io_write(&mut self, _port: u8, _value: u8) {}

    fn mem_read(&mut self, _addr: u16) -> u8 {
        0xFF
    }

    fn mem_write(&mut self, _addr: u16, _value: u8) {}

    /// Advance device-internal timers by `t_states`. Called once per outer
    /// loop slice boundary in the fixed order spec §5 mandates (UART, CTC
    /// chain, SIO, PIO) by whichever code registers the devices in that
    /// order.
    fn tick(&mut self, _t_states: u32) {}

    /// Whether this device is currently asserting its interrupt request
    /// line (devices that never interrupt use the default).
    fn irq_asserted(&self) -> bool {
        false
    }
}
