/*!
tarbell_fdc.rs - Tarbell single-density FDC glue to a WD1771-class
controller (SUPPLEMENT to spec §1: spec's Non-goals exclude "FDC
electrical timing" and "ROM/disk file loading", but the port-level
register file the front-end exposes is in scope as ordinary bus-facing
device state).

Grounded directly in `examples/original_source/tarbell_fdc.c`: port 0 is
status/command, 1 is track, 2 is sector, 3 is data, 4 is drive-select
(drive number inverted in bits [5:4], per the source's `(~val >> 4) &
0x03`). Real seek/step timing and actual sector data transfer are out of
scope (Non-goals), so `busy`/`drq` never assert here -- every command
completes instantly with a "done, no error" status, which is enough to
exercise the register/port decode a machine assembly depends on without
emulating disk electrical timing.
*/

use crate::bus::device::Device;

const STATUS_BUSY: u8 = 0x01;
const STATUS_DRQ: u8 = 0x02;

pub struct TarbellFdc {
    base: u8,
    ports: [u8; 5],
    status: u8,
    track: u8,
    sector: u8,
    data: u8,
    selected_drive: u8,
}

impl TarbellFdc {
    pub fn new(base: u8) -> Self {
        Self {
            base,
            ports: [base, base + 1, base + 2, base + 3, base + 4],
            status: 0,
            track: 0,
            sector: 0,
            data: 0,
            selected_drive: 0,
        }
    }

    pub fn selected_drive(&self) -> u8 {
        self.selected_drive
    }
}

impl Device for TarbellFdc {
    fn name(&self) -> &str {
        "tarbell-fdc"
    }

    fn io_ports(&self) -> &[u8] {
        &self.ports
    }

    fn io_read(&mut self, port: u8) -> u8 {
        match port.wrapping_sub(self.base) {
            0 => self.status ^ 0x80,
            1 => self.track,
            2 => self.sector,
            3 => self.data,
            _ => 0xFF,
        }
    }

    fn io_write(&mut self, port: u8, value: u8) {
        match port.wrapping_sub(self.base) {
            0 => {
                // Command latched and "executed" instantly (Non-goals
                // exclude real disk timing): clear busy/drq right away.
                self.status &= !(STATUS_BUSY | STATUS_DRQ);
            }
            1 => self.track = value,
            2 => self.sector = value,
            3 => self.data = value,
            4 => {
                if value & 0x02 != 0 {
                    self.selected_drive = (!value >> 4) & 0x03;
                }
            }
            _ => {}
        }
    }
}
