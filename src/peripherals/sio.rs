/*!
sio.rs - Z80 SIO channel model (spec §4.6).

Per-channel 3-byte RX FIFO; overrun replaces the tail rather than
blocking or growing. Three RX interrupt modes selected by WR1 bits
[4:3]: none, first-character-only, all characters. WR0 command codes
include channel reset, error-latch reset, and "return from interrupt"
(channel A only) which de-asserts the whole chain's pending state --
modelled here by clearing this channel's pending flag and letting the
[`crate::irq::Arbiter`] RETI sniffer handle the daisy-chain side
separately, since that is the authoritative RETI path per spec §4.4.
*/

use crate::bus::device::Device;

const FIFO_DEPTH: usize = 3;

const WR0_CMD_MASK: u8 = 0b0011_1000;
const WR0_CHANNEL_RESET: u8 = 0b0001_1000;
const WR0_ERROR_RESET: u8 = 0b0011_0000;
const WR0_RETI: u8 = 0b0010_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxInterruptMode {
    None,
    FirstCharOnly,
    AllChars,
}

pub struct SioChannel {
    base_data_port: u8,
    base_ctrl_port: u8,
    ports: [u8; 2],
    fifo: [u8; FIFO_DEPTH],
    fifo_len: usize,
    rx_mode: RxInterruptMode,
    pending: bool,
    /// Latched once `FirstCharOnly` has fired; cleared by a mode change
    /// or a channel/error reset, not by draining the FIFO (a real SIO
    /// does not re-arm on every fifo-empty-to-nonempty transition).
    first_char_fired: bool,
    is_channel_a: bool,
    wr_pointer: u8,
}

impl SioChannel {
    pub fn new(data_port: u8, ctrl_port: u8, is_channel_a: bool) -> Self {
        Self {
            base_data_port: data_port,
            base_ctrl_port: ctrl_port,
            ports: [data_port, ctrl_port],
            fifo: [0; FIFO_DEPTH],
            fifo_len: 0,
            rx_mode: RxInterruptMode::None,
            pending: false,
            first_char_fired: false,
            is_channel_a,
            wr_pointer: 0,
        }
    }

    /// Push a received byte; overrun replaces the FIFO's tail entry
    /// (spec §4.6), it never grows past three bytes.
    pub fn push_rx(&mut self, byte: u8) {
        if self.fifo_len < FIFO_DEPTH {
            self.fifo[self.fifo_len] = byte;
            self.fifo_len += 1;
        } else {
            self.fifo[FIFO_DEPTH - 1] = byte;
        }
        match self.rx_mode {
            RxInterruptMode::None => {}
            RxInterruptMode::FirstCharOnly => {
                if !self.first_char_fired {
                    self.pending = true;
                    self.first_char_fired = true;
                }
            }
            RxInterruptMode::AllChars => self.pending = true,
        }
    }

    fn pop_rx(&mut self) -> u8 {
        if self.fifo_len == 0 {
            return 0xFF;
        }
        let b = self.fifo[0];
        self.fifo.copy_within(1..self.fifo_len, 0);
        self.fifo_len -= 1;
        b
    }

    fn write_wr(&mut self, value: u8) {
        match self.wr_pointer {
            0 => {
                let cmd = value & WR0_CMD_MASK;
                match cmd {
                    WR0_CHANNEL_RESET => {
                        self.fifo_len = 0;
                        self.pending = false;
                        self.first_char_fired = false;
                    }
                    WR0_ERROR_RESET => self.first_char_fired = false,
                    WR0_RETI if self.is_channel_a => self.pending = false,
                    _ => {}
                }
                self.wr_pointer = value & 0x07;
            }
            1 => {
                self.rx_mode = match (value >> 3) & 0x03 {
                    0b00 => RxInterruptMode::None,
                    0b01 => RxInterruptMode::FirstCharOnly,
                    _ => RxInterruptMode::AllChars,
                };
                self.first_char_fired = false;
                self.wr_pointer = 0;
            }
            _ => self.wr_pointer = 0,
        }
    }
}

impl Device for SioChannel {
    fn name(&self) -> &str {
        if self.is_channel_a {
            "sio-a"
        } else {
            "sio-b"
        }
    }

    fn io_ports(&self) -> &[u8] {
        &self.ports
    }

    fn io_read(&mut self, port: u8) -> u8 {
        if port == self.base_data_port {
            let b = self.pop_rx();
            if self.fifo_len == 0 && self.rx_mode != RxInterruptMode::AllChars {
                self.pending = false;
            }
            b
        } else if port == self.base_ctrl_port {
            (self.fifo_len > 0) as u8
        } else {
            0xFF
        }
    }

    fn io_write(&mut self, port: u8, value: u8) {
        if port == self.base_ctrl_port {
            self.write_wr(value);
        }
    }

    fn irq_asserted(&self) -> bool {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrun_replaces_the_fifo_tail() {
        let mut c = SioChannel::new(0x10, 0x11, true);
        c.push_rx(1);
        c.push_rx(2);
        c.push_rx(3);
        c.push_rx(4); // overrun
        assert_eq!(c.io_read(0x10), 1);
        assert_eq!(c.io_read(0x10), 2);
        assert_eq!(c.io_read(0x10), 4, "overrun replaced the tail (3) with 4");
    }

    #[test]
    fn first_char_only_mode_interrupts_once() {
        let mut c = SioChannel::new(0x10, 0x11, true);
        c.io_write(0x11, 0x01); // WR0: select WR1 next
        c.io_write(0x11, 0b0000_1000); // WR1: rx mode = first-char-only
        c.push_rx(1);
        assert!(c.irq_asserted());
        c.io_read(0x10);
        c.push_rx(2);
        assert!(!c.irq_asserted(), "first-char-only mode does not re-fire on later chars");
    }

    #[test]
    fn channel_a_reti_command_clears_pending() {
        let mut c = SioChannel::new(0x10, 0x11, true);
        c.io_write(0x11, 0x01); // WR0: select WR1 next
        c.io_write(0x11, 0b0001_0000); // WR1: rx mode = all chars
        c.push_rx(9);
        assert!(c.irq_asserted());
        c.io_write(0x11, WR0_RETI);
        assert!(!c.irq_asserted());
    }
}
