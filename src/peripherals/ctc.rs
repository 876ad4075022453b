/*!
ctc.rs - Z80 CTC (counter/timer channel) model (spec §4.6).

Four channels, each a timer-or-counter with a 16/256 prescaler in timer
mode. The internal counter runs in units of 1/256 of a tick for
fractional accuracy; on underflow the channel reloads, optionally pulses
a chain output (channel 0 -> channel 1 only, per this spec's scope), and
optionally raises an interrupt whose vector comes from channel 0's
vector register with the low three bits encoding the channel number.
*/

use crate::bus::device::Device;

const CTRL_INTERRUPT_ENABLE: u8 = 0x80;
const CTRL_MODE_COUNTER: u8 = 0x40; // set = counter mode, clear = timer mode
const CTRL_PRESCALER_256: u8 = 0x20; // set = /256, clear = /16
const CTRL_TIME_CONSTANT_FOLLOWS: u8 = 0x04;

pub struct CtcChannel {
    control: u8,
    time_constant: u8,
    /// Counter value in units of 1/256 tick, for fractional prescaling.
    subcounter: u32,
    vector: u8,
    pending: bool,
    expecting_time_constant: bool,
    chain_pulse: bool,
}

impl CtcChannel {
    pub fn new() -> Self {
        Self {
            control: 0,
            time_constant: 0,
            subcounter: 0,
            vector: 0,
            pending: false,
            expecting_time_constant: false,
            chain_pulse: false,
        }
    }

    fn prescaler(&self) -> u32 {
        if self.control & CTRL_PRESCALER_256 != 0 {
            256
        } else {
            16
        }
    }

    fn reload_ticks(&self) -> u32 {
        let tc = if self.time_constant == 0 {
            256
        } else {
            self.time_constant as u32
        };
        tc * self.prescaler() * 256
    }

    pub fn write_control(&mut self, value: u8) {
        if self.expecting_time_constant {
            self.time_constant = value;
            self.subcounter = self.reload_ticks();
            self.expecting_time_constant = false;
            return;
        }
        self.control = value;
        if value & CTRL_TIME_CONSTANT_FOLLOWS != 0 {
            self.expecting_time_constant = true;
        }
    }

    pub fn write_vector(&mut self, value: u8) {
        self.vector = value & 0xF8;
    }

    /// Advance this channel's sub-tick counter; returns whether it
    /// underflowed this call (used by the chain wiring to pulse the next
    /// channel, spec §4.6 "channel 0 -> channel 1 only").
    pub fn advance(&mut self, t_states_times_256: u32) -> bool {
        if self.expecting_time_constant {
            return false;
        }
        if self.subcounter == 0 {
            self.subcounter = self.reload_ticks();
        }
        if t_states_times_256 >= self.subcounter {
            self.subcounter = self.reload_ticks();
            if self.control & CTRL_INTERRUPT_ENABLE != 0 {
                self.pending = true;
            }
            true
        } else {
            self.subcounter -= t_states_times_256;
            false
        }
    }

    pub fn vector_for_channel(&self, channel: u8) -> u8 {
        (self.vector & 0xF8) | (channel & 0x07)
    }
}

impl Default for CtcChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Four CTC channels wired in a daisy chain where channel 0's underflow
/// pulses channel 1's clock input (spec §4.6 scope: "channel 0 -> channel
/// 1 only, in this implementation").
pub struct Ctc {
    base: u8,
    ports: [u8; 4],
    pub channels: [CtcChannel; 4],
}

impl Ctc {
    pub fn new(base: u8) -> Self {
        Self {
            base,
            ports: [base, base + 1, base + 2, base + 3],
            channels: [
                CtcChannel::new(),
                CtcChannel::new(),
                CtcChannel::new(),
                CtcChannel::new(),
            ],
        }
    }

    fn interrupt_pending_channel(&self) -> Option<u8> {
        self.channels
            .iter()
            .position(|c| c.pending)
            .map(|i| i as u8)
    }

    pub fn vector_for_pending(&self) -> Option<u8> {
        self.interrupt_pending_channel()
            .map(|ch| self.channels[0].vector_for_channel(ch))
    }

    pub fn ack(&mut self, channel: u8) {
        if let Some(c) = self.channels.get_mut(channel as usize) {
            c.pending = false;
        }
    }
}

impl Device for Ctc {
    fn name(&self) -> &str {
        "ctc"
    }

    fn io_ports(&self) -> &[u8] {
        &self.ports
    }

    fn io_read(&mut self, port: u8) -> u8 {
        let idx = port.wrapping_sub(self.base) as usize;
        self.channels
            .get(idx)
            .map(|c| (c.subcounter / c.prescaler().max(1) / 256) as u8)
            .unwrap_or(0xFF)
    }

    fn io_write(&mut self, port: u8, value: u8) {
        let idx = port.wrapping_sub(self.base) as usize;
        if let Some(c) = self.channels.get_mut(idx) {
            // A pending time-constant byte is always data, regardless of
            // bit0; otherwise on channel 0, D0=0 selects a vector write
            // and D0=1 a control-word write (real Zilog CTC protocol).
            if !c.expecting_time_constant && idx == 0 && value & 0x01 == 0 {
                c.write_vector(value);
            } else {
                c.write_control(value);
            }
        }
    }

    fn tick(&mut self, t_states: u32) {
        let units = t_states.saturating_mul(256);
        let ch0_underflowed = self.channels[0].advance(units);
        if ch0_underflowed {
            self.channels[1].advance(256);
        }
        self.channels[2].advance(units);
        self.channels[3].advance(units);
    }

    fn irq_asserted(&self) -> bool {
        self.interrupt_pending_channel().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_reloads_and_pulses_interrupt_on_underflow() {
        let mut ctc = Ctc::new(0x80);
        ctc.io_write(0x80, 0b1000_0101); // interrupt-enable, time-constant-follows
        ctc.io_write(0x80, 0x01); // time constant = 1
        assert!(!ctc.irq_asserted());
        ctc.tick(16); // one full prescale-16 period at TC=1
        assert!(ctc.irq_asserted());
        assert_eq!(ctc.vector_for_pending(), Some(0x00));
    }

    #[test]
    fn vector_low_bits_encode_the_channel() {
        let mut ctc = Ctc::new(0x80);
        ctc.io_write(0x80, 0b0001_0000); // channel 0 vector register write
        ctc.io_write(0x82, 0b1000_0101); // channel 2: interrupt-enable, TC follows
        ctc.io_write(0x82, 0x01);
        ctc.tick(16);
        assert_eq!(ctc.vector_for_pending(), Some(0b0001_0010));
    }

    #[test]
    fn ack_clears_the_pending_channel() {
        let mut ctc = Ctc::new(0x80);
        ctc.io_write(0x80, 0b1000_0101);
        ctc.io_write(0x80, 0x01);
        ctc.tick(16);
        assert!(ctc.irq_asserted());
        ctc.ack(0);
        assert!(!ctc.irq_asserted());
    }
}
