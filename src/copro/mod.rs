/*!
copro - Z80 co-processor card dual-latch protocol (spec §4.5).

Two 16-bit latches connect host and coprocessor. Each latch's high byte
comes from the CPU address lines of the write, the low byte from the
data bus (spec §4.5), so [`write_master`]/[`write_slave`] take the
address and data byte separately rather than a pre-assembled word -- that
split is itself part of the observable protocol (a write with the wrong
address byte produces the wrong latch value, which is how real firmware
bugs on this card actually manifested).

The coprocessor's own Z80 core is out of scope (opaque, vendored per
spec §1); this module only owns the latch/bank/NMI bookkeeping and the
t-state budgeting, the same boundary [`crate::irq::testing::Z80Pins`]
draws for the IM2 arbiter.
*/

const CORESET: u16 = 0x0001;
const CONMI: u16 = 0x0002;
const COIRQ: u16 = 0x0004;

const MAINT: u16 = 0x0001;
const ROMEN: u16 = 0x0002;
const BANK_SHIFT: u16 = 11;
const BANK_MASK: u16 = 0x7 << BANK_SHIFT;

pub struct Coprocessor {
    master_latch: u16,
    slave_latch: u16,
    /// T-states executed per outer-loop tick (spec §4.5, default 37).
    pub t_state_budget: u32,
}

impl Default for Coprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Coprocessor {
    pub fn new() -> Self {
        Self {
            master_latch: 0,
            slave_latch: 0,
            t_state_budget: 37,
        }
    }

    /// Assemble and store a master-latch write: high byte from the
    /// address lines, low byte from the data bus (spec §4.5). Takes
    /// effect immediately.
    pub fn write_master(&mut self, addr_high: u8, data_low: u8) {
        self.master_latch = ((addr_high as u16) << 8) | data_low as u16;
    }

    pub fn write_slave(&mut self, addr_high: u8, data_low: u8) {
        self.slave_latch = ((addr_high as u16) << 8) | data_low as u16;
    }

    /// `CORESET` held reset while clear; going high releases reset.
    pub fn held_in_reset(&self) -> bool {
        self.master_latch & CORESET == 0
    }

    pub fn nmi_asserted(&self) -> bool {
        self.master_latch & CONMI == 0
    }

    /// `COIRQ` is asserted when clear (spec §4.5 active-low convention).
    pub fn irq_asserted(&self) -> bool {
        self.master_latch & COIRQ == 0
    }

    pub fn host_interrupt_pending(&self) -> bool {
        self.slave_latch & MAINT == 0
    }

    pub fn rom_enabled(&self) -> bool {
        self.slave_latch & ROMEN == 0
    }

    /// Selected RAM bank: bits [13:11] of the slave latch (spec §4.5).
    pub fn ram_bank(&self) -> u8 {
        ((self.slave_latch & BANK_MASK) >> BANK_SHIFT) as u8
    }

    /// Run one outer-loop tick's worth of coprocessor execution. The
    /// level-triggered NMI quirk is intentional (spec §4.5): every tick
    /// run with `CONMI` asserted fires NMI again, coarser than the real
    /// edge-triggered hardware. Returns the t-state budget actually
    /// consumed, which callers feed into their own cycle accounting; the
    /// coprocessor core itself is opaque and not modelled here.
    pub fn tick(&self) -> CoproTick {
        CoproTick {
            held_in_reset: self.held_in_reset(),
            nmi_fired: !self.held_in_reset() && self.nmi_asserted(),
            t_states: self.t_state_budget,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoproTick {
    pub held_in_reset: bool,
    pub nmi_fired: bool,
    pub t_states: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coreset_clear_holds_the_core_in_reset() {
        let c = Coprocessor::new();
        assert!(c.held_in_reset(), "master latch resets to all-clear, CORESET low");
    }

    #[test]
    fn coreset_high_releases_reset() {
        let mut c = Coprocessor::new();
        c.write_master(0x00, CORESET as u8);
        assert!(!c.held_in_reset());
    }

    #[test]
    fn nmi_is_level_triggered_and_refires_every_tick() {
        let mut c = Coprocessor::new();
        c.write_master(0x00, (CORESET) as u8); // release reset, NMI stays low (CONMI=0)
        assert!(c.tick().nmi_fired);
        assert!(c.tick().nmi_fired, "level-triggered: fires again without a fresh edge");
    }

    #[test]
    fn slave_latch_selects_one_of_eight_ram_banks() {
        let mut c = Coprocessor::new();
        // bits [13:11] of the assembled 16-bit latch fall in the high
        // (address) byte: bit3..bit5 of addr_high map to bit11..bit13.
        c.write_slave(0b0010_1000, 0x00); // bank = 0b101 = 5
        assert_eq!(c.ram_bank(), 0b101);
    }

    #[test]
    fn romen_clear_maps_eprom() {
        let mut c = Coprocessor::new();
        assert!(c.rom_enabled(), "ROMEN resets clear, EPROM mapped by default");
        c.write_slave(0x00, ROMEN as u8);
        assert!(!c.rom_enabled());
    }

    #[test]
    fn latch_assembly_uses_address_high_byte_and_data_low_byte() {
        let mut c = Coprocessor::new();
        c.write_master(0x12, 0x03);
        assert_eq!(c.master_latch, 0x1203);
    }
}
