/*!
irq - Z80-family IM2 daisy-chain interrupt arbiter (spec §4.4, §5, §9).

The Z80 core itself is an opaque embedded library per spec §1 ("vendored
third-party ... treated as opaque"), so this module never touches Z80
registers directly. It models exactly the two things the spec asks of
*this* layer: the daisy-chain arbitration (`Arbiter`) and the RETI
sniffer that watches the fetch stream for `0xED 0x4D` with M1 asserted on
both bytes (spec §5, §9 "RETI detection by instruction sniffing").

[`Z80Pins`] is the minimal boundary the sniffer needs from the embedded
core (the fetched byte plus its M1 state); production wiring wraps the
vendored core's bus callback, tests use [`testing::StubZ80Pins`].
*/

pub mod testing;

/// One daisy-chain interrupt source (spec §3 "Interrupt source").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptSource {
    pub id: SourceId,
    pub priority_rank: u8,
    pub pending: bool,
    pub enabled: bool,
    pub vector: u8,
}

/// Daisy-chain order per spec §4.4: SIO-A > SIO-B > CTC0..3 > PIO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    SioA,
    SioB,
    Ctc0,
    Ctc1,
    Ctc2,
    Ctc3,
    Pio,
}

impl SourceId {
    /// Lower is higher priority, matching the hardware daisy-chain order.
    pub fn chain_rank(self) -> u8 {
        match self {
            SourceId::SioA => 0,
            SourceId::SioB => 1,
            SourceId::Ctc0 => 2,
            SourceId::Ctc1 => 3,
            SourceId::Ctc2 => 4,
            SourceId::Ctc3 => 5,
            SourceId::Pio => 6,
        }
    }
}

const CHAIN: [SourceId; 7] = [
    SourceId::SioA,
    SourceId::SioB,
    SourceId::Ctc0,
    SourceId::Ctc1,
    SourceId::Ctc2,
    SourceId::Ctc3,
    SourceId::Pio,
];

/// RETI sniffer state machine (spec §5): the two RETI bytes must be
/// consecutive fetches, each with M1 asserted; any intervening fetch
/// resets the matcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum RetiMatch {
    #[default]
    Idle,
    SawEd,
}

pub struct Arbiter {
    sources: [InterruptSource; 7],
    live_irq: Option<SourceId>,
    global_enable: bool,
    recalc: bool,
    reti_matcher: RetiMatch,
}

impl Default for Arbiter {
    fn default() -> Self {
        Self::new()
    }
}

impl Arbiter {
    pub fn new() -> Self {
        let sources = CHAIN.map(|id| InterruptSource {
            id,
            priority_rank: id.chain_rank(),
            pending: false,
            enabled: true,
            vector: 0,
        });
        Self {
            sources,
            live_irq: None,
            global_enable: true,
            recalc: false,
            reti_matcher: RetiMatch::Idle,
        }
    }

    pub fn set_global_enable(&mut self, enable: bool) {
        self.global_enable = enable;
    }

    /// Enabling a source may make an already-pending interrupt eligible;
    /// disabling it only drops it from consideration, it does not clear
    /// the pending flag (spec §4.4: "a disabled source is skipped, not
    /// suppressed permanently").
    pub fn set_enabled(&mut self, id: SourceId, enabled: bool) {
        self.source_mut(id).enabled = enabled;
        if enabled {
            self.recalc = true;
        }
    }

    pub fn live_irq(&self) -> Option<SourceId> {
        self.live_irq
    }

    fn source_mut(&mut self, id: SourceId) -> &mut InterruptSource {
        self.sources
            .iter_mut()
            .find(|s| s.id == id)
            .expect("every SourceId has a chain slot")
    }

    /// Mark a source pending without running arbitration. Exposed so two
    /// sources that go pending "simultaneously" (spec §8 scenario 5) can
    /// both be latched before a single arbitration pass decides the
    /// winner; ordinary peripheral code should use [`Arbiter::raise`].
    pub fn mark_pending(&mut self, id: SourceId, vector: u8) {
        let s = self.source_mut(id);
        s.pending = true;
        s.vector = vector;
        self.recalc = true;
    }

    /// A peripheral's condition went from clear to set under an enabled
    /// mask (spec §4.4 step 1). If no source is currently live and the
    /// global enable allows it, elects the highest-priority pending
    /// source and returns its vector.
    pub fn raise(&mut self, id: SourceId, vector: u8) -> Option<u8> {
        {
            let s = self.source_mut(id);
            s.pending = true;
            s.vector = vector;
        }
        if self.live_irq.is_none() {
            let elected = self.arbitrate();
            if elected.is_none() {
                // Nothing eligible right now (e.g. the only pending
                // source is disabled); leave a recalc marker so a later
                // re-enable or drive_recalc() can still deliver it.
                self.recalc = true;
            }
            elected
        } else {
            self.recalc = true;
            None
        }
    }

    /// Elect the highest-priority enabled+pending source with no current
    /// live IRQ, recording it as live and returning its vector.
    fn arbitrate(&mut self) -> Option<u8> {
        if !self.global_enable || self.live_irq.is_some() {
            return None;
        }
        let elected = self
            .sources
            .iter()
            .filter(|s| s.pending && s.enabled)
            .min_by_key(|s| s.priority_rank)
            .copied()?;
        self.live_irq = Some(elected.id);
        self.recalc = false;
        Some(elected.vector)
    }

    /// Consume the "recalc" flag set by a peripheral that changed pending
    /// state while no IRQ was live (spec §4.4 step 4); the outer loop
    /// calls this once per cycle slice.
    pub fn drive_recalc(&mut self) -> Option<u8> {
        if self.recalc {
            self.arbitrate()
        } else {
            None
        }
    }

    /// Feed one fetched byte plus its M1 state into the RETI sniffer. When
    /// the full `0xED 0x4D` sequence is seen with both fetches carrying
    /// M1, the live source's ack callback fires, `live_irq` clears, and
    /// arbitration re-runs (spec §4.4 step 3, §5).
    pub fn observe_fetch(&mut self, byte: u8, m1: bool) -> Option<u8> {
        if !m1 {
            self.reti_matcher = RetiMatch::Idle;
            return None;
        }
        self.reti_matcher = match (self.reti_matcher, byte) {
            (RetiMatch::Idle, 0xED) => RetiMatch::SawEd,
            (RetiMatch::SawEd, 0x4D) => {
                self.on_reti();
                RetiMatch::Idle
            }
            _ => RetiMatch::Idle,
        };
        self.drive_recalc()
    }

    fn on_reti(&mut self) {
        if let Some(id) = self.live_irq.take() {
            let s = self.source_mut(id);
            s.pending = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_sio_a_wins_then_ctc0_after_reti() {
        // Z80 IM2 chain (spec §8 scenario 5): SIO-A and CTC0 both pending
        // and enabled; SIO-A is delivered first (higher daisy-chain
        // priority). After RETI, CTC0 is delivered with vector low bits 000.
        let mut arb = Arbiter::new();
        arb.mark_pending(SourceId::Ctc0, 0b000_000);
        arb.mark_pending(SourceId::SioA, 0b1111_0000);
        let first = arb.drive_recalc();
        assert_eq!(first, Some(0b1111_0000));
        assert_eq!(arb.live_irq(), Some(SourceId::SioA));

        let during = arb.observe_fetch(0xED, true);
        assert_eq!(during, None, "first RETI byte alone delivers nothing");
        let after_reti = arb.observe_fetch(0x4D, true);
        assert_eq!(arb.live_irq(), Some(SourceId::Ctc0));
        assert_eq!(after_reti, Some(0b000_000));
    }

    #[test]
    fn reti_requires_m1_on_both_fetches() {
        let mut arb = Arbiter::new();
        arb.raise(SourceId::SioA, 0x10);
        arb.observe_fetch(0xED, true);
        let result = arb.observe_fetch(0x4D, false); // no M1: not RETI
        assert_eq!(result, None);
        assert_eq!(arb.live_irq(), Some(SourceId::SioA), "non-M1 fetch must not advance the chain");
    }

    #[test]
    fn intervening_fetch_resets_the_matcher() {
        let mut arb = Arbiter::new();
        arb.raise(SourceId::SioA, 0x10);
        arb.observe_fetch(0xED, true);
        arb.observe_fetch(0x00, true); // unrelated opcode byte
        let result = arb.observe_fetch(0x4D, true);
        assert_eq!(result, None, "matcher was reset by the intervening fetch");
        assert_eq!(arb.live_irq(), Some(SourceId::SioA));
    }

    #[test]
    fn single_source_round_trip_leaves_live_irq_empty() {
        let mut arb = Arbiter::new();
        let vec = arb.raise(SourceId::Pio, 0x42);
        assert_eq!(vec, Some(0x42));
        arb.observe_fetch(0xED, true);
        arb.observe_fetch(0x4D, true);
        assert!(arb.live_irq().is_none());
    }

    #[test]
    fn disabled_source_is_skipped_not_suppressed_permanently() {
        let mut arb = Arbiter::new();
        arb.set_enabled(SourceId::SioA, false);
        arb.raise(SourceId::SioA, 0x10);
        assert!(arb.live_irq().is_none(), "disabled source cannot become live");
        arb.set_enabled(SourceId::SioA, true);
        let vec = arb.drive_recalc();
        assert_eq!(vec, Some(0x10), "the still-pending source becomes live once re-enabled");
    }
}
