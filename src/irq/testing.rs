/*!
testing.rs - the `Z80Pins` boundary and its test double.

The embedded Z80 core is out of scope (spec §1: "vendored third-party
... libz80 ... treated as opaque"), so production code never implements
`Z80Pins` against a real core in this crate -- it wraps whichever
vendored core's fetch callback a machine assembly uses. This trait and
[`StubZ80Pins`] exist purely so the RETI-sniffing and interrupt-delivery
behaviour in [`super::Arbiter`] can be exercised without that core.
*/

/// Minimal fetch-stream boundary the RETI sniffer needs from a Z80 core:
/// one byte plus whether it was fetched with M1 asserted (spec §5, §9).
pub trait Z80Pins {
    fn fetch(&mut self) -> (u8, bool);
    fn accept_im2_vector(&mut self, vector: u8);
}

/// A scripted fetch stream: replays a fixed sequence of `(byte, m1)`
/// pairs, then returns NOP/no-M1 forever. Records accepted vectors so
/// tests can assert on delivery.
pub struct StubZ80Pins {
    script: Vec<(u8, bool)>,
    pos: usize,
    pub accepted_vectors: Vec<u8>,
}

impl StubZ80Pins {
    pub fn new(script: Vec<(u8, bool)>) -> Self {
        Self {
            script,
            pos: 0,
            accepted_vectors: Vec::new(),
        }
    }
}

impl Z80Pins for StubZ80Pins {
    fn fetch(&mut self) -> (u8, bool) {
        let item = self.script.get(self.pos).copied().unwrap_or((0x00, false));
        self.pos += 1;
        item
    }

    fn accept_im2_vector(&mut self, vector: u8) {
        self.accepted_vectors.push(vector);
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Arbiter, SourceId};
    use super::*;

    #[test]
    fn stub_replays_the_reti_byte_pair_for_the_sniffer() {
        let mut pins = StubZ80Pins::new(vec![(0xED, true), (0x4D, true)]);
        let mut arb = Arbiter::new();
        let vec = arb.raise(SourceId::SioA, 0x55);
        assert_eq!(vec, Some(0x55));
        pins.accept_im2_vector(vec.unwrap());

        let (b1, m1_1) = pins.fetch();
        arb.observe_fetch(b1, m1_1);
        let (b2, m1_2) = pins.fetch();
        arb.observe_fetch(b2, m1_2);

        assert!(arb.live_irq().is_none());
        assert_eq!(pins.accepted_vectors, vec![0x55]);
    }
}
