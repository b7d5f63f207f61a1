//! One tick's worth of output across all channels.

/// A frame holds one sample slot per configured channel, all produced at the
/// same tick.
///
/// A slot is `None` when a skip glitch dropped that channel's sample on this
/// tick. Sinks that need rectangular data realign channels with
/// [`FrameAligner`](crate::sinks::FrameAligner).
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    tick: u64,
    samples: Vec<Option<f64>>,
}

impl Frame {
    /// Creates a frame for the given tick.
    pub fn new(tick: u64, samples: Vec<Option<f64>>) -> Self {
        Self { tick, samples }
    }

    /// Index of the sample tick that produced this frame, starting at 0.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Number of channel slots, including skipped ones.
    pub fn channels(&self) -> usize {
        self.samples.len()
    }

    /// The emitted sample for `channel`, or `None` if it was skipped or the
    /// channel does not exist.
    pub fn sample(&self, channel: usize) -> Option<f64> {
        self.samples.get(channel).copied().flatten()
    }

    /// All slots in channel order.
    pub fn samples(&self) -> &[Option<f64>] {
        &self.samples
    }

    /// True when every channel emitted a sample on this tick.
    pub fn is_complete(&self) -> bool {
        self.samples.iter().all(Option::is_some)
    }

    /// Iterates over `(channel, sample)` for the channels that emitted.
    pub fn emitted(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.samples
            .iter()
            .enumerate()
            .filter_map(|(channel, slot)| slot.map(|s| (channel, s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_slot_is_not_emitted() {
        let frame = Frame::new(7, vec![Some(0.5), None, Some(-0.25)]);
        assert_eq!(frame.tick(), 7);
        assert_eq!(frame.channels(), 3);
        assert!(!frame.is_complete());
        assert_eq!(frame.sample(1), None);
        assert_eq!(frame.sample(3), None);
        let emitted: Vec<_> = frame.emitted().collect();
        assert_eq!(emitted, vec![(0, 0.5), (2, -0.25)]);
    }
}
