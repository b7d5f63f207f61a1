//! Core sample-source traits.
//!
//! This module provides the `Signal` trait implemented by everything that
//! yields raw samples one tick at a time, and the `Pitched` trait for sources
//! whose frequency can be reconfigured while running.

/// Common interface for all raw sample sources.
///
/// The trait provides two operations:
/// - Single sample generation via `next_sample()`
/// - Batch generation via `process()`
pub trait Signal {
    /// Generates the next sample and advances the source by one tick.
    ///
    /// # Returns
    ///
    /// A sample value, nominally between -1.0 and 1.0
    fn next_sample(&mut self) -> f64;

    /// Generates multiple samples into a buffer.
    ///
    /// Default implementation calls `next_sample()` for each element, so the
    /// source advances exactly `buffer.len()` ticks.
    ///
    /// # Arguments
    ///
    /// * `buffer` - Mutable slice to fill with samples
    fn process(&mut self, buffer: &mut [f64]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }
}

/// Minimal trait for anything with a controllable pitch.
///
/// # Examples
///
/// ```
/// use sinegen::{Pitched, SineOscillator};
///
/// let mut osc = SineOscillator::new(440.0, 48000, 1.0);
/// assert_eq!(osc.frequency(), 440.0);
///
/// osc.set_frequency(880.0);
/// assert_eq!(osc.frequency(), 880.0);
/// ```
pub trait Pitched {
    /// Sets the frequency of the signal in Hz.
    ///
    /// Implementations keep their current phase so a retune does not click.
    fn set_frequency(&mut self, freq: f64);

    /// Gets the current frequency of the signal in Hz.
    fn frequency(&self) -> f64;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter(f64);

    impl Signal for Counter {
        fn next_sample(&mut self) -> f64 {
            self.0 += 1.0;
            self.0
        }
    }

    #[test]
    fn test_default_process_advances_once_per_slot() {
        let mut counter = Counter(0.0);
        let mut buffer = [0.0; 4];
        counter.process(&mut buffer);
        assert_eq!(buffer, [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(counter.next_sample(), 5.0);
    }
}
