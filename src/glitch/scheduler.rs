//! Decides how many clean samples pass before the next burst.

use super::config::{IntervalPolicy, seconds_to_samples};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces the idle gap, in samples, before each glitch burst.
///
/// The random source is owned by the scheduler and only consulted for
/// `IntervalPolicy::Random`, so fixed schedules are fully deterministic and
/// random schedules are reproducible from a seed.
#[derive(Debug, Clone)]
pub struct GlitchScheduler<R: Rng = StdRng> {
    policy: IntervalPolicy,
    sample_rate: u32,
    rng: R,
}

impl GlitchScheduler<StdRng> {
    /// Creates a scheduler seeded from system entropy.
    ///
    /// The policy is assumed valid for `sample_rate`
    /// (see [`IntervalPolicy::validate_for`]).
    pub fn new(policy: IntervalPolicy, sample_rate: u32) -> Self {
        Self::with_rng(policy, sample_rate, StdRng::from_entropy())
    }

    /// Creates a scheduler with a fixed seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use sinegen::{GlitchScheduler, IntervalPolicy};
    ///
    /// let policy = IntervalPolicy::random(0.5, 2.0);
    /// let mut a = GlitchScheduler::seeded(policy, 48000, 7);
    /// let mut b = GlitchScheduler::seeded(policy, 48000, 7);
    /// assert_eq!(a.next_event_offset(), b.next_event_offset());
    /// ```
    pub fn seeded(policy: IntervalPolicy, sample_rate: u32, seed: u64) -> Self {
        Self::with_rng(policy, sample_rate, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> GlitchScheduler<R> {
    /// Creates a scheduler with a caller-provided random source.
    pub fn with_rng(policy: IntervalPolicy, sample_rate: u32, rng: R) -> Self {
        Self {
            policy,
            sample_rate,
            rng,
        }
    }

    /// Number of clean samples before the next burst starts.
    pub fn next_event_offset(&mut self) -> u64 {
        match self.policy {
            IntervalPolicy::Fixed { seconds } => seconds_to_samples(seconds, self.sample_rate),
            IntervalPolicy::Random {
                min_seconds,
                max_seconds,
            } => {
                let seconds = if min_seconds < max_seconds {
                    self.rng.gen_range(min_seconds..=max_seconds)
                } else {
                    min_seconds
                };
                seconds_to_samples(seconds, self.sample_rate)
            }
        }
    }

    pub fn policy(&self) -> IntervalPolicy {
        self.policy
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
