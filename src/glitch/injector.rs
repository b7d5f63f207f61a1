//! The idle/bursting state machine that corrupts samples.

use super::config::GlitchKind;
use super::scheduler::GlitchScheduler;
use log::debug;
use rand::Rng;
use rand::rngs::StdRng;

/// Where the injector is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlitchState {
    /// Passing samples through; `countdown` clean samples remain before the
    /// next burst
    Idle { countdown: u64 },
    /// Corrupting samples; `remaining` affected samples are left in the burst
    Bursting { remaining: usize },
}

impl GlitchState {
    pub fn samples_until_next_event(&self) -> u64 {
        match *self {
            GlitchState::Idle { countdown } => countdown,
            GlitchState::Bursting { .. } => 0,
        }
    }

    pub fn samples_remaining_in_burst(&self) -> usize {
        match *self {
            GlitchState::Idle { .. } => 0,
            GlitchState::Bursting { remaining } => remaining,
        }
    }

    pub fn is_bursting(&self) -> bool {
        matches!(self, GlitchState::Bursting { .. })
    }
}

/// Applies glitch bursts to a stream of raw samples, one tick at a time.
///
/// The injector starts idle with a countdown from its scheduler. When the
/// countdown reaches zero the same tick becomes the first sample of a burst of
/// `burst_length` samples; once the burst is spent the scheduler is asked for
/// the next gap.
#[derive(Debug, Clone)]
pub struct GlitchInjector<R: Rng = StdRng> {
    kind: GlitchKind,
    burst_length: usize,
    scheduler: GlitchScheduler<R>,
    state: GlitchState,
    ticks: u64,
}

impl<R: Rng> GlitchInjector<R> {
    /// Creates an injector and draws the first idle gap.
    ///
    /// `burst_length` must be at least 1; [`GlitchConfig`](super::GlitchConfig)
    /// guarantees it.
    pub fn new(kind: GlitchKind, burst_length: usize, mut scheduler: GlitchScheduler<R>) -> Self {
        let countdown = scheduler.next_event_offset();
        Self {
            kind,
            burst_length,
            scheduler,
            state: GlitchState::Idle { countdown },
            ticks: 0,
        }
    }

    pub fn kind(&self) -> GlitchKind {
        self.kind
    }

    pub fn state(&self) -> GlitchState {
        self.state
    }

    /// Advances one tick and returns the effect to apply on it, or `None` if
    /// the tick passes through clean.
    ///
    /// This is the single transition function of the state machine. Callers
    /// that share one schedule across channels call it once per frame and
    /// apply the effect to every channel.
    pub fn advance(&mut self) -> Option<GlitchKind> {
        let tick = self.ticks;
        self.ticks += 1;

        let remaining = match self.state {
            GlitchState::Idle { countdown } if countdown > 0 => {
                self.state = GlitchState::Idle {
                    countdown: countdown - 1,
                };
                return None;
            }
            GlitchState::Idle { .. } => {
                debug!(
                    "{} burst of {} samples starts at tick {tick}",
                    self.kind.name(),
                    self.burst_length
                );
                self.burst_length
            }
            GlitchState::Bursting { remaining } => remaining,
        };

        let remaining = remaining.saturating_sub(1);
        self.state = if remaining == 0 {
            let countdown = self.scheduler.next_event_offset();
            debug!("burst ended at tick {tick}, next in {countdown} samples");
            GlitchState::Idle { countdown }
        } else {
            GlitchState::Bursting { remaining }
        };

        Some(self.kind)
    }

    /// Advances one tick and returns the sample to emit for `raw`.
    ///
    /// `None` means the sample is skipped on this tick.
    pub fn process(&mut self, raw: f64) -> Option<f64> {
        match self.advance() {
            Some(kind) => kind.apply(raw),
            None => Some(raw),
        }
    }
}
