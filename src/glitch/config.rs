//! Glitch kinds and their configuration.

use crate::error::ConfigError;

/// The artifact a burst applies to each affected sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlitchKind {
    /// Pass samples through untouched
    #[default]
    None,
    /// Replace samples with silence
    Dropout,
    /// Omit samples entirely, shortening the channel
    Skip,
    /// Clip samples to full scale, keeping their sign
    Fullscale,
}

impl GlitchKind {
    /// Applies this kind's effect to one raw sample.
    ///
    /// Returns `None` when the sample is dropped from the output (`Skip`).
    ///
    /// # Examples
    ///
    /// ```
    /// use sinegen::GlitchKind;
    ///
    /// assert_eq!(GlitchKind::Dropout.apply(0.7), Some(0.0));
    /// assert_eq!(GlitchKind::Skip.apply(0.7), None);
    /// assert_eq!(GlitchKind::Fullscale.apply(-0.2), Some(-1.0));
    /// assert_eq!(GlitchKind::Fullscale.apply(0.0), Some(1.0));
    /// ```
    pub fn apply(self, raw: f64) -> Option<f64> {
        match self {
            GlitchKind::None => Some(raw),
            GlitchKind::Dropout => Some(0.0),
            GlitchKind::Skip => None,
            GlitchKind::Fullscale => Some(if raw < 0.0 { -1.0 } else { 1.0 }),
        }
    }

    /// Burst length used when a kind is enabled without an explicit size.
    pub fn default_burst_length(self) -> usize {
        match self {
            GlitchKind::None => 0,
            GlitchKind::Dropout => 100,
            GlitchKind::Skip => 10,
            GlitchKind::Fullscale => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GlitchKind::None => "none",
            GlitchKind::Dropout => "dropout",
            GlitchKind::Skip => "skip",
            GlitchKind::Fullscale => "fullscale",
        }
    }
}

/// How long the injector idles between bursts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntervalPolicy {
    /// The same gap every time
    Fixed { seconds: f64 },
    /// A fresh gap drawn uniformly from `[min_seconds, max_seconds]` each time
    Random { min_seconds: f64, max_seconds: f64 },
}

impl IntervalPolicy {
    /// One burst per second.
    pub const DEFAULT_SECONDS: f64 = 1.0;
    /// Bounds used when random intervals are requested without a range.
    pub const DEFAULT_RANDOM_RANGE: (f64, f64) = (0.5, 2.0);

    pub fn fixed(seconds: f64) -> Self {
        IntervalPolicy::Fixed { seconds }
    }

    pub fn random(min_seconds: f64, max_seconds: f64) -> Self {
        IntervalPolicy::Random {
            min_seconds,
            max_seconds,
        }
    }

    /// Shortest and longest gap in seconds.
    pub fn bounds_seconds(&self) -> (f64, f64) {
        match *self {
            IntervalPolicy::Fixed { seconds } => (seconds, seconds),
            IntervalPolicy::Random {
                min_seconds,
                max_seconds,
            } => (min_seconds, max_seconds),
        }
    }

    /// Shortest and longest gap in samples at `sample_rate`.
    pub fn bounds_samples(&self, sample_rate: u32) -> (u64, u64) {
        let (min, max) = self.bounds_seconds();
        (
            seconds_to_samples(min, sample_rate),
            seconds_to_samples(max, sample_rate),
        )
    }

    /// Checks the bounds on their own, independent of any sample rate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (min, max) = self.bounds_seconds();
        for seconds in [min, max] {
            if !(seconds.is_finite() && seconds > 0.0) {
                return Err(ConfigError::NonPositiveInterval(seconds));
            }
        }
        if min > max {
            return Err(ConfigError::InvertedInterval { min, max });
        }
        Ok(())
    }

    /// Checks that every possible gap is at least one sample long.
    pub fn validate_for(&self, sample_rate: u32) -> Result<(), ConfigError> {
        self.validate()?;
        let (min_seconds, _) = self.bounds_seconds();
        if self.bounds_samples(sample_rate).0 == 0 {
            return Err(ConfigError::IntervalTooShort {
                seconds: min_seconds,
                sample_rate,
            });
        }
        Ok(())
    }
}

impl Default for IntervalPolicy {
    fn default() -> Self {
        IntervalPolicy::fixed(Self::DEFAULT_SECONDS)
    }
}

/// Whether channels share one burst schedule or each keep their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlitchSync {
    /// One schedule for the whole frame; bursts hit every channel together
    #[default]
    Shared,
    /// One schedule per channel.
    ///
    /// With `Skip` the channels lose different numbers of samples, so they
    /// drift apart for the rest of the run and sinks hold the difference
    /// in memory (see [`FrameAligner`](crate::sinks::FrameAligner)).
    Independent,
}

/// Everything needed to corrupt a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlitchConfig {
    kind: GlitchKind,
    burst_length: usize,
    interval: IntervalPolicy,
    sync: GlitchSync,
}

impl GlitchConfig {
    /// Creates a config with shared timing across channels.
    ///
    /// # Errors
    ///
    /// `ZeroBurstLength` if `burst_length` is 0, or the interval's own
    /// validation error.
    pub fn new(
        kind: GlitchKind,
        burst_length: usize,
        interval: IntervalPolicy,
    ) -> Result<Self, ConfigError> {
        if burst_length == 0 {
            return Err(ConfigError::ZeroBurstLength);
        }
        interval.validate()?;
        Ok(Self {
            kind,
            burst_length,
            interval,
            sync: GlitchSync::Shared,
        })
    }

    /// Creates a config with the kind's default burst length and a fixed
    /// one-second interval.
    pub fn with_defaults(kind: GlitchKind) -> Result<Self, ConfigError> {
        Self::new(kind, kind.default_burst_length(), IntervalPolicy::default())
    }

    pub fn with_sync(mut self, sync: GlitchSync) -> Self {
        self.sync = sync;
        self
    }

    pub fn kind(&self) -> GlitchKind {
        self.kind
    }

    pub fn burst_length(&self) -> usize {
        self.burst_length
    }

    pub fn interval(&self) -> IntervalPolicy {
        self.interval
    }

    pub fn sync(&self) -> GlitchSync {
        self.sync
    }

    /// True if the config can change any sample.
    pub fn is_active(&self) -> bool {
        self.kind != GlitchKind::None
    }
}

/// Converts seconds to the nearest whole sample count.
pub(crate) fn seconds_to_samples(seconds: f64, sample_rate: u32) -> u64 {
    (seconds * sample_rate as f64).round() as u64
}
