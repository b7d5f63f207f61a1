//! Validated description of one generation run.

use crate::error::{ConfigError, MAX_SAMPLE_RATE, MIN_SAMPLE_RATE};
use crate::glitch::GlitchConfig;

/// Frequency and sample rate of one output channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSpec {
    frequency: f64,
    sample_rate: u32,
}

impl ChannelSpec {
    /// Creates a channel spec.
    ///
    /// # Errors
    ///
    /// Fails if the sample rate is outside the supported range, or if the
    /// frequency is not positive or exceeds the Nyquist limit.
    pub fn new(frequency: f64, sample_rate: u32) -> Result<Self, ConfigError> {
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate) {
            return Err(ConfigError::SampleRateOutOfRange(sample_rate));
        }
        if !(frequency.is_finite() && frequency > 0.0) {
            return Err(ConfigError::NonPositiveFrequency(frequency));
        }
        let nyquist = sample_rate as f64 / 2.0;
        if frequency > nyquist {
            return Err(ConfigError::AboveNyquist { frequency, nyquist });
        }
        Ok(Self {
            frequency,
            sample_rate,
        })
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Everything a [`SignalEngine`](crate::SignalEngine) needs for one run.
///
/// All validation happens while building the request, so an engine built
/// from it cannot fail.
///
/// # Examples
///
/// ```
/// use sinegen::{GlitchConfig, GlitchKind, IntervalPolicy, StreamRequest};
///
/// let glitch = GlitchConfig::new(GlitchKind::Dropout, 100, IntervalPolicy::fixed(1.0)).unwrap();
/// let request = StreamRequest::new(48000, &[440.0, 880.0], 0.8)
///     .unwrap()
///     .with_duration(96000)
///     .with_glitch(glitch)
///     .unwrap();
/// assert_eq!(request.channel_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRequest {
    channels: Vec<ChannelSpec>,
    volume: f64,
    duration: Option<u64>,
    glitch: Option<GlitchConfig>,
    seed: Option<u64>,
}

impl StreamRequest {
    /// Creates an unbounded, glitch-free request with one channel per
    /// frequency.
    pub fn new(sample_rate: u32, frequencies: &[f64], volume: f64) -> Result<Self, ConfigError> {
        let channels = frequencies
            .iter()
            .map(|&frequency| ChannelSpec::new(frequency, sample_rate))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_channels(channels, volume)
    }

    /// Creates a request from prepared channel specs.
    ///
    /// # Errors
    ///
    /// Fails on an empty or oversized channel list, on channels with
    /// different sample rates, or on a volume outside [0, 1].
    pub fn from_channels(channels: Vec<ChannelSpec>, volume: f64) -> Result<Self, ConfigError> {
        let Some(first) = channels.first() else {
            return Err(ConfigError::NoChannels);
        };
        if channels.len() > u16::MAX as usize {
            return Err(ConfigError::TooManyChannels(channels.len()));
        }
        if let Some(other) = channels.iter().find(|c| c.sample_rate != first.sample_rate) {
            return Err(ConfigError::MixedSampleRates {
                expected: first.sample_rate,
                found: other.sample_rate,
            });
        }
        if !(0.0..=1.0).contains(&volume) {
            return Err(ConfigError::VolumeOutOfRange(volume));
        }
        Ok(Self {
            channels,
            volume,
            duration: None,
            glitch: None,
            seed: None,
        })
    }

    /// Limits the run to `samples` ticks.
    pub fn with_duration(mut self, samples: u64) -> Self {
        self.duration = Some(samples);
        self
    }

    /// Limits the run to `seconds`, rounded to the nearest sample.
    ///
    /// # Errors
    ///
    /// `NonPositiveDuration` for zero, negative or non-finite values, and
    /// `DurationTooShort` if the duration rounds to zero samples.
    pub fn with_duration_secs(self, seconds: f64) -> Result<Self, ConfigError> {
        if !(seconds.is_finite() && seconds > 0.0) {
            return Err(ConfigError::NonPositiveDuration(seconds));
        }
        let sample_rate = self.sample_rate();
        let samples = (seconds * sample_rate as f64).round() as u64;
        if samples == 0 {
            return Err(ConfigError::DurationTooShort {
                seconds,
                sample_rate,
            });
        }
        Ok(self.with_duration(samples))
    }

    /// Enables glitch injection.
    ///
    /// # Errors
    ///
    /// `IntervalTooShort` if an interval rounds to zero samples at this
    /// request's sample rate.
    pub fn with_glitch(mut self, glitch: GlitchConfig) -> Result<Self, ConfigError> {
        glitch.interval().validate_for(self.sample_rate())?;
        self.glitch = Some(glitch);
        Ok(self)
    }

    /// Seeds the random interval source for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn channels(&self) -> &[ChannelSpec] {
        &self.channels
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.channels[0].sample_rate
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Run length in samples; `None` means unbounded.
    pub fn duration(&self) -> Option<u64> {
        self.duration
    }

    pub fn glitch(&self) -> Option<&GlitchConfig> {
        self.glitch.as_ref()
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}
