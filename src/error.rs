//! Error types for request validation and sample sinks.

use thiserror::Error;

/// Lowest sample rate a request may use, in Hz.
pub const MIN_SAMPLE_RATE: u32 = 8_000;
/// Highest sample rate a request may use, in Hz.
pub const MAX_SAMPLE_RATE: u32 = 192_000;

/// An invalid generation request. Raised before any sample is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error(
        "sample rate {0} Hz is outside the supported range ({MIN_SAMPLE_RATE}-{MAX_SAMPLE_RATE} Hz)"
    )]
    SampleRateOutOfRange(u32),
    #[error("frequency must be positive, got {0} Hz")]
    NonPositiveFrequency(f64),
    #[error("frequency {frequency} Hz exceeds the Nyquist limit ({nyquist} Hz)")]
    AboveNyquist { frequency: f64, nyquist: f64 },
    #[error("all channels must share one sample rate ({expected} Hz), found {found} Hz")]
    MixedSampleRates { expected: u32, found: u32 },
    #[error("volume must be between 0.0 and 1.0, got {0}")]
    VolumeOutOfRange(f64),
    #[error("at least one channel is required")]
    NoChannels,
    #[error("{0} channels requested, at most {max} are supported", max = u16::MAX)]
    TooManyChannels(usize),
    #[error("glitch burst length must be at least one sample")]
    ZeroBurstLength,
    #[error("glitch interval must be positive, got {0} s")]
    NonPositiveInterval(f64),
    #[error("glitch interval minimum {min} s is greater than maximum {max} s")]
    InvertedInterval { min: f64, max: f64 },
    #[error("glitch interval {seconds} s is shorter than one sample at {sample_rate} Hz")]
    IntervalTooShort { seconds: f64, sample_rate: u32 },
    #[error("bit depth must be 16, 24 or 32, got {0}")]
    UnsupportedBitDepth(u16),
    #[error("duration must be positive, got {0} s")]
    NonPositiveDuration(f64),
    #[error("duration {seconds} s is shorter than one sample at {sample_rate} Hz")]
    DurationTooShort { seconds: f64, sample_rate: u32 },
}

/// A sink could not accept or finalize output.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WAV encoding failed: {0}")]
    Wav(#[from] hound::Error),
    #[error("frame has {found} channels, sink was opened for {expected}")]
    ChannelMismatch { expected: usize, found: usize },
    #[error("sink already finished")]
    Finished,
    #[error("audio device disconnected")]
    Disconnected,
    #[cfg(feature = "stream")]
    #[error("no output device available")]
    NoDevice,
    #[cfg(feature = "stream")]
    #[error("audio device stopped consuming output")]
    Stalled,
    #[cfg(feature = "stream")]
    #[error("unsupported device sample format: {0}")]
    UnsupportedFormat(cpal::SampleFormat),
    #[cfg(feature = "stream")]
    #[error(transparent)]
    DeviceConfig(#[from] cpal::DefaultStreamConfigError),
    #[cfg(feature = "stream")]
    #[error(transparent)]
    BuildStream(#[from] cpal::BuildStreamError),
    #[cfg(feature = "stream")]
    #[error(transparent)]
    PlayStream(#[from] cpal::PlayStreamError),
}

/// Any failure surfaced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        assert_eq!(
            ConfigError::SampleRateOutOfRange(4000).to_string(),
            "sample rate 4000 Hz is outside the supported range (8000-192000 Hz)"
        );
        assert_eq!(
            ConfigError::InvertedInterval { min: 2.0, max: 1.0 }.to_string(),
            "glitch interval minimum 2 s is greater than maximum 1 s"
        );
    }

    #[test]
    fn test_umbrella_conversion() {
        let err: Error = ConfigError::NoChannels.into();
        assert!(matches!(err, Error::Config(ConfigError::NoChannels)));
        let err: Error = SinkError::Disconnected.into();
        assert_eq!(err.to_string(), "audio device disconnected");
    }
}
