//! Command-line options and their translation into a validated run.

use clap::{Parser, ValueEnum};
use log::warn;
use sinegen::{
    BitDepth, ConfigError, GlitchConfig, GlitchKind, GlitchSync, IntervalPolicy, StreamRequest,
};
use std::path::PathBuf;

/// Seconds written by the file modes when no duration is given.
const DEFAULT_FILE_SECONDS: f64 = 10.0;

/// Where the generated samples go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// WAV file
    Wav,
    /// Headerless little-endian PCM
    Bin,
    /// Default audio output device
    Stream,
}

impl OutputMode {
    fn extension(self) -> &'static str {
        match self {
            OutputMode::Wav => "wav",
            OutputMode::Bin => "bin",
            OutputMode::Stream => "",
        }
    }
}

/// Generate sine waves as audio streams or files, with optional glitch effects
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Examples:
  sinegen                              Play 440Hz sine wave
  sinegen -f 1000 -v 0.5               Play 1kHz at 50% volume
  sinegen -f 440 880                   Play stereo (440Hz left, 880Hz right)
  sinegen -m wav -d 5                  Save 5 second WAV file
  sinegen --dropout 50                 Play with dropout glitches (50 samples)
  sinegen --skip --random-interval     Play with randomized skip glitches")]
pub struct Args {
    /// Sine wave frequencies in Hz, one per channel
    #[arg(short, long, num_args = 1.., default_values_t = [440.0], value_name = "HZ")]
    pub frequencies: Vec<f64>,

    /// Audio volume level 0.0-1.0
    #[arg(short, long, default_value_t = 0.8, value_name = "LEVEL")]
    pub volume: f64,

    /// Audio sample rate in Hz
    #[arg(short = 'r', long, alias = "sample_rate", default_value_t = 48000, value_name = "HZ")]
    pub sample_rate: u32,

    /// Number of channels; the frequency list wins when the two disagree
    #[arg(short, long, value_name = "N")]
    pub channels: Option<u16>,

    /// Bit depth for file output: 16, 24 or 32 (float)
    #[arg(short, long, default_value_t = 32, value_name = "BITS")]
    pub bitdepth: u16,

    /// Output mode
    #[arg(short, long, value_enum, default_value_t = OutputMode::Stream)]
    pub mode: OutputMode,

    /// Output file for wav/bin modes [default: sine_wave_<freq>[_glitchy].<ext>]
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Duration in seconds [default: 10 for files, unbounded for stream]
    #[arg(short, long, value_name = "SEC")]
    pub duration: Option<f64>,

    /// Enable glitches (dropout of 100 samples unless a kind is given)
    #[arg(short, long)]
    pub glitch: bool,

    /// Insert silence dropouts
    #[arg(long, num_args = 0..=1, default_missing_value = "100", value_name = "SAMPLES", group = "glitch_kind")]
    pub dropout: Option<usize>,

    /// Skip audio samples
    #[arg(long, num_args = 0..=1, default_missing_value = "10", value_name = "SAMPLES", group = "glitch_kind")]
    pub skip: Option<usize>,

    /// Insert full-scale clicks
    #[arg(long, num_args = 0..=1, default_missing_value = "5", value_name = "SAMPLES", group = "glitch_kind")]
    pub fullscale: Option<usize>,

    /// Fixed gap between glitch bursts in seconds
    #[arg(long, default_value_t = IntervalPolicy::DEFAULT_SECONDS, value_name = "SEC")]
    pub interval: f64,

    /// Randomize glitch intervals for more realistic artifacts
    #[arg(long)]
    pub random_interval: bool,

    /// Range for random glitch intervals in seconds
    #[arg(
        long,
        num_args = 2,
        value_names = ["MIN", "MAX"],
        default_values_t = [IntervalPolicy::DEFAULT_RANDOM_RANGE.0, IntervalPolicy::DEFAULT_RANDOM_RANGE.1]
    )]
    pub interval_range: Vec<f64>,

    /// Give every channel its own glitch schedule
    #[arg(long)]
    pub independent_glitches: bool,

    /// Seed for random glitch intervals
    #[arg(long)]
    pub seed: Option<u64>,
}

/// A validated run: what to generate and where to put it.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub request: StreamRequest,
    pub mode: OutputMode,
    pub depth: BitDepth,
    /// Target file for `wav` and `bin`; `None` for `stream`
    pub output: Option<PathBuf>,
}

impl Args {
    /// Validates the options and builds the run.
    pub fn into_run(self) -> Result<RunConfig, ConfigError> {
        let depth = BitDepth::from_bits(self.bitdepth)?;
        let frequencies = self.channel_frequencies()?;

        let mut request = StreamRequest::new(self.sample_rate, &frequencies, self.volume)?;

        let duration = match (self.duration, self.mode) {
            (Some(seconds), _) => Some(seconds),
            (None, OutputMode::Stream) => None,
            (None, _) => Some(DEFAULT_FILE_SECONDS),
        };
        if let Some(seconds) = duration {
            request = request.with_duration_secs(seconds)?;
        }

        if let Some(glitch) = self.glitch_config()? {
            request = request.with_glitch(glitch)?;
        }
        if let Some(seed) = self.seed {
            request = request.with_seed(seed);
        }

        let output = match self.mode {
            OutputMode::Stream => None,
            mode => Some(self.output.clone().unwrap_or_else(|| {
                default_file_name(frequencies[0], request.glitch().is_some(), mode)
            })),
        };

        Ok(RunConfig {
            request,
            mode: self.mode,
            depth,
            output,
        })
    }

    /// One channel per frequency. A conflicting `--channels` is overridden.
    fn channel_frequencies(&self) -> Result<Vec<f64>, ConfigError> {
        match (self.channels, self.frequencies.as_slice()) {
            (Some(0), _) | (_, []) => Err(ConfigError::NoChannels),
            (Some(n), given) if n as usize != given.len() => {
                warn!(
                    "{n} channels requested but {} frequencies given; using {} channels",
                    given.len(),
                    given.len()
                );
                Ok(given.to_vec())
            }
            (_, given) => Ok(given.to_vec()),
        }
    }

    fn glitch_config(&self) -> Result<Option<GlitchConfig>, ConfigError> {
        let (kind, burst_length) = if let Some(n) = self.dropout {
            (GlitchKind::Dropout, n)
        } else if let Some(n) = self.skip {
            (GlitchKind::Skip, n)
        } else if let Some(n) = self.fullscale {
            (GlitchKind::Fullscale, n)
        } else if self.glitch {
            (GlitchKind::Dropout, GlitchKind::Dropout.default_burst_length())
        } else {
            return Ok(None);
        };

        let interval = if self.random_interval {
            IntervalPolicy::random(self.interval_range[0], self.interval_range[1])
        } else {
            IntervalPolicy::fixed(self.interval)
        };
        let sync = if self.independent_glitches {
            GlitchSync::Independent
        } else {
            GlitchSync::Shared
        };

        Ok(Some(
            GlitchConfig::new(kind, burst_length, interval)?.with_sync(sync),
        ))
    }
}

fn default_file_name(frequency: f64, glitchy: bool, mode: OutputMode) -> PathBuf {
    let suffix = if glitchy { "_glitchy" } else { "" };
    PathBuf::from(format!(
        "sine_wave_{}{suffix}.{}",
        frequency as u64,
        mode.extension()
    ))
}
