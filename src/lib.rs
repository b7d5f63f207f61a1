//! Sinegen - multi-channel sine synthesis with injectable glitches
//!
//! This library generates phase-continuous sine waves, optionally corrupts
//! them with dropout, skip or full-scale bursts, and hands the frames to a
//! live or file sink.

pub mod core;
pub mod engine;
pub mod error;
pub mod glitch;
pub mod request;
pub mod sinks;
pub mod synthesis;

// Re-export commonly used types at the crate root
pub use self::core::{Frame, Pitched, Signal};
pub use engine::{SignalEngine, StopHandle};
pub use error::{ConfigError, Error, Result, SinkError};
pub use glitch::{
    GlitchConfig, GlitchInjector, GlitchKind, GlitchScheduler, GlitchState, GlitchSync,
    IntervalPolicy,
};
pub use request::{ChannelSpec, StreamRequest};
pub use sinks::{BitDepth, FrameAligner, RawSink, SampleSink, WavSink};
pub use synthesis::{Oscillator, SineOscillator};

#[cfg(feature = "stream")]
pub use sinks::StreamSink;
