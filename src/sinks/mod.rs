//! Consumers of engine output.
//!
//! A run picks one [`SampleSink`] at startup and pumps frames into it with
//! [`run`]. The engine never knows which sink it feeds.
//!
//! - [`WavSink`] buffers the run and encodes a WAV file on finish
//! - [`RawSink`] writes headerless little-endian PCM as it goes
//! - `StreamSink` (feature `stream`) plays to the default output device

mod align;
mod format;
mod raw;
#[cfg(feature = "stream")]
mod stream;
mod wav;

pub use align::FrameAligner;
pub use format::BitDepth;
pub use raw::RawSink;
#[cfg(feature = "stream")]
pub use stream::StreamSink;
pub use wav::WavSink;

use crate::core::Frame;
use crate::error::SinkError;
use log::debug;

/// Anything that can accept a run's frames.
pub trait SampleSink {
    /// Accepts the next frame. May block (live output) until there is room.
    fn write_frame(&mut self, frame: &Frame) -> Result<(), SinkError>;

    /// Flushes buffered output. Called once after the last frame.
    fn finish(&mut self) -> Result<(), SinkError>;
}

impl<S: SampleSink + ?Sized> SampleSink for Box<S> {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), SinkError> {
        (**self).write_frame(frame)
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        (**self).finish()
    }
}

/// Feeds every frame into `sink`, then finishes it.
///
/// Returns the number of frames consumed. The first sink error stops the
/// pull; the frames source is not advanced again.
pub fn run<I, S>(frames: I, sink: &mut S) -> Result<u64, SinkError>
where
    I: IntoIterator<Item = Frame>,
    S: SampleSink + ?Sized,
{
    let mut count = 0;
    for frame in frames {
        sink.write_frame(&frame)?;
        count += 1;
    }
    sink.finish()?;
    debug!("sink finished after {count} frames");
    Ok(count)
}

/// Rejects frames whose width differs from the sink's channel count.
pub(crate) fn check_channels(expected: usize, frame: &Frame) -> Result<(), SinkError> {
    if frame.channels() != expected {
        return Err(SinkError::ChannelMismatch {
            expected,
            found: frame.channels(),
        });
    }
    Ok(())
}
