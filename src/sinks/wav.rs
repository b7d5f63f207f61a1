//! WAV file output.

use super::{BitDepth, FrameAligner, SampleSink, check_channels};
use crate::core::Frame;
use crate::error::SinkError;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

/// Buffers a whole run in memory and encodes it as a WAV container on
/// [`finish`](SampleSink::finish).
///
/// The writer only needs `Write + Seek`, so tests can encode into a
/// `Cursor<Vec<u8>>` and read it back with `hound::WavReader`.
pub struct WavSink<W: Write + Seek> {
    writer: W,
    spec: hound::WavSpec,
    depth: BitDepth,
    aligner: FrameAligner,
    /// Interleaved, aligned samples waiting for encoding
    buffer: Vec<f64>,
    finished: bool,
}

impl WavSink<BufWriter<File>> {
    /// Creates `path` (truncating it) and returns a sink that writes there.
    pub fn create<P: AsRef<Path>>(
        path: P,
        channels: u16,
        sample_rate: u32,
        depth: BitDepth,
    ) -> Result<Self, SinkError> {
        let file = File::create(path.as_ref())?;
        info!("writing WAV to {}", path.as_ref().display());
        Ok(Self::new(BufWriter::new(file), channels, sample_rate, depth))
    }
}

impl<W: Write + Seek> WavSink<W> {
    pub fn new(writer: W, channels: u16, sample_rate: u32, depth: BitDepth) -> Self {
        Self {
            writer,
            spec: depth.wav_spec(channels, sample_rate),
            depth,
            aligner: FrameAligner::new(channels as usize),
            buffer: Vec::new(),
            finished: false,
        }
    }

    pub fn spec(&self) -> hound::WavSpec {
        self.spec
    }

    /// Complete rows buffered so far.
    pub fn buffered_frames(&self) -> usize {
        self.buffer.len() / self.spec.channels.max(1) as usize
    }

    /// Returns the underlying writer. Call after `finish`.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn encode(&mut self) -> Result<(), SinkError> {
        let mut wav = hound::WavWriter::new(&mut self.writer, self.spec)?;
        match self.depth {
            BitDepth::Float32 => {
                for &sample in &self.buffer {
                    wav.write_sample(sample as f32)?;
                }
            }
            BitDepth::Int16 => {
                for &sample in &self.buffer {
                    wav.write_sample(self.depth.quantize(sample) as i16)?;
                }
            }
            BitDepth::Int24 => {
                for &sample in &self.buffer {
                    wav.write_sample(self.depth.quantize(sample))?;
                }
            }
        }
        wav.finalize()?;
        Ok(())
    }
}

impl<W: Write + Seek> SampleSink for WavSink<W> {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), SinkError> {
        if self.finished {
            return Err(SinkError::Finished);
        }
        check_channels(self.aligner.channels(), frame)?;
        self.aligner.push(frame, &mut self.buffer);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        if self.finished {
            return Ok(());
        }
        self.aligner.flush(&mut self.buffer);
        self.encode()?;
        self.writer.flush()?;
        self.finished = true;
        info!(
            "encoded {} frames ({}-bit, {} ch, {} Hz)",
            self.buffered_frames(),
            self.spec.bits_per_sample,
            self.spec.channels,
            self.spec.sample_rate
        );
        Ok(())
    }
}
