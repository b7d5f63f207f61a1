//! Headerless PCM output (`bin` mode).

use super::{BitDepth, FrameAligner, SampleSink, check_channels};
use crate::core::Frame;
use crate::error::SinkError;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes interleaved little-endian samples with no container, frame by
/// frame.
pub struct RawSink<W: Write> {
    writer: W,
    depth: BitDepth,
    aligner: FrameAligner,
    rows: Vec<f64>,
    bytes: Vec<u8>,
    written: u64,
}

impl RawSink<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(
        path: P,
        channels: u16,
        depth: BitDepth,
    ) -> Result<Self, SinkError> {
        let file = File::create(path.as_ref())?;
        info!("writing raw {}-bit PCM to {}", depth.bits(), path.as_ref().display());
        Ok(Self::new(BufWriter::new(file), channels, depth))
    }
}

impl<W: Write> RawSink<W> {
    pub fn new(writer: W, channels: u16, depth: BitDepth) -> Self {
        Self {
            writer,
            depth,
            aligner: FrameAligner::new(channels as usize),
            rows: Vec::new(),
            bytes: Vec::new(),
            written: 0,
        }
    }

    /// Bytes written to the underlying writer so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_rows(&mut self) -> Result<(), SinkError> {
        if self.rows.is_empty() {
            return Ok(());
        }
        self.bytes.clear();
        for &sample in &self.rows {
            self.depth.encode_le(sample, &mut self.bytes);
        }
        self.rows.clear();
        self.writer.write_all(&self.bytes)?;
        self.written += self.bytes.len() as u64;
        Ok(())
    }
}

impl<W: Write> SampleSink for RawSink<W> {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), SinkError> {
        check_channels(self.aligner.channels(), frame)?;
        self.aligner.push(frame, &mut self.rows);
        self.write_rows()
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.aligner.flush(&mut self.rows);
        self.write_rows()?;
        self.writer.flush()?;
        info!("wrote {} bytes of raw PCM", self.written);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interleaved_int16() {
        let mut sink = RawSink::new(Vec::new(), 2, BitDepth::Int16);
        sink.write_frame(&Frame::new(0, vec![Some(1.0), Some(0.0)])).unwrap();
        sink.write_frame(&Frame::new(1, vec![Some(-1.0), Some(1.0)])).unwrap();
        sink.finish().unwrap();
        assert_eq!(sink.bytes_written(), 8);
        assert_eq!(
            sink.into_inner(),
            vec![0xff, 0x7f, 0x00, 0x00, 0x01, 0x80, 0xff, 0x7f]
        );
    }

    #[test]
    fn test_skip_writes_nothing_for_the_tick() {
        let mut sink = RawSink::new(Vec::new(), 1, BitDepth::Float32);
        sink.write_frame(&Frame::new(0, vec![None])).unwrap();
        assert_eq!(sink.bytes_written(), 0);
        sink.write_frame(&Frame::new(1, vec![Some(0.5)])).unwrap();
        sink.finish().unwrap();
        assert_eq!(sink.into_inner(), 0.5_f32.to_le_bytes().to_vec());
    }
}
