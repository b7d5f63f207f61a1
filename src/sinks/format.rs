//! Sample encodings shared by the file sinks.

use crate::error::ConfigError;

/// Bit depth and sample format of encoded output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitDepth {
    /// Signed 16-bit integer
    Int16,
    /// Signed 24-bit integer
    Int24,
    /// 32-bit IEEE float
    #[default]
    Float32,
}

impl BitDepth {
    /// Maps 16, 24 or 32 bits to an encoding.
    pub fn from_bits(bits: u16) -> Result<Self, ConfigError> {
        match bits {
            16 => Ok(BitDepth::Int16),
            24 => Ok(BitDepth::Int24),
            32 => Ok(BitDepth::Float32),
            other => Err(ConfigError::UnsupportedBitDepth(other)),
        }
    }

    pub fn bits(self) -> u16 {
        match self {
            BitDepth::Int16 => 16,
            BitDepth::Int24 => 24,
            BitDepth::Float32 => 32,
        }
    }

    /// Bytes per encoded sample.
    pub fn bytes(self) -> usize {
        self.bits() as usize / 8
    }

    pub fn wav_spec(self, channels: u16, sample_rate: u32) -> hound::WavSpec {
        hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: self.bits(),
            sample_format: match self {
                BitDepth::Float32 => hound::SampleFormat::Float,
                BitDepth::Int16 | BitDepth::Int24 => hound::SampleFormat::Int,
            },
        }
    }

    /// Scales a sample to the integer range of this depth, rounding to
    /// nearest after clamping to [-1, 1]. Full scale maps to
    /// `2^(bits - 1) - 1`.
    pub fn quantize(self, sample: f64) -> i32 {
        let full_scale = ((1_i64 << (self.bits() - 1)) - 1) as f64;
        (sample.clamp(-1.0, 1.0) * full_scale).round() as i32
    }

    /// Appends one little-endian encoded sample to `out`.
    pub fn encode_le(self, sample: f64, out: &mut Vec<u8>) {
        match self {
            BitDepth::Int16 => out.extend_from_slice(&(self.quantize(sample) as i16).to_le_bytes()),
            BitDepth::Int24 => out.extend_from_slice(&self.quantize(sample).to_le_bytes()[..3]),
            BitDepth::Float32 => out.extend_from_slice(&(sample as f32).to_le_bytes()),
        }
    }
}
