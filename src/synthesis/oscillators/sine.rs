//! Sine wave oscillator implementation.

use super::Oscillator;
use crate::core::{Pitched, Signal};
use crate::error::ConfigError;
use crate::request::ChannelSpec;
use std::f64::consts::TAU;

/// A phase-continuous sine oscillator with a fixed output volume.
///
/// The phase advances exactly once per call to `next_sample()` whatever the
/// caller does with the returned value, so a channel that is silenced or
/// skipped for a while resumes in step with the undisturbed wave.
#[derive(Debug, Clone)]
pub struct SineOscillator {
    /// Current phase in radians, in [0, 2π)
    phase: f64,
    /// Phase increment per sample in radians (2π · frequency / sample_rate)
    phase_increment: f64,
    /// Sample rate in Hz
    sample_rate: u32,
    /// Output gain in [0, 1]
    volume: f64,
}

impl SineOscillator {
    /// Creates a new sine oscillator starting at phase 0.
    ///
    /// `frequency > 0` and `frequency <= sample_rate / 2` are the caller's
    /// responsibility; [`StreamRequest`](crate::StreamRequest) checks both.
    ///
    /// # Examples
    ///
    /// ```
    /// use sinegen::{Signal, SineOscillator};
    ///
    /// let mut osc = SineOscillator::new(440.0, 48000, 0.8);
    /// assert_eq!(osc.next_sample(), 0.0);
    /// ```
    pub fn new(frequency: f64, sample_rate: u32, volume: f64) -> Self {
        Self {
            phase: 0.0,
            phase_increment: TAU * frequency / sample_rate as f64,
            sample_rate,
            volume,
        }
    }

    /// Creates an oscillator for one channel of a request.
    pub fn from_spec(spec: &ChannelSpec, volume: f64) -> Self {
        Self::new(spec.frequency(), spec.sample_rate(), volume)
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Changes the output volume. Phase is untouched.
    pub fn set_volume(&mut self, volume: f64) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(ConfigError::VolumeOutOfRange(volume));
        }
        self.volume = volume;
        Ok(())
    }
}

impl Signal for SineOscillator {
    fn next_sample(&mut self) -> f64 {
        let sample = self.volume * self.phase.sin();

        // Wrap to keep the accumulator small over long runs
        self.phase += self.phase_increment;
        if self.phase >= TAU {
            self.phase %= TAU;
        }

        sample
    }
}

impl Pitched for SineOscillator {
    fn set_frequency(&mut self, frequency: f64) {
        self.phase_increment = TAU * frequency / self.sample_rate as f64;
    }

    fn frequency(&self) -> f64 {
        self.phase_increment * self.sample_rate as f64 / TAU
    }
}

impl Oscillator for SineOscillator {
    fn phase(&self) -> f64 {
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn test_oscillator_creation() {
        let osc = SineOscillator::new(440.0, 48000, 1.0);
        assert!(approx_eq!(f64, osc.frequency(), 440.0, epsilon = 1e-9));
        assert_eq!(osc.sample_rate(), 48000);
        assert_eq!(osc.phase(), 0.0);
    }

    #[test]
    fn test_first_sample_is_zero() {
        let mut osc = SineOscillator::new(440.0, 48000, 1.0);
        assert_eq!(osc.next_sample(), 0.0);
    }

    #[test]
    fn test_quarter_period_hits_volume() {
        // 12 kHz at 48 kHz: four samples per cycle
        let mut osc = SineOscillator::new(12000.0, 48000, 0.5);
        let samples: Vec<f64> = (0..4).map(|_| osc.next_sample()).collect();
        assert!(approx_eq!(f64, samples[1], 0.5, epsilon = 1e-12));
        assert!(approx_eq!(f64, samples[3], -0.5, epsilon = 1e-12));
    }

    #[test]
    fn test_sample_range() {
        let mut osc = SineOscillator::new(997.0, 44100, 0.8);
        for _ in 0..44100 {
            let sample = osc.next_sample();
            assert!((-0.8..=0.8).contains(&sample));
        }
    }

    #[test]
    fn test_phase_wrapping() {
        let mut osc = SineOscillator::new(1000.0, 44100, 1.0);
        for _ in 0..100000 {
            osc.next_sample();
        }
        assert!(osc.phase() >= 0.0 && osc.phase() < TAU);
    }

    #[test]
    fn test_set_frequency_keeps_phase() {
        let mut osc = SineOscillator::new(440.0, 48000, 1.0);
        for _ in 0..37 {
            osc.next_sample();
        }
        let phase = osc.phase();
        osc.set_frequency(880.0);
        assert_eq!(osc.phase(), phase);
        assert!(approx_eq!(f64, osc.frequency(), 880.0, epsilon = 1e-9));
    }

    #[test]
    fn test_set_volume_validates() {
        let mut osc = SineOscillator::new(440.0, 48000, 1.0);
        assert_eq!(
            osc.set_volume(1.5),
            Err(ConfigError::VolumeOutOfRange(1.5))
        );
        assert_eq!(osc.volume(), 1.0);
        osc.set_volume(0.25).unwrap();
        osc.next_sample();
        assert!(osc.next_sample().abs() <= 0.25);
    }

    #[test]
    fn test_process_buffer_matches_single_steps() {
        let mut a = SineOscillator::new(440.0, 48000, 1.0);
        let mut b = a.clone();
        let mut buffer = vec![0.0; 128];
        a.process(&mut buffer);
        for sample in buffer {
            assert_eq!(sample, b.next_sample());
        }
    }
}
