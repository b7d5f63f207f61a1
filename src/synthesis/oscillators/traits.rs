//! Core trait definitions for oscillators.

use crate::core::{Pitched, Signal};

/// Oscillators are pitched signals driven by a phase accumulator.
///
/// The phase only moves when the oscillator produces a sample; nothing
/// resets it behind the caller's back.
pub trait Oscillator: Signal + Pitched {
    /// Current phase in radians, in [0, 2π).
    fn phase(&self) -> f64;
}
