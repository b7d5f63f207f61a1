//! Audio synthesis components.
//!
//! Only the phase-continuous sine oscillator lives here; glitch injection is
//! applied after synthesis in [`crate::glitch`].

pub mod oscillators;

pub use oscillators::{Oscillator, SineOscillator};
