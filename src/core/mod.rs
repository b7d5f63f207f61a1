//! Core sample-source types and traits.
//!
//! - `Signal` trait for anything that yields raw samples tick by tick
//! - `Pitched` trait for sources with a reconfigurable frequency
//! - `Frame` for one tick of multi-channel output

mod frame;
mod signal;

pub use frame::Frame;
pub use signal::{Pitched, Signal};
