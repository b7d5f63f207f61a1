//! Glitch scheduling and injection.
//!
//! - `GlitchKind`, `IntervalPolicy`, `GlitchSync` and `GlitchConfig` describe
//!   what to corrupt and how often
//! - `GlitchScheduler` turns an interval policy into sample-count gaps
//! - `GlitchInjector` is the idle/bursting state machine applied per tick

mod config;
mod injector;
mod scheduler;

pub use config::{GlitchConfig, GlitchKind, GlitchSync, IntervalPolicy};
pub use injector::{GlitchInjector, GlitchState};
pub use scheduler::GlitchScheduler;
