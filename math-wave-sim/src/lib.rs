//! Configuration, persistence and reporting for membrane simulations
//!
//! This crate wraps [`math_audio_wave`] for batch use:
//!
//! - JSON configuration of the membrane and its sources
//! - Output JSON summaries
//! - Saving and loading evaluated fields

mod config;
mod error;
mod output;
mod persistence;

pub use config::*;
pub use error::{Result, SimError};
pub use output::*;
pub use persistence::*;

/// Library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
