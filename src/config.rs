#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Construction-time settings shared by every render call.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct SynthConfig {
    /// Sample rate in Hz.
    pub sample_rate: f32,
}

impl SynthConfig {
    pub fn with_sample_rate(sample_rate: f32) -> Self {
        Self { sample_rate }
    }
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
        }
    }
}
