//! Error types for the loudness engine

use thiserror::Error;

/// Result type for loudness engine operations
pub type Result<T> = std::result::Result<T, LoudnessError>;

/// Errors that can occur while configuring or driving the engine
///
/// Numerical edge cases (silence, too few gated blocks) are never reported
/// here: they leave the affected metric at its previous value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoudnessError {
    /// Sample rate is zero, negative or not finite
    #[error("Invalid sample rate: {0} Hz (must be positive and finite)")]
    InvalidSampleRate(f64),

    /// Engine was configured without any logical input
    #[error("Invalid input count: {0} (must be at least 1)")]
    InvalidInputCount(usize),

    /// Snapshot interval is negative or not finite
    #[error("Invalid snapshot interval: {0} s (must be finite and >= 0)")]
    InvalidInterval(f64),

    /// Total duration hint is negative or not finite
    #[error("Invalid capacity: {0} s (must be finite and >= 0)")]
    InvalidCapacity(f64),

    /// Momentary or short-term hop interval does not resolve to at least one sample
    #[error("Invalid hop interval: {0} s (must be finite and positive)")]
    InvalidHopInterval(f64),

    /// Channel layout hint does not have one entry per input
    #[error("Channel layout has {actual} entries but {expected} inputs are configured")]
    ChannelCountMismatch { expected: usize, actual: usize },

    /// A channel layout entry is zero
    #[error("Invalid channel count: {0} (must be at least 1)")]
    InvalidChannelCount(usize),

    /// Host delivered more inputs than the engine was built for
    #[error("Received {received} inputs but only {configured} are configured")]
    TooManyInputs { configured: usize, received: usize },

    /// Channels within one input block do not share a length
    #[error("Input {input}: channel length {actual} differs from {expected}")]
    MismatchedChannelLengths {
        input: usize,
        expected: usize,
        actual: usize,
    },
}

impl LoudnessError {
    /// Whether the error was raised while validating construction parameters
    pub fn is_configuration(&self) -> bool {
        !matches!(
            self,
            Self::TooManyInputs { .. } | Self::MismatchedChannelLengths { .. }
        )
    }
}
