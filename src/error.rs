//! Error types for ConvLSTM construction, shape validation and persistence.

use burn::record::RecorderError;
use thiserror::Error;

/// Errors reported by the checked construction and forward paths.
///
/// The unchecked `forward` methods do not return this type: like any Burn
/// module they panic on dimension mismatches.
#[derive(Debug, Error)]
pub enum ConvLstmError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        context: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Input sequence is empty (time dimension is 0)")]
    EmptySequence,

    #[error("Expected {expected} layer states, got {actual}")]
    StateCount { expected: usize, actual: usize },

    #[error("Record error: {0}")]
    Record(#[from] RecorderError),
}

pub type Result<T> = std::result::Result<T, ConvLstmError>;
