//! Error surface for the verification harness
//!
//! Every failure a scenario can hit maps to exactly one of these kinds.
//! Scenarios abort on the first one; nothing is retried or downgraded to a
//! warning, so a failing run always points at one offending query, row, or
//! record.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Malformed series name: '{text}'")]
    MalformedSeries { text: String },

    #[error("Malformed response row: '{line}'")]
    MalformedRow { line: String },

    #[error("No data received: expected {expected} records, stream was empty")]
    NoDataReceived { expected: usize },

    #[error("Unexpected record at row {row}: {reason}: {record}")]
    UnexpectedRecord {
        row: usize,
        record: String,
        reason: String,
    },

    #[error("Count mismatch: expected {expected} records, received {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Mismatch at index {index}: expected '{expected}', received '{actual}'")]
    PositionalMismatch {
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    #[error("Transport failed: {message}")]
    Transport { message: String },

    #[error("Deadline exceeded: {message}")]
    Timeout { message: String },
}

impl VerifyError {
    pub fn configuration(message: impl Into<String>) -> Self {
        VerifyError::Configuration {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        VerifyError::Transport {
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        VerifyError::Timeout {
            message: message.into(),
        }
    }
}

pub type VerifyResult<T> = Result<T, VerifyError>;
