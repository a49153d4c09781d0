//! Error types for the sideband codec.

use thiserror::Error;

/// Broad classification of a [`CodecError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Out-of-range or malformed input, or an unsupported message family.
    Validation,
    /// Unknown command name or missing layout field.
    Lookup,
    /// Executor output lacks the raw response line.
    MissingResponse,
    /// Fewer response tokens than the family header requires.
    TruncatedResponse,
    /// Layout position outside the payload segment.
    ExtractionBounds,
    /// The transport executor itself failed.
    Transport,
}

/// Errors that can occur while encoding commands or decoding responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// An input field is out of range or malformed.
    #[error("invalid {field}: {reason}")]
    Validation {
        /// Name of the offending field.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// No catalog entry with this name.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A named field is not present.
    #[error("missing field: {0}")]
    MissingField(String),

    /// The executor output did not contain the response marker line.
    #[error("no '{marker}' line in executor output")]
    MissingResponse {
        /// Marker that was searched for.
        marker: String,
    },

    /// The response is shorter than its fixed header.
    #[error("response too short: expected at least {expected} tokens, got {actual}")]
    TruncatedResponse {
        /// Minimum token count for the family.
        expected: usize,
        /// Tokens actually received.
        actual: usize,
    },

    /// A layout entry points past the end of the payload.
    #[error("field '{field}' needs token {index} but payload has {len} tokens")]
    ExtractionBounds {
        /// Layout field name.
        field: String,
        /// First out-of-range token index.
        index: usize,
        /// Payload length in tokens.
        len: usize,
    },

    /// The executor could not run the command.
    #[error("transport error: {0}")]
    Transport(String),
}

impl CodecError {
    /// Create a validation error for a named field.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        CodecError::Transport(message.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::Validation { .. } => ErrorKind::Validation,
            CodecError::UnknownCommand(_) | CodecError::MissingField(_) => ErrorKind::Lookup,
            CodecError::MissingResponse { .. } => ErrorKind::MissingResponse,
            CodecError::TruncatedResponse { .. } => ErrorKind::TruncatedResponse,
            CodecError::ExtractionBounds { .. } => ErrorKind::ExtractionBounds,
            CodecError::Transport(_) => ErrorKind::Transport,
        }
    }
}

/// Result type alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
