#![forbid(unsafe_code)]

//! Error types for the runtime layer.
//!
//! User cancellation is never an error: dialogs and choosers that close
//! without a decision surface as `None` or [`ConfirmOutcome::Dismissed`].
//!
//! [`ConfirmOutcome::Dismissed`]: crate::modal::ConfirmOutcome::Dismissed

use std::path::PathBuf;

use thiserror::Error;

use crate::modal::RequestId;

/// Failure of a native bridge call.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The native side rejected the call.
    #[error("{message}")]
    Failed { command: String, message: String },

    /// The call succeeded but the response lacks required fields.
    #[error("invalid response from {command}: {reason}")]
    InvalidResponse { command: String, reason: String },

    /// Arguments could not be encoded for the call.
    #[error("could not encode arguments for {command}: {source}")]
    Serialize {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

impl BridgeError {
    #[must_use]
    pub fn failed(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            command: command.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            command: command.into(),
            reason: reason.into(),
        }
    }

    /// Command that produced the error.
    #[must_use]
    pub fn command(&self) -> &str {
        match self {
            Self::Failed { command, .. }
            | Self::InvalidResponse { command, .. }
            | Self::Serialize { command, .. } => command,
        }
    }
}

/// Failure of the durable key-value storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A UI response the modal coordinator could not apply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModalError {
    #[error("no modal request is active")]
    NoActiveRequest,

    #[error("modal request {responded} is stale; {active} is active")]
    Stale {
        responded: RequestId,
        active: RequestId,
    },

    #[error("modal request {id} is a {actual} request, not a {expected} request")]
    KindMismatch {
        id: RequestId,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Failure of a document workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Another workflow is still in flight.
    #[error("another document workflow is in progress")]
    Busy,

    /// A bridge call failed; the error modal has already been shown.
    #[error("{operation} failed: {source}")]
    Bridge {
        operation: &'static str,
        #[source]
        source: BridgeError,
    },
}

/// Configuration loading or validation failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {}", .0.join("; "))]
    Validation(Vec<String>),
}
