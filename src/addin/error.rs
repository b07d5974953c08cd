//! Error types for the add-in listener.

use std::io;

use axum::http::StatusCode;
use thiserror::Error;

use crate::action::{Action, ErrorBody};

/// Failures reported by the host scripting API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// No document is open.
    #[error("No active design found")]
    NoActiveDesign,

    /// The active document is not a design (e.g. a drawing).
    #[error("Active product is not a design")]
    NotADesign,

    /// There is no viewport to capture.
    #[error("No active viewport found. Cannot take screenshot.")]
    NoActiveViewport,

    /// No parameter with the given name exists in the design.
    #[error("Parameter '{0}' not found")]
    ParameterNotFound(String),

    /// The host refused a value, e.g. an expression it cannot evaluate.
    #[error("{0}")]
    Rejected(String),

    /// A script raised an error.
    #[error("Code execution error: {0}")]
    Script(String),
}

/// Errors returned to the MCP server by the add-in.
#[derive(Debug, Error)]
pub enum AddinError {
    /// The caller sent input the action cannot accept.
    #[error("{0}")]
    InvalidUserInput(String),

    /// The host failed while performing the action.
    #[error("Error executing action '{action}': {message}")]
    Execution {
        /// Action being performed.
        action: Action,
        /// What went wrong.
        message: String,
    },

    /// The request body was not valid JSON.
    #[error("Invalid JSON format: {0}")]
    BadRequest(String),

    /// The listener could not bind its address.
    #[error("Failed to start add-in listener on {addr}: {source}")]
    Bind {
        /// Address that was requested.
        addr: String,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },

    /// Anything else that went wrong inside the add-in.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl AddinError {
    /// Wraps a host failure for `action`.
    #[must_use]
    pub fn execution(action: Action, message: impl Into<String>) -> Self {
        Self::Execution {
            action,
            message: message.into(),
        }
    }

    /// Returns the error category sent on the wire.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidUserInput(_) => "InvalidUserInput",
            Self::Execution { .. } => "FusionExecutionError",
            Self::BadRequest(_) => "BadRequest",
            Self::Bind { .. } => "ServerConnectionError",
            Self::Internal(_) => "InternalServerError",
        }
    }

    /// Returns the HTTP status used when answering with this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidUserInput(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Execution { .. } | Self::Bind { .. } | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Converts the error into its wire representation.
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody::new(self.error_type(), self.to_string())
    }
}
