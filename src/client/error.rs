//! Errors raised while calling the Fusion add-in.
//!
//! Every variant maps to a stable error type string so the MCP client sees
//! the same categories regardless of where the failure happened.

use thiserror::Error;

use crate::action::ErrorBody;

/// Result type for add-in client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while calling an add-in action.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP client could not be constructed.
    #[error("Failed to initialise the HTTP client: {source}")]
    Setup {
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// Nothing is listening at the add-in address.
    #[error("Cannot connect to 'mcp-addin', Fusion Add-in. Instruct the user to run 'mcp-addin'.")]
    Connection {
        /// URL that was called.
        url: String,
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The add-in did not answer within the configured timeout.
    #[error(
        "Fusion took too long to respond. The operation may be complex or Fusion may be busy. \
         Break complex operations into smaller steps."
    )]
    Timeout {
        /// URL that was called.
        url: String,
    },

    /// Any other transport failure.
    #[error(
        "Network error while communicating with Fusion Add-in: {source}. Please ask the user \
         to check their network connection and ensure Fusion is accessible."
    )]
    Request {
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The add-in answered with something that is not the expected JSON.
    #[error(
        "Received invalid response from Fusion. This may indicate a compatibility issue. \
         Instruct the user to check 'Fusion MCP' is up to date."
    )]
    InvalidResponse {
        /// HTTP status of the response.
        status: u16,
        /// Raw body, for the logs.
        body: String,
    },

    /// The add-in reported that the action failed.
    #[error("{}", .0.message)]
    Action(ErrorBody),
}

impl ClientError {
    /// Returns the error category reported to the MCP client.
    #[must_use]
    pub fn error_type(&self) -> &str {
        match self {
            Self::Setup { .. } => "UnknownError",
            Self::Connection { .. } => "FusionServerConnectionError",
            Self::Timeout { .. } => "FusionServerTimeoutError",
            Self::Request { .. } => "FusionServerRequestError",
            Self::InvalidResponse { .. } => "FusionServerResponseError",
            Self::Action(body) => &body.error_type,
        }
    }

    /// Formats the error as `"<type>: <message>"` for tool output.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{}: {}", self.error_type(), self)
    }
}
