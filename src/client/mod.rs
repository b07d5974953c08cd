//! HTTP client for the Fusion add-in.
//!
//! The MCP server never touches the host API itself. Each tool call becomes
//! one `POST http://<host>:<port>/<action>` to the add-in listener running
//! inside Fusion, and the add-in's [`ActionResponse`](crate::action::ActionResponse)
//! envelope is unwrapped here into either the action result or a
//! [`ClientError`].

mod error;

pub use error::{ClientError, ClientResult};

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::action::{
    Action, ErrorBody, ExecuteCodeParams, ScreenshotParams, ScreenshotResult, SetParameterParams,
    UserParameter,
};
use crate::config::AddinConfig;

/// Client for the add-in listener.
#[derive(Debug, Clone)]
pub struct AddinClient {
    /// `http://<host>:<port>`, without a trailing slash.
    base_url: String,
    /// Shared connection pool.
    http: reqwest::Client,
}

impl AddinClient {
    /// Creates a client for the add-in described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Setup`] if the HTTP client cannot be built.
    pub fn new(config: &AddinConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|source| ClientError::Setup { source })?;

        Ok(Self {
            base_url: format!("http://{}:{}", config.host, config.port),
            http,
        })
    }

    /// Returns the base URL of the add-in listener.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Calls an add-in action and returns its `result` value.
    ///
    /// # Errors
    ///
    /// Returns an error if the add-in cannot be reached, times out, answers
    /// with malformed JSON, or reports that the action failed.
    pub async fn call_action<P: Serialize + Sync>(
        &self,
        action: Action,
        params: &P,
    ) -> ClientResult<Value> {
        let url = format!("{}/{}", self.base_url, action.name());

        tracing::info!(action = %action, url = %url, "Calling add-in action");

        let response = self
            .http
            .post(&url)
            .json(params)
            .send()
            .await
            .map_err(|e| classify(&url, e))?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| classify(&url, e))?;

        let Ok(data) = serde_json::from_slice::<Value>(&bytes) else {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            tracing::error!(url = %url, status = status.as_u16(), body = %body, "Failed to decode add-in response");
            return Err(ClientError::InvalidResponse {
                status: status.as_u16(),
                body,
            });
        };

        if status.is_success() {
            if data.get("success").and_then(Value::as_bool).unwrap_or(false) {
                return Ok(data.get("result").cloned().unwrap_or(Value::Null));
            }

            tracing::error!(action = %action, error = %data.get("error").unwrap_or(&serde_json::Value::Null), "Add-in action failed");
            return Err(ClientError::Action(error_body(
                &data,
                "FusionServerError",
                "An unknown error occurred".to_string(),
            )));
        }

        tracing::error!(
            action = %action,
            status = status.as_u16(),
            response = %data,
            "Add-in action failed with HTTP error"
        );
        Err(ClientError::Action(error_body(
            &data,
            "ServerError",
            format!("Server returned status {}", status.as_u16()),
        )))
    }

    /// Runs a script in Fusion and returns its captured output.
    ///
    /// # Errors
    ///
    /// See [`call_action`](Self::call_action).
    pub async fn execute_code(&self, code: &str) -> ClientResult<String> {
        let params = ExecuteCodeParams {
            code: code.to_string(),
            description: None,
        };
        let result = self.call_action(Action::ExecuteCode, &params).await?;

        Ok(match result {
            Value::String(output) => output,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    /// Asks Fusion to save the active viewport as an image at `filepath`.
    ///
    /// # Errors
    ///
    /// See [`call_action`](Self::call_action).
    pub async fn get_viewport_screenshot(&self, filepath: &Path) -> ClientResult<ScreenshotResult> {
        let params = ScreenshotParams {
            filepath: filepath.to_string_lossy().into_owned(),
        };
        let result = self
            .call_action(Action::GetViewportScreenshot, &params)
            .await?;
        decode(result)
    }

    /// Lists the user parameters of the active design.
    ///
    /// # Errors
    ///
    /// See [`call_action`](Self::call_action).
    pub async fn list_user_parameters(&self) -> ClientResult<Vec<UserParameter>> {
        let result = self
            .call_action(Action::ListUserParameters, &json!({}))
            .await?;
        decode(result)
    }

    /// Sets the expression of a parameter and returns the updated parameter.
    ///
    /// # Errors
    ///
    /// See [`call_action`](Self::call_action).
    pub async fn set_user_parameter(
        &self,
        name: &str,
        expression: &str,
    ) -> ClientResult<UserParameter> {
        let params = SetParameterParams {
            name: name.to_string(),
            expression: expression.to_string(),
        };
        let result = self.call_action(Action::SetUserParameter, &params).await?;
        decode(result)
    }
}

/// Maps a reqwest failure onto the add-in error categories.
fn classify(url: &str, e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        tracing::error!(url = %url, "Request to add-in timed out");
        ClientError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_connect() {
        tracing::error!(url = %url, error = %e, "Connection to add-in failed. Is it running?");
        ClientError::Connection {
            url: url.to_string(),
            source: e,
        }
    } else {
        tracing::error!(url = %url, error = %e, "Request to add-in failed");
        ClientError::Request { source: e }
    }
}

/// Pulls `error.type` / `error.message` out of a response, with fallbacks.
fn error_body(data: &Value, default_type: &str, default_message: String) -> ErrorBody {
    let error = data.get("error");
    let error_type = error
        .and_then(|e| e.get("type"))
        .and_then(Value::as_str)
        .unwrap_or(default_type);
    let message = error
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .map_or(default_message, str::to_string);

    ErrorBody::new(error_type, message)
}

fn decode<T: DeserializeOwned>(result: Value) -> ClientResult<T> {
    serde_json::from_value(result.clone()).map_err(|e| {
        tracing::error!(error = %e, result = %result, "Unexpected add-in result shape");
        ClientError::InvalidResponse {
            status: 200,
            body: result.to_string(),
        }
    })
}
