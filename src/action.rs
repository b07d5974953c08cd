//! Wire vocabulary shared by the MCP server and the Fusion add-in.
//!
//! The MCP server calls the add-in with `POST http://<host>:<port>/<action>`
//! and a JSON object body. The add-in always answers with an
//! [`ActionResponse`]:
//!
//! ```json
//! {"success": true, "result": ...}
//! {"success": false, "error": {"type": "...", "message": "..."}}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default add-in listener host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default add-in listener port.
pub const DEFAULT_PORT: u16 = 3600;

/// Default request timeout for add-in calls, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// An action the add-in knows how to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Run a script inside the host and capture its output.
    ExecuteCode,
    /// Save the active viewport to an image file.
    GetViewportScreenshot,
    /// List the user parameters of the active design.
    ListUserParameters,
    /// Change the expression of a user or model parameter.
    SetUserParameter,
}

impl Action {
    /// All actions, in the order they are advertised.
    pub const ALL: [Self; 4] = [
        Self::ExecuteCode,
        Self::GetViewportScreenshot,
        Self::ListUserParameters,
        Self::SetUserParameter,
    ];

    /// Returns the URL path segment for this action.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ExecuteCode => "execute_code",
            Self::GetViewportScreenshot => "get_viewport_screenshot",
            Self::ListUserParameters => "list_user_parameters",
            Self::SetUserParameter => "set_user_parameter",
        }
    }

    /// Parses an action from its URL path segment.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.name() == name)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Body of an `execute_code` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteCodeParams {
    /// Script source to run in the host.
    #[serde(default)]
    pub code: String,
    /// Optional human-readable description of the script.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of a `get_viewport_screenshot` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenshotParams {
    /// Where the host should write the image.
    #[serde(default)]
    pub filepath: String,
}

/// Result of a `get_viewport_screenshot` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenshotResult {
    /// Path of the saved image.
    pub filepath: String,
}

/// Body of a `set_user_parameter` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetParameterParams {
    /// Parameter name, e.g. `width`.
    #[serde(default)]
    pub name: String,
    /// New expression, e.g. `10 cm` or `height * 2`.
    #[serde(default)]
    pub expression: String,
}

/// A named design parameter as reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserParameter {
    /// Parameter name.
    pub name: String,
    /// Evaluated value in the host's internal units.
    pub value: f64,
    /// Unit string, e.g. `mm`. Empty for unitless parameters.
    #[serde(default)]
    pub unit: String,
    /// Expression the value is computed from.
    pub expression: String,
    /// User comment. Empty when the parameter has none.
    #[serde(default)]
    pub comment: String,
}

/// Machine-readable error returned by the add-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error category, e.g. `InvalidUserInput`.
    #[serde(rename = "type")]
    pub error_type: String,
    /// Human-readable description.
    pub message: String,
}

impl ErrorBody {
    /// Creates a new error body.
    #[must_use]
    pub fn new(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.into(),
            message: message.into(),
        }
    }
}

/// Envelope for every add-in response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    /// Whether the action completed.
    #[serde(default)]
    pub success: bool,
    /// Action result on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error details on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl ActionResponse {
    /// Creates a successful response.
    #[must_use]
    pub const fn ok(result: Value) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    /// Creates a failed response.
    #[must_use]
    pub const fn failed(error: ErrorBody) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_names_parse_back() {
        for action in Action::ALL {
            assert_eq!(Action::from_name(action.name()), Some(action));
        }
        assert_eq!(Action::from_name("delete_everything"), None);
        assert_eq!(Action::from_name(""), None);
    }

    #[test]
    fn success_response_shape() {
        let response = ActionResponse::ok(serde_json::json!("hello\n"));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "result": "hello\n"}));
    }

    #[test]
    fn error_response_uses_type_key() {
        let response = ActionResponse::failed(ErrorBody::new("InvalidUserInput", "bad"));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": false,
                "error": {"type": "InvalidUserInput", "message": "bad"}
            })
        );
    }

    #[test]
    fn missing_success_defaults_to_false() {
        let response: ActionResponse = serde_json::from_str(r#"{"result": 1}"#).unwrap();
        assert!(!response.success);
    }

    #[test]
    fn parameter_without_comment_or_unit() {
        let param: UserParameter =
            serde_json::from_str(r#"{"name": "count", "value": 4.0, "expression": "4"}"#).unwrap();
        assert_eq!(param.comment, "");
        assert_eq!(param.unit, "");
    }
}
