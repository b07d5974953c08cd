//! Action handlers: validate the request, then call the host.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::action::{
    Action, ExecuteCodeParams, ScreenshotParams, ScreenshotResult, SetParameterParams,
    UserParameter,
};
use crate::addin::{AddinError, FusionHost, HostError};

/// Runs `action` against `host` with the JSON `params` from the request body.
///
/// # Errors
///
/// Returns [`AddinError::InvalidUserInput`] for bad parameters and
/// [`AddinError::Execution`] when the host fails.
pub fn dispatch<H: FusionHost + ?Sized>(
    host: &mut H,
    action: Action,
    params: Value,
) -> Result<Value, AddinError> {
    match action {
        Action::ExecuteCode => to_value(execute_code(host, parse(action, params)?)?),
        Action::GetViewportScreenshot => {
            to_value(get_viewport_screenshot(host, parse(action, params)?)?)
        }
        Action::ListUserParameters => to_value(list_user_parameters(host)?),
        Action::SetUserParameter => to_value(set_user_parameter(host, parse(action, params)?)?),
    }
}

/// Runs a script and returns its captured output.
///
/// # Errors
///
/// Fails if `code` is empty or the script raises.
pub fn execute_code<H: FusionHost + ?Sized>(
    host: &mut H,
    params: ExecuteCodeParams,
) -> Result<String, AddinError> {
    if params.code.is_empty() {
        return Err(AddinError::InvalidUserInput(
            "Parameter 'code' cannot be empty for action 'execute_code'".to_string(),
        ));
    }

    if let Some(description) = params.description.as_deref() {
        tracing::debug!(description, "Executing script");
    }

    host.execute_script(&params.code)
        .map_err(|e| AddinError::execution(Action::ExecuteCode, e.to_string()))
}

/// Saves the active viewport to the requested path.
///
/// # Errors
///
/// Fails if `filepath` is empty, there is no viewport, or the host does not
/// write the file.
pub fn get_viewport_screenshot<H: FusionHost + ?Sized>(
    host: &mut H,
    params: ScreenshotParams,
) -> Result<ScreenshotResult, AddinError> {
    const ACTION: Action = Action::GetViewportScreenshot;

    if params.filepath.is_empty() {
        return Err(AddinError::InvalidUserInput(
            "Parameter 'filepath' cannot be empty".to_string(),
        ));
    }

    let saved = host
        .save_viewport_image(Path::new(&params.filepath))
        .map_err(|e| AddinError::execution(ACTION, e.to_string()))?;

    if !saved {
        return Err(AddinError::execution(
            ACTION,
            format!("Failed to save screenshot to {}", params.filepath),
        ));
    }

    Ok(ScreenshotResult {
        filepath: params.filepath,
    })
}

/// Lists the user parameters of the active design.
///
/// # Errors
///
/// Fails if there is no active design.
pub fn list_user_parameters<H: FusionHost + ?Sized>(
    host: &mut H,
) -> Result<Vec<UserParameter>, AddinError> {
    host.user_parameters()
        .map_err(|e| AddinError::execution(Action::ListUserParameters, e.to_string()))
}

/// Sets a parameter's expression and returns the updated parameter.
///
/// # Errors
///
/// Fails if either field is empty, the parameter does not exist, or the host
/// rejects the expression.
pub fn set_user_parameter<H: FusionHost + ?Sized>(
    host: &mut H,
    params: SetParameterParams,
) -> Result<UserParameter, AddinError> {
    if params.name.is_empty() {
        return Err(AddinError::InvalidUserInput(
            "Parameter 'name' cannot be empty".to_string(),
        ));
    }
    if params.expression.is_empty() {
        return Err(AddinError::InvalidUserInput(
            "Parameter 'expression' cannot be empty".to_string(),
        ));
    }

    host.set_parameter_expression(&params.name, &params.expression)
        .map_err(|e| {
            let message = match e {
                HostError::Rejected(reason) => {
                    format!("Failed to set parameter '{}': {reason}", params.name)
                }
                other => other.to_string(),
            };
            AddinError::execution(Action::SetUserParameter, message)
        })
}

fn parse<T: DeserializeOwned>(action: Action, params: Value) -> Result<T, AddinError> {
    serde_json::from_value(params).map_err(|e| {
        AddinError::InvalidUserInput(format!("Invalid parameters for action '{action}': {e}"))
    })
}

fn to_value<T: Serialize>(result: T) -> Result<Value, AddinError> {
    serde_json::to_value(result).map_err(|e| AddinError::Internal(e.to_string()))
}
