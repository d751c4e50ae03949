//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use serde_json::Value;
use xui_api::ApiResponse;

use crate::error::{CliError, panel_message};

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Unwrap a panel response, turning transport-level and panel-level
/// failures (`success: false` with HTTP 200) into errors.
pub fn expect_success(response: ApiResponse, profile_hint: &str) -> Result<Value, CliError> {
    let body = match response.into_result() {
        Ok(body) => body,
        Err(xui_api::Error::LoginFailed) => {
            return Err(CliError::AuthFailed {
                profile: profile_hint.into(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    if body.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(CliError::ApiError {
            message: panel_message(&body).unwrap_or_else(|| "panel reported failure".into()),
        });
    }
    Ok(body)
}
