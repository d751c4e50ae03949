//! `xui sync` handler: mirror application users into the panel.

use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

use xui_api::{ApiFailure, ApiResponse, SourceUser, SyncOutcome, XuiClient};

use crate::cli::{GlobalOpts, SyncArgs};
use crate::error::CliError;
use crate::output;

use super::util;

/// Per-user result, shaped for every output format.
#[derive(Debug, Serialize)]
struct SyncReport {
    telegram_id: i64,
    email: String,
    action: &'static str,
    success: bool,
    response: Value,
}

#[derive(Tabled)]
struct SyncRow {
    #[tabled(rename = "TG ID")]
    telegram_id: i64,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Action")]
    action: &'static str,
    #[tabled(rename = "Result")]
    result: String,
}

impl From<&SyncReport> for SyncRow {
    fn from(r: &SyncReport) -> Self {
        let result = if r.success {
            "ok".to_owned()
        } else {
            r.response
                .get("error")
                .or_else(|| r.response.get("msg"))
                .and_then(Value::as_str)
                .unwrap_or("failed")
                .to_owned()
        };
        Self {
            telegram_id: r.telegram_id,
            email: r.email.clone(),
            action: r.action,
            result,
        }
    }
}

/// Accept either a single user object or an array of them.
fn parse_users(value: Value) -> Result<Vec<SourceUser>, CliError> {
    let users = match value {
        Value::Array(_) => serde_json::from_value(value)?,
        other => vec![serde_json::from_value(other)?],
    };
    Ok(users)
}

pub async fn handle(
    client: &XuiClient,
    args: SyncArgs,
    profile: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let users = parse_users(util::read_json_file(&args.from_file)?)?;
    let inbound = global.inbound.as_deref();

    let mut reports = Vec::with_capacity(users.len());
    let mut login_failed = false;
    for user in &users {
        let outcome = client.sync_user(user, inbound).await?;
        let action = match outcome {
            SyncOutcome::Created(_) => "created",
            SyncOutcome::Updated(_) => "updated",
        };
        let response = outcome.response();
        login_failed |= matches!(response, ApiResponse::Failure(ApiFailure::LoginFailed));
        let success = response.is_success()
            && response.body().and_then(|b| b.get("success")).and_then(Value::as_bool) != Some(false);
        reports.push(SyncReport {
            telegram_id: user.telegram_id,
            email: user.email.clone(),
            action,
            success,
            response: response.to_value(),
        });
    }

    let out = output::render_list(&global.output, &reports, |r| SyncRow::from(r), |r| {
        format!("{}\t{}", r.telegram_id, r.action)
    })?;
    output::print_output(&out, global.quiet);

    if login_failed {
        return Err(CliError::AuthFailed {
            profile: profile.to_owned(),
        });
    }

    let failed = reports.iter().filter(|r| !r.success).count();
    if failed > 0 {
        return Err(CliError::ApiError {
            message: format!("{failed} of {} users failed to sync", reports.len()),
        });
    }
    Ok(())
}
