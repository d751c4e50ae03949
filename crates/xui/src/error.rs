//! CLI error types with miette diagnostics.
//!
//! Maps `xui_api::Error` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use xui_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to the panel")]
    #[diagnostic(
        code(xui::connection_failed),
        help(
            "Check that the panel is running and reachable at the configured\n\
             host, port and web base path.\n\
             Try: xui login --insecure"
        )
    )]
    ConnectionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(xui::tls_error),
        help(
            "If the panel uses a self-signed certificate, pass --insecure (-k)\n\
             or configure ca_cert in your profile."
        )
    )]
    TlsError { message: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed")]
    #[diagnostic(
        code(xui::auth_failed),
        help(
            "Verify the panel username and password.\n\
             Run: xui config set-password --profile {profile}\n\
             Or set the XUI_PASSWORD environment variable."
        )
    )]
    AuthFailed { profile: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(xui::no_credentials),
        help(
            "Configure credentials with: xui config init\n\
             Or set XUI_USERNAME and XUI_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(xui::not_found),
        help("Run: xui {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("Panel API error: {message}")]
    #[diagnostic(code(xui::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(xui::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(xui::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: xui config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No panel configured")]
    #[diagnostic(
        code(xui::no_config),
        help(
            "Create a profile with: xui config init\n\
             Or pass --host (XUI_HOST) together with XUI_USERNAME / XUI_PASSWORD.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(xui::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(xui::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out")]
    #[diagnostic(
        code(xui::timeout),
        help("Increase timeout with --timeout or check panel responsiveness.")
    )]
    Timeout,

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(xui::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } | Self::NoConfig { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── xui_api::Error → CliError mapping ────────────────────────────────

impl From<xui_api::Error> for CliError {
    fn from(err: xui_api::Error) -> Self {
        use xui_api::Error as ApiErr;

        match err {
            ApiErr::Authentication { .. } | ApiErr::LoginFailed => CliError::AuthFailed {
                profile: "current".into(),
            },
            ApiErr::RequestFailed { status, details } => CliError::ApiError {
                message: format!(
                    "HTTP {status}: {}",
                    panel_message(&details).unwrap_or_else(|| "request failed".into())
                ),
            },
            ApiErr::InvalidInbound(id) => CliError::Validation {
                field: "inbound".into(),
                reason: format!("expected an integer, got '{id}'"),
            },
            ApiErr::Transport(e) if e.is_timeout() => CliError::Timeout,
            ApiErr::Transport(e) => CliError::ConnectionFailed { source: e.into() },
            ApiErr::InvalidUrl(e) => CliError::Validation {
                field: "host".into(),
                reason: format!("panel URL is malformed: {e}"),
            },
            ApiErr::Tls(message) => CliError::TlsError { message },
            ApiErr::Deserialization { message, .. } => CliError::ApiError {
                message: format!("unexpected response: {message}"),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(Box::new(other)),
        }
    }
}

/// Pull the panel's `msg` out of an error body.
pub fn panel_message(details: &serde_json::Value) -> Option<String> {
    details
        .get("msg")
        .and_then(serde_json::Value::as_str)
        .filter(|m| !m.is_empty())
        .map(ToOwned::to_owned)
}
