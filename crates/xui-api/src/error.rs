use thiserror::Error;

/// Top-level error type for the `xui-api` crate.
///
/// API-level failures (bad status, `success: false`) are normally carried
/// inside [`ApiResponse`](crate::ApiResponse) rather than raised. The
/// variants here cover faults below that layer, plus the `LoginFailed` /
/// `RequestFailed` pair produced by [`ApiResponse::into_result`](crate::ApiResponse::into_result)
/// for callers that prefer `?`.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login did not yield a session (bad credentials, missing cookie).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// A dispatched request was short-circuited because no session was available.
    #[error("Login failed")]
    LoginFailed,

    // ── Panel API ───────────────────────────────────────────────────
    /// The panel answered a request with a non-2xx status.
    #[error("Request failed (HTTP {status})")]
    RequestFailed {
        status: u16,
        details: serde_json::Value,
    },

    /// Inbound identifier could not be interpreted as an integer.
    #[error("Invalid inbound id '{0}': expected an integer")]
    InvalidInbound(String),

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error (malformed host/port/path configuration).
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if logging in again might resolve this error.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::Authentication { .. } | Self::LoginFailed => true,
            Self::RequestFailed { status, .. } => *status == 401,
            _ => false,
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::RequestFailed { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the panel reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RequestFailed { status: 404, .. })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    #[test]
    fn classification_follows_panel_status() {
        let missing = Error::RequestFailed {
            status: 404,
            details: json!({ "msg": "not found" }),
        };
        assert!(missing.is_not_found());
        assert!(!missing.is_transient());

        let down = Error::RequestFailed {
            status: 502,
            details: Value::Null,
        };
        assert!(down.is_transient());
        assert!(!down.is_not_found());

        assert!(Error::LoginFailed.is_auth_failure());
        assert!(!Error::InvalidInbound("x".into()).is_not_found());
    }
}
