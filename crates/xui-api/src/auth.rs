// Panel authentication
//
// Form-encoded login against `{base}/login`. The panel answers with a JSON
// `{ success, msg }` body and sets a `3x-ui` session cookie; the cookie value
// is cached and replayed as a `Cookie` header on every later request.

use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, error};

use crate::cache::{SESSION_CACHE_KEY, SESSION_TTL};
use crate::client::{XuiClient, decode_body};
use crate::error::Error;

/// Name of the session cookie set by the panel on login.
pub const SESSION_COOKIE_NAME: &str = "3x-ui";

impl XuiClient {
    /// Return a usable session token, logging in on a cache miss.
    ///
    /// A cached, unexpired token is returned without touching the network.
    /// Otherwise one login attempt is made. Rejected credentials, a falsy
    /// `success` flag, or a missing `3x-ui` cookie are logged and yield
    /// `Ok(None)`; only transport faults surface as `Err`.
    pub async fn session_token(&self) -> Result<Option<String>, Error> {
        if let Some(token) = self.cache().get(SESSION_CACHE_KEY) {
            debug!("reusing cached panel session");
            return Ok(Some(token));
        }

        self.authenticate().await
    }

    /// Log in unconditionally, replacing any cached session.
    ///
    /// Unlike [`session_token`](Self::session_token) a failed login is an
    /// error here; this is meant for verifying credentials up front.
    pub async fn login(&self) -> Result<String, Error> {
        self.authenticate()
            .await?
            .ok_or_else(|| Error::Authentication {
                message: format!(
                    "panel rejected login for user '{}' or did not set the {SESSION_COOKIE_NAME} cookie",
                    self.config().username
                ),
            })
    }

    /// Single login attempt; caches the token on success.
    async fn authenticate(&self) -> Result<Option<String>, Error> {
        let url = self.url("login")?;
        debug!("logging in at {}", url);

        let config = self.config();
        let form = [
            ("username", config.username.as_str()),
            ("password", config.password.expose_secret()),
        ];

        let resp = self
            .http()
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        let token = resp
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE_NAME)
            .map(|c| c.value().to_owned());
        let body = decode_body(resp).await?;

        if !status.is_success() || !is_truthy(body.get("success")) {
            error!(
                status_code = status.as_u16(),
                response = %body,
                "panel login failed"
            );
            return Ok(None);
        }

        let Some(token) = token else {
            error!("panel login succeeded but the {SESSION_COOKIE_NAME} cookie is missing");
            return Ok(None);
        };

        self.cache()
            .put(SESSION_CACHE_KEY, token.clone(), SESSION_TTL);
        debug!("login successful");
        Ok(Some(token))
    }
}

/// Loose truthiness for the panel's `success` field.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n.abs() > 0.0),
        Some(Value::String(s)) => !s.is_empty() && s != "0",
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        Some(Value::Null) | None => false,
    }
}
