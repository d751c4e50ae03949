// ── Runtime connection configuration ──
//
// Describes *how* to reach a panel. Carries credentials and transport
// tuning but never touches disk; `xui-config` (or any host application)
// builds a `PanelConfig` and hands it to `XuiClient`.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::error::Error;
use crate::transport::{TlsMode, TransportConfig};

/// Connection settings for a single x-ui panel.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// URL scheme, `https` unless the panel is served over plain HTTP.
    pub scheme: String,
    /// Panel hostname or IP address.
    pub host: String,
    /// Panel listen port.
    pub port: u16,
    /// Web base path configured in the panel (e.g. `"api"` or `"/secret/"`).
    pub path: String,
    pub username: String,
    pub password: SecretString,
    /// Inbound used when an operation is not given one explicitly.
    pub inbound_id: String,
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            scheme: "https".into(),
            host: "example.com".into(),
            port: 8443,
            path: "api".into(),
            username: "admin".into(),
            password: SecretString::from(String::new()),
            inbound_id: "1".into(),
            tls: TlsMode::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl PanelConfig {
    /// The API base: `{scheme}://{host}:{port}/{path}/`.
    ///
    /// Surrounding slashes on `path` are trimmed; an empty path yields
    /// `{scheme}://{host}:{port}/`. The trailing slash matters: endpoints
    /// are resolved with [`Url::join`], which replaces the last segment of
    /// a base without one.
    pub fn base_url(&self) -> Result<Url, Error> {
        let path = self.path.trim_matches('/');
        let raw = if path.is_empty() {
            format!("{}://{}:{}/", self.scheme, self.host, self.port)
        } else {
            format!("{}://{}:{}/{}/", self.scheme, self.host, self.port, path)
        };
        Ok(Url::parse(&raw)?)
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            timeout: self.timeout,
        }
    }
}
