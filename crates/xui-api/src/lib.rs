// xui-api: Async Rust client for the 3x-ui / x-ui panel API

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod inbounds;
pub mod models;
pub mod sync;
pub mod transport;

pub use auth::SESSION_COOKIE_NAME;
pub use cache::{MemoryCache, SESSION_CACHE_KEY, SESSION_TTL, SessionCache};
pub use client::{ApiFailure, ApiResponse, Method, XuiClient};
pub use config::PanelConfig;
pub use error::Error;
pub use models::{ClientPatch, ClientRecord, ClientTraffic, InboundSettings, SourceUser};
pub use sync::SyncOutcome;
pub use transport::{TlsMode, TransportConfig};
