// Session cache abstraction.
//
// The panel session is a single opaque token reused until its TTL lapses.
// The client depends on the `SessionCache` trait so host applications can
// back it with whatever store they already run; `MemoryCache` covers the
// in-process case and tests.

use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

/// Cache key under which the panel session token is stored.
pub const SESSION_CACHE_KEY: &str = "xui_session";

/// How long a freshly obtained session token is reused.
pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// Key-value store with per-entry expiry.
///
/// Writes are last-write-wins. Implementations must treat expired entries
/// as absent.
pub trait SessionCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn put(&self, key: &str, value: String, ttl: Duration);

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-process [`SessionCache`] backed by a concurrent map.
///
/// Expiry is checked lazily on read. Deadlines use `tokio::time::Instant`,
/// so a paused test clock controls them.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, Entry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if entry.expires_at > now => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        }
        None
    }

    fn put(&self, key: &str, value: String, ttl: Duration) {
        self.entries.insert(
            key.to_owned(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }
}
