//! Session handling for the host pipeline.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tower_sessions::cookie::time;
use tower_sessions::session::{Id, Record};
use tower_sessions::{session_store, Expiry, SessionManagerLayer, SessionStore};

/// Cookie carrying the session id.
pub const SESSION_COOKIE_NAME: &str = "SESSIONID";

/// Most sessions held at once before the least valuable are evicted.
pub const DEFAULT_MAX_SESSIONS: u64 = 10_000;

/// Idle time after which a session is dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// In-memory session store with a capacity bound and idle eviction.
#[derive(Clone)]
pub struct BoundedStore {
    cache: Cache<Id, Record>,
}

impl BoundedStore {
    pub fn new(max_sessions: u64, idle_timeout: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(max_sessions)
                .time_to_idle(idle_timeout)
                .build(),
        }
    }

    /// Number of sessions currently held, after pending evictions ran.
    pub async fn len(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}

impl fmt::Debug for BoundedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedStore")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

#[async_trait]
impl SessionStore for BoundedStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self.cache.contains_key(&record.id) {
            record.id = Id::default();
        }
        self.cache.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.cache.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        Ok(self.cache.get(session_id).await)
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.cache.invalidate(session_id).await;
        Ok(())
    }
}

/// An installable session handler backed by a bounded in-memory store.
///
/// The handler is a value in the environment's single session slot; the
/// environment turns it into the outermost layer of the request pipeline.
#[derive(Debug, Clone)]
pub struct SessionHandler {
    store: BoundedStore,
    cookie_name: String,
    idle_timeout: Duration,
}

impl SessionHandler {
    /// Create a handler with a custom cookie name and default limits.
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self::with_limits(cookie_name, DEFAULT_MAX_SESSIONS, DEFAULT_IDLE_TIMEOUT)
    }

    pub fn with_limits(cookie_name: impl Into<String>, max_sessions: u64, idle_timeout: Duration) -> Self {
        Self {
            store: BoundedStore::new(max_sessions, idle_timeout),
            cookie_name: cookie_name.into(),
            idle_timeout,
        }
    }

    /// Name of the session cookie.
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Number of sessions the store currently holds.
    pub async fn stored_sessions(&self) -> u64 {
        self.store.len().await
    }

    /// Build the tower layer for this handler.
    pub fn layer(&self) -> SessionManagerLayer<BoundedStore> {
        let idle = time::Duration::try_from(self.idle_timeout).unwrap_or(time::Duration::MAX);
        SessionManagerLayer::new(self.store.clone())
            .with_name(self.cookie_name.clone())
            .with_expiry(Expiry::OnInactivity(idle))
    }
}

impl Default for SessionHandler {
    fn default() -> Self {
        Self::new(SESSION_COOKIE_NAME)
    }
}
