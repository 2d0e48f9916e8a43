//! In-memory sessions keyed by the `sid` cookie.
//!
//! A request without a known `sid` gets a fresh session, and the response carries the
//! new id in a `sid` cookie (`Max-Age=3600; HttpOnly`). Sessions live in a
//! [`SessionStore`] for 24 hours after their creation; expired ones are purged each
//! time the middleware runs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::handler::{BoxError, Handler, HandlerResult};
use crate::middleware::cookie::{Cookie, Cookies};
use crate::router::Next;
use crate::{Request, Response};

/// Name of the cookie holding the session id.
pub const SESSION_COOKIE: &str = "sid";

const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const COOKIE_MAX_AGE: u64 = 3600;

/// A handle to the data of one session, clones share the same data.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionData>,
}

#[derive(Debug)]
struct SessionData {
    id: String,
    created_at: Instant,
    values: Mutex<HashMap<String, Value>>,
}

impl Session {
    fn new(id: String) -> Self {
        Self {
            inner: Arc::new(SessionData {
                id,
                created_at: Instant::now(),
                values: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Returns the value under `key`, if present and of type `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.values().get(key)?.clone();
        serde_json::from_value(value).ok()
    }

    /// Stores `value` under `key` and returns the previous value.
    ///
    /// # Errors
    ///
    /// Fails if `value` can't be represented as JSON.
    pub fn insert<T: Serialize + ?Sized>(&self, key: impl Into<String>, value: &T) -> Result<Option<Value>, serde_json::Error> {
        let value = serde_json::to_value(value)?;
        Ok(self.values().insert(key.into(), value))
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.values().remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    fn values(&self) -> MutexGuard<'_, HashMap<String, Value>> {
        self.inner.values.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.inner.created_at) >= ttl
    }
}

/// Sessions by id.
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self { sessions: Mutex::new(HashMap::new()), ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, id: &str) -> Option<Session> {
        self.sessions().get(id).cloned()
    }

    /// Creates and stores a session with a random id.
    pub fn create(&self) -> Session {
        let session = Session::new(Uuid::new_v4().to_string());
        self.sessions().insert(session.id().to_string(), session.clone());
        session
    }

    /// Removes the sessions older than the ttl, returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now, self.ttl));
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Returns the session middleware with its own store.
pub fn session() -> SessionMiddleware {
    session_with_store(Arc::new(SessionStore::new()))
}

/// Returns the session middleware backed by `store`.
pub fn session_with_store(store: Arc<SessionStore>) -> SessionMiddleware {
    SessionMiddleware { store }
}

#[derive(Debug, Clone)]
pub struct SessionMiddleware {
    store: Arc<SessionStore>,
}

impl SessionMiddleware {
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    fn resolve(&self, req: &Request, res: &mut Response<'_>) -> Result<Session, BoxError> {
        let known = match req.cookies() {
            Some(cookies) => cookies.get(SESSION_COOKIE).and_then(|id| self.store.get(id)),
            None => Cookies::from_headers(req.headers()).get(SESSION_COOKIE).and_then(|id| self.store.get(id)),
        };
        if let Some(session) = known {
            return Ok(session);
        }

        let session = self.store.create();
        debug!(id = session.id(), "session created");
        res.set_cookie(&Cookie::new(SESSION_COOKIE, session.id()).max_age(COOKIE_MAX_AGE).http_only(true))?;
        Ok(session)
    }
}

#[async_trait]
impl Handler for SessionMiddleware {
    async fn call(&self, req: &mut Request, res: &mut Response<'_>, next: Next<'_>) -> HandlerResult {
        let purged = self.store.purge_expired();
        if purged > 0 {
            debug!(purged, "expired sessions removed");
        }

        let session = self.resolve(req, res)?;
        req.extensions_mut().insert(session);
        next.run(req, res).await
    }
}

impl Request {
    /// Returns the session of this request, once the session middleware has run.
    pub fn session(&self) -> Option<&Session> {
        self.extensions().get::<Session>()
    }
}
