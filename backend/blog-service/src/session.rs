//! Server-side sessions
//!
//! A session maps an opaque token to the id of the signed-in user. Only the
//! id is kept; the profile is fetched fresh when a session is restored.
//! Sessions expire after a fixed lifetime. Expired entries are dropped when
//! looked up and swept whenever a new session opens.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::RecordId;

/// Opaque bearer token handed to the client at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(Uuid);

impl SessionToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for SessionToken {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Default session lifetime: one day.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone)]
struct Session {
    user_id: RecordId,
    expires_at: DateTime<Utc>,
}

impl Session {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<SessionToken, Session>,
    ttl: std::time::Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(std::time::Duration::from_secs(DEFAULT_SESSION_TTL_SECS))
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: std::time::Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Open a session for `user_id`.
    pub fn create(&self, user_id: RecordId) -> SessionToken {
        let now = Utc::now();
        self.purge_expired_at(now);

        let token = SessionToken::generate();
        let expires_at = Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.sessions.insert(
            token,
            Session {
                user_id,
                expires_at,
            },
        );
        token
    }

    pub fn resolve(&self, token: &SessionToken) -> Option<RecordId> {
        let now = Utc::now();
        let user_id = {
            let entry = self.sessions.get(token)?;
            if entry.is_expired(now) {
                None
            } else {
                Some(entry.user_id.clone())
            }
        };

        if user_id.is_none() {
            self.sessions.remove(token);
        }
        user_id
    }

    /// Drop a session. Returns false if it was already gone.
    pub fn clear(&self, token: &SessionToken) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Drop every expired session, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired(now));
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
