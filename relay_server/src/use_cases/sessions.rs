use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::domain::entities::Session;
use crate::domain::ports::Clock;

// Marker the upstream expects in front of the authentication cookie value.
pub const AUTH_COOKIE_MARKER: &str = "SPC_ST=";

// Default lifetime of a registered cookie (in seconds).
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 6 * 60 * 60;

/// In-memory store mapping relay session ids to borrowed upstream cookies.
///
/// Entries expire `ttl_seconds` after they were saved. Reads never extend a
/// session; expired entries are dropped the first time a lookup sees them.
pub struct SessionStore {
    clock: Box<dyn Clock>,
    ttl_seconds: u64,
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(clock: impl Clock + 'static, ttl_seconds: u64) -> Self {
        Self {
            clock: Box::new(clock),
            ttl_seconds,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Trims the raw value and prefixes the auth marker when it is missing.
    pub fn normalize_cookie(raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.starts_with(AUTH_COOKIE_MARKER) {
            return Some(trimmed.to_string());
        }
        Some(format!("{AUTH_COOKIE_MARKER}{trimmed}"))
    }

    // Reuses a presented id as-is; does not touch the stored expiry.
    pub fn get_or_create_session_id(&self, existing: Option<&str>) -> String {
        match existing {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => format!(
                "{:x}-{}",
                self.clock.now_epoch_seconds(),
                Uuid::new_v4().simple()
            ),
        }
    }

    /// Stores the normalized cookie for `session_id`, replacing any previous
    /// entry and restarting its lifetime. Returns `None` without storing
    /// anything when the cookie or the session id is blank.
    pub fn save_session_cookie(&self, session_id: &str, raw_cookie: &str) -> Option<String> {
        let cookie = Self::normalize_cookie(raw_cookie)?;
        if session_id.is_empty() {
            return None;
        }

        let session = Session {
            session_id: session_id.to_string(),
            cookie,
            expires_at: self.clock.now_epoch_seconds().saturating_add(self.ttl_seconds),
        };
        self.lock().insert(session.session_id.clone(), session);

        Some(session_id.to_string())
    }

    /// Returns the stored cookie while the session is still live.
    pub fn get_session_cookie(&self, session_id: &str) -> Option<String> {
        let now = self.clock.now_epoch_seconds();
        let mut sessions = self.lock();

        let session = sessions.get(session_id)?;
        if now > session.expires_at {
            sessions.remove(session_id);
            return None;
        }

        Some(session.cookie.clone())
    }

    // Whole-record reads and writes keep a poisoned map usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
