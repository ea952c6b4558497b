use std::sync::Arc;

use crate::domain::errors::RelayError;
use crate::use_cases::sessions::SessionStore;

// Response returned by the register cookie use case.
pub struct RegisterCookieResponse {
    pub session_id: String,
    pub ttl_seconds: u64,
}

// Register cookie use case with injected dependencies.
pub struct RegisterCookieUseCase {
    pub sessions: Arc<SessionStore>,
}

impl RegisterCookieUseCase {
    pub fn execute(
        &self,
        existing_session_id: Option<&str>,
        raw_cookie: &str,
    ) -> Result<RegisterCookieResponse, RelayError> {
        let cookie = SessionStore::normalize_cookie(raw_cookie)
            .ok_or(RelayError::Validation("cookie is required"))?;

        let session_id = self.sessions.get_or_create_session_id(existing_session_id);
        let session_id = self
            .sessions
            .save_session_cookie(&session_id, &cookie)
            .ok_or(RelayError::Validation("cookie is required"))?;

        Ok(RegisterCookieResponse {
            session_id,
            ttl_seconds: self.sessions.ttl_seconds(),
        })
    }
}
