use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::ports::{Clock, VoucherUpstream};
use crate::use_cases::sessions::SessionStore;

// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    // Any upstream implementation can be injected here.
    pub upstream: Arc<dyn VoucherUpstream>,
    pub storage: StorageStatus,
    pub session_cookie_name: Arc<str>,
}

// Readiness of the storage backend, flipped once bootstrap succeeds.
#[derive(Clone, Default)]
pub struct StorageStatus(Arc<AtomicBool>);

impl StorageStatus {
    pub fn mark_ready(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

// System clock adapter used by the session store.
#[derive(Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}
