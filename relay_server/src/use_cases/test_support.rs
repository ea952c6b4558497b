use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::errors::UpstreamError;
use crate::domain::ports::{Clock, UpstreamReply, UpstreamSource, VoucherUpstream};

// Shared time source tests can move forward between calls.
#[derive(Clone)]
pub(crate) struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub(crate) fn new(now: u64) -> Self {
        Self(Arc::new(AtomicU64::new(now)))
    }

    pub(crate) fn set(&self, now: u64) {
        self.0.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_epoch_seconds(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

type FetchResult = Result<Value, UpstreamError>;

// Canned upstream that records every call made through the port.
pub(crate) struct FakeUpstream {
    base: Mutex<Option<FetchResult>>,
    freeship: Mutex<Option<FetchResult>>,
    reply: Mutex<Option<Result<UpstreamReply, UpstreamError>>>,
    pub(crate) fetch_calls: AtomicUsize,
    pub(crate) saved_bodies: Mutex<Vec<Value>>,
}

impl FakeUpstream {
    pub(crate) fn new(base: Value, freeship: Value) -> Self {
        Self {
            base: Mutex::new(Some(Ok(base))),
            freeship: Mutex::new(Some(Ok(freeship))),
            reply: Mutex::new(Some(Ok(UpstreamReply {
                status: 200,
                content_type: Some("application/json".to_string()),
                body: r#"{"error":0}"#.to_string(),
            }))),
            fetch_calls: AtomicUsize::new(0),
            saved_bodies: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_base_error(self, error: UpstreamError) -> Self {
        *self.base.lock().expect("base mutex poisoned") = Some(Err(error));
        self
    }

    pub(crate) fn with_freeship_error(self, error: UpstreamError) -> Self {
        *self.freeship.lock().expect("freeship mutex poisoned") = Some(Err(error));
        self
    }

    pub(crate) fn with_reply(self, reply: Result<UpstreamReply, UpstreamError>) -> Self {
        *self.reply.lock().expect("reply mutex poisoned") = Some(reply);
        self
    }

    pub(crate) fn save_calls(&self) -> usize {
        self.saved_bodies.lock().expect("saved mutex poisoned").len()
    }

    pub(crate) fn last_saved_body(&self) -> Option<Value> {
        self.saved_bodies
            .lock()
            .expect("saved mutex poisoned")
            .last()
            .cloned()
    }
}

fn replay<T: Clone>(slot: &Mutex<Option<Result<T, UpstreamError>>>) -> Result<T, UpstreamError> {
    slot.lock()
        .expect("fake slot poisoned")
        .clone()
        .expect("fake slot configured")
}

#[async_trait]
impl VoucherUpstream for FakeUpstream {
    async fn fetch_json(&self, source: UpstreamSource) -> Result<Value, UpstreamError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        match source {
            UpstreamSource::VoucherConfigs => replay(&self.base),
            UpstreamSource::FreeshipVouchers => replay(&self.freeship),
        }
    }

    async fn save_voucher(&self, body: Value) -> Result<UpstreamReply, UpstreamError> {
        self.saved_bodies
            .lock()
            .expect("saved mutex poisoned")
            .push(body);
        replay(&self.reply)
    }
}
