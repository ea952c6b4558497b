use async_trait::async_trait;
use serde_json::Value;

use crate::domain::errors::UpstreamError;

// Upstream documents the relay reads before answering a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpstreamSource {
    VoucherConfigs,
    FreeshipVouchers,
}

impl UpstreamSource {
    pub fn label(self) -> &'static str {
        match self {
            UpstreamSource::VoucherConfigs => "voucher configs",
            UpstreamSource::FreeshipVouchers => "freeship vouchers",
        }
    }
}

// Raw reply from the claim endpoint, relayed to the client untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpstreamReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

// Handlers and use cases depend on this port, not on the reqwest client.
#[async_trait]
pub trait VoucherUpstream: Send + Sync {
    async fn fetch_json(&self, source: UpstreamSource) -> Result<Value, UpstreamError>;
    async fn save_voucher(&self, body: Value) -> Result<UpstreamReply, UpstreamError>;
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now_epoch_seconds(&self) -> u64;
}
