use std::sync::Arc;

use futures::future::try_join;
use serde_json::Value;

use crate::domain::config::VoucherConfiguration;
use crate::domain::entities::NormalizedVoucher;
use crate::domain::errors::UpstreamError;
use crate::domain::ports::{UpstreamSource, VoucherUpstream};
use crate::domain::voucher::normalize_freeship_voucher;

// Loads both upstream documents and merges them into one configuration.
pub struct LoadVoucherConfigsUseCase {
    pub upstream: Arc<dyn VoucherUpstream>,
}

impl LoadVoucherConfigsUseCase {
    pub async fn execute(&self) -> Result<VoucherConfiguration, UpstreamError> {
        // Both fetches run together; the first failure fails the whole load.
        let (base, freeship) = try_join(
            self.upstream.fetch_json(UpstreamSource::VoucherConfigs),
            self.upstream.fetch_json(UpstreamSource::FreeshipVouchers),
        )
        .await?;

        let mut configs = VoucherConfiguration::from_base(base);
        configs.set_freeship_vouchers(normalize_freeship_list(&freeship));

        Ok(configs)
    }
}

fn normalize_freeship_list(payload: &Value) -> Vec<NormalizedVoucher> {
    payload
        .get("data")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(normalize_freeship_voucher).collect())
        .unwrap_or_default()
}
