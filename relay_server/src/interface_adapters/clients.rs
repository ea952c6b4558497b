use crate::domain::errors::UpstreamError;
use crate::domain::ports::{UpstreamReply, UpstreamSource, VoucherUpstream};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = "save100-relay/1.0";
const ACCEPT_ANY_JSON: &str = "application/json,text/plain,*/*";
const SAVE_VOUCHER_LABEL: &str = "save voucher";

// Endpoints of the two voucher providers and the claim service.
#[derive(Clone, Debug)]
pub struct UpstreamEndpoints {
    pub voucher_configs: String,
    pub freeship_vouchers: String,
    pub save_voucher: String,
}

// Thin wrapper around reqwest for every upstream call the relay makes.
#[derive(Clone)]
pub struct HttpVoucherUpstream {
    http: Client,
    endpoints: UpstreamEndpoints,
}

impl HttpVoucherUpstream {
    pub fn new(endpoints: UpstreamEndpoints, timeout: Duration) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_ANY_JSON));

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { http, endpoints })
    }

    fn url_for(&self, source: UpstreamSource) -> &str {
        match source {
            UpstreamSource::VoucherConfigs => &self.endpoints.voucher_configs,
            UpstreamSource::FreeshipVouchers => &self.endpoints.freeship_vouchers,
        }
    }
}

fn transport(label: &'static str) -> impl FnOnce(reqwest::Error) -> UpstreamError {
    move |err| UpstreamError::Transport {
        label,
        message: err.to_string(),
    }
}

#[async_trait]
impl VoucherUpstream for HttpVoucherUpstream {
    async fn fetch_json(&self, source: UpstreamSource) -> Result<Value, UpstreamError> {
        let label = source.label();
        let res = self
            .http
            .get(self.url_for(source))
            .send()
            .await
            .map_err(transport(label))?;
        let status = res.status();

        // Read the body first so a failing status still drains the connection.
        let body = res.text().await.map_err(transport(label))?;
        if !status.is_success() {
            return Err(UpstreamError::Status {
                label,
                status: status.as_u16(),
            });
        }

        serde_json::from_str(&body).map_err(|_| UpstreamError::InvalidJson { label })
    }

    async fn save_voucher(&self, body: Value) -> Result<UpstreamReply, UpstreamError> {
        let res = self
            .http
            .post(&self.endpoints.save_voucher)
            .json(&body)
            .send()
            .await
            .map_err(transport(SAVE_VOUCHER_LABEL))?;

        let status = res.status().as_u16();
        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = res.text().await.map_err(transport(SAVE_VOUCHER_LABEL))?;

        Ok(UpstreamReply {
            status,
            content_type,
            body,
        })
    }
}
