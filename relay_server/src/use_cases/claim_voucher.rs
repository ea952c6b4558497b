use std::sync::Arc;

use serde_json::json;

use crate::domain::errors::RelayError;
use crate::domain::ports::{UpstreamReply, VoucherUpstream};
use crate::domain::resolver::find_voucher_by_client_id;
use crate::use_cases::load_configs::LoadVoucherConfigsUseCase;
use crate::use_cases::sessions::SessionStore;

// Claims one voucher by client id using the cookie stored for the session.
pub struct ClaimVoucherUseCase {
    pub upstream: Arc<dyn VoucherUpstream>,
    pub sessions: Arc<SessionStore>,
}

impl ClaimVoucherUseCase {
    pub async fn execute(
        &self,
        session_id: Option<&str>,
        client_id: &str,
    ) -> Result<UpstreamReply, RelayError> {
        let client_id = client_id.trim();
        if client_id.is_empty() {
            return Err(RelayError::Validation("clientId is required"));
        }

        // Session check comes first so unauthenticated claims never hit upstream.
        let cookie = session_id
            .and_then(|id| self.sessions.get_session_cookie(id))
            .ok_or(RelayError::AuthSession)?;

        let configs = LoadVoucherConfigsUseCase {
            upstream: self.upstream.clone(),
        }
        .execute()
        .await?;

        let voucher =
            find_voucher_by_client_id(&configs, client_id).ok_or_else(|| RelayError::NotFound {
                client_id: client_id.to_string(),
            })?;

        let body = json!({
            "cookie": cookie,
            "signature": voucher.signature,
            "voucherCode": voucher.voucher_code.trim(),
            "promotionId": voucher.voucher_id,
        });

        Ok(self.upstream.save_voucher(body).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::UpstreamError;
    use crate::use_cases::test_support::{FakeUpstream, ManualClock};
    use std::sync::atomic::Ordering;

    const NOW: u64 = 1_700_000_000;

    fn upstream() -> FakeUpstream {
        FakeUpstream::new(
            json!({"flash": {"client_id": "flash1", "signature": "s", "voucherCode": " C1 ", "promotionid": "1"}}),
            json!({"data": [{"promotionId": "2", "voucherCode": "C2", "signature": "s2"}]}),
        )
    }

    fn build(upstream: FakeUpstream) -> (ClaimVoucherUseCase, Arc<FakeUpstream>, ManualClock) {
        let clock = ManualClock::new(NOW);
        let upstream = Arc::new(upstream);
        let sessions = Arc::new(SessionStore::new(clock.clone(), 3600));
        sessions.save_session_cookie("sid", "abc123");
        let use_case = ClaimVoucherUseCase {
            upstream: upstream.clone(),
            sessions,
        };
        (use_case, upstream, clock)
    }

    #[tokio::test]
    async fn when_session_and_voucher_are_valid_then_claim_payload_is_sent() {
        let (use_case, upstream, _) = build(upstream());

        let reply = use_case
            .execute(Some("sid"), "flash1")
            .await
            .expect("expected claim to succeed");

        assert_eq!(reply.status, 200);
        let body = upstream.last_saved_body().expect("expected upstream call");
        assert_eq!(
            body,
            json!({
                "cookie": "SPC_ST=abc123",
                "signature": "s",
                "voucherCode": "C1",
                "promotionId": "1"
            })
        );
    }

    #[tokio::test]
    async fn when_freeship_client_id_is_claimed_then_freeship_voucher_is_used() {
        let (use_case, upstream, _) = build(upstream());

        use_case
            .execute(Some("sid"), "freeship_2")
            .await
            .expect("expected claim to succeed");

        let body = upstream.last_saved_body().expect("expected upstream call");
        assert_eq!(body["promotionId"], "2");
        assert_eq!(body["signature"], "s2");
    }

    #[tokio::test]
    async fn when_no_session_is_registered_then_returns_auth_error_without_upstream_calls() {
        let (use_case, upstream, _) = build(upstream());

        let result = use_case.execute(Some("other"), "flash1").await;
        assert!(matches!(result, Err(RelayError::AuthSession)));

        let result = use_case.execute(None, "flash1").await;
        assert!(matches!(result, Err(RelayError::AuthSession)));

        assert_eq!(upstream.fetch_calls.load(Ordering::SeqCst), 0);
        assert_eq!(upstream.save_calls(), 0);
    }

    #[tokio::test]
    async fn when_session_has_expired_then_returns_auth_error() {
        let (use_case, upstream, clock) = build(upstream());
        clock.set(NOW + 3601);

        let result = use_case.execute(Some("sid"), "flash1").await;

        assert!(matches!(result, Err(RelayError::AuthSession)));
        assert_eq!(upstream.save_calls(), 0);
    }

    #[tokio::test]
    async fn when_client_id_is_unknown_then_returns_not_found_without_claim() {
        let (use_case, upstream, _) = build(upstream());

        let result = use_case.execute(Some("sid"), "nope").await;

        assert!(matches!(result, Err(RelayError::NotFound { .. })));
        assert_eq!(upstream.save_calls(), 0);
    }

    #[tokio::test]
    async fn when_client_id_is_blank_then_returns_validation_error() {
        let (use_case, _, _) = build(upstream());

        let result = use_case.execute(Some("sid"), "   ").await;

        assert!(matches!(result, Err(RelayError::Validation(_))));
    }

    #[tokio::test]
    async fn when_upstream_rejects_claim_then_reply_is_relayed_verbatim() {
        let (use_case, _, _) = build(upstream().with_reply(Ok(UpstreamReply {
            status: 403,
            content_type: Some("text/plain".to_string()),
            body: "denied".to_string(),
        })));

        let reply = use_case
            .execute(Some("sid"), "flash1")
            .await
            .expect("expected upstream reply");

        assert_eq!(reply.status, 403);
        assert_eq!(reply.body, "denied");
    }

    #[tokio::test]
    async fn when_claim_transport_fails_then_returns_upstream_error() {
        let (use_case, _, _) = build(upstream().with_reply(Err(UpstreamError::Transport {
            label: "save voucher",
            message: "connection refused".to_string(),
        })));

        let result = use_case.execute(Some("sid"), "flash1").await;

        assert!(matches!(result, Err(RelayError::Upstream(_))));
    }

    #[tokio::test]
    async fn when_configs_cannot_load_then_returns_upstream_error() {
        let (use_case, upstream, _) = build(upstream().with_base_error(UpstreamError::Status {
            label: "voucher configs",
            status: 503,
        }));

        let result = use_case.execute(Some("sid"), "flash1").await;

        assert!(matches!(result, Err(RelayError::Upstream(_))));
        assert_eq!(upstream.save_calls(), 0);
    }
}
