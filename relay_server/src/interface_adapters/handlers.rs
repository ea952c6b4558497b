use crate::domain::errors::RelayError;
use crate::domain::ports::UpstreamReply;
use crate::interface_adapters::protocol::{
    ErrorResponse, HealthResponse, OkResponse, RegisterCookieRequest,
};
use crate::interface_adapters::state::AppState;
use crate::use_cases::claim_voucher::ClaimVoucherUseCase;
use crate::use_cases::load_configs::LoadVoucherConfigsUseCase;
use crate::use_cases::register_cookie::RegisterCookieUseCase;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::{Value, json};

const LIST_CACHE_CONTROL: &str = "public, max-age=30, s-maxage=60, stale-while-revalidate=300";
const DEFAULT_CONTENT_TYPE: &str = "application/json; charset=utf-8";

type HandlerError = (StatusCode, Json<ErrorResponse>);

// Handler returning the merged voucher configuration.
#[tracing::instrument(name = "list_voucher_configs", skip_all)]
pub async fn list_voucher_configs(
    State(state): State<AppState>,
) -> Result<Response, HandlerError> {
    let use_case = LoadVoucherConfigsUseCase {
        upstream: state.upstream.clone(),
    };

    let configs = use_case
        .execute()
        .await
        .map_err(|err| map_relay_error(err.into(), RelayErrorContext::ListConfigs))?;

    tracing::debug!(
        entries = configs.len(),
        freeship = configs.freeship_vouchers().len(),
        "voucher configs merged"
    );

    Ok(([(header::CACHE_CONTROL, LIST_CACHE_CONTROL)], Json(configs)).into_response())
}

// Handler binding an upstream cookie to the caller's relay session.
#[tracing::instrument(name = "register_cookie", skip_all)]
pub async fn register_cookie(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<OkResponse>), HandlerError> {
    let existing = jar
        .get(&state.session_cookie_name)
        .map(|cookie| cookie.value().to_string());
    let payload = RegisterCookieRequest::from_body(&body);

    let use_case = RegisterCookieUseCase {
        sessions: state.sessions.clone(),
    };
    let result = use_case
        .execute(existing.as_deref(), payload.cookie.as_deref().unwrap_or_default())
        .map_err(|err| map_relay_error(err, RelayErrorContext::RegisterCookie))?;

    let max_age = i64::try_from(result.ttl_seconds).unwrap_or(i64::MAX);
    let session_cookie = Cookie::build((
        state.session_cookie_name.to_string(),
        result.session_id.clone(),
    ))
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .secure(is_secure_request(&headers))
    .max_age(time::Duration::seconds(max_age))
    .build();

    tracing::info!(session = %short_id(&result.session_id), "session cookie registered");

    Ok((jar.add(session_cookie), Json(OkResponse { ok: true })))
}

// Handler claiming one voucher with the cookie stored for this session.
#[tracing::instrument(name = "claim_voucher", skip_all, fields(client_id = %client_id))]
pub async fn claim_voucher(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(client_id): Path<String>,
) -> Result<Response, HandlerError> {
    let session_id = jar
        .get(&state.session_cookie_name)
        .map(|cookie| cookie.value().to_string());

    let use_case = ClaimVoucherUseCase {
        upstream: state.upstream.clone(),
        sessions: state.sessions.clone(),
    };
    let reply = use_case
        .execute(session_id.as_deref(), &client_id)
        .await
        .map_err(|err| map_relay_error(err, RelayErrorContext::SaveVoucher))?;

    tracing::info!(status = reply.status, "voucher claim relayed");

    Ok(relay_reply(reply))
}

// Legacy handler forwarding the body to the claim endpoint as-is.
#[tracing::instrument(name = "save_voucher_passthrough", skip_all)]
pub async fn save_voucher_passthrough(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, HandlerError> {
    let payload: Value = if body.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body).map_err(|_| {
            map_relay_error(
                RelayError::Validation("request body must be JSON"),
                RelayErrorContext::SaveVoucher,
            )
        })?
    };

    let reply = state
        .upstream
        .save_voucher(payload)
        .await
        .map_err(|err| map_relay_error(err.into(), RelayErrorContext::SaveVoucher))?;

    Ok(relay_reply(reply))
}

// Handler for the liveness probe.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        storage_ready: state.storage.is_ready(),
    })
}

// Copies the upstream status, content type and body onto our response.
fn relay_reply(reply: UpstreamReply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = reply
        .content_type
        .and_then(|value| HeaderValue::from_str(&value).ok())
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    (status, [(header::CONTENT_TYPE, content_type)], reply.body).into_response()
}

// TLS usually terminates at a proxy, so trust its forwarded scheme.
fn is_secure_request(headers: &HeaderMap) -> bool {
    let forwarded_proto = headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"));

    forwarded_proto
        || headers
            .get(header::FORWARDED)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.to_ascii_lowercase().contains("proto=https"))
}

fn short_id(session_id: &str) -> String {
    session_id.chars().take(8).collect()
}

// Helper to build a JSON error response.
fn error_response(status: StatusCode, message: &str, err: &RelayError) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            message: message.to_string(),
            error: err.to_string(),
        }),
    )
}

// Upstream failures are worded by the endpoint that hit them.
enum RelayErrorContext {
    ListConfigs,
    RegisterCookie,
    SaveVoucher,
}

impl RelayErrorContext {
    fn upstream_message(&self) -> &'static str {
        match self {
            RelayErrorContext::ListConfigs => "Cannot load voucher configs from upstream",
            RelayErrorContext::SaveVoucher => "Cannot save voucher through upstream",
            RelayErrorContext::RegisterCookie => "Upstream error",
        }
    }
}

fn map_relay_error(err: RelayError, context: RelayErrorContext) -> HandlerError {
    match &err {
        RelayError::Validation(_) => {
            error_response(StatusCode::BAD_REQUEST, "Invalid request", &err)
        }
        RelayError::AuthSession => {
            error_response(StatusCode::UNAUTHORIZED, "Session cookie required", &err)
        }
        RelayError::NotFound { .. } => {
            error_response(StatusCode::NOT_FOUND, "Voucher not found", &err)
        }
        RelayError::Upstream(upstream) => {
            tracing::error!(error = %upstream, "upstream call failed");
            error_response(StatusCode::BAD_GATEWAY, context.upstream_message(), &err)
        }
    }
}
