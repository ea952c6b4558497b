use crate::interface_adapters::handlers::{
    claim_voucher, health, list_voucher_configs, register_cookie, save_voucher_passthrough,
};
use crate::interface_adapters::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};

const REQUEST_BODY_LIMIT: usize = 1024 * 1024;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/voucher-configs", get(list_voucher_configs))
        .route("/api/session/cookie", post(register_cookie))
        .route("/api/save-voucher", post(save_voucher_passthrough))
        .route("/api/save-voucher/{client_id}", post(claim_voucher))
        .route("/api/health", get(health))
        .layer(DefaultBodyLimit::max(REQUEST_BODY_LIMIT))
        .with_state(state)
}

// Cross-origin policy for the browser frontend; `*` allows any origin.
pub fn cors_layer(allowed_origin: &str) -> CorsLayer {
    let origin = if allowed_origin == "*" {
        AllowOrigin::any()
    } else {
        match HeaderValue::from_str(allowed_origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(error) => {
                tracing::warn!(%allowed_origin, %error, "invalid allowed origin, allowing any");
                AllowOrigin::any()
            }
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}
