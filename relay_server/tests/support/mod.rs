// Stub upstream and relay servers bound to ephemeral ports.
use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use relay_server::interface_adapters::clients::{HttpVoucherUpstream, UpstreamEndpoints};
use relay_server::interface_adapters::routes;
use relay_server::interface_adapters::state::{AppState, StorageStatus, SystemClock};
use relay_server::use_cases::sessions::SessionStore;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const COOKIE_NAME: &str = "save100_sid";

#[derive(Clone)]
struct StubState {
    base_status: StatusCode,
    saved: Arc<Mutex<Vec<Value>>>,
}

pub struct StubUpstream {
    pub base_url: String,
    // Bodies received by the stub claim endpoint, in arrival order.
    pub saved: Arc<Mutex<Vec<Value>>>,
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server failed");
    });
    format!("http://{addr}")
}

async fn stub_configs(State(state): State<StubState>) -> impl IntoResponse {
    (
        state.base_status,
        Json(json!({
            "flash": {
                "client_id": "flash1",
                "signature": "s",
                "voucherCode": "C1",
                "promotionid": "1"
            }
        })),
    )
}

async fn stub_freeships() -> Json<Value> {
    Json(json!({"data": [{"promotionId": "2", "voucherCode": "C2", "signature": "s2"}]}))
}

async fn stub_save(State(state): State<StubState>, Json(body): Json<Value>) -> impl IntoResponse {
    let promotion_id = body["promotionId"].clone();
    state.saved.lock().expect("saved mutex poisoned").push(body);
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/vnd.stub+json")],
        json!({"error": 0, "claimed": promotion_id}).to_string(),
    )
}

pub async fn spawn_stub_upstream(base_status: StatusCode) -> StubUpstream {
    let saved = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/configs", get(stub_configs))
        .route("/freeships", get(stub_freeships))
        .route("/save", post(stub_save))
        .with_state(StubState {
            base_status,
            saved: saved.clone(),
        });

    StubUpstream {
        base_url: serve(app).await,
        saved,
    }
}

// Start the relay router against the stub upstream and return its base URL.
pub async fn spawn_relay(upstream: &StubUpstream) -> String {
    let endpoints = UpstreamEndpoints {
        voucher_configs: format!("{}/configs", upstream.base_url),
        freeship_vouchers: format!("{}/freeships", upstream.base_url),
        save_voucher: format!("{}/save", upstream.base_url),
    };
    let client = HttpVoucherUpstream::new(endpoints, Duration::from_secs(5))
        .expect("build upstream client");

    let state = AppState {
        sessions: Arc::new(SessionStore::new(SystemClock, 21_600)),
        upstream: Arc::new(client),
        storage: StorageStatus::default(),
        session_cookie_name: Arc::from(COOKIE_NAME),
    };

    serve(routes::app(state).layer(routes::cors_layer("*"))).await
}
