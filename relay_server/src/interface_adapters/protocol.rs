use serde::Serialize;
use serde_json::Value;

// Request payload for registering an upstream cookie.
#[derive(Debug, Default)]
pub struct RegisterCookieRequest {
    pub cookie: Option<String>,
}

impl RegisterCookieRequest {
    // Unparsable bodies and non-string cookies read as a missing cookie.
    pub fn from_body(body: &[u8]) -> Self {
        let Ok(payload) = serde_json::from_slice::<Value>(body) else {
            return Self::default();
        };
        Self {
            cookie: payload
                .get("cookie")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

// Plain acknowledgment body.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

// Response payload for the health probe.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub ok: bool,
    pub storage_ready: bool,
}

// Error envelope for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub error: String,
}
