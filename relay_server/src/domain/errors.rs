use thiserror::Error;

// Failures talking to an upstream provider.
#[derive(Clone, Debug, Error)]
pub enum UpstreamError {
    #[error("Cannot load {label}: HTTP {status}")]
    Status { label: &'static str, status: u16 },
    #[error("Invalid JSON from {label}")]
    InvalidJson { label: &'static str },
    #[error("Cannot reach {label}: {message}")]
    Transport {
        label: &'static str,
        message: String,
    },
}

// Domain-level errors for relay workflows.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("no valid session cookie, please enter your cookie again")]
    AuthSession,
    #[error("voucher {client_id} not found")]
    NotFound { client_id: String },
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}
