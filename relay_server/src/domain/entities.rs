use serde::{Deserialize, Serialize};

// Canonical voucher shape shared by the list and claim paths.
// Field names on the wire follow the upstream freeship payload so the
// frontend can read both categories the same way.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedVoucher {
    pub benefit_name: String,
    #[serde(rename = "voucherIdString")]
    pub voucher_id: String,
    pub voucher_code: String,
    #[serde(rename = "userSignature")]
    pub signature: String,
    pub client_id: String,
    pub last_updated: Option<String>,
}

// Borrowed upstream cookie stored against one relay session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub session_id: String,
    pub cookie: String,
    pub expires_at: u64,
}
