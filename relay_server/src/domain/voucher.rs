use serde_json::{Map, Value};

use crate::domain::entities::NormalizedVoucher;

// Namespace tag keeping freeship ids apart from other categories that share
// the same promotion id space.
pub const FREESHIP_CLIENT_ID_PREFIX: &str = "freeship_";

const DEFAULT_BENEFIT_NAME: &str = "Voucher Freeship";

// Accepted provider field names per canonical field, in priority order.
const PROMOTION_ID_FIELDS: &[&str] = &["promotionId", "promotionid", "voucherIdString"];
const VOUCHER_CODE_FIELDS: &[&str] = &["voucherCode", "voucher_code"];
const SIGNATURE_FIELDS: &[&str] = &["signature", "userSignature"];
const BENEFIT_NAME_FIELDS: &[&str] = &["benefitName", "voucherName", "voucherCode"];
const LAST_UPDATED_FIELDS: &[&str] = &["updatedAt", "lastUpdated"];
pub(crate) const CLIENT_ID_FIELDS: &[&str] = &["clientId", "client_id"];

// Upstream marks unusable vouchers with any of these set to `true`.
const UNAVAILABLE_FLAGS: &[&str] = &["hasExpired", "disabled", "hidden"];

/// Normalizes one entry of the freeship list.
///
/// Returns `None` for non-objects, for records flagged as expired, disabled or
/// hidden, and for records missing a promotion id, voucher code or signature.
pub fn normalize_freeship_voucher(raw: &Value) -> Option<NormalizedVoucher> {
    let record = raw.as_object()?;
    if UNAVAILABLE_FLAGS
        .iter()
        .any(|flag| record.get(*flag) == Some(&Value::Bool(true)))
    {
        return None;
    }

    let required = RequiredFields::extract(record)?;
    let client_id = freeship_client_id(&required.promotion_id);
    Some(required.into_voucher(record, client_id))
}

/// Normalizes a voucher-like record before a claim.
///
/// Uses the same aliases and required fields as the freeship path, but keeps
/// the record's own client id and falls back to `fallback_client_id` when it
/// carries none. Availability flags are not consulted here.
pub fn normalize_voucher_for_save(
    raw: &Value,
    fallback_client_id: &str,
) -> Option<NormalizedVoucher> {
    normalize_record_for_save(raw.as_object()?, fallback_client_id)
}

pub(crate) fn normalize_record_for_save(
    record: &Map<String, Value>,
    fallback_client_id: &str,
) -> Option<NormalizedVoucher> {
    let required = RequiredFields::extract(record)?;
    let client_id = first_truthy_text(record, CLIENT_ID_FIELDS)
        .unwrap_or_else(|| fallback_client_id.to_string());
    Some(required.into_voucher(record, client_id))
}

pub fn freeship_client_id(promotion_id: &str) -> String {
    format!("{FREESHIP_CLIENT_ID_PREFIX}{promotion_id}")
}

struct RequiredFields {
    promotion_id: String,
    voucher_code: String,
    signature: String,
}

impl RequiredFields {
    fn extract(record: &Map<String, Value>) -> Option<Self> {
        Some(Self {
            promotion_id: first_present_text(record, PROMOTION_ID_FIELDS)?,
            voucher_code: first_present_text(record, VOUCHER_CODE_FIELDS)?,
            signature: first_present_text(record, SIGNATURE_FIELDS)?,
        })
    }

    fn into_voucher(self, record: &Map<String, Value>, client_id: String) -> NormalizedVoucher {
        NormalizedVoucher {
            benefit_name: first_truthy_text(record, BENEFIT_NAME_FIELDS)
                .unwrap_or_else(|| DEFAULT_BENEFIT_NAME.to_string()),
            voucher_id: self.promotion_id,
            voucher_code: self.voucher_code,
            signature: self.signature,
            client_id,
            last_updated: first_truthy_text(record, LAST_UPDATED_FIELDS),
        }
    }
}

// The first non-null alias wins, even when its value turns out to be empty.
fn first_present_text(record: &Map<String, Value>, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .find_map(|field| record.get(*field).filter(|value| !value.is_null()))
        .and_then(scalar_text)
}

// Skips over empty aliases until one carries a usable value.
fn first_truthy_text(record: &Map<String, Value>, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .find_map(|field| record.get(*field).and_then(scalar_text))
}

// Empty strings and numeric zero count as missing.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) if number.as_f64() != Some(0.0) => Some(number.to_string()),
        _ => None,
    }
}
