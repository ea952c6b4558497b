use crate::domain::config::{ConfigEntry, VoucherConfiguration};
use crate::domain::entities::NormalizedVoucher;
use crate::domain::voucher::normalize_record_for_save;

/// Finds the voucher a client refers to by its client id.
///
/// Entries are scanned in configuration order and the first match wins.
/// Freeship entries are already normalized, so their stored client id is
/// compared directly; other object entries are normalized with their key as
/// the fallback id.
pub fn find_voucher_by_client_id(
    configs: &VoucherConfiguration,
    client_id: &str,
) -> Option<NormalizedVoucher> {
    if client_id.is_empty() {
        return None;
    }

    configs.iter().find_map(|(key, entry)| match entry {
        ConfigEntry::Freeship(vouchers) => vouchers
            .iter()
            .find(|voucher| voucher.client_id == client_id)
            .cloned(),
        ConfigEntry::Record(record) => normalize_record_for_save(record, key)
            .filter(|voucher| voucher.client_id == client_id),
        ConfigEntry::Other(_) => None,
    })
}
