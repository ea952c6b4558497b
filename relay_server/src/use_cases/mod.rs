pub mod claim_voucher;
pub mod load_configs;
pub mod register_cookie;
pub mod sessions;

#[cfg(test)]
pub(crate) mod test_support;
