use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::domain::entities::NormalizedVoucher;
use crate::domain::voucher::{CLIENT_ID_FIELDS, scalar_text};

// Reserved key holding the freeship list in the merged configuration.
pub const FREESHIP_KEY: &str = "freeship_vouchers";

const CLIENT_ID_KEY: &str = "clientId";

// One value of the merged configuration mapping.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigEntry {
    Freeship(Vec<NormalizedVoucher>),
    Record(Map<String, Value>),
    // Non-object base values are passed through untouched.
    Other(Value),
}

/// Merged voucher configuration, rebuilt on every list or claim request.
///
/// Keys keep the order they had in the base document; the freeship list is
/// appended at the end unless the base document already had that key.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VoucherConfiguration {
    entries: Vec<(String, ConfigEntry)>,
}

impl VoucherConfiguration {
    /// Builds the mapping from the base document, stamping every object entry
    /// with a `clientId` taken from its own id fields or from its key.
    pub fn from_base(base: Value) -> Self {
        let Value::Object(document) = base else {
            return Self::default();
        };

        let entries = document
            .into_iter()
            .map(|(key, value)| {
                let entry = match value {
                    _ if key == FREESHIP_KEY => ConfigEntry::Freeship(Vec::new()),
                    Value::Object(mut record) => {
                        let client_id = CLIENT_ID_FIELDS
                            .iter()
                            .find_map(|field| record.get(*field).and_then(scalar_text))
                            .unwrap_or_else(|| key.clone());
                        record.insert(CLIENT_ID_KEY.to_string(), Value::String(client_id));
                        ConfigEntry::Record(record)
                    }
                    other => ConfigEntry::Other(other),
                };
                (key, entry)
            })
            .collect();

        Self { entries }
    }

    // Replaces the freeship list in place, or appends it when absent.
    pub fn set_freeship_vouchers(&mut self, vouchers: Vec<NormalizedVoucher>) {
        match self.entries.iter_mut().find(|(key, _)| key == FREESHIP_KEY) {
            Some((_, entry)) => *entry = ConfigEntry::Freeship(vouchers),
            None => self
                .entries
                .push((FREESHIP_KEY.to_string(), ConfigEntry::Freeship(vouchers))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ConfigEntry> {
        self.entries
            .iter()
            .find(|(entry_key, _)| entry_key == key)
            .map(|(_, entry)| entry)
    }

    pub fn freeship_vouchers(&self) -> &[NormalizedVoucher] {
        match self.get(FREESHIP_KEY) {
            Some(ConfigEntry::Freeship(vouchers)) => vouchers,
            _ => &[],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ConfigEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigEntry::Freeship(vouchers) => vouchers.serialize(serializer),
            ConfigEntry::Record(record) => record.serialize(serializer),
            ConfigEntry::Other(value) => value.serialize(serializer),
        }
    }
}

impl Serialize for VoucherConfiguration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, entry) in &self.entries {
            map.serialize_entry(key, entry)?;
        }
        map.end()
    }
}
