use std::{collections::HashMap, env, fmt::Display, str::FromStr, time::Duration};

use thiserror::Error;
use url::Url;

use crate::interface_adapters::clients::UpstreamEndpoints;
use crate::use_cases::sessions::DEFAULT_SESSION_TTL_SECONDS;

const DEFAULT_VOUCHER_CONFIGS_URL: &str = "https://otistx.com/api/x7k9m2p4/voucher-configs";
const DEFAULT_FREESHIP_VOUCHERS_URL: &str = "https://api.autopee.com/shopee/freeships?limit=200";
const DEFAULT_SAVE_VOUCHER_URL: &str = "https://api.autopee.com/shopee/save-voucher";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} is not a valid URL ({value}): {source}")]
    InvalidUrl {
        key: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
}

// Runtime settings read once at start-up.
#[derive(Clone, Debug)]
pub struct Settings {
    pub port: u16,
    pub upstream: UpstreamEndpoints,
    pub upstream_timeout: Duration,
    pub frontend_origin: String,
    pub session_cookie_name: String,
    pub session_ttl_seconds: u64,
    // A missing value is reported by storage bootstrap, not here.
    pub database_url: Option<String>,
    pub database_schema: String,
    pub database_table: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&EnvSource)
    }

    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load(source, "PORT", 5000),
            upstream: UpstreamEndpoints {
                voucher_configs: load_url(
                    source,
                    "UPSTREAM_VOUCHER_CONFIGS",
                    DEFAULT_VOUCHER_CONFIGS_URL,
                )?,
                freeship_vouchers: load_url(
                    source,
                    "UPSTREAM_FREESHIP_VOUCHERS",
                    DEFAULT_FREESHIP_VOUCHERS_URL,
                )?,
                save_voucher: load_url(source, "UPSTREAM_SAVE_VOUCHER", DEFAULT_SAVE_VOUCHER_URL)?,
            },
            upstream_timeout: Duration::from_millis(try_load_where(
                source,
                "UPSTREAM_TIMEOUT_MS",
                15_000,
                |millis: &u64| *millis > 0,
            )),
            frontend_origin: load_string(source, "FRONTEND_ORIGIN", "*"),
            session_cookie_name: load_string(source, "SESSION_COOKIE_NAME", "save100_sid"),
            // Cookie Max-Age is signed, so the TTL must fit in an i64.
            session_ttl_seconds: try_load_where(
                source,
                "SESSION_TTL_SECONDS",
                DEFAULT_SESSION_TTL_SECONDS,
                |ttl| i64::try_from(*ttl).is_ok(),
            ),
            database_url: lookup(source, "DATABASE_URL"),
            database_schema: load_string(source, "DATABASE_SCHEMA", "save_voucher"),
            database_table: load_string(source, "DATABASE_TABLE", "account"),
        })
    }
}

// Where settings come from; the process environment outside of tests.
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;
}

pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

impl ConfigSource for HashMap<&str, &str> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).map(|value| value.to_string())
    }
}

// Blank values count as unset.
fn lookup(source: &impl ConfigSource, key: &str) -> Option<String> {
    source
        .get(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn load_string(source: &impl ConfigSource, key: &str, default: &str) -> String {
    lookup(source, key).unwrap_or_else(|| default.to_string())
}

fn try_load<T>(source: &impl ConfigSource, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    try_load_where(source, key, default, |_| true)
}

// Parsed values rejected by `accept` fall back to the default as well.
fn try_load_where<T>(
    source: &impl ConfigSource,
    key: &str,
    default: T,
    accept: impl Fn(&T) -> bool,
) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = lookup(source, key) else {
        return default;
    };
    match raw.parse::<T>() {
        Ok(value) if accept(&value) => value,
        Ok(_) => {
            tracing::warn!(%key, %raw, %default, "value out of range, using default");
            default
        }
        Err(error) => {
            tracing::warn!(%key, %raw, %error, %default, "invalid value, using default");
            default
        }
    }
}

fn load_url(
    source: &impl ConfigSource,
    key: &'static str,
    default: &str,
) -> Result<String, ConfigError> {
    let value = load_string(source, key, default);
    match Url::parse(&value) {
        Ok(_) => Ok(value),
        Err(source) => Err(ConfigError::InvalidUrl { key, value, source }),
    }
}
