//! Runtime settings, read from `CT_`-prefixed environment variables
//! (`CT_DB_PATH`, `CT_CACHE_TTL_SECS`). Anything unset falls back to the
//! defaults below.

use config::{Config, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub db_path: String,
    pub cache_ttl_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: "data/ct_miner.sqlite".to_string(),
            cache_ttl_secs: 300,
        }
    }
}

impl Settings {
    pub fn load() -> Settings {
        Config::builder()
            .add_source(Environment::with_prefix("CT"))
            .build()
            .and_then(|conf| conf.try_deserialize())
            .unwrap_or_default()
    }
}
