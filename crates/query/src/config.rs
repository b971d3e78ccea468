//! Builder configuration.

use serde::{Deserialize, Serialize};
use tabula_core::{Error, Result};

/// Settings shared by every expression created from one `QueryContext`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prefix of generated temporary table names.
    pub table_prefix: String,
    /// Number of random hex digits appended to generated names.
    pub name_suffix_len: usize,
    /// Log every dispatched statement at info level instead of debug.
    pub log_queries: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table_prefix: "TMP_TBL_".into(),
            name_suffix_len: 8,
            log_queries: false,
        }
    }
}

impl Config {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::config(e.to_string()))
    }

    /// Returns the suffix length clamped to what a v4 UUID can supply.
    pub(crate) fn suffix_len(&self) -> usize {
        self.name_suffix_len.clamp(1, 32)
    }
}
