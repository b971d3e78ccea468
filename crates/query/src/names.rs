//! Generated names for remote temporaries.
//!
//! Uploads and loads create remote variables under random names. The name is
//! returned to the caller as a `TempName` handle; nothing reclaims the remote
//! object implicitly. Pass the handle to `QueryContext::release` to drop it.

use crate::config::Config;
use std::fmt;
use uuid::Uuid;

/// Handle to a remote variable created under a generated name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TempName {
    name: String,
}

impl TempName {
    /// Generates a fresh table name, e.g. `TMP_TBL_3f2a9c1d`.
    pub fn table(config: &Config) -> Self {
        Self {
            name: generate(&config.table_prefix, config.suffix_len()),
        }
    }

    /// Wraps a caller-chosen name.
    pub(crate) fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TempName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn generate(prefix: &str, len: usize) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{}{}", prefix, &hex[..len])
}
