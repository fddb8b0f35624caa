//! Deployment configuration for a shoplist application instance.
//!
//! Configuration is read once (from `shoplist.toml` or an inline string) and
//! validated before any runtime component is built from it.

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error as ThisError;

/// Application id the in-process host assigns on creation.
pub const DEFAULT_APP_ID: u64 = 1;

/// Default global integer slots (only `Count`).
pub const DEFAULT_GLOBAL_UINTS: u64 = 1;

/// Default global byte-string slots; one slot is left for the `Count` entry
/// within the host's 64-entry ceiling.
pub const DEFAULT_GLOBAL_BYTE_SLICES: u64 = 63;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

///
/// LayoutKind
///
/// Record layout selector. `full` stores four fields per record; `minimal`
/// stores a single opaque item and only allows add/remove.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    #[default]
    Full,
    Minimal,
}

impl LayoutKind {
    /// Number of global byte-string entries one record occupies.
    #[must_use]
    pub const fn fields_per_record(self) -> u64 {
        match self {
            Self::Full => 4,
            Self::Minimal => 1,
        }
    }
}

///
/// ListConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListConfig {
    pub layout: LayoutKind,

    /// Upper bound on `Count`. Also bounds the work a single clear-all does.
    pub max_records: Option<u64>,
}

///
/// HostConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    pub app_id: u64,
    pub global_uints: u64,
    pub global_byte_slices: u64,
    pub debug: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            app_id: DEFAULT_APP_ID,
            global_uints: DEFAULT_GLOBAL_UINTS,
            global_byte_slices: DEFAULT_GLOBAL_BYTE_SLICES,
            debug: false,
        }
    }
}

///
/// ShoplistConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShoplistConfig {
    pub list: ListConfig,
    pub host: HostConfig,
}

impl ShoplistConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.app_id == 0 {
            return Err(ConfigError::Invalid(
                "host.app_id must be non-zero; 0 is the creation sentinel".to_string(),
            ));
        }

        if self.host.global_uints == 0 {
            return Err(ConfigError::Invalid(
                "host.global_uints must reserve a slot for Count".to_string(),
            ));
        }

        if let Some(max_records) = self.list.max_records {
            let needed = max_records
                .checked_mul(self.list.layout.fields_per_record())
                .ok_or_else(|| ConfigError::Invalid("list.max_records overflows".to_string()))?;

            if needed > self.host.global_byte_slices {
                return Err(ConfigError::Invalid(format!(
                    "list.max_records = {max_records} needs {needed} byte slots, host.global_byte_slices = {}",
                    self.host.global_byte_slices
                )));
            }
        }

        Ok(())
    }
}

///
/// TESTS
///
