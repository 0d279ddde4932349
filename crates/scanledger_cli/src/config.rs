//! Operator configuration.
//!
//! A small JSON file supplies what the core deliberately does not know:
//! where the store lives, which courier labels are legal, and where the
//! sync webhook is. The `--endpoint` flag and `SCANLEDGER_ENDPOINT`
//! override the file.

use scanledger_core::{CoreError, Courier};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable consulted for the sync endpoint.
pub const ENDPOINT_ENV: &str = "SCANLEDGER_ENDPOINT";

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "scanledger.json";

/// Store directory used when neither the flag nor the file names one.
pub const DEFAULT_DATA_DIR: &str = "scanledger-data";

/// Request timeout when the file does not set one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Courier labels accepted when the file does not define a roster.
pub const DEFAULT_COURIERS: &[&str] = &["SHOPEE", "LAZADA", "J&T", "FLASH", "NINJAVAN", "KERRY"];

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config file {path}: {source}")]
    Unreadable {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for the expected shape.
    #[error("config file {path} is malformed: {source}")]
    Malformed {
        /// Path that failed.
        path: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A courier label is not in the configured roster.
    #[error("unknown courier {label:?}; configured couriers: {roster}")]
    UnknownCourier {
        /// The rejected label, as given.
        label: String,
        /// Comma-separated allowed labels.
        roster: String,
    },

    /// A courier label failed normalization.
    #[error(transparent)]
    Invalid(#[from] CoreError),
}

/// Operator configuration, merged from the config file and defaults.
///
/// Keys follow the project-wide camelCase JSON convention:
///
/// ```json
/// {
///   "dataDir": "/var/lib/scanledger",
///   "couriers": ["SHOPEE", "FLASH"],
///   "endpoint": "https://hooks.example.com/ingest",
///   "timeoutSecs": 5
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CliConfig {
    /// Store directory; the `--data-dir` flag wins over this.
    pub data_dir: Option<PathBuf>,

    /// Courier labels the scan commands accept.
    pub couriers: Vec<String>,

    /// Sync webhook URL; the flag and the environment win over this.
    pub endpoint: Option<String>,

    /// HTTP timeout for sync requests, in seconds.
    pub timeout_secs: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            couriers: DEFAULT_COURIERS.iter().map(ToString::to_string).collect(),
            endpoint: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl CliConfig {
    /// Loads configuration from `path`, or from [`DEFAULT_CONFIG_FILE`]
    /// when no path is given.
    ///
    /// An explicit path must exist and parse. The default file is
    /// optional: absent means defaults, but present-and-broken is still an
    /// error so a typo cannot silently drop the roster.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Malformed {
            path: path.display().to_string(),
            source,
        })
    }

    /// Validates `label` against the roster and returns the normalized
    /// courier.
    ///
    /// The comparison is against normalized roster entries, so the file
    /// may list couriers in any casing.
    ///
    /// # Errors
    ///
    /// Returns an error if the label is empty or not in the roster.
    pub fn courier(&self, label: &str) -> Result<Courier, ConfigError> {
        let courier = Courier::new(label)?;
        let known = self
            .couriers
            .iter()
            .any(|allowed| allowed.trim().to_uppercase() == courier.as_str());
        if known {
            Ok(courier)
        } else {
            Err(ConfigError::UnknownCourier {
                label: label.to_string(),
                roster: self.couriers.join(", "),
            })
        }
    }

    /// Picks the sync endpoint: flag, then environment, then config file.
    ///
    /// Blank values fall through, so `SCANLEDGER_ENDPOINT=""` does not
    /// shadow the file.
    pub fn resolve_endpoint(&self, flag: Option<&str>, env: Option<&str>) -> Option<String> {
        let pick =
            |value: Option<&str>| value.map(str::trim).filter(|v| !v.is_empty()).map(String::from);
        pick(flag)
            .or_else(|| pick(env))
            .or_else(|| pick(self.endpoint.as_deref()))
    }

    /// HTTP timeout for sync requests.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
