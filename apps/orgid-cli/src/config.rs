// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names and defaults. Command-line flags take
//! precedence where both exist.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `ORGID_PROJECT_DIR` | Directory holding the project file and documents | current directory |
//! | `ORGID_PROJECT_FILE` | Project file name | `orgid.json` |
//! | `SAFE_TX_SERVICE_URL` | Safe transaction service override | per-chain `safe.global` host |
//! | `WEB3_STORAGE_API_URL` | Pinning service API | `https://api.web3.storage` |
//! | `IPFS_GATEWAY_URL` | Gateway used to fetch `ipfs://` documents | `https://w3s.link` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `warn` |

use std::env;
use std::path::PathBuf;

use crate::storage::PROJECT_FILE_NAME;

/// Environment variable name for the project directory.
pub const PROJECT_DIR_ENV: &str = "ORGID_PROJECT_DIR";

/// Environment variable name for the project file name.
pub const PROJECT_FILE_ENV: &str = "ORGID_PROJECT_FILE";

/// Environment variable name for the Safe transaction service base URL.
///
/// When unset the service is derived from the Safe's chain prefix.
pub const SAFE_TX_SERVICE_URL_ENV: &str = "SAFE_TX_SERVICE_URL";

/// Environment variable name for the web3.storage API URL.
pub const WEB3_STORAGE_API_URL_ENV: &str = "WEB3_STORAGE_API_URL";
pub const DEFAULT_WEB3_STORAGE_API_URL: &str = "https://api.web3.storage";

/// Environment variable name for the IPFS gateway.
pub const IPFS_GATEWAY_URL_ENV: &str = "IPFS_GATEWAY_URL";
pub const DEFAULT_IPFS_GATEWAY_URL: &str = "https://w3s.link";

/// Environment variable name for the log format (`json` or `pretty`).
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// API key id of the web3.storage token.
pub const WEB3_STORAGE_KEY_ID: &str = "w3s";

/// Settings resolved once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub project_dir: PathBuf,
    pub project_file: String,
    pub safe_service_url: Option<String>,
    pub web3_storage_url: String,
    pub ipfs_gateway_url: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            project_dir: non_empty(PROJECT_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            project_file: non_empty(PROJECT_FILE_ENV)
                .unwrap_or_else(|| PROJECT_FILE_NAME.to_string()),
            safe_service_url: non_empty(SAFE_TX_SERVICE_URL_ENV),
            web3_storage_url: non_empty(WEB3_STORAGE_API_URL_ENV)
                .unwrap_or_else(|| DEFAULT_WEB3_STORAGE_API_URL.to_string()),
            ipfs_gateway_url: non_empty(IPFS_GATEWAY_URL_ENV)
                .unwrap_or_else(|| DEFAULT_IPFS_GATEWAY_URL.to_string()),
        }
    }

    /// Same settings rooted at `dir` (the `--project` flag).
    pub fn with_project_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_dir = dir.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_apply_when_unset() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings.project_dir, PathBuf::from("."));
        assert_eq!(settings.project_file, "orgid.json");
        assert_eq!(settings.safe_service_url, None);
        assert_eq!(settings.web3_storage_url, DEFAULT_WEB3_STORAGE_API_URL);
        assert_eq!(settings.ipfs_gateway_url, DEFAULT_IPFS_GATEWAY_URL);
    }

    #[test]
    fn environment_overrides_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (PROJECT_DIR_ENV, "/tmp/project"),
            (SAFE_TX_SERVICE_URL_ENV, "http://localhost:8000/api/v1"),
            (IPFS_GATEWAY_URL_ENV, "  "),
        ]);
        let settings = Settings::from_lookup(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(settings.project_dir, PathBuf::from("/tmp/project"));
        assert_eq!(
            settings.safe_service_url.as_deref(),
            Some("http://localhost:8000/api/v1")
        );
        assert_eq!(settings.ipfs_gateway_url, DEFAULT_IPFS_GATEWAY_URL);
    }

    #[test]
    fn project_flag_replaces_directory() {
        let settings = Settings::from_lookup(|_| None).with_project_dir("/srv/org");
        assert_eq!(settings.project_dir, PathBuf::from("/srv/org"));
    }
}
