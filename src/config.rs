// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `ENCLAVE_IPC_PATH` | Unix socket of the enclave | `/tmp/tm.ipc` |
//! | `ENCLAVE_PUBLIC_KEY` | Sender's enclave public key (base64) | Required for sends |
//! | `ETH_RPC_URL` | Node JSON-RPC endpoint used for nonces | `http://localhost:8545` |
//! | `SIGNER_KEY_PEM` | Path to the PEM-encoded signing key | Optional |
//! | `PRIVATE_FOR` | Comma-separated recipient enclave keys | Empty (public) |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::path::PathBuf;

/// Environment variable name for the enclave socket path.
pub const ENCLAVE_IPC_PATH_ENV: &str = "ENCLAVE_IPC_PATH";

/// Environment variable name for the sender's enclave public key.
pub const ENCLAVE_PUBLIC_KEY_ENV: &str = "ENCLAVE_PUBLIC_KEY";

/// Environment variable name for the node RPC URL.
pub const ETH_RPC_URL_ENV: &str = "ETH_RPC_URL";

/// Environment variable name for the signing key PEM file.
pub const SIGNER_KEY_PEM_ENV: &str = "SIGNER_KEY_PEM";

/// Environment variable name for the default recipient list.
pub const PRIVATE_FOR_ENV: &str = "PRIVATE_FOR";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default enclave socket (Tessera's conventional IPC file).
pub const DEFAULT_ENCLAVE_IPC_PATH: &str = "/tmp/tm.ipc";

/// Default node endpoint.
pub const DEFAULT_ETH_RPC_URL: &str = "http://localhost:8545";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub ipc_path: PathBuf,
    pub public_key: Option<String>,
    pub rpc_url: String,
    pub signer_key_pem: Option<PathBuf>,
    pub private_for: Vec<String>,
    pub log_format: LogFormat,
}

impl BridgeConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup` (useful for testing).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            ipc_path: non_empty(ENCLAVE_IPC_PATH_ENV)
                .unwrap_or_else(|| DEFAULT_ENCLAVE_IPC_PATH.to_string())
                .into(),
            public_key: non_empty(ENCLAVE_PUBLIC_KEY_ENV),
            rpc_url: non_empty(ETH_RPC_URL_ENV).unwrap_or_else(|| DEFAULT_ETH_RPC_URL.to_string()),
            signer_key_pem: non_empty(SIGNER_KEY_PEM_ENV).map(PathBuf::from),
            private_for: non_empty(PRIVATE_FOR_ENV)
                .map(|raw| parse_key_list(&raw))
                .unwrap_or_default(),
            log_format: LogFormat::parse(lookup(LOG_FORMAT_ENV).as_deref()),
        }
    }
}

/// Split a comma-separated key list, dropping blanks.
pub fn parse_key_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> BridgeConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BridgeConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = config_from(&[]);
        assert_eq!(config.ipc_path, PathBuf::from(DEFAULT_ENCLAVE_IPC_PATH));
        assert_eq!(config.rpc_url, DEFAULT_ETH_RPC_URL);
        assert!(config.public_key.is_none());
        assert!(config.signer_key_pem.is_none());
        assert!(config.private_for.is_empty());
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn reads_all_variables() {
        let config = config_from(&[
            (ENCLAVE_IPC_PATH_ENV, "/run/tessera/tm.ipc"),
            (ENCLAVE_PUBLIC_KEY_ENV, "BULeR8JyUWhiuuCMU/HLA0Q5pzkYT+cHII3ZKBey3Bo="),
            (ETH_RPC_URL_ENV, "http://node:22000"),
            (SIGNER_KEY_PEM_ENV, "/keys/key1.pem"),
            (PRIVATE_FOR_ENV, " a= , ,b= "),
            (LOG_FORMAT_ENV, "JSON"),
        ]);
        assert_eq!(config.ipc_path, PathBuf::from("/run/tessera/tm.ipc"));
        assert_eq!(
            config.public_key.as_deref(),
            Some("BULeR8JyUWhiuuCMU/HLA0Q5pzkYT+cHII3ZKBey3Bo=")
        );
        assert_eq!(config.rpc_url, "http://node:22000");
        assert_eq!(config.signer_key_pem, Some(PathBuf::from("/keys/key1.pem")));
        assert_eq!(config.private_for, vec!["a=".to_string(), "b=".to_string()]);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[(ENCLAVE_IPC_PATH_ENV, "  "), (ENCLAVE_PUBLIC_KEY_ENV, "")]);
        assert_eq!(config.ipc_path, PathBuf::from(DEFAULT_ENCLAVE_IPC_PATH));
        assert!(config.public_key.is_none());
    }
}
