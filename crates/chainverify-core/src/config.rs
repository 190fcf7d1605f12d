//! Verifier configuration.
//!
//! Loaded from YAML; every field has a default so a partial file only
//! overrides what it names.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::network::{flare, EvmNetwork, LedgerNetwork, NetworkTable};

/// Log level per component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Global default level: "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default = "default_level")]
    pub level: String,
    /// Override per component: component_name → level
    #[serde(default)]
    pub components: HashMap<String, String>,
    /// Emit JSON structured logs (true) or human-readable text (false)
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            components: HashMap::new(),
            json: false,
        }
    }
}

/// Retry settings for the HTTP JSON-RPC transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_max_retries() -> u32 { 2 }
fn default_backoff_ms() -> u64 { 250 }
fn default_request_timeout_secs() -> u64 { 15 }

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_backoff_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Upper bound on one whole verification; expiry is reported as no result.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_evm_networks")]
    pub evm_networks: Vec<EvmNetwork>,
    #[serde(default = "default_ledger_networks")]
    pub ledger_networks: Vec<LedgerNetwork>,
    /// JSON contract registry produced by `chainverify registry`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_path: Option<PathBuf>,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub log: LogConfig,
}

fn default_timeout_secs() -> u64 { 60 }

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            evm_networks: default_evm_networks(),
            ledger_networks: default_ledger_networks(),
            registry_path: None,
            retry: RetrySettings::default(),
            log: LogConfig::default(),
        }
    }
}

impl VerifierConfig {
    /// Parse a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Reject duplicate network ids within a family.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for n in &self.evm_networks {
            if !seen.insert(n.chain_id) {
                return Err(ConfigError::DuplicateNetwork { kind: "evm", id: n.chain_id });
            }
        }
        let mut seen = HashSet::new();
        for n in &self.ledger_networks {
            if !seen.insert(n.network_id) {
                return Err(ConfigError::DuplicateNetwork {
                    kind: "ledger",
                    id: n.network_id as u64,
                });
            }
        }
        Ok(())
    }

    pub fn network_table(&self) -> NetworkTable {
        NetworkTable::new(self.evm_networks.clone(), self.ledger_networks.clone())
    }
}

fn evm(chain_id: u64, name: &str, api: &str, explorer: &str, code: &str) -> EvmNetwork {
    EvmNetwork {
        chain_id,
        name: name.into(),
        rpc_url: format!("https://{api}/ext/C/rpc"),
        explorer_api_url: Some(format!("https://{explorer}/api")),
        repository_code: Some(code.into()),
    }
}

fn ledger(network_id: u32, name: &str, api: &str, hrp: &str) -> LedgerNetwork {
    LedgerNetwork {
        network_id,
        name: name.into(),
        api_url: format!("https://{api}"),
        hrp: hrp.into(),
        context: None,
    }
}

fn default_evm_networks() -> Vec<EvmNetwork> {
    vec![
        evm(flare::EVM_FLARE, "Flare Mainnet", "flare-api.flare.network", "flare-explorer.flare.network", "flare"),
        evm(flare::EVM_SONGBIRD, "Songbird Canary-Network", "songbird-api.flare.network", "songbird-explorer.flare.network", "songbird"),
        evm(flare::EVM_COSTON2, "Flare Testnet Coston2", "coston2-api.flare.network", "coston2-explorer.flare.network", "coston2"),
        evm(flare::EVM_COSTON, "Flare Testnet Coston", "coston-api.flare.network", "coston-explorer.flare.network", "coston"),
    ]
}

fn default_ledger_networks() -> Vec<LedgerNetwork> {
    vec![
        ledger(flare::LEDGER_FLARE, "Flare Mainnet", "flare-api.flare.network", "flare"),
        ledger(flare::LEDGER_SONGBIRD, "Songbird Canary-Network", "songbird-api.flare.network", "songbird"),
        ledger(flare::LEDGER_COSTON2, "Flare Testnet Coston2", "coston2-api.flare.network", "costwo"),
        ledger(flare::LEDGER_COSTON, "Flare Testnet Coston", "coston-api.flare.network", "coston"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_covers_flare_networks() {
        let t = VerifierConfig::default().network_table();
        assert_eq!(t.evm_description(19), "Songbird Canary-Network");
        assert_eq!(t.ledger_description(5), "Songbird Canary-Network");
        assert_eq!(t.ledger(114).unwrap().hrp, "costwo");
        assert_eq!(
            t.evm(14).unwrap().rpc_url,
            "https://flare-api.flare.network/ext/C/rpc"
        );
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg = VerifierConfig::from_yaml("timeout_secs: 5\nlog:\n  level: debug\n").unwrap();
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.log.level, "debug");
        assert_eq!(cfg.evm_networks.len(), 4);
        assert_eq!(cfg.retry, RetrySettings::default());
    }

    #[test]
    fn yaml_overrides_networks() {
        let yaml = r#"
evm_networks:
  - chain_id: 31337
    name: Local
    rpc_url: http://127.0.0.1:8545
ledger_networks: []
"#;
        let cfg = VerifierConfig::from_yaml(yaml).unwrap();
        let t = cfg.network_table();
        assert!(t.is_known_evm(31337));
        assert!(!t.is_known_evm(14));
        assert!(t.ledger_networks().is_empty());
    }

    #[test]
    fn example_file_parses() {
        let cfg = VerifierConfig::from_yaml(include_str!("../../../config/chainverify.example.yaml")).unwrap();
        assert_eq!(cfg.evm_networks.len(), 2);
        assert_eq!(cfg.registry_path, Some(PathBuf::from("contracts.json")));
        assert_eq!(cfg.log.components.get("chainverify-evm").map(String::as_str), Some("info"));
    }

    #[test]
    fn duplicate_network_rejected() {
        let yaml = r#"
evm_networks:
  - { chain_id: 1, name: a, rpc_url: x }
  - { chain_id: 1, name: b, rpc_url: y }
"#;
        assert!(matches!(
            VerifierConfig::from_yaml(yaml),
            Err(ConfigError::DuplicateNetwork { kind: "evm", id: 1 })
        ));
    }
}
