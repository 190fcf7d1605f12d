//! Network tables for both chain families.
//!
//! Tables are plain data built from [`crate::config::VerifierConfig`] and
//! injected into each verifier, so tests can substitute fixture networks.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An account-model (EVM) network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmNetwork {
    pub chain_id: u64,
    pub name: String,
    /// JSON-RPC endpoint, e.g. "https://flare-api.flare.network/ext/C/rpc"
    pub rpc_url: String,
    /// Etherscan/Blockscout compatible API base, e.g. "https://flare-explorer.flare.network/api"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_api_url: Option<String>,
    /// Slug used in the platform-contract deployment lists ("flare", "coston2", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_code: Option<String>,
}

/// Chain context values pinned in configuration instead of queried over RPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticContext {
    /// CB58 native asset id
    pub native_asset_id: String,
    /// CB58 P-chain id
    pub p_chain_id: String,
    /// CB58 C-chain id
    pub c_chain_id: String,
}

/// A ledger-model (P-chain / atomic C-chain) network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerNetwork {
    pub network_id: u32,
    pub name: String,
    /// Node API origin, e.g. "https://flare-api.flare.network"
    pub api_url: String,
    /// Bech32 human-readable part of addresses on this network
    pub hrp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<StaticContext>,
}

/// Lookup tables over the configured networks.
#[derive(Debug, Clone, Default)]
pub struct NetworkTable {
    evm: HashMap<u64, EvmNetwork>,
    ledger: HashMap<u32, LedgerNetwork>,
}

impl NetworkTable {
    pub fn new(evm: Vec<EvmNetwork>, ledger: Vec<LedgerNetwork>) -> Self {
        Self {
            evm: evm.into_iter().map(|n| (n.chain_id, n)).collect(),
            ledger: ledger.into_iter().map(|n| (n.network_id, n)).collect(),
        }
    }

    pub fn evm(&self, chain_id: u64) -> Option<&EvmNetwork> {
        self.evm.get(&chain_id)
    }

    pub fn ledger(&self, network_id: u32) -> Option<&LedgerNetwork> {
        self.ledger.get(&network_id)
    }

    pub fn is_known_evm(&self, chain_id: u64) -> bool {
        self.evm.contains_key(&chain_id)
    }

    pub fn is_known_ledger(&self, network_id: u32) -> bool {
        self.ledger.contains_key(&network_id)
    }

    /// Display name, or the numeric id for unknown networks.
    pub fn evm_description(&self, chain_id: u64) -> String {
        self.evm(chain_id)
            .map(|n| n.name.clone())
            .unwrap_or_else(|| chain_id.to_string())
    }

    /// Display name, or the numeric id for unknown networks.
    pub fn ledger_description(&self, network_id: u32) -> String {
        self.ledger(network_id)
            .map(|n| n.name.clone())
            .unwrap_or_else(|| network_id.to_string())
    }

    /// EVM networks sorted by chain id.
    pub fn evm_networks(&self) -> Vec<&EvmNetwork> {
        let mut v: Vec<_> = self.evm.values().collect();
        v.sort_by_key(|n| n.chain_id);
        v
    }

    /// Ledger networks sorted by network id.
    pub fn ledger_networks(&self) -> Vec<&LedgerNetwork> {
        let mut v: Vec<_> = self.ledger.values().collect();
        v.sort_by_key(|n| n.network_id);
        v
    }
}

/// Well-known Flare network ids.
pub mod flare {
    pub const EVM_FLARE: u64 = 14;
    pub const EVM_SONGBIRD: u64 = 19;
    pub const EVM_COSTON2: u64 = 114;
    pub const EVM_COSTON: u64 = 16;

    pub const LEDGER_FLARE: u32 = 14;
    pub const LEDGER_SONGBIRD: u32 = 5;
    pub const LEDGER_COSTON2: u32 = 114;
    pub const LEDGER_COSTON: u32 = 7;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> NetworkTable {
        NetworkTable::new(
            vec![EvmNetwork {
                chain_id: 14,
                name: "Flare Mainnet".into(),
                rpc_url: "http://localhost".into(),
                explorer_api_url: None,
                repository_code: None,
            }],
            vec![LedgerNetwork {
                network_id: 5,
                name: "Songbird Canary-Network".into(),
                api_url: "http://localhost".into(),
                hrp: "songbird".into(),
                context: None,
            }],
        )
    }

    #[test]
    fn unknown_network_displays_numeric_id() {
        let t = table();
        assert_eq!(t.evm_description(14), "Flare Mainnet");
        assert_eq!(t.evm_description(99), "99");
        assert_eq!(t.ledger_description(5), "Songbird Canary-Network");
        assert_eq!(t.ledger_description(6), "6");
    }

    #[test]
    fn families_are_keyed_separately() {
        let t = table();
        assert!(t.is_known_evm(14));
        assert!(!t.is_known_ledger(14));
    }
}
