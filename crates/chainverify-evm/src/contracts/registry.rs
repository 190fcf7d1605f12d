//! Static contract registry: per chain id, lowercase address → `{name, abi}`.
//!
//! ```json
//! { "14": { "0x1d80…": { "address": "0x1d80…", "name": "WNat", "abi": [ … ] } } }
//! ```

use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::contracts::ContractMetadata;
use crate::error::ContractError;

/// One registry entry; `abi` is kept as raw JSON until it is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub address: String,
    pub name: String,
    pub abi: serde_json::Value,
}

impl RegistryEntry {
    pub fn metadata(&self) -> Result<ContractMetadata, ContractError> {
        let abi: JsonAbi = serde_json::from_value(self.abi.clone()).map_err(|e| ContractError::InvalidAbi {
            origin: format!("registry entry {}", self.address),
            reason: e.to_string(),
        })?;
        Ok(ContractMetadata { name: self.name.clone(), abi })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractRegistry {
    chains: BTreeMap<u64, BTreeMap<String, RegistryEntry>>,
}

fn key(address: &Address) -> String {
    format!("{address:#x}")
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, ContractError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ContractError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json_pretty(&self) -> Result<String, ContractError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn insert(&mut self, chain_id: u64, address: &Address, name: impl Into<String>, abi: serde_json::Value) {
        let address = key(address);
        let entry = RegistryEntry { address: address.clone(), name: name.into(), abi };
        self.chains.entry(chain_id).or_default().insert(address, entry);
    }

    pub fn entry(&self, chain_id: u64, address: &Address) -> Option<&RegistryEntry> {
        self.chains.get(&chain_id)?.get(&key(address))
    }

    /// Metadata for `address`; an entry whose ABI does not parse counts as absent.
    pub fn get(&self, chain_id: u64, address: &Address) -> Option<ContractMetadata> {
        let entry = self.entry(chain_id, address)?;
        match entry.metadata() {
            Ok(m) => Some(m),
            Err(e) => {
                tracing::warn!(chain_id, address = %entry.address, error = %e, "skipping registry entry");
                None
            }
        }
    }

    /// Number of entries across all chains.
    pub fn len(&self) -> usize {
        self.chains.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use serde_json::json;

    const WNAT: Address = address!("1D80c49BbBCd1C0911346656B529DF9E5c2F783d");

    fn abi() -> serde_json::Value {
        json!([{
            "type": "function", "name": "deposit", "inputs": [], "outputs": [],
            "stateMutability": "payable"
        }])
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let json = json!({
            "14": {
                "0x1d80c49bbbcd1c0911346656b529df9e5c2f783d": {
                    "address": "0x1d80c49bbbcd1c0911346656b529df9e5c2f783d",
                    "name": "WNat",
                    "abi": abi()
                }
            }
        })
        .to_string();
        let registry = ContractRegistry::from_json(&json).unwrap();
        let meta = registry.get(14, &WNAT).unwrap();
        assert_eq!(meta.name, "WNat");
        assert_eq!(meta.abi.functions().count(), 1);
        assert!(registry.get(19, &WNAT).is_none());
    }

    #[test]
    fn insert_then_serialize_roundtrip() {
        let mut registry = ContractRegistry::new();
        registry.insert(19, &WNAT, "WNat", abi());
        let reloaded = ContractRegistry::from_json(&registry.to_json_pretty().unwrap()).unwrap();
        assert_eq!(reloaded, registry);
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.to_json_pretty().unwrap().contains("\"19\""));
    }

    #[test]
    fn broken_abi_counts_as_absent() {
        let mut registry = ContractRegistry::new();
        registry.insert(14, &WNAT, "Broken", json!({ "not": "an abi" }));
        assert!(registry.entry(14, &WNAT).is_some());
        assert!(registry.get(14, &WNAT).is_none());
    }
}
