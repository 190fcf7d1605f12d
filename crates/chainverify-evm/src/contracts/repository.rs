//! Platform-contract recognition from the public deployment address lists.
//!
//! Each list is a JSON array published per network; entries carry either an
//! `address` or an `addresses` array. The `#NETWORK` placeholder of a source
//! URL is replaced by the network's repository code (`flare`, `songbird`,
//! `coston2`, `coston`).

use alloy_primitives::Address;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::ContractError;

pub const NETWORK_PLACEHOLDER: &str = "#NETWORK";

pub const SMART_CONTRACTS_V2_URL: &str =
    "https://raw.githubusercontent.com/flare-foundation/flare-smart-contracts-v2/refs/heads/main/deployment/deploys/all/#NETWORK.json";
pub const FASSET_CONTRACTS_URL: &str =
    "https://raw.githubusercontent.com/flare-labs-ltd/fassets/refs/heads/open_beta/deployment/deploys/#NETWORK.json";
pub const SMART_CONTRACTS_V1_URL: &str =
    "https://gitlab.com/flarenetwork/flare-smart-contracts/-/raw/#NETWORK_network_deployed_code/deployment/deploys/#NETWORK.json";

/// One published deployment list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentSource {
    pub name: String,
    /// URL with `#NETWORK` placeholders
    pub url_template: String,
}

impl DeploymentSource {
    pub fn new(name: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self { name: name.into(), url_template: url_template.into() }
    }

    pub fn url_for(&self, code: &str) -> String {
        self.url_template.replace(NETWORK_PLACEHOLDER, code)
    }
}

/// Smart contracts v2, FAssets, smart contracts v1: the order lists are consulted in.
pub fn default_sources() -> Vec<DeploymentSource> {
    vec![
        DeploymentSource::new("flare-smart-contracts-v2", SMART_CONTRACTS_V2_URL),
        DeploymentSource::new("fassets", FASSET_CONTRACTS_URL),
        DeploymentSource::new("flare-smart-contracts-v1", SMART_CONTRACTS_V1_URL),
    ]
}

/// Addresses of a deployment list document.
///
/// All entries must use the same shape; a mixed or unknown shape yields no
/// addresses.
pub fn parse_deployment_list(doc: &Value) -> Vec<String> {
    let Some(entries) = doc.as_array() else {
        return Vec::new();
    };
    if entries.iter().all(|e| e.get("addresses").is_some()) {
        return entries
            .iter()
            .filter_map(|e| e.get("addresses").and_then(Value::as_array))
            .flatten()
            .filter_map(Value::as_str)
            .map(str::to_lowercase)
            .collect();
    }
    if entries.iter().all(|e| e.get("address").is_some()) {
        return entries
            .iter()
            .filter_map(|e| e.get("address").and_then(Value::as_str))
            .map(str::to_lowercase)
            .collect();
    }
    Vec::new()
}

/// Fetches the deployment lists of the configured networks.
#[derive(Debug, Clone)]
pub struct DeploymentLists {
    client: Client,
    sources: Vec<DeploymentSource>,
    /// chain id → repository code
    codes: HashMap<u64, String>,
}

impl DeploymentLists {
    pub fn new(timeout: Duration, sources: Vec<DeploymentSource>) -> Result<Self, ContractError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, sources))
    }

    pub fn with_client(client: Client, sources: Vec<DeploymentSource>) -> Self {
        Self { client, sources, codes: HashMap::new() }
    }

    pub fn with_network(mut self, chain_id: u64, code: impl Into<String>) -> Self {
        self.codes.insert(chain_id, code.into());
        self
    }

    /// Addresses published by `source` for `chain_id`. Fetch failures and
    /// networks without a repository code yield an empty list.
    pub async fn addresses(&self, source: &DeploymentSource, chain_id: u64) -> Vec<String> {
        let Some(code) = self.codes.get(&chain_id) else {
            return Vec::new();
        };
        let url = source.url_for(code);
        match self.fetch(&url).await {
            Ok(doc) => parse_deployment_list(&doc),
            Err(e) => {
                tracing::warn!(source = %source.name, url = %url, error = %e, "deployment list unavailable");
                Vec::new()
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<Value, ContractError> {
        let resp = self.client.get(url).send().await?.error_for_status()?;
        Ok(resp.json().await?)
    }

    /// Whether any list publishes `address`; lists are fetched lazily in order.
    pub async fn contains(&self, chain_id: u64, address: &Address) -> bool {
        let needle = format!("{address:#x}");
        for source in &self.sources {
            if self.addresses(source, chain_id).await.contains(&needle) {
                return true;
            }
        }
        false
    }

    /// Every published address for `chain_id`, deduplicated, in list order.
    pub async fn all_addresses(&self, chain_id: u64) -> Vec<Address> {
        let mut out: Vec<Address> = Vec::new();
        for source in &self.sources {
            for raw in self.addresses(source, chain_id).await {
                match raw.parse::<Address>() {
                    Ok(a) if !out.contains(&a) => out.push(a),
                    Ok(_) => {}
                    Err(e) => tracing::debug!(address = %raw, error = %e, "skipping malformed address"),
                }
            }
        }
        out
    }
}
