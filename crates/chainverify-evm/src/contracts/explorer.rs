//! Verified-contract lookup on a Blockscout / Etherscan compatible explorer.
//!
//! `GET {base}?module=contract&action=getsourcecode&address=0x…`

use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::contracts::ContractMetadata;
use crate::error::ContractError;

const USER_AGENT: &str = concat!("chainverify/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct SourceCodeResponse {
    status: String,
    message: String,
    #[serde(default)]
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct SourceCodeEntry {
    #[serde(rename = "ABI", default)]
    abi: String,
    #[serde(rename = "ContractName", default)]
    contract_name: String,
}

/// A verified contract as published by the explorer.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerContract {
    pub name: String,
    /// ABI JSON array as returned by the explorer
    pub abi: serde_json::Value,
}

impl ExplorerContract {
    pub fn metadata(&self) -> Result<ContractMetadata, ContractError> {
        let abi: JsonAbi = serde_json::from_value(self.abi.clone()).map_err(|e| ContractError::InvalidAbi {
            origin: "explorer".into(),
            reason: e.to_string(),
        })?;
        Ok(ContractMetadata { name: self.name.clone(), abi })
    }
}

/// Explorer API client for one chain.
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    client: Client,
    base_url: String,
}

impl ExplorerClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ContractError> {
        let client = Client::builder().timeout(timeout).user_agent(USER_AGENT).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self { client, base_url: base_url.into() }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The verified contract at `address`; `Ok(None)` when the explorer has
    /// no verified source for it.
    pub async fn get_contract(&self, address: &Address) -> Result<Option<ExplorerContract>, ContractError> {
        let address = format!("{address:#x}");
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("module", "contract"), ("action", "getsourcecode"), ("address", address.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let body: SourceCodeResponse = resp.json().await?;
        if body.status != "1" {
            if body.message.to_ascii_lowercase().contains("not found") {
                return Ok(None);
            }
            return Err(ContractError::Explorer { message: body.message });
        }

        let entries: Vec<SourceCodeEntry> = serde_json::from_value(body.result)?;
        let Some(entry) = entries.into_iter().next() else {
            return Ok(None);
        };

        // unverified contracts carry a message instead of an ABI
        let Ok(abi) = serde_json::from_str::<serde_json::Value>(&entry.abi) else {
            return Ok(None);
        };
        if !abi.is_array() || entry.contract_name.is_empty() {
            return Ok(None);
        }

        Ok(Some(ExplorerContract { name: entry.contract_name, abi }))
    }
}
