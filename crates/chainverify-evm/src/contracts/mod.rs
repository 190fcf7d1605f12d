//! Contract metadata resolution.
//!
//! [`ContractResolver`] is the seam the verifier consults for two things:
//! the name and ABI of a callee, and whether the callee is a platform
//! contract. [`DefaultContractResolver`] answers the first from the static
//! [`ContractRegistry`] with an explorer fallback, and the second from the
//! published [`DeploymentLists`].

pub mod explorer;
pub mod registry;
pub mod repository;

use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use chainverify_core::EvmNetwork;

use crate::error::ContractError;

pub use explorer::{ExplorerClient, ExplorerContract};
pub use registry::{ContractRegistry, RegistryEntry};
pub use repository::{default_sources, DeploymentLists, DeploymentSource};

/// Name and ABI of a deployed contract.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractMetadata {
    pub name: String,
    pub abi: JsonAbi,
}

/// Resolve-or-absent lookups about contracts. Source failures are absence.
#[async_trait]
pub trait ContractResolver: Send + Sync {
    async fn metadata(&self, chain_id: u64, address: &Address) -> Option<ContractMetadata>;

    async fn is_platform_contract(&self, chain_id: u64, address: &Address) -> bool;
}

/// Registry first, then the chain's explorer; deployment lists for platform contracts.
pub struct DefaultContractResolver {
    registry: ContractRegistry,
    explorers: HashMap<u64, ExplorerClient>,
    deployments: Option<DeploymentLists>,
}

impl DefaultContractResolver {
    pub fn new(registry: ContractRegistry) -> Self {
        Self { registry, explorers: HashMap::new(), deployments: None }
    }

    /// Explorer clients and deployment lists for every network that names them.
    pub fn from_networks(
        registry: ContractRegistry,
        networks: &[EvmNetwork],
        timeout: Duration,
    ) -> Result<Self, ContractError> {
        let mut resolver = Self::new(registry);
        let mut lists = DeploymentLists::new(timeout, default_sources())?;
        for n in networks {
            if let Some(url) = &n.explorer_api_url {
                resolver = resolver.with_explorer(n.chain_id, ExplorerClient::new(url.clone(), timeout)?);
            }
            if let Some(code) = &n.repository_code {
                lists = lists.with_network(n.chain_id, code.clone());
            }
        }
        Ok(resolver.with_deployments(lists))
    }

    pub fn with_explorer(mut self, chain_id: u64, explorer: ExplorerClient) -> Self {
        self.explorers.insert(chain_id, explorer);
        self
    }

    pub fn with_deployments(mut self, deployments: DeploymentLists) -> Self {
        self.deployments = Some(deployments);
        self
    }

    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }

    async fn from_explorer(&self, chain_id: u64, address: &Address) -> Option<ContractMetadata> {
        let explorer = self.explorers.get(&chain_id)?;
        let contract = match explorer.get_contract(address).await {
            Ok(c) => c?,
            Err(e) => {
                tracing::warn!(chain_id, address = %address, error = %e, "explorer lookup failed");
                return None;
            }
        };
        match contract.metadata() {
            Ok(m) => Some(m),
            Err(e) => {
                tracing::warn!(chain_id, address = %address, error = %e, "explorer returned an unusable ABI");
                None
            }
        }
    }
}

#[async_trait]
impl ContractResolver for DefaultContractResolver {
    async fn metadata(&self, chain_id: u64, address: &Address) -> Option<ContractMetadata> {
        if let Some(m) = self.registry.get(chain_id, address) {
            return Some(m);
        }
        self.from_explorer(chain_id, address).await
    }

    async fn is_platform_contract(&self, chain_id: u64, address: &Address) -> bool {
        match &self.deployments {
            Some(lists) => lists.contains(chain_id, address).await,
            None => false,
        }
    }
}
