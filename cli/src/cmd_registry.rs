use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;

use chainverify::VerifierConfig;
use chainverify_evm::contracts::{default_sources, DeploymentLists, ExplorerClient};
use chainverify_evm::ContractRegistry;

/// Resolve every published platform contract through its chain's explorer
/// and write the resulting registry to `out`.
pub async fn run(config: &VerifierConfig, out: &Path, chain_ids: &[u64]) -> Result<()> {
    let timeout = Duration::from_secs(config.retry.request_timeout_secs);
    let mut registry = ContractRegistry::new();

    let selected = config
        .evm_networks
        .iter()
        .filter(|n| chain_ids.is_empty() || chain_ids.contains(&n.chain_id));

    for network in selected {
        let (Some(code), Some(api)) = (&network.repository_code, &network.explorer_api_url) else {
            println!("{}: skipped (needs both an explorer and a repository code)", network.name);
            continue;
        };

        let lists = DeploymentLists::new(timeout, default_sources())?.with_network(network.chain_id, code.clone());
        let explorer = ExplorerClient::new(api.clone(), timeout)?;

        let addresses = lists.all_addresses(network.chain_id).await;
        let mut resolved = 0usize;
        for address in &addresses {
            match explorer.get_contract(address).await {
                Ok(Some(contract)) => {
                    registry.insert(network.chain_id, address, contract.name, contract.abi);
                    resolved += 1;
                }
                Ok(None) => tracing::warn!(chain_id = network.chain_id, %address, "contract not verified"),
                Err(e) => tracing::warn!(chain_id = network.chain_id, %address, error = %e, "explorer lookup failed"),
            }
        }
        println!("{}: {resolved}/{} platform contracts resolved", network.name, addresses.len());
    }

    let json = registry.to_json_pretty()?;
    std::fs::write(out, json).with_context(|| format!("write registry '{}'", out.display()))?;
    println!("Wrote {} contracts to {}", registry.len(), out.display());
    Ok(())
}
