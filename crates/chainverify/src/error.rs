use thiserror::Error;

use chainverify_core::ConfigError;
use chainverify_evm::ContractError;
use chainverify_rpc::TransportError;

/// Failure to assemble a [`crate::Verifier`] from configuration.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    #[error("contract metadata: {0}")]
    Contracts(#[from] ContractError),
}
