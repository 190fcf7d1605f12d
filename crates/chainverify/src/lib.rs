//! # chainverify
//!
//! Inspect a raw, possibly unsigned transaction for an EVM chain or for the
//! P/C chains of an Avalanche-derived network and describe what signing it
//! would do: network, kind, recipients, amounts, fee, the decoded contract
//! call and any warnings.
//!
//! ## Quick start
//! ```ignore
//! use chainverify::{Verifier, VerifierConfig};
//!
//! let verifier = Verifier::from_config(&VerifierConfig::default())?;
//! match verifier.verify("0x02f8…").await {
//!     Some(result) => println!("{}", serde_json::to_string_pretty(&result)?),
//!     None => println!("could not verify; do not trust this transaction"),
//! }
//! ```

mod error;
pub mod tracing_setup;

use std::sync::Arc;
use std::time::Duration;

use chainverify_avax::{AvaxVerifier, PlatformRpcState};
use chainverify_evm::{ContractRegistry, DefaultContractResolver, EvmRpcState, EvmVerifier};
use chainverify_rpc::{HttpClientConfig, RetryConfig};

pub use chainverify_core::{
    normalize_input, CanonicalTx, LogConfig, Parameter, RetrySettings, TxType, VerificationResult, VerifierConfig,
    Warning, Warnings,
};
pub use error::BuildError;

/// HTTP transport settings derived from the configured retry policy.
pub fn http_config(retry: &RetrySettings) -> HttpClientConfig {
    HttpClientConfig {
        retry: RetryConfig {
            max_retries: retry.max_retries,
            initial_backoff: Duration::from_millis(retry.initial_backoff_ms),
            ..Default::default()
        },
        request_timeout: Duration::from_secs(retry.request_timeout_secs),
    }
}

/// Top-level dispatcher: normalizes the input, then tries the account-model
/// verifier and the ledger-model verifier in that order.
pub struct Verifier {
    evm: EvmVerifier,
    avax: AvaxVerifier,
    timeout: Duration,
}

impl Verifier {
    pub fn new(evm: EvmVerifier, avax: AvaxVerifier, timeout: Duration) -> Self {
        Self { evm, avax, timeout }
    }

    /// JSON-RPC, explorer and deployment-list backed verifiers for the
    /// configured networks.
    pub fn from_config(config: &VerifierConfig) -> Result<Self, BuildError> {
        config.validate()?;
        let http = http_config(&config.retry);

        let registry = match &config.registry_path {
            Some(path) => ContractRegistry::from_file(path)?,
            None => ContractRegistry::new(),
        };
        tracing::debug!(contracts = registry.len(), "contract registry loaded");

        let contracts = DefaultContractResolver::from_networks(registry, &config.evm_networks, http.request_timeout)?;
        let evm_state = EvmRpcState::from_networks(&config.evm_networks, &http)?;
        let ledger_state = PlatformRpcState::from_networks(&config.ledger_networks, &http)?;

        let networks = config.network_table();
        Ok(Self::new(
            EvmVerifier::new(Arc::new(evm_state), Arc::new(contracts), networks.clone()),
            AvaxVerifier::new(Arc::new(ledger_state), networks),
            Duration::from_secs(config.timeout_secs),
        ))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Describe `input` (hex, base64 or gzip-compressed hex). `None` means
    /// the transaction could not be verified, including on timeout.
    pub async fn verify(&self, input: &str) -> Option<VerificationResult> {
        match tokio::time::timeout(self.timeout, self.dispatch(input)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout_secs = self.timeout.as_secs_f64(), "verification timed out");
                None
            }
        }
    }

    async fn dispatch(&self, input: &str) -> Option<VerificationResult> {
        let tx = match normalize_input(input) {
            Ok(tx) => tx,
            Err(e) => {
                tracing::debug!(error = %e, "input rejected");
                return None;
            }
        };

        if let Some(result) = self.evm.verify(&tx).await {
            return Some(result);
        }
        let result = self.avax.verify(&tx).await;
        if result.is_none() {
            tracing::info!(bytes = tx.as_bytes().len(), "no chain family accepted the transaction");
        }
        result
    }
}
