//! Account-Chain Verifier: classifies an EVM transaction as a transfer or a
//! contract call and, for calls, decodes the calldata against the callee's
//! ABI (or its proxy implementation's).
//!
//! Classification on a configured network asks the chain: a platform
//! contract or a recipient with code is a call. On any other network no
//! endpoint exists, so empty calldata is taken to mean a transfer. That
//! rule is best-effort and can misclassify.

use alloy_primitives::Address;
use std::sync::Arc;

use chainverify_core::{
    CanonicalTx, NetworkTable, Parameter, TxType, VerificationResult, VerifyError, Warning, Warnings,
};

use crate::call_decoder::{DecodedCall, EvmCallDecoder};
use crate::contracts::{ContractMetadata, ContractResolver};
use crate::proxy::ProxyResolver;
use crate::state::EvmChainState;
use crate::tx::EvmTx;

/// Contract-call fields of the result.
#[derive(Debug, Default)]
struct CallDetails {
    contract_name: Option<String>,
    method: Option<String>,
    method_abi: Option<String>,
    parameters: Option<Vec<Parameter>>,
    warnings: Warnings,
}

pub struct EvmVerifier {
    state: Arc<dyn EvmChainState>,
    contracts: Arc<dyn ContractResolver>,
    networks: NetworkTable,
}

impl EvmVerifier {
    pub fn new(state: Arc<dyn EvmChainState>, contracts: Arc<dyn ContractResolver>, networks: NetworkTable) -> Self {
        Self { state, contracts, networks }
    }

    /// Verify `tx` as an account-model transaction; `None` when it is not one
    /// or when verification fails.
    pub async fn verify(&self, tx: &CanonicalTx) -> Option<VerificationResult> {
        let decoded = match EvmTx::decode(tx.as_bytes()) {
            Ok(d) => d,
            Err(e) => {
                tracing::debug!(error = %e, "not an account-model transaction");
                return None;
            }
        };

        match self.verify_decoded(&decoded).await {
            Ok(result) => {
                tracing::info!(
                    network = %result.network,
                    tx_type = %result.tx_type,
                    warnings = result.warnings.len(),
                    signed = decoded.is_signed(),
                    "account transaction verified"
                );
                Some(result)
            }
            Err(e) => {
                tracing::debug!(error = %e, "account transaction verification failed");
                None
            }
        }
    }

    pub async fn verify_decoded(&self, tx: &EvmTx) -> Result<VerificationResult, VerifyError> {
        let chain_id = tx.chain_id();
        let known = self.networks.is_known_evm(chain_id);

        let mut warnings = Warnings::new();
        warnings.add_if(!known, Warning::UnknownNetwork);

        let is_platform = match tx.to() {
            Some(to) if known => self.contracts.is_platform_contract(chain_id, &to).await,
            _ => false,
        };
        let tx_type = self.classify(tx, known, is_platform).await?;

        let mut result = VerificationResult::new(self.networks.evm_description(chain_id), tx_type, tx.message_to_sign());
        result.recipients = vec![tx.to().map(|a| a.to_checksum(None)).unwrap_or_default()];
        result.values = vec![tx.value().to_string()];
        result.fee = tx.max_fee().map(|f| f.to_string());

        if tx_type == TxType::ContractCallC {
            result.contract_data = Some(format!("0x{}", hex::encode(tx.input())));
            result.is_flare_network_contract = Some(is_platform);

            if let (Some(to), true) = (tx.to(), known) {
                let details = self.describe_call(chain_id, &to, &tx.input()[..], is_platform).await?;
                result.contract_name = details.contract_name;
                result.contract_method = details.method;
                result.contract_method_abi = details.method_abi;
                result.parameters = details.parameters;
                warnings.merge(details.warnings);
            }
        }

        result.warnings = warnings;
        Ok(result)
    }

    async fn classify(&self, tx: &EvmTx, known: bool, is_platform: bool) -> Result<TxType, VerifyError> {
        let Some(to) = tx.to() else {
            return Ok(TxType::ContractCallC);
        };
        if is_platform {
            return Ok(TxType::ContractCallC);
        }
        if known {
            let code = self.state.get_code(tx.chain_id(), &to).await?;
            return Ok(if code.iter().all(|b| *b == 0) { TxType::TransferC } else { TxType::ContractCallC });
        }
        Ok(if tx.input().iter().all(|b| *b == 0) { TxType::TransferC } else { TxType::ContractCallC })
    }

    /// Decode the call against the callee, falling back to its proxy
    /// implementation. A decode through the proxy is flagged unless the
    /// callee is a platform contract.
    async fn describe_call(
        &self,
        chain_id: u64,
        to: &Address,
        data: &[u8],
        is_platform: bool,
    ) -> Result<CallDetails, VerifyError> {
        let proxies = ProxyResolver::new(self.state.as_ref(), chain_id);
        let mut details = CallDetails::default();

        let mut via_proxy = false;
        let mut contract = self.contracts.metadata(chain_id, to).await;
        if contract.is_none() {
            if let Some(proxy) = proxies.resolve(to, data).await {
                contract = self.contracts.metadata(chain_id, &proxy.implementation).await;
                via_proxy = true;
            }
        }

        let Some(contract) = contract else {
            return Ok(details);
        };
        details.contract_name = Some(contract.name.clone());

        let mut decoded = decode(&contract, data)?;
        if decoded.is_none() && !via_proxy {
            if let Some(proxy) = proxies.resolve(to, data).await {
                if let Some(target) = self.contracts.metadata(chain_id, &proxy.implementation).await {
                    decoded = decode(&target, data)?;
                    via_proxy = true;
                }
            }
        }

        if let Some(call) = decoded {
            details.method_abi = Some(call.function_json().map_err(call_decode)?);
            details.method = Some(call.method().to_string());
            details.parameters = Some(call.parameters);
            details.warnings.add_if(via_proxy && !is_platform, Warning::ProxyContract);
        }
        Ok(details)
    }
}

fn call_decode(e: impl ToString) -> VerifyError {
    VerifyError::CallDecode { reason: e.to_string() }
}

fn decode(contract: &ContractMetadata, data: &[u8]) -> Result<Option<DecodedCall>, VerifyError> {
    EvmCallDecoder::new(contract.abi.clone()).decode_call(data).map_err(call_decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::EvmTxBuilder;
    use alloy_primitives::{address, B256, U256};
    use async_trait::async_trait;
    use chainverify_core::{EvmNetwork, StateError};

    struct NoCode;

    #[async_trait]
    impl EvmChainState for NoCode {
        async fn get_code(&self, _: u64, _: &Address) -> Result<Vec<u8>, StateError> {
            Ok(Vec::new())
        }
        async fn get_storage_at(&self, _: u64, _: &Address, _: &B256) -> Result<B256, StateError> {
            Ok(B256::ZERO)
        }
        async fn call(&self, _: u64, _: &Address, _: &[u8]) -> Result<Vec<u8>, StateError> {
            Err(StateError::Transport("no calls".into()))
        }
    }

    struct NoContracts;

    #[async_trait]
    impl ContractResolver for NoContracts {
        async fn metadata(&self, _: u64, _: &Address) -> Option<ContractMetadata> {
            None
        }
        async fn is_platform_contract(&self, _: u64, _: &Address) -> bool {
            false
        }
    }

    fn verifier() -> EvmVerifier {
        let flare = EvmNetwork {
            chain_id: 14,
            name: "Flare Mainnet".into(),
            rpc_url: "http://localhost".into(),
            explorer_api_url: None,
            repository_code: None,
        };
        EvmVerifier::new(Arc::new(NoCode), Arc::new(NoContracts), NetworkTable::new(vec![flare], vec![]))
    }

    #[tokio::test]
    async fn plain_transfer() {
        let to = address!("d8dA6BF26964aF9D7eEd9e03E53415D37aA96045");
        let tx = EvmTxBuilder::eip1559(14)
            .to(to)
            .value(U256::from(5u64))
            .gas_limit(21_000)
            .max_fee_per_gas(2, 1)
            .build();
        let r = verifier().verify_decoded(&tx).await.unwrap();
        assert_eq!(r.tx_type, TxType::TransferC);
        assert_eq!(r.network, "Flare Mainnet");
        assert_eq!(r.recipients, vec!["0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045"]);
        assert_eq!(r.values, vec!["5"]);
        assert_eq!(r.fee.as_deref(), Some("42000"));
        assert!(r.warnings.is_empty());
        assert!(r.contract_data.is_none());
    }

    #[tokio::test]
    async fn contract_creation_reports_empty_recipient() {
        let tx = EvmTxBuilder::eip1559(14).input(vec![0x60u8, 0x80]).build();
        let r = verifier().verify_decoded(&tx).await.unwrap();
        assert_eq!(r.tx_type, TxType::ContractCallC);
        assert_eq!(r.recipients, vec![String::new()]);
        assert_eq!(r.contract_data.as_deref(), Some("0x6080"));
        assert_eq!(r.is_flare_network_contract, Some(false));
        assert!(r.fee.is_none());
    }
}
