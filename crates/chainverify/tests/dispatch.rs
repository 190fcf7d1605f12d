//! Top-level dispatch across both chain families.

use alloy_primitives::{address, Address, B256, U256};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chainverify::{TxType, Verifier, VerifierConfig};
use chainverify_avax::encoding::EMPTY_ID;
use chainverify_avax::tx::*;
use chainverify_avax::{AvaxVerifier, ChainContext, Id, LedgerChainState};
use chainverify_core::StateError;
use chainverify_evm::{ContractMetadata, ContractResolver, EvmChainState, EvmTxBuilder, EvmVerifier};

const ASSET: Id = [9u8; 32];
const C_CHAIN: Id = [2u8; 32];

struct EmptyChain;

#[async_trait]
impl EvmChainState for EmptyChain {
    async fn get_code(&self, _: u64, _: &Address) -> Result<Vec<u8>, StateError> {
        Ok(Vec::new())
    }
    async fn get_storage_at(&self, _: u64, _: &Address, _: &B256) -> Result<B256, StateError> {
        Ok(B256::ZERO)
    }
    async fn call(&self, _: u64, _: &Address, _: &[u8]) -> Result<Vec<u8>, StateError> {
        Err(StateError::Transport("unsupported".into()))
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

struct Ledger {
    delay: Duration,
}

#[async_trait]
impl LedgerChainState for Ledger {
    async fn get_context(&self, network_id: u32) -> Result<ChainContext, StateError> {
        tokio::time::sleep(self.delay).await;
        Ok(ChainContext {
            network_id,
            hrp: "flare".into(),
            native_asset_id: ASSET,
            p_chain_id: EMPTY_ID,
            c_chain_id: C_CHAIN,
        })
    }
    async fn get_unspent_outputs(&self, _: u32, _: &str, _: Option<&Id>) -> Result<HashSet<UtxoId>, StateError> {
        Ok(HashSet::new())
    }
    async fn get_current_validators(&self, _: u32) -> Result<HashSet<String>, StateError> {
        Ok(HashSet::new())
    }
    async fn get_pending_validators(&self, _: u32) -> Result<HashSet<String>, StateError> {
        Ok(HashSet::new())
    }
}

fn verifier(ledger_delay: Duration, timeout: Duration) -> Verifier {
    let networks = VerifierConfig::default().network_table();
    Verifier::new(
        EvmVerifier::new(Arc::new(EmptyChain), Arc::new(NoContracts), networks.clone()),
        AvaxVerifier::new(Arc::new(Ledger { delay: ledger_delay }), networks),
        timeout,
    )
}

fn fast() -> Verifier {
    verifier(Duration::ZERO, Duration::from_secs(5))
}

fn c_export() -> LedgerTx {
    let output = TransferableOutput {
        asset_id: ASSET,
        output: Output::Transfer(TransferOutput { amount: 5, owners: OutputOwners::single([0xaa; 20]) }),
    };
    LedgerTx::CChain(EvmAtomicTx::Export(EvmExportTx {
        network_id: 14,
        blockchain_id: C_CHAIN,
        destination_chain: EMPTY_ID,
        ins: vec![EvmInput { address: [1; 20], amount: 6, asset_id: ASSET, nonce: 0 }],
        exported_outputs: vec![output],
    }))
}

#[tokio::test]
async fn malformed_input_yields_none() {
    let v = fast();
    assert!(v.verify("definitely not a transaction").await.is_none());
    assert!(v.verify("0xzz").await.is_none());
    // truncated EIP-1559 payload
    assert!(v.verify("0x02f8").await.is_none());
}

#[tokio::test]
async fn account_transaction_is_verified_first() {
    let tx = EvmTxBuilder::eip1559(14)
        .to(address!("d8dA6BF26964aF9D7eEd9e03E53415D37aA96045"))
        .value(U256::from(1u64))
        .gas_limit(21_000)
        .max_fee_per_gas(1, 1)
        .build();

    let r = fast().verify(&format!("0x{}", hex::encode(tx.encode_unsigned()))).await.unwrap();
    assert_eq!(r.tx_type, TxType::TransferC);
    assert_eq!(r.network, "Flare Mainnet");
    assert_eq!(r.message_to_sign, tx.message_to_sign());
}

#[tokio::test]
async fn base64_input_is_accepted() {
    let tx = EvmTxBuilder::legacy(19).to(address!("00000000000000000000000000000000000000aa")).gas_price(1).build();
    let r = fast().verify(&STANDARD.encode(tx.encode_unsigned())).await.unwrap();
    assert_eq!(r.network, "Songbird Canary-Network");
}

#[tokio::test]
async fn ledger_transaction_falls_through_to_second_family() {
    let raw = hex::encode(c_export().pack().unwrap());
    let r = fast().verify(&raw).await.unwrap();
    assert_eq!(r.tx_type, TxType::ExportC);
    assert_eq!(r.fee.as_deref(), Some("1000000000"));
}

#[tokio::test]
async fn timeout_is_reported_as_no_result() {
    let v = verifier(Duration::from_secs(10), Duration::from_millis(50));
    let raw = hex::encode(c_export().pack().unwrap());
    assert!(v.verify(&raw).await.is_none());
}

#[test]
fn default_configuration_builds_offline() {
    let v = Verifier::from_config(&VerifierConfig::default()).unwrap();
    assert_eq!(v.timeout(), Duration::from_secs(60));
}
