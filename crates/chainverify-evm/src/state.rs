//! Chain state for account-model verification.
//!
//! [`EvmChainState`] is the seam the classifier and the proxy engine query;
//! [`EvmRpcState`] backs it with `eth_getCode`, `eth_getStorageAt` and
//! `eth_call` against one JSON-RPC endpoint per chain id.

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use chainverify_core::{EvmNetwork, StateError};
use chainverify_rpc::{HttpClientConfig, HttpRpcClient, RpcCall, RpcTransport, TransportError};

/// Read-only queries against an account-model chain.
#[async_trait]
pub trait EvmChainState: Send + Sync {
    /// Deployed bytecode; empty for externally owned accounts.
    async fn get_code(&self, chain_id: u64, address: &Address) -> Result<Vec<u8>, StateError>;

    async fn get_storage_at(&self, chain_id: u64, address: &Address, slot: &B256) -> Result<B256, StateError>;

    /// Read-only call of `data` (selector and encoded arguments) on `to`.
    async fn call(&self, chain_id: u64, to: &Address, data: &[u8]) -> Result<Vec<u8>, StateError>;
}

/// Chain state over `eth_*` JSON-RPC.
#[derive(Default)]
pub struct EvmRpcState {
    endpoints: HashMap<u64, Arc<dyn RpcTransport>>,
}

impl EvmRpcState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_networks(networks: &[EvmNetwork], http: &HttpClientConfig) -> Result<Self, TransportError> {
        let mut state = Self::new();
        for n in networks {
            let client = HttpRpcClient::new(n.rpc_url.clone(), http.clone())?;
            state = state.with_endpoint(n.chain_id, Arc::new(client));
        }
        Ok(state)
    }

    pub fn with_endpoint(mut self, chain_id: u64, transport: Arc<dyn RpcTransport>) -> Self {
        self.endpoints.insert(chain_id, transport);
        self
    }

    fn endpoint(&self, chain_id: u64) -> Result<&dyn RpcTransport, StateError> {
        self.endpoints
            .get(&chain_id)
            .map(|t| t.as_ref())
            .ok_or(StateError::UnknownNetwork { network: chain_id })
    }

    async fn hex_call(&self, chain_id: u64, method: &str, params: Vec<Value>) -> Result<Vec<u8>, StateError> {
        let transport = self.endpoint(chain_id)?;
        let raw: String = transport
            .call(method, params)
            .await
            .map_err(|e| StateError::Transport(e.to_string()))?;
        decode_hex_data(&raw).map_err(|reason| StateError::InvalidResponse { method: method.to_string(), reason })
    }
}

/// `0x`-prefixed hex data as returned by `eth_*` methods.
fn decode_hex_data(raw: &str) -> Result<Vec<u8>, String> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    if digits.len() % 2 == 1 {
        return hex::decode(format!("0{digits}")).map_err(|e| e.to_string());
    }
    hex::decode(digits).map_err(|e| e.to_string())
}

#[async_trait]
impl EvmChainState for EvmRpcState {
    async fn get_code(&self, chain_id: u64, address: &Address) -> Result<Vec<u8>, StateError> {
        self.hex_call(chain_id, "eth_getCode", vec![json!(address.to_string()), json!("latest")]).await
    }

    async fn get_storage_at(&self, chain_id: u64, address: &Address, slot: &B256) -> Result<B256, StateError> {
        const METHOD: &str = "eth_getStorageAt";
        let params = vec![
            json!(address.to_string()),
            json!(format!("0x{}", hex::encode(slot))),
            json!("latest"),
        ];
        let word = self.hex_call(chain_id, METHOD, params).await?;
        if word.len() > 32 {
            return Err(StateError::InvalidResponse {
                method: METHOD.to_string(),
                reason: format!("{} bytes for a storage word", word.len()),
            });
        }
        let mut out = [0u8; 32];
        out[32 - word.len()..].copy_from_slice(&word);
        Ok(B256::from(out))
    }

    async fn call(&self, chain_id: u64, to: &Address, data: &[u8]) -> Result<Vec<u8>, StateError> {
        let request = json!({ "to": to.to_string(), "data": format!("0x{}", hex::encode(data)) });
        self.hex_call(chain_id, "eth_call", vec![request, json!("latest")]).await
    }
}
