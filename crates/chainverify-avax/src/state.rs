//! Chain context and chain state for ledger-model verification.
//!
//! [`LedgerChainState`] is the collaborator seam; [`PlatformRpcState`] backs
//! it with the node's `info.*` and `platform.*` JSON-RPC APIs.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chainverify_core::{LedgerNetwork, StateError, StaticContext};
use chainverify_rpc::{HttpClientConfig, HttpRpcClient, RpcCall, RpcTransport, TransportError};

use crate::codec::Reader;
use crate::encoding::{cb58_decode_id, cb58_encode, Id, EMPTY_ID};
use crate::error::CodecError;
use crate::tx::UtxoId;

/// Network-wide constants a ledger transaction is checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainContext {
    pub network_id: u32,
    /// Bech32 human-readable part of addresses
    pub hrp: String,
    pub native_asset_id: Id,
    pub p_chain_id: Id,
    pub c_chain_id: Id,
}

impl ChainContext {
    pub fn from_static(network_id: u32, hrp: &str, ctx: &StaticContext) -> Result<Self, CodecError> {
        Ok(Self {
            network_id,
            hrp: hrp.to_string(),
            native_asset_id: cb58_decode_id(&ctx.native_asset_id)?,
            p_chain_id: cb58_decode_id(&ctx.p_chain_id)?,
            c_chain_id: cb58_decode_id(&ctx.c_chain_id)?,
        })
    }
}

/// Read-only queries a ledger verification needs.
#[async_trait]
pub trait LedgerChainState: Send + Sync {
    async fn get_context(&self, network_id: u32) -> Result<ChainContext, StateError>;

    /// Unspent outputs owned by `address` (bech32, no chain prefix). With
    /// `source_chain`, the atomic outputs exported from that chain.
    async fn get_unspent_outputs(
        &self,
        network_id: u32,
        address: &str,
        source_chain: Option<&Id>,
    ) -> Result<HashSet<UtxoId>, StateError>;

    /// `NodeID-…` strings of the current validator set.
    async fn get_current_validators(&self, network_id: u32) -> Result<HashSet<String>, StateError>;

    /// `NodeID-…` strings of the pending validator set.
    async fn get_pending_validators(&self, network_id: u32) -> Result<HashSet<String>, StateError>;
}

// ─── JSON-RPC backed implementation ──────────────────────────────────────────

const UTXO_PAGE_LIMIT: usize = 1024;

struct PlatformEndpoint {
    hrp: String,
    info: Arc<dyn RpcTransport>,
    platform: Arc<dyn RpcTransport>,
    context: Option<StaticContext>,
}

/// Chain state from a node's `/ext/info` and `/ext/bc/P` endpoints.
#[derive(Default)]
pub struct PlatformRpcState {
    endpoints: HashMap<u32, PlatformEndpoint>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UtxoPage {
    num_fetched: String,
    utxos: Vec<String>,
    end_index: Option<Value>,
}

#[derive(Deserialize)]
struct ValidatorSet {
    #[serde(default)]
    validators: Vec<ValidatorEntry>,
}

#[derive(Deserialize)]
struct ValidatorEntry {
    #[serde(rename = "nodeID")]
    node_id: String,
}

fn transport_err(e: TransportError) -> StateError {
    StateError::Transport(e.to_string())
}

fn invalid(method: &str, reason: impl ToString) -> StateError {
    StateError::InvalidResponse { method: method.to_string(), reason: reason.to_string() }
}

impl PlatformRpcState {
    pub fn new() -> Self {
        Self::default()
    }

    /// One HTTP client pair per configured network.
    pub fn from_networks(networks: &[LedgerNetwork], http: &HttpClientConfig) -> Result<Self, TransportError> {
        let mut state = Self::new();
        for n in networks {
            let origin = n.api_url.trim_end_matches('/');
            let info = HttpRpcClient::new(format!("{origin}/ext/info"), http.clone())?;
            let platform = HttpRpcClient::new(format!("{origin}/ext/bc/P"), http.clone())?;
            state = state.with_endpoint(n.network_id, &n.hrp, Arc::new(info), Arc::new(platform), n.context.clone());
        }
        Ok(state)
    }

    pub fn with_endpoint(
        mut self,
        network_id: u32,
        hrp: &str,
        info: Arc<dyn RpcTransport>,
        platform: Arc<dyn RpcTransport>,
        context: Option<StaticContext>,
    ) -> Self {
        self.endpoints.insert(network_id, PlatformEndpoint { hrp: hrp.to_string(), info, platform, context });
        self
    }

    fn endpoint(&self, network_id: u32) -> Result<&PlatformEndpoint, StateError> {
        self.endpoints
            .get(&network_id)
            .ok_or(StateError::UnknownNetwork { network: network_id as u64 })
    }

    async fn string_field(
        transport: &dyn RpcTransport,
        method: &str,
        params: Value,
        field: &str,
    ) -> Result<String, StateError> {
        let v: Value = transport.call_named(method, params).await.map_err(transport_err)?;
        v.get(field)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| invalid(method, format!("missing `{field}`")))
    }

    async fn validator_set(&self, network_id: u32, method: &str) -> Result<HashSet<String>, StateError> {
        let ep = self.endpoint(network_id)?;
        let set: ValidatorSet = ep.platform.call_named(method, json!({})).await.map_err(transport_err)?;
        Ok(set.validators.into_iter().map(|v| v.node_id).collect())
    }
}

/// `txID ‖ outputIndex` of a hex-encoded UTXO; the rest is ignored.
pub fn parse_utxo_id(encoded: &str) -> Result<UtxoId, CodecError> {
    let hex_str = encoded.strip_prefix("0x").unwrap_or(encoded);
    let bytes = hex::decode(hex_str).map_err(|e| CodecError::InvalidHex { reason: e.to_string() })?;
    let mut r = Reader::new(&bytes);
    r.version()?;
    Ok(UtxoId { tx_id: r.fixed()?, output_index: r.u32()? })
}

#[async_trait]
impl LedgerChainState for PlatformRpcState {
    async fn get_context(&self, network_id: u32) -> Result<ChainContext, StateError> {
        let ep = self.endpoint(network_id)?;
        if let Some(ctx) = &ep.context {
            return ChainContext::from_static(network_id, &ep.hrp, ctx)
                .map_err(|e| invalid("static context", e));
        }

        let reported = Self::string_field(ep.info.as_ref(), "info.getNetworkID", json!({}), "networkID").await?;
        let reported: u32 = reported.parse().map_err(|e| invalid("info.getNetworkID", e))?;

        let c_chain = Self::string_field(
            ep.info.as_ref(),
            "info.getBlockchainID",
            json!({ "alias": "C" }),
            "blockchainID",
        )
        .await?;
        let asset = Self::string_field(ep.platform.as_ref(), "platform.getStakingAssetID", json!({}), "assetID").await?;

        Ok(ChainContext {
            network_id: reported,
            hrp: ep.hrp.clone(),
            native_asset_id: cb58_decode_id(&asset).map_err(|e| invalid("platform.getStakingAssetID", e))?,
            p_chain_id: EMPTY_ID,
            c_chain_id: cb58_decode_id(&c_chain).map_err(|e| invalid("info.getBlockchainID", e))?,
        })
    }

    async fn get_unspent_outputs(
        &self,
        network_id: u32,
        address: &str,
        source_chain: Option<&Id>,
    ) -> Result<HashSet<UtxoId>, StateError> {
        const METHOD: &str = "platform.getUTXOs";
        let ep = self.endpoint(network_id)?;
        let mut out = HashSet::new();
        let mut start_index: Option<Value> = None;

        loop {
            let mut params = json!({
                "addresses": [format!("P-{address}")],
                "limit": UTXO_PAGE_LIMIT,
                "encoding": "hex",
            });
            if let Some(chain) = source_chain {
                params["sourceChain"] = json!(cb58_encode(chain));
            }
            if let Some(idx) = &start_index {
                params["startIndex"] = idx.clone();
            }

            let page: UtxoPage = ep.platform.call_named(METHOD, params).await.map_err(transport_err)?;
            for u in &page.utxos {
                out.insert(parse_utxo_id(u).map_err(|e| invalid(METHOD, e))?);
            }

            let fetched: usize = page.num_fetched.parse().map_err(|e| invalid(METHOD, e))?;
            if fetched < UTXO_PAGE_LIMIT || page.end_index.is_none() {
                break;
            }
            tracing::debug!(address, fetched, "fetching next UTXO page");
            start_index = page.end_index;
        }
        Ok(out)
    }

    async fn get_current_validators(&self, network_id: u32) -> Result<HashSet<String>, StateError> {
        self.validator_set(network_id, "platform.getCurrentValidators").await
    }

    async fn get_pending_validators(&self, network_id: u32) -> Result<HashSet<String>, StateError> {
        self.validator_set(network_id, "platform.getPendingValidators").await
    }
}
