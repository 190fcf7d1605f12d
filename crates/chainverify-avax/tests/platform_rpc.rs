//! `PlatformRpcState` against a mocked node.

use std::sync::Arc;
use std::time::Duration;

use chainverify_avax::codec::Packer;
use chainverify_avax::encoding::EMPTY_ID;
use chainverify_avax::tx::UtxoId;
use chainverify_avax::{cb58_encode, LedgerChainState, PlatformRpcState};
use chainverify_core::LedgerNetwork;
use chainverify_rpc::{HttpClientConfig, HttpRpcClient, RetryConfig};
use httpmock::prelude::*;
use serde_json::json;

fn http_config() -> HttpClientConfig {
    HttpClientConfig {
        retry: RetryConfig { max_retries: 0, ..Default::default() },
        request_timeout: Duration::from_secs(5),
    }
}

fn state_for(server: &MockServer) -> PlatformRpcState {
    let network = LedgerNetwork {
        network_id: 14,
        name: "Flare Mainnet".into(),
        api_url: server.base_url(),
        hrp: "flare".into(),
        context: None,
    };
    PlatformRpcState::from_networks(&[network], &http_config()).unwrap()
}

fn utxo_hex(tx: u8, index: u32) -> String {
    let mut p = Packer::with_version();
    p.fixed(&[tx; 32]).u32(index).fixed(&[9u8; 32]).u32(7);
    format!("0x{}", hex::encode(p.finish()))
}

#[tokio::test]
async fn context_is_assembled_from_info_and_platform() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/ext/info").body_contains("info.getNetworkID");
        then.status(200).json_body(json!({ "jsonrpc": "2.0", "id": 1, "result": { "networkID": "14" } }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/ext/info").body_contains("info.getBlockchainID");
        then.status(200).json_body(json!({
            "jsonrpc": "2.0", "id": 2, "result": { "blockchainID": cb58_encode(&[2u8; 32]) }
        }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/ext/bc/P").body_contains("platform.getStakingAssetID");
        then.status(200).json_body(json!({
            "jsonrpc": "2.0", "id": 3, "result": { "assetID": cb58_encode(&[9u8; 32]) }
        }));
    });

    let ctx = state_for(&server).get_context(14).await.unwrap();
    assert_eq!(ctx.network_id, 14);
    assert_eq!(ctx.hrp, "flare");
    assert_eq!(ctx.c_chain_id, [2u8; 32]);
    assert_eq!(ctx.native_asset_id, [9u8; 32]);
    assert_eq!(ctx.p_chain_id, EMPTY_ID);
}

#[tokio::test]
async fn utxos_are_queried_with_chain_prefixed_address() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/ext/bc/P")
            .body_contains("platform.getUTXOs")
            .body_contains("\"P-flare1xyz\"")
            .body_contains("sourceChain");
        then.status(200).json_body(json!({
            "jsonrpc": "2.0", "id": 1,
            "result": {
                "numFetched": "2",
                "utxos": [utxo_hex(1, 0), utxo_hex(2, 5)],
                "endIndex": { "address": "P-flare1xyz", "utxo": "x" },
                "encoding": "hex"
            }
        }));
    });

    let set = state_for(&server)
        .get_unspent_outputs(14, "flare1xyz", Some(&[2u8; 32]))
        .await
        .unwrap();
    mock.assert();
    assert_eq!(set.len(), 2);
    assert!(set.contains(&UtxoId { tx_id: [2u8; 32], output_index: 5 }));
}

#[tokio::test]
async fn validator_sets_are_node_id_strings() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/ext/bc/P").body_contains("platform.getCurrentValidators");
        then.status(200).json_body(json!({
            "jsonrpc": "2.0", "id": 1,
            "result": { "validators": [{ "nodeID": "NodeID-abc", "weight": "1" }] }
        }));
    });

    let state = state_for(&server);
    let current = state.get_current_validators(14).await.unwrap();
    assert!(current.contains("NodeID-abc"));
}

#[tokio::test]
async fn explicit_transports_can_be_injected() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/p").body_contains("platform.getPendingValidators");
        then.status(200).json_body(json!({
            "jsonrpc": "2.0", "id": 1,
            "result": { "validators": [], "delegators": [] }
        }));
    });

    let info = Arc::new(HttpRpcClient::new(server.url("/info"), http_config()).unwrap());
    let platform = Arc::new(HttpRpcClient::new(server.url("/p"), http_config()).unwrap());
    let state = PlatformRpcState::new().with_endpoint(7, "coston", info, platform, None);
    assert!(state.get_pending_validators(7).await.unwrap().is_empty());
    assert!(state.get_pending_validators(14).await.is_err());
}
