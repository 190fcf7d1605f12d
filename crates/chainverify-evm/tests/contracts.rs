//! Explorer, deployment list and node lookups against mocked HTTP servers.

use alloy_primitives::{address, Address, B256};
use std::time::Duration;

use chainverify_core::{EvmNetwork, StateError};
use chainverify_evm::contracts::{DeploymentLists, DeploymentSource, ExplorerClient};
use chainverify_evm::{ContractRegistry, ContractResolver, DefaultContractResolver, EvmChainState, EvmRpcState};
use chainverify_rpc::{HttpClientConfig, RetryConfig};
use httpmock::prelude::*;
use serde_json::json;

const WNAT: Address = address!("1d80c49bbbcd1c0911346656b529df9e5c2f783d");
const TIMEOUT: Duration = Duration::from_secs(5);

const TRANSFER_ABI: &str = r#"[{"type":"function","name":"transfer","stateMutability":"nonpayable","inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],"outputs":[{"name":"","type":"bool"}]}]"#;

// ─── Explorer ────────────────────────────────────────────────────────────────

fn mock_source_code(server: &MockServer, body: serde_json::Value) {
    server.mock(|when, then| {
        when.method(GET)
            .path("/api")
            .query_param("module", "contract")
            .query_param("action", "getsourcecode")
            .query_param("address", "0x1d80c49bbbcd1c0911346656b529df9e5c2f783d");
        then.status(200).json_body(body);
    });
}

#[tokio::test]
async fn verified_contract_is_returned() {
    let server = MockServer::start();
    mock_source_code(
        &server,
        json!({ "status": "1", "message": "OK", "result": [{ "ABI": TRANSFER_ABI, "ContractName": "WNat" }] }),
    );

    let explorer = ExplorerClient::new(server.url("/api"), TIMEOUT).unwrap();
    let contract = explorer.get_contract(&WNAT).await.unwrap().unwrap();
    assert_eq!(contract.name, "WNat");
    let metadata = contract.metadata().unwrap();
    assert_eq!(metadata.abi.functions().count(), 1);
}

#[tokio::test]
async fn unverified_contract_is_absent() {
    let server = MockServer::start();
    mock_source_code(
        &server,
        json!({
            "status": "1", "message": "OK",
            "result": [{ "ABI": "Contract source code not verified", "ContractName": "" }]
        }),
    );

    let explorer = ExplorerClient::new(server.url("/api"), TIMEOUT).unwrap();
    assert!(explorer.get_contract(&WNAT).await.unwrap().is_none());
}

#[tokio::test]
async fn explorer_error_status_is_an_error() {
    let server = MockServer::start();
    mock_source_code(&server, json!({ "status": "0", "message": "Invalid API key", "result": null }));

    let explorer = ExplorerClient::new(server.url("/api"), TIMEOUT).unwrap();
    assert!(explorer.get_contract(&WNAT).await.is_err());
}

#[tokio::test]
async fn resolver_prefers_registry_and_falls_back_to_explorer() {
    let server = MockServer::start();
    mock_source_code(
        &server,
        json!({ "status": "1", "message": "OK", "result": [{ "ABI": TRANSFER_ABI, "ContractName": "FromExplorer" }] }),
    );
    let explorer = ExplorerClient::new(server.url("/api"), TIMEOUT).unwrap();

    let other = address!("00000000000000000000000000000000000000aa");
    let mut registry = ContractRegistry::new();
    registry.insert(14, &other, "FromRegistry", serde_json::from_str(TRANSFER_ABI).unwrap());
    let resolver = DefaultContractResolver::new(registry).with_explorer(14, explorer);

    assert_eq!(resolver.metadata(14, &other).await.unwrap().name, "FromRegistry");
    assert_eq!(resolver.metadata(14, &WNAT).await.unwrap().name, "FromExplorer");
    // no explorer configured for this chain
    assert!(resolver.metadata(19, &WNAT).await.is_none());
}

#[tokio::test]
async fn unreachable_explorer_is_absence() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api");
        then.status(502);
    });
    let explorer = ExplorerClient::new(server.url("/api"), TIMEOUT).unwrap();
    let resolver = DefaultContractResolver::new(ContractRegistry::new()).with_explorer(14, explorer);
    assert!(resolver.metadata(14, &WNAT).await.is_none());
}

// ─── Deployment lists ────────────────────────────────────────────────────────

fn lists_for(server: &MockServer) -> DeploymentLists {
    let sources = vec![
        DeploymentSource::new("v2", server.url("/v2/#NETWORK.json")),
        DeploymentSource::new("fassets", server.url("/fassets/#NETWORK.json")),
    ];
    DeploymentLists::new(TIMEOUT, sources).unwrap().with_network(14, "flare")
}

#[tokio::test]
async fn platform_contracts_come_from_any_list() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v2/flare.json");
        then.status(200).json_body(json!([
            { "name": "WNat", "address": "0x1D80c49BbBCd1C0911346656B529DF9E5c2F783d" }
        ]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/fassets/flare.json");
        then.status(200).json_body(json!([
            { "name": "AssetManager", "addresses": ["0x00000000000000000000000000000000000000bb", "0x1d80c49bbbcd1c0911346656b529df9e5c2f783d"] }
        ]));
    });

    let lists = lists_for(&server);
    assert!(lists.contains(14, &WNAT).await);
    assert!(lists.contains(14, &address!("00000000000000000000000000000000000000bb")).await);
    assert!(!lists.contains(14, &address!("00000000000000000000000000000000000000cc")).await);
    // no repository code for this chain
    assert!(!lists.contains(19, &WNAT).await);

    let all = lists.all_addresses(14).await;
    assert_eq!(all, vec![WNAT, address!("00000000000000000000000000000000000000bb")]);
}

#[tokio::test]
async fn failing_lists_recognise_nothing() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(404);
    });

    let lists = lists_for(&server);
    assert!(!lists.contains(14, &WNAT).await);
    assert!(lists.all_addresses(14).await.is_empty());
}

// ─── Node state ──────────────────────────────────────────────────────────────

fn rpc_state(server: &MockServer) -> EvmRpcState {
    let network = EvmNetwork {
        chain_id: 14,
        name: "Flare Mainnet".into(),
        rpc_url: server.url("/ext/C/rpc"),
        explorer_api_url: None,
        repository_code: None,
    };
    let http = HttpClientConfig {
        retry: RetryConfig { max_retries: 0, ..Default::default() },
        request_timeout: TIMEOUT,
    };
    EvmRpcState::from_networks(&[network], &http).unwrap()
}

#[tokio::test]
async fn code_storage_and_call_go_to_the_chain_endpoint() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/ext/C/rpc").body_contains("eth_getCode").body_contains("latest");
        then.status(200).json_body(json!({ "jsonrpc": "2.0", "id": 1, "result": "0x6080" }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/ext/C/rpc").body_contains("eth_getStorageAt");
        then.status(200).json_body(json!({ "jsonrpc": "2.0", "id": 2, "result": "0x2a" }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/ext/C/rpc").body_contains("eth_call").body_contains("0x5c60da1b");
        then.status(200).json_body(json!({ "jsonrpc": "2.0", "id": 3, "result": "0x01" }));
    });

    let state = rpc_state(&server);
    assert_eq!(state.get_code(14, &WNAT).await.unwrap(), vec![0x60, 0x80]);

    let word = state.get_storage_at(14, &WNAT, &B256::ZERO).await.unwrap();
    assert_eq!(word, B256::left_padding_from(&[0x2a]));

    assert_eq!(state.call(14, &WNAT, &[0x5c, 0x60, 0xda, 0x1b]).await.unwrap(), vec![0x01]);
}

#[tokio::test]
async fn unconfigured_chain_is_rejected() {
    let server = MockServer::start();
    let err = rpc_state(&server).get_code(19, &WNAT).await.unwrap_err();
    assert!(matches!(err, StateError::UnknownNetwork { network: 19 }));
}
