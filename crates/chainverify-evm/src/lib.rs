//! # chainverify-evm
//!
//! Account-model transaction support for ChainVerify: the codec for
//! legacy, EIP-2930 and EIP-1559 transactions, calldata decoding, proxy
//! implementation discovery and contract metadata resolution.
//!
//! ## Implementation notes
//! - Uses `alloy-consensus` for the wire format and `alloy-core` for ABI decode
//! - `messageToSign` = keccak256(unsigned serialization)
//! - Chain state and contract metadata sit behind the [`EvmChainState`] and
//!   [`ContractResolver`] traits so tests can run against in-memory fakes

pub mod call_decoder;
pub mod contracts;
pub mod error;
pub mod proxy;
pub mod render;
pub mod state;
pub mod tx;
pub mod verifier;

pub use call_decoder::{DecodedCall, EvmCallDecoder};
pub use contracts::{ContractMetadata, ContractRegistry, ContractResolver, DefaultContractResolver};
pub use error::{AbiError, CodecError, ContractError};
pub use proxy::{detect_eip1167_clone, ProxyInfo, ProxyKind, ProxyResolver};
pub use state::{EvmChainState, EvmRpcState};
pub use tx::{EvmTx, EvmTxBody, EvmTxBuilder, EvmTxKind, TxSignature};
pub use verifier::EvmVerifier;
