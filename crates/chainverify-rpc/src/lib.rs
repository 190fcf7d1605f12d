//! # chainverify-rpc
//!
//! The JSON-RPC transport the verifiers query chain state through.
//!
//! - [`RpcTransport`]: async, object-safe send of one request
//! - [`RpcCall`]: typed `call` / `call_named` on any transport
//! - [`HttpRpcClient`]: `reqwest` implementation with exponential backoff

pub mod error;
pub mod http;
pub mod request;
pub mod retry;
pub mod transport;

pub use error::TransportError;
pub use http::{HttpClientConfig, HttpRpcClient};
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId};
pub use retry::{RetryConfig, RetryPolicy};
pub use transport::{RpcCall, RpcTransport};
