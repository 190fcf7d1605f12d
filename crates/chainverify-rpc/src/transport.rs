//! The `RpcTransport` trait, the seam every chain-state client sits on.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::TransportError;
use crate::request::{JsonRpcRequest, JsonRpcResponse};

/// The central async trait every RPC transport must implement.
///
/// Object-safe, so clients hold it as `Arc<dyn RpcTransport>` and tests
/// substitute canned responders.
#[async_trait]
pub trait RpcTransport: Send + Sync + 'static {
    /// Send a single JSON-RPC request and return the response.
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError>;

    /// Return the transport's identifier (URL or name).
    fn url(&self) -> &str;
}

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Typed calls on top of any [`RpcTransport`], including trait objects.
#[async_trait]
pub trait RpcCall {
    /// Call a method with positional params and deserialize the result.
    async fn call<T>(&self, method: &str, params: Vec<Value>) -> Result<T, TransportError>
    where
        T: DeserializeOwned + Send;

    /// Call a method with named params (a JSON object) and deserialize the result.
    async fn call_named<T>(&self, method: &str, params: Value) -> Result<T, TransportError>
    where
        T: DeserializeOwned + Send;
}

#[async_trait]
impl<R> RpcCall for R
where
    R: RpcTransport + ?Sized,
{
    async fn call<T>(&self, method: &str, params: Vec<Value>) -> Result<T, TransportError>
    where
        T: DeserializeOwned + Send,
    {
        self.call_named(method, Value::Array(params)).await
    }

    async fn call_named<T>(&self, method: &str, params: Value) -> Result<T, TransportError>
    where
        T: DeserializeOwned + Send,
    {
        let req = JsonRpcRequest::with_params(next_id(), method, params);
        let resp = self.send(req).await?;
        let result = resp.into_result().map_err(TransportError::Rpc)?;
        serde_json::from_value(result).map_err(TransportError::Deserialization)
    }
}
