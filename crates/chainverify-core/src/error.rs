//! Error types for the ChainVerify pipeline.
//!
//! None of these escape the top-level `verify` call: each chain-family
//! verifier turns them into "no result" at its boundary.

use thiserror::Error;

/// The raw input is not recognizable as any supported encoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("input is empty")]
    Empty,

    #[error("input is neither hex nor base64")]
    UnknownEncoding,

    #[error("invalid hex: {reason}")]
    InvalidHex { reason: String },
}

/// A chain-state, chain-context or metadata collaborator failed.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("no endpoint configured for network {network}")]
    UnknownNetwork { network: u64 },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response from {method}: {reason}")]
    InvalidResponse { method: String, reason: String },
}

/// Errors raised while verifying a successfully decoded transaction.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("chain state query failed: {0}")]
    State(#[from] StateError),

    #[error("context network {context} does not match transaction network {declared}")]
    NetworkMismatch { context: u32, declared: u32 },

    #[error("network id missing from transaction")]
    MissingNetworkId,

    #[error("contract call decoding failed: {reason}")]
    CallDecode { reason: String },

    #[error("failed to compute message to sign: {reason}")]
    MessageHash { reason: String },

    #[error("{0}")]
    Other(String),
}

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("duplicate {kind} network id {id}")]
    DuplicateNetwork { kind: &'static str, id: u64 },
}
