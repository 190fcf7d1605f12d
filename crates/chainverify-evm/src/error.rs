//! Error types for the account-model codec, ABI handling and contract metadata.

use thiserror::Error;

/// Bytes do not match the account-model transaction grammar.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("empty transaction")]
    Empty,

    #[error("unsupported transaction type 0x{0:02x}")]
    UnsupportedType(u8),

    #[error("RLP error: {0}")]
    Rlp(#[from] alloy_rlp::Error),

    #[error("{remaining} trailing bytes after transaction")]
    TrailingBytes { remaining: usize },

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// An ABI could not be parsed or calldata does not fit the matched function.
#[derive(Debug, Error)]
pub enum AbiError {
    #[error("invalid ABI JSON: {reason}")]
    InvalidJson { reason: String },

    #[error("cannot resolve input type of {function}: {reason}")]
    UnresolvableType { function: String, reason: String },

    #[error("calldata does not decode as {function}: {reason}")]
    CallData { function: String, reason: String },
}

/// Contract metadata sources (registry file, explorer, deployment lists).
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("explorer error: {message}")]
    Explorer { message: String },

    #[error("invalid ABI from {origin}: {reason}")]
    InvalidAbi { origin: String, reason: String },

    #[error("invalid registry: {0}")]
    Registry(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
