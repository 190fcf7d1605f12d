//! Error types for the ledger-model codec and identifiers.

use thiserror::Error;

/// Bytes do not match the ledger transaction grammar.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("unexpected end of input at offset {offset}: needed {needed} more bytes")]
    UnexpectedEof { offset: usize, needed: usize },

    #[error("unsupported codec version {0}")]
    UnsupportedVersion(u16),

    #[error("unknown {context} type id {type_id}")]
    UnknownTypeId { context: &'static str, type_id: u32 },

    #[error("{remaining} trailing bytes after transaction")]
    TrailingBytes { remaining: usize },

    #[error("{what} length {len} exceeds the codec limit")]
    TooLong { what: &'static str, len: usize },

    #[error("invalid hex: {reason}")]
    InvalidHex { reason: String },

    #[error("invalid CB58 string: {reason}")]
    InvalidCb58 { reason: String },

    #[error("invalid bech32 address: {reason}")]
    InvalidBech32 { reason: String },
}
