//! # chainverify-core
//!
//! Core types and helpers shared across all ChainVerify crates.
//! Every chain-family verifier produces the [`VerificationResult`] defined
//! here and routes anomalies through the [`Warnings`] accumulator.

pub mod config;
pub mod error;
pub mod network;
pub mod normalizer;
pub mod recipients;
pub mod result;
pub mod tx_type;
pub mod warning;

pub use config::{LogConfig, RetrySettings, VerifierConfig};
pub use error::{ConfigError, NormalizeError, StateError, VerifyError};
pub use network::{EvmNetwork, LedgerNetwork, NetworkTable, StaticContext};
pub use normalizer::{normalize_input, CanonicalTx};
pub use recipients::{gwei_to_wei, RecipientLedger};
pub use result::{Parameter, VerificationResult};
pub use tx_type::TxType;
pub use warning::{Warning, Warnings};
