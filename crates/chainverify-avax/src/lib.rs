//! # chainverify-avax
//!
//! Ledger-model transaction support for ChainVerify: the atomic C-chain
//! import/export transactions and the P-chain import, export and staking
//! transactions of Avalanche-derived networks such as Flare and Songbird.
//!
//! ```ignore
//! let state = Arc::new(PlatformRpcState::from_networks(&config.ledger_networks, &http)?);
//! let verifier = AvaxVerifier::new(state, config.network_table());
//! let result = verifier.verify(&normalize_input(raw)?).await;
//! ```

pub mod codec;
pub mod encoding;
pub mod error;
pub mod state;
pub mod tx;
pub mod verifier;

pub use encoding::{cb58_decode, cb58_encode, format_address, node_id_string, Id, ShortId};
pub use error::CodecError;
pub use state::{ChainContext, LedgerChainState, PlatformRpcState};
pub use tx::{decode_ledger_tx, DecodedLedgerTx, LedgerTx};
pub use verifier::AvaxVerifier;
