//! Transaction kinds reported in `VerificationResult::tx_type`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The classification of a verified transaction.
///
/// The `_C` / `_P` suffix of the serialized tag names the chain the
/// transaction executes on (account-model C-chain or ledger-model P-chain).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxType {
    TransferC,
    ContractCallC,
    ExportC,
    ImportC,
    ExportP,
    ImportP,
    AddValidatorP,
    AddDelegatorP,
}

impl TxType {
    /// Human description shown next to the tag.
    pub fn description(&self) -> &'static str {
        match self {
            TxType::TransferC => "Funds transfer on C-chain",
            TxType::ContractCallC => "Contract call on C-chain",
            TxType::ExportC => "Export from C-chain",
            TxType::ImportC => "Import to C-chain",
            TxType::ExportP => "Export from P-chain",
            TxType::ImportP => "Import to P-chain",
            TxType::AddValidatorP => "Stake on P-chain",
            TxType::AddDelegatorP => "Delegation on P-chain",
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            TxType::TransferC => "TRANSFER_C",
            TxType::ContractCallC => "CONTRACT_CALL_C",
            TxType::ExportC => "EXPORT_C",
            TxType::ImportC => "IMPORT_C",
            TxType::ExportP => "EXPORT_P",
            TxType::ImportP => "IMPORT_P",
            TxType::AddValidatorP => "ADD_VALIDATOR_P",
            TxType::AddDelegatorP => "ADD_DELEGATOR_P",
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}
