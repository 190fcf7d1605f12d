//! The uniform output record of every verifier.

use serde::{Deserialize, Serialize};

use crate::tx_type::TxType;
use crate::warning::Warnings;

/// A `{name, value}` pair: a decoded call argument or a stake parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl ToString) -> Self {
        Self {
            name: name.into(),
            value: value.to_string(),
        }
    }
}

/// What signing a transaction would actually do.
///
/// `recipients` and `values` are index-aligned; amounts are decimal strings
/// in the base unit of the target chain (wei on both families).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub network: String,
    #[serde(rename = "type")]
    pub tx_type: TxType,
    pub description: String,
    pub recipients: Vec<String>,
    pub values: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<String>,
    pub warnings: Warnings,
    pub message_to_sign: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_method: Option<String>,
    #[serde(rename = "contractMethodABI", skip_serializing_if = "Option::is_none")]
    pub contract_method_abi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_flare_network_contract: Option<bool>,
    /// Decoded call arguments, or the validator parameters of a stake transaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
}

impl VerificationResult {
    /// Start a result with the fields every transaction kind carries.
    pub fn new(network: impl Into<String>, tx_type: TxType, message_to_sign: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            tx_type,
            description: tx_type.description().to_string(),
            recipients: Vec::new(),
            values: Vec::new(),
            fee: None,
            warnings: Warnings::new(),
            message_to_sign: message_to_sign.into(),
            contract_name: None,
            contract_method: None,
            contract_method_abi: None,
            contract_data: None,
            is_flare_network_contract: None,
            parameters: None,
        }
    }

    /// Look up a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .as_ref()?
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }
}
