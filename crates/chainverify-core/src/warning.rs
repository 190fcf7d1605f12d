//! Anomaly tags and the accumulator every verification step returns.
//!
//! Steps never share a mutable set: each produces its own [`Warnings`]
//! value and the verifier merges them into the final result.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A security-relevant anomaly found in a decoded transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Warning {
    /// The declared chain / network id is not in the configured table.
    UnknownNetwork,
    /// An output carries a non-zero lock time.
    FundsLocked,
    /// Outputs go to more than one distinct recipient.
    MultipleRecipients,
    /// An output owner set does not consist of exactly one address.
    MultipleSigners,
    /// An input or output is denominated in a non-native asset.
    InvalidAsset,
    /// A source / destination blockchain id does not match the context.
    InvalidBlockchain,
    /// An input is not among the recipient's unspent outputs.
    FundsNotReturned,
    /// The delegation target is neither a current nor a pending validator.
    UnknownNodeid,
    /// The subnet id is not the primary network.
    UnknownSubnet,
    /// The transaction uses a legacy (pre-permissionless) stake encoding.
    DeprecatedTx,
    /// The call was decoded against a proxy implementation, not the callee.
    ProxyContract,
    /// Change outputs do not return to the single stake recipient.
    UnspentAmountNotToRecipient,
}

impl Warning {
    pub fn tag(&self) -> &'static str {
        match self {
            Warning::UnknownNetwork => "UNKNOWN_NETWORK",
            Warning::FundsLocked => "FUNDS_LOCKED",
            Warning::MultipleRecipients => "MULTIPLE_RECIPIENTS",
            Warning::MultipleSigners => "MULTIPLE_SIGNERS",
            Warning::InvalidAsset => "INVALID_ASSET",
            Warning::InvalidBlockchain => "INVALID_BLOCKCHAIN",
            Warning::FundsNotReturned => "FUNDS_NOT_RETURNED",
            Warning::UnknownNodeid => "UNKNOWN_NODEID",
            Warning::UnknownSubnet => "UNKNOWN_SUBNET",
            Warning::DeprecatedTx => "DEPRECATED_TX",
            Warning::ProxyContract => "PROXY_CONTRACT",
            Warning::UnspentAmountNotToRecipient => "UNSPENT_AMOUNT_NOT_TO_RECIPIENT",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// An unordered set of warnings produced by one or more verification steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Warnings(BTreeSet<Warning>);

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding exactly one warning.
    pub fn single(warning: Warning) -> Self {
        let mut w = Self::new();
        w.add(warning);
        w
    }

    pub fn add(&mut self, warning: Warning) {
        self.0.insert(warning);
    }

    /// Add `warning` only when `condition` holds.
    pub fn add_if(&mut self, condition: bool, warning: Warning) {
        if condition {
            self.add(warning);
        }
    }

    /// Fold another step's warnings into this one.
    pub fn merge(&mut self, other: Warnings) {
        self.0.extend(other.0);
    }

    /// Builder-style `merge`.
    pub fn with(mut self, other: Warnings) -> Self {
        self.merge(other);
        self
    }

    pub fn contains(&self, warning: Warning) -> bool {
        self.0.contains(&warning)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.0.iter()
    }
}

impl From<Option<Warning>> for Warnings {
    fn from(w: Option<Warning>) -> Self {
        w.map(Warnings::single).unwrap_or_default()
    }
}

impl FromIterator<Warning> for Warnings {
    fn from_iter<I: IntoIterator<Item = Warning>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Warning> for Warnings {
    fn extend<I: IntoIterator<Item = Warning>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}
