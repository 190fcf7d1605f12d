//! Recipient aggregation and amount unit conversion.
//!
//! Outputs paying the same canonical recipient collapse into one entry whose
//! amount is the exact sum; entries keep the order of first appearance.

use indexmap::IndexMap;

/// Ledger-chain amounts are denominated in gwei; results are reported in wei.
pub const GWEI_TO_WEI: u128 = 1_000_000_000;

/// Convert a ledger-chain amount to the account-chain base unit.
pub fn gwei_to_wei(amount: u128) -> u128 {
    amount * GWEI_TO_WEI
}

/// Signed variant of [`gwei_to_wei`] for fees, which can go negative on
/// transactions that spend more than they consume.
pub fn gwei_to_wei_signed(amount: i128) -> i128 {
    amount * GWEI_TO_WEI as i128
}

/// Canonical key of an output owner set: addresses sorted and joined.
pub fn canonical_owner_key<S: AsRef<str>>(addresses: &[S]) -> String {
    let mut items: Vec<&str> = addresses.iter().map(|a| a.as_ref()).collect();
    items.sort_unstable();
    items.join(", ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    amount: u128,
    signers: usize,
}

/// Ordered `recipient → summed amount` aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientLedger {
    entries: IndexMap<String, Entry>,
}

impl RecipientLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` to a single-address recipient.
    pub fn credit(&mut self, recipient: impl Into<String>, amount: u128) {
        self.credit_owners(recipient.into(), 1, amount);
    }

    /// Credit `amount` to the owner set `addresses`, keyed canonically.
    pub fn credit_owner_set<S: AsRef<str>>(&mut self, addresses: &[S], amount: u128) {
        let key = canonical_owner_key(addresses);
        self.credit_owners(key, addresses.len(), amount);
    }

    fn credit_owners(&mut self, key: String, signers: usize, amount: u128) {
        self.entries
            .entry(key)
            .and_modify(|e| e.amount += amount)
            .or_insert(Entry { amount, signers });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all credited amounts.
    pub fn total(&self) -> u128 {
        self.entries.values().map(|e| e.amount).sum()
    }

    pub fn recipients(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn amounts(&self) -> Vec<u128> {
        self.entries.values().map(|e| e.amount).collect()
    }

    /// Amounts as decimal strings after applying `scale`.
    pub fn values(&self, scale: impl Fn(u128) -> u128) -> Vec<String> {
        self.entries.values().map(|e| scale(e.amount).to_string()).collect()
    }

    /// The recipient when there is exactly one, owned by exactly one address.
    pub fn sole_recipient(&self) -> Option<&str> {
        if self.entries.len() != 1 {
            return None;
        }
        self.entries
            .iter()
            .next()
            .filter(|(_, e)| e.signers == 1)
            .map(|(k, _)| k.as_str())
    }

    pub fn contains(&self, recipient: &str) -> bool {
        self.entries.contains_key(recipient)
    }

    pub fn first(&self) -> Option<&str> {
        self.entries.keys().next().map(|k| k.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_recipient_is_summed_in_first_seen_order() {
        let mut ledger = RecipientLedger::new();
        ledger.credit("A", 5);
        ledger.credit("B", 2);
        ledger.credit("A", 3);
        assert_eq!(ledger.recipients(), vec!["A", "B"]);
        assert_eq!(ledger.amounts(), vec![8, 2]);
        assert_eq!(ledger.total(), 10);
    }

    #[test]
    fn aggregation_is_order_independent_per_key() {
        let mut one = RecipientLedger::new();
        one.credit("A", 3);
        one.credit("A", 5);
        let mut two = RecipientLedger::new();
        two.credit("A", 5);
        two.credit("A", 3);
        assert_eq!(one.amounts(), two.amounts());
    }

    #[test]
    fn owner_sets_are_canonicalized() {
        let mut ledger = RecipientLedger::new();
        ledger.credit_owner_set(&["flare1b", "flare1a"], 1);
        ledger.credit_owner_set(&["flare1a", "flare1b"], 2);
        assert_eq!(ledger.recipients(), vec!["flare1a, flare1b"]);
        assert_eq!(ledger.amounts(), vec![3]);
        assert_eq!(ledger.sole_recipient(), None);
    }

    #[test]
    fn sole_recipient_requires_single_signer() {
        let mut ledger = RecipientLedger::new();
        ledger.credit_owner_set(&["flare1a"], 1);
        assert_eq!(ledger.sole_recipient(), Some("flare1a"));
        ledger.credit("flare1b", 1);
        assert_eq!(ledger.sole_recipient(), None);
    }

    #[test]
    fn values_are_scaled_to_wei() {
        let mut ledger = RecipientLedger::new();
        ledger.credit("A", 2);
        assert_eq!(ledger.values(gwei_to_wei), vec!["2000000000"]);
        assert_eq!(gwei_to_wei_signed(-1), -1_000_000_000);
    }
}
