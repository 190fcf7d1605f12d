//! EVM proxy contract resolution.
//!
//! Finds the implementation contract behind a proxy so calldata can be
//! decoded against the implementation's ABI.
//!
//! ## Cascade
//!
//! Probes run in this order and the first non-zero address wins:
//!
//! | # | Pattern | Detection | Standard |
//! |---|---------|-----------|----------|
//! | 1 | Diamond | `facetAddress(bytes4)` call | EIP-2535 |
//! | 2 | Logic / beacon proxy | implementation slot, then beacon slot | EIP-1967 |
//! | 3 | UUPS | `PROXIABLE` slot | EIP-1822 |
//! | 4 | Minimal proxy (clone) | bytecode pattern | EIP-1167 |
//! | 5 | Gnosis Safe | `masterCopy()` call | Gnosis |
//! | 6 | OpenZeppelin legacy proxy | `org.zeppelinos.proxy.implementation` slot | OZ |
//! | 7 | Delegate proxy | `implementation()` call | EIP-897 |
//!
//! Slot and method probes only go to the network when the proxy bytecode
//! contains the slot constant or the method selector. A failed storage read
//! or call means "no match" for that probe and never aborts the cascade.

use alloy_primitives::{b256, Address, B256};
use serde::{Deserialize, Serialize};

use crate::state::EvmChainState;
use crate::tx::keccak256;

/// The proxy pattern that produced the implementation address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyKind {
    /// EIP-2535 diamond, facet looked up by selector
    Eip2535Diamond,
    /// EIP-1967 logic proxy
    Eip1967Logic,
    /// EIP-1967 beacon proxy; implementation read from the beacon contract
    Eip1967Beacon,
    /// EIP-1822 UUPS
    Eip1822Uups,
    /// EIP-1167 minimal proxy (clone)
    Eip1167Clone,
    /// Gnosis Safe proxy
    GnosisSafe,
    /// OpenZeppelin proxy predating EIP-1967
    OpenZeppelin,
    /// EIP-897 delegate proxy
    Eip897,
}

/// A resolved proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyInfo {
    pub proxy_address: Address,
    pub kind: ProxyKind,
    pub implementation: Address,
}

// ─── Storage slots ───────────────────────────────────────────────────────────

/// EIP-1967 implementation slot: `keccak256("eip1967.proxy.implementation") - 1`
pub const EIP1967_IMPL_SLOT: B256 =
    b256!("360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc");

/// EIP-1967 beacon slot: `keccak256("eip1967.proxy.beacon") - 1`
pub const EIP1967_BEACON_SLOT: B256 =
    b256!("a3f0ad74e5423aebfd80d3ef4346578335a9a72aeaee59ff6cb3582b35133d50");

/// EIP-1822 slot: `keccak256("PROXIABLE")`
pub const EIP1822_PROXIABLE_SLOT: B256 =
    b256!("c5f16f0fcc639fa48a6947836d9850f504798523bf8c9a3a87d5876cf622bcf7");

/// OpenZeppelin slot: `keccak256("org.zeppelinos.proxy.implementation")`
pub const OZ_IMPL_SLOT: B256 =
    b256!("7050c9e0f4ca769c69bd3a8ef740bc37934f8e2c036e5a723fd8ee048ed3f8c3");

/// `facetAddress(bytes4)`
pub const FACET_ADDRESS_SELECTOR: [u8; 4] = [0xcd, 0xff, 0xac, 0xc6];

// ─── EIP-1167 bytecode ───────────────────────────────────────────────────────

/// Clone bytecode up to the push opcode carrying the implementation address
pub const EIP1167_BYTECODE_PREFIX: &[u8] = &[0x36, 0x3d, 0x3d, 0x37, 0x3d, 0x3d, 0x3d, 0x36, 0x3d];

/// Tail of the clone bytecode after `DELEGATECALL … PUSH1 0x2b`
pub const EIP1167_BYTECODE_SUFFIX: &[u8] = &[0x57, 0xfd, 0x5b, 0xf3];

/// Bytes between the end of the embedded address and the suffix
const EIP1167_SUFFIX_OFFSET: usize = 11;

const PUSH0: u8 = 0x5f;

/// 4-byte selector of a function signature such as `"implementation()"`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Detect an EIP-1167 minimal proxy and extract its implementation.
///
/// The push opcode after the prefix gives the address length (1 to 20
/// bytes, the vanity-address variants use shorter pushes); the address is
/// left-padded to 20 bytes. Any structural mismatch yields `None`.
pub fn detect_eip1167_clone(bytecode: &[u8]) -> Option<Address> {
    let rest = bytecode.strip_prefix(EIP1167_BYTECODE_PREFIX)?;
    let (&push, rest) = rest.split_first()?;
    let len = usize::from(push.checked_sub(PUSH0)?);
    if !(1..=20).contains(&len) || rest.len() < len {
        return None;
    }
    let (embedded, rest) = rest.split_at(len);
    if !rest.get(EIP1167_SUFFIX_OFFSET..)?.starts_with(EIP1167_BYTECODE_SUFFIX) {
        return None;
    }
    let mut addr = [0u8; 20];
    addr[20 - len..].copy_from_slice(embedded);
    Some(Address::from(addr))
}

/// Interpret a 32-byte word (storage value or call return) as an address.
///
/// The upper 12 bytes must be zero and the address itself non-zero.
pub fn word_to_address(word: &[u8]) -> Option<Address> {
    let word = word.get(..32)?;
    let (upper, lower) = word.split_at(12);
    if upper.iter().any(|b| *b != 0) || lower.iter().all(|b| *b == 0) {
        return None;
    }
    let mut addr = [0u8; 20];
    addr.copy_from_slice(lower);
    Some(Address::from(addr))
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

// ─── Resolver ────────────────────────────────────────────────────────────────

/// Runs the proxy cascade against one chain.
pub struct ProxyResolver<'a> {
    state: &'a dyn EvmChainState,
    chain_id: u64,
}

impl<'a> ProxyResolver<'a> {
    pub fn new(state: &'a dyn EvmChainState, chain_id: u64) -> Self {
        Self { state, chain_id }
    }

    /// Resolve the implementation behind `proxy`; `calldata` feeds the
    /// diamond facet lookup.
    pub async fn resolve(&self, proxy: &Address, calldata: &[u8]) -> Option<ProxyInfo> {
        let code = match self.state.get_code(self.chain_id, proxy).await {
            Ok(code) => code,
            Err(e) => {
                tracing::warn!(proxy = %proxy, error = %e, "cannot fetch proxy bytecode");
                return None;
            }
        };

        let (kind, implementation) = self.cascade(proxy, &code, calldata).await?;
        tracing::debug!(proxy = %proxy, implementation = %implementation, ?kind, "proxy resolved");
        Some(ProxyInfo { proxy_address: *proxy, kind, implementation })
    }

    async fn cascade(&self, proxy: &Address, code: &[u8], calldata: &[u8]) -> Option<(ProxyKind, Address)> {
        if let Some(a) = self.facet_address(proxy, calldata).await {
            return Some((ProxyKind::Eip2535Diamond, a));
        }
        if let Some(a) = self.slot_address(proxy, code, &EIP1967_IMPL_SLOT).await {
            return Some((ProxyKind::Eip1967Logic, a));
        }
        if let Some(a) = self.beacon_implementation(proxy, code).await {
            return Some((ProxyKind::Eip1967Beacon, a));
        }
        if let Some(a) = self.slot_address(proxy, code, &EIP1822_PROXIABLE_SLOT).await {
            return Some((ProxyKind::Eip1822Uups, a));
        }
        if let Some(a) = detect_eip1167_clone(code) {
            return Some((ProxyKind::Eip1167Clone, a));
        }
        if let Some(a) = self.method_address(proxy, code, "masterCopy()").await {
            return Some((ProxyKind::GnosisSafe, a));
        }
        if let Some(a) = self.slot_address(proxy, code, &OZ_IMPL_SLOT).await {
            return Some((ProxyKind::OpenZeppelin, a));
        }
        if let Some(a) = self.method_address(proxy, code, "implementation()").await {
            return Some((ProxyKind::Eip897, a));
        }
        None
    }

    async fn facet_address(&self, proxy: &Address, calldata: &[u8]) -> Option<Address> {
        let function = calldata.get(..4)?;
        let mut data = Vec::with_capacity(36);
        data.extend_from_slice(&FACET_ADDRESS_SELECTOR);
        data.extend_from_slice(function);
        data.resize(36, 0);
        self.call_for_address(proxy, &data).await
    }

    async fn slot_address(&self, contract: &Address, code: &[u8], slot: &B256) -> Option<Address> {
        if !contains_bytes(code, slot.as_slice()) {
            return None;
        }
        match self.state.get_storage_at(self.chain_id, contract, slot).await {
            Ok(word) => word_to_address(word.as_slice()),
            Err(e) => {
                tracing::warn!(contract = %contract, slot = %slot, error = %e, "storage read failed");
                None
            }
        }
    }

    async fn beacon_implementation(&self, proxy: &Address, code: &[u8]) -> Option<Address> {
        let beacon = self.slot_address(proxy, code, &EIP1967_BEACON_SLOT).await?;
        let beacon_code = match self.state.get_code(self.chain_id, &beacon).await {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(beacon = %beacon, error = %e, "cannot fetch beacon bytecode");
                return None;
            }
        };
        if beacon_code.iter().all(|b| *b == 0) {
            return None;
        }
        if let Some(a) = self.method_address(&beacon, &beacon_code, "implementation()").await {
            return Some(a);
        }
        self.method_address(&beacon, &beacon_code, "childImplementation()").await
    }

    /// Call a no-argument address getter when its selector occurs in `code`.
    async fn method_address(&self, contract: &Address, code: &[u8], signature: &str) -> Option<Address> {
        let sel = selector(signature);
        if !contains_bytes(code, &sel) {
            return None;
        }
        self.call_for_address(contract, &sel).await
    }

    async fn call_for_address(&self, contract: &Address, data: &[u8]) -> Option<Address> {
        match self.state.call(self.chain_id, contract, data).await {
            Ok(ret) => word_to_address(&ret),
            Err(e) => {
                tracing::debug!(contract = %contract, error = %e, "probe call failed");
                None
            }
        }
    }
}
