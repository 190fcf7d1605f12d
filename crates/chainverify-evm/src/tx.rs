//! Account-model transaction codec.
//!
//! A thin view over the `alloy-consensus` transaction types. Handles legacy
//! (pre-EIP-155 and EIP-155), EIP-2930 and EIP-1559 transactions, signed or
//! unsigned, and re-encodes the unsigned form a signer hashes.
//!
//! | First byte | Envelope |
//! |------------|----------|
//! | `>= 0xc0`  | legacy RLP list |
//! | `0x01`     | EIP-2930 typed transaction |
//! | `0x02`     | EIP-1559 typed transaction |
//!
//! Signed input goes through [`TxEnvelope`]. Anything else must be the exact
//! serialization a signer would hash, so a signed transaction with a
//! malformed signature is rejected rather than read as unsigned.

use alloy_consensus::{SignableTransaction, TxEip1559, TxEip2930, TxEnvelope, TxLegacy};
use alloy_eips::eip2718::{Decodable2718, Encodable2718};
use alloy_eips::eip2930::AccessList;
use alloy_primitives::{Address, Bytes, PrimitiveSignature, TxKind, B256, U256};
use alloy_rlp::Decodable;
use tiny_keccak::{Hasher, Keccak};

use crate::error::CodecError;

pub const EIP2930_TX_TYPE: u8 = 0x01;
pub const EIP1559_TX_TYPE: u8 = 0x02;

/// Compute keccak256 of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvmTxKind {
    Legacy,
    Eip2930,
    Eip1559,
}

/// The unsigned transaction, one variant per supported envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvmTxBody {
    Legacy(TxLegacy),
    Eip2930(TxEip2930),
    Eip1559(TxEip1559),
}

/// Apply the same expression to whichever transaction the body holds.
macro_rules! each {
    ($body:expr, $tx:ident => $e:expr) => {
        match $body {
            EvmTxBody::Legacy($tx) => $e,
            EvmTxBody::Eip2930($tx) => $e,
            EvmTxBody::Eip1559($tx) => $e,
        }
    };
}

/// Signature fields as they appear on the wire.
///
/// For legacy transactions `v` is `27`/`28` or the EIP-155 value
/// `chain_id * 2 + 35 + parity`; for typed transactions it is the y-parity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxSignature {
    pub v: u64,
    pub r: U256,
    pub s: U256,
}

/// A decoded account-model transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmTx {
    pub body: EvmTxBody,
    pub signature: Option<TxSignature>,
}

impl EvmTx {
    /// Decode a raw (signed or unsigned) transaction.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let (&first, _) = bytes.split_first().ok_or(CodecError::Empty)?;
        if !matches!(first, 0xc0.. | EIP2930_TX_TYPE | EIP1559_TX_TYPE) {
            return Err(CodecError::UnsupportedType(first));
        }
        if let Some(signed) = decode_signed(bytes)? {
            return Ok(signed);
        }
        decode_unsigned(first, bytes)
    }

    pub fn kind(&self) -> EvmTxKind {
        match self.body {
            EvmTxBody::Legacy(_) => EvmTxKind::Legacy,
            EvmTxBody::Eip2930(_) => EvmTxKind::Eip2930,
            EvmTxBody::Eip1559(_) => EvmTxKind::Eip1559,
        }
    }

    /// `0` for pre-EIP-155 legacy transactions.
    pub fn chain_id(&self) -> u64 {
        match &self.body {
            EvmTxBody::Legacy(tx) => tx.chain_id.unwrap_or_default(),
            EvmTxBody::Eip2930(tx) => tx.chain_id,
            EvmTxBody::Eip1559(tx) => tx.chain_id,
        }
    }

    pub fn nonce(&self) -> u64 {
        each!(&self.body, tx => tx.nonce)
    }

    /// `None` for contract creation.
    pub fn to(&self) -> Option<Address> {
        each!(&self.body, tx => tx.to.to().copied())
    }

    pub fn value(&self) -> U256 {
        each!(&self.body, tx => tx.value)
    }

    pub fn input(&self) -> &Bytes {
        each!(&self.body, tx => &tx.input)
    }

    pub fn gas_limit(&self) -> u64 {
        each!(&self.body, tx => tx.gas_limit)
    }

    /// Legacy and EIP-2930 only.
    pub fn gas_price(&self) -> Option<u128> {
        match &self.body {
            EvmTxBody::Legacy(tx) => Some(tx.gas_price),
            EvmTxBody::Eip2930(tx) => Some(tx.gas_price),
            EvmTxBody::Eip1559(_) => None,
        }
    }

    /// EIP-1559 only.
    pub fn max_fee_per_gas(&self) -> Option<u128> {
        match &self.body {
            EvmTxBody::Eip1559(tx) => Some(tx.max_fee_per_gas),
            _ => None,
        }
    }

    pub fn access_list(&self) -> Option<&AccessList> {
        match &self.body {
            EvmTxBody::Legacy(_) => None,
            EvmTxBody::Eip2930(tx) => Some(&tx.access_list),
            EvmTxBody::Eip1559(tx) => Some(&tx.access_list),
        }
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    pub fn is_contract_creation(&self) -> bool {
        self.to().is_none()
    }

    /// The serialization a signer hashes: no signature, and for EIP-155
    /// legacy transactions the `[chain_id, 0, 0]` trailer.
    pub fn encode_unsigned(&self) -> Vec<u8> {
        let mut out = Vec::new();
        each!(&self.body, tx => tx.encode_for_signing(&mut out));
        out
    }

    /// The wire serialization: signed when a signature is present.
    pub fn encode(&self) -> Vec<u8> {
        let Some(sig) = &self.signature else {
            return self.encode_unsigned();
        };
        let signature = PrimitiveSignature::new(sig.r, sig.s, self.y_parity(sig.v));
        let envelope: TxEnvelope = match self.body.clone() {
            EvmTxBody::Legacy(tx) => tx.into_signed(signature).into(),
            EvmTxBody::Eip2930(tx) => tx.into_signed(signature).into(),
            EvmTxBody::Eip1559(tx) => tx.into_signed(signature).into(),
        };
        envelope.encoded_2718()
    }

    pub fn signing_hash(&self) -> B256 {
        each!(&self.body, tx => tx.signature_hash())
    }

    /// `0x`-prefixed signing hash.
    pub fn message_to_sign(&self) -> String {
        format!("0x{}", hex::encode(self.signing_hash()))
    }

    /// `gas_limit × price`, preferring a non-zero legacy gas price over the
    /// EIP-1559 max fee. `None` when the product is zero.
    pub fn max_fee(&self) -> Option<U256> {
        let price = self
            .gas_price()
            .filter(|p| *p != 0)
            .or(self.max_fee_per_gas())
            .unwrap_or_default();
        let fee = U256::from(self.gas_limit()).saturating_mul(U256::from(price));
        (!fee.is_zero()).then_some(fee)
    }

    fn y_parity(&self, v: u64) -> bool {
        match (self.kind(), v) {
            (EvmTxKind::Legacy, 27 | 28) => v == 28,
            (EvmTxKind::Legacy, 35..) => (v - 35) % 2 == 1,
            _ => v % 2 == 1,
        }
    }
}

// ─── Decoding ────────────────────────────────────────────────────────────────

/// A signed envelope, or `None` when `bytes` carry no usable signature.
///
/// An unsigned EIP-155 legacy transaction ends in `[chain_id, 0, 0]`, which
/// reads as a signature with zero `r` and `s`.
fn decode_signed(bytes: &[u8]) -> Result<Option<EvmTx>, CodecError> {
    let mut buf = bytes;
    let Ok(envelope) = TxEnvelope::decode_2718(&mut buf) else {
        return Ok(None);
    };

    let (body, parity, r, s) = match envelope {
        TxEnvelope::Legacy(signed) => {
            let sig = *signed.signature();
            (EvmTxBody::Legacy(signed.tx().clone()), sig.v(), sig.r(), sig.s())
        }
        TxEnvelope::Eip2930(signed) => {
            let sig = *signed.signature();
            (EvmTxBody::Eip2930(signed.tx().clone()), sig.v(), sig.r(), sig.s())
        }
        TxEnvelope::Eip1559(signed) => {
            let sig = *signed.signature();
            (EvmTxBody::Eip1559(signed.tx().clone()), sig.v(), sig.r(), sig.s())
        }
        _ => return Ok(None),
    };
    if r.is_zero() && s.is_zero() {
        return Ok(None);
    }
    if !buf.is_empty() {
        return Err(CodecError::TrailingBytes { remaining: buf.len() });
    }

    let v = match &body {
        EvmTxBody::Legacy(tx) => match tx.chain_id {
            Some(chain_id) => chain_id * 2 + 35 + parity as u64,
            None => 27 + parity as u64,
        },
        _ => parity as u64,
    };
    Ok(Some(EvmTx { body, signature: Some(TxSignature { v, r, s }) }))
}

fn decode_unsigned(first: u8, bytes: &[u8]) -> Result<EvmTx, CodecError> {
    let mut buf = match first {
        EIP2930_TX_TYPE | EIP1559_TX_TYPE => &bytes[1..],
        _ => bytes,
    };
    let body = match first {
        EIP2930_TX_TYPE => EvmTxBody::Eip2930(TxEip2930::decode(&mut buf)?),
        EIP1559_TX_TYPE => EvmTxBody::Eip1559(TxEip1559::decode(&mut buf)?),
        _ => EvmTxBody::Legacy(TxLegacy::decode(&mut buf)?),
    };
    let consumed = &bytes[..bytes.len() - buf.len()];
    if !buf.is_empty() {
        return Err(CodecError::TrailingBytes { remaining: buf.len() });
    }

    let tx = EvmTx { body, signature: None };
    if tx.encode_unsigned() != consumed {
        return Err(CodecError::InvalidField {
            field: "signature",
            reason: "neither a valid signature nor the unsigned form".into(),
        });
    }
    Ok(tx)
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Builds transactions for ad-hoc verification and fixtures.
///
/// ```ignore
/// let tx = EvmTxBuilder::eip1559(14).to(wnat).input(calldata).build();
/// let raw = hex::encode(tx.encode_unsigned());
/// ```
#[derive(Debug, Clone)]
pub struct EvmTxBuilder {
    tx: EvmTx,
}

impl EvmTxBuilder {
    fn with_body(body: EvmTxBody) -> Self {
        Self { tx: EvmTx { body, signature: None } }
    }

    pub fn eip1559(chain_id: u64) -> Self {
        Self::with_body(EvmTxBody::Eip1559(TxEip1559 { chain_id, ..Default::default() }))
    }

    pub fn eip2930(chain_id: u64) -> Self {
        Self::with_body(EvmTxBody::Eip2930(TxEip2930 { chain_id, ..Default::default() }))
    }

    /// A legacy transaction; `chain_id` 0 yields the pre-EIP-155 form.
    pub fn legacy(chain_id: u64) -> Self {
        let chain_id = (chain_id != 0).then_some(chain_id);
        Self::with_body(EvmTxBody::Legacy(TxLegacy { chain_id, ..Default::default() }))
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        each!(&mut self.tx.body, tx => tx.nonce = nonce);
        self
    }

    pub fn to(mut self, to: Address) -> Self {
        each!(&mut self.tx.body, tx => tx.to = TxKind::Call(to));
        self
    }

    pub fn value(mut self, value: U256) -> Self {
        each!(&mut self.tx.body, tx => tx.value = value);
        self
    }

    pub fn input(mut self, input: impl Into<Bytes>) -> Self {
        let input = input.into();
        each!(&mut self.tx.body, tx => tx.input = input);
        self
    }

    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        each!(&mut self.tx.body, tx => tx.gas_limit = gas_limit);
        self
    }

    /// Ignored for EIP-1559 transactions.
    pub fn gas_price(mut self, price: u128) -> Self {
        match &mut self.tx.body {
            EvmTxBody::Legacy(tx) => tx.gas_price = price,
            EvmTxBody::Eip2930(tx) => tx.gas_price = price,
            EvmTxBody::Eip1559(_) => {}
        }
        self
    }

    /// Ignored for legacy and EIP-2930 transactions.
    pub fn max_fee_per_gas(mut self, max_fee: u128, max_priority_fee: u128) -> Self {
        if let EvmTxBody::Eip1559(tx) = &mut self.tx.body {
            tx.max_fee_per_gas = max_fee;
            tx.max_priority_fee_per_gas = max_priority_fee;
        }
        self
    }

    /// Ignored for legacy transactions.
    pub fn access_list(mut self, list: AccessList) -> Self {
        match &mut self.tx.body {
            EvmTxBody::Legacy(_) => {}
            EvmTxBody::Eip2930(tx) => tx.access_list = list,
            EvmTxBody::Eip1559(tx) => tx.access_list = list,
        }
        self
    }

    pub fn signature(mut self, signature: TxSignature) -> Self {
        self.tx.signature = Some(signature);
        self
    }

    pub fn build(self) -> EvmTx {
        self.tx
    }
}
