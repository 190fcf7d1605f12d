//! Human-readable identifiers: CB58 ids, `NodeID-` strings and bech32 addresses.

use bech32::{Bech32, Hrp};
use sha2::{Digest, Sha256};

use crate::error::CodecError;

/// 32-byte blockchain / asset / transaction id.
pub type Id = [u8; 32];
/// 20-byte address or node id.
pub type ShortId = [u8; 20];

/// The P-chain and the primary network subnet are both the all-zero id.
pub const EMPTY_ID: Id = [0u8; 32];

pub const NODE_ID_PREFIX: &str = "NodeID-";

/// base58 of `payload ‖ sha256(payload)[28..32]`.
pub fn cb58_encode(payload: &[u8]) -> String {
    let digest = Sha256::digest(payload);
    let mut buf = Vec::with_capacity(payload.len() + 4);
    buf.extend_from_slice(payload);
    buf.extend_from_slice(&digest[digest.len() - 4..]);
    bs58::encode(buf).into_string()
}

pub fn cb58_decode(value: &str) -> Result<Vec<u8>, CodecError> {
    let raw = bs58::decode(value)
        .into_vec()
        .map_err(|e| CodecError::InvalidCb58 { reason: e.to_string() })?;
    if raw.len() < 4 {
        return Err(CodecError::InvalidCb58 { reason: "shorter than checksum".into() });
    }
    let (payload, checksum) = raw.split_at(raw.len() - 4);
    let digest = Sha256::digest(payload);
    if &digest[digest.len() - 4..] != checksum {
        return Err(CodecError::InvalidCb58 { reason: "checksum mismatch".into() });
    }
    Ok(payload.to_vec())
}

/// Decode a CB58 string that must hold exactly 32 bytes.
pub fn cb58_decode_id(value: &str) -> Result<Id, CodecError> {
    let bytes = cb58_decode(value)?;
    bytes.as_slice().try_into().map_err(|_| CodecError::InvalidCb58 {
        reason: format!("expected 32 bytes, got {}", bytes.len()),
    })
}

pub fn node_id_string(node_id: &ShortId) -> String {
    format!("{NODE_ID_PREFIX}{}", cb58_encode(node_id))
}

/// Bech32 address of a 20-byte key hash, without chain prefix.
pub fn format_address(hrp: &str, addr: &ShortId) -> Result<String, CodecError> {
    let hrp = Hrp::parse(hrp).map_err(|e| CodecError::InvalidBech32 { reason: e.to_string() })?;
    bech32::encode::<Bech32>(hrp, addr).map_err(|e| CodecError::InvalidBech32 { reason: e.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_id_is_the_well_known_p_chain_id() {
        assert_eq!(cb58_encode(&EMPTY_ID), "11111111111111111111111111111111LpoYY");
        assert_eq!(cb58_decode_id("11111111111111111111111111111111LpoYY").unwrap(), EMPTY_ID);
    }

    #[test]
    fn cb58_round_trip_and_checksum() {
        let id = [7u8; 32];
        let s = cb58_encode(&id);
        assert_eq!(cb58_decode_id(&s).unwrap(), id);

        let mut corrupted = s.into_bytes();
        let last = corrupted.len() - 1;
        corrupted[last] = if corrupted[last] == b'2' { b'3' } else { b'2' };
        let corrupted = String::from_utf8(corrupted).unwrap();
        assert!(cb58_decode(&corrupted).is_err());
    }

    #[test]
    fn node_id_has_prefix() {
        let s = node_id_string(&[1u8; 20]);
        assert!(s.starts_with("NodeID-"));
        assert_eq!(cb58_decode(&s["NodeID-".len()..]).unwrap(), vec![1u8; 20]);
    }

    #[test]
    fn address_is_bech32_under_network_hrp() {
        let addr = [0xabu8; 20];
        let s = format_address("flare", &addr).unwrap();
        assert!(s.starts_with("flare1"));
        let (hrp, data) = bech32::decode(&s).unwrap();
        assert_eq!(hrp.as_str(), "flare");
        assert_eq!(data, addr.to_vec());
        assert!(format_address("", &addr).is_err());
    }
}
