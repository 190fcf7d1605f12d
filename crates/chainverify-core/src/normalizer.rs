//! Input normalization: hex, base64 and gzip-compressed hex all collapse to
//! the raw transaction bytes both chain decoders consume.
//!
//! Decision order:
//! 1. `0x`-optional hex → decoded directly
//! 2. base64 → decoded, then re-checked as bytes
//! 3. payload starting with the gzip magic `1f 8b 08` → decompressed;
//!    a failed decompression keeps the compressed bytes

use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::read::GzDecoder;
use std::fmt;
use std::io::Read;

use crate::error::NormalizeError;

/// gzip member header: ID1, ID2, CM=deflate.
pub const GZIP_MAGIC: [u8; 3] = [0x1f, 0x8b, 0x08];

/// Normalized transaction bytes, produced and consumed within one verification.
#[derive(Clone, PartialEq, Eq)]
pub struct CanonicalTx(Vec<u8>);

impl CanonicalTx {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Lowercase, unprefixed hex.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Debug for CanonicalTx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CanonicalTx(0x{})", self.to_hex())
    }
}

impl AsRef<[u8]> for CanonicalTx {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// `^(0x)?[0-9a-fA-F]+$`
pub fn is_hex(value: &str) -> bool {
    let digits = strip_hex_prefix(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Padded standard-alphabet base64 whose length is a multiple of four.
pub fn is_base64(value: &str) -> bool {
    if value.is_empty() || value.len() % 4 != 0 {
        return false;
    }
    let body = value.trim_end_matches('=');
    if value.len() - body.len() > 2 {
        return false;
    }
    body.bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
}

/// `^(0x)?0*$`
pub fn is_zero_hex(value: &str) -> bool {
    strip_hex_prefix(value).bytes().all(|b| b == b'0')
}

pub fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

pub fn is_gzipped(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

/// Normalize a raw input string into transaction bytes.
pub fn normalize_input(raw: &str) -> Result<CanonicalTx, NormalizeError> {
    let input = raw.trim();
    if input.is_empty() {
        return Err(NormalizeError::Empty);
    }

    // Checked before base64: an unprefixed hex string whose length is a
    // multiple of 4 is also valid base64, and is meant as hex.
    let bytes = if is_hex(input) {
        decode_hex(input)?
    } else if is_base64(input) {
        STANDARD
            .decode(input)
            .map_err(|_| NormalizeError::UnknownEncoding)?
    } else {
        return Err(NormalizeError::UnknownEncoding);
    };

    if bytes.is_empty() {
        return Err(NormalizeError::Empty);
    }

    if is_gzipped(&bytes) {
        match decompress_gzip(&bytes) {
            Ok(inflated) if !inflated.is_empty() => return Ok(CanonicalTx(inflated)),
            Ok(_) => tracing::debug!("gzip payload inflated to nothing, keeping raw bytes"),
            Err(e) => tracing::debug!(error = %e, "gzip decompression failed, keeping raw bytes"),
        }
    }

    Ok(CanonicalTx(bytes))
}

fn decode_hex(input: &str) -> Result<Vec<u8>, NormalizeError> {
    hex::decode(strip_hex_prefix(input)).map_err(|e| NormalizeError::InvalidHex {
        reason: e.to_string(),
    })
}

fn decompress_gzip(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    GzDecoder::new(bytes).read_to_end(&mut out)?;
    Ok(out)
}
