//! Canonical string form of decoded ABI values, as reported in
//! `VerificationResult::parameters`.

use alloy_core::dyn_abi::DynSolValue;

/// Render a decoded value.
///
/// Integers are decimal, addresses EIP-55 checksummed, byte strings `0x` hex,
/// booleans `true`/`false`; arrays and tuples join their elements with `,`.
pub fn render(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::FixedBytes(word, size) => format!("0x{}", hex::encode(&word[..*size])),
        DynSolValue::Bytes(b) => format!("0x{}", hex::encode(b)),
        DynSolValue::String(s) => s.clone(),
        DynSolValue::Address(a) => a.to_checksum(None),
        DynSolValue::Function(f) => format!("0x{}", hex::encode(f)),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            items.iter().map(render).collect::<Vec<_>>().join(",")
        }
        #[allow(unreachable_patterns)]
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256, I256, U256};

    #[test]
    fn scalars() {
        assert_eq!(render(&DynSolValue::Bool(true)), "true");
        assert_eq!(render(&DynSolValue::Uint(U256::from(1_000_000u64), 256)), "1000000");
        assert_eq!(render(&DynSolValue::Int(I256::try_from(-5i64).unwrap(), 64)), "-5");
        assert_eq!(render(&DynSolValue::String("flare".into())), "flare");
        assert_eq!(render(&DynSolValue::Bytes(vec![0xde, 0xad])), "0xdead");
    }

    #[test]
    fn fixed_bytes_are_truncated_to_their_size() {
        let mut raw = [0u8; 32];
        raw[0] = 0xab;
        raw[1] = 0xcd;
        assert_eq!(render(&DynSolValue::FixedBytes(B256::from(raw), 2)), "0xabcd");
    }

    #[test]
    fn addresses_are_checksummed() {
        let addr: Address = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045".parse().unwrap();
        assert_eq!(render(&DynSolValue::Address(addr)), "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045");
    }

    #[test]
    fn arrays_and_tuples_are_comma_joined() {
        let arr = DynSolValue::Array(vec![
            DynSolValue::Uint(U256::from(1u64), 256),
            DynSolValue::Uint(U256::from(2u64), 256),
        ]);
        assert_eq!(render(&arr), "1,2");
        let tuple = DynSolValue::Tuple(vec![DynSolValue::Bool(false), arr]);
        assert_eq!(render(&tuple), "false,1,2");
    }
}
