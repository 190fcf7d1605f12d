//! Function-call calldata decoder.
//!
//! - First 4 bytes of calldata = keccak256(function_signature)[:4] (the selector)
//! - Remaining bytes = ABI-encoded inputs tuple

use alloy_core::dyn_abi::{DynSolType, DynSolValue, Specifier};
use alloy_json_abi::{Function, JsonAbi};

use chainverify_core::Parameter;

use crate::error::AbiError;
use crate::render::render;

/// A calldata decode against a matched function.
#[derive(Debug, Clone)]
pub struct DecodedCall {
    pub function: Function,
    pub parameters: Vec<Parameter>,
}

impl DecodedCall {
    pub fn method(&self) -> &str {
        &self.function.name
    }

    /// JSON form of the matched function fragment.
    pub fn function_json(&self) -> Result<String, AbiError> {
        serde_json::to_string(&self.function).map_err(|e| AbiError::InvalidJson { reason: e.to_string() })
    }
}

/// Decodes calldata against one contract ABI.
#[derive(Debug, Clone)]
pub struct EvmCallDecoder {
    abi: JsonAbi,
}

impl EvmCallDecoder {
    pub fn new(abi: JsonAbi) -> Self {
        Self { abi }
    }

    /// Create a decoder from a standard Ethereum ABI JSON string.
    pub fn from_abi_json(abi_json: &str) -> Result<Self, AbiError> {
        let abi: JsonAbi =
            serde_json::from_str(abi_json).map_err(|e| AbiError::InvalidJson { reason: e.to_string() })?;
        Ok(Self { abi })
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    pub fn find_function(&self, selector: [u8; 4]) -> Option<&Function> {
        self.abi.functions().find(|f| f.selector() == selector)
    }

    /// Decode `calldata` (selector included).
    ///
    /// `Ok(None)` when no function of the ABI has the selector; an error when
    /// a function matches but its inputs do not decode.
    pub fn decode_call(&self, calldata: &[u8]) -> Result<Option<DecodedCall>, AbiError> {
        let Some(selector) = calldata.get(..4) else {
            return Ok(None);
        };
        let mut sel = [0u8; 4];
        sel.copy_from_slice(selector);
        let Some(func) = self.find_function(sel) else {
            return Ok(None);
        };

        let values = decode_inputs(func, &calldata[4..])?;
        let parameters = func
            .inputs
            .iter()
            .zip(values.iter())
            .map(|(param, value)| Parameter::new(param.name.clone(), render(value)))
            .collect();

        Ok(Some(DecodedCall { function: func.clone(), parameters }))
    }
}

fn decode_inputs(func: &Function, data: &[u8]) -> Result<Vec<DynSolValue>, AbiError> {
    let types = func
        .inputs
        .iter()
        .map(|p| p.resolve())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AbiError::UnresolvableType { function: func.signature(), reason: e.to_string() })?;
    if types.is_empty() {
        return Ok(Vec::new());
    }

    let decoded = DynSolType::Tuple(types)
        .abi_decode_params(data)
        .map_err(|e| AbiError::CallData { function: func.signature(), reason: e.to_string() })?;

    Ok(match decoded {
        DynSolValue::Tuple(values) => values,
        other => vec![other],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ERC20_ABI: &str = r#"[
        {
            "name": "transfer",
            "type": "function",
            "inputs": [
                {"name": "to", "type": "address"},
                {"name": "amount", "type": "uint256"}
            ],
            "outputs": [{"name": "", "type": "bool"}],
            "stateMutability": "nonpayable"
        },
        {
            "name": "pause",
            "type": "function",
            "inputs": [],
            "outputs": [],
            "stateMutability": "nonpayable"
        }
    ]"#;

    fn transfer_calldata() -> Vec<u8> {
        let mut calldata = hex::decode("a9059cbb").unwrap();
        calldata.extend(hex::decode("000000000000000000000000d8da6bf26964af9d7eed9e03e53415d37aa96045").unwrap());
        calldata.extend(hex::decode("00000000000000000000000000000000000000000000000000000000000f4240").unwrap());
        calldata
    }

    #[test]
    fn decode_transfer_calldata() {
        let dec = EvmCallDecoder::from_abi_json(ERC20_ABI).unwrap();
        let call = dec.decode_call(&transfer_calldata()).unwrap().unwrap();
        assert_eq!(call.method(), "transfer");
        assert_eq!(call.parameters[0], Parameter::new("to", "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045"));
        assert_eq!(call.parameters[1], Parameter::new("amount", "1000000"));
        assert!(call.function_json().unwrap().contains("\"name\":\"transfer\""));
    }

    #[test]
    fn no_argument_function() {
        let dec = EvmCallDecoder::from_abi_json(ERC20_ABI).unwrap();
        let sel = dec.find_function(crate::proxy::selector("pause()")).unwrap().selector();
        let call = dec.decode_call(sel.as_slice()).unwrap().unwrap();
        assert_eq!(call.method(), "pause");
        assert!(call.parameters.is_empty());
    }

    #[test]
    fn unknown_selector_is_not_an_error() {
        let dec = EvmCallDecoder::from_abi_json(ERC20_ABI).unwrap();
        assert!(dec.decode_call(&[0xde, 0xad, 0xbe, 0xef]).unwrap().is_none());
        assert!(dec.decode_call(&[0xa9]).unwrap().is_none());
    }

    #[test]
    fn truncated_arguments_are_an_error() {
        let dec = EvmCallDecoder::from_abi_json(ERC20_ABI).unwrap();
        let calldata = transfer_calldata();
        assert!(matches!(
            dec.decode_call(&calldata[..40]),
            Err(AbiError::CallData { .. })
        ));
    }

    #[test]
    fn invalid_json_returns_error() {
        assert!(EvmCallDecoder::from_abi_json("not json").is_err());
    }
}
