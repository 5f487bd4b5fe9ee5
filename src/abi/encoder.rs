//! ABI encoder for contract calls

use ethers_core::types::U256;

use super::types::*;

/// ABI encoder
pub struct AbiEncoder;

impl AbiEncoder {
    /// Encode a single value according to its type
    pub fn encode_value(value: &AbiValue, abi_type: &AbiType) -> Result<Vec<u8>, AbiError> {
        match (value, abi_type) {
            (AbiValue::Uint(u), AbiType::Uint256) => Ok(word(*u).to_vec()),

            (AbiValue::Uint(u), AbiType::Uint8) => {
                if *u > U256::from(u8::MAX) {
                    return Err(AbiError::Overflow);
                }
                Ok(word(*u).to_vec())
            }

            (AbiValue::Address(addr), AbiType::Address) => {
                let mut result = [0u8; 32];
                result[12..].copy_from_slice(addr.as_bytes());
                Ok(result.to_vec())
            }

            (AbiValue::Bool(b), AbiType::Bool) => {
                let mut result = [0u8; 32];
                result[31] = u8::from(*b);
                Ok(result.to_vec())
            }

            (AbiValue::String(s), AbiType::String) => Ok(Self::encode_dynamic_bytes(s.as_bytes())),

            _ => Err(AbiError::TypeMismatch {
                expected: abi_type.canonical_type().to_string(),
                got: value.get_type().canonical_type().to_string(),
            }),
        }
    }

    /// Encode multiple values (for function calls) with head/tail layout
    pub fn encode(values: &[AbiValue], types: &[AbiType]) -> Result<Vec<u8>, AbiError> {
        if values.len() != types.len() {
            return Err(AbiError::EncodingError(format!(
                "Value count {} doesn't match type count {}",
                values.len(),
                types.len()
            )));
        }

        let head_size = 32 * types.len();
        let mut head = Vec::with_capacity(head_size);
        let mut tail = Vec::new();

        for (value, abi_type) in values.iter().zip(types.iter()) {
            let encoded = Self::encode_value(value, abi_type)?;
            if abi_type.is_dynamic() {
                // Head holds the offset of the tail entry
                let offset = head_size + tail.len();
                head.extend_from_slice(&word(U256::from(offset as u64)));
                tail.extend_from_slice(&encoded);
            } else {
                head.extend_from_slice(&encoded);
            }
        }

        head.extend_from_slice(&tail);
        Ok(head)
    }

    /// Length word followed by the data right-padded to 32 bytes
    fn encode_dynamic_bytes(bytes: &[u8]) -> Vec<u8> {
        let padded_len = bytes.len().div_ceil(32) * 32;
        let mut result = Vec::with_capacity(32 + padded_len);
        result.extend_from_slice(&word(U256::from(bytes.len() as u64)));
        result.extend_from_slice(bytes);
        result.resize(32 + padded_len, 0);
        result
    }

    /// Selector followed by the encoded arguments
    pub fn encode_function_call(
        selector: [u8; 4],
        values: &[AbiValue],
        types: &[AbiType],
    ) -> Result<Vec<u8>, AbiError> {
        let mut calldata = selector.to_vec();
        calldata.extend(Self::encode(values, types)?);
        Ok(calldata)
    }
}

pub(crate) fn word(value: U256) -> [u8; 32] {
    let mut out = [0u8; 32];
    value.to_big_endian(&mut out);
    out
}
