//! ABI decoder for contract call results

use ethers_core::types::U256;

use super::types::*;
use crate::types::Address;

/// ABI decoder
pub struct AbiDecoder;

impl AbiDecoder {
    /// Decode a single value from bytes according to its type
    pub fn decode_value(data: &[u8], abi_type: &AbiType, offset: usize) -> Result<AbiValue, AbiError> {
        let slot = read_word(data, offset)?;

        match abi_type {
            AbiType::Uint256 => Ok(AbiValue::Uint(U256::from_big_endian(slot))),

            AbiType::Uint8 => {
                let value = U256::from_big_endian(slot);
                if value > U256::from(u8::MAX) {
                    return Err(AbiError::DecodingError(format!("Value {} out of range for uint8", value)));
                }
                Ok(AbiValue::Uint(value))
            }

            AbiType::Address => {
                let mut addr = [0u8; 20];
                addr.copy_from_slice(&slot[12..]);
                Ok(AbiValue::Address(Address(addr)))
            }

            AbiType::Bool => Ok(AbiValue::Bool(slot[31] != 0)),

            AbiType::String => {
                let bytes = Self::decode_dynamic_bytes(data, offset)?;
                let s = String::from_utf8(bytes)
                    .map_err(|_| AbiError::DecodingError("Invalid UTF-8 in string".to_string()))?;
                Ok(AbiValue::String(s))
            }
        }
    }

    /// Decode multiple values (for function return values)
    pub fn decode(data: &[u8], types: &[AbiType]) -> Result<Vec<AbiValue>, AbiError> {
        let mut values = Vec::with_capacity(types.len());

        for (index, abi_type) in types.iter().enumerate() {
            let head_offset = index * 32;
            if abi_type.is_dynamic() {
                // Head holds the offset of the tail entry
                let data_offset = read_offset(data, head_offset)?;
                values.push(Self::decode_value(data, abi_type, data_offset)?);
            } else {
                values.push(Self::decode_value(data, abi_type, head_offset)?);
            }
        }

        Ok(values)
    }

    /// Length word at `offset` followed by that many bytes
    fn decode_dynamic_bytes(data: &[u8], offset: usize) -> Result<Vec<u8>, AbiError> {
        let length = read_offset(data, offset)?;
        let start = offset + 32;
        let end = start
            .checked_add(length)
            .ok_or_else(|| AbiError::DecodingError("Length overflow".to_string()))?;
        if data.len() < end {
            return Err(AbiError::DecodingError(format!(
                "Insufficient data: need {} bytes, have {}",
                end,
                data.len()
            )));
        }
        Ok(data[start..end].to_vec())
    }
}

fn read_word(data: &[u8], offset: usize) -> Result<&[u8], AbiError> {
    let end = offset
        .checked_add(32)
        .ok_or_else(|| AbiError::DecodingError("Offset overflow".to_string()))?;
    data.get(offset..end)
        .ok_or_else(|| AbiError::DecodingError("Insufficient data".to_string()))
}

/// Read a word that must fit a `usize` (offsets and lengths)
fn read_offset(data: &[u8], offset: usize) -> Result<usize, AbiError> {
    let value = U256::from_big_endian(read_word(data, offset)?);
    if value > U256::from(u32::MAX) {
        return Err(AbiError::DecodingError(format!("Offset {} too large", value)));
    }
    Ok(value.as_u64() as usize)
}
