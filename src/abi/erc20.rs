//! ERC-20 call codec.
//!
//! The supported function set is closed: the token transfer used to build
//! contract-call transactions plus the four read-only metadata/balance
//! queries.

use bigdecimal::BigDecimal;
use ethers_core::types::U256;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use super::decoder::AbiDecoder;
use super::encoder::AbiEncoder;
use super::selector::AbiSelector;
use super::types::*;
use crate::error::{ToolError, ToolResult};
use crate::exchange::{bigint_to_u256, u256_to_bigint};
use crate::types::Address;

/// ERC-20 functions the codec can encode and decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Erc20Function {
    Transfer,
    Symbol,
    Name,
    Decimals,
    BalanceOf,
}

impl Erc20Function {
    pub fn name(&self) -> &'static str {
        match self {
            Erc20Function::Transfer => "transfer",
            Erc20Function::Symbol => "symbol",
            Erc20Function::Name => "name",
            Erc20Function::Decimals => "decimals",
            Erc20Function::BalanceOf => "balanceOf",
        }
    }

    pub fn inputs(&self) -> &'static [AbiType] {
        match self {
            Erc20Function::Transfer => &[AbiType::Address, AbiType::Uint256],
            Erc20Function::BalanceOf => &[AbiType::Address],
            Erc20Function::Symbol | Erc20Function::Name | Erc20Function::Decimals => &[],
        }
    }

    /// Type of the first return slot
    pub fn output(&self) -> AbiType {
        match self {
            Erc20Function::Transfer => AbiType::Bool,
            Erc20Function::Symbol | Erc20Function::Name => AbiType::String,
            Erc20Function::Decimals => AbiType::Uint8,
            Erc20Function::BalanceOf => AbiType::Uint256,
        }
    }

    /// Canonical signature, e.g. `transfer(address,uint256)`
    pub fn signature(&self) -> String {
        let params = self
            .inputs()
            .iter()
            .map(|t| t.canonical_type())
            .collect::<Vec<_>>()
            .join(",");
        format!("{}({})", self.name(), params)
    }

    pub fn selector(&self) -> [u8; 4] {
        AbiSelector::selector_from_signature(&self.signature())
    }
}

/// Selector followed by the ABI-encoded arguments.
pub fn encode_call(function: Erc20Function, inputs: &[AbiValue]) -> ToolResult<Vec<u8>> {
    AbiEncoder::encode_function_call(function.selector(), inputs, function.inputs())
        .map_err(|e| ToolError::from(e).context(format!("encoding {}", function.signature())))
}

/// Decode the first return slot of a call response.
///
/// A zero-length response is `EmptyResponse`: the usual answer of a node
/// when the target has no code.
pub fn decode_result(response: &[u8], output: AbiType) -> Result<DecodedValue, AbiError> {
    if response.is_empty() {
        return Err(AbiError::EmptyResponse);
    }

    let mut values = AbiDecoder::decode(response, &[output])?;
    match values.pop() {
        Some(AbiValue::String(s)) => Ok(DecodedValue::String(s)),
        Some(AbiValue::Uint(v)) => Ok(DecodedValue::UnsignedInteger(v)),
        Some(AbiValue::Address(a)) => Ok(DecodedValue::Address(a)),
        Some(other) => Err(AbiError::TypeMismatch {
            expected: "string, uint or address".to_string(),
            got: other.get_type().canonical_type().to_string(),
        }),
        None => Err(AbiError::DecodingError("No return value".to_string())),
    }
}

/// `transfer(to, amount)` calldata
pub fn transfer_calldata(to: Address, amount: U256) -> ToolResult<Vec<u8>> {
    encode_call(
        Erc20Function::Transfer,
        &[AbiValue::Address(to), AbiValue::Uint(amount)],
    )
}

/// `balanceOf(owner)` calldata
pub fn balance_of_calldata(owner: Address) -> ToolResult<Vec<u8>> {
    encode_call(Erc20Function::BalanceOf, &[AbiValue::Address(owner)])
}

/// Decimal digits of `2^256 - 1`
const MAX_UINT256_DIGITS: i64 = 78;

/// `amount * 10^decimals` as an exact integer.
///
/// Fails with `InexactScale` when the amount has more fractional digits
/// than the token supports, and with `Overflow` when the result cannot fit
/// a `uint256`. Both are decided from the digit count before any power of
/// ten is built, so extreme exponents are rejected cheaply.
pub fn scale_to_token_units(amount: &BigDecimal, decimals: u8) -> Result<U256, AbiError> {
    if amount.is_negative() {
        return Err(AbiError::NegativeAmount(amount.to_string()));
    }
    if amount.is_zero() {
        return Ok(U256::zero());
    }

    let (digits, scale) = amount.as_bigint_and_exponent();
    let digit_count = i64::try_from(amount.digits()).map_err(|_| AbiError::Overflow)?;
    // scale == i64::MIN is an astronomically large amount
    let shift = i64::from(decimals).checked_sub(scale).ok_or(AbiError::Overflow)?;

    let units = if shift >= 0 {
        if digit_count.saturating_add(shift) > MAX_UINT256_DIGITS {
            return Err(AbiError::Overflow);
        }
        let exp = u32::try_from(shift).map_err(|_| AbiError::Overflow)?;
        digits * BigInt::from(10u32).pow(exp)
    } else {
        let inexact = || AbiError::InexactScale {
            amount: amount.to_string(),
            decimals,
        };
        // a non-zero integer has fewer trailing zeros than digits
        if shift.unsigned_abs() >= amount.digits() {
            return Err(inexact());
        }
        let exp = u32::try_from(shift.unsigned_abs()).map_err(|_| inexact())?;
        let divisor = BigInt::from(10u32).pow(exp);
        if !(&digits % &divisor).is_zero() {
            return Err(inexact());
        }
        digits / divisor
    };

    bigint_to_u256(&units).map_err(|_| AbiError::Overflow)
}

/// `raw / 10^decimals` for display.
pub fn format_token_amount(raw: U256, decimals: u8) -> BigDecimal {
    BigDecimal::new(u256_to_bigint(raw), i64::from(decimals))
}
