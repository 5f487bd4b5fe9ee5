//! Fee arithmetic for fee-market transactions.
//!
//! All values are wei, integer only.

use ethers_core::types::U256;

use crate::error::{ToolError, ToolResult};

/// Gas limit of a plain value transfer
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Extra margin on top of the doubled base fee, in percent
const BASE_FEE_MARGIN_PERCENT: u64 = 2;

/// `b + b + round_half_up(b * 2%)`
pub fn base_fee_with_margin(base_fee: U256) -> ToolResult<U256> {
    let scaled = base_fee
        .checked_mul(U256::from(BASE_FEE_MARGIN_PERCENT))
        .ok_or_else(overflow)?;
    let (margin, remainder) = scaled.div_mod(U256::from(100u64));
    let margin = if remainder >= U256::from(50u64) {
        margin + U256::one()
    } else {
        margin
    };

    base_fee
        .checked_add(base_fee)
        .and_then(|doubled| doubled.checked_add(margin))
        .ok_or_else(overflow)
}

/// `adjusted_base_fee + max_priority_fee_per_gas`
pub fn recommended_max_fee_per_gas(adjusted_base_fee: U256, max_priority_fee_per_gas: U256) -> ToolResult<U256> {
    adjusted_base_fee
        .checked_add(max_priority_fee_per_gas)
        .ok_or_else(overflow)
}

/// `gas_limit * max_fee_per_gas`, the worst-case cost in wei
pub fn estimate_total_fee(gas_limit: u64, max_fee_per_gas: U256) -> ToolResult<U256> {
    U256::from(gas_limit)
        .checked_mul(max_fee_per_gas)
        .ok_or_else(overflow)
}

fn overflow() -> ToolError {
    ToolError::invalid_input("Fee arithmetic overflows 256 bits")
}
