//! Node-backed fee quoting.
//!
//! Base fee, priority fee and gas estimates come from the node; a failure
//! of any of them aborts the estimate. There are no default values.

use ethers_core::types::U256;
use serde::Serialize;

use super::estimator::{base_fee_with_margin, estimate_total_fee, recommended_max_fee_per_gas};
use crate::abi::transfer_calldata;
use crate::error::ToolResult;
use crate::log_debug;
use crate::rpc::NodeRpc;
use crate::types::Address;

/// Fee fields for a fee-market transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeQuote {
    pub base_fee: U256,
    pub base_fee_with_margin: U256,
    pub max_priority_fee_per_gas: U256,
    pub max_fee_per_gas: U256,
}

/// Gas limit plus quote for one concrete transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeEstimate {
    pub gas_limit: u64,
    pub quote: FeeQuote,
    /// `max_fee_per_gas * gas_limit`
    pub total_fee: U256,
}

/// Where a transfer's gas is estimated against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasTarget {
    pub to: Address,
    pub value: U256,
    pub data: Vec<u8>,
}

impl GasTarget {
    /// Native transfer of `amount` wei to `destination`, or a token transfer
    /// of `amount` units sent as a call to `contract`.
    pub fn for_transfer(destination: Address, amount: U256, contract: Option<Address>) -> ToolResult<Self> {
        match contract {
            Some(contract) => Ok(Self {
                to: contract,
                value: U256::zero(),
                data: transfer_calldata(destination, amount)?,
            }),
            None => Ok(Self {
                to: destination,
                value: amount,
                data: Vec::new(),
            }),
        }
    }
}

pub struct FeeService<'a> {
    rpc: &'a dyn NodeRpc,
}

impl<'a> FeeService<'a> {
    pub fn new(rpc: &'a dyn NodeRpc) -> Self {
        Self { rpc }
    }

    pub fn quote(&self) -> ToolResult<FeeQuote> {
        let base_fee = self
            .rpc
            .get_latest_base_fee_per_gas()
            .map_err(|e| e.context("base fee").context("fee estimation"))?;
        let max_priority_fee_per_gas = self
            .rpc
            .get_max_priority_fee_per_gas()
            .map_err(|e| e.context("priority fee").context("fee estimation"))?;

        let adjusted = base_fee_with_margin(base_fee)?;
        let max_fee_per_gas = recommended_max_fee_per_gas(adjusted, max_priority_fee_per_gas)?;

        log_debug!(
            "fees",
            "Fee quote",
            base_fee = base_fee,
            adjusted_base_fee = adjusted,
            max_priority_fee_per_gas = max_priority_fee_per_gas,
            max_fee_per_gas = max_fee_per_gas,
        );

        Ok(FeeQuote {
            base_fee,
            base_fee_with_margin: adjusted,
            max_priority_fee_per_gas,
            max_fee_per_gas,
        })
    }

    pub fn estimate_gas_limit(&self, source: Address, target: &GasTarget) -> ToolResult<u64> {
        self.rpc
            .estimate_gas(source, target.to, target.value, &target.data)
            .map_err(|e| e.context("gas limit").context("fee estimation"))
    }

    /// Worst-case fee of sending `amount` from `source` to `destination`.
    pub fn estimate_fee(
        &self,
        source: Address,
        destination: Address,
        amount: U256,
        contract: Option<Address>,
    ) -> ToolResult<FeeEstimate> {
        let target = GasTarget::for_transfer(destination, amount, contract)?;
        let quote = self.quote()?;
        let gas_limit = self.estimate_gas_limit(source, &target)?;
        let total_fee = estimate_total_fee(gas_limit, quote.max_fee_per_gas)?;

        Ok(FeeEstimate {
            gas_limit,
            quote,
            total_fee,
        })
    }
}
