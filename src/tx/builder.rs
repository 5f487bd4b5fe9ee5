//! Transaction Builder
//!
//! Validates and assembles unsigned transactions for one chain. No I/O,
//! no signing.

use ethers_core::types::U256;

use super::transaction::{FeeMarketFees, TxCommon, UnsignedTransaction};
use crate::error::{ToolError, ToolResult};
use crate::types::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionBuilder {
    chain_id: u64,
}

impl TransactionBuilder {
    pub fn new(chain_id: u64) -> Self {
        Self { chain_id }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Fee-market value transfer
    pub fn build_transfer(
        &self,
        nonce: u64,
        destination: Address,
        value: U256,
        max_priority_fee_per_gas: U256,
        max_fee_per_gas: U256,
        gas_limit: u64,
    ) -> ToolResult<UnsignedTransaction> {
        let fees = validate_fees(max_priority_fee_per_gas, max_fee_per_gas)?;
        let common = self.common(nonce, destination, value, gas_limit, Vec::new())?;
        Ok(UnsignedTransaction::FeeMarketTransfer { common, fees })
    }

    /// Fee-market contract call carrying no value
    pub fn build_contract_call(
        &self,
        nonce: u64,
        contract: Address,
        max_priority_fee_per_gas: U256,
        max_fee_per_gas: U256,
        gas_limit: u64,
        calldata: Vec<u8>,
    ) -> ToolResult<UnsignedTransaction> {
        validate_calldata(&calldata)?;
        let fees = validate_fees(max_priority_fee_per_gas, max_fee_per_gas)?;
        let common = self.common(nonce, contract, U256::zero(), gas_limit, calldata)?;
        Ok(UnsignedTransaction::FeeMarketContractCall { common, fees })
    }

    pub fn build_legacy_transfer(
        &self,
        nonce: u64,
        destination: Address,
        value: U256,
        gas_price: U256,
        gas_limit: u64,
    ) -> ToolResult<UnsignedTransaction> {
        let common = self.common(nonce, destination, value, gas_limit, Vec::new())?;
        Ok(UnsignedTransaction::LegacyTransfer { common, gas_price })
    }

    pub fn build_legacy_contract_call(
        &self,
        nonce: u64,
        contract: Address,
        gas_price: U256,
        gas_limit: u64,
        calldata: Vec<u8>,
    ) -> ToolResult<UnsignedTransaction> {
        validate_calldata(&calldata)?;
        let common = self.common(nonce, contract, U256::zero(), gas_limit, calldata)?;
        Ok(UnsignedTransaction::LegacyContractCall { common, gas_price })
    }

    fn common(
        &self,
        nonce: u64,
        to: Address,
        value: U256,
        gas_limit: u64,
        data: Vec<u8>,
    ) -> ToolResult<TxCommon> {
        if gas_limit == 0 {
            return Err(ToolError::invalid_input("Gas limit must be greater than zero"));
        }
        Ok(TxCommon {
            nonce,
            to,
            value,
            gas_limit,
            data,
            chain_id: self.chain_id,
        })
    }
}

fn validate_fees(max_priority_fee_per_gas: U256, max_fee_per_gas: U256) -> ToolResult<FeeMarketFees> {
    if max_fee_per_gas < max_priority_fee_per_gas {
        return Err(ToolError::invalid_input(format!(
            "Max fee per gas {} is below max priority fee per gas {}",
            max_fee_per_gas, max_priority_fee_per_gas
        )));
    }
    Ok(FeeMarketFees {
        max_priority_fee_per_gas,
        max_fee_per_gas,
    })
}

fn validate_calldata(calldata: &[u8]) -> ToolResult<()> {
    if calldata.is_empty() {
        return Err(ToolError::invalid_input("Contract call requires calldata"));
    }
    Ok(())
}
