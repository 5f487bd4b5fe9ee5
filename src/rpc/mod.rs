//! Node RPC boundary
//!
//! The core only needs the eight calls on [`NodeRpc`]. Every failure an
//! implementation reports is `UpstreamUnavailable`.

pub mod client;
#[cfg(test)]
pub mod mock;

use ethers_core::types::U256;
use serde::{Deserialize, Serialize};

use crate::error::ToolResult;
use crate::types::Address;

pub use client::JsonRpcClient;

/// Mined transaction receipt, reduced to what fee reporting needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    pub block_number: Option<u64>,
    /// 1 success, 0 reverted
    pub status: Option<u64>,
    pub gas_used: U256,
    pub effective_gas_price: U256,
}

impl TransactionReceipt {
    /// `gas_used * effective_gas_price` in wei
    pub fn fee_paid(&self) -> Option<U256> {
        self.gas_used.checked_mul(self.effective_gas_price)
    }

    pub fn succeeded(&self) -> bool {
        self.status == Some(1)
    }
}

pub trait NodeRpc {
    /// Pending nonce of `address`
    fn get_transaction_count(&self, address: Address) -> ToolResult<u64>;

    /// Base fee of the latest block
    fn get_latest_base_fee_per_gas(&self) -> ToolResult<U256>;

    fn get_max_priority_fee_per_gas(&self) -> ToolResult<U256>;

    fn estimate_gas(&self, from: Address, to: Address, value: U256, data: &[u8]) -> ToolResult<u64>;

    /// Read-only call against the latest block
    fn call(&self, from: Address, to: Address, data: &[u8]) -> ToolResult<Vec<u8>>;

    /// Returns the transaction hash reported by the node
    fn send_raw_transaction(&self, raw: &[u8]) -> ToolResult<String>;

    /// `None` while the transaction is not mined
    fn get_transaction_receipt(&self, tx_hash: &str) -> ToolResult<Option<TransactionReceipt>>;

    fn get_balance(&self, address: Address) -> ToolResult<U256>;
}
