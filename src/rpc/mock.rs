//! In-memory node for service tests

use ethers_core::types::U256;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use super::{NodeRpc, TransactionReceipt};
use crate::error::{ToolError, ToolResult};
use crate::types::Address;

#[derive(Default)]
pub struct MockNode {
    pub nonce: Option<u64>,
    pub base_fee: Option<U256>,
    pub priority_fee: Option<U256>,
    pub gas_estimate: Option<u64>,
    pub balance: Option<U256>,
    /// `eth_call` answers keyed by selector
    pub call_results: HashMap<[u8; 4], Vec<u8>>,
    pub sent_hash: Option<String>,
    /// Successive receipt answers; exhausted means "not mined"
    pub receipts: RefCell<VecDeque<ToolResult<Option<TransactionReceipt>>>>,
    pub estimate_requests: RefCell<Vec<(Address, Address, U256, Vec<u8>)>>,
    pub sent: RefCell<Vec<Vec<u8>>>,
}

fn missing(what: &str) -> ToolError {
    ToolError::upstream(format!("mock has no {}", what))
}

impl NodeRpc for MockNode {
    fn get_transaction_count(&self, _address: Address) -> ToolResult<u64> {
        self.nonce.ok_or_else(|| missing("nonce"))
    }

    fn get_latest_base_fee_per_gas(&self) -> ToolResult<U256> {
        self.base_fee.ok_or_else(|| missing("base fee"))
    }

    fn get_max_priority_fee_per_gas(&self) -> ToolResult<U256> {
        self.priority_fee.ok_or_else(|| missing("priority fee"))
    }

    fn estimate_gas(&self, from: Address, to: Address, value: U256, data: &[u8]) -> ToolResult<u64> {
        self.estimate_requests
            .borrow_mut()
            .push((from, to, value, data.to_vec()));
        self.gas_estimate.ok_or_else(|| missing("gas estimate"))
    }

    fn call(&self, _from: Address, _to: Address, data: &[u8]) -> ToolResult<Vec<u8>> {
        let selector: [u8; 4] = data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| missing("selector"))?;
        Ok(self.call_results.get(&selector).cloned().unwrap_or_default())
    }

    fn send_raw_transaction(&self, raw: &[u8]) -> ToolResult<String> {
        self.sent.borrow_mut().push(raw.to_vec());
        self.sent_hash.clone().ok_or_else(|| missing("send result"))
    }

    fn get_transaction_receipt(&self, _tx_hash: &str) -> ToolResult<Option<TransactionReceipt>> {
        self.receipts.borrow_mut().pop_front().unwrap_or(Ok(None))
    }

    fn get_balance(&self, _address: Address) -> ToolResult<U256> {
        self.balance.ok_or_else(|| missing("balance"))
    }
}
