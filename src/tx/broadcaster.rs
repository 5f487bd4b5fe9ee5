//! Transaction Broadcaster
//!
//! Sends a signed transaction, waits for its receipt and reports what the
//! transaction actually cost.

use bigdecimal::BigDecimal;
use ethers_core::types::U256;
use serde::Serialize;
use std::thread;
use std::time::Duration;

use crate::error::{ToolError, ToolResult};
use crate::exchange::{AmountConverter, ExchangeRatePair};
use crate::rpc::{NodeRpc, TransactionReceipt};
use crate::utils::keccak256;
use crate::{log_debug, log_info, log_warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 200;

/// Fixed-interval receipt polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptPoller {
    pub interval: Duration,
    /// `None` polls until the receipt appears
    pub max_attempts: Option<u32>,
}

impl Default for ReceiptPoller {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: Some(DEFAULT_MAX_ATTEMPTS),
        }
    }
}

impl ReceiptPoller {
    pub fn new(interval: Duration, max_attempts: Option<u32>) -> Self {
        Self { interval, max_attempts }
    }

    /// Poll until mined. Node errors end the loop immediately.
    pub fn poll(&self, rpc: &dyn NodeRpc, tx_hash: &str) -> ToolResult<TransactionReceipt> {
        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);

            if let Some(receipt) = rpc
                .get_transaction_receipt(tx_hash)
                .map_err(|e| e.context("receipt"))?
            {
                return Ok(receipt);
            }

            if let Some(max) = self.max_attempts {
                if attempt >= max {
                    return Err(ToolError::upstream(format!(
                        "receipt: transaction {} not mined after {} attempts",
                        tx_hash, attempt
                    )));
                }
            }

            log_debug!("broadcast", "Waiting for receipt", tx_hash = tx_hash, attempt = attempt);
            thread::sleep(self.interval);
        }
    }
}

/// Outcome of a mined transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BroadcastReport {
    pub tx_hash: String,
    pub receipt: TransactionReceipt,
    /// `gas_used * effective_gas_price`
    pub fee_wei: U256,
    pub fee_usd: BigDecimal,
}

/// Submit `raw` and return the hash the node reports
pub fn send_raw_transaction(rpc: &dyn NodeRpc, raw: &[u8]) -> ToolResult<String> {
    let tx_hash = rpc
        .send_raw_transaction(raw)
        .map_err(|e| e.context("broadcast"))?;

    let local = format!("0x{}", hex::encode(keccak256(raw)));
    if !tx_hash.eq_ignore_ascii_case(&local) {
        log_warn!(
            "broadcast",
            "Node reported a different transaction hash",
            tx_hash = tx_hash,
            local_hash = local,
        );
    }

    log_info!("broadcast", "Transaction sent", tx_hash = tx_hash);
    Ok(tx_hash)
}

/// Send, wait for the receipt, and price the fee actually paid.
pub fn broadcast_and_wait(
    rpc: &dyn NodeRpc,
    rates: &ExchangeRatePair,
    raw: &[u8],
    poller: &ReceiptPoller,
) -> ToolResult<BroadcastReport> {
    let tx_hash = send_raw_transaction(rpc, raw)?;
    let receipt = poller.poll(rpc, &tx_hash)?;

    let fee_wei = receipt
        .fee_paid()
        .ok_or_else(|| ToolError::upstream("receipt: fee overflows 256 bits"))?;
    let fee_usd = AmountConverter::new(rates).wei_to_fiat(fee_wei)?;

    if receipt.succeeded() {
        log_info!(
            "broadcast",
            "Transaction mined",
            tx_hash = tx_hash,
            fee_wei = fee_wei,
            fee_usd = fee_usd,
        );
    } else {
        log_warn!("broadcast", "Transaction reverted", tx_hash = tx_hash);
    }

    Ok(BroadcastReport {
        tx_hash,
        receipt,
        fee_wei,
        fee_usd,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::rpc::mock::MockNode;
    use std::str::FromStr;

    const HASH: &str = "0xa730681e445399001becbe76f6d4f5fa56c8ca0ae6ac69e4b31e6ff625fd04e0";

    fn receipt() -> TransactionReceipt {
        TransactionReceipt {
            transaction_hash: HASH.to_string(),
            block_number: Some(100),
            status: Some(1),
            gas_used: U256::from(21_000u64),
            effective_gas_price: U256::from(2_000_000_000u64),
        }
    }

    fn fast(max_attempts: Option<u32>) -> ReceiptPoller {
        ReceiptPoller::new(Duration::ZERO, max_attempts)
    }

    #[test]
    fn test_poll_waits_for_receipt() {
        let node = MockNode::default();
        node.receipts.borrow_mut().extend([Ok(None), Ok(None), Ok(Some(receipt()))]);

        let found = fast(Some(5)).poll(&node, HASH).unwrap();
        assert_eq!(found, receipt());
        assert!(node.receipts.borrow().is_empty());
    }

    #[test]
    fn test_poll_gives_up_after_max_attempts() {
        let node = MockNode::default();
        let err = fast(Some(3)).poll(&node, HASH).unwrap_err();
        assert_eq!(err.code, ErrorCode::UpstreamUnavailable);
        assert!(err.message.contains("after 3 attempts"));
    }

    #[test]
    fn test_poll_stops_on_node_error() {
        let node = MockNode::default();
        node.receipts
            .borrow_mut()
            .extend([Ok(None), Err(ToolError::upstream("connection reset")), Ok(Some(receipt()))]);

        let err = fast(None).poll(&node, HASH).unwrap_err();
        assert_eq!(err.message, "receipt: connection reset");
        assert_eq!(node.receipts.borrow().len(), 1);
    }

    #[test]
    fn test_broadcast_reports_fee() {
        let node = MockNode {
            sent_hash: Some(HASH.to_string()),
            ..Default::default()
        };
        node.receipts.borrow_mut().push_back(Ok(Some(receipt())));
        let rates = ExchangeRatePair::new(
            BigDecimal::from_str("2000").unwrap(),
            BigDecimal::from_str("30000").unwrap(),
        )
        .unwrap();

        let report = broadcast_and_wait(&node, &rates, &[0x02, 0xc0], &fast(Some(1))).unwrap();

        assert_eq!(report.tx_hash, HASH);
        assert_eq!(report.fee_wei, U256::from(42_000_000_000_000u64));
        assert_eq!(report.fee_usd, BigDecimal::from_str("0.084").unwrap());
        assert_eq!(node.sent.borrow().as_slice(), &[vec![0x02, 0xc0]]);
    }

    #[test]
    fn test_broadcast_failure_has_context() {
        let node = MockNode::default();
        let err = send_raw_transaction(&node, &[0x02]).unwrap_err();
        assert!(err.message.starts_with("broadcast: "));
    }
}
