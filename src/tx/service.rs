//! Transaction orchestration.
//!
//! Gathers nonce, fees, gas and amount from the node and rate snapshot,
//! builds the unsigned transaction and reports the hash the operator must
//! sign. Signature attachment is offline.

use bigdecimal::BigDecimal;
use ethers_core::types::U256;
use serde::Serialize;

use super::builder::TransactionBuilder;
use super::codec::{decode_unsigned_hex, encode_unsigned};
use super::transaction::UnsignedTransaction;
use crate::abi::{scale_to_token_units, transfer_calldata};
use crate::error::ToolResult;
use crate::exchange::{AmountConverter, ExchangeRatePair};
use crate::fees::{FeeEstimate, FeeService, GasTarget};
use crate::rpc::NodeRpc;
use crate::signing::{attach, signing_hash, DetachedSignature, SignedTransaction};
use crate::token::TokenService;
use crate::types::Address;
use crate::utils::decode_hash;
use crate::{log_debug, log_info};

/// Unsigned transaction plus what the external signer needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTransaction {
    pub tx: UnsignedTransaction,
    pub unsigned: Vec<u8>,
    pub signing_hash: [u8; 32],
}

impl PreparedTransaction {
    pub fn unsigned_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.unsigned))
    }

    pub fn signing_hash_hex(&self) -> String {
        format!("0x{}", hex::encode(self.signing_hash))
    }
}

/// Worst-case fee in wei and fiat
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeReport {
    pub estimate: FeeEstimate,
    pub total_fee_usd: BigDecimal,
}

pub struct TransactionService<'a> {
    rpc: &'a dyn NodeRpc,
    converter: AmountConverter<'a>,
    builder: TransactionBuilder,
}

impl<'a> TransactionService<'a> {
    pub fn new(rpc: &'a dyn NodeRpc, rates: &'a ExchangeRatePair, chain_id: u64) -> Self {
        Self {
            rpc,
            converter: AmountConverter::new(rates),
            builder: TransactionBuilder::new(chain_id),
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.builder.chain_id()
    }

    /// Wei for native transfers, token units (scaled by `decimals()`) for
    /// token transfers.
    pub fn resolve_amount(&self, source: Address, amount: &BigDecimal, contract: Option<Address>) -> ToolResult<U256> {
        match contract {
            Some(contract) => {
                let decimals = TokenService::new(self.rpc).decimals(contract, source)?;
                Ok(scale_to_token_units(amount, decimals)?)
            }
            None => self.converter.fiat_to_wei(amount),
        }
    }

    /// Build the unsigned fee-market transaction moving `amount` from
    /// `source` to `destination`.
    ///
    /// `amount` is USD for native transfers and whole tokens when `contract`
    /// is given.
    pub fn create_unsigned_transaction(
        &self,
        source: Address,
        destination: Address,
        amount: &BigDecimal,
        contract: Option<Address>,
    ) -> ToolResult<PreparedTransaction> {
        let value = self
            .resolve_amount(source, amount, contract)
            .map_err(|e| e.context("amount"))?;
        let nonce = self
            .rpc
            .get_transaction_count(source)
            .map_err(|e| e.context("nonce"))?;

        let fees = FeeService::new(self.rpc);
        let quote = fees.quote()?;
        let target = GasTarget::for_transfer(destination, value, contract)?;
        let gas_limit = fees.estimate_gas_limit(source, &target)?;

        log_debug!(
            "tx",
            "Transaction parameters",
            nonce = nonce,
            value = value,
            gas_limit = gas_limit,
            max_fee_per_gas = quote.max_fee_per_gas,
        );

        let tx = match contract {
            Some(contract) => self.builder.build_contract_call(
                nonce,
                contract,
                quote.max_priority_fee_per_gas,
                quote.max_fee_per_gas,
                gas_limit,
                transfer_calldata(destination, value)?,
            )?,
            None => self.builder.build_transfer(
                nonce,
                destination,
                value,
                quote.max_priority_fee_per_gas,
                quote.max_fee_per_gas,
                gas_limit,
            )?,
        };

        let prepared = PreparedTransaction {
            unsigned: encode_unsigned(&tx),
            signing_hash: signing_hash(&tx, self.chain_id())?,
            tx,
        };

        log_info!("tx", "Hash to sign", hash = prepared.signing_hash_hex());
        Ok(prepared)
    }

    /// Worst-case fee of the transfer, priced in USD
    pub fn estimate_fee(
        &self,
        source: Address,
        destination: Address,
        amount: &BigDecimal,
        contract: Option<Address>,
    ) -> ToolResult<FeeReport> {
        let value = self
            .resolve_amount(source, amount, contract)
            .map_err(|e| e.context("amount"))?;
        let estimate = FeeService::new(self.rpc).estimate_fee(source, destination, value, contract)?;
        let total_fee_usd = self.converter.wei_to_fiat(estimate.total_fee)?;
        Ok(FeeReport {
            estimate,
            total_fee_usd,
        })
    }

    /// Native balance of `address` in USD
    pub fn balance_in_fiat(&self, address: Address) -> ToolResult<BigDecimal> {
        let wei = self.rpc.get_balance(address).map_err(|e| e.context("balance"))?;
        self.converter.wei_to_fiat(wei)
    }

    /// Offline: attach a signature to an unsigned transaction hex.
    pub fn add_signature(
        &self,
        source: Address,
        unsigned_hex: &str,
        signature_hex: &str,
        signing_hash_hex: &str,
    ) -> ToolResult<SignedTransaction> {
        add_signature(self.chain_id(), source, unsigned_hex, signature_hex, signing_hash_hex)
    }
}

/// Decode, verify and attach. Needs no node.
pub fn add_signature(
    chain_id: u64,
    source: Address,
    unsigned_hex: &str,
    signature_hex: &str,
    signing_hash_hex: &str,
) -> ToolResult<SignedTransaction> {
    let tx = decode_unsigned_hex(unsigned_hex).map_err(|e| e.context("unsigned transaction"))?;
    let signature = DetachedSignature::from_hex(signature_hex).map_err(|e| e.context("signature"))?;
    let hash = decode_hash(signing_hash_hex).map_err(|e| e.context("signing hash"))?;

    attach(&tx, chain_id, &source, &signature, &hash)
}
