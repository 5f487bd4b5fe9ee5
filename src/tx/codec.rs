//! Unsigned transaction codec
//!
//! The unsigned form handed to the external signer is the signing payload
//! itself, so [`decode_unsigned`] recovers every field (chain id included)
//! without side information.

use ethers_core::types::U256;
use ethers_core::utils::rlp::Rlp;

use super::transaction::{FeeMarketFees, TxCommon, TxKind, UnsignedTransaction};
use crate::error::{ToolError, ToolResult};
use crate::signing::preimage::ethereum::{fee_market_payload, legacy_payload};
use crate::types::Address;
use crate::utils::decode_hex;

pub fn encode_unsigned(tx: &UnsignedTransaction) -> Vec<u8> {
    match tx {
        UnsignedTransaction::LegacyTransfer { common, gas_price }
        | UnsignedTransaction::LegacyContractCall { common, gas_price } => legacy_payload(common, gas_price),
        UnsignedTransaction::FeeMarketTransfer { common, fees }
        | UnsignedTransaction::FeeMarketContractCall { common, fees } => fee_market_payload(common, fees),
    }
}

pub fn encode_unsigned_hex(tx: &UnsignedTransaction) -> String {
    format!("0x{}", hex::encode(encode_unsigned(tx)))
}

/// Parse a typed `0x02` payload, or a legacy 6-field (chain id 0) or
/// 9-field EIP-155 list.
pub fn decode_unsigned(bytes: &[u8]) -> ToolResult<UnsignedTransaction> {
    match bytes.first() {
        None => Err(ToolError::invalid_input("Empty transaction bytes")),
        Some(&prefix) if TxKind::FeeMarket.type_byte() == Some(prefix) => decode_fee_market(&bytes[1..]),
        Some(&prefix) if prefix >= 0xc0 => decode_legacy(bytes),
        Some(&prefix) => Err(ToolError::invalid_input(format!(
            "Unsupported transaction type 0x{:02x}",
            prefix
        ))),
    }
}

pub fn decode_unsigned_hex(input: &str) -> ToolResult<UnsignedTransaction> {
    decode_unsigned(&decode_hex(input)?)
}

fn decode_fee_market(bytes: &[u8]) -> ToolResult<UnsignedTransaction> {
    let rlp = open_list(bytes, &[9])?;

    let access_list = rlp.at(8)?;
    if !access_list.is_list() || access_list.item_count()? != 0 {
        return Err(ToolError::invalid_input("Access lists are not supported"));
    }

    let fees = FeeMarketFees {
        max_priority_fee_per_gas: rlp.val_at(2)?,
        max_fee_per_gas: rlp.val_at(3)?,
    };
    if fees.max_fee_per_gas < fees.max_priority_fee_per_gas {
        return Err(ToolError::invalid_input("Max fee per gas is below max priority fee per gas"));
    }

    let common = TxCommon {
        chain_id: rlp.val_at(0)?,
        nonce: rlp.val_at(1)?,
        gas_limit: rlp.val_at(4)?,
        to: decode_address(&rlp, 5)?,
        value: rlp.val_at(6)?,
        data: rlp.val_at(7)?,
    };
    check_gas_limit(&common)?;

    Ok(if common.data.is_empty() {
        UnsignedTransaction::FeeMarketTransfer { common, fees }
    } else {
        UnsignedTransaction::FeeMarketContractCall { common, fees }
    })
}

fn decode_legacy(bytes: &[u8]) -> ToolResult<UnsignedTransaction> {
    let rlp = open_list(bytes, &[6, 9])?;

    let chain_id = if rlp.item_count()? == 9 {
        let chain_id: u64 = rlp.val_at(6)?;
        let r: Vec<u8> = rlp.val_at(7)?;
        let s: Vec<u8> = rlp.val_at(8)?;
        if chain_id == 0 || !r.is_empty() || !s.is_empty() {
            return Err(ToolError::invalid_input(
                "Nine-field legacy payload must end in chain id, \"\", \"\"",
            ));
        }
        chain_id
    } else {
        0
    };

    let gas_price: U256 = rlp.val_at(1)?;
    let common = TxCommon {
        nonce: rlp.val_at(0)?,
        gas_limit: rlp.val_at(2)?,
        to: decode_address(&rlp, 3)?,
        value: rlp.val_at(4)?,
        data: rlp.val_at(5)?,
        chain_id,
    };
    check_gas_limit(&common)?;

    Ok(if common.data.is_empty() {
        UnsignedTransaction::LegacyTransfer { common, gas_price }
    } else {
        UnsignedTransaction::LegacyContractCall { common, gas_price }
    })
}

fn open_list<'a>(bytes: &'a [u8], counts: &[usize]) -> ToolResult<Rlp<'a>> {
    let rlp = Rlp::new(bytes);
    if !rlp.is_list() {
        return Err(ToolError::invalid_input("Transaction payload is not an RLP list"));
    }
    if rlp.payload_info()?.total() != bytes.len() {
        return Err(ToolError::invalid_input("Trailing bytes after transaction payload"));
    }
    let count = rlp.item_count()?;
    if !counts.contains(&count) {
        return Err(ToolError::invalid_input(format!(
            "Unexpected field count {} (expected {:?})",
            count, counts
        )));
    }
    Ok(rlp)
}

fn decode_address(rlp: &Rlp<'_>, index: usize) -> ToolResult<Address> {
    let bytes: Vec<u8> = rlp.val_at(index)?;
    Address::from_slice(&bytes)
}

fn check_gas_limit(common: &TxCommon) -> ToolResult<()> {
    if common.gas_limit == 0 {
        return Err(ToolError::invalid_input("Gas limit must be greater than zero"));
    }
    Ok(())
}
