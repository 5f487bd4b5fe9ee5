//! Ethereum Pre-Image Encoding
//!
//! RLP field layouts for legacy (EIP-155) and fee-market (EIP-1559)
//! transactions, shared by the unsigned and signed serializations.

use ethers_core::types::{H160, U256};
use ethers_core::utils::rlp::RlpStream;

use crate::tx::{FeeMarketFees, TxCommon, TxKind};

/// RLP of an empty list, the access list of every fee-market transaction here
pub const EMPTY_ACCESS_LIST: [u8; 1] = [0xc0];

/// Append `nonce, gasPrice, gasLimit, to, value, data`
pub fn append_legacy_fields(stream: &mut RlpStream, common: &TxCommon, gas_price: &U256) {
    stream.append(&common.nonce);
    stream.append(gas_price);
    stream.append(&common.gas_limit);
    stream.append(&H160::from(common.to));
    stream.append(&common.value);
    stream.append(&common.data);
}

/// Append `chainId, nonce, maxPriorityFeePerGas, maxFeePerGas, gasLimit, to,
/// value, data, accessList`
pub fn append_fee_market_fields(stream: &mut RlpStream, common: &TxCommon, fees: &FeeMarketFees) {
    stream.append(&common.chain_id);
    stream.append(&common.nonce);
    stream.append(&fees.max_priority_fee_per_gas);
    stream.append(&fees.max_fee_per_gas);
    stream.append(&common.gas_limit);
    stream.append(&H160::from(common.to));
    stream.append(&common.value);
    stream.append(&common.data);
    stream.append_raw(&EMPTY_ACCESS_LIST, 1);
}

/// Prefix an RLP list with the EIP-2718 type byte of `kind`, if it has one.
pub fn typed_envelope(kind: TxKind, rlp: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(rlp.len() + 1);
    out.extend(kind.type_byte());
    out.extend_from_slice(rlp);
    out
}

/// Legacy signing payload.
///
/// With a chain id this is the EIP-155 nine-field list ending in
/// `chainId, "", ""`. Chain id 0 gives the pre-EIP-155 six-field list.
pub fn legacy_payload(common: &TxCommon, gas_price: &U256) -> Vec<u8> {
    if common.chain_id == 0 {
        let mut stream = RlpStream::new_list(6);
        append_legacy_fields(&mut stream, common, gas_price);
        return stream.out().to_vec();
    }

    let mut stream = RlpStream::new_list(9);
    append_legacy_fields(&mut stream, common, gas_price);
    stream.append(&common.chain_id);
    stream.append_empty_data();
    stream.append_empty_data();
    stream.out().to_vec()
}

/// `0x02 || rlp([...9 fields])`
pub fn fee_market_payload(common: &TxCommon, fees: &FeeMarketFees) -> Vec<u8> {
    let mut stream = RlpStream::new_list(9);
    append_fee_market_fields(&mut stream, common, fees);

    typed_envelope(TxKind::FeeMarket, &stream.out())
}
