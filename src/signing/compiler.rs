//! Transaction Compiler
//!
//! Verifies a detached signature against the declared source and compiles
//! it into a complete, broadcast-ready transaction.

use ethers_core::types::U256;
use ethers_core::utils::rlp::RlpStream;

use super::preimage::ethereum::{append_fee_market_fields, append_legacy_fields, typed_envelope};
use super::preimage::SigningRequest;
use super::signature::{DetachedSignature, RecoverableSignature};
use super::SigningError;
use crate::error::{ToolError, ToolResult};
use crate::tx::{decode_unsigned, TxKind, UnsignedTransaction};
use crate::types::Address;
use crate::utils::keccak256;
use crate::{log_debug, log_error, log_info};

/// Signed transaction, ready to broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub tx: UnsignedTransaction,
    pub v: u64,
    pub r: U256,
    pub s: U256,
    /// Serialized bytes (typed envelope for fee-market)
    pub raw: Vec<u8>,
}

impl SignedTransaction {
    /// Transaction hash, `keccak256(raw)`
    pub fn hash(&self) -> [u8; 32] {
        keccak256(&self.raw)
    }

    pub fn hash_hex(&self) -> String {
        format!("0x{}", hex::encode(self.hash()))
    }

    pub fn raw_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw))
    }
}

/// Attach `signature` to `tx`.
///
/// `signing_hash` must be the hash of `tx` bound to `chain_id`. The
/// signature is canonicalized to low-s, then accepted only if exactly one
/// recovery id yields `expected_source`.
pub fn attach(
    tx: &UnsignedTransaction,
    chain_id: u64,
    expected_source: &Address,
    signature: &DetachedSignature,
    signing_hash: &[u8; 32],
) -> ToolResult<SignedTransaction> {
    let computed = SigningRequest::new(tx, chain_id)?.hash();
    if computed.hash != *signing_hash {
        return Err(SigningError::HashMismatch {
            supplied: hex::encode(signing_hash),
            computed: computed.hash_hex(),
        }
        .into());
    }

    let canonical = signature.canonicalize();
    if canonical != *signature {
        log_debug!("signing", "Normalized high-s signature");
    }

    let recovered = recover_unique(&canonical, signing_hash, expected_source)?;
    let v = encode_v(tx, chain_id, recovered.recovery_id)?;
    let raw = encode_signed(tx, v, &recovered.r, &recovered.s);

    let signed = SignedTransaction {
        tx: tx.clone(),
        v,
        r: recovered.r,
        s: recovered.s,
        raw,
    };

    log_info!(
        "signing",
        "Signature attached",
        source = expected_source,
        v = signed.v,
        tx_hash = signed.hash_hex(),
    );

    Ok(signed)
}

/// [`attach`] over the unsigned bytes produced by `tx::encode_unsigned`
pub fn attach_encoded(
    unsigned: &[u8],
    chain_id: u64,
    expected_source: &Address,
    signature: &DetachedSignature,
    signing_hash: &[u8; 32],
) -> ToolResult<SignedTransaction> {
    let tx = decode_unsigned(unsigned).map_err(|e| e.context("decode unsigned transaction"))?;
    attach(&tx, chain_id, expected_source, signature, signing_hash)
}

fn recover_unique(
    signature: &DetachedSignature,
    signing_hash: &[u8; 32],
    expected_source: &Address,
) -> ToolResult<RecoverableSignature> {
    let ids = signature.matching_recovery_ids(signing_hash, expected_source);

    match ids.as_slice() {
        [] => Err(SigningError::NoMatchingRecoveryId(expected_source.to_string()).into()),
        [recovery_id] => Ok(RecoverableSignature {
            r: signature.r,
            s: signature.s,
            recovery_id: *recovery_id,
        }),
        _ => {
            log_error!(
                "signing",
                "More than one recovery id matches the source address",
                source = expected_source,
                ids = format!("{:?}", ids),
            );
            Err(SigningError::AmbiguousRecovery {
                address: expected_source.to_string(),
                ids,
            }
            .into())
        }
    }
}

/// `v` for the transaction family.
///
/// - legacy, chain id > 0: `recovery_id + 35 + 2 * chain_id` (EIP-155)
/// - legacy, chain id 0: `27 + recovery_id`
/// - fee-market: `recovery_id` (y-parity)
pub fn encode_v(tx: &UnsignedTransaction, chain_id: u64, recovery_id: u8) -> ToolResult<u64> {
    if recovery_id > 1 {
        return Err(SigningError::UnencodableRecoveryId(recovery_id).into());
    }
    let recovery_id = u64::from(recovery_id);

    match tx {
        UnsignedTransaction::FeeMarketTransfer { .. } | UnsignedTransaction::FeeMarketContractCall { .. } => {
            Ok(recovery_id)
        }
        UnsignedTransaction::LegacyTransfer { .. } | UnsignedTransaction::LegacyContractCall { .. } => {
            if chain_id == 0 {
                return Ok(27 + recovery_id);
            }
            chain_id
                .checked_mul(2)
                .and_then(|c| c.checked_add(35 + recovery_id))
                .ok_or_else(|| ToolError::invalid_input(format!("Chain id {} overflows v", chain_id)))
        }
    }
}

fn encode_signed(tx: &UnsignedTransaction, v: u64, r: &U256, s: &U256) -> Vec<u8> {
    match tx {
        UnsignedTransaction::LegacyTransfer { common, gas_price }
        | UnsignedTransaction::LegacyContractCall { common, gas_price } => {
            let mut stream = RlpStream::new_list(9);
            append_legacy_fields(&mut stream, common, gas_price);
            stream.append(&v);
            stream.append(r);
            stream.append(s);
            stream.out().to_vec()
        }
        UnsignedTransaction::FeeMarketTransfer { common, fees }
        | UnsignedTransaction::FeeMarketContractCall { common, fees } => {
            let mut stream = RlpStream::new_list(12);
            append_fee_market_fields(&mut stream, common, fees);
            stream.append(&v);
            stream.append(r);
            stream.append(s);

            typed_envelope(TxKind::FeeMarket, &stream.out())
        }
    }
}
