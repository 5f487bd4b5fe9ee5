//! Pre-Image Hash Generation
//!
//! Computes the payload and 32-byte hash an external signer must sign.

pub mod ethereum;

use serde::Serialize;

use super::SigningError;
use crate::error::ToolResult;
use crate::log_warn;
use crate::tx::UnsignedTransaction;
use crate::utils::keccak256;

/// A transaction together with the chain id bound into its hash
#[derive(Debug, Clone, Copy)]
pub struct SigningRequest<'a> {
    tx: &'a UnsignedTransaction,
    chain_id: u64,
}

impl<'a> SigningRequest<'a> {
    /// The chain id must equal the one the transaction was built for.
    pub fn new(tx: &'a UnsignedTransaction, chain_id: u64) -> Result<Self, SigningError> {
        if tx.chain_id() != chain_id {
            return Err(SigningError::ChainIdMismatch {
                transaction: tx.chain_id(),
                requested: chain_id,
            });
        }
        Ok(Self { tx, chain_id })
    }

    pub fn tx(&self) -> &'a UnsignedTransaction {
        self.tx
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Bytes whose keccak256 is the signing hash
    pub fn payload(&self) -> Vec<u8> {
        match self.tx {
            UnsignedTransaction::LegacyTransfer { common, gas_price }
            | UnsignedTransaction::LegacyContractCall { common, gas_price } => {
                if self.chain_id == 0 {
                    log_warn!(
                        "signing",
                        "Legacy transaction without replay protection (chain id 0); deprecated and insecure",
                        nonce = common.nonce,
                    );
                }
                ethereum::legacy_payload(common, gas_price)
            }
            UnsignedTransaction::FeeMarketTransfer { common, fees }
            | UnsignedTransaction::FeeMarketContractCall { common, fees } => {
                ethereum::fee_market_payload(common, fees)
            }
        }
    }

    pub fn hash(&self) -> PreImageHash {
        PreImageHash::new(keccak256(&self.payload()))
    }
}

/// Hash to sign, with hex rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PreImageHash {
    #[serde(serialize_with = "serialize_hash")]
    pub hash: [u8; 32],
}

impl PreImageHash {
    pub fn new(hash: [u8; 32]) -> Self {
        Self { hash }
    }

    /// Get hash as hex string (no prefix)
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

fn serialize_hash<S: serde::Serializer>(hash: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(hash))
}

/// Signing payload of `tx` bound to `chain_id`
pub fn signing_payload(tx: &UnsignedTransaction, chain_id: u64) -> ToolResult<Vec<u8>> {
    Ok(SigningRequest::new(tx, chain_id)?.payload())
}

/// keccak256 of [`signing_payload`]
pub fn signing_hash(tx: &UnsignedTransaction, chain_id: u64) -> ToolResult<[u8; 32]> {
    Ok(SigningRequest::new(tx, chain_id)?.hash().hash)
}
