//! External Signature Attachment
//!
//! 1. Compute the pre-image hash an external signer must sign
//! 2. Accept the detached `(r, s)` signature it returns
//! 3. Verify it recovers to the declared source and compile the final
//!    broadcast-ready transaction
//!
//! Supported: legacy (with and without EIP-155) and EIP-1559 type `0x02`.

pub mod compiler;
pub mod preimage;
pub mod signature;

#[cfg(test)]
mod tests;

pub use compiler::*;
pub use preimage::{signing_hash, signing_payload, PreImageHash, SigningRequest};
pub use signature::*;

use crate::error::ToolError;

/// Signing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SigningError {
    #[error("Chain id {requested} does not match transaction chain id {transaction}")]
    ChainIdMismatch { transaction: u64, requested: u64 },
    #[error("Signing hash {supplied} does not match transaction hash {computed}")]
    HashMismatch { supplied: String, computed: String },
    #[error("Signature must be 64 or 65 bytes, got {0}")]
    InvalidSignatureLength(usize),
    #[error("Signature scalar {0} is outside [1, n-1]")]
    InvalidScalar(&'static str),
    #[error("Signature does not recover to {0}")]
    NoMatchingRecoveryId(String),
    #[error("Recovery ids {ids:?} all recover to {address}")]
    AmbiguousRecovery { address: String, ids: Vec<u8> },
    #[error("Recovery id {0} cannot be encoded in v")]
    UnencodableRecoveryId(u8),
}

impl From<SigningError> for ToolError {
    fn from(e: SigningError) -> Self {
        match e {
            SigningError::NoMatchingRecoveryId(_) | SigningError::UnencodableRecoveryId(_) => {
                ToolError::verification_failed(e.to_string())
            }
            SigningError::AmbiguousRecovery { .. } => ToolError::internal(e.to_string()),
            _ => ToolError::invalid_input(e.to_string()),
        }
    }
}
