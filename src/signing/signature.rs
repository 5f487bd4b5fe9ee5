//! Detached secp256k1 signatures and public-key recovery

use ethers_core::types::U256;
use secp256k1::ecdsa::{RecoverableSignature as SecpRecoverableSignature, RecoveryId};
use secp256k1::{Message, Secp256k1};

use super::SigningError;
use crate::error::ToolResult;
use crate::types::Address;
use crate::utils::decode_hex;

/// Order of the secp256k1 group
pub const SECP256K1_N: U256 = U256([
    0xbfd2_5e8c_d036_4141,
    0xbaae_dce6_af48_a03b,
    0xffff_ffff_ffff_fffe,
    0xffff_ffff_ffff_ffff,
]);

/// `n / 2`, the largest canonical `s`
pub const SECP256K1_HALF_N: U256 = U256([
    0xdfe9_2f46_681b_20a0,
    0x5d57_6e73_57a4_501d,
    0xffff_ffff_ffff_ffff,
    0x7fff_ffff_ffff_ffff,
]);

/// `(r, s)` as returned by an external signer, without a recovery id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetachedSignature {
    pub r: U256,
    pub s: U256,
}

impl DetachedSignature {
    /// Both scalars must lie in `[1, n-1]`.
    pub fn new(r: U256, s: U256) -> Result<Self, SigningError> {
        check_scalar("r", r)?;
        check_scalar("s", s)?;
        Ok(Self { r, s })
    }

    /// `r || s` or `r || s || v`. A trailing `v` is ignored; the recovery
    /// id is always re-derived.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SigningError> {
        if bytes.len() != 64 && bytes.len() != 65 {
            return Err(SigningError::InvalidSignatureLength(bytes.len()));
        }
        Self::new(U256::from_big_endian(&bytes[..32]), U256::from_big_endian(&bytes[32..64]))
    }

    pub fn from_hex(input: &str) -> ToolResult<Self> {
        let bytes = decode_hex(input)?;
        Ok(Self::from_bytes(&bytes)?)
    }

    pub fn is_low_s(&self) -> bool {
        self.s <= SECP256K1_HALF_N
    }

    /// EIP-2 form: `s` replaced by `n - s` when above `n / 2`
    pub fn canonicalize(self) -> Self {
        if self.is_low_s() {
            return self;
        }
        Self {
            r: self.r,
            s: SECP256K1_N - self.s,
        }
    }

    pub fn to_compact(&self) -> [u8; 64] {
        let mut compact = [0u8; 64];
        self.r.to_big_endian(&mut compact[..32]);
        self.s.to_big_endian(&mut compact[32..]);
        compact
    }

    /// Address of the key that produced this signature over `hash`, assuming
    /// `recovery_id`. `None` when no point exists for that id.
    pub fn recover_address(&self, hash: &[u8; 32], recovery_id: u8) -> Option<Address> {
        let recid = RecoveryId::from_i32(i32::from(recovery_id)).ok()?;
        let signature = SecpRecoverableSignature::from_compact(&self.to_compact(), recid).ok()?;
        let message = Message::from_digest_slice(hash).ok()?;
        let public_key = Secp256k1::verification_only()
            .recover_ecdsa(&message, &signature)
            .ok()?;
        Some(Address::from_public_key(&public_key))
    }

    /// Every recovery id in `0..=3` whose recovered address is `expected`
    pub fn matching_recovery_ids(&self, hash: &[u8; 32], expected: &Address) -> Vec<u8> {
        (0u8..=3)
            .filter(|id| self.recover_address(hash, *id).as_ref() == Some(expected))
            .collect()
    }
}

fn check_scalar(name: &'static str, value: U256) -> Result<(), SigningError> {
    if value.is_zero() || value >= SECP256K1_N {
        return Err(SigningError::InvalidScalar(name));
    }
    Ok(())
}

/// Detached signature with the recovery id that verified it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature {
    pub r: U256,
    pub s: U256,
    pub recovery_id: u8,
}

impl RecoverableSignature {
    pub fn detached(&self) -> DetachedSignature {
        DetachedSignature { r: self.r, s: self.s }
    }

    pub fn recover(&self, hash: &[u8; 32]) -> Option<Address> {
        self.detached().recover_address(hash, self.recovery_id)
    }
}
