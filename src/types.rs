//! Shared types for the Ethereum tool
//!
//! Data structures that cross module boundaries are defined here.

use crate::error::{ToolError, ToolResult};
use crate::utils::crypto::{decode_hex, public_key_to_address_bytes, to_checksum_address};
use ethers_core::types::H160;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Address
// =============================================================================

/// 20-byte account or contract address.
///
/// Parsing accepts an optional `0x`/`0X` prefix and any hex case, so two
/// addresses compare equal exactly when their bytes do. `Display` renders the
/// canonical lowercase `0x…` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn from_slice(bytes: &[u8]) -> ToolResult<Self> {
        let arr = <[u8; 20]>::try_from(bytes).map_err(|_| {
            ToolError::invalid_input(format!("Address must be 20 bytes, got {}", bytes.len()))
        })?;
        Ok(Address(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// EIP-55 mixed-case rendering for display to humans.
    pub fn to_checksum(&self) -> String {
        to_checksum_address(&self.0)
    }

    pub fn from_public_key(public_key: &secp256k1::PublicKey) -> Self {
        Address(public_key_to_address_bytes(public_key))
    }
}

impl FromStr for Address {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let clean = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if clean.len() != 40 {
            return Err(ToolError::invalid_input(format!(
                "Invalid address '{}': expected 40 hex characters",
                s
            )));
        }
        let bytes = hex::decode(clean)
            .map_err(|e| ToolError::invalid_input(format!("Invalid address '{}': {}", s, e)))?;
        Address::from_slice(&bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl From<Address> for H160 {
    fn from(address: Address) -> Self {
        H160::from(address.0)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_str(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Source identity
// =============================================================================

/// Parse an operator-supplied source: either an address or a SEC1 public key
/// (33-byte compressed or 65-byte uncompressed), which is reduced to its address.
pub fn parse_source(input: &str) -> ToolResult<Address> {
    let bytes = decode_hex(input)?;
    match bytes.len() {
        20 => Address::from_slice(&bytes),
        33 | 65 => {
            let public_key = secp256k1::PublicKey::from_slice(&bytes)
                .map_err(|e| ToolError::invalid_input(format!("Invalid public key: {}", e)))?;
            Ok(Address::from_public_key(&public_key))
        }
        n => Err(ToolError::invalid_input(format!(
            "Source must be a 20-byte address or a 33/65-byte public key, got {} bytes",
            n
        ))),
    }
}
