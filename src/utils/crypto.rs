//! Crypto Utilities
//!
//! Hashing and address helpers shared by the codec, signing and CLI layers.

use crate::error::{ToolError, ToolResult};
use secp256k1::PublicKey;
use tiny_keccak::{Hasher, Keccak};

/// Keccak256 hash (used for Ethereum addresses, selectors and signing hashes)
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// Convert raw address bytes to checksummed Ethereum address (EIP-55)
pub fn to_checksum_address(address: &[u8]) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut result = String::from("0x");
    for (i, ch) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };

        if ch.is_ascii_digit() {
            result.push(ch);
        } else if nibble >= 8 {
            result.push(ch.to_ascii_uppercase());
        } else {
            result.push(ch);
        }
    }

    result
}

/// Address bytes of a secp256k1 public key: last 20 bytes of
/// keccak256 over the uncompressed point without its 0x04 tag.
pub fn public_key_to_address_bytes(public_key: &PublicKey) -> [u8; 20] {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&hash[12..]);
    out
}

/// Decode hex with an optional `0x`/`0X` prefix.
pub fn decode_hex(input: &str) -> ToolResult<Vec<u8>> {
    let trimmed = input.trim();
    let clean = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    hex::decode(clean).map_err(ToolError::from)
}

/// Decode exactly 32 bytes of hex.
pub fn decode_hash(input: &str) -> ToolResult<[u8; 32]> {
    let bytes = decode_hex(input)?;
    <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| {
        ToolError::invalid_input(format!("Expected 32-byte hash, got {} bytes", bytes.len()))
    })
}
