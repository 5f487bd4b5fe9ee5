//! Function selector calculation

use crate::utils::keccak256;

/// ABI selector calculator
pub struct AbiSelector;

impl AbiSelector {
    /// Calculate function selector (first 4 bytes of keccak256(signature))
    pub fn selector_from_signature(signature: &str) -> [u8; 4] {
        let hash = keccak256(signature.as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }
}

/// Well-known ERC-20 function selectors
pub struct KnownSelectors;

impl KnownSelectors {
    pub const TRANSFER: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];   // transfer(address,uint256)
    pub const BALANCE_OF: [u8; 4] = [0x70, 0xa0, 0x82, 0x31]; // balanceOf(address)
    pub const NAME: [u8; 4] = [0x06, 0xfd, 0xde, 0x03];       // name()
    pub const SYMBOL: [u8; 4] = [0x95, 0xd8, 0x9b, 0x41];     // symbol()
    pub const DECIMALS: [u8; 4] = [0x31, 0x3c, 0xe5, 0x67];   // decimals()
}
