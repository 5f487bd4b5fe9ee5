//! ABI (Application Binary Interface) codec for token contract calls
//!
//! This module provides:
//! - Head/tail encoding and decoding of the static and dynamic types
//!   the ERC-20 surface uses
//! - Function selector calculation
//! - The closed `Erc20Function` set with call encoding, first-slot
//!   result decoding and exact token-unit scaling

pub mod types;
pub mod encoder;
pub mod decoder;
pub mod erc20;
pub mod selector;


pub use types::*;
pub use encoder::*;
pub use decoder::*;
pub use erc20::*;
pub use selector::*;
