//! Ethereum Tool Core Library
//!
//! Offline assembly of EVM transactions for external signers.
//!
//! # Architecture
//!
//! This crate provides:
//! - **exchange**: fiat rate snapshot and wei/gwei/satoshi conversions
//! - **abi**: ERC-20 call encoding and result decoding
//! - **fees**: fee arithmetic and node-backed quotes
//! - **tx**: transaction shapes, builder, unsigned codec, orchestration, broadcast
//! - **signing**: signing hashes and detached signature attachment
//! - **token**: read-only token queries
//! - **rpc**: node JSON-RPC boundary
//!
//! # Flow
//!
//! ```rust,ignore
//! use ethereum_tool::signing::{attach, signing_hash, DetachedSignature};
//! use ethereum_tool::tx::TransactionBuilder;
//!
//! let tx = TransactionBuilder::new(1).build_transfer(nonce, to, value, prio, max_fee, 21_000)?;
//! let hash = signing_hash(&tx, 1)?;
//! // ... hash goes to the external signer, (r, s) comes back ...
//! let signed = attach(&tx, 1, &source, &DetachedSignature::from_hex(sig_hex)?, &hash)?;
//! println!("{}", signed.raw_hex());
//! ```

pub mod utils;

pub mod abi;
pub mod config;
pub mod error;
pub mod exchange;
pub mod fees;
pub mod rpc;
pub mod signing;
pub mod token;
pub mod tx;
pub mod types;

// Re-export key types for convenience
pub use config::AppConfig;
pub use error::{ErrorCode, ToolError, ToolResult};
pub use exchange::{ExchangeRatePair, FallbackRates};
pub use signing::{attach, signing_hash, DetachedSignature, SignedTransaction};
pub use tx::{TransactionBuilder, UnsignedTransaction};
pub use types::Address;
