//! Transaction Module
//!
//! Handles transaction shapes, building, the unsigned codec, orchestration
//! against the node, and broadcasting.

mod broadcaster;
mod builder;
mod codec;
mod service;
mod transaction;

pub use broadcaster::*;
pub use builder::*;
pub use codec::*;
pub use service::*;
pub use transaction::*;
