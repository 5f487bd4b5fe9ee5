//! ABI type definitions for the token call codec

use ethers_core::types::U256;
use std::fmt;

use crate::error::ToolError;
use crate::types::Address;

/// Solidity types the codec understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbiType {
    Uint8,
    Uint256,
    Address,
    Bool,
    // Dynamic string
    String,
}

impl AbiType {
    /// Check if the type is dynamic (requires offset encoding)
    pub fn is_dynamic(&self) -> bool {
        matches!(self, AbiType::String)
    }

    /// Canonical name as used in function signatures
    pub fn canonical_type(&self) -> &'static str {
        match self {
            AbiType::Uint8 => "uint8",
            AbiType::Uint256 => "uint256",
            AbiType::Address => "address",
            AbiType::Bool => "bool",
            AbiType::String => "string",
        }
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_type())
    }
}

/// ABI value - runtime representation of call arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Uint(U256),
    Address(Address),
    Bool(bool),
    String(String),
}

impl AbiValue {
    pub fn get_type(&self) -> AbiType {
        match self {
            AbiValue::Uint(_) => AbiType::Uint256,
            AbiValue::Address(_) => AbiType::Address,
            AbiValue::Bool(_) => AbiType::Bool,
            AbiValue::String(_) => AbiType::String,
        }
    }
}

/// First return slot of a read-only call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
    String(String),
    UnsignedInteger(U256),
    Address(Address),
}

impl DecodedValue {
    /// Strings pass through and addresses render as lowercase hex.
    /// Integers do not coerce.
    pub fn into_string(self) -> Result<String, AbiError> {
        match self {
            DecodedValue::String(s) => Ok(s),
            DecodedValue::Address(a) => Ok(a.to_string()),
            DecodedValue::UnsignedInteger(_) => Err(AbiError::TypeMismatch {
                expected: "string".to_string(),
                got: "uint".to_string(),
            }),
        }
    }

    pub fn into_uint(self) -> Result<U256, AbiError> {
        match self {
            DecodedValue::UnsignedInteger(v) => Ok(v),
            other => Err(AbiError::TypeMismatch {
                expected: "uint".to_string(),
                got: other.kind().to_string(),
            }),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            DecodedValue::String(_) => "string",
            DecodedValue::UnsignedInteger(_) => "uint",
            DecodedValue::Address(_) => "address",
        }
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::String(s) => write!(f, "{}", s),
            DecodedValue::UnsignedInteger(v) => write!(f, "{}", v),
            DecodedValue::Address(a) => write!(f, "{}", a),
        }
    }
}

/// ABI errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AbiError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },
    #[error("Encoding error: {0}")]
    EncodingError(String),
    #[error("Decoding error: {0}")]
    DecodingError(String),
    #[error("Contract call returned no data")]
    EmptyResponse,
    #[error("Amount {amount} has more than {decimals} decimal places")]
    InexactScale { amount: String, decimals: u8 },
    #[error("Amount must not be negative: {0}")]
    NegativeAmount(String),
    #[error("Numeric overflow")]
    Overflow,
}

impl From<AbiError> for ToolError {
    fn from(e: AbiError) -> Self {
        match e {
            AbiError::EmptyResponse => ToolError::empty_response(e.to_string()),
            AbiError::NegativeAmount(_) => ToolError::invalid_input(e.to_string()),
            _ => ToolError::encoding(e.to_string()),
        }
    }
}
