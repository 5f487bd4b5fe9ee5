//! Unified error types for the Ethereum tool
//!
//! Module-level errors (`AbiError`, `SigningError`) convert into
//! [`ToolError`], which carries a category code plus a cause chain
//! naming the step that failed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for all tool operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl ToolError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Prefix the message with the step that was running, building a
    /// `outer: inner: cause` chain as the error travels up.
    pub fn context(mut self, step: impl fmt::Display) -> Self {
        self.message = format!("{}: {}", step, self.message);
        self
    }

    // Convenience constructors
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::UpstreamUnavailable, msg)
    }

    pub fn rate_unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RateUnavailable, msg)
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::EncodingError, msg)
    }

    pub fn verification_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SignatureVerificationFailed, msg)
    }

    pub fn empty_response(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::EmptyResponse, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed address, negative amount, bad hex, inconsistent fields.
    /// Always detected before any I/O.
    InvalidInput,
    /// Node RPC failed or returned an unusable answer.
    UpstreamUnavailable,
    /// Fiat rate could not be fetched. Recovered by the loader.
    RateUnavailable,
    /// ABI/RLP encode or decode failure, inexact token scaling.
    EncodingError,
    /// No recovery id yields the declared source address.
    SignatureVerificationFailed,
    /// A contract call returned zero bytes.
    EmptyResponse,
    /// An internal invariant was violated.
    Internal,
}

/// Result type alias for tool operations
pub type ToolResult<T> = Result<T, ToolError>;

// Conversions from common error types

impl From<serde_json::Error> for ToolError {
    fn from(e: serde_json::Error) -> Self {
        ToolError::encoding(format!("JSON error: {}", e))
    }
}

impl From<hex::FromHexError> for ToolError {
    fn from(e: hex::FromHexError) -> Self {
        ToolError::invalid_input(format!("Invalid hex: {}", e))
    }
}

impl From<reqwest::Error> for ToolError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ToolError::upstream("Request timed out")
        } else if e.is_connect() {
            ToolError::upstream("Connection failed")
        } else {
            ToolError::upstream(e.to_string())
        }
    }
}

impl From<secp256k1::Error> for ToolError {
    fn from(e: secp256k1::Error) -> Self {
        ToolError::invalid_input(format!("Secp256k1 error: {}", e))
    }
}

impl From<ethers_core::utils::rlp::DecoderError> for ToolError {
    fn from(e: ethers_core::utils::rlp::DecoderError) -> Self {
        ToolError::encoding(format!("RLP error: {}", e))
    }
}

impl From<bigdecimal::ParseBigDecimalError> for ToolError {
    fn from(e: bigdecimal::ParseBigDecimalError) -> Self {
        ToolError::invalid_input(format!("Invalid decimal: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = ToolError::upstream("connection refused")
            .with_details("http://localhost:8545");

        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("upstream_unavailable"));
        assert!(json.contains("connection refused"));
    }

    #[test]
    fn test_context_builds_cause_chain() {
        let err = ToolError::upstream("connection refused")
            .context("base fee")
            .context("fee estimation");

        assert_eq!(err.code, ErrorCode::UpstreamUnavailable);
        assert_eq!(err.message, "fee estimation: base fee: connection refused");
        assert_eq!(
            err.to_string(),
            "[UpstreamUnavailable] fee estimation: base fee: connection refused"
        );
    }

    #[test]
    fn test_hex_error_is_invalid_input() {
        let err: ToolError = hex::decode("zz").unwrap_err().into();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }
}
