//! CoinGate merchant rates client.
//!
//! `GET {base}/v2/rates/merchant/{from}/{to}/` answers with a bare decimal
//! body. Anything other than a 2xx with a positive decimal is treated as
//! unavailable.

use bigdecimal::BigDecimal;
use num_traits::Signed;
use reqwest::blocking::Client;
use std::str::FromStr;

use super::rates::RateSource;
use crate::error::{ToolError, ToolResult};
use crate::log_debug;
use crate::utils::create_client;

pub const DEFAULT_COINGATE_URL: &str = "https://api.coingate.com";

pub struct CoinGateClient {
    base_url: String,
    client: Client,
}

impl CoinGateClient {
    pub fn new(base_url: impl Into<String>) -> ToolResult<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: create_client()?,
        })
    }

    pub fn rate_url(&self, base: &str, quote: &str) -> String {
        format!("{}/v2/rates/merchant/{}/{}/", self.base_url, base, quote)
    }
}

impl RateSource for CoinGateClient {
    fn get_rate(&self, base: &str, quote: &str) -> ToolResult<BigDecimal> {
        let url = self.rate_url(base, quote);
        log_debug!("coingate", "Requesting rate", url = url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| ToolError::rate_unavailable(format!("Rate request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::rate_unavailable(format!(
                "Rate provider returned HTTP {}",
                status
            )));
        }

        let body = response
            .text()
            .map_err(|e| ToolError::rate_unavailable(format!("Unreadable rate body: {}", e)))?;
        parse_rate_body(&body)
    }
}

/// Parse the plain-decimal body the provider answers with.
pub fn parse_rate_body(body: &str) -> ToolResult<BigDecimal> {
    let trimmed = body.trim().trim_matches('"');
    if trimmed.is_empty() {
        return Err(ToolError::rate_unavailable("Empty rate body"));
    }
    let rate = BigDecimal::from_str(trimmed)
        .map_err(|e| ToolError::rate_unavailable(format!("Unparsable rate '{}': {}", trimmed, e)))?;
    if !rate.is_positive() {
        return Err(ToolError::rate_unavailable(format!("Non-positive rate {}", rate)));
    }
    Ok(rate)
}
