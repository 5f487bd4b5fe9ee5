//! Process configuration
//!
//! Read from the environment once at startup; command-line flags override
//! individual values afterwards.

use bigdecimal::BigDecimal;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ToolError, ToolResult};
use crate::exchange::coingate::DEFAULT_COINGATE_URL;
use crate::exchange::FallbackRates;
use crate::tx::{ReceiptPoller, DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL};

pub const ENV_NODE_URL: &str = "ETHEREUM_NODE_URL";
pub const ENV_CHAIN_ID: &str = "ETHEREUM_NETWORK_CHAIN_ID";
pub const ENV_COINGATE_URL: &str = "COINGATE_API_URL";
pub const ENV_ETH_TO_USD: &str = "EXCHANGE_RATE_ETH_TO_USD";
pub const ENV_BTC_TO_USD: &str = "EXCHANGE_RATE_BTC_TO_USD";
pub const ENV_POLL_INTERVAL: &str = "RECEIPT_POLL_INTERVAL_SECS";
pub const ENV_MAX_ATTEMPTS: &str = "RECEIPT_MAX_ATTEMPTS";
pub const ENV_DEBUG: &str = "ETHEREUM_TOOL_DEBUG";

pub const DEFAULT_CHAIN_ID: u64 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Required only by commands that talk to a node
    pub node_url: Option<String>,
    pub chain_id: u64,
    pub coingate_url: String,
    pub fallback: FallbackRates,
    pub poller: ReceiptPoller,
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_url: None,
            chain_id: DEFAULT_CHAIN_ID,
            coingate_url: DEFAULT_COINGATE_URL.to_string(),
            fallback: FallbackRates::default(),
            poller: ReceiptPoller::default(),
            debug: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> ToolResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> ToolResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let chain_id = match get(ENV_CHAIN_ID) {
            Some(v) => parse_var(ENV_CHAIN_ID, &v)?,
            None => defaults.chain_id,
        };

        let eth_to_usd = match get(ENV_ETH_TO_USD) {
            Some(v) => parse_var::<BigDecimal>(ENV_ETH_TO_USD, &v)?,
            None => defaults.fallback.eth_to_usd.clone(),
        };
        let btc_to_usd = match get(ENV_BTC_TO_USD) {
            Some(v) => parse_var::<BigDecimal>(ENV_BTC_TO_USD, &v)?,
            None => defaults.fallback.btc_to_usd.clone(),
        };
        let fallback = FallbackRates::new(eth_to_usd, btc_to_usd).map_err(|e| e.context("fallback rates"))?;

        let interval = match get(ENV_POLL_INTERVAL) {
            Some(v) => Duration::from_secs(parse_var(ENV_POLL_INTERVAL, &v)?),
            None => DEFAULT_POLL_INTERVAL,
        };
        let max_attempts = match get(ENV_MAX_ATTEMPTS) {
            Some(v) => match parse_var::<u32>(ENV_MAX_ATTEMPTS, &v)? {
                0 => None,
                n => Some(n),
            },
            None => Some(DEFAULT_MAX_ATTEMPTS),
        };

        let debug = get(ENV_DEBUG)
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        Ok(Self {
            node_url: get(ENV_NODE_URL),
            chain_id,
            coingate_url: get(ENV_COINGATE_URL).unwrap_or(defaults.coingate_url),
            fallback,
            poller: ReceiptPoller::new(interval, max_attempts),
            debug,
        })
    }

    pub fn require_node_url(&self) -> ToolResult<&str> {
        self.node_url
            .as_deref()
            .ok_or_else(|| ToolError::invalid_input(format!("No node URL; set {} or --node-url", ENV_NODE_URL)))
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> ToolResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e: T::Err| ToolError::invalid_input(format!("{}={}: {}", key, value, e)))
}
