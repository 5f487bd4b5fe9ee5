//! Exchange rate snapshot.
//!
//! Rates are fetched once, substituted by configured fallbacks where the
//! source fails, and never change afterwards.

use bigdecimal::BigDecimal;
use num_traits::Signed;
use std::str::FromStr;

use crate::error::{ToolError, ToolResult};
use crate::{log_info, log_warn};

pub const USD_SYMBOL: &str = "USD";
pub const ETHER_SYMBOL: &str = "ETH";
pub const BITCOIN_SYMBOL: &str = "BTC";

pub const DEFAULT_ETH_TO_USD: &str = "1922.51";
pub const DEFAULT_BTC_TO_USD: &str = "30607.10";

/// Anything that can quote `base` in units of `quote`.
///
/// Implementations report failures as `RateUnavailable`; the loader
/// always recovers them with a fallback.
pub trait RateSource {
    fn get_rate(&self, base: &str, quote: &str) -> ToolResult<BigDecimal>;
}

/// Rates used when the source cannot answer.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackRates {
    pub eth_to_usd: BigDecimal,
    pub btc_to_usd: BigDecimal,
}

impl FallbackRates {
    pub fn new(eth_to_usd: BigDecimal, btc_to_usd: BigDecimal) -> ToolResult<Self> {
        ensure_positive("eth-to-usd", &eth_to_usd)?;
        ensure_positive("btc-to-usd", &btc_to_usd)?;
        Ok(Self { eth_to_usd, btc_to_usd })
    }
}

impl Default for FallbackRates {
    fn default() -> Self {
        // Both literals are valid positive decimals
        Self {
            eth_to_usd: BigDecimal::from_str(DEFAULT_ETH_TO_USD).unwrap_or_default(),
            btc_to_usd: BigDecimal::from_str(DEFAULT_BTC_TO_USD).unwrap_or_default(),
        }
    }
}

/// Immutable ETH→USD and BTC→USD rates.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRatePair {
    eth_to_usd: BigDecimal,
    btc_to_usd: BigDecimal,
}

impl ExchangeRatePair {
    pub fn new(eth_to_usd: BigDecimal, btc_to_usd: BigDecimal) -> ToolResult<Self> {
        ensure_positive("eth-to-usd", &eth_to_usd)?;
        ensure_positive("btc-to-usd", &btc_to_usd)?;
        Ok(Self { eth_to_usd, btc_to_usd })
    }

    /// Query both rates once, falling back per rate on any failure.
    pub fn load(source: &dyn RateSource, fallback: &FallbackRates) -> ToolResult<Self> {
        log_info!("exchange", "Loading exchange rates...");

        let btc_to_usd = fetch_or_fallback(source, BITCOIN_SYMBOL, &fallback.btc_to_usd);
        let eth_to_usd = fetch_or_fallback(source, ETHER_SYMBOL, &fallback.eth_to_usd);

        log_info!(
            "exchange",
            "Exchange rates loaded",
            btc_to_usd = btc_to_usd,
            eth_to_usd = eth_to_usd,
        );

        Self::new(eth_to_usd, btc_to_usd)
    }

    /// Snapshot built from fallbacks alone, with no source query.
    pub fn from_fallback(fallback: &FallbackRates) -> ToolResult<Self> {
        Self::new(fallback.eth_to_usd.clone(), fallback.btc_to_usd.clone())
    }

    pub fn eth_to_usd(&self) -> &BigDecimal {
        &self.eth_to_usd
    }

    pub fn btc_to_usd(&self) -> &BigDecimal {
        &self.btc_to_usd
    }
}

fn fetch_or_fallback(source: &dyn RateSource, base: &str, fallback: &BigDecimal) -> BigDecimal {
    match source.get_rate(base, USD_SYMBOL) {
        Ok(rate) if rate.is_positive() => rate,
        Ok(rate) => {
            log_warn!(
                "exchange",
                "Non-positive rate from source, using fallback",
                base = base,
                rate = rate,
                fallback = fallback,
            );
            fallback.clone()
        }
        Err(e) => {
            log_warn!(
                "exchange",
                "Rate unavailable, using fallback",
                base = base,
                error = e,
                fallback = fallback,
            );
            fallback.clone()
        }
    }
}

fn ensure_positive(name: &str, rate: &BigDecimal) -> ToolResult<()> {
    if rate.is_positive() {
        Ok(())
    } else {
        Err(ToolError::invalid_input(format!(
            "Exchange rate {} must be positive, got {}",
            name, rate
        )))
    }
}
