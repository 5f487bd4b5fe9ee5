//! Exchange rates and fiat conversions
//!
//! - `rates`: immutable ETH/BTC → USD snapshot with fallback substitution
//! - `converter`: wei, gwei and satoshi ↔ fiat at 9 decimal places
//! - `coingate`: HTTP rate source

pub mod coingate;
pub mod converter;
pub mod rates;

pub use coingate::CoinGateClient;
pub use converter::*;
pub use rates::{ExchangeRatePair, FallbackRates, RateSource};
