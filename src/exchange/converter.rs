//! Fiat ↔ native unit conversion at fixed decimal precision.
//!
//! Every conversion multiplies first, then performs one exact division
//! rounded half-up to [`DECIMAL_POSITIONS`] places. Fiat → unit
//! conversions additionally truncate the rounded quotient toward zero.

use bigdecimal::BigDecimal;
use ethers_core::types::U256;
use num_bigint::{BigInt, Sign};
use num_traits::{Signed, Zero};

use super::rates::ExchangeRatePair;
use crate::error::{ToolError, ToolResult};

const FRACTION_DIGITS: u32 = 9;

/// Scale of every fiat quotient.
pub const DECIMAL_POSITIONS: i64 = FRACTION_DIGITS as i64;

const WEI_DECIMALS: u32 = 18;
const GWEI_DECIMALS: u32 = 9;
const SATOSHI_DECIMALS: u32 = 8;

/// Widest scaled quotient any conversion may produce: a 256-bit amount
/// times a rate, plus the fractional positions.
const MAX_QUOTIENT_DIGITS: i64 = 128;

/// Conversions bound to one rate snapshot.
#[derive(Debug, Clone, Copy)]
pub struct AmountConverter<'a> {
    rates: &'a ExchangeRatePair,
}

impl<'a> AmountConverter<'a> {
    pub fn new(rates: &'a ExchangeRatePair) -> Self {
        Self { rates }
    }

    pub fn wei_to_fiat(&self, weis: U256) -> ToolResult<BigDecimal> {
        wei_to_fiat(weis, self.rates.eth_to_usd())
    }

    pub fn fiat_to_wei(&self, fiat: &BigDecimal) -> ToolResult<U256> {
        fiat_to_wei(fiat, self.rates.eth_to_usd())
    }

    pub fn gwei_to_fiat(&self, gweis: U256) -> ToolResult<BigDecimal> {
        gwei_to_fiat(gweis, self.rates.eth_to_usd())
    }

    pub fn fiat_to_gwei(&self, fiat: &BigDecimal) -> ToolResult<U256> {
        fiat_to_gwei(fiat, self.rates.eth_to_usd())
    }

    pub fn satoshis_to_fiat(&self, satoshis: u64) -> ToolResult<BigDecimal> {
        satoshis_to_fiat(satoshis, self.rates.btc_to_usd())
    }

    pub fn fiat_to_satoshis(&self, fiat: &BigDecimal) -> ToolResult<u64> {
        fiat_to_satoshis(fiat, self.rates.btc_to_usd())
    }
}

/// `weis * rate / 10^18`, rounded half-up at 9 places.
pub fn wei_to_fiat(weis: U256, rate: &BigDecimal) -> ToolResult<BigDecimal> {
    units_to_fiat(u256_to_bigint(weis), WEI_DECIMALS, rate)
}

/// `fiat * 10^18 / rate`, rounded half-up at 9 places, then truncated.
pub fn fiat_to_wei(fiat: &BigDecimal, rate: &BigDecimal) -> ToolResult<U256> {
    bigint_to_u256(&fiat_to_units(fiat, WEI_DECIMALS, rate)?)
}

/// `gweis * rate / 10^9`, rounded half-up at 9 places.
pub fn gwei_to_fiat(gweis: U256, rate: &BigDecimal) -> ToolResult<BigDecimal> {
    units_to_fiat(u256_to_bigint(gweis), GWEI_DECIMALS, rate)
}

/// `fiat * 10^9 / rate`, rounded half-up at 9 places, then truncated.
pub fn fiat_to_gwei(fiat: &BigDecimal, rate: &BigDecimal) -> ToolResult<U256> {
    bigint_to_u256(&fiat_to_units(fiat, GWEI_DECIMALS, rate)?)
}

/// `satoshis * rate / 10^8`, rounded half-up at 9 places.
pub fn satoshis_to_fiat(satoshis: u64, rate: &BigDecimal) -> ToolResult<BigDecimal> {
    units_to_fiat(BigInt::from(satoshis), SATOSHI_DECIMALS, rate)
}

/// `fiat * 10^8 / rate`, rounded half-up at 9 places, then truncated.
pub fn fiat_to_satoshis(fiat: &BigDecimal, rate: &BigDecimal) -> ToolResult<u64> {
    let units = fiat_to_units(fiat, SATOSHI_DECIMALS, rate)?;
    u64::try_from(units).map_err(|_| ToolError::invalid_input("Satoshi amount exceeds 64 bits"))
}

fn units_to_fiat(units: BigInt, decimals: u32, rate: &BigDecimal) -> ToolResult<BigDecimal> {
    ensure_positive_rate(rate)?;
    let numerator = BigDecimal::new(units, 0) * rate;
    let denominator = BigDecimal::new(pow10(decimals), 0);
    Ok(BigDecimal::new(
        divide_half_up(&numerator, &denominator)?,
        DECIMAL_POSITIONS,
    ))
}

fn fiat_to_units(fiat: &BigDecimal, decimals: u32, rate: &BigDecimal) -> ToolResult<BigInt> {
    ensure_positive_rate(rate)?;
    if fiat.is_negative() {
        return Err(ToolError::invalid_input(format!(
            "Fiat amount must not be negative: {}",
            fiat
        )));
    }
    let numerator = fiat * &BigDecimal::new(pow10(decimals), 0);
    let scaled = divide_half_up(&numerator, rate)?;
    // scaled carries DECIMAL_POSITIONS fractional digits; drop them
    Ok(scaled / pow10(FRACTION_DIGITS))
}

fn ensure_positive_rate(rate: &BigDecimal) -> ToolResult<()> {
    if rate.is_positive() {
        Ok(())
    } else {
        Err(ToolError::internal(format!(
            "Exchange rate must be positive, got {}",
            rate
        )))
    }
}

/// Exact `numerator / denominator` scaled by `10^DECIMAL_POSITIONS` and
/// rounded half-up. Both operands are non-negative, denominator non-zero.
///
/// The quotient's order of magnitude is checked from digit counts before
/// any power of ten is built: quotients below 0.1 round to zero, quotients
/// wider than [`MAX_QUOTIENT_DIGITS`] are `InvalidInput`.
fn divide_half_up(numerator: &BigDecimal, denominator: &BigDecimal) -> ToolResult<BigInt> {
    if numerator.is_zero() {
        return Ok(BigInt::zero());
    }

    let (mut num, num_scale) = numerator.as_bigint_and_exponent();
    let (mut den, den_scale) = denominator.as_bigint_and_exponent();

    // n/d * 10^9 == num * 10^(9 + den_scale - num_scale) / den
    let shift = den_scale
        .checked_sub(num_scale)
        .and_then(|s| s.checked_add(DECIMAL_POSITIONS))
        .ok_or_else(out_of_range)?;

    // quotient lies in (10^(magnitude - 1), 10^(magnitude + 1))
    let magnitude = digit_count(numerator)?
        .checked_sub(digit_count(denominator)?)
        .and_then(|d| d.checked_add(shift))
        .ok_or_else(out_of_range)?;
    if magnitude <= -2 {
        return Ok(BigInt::zero());
    }
    if magnitude > MAX_QUOTIENT_DIGITS {
        return Err(out_of_range());
    }

    let exp = u32::try_from(shift.unsigned_abs()).map_err(|_| out_of_range())?;
    if shift >= 0 {
        num *= pow10(exp);
    } else {
        den *= pow10(exp);
    }

    let quotient = &num / &den;
    let remainder = &num % &den;
    if !remainder.is_zero() && remainder * 2u32 >= den {
        Ok(quotient + 1u32)
    } else {
        Ok(quotient)
    }
}

fn digit_count(value: &BigDecimal) -> ToolResult<i64> {
    i64::try_from(value.digits()).map_err(|_| out_of_range())
}

fn out_of_range() -> ToolError {
    ToolError::invalid_input("Amount is out of the convertible range")
}

fn pow10(exp: u32) -> BigInt {
    BigInt::from(10u32).pow(exp)
}

pub fn u256_to_bigint(value: U256) -> BigInt {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    BigInt::from_bytes_be(Sign::Plus, &bytes)
}

pub fn bigint_to_u256(value: &BigInt) -> ToolResult<U256> {
    if value.is_negative() {
        return Err(ToolError::invalid_input(format!(
            "Value must not be negative: {}",
            value
        )));
    }
    let (_, bytes) = value.to_bytes_be();
    if bytes.len() > 32 {
        return Err(ToolError::invalid_input("Value exceeds 256 bits"));
    }
    Ok(U256::from_big_endian(&bytes))
}
