//! Accounted-amount conversion.
//!
//! Entered amounts are converted to the ledger's functional currency by
//! applying the supplied rate and rounding with Banker's Rounding
//! (`MidpointNearestEven`), which avoids systematic drift across many
//! postings.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Decimal places kept on accounted amounts.
pub const ACCOUNTED_DECIMALS: u32 = 4;

/// Converts an entered amount to the accounted amount at the given rate.
///
/// Rounds to [`ACCOUNTED_DECIMALS`] places using Banker's Rounding:
/// - 2.5 rounds to 2 (nearest even)
/// - 3.5 rounds to 4 (nearest even)
#[must_use]
pub fn to_accounted(entered: Decimal, rate: Decimal) -> Decimal {
    (entered * rate).round_dp_with_strategy(ACCOUNTED_DECIMALS, RoundingStrategy::MidpointNearestEven)
}

/// Rounds a value to accounted precision using Banker's Rounding.
#[must_use]
pub fn round_accounted(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(ACCOUNTED_DECIMALS, RoundingStrategy::MidpointNearestEven)
}
