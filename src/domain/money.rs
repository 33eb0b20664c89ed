use crate::error::{BridgeError, Result};
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places of the settlement currency's minor unit.
pub const SETTLEMENT_SCALE: u32 = 2;

/// The settlement currency that is quoted per unit of the exchange rate.
///
/// When the processor settles in this currency the store amount is divided by
/// the rate; for any other settlement currency it is multiplied.
pub const FOREIGN_SETTLEMENT_CURRENCY: &str = "USD";

/// Converts a store amount into the processor's settlement currency.
///
/// Amounts already in the settlement currency pass through untouched. Converted
/// amounts are rounded to [`SETTLEMENT_SCALE`] places, midpoint away from zero.
pub fn to_settlement(
    amount: Decimal,
    currency: &str,
    settlement: &str,
    exchange_rate: Decimal,
) -> Result<Decimal> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(BridgeError::Validation(
            "Amount must not be negative".to_string(),
        ));
    }

    if currency.eq_ignore_ascii_case(settlement) {
        return Ok(amount);
    }

    if exchange_rate <= Decimal::ZERO {
        return Err(BridgeError::Validation(
            "Exchange rate must be positive".to_string(),
        ));
    }

    let converted = if settlement.eq_ignore_ascii_case(FOREIGN_SETTLEMENT_CURRENCY) {
        amount
            .checked_div(exchange_rate)
            .ok_or_else(|| BridgeError::Validation("Amount out of range".to_string()))?
    } else {
        amount
            .checked_mul(exchange_rate)
            .ok_or_else(|| BridgeError::Validation("Amount out of range".to_string()))?
    };

    Ok(converted.round_dp_with_strategy(SETTLEMENT_SCALE, RoundingStrategy::MidpointAwayFromZero))
}
