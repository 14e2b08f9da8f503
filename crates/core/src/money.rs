//! Fixed-point money helpers.
//!
//! All monetary values in the engine are `rust_decimal::Decimal`. Arithmetic
//! is carried out at full precision; rounding to two decimals happens only at
//! the display boundary via [`round_display`], never mid-calculation.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Tolerance used when checking payment allocations against a total due.
///
/// Covers rounding drift from values that were entered at display precision;
/// paying more than `total_due + epsilon` is a validation failure, never a
/// silent clamp.
pub const DEFAULT_PAYMENT_EPSILON: Decimal = dec!(0.01);

/// Round a monetary amount for display (two decimals, half away from zero).
pub fn round_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
