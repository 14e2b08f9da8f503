//! Tax & totals calculator: VAT, withholding tax, discount and total due,
//! derived from a VAT-inclusive subtotal, plus payment allocation checks.
//!
//! All arithmetic is fixed-point `Decimal`; rounding happens only at the
//! display boundary (`Totals::rounded`), never mid-calculation.

pub mod payments;
pub mod totals;

pub use payments::{PaymentEntry, check_payment_allocation, derive_payment_status};
pub use totals::{Totals, compute_totals};
