use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fulcrum_core::{DomainError, DomainResult};
use fulcrum_documents::PaymentStatus;

/// A proposed payment against an order total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEntry {
    pub amount: Decimal,
    pub label: String,
    pub paid_at: DateTime<Utc>,
}

/// Validate a set of proposed payments against the total due.
///
/// The running paid total may exceed `total_due` by at most `epsilon`
/// (tolerating display-precision rounding); anything beyond that is a
/// validation failure naming the offending entry — never a silent clamp.
/// Returns the total paid on success.
pub fn check_payment_allocation(
    entries: &[PaymentEntry],
    total_due: Decimal,
    epsilon: Decimal,
) -> DomainResult<Decimal> {
    let mut paid = Decimal::ZERO;
    for entry in entries {
        if entry.amount <= Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "payment '{}' must have a positive amount",
                entry.label
            )));
        }
        paid += entry.amount;
        if paid > total_due + epsilon {
            return Err(DomainError::validation(format!(
                "payment '{}' brings the total paid to {paid}, exceeding the total due {total_due}",
                entry.label
            )));
        }
    }
    Ok(paid)
}

/// Derive the stored payment status from the paid total.
pub fn derive_payment_status(paid: Decimal, total_due: Decimal, epsilon: Decimal) -> PaymentStatus {
    if paid <= Decimal::ZERO {
        PaymentStatus::Unpaid
    } else if paid + epsilon >= total_due {
        PaymentStatus::Paid
    } else {
        PaymentStatus::Partial
    }
}
