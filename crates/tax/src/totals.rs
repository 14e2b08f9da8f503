use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fulcrum_core::{DomainError, DomainResult, ValueObject, round_display};
use fulcrum_documents::TaxConfig;

/// Monetary breakdown of an order total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// The VAT-inclusive subtotal the breakdown was derived from.
    pub subtotal_inclusive: Decimal,
    pub vat_amount: Decimal,
    pub net_of_vat: Decimal,
    pub withholding_tax: Decimal,
    pub total_due: Decimal,
}

impl Totals {
    /// Round every component to two decimals for display.
    pub fn rounded(&self) -> Self {
        Self {
            subtotal_inclusive: round_display(self.subtotal_inclusive),
            vat_amount: round_display(self.vat_amount),
            net_of_vat: round_display(self.net_of_vat),
            withholding_tax: round_display(self.withholding_tax),
            total_due: round_display(self.total_due),
        }
    }
}

impl ValueObject for Totals {}

/// Derive VAT, net-of-VAT, withholding tax and total due from a VAT-inclusive
/// subtotal.
///
/// Quoted prices already include VAT, so the VAT share is extracted:
/// `vat = subtotal × rate / (1 + rate)`. The discount applies to the net
/// amount before VAT is re-added; withholding (on the net amount) is
/// subtracted last.
pub fn compute_totals(subtotal_inclusive: Decimal, config: &TaxConfig) -> DomainResult<Totals> {
    config.validate()?;
    if subtotal_inclusive < Decimal::ZERO {
        return Err(DomainError::validation("subtotal cannot be negative"));
    }

    let vat_amount = subtotal_inclusive * config.vat_rate / (Decimal::ONE + config.vat_rate);
    let net_of_vat = subtotal_inclusive - vat_amount;
    let withholding_tax = if config.withholding_enabled {
        net_of_vat * config.withholding_rate
    } else {
        Decimal::ZERO
    };
    let total_due = net_of_vat - config.discount + vat_amount - withholding_tax;

    Ok(Totals {
        subtotal_inclusive,
        vat_amount,
        net_of_vat,
        withholding_tax,
        total_due,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn config(vat: Decimal, discount: Decimal, withholding: Option<Decimal>) -> TaxConfig {
        TaxConfig {
            vat_rate: vat,
            discount,
            withholding_enabled: withholding.is_some(),
            withholding_rate: withholding.unwrap_or(dec!(0.02)),
        }
    }

    #[test]
    fn standard_vat_and_withholding_breakdown() {
        let totals = compute_totals(
            dec!(1120.00),
            &config(dec!(0.12), Decimal::ZERO, Some(dec!(0.02))),
        )
        .unwrap()
        .rounded();
        assert_eq!(totals.vat_amount, dec!(120.00));
        assert_eq!(totals.net_of_vat, dec!(1000.00));
        assert_eq!(totals.withholding_tax, dec!(20.00));
        assert_eq!(totals.total_due, dec!(1100.00));
    }

    #[test]
    fn discount_reduces_total_before_withholding() {
        let totals = compute_totals(
            dec!(1120.00),
            &config(dec!(0.12), dec!(100), None),
        )
        .unwrap()
        .rounded();
        assert_eq!(totals.withholding_tax, dec!(0.00));
        assert_eq!(totals.total_due, dec!(1020.00));
    }

    #[test]
    fn zero_vat_rate_passes_subtotal_through() {
        let totals =
            compute_totals(dec!(500), &config(Decimal::ZERO, Decimal::ZERO, None)).unwrap();
        assert_eq!(totals.vat_amount, Decimal::ZERO);
        assert_eq!(totals.net_of_vat, dec!(500));
        assert_eq!(totals.total_due, dec!(500));
    }

    #[test]
    fn negative_subtotal_is_rejected() {
        let err =
            compute_totals(dec!(-1), &config(dec!(0.12), Decimal::ZERO, None)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// With no discount and no withholding, `net + vat` re-derives
            /// the original subtotal within a display-rounding epsilon.
            #[test]
            fn subtotal_round_trips(cents in 0i64..10_000_000, vat_bp in 0u32..5000) {
                let subtotal = Decimal::new(cents, 2);
                let cfg = config(Decimal::new(vat_bp as i64, 4), Decimal::ZERO, None);
                let totals = compute_totals(subtotal, &cfg).unwrap();
                let rederived = totals.net_of_vat + totals.vat_amount;
                let diff = (rederived - subtotal).abs();
                prop_assert!(diff <= dec!(0.01), "diff was {diff}");
                prop_assert_eq!(totals.total_due, subtotal);
            }
        }
    }
}
