use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use fulcrum_core::{DomainError, DomainResult, ValueObject};

/// Structured tax/discount configuration carried on an order.
///
/// This is an explicit field, not something re-derived from free-text notes;
/// the notes on an order are opaque user content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxConfig {
    /// VAT rate as a fraction (e.g. 0.12). Quoted prices are VAT-inclusive.
    pub vat_rate: Decimal,
    /// Absolute discount applied to the net-of-VAT amount.
    pub discount: Decimal,
    pub withholding_enabled: bool,
    /// Withholding tax rate as a fraction of the net-of-VAT amount.
    pub withholding_rate: Decimal,
}

impl TaxConfig {
    pub fn validate(&self) -> DomainResult<()> {
        if self.vat_rate < Decimal::ZERO || self.vat_rate >= Decimal::ONE {
            return Err(DomainError::validation(
                "vat rate must be within [0, 1)",
            ));
        }
        if self.withholding_rate < Decimal::ZERO || self.withholding_rate >= Decimal::ONE {
            return Err(DomainError::validation(
                "withholding rate must be within [0, 1)",
            ));
        }
        if self.discount < Decimal::ZERO {
            return Err(DomainError::validation("discount cannot be negative"));
        }
        Ok(())
    }
}

impl Default for TaxConfig {
    fn default() -> Self {
        // Standard VAT and expanded withholding rates for goods.
        Self {
            vat_rate: dec!(0.12),
            discount: Decimal::ZERO,
            withholding_enabled: false,
            withholding_rate: dec!(0.02),
        }
    }
}

impl ValueObject for TaxConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        TaxConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_out_of_range_rates() {
        let cfg = TaxConfig {
            vat_rate: Decimal::ONE,
            ..TaxConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = TaxConfig {
            discount: dec!(-1),
            ..TaxConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
