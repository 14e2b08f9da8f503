use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fulcrum_core::{DomainError, DomainResult, Entity, OrderId, OrderLineId, ProductId, SupplierId};

use crate::tax_config::TaxConfig;

/// Payment lifecycle of an order (stored; unlike delivery status, which is
/// always derived from fulfillment links).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
}

/// A single line on a purchase order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    /// Catalog product, when known. Lines without a product cannot be
    /// auto-matched against deliveries or optimized against supplier prices.
    pub product_id: Option<ProductId>,
    /// Display label ("model").
    pub model: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl OrderLine {
    pub fn new(
        id: OrderLineId,
        order_id: OrderId,
        product_id: Option<ProductId>,
        model: impl Into<String>,
        quantity: u32,
        unit_price: Decimal,
    ) -> DomainResult<Self> {
        if quantity == 0 {
            return Err(DomainError::validation("line quantity must be positive"));
        }
        if unit_price < Decimal::ZERO {
            return Err(DomainError::validation("unit price cannot be negative"));
        }
        Ok(Self {
            id,
            order_id,
            product_id,
            model: model.into(),
            quantity,
            unit_price,
        })
    }

    /// Derived line total: quantity × unit price.
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    /// Apply a patch, returning the updated line.
    pub fn patched(&self, patch: &LinePatch) -> DomainResult<Self> {
        let mut updated = self.clone();
        if let Some(product_id) = patch.product_id {
            updated.product_id = Some(product_id);
        }
        if let Some(model) = &patch.model {
            updated.model = model.clone();
        }
        if let Some(quantity) = patch.quantity {
            if quantity == 0 {
                return Err(DomainError::validation("line quantity must be positive"));
            }
            updated.quantity = quantity;
        }
        if let Some(unit_price) = patch.unit_price {
            if unit_price < Decimal::ZERO {
                return Err(DomainError::validation("unit price cannot be negative"));
            }
            updated.unit_price = unit_price;
        }
        Ok(updated)
    }
}

impl Entity for OrderLine {
    type Id = OrderLineId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Partial update for an order line (unset fields are left untouched).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinePatch {
    pub product_id: Option<ProductId>,
    pub model: Option<String>,
    pub quantity: Option<u32>,
    pub unit_price: Option<Decimal>,
}

impl LinePatch {
    pub fn is_empty(&self) -> bool {
        self.product_id.is_none()
            && self.model.is_none()
            && self.quantity.is_none()
            && self.unit_price.is_none()
    }

    /// Whether the patch touches fields that are frozen once any quantity on
    /// the line has been fulfilled (product and price identify what was
    /// physically received and at what cost).
    pub fn touches_frozen_fields(&self) -> bool {
        self.product_id.is_some() || self.unit_price.is_some()
    }
}

/// A purchase order. Owns a non-empty ordered collection of lines.
///
/// Delivery status is never stored here: it is derived from fulfillment links
/// by the quantity ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub supplier_id: SupplierId,
    pub created_at: DateTime<Utc>,
    pub expected_delivery: Option<DateTime<Utc>>,
    /// Opaque user content. Tax settings live in `tax`, never in here.
    pub notes: String,
    pub payment_status: PaymentStatus,
    pub tax: TaxConfig,
    pub lines: Vec<OrderLine>,
}

impl Order {
    pub fn new(
        id: OrderId,
        supplier_id: SupplierId,
        created_at: DateTime<Utc>,
        lines: Vec<OrderLine>,
    ) -> DomainResult<Self> {
        if lines.is_empty() {
            return Err(DomainError::validation("an order must have at least one line"));
        }
        for line in &lines {
            if line.order_id != id {
                return Err(DomainError::invariant("line references a different order"));
            }
        }
        Ok(Self {
            id,
            supplier_id,
            created_at,
            expected_delivery: None,
            notes: String::new(),
            payment_status: PaymentStatus::Unpaid,
            tax: TaxConfig::default(),
            lines,
        })
    }

    pub fn line(&self, id: OrderLineId) -> Option<&OrderLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    /// VAT-inclusive subtotal across all lines.
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(OrderLine::line_total).sum()
    }

    pub fn apply_patch(&mut self, patch: &OrderPatch) {
        if let Some(notes) = &patch.notes {
            self.notes = notes.clone();
        }
        if let Some(expected) = patch.expected_delivery {
            self.expected_delivery = Some(expected);
        }
        if let Some(status) = patch.payment_status {
            self.payment_status = status;
        }
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Partial update for order-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderPatch {
    pub notes: Option<String>,
    pub expected_delivery: Option<DateTime<Utc>>,
    pub payment_status: Option<PaymentStatus>,
}

impl OrderPatch {
    pub fn is_empty(&self) -> bool {
        self.notes.is_none() && self.expected_delivery.is_none() && self.payment_status.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(order_id: OrderId, quantity: u32, unit_price: Decimal) -> OrderLine {
        OrderLine::new(OrderLineId::new(), order_id, None, "X-100", quantity, unit_price).unwrap()
    }

    #[test]
    fn order_requires_at_least_one_line() {
        let err = Order::new(OrderId::new(), SupplierId::new(), Utc::now(), vec![]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn line_total_is_quantity_times_price() {
        let l = line(OrderId::new(), 3, dec!(19.99));
        assert_eq!(l.line_total(), dec!(59.97));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let err =
            OrderLine::new(OrderLineId::new(), OrderId::new(), None, "X", 0, dec!(1)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn patch_rejects_invalid_values() {
        let l = line(OrderId::new(), 5, dec!(10));
        let err = l
            .patched(&LinePatch {
                quantity: Some(0),
                ..LinePatch::default()
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let patched = l
            .patched(&LinePatch {
                quantity: Some(7),
                unit_price: Some(dec!(9.50)),
                ..LinePatch::default()
            })
            .unwrap();
        assert_eq!(patched.quantity, 7);
        assert_eq!(patched.unit_price, dec!(9.50));
        assert_eq!(patched.model, "X-100");
    }

    #[test]
    fn subtotal_sums_line_totals() {
        let order_id = OrderId::new();
        let order = Order::new(
            order_id,
            SupplierId::new(),
            Utc::now(),
            vec![line(order_id, 2, dec!(100)), line(order_id, 1, dec!(50.25))],
        )
        .unwrap();
        assert_eq!(order.subtotal(), dec!(250.25));
    }
}
