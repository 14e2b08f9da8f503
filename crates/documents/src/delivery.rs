use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fulcrum_core::{
    DeliveryId, DeliveryLineId, DomainError, DomainResult, Entity, OrderId, ProductId, SupplierId,
};

/// A single line on a delivery document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryLine {
    pub id: DeliveryLineId,
    pub delivery_id: DeliveryId,
    pub product_id: Option<ProductId>,
    pub quantity: u32,
    pub unit_price: Option<Decimal>,
}

impl DeliveryLine {
    pub fn new(
        id: DeliveryLineId,
        delivery_id: DeliveryId,
        product_id: Option<ProductId>,
        quantity: u32,
        unit_price: Option<Decimal>,
    ) -> DomainResult<Self> {
        if quantity == 0 {
            return Err(DomainError::validation("delivered quantity must be positive"));
        }
        if let Some(price) = unit_price {
            if price < Decimal::ZERO {
                return Err(DomainError::validation("unit price cannot be negative"));
            }
        }
        Ok(Self {
            id,
            delivery_id,
            product_id,
            quantity,
            unit_price,
        })
    }
}

impl Entity for DeliveryLine {
    type Id = DeliveryLineId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A delivery receipt document recording goods physically received, possibly
/// against an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryDocument {
    pub id: DeliveryId,
    pub order_id: Option<OrderId>,
    /// Normalized receipt number: trimmed, `None` when blank. Unique across
    /// all delivery documents when present.
    pub receipt_no: Option<String>,
    pub delivered_at: DateTime<Utc>,
    pub supplier_id: Option<SupplierId>,
    pub notes: String,
    pub lines: Vec<DeliveryLine>,
}

impl DeliveryDocument {
    pub fn new(
        id: DeliveryId,
        order_id: Option<OrderId>,
        receipt_no: Option<&str>,
        delivered_at: DateTime<Utc>,
        lines: Vec<DeliveryLine>,
    ) -> DomainResult<Self> {
        for line in &lines {
            if line.delivery_id != id {
                return Err(DomainError::invariant("line references a different delivery"));
            }
        }
        Ok(Self {
            id,
            order_id,
            receipt_no: receipt_no.and_then(normalize_receipt_no),
            delivered_at,
            supplier_id: None,
            notes: String::new(),
            lines,
        })
    }

    pub fn line(&self, id: DeliveryLineId) -> Option<&DeliveryLine> {
        self.lines.iter().find(|l| l.id == id)
    }
}

impl Entity for DeliveryDocument {
    type Id = DeliveryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Trim a raw receipt number; blank input means "no receipt number".
pub fn normalize_receipt_no(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// Receipt numbers are compared case-sensitively on their trimmed form.
pub fn ensure_unique_receipt_no<'a>(
    candidate: &str,
    existing: impl IntoIterator<Item = &'a str>,
) -> DomainResult<()> {
    let Some(candidate) = normalize_receipt_no(candidate) else {
        // Blank receipt numbers are allowed and never collide.
        return Ok(());
    };
    for other in existing {
        if other.trim() == candidate {
            return Err(DomainError::validation(format!(
                "duplicate receipt number: {candidate}"
            )));
        }
    }
    Ok(())
}
