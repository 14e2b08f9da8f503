use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fulcrum_core::{
    DeliveryId, DeliveryLineId, DomainError, DomainResult, Entity, FulfillmentLinkId, OrderId,
    OrderLineId,
};

/// The sole source of truth connecting deliveries to orders: a quantity from
/// one delivery line applied against one order line.
///
/// Created by the delivery matcher or by explicit user action; destroyed when
/// a user unlinks a delivered item. Aggregated across links, the fulfilled
/// quantity never exceeds either the delivery line's delivered quantity or the
/// order line's ordered quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentLink {
    pub id: FulfillmentLinkId,
    pub delivery_id: DeliveryId,
    pub delivery_line_id: DeliveryLineId,
    pub order_id: OrderId,
    pub order_line_id: OrderLineId,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
}

impl FulfillmentLink {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: FulfillmentLinkId,
        delivery_id: DeliveryId,
        delivery_line_id: DeliveryLineId,
        order_id: OrderId,
        order_line_id: OrderLineId,
        quantity: u32,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if quantity == 0 {
            return Err(DomainError::validation("fulfilled quantity must be positive"));
        }
        Ok(Self {
            id,
            delivery_id,
            delivery_line_id,
            order_id,
            order_line_id,
            quantity,
            created_at,
        })
    }
}

impl Entity for FulfillmentLink {
    type Id = FulfillmentLinkId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
