use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fulcrum_core::{DeliveryId, DeliveryLineId, OrderLineId};
use fulcrum_documents::{FulfillmentLink, Order};

use crate::reconcile::{
    LineReconciliation, LineStatus, LinkedFulfillment, OrderStatus, order_status, reconcile,
};

/// Delivery document metadata the ledger needs when joining links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryMeta {
    pub receipt_no: Option<String>,
    pub delivered_at: DateTime<Utc>,
}

/// Point-in-time view of one order: the order with its lines, every
/// fulfillment link touching it, and the metadata of the deliveries those
/// links came from.
///
/// Assembled from the persistent store in one read pass; the engine never
/// guarantees the persisted state has not moved on between snapshot and
/// commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub order: Order,
    pub links: Vec<FulfillmentLink>,
    pub deliveries: BTreeMap<DeliveryId, DeliveryMeta>,
}

impl OrderSnapshot {
    pub fn new(
        order: Order,
        links: Vec<FulfillmentLink>,
        deliveries: BTreeMap<DeliveryId, DeliveryMeta>,
    ) -> Self {
        Self {
            order,
            links,
            deliveries,
        }
    }

    /// Ledger inputs for one order line.
    ///
    /// Links whose delivery document is missing from the snapshot fall back
    /// to the link's own creation date and carry no receipt label.
    pub fn linked_fulfillments(&self, line_id: OrderLineId) -> Vec<LinkedFulfillment> {
        self.links
            .iter()
            .filter(|l| l.order_line_id == line_id)
            .map(|l| {
                let meta = self.deliveries.get(&l.delivery_id);
                LinkedFulfillment {
                    link_id: l.id,
                    delivery_id: l.delivery_id,
                    delivery_line_id: l.delivery_line_id,
                    quantity: l.quantity,
                    receipt_no: meta.and_then(|m| m.receipt_no.clone()),
                    delivered_at: meta.map(|m| m.delivered_at).unwrap_or(l.created_at),
                }
            })
            .collect()
    }

    pub fn reconcile_line(&self, line_id: OrderLineId) -> Option<LineReconciliation> {
        let line = self.order.line(line_id)?;
        Some(reconcile(line, &self.linked_fulfillments(line_id)))
    }

    pub fn line_status(&self, line_id: OrderLineId) -> Option<LineStatus> {
        self.reconcile_line(line_id).map(|r| r.status)
    }

    /// Remaining (undelivered) quantity for one line.
    pub fn remaining_for(&self, line_id: OrderLineId) -> Option<u32> {
        self.reconcile_line(line_id).map(|r| r.remaining_quantity)
    }

    pub fn order_status(&self) -> OrderStatus {
        order_status(
            self.order
                .lines
                .iter()
                .map(|l| reconcile(l, &self.linked_fulfillments(l.id)).status),
        )
    }

    /// How much of each delivery line is already consumed by existing links,
    /// across the whole snapshot. Seeds the matcher's consumption counters.
    pub fn linked_quantity_by_delivery_line(&self) -> HashMap<DeliveryLineId, u32> {
        let mut consumed: HashMap<DeliveryLineId, u32> = HashMap::new();
        for link in &self.links {
            *consumed.entry(link.delivery_line_id).or_insert(0) += link.quantity;
        }
        consumed
    }
}
