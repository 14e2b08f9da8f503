use std::collections::HashMap;
use std::sync::RwLock;

use fulcrum_core::{
    DeliveryId, FulfillmentLinkId, OrderId, OrderLineId, ProductId, StoreError, StoreResult,
};
use fulcrum_documents::{
    DeliveryDocument, FulfillmentLink, Order, OrderLine, OrderPatch, SupplierPriceEntry,
    TaxConfig, ensure_unique_receipt_no,
};
use fulcrum_staging::CommitStore;

use crate::store::ProcurementStore;

/// In-memory procurement store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    orders: RwLock<HashMap<OrderId, Order>>,
    deliveries: RwLock<HashMap<DeliveryId, DeliveryDocument>>,
    links: RwLock<HashMap<FulfillmentLinkId, FulfillmentLink>>,
    prices: RwLock<Vec<SupplierPriceEntry>>,
}

fn poisoned(_: impl core::fmt::Debug) -> StoreError {
    StoreError::backend("lock poisoned")
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_supplier_price(&self, entry: SupplierPriceEntry) -> StoreResult<()> {
        self.prices.write().map_err(poisoned)?.push(entry);
        Ok(())
    }
}

impl CommitStore for InMemoryStore {
    fn create_order_line(&self, line: OrderLine) -> StoreResult<()> {
        let mut orders = self.orders.write().map_err(poisoned)?;
        let order = orders
            .get_mut(&line.order_id)
            .ok_or_else(|| StoreError::not_found(format!("order {}", line.order_id)))?;
        if order.lines.iter().any(|l| l.id == line.id) {
            return Err(StoreError::conflict(format!("line {} already exists", line.id)));
        }
        order.lines.push(line);
        Ok(())
    }

    fn update_order_line(&self, line: OrderLine) -> StoreResult<()> {
        let mut orders = self.orders.write().map_err(poisoned)?;
        let order = orders
            .get_mut(&line.order_id)
            .ok_or_else(|| StoreError::not_found(format!("order {}", line.order_id)))?;
        let slot = order
            .lines
            .iter_mut()
            .find(|l| l.id == line.id)
            .ok_or_else(|| StoreError::not_found(format!("order line {}", line.id)))?;
        *slot = line;
        Ok(())
    }

    fn delete_order_line(&self, id: OrderLineId) -> StoreResult<()> {
        let mut orders = self.orders.write().map_err(poisoned)?;
        for order in orders.values_mut() {
            if let Some(pos) = order.lines.iter().position(|l| l.id == id) {
                order.lines.remove(pos);
                return Ok(());
            }
        }
        Err(StoreError::not_found(format!("order line {id}")))
    }

    fn delete_fulfillment_link(&self, id: FulfillmentLinkId) -> StoreResult<()> {
        let mut links = self.links.write().map_err(poisoned)?;
        links
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(format!("fulfillment link {id}")))
    }

    fn update_order_metadata(&self, id: OrderId, patch: &OrderPatch) -> StoreResult<()> {
        let mut orders = self.orders.write().map_err(poisoned)?;
        let order = orders
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(format!("order {id}")))?;
        order.apply_patch(patch);
        Ok(())
    }

    fn update_tax_config(&self, id: OrderId, config: &TaxConfig) -> StoreResult<()> {
        let mut orders = self.orders.write().map_err(poisoned)?;
        let order = orders
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(format!("order {id}")))?;
        order.tax = config.clone();
        Ok(())
    }
}

impl ProcurementStore for InMemoryStore {
    fn order(&self, id: OrderId) -> StoreResult<Order> {
        self.orders
            .read()
            .map_err(poisoned)?
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("order {id}")))
    }

    fn delivery(&self, id: DeliveryId) -> StoreResult<DeliveryDocument> {
        self.deliveries
            .read()
            .map_err(poisoned)?
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("delivery {id}")))
    }

    fn deliveries_for_order(&self, id: OrderId) -> StoreResult<Vec<DeliveryDocument>> {
        let deliveries = self.deliveries.read().map_err(poisoned)?;
        let mut found: Vec<DeliveryDocument> = deliveries
            .values()
            .filter(|d| d.order_id == Some(id))
            .cloned()
            .collect();
        found.sort_by_key(|d| (d.delivered_at, d.id));
        Ok(found)
    }

    fn links_for_order(&self, id: OrderId) -> StoreResult<Vec<FulfillmentLink>> {
        let links = self.links.read().map_err(poisoned)?;
        let mut found: Vec<FulfillmentLink> =
            links.values().filter(|l| l.order_id == id).cloned().collect();
        found.sort_by_key(|l| (l.created_at, l.id));
        Ok(found)
    }

    fn links_for_delivery(&self, id: DeliveryId) -> StoreResult<Vec<FulfillmentLink>> {
        let links = self.links.read().map_err(poisoned)?;
        let mut found: Vec<FulfillmentLink> = links
            .values()
            .filter(|l| l.delivery_id == id)
            .cloned()
            .collect();
        found.sort_by_key(|l| (l.created_at, l.id));
        Ok(found)
    }

    fn supplier_prices(&self, product_id: ProductId) -> StoreResult<Vec<SupplierPriceEntry>> {
        Ok(self
            .prices
            .read()
            .map_err(poisoned)?
            .iter()
            .filter(|e| e.product_id == product_id)
            .cloned()
            .collect())
    }

    fn create_order(&self, order: Order) -> StoreResult<()> {
        let mut orders = self.orders.write().map_err(poisoned)?;
        if orders.contains_key(&order.id) {
            return Err(StoreError::conflict(format!("order {} already exists", order.id)));
        }
        orders.insert(order.id, order);
        Ok(())
    }

    fn delete_order(&self, id: OrderId) -> StoreResult<()> {
        let mut orders = self.orders.write().map_err(poisoned)?;
        orders
            .remove(&id)
            .ok_or_else(|| StoreError::not_found(format!("order {id}")))?;
        // Cascade to the order's fulfillment links.
        self.links
            .write()
            .map_err(poisoned)?
            .retain(|_, l| l.order_id != id);
        Ok(())
    }

    fn create_delivery(&self, delivery: DeliveryDocument) -> StoreResult<()> {
        let mut deliveries = self.deliveries.write().map_err(poisoned)?;
        if deliveries.contains_key(&delivery.id) {
            return Err(StoreError::conflict(format!(
                "delivery {} already exists",
                delivery.id
            )));
        }
        if let Some(receipt_no) = &delivery.receipt_no {
            let existing = deliveries
                .values()
                .filter_map(|d| d.receipt_no.as_deref());
            if ensure_unique_receipt_no(receipt_no, existing).is_err() {
                return Err(StoreError::DuplicateReceiptNumber(receipt_no.clone()));
            }
        }
        deliveries.insert(delivery.id, delivery);
        Ok(())
    }

    fn create_fulfillment_link(&self, link: FulfillmentLink) -> StoreResult<()> {
        let mut links = self.links.write().map_err(poisoned)?;
        if links.contains_key(&link.id) {
            return Err(StoreError::conflict(format!("link {} already exists", link.id)));
        }
        links.insert(link.id, link);
        Ok(())
    }
}
