use std::collections::BTreeMap;

use fulcrum_core::{DeliveryId, OrderId, ProductId, StoreError, StoreResult};
use fulcrum_documents::{DeliveryDocument, FulfillmentLink, Order, SupplierPriceEntry};
use fulcrum_ledger::{DeliveryMeta, OrderSnapshot};
use fulcrum_staging::CommitStore;

/// Full persistent-store contract.
///
/// Extends the commit seam with the read side and document-level writes.
/// Every call can fail; failures are surfaced verbatim to the caller. The
/// engine issues these synchronously and never retries on its own.
pub trait ProcurementStore: CommitStore {
    fn order(&self, id: OrderId) -> StoreResult<Order>;
    fn delivery(&self, id: DeliveryId) -> StoreResult<DeliveryDocument>;
    fn deliveries_for_order(&self, id: OrderId) -> StoreResult<Vec<DeliveryDocument>>;
    fn links_for_order(&self, id: OrderId) -> StoreResult<Vec<FulfillmentLink>>;
    fn links_for_delivery(&self, id: DeliveryId) -> StoreResult<Vec<FulfillmentLink>>;
    fn supplier_prices(&self, product_id: ProductId) -> StoreResult<Vec<SupplierPriceEntry>>;

    fn create_order(&self, order: Order) -> StoreResult<()>;
    /// Deletes the order, its lines and their fulfillment links.
    fn delete_order(&self, id: OrderId) -> StoreResult<()>;
    /// Rejected with [`StoreError::DuplicateReceiptNumber`] when the receipt
    /// number is already taken by another delivery document.
    fn create_delivery(&self, delivery: DeliveryDocument) -> StoreResult<()>;
    fn create_fulfillment_link(&self, link: FulfillmentLink) -> StoreResult<()>;
}

/// Assemble the point-in-time snapshot that feeds the ledger, the matcher and
/// staged-commit validation.
///
/// This is a plain sequence of reads; the store may move on between this
/// snapshot and a later commit. A read failure aborts the whole assembly.
pub fn load_order_snapshot(
    store: &dyn ProcurementStore,
    order_id: OrderId,
) -> StoreResult<OrderSnapshot> {
    let order = store.order(order_id)?;
    let links = store.links_for_order(order_id)?;

    let mut deliveries: BTreeMap<DeliveryId, DeliveryMeta> = BTreeMap::new();
    for delivery in store.deliveries_for_order(order_id)? {
        deliveries.insert(
            delivery.id,
            DeliveryMeta {
                receipt_no: delivery.receipt_no.clone(),
                delivered_at: delivery.delivered_at,
            },
        );
    }

    // Links can reference deliveries recorded against no order (or another
    // order); fetch those individually so the ledger sees their dates.
    for link in &links {
        if deliveries.contains_key(&link.delivery_id) {
            continue;
        }
        match store.delivery(link.delivery_id) {
            Ok(delivery) => {
                deliveries.insert(
                    delivery.id,
                    DeliveryMeta {
                        receipt_no: delivery.receipt_no.clone(),
                        delivered_at: delivery.delivered_at,
                    },
                );
            }
            // A dangling link is a consistency wart, not a hard failure; the
            // ledger falls back to the link's own creation date.
            Err(StoreError::NotFound(_)) => {
                tracing::warn!(
                    link = %link.id,
                    delivery = %link.delivery_id,
                    "fulfillment link references a missing delivery document"
                );
            }
            Err(err) => return Err(err),
        }
    }

    Ok(OrderSnapshot::new(order, links, deliveries))
}
