//! Quantity ledger: derives delivered/remaining quantities and statuses from
//! fulfillment links.
//!
//! Pure computation over supplied inputs — callers are responsible for
//! supplying a consistent snapshot of links (see [`snapshot::OrderSnapshot`]).

pub mod reconcile;
pub mod snapshot;

pub use reconcile::{
    BreakdownSlice, LedgerWarning, LineReconciliation, LineStatus, LinkedFulfillment, OrderStatus,
    order_status, reconcile,
};
pub use snapshot::{DeliveryMeta, OrderSnapshot};
