//! Procurement documents data model.
//!
//! This crate contains the record types the engine operates on: purchase
//! orders with their lines, delivery documents with their lines, the
//! fulfillment links tying the two together, and supplier price entries.
//! Pure data + validation; no IO, no HTTP, no storage.

pub mod delivery;
pub mod fulfillment;
pub mod order;
pub mod supplier;
pub mod tax_config;

pub use delivery::{DeliveryDocument, DeliveryLine, ensure_unique_receipt_no, normalize_receipt_no};
pub use fulfillment::FulfillmentLink;
pub use order::{LinePatch, Order, OrderLine, OrderPatch, PaymentStatus};
pub use supplier::SupplierPriceEntry;
pub use tax_config::TaxConfig;
