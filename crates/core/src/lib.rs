//! `fulcrum-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! strongly-typed identifiers, the error taxonomy shared by all engine
//! components, and fixed-point money helpers.

pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult, StoreError, StoreResult};
pub use id::{
    CatalogEntryId, DeliveryId, DeliveryLineId, FulfillmentLinkId, OrderId, OrderLineId,
    ProductId, SupplierId,
};
pub use money::{DEFAULT_PAYMENT_EPSILON, round_display};
pub use value_object::ValueObject;
