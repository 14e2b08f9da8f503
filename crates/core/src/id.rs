//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

macro_rules! impl_uuid_id {
    ($(#[$doc:meta])* $t:ident, $name:literal) => {
        $(#[$doc])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(Uuid);

        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
            /// for determinism.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::from_str(s)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(uuid))
            }
        }
    };
}

impl_uuid_id!(
    /// Identifier of a purchase order.
    OrderId,
    "OrderId"
);
impl_uuid_id!(
    /// Identifier of a single line on a purchase order.
    OrderLineId,
    "OrderLineId"
);
impl_uuid_id!(
    /// Identifier of a delivery receipt document.
    DeliveryId,
    "DeliveryId"
);
impl_uuid_id!(
    /// Identifier of a single line on a delivery document.
    DeliveryLineId,
    "DeliveryLineId"
);
impl_uuid_id!(
    /// Identifier of a fulfillment link (delivery line -> order line).
    FulfillmentLinkId,
    "FulfillmentLinkId"
);
impl_uuid_id!(
    /// Identifier of a product in the catalog.
    ProductId,
    "ProductId"
);
impl_uuid_id!(
    /// Identifier of a supplier (counterparty).
    SupplierId,
    "SupplierId"
);
impl_uuid_id!(
    /// Identifier of a product-supplier catalog relationship.
    ///
    /// Present on a price entry when the price is backed by a persisted catalog
    /// row (so a price update can be written back); absent for ad-hoc prices
    /// that apply to the current document only.
    CatalogEntryId,
    "CatalogEntryId"
);
