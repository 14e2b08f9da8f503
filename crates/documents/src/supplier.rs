use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fulcrum_core::{CatalogEntryId, DomainError, DomainResult, ProductId, SupplierId};

/// One supplier's current price for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierPriceEntry {
    pub product_id: ProductId,
    pub supplier_id: SupplierId,
    pub supplier_name: String,
    pub price: Decimal,
    /// Set when this price is backed by a persisted catalog row; a price
    /// update then writes back to the catalog instead of applying to the
    /// current document only.
    pub catalog_entry_id: Option<CatalogEntryId>,
}

impl SupplierPriceEntry {
    pub fn new(
        product_id: ProductId,
        supplier_id: SupplierId,
        supplier_name: impl Into<String>,
        price: Decimal,
        catalog_entry_id: Option<CatalogEntryId>,
    ) -> DomainResult<Self> {
        if price <= Decimal::ZERO {
            return Err(DomainError::validation("supplier price must be positive"));
        }
        Ok(Self {
            product_id,
            supplier_id,
            supplier_name: supplier_name.into(),
            price,
            catalog_entry_id,
        })
    }
}
