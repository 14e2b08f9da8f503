use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fulcrum_core::{DomainError, DomainResult, FulfillmentLinkId, OrderId, OrderLineId, ProductId};
use fulcrum_documents::{LinePatch, OrderPatch, TaxConfig};
use fulcrum_ledger::{LineStatus, OrderSnapshot};

/// Locally-generated identifier for a line that exists only in the pending
/// buffer. A distinct type from `OrderLineId`, so staged additions can never
/// be confused with persisted lines.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TempLineId(Uuid);

impl TempLineId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for TempLineId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for TempLineId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Target of a staged line operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LineKey {
    Persisted(OrderLineId),
    Temp(TempLineId),
}

/// A line staged for addition (no persisted identity yet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLine {
    pub product_id: Option<ProductId>,
    pub model: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl NewLine {
    fn validate(&self) -> DomainResult<()> {
        if self.quantity == 0 {
            return Err(DomainError::validation("line quantity must be positive"));
        }
        if self.unit_price < Decimal::ZERO {
            return Err(DomainError::validation("unit price cannot be negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) enum PendingOp {
    Add(NewLine),
    Modify(LinePatch),
    Delete,
}

/// Lifecycle of the pending buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StagingState {
    Clean,
    Dirty,
    Committing,
    Failed,
}

/// In-memory pending change-set for one order.
///
/// A plain value passed by the caller — no ambient singleton. Operations are
/// keyed by target line, so repeated edits collapse last-write-wins instead
/// of accumulating a history; an added line that is deleted before commit
/// vanishes entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    order_id: OrderId,
    state: StagingState,
    pub(crate) line_ops: BTreeMap<LineKey, PendingOp>,
    pub(crate) unlinks: BTreeSet<FulfillmentLinkId>,
    pub(crate) order_patch: Option<OrderPatch>,
    pub(crate) tax_config: Option<TaxConfig>,
}

impl ChangeSet {
    pub fn new(order_id: OrderId) -> Self {
        Self {
            order_id,
            state: StagingState::Clean,
            line_ops: BTreeMap::new(),
            unlinks: BTreeSet::new(),
            order_patch: None,
            tax_config: None,
        }
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn state(&self) -> StagingState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.state == StagingState::Dirty
    }

    pub(crate) fn set_state(&mut self, state: StagingState) {
        self.state = state;
    }

    fn mark_dirty(&mut self) {
        if self.state == StagingState::Clean {
            self.state = StagingState::Dirty;
        }
    }

    fn ensure_mutable(&self) -> DomainResult<()> {
        match self.state {
            StagingState::Clean | StagingState::Dirty => Ok(()),
            StagingState::Committing | StagingState::Failed => Err(DomainError::invariant(
                "change set is no longer accepting edits",
            )),
        }
    }

    /// Stage a new line; returns its temporary identifier.
    pub fn stage_add(&mut self, line: NewLine) -> DomainResult<TempLineId> {
        self.ensure_mutable()?;
        line.validate()?;
        let temp_id = TempLineId::new();
        self.line_ops.insert(LineKey::Temp(temp_id), PendingOp::Add(line));
        self.mark_dirty();
        Ok(temp_id)
    }

    /// Stage a modification. Last write wins: a second patch on the same line
    /// replaces the first. Patching a staged addition folds the patch into
    /// the pending `Add`.
    pub fn stage_modify(&mut self, key: LineKey, patch: LinePatch) -> DomainResult<()> {
        self.ensure_mutable()?;
        if patch.is_empty() {
            return Err(DomainError::validation("patch contains no changes"));
        }
        match (key, self.line_ops.get_mut(&key)) {
            (_, Some(PendingOp::Delete)) => {
                return Err(DomainError::validation(
                    "line is staged for deletion and cannot be modified",
                ));
            }
            (LineKey::Temp(_), Some(PendingOp::Add(pending))) => {
                if let Some(product_id) = patch.product_id {
                    pending.product_id = Some(product_id);
                }
                if let Some(model) = patch.model {
                    pending.model = model;
                }
                if let Some(quantity) = patch.quantity {
                    pending.quantity = quantity;
                }
                if let Some(unit_price) = patch.unit_price {
                    pending.unit_price = unit_price;
                }
                pending.validate()?;
            }
            (LineKey::Temp(_), _) => {
                return Err(DomainError::validation("unknown staged line"));
            }
            (LineKey::Persisted(_), _) => {
                self.line_ops.insert(key, PendingOp::Modify(patch));
            }
        }
        self.mark_dirty();
        Ok(())
    }

    /// Stage a deletion. Deleting a staged addition cancels it outright —
    /// the commit will issue no store call for that line at all.
    pub fn stage_delete(&mut self, key: LineKey) -> DomainResult<()> {
        self.ensure_mutable()?;
        match key {
            LineKey::Temp(_) => {
                if self.line_ops.remove(&key).is_none() {
                    return Err(DomainError::validation("unknown staged line"));
                }
            }
            LineKey::Persisted(_) => {
                self.line_ops.insert(key, PendingOp::Delete);
            }
        }
        self.mark_dirty();
        Ok(())
    }

    /// Stage removal of a fulfillment link (an "unlink" of a delivered item).
    pub fn stage_unlink(&mut self, link_id: FulfillmentLinkId) -> DomainResult<()> {
        self.ensure_mutable()?;
        self.unlinks.insert(link_id);
        self.mark_dirty();
        Ok(())
    }

    /// Stage order-level metadata changes (replaces any earlier staged patch).
    pub fn stage_order_patch(&mut self, patch: OrderPatch) -> DomainResult<()> {
        self.ensure_mutable()?;
        if patch.is_empty() {
            return Err(DomainError::validation("patch contains no changes"));
        }
        self.order_patch = Some(patch);
        self.mark_dirty();
        Ok(())
    }

    /// Stage a new tax/discount configuration for the order.
    pub fn stage_tax_config(&mut self, config: TaxConfig) -> DomainResult<()> {
        self.ensure_mutable()?;
        config.validate()?;
        self.tax_config = Some(config);
        self.mark_dirty();
        Ok(())
    }

    /// Drop every pending change and return to `Clean`. Allowed at any point
    /// before commit begins.
    pub fn discard(&mut self) {
        self.line_ops.clear();
        self.unlinks.clear();
        self.order_patch = None;
        self.tax_config = None;
        self.state = StagingState::Clean;
    }

    pub(crate) fn clear_on_success(&mut self) {
        self.line_ops.clear();
        self.unlinks.clear();
        self.order_patch = None;
        self.tax_config = None;
        self.state = StagingState::Clean;
    }

    /// Validate the whole buffer against a reconciled snapshot, before any
    /// store mutation.
    ///
    /// Only the pending portion of a line is mutable: delivered lines reject
    /// quantity/price/product edits, price and product freeze as soon as any
    /// quantity is fulfilled, and quantity can never drop below the fulfilled
    /// amount. Deleting a line with recorded deliveries requires unlinking
    /// them in the same change-set.
    pub fn validate(&self, snapshot: &OrderSnapshot) -> DomainResult<()> {
        if snapshot.order.id != self.order_id {
            return Err(DomainError::invariant(
                "snapshot does not belong to the staged order",
            ));
        }

        for (key, op) in &self.line_ops {
            let LineKey::Persisted(line_id) = key else {
                continue;
            };
            let line = snapshot
                .order
                .line(*line_id)
                .ok_or_else(|| DomainError::validation("staged line no longer exists"))?;
            let reconciled = snapshot
                .reconcile_line(*line_id)
                .ok_or_else(|| DomainError::validation("staged line no longer exists"))?;

            // Fulfillment that this change-set unlinks no longer counts
            // against the edit.
            let unlinked: u32 = snapshot
                .links
                .iter()
                .filter(|l| l.order_line_id == *line_id && self.unlinks.contains(&l.id))
                .map(|l| l.quantity)
                .sum();
            let fulfilled = reconciled.fulfilled_quantity.saturating_sub(unlinked);
            let status = if fulfilled == 0 {
                LineStatus::Pending
            } else if fulfilled >= line.quantity {
                LineStatus::Delivered
            } else {
                LineStatus::Partial
            };

            match op {
                PendingOp::Delete => {
                    if fulfilled > 0 {
                        return Err(DomainError::validation(format!(
                            "line '{}' has recorded deliveries; unlink them before deleting",
                            line.model
                        )));
                    }
                }
                PendingOp::Modify(patch) => {
                    if status == LineStatus::Delivered {
                        return Err(DomainError::validation(format!(
                            "line '{}' is fully delivered and cannot be modified",
                            line.model
                        )));
                    }
                    if fulfilled > 0 && patch.touches_frozen_fields() {
                        return Err(DomainError::validation(format!(
                            "line '{}' has deliveries; price and product are frozen",
                            line.model
                        )));
                    }
                    if let Some(quantity) = patch.quantity {
                        if quantity < fulfilled {
                            return Err(DomainError::validation(format!(
                                "line '{}': quantity {} is below the fulfilled quantity {}",
                                line.model, quantity, fulfilled
                            )));
                        }
                    }
                    // Surface malformed patch values here, before commit.
                    line.patched(patch)?;
                }
                PendingOp::Add(_) => {}
            }
        }

        for link_id in &self.unlinks {
            if !snapshot.links.iter().any(|l| l.id == *link_id) {
                return Err(DomainError::validation(
                    "staged unlink references an unknown fulfillment link",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn new_line(quantity: u32, price: Decimal) -> NewLine {
        NewLine {
            product_id: None,
            model: "M-1".to_owned(),
            quantity,
            unit_price: price,
        }
    }

    #[test]
    fn add_then_delete_cancels_out() {
        let mut cs = ChangeSet::new(OrderId::new());
        let temp = cs.stage_add(new_line(3, dec!(10))).unwrap();
        assert!(cs.is_dirty());
        cs.stage_delete(LineKey::Temp(temp)).unwrap();
        assert!(cs.line_ops.is_empty());
    }

    #[test]
    fn repeated_modifies_collapse_to_the_latest_patch() {
        let mut cs = ChangeSet::new(OrderId::new());
        let key = LineKey::Persisted(OrderLineId::new());
        cs.stage_modify(
            key,
            LinePatch {
                quantity: Some(5),
                ..LinePatch::default()
            },
        )
        .unwrap();
        cs.stage_modify(
            key,
            LinePatch {
                quantity: Some(8),
                ..LinePatch::default()
            },
        )
        .unwrap();
        assert_eq!(cs.line_ops.len(), 1);
        match cs.line_ops.get(&key) {
            Some(PendingOp::Modify(patch)) => assert_eq!(patch.quantity, Some(8)),
            other => panic!("expected a single modify, got {other:?}"),
        }
    }

    #[test]
    fn modify_folds_into_a_staged_addition() {
        let mut cs = ChangeSet::new(OrderId::new());
        let temp = cs.stage_add(new_line(3, dec!(10))).unwrap();
        cs.stage_modify(
            LineKey::Temp(temp),
            LinePatch {
                unit_price: Some(dec!(12.50)),
                ..LinePatch::default()
            },
        )
        .unwrap();
        match cs.line_ops.get(&LineKey::Temp(temp)) {
            Some(PendingOp::Add(pending)) => assert_eq!(pending.unit_price, dec!(12.50)),
            other => panic!("expected the add to absorb the patch, got {other:?}"),
        }
    }

    #[test]
    fn delete_replaces_a_staged_modify() {
        let mut cs = ChangeSet::new(OrderId::new());
        let key = LineKey::Persisted(OrderLineId::new());
        cs.stage_modify(
            key,
            LinePatch {
                quantity: Some(5),
                ..LinePatch::default()
            },
        )
        .unwrap();
        cs.stage_delete(key).unwrap();
        assert!(matches!(cs.line_ops.get(&key), Some(PendingOp::Delete)));
    }

    #[test]
    fn modifying_a_deleted_line_is_rejected() {
        let mut cs = ChangeSet::new(OrderId::new());
        let key = LineKey::Persisted(OrderLineId::new());
        cs.stage_delete(key).unwrap();
        let err = cs
            .stage_modify(
                key,
                LinePatch {
                    quantity: Some(5),
                    ..LinePatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn empty_patches_are_rejected() {
        let mut cs = ChangeSet::new(OrderId::new());
        let err = cs
            .stage_modify(LineKey::Persisted(OrderLineId::new()), LinePatch::default())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(cs.state(), StagingState::Clean);
    }

    #[test]
    fn discard_returns_to_clean() {
        let mut cs = ChangeSet::new(OrderId::new());
        cs.stage_add(new_line(1, dec!(5))).unwrap();
        cs.stage_unlink(FulfillmentLinkId::new()).unwrap();
        cs.discard();
        assert_eq!(cs.state(), StagingState::Clean);
        assert!(cs.line_ops.is_empty());
        assert!(cs.unlinks.is_empty());
    }
}
