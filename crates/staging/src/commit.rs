use serde::{Deserialize, Serialize};
use thiserror::Error;

use fulcrum_core::{
    DomainError, FulfillmentLinkId, OrderId, OrderLineId, StoreError, StoreResult,
};
use fulcrum_documents::{OrderLine, OrderPatch, TaxConfig};
use fulcrum_ledger::OrderSnapshot;

use crate::changeset::{ChangeSet, LineKey, NewLine, PendingOp, StagingState, TempLineId};

/// The write operations a commit needs from the persistent store.
///
/// Defined here, at the consumer, so the staging layer does not depend on any
/// concrete storage; `fulcrum-store` implements it for real backends.
pub trait CommitStore {
    fn create_order_line(&self, line: OrderLine) -> StoreResult<()>;
    fn update_order_line(&self, line: OrderLine) -> StoreResult<()>;
    fn delete_order_line(&self, id: OrderLineId) -> StoreResult<()>;
    fn delete_fulfillment_link(&self, id: FulfillmentLinkId) -> StoreResult<()>;
    fn update_order_metadata(&self, id: OrderId, patch: &OrderPatch) -> StoreResult<()>;
    fn update_tax_config(&self, id: OrderId, config: &TaxConfig) -> StoreResult<()>;
}

/// The six ordered sub-steps of a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitStep {
    DeleteLines,
    ModifyLines,
    AddLines,
    UnlinkFulfillments,
    OrderMetadata,
    TaxConfig,
}

impl core::fmt::Display for CommitStep {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::DeleteLines => "delete lines",
            Self::ModifyLines => "modify lines",
            Self::AddLines => "add lines",
            Self::UnlinkFulfillments => "unlink fulfillments",
            Self::OrderMetadata => "order metadata",
            Self::TaxConfig => "tax configuration",
        };
        f.write_str(name)
    }
}

/// What a successful commit did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReport {
    /// Steps that persisted at least one write, in execution order.
    pub applied: Vec<CommitStep>,
    /// Persisted identities assigned to staged additions.
    pub created_lines: Vec<(TempLineId, OrderLineId)>,
}

/// Commit failure.
#[derive(Debug, Error)]
pub enum CommitError {
    /// The buffer failed validation; nothing was written.
    #[error("validation failed before commit: {0}")]
    Validation(#[from] DomainError),

    /// A store write failed mid-sequence. Earlier steps remain applied; the
    /// caller must tell the user that some changes may already be saved and
    /// to re-open the record to verify current state.
    #[error("commit failed at step '{step}' (steps already applied: {applied:?}): {source}")]
    Partial {
        step: CommitStep,
        applied: Vec<CommitStep>,
        source: StoreError,
    },
}

impl ChangeSet {
    /// Apply the pending buffer against the store, in the fixed order:
    /// deletes, modifications, additions, fulfillment unlinks, order-level
    /// metadata, tax configuration.
    ///
    /// Validation runs first and rejects the whole commit before any store
    /// mutation. The steps themselves run sequentially (later steps can
    /// depend on earlier ones); a failing store call aborts the remaining
    /// steps without undoing the applied ones. On success the buffer is
    /// cleared — callers recompute the ledger from freshly persisted data,
    /// never from the discarded buffer.
    pub fn commit(
        &mut self,
        store: &dyn CommitStore,
        snapshot: &OrderSnapshot,
    ) -> Result<CommitReport, CommitError> {
        match self.state() {
            StagingState::Clean => {
                return Ok(CommitReport {
                    applied: Vec::new(),
                    created_lines: Vec::new(),
                });
            }
            StagingState::Dirty => {}
            StagingState::Committing | StagingState::Failed => {
                return Err(CommitError::Validation(DomainError::invariant(
                    "change set was already committed; stage changes on a fresh one",
                )));
            }
        }

        self.validate(snapshot)?;
        self.set_state(StagingState::Committing);

        let order_id = self.order_id();
        let mut applied: Vec<CommitStep> = Vec::new();
        let mut created_lines: Vec<(TempLineId, OrderLineId)> = Vec::new();

        // A step counts as applied the moment its first write lands, so a
        // failure halfway through a multi-line step still reports the step
        // as (partially) applied.
        macro_rules! run_step {
            ($step:expr, $result:expr) => {
                match $result {
                    Ok(()) => {
                        if applied.last() != Some(&$step) {
                            applied.push($step);
                        }
                    }
                    Err(source) => {
                        self.set_state(StagingState::Failed);
                        tracing::error!(
                            order = %order_id,
                            step = %$step,
                            error = %source,
                            "commit aborted mid-sequence; earlier steps remain applied"
                        );
                        return Err(CommitError::Partial {
                            step: $step,
                            applied,
                            source,
                        });
                    }
                }
            };
        }

        // 1. Deletes.
        let deletes: Vec<OrderLineId> = self
            .line_ops
            .iter()
            .filter_map(|(key, op)| match (key, op) {
                (LineKey::Persisted(id), PendingOp::Delete) => Some(*id),
                _ => None,
            })
            .collect();
        for id in deletes {
            run_step!(CommitStep::DeleteLines, store.delete_order_line(id));
        }

        // 2. Modifications.
        let modifies: Vec<(OrderLineId, OrderLine)> = self
            .line_ops
            .iter()
            .filter_map(|(key, op)| match (key, op) {
                (LineKey::Persisted(id), PendingOp::Modify(patch)) => {
                    // Existence and patch validity were checked in validate().
                    let line = snapshot.order.line(*id)?;
                    line.patched(patch).ok().map(|updated| (*id, updated))
                }
                _ => None,
            })
            .collect();
        for (_, updated) in modifies {
            run_step!(CommitStep::ModifyLines, store.update_order_line(updated));
        }

        // 3. Additions.
        let adds: Vec<(TempLineId, NewLine)> = self
            .line_ops
            .iter()
            .filter_map(|(key, op)| match (key, op) {
                (LineKey::Temp(temp), PendingOp::Add(line)) => Some((*temp, line.clone())),
                _ => None,
            })
            .collect();
        for (temp, pending) in adds {
            let id = OrderLineId::new();
            let line = match OrderLine::new(
                id,
                order_id,
                pending.product_id,
                pending.model.clone(),
                pending.quantity,
                pending.unit_price,
            ) {
                Ok(line) => line,
                Err(err) => {
                    // Staged adds were validated on entry; treat this as
                    // a validation failure of the remaining buffer.
                    self.set_state(StagingState::Failed);
                    return Err(CommitError::Validation(err));
                }
            };
            run_step!(CommitStep::AddLines, store.create_order_line(line));
            created_lines.push((temp, id));
        }

        // 4. Fulfillment unlinks.
        let unlinks: Vec<FulfillmentLinkId> = self.unlinks.iter().copied().collect();
        for link_id in unlinks {
            run_step!(
                CommitStep::UnlinkFulfillments,
                store.delete_fulfillment_link(link_id)
            );
        }

        // 5. Order-level metadata.
        if let Some(patch) = self.order_patch.clone() {
            run_step!(
                CommitStep::OrderMetadata,
                store.update_order_metadata(order_id, &patch)
            );
        }

        // 6. Tax configuration.
        if let Some(config) = self.tax_config.clone() {
            run_step!(CommitStep::TaxConfig, store.update_tax_config(order_id, &config));
        }

        self.clear_on_success();
        Ok(CommitReport {
            applied,
            created_lines,
        })
    }
}
