//! Translate engine outcomes into user-facing notifications.

use fulcrum_ledger::LedgerWarning;
use fulcrum_matching::MatchOutcome;
use fulcrum_optimizer::ProcurementPartition;
use fulcrum_staging::CommitError;

use crate::notify::{Notification, Notifier};

/// Report a matcher run: one success line, plus a warning when delivery lines
/// were left unplaced.
pub fn report_match_outcome(notifier: &dyn Notifier, outcome: &MatchOutcome) {
    notifier.notify(Notification::success(
        "delivery_matched",
        format!("{} fulfillment link(s) created", outcome.links.len()),
    ));
    if outcome.unmatched.is_empty() {
        return;
    }
    let detail: Vec<String> = outcome
        .unmatched
        .iter()
        .map(|u| format!("line {}: {}", u.delivery_line_id, u.reason))
        .collect();
    notifier.notify(Notification::warning(
        "unmatched_delivery_lines",
        format!(
            "{} delivery line(s) could not be matched ({})",
            outcome.unmatched.len(),
            detail.join("; ")
        ),
    ));
}

/// Surface ledger consistency warnings (duplicate links and the like).
pub fn report_ledger_warnings(notifier: &dyn Notifier, warnings: &[LedgerWarning]) {
    for warning in warnings {
        notifier.notify(Notification::warning(
            "duplicate_fulfillment_link",
            warning.to_string(),
        ));
    }
}

/// Report which plan items cannot be carried into a new procurement document.
/// The excluded set is always shown, never silently omitted.
pub fn report_procurement_partition(notifier: &dyn Notifier, partition: &ProcurementPartition) {
    if partition.excluded.is_empty() {
        return;
    }
    let detail: Vec<String> = partition
        .excluded
        .iter()
        .map(|(item, reason)| format!("{}: {}", item.model, reason))
        .collect();
    notifier.notify(Notification::warning(
        "excluded_plan_items",
        format!(
            "{} item(s) left out of the procurement document ({})",
            partition.excluded.len(),
            detail.join("; ")
        ),
    ));
}

/// Report a failed staged commit. A partial failure must tell the user that
/// some changes may already be saved.
pub fn report_commit_error(notifier: &dyn Notifier, error: &CommitError) {
    match error {
        CommitError::Validation(source) => {
            notifier.notify(Notification::error(
                "commit_rejected",
                format!("changes were not saved: {source}"),
            ));
        }
        CommitError::Partial { step, .. } => {
            notifier.notify(Notification::error(
                "partial_commit",
                format!(
                    "saving failed at step '{step}'; some changes may already be saved — \
                     re-open the record to verify its current state"
                ),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{RecordingNotifier, Severity};
    use fulcrum_core::{DeliveryLineId, StoreError};
    use fulcrum_matching::{UnmatchedLine, UnmatchedReason};
    use fulcrum_staging::CommitStep;

    #[test]
    fn unmatched_lines_produce_a_warning_with_reasons() {
        let notifier = RecordingNotifier::new();
        let outcome = MatchOutcome {
            links: vec![],
            unmatched: vec![UnmatchedLine {
                delivery_line_id: DeliveryLineId::new(),
                reason: UnmatchedReason::NoProductId,
            }],
        };
        report_match_outcome(&notifier, &outcome);

        let recorded = notifier.take();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[1].severity, Severity::Warning);
        assert_eq!(recorded[1].code, "unmatched_delivery_lines");
        assert!(recorded[1].message.contains("no product identifier"));
    }

    #[test]
    fn partial_commit_tells_the_user_to_reverify() {
        let notifier = RecordingNotifier::new();
        let error = CommitError::Partial {
            step: CommitStep::UnlinkFulfillments,
            applied: vec![CommitStep::ModifyLines],
            source: StoreError::backend("connection reset"),
        };
        report_commit_error(&notifier, &error);

        let recorded = notifier.take();
        assert_eq!(recorded[0].code, "partial_commit");
        assert!(recorded[0].message.contains("may already be saved"));
    }
}
