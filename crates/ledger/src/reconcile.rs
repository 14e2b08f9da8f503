use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fulcrum_core::{DeliveryId, DeliveryLineId, FulfillmentLinkId};
use fulcrum_documents::OrderLine;

/// Delivery status of a single order line (derived, never stored).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStatus {
    Pending,
    Partial,
    Delivered,
}

/// Delivery status of a whole order: the worst-case aggregate of its lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Partial,
    Completed,
}

/// A fulfillment link joined with the delivery document it came from, as the
/// ledger consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedFulfillment {
    pub link_id: FulfillmentLinkId,
    pub delivery_id: DeliveryId,
    pub delivery_line_id: DeliveryLineId,
    pub quantity: u32,
    pub receipt_no: Option<String>,
    pub delivered_at: DateTime<Utc>,
}

/// One display slice of an order line: either a quantity delivered under a
/// specific receipt, or the still-pending remainder.
///
/// Supports "split line" rendering when one ordered line arrives across
/// several receipts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BreakdownSlice {
    Delivered {
        quantity: u32,
        receipt_no: Option<String>,
        delivered_at: DateTime<Utc>,
    },
    Pending {
        quantity: u32,
    },
}

impl BreakdownSlice {
    pub fn quantity(&self) -> u32 {
        match self {
            Self::Delivered { quantity, .. } | Self::Pending { quantity } => *quantity,
        }
    }
}

/// Non-fatal consistency finding, surfaced alongside the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerWarning {
    /// Two links claimed the same `(delivery, delivery line)` pair; the one
    /// with the larger quantity was kept.
    DuplicateLink {
        delivery_id: DeliveryId,
        delivery_line_id: DeliveryLineId,
        kept: FulfillmentLinkId,
        dropped: FulfillmentLinkId,
        kept_quantity: u32,
        dropped_quantity: u32,
    },
}

impl core::fmt::Display for LedgerWarning {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DuplicateLink {
                delivery_line_id,
                kept_quantity,
                dropped_quantity,
                ..
            } => write!(
                f,
                "duplicate fulfillment link on delivery line {delivery_line_id} \
                 (kept qty {kept_quantity}, dropped qty {dropped_quantity})"
            ),
        }
    }
}

/// Result of reconciling one order line against its fulfillment links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineReconciliation {
    pub fulfilled_quantity: u32,
    pub remaining_quantity: u32,
    pub status: LineStatus,
    /// Ordered by delivery date, followed by at most one pending slice.
    pub breakdown: Vec<BreakdownSlice>,
    pub warnings: Vec<LedgerWarning>,
}

/// Compute delivered/remaining quantities and status for one order line.
///
/// Links are deduplicated by `(delivery, delivery line)` — duplicates are a
/// known consistency risk when links are recomputed speculatively; the entry
/// with the larger quantity wins and a warning is emitted. The breakdown is
/// sorted by delivery date (input order preserved on ties) and ends with a
/// synthetic pending slice when the line is not fully delivered.
pub fn reconcile(line: &OrderLine, links: &[LinkedFulfillment]) -> LineReconciliation {
    let mut warnings = Vec::new();

    // Deduplicate, keeping the larger quantity per (delivery, delivery line).
    let mut kept: Vec<LinkedFulfillment> = Vec::with_capacity(links.len());
    let mut by_pair: HashMap<(DeliveryId, DeliveryLineId), usize> = HashMap::new();
    for link in links {
        let pair = (link.delivery_id, link.delivery_line_id);
        match by_pair.get(&pair) {
            None => {
                by_pair.insert(pair, kept.len());
                kept.push(link.clone());
            }
            Some(&idx) => {
                let (winner, loser) = if link.quantity > kept[idx].quantity {
                    (link.clone(), kept[idx].clone())
                } else {
                    (kept[idx].clone(), link.clone())
                };
                tracing::warn!(
                    order_line = %line.id,
                    delivery_line = %pair.1,
                    kept_quantity = winner.quantity,
                    dropped_quantity = loser.quantity,
                    "duplicate fulfillment link, keeping larger quantity"
                );
                warnings.push(LedgerWarning::DuplicateLink {
                    delivery_id: pair.0,
                    delivery_line_id: pair.1,
                    kept: winner.link_id,
                    dropped: loser.link_id,
                    kept_quantity: winner.quantity,
                    dropped_quantity: loser.quantity,
                });
                kept[idx] = winner;
            }
        }
    }

    kept.sort_by_key(|l| l.delivered_at);

    let mut fulfilled: u32 = 0;
    let mut breakdown: Vec<BreakdownSlice> = Vec::with_capacity(kept.len() + 1);
    for link in &kept {
        fulfilled = fulfilled.saturating_add(link.quantity);
        breakdown.push(BreakdownSlice::Delivered {
            quantity: link.quantity,
            receipt_no: link.receipt_no.clone(),
            delivered_at: link.delivered_at,
        });
    }

    let remaining = line.quantity.saturating_sub(fulfilled);
    if remaining > 0 {
        breakdown.push(BreakdownSlice::Pending {
            quantity: remaining,
        });
    }

    let status = if remaining == 0 {
        LineStatus::Delivered
    } else if fulfilled == 0 {
        LineStatus::Pending
    } else {
        LineStatus::Partial
    };

    LineReconciliation {
        fulfilled_quantity: fulfilled,
        remaining_quantity: remaining,
        status,
        breakdown,
        warnings,
    }
}

/// Aggregate line statuses into an order status.
///
/// Worst-case aggregation under `pending < partial < delivered`: the order is
/// completed only when every line is delivered; an order with no lines (or no
/// fulfillment at all) is pending.
pub fn order_status(lines: impl IntoIterator<Item = LineStatus>) -> OrderStatus {
    match lines.into_iter().min() {
        None | Some(LineStatus::Pending) => OrderStatus::Pending,
        Some(LineStatus::Partial) => OrderStatus::Partial,
        Some(LineStatus::Delivered) => OrderStatus::Completed,
    }
}
