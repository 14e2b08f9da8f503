use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fulcrum_core::{
    DeliveryId, DeliveryLineId, DomainResult, FulfillmentLinkId, OrderId, OrderLineId,
};
use fulcrum_documents::{DeliveryDocument, FulfillmentLink, OrderLine};

/// An order line offered to the matcher, with its current remaining
/// (undelivered) quantity as derived by the quantity ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineTarget {
    pub line: OrderLine,
    pub remaining: u32,
}

/// A fulfillment link the matcher proposes; not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedLink {
    pub delivery_id: DeliveryId,
    pub delivery_line_id: DeliveryLineId,
    pub order_id: OrderId,
    pub order_line_id: OrderLineId,
    pub quantity: u32,
}

impl ProposedLink {
    /// Turn the proposal into a persistable link record.
    pub fn materialize(&self, created_at: DateTime<Utc>) -> DomainResult<FulfillmentLink> {
        FulfillmentLink::new(
            FulfillmentLinkId::new(),
            self.delivery_id,
            self.delivery_line_id,
            self.order_id,
            self.order_line_id,
            self.quantity,
            created_at,
        )
    }
}

/// Why a delivery line produced no link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedReason {
    /// Lines without a product identifier cannot be auto-matched.
    NoProductId,
    /// No order line carries this product.
    NoMatchingOrderLine,
    /// Product matched, but nothing was consumable (order lines already
    /// fulfilled, or the delivery line is fully linked already).
    NothingRemaining,
}

impl core::fmt::Display for UnmatchedReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Self::NoProductId => "delivery line has no product identifier",
            Self::NoMatchingOrderLine => "no order line carries this product",
            Self::NothingRemaining => "nothing left to fulfill for this product",
        };
        f.write_str(msg)
    }
}

/// A delivery line the matcher could not (fully or partly) place, reported to
/// the caller rather than silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedLine {
    pub delivery_line_id: DeliveryLineId,
    pub reason: UnmatchedReason,
}

/// Result of one matcher run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub links: Vec<ProposedLink>,
    pub unmatched: Vec<UnmatchedLine>,
}

/// Associate a delivery document's lines with order lines by product identity.
///
/// Greedy and deterministic: order lines are processed in their original
/// sequence; within this document, candidate delivery lines are consumed in
/// document order (they all share the document's delivery date, so earlier
/// deliveries have already been consumed through `already_linked`). The newly
/// consumable amount from a delivery line is
/// `min(delivered − already consumed, order line remaining)`, which preserves
/// both quantity invariants by construction.
///
/// `already_linked` carries the quantity each delivery line has already
/// committed through persisted links. Running the matcher twice against the
/// same inputs yields the same outcome.
pub fn match_delivery(
    delivery: &DeliveryDocument,
    already_linked: &HashMap<DeliveryLineId, u32>,
    targets: &[OrderLineTarget],
) -> MatchOutcome {
    let mut consumed: HashMap<DeliveryLineId, u32> = delivery
        .lines
        .iter()
        .map(|l| (l.id, already_linked.get(&l.id).copied().unwrap_or(0)))
        .collect();
    let mut newly_consumed: HashMap<DeliveryLineId, u32> = HashMap::new();
    let mut links = Vec::new();

    for target in targets {
        let Some(product_id) = target.line.product_id else {
            continue;
        };
        let mut remaining = target.remaining;
        if remaining == 0 {
            continue;
        }
        for dl in &delivery.lines {
            if dl.product_id != Some(product_id) {
                continue;
            }
            let used = consumed.get(&dl.id).copied().unwrap_or(0);
            let available = dl.quantity.saturating_sub(used);
            let take = available.min(remaining);
            if take == 0 {
                continue;
            }
            links.push(ProposedLink {
                delivery_id: delivery.id,
                delivery_line_id: dl.id,
                order_id: target.line.order_id,
                order_line_id: target.line.id,
                quantity: take,
            });
            *consumed.entry(dl.id).or_insert(0) += take;
            *newly_consumed.entry(dl.id).or_insert(0) += take;
            remaining -= take;
            if remaining == 0 {
                break;
            }
        }
    }

    let mut unmatched = Vec::new();
    for dl in &delivery.lines {
        if newly_consumed.get(&dl.id).copied().unwrap_or(0) > 0 {
            continue;
        }
        let reason = if dl.product_id.is_none() {
            UnmatchedReason::NoProductId
        } else if !targets.iter().any(|t| t.line.product_id == dl.product_id) {
            UnmatchedReason::NoMatchingOrderLine
        } else {
            UnmatchedReason::NothingRemaining
        };
        unmatched.push(UnmatchedLine {
            delivery_line_id: dl.id,
            reason,
        });
    }

    if !unmatched.is_empty() {
        tracing::warn!(
            delivery = %delivery.id,
            count = unmatched.len(),
            "delivery lines left unmatched by auto-match"
        );
    }

    MatchOutcome { links, unmatched }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fulcrum_core::ProductId;
    use fulcrum_documents::DeliveryLine;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap()
    }

    fn target(order_id: OrderId, product: Option<ProductId>, quantity: u32) -> OrderLineTarget {
        let line = OrderLine::new(
            OrderLineId::new(),
            order_id,
            product,
            "ITEM",
            quantity,
            dec!(10),
        )
        .unwrap();
        OrderLineTarget {
            remaining: quantity,
            line,
        }
    }

    fn delivery(
        order_id: OrderId,
        lines: Vec<(Option<ProductId>, u32)>,
    ) -> DeliveryDocument {
        let id = DeliveryId::new();
        let lines = lines
            .into_iter()
            .map(|(product, quantity)| {
                DeliveryLine::new(DeliveryLineId::new(), id, product, quantity, None).unwrap()
            })
            .collect();
        DeliveryDocument::new(id, Some(order_id), Some("DR-7"), day(3), lines).unwrap()
    }

    #[test]
    fn splits_one_order_line_across_delivery_lines() {
        let order_id = OrderId::new();
        let product = ProductId::new();
        let dd = delivery(order_id, vec![(Some(product), 6), (Some(product), 8)]);
        let targets = vec![target(order_id, Some(product), 10)];

        let outcome = match_delivery(&dd, &HashMap::new(), &targets);
        assert_eq!(outcome.links.len(), 2);
        assert_eq!(outcome.links[0].quantity, 6);
        assert_eq!(outcome.links[1].quantity, 4);
        // Second delivery line was partly consumed, so it is not unmatched.
        assert!(outcome.unmatched.is_empty());
    }

    #[test]
    fn respects_already_linked_quantities() {
        let order_id = OrderId::new();
        let product = ProductId::new();
        let dd = delivery(order_id, vec![(Some(product), 6)]);
        let already: HashMap<_, _> = [(dd.lines[0].id, 4u32)].into_iter().collect();
        let targets = vec![target(order_id, Some(product), 10)];

        let outcome = match_delivery(&dd, &already, &targets);
        assert_eq!(outcome.links.len(), 1);
        assert_eq!(outcome.links[0].quantity, 2);
    }

    #[test]
    fn reports_unmatched_lines_with_reasons() {
        let order_id = OrderId::new();
        let product = ProductId::new();
        let other = ProductId::new();
        let dd = delivery(
            order_id,
            vec![(None, 3), (Some(other), 2), (Some(product), 5)],
        );
        // The order already has nothing left on the matching product.
        let mut t = target(order_id, Some(product), 5);
        t.remaining = 0;

        let outcome = match_delivery(&dd, &HashMap::new(), &[t]);
        assert!(outcome.links.is_empty());
        assert_eq!(outcome.unmatched.len(), 3);
        assert_eq!(outcome.unmatched[0].reason, UnmatchedReason::NoProductId);
        assert_eq!(outcome.unmatched[1].reason, UnmatchedReason::NoMatchingOrderLine);
        assert_eq!(outcome.unmatched[2].reason, UnmatchedReason::NothingRemaining);
    }

    #[test]
    fn matching_is_idempotent_for_the_same_snapshot() {
        let order_id = OrderId::new();
        let product = ProductId::new();
        let dd = delivery(order_id, vec![(Some(product), 6), (Some(product), 8)]);
        let targets = vec![target(order_id, Some(product), 9)];

        let first = match_delivery(&dd, &HashMap::new(), &targets);
        let second = match_delivery(&dd, &HashMap::new(), &targets);
        assert_eq!(first, second);
    }

    #[test]
    fn materialized_links_carry_the_proposed_quantity() {
        let order_id = OrderId::new();
        let product = ProductId::new();
        let dd = delivery(order_id, vec![(Some(product), 6)]);
        let targets = vec![target(order_id, Some(product), 10)];

        let outcome = match_delivery(&dd, &HashMap::new(), &targets);
        let link = outcome.links[0].materialize(day(3)).unwrap();
        assert_eq!(link.quantity, 6);
        assert_eq!(link.delivery_id, dd.id);
        assert_eq!(link.order_id, order_id);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn quantities() -> impl Strategy<Value = (Vec<u32>, Vec<u32>)> {
            (
                prop::collection::vec(1u32..=20, 1..5),
                prop::collection::vec(1u32..=20, 1..5),
            )
        }

        proptest! {
            /// Both quantity invariants hold by construction: no delivery
            /// line is over-consumed and no order line is over-fulfilled.
            #[test]
            fn consumption_never_exceeds_either_side((ordered, delivered) in quantities()) {
                let order_id = OrderId::new();
                let product = ProductId::new();
                let dd = delivery(
                    order_id,
                    delivered.iter().map(|&q| (Some(product), q)).collect(),
                );
                let targets: Vec<_> = ordered
                    .iter()
                    .map(|&q| target(order_id, Some(product), q))
                    .collect();

                let outcome = match_delivery(&dd, &HashMap::new(), &targets);

                for dl in &dd.lines {
                    let linked: u32 = outcome
                        .links
                        .iter()
                        .filter(|l| l.delivery_line_id == dl.id)
                        .map(|l| l.quantity)
                        .sum();
                    prop_assert!(linked <= dl.quantity);
                }
                for t in &targets {
                    let fulfilled: u32 = outcome
                        .links
                        .iter()
                        .filter(|l| l.order_line_id == t.line.id)
                        .map(|l| l.quantity)
                        .sum();
                    prop_assert!(fulfilled <= t.remaining);
                }
            }
        }
    }
}
