use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fulcrum_core::{OrderLineId, ProductId, SupplierId};
use fulcrum_documents::{OrderLine, SupplierPriceEntry};

/// An order line offered to the optimizer, with its remaining (undelivered)
/// quantity. Already-delivered quantity is never a savings opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRequirement {
    pub line: OrderLine,
    pub remaining: u32,
}

/// Per-product supplier price listing, in stable catalog order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplierCatalog {
    entries: Vec<SupplierPriceEntry>,
}

impl SupplierCatalog {
    pub fn new(entries: Vec<SupplierPriceEntry>) -> Self {
        Self { entries }
    }

    /// Entries for one product, in the order the catalog returned them.
    pub fn prices_for(&self, product_id: ProductId) -> impl Iterator<Item = &SupplierPriceEntry> {
        self.entries
            .iter()
            .filter(move |e| e.product_id == product_id)
    }
}

/// Optimizer policy knobs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Suppliers that must never be recommended (e.g. an internal or
    /// affiliated supplier).
    pub excluded_suppliers: HashSet<SupplierId>,
}

/// Price rank of a supplier quote among the candidates for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceRank {
    Lowest,
    Middle,
    Highest,
}

/// A candidate supplier price, classified by rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierQuote {
    pub entry: SupplierPriceEntry,
    pub rank: PriceRank,
}

/// One order line in the budget plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanItem {
    pub order_line_id: OrderLineId,
    pub product_id: Option<ProductId>,
    pub model: String,
    pub remaining: u32,
    pub current_unit_price: Decimal,
    /// All valid candidate quotes for the product, ranked.
    pub quotes: Vec<SupplierQuote>,
    /// The first lowest-priced quote, when any candidate survived filtering.
    pub recommended: Option<SupplierPriceEntry>,
    /// `max(0, current − recommended) × remaining`; zero without a
    /// recommendation.
    pub potential_savings: Decimal,
}

impl PlanItem {
    fn original_cost(&self) -> Decimal {
        self.current_unit_price * Decimal::from(self.remaining)
    }

    fn optimized_cost(&self) -> Decimal {
        let unit = self
            .recommended
            .as_ref()
            .map(|r| r.price)
            .unwrap_or(self.current_unit_price);
        unit * Decimal::from(self.remaining)
    }
}

/// Aggregates across the whole plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub total_original_cost: Decimal,
    pub total_optimized_cost: Decimal,
    pub total_savings: Decimal,
    pub savings_percentage: Decimal,
    pub items_count: usize,
    pub items_with_recommendation_count: usize,
}

/// Output of the budget optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetPlan {
    pub items: Vec<PlanItem>,
    pub summary: PlanSummary,
}

/// Build a savings-optimized re-procurement plan.
///
/// Only lines with remaining quantity are considered. Candidates are the
/// catalog's positive-priced entries for the line's product, minus excluded
/// suppliers; the minimum price ranks `lowest` (ties all rank lowest, the
/// first encountered becomes the recommendation — catalog order is stable),
/// the maximum ranks `highest`, the rest `middle`. Savings count the
/// remaining quantity only.
pub fn optimize(
    lines: &[LineRequirement],
    catalog: &SupplierCatalog,
    config: &OptimizerConfig,
) -> BudgetPlan {
    let mut items = Vec::new();

    for req in lines {
        if req.remaining == 0 {
            continue;
        }

        let mut quotes: Vec<SupplierQuote> = Vec::new();
        let mut recommended: Option<SupplierPriceEntry> = None;
        if let Some(product_id) = req.line.product_id {
            let candidates: Vec<&SupplierPriceEntry> = catalog
                .prices_for(product_id)
                .filter(|e| e.price > Decimal::ZERO)
                .filter(|e| !config.excluded_suppliers.contains(&e.supplier_id))
                .collect();

            if !candidates.is_empty() {
                let min = candidates.iter().map(|e| e.price).min().unwrap_or_default();
                let max = candidates.iter().map(|e| e.price).max().unwrap_or_default();
                for entry in candidates {
                    let rank = if entry.price == min {
                        PriceRank::Lowest
                    } else if entry.price == max {
                        PriceRank::Highest
                    } else {
                        PriceRank::Middle
                    };
                    if rank == PriceRank::Lowest && recommended.is_none() {
                        recommended = Some(entry.clone());
                    }
                    quotes.push(SupplierQuote {
                        entry: entry.clone(),
                        rank,
                    });
                }
            }
        }

        let potential_savings = recommended
            .as_ref()
            .map(|r| {
                (req.line.unit_price - r.price).max(Decimal::ZERO) * Decimal::from(req.remaining)
            })
            .unwrap_or(Decimal::ZERO);

        items.push(PlanItem {
            order_line_id: req.line.id,
            product_id: req.line.product_id,
            model: req.line.model.clone(),
            remaining: req.remaining,
            current_unit_price: req.line.unit_price,
            quotes,
            recommended,
            potential_savings,
        });
    }

    let total_original_cost: Decimal = items.iter().map(PlanItem::original_cost).sum();
    let total_optimized_cost: Decimal = items.iter().map(PlanItem::optimized_cost).sum();
    let total_savings: Decimal = items.iter().map(|i| i.potential_savings).sum();
    let savings_percentage = if total_original_cost > Decimal::ZERO {
        total_savings / total_original_cost * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    let summary = PlanSummary {
        total_original_cost,
        total_optimized_cost,
        total_savings,
        savings_percentage,
        items_count: items.len(),
        items_with_recommendation_count: items.iter().filter(|i| i.recommended.is_some()).count(),
    };

    BudgetPlan { items, summary }
}

/// Why a plan item cannot be carried into a new procurement document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    MissingProduct,
    NoRecommendation,
}

impl core::fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Self::MissingProduct => "line has no product identifier",
            Self::NoRecommendation => "no valid supplier recommendation",
        };
        f.write_str(msg)
    }
}

/// Items that can go into a new procurement document, and the ones that
/// cannot, each with its reason. The excluded set is presented to the user
/// before confirming — never silently omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcurementPartition {
    pub includable: Vec<PlanItem>,
    pub excluded: Vec<(PlanItem, ExclusionReason)>,
}

pub fn partition_for_procurement(plan: &BudgetPlan) -> ProcurementPartition {
    let mut includable = Vec::new();
    let mut excluded = Vec::new();
    for item in &plan.items {
        if item.product_id.is_none() {
            excluded.push((item.clone(), ExclusionReason::MissingProduct));
        } else if item.recommended.is_none() {
            excluded.push((item.clone(), ExclusionReason::NoRecommendation));
        } else {
            includable.push(item.clone());
        }
    }
    ProcurementPartition {
        includable,
        excluded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fulcrum_core::OrderId;
    use rust_decimal_macros::dec;

    fn requirement(
        product: Option<ProductId>,
        quantity: u32,
        remaining: u32,
        unit_price: Decimal,
    ) -> LineRequirement {
        let line = OrderLine::new(
            OrderLineId::new(),
            OrderId::new(),
            product,
            "ITEM",
            quantity,
            unit_price,
        )
        .unwrap();
        LineRequirement { line, remaining }
    }

    fn price(product: ProductId, supplier_name: &str, amount: Decimal) -> SupplierPriceEntry {
        SupplierPriceEntry::new(product, SupplierId::new(), supplier_name, amount, None).unwrap()
    }

    #[test]
    fn recommends_cheapest_supplier_and_counts_savings_on_remaining() {
        let product = ProductId::new();
        let catalog = SupplierCatalog::new(vec![
            price(product, "A", dec!(90)),
            price(product, "B", dec!(110)),
        ]);
        let plan = optimize(
            &[requirement(Some(product), 8, 5, dec!(100))],
            &catalog,
            &OptimizerConfig::default(),
        );

        let item = &plan.items[0];
        assert_eq!(item.recommended.as_ref().unwrap().price, dec!(90));
        // (100 - 90) × 5 remaining, not × 8 ordered.
        assert_eq!(item.potential_savings, dec!(50));
        assert_eq!(plan.summary.total_original_cost, dec!(500));
        assert_eq!(plan.summary.total_optimized_cost, dec!(450));
        assert_eq!(plan.summary.total_savings, dec!(50));
        assert_eq!(plan.summary.savings_percentage, dec!(10));
    }

    #[test]
    fn ranks_lowest_middle_highest_with_ties_at_the_minimum() {
        let product = ProductId::new();
        let catalog = SupplierCatalog::new(vec![
            price(product, "A", dec!(95)),
            price(product, "B", dec!(90)),
            price(product, "C", dec!(90)),
            price(product, "D", dec!(120)),
        ]);
        let plan = optimize(
            &[requirement(Some(product), 1, 1, dec!(100))],
            &catalog,
            &OptimizerConfig::default(),
        );

        let item = &plan.items[0];
        let ranks: Vec<PriceRank> = item.quotes.iter().map(|q| q.rank).collect();
        assert_eq!(
            ranks,
            vec![PriceRank::Middle, PriceRank::Lowest, PriceRank::Lowest, PriceRank::Highest]
        );
        // First lowest encountered, in catalog order, is recommended.
        assert_eq!(item.recommended.as_ref().unwrap().supplier_name, "B");
    }

    #[test]
    fn excluded_suppliers_are_never_recommended() {
        let product = ProductId::new();
        let cheap = price(product, "Internal", dec!(10));
        let market = price(product, "Market", dec!(95));
        let config = OptimizerConfig {
            excluded_suppliers: [cheap.supplier_id].into_iter().collect(),
        };
        let catalog = SupplierCatalog::new(vec![cheap, market]);
        let plan = optimize(
            &[requirement(Some(product), 2, 2, dec!(100))],
            &catalog,
            &config,
        );

        let item = &plan.items[0];
        assert_eq!(item.quotes.len(), 1);
        assert_eq!(item.recommended.as_ref().unwrap().supplier_name, "Market");
    }

    #[test]
    fn fully_delivered_lines_are_skipped() {
        let product = ProductId::new();
        let catalog = SupplierCatalog::new(vec![price(product, "A", dec!(90))]);
        let plan = optimize(
            &[requirement(Some(product), 5, 0, dec!(100))],
            &catalog,
            &OptimizerConfig::default(),
        );
        assert!(plan.items.is_empty());
        assert_eq!(plan.summary.items_count, 0);
        assert_eq!(plan.summary.savings_percentage, Decimal::ZERO);
    }

    #[test]
    fn more_expensive_recommendation_never_yields_negative_savings() {
        let product = ProductId::new();
        let catalog = SupplierCatalog::new(vec![price(product, "A", dec!(130))]);
        let plan = optimize(
            &[requirement(Some(product), 3, 3, dec!(100))],
            &catalog,
            &OptimizerConfig::default(),
        );
        assert_eq!(plan.items[0].potential_savings, Decimal::ZERO);
        // The optimized cost still substitutes the recommended price.
        assert_eq!(plan.summary.total_optimized_cost, dec!(390));
    }

    #[test]
    fn partition_separates_includable_from_excluded_with_reasons() {
        let product = ProductId::new();
        let orphan_product = ProductId::new();
        let catalog = SupplierCatalog::new(vec![price(product, "A", dec!(90))]);
        let plan = optimize(
            &[
                requirement(Some(product), 2, 2, dec!(100)),
                requirement(None, 2, 2, dec!(100)),
                requirement(Some(orphan_product), 2, 2, dec!(100)),
            ],
            &catalog,
            &OptimizerConfig::default(),
        );

        let partition = partition_for_procurement(&plan);
        assert_eq!(partition.includable.len(), 1);
        assert_eq!(partition.excluded.len(), 2);
        assert_eq!(partition.excluded[0].1, ExclusionReason::MissingProduct);
        assert_eq!(partition.excluded[1].1, ExclusionReason::NoRecommendation);
    }
}
