//! Budget optimizer: selects the cheapest valid supplier per remaining order
//! line and aggregates the potential savings into a re-procurement plan.

pub mod plan;

pub use plan::{
    BudgetPlan, ExclusionReason, LineRequirement, OptimizerConfig, PlanItem, PlanSummary,
    PriceRank, ProcurementPartition, SupplierCatalog, SupplierQuote, optimize,
    partition_for_procurement,
};
