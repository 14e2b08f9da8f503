//! Delivery matcher: associates delivery-document lines with order lines when
//! no explicit link exists yet.
//!
//! Deterministic greedy consumption, oldest delivery first. Pure computation;
//! the caller persists the proposed links (or surfaces the unmatched report).

pub mod matcher;

pub use matcher::{
    MatchOutcome, OrderLineTarget, ProposedLink, UnmatchedLine, UnmatchedReason, match_delivery,
};
