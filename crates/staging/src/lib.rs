//! Edit staging: an in-memory pending change-set over one order, committed
//! atomically-in-order against the persistent store.
//!
//! Changes are held in memory and applied only on explicit commit; repeated
//! edits to the same line collapse into the latest patch. The commit applies
//! its steps sequentially and reports the exact failing step on a partial
//! commit — it never compensates already-applied steps (the store is the
//! system of record; the caller re-reads and reconciles).

pub mod changeset;
pub mod commit;

pub use changeset::{ChangeSet, LineKey, NewLine, StagingState, TempLineId};
pub use commit::{CommitError, CommitReport, CommitStep, CommitStore};
