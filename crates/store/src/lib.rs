//! Storage layer: the persistent-store contract the engine commits against,
//! an in-memory implementation for tests/dev, point-in-time snapshot
//! assembly, and the notification channel toward the presentation layer.

pub mod in_memory;
pub mod notify;
pub mod report;
pub mod store;


pub use in_memory::InMemoryStore;
pub use notify::{Notification, Notifier, RecordingNotifier, Severity, TracingNotifier};
pub use store::{ProcurementStore, load_order_snapshot};
