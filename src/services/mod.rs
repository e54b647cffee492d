pub mod pending;
pub mod scheduler;
pub mod synchronizer;

pub use pending::{ChangeAction, ChangePayload, EntityKind, PendingChange, PendingChanges};
pub use scheduler::DebounceScheduler;
pub use synchronizer::{CourseSynchronizer, SyncReport, SyncStatus, DEFAULT_DEBOUNCE};
