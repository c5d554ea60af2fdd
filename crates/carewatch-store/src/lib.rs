//! Observation and profile persistence for Carewatch.

pub mod error;
pub mod file;
pub mod memory;
mod ordering;
pub mod profile;
pub mod store;

/// Storage error type.
pub use error::StorageError;
/// JSONL-backed stores.
pub use file::{FileObservationStore, FileProfileStore};
/// Process-local stores.
pub use memory::{MemoryObservationStore, MemoryProfileStore};
/// Window cursor used by history lookups.
pub use ordering::HistoryCursor;
/// Profile store interface.
pub use profile::ProfileStore;
/// Observation store interface.
pub use store::ObservationStore;
