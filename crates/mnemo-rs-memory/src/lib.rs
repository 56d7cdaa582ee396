//! File-backed shared memory for cooperating agents.
//!
//! This crate owns the record model, the directory layout, retrieval and
//! update semantics, and the retention sweeps and analytics that run over
//! stored records.

pub mod analytics;
pub mod backend;
pub mod error;
pub mod id;
pub mod layout;
pub mod maintenance;
pub mod model;
pub mod policy;
pub mod query;
pub mod schema;
pub mod store;
pub mod timestamp;

/// Aggregate counters over stored records.
pub use analytics::{MemoryStats, collect_stats};
/// Storage backend interface and the default file implementation.
pub use backend::{FileBackend, MalformedRecordPolicy, RecordBackend, ScannedRecord};
/// Memory error type.
pub use error::MemoryError;
/// Layout bootstrap and verification.
pub use layout::{LayoutReport, MemoryLayout};
/// Maintenance sweeps.
pub use maintenance::{SweepReport, expire_sessions, run_maintenance, sweep_low_value};
/// Record model.
pub use model::{
    Category, ContentPatch, ExtensionValue, Extensions, MemoryRecord, MetadataPatch, Priority,
    RecordContent, RecordDraft, RecordMetadata, RecordUpdate,
};
/// Retention settings.
pub use policy::RetentionPolicy;
/// Retrieval filters.
pub use query::RecordQuery;
/// Schema catalog.
pub use schema::SchemaDocument;
/// Store facade and clock seam.
pub use store::{Clock, DEFAULT_AGENT, MemoryStore, SystemClock};
