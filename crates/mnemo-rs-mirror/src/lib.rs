//! Mirror memory records into an external vector-memory service.
//!
//! The store does not depend on this crate. It reads record documents from a
//! memory root and pushes them through the `VectorMemory` interface, with a
//! mem0-compatible HTTP client as the default provider.

pub mod agent;
pub mod client;
pub mod error;
pub mod provider;
pub mod sync;

pub use agent::{CHAT_FALLBACK, MirroredAgent};
pub use client::Mem0Client;
pub use error::MirrorError;
pub use provider::{MirrorMetadata, VectorEntry, VectorMemory};
pub use sync::{RecordSync, SyncReport, SyncSource, format_document};
