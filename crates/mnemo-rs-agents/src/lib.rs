//! Agent-facing memory helpers.
//!
//! Profiles describe what each built-in agent remembers; `AgentMemory` and the
//! role wrappers turn agent events into records; `MemoryAwareSession` brackets
//! a working session with start and end records.

pub mod integration;
pub mod profile;
pub mod roles;
pub mod session;

/// Generic per-agent memory wrapper.
pub use integration::{AgentMemory, extract_relevance_tags};
/// Built-in agent profiles.
pub use profile::{AgentProfile, AgentRole, builtin_profiles, load_profiles, write_profiles};
/// Role-specific wrappers.
pub use roles::{
    DocumentationWriterMemory, PrimaryDeveloperMemory, SecurityAuditorMemory, SentinelMemory,
};
/// Session bracketing.
pub use session::{MemoryAwareSession, SessionStart};
