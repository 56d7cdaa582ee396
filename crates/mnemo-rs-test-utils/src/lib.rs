//! Test helpers shared across mnemo crates.

pub mod backend;
pub mod clock;
pub mod vector;

pub use backend::InMemoryBackend;
pub use clock::FixedClock;
pub use vector::{AddedEntry, StubVectorMemory};
