//! Subcommands of the `mnemo` binary.
//!
//! Each command writes human-readable progress to `out` and returns whether
//! the run succeeded; errors are reserved for failures that stop the run.

pub mod analytics;
pub mod check;
pub mod cleanup;
pub mod init;
pub mod selftest;
pub mod sync;
