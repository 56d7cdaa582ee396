//! Maintenance commands for a mnemo memory root.
//!
//! The `mnemo` binary is a thin clap front end over these commands so they
//! can be driven from tests with an explicit `Settings` and output sink.

pub mod commands;
pub mod settings;

/// Re-export for convenience.
pub use mnemo_rs_agents as agents;
/// Re-export for convenience.
pub use mnemo_rs_config as config;
/// Re-export for convenience.
pub use mnemo_rs_memory as memory;
/// Re-export for convenience.
pub use mnemo_rs_mirror as mirror;

pub use settings::Settings;

#[inline]
/// Initialize logging using env_logger with millisecond timestamps.
///
/// Filtering follows `RUST_LOG`. Calling this more than once is harmless.
pub fn init_logging() {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();
}
