use crate::settings::Settings;
use anyhow::Context;
use mnemo_rs_memory::run_maintenance;
use std::io::Write;

/// Run the expiry and low-value sweeps.
pub fn run(settings: &Settings, out: &mut dyn Write) -> anyhow::Result<bool> {
    writeln!(out, "Cleaning up memory system...")?;
    let store = settings.store().context("failed to open memory store")?;
    let report = run_maintenance(&store, &settings.retention()).context("cleanup failed")?;
    write!(out, "{report}")?;
    writeln!(out, "Memory cleanup complete")?;
    Ok(true)
}
