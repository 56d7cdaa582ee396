use crate::settings::Settings;
use anyhow::Context;
use mnemo_rs_memory::collect_stats;
use std::io::Write;

/// Print record totals by category, type, priority and agent.
pub fn run(settings: &Settings, out: &mut dyn Write) -> anyhow::Result<bool> {
    writeln!(out, "Analyzing memory system...")?;
    let store = settings.store().context("failed to open memory store")?;
    let stats = collect_stats(&store).context("failed to collect memory statistics")?;
    write!(out, "{stats}")?;
    Ok(true)
}
