use crate::settings::Settings;
use anyhow::Context;
use mnemo_rs_mirror::{Mem0Client, RecordSync, VectorMemory};
use std::io::Write;
use std::sync::Arc;

/// Push records to the configured mem0 service.
pub async fn run(settings: &Settings, out: &mut dyn Write) -> anyhow::Result<bool> {
    if !settings.config.mirror.enabled {
        writeln!(out, "Mirror is disabled; set mirror.enabled to true to sync")?;
        return Ok(false);
    }
    let client = Mem0Client::from_config(&settings.config.mirror)
        .context("vector memory service unavailable")?;
    run_with(settings, Arc::new(client), out).await
}

/// Push records through an explicit provider.
pub async fn run_with(
    settings: &Settings,
    memory: Arc<dyn VectorMemory>,
    out: &mut dyn Write,
) -> anyhow::Result<bool> {
    let root = settings.memory_root();
    writeln!(out, "Starting memory sync...")?;
    writeln!(out, "Memory directory: {}", root.display())?;
    let sync = RecordSync::from_config(memory, &root, &settings.config.mirror);
    let report = sync.run().await;
    writeln!(out, "{report}")?;
    if report.is_success() {
        writeln!(out, "All memories synced successfully")?;
    } else {
        writeln!(out, "Some memories failed to sync ({})", report.failed)?;
    }
    Ok(report.is_success())
}
