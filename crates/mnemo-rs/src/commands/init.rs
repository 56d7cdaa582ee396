use crate::settings::Settings;
use anyhow::Context;
use mnemo_rs_agents::{AgentRole, builtin_profiles, write_profiles};
use mnemo_rs_memory::SchemaDocument;
use std::io::Write;

/// Create the layout, schema, initial records and agent profiles.
///
/// Safe to rerun: existing records are kept and the schema and profiles are
/// rewritten.
pub fn run(settings: &Settings, out: &mut dyn Write) -> anyhow::Result<bool> {
    let layout = settings.layout();
    let store = settings.store().context("failed to open memory store")?;
    writeln!(out, "Initializing memory system at {}", layout.root().display())?;

    for dir in layout
        .initialize(&AgentRole::names())
        .context("failed to create memory directories")?
    {
        writeln!(out, "Created directory: {}", dir.display())?;
    }
    let schema = layout
        .write_schema(&SchemaDocument::builtin(store.now()))
        .context("failed to write schema")?;
    writeln!(out, "Created memory schema: {}", schema.display())?;

    for id in layout
        .seed_initial_records(&store)
        .context("failed to seed initial records")?
    {
        writeln!(out, "Created initial memory: {id}")?;
    }
    let profiles = builtin_profiles();
    write_profiles(&layout, &profiles).context("failed to write agent profiles")?;
    for profile in &profiles {
        writeln!(out, "Created agent config: {}", profile.name)?;
    }

    let report = layout.verify();
    if report.is_complete() {
        writeln!(out, "Memory system initialized")?;
    } else {
        for dir in &report.missing_dirs {
            writeln!(out, "Missing directory: {dir}")?;
        }
    }
    Ok(report.is_complete())
}
