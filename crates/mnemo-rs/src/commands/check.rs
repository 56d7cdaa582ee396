use crate::settings::Settings;
use anyhow::Context;
use mnemo_rs_memory::layout::INITIAL_RECORD_IDS;
use std::io::Write;

/// Verify the directory layout and the initial records.
pub fn run(settings: &Settings, out: &mut dyn Write) -> anyhow::Result<bool> {
    writeln!(out, "Testing memory system...")?;
    let layout = settings.layout();
    let store = settings.store().context("failed to open memory store")?;

    let report = layout.verify();
    for dir in &report.missing_dirs {
        writeln!(out, "Missing directory: {dir}")?;
    }
    if report.missing_dirs.is_empty() {
        writeln!(out, "Found all memory directories")?;
    }
    if !report.schema_present {
        writeln!(out, "Warning: {} not found", layout.schema_path().display())?;
    }

    let mut found = 0;
    for id in INITIAL_RECORD_IDS {
        if store
            .get(id)
            .with_context(|| format!("failed to read initial record {id}"))?
            .is_some()
        {
            found += 1;
        } else {
            writeln!(out, "Missing initial memory: {id}")?;
        }
    }
    writeln!(out, "Found {found} initial memories")?;

    let passed = report.missing_dirs.is_empty() && found == INITIAL_RECORD_IDS.len();
    if passed {
        writeln!(out, "Memory system test passed")?;
    } else {
        writeln!(out, "Memory system test failed")?;
    }
    Ok(passed)
}
