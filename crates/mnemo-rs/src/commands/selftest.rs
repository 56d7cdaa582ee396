//! End-to-end check of a memory root, recorded to `test_results.json`.

use crate::settings::Settings;
use anyhow::Context;
use log::warn;
use mnemo_rs_agents::{PrimaryDeveloperMemory, SentinelMemory};
use mnemo_rs_memory::layout::INITIAL_RECORD_IDS;
use mnemo_rs_memory::{
    Category, Extensions, Priority, RecordDraft, collect_stats, run_maintenance,
};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Results file written next to the memory root's base directory.
pub const RESULTS_FILE: &str = "test_results.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Passed,
    Failed,
    /// The check could not complete.
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub name: String,
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelfTestResults {
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,
    pub tests: Vec<CheckOutcome>,
}

impl SelfTestResults {
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.warnings
    }

    fn record(&mut self, name: &str, outcome: anyhow::Result<bool>) -> CheckStatus {
        let (status, error) = match outcome {
            Ok(true) => (CheckStatus::Passed, None),
            Ok(false) => (CheckStatus::Failed, None),
            Err(err) => (CheckStatus::Warning, Some(format!("{err:#}"))),
        };
        match status {
            CheckStatus::Passed => self.passed += 1,
            CheckStatus::Failed => self.failed += 1,
            CheckStatus::Warning => self.warnings += 1,
        }
        self.tests.push(CheckOutcome {
            name: name.to_string(),
            status,
            error,
        });
        status
    }
}

#[derive(Serialize)]
struct ResultsFile<'a> {
    timestamp: String,
    results: &'a SelfTestResults,
}

type Check = fn(&Settings) -> anyhow::Result<bool>;

const CHECKS: [(&str, Check); 6] = [
    ("Memory System Structure", structure),
    ("Memory System Functionality", functionality),
    ("Memory Analytics", analytics),
    ("Memory Cleanup", cleanup),
    ("Agent Memory Integration", agent_integration),
    ("Initial Memories", initial_memories),
];

fn structure(settings: &Settings) -> anyhow::Result<bool> {
    Ok(settings.layout().verify().is_complete())
}

fn functionality(settings: &Settings) -> anyhow::Result<bool> {
    let store = settings.store()?;
    let mut metadata = Extensions::new();
    metadata.insert("test".to_string(), true.into());
    store.create(
        Category::Sessions,
        "insight",
        RecordDraft::new("Test Memory", "This is a test memory")
            .tags(["test"])
            .priority(Priority::Low),
        metadata,
        None,
    )?;
    let found = store.retrieve(&settings.query().category(Category::Sessions).limit(1))?;
    if found.is_empty() {
        return Ok(false);
    }
    PrimaryDeveloperMemory::new(store).store_learning("Test learning", "Test pattern", 0.9, None)?;
    Ok(true)
}

fn analytics(settings: &Settings) -> anyhow::Result<bool> {
    let stats = collect_stats(&settings.store()?)?;
    Ok(stats.total_memories > 0)
}

fn cleanup(settings: &Settings) -> anyhow::Result<bool> {
    run_maintenance(&settings.store()?, &settings.retention())?;
    Ok(true)
}

fn agent_integration(settings: &Settings) -> anyhow::Result<bool> {
    let store = settings.store()?;
    PrimaryDeveloperMemory::new(store.clone()).store_teaching_success(
        "Test topic",
        "Test approach",
        0.8,
    )?;
    SentinelMemory::new(store).store_security_pattern(
        "Test vulnerability",
        "Test pattern",
        "HIGH",
    )?;
    Ok(true)
}

fn initial_memories(settings: &Settings) -> anyhow::Result<bool> {
    let store = settings.store()?;
    for id in INITIAL_RECORD_IDS {
        if store.get(id)?.is_none() {
            warn!("initial record missing (id={id})");
            return Ok(false);
        }
    }
    Ok(true)
}

/// Where `run` writes its results.
pub fn results_path(settings: &Settings) -> PathBuf {
    settings.base_dir().join(RESULTS_FILE)
}

/// Run every check, print a summary and write the results file.
///
/// A check that errors counts as a warning, not a failure.
pub fn run(settings: &Settings, out: &mut dyn Write) -> anyhow::Result<SelfTestResults> {
    writeln!(out, "Memory System Self-Test")?;
    writeln!(out, "{}", "=".repeat(50))?;
    let mut results = SelfTestResults::default();
    for (name, check) in CHECKS {
        writeln!(out, "Testing: {name}")?;
        match results.record(name, check(settings)) {
            CheckStatus::Passed => writeln!(out, "PASSED: {name}")?,
            CheckStatus::Failed => writeln!(out, "FAILED: {name}")?,
            CheckStatus::Warning => {
                let error = results
                    .tests
                    .last()
                    .and_then(|outcome| outcome.error.as_deref())
                    .unwrap_or_default();
                writeln!(out, "WARNING: {name} - {error}")?;
            }
        }
    }

    let total = results.total();
    writeln!(out)?;
    writeln!(out, "Total Tests: {total}")?;
    writeln!(out, "Passed: {}", results.passed)?;
    writeln!(out, "Failed: {}", results.failed)?;
    writeln!(out, "Warnings: {}", results.warnings)?;
    let success_rate = if total > 0 {
        results.passed as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    writeln!(out, "Success Rate: {success_rate:.1}%")?;
    if results.failed == 0 {
        writeln!(out, "ALL TESTS PASSED")?;
    } else {
        writeln!(out, "{} tests failed", results.failed)?;
    }

    let path = results_path(settings);
    let file = ResultsFile {
        timestamp: chrono::Utc::now().to_rfc3339(),
        results: &results,
    };
    fs::write(&path, serde_json::to_string_pretty(&file)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    writeln!(out, "Detailed results saved to: {}", path.display())?;
    Ok(results)
}
