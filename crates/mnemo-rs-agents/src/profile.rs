//! Built-in agent profiles stored under `agents/<name>/config.json`.

use log::{debug, info, warn};
use mnemo_rs_memory::{Category, MemoryError, MemoryLayout};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

/// The agents that share the memory store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentRole {
    PrimaryDeveloper,
    Sentinel,
    SecurityAuditor,
    DocumentationWriter,
}

impl AgentRole {
    pub const ALL: [AgentRole; 4] = [
        AgentRole::PrimaryDeveloper,
        AgentRole::Sentinel,
        AgentRole::SecurityAuditor,
        AgentRole::DocumentationWriter,
    ];

    /// Agent name used in metadata, tags and the agents directory.
    pub fn as_str(self) -> &'static str {
        match self {
            AgentRole::PrimaryDeveloper => "primary_developer",
            AgentRole::Sentinel => "sentinel",
            AgentRole::SecurityAuditor => "security_auditor",
            AgentRole::DocumentationWriter => "documentation_writer",
        }
    }

    /// Names of every built-in agent.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|role| role.as_str()).collect()
    }

    /// Built-in profile for the role.
    pub fn profile(self) -> AgentProfile {
        let (description, responsibilities, categories, types): (
            &str,
            [&str; 4],
            &[Category],
            &[&str],
        ) = match self {
            AgentRole::PrimaryDeveloper => (
                "Interactive coding assistant for LCT Commit project",
                [
                    "Store coding patterns and best practices",
                    "Remember user preferences and skill level",
                    "Track feature implementation decisions",
                    "Learn from successful teaching approaches",
                ],
                &[Category::Development, Category::Sessions, Category::Shared],
                &["decision", "learning", "pattern", "preference"],
            ),
            AgentRole::Sentinel => (
                "Automated code review agent for security and quality",
                [
                    "Store security patterns and vulnerabilities",
                    "Remember code quality standards",
                    "Track issue resolution patterns",
                    "Learn from false positives/negatives",
                ],
                &[Category::Development, Category::Shared],
                &["pattern", "learning", "issue"],
            ),
            AgentRole::SecurityAuditor => (
                "Deep security analysis and compliance checking",
                [
                    "Store compliance requirements",
                    "Remember security incidents",
                    "Track audit findings and resolutions",
                    "Learn from security best practices",
                ],
                &[Category::Project, Category::Development, Category::Shared],
                &["decision", "learning", "pattern", "issue"],
            ),
            AgentRole::DocumentationWriter => (
                "On-demand documentation and comment generation",
                [
                    "Store documentation patterns",
                    "Remember user feedback on docs",
                    "Track knowledge gaps",
                    "Learn from effective documentation",
                ],
                &[Category::Development, Category::Sessions, Category::Shared],
                &["pattern", "learning", "preference"],
            ),
        };
        AgentProfile {
            name: self.as_str().to_string(),
            description: description.to_string(),
            memory_responsibilities: responsibilities.iter().map(|s| s.to_string()).collect(),
            memory_categories: categories.to_vec(),
            memory_types: types.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentRole {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        AgentRole::ALL
            .into_iter()
            .find(|role| role.as_str() == value)
            .ok_or_else(|| format!("unknown agent: {value}"))
    }
}

/// Declared memory responsibilities of one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Directory name; not stored in the document.
    #[serde(skip)]
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub memory_responsibilities: Vec<String>,
    #[serde(default)]
    pub memory_categories: Vec<Category>,
    #[serde(default)]
    pub memory_types: Vec<String>,
}

/// Profiles for every built-in agent.
pub fn builtin_profiles() -> Vec<AgentProfile> {
    AgentRole::ALL.iter().map(|role| role.profile()).collect()
}

/// Write each profile to its `config.json`, creating agent directories.
pub fn write_profiles(
    layout: &MemoryLayout,
    profiles: &[AgentProfile],
) -> Result<Vec<PathBuf>, MemoryError> {
    let mut written = Vec::with_capacity(profiles.len());
    for profile in profiles {
        let path = layout.agent_config_path(&profile.name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(profile)?)?;
        debug!("wrote agent profile (agent={}, path={})", profile.name, path.display());
        written.push(path);
    }
    info!("agent profiles written (count={})", written.len());
    Ok(written)
}

/// Read every `agents/<name>/config.json`, sorted by agent name.
///
/// Agent directories without a config are skipped; undecodable configs are
/// logged and skipped.
pub fn load_profiles(layout: &MemoryLayout) -> Result<Vec<AgentProfile>, MemoryError> {
    let entries = match fs::read_dir(layout.agents_dir()) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(MemoryError::Io(err)),
    };
    let mut profiles = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = layout.agent_config_path(&name);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
            Err(err) => return Err(MemoryError::Io(err)),
        };
        match serde_json::from_str::<AgentProfile>(&contents) {
            Ok(mut profile) => {
                profile.name = name;
                profiles.push(profile);
            }
            Err(err) => warn!("skipping agent profile (path={}): {err}", path.display()),
        }
    }
    profiles.sort_by(|left, right| left.name.cmp(&right.name));
    Ok(profiles)
}
