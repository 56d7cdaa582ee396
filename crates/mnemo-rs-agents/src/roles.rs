//! Role wrappers adding agent-specific store calls on top of `AgentMemory`.

use crate::integration::AgentMemory;
use crate::profile::AgentRole;
use mnemo_rs_memory::{Extensions, MemoryError, MemoryStore, Priority};
use std::ops::Deref;

macro_rules! role_memory {
    ($name:ident, $role:expr) => {
        #[derive(Clone)]
        pub struct $name(AgentMemory);

        impl $name {
            pub fn new(store: MemoryStore) -> Self {
                Self(AgentMemory::new(store, $role.as_str()))
            }
        }

        impl Deref for $name {
            type Target = AgentMemory;

            fn deref(&self) -> &AgentMemory {
                &self.0
            }
        }
    };
}

role_memory!(PrimaryDeveloperMemory, AgentRole::PrimaryDeveloper);
role_memory!(SentinelMemory, AgentRole::Sentinel);
role_memory!(SecurityAuditorMemory, AgentRole::SecurityAuditor);
role_memory!(DocumentationWriterMemory, AgentRole::DocumentationWriter);

impl PrimaryDeveloperMemory {
    /// Record a teaching approach that worked, scored by user feedback.
    pub fn store_teaching_success(
        &self,
        topic: &str,
        approach: &str,
        user_feedback: f64,
    ) -> Result<String, MemoryError> {
        self.store_learning(
            &format!("Successfully taught {topic} using {approach}"),
            approach,
            user_feedback,
            None,
        )
    }

    pub fn store_coding_pattern(
        &self,
        pattern_name: &str,
        description: &str,
        code_example: &str,
        lct_criteria: Option<&str>,
    ) -> Result<String, MemoryError> {
        let mut extra = Extensions::new();
        extra.insert("lct_criteria".to_string(), lct_criteria.into());
        self.store_pattern_with(pattern_name, description, Some(code_example), extra)
    }
}

impl SentinelMemory {
    /// Record a vulnerability and the pattern that detects it.
    pub fn store_security_pattern(
        &self,
        vulnerability: &str,
        pattern: &str,
        severity: &str,
    ) -> Result<String, MemoryError> {
        let mut extra = Extensions::new();
        extra.insert("severity".to_string(), severity.into());
        self.store_pattern_with(
            &format!("Security: {vulnerability}"),
            &format!("Security pattern for {vulnerability}: {pattern}"),
            Some(pattern),
            extra,
        )
    }

    /// Record a finding that turned out not to be an issue.
    pub fn store_false_positive(&self, issue: &str, reason: &str) -> Result<String, MemoryError> {
        self.store_learning(
            &format!("False positive: {issue}"),
            &format!("Reason: {reason}"),
            0.0,
            None,
        )
    }
}

impl SecurityAuditorMemory {
    pub fn store_compliance_requirement(
        &self,
        requirement: &str,
        standard: &str,
        impact: Priority,
    ) -> Result<String, MemoryError> {
        self.store_decision(
            &format!("Compliance requirement: {requirement}"),
            &format!("Standard: {standard}, Impact: {impact}"),
            impact,
            None,
        )
    }
}

impl DocumentationWriterMemory {
    pub fn store_documentation_pattern(
        &self,
        doc_type: &str,
        pattern: &str,
        effectiveness: f64,
    ) -> Result<String, MemoryError> {
        self.store_learning(
            &format!("Effective {doc_type} documentation"),
            pattern,
            effectiveness,
            None,
        )
    }
}
