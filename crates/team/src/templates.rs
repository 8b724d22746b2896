use std::collections::HashMap;

use council_core::{ConsensusMode, TaskType};
use serde::{Deserialize, Serialize};

/// Name, ordered supervisor list, lead, and preferred consensus mode for one
/// task type (§3 "TeamTemplate").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamTemplate {
    pub name: String,
    pub supervisors: Vec<String>,
    pub lead: Option<String>,
    pub mode: ConsensusMode,
}

/// Maps task-type → template. Callers may replace this wholesale (e.g. to
/// load operator-configured teams) or start from [`default_templates`].
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: HashMap<TaskType, TeamTemplate>,
}

impl TemplateSet {
    pub fn new() -> Self {
        Self { templates: HashMap::new() }
    }

    pub fn insert(&mut self, task_type: TaskType, template: TeamTemplate) {
        self.templates.insert(task_type, template);
    }

    pub fn get(&self, task_type: TaskType) -> Option<&TeamTemplate> {
        self.templates.get(&task_type)
    }
}

/// A reasonable default template set, one entry per non-general task type.
pub fn default_templates() -> TemplateSet {
    let mut set = TemplateSet::new();
    let entries: &[(TaskType, &str, &[&str], Option<&str>, ConsensusMode)] = &[
        (
            TaskType::SecurityAudit,
            "security-audit-council",
            &["claude", "gpt-4", "gemini"],
            Some("claude"),
            ConsensusMode::CeoVeto,
        ),
        (
            TaskType::UiDesign,
            "ui-design-council",
            &["gpt-4", "gemini"],
            None,
            ConsensusMode::SimpleMajority,
        ),
        (
            TaskType::BugFix,
            "bug-fix-council",
            &["claude", "gpt-4"],
            Some("claude"),
            ConsensusMode::Weighted,
        ),
        (
            TaskType::Documentation,
            "documentation-council",
            &["gpt-4"],
            None,
            ConsensusMode::Unanimous,
        ),
        (
            TaskType::Testing,
            "testing-council",
            &["claude", "gpt-4", "gemini"],
            None,
            ConsensusMode::Supermajority,
        ),
        (
            TaskType::Architecture,
            "architecture-council",
            &["claude", "gpt-4", "gemini", "grok"],
            Some("claude"),
            ConsensusMode::HybridCeoMajority,
        ),
        (
            TaskType::Performance,
            "performance-council",
            &["gpt-4", "deepseek"],
            None,
            ConsensusMode::Weighted,
        ),
        (
            TaskType::ApiDesign,
            "api-design-council",
            &["claude", "gpt-4"],
            Some("claude"),
            ConsensusMode::CeoOverride,
        ),
        (
            TaskType::CodeReview,
            "code-review-council",
            &["claude", "gpt-4", "gemini"],
            None,
            ConsensusMode::RankedChoice,
        ),
        (
            TaskType::Refactoring,
            "refactoring-council",
            &["claude", "gpt-4"],
            None,
            ConsensusMode::SimpleMajority,
        ),
    ];

    for (task_type, name, supervisors, lead, mode) in entries {
        set.insert(
            *task_type,
            TeamTemplate {
                name: name.to_string(),
                supervisors: supervisors.iter().map(|s| s.to_string()).collect(),
                lead: lead.map(|s| s.to_string()),
                mode: *mode,
            },
        );
    }
    set
}
