use serde::{Deserialize, Serialize};

/// Wire-visible consensus mode string (§6).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ConsensusMode {
    SimpleMajority,
    Supermajority,
    Unanimous,
    Weighted,
    CeoOverride,
    CeoVeto,
    HybridCeoMajority,
    RankedChoice,
}

impl ConsensusMode {
    pub const ALL: [ConsensusMode; 8] = [
        ConsensusMode::SimpleMajority,
        ConsensusMode::Supermajority,
        ConsensusMode::Unanimous,
        ConsensusMode::Weighted,
        ConsensusMode::CeoOverride,
        ConsensusMode::CeoVeto,
        ConsensusMode::HybridCeoMajority,
        ConsensusMode::RankedChoice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsensusMode::SimpleMajority => "simple-majority",
            ConsensusMode::Supermajority => "supermajority",
            ConsensusMode::Unanimous => "unanimous",
            ConsensusMode::Weighted => "weighted",
            ConsensusMode::CeoOverride => "ceo-override",
            ConsensusMode::CeoVeto => "ceo-veto",
            ConsensusMode::HybridCeoMajority => "hybrid-ceo-majority",
            ConsensusMode::RankedChoice => "ranked-choice",
        }
    }
}

impl std::fmt::Display for ConsensusMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Wire-visible task-type string (§6).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TaskType {
    SecurityAudit,
    UiDesign,
    BugFix,
    Documentation,
    Testing,
    Architecture,
    Performance,
    ApiDesign,
    CodeReview,
    Refactoring,
    General,
}

impl TaskType {
    pub const ALL: [TaskType; 11] = [
        TaskType::SecurityAudit,
        TaskType::UiDesign,
        TaskType::BugFix,
        TaskType::Documentation,
        TaskType::Testing,
        TaskType::Architecture,
        TaskType::Performance,
        TaskType::ApiDesign,
        TaskType::CodeReview,
        TaskType::Refactoring,
        TaskType::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::SecurityAudit => "security-audit",
            TaskType::UiDesign => "ui-design",
            TaskType::BugFix => "bug-fix",
            TaskType::Documentation => "documentation",
            TaskType::Testing => "testing",
            TaskType::Architecture => "architecture",
            TaskType::Performance => "performance",
            TaskType::ApiDesign => "api-design",
            TaskType::CodeReview => "code-review",
            TaskType::Refactoring => "refactoring",
            TaskType::General => "general",
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
