use serde::{Deserialize, Serialize};

/// Name, provider, and strength tags for one supervisor (§3
/// "SupervisorProfile"). Strengths are scored against the detected task
/// type the same way task text is (`TeamSelector::best_by_strength`), used
/// to pick a lead when a template's own lead isn't available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorProfile {
    pub name: String,
    pub provider: String,
    pub strengths: Vec<String>,
}

impl SupervisorProfile {
    pub fn new(name: impl Into<String>, provider: impl Into<String>) -> Self {
        Self { name: name.into(), provider: provider.into(), strengths: Vec::new() }
    }

    pub fn with_strengths(mut self, strengths: Vec<String>) -> Self {
        self.strengths = strengths;
        self
    }
}
