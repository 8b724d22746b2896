//! C3 — Dynamic Team Selector: classify task type, pick team + consensus
//! mode + lead.

mod keywords;
mod profiles;
mod templates;

use std::collections::HashMap;

use council_core::{ConsensusMode, Task, TaskType};
use tracing::debug;

pub use profiles::SupervisorProfile;
pub use templates::{default_templates, TeamTemplate, TemplateSet};

/// `detect(task) -> {type, confidence}` (§4.3).
#[derive(Debug, Clone)]
pub struct Detection {
    pub task_type: TaskType,
    pub confidence: f64,
}

/// `selectTeam(task) -> {...}` (§4.3).
#[derive(Debug, Clone)]
pub struct TeamSelection {
    pub team: Vec<String>,
    pub lead: Option<String>,
    pub mode: ConsensusMode,
    pub task_type: TaskType,
    pub confidence: f64,
    pub reasoning: String,
}

pub struct TeamSelector {
    templates: TemplateSet,
    enabled: bool,
    profiles: HashMap<String, SupervisorProfile>,
}

impl Default for TeamSelector {
    fn default() -> Self {
        Self { templates: default_templates(), enabled: true, profiles: HashMap::new() }
    }
}

impl TeamSelector {
    pub fn new(templates: TemplateSet) -> Self {
        Self { templates, enabled: true, profiles: HashMap::new() }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Register (or replace) a supervisor's profile (§3 "SupervisorProfile").
    /// Strengths feed `select_team`'s template-miss fallback (below).
    pub fn register_profile(&mut self, profile: SupervisorProfile) {
        self.profiles.insert(profile.name.clone(), profile);
    }

    /// Rank `candidates` by how well their registered strengths match
    /// `task_type`, reusing the same keyword-scoring `detect` uses so a
    /// strength tag like "sql injection" counts the same way it would in
    /// task text. Returns `None` if no candidate has a registered profile
    /// with a nonzero score. Ties break alphabetically.
    fn best_by_strength(&self, candidates: &[String], task_type: TaskType) -> Option<String> {
        let mut scored: Vec<(String, u32)> = candidates
            .iter()
            .filter_map(|name| {
                let profile = self.profiles.get(name)?;
                let haystack = profile.strengths.join(" ").to_lowercase();
                let score = keywords::score(task_type, &haystack, &[]);
                (score > 0).then(|| (name.clone(), score))
            })
            .collect();
        scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        scored.into_iter().next().map(|(name, _)| name)
    }

    /// Score every known task type against `description + context + file
    /// extensions`; the highest score wins, ties break alphabetically (§4.3).
    pub fn detect(&self, task: &Task) -> Detection {
        let haystack = format!("{} {}", task.description, task.context).to_lowercase();
        let extensions = task.file_extensions();

        let mut scores: Vec<(TaskType, u32)> = keywords::scored_task_types()
            .into_iter()
            .map(|t| (t, keywords::score(t, &haystack, &extensions)))
            .collect();

        let total: u32 = scores.iter().map(|(_, s)| *s).sum();
        if total == 0 {
            return Detection { task_type: TaskType::General, confidence: 0.0 };
        }

        // Highest score wins; ties already broken by the alphabetic order
        // `scored_task_types` was built in, since we scan in that order and
        // only replace the incumbent on a strictly greater score.
        scores.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
        let (best_type, best_score) = scores
            .into_iter()
            .fold(None, |acc: Option<(TaskType, u32)>, (t, s)| match acc {
                Some((_, best)) if s <= best => acc,
                _ => Some((t, s)),
            })
            .expect("scored_task_types is non-empty");

        let confidence = (best_score as f64 / total as f64).clamp(0.0, 1.0);
        Detection { task_type: best_type, confidence }
    }

    /// `selectTeam(task) -> {team, lead, mode, type, confidence, reasoning}`
    /// (§4.3). `available` is the live availability set gathered by the
    /// orchestrator's planning step.
    pub fn select_team(&self, task: &Task, available: &[String]) -> TeamSelection {
        if !self.enabled {
            return self.fallback_all(available, "team selection is disabled");
        }

        let detection = self.detect(task);
        let Some(template) = self.templates.get(detection.task_type) else {
            return self.fallback_all(available, "no template matches the detected task type");
        };

        let intersection: Vec<String> = template
            .supervisors
            .iter()
            .filter(|s| available.iter().any(|a| a == *s))
            .cloned()
            .collect();

        let (team, lead) = if intersection.is_empty() {
            let lead = template
                .lead
                .clone()
                .filter(|l| available.iter().any(|a| a == l))
                .or_else(|| self.best_by_strength(available, detection.task_type));
            (available.to_vec(), lead)
        } else {
            (intersection.clone(), Some(intersection[0].clone()))
        };

        let reasoning = format!(
            "Detected task type '{}' (confidence {:.2}); selected team from template '{}'.",
            detection.task_type, detection.confidence, template.name
        );
        debug!(task_type = %detection.task_type, confidence = detection.confidence, template = %template.name, "team selected");

        TeamSelection {
            team,
            lead,
            mode: template.mode,
            task_type: detection.task_type,
            confidence: detection.confidence,
            reasoning,
        }
    }

    fn fallback_all(&self, available: &[String], reason: &str) -> TeamSelection {
        TeamSelection {
            team: available.to_vec(),
            lead: None,
            mode: ConsensusMode::Weighted,
            task_type: TaskType::General,
            confidence: 0.0,
            reasoning: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(description: &str, files: Vec<&str>) -> Task {
        Task::new("t1", description).with_files(files.into_iter().map(String::from).collect())
    }

    #[test]
    fn detects_security_audit_from_keywords() {
        let selector = TeamSelector::default();
        let detection = selector.detect(&task("Check for sql injection and xss vulnerabilities", vec![]));
        assert_eq!(detection.task_type, TaskType::SecurityAudit);
        assert!(detection.confidence > 0.0);
    }

    #[test]
    fn detects_documentation_from_md_files() {
        let selector = TeamSelector::default();
        let detection = selector.detect(&task("update the readme", vec!["README.md"]));
        assert_eq!(detection.task_type, TaskType::Documentation);
    }

    #[test]
    fn no_keyword_hits_falls_back_to_general() {
        let selector = TeamSelector::default();
        let detection = selector.detect(&task("do the thing", vec![]));
        assert_eq!(detection.task_type, TaskType::General);
        assert_eq!(detection.confidence, 0.0);
    }

    #[test]
    fn disabled_selector_returns_all_available() {
        let mut selector = TeamSelector::default();
        selector.set_enabled(false);
        let available = vec!["a".to_string(), "b".to_string()];
        let selection = selector.select_team(&task("anything", vec![]), &available);
        assert_eq!(selection.team, available);
        assert_eq!(selection.mode, ConsensusMode::Weighted);
        assert!(selection.lead.is_none());
    }

    #[test]
    fn empty_intersection_falls_back_to_available() {
        let selector = TeamSelector::default();
        let available = vec!["someone-else".to_string()];
        let selection = selector.select_team(
            &task("found a sql injection vulnerability", vec![]),
            &available,
        );
        assert_eq!(selection.team, available);
    }

    #[test]
    fn nonempty_intersection_picks_first_as_lead() {
        let selector = TeamSelector::default();
        let available = vec!["gpt-4".to_string(), "gemini".to_string(), "claude".to_string()];
        let selection = selector.select_team(&task("xss vulnerability audit", vec![]), &available);
        assert_eq!(selection.task_type, TaskType::SecurityAudit);
        assert!(selection.team.contains(&"claude".to_string()));
        assert!(selection.lead.is_some());
    }

    #[test]
    fn empty_intersection_picks_lead_by_registered_strength() {
        let mut selector = TeamSelector::default();
        selector.register_profile(SupervisorProfile::new("generalist", "openai").with_strengths(vec!["general".to_string()]));
        selector.register_profile(
            SupervisorProfile::new("security-specialist", "anthropic")
                .with_strengths(vec!["sql injection".to_string(), "xss".to_string()]),
        );
        let available = vec!["generalist".to_string(), "security-specialist".to_string()];

        let selection = selector.select_team(&task("found a sql injection vulnerability", vec![]), &available);

        assert_eq!(selection.team, available);
        assert_eq!(selection.lead.as_deref(), Some("security-specialist"));
    }
}
