use serde::{Deserialize, Serialize};

/// A supervisor's final approve/reject + confidence + comment for one debate.
///
/// Produced exactly once per supervisor per debate, in the final round.
/// `weight` is a snapshot of the orchestrator's weight map at debate start —
/// later edits to that map never retroactively affect a completed debate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub supervisor: String,
    pub approved: bool,
    pub confidence: f64,
    pub weight: f64,
    pub comment: String,
    pub response_time_ms: u64,
}

impl Vote {
    /// `comment` truncated to 300 chars for use as a dissent excerpt (§4.4).
    pub fn excerpt(&self) -> String {
        truncate_chars(&self.comment, 300)
    }

    /// A vote counts as "strong dissent" when it rejects with confidence > 0.7.
    pub fn is_strong_dissent(&self) -> bool {
        !self.approved && self.confidence > 0.7
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max).collect();
    format!("{truncated}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(approved: bool, confidence: f64) -> Vote {
        Vote {
            supervisor: "gpt-4".into(),
            approved,
            confidence,
            weight: 1.0,
            comment: "looks fine".into(),
            response_time_ms: 100,
        }
    }

    #[test]
    fn strong_dissent_requires_reject_and_high_confidence() {
        assert!(vote(false, 0.71).is_strong_dissent());
        assert!(!vote(false, 0.7).is_strong_dissent());
        assert!(!vote(true, 0.95).is_strong_dissent());
    }

    #[test]
    fn excerpt_truncates_long_comments() {
        let mut v = vote(false, 0.9);
        v.comment = "x".repeat(400);
        let excerpt = v.excerpt();
        assert_eq!(excerpt.chars().count(), 301); // 300 chars + ellipsis
    }
}
