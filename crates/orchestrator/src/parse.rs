//! Tolerant vote-reply parser (§4.5, §6, §9 "dynamic vote-reply parsing").
//!
//! Accepts the canonical `VOTE:`/`CONFIDENCE:`/`REASONING:` form plus a
//! heuristic fallback over free text. Contract is the closed
//! `{approved, confidence, comment}` triple below — never a richer type,
//! since the LLM's actual words are never trusted beyond this.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedVote {
    pub approved: bool,
    pub confidence: f64,
    pub comment: String,
}

const APPROVE_TOKENS: &[&str] = &["APPROVE", "APPROVED", "ACCEPT", "ACCEPTED", "LGTM"];
const REJECT_TOKENS: &[&str] = &["REJECT", "REJECTED", "DENY", "DENIED"];

fn vote_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)VOTE:\s*(APPROVE|REJECT)").unwrap())
}

fn confidence_primary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)CONFIDENCE:\s*([\d.]+)").unwrap())
}

fn confidence_fallback_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)confidence[:\s]+(\d+(?:\.\d+)?)").unwrap())
}

fn reasoning_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)REASONING:\s*(.*)").unwrap())
}

/// Parse a supervisor's vote-round reply.
pub fn parse_vote(text: &str) -> ParsedVote {
    let approved = parse_approval(text);
    let confidence = parse_confidence(text);
    let comment = parse_comment(text);
    ParsedVote { approved, confidence, comment }
}

fn parse_approval(text: &str) -> bool {
    if let Some(caps) = vote_line_re().captures(text) {
        return caps[1].eq_ignore_ascii_case("APPROVE");
    }

    let upper = text.to_uppercase();
    let has_approve = APPROVE_TOKENS.iter().any(|t| upper.contains(t));
    let has_reject = REJECT_TOKENS.iter().any(|t| upper.contains(t));

    match (has_approve, has_reject) {
        (true, false) => true,
        (false, true) => false,
        // Ambiguous or absent — default reject (§9 open question, safe side).
        _ => false,
    }
}

fn parse_confidence(text: &str) -> f64 {
    let raw = confidence_primary_re()
        .captures(text)
        .or_else(|| confidence_fallback_re().captures(text))
        .and_then(|caps| caps[1].parse::<f64>().ok());

    let Some(mut value) = raw else {
        return 0.7;
    };

    if value > 1.0 {
        value /= 100.0;
    }
    value.clamp(0.0, 1.0)
}

fn parse_comment(text: &str) -> String {
    if let Some(caps) = reasoning_re().captures(text) {
        return caps[1].trim().to_string();
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_form() {
        let text = "VOTE: APPROVE\nCONFIDENCE: 0.85\nREASONING: Looks solid, tests pass.";
        let parsed = parse_vote(text);
        assert!(parsed.approved);
        assert_eq!(parsed.confidence, 0.85);
        assert_eq!(parsed.comment, "Looks solid, tests pass.");
    }

    #[test]
    fn canonical_form_is_case_insensitive() {
        let text = "vote: reject\nconfidence: 0.6\nreasoning: missing edge case handling";
        let parsed = parse_vote(text);
        assert!(!parsed.approved);
        assert_eq!(parsed.confidence, 0.6);
    }

    #[test]
    fn falls_back_to_word_match_when_no_canonical_marker() {
        let parsed = parse_vote("LGTM, this is clean code.");
        assert!(parsed.approved);
    }

    #[test]
    fn ambiguous_fallback_defaults_to_reject() {
        let parsed = parse_vote("I have mixed feelings about this change.");
        assert!(!parsed.approved);
    }

    #[test]
    fn both_tokens_present_defaults_to_reject() {
        let parsed = parse_vote("I would normally accept this but I reject it due to risk.");
        assert!(!parsed.approved);
    }

    #[test]
    fn percentage_confidence_is_normalized() {
        let parsed = parse_vote("VOTE: APPROVE\nCONFIDENCE: 85\nREASONING: fine");
        assert_eq!(parsed.confidence, 0.85);
    }

    #[test]
    fn missing_confidence_defaults_to_point_seven() {
        let parsed = parse_vote("VOTE: APPROVE\nREASONING: fine");
        assert_eq!(parsed.confidence, 0.7);
    }
}
