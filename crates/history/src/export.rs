use anyhow::Result;
use council_core::DebateRecord;

pub const CSV_HEADER: &str = "id,timestamp,task_id,task_description,approved,consensus,weighted_consensus,consensus_mode,supervisor_count,participating_supervisors,duration_ms,session_id,task_type";

/// Double-quote a CSV field, doubling any embedded quotes (§6).
fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

pub fn to_json(records: &[DebateRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// `export(csv)` (§6) — fixed header, ISO-8601 UTC timestamps, description
/// and supervisor list quoted with embedded quotes doubled.
pub fn to_csv(records: &[DebateRecord]) -> String {
    let mut out = String::new();
    out.push_str(CSV_HEADER);
    out.push('\n');

    for record in records {
        let participating = record.meta.participating_supervisors.join("; ");
        let row = [
            record.id.clone(),
            record.timestamp.to_rfc3339(),
            record.task.id.clone(),
            quote(&record.task.description),
            record.decision.approved.to_string(),
            record.decision.consensus.to_string(),
            record.decision.weighted_consensus.to_string(),
            record.meta.consensus_mode.to_string(),
            record.decision.votes.len().to_string(),
            quote(&participating),
            record.meta.duration_ms.to_string(),
            record.meta.session_id.clone().unwrap_or_default(),
            record.meta.task_type.clone().unwrap_or_default(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use council_core::{ConsensusMode, DebateMeta, Decision, Task};

    fn sample_record() -> DebateRecord {
        DebateRecord {
            id: "debate_1".into(),
            timestamp: Utc::now(),
            task: Task::new("t1", "Fix the \"quoting\" bug"),
            decision: Decision::from_votes(true, vec![], "auto-approved".into()),
            meta: DebateMeta {
                rounds_used: 1,
                consensus_mode: ConsensusMode::Weighted,
                lead_supervisor: None,
                dynamic_selection_summary: String::new(),
                duration_ms: 10,
                participating_supervisors: vec!["gpt-4".into(), "claude".into()],
                session_id: Some("s1".into()),
                task_type: Some("bug-fix".into()),
            },
        }
    }

    #[test]
    fn csv_header_is_fixed_order() {
        let csv = to_csv(&[]);
        assert_eq!(csv.trim_end(), CSV_HEADER);
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        let csv = to_csv(&[sample_record()]);
        assert!(csv.contains("\"Fix the \"\"quoting\"\" bug\""));
    }
}
