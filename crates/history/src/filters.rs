use chrono::{DateTime, Utc};
use council_core::DebateRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Timestamp,
    Consensus,
    Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// `query(filters) -> list` (§4.6).
#[derive(Debug, Clone, Default)]
pub struct QueryFilters {
    pub session_id: Option<String>,
    pub task_type: Option<String>,
    pub approved: Option<bool>,
    /// Applied as a post-filter over `votes`, since participation is not
    /// independently indexed.
    pub supervisor_name: Option<String>,
    pub from_ts: Option<DateTime<Utc>>,
    pub to_ts: Option<DateTime<Utc>>,
    pub min_consensus: Option<f64>,
    pub max_consensus: Option<f64>,
    pub sort_by: Option<SortField>,
    pub sort_order: SortOrder,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Desc
    }
}

impl QueryFilters {
    fn matches(&self, record: &DebateRecord) -> bool {
        if let Some(ref session_id) = self.session_id {
            if record.meta.session_id.as_deref() != Some(session_id.as_str()) {
                return false;
            }
        }
        if let Some(ref task_type) = self.task_type {
            if record.meta.task_type.as_deref() != Some(task_type.as_str()) {
                return false;
            }
        }
        if let Some(approved) = self.approved {
            if record.decision.approved != approved {
                return false;
            }
        }
        if let Some(ref name) = self.supervisor_name {
            if !record.decision.votes.iter().any(|v| &v.supervisor == name) {
                return false;
            }
        }
        if let Some(from) = self.from_ts {
            if record.timestamp < from {
                return false;
            }
        }
        if let Some(to) = self.to_ts {
            if record.timestamp > to {
                return false;
            }
        }
        if let Some(min) = self.min_consensus {
            if record.decision.consensus < min {
                return false;
            }
        }
        if let Some(max) = self.max_consensus {
            if record.decision.consensus > max {
                return false;
            }
        }
        true
    }
}

/// Filter, sort, then paginate `records` per `filters`.
pub fn apply(records: &[DebateRecord], filters: &QueryFilters) -> Vec<DebateRecord> {
    let mut matched: Vec<&DebateRecord> = records.iter().filter(|r| filters.matches(r)).collect();

    if let Some(sort_by) = filters.sort_by {
        matched.sort_by(|a, b| {
            let ordering = match sort_by {
                SortField::Timestamp => a.timestamp.cmp(&b.timestamp),
                SortField::Consensus => a.decision.consensus.partial_cmp(&b.decision.consensus).unwrap(),
                SortField::Duration => a.meta.duration_ms.cmp(&b.meta.duration_ms),
            };
            match filters.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
    }

    let offset = filters.offset.min(matched.len());
    let rest = &matched[offset..];
    let limited = match filters.limit {
        Some(limit) => &rest[..rest.len().min(limit)],
        None => rest,
    };
    limited.iter().map(|r| (*r).clone()).collect()
}
