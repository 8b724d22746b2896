/// Typed event stream emitted over the course of a debate (§9
/// "event-based notifications ... become message-passing").
#[derive(Debug, Clone)]
pub enum DebateEvent {
    Started { task_id: String, team: Vec<String> },
    RoundCompleted { task_id: String, round: u32, opinions: usize },
    Finalized { task_id: String, approved: bool },
    Aborted { task_id: String, reason: String },
}
