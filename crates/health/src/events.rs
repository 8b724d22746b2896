use crate::status::HealthStatus;

#[derive(Debug, Clone)]
pub enum HealthEvent {
    SessionUpdate { session_id: String, status: HealthStatus },
    Error { session_id: String, message: String, recoverable: bool },
}
