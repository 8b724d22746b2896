//! C9/C10 — cross-cutting stores the orchestrator writes into: per-session
//! log rotation (§4.9) and a durable session-descriptor snapshot (§4.10).

mod rotation;
mod session;
mod store;

pub use rotation::{LogEntry, LogRotation, PagedLogs, RotationConfig};
pub use session::{SessionDescriptor, SessionDocument, SessionStatus};
pub use store::{PersistenceConfig, SessionStore};
