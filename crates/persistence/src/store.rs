//! Durable document store for [`SessionDocument`] (§4.10): an in-memory
//! dirty flag plus periodic flush, atomic tmp-file-then-rename write, the
//! same crash-safety shape as the debate history log but for a single
//! whole-document snapshot instead of an append-only line stream.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::session::{SessionDescriptor, SessionDocument, SessionStatus};

#[derive(Debug, Clone, Copy)]
pub struct PersistenceConfig {
    pub max_persisted_sessions: usize,
    pub flush_interval_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self { max_persisted_sessions: 500, flush_interval_ms: 5_000 }
    }
}

pub struct SessionStore {
    path: PathBuf,
    config: PersistenceConfig,
    document: RwLock<SessionDocument>,
    dirty: AtomicBool,
}

impl SessionStore {
    /// Load the document from `path` if it exists, else start empty.
    pub async fn open(path: impl Into<PathBuf>, config: PersistenceConfig) -> Result<Self> {
        let path = path.into();
        let document = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => SessionDocument::default(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, config, document: RwLock::new(document), dirty: AtomicBool::new(false) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `persist(session)` — insert or update by id; evict the oldest
    /// non-running session if over `maxPersistedSessions` (§4.10).
    pub async fn persist(&self, mut session: SessionDescriptor) {
        session.updated_at = chrono::Utc::now();
        let mut doc = self.document.write().await;

        if let Some(existing) = doc.sessions.iter_mut().find(|s| s.id == session.id) {
            *existing = session;
        } else {
            doc.sessions.push(session);
        }

        while doc.sessions.len() > self.config.max_persisted_sessions {
            let evict_idx = doc
                .sessions
                .iter()
                .enumerate()
                .filter(|(_, s)| !s.status.is_running())
                .min_by_key(|(_, s)| s.created_at)
                .map(|(idx, _)| idx);

            match evict_idx {
                Some(idx) => {
                    doc.sessions.remove(idx);
                }
                None => break,
            }
        }

        doc.updated_at = chrono::Utc::now();
        drop(doc);
        self.dirty.store(true, Ordering::SeqCst);
    }

    pub async fn get(&self, id: &str) -> Option<SessionDescriptor> {
        self.document.read().await.sessions.iter().find(|s| s.id == id).cloned()
    }

    pub async fn remove(&self, id: &str) {
        let mut doc = self.document.write().await;
        doc.sessions.retain(|s| s.id != id);
        doc.updated_at = chrono::Utc::now();
        drop(doc);
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Sessions resumable on startup: status in {running, paused, starting}
    /// (§4.10).
    pub async fn resumable(&self) -> Vec<SessionDescriptor> {
        self.document.read().await.sessions.iter().filter(|s| s.status.is_resumable()).cloned().collect()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Flush the document to disk if dirty; no-op otherwise.
    pub async fn flush(&self) -> Result<()> {
        if !self.dirty.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp_path = {
            let filename = self.path.file_name().map(|f| f.to_string_lossy().to_string()).unwrap_or_else(|| "sessions.json".to_string());
            self.path.with_file_name(format!("{filename}.tmp"))
        };

        let write_result: Result<()> = async {
            let contents = {
                let doc = self.document.read().await;
                serde_json::to_string_pretty(&*doc)?
            };
            let mut file = tokio::fs::OpenOptions::new().create(true).write(true).truncate(true).open(&tmp_path).await?;
            file.write_all(contents.as_bytes()).await?;
            file.flush().await?;
            file.sync_all().await?;
            Ok(())
        }
        .await;

        if let Err(err) = write_result {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            self.dirty.store(true, Ordering::SeqCst);
            return Err(err);
        }

        if let Err(err) = tokio::fs::rename(&tmp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            self.dirty.store(true, Ordering::SeqCst);
            return Err(err.into());
        }

        Ok(())
    }

    /// Spawn the periodic flush loop; stops when `shutdown` fires.
    pub fn spawn_flush_loop(self: std::sync::Arc<Self>, shutdown: &tokio::sync::watch::Sender<bool>) {
        let mut rx = shutdown.subscribe();
        let interval = std::time::Duration::from_millis(self.config.flush_interval_ms);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {
                        if let Err(err) = self.flush().await {
                            tracing::warn!(error = %err, "periodic session flush failed");
                        }
                    }
                    changed = rx.changed() => {
                        if changed.is_ok() && *rx.borrow() {
                            let _ = self.flush().await;
                            break;
                        }
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: &str, status: SessionStatus) -> SessionDescriptor {
        let mut d = SessionDescriptor::new(id, "test session");
        d.status = status;
        d
    }

    #[tokio::test]
    async fn persist_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path().join("sessions.json"), PersistenceConfig::default()).await.unwrap();
        store.persist(descriptor("s1", SessionStatus::Running)).await;
        let fetched = store.get("s1").await.unwrap();
        assert_eq!(fetched.status, SessionStatus::Running);
    }

    #[tokio::test]
    async fn flush_then_reopen_restores_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        let store = SessionStore::open(&path, PersistenceConfig::default()).await.unwrap();
        store.persist(descriptor("s1", SessionStatus::Paused)).await;
        store.flush().await.unwrap();
        assert!(!store.is_dirty());

        let reopened = SessionStore::open(&path, PersistenceConfig::default()).await.unwrap();
        let fetched = reopened.get("s1").await.unwrap();
        assert_eq!(fetched.status, SessionStatus::Paused);
    }

    #[tokio::test]
    async fn resumable_filters_to_running_paused_starting() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path().join("sessions.json"), PersistenceConfig::default()).await.unwrap();
        store.persist(descriptor("s1", SessionStatus::Running)).await;
        store.persist(descriptor("s2", SessionStatus::Completed)).await;
        store.persist(descriptor("s3", SessionStatus::Starting)).await;

        let resumable = store.resumable().await;
        let ids: Vec<&str> = resumable.iter().map(|s| s.id.as_str()).collect();
        assert!(ids.contains(&"s1"));
        assert!(ids.contains(&"s3"));
        assert!(!ids.contains(&"s2"));
    }

    #[tokio::test]
    async fn eviction_prefers_oldest_non_running_session() {
        let dir = tempfile::tempdir().unwrap();
        let config = PersistenceConfig { max_persisted_sessions: 2, ..Default::default() };
        let store = SessionStore::open(dir.path().join("sessions.json"), config).await.unwrap();

        store.persist(descriptor("old-completed", SessionStatus::Completed)).await;
        store.persist(descriptor("running", SessionStatus::Running)).await;
        store.persist(descriptor("new", SessionStatus::Starting)).await;

        assert!(store.get("old-completed").await.is_none());
        assert!(store.get("running").await.is_some());
        assert!(store.get("new").await.is_some());
    }
}
