//! File-based session store
//!
//! One pretty-printed JSON document per session under `<base>/sessions`.
//! Writes go to a temporary file first and are renamed into place.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::warn;

use crate::session::{Session, SessionFilter, SessionId};
use crate::storage::{
    error::{StoreError, StoreResult},
    patch::{apply_patch, SessionPatch},
    traits::SessionStore,
};

/// File-based session store
pub struct FileBackend {
    sessions_dir: PathBuf,
    /// Serializes every read-modify-write against the directory
    write_lock: Mutex<()>,
}

impl FileBackend {
    /// Create a new file backend, creating the directory if needed
    pub async fn new(base_dir: impl AsRef<Path>) -> StoreResult<Self> {
        let sessions_dir = base_dir.as_ref().join("sessions");
        fs::create_dir_all(&sessions_dir).await?;

        Ok(Self {
            sessions_dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn sessions_dir(&self) -> &Path {
        &self.sessions_dir
    }

    fn session_path(&self, id: &SessionId) -> PathBuf {
        self.sessions_dir.join(format!("{}.json", id.as_str()))
    }

    async fn read_session(&self, path: &Path) -> StoreResult<Session> {
        let content = fs::read_to_string(path).await?;
        serde_json::from_str(&content)
            .map_err(|e| StoreError::Corrupted(format!("{}: {}", path.display(), e)))
    }

    async fn write_session(&self, session: &Session) -> StoreResult<()> {
        let path = self.session_path(&session.id);
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(session)?;
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn load_all(&self) -> StoreResult<Vec<Session>> {
        let mut sessions = Vec::new();
        let mut entries = fs::read_dir(&self.sessions_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            match self.read_session(&path).await {
                Ok(session) => sessions.push(session),
                Err(e) => warn!("Skipping unreadable session file: {}", e),
            }
        }

        Ok(sessions)
    }
}

#[async_trait]
impl SessionStore for FileBackend {
    async fn create(&self, session: &Session) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;

        if let Some(existing) = self
            .load_all()
            .await?
            .into_iter()
            .find(|s| s.status.is_active() && s.same_slot(session))
        {
            return Err(StoreError::ActiveSessionExists {
                existing: existing.id,
            });
        }

        self.write_session(session).await
    }

    async fn find_by_id(&self, id: &SessionId) -> StoreResult<Option<Session>> {
        let path = self.session_path(id);
        if !fs::try_exists(&path).await? {
            return Ok(None);
        }
        self.read_session(&path).await.map(Some)
    }

    async fn update_fields(&self, id: &SessionId, patch: SessionPatch) -> StoreResult<Session> {
        let _guard = self.write_lock.lock().await;

        let mut session = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        apply_patch(&mut session, patch)?;
        self.write_session(&session).await?;
        Ok(session)
    }

    async fn list(&self, filter: &SessionFilter) -> StoreResult<Vec<Session>> {
        let matching = self
            .load_all()
            .await?
            .into_iter()
            .filter(|s| filter.matches(s))
            .collect();
        Ok(filter.finish(matching))
    }
}
