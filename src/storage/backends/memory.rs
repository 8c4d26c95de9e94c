//! In-memory session store

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::session::{Session, SessionFilter, SessionId};
use crate::storage::{
    error::{StoreError, StoreResult},
    patch::{apply_patch, SessionPatch},
    traits::SessionStore,
};

/// Session store backed by a process-local map
#[derive(Default)]
pub struct MemoryBackend {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryBackend {
    async fn create(&self, session: &Session) -> StoreResult<()> {
        let mut sessions = self.sessions.write().await;

        if let Some(existing) = sessions
            .values()
            .find(|s| s.status.is_active() && s.same_slot(session))
        {
            return Err(StoreError::ActiveSessionExists {
                existing: existing.id.clone(),
            });
        }

        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &SessionId) -> StoreResult<Option<Session>> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn update_fields(&self, id: &SessionId, patch: SessionPatch) -> StoreResult<Session> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        // Work on a copy so a rejected patch leaves the record untouched
        let mut updated = session.clone();
        apply_patch(&mut updated, patch)?;
        *session = updated.clone();
        Ok(updated)
    }

    async fn list(&self, filter: &SessionFilter) -> StoreResult<Vec<Session>> {
        let sessions = self.sessions.read().await;
        let matching = sessions
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        Ok(filter.finish(matching))
    }
}
