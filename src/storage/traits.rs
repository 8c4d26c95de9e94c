//! Core trait definitions for the storage abstraction layer

use async_trait::async_trait;

use super::error::StoreResult;
use super::patch::SessionPatch;
use crate::session::{Session, SessionFilter, SessionId};

/// Session persistence
///
/// Implementations must make `create` and `update_fields` atomic with
/// respect to each other: the active-slot check in `create` and the status
/// guard in `update_fields` are evaluated under the same write lock as the
/// write itself.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new session, rejecting it when its slot is taken
    async fn create(&self, session: &Session) -> StoreResult<()>;

    /// Load a session by ID
    async fn find_by_id(&self, id: &SessionId) -> StoreResult<Option<Session>>;

    /// Apply a patch and return the updated record
    async fn update_fields(&self, id: &SessionId, patch: SessionPatch) -> StoreResult<Session>;

    /// List sessions matching filter criteria, newest first
    async fn list(&self, filter: &SessionFilter) -> StoreResult<Vec<Session>>;
}
