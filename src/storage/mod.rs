//! Storage abstraction layer for session records
//!
//! The engine talks to [`SessionStore`] only. Two backends ship: an
//! in-memory map and a directory of JSON documents.

pub mod backends;
pub mod error;
pub mod patch;
pub mod traits;


pub use backends::{FileBackend, MemoryBackend};
pub use error::{StoreError, StoreResult};
pub use patch::{apply_patch, SessionPatch};
pub use traits::SessionStore;

use crate::config::{BackendType, StorageSettings};
use std::sync::Arc;
use tracing::info;

/// Build the configured session store
pub async fn open_store(settings: &StorageSettings) -> StoreResult<Arc<dyn SessionStore>> {
    match settings.backend {
        BackendType::Memory => {
            info!("Using in-memory session store");
            Ok(Arc::new(MemoryBackend::new()))
        }
        BackendType::File => {
            let dir = settings.effective_dir();
            info!("Using file session store at {}", dir.display());
            Ok(Arc::new(FileBackend::new(dir).await?))
        }
    }
}
