//! Session persistence
//!
//! Stores whole-application state between runs. The disk store keeps a
//! versioned JSON file in the profile directory; the memory store backs
//! ephemeral sessions and tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

use kestrel_core::state::{AppState, FORMAT_VERSION};

/// Session store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No saved session")]
    NotFound,

    #[error("Saved session is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Saved session format {0} is not supported")]
    UnsupportedVersion(u32),

    #[error("Failed to access session file: {0}")]
    Io(#[from] std::io::Error),
}

/// Persistence seam for the application's session state
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the previously saved state
    async fn load(&self) -> Result<AppState, StoreError>;

    /// Persist the given state
    async fn save(&self, state: &AppState) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: SessionStore + ?Sized> SessionStore for Arc<S> {
    async fn load(&self) -> Result<AppState, StoreError> {
        (**self).load().await
    }

    async fn save(&self, state: &AppState) -> Result<(), StoreError> {
        (**self).save(state).await
    }
}

/// Session store backed by a JSON file
pub struct DiskStore {
    path: PathBuf,
}

impl DiskStore {
    /// Store at an explicit file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the conventional location inside a profile directory
    pub fn in_profile(profile_dir: &Path) -> Self {
        Self::new(profile_dir.join("session.json"))
    }

    /// Path of the session file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStore for DiskStore {
    async fn load(&self) -> Result<AppState, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound);
            }
            Err(e) => return Err(e.into()),
        };

        let state: AppState = serde_json::from_slice(&bytes)?;
        if state.format_version > FORMAT_VERSION {
            return Err(StoreError::UnsupportedVersion(state.format_version));
        }

        log::debug!("Loaded session: {} windows", state.windows.len());
        Ok(state)
    }

    async fn save(&self, state: &AppState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(state)?;

        // Write atomically using temp file + rename
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &bytes).await?;

        // Set restrictive permissions: payloads carry whatever the
        // surfaces chose to save
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&temp_path, perms).await?;
        }

        tokio::fs::rename(&temp_path, &self.path).await?;

        log::trace!("Wrote session state: {} bytes", bytes.len());

        Ok(())
    }
}

/// In-memory session store for ephemeral sessions and tests
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    state: Option<AppState>,
    saves: u32,
}

impl MemoryStore {
    /// Empty store; loads report `NotFound`
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with a state to restore
    pub fn with_state(state: AppState) -> Self {
        Self {
            inner: Mutex::new(MemoryStoreInner {
                state: Some(state),
                saves: 0,
            }),
        }
    }

    /// Number of times `save` was called
    pub fn save_count(&self) -> u32 {
        self.inner.lock().saves
    }

    /// Most recently saved state, if any
    pub fn saved_state(&self) -> Option<AppState> {
        self.inner.lock().state.clone()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self) -> Result<AppState, StoreError> {
        self.inner.lock().state.clone().ok_or(StoreError::NotFound)
    }

    async fn save(&self, state: &AppState) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner.state = Some(state.clone());
        inner.saves += 1;
        Ok(())
    }
}
