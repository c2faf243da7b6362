//! Persisted login marker.
//!
//! The only client state that survives a process exit: who is logged in and
//! the token the backend issued for them. Everything else is re-fetched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use everything_store_core::SessionToken;

use crate::api::User;

/// Errors reading or writing the session marker.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session file I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// What is remembered about a login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMarker {
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<SessionToken>,
    pub saved_at: DateTime<Utc>,
}

impl SessionMarker {
    /// Marker for a login that just happened.
    #[must_use]
    pub fn new(user: User, token: Option<SessionToken>) -> Self {
        Self {
            user,
            token,
            saved_at: Utc::now(),
        }
    }
}

/// Storage for the session marker.
pub trait SessionStore: Send + Sync {
    /// Read the marker. `Ok(None)` when nobody is logged in.
    ///
    /// # Errors
    ///
    /// Returns error if the marker exists but cannot be read or parsed.
    fn load(&self) -> Result<Option<SessionMarker>, SessionError>;

    /// Write the marker, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns error if the marker cannot be written.
    fn save(&self, marker: &SessionMarker) -> Result<(), SessionError>;

    /// Remove the marker. Removing a missing marker is not an error.
    ///
    /// # Errors
    ///
    /// Returns error if the marker exists but cannot be removed.
    fn clear(&self) -> Result<(), SessionError>;
}

// =============================================================================
// File store
// =============================================================================

/// Marker kept as a JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionMarker>, SessionError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn save(&self, marker: &SessionMarker) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let json = serde_json::to_string_pretty(marker)?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

// =============================================================================
// In-memory store
// =============================================================================

/// Marker kept in memory only; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    marker: Mutex<Option<SessionMarker>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a marker, as if a previous run had logged in.
    #[must_use]
    pub fn with_marker(marker: SessionMarker) -> Self {
        Self {
            marker: Mutex::new(Some(marker)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<SessionMarker>, SessionError> {
        Ok(self
            .marker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, marker: &SessionMarker) -> Result<(), SessionError> {
        *self.marker.lock().unwrap_or_else(PoisonError::into_inner) = Some(marker.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.marker.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
