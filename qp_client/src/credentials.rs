//! Persisted viewer credentials.
//!
//! One JSON record on disk: loaded on start, cleared on logout. A record
//! that fails to parse is treated as "no session" and removed, so a corrupt
//! file can never crash startup or wedge the client into a broken login.

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The locally persisted session record.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct StoredSession {
    pub player_id: String,
    pub name: String,
    pub token: String,
}

/// File-backed store for the viewer's session record.
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location under the user's home directory.
    pub fn default_path() -> PathBuf {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".qp_session.json")
    }

    /// Load the stored session, clearing a corrupt record.
    pub fn load(&self) -> Option<StoredSession> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(error) => {
                warn!("clearing corrupt session record: {error}");
                self.clear();
                None
            }
        }
    }

    /// Persist the session record.
    pub fn save(&self, session: &StoredSession) -> Result<()> {
        let raw = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }

    /// Remove the stored record, if any.
    pub fn clear(&self) {
        let _ = fs::remove_file(&self.path);
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
