//! services/client/src/session.rs
//!
//! File-backed implementation of the `SessionStore` port.
//!
//! The process keeps the active session in memory behind an `RwLock` so every
//! outgoing request observes the latest write, and mirrors each change to a
//! single JSON file holding the two persisted values: the bearer token and
//! the serialized user record.

use brochura_core::domain::Session;
use brochura_core::ports::{PortError, PortResult, SessionStore};
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::warn;

pub struct FileSessionStore {
    path: PathBuf,
    current: RwLock<Option<Session>>,
}

impl FileSessionStore {
    /// Opens the store, loading any session persisted by a previous run.
    /// A corrupt or unreadable file is treated as "no session".
    pub fn open(path: PathBuf) -> Self {
        let current = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!("Ignoring corrupt session file {}: {}", path.display(), e);
                    None
                }
            },
            Err(_) => None,
        };

        Self {
            path,
            current: RwLock::new(current),
        }
    }

    fn persist(&self, session: &Session) -> PortResult<()> {
        let raw = serde_json::to_string_pretty(session)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| PortError::Unexpected(e.to_string()))?;
            }
        }
        std::fs::write(&self.path, raw).map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

impl SessionStore for FileSessionStore {
    fn current(&self) -> Option<Session> {
        self.current.read().expect("session lock poisoned").clone()
    }

    fn store(&self, session: &Session) -> PortResult<()> {
        self.persist(session)?;
        *self.current.write().expect("session lock poisoned") = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> PortResult<()> {
        *self.current.write().expect("session lock poisoned") = None;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::Unexpected(e.to_string())),
        }
    }
}
