//! Persistence layer for the session credential
//!
//! This module handles saving and loading the session across restarts. The
//! store is a small JSON object file with the session under a single key, so
//! a reload of the process restores the logged-in state.

use crate::api::types::Session;
use crate::error::Result;
use crate::logging::get_logger;
use serde_json::Value;
use std::path::Path;

/// Key the session object is stored under
const SESSION_KEY: &str = "t";

/// Durable store for the session credential
pub struct SessionStore {
    file_path: String,
    logger: crate::logging::StructuredLogger,
}

impl SessionStore {
    /// Create a store backed by the given file path
    pub fn new(file_path: &str) -> Self {
        let logger = get_logger("persistence");
        Self {
            file_path: file_path.to_string(),
            logger,
        }
    }

    /// Read the persisted session, if any
    ///
    /// A missing file, unreadable contents, or a malformed session all read
    /// as logged-out rather than an error.
    pub fn load(&self) -> Option<Session> {
        let path = Path::new(&self.file_path);
        if !path.exists() {
            return None;
        }

        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                self.logger
                    .warn(&format!("Failed to read session store: {}", e));
                return None;
            }
        };

        let root: Value = serde_json::from_str(&contents).ok()?;
        let session = root.get(SESSION_KEY)?;
        match serde_json::from_value::<Session>(session.clone()) {
            Ok(session) => {
                self.logger.info("Restored session from disk");
                Some(session)
            }
            Err(e) => {
                self.logger
                    .warn(&format!("Discarding malformed stored session: {}", e));
                None
            }
        }
    }

    /// Persist the session to disk
    pub fn save(&self, session: &Session) -> Result<()> {
        let root = serde_json::json!({ SESSION_KEY: session });
        let contents = serde_json::to_string_pretty(&root)?;
        std::fs::write(&self.file_path, contents)?;
        self.logger.debug("Saved session to disk");
        Ok(())
    }

    /// Remove any persisted session; idempotent
    pub fn clear(&self) -> Result<()> {
        let path = Path::new(&self.file_path);
        if path.exists() {
            std::fs::remove_file(path)?;
            self.logger.debug("Cleared session store");
        }
        Ok(())
    }
}
