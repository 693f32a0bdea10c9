//! Authenticated session management for Hestia
//!
//! This module owns the bearer credential: obtaining it through login,
//! restoring it from the durable store at startup, attaching it to outgoing
//! requests, and clearing it when the service signals the session is no
//! longer valid.

use crate::api::ThermostatApi;
use crate::api::types::Session;
use crate::config::SessionConfig;
use crate::error::{HestiaError, Result};
use crate::logging::get_logger;
use crate::persistence::SessionStore;

/// Whether an operation failure must invalidate the session
///
/// Any response with a non-200 status from an authenticated endpoint counts,
/// regardless of the specific code; the service conflates "bad request" and
/// "expired token" and callers must not assume the distinction. Transport
/// failures carry no status and leave the session untouched. Swapping in a
/// stricter 401/403-only policy only requires changing this function.
pub fn invalidates_session(err: &HestiaError) -> bool {
    matches!(err, HestiaError::Api { .. })
}

/// Manager for the process-wide session
pub struct SessionManager {
    /// Durable store backing the session
    store: SessionStore,

    /// Live session, if any
    current: Option<Session>,

    /// Logger
    logger: crate::logging::StructuredLogger,
}

impl SessionManager {
    /// Create a manager, restoring any persisted session
    pub fn new(config: &SessionConfig) -> Self {
        let logger = get_logger("session");
        let store = SessionStore::new(&config.store_path);
        let current = store.load();
        Self {
            store,
            current,
            logger,
        }
    }

    /// The live session, if one exists
    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// The live session, or `Unauthenticated`
    pub fn require(&self) -> Result<&Session> {
        self.current.as_ref().ok_or(HestiaError::Unauthenticated)
    }

    /// Attach the session credential to an outgoing request
    pub fn authorize(&self, request: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        let session = self.require()?;
        Ok(request.header(reqwest::header::AUTHORIZATION, session.header_value()))
    }

    /// Submit credentials; persist and return the session on success
    ///
    /// On rejection any existing session is discarded before the error
    /// propagates, so a failed re-login never leaves a stale credential.
    pub async fn login(
        &mut self,
        api: &dyn ThermostatApi,
        username: &str,
        password: &str,
    ) -> Result<Session> {
        match api.login(username, password).await {
            Ok(session) => {
                self.store.save(&session)?;
                self.current = Some(session.clone());
                self.logger.info("Login succeeded, session stored");
                Ok(session)
            }
            Err(e) => {
                self.logout();
                Err(e)
            }
        }
    }

    /// Clear the session and its persisted copy; idempotent
    pub fn logout(&mut self) {
        if self.current.take().is_some() {
            self.logger.info("Session cleared");
        }
        if let Err(e) = self.store.clear() {
            self.logger
                .warn(&format!("Failed to clear session store: {}", e));
        }
    }

    /// Apply the invalidation policy to a failed authenticated operation
    ///
    /// Returns true when the session was cleared and the caller must treat
    /// the application as logged out.
    pub fn handle_failure(&mut self, err: &HestiaError) -> bool {
        if invalidates_session(err) {
            self.logger
                .warn(&format!("Authenticated call failed, logging out: {}", err));
            self.logout();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_invalidates_on_any_status_error() {
        assert!(invalidates_session(&HestiaError::api(401, "expired")));
        assert!(invalidates_session(&HestiaError::api(403, "forbidden")));
        assert!(invalidates_session(&HestiaError::api(500, "oops")));
        assert!(!invalidates_session(&HestiaError::network(
            "connection refused"
        )));
        assert!(!invalidates_session(&HestiaError::malformed("bad triple")));
    }

    fn test_config(dir: &tempfile::TempDir) -> SessionConfig {
        SessionConfig {
            store_path: dir
                .path()
                .join("session.json")
                .to_string_lossy()
                .to_string(),
            username: "username".to_string(),
        }
    }

    #[test]
    fn require_without_session_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = SessionManager::new(&test_config(&dir));
        assert!(mgr.current().is_none());
        assert!(matches!(mgr.require(), Err(HestiaError::Unauthenticated)));
    }

    #[test]
    fn authorize_attaches_the_credential() {
        let dir = tempfile::tempdir().unwrap();
        let mut mgr = SessionManager::new(&test_config(&dir));

        let client = reqwest::Client::new();
        assert!(mgr.authorize(client.get("http://localhost/")).is_err());

        mgr.current = Some(Session {
            token_type: "bearer".to_string(),
            access_token: "tok".to_string(),
        });
        let request = mgr
            .authorize(client.get("http://localhost/"))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            request
                .headers()
                .get(reqwest::header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok()),
            Some("bearer tok")
        );
    }
}
