//! In-memory credential holder with durable rotation.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::domain::Credentials;
use crate::error::Result;
use crate::port::CredentialPersistence;

/// Current credentials shared by the token manager and the API client.
pub struct CredentialStore {
    current: RwLock<Credentials>,
    persistence: Arc<dyn CredentialPersistence>,
}

impl CredentialStore {
    pub fn new(credentials: Credentials, persistence: Arc<dyn CredentialPersistence>) -> Self {
        Self {
            current: RwLock::new(credentials),
            persistence,
        }
    }

    /// Copy of the current credentials.
    #[must_use]
    pub fn snapshot(&self) -> Credentials {
        self.current.read().clone()
    }

    #[must_use]
    pub fn access_token(&self) -> String {
        self.current.read().access_token.clone()
    }

    /// Install a new token pair and persist it.
    ///
    /// Memory is updated first so the running process keeps working even when
    /// the durable write fails. A missing `refresh_token` keeps the current one.
    ///
    /// # Errors
    ///
    /// Returns the persistence error; the in-memory rotation stands.
    pub fn rotate(&self, access_token: String, refresh_token: Option<String>) -> Result<()> {
        let (access, refresh) = {
            let mut current = self.current.write();
            current.access_token = access_token;
            if let Some(refresh) = refresh_token.filter(|r| !r.is_empty()) {
                current.refresh_token = refresh;
            }
            (current.access_token.clone(), current.refresh_token.clone())
        };

        match self.persistence.save(&access, &refresh) {
            Ok(()) => {
                info!(store = %self.persistence.describe(), "Rotated credentials persisted");
                Ok(())
            }
            Err(e) => {
                warn!(
                    store = %self.persistence.describe(),
                    error = %e,
                    "Failed to persist rotated credentials"
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::collaborators::MemoryCredentials;
    use crate::testkit::domain::credentials;

    #[test]
    fn rotate_updates_memory_and_persists_pair() {
        let persistence = MemoryCredentials::new();
        let store = CredentialStore::new(credentials(), Arc::new(persistence.clone()));

        store
            .rotate("access-1".into(), Some("refresh-1".into()))
            .unwrap();

        assert_eq!(store.access_token(), "access-1");
        assert_eq!(store.snapshot().refresh_token, "refresh-1");
        assert_eq!(
            persistence.saved(),
            vec![("access-1".to_string(), "refresh-1".to_string())]
        );
    }

    #[test]
    fn rotate_without_refresh_token_keeps_previous_one() {
        let persistence = MemoryCredentials::new();
        let store = CredentialStore::new(credentials(), Arc::new(persistence.clone()));

        store.rotate("access-1".into(), None).unwrap();

        assert_eq!(
            persistence.saved(),
            vec![("access-1".to_string(), "refresh-0".to_string())]
        );
    }

    #[test]
    fn persistence_failure_still_rotates_in_memory() {
        let store = CredentialStore::new(credentials(), Arc::new(MemoryCredentials::failing()));

        let result = store.rotate("access-1".into(), Some("refresh-1".into()));

        assert!(result.is_err());
        assert_eq!(store.access_token(), "access-1");
        assert_eq!(store.snapshot().refresh_token, "refresh-1");
    }
}
