// Session manager
// Owns the credential lifecycle over an injected token store

use anyhow::Result;
use std::sync::Arc;

use crate::auth::types::TokenPair;
use crate::storage::{TokenStore, ACCESS_TOKEN_KEY, IS_AUTHENTICATED_KEY, REFRESH_TOKEN_KEY};

/// Session manager
///
/// Reads go through to the store on every call so a replayed request picks
/// up credentials written by a concurrent refresh.
pub struct SessionManager {
    store: Arc<dyn TokenStore>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// Current access token, if one is stored
    pub fn access_token(&self) -> Result<Option<String>> {
        self.store.get(ACCESS_TOKEN_KEY)
    }

    /// Current refresh token, if one is stored
    pub fn refresh_token(&self) -> Result<Option<String>> {
        self.store.get(REFRESH_TOKEN_KEY)
    }

    /// Whether a login was recorded and not yet cleared
    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self
            .store
            .get(IS_AUTHENTICATED_KEY)?
            .as_deref()
            .map(|v| v == "true")
            .unwrap_or(false))
    }

    /// Persist a fresh login: both tokens plus the authenticated flag
    pub fn store_login(&self, pair: &TokenPair) -> Result<()> {
        self.store.set(ACCESS_TOKEN_KEY, &pair.access_token)?;
        if let Some(ref refresh_token) = pair.refresh_token {
            self.store.set(REFRESH_TOKEN_KEY, refresh_token)?;
        }
        self.store.set(IS_AUTHENTICATED_KEY, "true")?;
        Ok(())
    }

    /// Persist a successful refresh: new access token, and the new refresh
    /// token when the server rotated it
    pub fn apply_refresh(&self, pair: &TokenPair) -> Result<()> {
        self.store.set(ACCESS_TOKEN_KEY, &pair.access_token)?;
        if let Some(ref refresh_token) = pair.refresh_token {
            self.store.set(REFRESH_TOKEN_KEY, refresh_token)?;
        }
        Ok(())
    }

    /// Delete all three session keys
    pub fn clear(&self) -> Result<()> {
        self.store.remove(ACCESS_TOKEN_KEY)?;
        self.store.remove(REFRESH_TOKEN_KEY)?;
        self.store.remove(IS_AUTHENTICATED_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn session() -> SessionManager {
        SessionManager::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_empty_session() {
        let session = session();
        assert_eq!(session.access_token().unwrap(), None);
        assert_eq!(session.refresh_token().unwrap(), None);
        assert!(!session.is_authenticated().unwrap());
    }

    #[test]
    fn test_store_login_sets_all_keys() {
        let session = session();
        session
            .store_login(&TokenPair {
                access_token: "A1".to_string(),
                refresh_token: Some("R1".to_string()),
            })
            .unwrap();

        assert_eq!(session.access_token().unwrap(), Some("A1".to_string()));
        assert_eq!(session.refresh_token().unwrap(), Some("R1".to_string()));
        assert!(session.is_authenticated().unwrap());
    }

    #[test]
    fn test_apply_refresh_keeps_old_refresh_token_when_not_rotated() {
        let session = session();
        session
            .store_login(&TokenPair {
                access_token: "A1".to_string(),
                refresh_token: Some("R1".to_string()),
            })
            .unwrap();

        session
            .apply_refresh(&TokenPair {
                access_token: "A2".to_string(),
                refresh_token: None,
            })
            .unwrap();

        assert_eq!(session.access_token().unwrap(), Some("A2".to_string()));
        assert_eq!(session.refresh_token().unwrap(), Some("R1".to_string()));
    }

    #[test]
    fn test_clear_removes_all_keys() {
        let session = session();
        session
            .store_login(&TokenPair {
                access_token: "A1".to_string(),
                refresh_token: Some("R1".to_string()),
            })
            .unwrap();

        session.clear().unwrap();

        assert_eq!(session.access_token().unwrap(), None);
        assert_eq!(session.refresh_token().unwrap(), None);
        assert!(!session.is_authenticated().unwrap());
    }
}
