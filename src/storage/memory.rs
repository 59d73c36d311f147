// In-memory session storage for tests and embedders

use anyhow::Result;
use dashmap::DashMap;

use super::TokenStore;

/// Thread-safe in-memory key-value store
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_absent_key() {
        let store = MemoryStore::new();
        assert_eq!(store.get("accessToken").unwrap(), None);
        store.remove("accessToken").unwrap();
    }

    proptest! {
        #[test]
        fn prop_set_then_get_returns_value(key in "\\PC{1,64}", value in "\\PC{0,256}") {
            let store = MemoryStore::new();
            store.set(&key, &value).unwrap();
            prop_assert_eq!(store.get(&key).unwrap(), Some(value));
        }

        #[test]
        fn prop_remove_then_get_returns_none(key in "\\PC{1,64}", value in "\\PC{0,256}") {
            let store = MemoryStore::new();
            store.set(&key, &value).unwrap();
            store.remove(&key).unwrap();
            prop_assert_eq!(store.get(&key).unwrap(), None);
        }
    }
}
