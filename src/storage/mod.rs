// Session storage module
// Key-value persistence for the credential pair and the authenticated flag

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use anyhow::Result;

/// Storage key for the short-lived bearer token
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Storage key for the long-lived refresh token
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Storage key for the authenticated flag (string "true" or absent)
pub const IS_AUTHENTICATED_KEY: &str = "isAuthenticated";

/// Persistent key-value store for session credentials
///
/// Injected into the session manager so tests can substitute an in-memory
/// implementation for the SQLite-backed one.
pub trait TokenStore: Send + Sync {
    /// Read a value by key, `None` if absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key; deleting an absent key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}
