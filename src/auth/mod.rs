// Authentication module
// Wire types and the silent refresh call

pub mod refresh;
pub mod types;

pub use refresh::{refresh_session, REFRESH_PATH};
pub use types::TokenPair;
