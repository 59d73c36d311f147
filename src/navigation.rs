// Login navigation seam
// The browser front-end forces a hard redirect to /login when a session
// cannot be recovered; non-browser hosts decide what that means for them

use std::sync::Mutex;

/// Login entry point the client is sent to after an unrecoverable 401
pub const LOGIN_PATH: &str = "/login";

/// Receiver for the forced-login signal
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self);
}

/// Default navigator: log the forced logout and tell the operator what to do
#[derive(Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect_to_login(&self) {
        tracing::warn!(
            target_path = LOGIN_PATH,
            "Session expired and could not be refreshed; run `rodo-admin login` to sign in again"
        );
    }
}

/// Navigator that records redirects, for assertions in tests
#[derive(Default)]
pub struct RecordingNavigator {
    redirects: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths redirected to so far
    pub fn redirects(&self) -> Vec<String> {
        self.redirects
            .lock()
            .expect("navigator mutex poisoned")
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect_to_login(&self) {
        self.redirects
            .lock()
            .expect("navigator mutex poisoned")
            .push(LOGIN_PATH.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_navigator() {
        let navigator = RecordingNavigator::new();
        assert!(navigator.redirects().is_empty());

        navigator.redirect_to_login();
        navigator.redirect_to_login();

        assert_eq!(navigator.redirects(), vec!["/login", "/login"]);
    }
}
