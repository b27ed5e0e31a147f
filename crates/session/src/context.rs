//! The shared session context: one place that owns the token store and the
//! "clear session and redirect" operation.

use std::fmt;
use std::sync::{Arc, Mutex};

use log::{info, warn};

use crate::error::Result;
use crate::storage::Storage;
use crate::store::{Session, TokenStore};

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogoutReason {
    /// The token expired or the server rejected it
    Expired,
    /// The stored token could not be decoded
    Error,
    /// The user asked to sign out
    SignedOut,
}

impl LogoutReason {
    /// Query string the login page reads to pick its banner
    pub fn query(&self) -> &'static str {
        match self {
            Self::Expired => "session=expired",
            Self::Error => "session=error",
            Self::SignedOut => "message=logout",
        }
    }
}

impl fmt::Display for LogoutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => write!(f, "expired"),
            Self::Error => write!(f, "error"),
            Self::SignedOut => write!(f, "signed out"),
        }
    }
}

/// Performs navigation on behalf of the session layer
pub trait Navigator: Send + Sync {
    fn redirect(&self, location: &str);
}

/// A navigator that records every redirect in order.
///
/// Useful for headless front-ends and tests.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    entries: Mutex<Vec<String>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// All redirects so far, oldest first
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The most recent redirect
    pub fn current(&self) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }
}

impl Navigator for HistoryNavigator {
    fn redirect(&self, location: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(location.to_string());
    }
}

/// Session state injected into every component that needs identity
pub struct SessionContext {
    store: TokenStore,
    navigator: Arc<dyn Navigator>,
    login_path: String,
    // serializes clear + redirect
    teardown: Mutex<()>,
}

impl SessionContext {
    pub fn new(storage: Arc<dyn Storage>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            store: TokenStore::new(storage),
            navigator,
            login_path: "/login".to_string(),
            teardown: Mutex::new(()),
        }
    }

    /// Set the path of the login page
    pub fn with_login_path(mut self, path: &str) -> Self {
        self.login_path = path.to_string();
        self
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// The current session, if complete
    pub fn session(&self) -> Option<Session> {
        self.store.load()
    }

    /// Bearer token of the current session. A token stored without its
    /// user is integrity-cleared and never handed out.
    pub fn token(&self) -> Option<String> {
        self.store.load().map(|session| session.token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    /// Persist a freshly issued session
    pub fn establish(&self, session: &Session) -> Result<()> {
        self.store.save(session)?;
        info!("Session established for user {}", session.user.id);
        Ok(())
    }

    /// Navigate without touching the session
    pub fn redirect(&self, location: &str) {
        self.navigator.redirect(location);
    }

    /// Login location for `reason`, e.g. `/login?session=expired`
    pub fn login_location(&self, reason: LogoutReason) -> String {
        format!("{}?{}", self.login_path, reason.query())
    }

    /// Clear the session and redirect to login.
    ///
    /// Only acts when something is stored, so a burst of callers produces a
    /// single clear and a single redirect. Returns whether this call ended
    /// the session.
    pub fn end_session(&self, reason: LogoutReason) -> bool {
        let _guard = self.teardown.lock().unwrap_or_else(|e| e.into_inner());
        if !self.store.has_any() {
            return false;
        }

        self.store.clear();
        warn!("Session ended: {}", reason);
        self.navigator.redirect(&self.login_location(reason));
        true
    }

    /// Clear whatever is stored and redirect, whether or not a session
    /// was present.
    pub fn sign_out(&self) {
        let _guard = self.teardown.lock().unwrap_or_else(|e| e.into_inner());
        self.store.clear();
        info!("Signed out");
        self.navigator
            .redirect(&self.login_location(LogoutReason::SignedOut));
    }
}
