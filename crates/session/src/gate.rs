//! Navigation guards

use crate::monitor::CheckState;

/// Everything a gate looks at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateInput {
    /// Whether a complete session is stored
    pub session_present: bool,
    /// State of the expiry check
    pub expiry_check: CheckState,
    /// The location being visited
    pub requested: String,
    /// The location the visitor was previously denied, if any
    pub from: Option<String>,
}

impl GateInput {
    pub fn new(session_present: bool, expiry_check: CheckState, requested: &str) -> Self {
        Self {
            session_present,
            expiry_check,
            requested: requested.to_string(),
            from: None,
        }
    }

    /// Record the location the visitor was previously denied
    pub fn with_from(mut self, from: Option<&str>) -> Self {
        self.from = from.map(str::to_string);
        self
    }
}

/// A redirect issued by a gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Where to go
    pub to: String,
    /// Location to come back to once the target page is done
    pub from: Option<String>,
}

/// Gate verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Show the guarded content
    Render,
    /// Show a transient "verifying session" state
    Verifying,
    /// Navigate elsewhere
    Redirect(Redirect),
}

/// A navigation guard
pub trait RouteGate {
    fn evaluate(&self, input: &GateInput) -> GateOutcome;
}

/// Admits only authenticated sessions
#[derive(Debug, Clone)]
pub struct AuthenticatedGate {
    login_path: String,
}

impl AuthenticatedGate {
    pub fn new(login_path: &str) -> Self {
        Self {
            login_path: login_path.to_string(),
        }
    }
}

impl Default for AuthenticatedGate {
    fn default() -> Self {
        Self::new("/login")
    }
}

impl RouteGate for AuthenticatedGate {
    fn evaluate(&self, input: &GateInput) -> GateOutcome {
        if !input.session_present {
            return GateOutcome::Redirect(Redirect {
                to: self.login_path.clone(),
                from: Some(input.requested.clone()),
            });
        }

        match input.expiry_check {
            CheckState::Pending => GateOutcome::Verifying,
            CheckState::Settled => GateOutcome::Render,
        }
    }
}

/// Admits only visitors without a session (login, registration)
#[derive(Debug, Clone)]
pub struct GuestGate {
    default_path: String,
}

impl GuestGate {
    pub fn new(default_path: &str) -> Self {
        Self {
            default_path: default_path.to_string(),
        }
    }
}

impl Default for GuestGate {
    fn default() -> Self {
        Self::new("/dashboard")
    }
}

impl RouteGate for GuestGate {
    fn evaluate(&self, input: &GateInput) -> GateOutcome {
        if !input.session_present {
            return GateOutcome::Render;
        }

        let to = input
            .from
            .clone()
            .unwrap_or_else(|| self.default_path.clone());
        GateOutcome::Redirect(Redirect { to, from: None })
    }
}
