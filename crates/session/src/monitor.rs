//! Token expiry monitoring

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::claims::TokenClaims;
use crate::context::{LogoutReason, SessionContext};

/// How long before expiry the warning fires
pub const DEFAULT_WARNING_LEAD: Duration = Duration::from_secs(5 * 60);

/// Whether the expiry check has reached a verdict the gate can render on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    /// Not checked yet, or the check ended the session
    Pending,
    /// No session, or a live session with timers armed
    Settled,
}

/// What a single check decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Nothing to monitor
    NoSession,
    /// Timers armed. `warning_in` is `None` when the warning already fired.
    Scheduled {
        logout_in: Duration,
        warning_in: Option<Duration>,
    },
    /// Logout was invoked synchronously
    LoggedOut(LogoutReason),
}

/// Callbacks driven by the monitor
pub trait ExpiryHooks: Send + Sync + 'static {
    /// The session is about to expire
    fn on_warning(&self);

    /// The session must end now
    fn on_logout(&self, reason: LogoutReason);
}

/// Hooks that end the session through a [`SessionContext`] and forward the
/// warning to a callback while the session is still alive.
pub struct ContextHooks<F> {
    context: Arc<SessionContext>,
    on_warning: F,
}

impl<F> ContextHooks<F>
where
    F: Fn() + Send + Sync + 'static,
{
    pub fn new(context: Arc<SessionContext>, on_warning: F) -> Self {
        Self {
            context,
            on_warning,
        }
    }
}

impl<F> ExpiryHooks for ContextHooks<F>
where
    F: Fn() + Send + Sync + 'static,
{
    fn on_warning(&self) {
        if self.context.is_authenticated() {
            (self.on_warning)();
        } else {
            debug!("Expiry warning dropped, session already gone");
        }
    }

    fn on_logout(&self, reason: LogoutReason) {
        self.context.end_session(reason);
    }
}

/// Schedules the expiry warning and the hard logout for one token.
///
/// Owns both timers; they are aborted together by [`ExpiryMonitor::cancel`]
/// and when the monitor is dropped. Checks that arm timers must run inside
/// a Tokio runtime.
pub struct ExpiryMonitor {
    hooks: Arc<dyn ExpiryHooks>,
    warning_lead: Duration,
    state: CheckState,
    warning_timer: Option<JoinHandle<()>>,
    logout_timer: Option<JoinHandle<()>>,
}

impl ExpiryMonitor {
    pub fn new(hooks: Arc<dyn ExpiryHooks>) -> Self {
        Self {
            hooks,
            warning_lead: DEFAULT_WARNING_LEAD,
            state: CheckState::Pending,
            warning_timer: None,
            logout_timer: None,
        }
    }

    /// Monitor bound to a session context
    pub fn for_context<F>(context: Arc<SessionContext>, on_warning: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::new(Arc::new(ContextHooks::new(context, on_warning)))
    }

    /// Set how long before expiry the warning fires
    pub fn with_warning_lead(mut self, lead: Duration) -> Self {
        self.warning_lead = lead;
        self
    }

    pub fn state(&self) -> CheckState {
        self.state
    }

    pub fn is_checking(&self) -> bool {
        self.state == CheckState::Pending
    }

    /// Whether either timer is still armed
    pub fn has_pending_timers(&self) -> bool {
        [&self.warning_timer, &self.logout_timer]
            .into_iter()
            .flatten()
            .any(|timer| !timer.is_finished())
    }

    /// Check `token` against the wall clock
    pub fn check(&mut self, token: Option<&str>) -> CheckOutcome {
        self.check_at(token, chrono::Utc::now().timestamp_millis())
    }

    /// Check `token` as if the current time were `now_ms` (Unix millis).
    /// Any timers from a previous check are cancelled first.
    pub fn check_at(&mut self, token: Option<&str>, now_ms: i64) -> CheckOutcome {
        self.cancel();
        self.state = CheckState::Pending;

        let Some(token) = token else {
            self.state = CheckState::Settled;
            return CheckOutcome::NoSession;
        };

        let claims = match TokenClaims::decode(token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!("Auth check failed: {}", e);
                self.hooks.on_logout(LogoutReason::Error);
                return CheckOutcome::LoggedOut(LogoutReason::Error);
            }
        };

        let remaining = claims.remaining_ms(now_ms);
        if remaining <= 0 {
            info!("Token expired {} ms ago", -remaining);
            self.hooks.on_logout(LogoutReason::Expired);
            return CheckOutcome::LoggedOut(LogoutReason::Expired);
        }

        let logout_in = Duration::from_millis(remaining as u64);
        let start = Instant::now();

        let hooks = self.hooks.clone();
        self.logout_timer = Some(tokio::spawn(async move {
            sleep_until(start + logout_in).await;
            hooks.on_logout(LogoutReason::Expired);
        }));

        let warning_in = logout_in
            .checked_sub(self.warning_lead)
            .filter(|d| !d.is_zero());
        match warning_in {
            Some(delay) => {
                let hooks = self.hooks.clone();
                self.warning_timer = Some(tokio::spawn(async move {
                    sleep_until(start + delay).await;
                    hooks.on_warning();
                }));
            }
            None => self.hooks.on_warning(),
        }

        debug!(
            "Expiry timers armed: logout in {:?}, warning in {:?}",
            logout_in, warning_in
        );
        self.state = CheckState::Settled;
        CheckOutcome::Scheduled {
            logout_in,
            warning_in,
        }
    }

    /// Abort both timers
    pub fn cancel(&mut self) {
        if let Some(timer) = self.warning_timer.take() {
            timer.abort();
        }
        if let Some(timer) = self.logout_timer.take() {
            timer.abort();
        }
    }
}

impl Drop for ExpiryMonitor {
    fn drop(&mut self) {
        self.cancel();
    }
}
