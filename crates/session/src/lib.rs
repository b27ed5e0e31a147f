//! InvoiceFlow session lifecycle
//!
//! This crate owns the client-side session: the persisted token and user
//! profile, the expiry monitor that warns before and logs out at token
//! expiry, and the route gates that admit or redirect visitors.

// Declare modules
mod claims;
mod context;
mod error;
mod gate;
mod monitor;
mod storage;
mod store;

// Re-export key public types
pub use claims::TokenClaims;
pub use context::{HistoryNavigator, LogoutReason, Navigator, SessionContext};
pub use error::{Result, SessionError};
pub use gate::{AuthenticatedGate, GateInput, GateOutcome, GuestGate, Redirect, RouteGate};
pub use monitor::{
    CheckOutcome, CheckState, ContextHooks, ExpiryHooks, ExpiryMonitor, DEFAULT_WARNING_LEAD,
};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{Session, TokenStore, UserProfile, TOKEN_KEY, USER_KEY};
