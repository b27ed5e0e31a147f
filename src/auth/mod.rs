//! Authentication against the InvoiceFlow API

mod landing;
mod register;
mod types;
pub mod validation;
mod wizard;

use invoiceflow_session::{Session, SessionContext};
use log::{error, info};

use crate::error::Error;
use crate::fetch::ApiClient;

pub use landing::*;
pub use register::*;
pub use types::*;
pub use wizard::*;

/// Client for the `/auth` endpoints.
///
/// Successful logins, registrations and Google exchanges are persisted
/// through the session context before they are returned.
#[derive(Clone)]
pub struct AuthApi {
    api: ApiClient,
}

impl AuthApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn context(&self) -> &SessionContext {
        self.api.context()
    }

    /// Whether an account exists for `email`
    pub async fn check_email(&self, email: &str) -> Result<CheckEmailResponse, Error> {
        let body = CheckEmailRequest {
            email: email.to_string(),
        };
        self.api
            .post("/auth/check-email")
            .json(&body)?
            .execute::<CheckEmailResponse>()
            .await
    }

    /// Sign in with email and password
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<Session, Error> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            remember_me,
        };
        let response = self
            .api
            .post("/auth/login")
            .json(&body)?
            .execute::<AuthResponse>()
            .await?;
        self.establish(response)
    }

    /// Create an account and sign in
    pub async fn register(&self, request: &RegisterRequest) -> Result<Session, Error> {
        let response = self
            .api
            .post("/auth/register")
            .json(request)?
            .execute::<AuthResponse>()
            .await?;
        self.establish(response)
    }

    /// Exchange a Google ID credential for a session
    pub async fn google(&self, credential: &str, action: GoogleAction) -> Result<Session, Error> {
        let body = GoogleAuthRequest {
            credential: credential.to_string(),
            action,
        };
        let response = self
            .api
            .post("/auth/google")
            .json(&body)?
            .execute::<AuthResponse>()
            .await?;
        self.establish(response)
    }

    /// Sign out: tell the server (best effort), clear the session and go
    /// to the login page.
    pub async fn logout(&self) -> Result<(), Error> {
        // a rejected token still ends on the logout page, not the expiry banner
        if let Err(e) = self.api.post("/auth/logout").execute_empty().await {
            error!("Logout API failed: {}", e);
        }

        self.api.context().sign_out();
        Ok(())
    }

    fn establish(&self, response: AuthResponse) -> Result<Session, Error> {
        let session = Session::from(response);
        self.api.context().establish(&session)?;
        info!("Signed in as {} ({})", session.user.email, session.user.provider);
        Ok(session)
    }
}
