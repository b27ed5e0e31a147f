//! The step-by-step login flow

use invoiceflow_session::Session;
use log::{debug, error};

use super::landing::{Banner, LandingParams};
use super::types::{AccountPreview, FieldErrors, GoogleAction};
use super::validation::validate_email;
use super::AuthApi;
use crate::error::{Error, CONNECTION_FAILED_MESSAGE};

/// Where the login flow currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginStep {
    /// Waiting for an email address
    EmailEntry,
    /// The account exists; waiting for its password
    ExistingPassword { account: AccountPreview },
    /// No account for that email; offer registration
    NewAccountPrompt,
}

/// Result of a sign-in attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Session stored, navigated to `redirect`
    Authenticated { session: Session, redirect: String },
    /// Still on the same step; see the field errors or the toast
    Rejected,
}

/// State of the login page
#[derive(Debug, Clone)]
pub struct LoginWizard {
    step: LoginStep,
    email: String,
    password: String,
    remember_me: bool,
    errors: FieldErrors,
    toast: Option<Banner>,
    dashboard_path: String,
    register_path: String,
}

impl LoginWizard {
    pub fn new(dashboard_path: &str, register_path: &str) -> Self {
        Self {
            step: LoginStep::EmailEntry,
            email: String::new(),
            password: String::new(),
            remember_me: false,
            errors: FieldErrors::new(),
            toast: None,
            dashboard_path: dashboard_path.to_string(),
            register_path: register_path.to_string(),
        }
    }

    /// Apply the landing query string: banner and email prefill
    pub fn with_landing(mut self, params: &LandingParams) -> Self {
        if let Some(email) = params.prefill_email() {
            self.email = email.to_string();
        }
        self.toast = params.banner();
        self
    }

    pub fn step(&self) -> &LoginStep {
        &self.step
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn remember_me(&self) -> bool {
        self.remember_me
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn toast(&self) -> Option<&Banner> {
        self.toast.as_ref()
    }

    pub fn dismiss_toast(&mut self) {
        self.toast = None;
    }

    /// Edit the email field; clears inline errors
    pub fn set_email(&mut self, email: &str) {
        self.email = email.to_string();
        self.errors.clear();
    }

    /// Edit the password field; clears inline errors
    pub fn set_password(&mut self, password: &str) {
        self.password = password.to_string();
        self.errors.clear();
    }

    pub fn set_remember_me(&mut self, remember_me: bool) {
        self.remember_me = remember_me;
    }

    /// Validate the email and ask the server whether the account exists.
    ///
    /// Moves to `ExistingPassword` or `NewAccountPrompt`; on failure stays
    /// on `EmailEntry` with an email error.
    pub async fn submit_email(&mut self, auth: &AuthApi) -> &LoginStep {
        if let Some(err) = validate_email(&self.email) {
            self.errors.set("email", err);
            return &self.step;
        }
        self.errors.clear();

        match auth.check_email(&self.email).await {
            Ok(response) if response.exists => {
                let account = response.user.unwrap_or_else(|| AccountPreview {
                    full_name: String::new(),
                    email: self.email.clone(),
                    avatar: None,
                });
                debug!("Account found for {}", self.email);
                self.step = LoginStep::ExistingPassword { account };
            }
            Ok(_) => {
                debug!("No account for {}", self.email);
                self.step = LoginStep::NewAccountPrompt;
            }
            Err(e) => {
                let message = match e {
                    Error::Api(api) => api.server_message,
                    _ => None,
                };
                self.errors.set(
                    "email",
                    message.unwrap_or_else(|| "Failed to check account. Please try again.".to_string()),
                );
            }
        }
        &self.step
    }

    /// Sign in with the entered password
    pub async fn submit_password(&mut self, auth: &AuthApi) -> LoginOutcome {
        if !matches!(self.step, LoginStep::ExistingPassword { .. }) {
            return LoginOutcome::Rejected;
        }
        if self.password.is_empty() {
            self.errors.set("password", "Password is required");
            return LoginOutcome::Rejected;
        }
        self.errors.clear();

        match auth.login(&self.email, &self.password, self.remember_me).await {
            Ok(session) => self.authenticated(auth, session, "Success! Entering your dashboard..."),
            Err(e) => {
                self.login_failed(e);
                LoginOutcome::Rejected
            }
        }
    }

    /// Sign in with a Google ID credential
    pub async fn sign_in_with_google(&mut self, auth: &AuthApi, credential: &str) -> LoginOutcome {
        match auth.google(credential, GoogleAction::Login).await {
            Ok(session) => self.authenticated(auth, session, "Google Sign-in Success!"),
            Err(e) => {
                error!("Google Login Error: {}", e);
                self.toast = Some(Banner::error("Google sign-in failed. Please try again."));
                LoginOutcome::Rejected
            }
        }
    }

    /// Return to the email step, dropping password, errors and account
    pub fn back(&mut self) {
        self.step = LoginStep::EmailEntry;
        self.password.clear();
        self.errors.clear();
    }

    /// Registration page pre-filled with the checked email. Only available
    /// from `NewAccountPrompt`.
    pub fn registration_location(&self) -> Option<String> {
        match self.step {
            LoginStep::NewAccountPrompt => Some(format!(
                "{}?email={}",
                self.register_path,
                urlencoding::encode(&self.email)
            )),
            _ => None,
        }
    }

    fn authenticated(&mut self, auth: &AuthApi, session: Session, message: &str) -> LoginOutcome {
        self.toast = Some(Banner::success(message));
        self.password.clear();
        auth.context().redirect(&self.dashboard_path);
        LoginOutcome::Authenticated {
            session,
            redirect: self.dashboard_path.clone(),
        }
    }

    fn login_failed(&mut self, e: Error) {
        match e {
            Error::Api(api) if api.status == 401 => {
                self.errors
                    .set("password", "Incorrect password. Please try again.");
                self.password.clear();
            }
            Error::Api(api) if api.status == 500 => {
                self.toast = Some(Banner::error(format!(
                    "Something went wrong: {}",
                    api.detailed_message()
                )));
            }
            Error::Api(api) => {
                self.errors.set(
                    "password",
                    api.server_message.unwrap_or_else(|| "Login failed.".to_string()),
                );
            }
            e if e.is_transport() => {
                self.toast = Some(Banner::error(CONNECTION_FAILED_MESSAGE));
            }
            e => {
                error!("Login failed: {}", e);
                self.errors.set("password", "Login failed.");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wizard() -> LoginWizard {
        LoginWizard::new("/dashboard", "/register")
    }

    #[test]
    fn test_starts_on_email_entry() {
        let w = wizard();
        assert_eq!(w.step(), &LoginStep::EmailEntry);
        assert!(w.errors().is_empty());
        assert_eq!(w.registration_location(), None);
    }

    #[test]
    fn test_landing_prefill_and_banner() {
        let w = wizard().with_landing(&LandingParams::parse("session=expired&email=a%40b.co"));
        assert_eq!(w.email(), "a@b.co");
        assert_eq!(
            w.toast().map(|t| t.message.as_str()),
            Some("Session expired. Please login again.")
        );
    }

    #[test]
    fn test_back_clears_transient_fields() {
        let mut w = wizard();
        w.step = LoginStep::NewAccountPrompt;
        w.set_email("new@example.com");
        assert_eq!(
            w.registration_location(),
            Some("/register?email=new%40example.com".to_string())
        );

        w.step = LoginStep::ExistingPassword {
            account: AccountPreview {
                full_name: "Jane".to_string(),
                email: "new@example.com".to_string(),
                avatar: None,
            },
        };
        w.set_password("pw");
        w.errors.set("password", "x");

        w.back();
        assert_eq!(w.step(), &LoginStep::EmailEntry);
        assert_eq!(w.password(), "");
        assert!(w.errors().is_empty());
        // the email survives going back
        assert_eq!(w.email(), "new@example.com");
    }

    #[test]
    fn test_editing_clears_errors() {
        let mut w = wizard();
        w.errors.set("email", "Invalid email address");
        w.set_email("user@example.com");
        assert!(w.errors().is_empty());
    }
}
