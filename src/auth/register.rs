//! New account registration form

use invoiceflow_session::Session;
use log::{debug, error};

use super::landing::{Banner, LandingParams};
use super::types::{FieldErrors, GoogleAction, RegisterRequest};
use super::validation::{
    is_valid_email, is_valid_full_name, password_strength, unmet_requirements,
    PasswordRequirement, PasswordStrength,
};
use super::AuthApi;
use crate::error::{Error, ErrorKind, ErrorNotice, SuggestedAction};

const EMAIL_TAKEN: &str = "This email is already registered.";

/// Result of a registration attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// Account created, session stored, navigated to `redirect`
    Registered { session: Session, redirect: String },
    /// Nothing stored; see the field errors, the conflict or the global error
    Rejected,
}

/// State of the registration page.
///
/// Field setters validate as the user types; `submit` re-checks everything
/// and only talks to the server when the whole form is valid.
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    full_name: String,
    email: String,
    company: String,
    password: String,
    confirm: String,
    terms_accepted: bool,
    email_locked: bool,
    email_valid: bool,
    errors: FieldErrors,
    conflict: Option<ErrorNotice>,
    global_error: Option<String>,
    success: Option<Banner>,
    dashboard_path: String,
}

impl RegistrationForm {
    pub fn new(dashboard_path: &str) -> Self {
        Self {
            full_name: String::new(),
            email: String::new(),
            company: String::new(),
            password: String::new(),
            confirm: String::new(),
            terms_accepted: false,
            email_locked: false,
            email_valid: false,
            errors: FieldErrors::new(),
            conflict: None,
            global_error: None,
            success: None,
            dashboard_path: dashboard_path.to_string(),
        }
    }

    /// An `email=` prefill locks the email field and counts as checked
    pub fn with_landing(mut self, params: &LandingParams) -> Self {
        if let Some(email) = params.prefill_email() {
            self.email = email.to_string();
            self.email_locked = true;
            self.email_valid = true;
        }
        self
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn terms_accepted(&self) -> bool {
        self.terms_accepted
    }

    pub fn is_email_locked(&self) -> bool {
        self.email_locked
    }

    pub fn is_email_valid(&self) -> bool {
        self.email_valid
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Set when the email already has an account
    pub fn conflict(&self) -> Option<&ErrorNotice> {
        self.conflict.as_ref()
    }

    pub fn global_error(&self) -> Option<&str> {
        self.global_error.as_deref()
    }

    pub fn success(&self) -> Option<&Banner> {
        self.success.as_ref()
    }

    pub fn set_full_name(&mut self, name: &str) {
        self.full_name = name.to_string();
        if !name.is_empty() && !is_valid_full_name(name) {
            self.errors.set(
                "name",
                "Please enter a valid full name (min 2 chars, letters, spaces, hyphens, apostrophes only).",
            );
        } else {
            self.errors.remove("name");
        }
    }

    /// Edit the email. Ignored while the field is locked; the new address
    /// must pass `check_email_availability` before it counts as valid.
    pub fn set_email(&mut self, email: &str) {
        if self.email_locked {
            return;
        }
        self.email = email.to_string();
        self.email_valid = false;
        self.conflict = None;
        self.errors.remove("email");
    }

    /// Unlock the email field and start over with an empty address
    pub fn reset_email(&mut self) {
        self.email_locked = false;
        self.email_valid = false;
        self.email.clear();
        self.conflict = None;
        self.errors.remove("email");
    }

    pub fn set_company(&mut self, company: &str) {
        self.company = company.to_string();
    }

    pub fn set_password(&mut self, password: &str) {
        self.password = password.to_string();
        if !password.is_empty() && !unmet_requirements(password).is_empty() {
            self.errors
                .set("password", "Password does not meet all requirements.");
        } else {
            self.errors.remove("password");
        }
        self.check_confirm();
    }

    pub fn set_confirm(&mut self, confirm: &str) {
        self.confirm = confirm.to_string();
        self.check_confirm();
    }

    pub fn set_terms_accepted(&mut self, accepted: bool) {
        self.terms_accepted = accepted;
        self.errors.remove("terms");
    }

    pub fn password_strength(&self) -> PasswordStrength {
        password_strength(&self.password)
    }

    pub fn unmet_requirements(&self) -> Vec<PasswordRequirement> {
        unmet_requirements(&self.password)
    }

    fn confirm_matches(&self) -> bool {
        !self.confirm.is_empty() && self.confirm == self.password
    }

    fn check_confirm(&mut self) {
        if !self.confirm.is_empty() && !self.confirm_matches() {
            self.errors.set("confirm", "Passwords don't match.");
        } else {
            self.errors.remove("confirm");
        }
    }

    /// Ask the server whether the entered email is still free.
    ///
    /// A taken email becomes a conflict with a "sign in instead" action.
    pub async fn check_email_availability(&mut self, auth: &AuthApi) -> bool {
        if self.email_locked {
            return self.email_valid;
        }
        if !is_valid_email(&self.email) {
            self.email_valid = false;
            return false;
        }

        match auth.check_email(&self.email).await {
            Ok(response) if response.exists => {
                self.email_taken();
            }
            Ok(_) => {
                self.errors.remove("email");
                self.conflict = None;
                self.email_valid = true;
            }
            Err(e) => {
                error!("Email check failed: {}", e);
                self.errors
                    .set("email", "Failed to check email availability.");
                self.email_valid = false;
            }
        }
        self.email_valid
    }

    /// Check every field, recording the errors. True when the form can be
    /// sent.
    pub fn validate(&mut self) -> bool {
        let mut ok = true;
        if !is_valid_full_name(&self.full_name) {
            self.errors.set("name", "Full name is required");
            ok = false;
        }
        if !self.email_valid {
            if self.errors.get("email").is_none() {
                self.errors.set("email", "Valid email is required");
            }
            ok = false;
        }
        if !unmet_requirements(&self.password).is_empty() {
            self.errors.set("password", "Strong password is required");
            ok = false;
        }
        if !self.confirm_matches() {
            self.errors.set("confirm", "Passwords don't match");
            ok = false;
        }
        if !self.terms_accepted {
            self.errors.set("terms", "You must agree to the terms");
            ok = false;
        }
        ok
    }

    /// Create the account and go to the dashboard
    pub async fn submit(&mut self, auth: &AuthApi) -> RegistrationOutcome {
        self.global_error = None;
        if !self.validate() {
            debug!("Registration form has errors: {:?}", self.errors.fields().collect::<Vec<_>>());
            return RegistrationOutcome::Rejected;
        }

        let request = RegisterRequest {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            company: Some(self.company.trim().to_string()).filter(|c| !c.is_empty()),
            password: self.password.clone(),
        };

        match auth.register(&request).await {
            Ok(session) => self.registered(auth, session, "Account created successfully!".to_string()),
            Err(Error::Api(api)) if api.status == 409 => {
                self.errors.clear();
                self.email_taken();
                RegistrationOutcome::Rejected
            }
            Err(Error::Api(api)) if api.status == 400 && !api.fields.is_empty() => {
                self.errors.clear();
                for (field, message) in &api.fields {
                    self.errors.set(field, message.as_str());
                }
                RegistrationOutcome::Rejected
            }
            Err(e) => {
                error!("Registration failed: {}", e);
                let message = match e {
                    Error::Api(api) => api.details.or(api.server_message),
                    _ => None,
                };
                self.global_error = Some(
                    message.unwrap_or_else(|| "Registration failed. Please try again.".to_string()),
                );
                RegistrationOutcome::Rejected
            }
        }
    }

    /// Create the account from a Google ID credential
    pub async fn sign_up_with_google(&mut self, auth: &AuthApi, credential: &str) -> RegistrationOutcome {
        self.errors.clear();
        self.global_error = None;

        match auth.google(credential, GoogleAction::Register).await {
            Ok(session) => {
                let message = format!("Welcome {}!", session.user.full_name);
                self.registered(auth, session, message)
            }
            Err(e) => {
                error!("Google Signup Error: {}", e);
                let message = match e {
                    Error::Api(api) => api.server_message,
                    _ => None,
                };
                self.global_error = Some(
                    message.unwrap_or_else(|| "Google signup failed. Please try again.".to_string()),
                );
                RegistrationOutcome::Rejected
            }
        }
    }

    fn email_taken(&mut self) {
        self.errors.set("email", EMAIL_TAKEN);
        self.email_valid = false;
        self.conflict = Some(
            ErrorNotice::new(ErrorKind::Conflict, EMAIL_TAKEN).with_action(SuggestedAction::SignIn {
                email: self.email.clone(),
            }),
        );
    }

    fn registered(&mut self, auth: &AuthApi, session: Session, message: String) -> RegistrationOutcome {
        self.success = Some(Banner::success(message));
        self.password.clear();
        self.confirm.clear();
        auth.context().redirect(&self.dashboard_path);
        RegistrationOutcome::Registered {
            session,
            redirect: self.dashboard_path.clone(),
        }
    }
}
