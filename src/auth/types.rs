//! Types for authentication requests and responses

use std::collections::BTreeMap;

use invoiceflow_session::{Session, UserProfile};
use serde::{Deserialize, Serialize};

/// Check whether an account exists for an email
#[derive(Debug, Clone, Serialize)]
pub struct CheckEmailRequest {
    pub email: String,
}

/// Public view of an existing account, shown on the password step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPreview {
    /// Display name
    #[serde(default)]
    pub full_name: String,

    /// Email address
    #[serde(default)]
    pub email: String,

    /// Avatar image URL
    #[serde(default)]
    pub avatar: Option<String>,
}

impl AccountPreview {
    /// First word of the full name, for greetings
    pub fn first_name(&self) -> &str {
        self.full_name.split_whitespace().next().unwrap_or("")
    }

    /// Uppercase initial shown when there is no avatar
    pub fn initial(&self) -> Option<char> {
        self.full_name.chars().next().map(|c| c.to_ascii_uppercase())
    }
}

/// Response of `POST /auth/check-email`
#[derive(Debug, Clone, Deserialize)]
pub struct CheckEmailResponse {
    pub exists: bool,
    #[serde(default)]
    pub user: Option<AccountPreview>,
}

/// Email + password login
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

/// New account registration
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    /// Sent as `null` when empty
    pub company: Option<String>,
    pub password: String,
}

/// Which flow a Google credential is exchanged for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GoogleAction {
    Login,
    Register,
}

/// Google ID token exchange
#[derive(Debug, Clone, Serialize)]
pub struct GoogleAuthRequest {
    pub credential: String,
    pub action: GoogleAction,
}

/// Token + user returned by login, registration and Google exchange
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

impl From<AuthResponse> for Session {
    fn from(response: AuthResponse) -> Self {
        Session::new(response.token, response.user)
    }
}

/// Inline error messages keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: &str, message: impl Into<String>) {
        self.errors.insert(field.to_string(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn remove(&mut self, field: &str) {
        self.errors.remove(field);
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Fields with an error, in name order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }
}
