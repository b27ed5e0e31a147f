//! InvoiceFlow Rust Client Library
//!
//! An async client for the InvoiceFlow invoicing API: sign-in and
//! registration flows, a session that is cleared the moment the server
//! rejects it or its token expires, and access to invoices and analytics.

pub mod analytics;
pub mod auth;
pub mod config;
pub mod error;
pub mod fetch;
pub mod invoices;
pub mod mail;

use std::sync::Arc;

use log::debug;
use reqwest::Client;

pub use invoiceflow_session as session;
use invoiceflow_session::{
    AuthenticatedGate, ExpiryMonitor, GuestGate, MemoryStorage, Navigator, SessionContext, Storage,
};

use crate::analytics::AnalyticsApi;
use crate::auth::{AuthApi, LandingParams, LoginWizard, RegistrationForm};
use crate::config::ClientOptions;
use crate::error::Error;
use crate::fetch::ApiClient;
use crate::invoices::{ExchangeRates, InvoicesApi};
use crate::mail::MailApi;

/// The main entry point for the InvoiceFlow client
pub struct InvoiceFlow {
    /// Client options
    pub options: ClientOptions,
    /// HTTP client used for requests
    pub http_client: Client,
    context: Arc<SessionContext>,
    api: ApiClient,
}

impl InvoiceFlow {
    /// Create a client with default options and an in-memory session
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use invoiceflow::InvoiceFlow;
    /// use invoiceflow::session::HistoryNavigator;
    ///
    /// let client = InvoiceFlow::new(Arc::new(HistoryNavigator::new())).unwrap();
    /// assert!(!client.context().is_authenticated());
    /// ```
    pub fn new(navigator: Arc<dyn Navigator>) -> Result<Self, Error> {
        Self::new_with_options(
            ClientOptions::default(),
            Arc::new(MemoryStorage::new()),
            navigator,
        )
    }

    /// Create a client with custom options.
    ///
    /// `storage` holds the session between runs; `navigator` performs the
    /// redirects the session lifecycle asks for.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use invoiceflow::{InvoiceFlow, config::ClientOptions};
    /// use invoiceflow::session::{HistoryNavigator, MemoryStorage};
    ///
    /// let options = ClientOptions::default().with_api_url("http://localhost:5000/api");
    /// let client = InvoiceFlow::new_with_options(
    ///     options,
    ///     Arc::new(MemoryStorage::new()),
    ///     Arc::new(HistoryNavigator::new()),
    /// )
    /// .unwrap();
    /// assert_eq!(client.options.api_url, "http://localhost:5000/api");
    /// ```
    pub fn new_with_options(
        options: ClientOptions,
        storage: Arc<dyn Storage>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let context = Arc::new(
            SessionContext::new(storage, navigator).with_login_path(&options.login_path),
        );
        let api = ApiClient::new(&options.api_url, http_client.clone(), context.clone());
        debug!("InvoiceFlow client for {}", options.api_url);

        Ok(Self {
            options,
            http_client,
            context,
            api,
        })
    }

    /// The shared session context
    pub fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    /// The authenticated HTTP wrapper, for endpoints without a typed client
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.api.clone())
    }

    pub fn invoices(&self) -> InvoicesApi {
        InvoicesApi::new(self.api.clone())
    }

    pub fn analytics(&self) -> AnalyticsApi {
        AnalyticsApi::new(self.api.clone())
    }

    /// Gmail connection, on the server root
    pub fn mail(&self) -> MailApi {
        MailApi::new(self.http_client.clone(), &self.options.server_url)
    }

    /// Exchange rates from the configured feed; unit rates on failure
    pub async fn exchange_rates(&self) -> ExchangeRates {
        ExchangeRates::fetch_or_default(&self.http_client, &self.options.exchange_rates_url).await
    }

    /// Login page state for arrival at `location`, e.g.
    /// `/login?session=expired`
    pub fn login_wizard(&self, location: &str) -> LoginWizard {
        LoginWizard::new(&self.options.dashboard_path, &self.options.register_path)
            .with_landing(&LandingParams::from_location(location))
    }

    /// Registration page state for arrival at `location`, e.g.
    /// `/register?email=jane%40example.com`
    pub fn registration_form(&self, location: &str) -> RegistrationForm {
        RegistrationForm::new(&self.options.dashboard_path)
            .with_landing(&LandingParams::from_location(location))
    }

    /// Expiry monitor bound to this client's session.
    ///
    /// `on_warning` runs once shortly before the token expires, unless the
    /// session has already ended.
    pub fn expiry_monitor<F>(&self, on_warning: F) -> ExpiryMonitor
    where
        F: Fn() + Send + Sync + 'static,
    {
        ExpiryMonitor::for_context(self.context.clone(), on_warning)
            .with_warning_lead(self.options.warning_lead)
    }

    /// Gate for pages that need a session
    pub fn authenticated_gate(&self) -> AuthenticatedGate {
        AuthenticatedGate::new(&self.options.login_path)
    }

    /// Gate for login and registration pages
    pub fn guest_gate(&self) -> GuestGate {
        GuestGate::new(&self.options.dashboard_path)
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::auth::{LoginOutcome, LoginStep, LoginWizard, RegistrationForm, RegistrationOutcome};
    pub use crate::config::ClientOptions;
    pub use crate::error::{Error, ErrorKind, ErrorNotice};
    pub use crate::InvoiceFlow;
    pub use invoiceflow_session::{
        CheckOutcome, CheckState, GateInput, GateOutcome, LogoutReason, RouteGate, Session,
    };
}
