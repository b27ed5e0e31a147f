//! Configuration options for the InvoiceFlow client

use std::env;
use std::time::Duration;

use invoiceflow_session::DEFAULT_WARNING_LEAD;

/// Production API base URL
pub const DEFAULT_API_URL: &str = "https://invoice-backend-wku1.onrender.com/api";

/// Production server root, where the Gmail connection routes live
pub const DEFAULT_SERVER_URL: &str = "https://invoice-backend-wku1.onrender.com";

/// Public exchange-rate feed, USD based
pub const DEFAULT_EXCHANGE_RATES_URL: &str = "https://api.exchangerate-api.com/v4/latest/USD";

/// Configuration options for the InvoiceFlow client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base URL of the REST API, including the `/api` prefix
    pub api_url: String,

    /// Server root without the `/api` prefix
    pub server_url: String,

    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// OAuth client identifier used by the Google sign-in button
    pub google_client_id: Option<String>,

    /// How long before token expiry the warning fires
    pub warning_lead: Duration,

    /// Path of the login page
    pub login_path: String,

    /// Path of the registration page
    pub register_path: String,

    /// Path of the dashboard, the default landing page after login
    pub dashboard_path: String,

    /// Exchange-rate feed
    pub exchange_rates_url: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            server_url: DEFAULT_SERVER_URL.to_string(),
            request_timeout: Some(Duration::from_secs(30)),
            google_client_id: None,
            warning_lead: DEFAULT_WARNING_LEAD,
            login_path: "/login".to_string(),
            register_path: "/register".to_string(),
            dashboard_path: "/dashboard".to_string(),
            exchange_rates_url: DEFAULT_EXCHANGE_RATES_URL.to_string(),
        }
    }
}

impl ClientOptions {
    /// Defaults overridden by the environment (and a `.env` file, if any).
    ///
    /// Reads `INVOICEFLOW_API_URL`, `INVOICEFLOW_SERVER_URL`,
    /// `INVOICEFLOW_GOOGLE_CLIENT_ID` and `INVOICEFLOW_REQUEST_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let mut options = Self::default();
        if let Ok(url) = env::var("INVOICEFLOW_API_URL") {
            options.api_url = url;
        }
        if let Ok(url) = env::var("INVOICEFLOW_SERVER_URL") {
            options.server_url = url;
        }
        if let Ok(id) = env::var("INVOICEFLOW_GOOGLE_CLIENT_ID") {
            options.google_client_id = Some(id);
        }
        if let Ok(secs) = env::var("INVOICEFLOW_REQUEST_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(secs) => options.request_timeout = Some(Duration::from_secs(secs)),
                Err(e) => log::warn!("Ignoring INVOICEFLOW_REQUEST_TIMEOUT_SECS={}: {}", secs, e),
            }
        }
        options
    }

    /// Set the API base URL
    pub fn with_api_url(mut self, value: &str) -> Self {
        self.api_url = value.trim_end_matches('/').to_string();
        self
    }

    /// Set the server root
    pub fn with_server_url(mut self, value: &str) -> Self {
        self.server_url = value.trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the Google OAuth client identifier
    pub fn with_google_client_id(mut self, value: &str) -> Self {
        self.google_client_id = Some(value.to_string());
        self
    }

    /// Set the expiry warning lead time
    pub fn with_warning_lead(mut self, value: Duration) -> Self {
        self.warning_lead = value;
        self
    }

    /// Set the login page path
    pub fn with_login_path(mut self, value: &str) -> Self {
        self.login_path = value.to_string();
        self
    }

    /// Set the registration page path
    pub fn with_register_path(mut self, value: &str) -> Self {
        self.register_path = value.to_string();
        self
    }

    /// Set the dashboard path
    pub fn with_dashboard_path(mut self, value: &str) -> Self {
        self.dashboard_path = value.to_string();
        self
    }

    /// Set the exchange-rate feed URL
    pub fn with_exchange_rates_url(mut self, value: &str) -> Self {
        self.exchange_rates_url = value.to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ClientOptions::default();
        assert_eq!(options.api_url, DEFAULT_API_URL);
        assert_eq!(format!("{}/api", options.server_url), options.api_url);
        assert_eq!(options.warning_lead, Duration::from_secs(300));
        assert_eq!(options.login_path, "/login");
        assert_eq!(options.dashboard_path, "/dashboard");
        assert_eq!(options.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let options = ClientOptions::default()
            .with_api_url("http://localhost:5000/api/")
            .with_server_url("http://localhost:5000/")
            .with_google_client_id("client-id")
            .with_request_timeout(None);
        assert_eq!(options.api_url, "http://localhost:5000/api");
        assert_eq!(options.server_url, "http://localhost:5000");
        assert_eq!(options.google_client_id.as_deref(), Some("client-id"));
        assert_eq!(options.request_timeout, None);
    }
}
