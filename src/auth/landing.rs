//! Banners and prefill derived from the login page's query string

use url::form_urlencoded;

/// Severity of a banner or toast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerLevel {
    Success,
    Warning,
    Error,
}

/// A transient, dismissible message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub level: BannerLevel,
    pub message: String,
}

impl Banner {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: BannerLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: BannerLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: BannerLevel::Error,
            message: message.into(),
        }
    }

    /// Shown by the expiry monitor's warning callback
    pub fn expiry_warning() -> Self {
        Self::warning("Your session will expire in 5 minutes. Save your work!")
    }
}

/// Query parameters the login page reacts to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LandingParams {
    /// `message=logout` after an explicit sign-out
    pub message: Option<String>,
    /// `session=expired|error` after a forced logout
    pub session: Option<String>,
    /// `email=` prefill
    pub email: Option<String>,
    /// `gmail_connected=true` after the Gmail consent flow succeeded
    pub gmail_connected: Option<String>,
    /// `gmail_error=` after it failed
    pub gmail_error: Option<String>,
}

impl LandingParams {
    /// Parse a query string, with or without the leading `?`
    pub fn parse(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "message" => params.message = Some(value.into_owned()),
                "session" => params.session = Some(value.into_owned()),
                "email" => params.email = Some(value.into_owned()),
                "gmail_connected" => params.gmail_connected = Some(value.into_owned()),
                "gmail_error" => params.gmail_error = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }

    /// Parse the query part of a location such as `/login?session=expired`
    pub fn from_location(location: &str) -> Self {
        match location.split_once('?') {
            Some((_, query)) => Self::parse(query),
            None => Self::default(),
        }
    }

    /// Banner to show on arrival. Session problems win over the logout
    /// message.
    pub fn banner(&self) -> Option<Banner> {
        match self.session.as_deref() {
            Some("expired") => return Some(Banner::error("Session expired. Please login again.")),
            Some("error") => {
                return Some(Banner::error(
                    "Your session could not be verified. Please login again.",
                ))
            }
            _ => {}
        }

        match self.message.as_deref() {
            Some("logout") => Some(Banner::success("Logged out successfully. See you soon!")),
            _ => None,
        }
    }

    /// Toast for arrival back from the Gmail consent flow. A successful
    /// connection wins over an error.
    pub fn gmail_banner(&self) -> Option<Banner> {
        if self.gmail_connected() {
            return Some(Banner::success("Gmail connected successfully!"));
        }
        match self.gmail_error.as_deref() {
            Some(e) if !e.is_empty() => Some(Banner::error(
                "Failed to connect Gmail. Please try again.",
            )),
            _ => None,
        }
    }

    /// Whether the Gmail consent flow just succeeded, so the connection
    /// status should be read again
    pub fn gmail_connected(&self) -> bool {
        self.gmail_connected.as_deref() == Some("true")
    }

    /// Email to prefill, if non-empty
    pub fn prefill_email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expired_session_banner() {
        let params = LandingParams::from_location("/login?session=expired");
        assert_eq!(
            params.banner(),
            Some(Banner::error("Session expired. Please login again."))
        );
    }

    #[test]
    fn test_logout_banner() {
        let params = LandingParams::parse("?message=logout");
        assert_eq!(params.banner().map(|b| b.level), Some(BannerLevel::Success));
    }

    #[test]
    fn test_session_reason_wins_over_logout_message() {
        let params = LandingParams::parse("message=logout&session=error");
        assert_eq!(params.banner().map(|b| b.level), Some(BannerLevel::Error));
    }

    #[test]
    fn test_email_prefill_is_decoded() {
        let params = LandingParams::parse("email=a%2Bb%40example.com");
        assert_eq!(params.prefill_email(), Some("a+b@example.com"));
        assert_eq!(params.banner(), None);
    }

    #[test]
    fn test_gmail_banners() {
        let params = LandingParams::from_location("/invoices/a1?gmail_connected=true");
        assert!(params.gmail_connected());
        assert_eq!(
            params.gmail_banner(),
            Some(Banner::success("Gmail connected successfully!"))
        );
        assert_eq!(params.banner(), None);

        let params = LandingParams::parse("gmail_error=access_denied");
        assert!(!params.gmail_connected());
        assert_eq!(params.gmail_banner().map(|b| b.level), Some(BannerLevel::Error));

        let params = LandingParams::parse("gmail_connected=false");
        assert_eq!(params.gmail_banner(), None);
    }

    #[test]
    fn test_no_query() {
        let params = LandingParams::from_location("/login");
        assert_eq!(params, LandingParams::default());
        assert_eq!(params.prefill_email(), None);
    }
}
