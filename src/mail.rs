//! Gmail connection used for sending invoices.
//!
//! These routes live on the server root rather than under `/api` and are
//! called without the session token, so a rejection here never ends the
//! session.

use log::{debug, error, info};
use reqwest::{Client, Method, Response};
use serde::Deserialize;

use crate::auth::Banner;
use crate::error::{ApiError, Error};

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    connected: bool,
}

/// Client for `/auth/status`, `/auth/google` and `/auth/disconnect`
#[derive(Clone)]
pub struct MailApi {
    client: Client,
    server_url: String,
}

impl MailApi {
    pub fn new(client: Client, server_url: &str) -> Self {
        Self {
            client,
            server_url: server_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.server_url, path)
    }

    async fn send(&self, method: Method, path: &str) -> Result<Response, Error> {
        let url = self.url(path);
        debug!("{} {}", method, url);
        let response = self.client.request(method, &url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Api(ApiError::from_response(status, &text)));
        }
        Ok(response)
    }

    /// Whether a Gmail account is connected for sending
    pub async fn status(&self) -> Result<bool, Error> {
        let response = self.send(Method::GET, "/auth/status").await?;
        let status: StatusResponse = response.json().await?;
        Ok(status.connected)
    }

    /// Like [`MailApi::status`], but any failure reads as disconnected
    pub async fn is_connected(&self) -> bool {
        match self.status().await {
            Ok(connected) => connected,
            Err(e) => {
                error!("Error checking Gmail status: {}", e);
                false
            }
        }
    }

    /// Where to send the browser to start the Gmail consent flow. The
    /// server redirects back with `gmail_connected=true` or `gmail_error`.
    pub fn connect_url(&self) -> String {
        self.url("/auth/google")
    }

    pub async fn disconnect(&self) -> Result<(), Error> {
        self.send(Method::DELETE, "/auth/disconnect").await?;
        info!("Gmail disconnected");
        Ok(())
    }

    /// Disconnect and describe the result as a toast
    pub async fn disconnect_with_notice(&self) -> Banner {
        match self.disconnect().await {
            Ok(()) => Banner::success("Gmail disconnected."),
            Err(e) => {
                error!("Failed to disconnect Gmail: {}", e);
                Banner::error("Failed to disconnect Gmail.")
            }
        }
    }
}
