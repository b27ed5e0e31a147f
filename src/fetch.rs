//! Authenticated HTTP access to the InvoiceFlow API.
//!
//! Every request built here carries the stored bearer token. A 401 or 403
//! from the server ends the session through the [`SessionContext`] before
//! the error is handed back to the caller.

use std::collections::HashMap;
use std::sync::Arc;

use invoiceflow_session::{LogoutReason, SessionContext};
use log::{debug, warn};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, RequestBuilder, Response, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::error::{ApiError, Error};

/// HTTP client wrapper bound to an API base URL and a session context
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    context: Arc<SessionContext>,
}

impl ApiClient {
    pub fn new(base_url: &str, client: Client, context: Arc<SessionContext>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            context,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    /// The underlying HTTP client, for requests outside the API
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Create a GET request
    pub fn get(&self, path: &str) -> FetchBuilder<'_> {
        FetchBuilder::new(self, &self.url(path), Method::GET)
    }

    /// Create a POST request
    pub fn post(&self, path: &str) -> FetchBuilder<'_> {
        FetchBuilder::new(self, &self.url(path), Method::POST)
    }

    /// Create a PUT request
    pub fn put(&self, path: &str) -> FetchBuilder<'_> {
        FetchBuilder::new(self, &self.url(path), Method::PUT)
    }

    /// Create a DELETE request
    pub fn delete(&self, path: &str) -> FetchBuilder<'_> {
        FetchBuilder::new(self, &self.url(path), Method::DELETE)
    }
}

/// Helper for building and executing API requests
pub struct FetchBuilder<'a> {
    api: &'a ApiClient,
    url: String,
    method: Method,
    headers: HeaderMap,
    query_params: Option<HashMap<String, String>>,
    body: Option<Vec<u8>>,
}

impl<'a> FetchBuilder<'a> {
    fn new(api: &'a ApiClient, url: &str, method: Method) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Self {
            api,
            url: url.to_string(),
            method,
            headers,
            query_params: None,
            body: None,
        }
    }

    /// Add a header to the request
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Add query parameters to the request
    pub fn query(mut self, params: HashMap<String, String>) -> Self {
        self.query_params = Some(params);
        self
    }

    /// Add a JSON body to the request
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, Error> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    /// Build the request, attaching the stored token if there is one.
    /// Also reports whether a token was attached.
    fn build(&self) -> Result<(RequestBuilder, bool), Error> {
        let mut url = Url::parse(&self.url)?;

        if let Some(params) = &self.query_params {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in params {
                query_pairs.append_pair(key, value);
            }
        }

        let mut headers = self.headers.clone();
        let mut authenticated = false;
        if let Some(token) = self.api.context.token() {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
                authenticated = true;
            }
        }

        let mut req = self.api.client.request(self.method.clone(), url.as_str());
        req = req.headers(headers);

        if let Some(body) = &self.body {
            req = req.body(body.clone());
        }

        Ok((req, authenticated))
    }

    /// Send the request and return the successful response.
    ///
    /// 401/403 end the session (once, however many requests fail together)
    /// and yield [`Error::Unauthorized`] for requests that carried a token.
    /// Unauthenticated requests such as login get [`Error::Api`] instead so
    /// the caller can report bad credentials. Any other non-success status
    /// yields [`Error::Api`].
    pub async fn send(&self) -> Result<Response, Error> {
        let (req, authenticated) = self.build()?;
        debug!("{} {}", self.method, self.url);
        let response = req.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            if self.api.context.end_session(LogoutReason::Expired) {
                warn!("{} {} rejected with {}, session cleared", self.method, self.url, status);
            }
            if authenticated {
                return Err(Error::Unauthorized {
                    status: status.as_u16(),
                });
            }
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Api(ApiError::from_response(status, &text)));
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Api(ApiError::from_response(status, &text)));
        }

        Ok(response)
    }

    /// Execute the request and parse the response as JSON
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let response = self.send().await?;
        let result = response.json::<T>().await?;
        Ok(result)
    }

    /// Execute the request and discard the response body
    pub async fn execute_empty(&self) -> Result<(), Error> {
        self.send().await?;
        Ok(())
    }
}
