//! USD-based exchange rates from a public feed

use std::collections::HashMap;

use log::{debug, error};
use reqwest::Client;
use serde::Deserialize;

use crate::error::{ApiError, Error};

/// Rates keyed by currency code, relative to USD
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExchangeRates {
    #[serde(default)]
    rates: HashMap<String, f64>,
}

impl ExchangeRates {
    pub fn new(rates: HashMap<String, f64>) -> Self {
        Self { rates }
    }

    /// Fetch the feed. The feed is public, so no token is sent and a
    /// rejection does not touch the session.
    pub async fn fetch(client: &Client, url: &str) -> Result<Self, Error> {
        debug!("GET {}", url);
        let response = client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Api(ApiError::from_response(status, &text)));
        }
        Ok(response.json::<Self>().await?)
    }

    /// Like [`ExchangeRates::fetch`], but a failure is logged and yields no
    /// rates, so every conversion falls back to 1.
    pub async fn fetch_or_default(client: &Client, url: &str) -> Self {
        match Self::fetch(client, url).await {
            Ok(rates) => rates,
            Err(e) => {
                error!("Error fetching exchange rates: {}", e);
                Self::default()
            }
        }
    }

    /// Rate for `currency`, or 1 when unknown
    pub fn rate(&self, currency: &str) -> f64 {
        self.rates.get(currency).copied().unwrap_or(1.0)
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Known currency codes, sorted
    pub fn currencies(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.rates.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}
