//! Invoice records as the API returns them

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Lifecycle state of an invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    #[default]
    Pending,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(InvoiceStatus::Draft),
            "pending" => Ok(InvoiceStatus::Pending),
            "paid" => Ok(InvoiceStatus::Paid),
            "overdue" => Ok(InvoiceStatus::Overdue),
            other => Err(Error::validation(format!("unknown invoice status: {}", other))),
        }
    }
}

/// A billed line: quantity times unit price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_qty")]
    pub qty: f64,
    #[serde(default)]
    pub price: f64,
}

fn default_qty() -> f64 {
    1.0
}

impl LineItem {
    pub fn new(name: impl Into<String>, qty: f64, price: f64) -> Self {
        Self {
            name: name.into(),
            qty,
            price,
        }
    }

    pub fn total(&self) -> f64 {
        self.qty * self.price
    }
}

impl Default for LineItem {
    fn default() -> Self {
        Self::new("", 1.0, 0.0)
    }
}

/// A stored invoice. Amounts are in USD; `converted_amount` is in
/// `currency` at `exchange_rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_email: Option<String>,
    #[serde(default)]
    pub status: InvoiceStatus,
    #[serde(default)]
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_rate")]
    pub exchange_rate: f64,
    #[serde(default)]
    pub converted_amount: Option<f64>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

pub(crate) fn default_currency() -> String {
    "USD".to_string()
}

fn default_rate() -> f64 {
    1.0
}

impl Invoice {
    /// Short reference shown on the invoice: the first 8 id characters,
    /// uppercased
    pub fn number(&self) -> String {
        self.id.chars().take(8).collect::<String>().to_uppercase()
    }

    /// Client email, if one was given
    pub fn client_email(&self) -> Option<&str> {
        self.client_email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    pub fn is_foreign_currency(&self) -> bool {
        self.currency != "USD"
    }
}

/// Invoice list filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(InvoiceStatus),
}

impl StatusFilter {
    pub fn matches(&self, invoice: &Invoice) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => invoice.status == *status,
        }
    }

    /// Invoices passing the filter, in their original order
    pub fn apply<'a>(&self, invoices: &'a [Invoice]) -> Vec<&'a Invoice> {
        invoices.iter().filter(|inv| self.matches(inv)).collect()
    }
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(StatusFilter::All),
            other => other.parse().map(StatusFilter::Only),
        }
    }
}

/// Line items suggested by `POST /ai/generate`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratedItems {
    #[serde(default)]
    pub items: Vec<LineItem>,
}

/// Acknowledgement of `POST /email/send`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailReceipt {
    #[serde(default)]
    pub message: Option<String>,
}

impl EmailReceipt {
    pub fn message(&self) -> &str {
        self.message
            .as_deref()
            .unwrap_or("Invoice sent successfully!")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn invoice(status: &str) -> Invoice {
        serde_json::from_value(json!({
            "_id": format!("65f1c0ffee{}", status),
            "clientName": "Acme",
            "status": status,
            "amount": 120.0,
            "createdAt": "2024-03-01T10:00:00.000Z",
        }))
        .unwrap()
    }

    #[test]
    fn test_invoice_defaults() {
        let inv = invoice("paid");
        assert_eq!(inv.status, InvoiceStatus::Paid);
        assert_eq!(inv.currency, "USD");
        assert_eq!(inv.exchange_rate, 1.0);
        assert!(inv.items.is_empty());
        assert_eq!(inv.client_email(), None);
        assert_eq!(inv.number(), "65F1C0FF");
        assert!(!inv.is_foreign_currency());
        assert_eq!(
            inv.created_at.map(|t| t.to_rfc3339()).as_deref(),
            Some("2024-03-01T10:00:00+00:00")
        );
    }

    #[test]
    fn test_plain_id_alias() {
        let inv: Invoice = serde_json::from_value(json!({"id": "abc", "clientEmail": "  "})).unwrap();
        assert_eq!(inv.id, "abc");
        assert_eq!(inv.client_email(), None);
        assert_eq!(serde_json::to_value(&inv).unwrap()["_id"], "abc");
    }

    #[test]
    fn test_status_filter() {
        let invoices = vec![invoice("paid"), invoice("pending"), invoice("paid")];
        assert_eq!(StatusFilter::All.apply(&invoices).len(), 3);

        let paid: StatusFilter = "paid".parse().unwrap();
        assert_eq!(paid.apply(&invoices).len(), 2);
        assert!("archived".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn test_line_item_defaults() {
        let item: LineItem = serde_json::from_value(json!({"name": "Design", "price": 40.0})).unwrap();
        assert_eq!(item.qty, 1.0);
        assert_eq!(item.total(), 40.0);
    }
}
