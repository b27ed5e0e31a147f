//! Client-side invoice editor

use serde::Serialize;

use super::rates::ExchangeRates;
use super::types::{default_currency, InvoiceStatus, LineItem};

/// A line item being edited, with a handle stable across edits
#[derive(Debug, Clone, PartialEq)]
pub struct DraftItem {
    pub key: u64,
    pub item: LineItem,
}

/// Which part of a line item to edit
#[derive(Debug, Clone, PartialEq)]
pub enum ItemField {
    Name(String),
    Qty(f64),
    Price(f64),
}

/// Body of `POST /invoices`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    pub client_name: String,
    pub client_email: String,
    pub status: InvoiceStatus,
    pub due_date: String,
    pub items: Vec<LineItem>,
    /// Total in USD
    pub amount: f64,
    pub currency: String,
    pub exchange_rate: f64,
    /// `amount` in `currency`
    pub converted_amount: f64,
}

/// An invoice under construction.
///
/// Starts with one empty line item, status `pending` and USD.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
    pub client_name: String,
    pub client_email: String,
    pub status: InvoiceStatus,
    pub due_date: String,
    pub currency: String,
    items: Vec<DraftItem>,
    next_key: u64,
}

impl Default for InvoiceDraft {
    fn default() -> Self {
        Self {
            client_name: String::new(),
            client_email: String::new(),
            status: InvoiceStatus::Pending,
            due_date: String::new(),
            currency: default_currency(),
            items: vec![DraftItem {
                key: 1,
                item: LineItem::default(),
            }],
            next_key: 2,
        }
    }
}

impl InvoiceDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[DraftItem] {
        &self.items
    }

    /// Append an empty item and return its key
    pub fn add_item(&mut self) -> u64 {
        let key = self.next_key();
        self.items.push(DraftItem {
            key,
            item: LineItem::default(),
        });
        key
    }

    /// Remove an item. Returns false if there was none with that key.
    pub fn remove_item(&mut self, key: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.key != key);
        self.items.len() != before
    }

    pub fn update_item(&mut self, key: u64, field: ItemField) -> bool {
        let Some(entry) = self.items.iter_mut().find(|i| i.key == key) else {
            return false;
        };
        match field {
            ItemField::Name(name) => entry.item.name = name,
            ItemField::Qty(qty) => entry.item.qty = qty,
            ItemField::Price(price) => entry.item.price = price,
        }
        true
    }

    /// Replace all items with generated ones, even when none came back
    pub fn apply_generated(&mut self, items: Vec<LineItem>) {
        self.items = items
            .into_iter()
            .map(|item| DraftItem {
                key: self.next_key(),
                item,
            })
            .collect();
    }

    /// Sum of qty × price, in USD
    pub fn total(&self) -> f64 {
        self.items.iter().map(|i| i.item.total()).sum()
    }

    /// Total in the selected currency
    pub fn converted_total(&self, rates: &ExchangeRates) -> f64 {
        self.total() * rates.rate(&self.currency)
    }

    /// Freeze the draft into a create request at the current rate
    pub fn to_request(&self, rates: &ExchangeRates) -> CreateInvoiceRequest {
        let amount = self.total();
        let rate = rates.rate(&self.currency);
        CreateInvoiceRequest {
            client_name: self.client_name.clone(),
            client_email: self.client_email.clone(),
            status: self.status,
            due_date: self.due_date.clone(),
            items: self.items.iter().map(|i| i.item.clone()).collect(),
            amount,
            currency: self.currency.clone(),
            exchange_rate: rate,
            converted_amount: amount * rate,
        }
    }

    fn next_key(&mut self) -> u64 {
        let key = self.next_key;
        self.next_key += 1;
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn rates() -> ExchangeRates {
        ExchangeRates::new(HashMap::from([("EUR".to_string(), 0.5)]))
    }

    #[test]
    fn test_new_draft() {
        let draft = InvoiceDraft::new();
        assert_eq!(draft.items().len(), 1);
        assert_eq!(draft.status, InvoiceStatus::Pending);
        assert_eq!(draft.currency, "USD");
        assert_eq!(draft.total(), 0.0);
    }

    #[test]
    fn test_edit_items() {
        let mut draft = InvoiceDraft::new();
        let first = draft.items()[0].key;
        assert!(draft.update_item(first, ItemField::Price(100.0)));
        assert!(draft.update_item(first, ItemField::Qty(2.0)));

        let second = draft.add_item();
        draft.update_item(second, ItemField::Name("Hosting".to_string()));
        draft.update_item(second, ItemField::Price(15.5));
        assert_eq!(draft.total(), 215.5);

        assert!(draft.remove_item(first));
        assert!(!draft.remove_item(first));
        assert!(!draft.update_item(first, ItemField::Qty(3.0)));
        assert_eq!(draft.total(), 15.5);
    }

    #[test]
    fn test_request_converts_at_rate() {
        let mut draft = InvoiceDraft::new();
        let key = draft.items()[0].key;
        draft.update_item(key, ItemField::Price(80.0));
        draft.currency = "EUR".to_string();

        let request = draft.to_request(&rates());
        assert_eq!(request.amount, 80.0);
        assert_eq!(request.exchange_rate, 0.5);
        assert_eq!(request.converted_amount, 40.0);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["convertedAmount"], 40.0);
        assert_eq!(value["exchangeRate"], 0.5);
        assert_eq!(value["status"], "pending");
    }

    #[test]
    fn test_unknown_currency_uses_unit_rate() {
        let mut draft = InvoiceDraft::new();
        draft.currency = "JPY".to_string();
        let key = draft.items()[0].key;
        draft.update_item(key, ItemField::Price(10.0));
        assert_eq!(draft.converted_total(&rates()), 10.0);
        assert_eq!(draft.to_request(&rates()).exchange_rate, 1.0);
    }

    #[test]
    fn test_apply_generated_items() {
        let mut draft = InvoiceDraft::new();
        draft.apply_generated(vec![
            LineItem::new("Logo design", 1.0, 300.0),
            LineItem::new("Revisions", 3.0, 50.0),
        ]);
        assert_eq!(draft.items().len(), 2);
        assert_eq!(draft.total(), 450.0);
        assert_ne!(draft.items()[0].key, draft.items()[1].key);
    }

    #[test]
    fn test_empty_suggestion_clears_items() {
        let mut draft = InvoiceDraft::new();
        draft.apply_generated(vec![]);
        assert!(draft.items().is_empty());
        assert_eq!(draft.total(), 0.0);

        draft.add_item();
        assert_eq!(draft.items().len(), 1);
    }
}
