//! Invoice endpoints

mod draft;
mod rates;
mod types;

use log::info;
use serde::Serialize;

use crate::error::Error;
use crate::fetch::ApiClient;

pub use draft::*;
pub use rates::*;
pub use types::*;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    description: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailRequest<'a> {
    invoice_id: &'a str,
}

/// Client for `/invoices`, `/ai/generate` and `/email/send`
#[derive(Clone)]
pub struct InvoicesApi {
    api: ApiClient,
}

impl InvoicesApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// All invoices of the signed-in user
    pub async fn list(&self) -> Result<Vec<Invoice>, Error> {
        self.api.get("/invoices").execute().await
    }

    /// Invoices narrowed by status, in server order
    pub async fn list_filtered(&self, filter: StatusFilter) -> Result<Vec<Invoice>, Error> {
        let invoices = self.list().await?;
        Ok(invoices.into_iter().filter(|inv| filter.matches(inv)).collect())
    }

    pub async fn get(&self, id: &str) -> Result<Invoice, Error> {
        let path = format!("/invoices/{}", urlencoding::encode(id));
        self.api.get(&path).execute().await
    }

    pub async fn create(&self, request: &CreateInvoiceRequest) -> Result<Invoice, Error> {
        let invoice: Invoice = self.api.post("/invoices").json(request)?.execute().await?;
        info!("Created invoice {} for {}", invoice.id, invoice.client_name);
        Ok(invoice)
    }

    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        let path = format!("/invoices/{}", urlencoding::encode(id));
        self.api.delete(&path).execute_empty().await?;
        info!("Deleted invoice {}", id);
        Ok(())
    }

    /// Suggest line items from a free-text description. A blank
    /// description is rejected without a request.
    pub async fn generate_items(&self, description: &str) -> Result<Vec<LineItem>, Error> {
        let description = description.trim();
        if description.is_empty() {
            return Err(Error::validation("Describe the work to generate an invoice"));
        }
        let generated: GeneratedItems = self
            .api
            .post("/ai/generate")
            .json(&GenerateRequest { description })?
            .execute()
            .await?;
        Ok(generated.items)
    }

    /// Email the invoice to its client. Invoices without a client email are
    /// rejected without a request.
    pub async fn send_email(&self, invoice: &Invoice) -> Result<EmailReceipt, Error> {
        if invoice.client_email().is_none() {
            return Err(Error::validation(
                "This invoice has no client email address.",
            ));
        }
        let receipt: EmailReceipt = self
            .api
            .post("/email/send")
            .json(&SendEmailRequest {
                invoice_id: &invoice.id,
            })?
            .execute()
            .await?;
        info!("Sent invoice {}: {}", invoice.id, receipt.message());
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use invoiceflow_session::{HistoryNavigator, MemoryStorage, SessionContext};
    use reqwest::Client;

    // Nothing listens here; a request would fail as a transport error.
    fn offline() -> InvoicesApi {
        let context = Arc::new(SessionContext::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(HistoryNavigator::new()),
        ));
        InvoicesApi::new(ApiClient::new("http://127.0.0.1:9", Client::new(), context))
    }

    #[test]
    fn test_rejected_before_sending() {
        let invoices = offline();
        let invoice: Invoice =
            serde_json::from_value(serde_json::json!({"_id": "a1", "clientEmail": ""})).unwrap();

        tokio_test::block_on(async {
            let err = invoices.generate_items(" \n ").await.unwrap_err();
            assert!(matches!(err, Error::Validation(_)));

            let err = invoices.send_email(&invoice).await.unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        });
    }
}
