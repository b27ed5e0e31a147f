#![allow(dead_code)]

use std::sync::Arc;

use invoiceflow::config::ClientOptions;
use invoiceflow::session::{HistoryNavigator, MemoryStorage, Session, UserProfile};
use invoiceflow::InvoiceFlow;
use serde_json::{json, Value};
use wiremock::MockServer;

pub const TOKEN: &str = "header.payload.signature";

pub fn init_logger() {
    let _ = pretty_env_logger::try_init();
}

/// Client pointed at the mock server, with a recording navigator
pub fn client(server: &MockServer) -> (InvoiceFlow, Arc<HistoryNavigator>) {
    client_for(&server.uri(), Arc::new(MemoryStorage::new()))
}

/// Like [`client`], over storage the test can seed directly
pub fn client_with_storage(
    server: &MockServer,
    storage: Arc<MemoryStorage>,
) -> (InvoiceFlow, Arc<HistoryNavigator>) {
    client_for(&server.uri(), storage)
}

/// Client for tests that never reach the network
pub fn offline_client() -> (InvoiceFlow, Arc<HistoryNavigator>) {
    client_for("http://127.0.0.1:9", Arc::new(MemoryStorage::new()))
}

fn client_for(base: &str, storage: Arc<MemoryStorage>) -> (InvoiceFlow, Arc<HistoryNavigator>) {
    init_logger();
    let navigator = Arc::new(HistoryNavigator::new());
    let options = ClientOptions::default()
        .with_api_url(&format!("{}/api", base))
        .with_server_url(base)
        .with_exchange_rates_url(&format!("{}/v4/latest/USD", base));
    let client = InvoiceFlow::new_with_options(options, storage, navigator.clone())
    .unwrap();
    (client, navigator)
}

pub fn user_json() -> Value {
    json!({
        "_id": "u1",
        "fullName": "Jane Doe",
        "email": "jane@example.com"
    })
}

pub fn session() -> Session {
    Session::new(
        TOKEN,
        UserProfile {
            id: "u1".to_string(),
            full_name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            provider: "local".to_string(),
            avatar: None,
        },
    )
}

/// Client with a stored session
pub fn signed_in(server: &MockServer) -> (InvoiceFlow, Arc<HistoryNavigator>) {
    let (client, navigator) = client(server);
    client.context().establish(&session()).unwrap();
    (client, navigator)
}
