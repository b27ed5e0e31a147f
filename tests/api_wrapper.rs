//! Bearer attachment and session teardown in the HTTP wrapper

mod common;

use std::sync::Arc;

use common::{client, client_with_storage, signed_in, TOKEN};
use invoiceflow::error::{Error, ErrorKind};
use invoiceflow::session::{LogoutReason, MemoryStorage, Storage, TOKEN_KEY};
use serde_json::json;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_bearer_token_attached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/invoices"))
        .and(header("Authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = signed_in(&server);
    let invoices = client.invoices().list().await.unwrap();
    assert!(invoices.is_empty());
}

#[tokio::test]
async fn test_no_header_without_session() {
    let server = MockServer::start().await;
    Mock::given(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client(&server);
    let data = client.analytics().dashboard().await.unwrap();
    assert!(!data.has_invoices());
}

#[tokio::test]
async fn test_token_without_user_is_not_sent() {
    let server = MockServer::start().await;
    Mock::given(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/invoices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let storage = Arc::new(MemoryStorage::new());
    storage.set_item(TOKEN_KEY, TOKEN).unwrap();
    let (client, navigator) = client_with_storage(&server, storage.clone());

    client.invoices().list().await.unwrap();
    assert_eq!(storage.get_item(TOKEN_KEY).unwrap(), None);
    assert!(navigator.entries().is_empty());
}

#[tokio::test]
async fn test_unauthorized_clears_session_and_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/analytics"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Token expired"})))
        .mount(&server)
        .await;

    let (client, navigator) = signed_in(&server);
    let err = client.analytics().analytics().await.unwrap_err();

    assert!(matches!(err, Error::Unauthorized { status: 401 }));
    assert_eq!(err.notice().kind, ErrorKind::SessionExpired);
    assert!(!client.context().is_authenticated());
    assert_eq!(
        navigator.entries(),
        vec![client.context().login_location(LogoutReason::Expired)]
    );
    assert_eq!(navigator.current().as_deref(), Some("/login?session=expired"));
}

#[tokio::test]
async fn test_forbidden_is_treated_like_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/invoices/abc"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let (client, navigator) = signed_in(&server);
    let err = client.invoices().delete("abc").await.unwrap_err();

    assert_eq!(err.status(), Some(403));
    assert!(!client.context().is_authenticated());
    assert_eq!(navigator.entries().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_rejections_redirect_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (client, navigator) = signed_in(&server);

    let mut handles = Vec::new();
    for i in 0..8 {
        let invoices = client.invoices();
        handles.push(tokio::spawn(async move {
            invoices.get(&format!("inv-{}", i)).await
        }));
    }
    for handle in handles {
        let result = handle.await.unwrap();
        assert_eq!(result.unwrap_err().status(), Some(401));
    }

    assert!(!client.context().is_authenticated());
    assert_eq!(navigator.entries(), vec!["/login?session=expired".to_string()]);
}

#[tokio::test]
async fn test_server_error_passes_through_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/invoices"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "Server error", "details": "db down"})),
        )
        .mount(&server)
        .await;

    let (client, navigator) = signed_in(&server);
    let err = client.invoices().list().await.unwrap_err();

    match &err {
        Error::Api(api) => {
            assert_eq!(api.status, 500);
            assert_eq!(api.detailed_message(), "db down");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.notice().kind, ErrorKind::Transport);
    assert!(client.context().is_authenticated());
    assert!(navigator.entries().is_empty());
}

#[tokio::test]
async fn test_connection_failure_is_transport() {
    let server = MockServer::builder().start().await;
    let (client, navigator) = signed_in(&server);
    drop(server);

    let err = client.invoices().list().await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(err.notice().message, "Connection failed. Check your internet.");
    assert!(client.context().is_authenticated());
    assert!(navigator.entries().is_empty());
}
