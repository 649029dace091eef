//! Channel router behavior with no provider credentials configured.

mod common;

use common::{dispatcher, email_request, fax_request, items};
use replen_server::order::models::{ContactMethod, SendOrderRequest};

fn request_with(contact_method: ContactMethod) -> SendOrderRequest {
    SendOrderRequest {
        contact_method,
        ..fax_request()
    }
}

#[tokio::test]
async fn fax_send_simulates_with_dev_confirmation_id() {
    let result = dispatcher().dispatch(&fax_request()).await.unwrap();

    assert!(result.success);
    assert_eq!(result.channel_used, ContactMethod::Fax);
    assert!(result.message.contains("DEV MODE"));
    let id = result.confirmation_id.expect("simulation must carry an id");
    assert!(id.starts_with("DEV-"), "unexpected id: {id}");
}

#[tokio::test]
async fn email_send_simulates_with_dev_confirmation_id() {
    let result = dispatcher().dispatch(&email_request()).await.unwrap();

    assert!(result.success);
    assert_eq!(result.channel_used, ContactMethod::Email);
    let id = result.confirmation_id.expect("simulation must carry an id");
    assert!(id.starts_with("DEV-EMAIL-"), "unexpected id: {id}");
}

#[tokio::test]
async fn fax_without_number_fails_validation() {
    let mut request = fax_request();
    request.fax_number = None;

    let err = dispatcher().dispatch(&request).await.unwrap_err();
    assert_eq!(err.to_string(), "FAX番号が必要です");
}

#[tokio::test]
async fn email_without_address_fails_validation() {
    let mut request = email_request();
    request.email = None;

    let err = dispatcher().dispatch(&request).await.unwrap_err();
    assert_eq!(err.to_string(), "メールアドレスが必要です");
}

#[tokio::test]
async fn email_with_malformed_address_fails_validation() {
    let mut request = email_request();
    request.email = Some("not-an-address".to_string());

    let err = dispatcher().dispatch(&request).await.unwrap_err();
    assert_eq!(err.to_string(), "メールアドレスの形式が不正です");
}

#[tokio::test]
async fn empty_item_list_fails_validation() {
    let mut request = fax_request();
    request.items.clear();

    let err = dispatcher().dispatch(&request).await.unwrap_err();
    assert_eq!(err.to_string(), "注文項目がありません");
}

#[tokio::test]
async fn zero_quantity_fails_validation() {
    let mut request = fax_request();
    request.items[0].quantity = 0;

    assert!(dispatcher().dispatch(&request).await.is_err());
}

#[tokio::test]
async fn messaging_channel_is_never_dispatched() {
    let mut request = request_with(ContactMethod::Messaging);
    request.messaging_id = Some("line-user-42".to_string());

    let result = dispatcher().dispatch(&request).await.unwrap();

    assert!(!result.success);
    assert_eq!(result.channel_used, ContactMethod::Messaging);
    assert!(result.confirmation_id.is_none());
    assert!(result.message.contains("アプリから直接"));
}

#[tokio::test]
async fn messaging_ignores_missing_recipient_fields() {
    // Even with no identifiers at all the messaging channel answers the same
    // way; it never reaches the renderer or a transport.
    let request = SendOrderRequest {
        items: items(),
        supplier_name: None,
        contact_method: ContactMethod::Messaging,
        fax_number: None,
        email: None,
        messaging_id: None,
        hanko_url: None,
        order_id: None,
        note: None,
        sender_name: None,
        sender_phone: None,
    };

    let result = dispatcher().dispatch(&request).await.unwrap();
    assert!(!result.success);
    assert_eq!(result.channel_used, ContactMethod::Messaging);
}

#[tokio::test]
async fn untrusted_seal_url_does_not_block_the_send() {
    let mut request = fax_request();
    request.hanko_url = Some("http://attacker.example/seal.png".to_string());

    let result = dispatcher().dispatch(&request).await.unwrap();
    assert!(result.success, "rejected overlay must not fail the send");
}

#[tokio::test]
async fn preview_returns_pdf_bytes() {
    let (filename, bytes) = dispatcher().preview(&fax_request()).await.unwrap();

    assert!(filename.starts_with("order_"));
    assert!(filename.ends_with(".pdf"));
    assert!(bytes.starts_with(b"%PDF"));
}
