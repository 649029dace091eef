//! Shared fixtures for integration tests: a dispatcher wired with
//! unconfigured transports (simulation mode) and fake-free defaults.
#![allow(dead_code)]

use std::sync::Arc;

use replen_server::fonts::FontStore;
use replen_server::order::models::{ContactMethod, OrderItem, SendOrderRequest};
use replen_server::order::OrderDispatcher;
use replen_server::pdf::{OrderPdfRenderer, SealStamper};
use replen_server::transport::{EmailTransport, FaxTransport};

pub fn dispatcher() -> OrderDispatcher {
    let http = reqwest::Client::new();
    let fonts = Arc::new(FontStore::load());
    OrderDispatcher::new(
        OrderPdfRenderer::new(fonts),
        SealStamper::new(None, http.clone()),
        FaxTransport::new(None, http.clone()),
        EmailTransport::new(None, None, http),
    )
}

pub fn items() -> Vec<OrderItem> {
    vec![
        OrderItem {
            name: "キャベツ".to_string(),
            unit_price: 150,
            quantity: 3,
            barcode: None,
            unit_label: "個".to_string(),
        },
        OrderItem {
            name: "たまねぎ".to_string(),
            unit_price: 100,
            quantity: 5,
            barcode: None,
            unit_label: "個".to_string(),
        },
    ]
}

pub fn fax_request() -> SendOrderRequest {
    SendOrderRequest {
        items: items(),
        supplier_name: Some("八百屋マート".to_string()),
        contact_method: ContactMethod::Fax,
        fax_number: Some("0312345678".to_string()),
        email: None,
        messaging_id: None,
        hanko_url: None,
        order_id: None,
        note: None,
        sender_name: Some("田中商店".to_string()),
        sender_phone: Some("03-9999-0000".to_string()),
    }
}

pub fn email_request() -> SendOrderRequest {
    SendOrderRequest {
        items: items(),
        supplier_name: Some("八百屋マート".to_string()),
        contact_method: ContactMethod::Email,
        fax_number: None,
        email: Some("orders@example.co.jp".to_string()),
        messaging_id: None,
        hanko_url: None,
        order_id: None,
        note: Some("月曜午前に納品お願いします".to_string()),
        sender_name: None,
        sender_phone: None,
    }
}
