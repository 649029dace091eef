//! Renderer and seal-compositor behavior.

mod common;

use std::sync::Arc;

use common::items;
use replen_server::fonts::FontStore;
use replen_server::order::models::OrderItem;
use replen_server::pdf::{OrderPdfRenderer, OrderSheetData, SealStamper};

fn renderer() -> OrderPdfRenderer {
    OrderPdfRenderer::new(Arc::new(FontStore::load()))
}

fn sheet<'a>(items: &'a [OrderItem]) -> OrderSheetData<'a> {
    OrderSheetData {
        items,
        supplier_name: Some("八百屋マート"),
        sender_name: Some("田中商店"),
        sender_phone: Some("03-9999-0000"),
        note: Some("月曜午前に納品お願いします"),
    }
}

#[test]
fn renders_a_pdf_document() {
    let items = items();
    let document = renderer().render(&sheet(&items)).unwrap();

    assert!(document.bytes().starts_with(b"%PDF"));
    assert!(document.bytes().len() > 500);
    assert!(document.filename().starts_with("order_"));
}

#[test]
fn missing_optional_fields_degrade_gracefully() {
    let items = items();
    let data = OrderSheetData {
        items: &items,
        supplier_name: None,
        sender_name: None,
        sender_phone: None,
        note: None,
    };
    let document = renderer().render(&data).unwrap();
    assert!(document.bytes().starts_with(b"%PDF"));
}

#[test]
fn hostile_text_never_corrupts_the_document() {
    let hostile = vec![
        OrderItem {
            name: "<script>alert('x')</script> & <b>太字</b>".to_string(),
            unit_price: 100,
            quantity: 1,
            barcode: None,
            unit_label: "個".to_string(),
        },
        OrderItem {
            name: "制御\u{0000}文字\u{001b}入り\u{0007}".to_string(),
            unit_price: 200,
            quantity: 2,
            barcode: None,
            unit_label: "箱".to_string(),
        },
    ];
    let data = OrderSheetData {
        items: &hostile,
        supplier_name: Some("<evil> & co"),
        sender_name: Some("送信者\u{0008}"),
        sender_phone: Some("03>1234<5678"),
        note: Some("備考 & <注意>\n二行目"),
    };

    let document = renderer().render(&data).unwrap();
    assert!(document.bytes().starts_with(b"%PDF"));
}

#[test]
fn long_orders_paginate() {
    let many: Vec<OrderItem> = (0..80)
        .map(|i| OrderItem {
            name: format!("商品番号{i}"),
            unit_price: 100 + i as i64,
            quantity: 1 + (i % 4),
            barcode: None,
            unit_label: "個".to_string(),
        })
        .collect();

    let document = renderer().render(&sheet(&many)).unwrap();
    // More rows than fit one A4 page must still produce a well-formed file.
    assert!(document.bytes().starts_with(b"%PDF"));
    assert!(document.bytes().len() > 2000);
}

#[test]
fn temp_file_lives_with_the_document_and_dies_with_it() {
    let items = items();
    let document = renderer().render(&sheet(&items)).unwrap();
    let path = document.path().to_path_buf();

    assert!(path.exists(), "temp artifact must exist while held");
    drop(document);
    assert!(!path.exists(), "temp artifact must be removed on drop");
}

#[test]
fn into_bytes_removes_the_temp_file() {
    let items = items();
    let document = renderer().render(&sheet(&items)).unwrap();
    let path = document.path().to_path_buf();

    let bytes = document.into_bytes();
    assert!(bytes.starts_with(b"%PDF"));
    assert!(!path.exists());
}

#[tokio::test]
async fn rejected_seal_url_leaves_the_document_unmodified() {
    let items = items();
    let mut document = renderer().render(&sheet(&items)).unwrap();
    let before = document.bytes().to_vec();

    let stamper = SealStamper::new(None, reqwest::Client::new());
    for url in [
        "http://myproject.supabase.co/storage/v1/object/public/hanko/a.png",
        "https://attacker.example/storage/v1/object/public/hanko/a.png",
        "https://myproject.supabase.co/internal/secrets",
        "not a url at all",
    ] {
        stamper.stamp_first_page(&mut document, url).await;
        assert_eq!(
            document.bytes(),
            before.as_slice(),
            "document changed for rejected URL {url}"
        );
    }
}
