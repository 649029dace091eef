//! Hanko synthesizer properties.

use replen_server::fonts::FontStore;
use replen_server::seal::image::{create_seal_png, CANVAS_SIZE};
use replen_server::seal::SealError;

fn png_dimensions(png: &[u8]) -> (u32, u32) {
    let decoded = image::load_from_memory(png).expect("seal must decode as an image");
    let rgba = decoded.to_rgba8();
    rgba.dimensions()
}

#[test]
fn renders_for_every_supported_character_count() {
    let fonts = FontStore::load();
    for text in ["印", "山田", "山田屋", "山田商店"] {
        let png = create_seal_png(&fonts, text)
            .unwrap_or_else(|e| panic!("seal for {text:?} failed: {e}"));
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(png_dimensions(&png), (CANVAS_SIZE, CANVAS_SIZE));
    }
}

#[test]
fn long_input_is_truncated_not_rejected() {
    let fonts = FontStore::load();
    let png = create_seal_png(&fonts, "山田商店本舗特選").unwrap();
    assert_eq!(png_dimensions(&png), (CANVAS_SIZE, CANVAS_SIZE));
}

#[test]
fn surrounding_whitespace_is_ignored() {
    let fonts = FontStore::load();
    assert!(create_seal_png(&fonts, "  印  ").is_ok());
}

#[test]
fn mixed_width_input_renders() {
    let fonts = FontStore::load();
    for text in ["Aあ", "K商店", "ｱｲ印"] {
        assert!(create_seal_png(&fonts, text).is_ok(), "failed for {text:?}");
    }
}

#[test]
fn empty_input_is_a_validation_error() {
    let fonts = FontStore::load();
    assert!(matches!(
        create_seal_png(&fonts, ""),
        Err(SealError::EmptyText)
    ));
    assert!(matches!(
        create_seal_png(&fonts, " \t "),
        Err(SealError::EmptyText)
    ));
}

#[test]
fn seal_has_ink_and_transparency() {
    let fonts = FontStore::load();
    let png = create_seal_png(&fonts, "印").unwrap();
    let rgba = image::load_from_memory(&png).unwrap().to_rgba8();

    let opaque = rgba.pixels().filter(|p| p.0[3] > 0).count();
    let transparent = rgba.pixels().filter(|p| p.0[3] == 0).count();
    assert!(opaque > 0, "seal must carry visible ink");
    assert!(transparent > 0, "background must stay transparent");
}
