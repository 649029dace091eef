//! Hanko image synthesis.
//!
//! Draws a traditional vermilion seal: a circular ring plus one to four
//! characters arranged the way a carved seal reads — a single character
//! centered, pairs stacked top to bottom, threes and fours right to left.

use image::{Rgba, RgbaImage};
use rusttype::{point, Font, Scale};
use std::io::Cursor;

use super::SealError;
use crate::fonts::FontStore;

pub const CANVAS_SIZE: u32 = 300;
pub const MAX_SEAL_CHARS: usize = 4;
const BORDER_WIDTH: u32 = 10;
// Traditional shu-iro ink.
const VERMILION: [u8; 3] = [0xEA, 0x33, 0x23];

/// Glyph size shrinks as the character count grows so the text stays inside
/// the ring.
fn seal_font_px(char_count: usize) -> f32 {
    match char_count {
        1 => 160.0,
        2 => 110.0,
        _ => 90.0,
    }
}

/// Render `text` (1–4 characters; longer input is truncated, not rejected)
/// into a transparent PNG. Pure function of the text given the font resource;
/// when the font is unavailable the ring still renders.
pub fn create_seal_png(fonts: &FontStore, text: &str) -> Result<Vec<u8>, SealError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(SealError::EmptyText);
    }
    let chars: Vec<char> = trimmed.chars().take(MAX_SEAL_CHARS).collect();

    let mut canvas = RgbaImage::from_pixel(CANVAS_SIZE, CANVAS_SIZE, Rgba([0, 0, 0, 0]));
    draw_ring(&mut canvas);

    match fonts.glyph_font() {
        Some(font) => draw_characters(&mut canvas, font, &chars),
        None => log::warn!("seal font unavailable; rendering ring without glyphs"),
    }

    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(canvas)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)?;
    Ok(out)
}

fn draw_ring(canvas: &mut RgbaImage) {
    let c = CANVAS_SIZE as f32 / 2.0;
    let outer = c - BORDER_WIDTH as f32 / 2.0;
    let inner = outer - BORDER_WIDTH as f32;

    for y in 0..CANVAS_SIZE {
        for x in 0..CANVAS_SIZE {
            let dx = x as f32 + 0.5 - c;
            let dy = y as f32 + 0.5 - c;
            let d = (dx * dx + dy * dy).sqrt();
            // One-pixel soft edge on both rims.
            let coverage = (1.0 - (d - outer).clamp(0.0, 1.0)) * (1.0 - (inner - d).clamp(0.0, 1.0));
            if coverage > 0.0 {
                blend(canvas, x as i32, y as i32, coverage);
            }
        }
    }
}

/// Measured ink extents of a glyph, relative to its own bounding box.
#[derive(Debug, Clone, Copy, Default)]
struct InkBox {
    width: i32,
    height: i32,
}

fn ink_box(font: &Font, ch: char, scale: Scale) -> InkBox {
    let glyph = font.glyph(ch).scaled(scale).positioned(point(0.0, 0.0));
    glyph
        .pixel_bounding_box()
        .map(|bb| InkBox {
            width: bb.width(),
            height: bb.height(),
        })
        .unwrap_or_default()
}

/// Draw `ch` so the top-left of its measured ink box lands on (left, top).
/// Centering on the ink box rather than the advance width corrects for the
/// asymmetric metrics of CJK faces.
fn draw_char_at(canvas: &mut RgbaImage, font: &Font, ch: char, scale: Scale, left: i32, top: i32) {
    let glyph = font.glyph(ch).scaled(scale).positioned(point(0.0, 0.0));
    if glyph.pixel_bounding_box().is_none() {
        return;
    }
    glyph.draw(|gx, gy, coverage| {
        blend(canvas, left + gx as i32, top + gy as i32, coverage);
    });
}

fn draw_characters(canvas: &mut RgbaImage, font: &Font, chars: &[char]) {
    let font_px = seal_font_px(chars.len());
    let scale = Scale::uniform(font_px);
    let sizes: Vec<(i32, i32)> = chars
        .iter()
        .map(|c| {
            let b = ink_box(font, *c, scale);
            (b.width, b.height)
        })
        .collect();

    for (i, (left, top)) in layout_positions(&sizes, font_px).iter().enumerate() {
        draw_char_at(canvas, font, chars[i], scale, *left, *top);
    }
}

/// Compute the canvas position of each character's ink box. Layout rules are
/// keyed to the character count:
/// 1 centered; 2 stacked top-to-bottom; 3 as two-over-one read right-to-left;
/// 4 as a 2×2 grid read right-to-left, top-to-bottom.
pub(crate) fn layout_positions(sizes: &[(i32, i32)], font_px: f32) -> Vec<(i32, i32)> {
    let center = CANVAS_SIZE as i32 / 2;
    let gap_h = (font_px * 0.05) as i32;
    let gap_v = (font_px * 0.1) as i32;

    match sizes.len() {
        0 => Vec::new(),
        1 => {
            let (w, h) = sizes[0];
            vec![(center - w / 2, center - h / 2)]
        }
        2 => {
            let (w0, h0) = sizes[0];
            let (w1, _) = sizes[1];
            let total_h = h0 + gap_v + sizes[1].1;
            let top = center - total_h / 2;
            vec![
                (center - w0 / 2, top),
                (center - w1 / 2, top + h0 + gap_v),
            ]
        }
        3 => {
            let (w1, _) = sizes[1];
            let (w2, _) = sizes[2];
            let top_row_h = sizes[0].1.max(sizes[1].1);
            let total_h = top_row_h + gap_v + sizes[2].1;
            let top = center - total_h / 2;
            vec![
                // Top row reads right to left: the first character sits right
                // of center.
                (center + gap_h / 2, top),
                (center - gap_h / 2 - w1, top),
                (center - w2 / 2, top + top_row_h + gap_v),
            ]
        }
        _ => {
            let cell_w = sizes.iter().map(|s| s.0).max().unwrap_or(0);
            let cell_h = sizes.iter().map(|s| s.1).max().unwrap_or(0);
            let start_x = center - (cell_w * 2 + gap_h) / 2;
            let start_y = center - (cell_h * 2 + gap_v) / 2;
            // Reading order: top-right, top-left, bottom-right, bottom-left.
            let cells = [
                (start_x + cell_w + gap_h, start_y),
                (start_x, start_y),
                (start_x + cell_w + gap_h, start_y + cell_h + gap_v),
                (start_x, start_y + cell_h + gap_v),
            ];
            sizes
                .iter()
                .zip(cells)
                .map(|((w, h), (cx, cy))| (cx + (cell_w - w) / 2, cy + (cell_h - h) / 2))
                .collect()
        }
    }
}

fn blend(canvas: &mut RgbaImage, x: i32, y: i32, coverage: f32) {
    if x < 0 || y < 0 || x >= CANVAS_SIZE as i32 || y >= CANVAS_SIZE as i32 {
        return;
    }
    let alpha = (coverage * 255.0).round().clamp(0.0, 255.0) as u8;
    if alpha == 0 {
        return;
    }
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    pixel.0 = [
        VERMILION[0],
        VERMILION[1],
        VERMILION[2],
        pixel.0[3].max(alpha),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: (i32, i32) = (80, 80);

    #[test]
    fn single_character_is_centered() {
        let positions = layout_positions(&[SQUARE], 160.0);
        assert_eq!(positions, vec![(150 - 40, 150 - 40)]);
    }

    #[test]
    fn two_characters_stack_vertically() {
        let positions = layout_positions(&[SQUARE, SQUARE], 110.0);
        assert_eq!(positions.len(), 2);
        let (x0, y0) = positions[0];
        let (x1, y1) = positions[1];
        assert_eq!(x0, x1);
        assert!(y1 > y0);
    }

    #[test]
    fn three_characters_put_first_on_the_right() {
        let positions = layout_positions(&[SQUARE, SQUARE, SQUARE], 90.0);
        assert_eq!(positions.len(), 3);
        let (x0, y0) = positions[0];
        let (x1, y1) = positions[1];
        let (x2, y2) = positions[2];
        assert!(x0 > x1, "seal reads right to left");
        assert_eq!(y0, y1);
        assert!(y2 > y0, "third character sits on the bottom row");
        assert!(x1 < x2 && x2 < x0, "bottom character is centered");
    }

    #[test]
    fn four_characters_form_a_right_to_left_grid() {
        let positions = layout_positions(&[SQUARE; 4], 90.0);
        assert_eq!(positions.len(), 4);
        assert!(positions[0].0 > positions[1].0);
        assert_eq!(positions[0].1, positions[1].1);
        assert!(positions[2].1 > positions[0].1);
        assert_eq!(positions[0].0, positions[2].0);
        assert_eq!(positions[1].0, positions[3].0);
    }

    #[test]
    fn mixed_width_characters_stay_centered_per_cell() {
        let narrow = (30, 80);
        let positions = layout_positions(&[SQUARE, narrow, SQUARE, SQUARE], 90.0);
        // The narrow glyph is inset within its cell; the full-width glyph
        // below it starts at the cell's left edge.
        assert_eq!(positions[1].0 - positions[3].0, (80 - 30) / 2);
    }

    #[test]
    fn seal_renders_png_for_all_supported_lengths() {
        let fonts = FontStore::load();
        for text in ["山", "山田", "山田商", "山田商店", "山田商店本舗"] {
            let png = create_seal_png(&fonts, text).expect("seal must always render");
            assert!(png.len() > 8);
            assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        }
    }

    #[test]
    fn empty_text_is_rejected() {
        let fonts = FontStore::load();
        assert!(matches!(
            create_seal_png(&fonts, "   "),
            Err(SealError::EmptyText)
        ));
    }

    #[test]
    fn ring_has_vermilion_pixels() {
        let fonts = FontStore::load();
        let png = create_seal_png(&fonts, "印").unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (CANVAS_SIZE, CANVAS_SIZE));
        // Sample the ring at the rightmost point of the circle.
        let px = decoded.get_pixel(CANVAS_SIZE - BORDER_WIDTH, CANVAS_SIZE / 2);
        assert_eq!(px.0[..3], VERMILION);
        assert!(px.0[3] > 0);
        // The center of a one-character seal's corner stays transparent.
        assert_eq!(decoded.get_pixel(2, 2).0[3], 0);
    }
}
