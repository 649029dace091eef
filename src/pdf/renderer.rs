//! Fax-safe order sheet renderer.
//!
//! Produces an A4 注文書: title, recipient/sender header, itemized table with
//! a computed totals row, boxed note section, closing line. Everything is
//! black ink on white so the sheet survives lossy greyscale fax transmission.

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};
use std::io::BufWriter;
use std::sync::Arc;
use uuid::Uuid;

use super::common::{format_japanese_date, format_yen, sanitize_text};
use super::{RenderError, RenderedDocument};
use crate::fonts::FontStore;
use crate::order::models::{order_total, OrderItem};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const CONTENT_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;

const TITLE_SIZE: f32 = 24.0;
const RECIPIENT_SIZE: f32 = 12.0;
const SENDER_SIZE: f32 = 13.0;
const HEADER_SIZE: f32 = 10.0;
const BODY_SIZE: f32 = 9.0;
const TOTALS_SIZE: f32 = 11.0;

const ROW_HEIGHT_MM: f32 = 8.0;
const ROW_DESCENT_MM: f32 = 2.5;
const NOTE_LINE_MM: f32 = 5.0;
const MAX_NOTE_LINES: usize = 35;
const GRID_THICKNESS: f32 = 0.4;

// Item table column widths; they sum to CONTENT_WIDTH_MM.
const COL_NO_W: f32 = 12.0;
const COL_NAME_W: f32 = 78.0;
const COL_UNIT_PRICE_W: f32 = 26.0;
const COL_QTY_W: f32 = 24.0;
const COL_AMOUNT_W: f32 = 30.0;

const SENDER_PLACEHOLDER: &str = "ReplenMobile ご利用者";
const GREETING: &str = "いつもお世話になっております。下記の通り発注いたします。";
const CLOSING: &str = "よろしくお願いいたします。";

/// Normalized input for one order sheet.
pub struct OrderSheetData<'a> {
    pub items: &'a [OrderItem],
    pub supplier_name: Option<&'a str>,
    pub sender_name: Option<&'a str>,
    pub sender_phone: Option<&'a str>,
    pub note: Option<&'a str>,
}

pub struct OrderPdfRenderer {
    fonts: Arc<FontStore>,
}

impl OrderPdfRenderer {
    pub fn new(fonts: Arc<FontStore>) -> Self {
        Self { fonts }
    }

    pub fn render(&self, data: &OrderSheetData<'_>) -> Result<RenderedDocument, RenderError> {
        let (doc, first_page, first_layer) = PdfDocument::new(
            "注文書",
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Layer 1",
        );
        let font = self.embed_font(&doc)?;
        let mut layer = doc.get_page(first_page).get_layer(first_layer);
        init_layer(&layer);

        let mut y = PAGE_HEIGHT_MM - MARGIN_MM - 8.0;

        // Title, centered.
        let title = "注文書";
        let title_w = self.fonts.text_width_mm(title, TITLE_SIZE);
        layer.use_text(
            title,
            TITLE_SIZE,
            Mm((PAGE_WIDTH_MM - title_w) / 2.0),
            Mm(y),
            &font,
        );
        y -= 16.0;

        // Two-column header: recipient left, sender right in larger type so a
        // recipient can identify the orderer at a glance on a degraded fax.
        let header_top = y;
        let mut left_y = header_top;
        if let Some(supplier) = non_empty(data.supplier_name) {
            let line = format!("宛先: {} 御中", sanitize_text(supplier));
            let line = fit_text(&self.fonts, &line, RECIPIENT_SIZE, CONTENT_WIDTH_MM * 0.55);
            layer.use_text(line, RECIPIENT_SIZE, Mm(MARGIN_MM), Mm(left_y), &font);
            left_y -= 7.0;
        }

        let mut right_y = header_top;
        let sender = non_empty(data.sender_name)
            .map(sanitize_text)
            .unwrap_or_else(|| SENDER_PLACEHOLDER.to_string());
        self.draw_right_aligned(&layer, &font, &format!("発注元: {sender}"), SENDER_SIZE, right_y);
        right_y -= 7.0;
        if let Some(phone) = non_empty(data.sender_phone) {
            let line = format!("TEL: {}", sanitize_text(phone));
            self.draw_right_aligned(&layer, &font, &line, HEADER_SIZE, right_y);
            right_y -= 6.0;
        }
        let date_line = format!("日付: {}", format_japanese_date());
        self.draw_right_aligned(&layer, &font, &date_line, HEADER_SIZE, right_y);
        right_y -= 6.0;

        y = left_y.min(right_y) - 5.0;

        layer.use_text(GREETING, BODY_SIZE + 1.0, Mm(MARGIN_MM), Mm(y), &font);
        y -= 11.0;

        // Itemized table.
        self.draw_table_header(&layer, &font, y);
        y -= ROW_HEIGHT_MM;
        for (index, item) in data.items.iter().enumerate() {
            if y < MARGIN_MM + 2.0 * ROW_HEIGHT_MM {
                layer = next_page(&doc);
                y = PAGE_HEIGHT_MM - MARGIN_MM - 6.0;
                self.draw_table_header(&layer, &font, y);
                y -= ROW_HEIGHT_MM;
            }
            self.draw_item_row(&layer, &font, y, index + 1, item);
            y -= ROW_HEIGHT_MM;
        }

        if y < MARGIN_MM + 2.0 * ROW_HEIGHT_MM {
            layer = next_page(&doc);
            y = PAGE_HEIGHT_MM - MARGIN_MM - 6.0;
        }
        self.draw_totals_row(&layer, &font, y, order_total(data.items));
        y -= ROW_HEIGHT_MM + 8.0;

        // Note section.
        let note = data
            .note
            .map(sanitize_text)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "特になし".to_string());
        let mut note_lines = wrap_text(&self.fonts, &note, BODY_SIZE, CONTENT_WIDTH_MM - 6.0);
        if note_lines.len() > MAX_NOTE_LINES {
            note_lines.truncate(MAX_NOTE_LINES);
            if let Some(last) = note_lines.last_mut() {
                last.push('…');
            }
        }
        let note_height = 7.0 + note_lines.len() as f32 * NOTE_LINE_MM + 4.0;
        if y - note_height < MARGIN_MM + 10.0 {
            layer = next_page(&doc);
            y = PAGE_HEIGHT_MM - MARGIN_MM - 6.0;
        }
        y = self.draw_note_box(&layer, &font, y, &note_lines);
        y -= 10.0;

        layer.use_text(CLOSING, BODY_SIZE + 1.0, Mm(MARGIN_MM), Mm(y), &font);

        let mut writer = BufWriter::new(Vec::new());
        doc.save(&mut writer)
            .map_err(|e| RenderError::Serialize(e.to_string()))?;
        let bytes = writer
            .into_inner()
            .map_err(|e| RenderError::Serialize(e.to_string()))?;

        let id = Uuid::new_v4().simple().to_string();
        let filename = format!("order_{}.pdf", &id[..8]);
        RenderedDocument::new(bytes, filename)
    }

    fn embed_font(&self, doc: &PdfDocumentReference) -> Result<IndirectFontRef, RenderError> {
        match self.fonts.bytes() {
            Some(bytes) => doc
                .add_external_font(std::io::Cursor::new(bytes.to_vec()))
                .map_err(|e| RenderError::Font(e.to_string())),
            None => doc
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(|e| RenderError::Font(e.to_string())),
        }
    }

    fn draw_right_aligned(
        &self,
        layer: &PdfLayerReference,
        font: &IndirectFontRef,
        text: &str,
        size: f32,
        y: f32,
    ) {
        let width = self.fonts.text_width_mm(text, size);
        layer.use_text(
            text,
            size,
            Mm(PAGE_WIDTH_MM - MARGIN_MM - width),
            Mm(y),
            font,
        );
    }

    /// Header row drawn with its text baseline at `y`.
    fn draw_table_header(&self, layer: &PdfLayerReference, font: &IndirectFontRef, y: f32) {
        let columns = column_edges();
        let top = y + ROW_HEIGHT_MM - ROW_DESCENT_MM;
        let bottom = y - ROW_DESCENT_MM;

        draw_line(layer, MARGIN_MM, top, PAGE_WIDTH_MM - MARGIN_MM, top);
        draw_line(layer, MARGIN_MM, bottom, PAGE_WIDTH_MM - MARGIN_MM, bottom);
        for x in columns {
            draw_line(layer, x, top, x, bottom);
        }

        let labels: [(&str, f32, f32); 5] = [
            ("No.", MARGIN_MM, COL_NO_W),
            ("商品名", MARGIN_MM + COL_NO_W, COL_NAME_W),
            ("単価", MARGIN_MM + COL_NO_W + COL_NAME_W, COL_UNIT_PRICE_W),
            (
                "数量",
                MARGIN_MM + COL_NO_W + COL_NAME_W + COL_UNIT_PRICE_W,
                COL_QTY_W,
            ),
            (
                "金額",
                MARGIN_MM + COL_NO_W + COL_NAME_W + COL_UNIT_PRICE_W + COL_QTY_W,
                COL_AMOUNT_W,
            ),
        ];
        for (label, x, width) in labels {
            let w = self.fonts.text_width_mm(label, HEADER_SIZE);
            layer.use_text(label, HEADER_SIZE, Mm(x + (width - w) / 2.0), Mm(y), font);
        }
    }

    fn draw_item_row(
        &self,
        layer: &PdfLayerReference,
        font: &IndirectFontRef,
        y: f32,
        number: usize,
        item: &OrderItem,
    ) {
        let columns = column_edges();
        let top = y + ROW_HEIGHT_MM - ROW_DESCENT_MM;
        let bottom = y - ROW_DESCENT_MM;

        draw_line(layer, MARGIN_MM, bottom, PAGE_WIDTH_MM - MARGIN_MM, bottom);
        for x in columns {
            draw_line(layer, x, top, x, bottom);
        }

        let x_no = MARGIN_MM;
        let x_name = x_no + COL_NO_W;
        let x_unit_price = x_name + COL_NAME_W;
        let x_qty = x_unit_price + COL_UNIT_PRICE_W;
        let x_amount = x_qty + COL_QTY_W;

        let no = number.to_string();
        let no_w = self.fonts.text_width_mm(&no, BODY_SIZE);
        layer.use_text(no, BODY_SIZE, Mm(x_no + (COL_NO_W - no_w) / 2.0), Mm(y), font);

        let name = fit_text(
            &self.fonts,
            &sanitize_text(&item.name),
            BODY_SIZE,
            COL_NAME_W - 4.0,
        );
        layer.use_text(name, BODY_SIZE, Mm(x_name + 2.0), Mm(y), font);

        let unit_price = format_yen(item.unit_price);
        let up_w = self.fonts.text_width_mm(&unit_price, BODY_SIZE);
        layer.use_text(
            unit_price,
            BODY_SIZE,
            Mm(x_unit_price + COL_UNIT_PRICE_W - 2.0 - up_w),
            Mm(y),
            font,
        );

        let qty = format!("{} {}", item.quantity, sanitize_text(&item.unit_label));
        let qty_w = self.fonts.text_width_mm(&qty, BODY_SIZE);
        layer.use_text(
            qty,
            BODY_SIZE,
            Mm(x_qty + (COL_QTY_W - qty_w) / 2.0),
            Mm(y),
            font,
        );

        let amount = format_yen(item.subtotal());
        let amount_w = self.fonts.text_width_mm(&amount, BODY_SIZE);
        layer.use_text(
            amount,
            BODY_SIZE,
            Mm(x_amount + COL_AMOUNT_W - 2.0 - amount_w),
            Mm(y),
            font,
        );
    }

    fn draw_totals_row(
        &self,
        layer: &PdfLayerReference,
        font: &IndirectFontRef,
        y: f32,
        total: i64,
    ) {
        let bottom = y - ROW_DESCENT_MM;
        let top = y + ROW_HEIGHT_MM - ROW_DESCENT_MM;
        let x_qty = MARGIN_MM + COL_NO_W + COL_NAME_W + COL_UNIT_PRICE_W;

        draw_line(layer, MARGIN_MM, bottom, PAGE_WIDTH_MM - MARGIN_MM, bottom);
        draw_line(layer, MARGIN_MM, top, MARGIN_MM, bottom);
        draw_line(
            layer,
            PAGE_WIDTH_MM - MARGIN_MM,
            top,
            PAGE_WIDTH_MM - MARGIN_MM,
            bottom,
        );

        let label = "合計";
        let label_w = self.fonts.text_width_mm(label, TOTALS_SIZE);
        layer.use_text(
            label,
            TOTALS_SIZE,
            Mm(x_qty + (COL_QTY_W - label_w) / 2.0),
            Mm(y),
            font,
        );

        let amount = format_yen(total);
        let amount_w = self.fonts.text_width_mm(&amount, TOTALS_SIZE);
        layer.use_text(
            amount,
            TOTALS_SIZE,
            Mm(PAGE_WIDTH_MM - MARGIN_MM - 2.0 - amount_w),
            Mm(y),
            font,
        );
    }

    /// Draw the boxed 備考 section; returns the y below the box.
    fn draw_note_box(
        &self,
        layer: &PdfLayerReference,
        font: &IndirectFontRef,
        y: f32,
        lines: &[String],
    ) -> f32 {
        layer.use_text("備考", HEADER_SIZE, Mm(MARGIN_MM), Mm(y), font);
        let box_top = y - 2.0;
        let box_height = lines.len() as f32 * NOTE_LINE_MM + 4.0;
        let box_bottom = box_top - box_height;

        draw_line(layer, MARGIN_MM, box_top, PAGE_WIDTH_MM - MARGIN_MM, box_top);
        draw_line(
            layer,
            MARGIN_MM,
            box_bottom,
            PAGE_WIDTH_MM - MARGIN_MM,
            box_bottom,
        );
        draw_line(layer, MARGIN_MM, box_top, MARGIN_MM, box_bottom);
        draw_line(
            layer,
            PAGE_WIDTH_MM - MARGIN_MM,
            box_top,
            PAGE_WIDTH_MM - MARGIN_MM,
            box_bottom,
        );

        let mut line_y = box_top - NOTE_LINE_MM;
        for line in lines {
            layer.use_text(line.as_str(), BODY_SIZE, Mm(MARGIN_MM + 3.0), Mm(line_y), font);
            line_y -= NOTE_LINE_MM;
        }

        box_bottom
    }
}

fn column_edges() -> [f32; 6] {
    let x0 = MARGIN_MM;
    let x1 = x0 + COL_NO_W;
    let x2 = x1 + COL_NAME_W;
    let x3 = x2 + COL_UNIT_PRICE_W;
    let x4 = x3 + COL_QTY_W;
    let x5 = x4 + COL_AMOUNT_W;
    [x0, x1, x2, x3, x4, x5]
}

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

// Fax-safe: black ink only, on every page.
fn init_layer(layer: &PdfLayerReference) {
    layer.set_fill_color(black());
    layer.set_outline_color(black());
    layer.set_outline_thickness(GRID_THICKNESS);
}

fn next_page(doc: &PdfDocumentReference) -> PdfLayerReference {
    let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let layer = doc.get_page(page).get_layer(layer);
    init_layer(&layer);
    layer
}

fn draw_line(layer: &PdfLayerReference, x1: f32, y1: f32, x2: f32, y2: f32) {
    let line = Line {
        points: vec![
            (Point::new(Mm(x1), Mm(y1)), false),
            (Point::new(Mm(x2), Mm(y2)), false),
        ],
        is_closed: false,
    };
    layer.add_line(line);
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Truncate `text` with an ellipsis once it exceeds `max_w` millimetres.
fn fit_text(fonts: &FontStore, text: &str, size: f32, max_w: f32) -> String {
    if fonts.text_width_mm(text, size) <= max_w {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        let candidate = format!("{out}{ch}…");
        if fonts.text_width_mm(&candidate, size) > max_w {
            break;
        }
        out.push(ch);
    }
    out.push('…');
    out
}

/// Greedy per-character wrap; honors embedded newlines.
fn wrap_text(fonts: &FontStore, text: &str, size: f32, max_w: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for raw_line in text.split('\n') {
        let mut current = String::new();
        for ch in raw_line.chars() {
            let candidate = format!("{current}{ch}");
            if !current.is_empty() && fonts.text_width_mm(&candidate, size) > max_w {
                lines.push(std::mem::take(&mut current));
                current.push(ch);
            } else {
                current = candidate;
            }
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_widths_fill_the_content_area() {
        let edges = column_edges();
        assert_eq!(edges[0], MARGIN_MM);
        assert!((edges[5] - (PAGE_WIDTH_MM - MARGIN_MM)).abs() < f32::EPSILON);
    }

    #[test]
    fn wrap_text_honors_newlines() {
        let fonts = FontStore::load();
        let lines = wrap_text(&fonts, "一行目\n二行目", BODY_SIZE, 100.0);
        assert_eq!(lines, vec!["一行目".to_string(), "二行目".to_string()]);
    }

    #[test]
    fn fit_text_truncates_long_names() {
        let fonts = FontStore::load();
        let fitted = fit_text(&fonts, &"あ".repeat(200), BODY_SIZE, 40.0);
        assert!(fitted.ends_with('…'));
        assert!(fitted.chars().count() < 200);
    }
}
