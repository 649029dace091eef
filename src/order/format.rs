//! HTML and plain-text renditions of an order, used as the email payload.
//!
//! The totals shown here are computed from the same line items as the PDF, so
//! every rendition of one order carries the same figures.

use crate::pdf::common::{escape_html, format_japanese_date, format_yen};

use super::models::{order_total, OrderItem};

const NOTE_PLACEHOLDER: &str = "特になし";

pub fn order_subject(supplier_name: Option<&str>) -> String {
    format!("【注文書】{} 宛", supplier_name.unwrap_or("ReplenMobile"))
}

fn effective_note(note: Option<&str>) -> &str {
    match note.map(str::trim) {
        Some(n) if !n.is_empty() => n,
        _ => NOTE_PLACEHOLDER,
    }
}

pub fn order_html(items: &[OrderItem], supplier_name: Option<&str>, note: Option<&str>) -> String {
    let today = format_japanese_date();
    let total = order_total(items);

    // Every user-controlled string is escaped before interpolation.
    let supplier_row = supplier_name
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            format!(
                "<tr><td><strong>宛先:</strong> {} 御中</td></tr>",
                escape_html(s)
            )
        })
        .unwrap_or_default();
    let note_content = escape_html(effective_note(note));

    let mut items_html = String::new();
    for (i, item) in items.iter().enumerate() {
        items_html.push_str(&format!(
            r#"        <tr>
            <td style="padding: 12px; border-bottom: 1px solid #eee; text-align: center;">{no}</td>
            <td style="padding: 12px; border-bottom: 1px solid #eee;">{name}</td>
            <td style="padding: 12px; border-bottom: 1px solid #eee; text-align: right;">{unit_price}</td>
            <td style="padding: 12px; border-bottom: 1px solid #eee; text-align: center;">{quantity} {unit}</td>
            <td style="padding: 12px; border-bottom: 1px solid #eee; text-align: right;">{subtotal}</td>
        </tr>
"#,
            no = i + 1,
            name = escape_html(&item.name),
            unit_price = format_yen(item.unit_price),
            quantity = item.quantity,
            unit = escape_html(&item.unit_label),
            subtotal = format_yen(item.subtotal()),
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>注文書</title>
</head>
<body style="font-family: 'Helvetica Neue', Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <div style="background: linear-gradient(135deg, #1A237E, #3949AB); color: white; padding: 30px; border-radius: 12px 12px 0 0;">
        <h1 style="margin: 0; font-size: 28px;">📦 注文書</h1>
        <p style="margin: 10px 0 0 0; opacity: 0.9;">ReplenMobile からの発注</p>
    </div>

    <div style="background: #f8f9fa; padding: 20px; border: 1px solid #eee;">
        <table style="width: 100%;">
            <tr><td><strong>日付:</strong> {today}</td></tr>
            {supplier_row}
        </table>
    </div>

    <div style="padding: 20px; border: 1px solid #eee; border-top: none;">
        <table style="width: 100%; border-collapse: collapse;">
            <thead>
                <tr style="background: #1A237E; color: white;">
                    <th style="padding: 12px; text-align: center; width: 50px;">No.</th>
                    <th style="padding: 12px; text-align: left;">商品名</th>
                    <th style="padding: 12px; text-align: right; width: 90px;">単価</th>
                    <th style="padding: 12px; text-align: center; width: 70px;">数量</th>
                    <th style="padding: 12px; text-align: right; width: 100px;">金額</th>
                </tr>
            </thead>
            <tbody>
{items_html}            </tbody>
            <tfoot>
                <tr style="background: #f8f9fa;">
                    <td colspan="4" style="padding: 15px; text-align: right; font-weight: bold; font-size: 16px;">合計</td>
                    <td style="padding: 15px; text-align: right; font-weight: bold; font-size: 18px; color: #1A237E;">{total}</td>
                </tr>
            </tfoot>
        </table>
    </div>

    <div style="padding: 20px; border: 1px solid #eee; border-top: none; background: #fff;">
        <h3 style="margin: 0 0 10px 0; color: #1A237E; font-size: 14px;">■ 備考 (Notes)</h3>
        <p style="margin: 0; color: #333; white-space: pre-wrap;">{note_content}</p>
    </div>

    <div style="background: #f8f9fa; padding: 20px; border: 1px solid #eee; border-top: none; border-radius: 0 0 12px 12px;">
        <p style="margin: 0; color: #666;">よろしくお願いいたします。</p>
        <p style="margin: 10px 0 0 0; color: #999; font-size: 12px;">
            このメールは ReplenMobile から自動送信されています。
        </p>
    </div>
</body>
</html>
"#,
        today = today,
        supplier_row = supplier_row,
        items_html = items_html,
        total = format_yen(total),
        note_content = note_content,
    )
}

pub fn order_text(items: &[OrderItem], supplier_name: Option<&str>, note: Option<&str>) -> String {
    let today = format_japanese_date();
    let total = order_total(items);

    let mut lines = vec![
        "=".repeat(40),
        "注文書".to_string(),
        "=".repeat(40),
        format!("日付: {today}"),
    ];

    if let Some(supplier) = supplier_name.map(str::trim).filter(|s| !s.is_empty()) {
        lines.push(format!("宛先: {supplier} 御中"));
    }

    lines.push(String::new());
    lines.push("-".repeat(40));

    for (i, item) in items.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, item.name));
        lines.push(format!(
            "   {} × {} {} = {}",
            format_yen(item.unit_price),
            item.quantity,
            item.unit_label,
            format_yen(item.subtotal())
        ));
    }

    lines.push("-".repeat(40));
    lines.push(format!("合計: {}", format_yen(total)));
    lines.push(String::new());
    lines.push("-".repeat(40));
    lines.push("■ 備考 (Notes)".to_string());
    lines.push(effective_note(note).to_string());
    lines.push("-".repeat(40));
    lines.push(String::new());
    lines.push("よろしくお願いいたします。".to_string());
    lines.push(String::new());
    lines.push("---".to_string());
    lines.push("ReplenMobile より自動送信".to_string());

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::models::DEFAULT_UNIT_LABEL;

    fn item(name: &str, unit_price: i64, quantity: u32) -> OrderItem {
        OrderItem {
            name: name.to_string(),
            unit_price,
            quantity,
            barcode: None,
            unit_label: DEFAULT_UNIT_LABEL.to_string(),
        }
    }

    #[test]
    fn html_and_text_carry_the_same_total() {
        let items = vec![item("キャベツ", 150, 3), item("たまねぎ", 100, 5)];
        let html = order_html(&items, Some("八百屋"), None);
        let text = order_text(&items, Some("八百屋"), None);
        assert!(html.contains("¥950"));
        assert!(text.contains("合計: ¥950"));
    }

    #[test]
    fn html_escapes_hostile_item_names() {
        let items = vec![item("<script>alert('x')</script>", 100, 1)];
        let html = order_html(&items, Some("A&B商店"), Some("<b>急ぎ</b>"));
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("A&amp;B商店"));
        assert!(html.contains("&lt;b&gt;急ぎ&lt;/b&gt;"));
    }

    #[test]
    fn empty_note_renders_placeholder() {
        let items = vec![item("コーヒー", 300, 2)];
        assert!(order_html(&items, None, Some("   ")).contains("特になし"));
        assert!(order_text(&items, None, None).contains("特になし"));
    }

    #[test]
    fn subject_falls_back_to_app_name() {
        assert_eq!(order_subject(Some("八百屋")), "【注文書】八百屋 宛");
        assert_eq!(order_subject(None), "【注文書】ReplenMobile 宛");
    }
}
