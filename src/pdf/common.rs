//! Shared helpers for document and email formatting.

use chrono::{Datelike, Local};

/// Format today's date in Japanese business style (e.g. "2026年8月7日").
pub fn format_japanese_date() -> String {
    let now = Local::now().date_naive();
    format!("{}年{}月{}日", now.year(), now.month(), now.day())
}

/// Format a yen amount with thousands separators: 1234567 → "¥1,234,567".
pub fn format_yen(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-¥{grouped}")
    } else {
        format!("¥{grouped}")
    }
}

/// Strip control characters that have no place in a printed document.
/// Newlines survive so multi-line notes keep their line breaks.
pub fn sanitize_text(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_control() || *c == '\n')
        .collect()
}

/// Escape a user-controlled string for HTML interpolation. Without this a
/// malicious item name, supplier name, or note could inject markup into the
/// order email.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yen_formatting_groups_thousands() {
        assert_eq!(format_yen(0), "¥0");
        assert_eq!(format_yen(950), "¥950");
        assert_eq!(format_yen(1000), "¥1,000");
        assert_eq!(format_yen(1234567), "¥1,234,567");
        assert_eq!(format_yen(-5000), "-¥5,000");
    }

    #[test]
    fn japanese_date_has_era_free_format() {
        let date = format_japanese_date();
        assert!(date.contains('年'));
        assert!(date.contains('月'));
        assert!(date.ends_with('日'));
    }

    #[test]
    fn sanitize_strips_control_characters() {
        assert_eq!(sanitize_text("キャベツ\u{0000}\u{001b}"), "キャベツ");
        assert_eq!(sanitize_text("行1\n行2"), "行1\n行2");
    }

    #[test]
    fn html_escaping_neutralizes_markup() {
        assert_eq!(
            escape_html("<script>alert('x')</script>"),
            "&lt;script&gt;alert(&#x27;x&#x27;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("A&B \"C\""), "A&amp;B &quot;C&quot;");
        assert_eq!(escape_html("たまねぎ"), "たまねぎ");
    }
}
