//! Locale-aware number formatting for the report cells.
//!
//! Both formatters are total over `Option<f64>`: `None` and non-finite values
//! render as the placeholder glyph.

use crate::models::{ColorToken, Direction, FormattedChange, Locale};

pub const PLACEHOLDER: &str = "—";

/// Grouped thousands, two decimals, separators per locale.
///
/// `1234.5` -> `1.234,50` (de) / `1,234.50` (en)
pub fn format_price(value: Option<f64>, locale: Locale) -> String {
    let value = match value.filter(|v| v.is_finite()) {
        Some(v) => v,
        None => return PLACEHOLDER.to_string(),
    };
    let profile = locale.profile();

    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    if value < 0.0 && fixed != "0.00" {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part, profile.thousands_separator));
    out.push(profile.decimal_separator);
    out.push_str(frac_part);
    out
}

/// Always-signed two-decimal percentage with direction and color.
///
/// Zero keeps the `+` sign but carries no glyph and the neutral color. A
/// value that rounds to `0.00` counts as zero.
pub fn format_percent(value: Option<f64>, locale: Locale) -> FormattedChange {
    let value = match value.filter(|v| v.is_finite()) {
        Some(v) => v,
        None => {
            return FormattedChange {
                text: PLACEHOLDER.to_string(),
                direction: None,
                color: ColorToken::Gray,
            }
        }
    };

    let fixed = format!("{:.2}", value.abs());
    let magnitude = fixed.replace('.', &locale.profile().decimal_separator.to_string());

    let (sign, direction, color) = if fixed == "0.00" {
        ('+', None, ColorToken::Gray)
    } else if value > 0.0 {
        ('+', Some(Direction::Up), ColorToken::Green)
    } else {
        ('-', Some(Direction::Down), ColorToken::Red)
    };

    FormattedChange {
        text: format!("{}{}%", sign, magnitude),
        direction,
        color,
    }
}

fn group_thousands(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}
