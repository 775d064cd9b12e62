//! Turns a report into a self-contained HTML card.
//!
//! Styles are inline and no remote resources are referenced, so the
//! rasterized output depends only on the report.

use std::fmt::Write;

use crate::models::{FormattedChange, Report, ReportRow};

pub const CARD_ID: &str = "indices-card";
/// Selector handed to the rasterizer
pub const CAPTURE_SELECTOR: &str = "#indices-card";

const ACCENT: &str = "#D26C13";
const MUTED: &str = "#7a8594";

pub fn render_document(report: &Report) -> String {
    let headers = report.headers;
    let mut rows = String::new();
    for (i, row) in report.rows.iter().enumerate() {
        render_row(&mut rows, i, row);
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
  <head>
    <meta charset="utf-8">
    <style>
      * {{ margin: 0; padding: 0; box-sizing: border-box; }}
    </style>
  </head>
  <body style="margin:0;padding:20px;background:#f5f6f8;">
<div id="{card_id}" style="max-width:480px;margin:14px auto;border:1px solid #e8ecef;border-radius:14px;background:#fff;box-shadow:0 2px 4px rgba(0,0,0,.03);font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,Arial,sans-serif;overflow:hidden;">
  <div style="display:flex;align-items:center;gap:8px;padding:10px 14px;border-bottom:1px solid #f2f3f5;background:#fcfcfd;">
    <div style="width:4px;height:18px;background:{accent};border-radius:4px;"></div>
    <div style="font-size:12px;letter-spacing:.08em;text-transform:uppercase;color:{accent};font-weight:700;">{title}</div>
    <div style="margin-left:auto;font-size:11px;color:{muted};">{subtitle}</div>
  </div>
  <table role="presentation" cellpadding="0" cellspacing="0" style="width:100%;border-collapse:collapse;font-size:13px;">
    <thead>
      <tr style="background:#fafbfc;">
        <th style="text-align:left;padding:8px 14px;color:{muted};font-weight:600;">{h_index}</th>
        <th style="text-align:right;padding:8px;color:{muted};font-weight:600;">{h_price}</th>
        <th style="text-align:right;padding:8px;color:{muted};font-weight:600;">{h_24h}</th>
        <th style="text-align:right;padding:8px;color:{muted};font-weight:600;">{h_ytd}</th>
        <th style="text-align:right;padding:8px 14px;color:{muted};font-weight:600;">{h_52w}</th>
      </tr>
    </thead>
    <tbody>{rows}
    </tbody>
  </table>
  <div style="padding:10px 14px;border-top:1px solid #f2f3f5;background:#fcfcfd;font-size:11px;color:{muted};display:flex;align-items:center;gap:6px;">
    <div style="width:6px;height:6px;background:{accent};border-radius:50%;"></div>
    {footer_prefix} <b style="color:#4d596a;">{timestamp}</b> {timezone}
  </div>
</div>
  </body>
</html>
"#,
        lang = report.locale.tag(),
        card_id = CARD_ID,
        accent = ACCENT,
        muted = MUTED,
        title = escape_html(&report.title),
        subtitle = escape_html(&report.subtitle),
        h_index = escape_html(headers.index),
        h_price = escape_html(headers.price),
        h_24h = escape_html(headers.change_24h),
        h_ytd = escape_html(headers.ytd),
        h_52w = escape_html(headers.high_52w),
        rows = rows,
        footer_prefix = escape_html(&report.footer_prefix),
        timestamp = escape_html(&report.timestamp),
        timezone = escape_html(&report.timezone_label),
    )
}

fn render_row(out: &mut String, position: usize, row: &ReportRow) {
    let background = if position % 2 == 0 { "#fff" } else { "#fcfcfd" };
    // Writing into a String cannot fail
    let _ = write!(
        out,
        r#"
      <tr style="background:{background};border-top:1px solid #f2f3f5;">
        <td style="padding:12px 14px;">
          <span style="display:inline-block;min-width:28px;padding:2px 6px;border-radius:10px;background:#f1f3f6;font-weight:700;font-size:11px;color:#3a4451;text-align:center;line-height:1.2;">{country}</span><span style="font-weight:600;color:#111826;margin-left:4px;">{name}</span>
        </td>
        <td style="padding:12px 8px;text-align:right;white-space:nowrap;">{price}</td>
        <td style="padding:12px 8px;text-align:right;white-space:nowrap;">{change}</td>
        <td style="padding:12px 8px;text-align:right;white-space:nowrap;">{ytd}</td>
        <td style="padding:12px 14px;text-align:right;white-space:nowrap;">{high}</td>
      </tr>"#,
        background = background,
        country = escape_html(&row.country_code),
        name = escape_html(&row.display_name),
        price = escape_html(&row.price),
        change = render_change(&row.change_24h),
        ytd = render_change(&row.change_ytd),
        high = escape_html(&row.high_52w),
    );
}

fn render_change(change: &FormattedChange) -> String {
    let label = match change.direction {
        Some(direction) => format!("{} {}", direction.glyph(), escape_html(&change.text)),
        None => escape_html(&change.text),
    };
    format!(r#"<span style="color:{};">{}</span>"#, change.color.hex(), label)
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
