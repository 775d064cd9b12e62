//! Report model handed from the builder to the markup renderer

use chrono::{DateTime, FixedOffset};

use super::locale::{ColumnHeaders, Locale};

/// Color attached to a formatted change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorToken {
    Green,
    Red,
    Gray,
}

impl ColorToken {
    pub fn hex(self) -> &'static str {
        match self {
            ColorToken::Green => "#0f9d58",
            ColorToken::Red => "#e03a3c",
            ColorToken::Gray => "#7a8594",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn glyph(self) -> &'static str {
        match self {
            Direction::Up => "▲",
            Direction::Down => "▼",
        }
    }
}

/// A signed percentage ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedChange {
    pub text: String,
    pub direction: Option<Direction>,
    pub color: ColorToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub display_name: String,
    pub country_code: String,
    pub price: String,
    pub change_24h: FormattedChange,
    pub change_ytd: FormattedChange,
    pub high_52w: String,
}

/// Immutable snapshot for one locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub locale: Locale,
    pub title: String,
    pub subtitle: String,
    pub headers: ColumnHeaders,
    pub footer_prefix: String,
    pub timestamp: String,
    pub timezone_label: String,
    /// Instant of the snapshot in the display timezone
    pub generated_at: DateTime<FixedOffset>,
    pub rows: Vec<ReportRow>,
}
