//! Data models for the indices report
//!
//! Raw upstream records, the locale profiles and the per-locale report
//! that the renderer turns into markup.

pub mod index;
pub mod locale;
pub mod report;

pub use index::{display_for, IndexRecord};
pub use locale::Locale;
pub use report::{ColorToken, Direction, FormattedChange, Report, ReportRow};
