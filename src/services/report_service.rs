//! Builds the per-locale report model from raw index records

use chrono::{DateTime, FixedOffset, Offset, Utc};

use super::format_service::{format_percent, format_price};
use crate::models::{display_for, IndexRecord, Locale, Report, ReportRow};

/// Offset of the display timezone (Shanghai, UTC+8)
const DISPLAY_OFFSET_SECS: i32 = 8 * 3600;

pub fn display_timezone() -> FixedOffset {
    FixedOffset::east_opt(DISPLAY_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Map records to report rows for one locale.
///
/// Rows keep the source order of the records; records whose `index` is not in
/// the display mapping are skipped.
pub fn build_report(records: &[IndexRecord], locale: Locale, instant: DateTime<Utc>) -> Report {
    let profile = locale.profile();
    let generated_at = instant.with_timezone(&display_timezone());

    let rows = records
        .iter()
        .filter_map(|record| {
            let display = display_for(&record.index)?;
            Some(ReportRow {
                display_name: display.display_name.to_string(),
                country_code: display.country_code.to_string(),
                price: format_price(record.current_price, locale),
                change_24h: format_percent(record.change_pct, locale),
                change_ytd: format_percent(record.ytd_pct, locale),
                high_52w: format_price(record.week_52_high, locale),
            })
        })
        .collect();

    Report {
        locale,
        title: profile.title.to_string(),
        subtitle: profile.subtitle.to_string(),
        headers: profile.headers,
        footer_prefix: profile.footer_prefix.to_string(),
        timestamp: generated_at.format(profile.timestamp_format).to_string(),
        timezone_label: profile.timezone_label.to_string(),
        generated_at,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColorToken, Direction};
    use chrono::TimeZone;

    fn record(index: &str, price: Option<f64>) -> IndexRecord {
        IndexRecord {
            index: index.to_string(),
            current_price: price,
            change_pct: Some(0.5),
            ytd_pct: Some(-1.0),
            week_52_high: price,
        }
    }

    fn instant() -> DateTime<Utc> {
        // 14:05 in Shanghai
        Utc.with_ymd_and_hms(2026, 10, 18, 6, 5, 0).unwrap()
    }

    #[test]
    fn test_nikkei_scenario_german() {
        let records = vec![
            IndexRecord {
                index: "Nikkei".to_string(),
                current_price: Some(33000.12),
                change_pct: Some(1.23),
                ytd_pct: Some(-4.5),
                week_52_high: Some(34000.0),
            },
            record("FTSE 100", Some(7500.0)),
        ];

        let report = build_report(&records, Locale::De, instant());

        assert_eq!(report.rows.len(), 1);
        let row = &report.rows[0];
        assert_eq!(row.display_name, "Nikkei");
        assert_eq!(row.country_code, "JP");
        assert_eq!(row.price, "33.000,12");
        assert_eq!(row.change_24h.text, "+1,23%");
        assert_eq!(row.change_24h.color, ColorToken::Green);
        assert_eq!(row.change_24h.direction, Some(Direction::Up));
        assert_eq!(row.change_ytd.text, "-4,50%");
        assert_eq!(row.change_ytd.color, ColorToken::Red);
        assert_eq!(row.change_ytd.direction, Some(Direction::Down));
        assert_eq!(row.high_52w, "34.000,00");
    }

    #[test]
    fn test_unmapped_records_are_dropped_in_source_order() {
        let records = vec![
            record("Hang Seng", Some(1.0)),
            record("FTSE 100", Some(2.0)),
            record("Singapore", Some(3.0)),
            record("Shanghai", Some(4.0)),
        ];

        let report = build_report(&records, Locale::En, instant());
        let names: Vec<&str> = report.rows.iter().map(|r| r.display_name.as_str()).collect();
        assert_eq!(names, vec!["Hang Seng", "STI", "Shanghai"]);

        let without_ftse: Vec<IndexRecord> =
            records.iter().filter(|r| r.index != "FTSE 100").cloned().collect();
        assert_eq!(build_report(&without_ftse, Locale::En, instant()).rows.len(), report.rows.len());
    }

    #[test]
    fn test_build_is_deterministic() {
        let records = vec![record("KOSPI", Some(2500.0)), record("CSI 300", None)];
        assert_eq!(
            build_report(&records, Locale::De, instant()),
            build_report(&records, Locale::De, instant())
        );
    }

    #[test]
    fn test_missing_price_renders_placeholder() {
        let report = build_report(&[record("CSI 300", None)], Locale::En, instant());
        assert_eq!(report.rows[0].price, "—");
        assert_eq!(report.rows[0].high_52w, "—");
    }

    #[test]
    fn test_timestamp_in_display_timezone() {
        let de = build_report(&[], Locale::De, instant());
        assert_eq!(de.timestamp, "18.10.2026, 14:05 Uhr");
        assert_eq!(de.title, "Indizes");
        assert_eq!(de.headers.price, "Kurs");

        let en = build_report(&[], Locale::En, instant());
        assert_eq!(en.timestamp, "18.10.2026, 02:05 PM");
        assert_eq!(en.subtitle, "Market snapshot");
        assert!(en.rows.is_empty());
    }

    #[test]
    fn test_date_rolls_over_in_display_timezone() {
        let late = Utc.with_ymd_and_hms(2026, 12, 31, 18, 30, 0).unwrap();
        let report = build_report(&[], Locale::En, late);
        assert_eq!(report.timestamp, "01.01.2027, 02:30 AM");
    }
}
