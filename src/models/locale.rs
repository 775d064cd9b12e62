//! Report locales and their static presentation profile

use std::fmt;

/// Column captions of the report table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnHeaders {
    pub index: &'static str,
    pub price: &'static str,
    pub change_24h: &'static str,
    pub ytd: &'static str,
    pub high_52w: &'static str,
}

/// Everything that differs between the German and English report
#[derive(Debug)]
pub struct LocaleProfile {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub headers: ColumnHeaders,
    pub footer_prefix: &'static str,
    pub timezone_label: &'static str,
    pub thousands_separator: char,
    pub decimal_separator: char,
    /// chrono format string for the footer timestamp
    pub timestamp_format: &'static str,
    pub flag: &'static str,
}

static DE_PROFILE: LocaleProfile = LocaleProfile {
    title: "Indizes",
    subtitle: "Marktüberblick",
    headers: ColumnHeaders {
        index: "Index",
        price: "Kurs",
        change_24h: "24 h",
        ytd: "YTD",
        high_52w: "52W-H",
    },
    footer_prefix: "Zuletzt aktualisiert am",
    timezone_label: "(GMT+8)",
    thousands_separator: '.',
    decimal_separator: ',',
    timestamp_format: "%d.%m.%Y, %H:%M Uhr",
    flag: "🇩🇪",
};

static EN_PROFILE: LocaleProfile = LocaleProfile {
    title: "Indices",
    subtitle: "Market snapshot",
    headers: ColumnHeaders {
        index: "Index",
        price: "Current",
        change_24h: "24 h",
        ytd: "YTD",
        high_52w: "52W-H",
    },
    footer_prefix: "Last updated on",
    timezone_label: "(GMT+8)",
    thousands_separator: ',',
    decimal_separator: '.',
    timestamp_format: "%d.%m.%Y, %I:%M %p",
    flag: "🇬🇧",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    De,
    En,
}

impl Locale {
    /// Processing order of a run
    pub const ALL: [Locale; 2] = [Locale::De, Locale::En];

    pub fn profile(self) -> &'static LocaleProfile {
        match self {
            Locale::De => &DE_PROFILE,
            Locale::En => &EN_PROFILE,
        }
    }

    /// Lowercase tag, `de` or `en`
    pub fn tag(self) -> &'static str {
        match self {
            Locale::De => "de",
            Locale::En => "en",
        }
    }

    /// Uppercase tag used in artifact file names
    pub fn file_tag(self) -> &'static str {
        match self {
            Locale::De => "DE",
            Locale::En => "EN",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
