// Date range formatting for tour cards

use crate::locale::Locale;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use std::cmp::Ordering;

pub const INVALID_DATE_TEXT: &str = "Invalid Date";

const RU_MONTHS_GENITIVE: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

const EN_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct DateFormatter {
    locale: Locale,
}

impl DateFormatter {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    // Empty without a start date; unparsable values render as INVALID_DATE_TEXT
    pub fn format_range(&self, date_start: Option<&str>, date_end: Option<&str>) -> String {
        let start = match non_empty(date_start) {
            Some(start) => self.format_long(start),
            None => return String::new(),
        };

        match non_empty(date_end) {
            Some(end) => format!("{} - {}", start, self.format_long(end)),
            None => start,
        }
    }

    pub fn format_long(&self, raw: &str) -> String {
        match parse_date(raw) {
            Some(moment) => self.long_form(moment.date_naive()),
            None => INVALID_DATE_TEXT.to_string(),
        }
    }

    fn long_form(&self, date: NaiveDate) -> String {
        let month = date.month0() as usize;
        match self.locale {
            Locale::Ru => format!(
                "{} {} {} г.",
                date.day(),
                RU_MONTHS_GENITIVE[month],
                date.year()
            ),
            Locale::En => format!("{} {}, {}", EN_MONTHS[month], date.day(), date.year()),
        }
    }

    // Chronological ordering; missing or unreadable dates sort as the epoch
    pub fn compare(date_a: Option<&str>, date_b: Option<&str>) -> Ordering {
        epoch_millis(date_a).cmp(&epoch_millis(date_b))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn epoch_millis(value: Option<&str>) -> i64 {
    non_empty(value)
        .and_then(parse_date)
        .map_or(0, |moment| moment.timestamp_millis())
}

// Accepts plain dates, RFC 3339 timestamps and naive timestamps (read as UTC)
pub fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    let utc = FixedOffset::east_opt(0)?;

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc().with_timezone(&utc));
    }

    if let Ok(moment) = DateTime::parse_from_rfc3339(raw) {
        return Some(moment);
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc).with_timezone(&utc))
}
