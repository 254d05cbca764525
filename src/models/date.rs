//! Date, time and datetime models
//!
//! Nodes carry the raw `value` plus side-channel `utc`, `iso` and `timezone`
//! strings (top-level or under `meta`). The primary date is the most specific
//! parse available: a full datetime from `iso`, `utc` or `value`, then a
//! date-only `value`, then a time-only `value` on the epoch day.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

use super::{Base, StrOptions};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// How much of the date was known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePrecision {
    DateTime,
    Date,
    Time,
}

impl DatePrecision {
    fn default_format(&self) -> &'static str {
        match self {
            DatePrecision::DateTime => "%Y-%m-%d %H:%M",
            DatePrecision::Date => "%Y-%m-%d",
            DatePrecision::Time => "%H:%M",
        }
    }
}

/// Parsed `date` / `time` / `datetime` node
#[derive(Debug, Clone, PartialEq)]
pub struct DateModel {
    pub(crate) base: Base,
    date: Option<NaiveDateTime>,
    precision: Option<DatePrecision>,
    utc: Option<String>,
    iso: Option<String>,
    timezone: Option<String>,
}

impl DateModel {
    pub fn from_node(base: Base, node: &Value) -> Self {
        let side = |key: &str| {
            node.get(key)
                .or_else(|| base.meta(key))
                .and_then(Value::as_str)
                .map(String::from)
        };
        let utc = side("utc");
        let iso = side("iso");
        let timezone = side("timezone");
        let raw = base.value().as_str().map(String::from);

        let parsed = [iso.as_deref(), utc.as_deref(), raw.as_deref()]
            .into_iter()
            .flatten()
            .find_map(parse_datetime)
            .map(|d| (d, DatePrecision::DateTime))
            .or_else(|| {
                [raw.as_deref(), iso.as_deref(), utc.as_deref()]
                    .into_iter()
                    .flatten()
                    .find_map(parse_date)
                    .map(|d| (d, DatePrecision::Date))
            })
            .or_else(|| {
                raw.as_deref()
                    .and_then(parse_time)
                    .map(|d| (d, DatePrecision::Time))
            });

        Self {
            base,
            date: parsed.map(|(d, _)| d),
            precision: parsed.map(|(_, p)| p),
            utc,
            iso,
            timezone,
        }
    }

    /// Primary parsed value
    pub fn date(&self) -> Option<NaiveDateTime> {
        self.date
    }

    pub fn precision(&self) -> Option<DatePrecision> {
        self.precision
    }

    pub fn utc(&self) -> Option<&str> {
        self.utc.as_deref()
    }

    pub fn iso(&self) -> Option<&str> {
        self.iso.as_deref()
    }

    pub fn timezone(&self) -> Option<&str> {
        self.timezone.as_deref()
    }

    /// Format with `options.format`, or a default matching the precision.
    /// Unparseable values render as their raw string.
    pub fn str(&self, options: &StrOptions) -> String {
        match (self.date, self.precision) {
            (Some(date), Some(precision)) => {
                let format = options
                    .format
                    .as_deref()
                    .unwrap_or_else(|| precision.default_format());
                date.format(format).to_string()
            }
            _ => self.base.value_string(),
        }
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
}

fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    let date_part = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_time(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    let time = TIME_FORMATS
        .iter()
        .find_map(|f| NaiveTime::parse_from_str(s, f).ok())?;
    NaiveDate::from_ymd_opt(1970, 1, 1).map(|d| d.and_time(time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(node: Value) -> DateModel {
        let base = Base::from_node("date", &node);
        DateModel::from_node(base, &node)
    }

    #[test]
    fn test_prefers_iso_datetime() {
        let d = date(json!({
            "type": "date",
            "value": "2024-03-01",
            "iso": "2024-03-01T14:30:00+02:00",
            "timezone": "Europe/Berlin"
        }));
        assert_eq!(d.precision(), Some(DatePrecision::DateTime));
        assert_eq!(d.str(&StrOptions::default()), "2024-03-01 14:30");
        assert_eq!(d.timezone(), Some("Europe/Berlin"));
    }

    #[test]
    fn test_date_only_fallback() {
        let d = date(json!({ "type": "date", "value": "2024-03-01" }));
        assert_eq!(d.precision(), Some(DatePrecision::Date));
        assert_eq!(d.str(&StrOptions::default().format("%d.%m.%Y")), "01.03.2024");
    }

    #[test]
    fn test_time_only_fallback() {
        let d = date(json!({ "type": "time", "value": "09:15" }));
        assert_eq!(d.precision(), Some(DatePrecision::Time));
        assert_eq!(d.str(&StrOptions::default()), "09:15");
    }

    #[test]
    fn test_side_channel_under_meta() {
        let d = date(json!({
            "type": "datetime",
            "value": "garbage",
            "meta": { "utc": "2024-01-02 03:04:05" }
        }));
        assert_eq!(d.utc(), Some("2024-01-02 03:04:05"));
        assert_eq!(d.str(&StrOptions::default().format("%H:%M:%S")), "03:04:05");
    }

    #[test]
    fn test_unparseable_keeps_raw() {
        let d = date(json!({ "type": "date", "value": "soon" }));
        assert_eq!(d.date(), None);
        assert_eq!(d.str(&StrOptions::default()), "soon");
    }
}
