//! Date fields, optionally with a time part

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use super::{FieldDefinition, Rule, Rules};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateRules {
    /// Accept `YYYY-MM-DD HH:MM[:SS]` (or `T` separated) as well
    pub time: bool,
    pub min: Option<NaiveDateTime>,
    pub max: Option<NaiveDateTime>,
}

impl DateRules {
    pub fn from_definition(definition: &FieldDefinition) -> Self {
        // bounds accept a time part regardless of the flag
        let bound: fn(&Option<Value>) -> Option<&str> = |v| v.as_ref().and_then(Value::as_str).map(str::trim);
        Self {
            time: definition.time,
            min: bound(&definition.min).and_then(|s| parse(s, true)),
            max: bound(&definition.max).and_then(parse_upper),
        }
    }

    pub fn parse(&self, text: &str) -> Option<NaiveDateTime> {
        parse(text, self.time)
    }
}

fn parse(text: &str, time: bool) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, DATE_FORMAT) {
        return date.and_hms_opt(0, 0, 0);
    }
    if !time {
        return None;
    }
    [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ]
    .iter()
    .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

/// A date-only upper bound covers the whole day
fn parse_upper(text: &str) -> Option<NaiveDateTime> {
    match NaiveDate::parse_from_str(text, DATE_FORMAT) {
        Ok(date) => date.and_hms_opt(23, 59, 59),
        Err(_) => parse(text, true),
    }
}

impl Rules for DateRules {
    fn check(&self, value: &Value) -> Result<(), Rule> {
        let date = value.as_str().and_then(|s| self.parse(s)).ok_or(Rule::Type)?;
        if self.min.is_some_and(|min| date < min) {
            return Err(Rule::Min);
        }
        if self.max.is_some_and(|max| date > max) {
            return Err(Rule::Max);
        }
        Ok(())
    }

    /// Normalised `YYYY-MM-DD` (with ` HH:MM:SS` when time is enabled), else null
    fn data(&self, value: &Value) -> Value {
        value
            .as_str()
            .and_then(|s| self.parse(s))
            .map(|date| {
                let format = if self.time { DATETIME_FORMAT } else { DATE_FORMAT };
                Value::String(date.format(format).to_string())
            })
            .unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_date_only_rejects_time() {
        let rules = DateRules::default();
        assert_eq!(rules.check(&json!("2024-02-29")), Ok(()));
        assert_eq!(rules.check(&json!("2024-02-30")), Err(Rule::Type));
        assert_eq!(rules.check(&json!("2024-02-01 10:00")), Err(Rule::Type));
    }

    #[test]
    fn test_time_flag_and_normalisation() {
        let rules = DateRules {
            time: true,
            ..Default::default()
        };
        assert_eq!(rules.check(&json!("2024-02-01T10:30")), Ok(()));
        assert_eq!(rules.data(&json!("2024-02-01T10:30")), json!("2024-02-01 10:30:00"));
        assert_eq!(rules.data(&json!("2024-02-01")), json!("2024-02-01 00:00:00"));
    }

    #[test]
    fn test_bounds_compare_as_dates() {
        let def = FieldDefinition::new("date").min("2024-01-01").max("2024-12-31");
        let rules = DateRules::from_definition(&def);
        assert_eq!(rules.check(&json!("2023-12-31")), Err(Rule::Min));
        assert_eq!(rules.check(&json!("2025-01-01")), Err(Rule::Max));
        assert_eq!(rules.check(&json!("2024-06-15")), Ok(()));
        assert_eq!(rules.data(&json!(" 2024-06-15 ")), json!("2024-06-15"));
    }

    #[test]
    fn test_date_only_max_includes_the_whole_day() {
        let def = FieldDefinition::new("date").time(true).max("2024-12-31");
        let rules = DateRules::from_definition(&def);
        assert_eq!(rules.check(&json!("2024-12-31 18:45")), Ok(()));
        assert_eq!(rules.check(&json!("2024-12-31T23:59:59")), Ok(()));
        assert_eq!(rules.check(&json!("2025-01-01 00:00")), Err(Rule::Max));

        let def = FieldDefinition::new("date").time(true).max("2024-12-31 12:00");
        let rules = DateRules::from_definition(&def);
        assert_eq!(rules.check(&json!("2024-12-31 12:30")), Err(Rule::Max));
    }
}
