//! Scalar field models: text, number, boolean, color, select

use serde_json::Value;

use super::{scalar_string, Base, StrOptions};

/// String-valued field (`string`, `text`, `textarea`, `email`, ...)
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub(crate) base: Base,
    text: String,
}

impl Text {
    pub fn from_base(base: Base) -> Self {
        let text = scalar_string(base.value());
        Self { base, text }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Numeric field; numeric strings are accepted
#[derive(Debug, Clone, PartialEq)]
pub struct Number {
    pub(crate) base: Base,
    number: Option<f64>,
}

impl Number {
    pub fn from_base(base: Base) -> Self {
        let number = match base.value() {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        Self { base, number }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.number
    }

    pub fn str(&self, options: &StrOptions) -> String {
        match (self.number, options.decimals) {
            (None, _) => String::new(),
            (Some(n), Some(decimals)) => format!("{:.*}", decimals, n),
            (Some(n), None) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", n as i64),
            (Some(n), None) => n.to_string(),
        }
    }
}

/// Boolean field; also reads `"true"`/`"false"` and `1`/`0`
#[derive(Debug, Clone, PartialEq)]
pub struct Boolean {
    pub(crate) base: Base,
    flag: bool,
}

impl Boolean {
    pub fn from_base(base: Base) -> Self {
        let flag = match base.value() {
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
            Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on"),
            _ => false,
        };
        Self { base, flag }
    }

    pub fn as_bool(&self) -> bool {
        self.flag
    }
}

/// Color field holding a hex code
#[derive(Debug, Clone, PartialEq)]
pub struct Color {
    pub(crate) base: Base,
}

impl Color {
    pub fn from_base(base: Base) -> Self {
        Self { base }
    }

    /// Normalised `#rrggbb`, expanding the short `#rgb` form
    pub fn hex(&self) -> Option<String> {
        let raw = self.base.value().as_str()?.trim().trim_start_matches('#');
        if !raw.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match raw.len() {
            3 => Some(format!(
                "#{}",
                raw.chars().flat_map(|c| [c, c]).collect::<String>().to_lowercase()
            )),
            6 => Some(format!("#{}", raw.to_lowercase())),
            _ => None,
        }
    }

    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        let hex = self.hex()?;
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some((channel(1)?, channel(3)?, channel(5)?))
    }
}

/// One available option of a select field
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
}

impl SelectOption {
    /// Read either a plain string or a `{ value, text }` object
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => {
                let value = map.get("value").map(scalar_string)?;
                let text = map
                    .get("text")
                    .map(scalar_string)
                    .unwrap_or_else(|| value.clone());
                Some(Self { value, text })
            }
            Value::Null => None,
            other => {
                let value = scalar_string(other);
                Some(Self {
                    text: value.clone(),
                    value,
                })
            }
        }
    }
}

/// Single or multiple choice field
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub(crate) base: Base,
    values: Vec<String>,
    options: Vec<SelectOption>,
}

impl Select {
    pub fn from_base(base: Base) -> Self {
        let values = match base.value() {
            Value::Array(items) => items
                .iter()
                .filter(|v| !v.is_null())
                .map(scalar_string)
                .collect(),
            Value::Null => Vec::new(),
            other => {
                let single = scalar_string(other);
                if single.is_empty() {
                    Vec::new()
                } else {
                    vec![single]
                }
            }
        };
        let options = base
            .meta("options")
            .and_then(Value::as_array)
            .map(|opts| opts.iter().filter_map(SelectOption::from_value).collect())
            .unwrap_or_default();
        Self {
            base,
            values,
            options,
        }
    }

    /// Selected values in order
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// Options advertised in `meta.options`
    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    /// Display text for a value, falling back to the value itself
    pub fn label<'a>(&'a self, value: &'a str) -> &'a str {
        self.options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.text.as_str())
            .unwrap_or(value)
    }

    pub fn str(&self, options: &StrOptions) -> String {
        self.values
            .iter()
            .map(|v| self.label(v))
            .collect::<Vec<_>>()
            .join(options.separator_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base(type_name: &str, node: Value) -> Base {
        Base::from_node(type_name, &node)
    }

    #[test]
    fn test_number_formatting() {
        let n = Number::from_base(base("number", json!({ "value": "12.5" })));
        assert_eq!(n.as_f64(), Some(12.5));
        assert_eq!(n.str(&StrOptions::default()), "12.5");
        assert_eq!(n.str(&StrOptions::default().decimals(2)), "12.50");

        let whole = Number::from_base(base("number", json!({ "value": 3 })));
        assert_eq!(whole.str(&StrOptions::default()), "3");
    }

    #[test]
    fn test_boolean_coercion() {
        assert!(Boolean::from_base(base("toggle", json!({ "value": "true" }))).as_bool());
        assert!(Boolean::from_base(base("toggle", json!({ "value": 1 }))).as_bool());
        assert!(!Boolean::from_base(base("toggle", json!({ "value": "false" }))).as_bool());
        assert!(!Boolean::from_base(base("toggle", json!({}))).as_bool());
    }

    #[test]
    fn test_color_hex() {
        let c = Color::from_base(base("color", json!({ "value": "#ABC" })));
        assert_eq!(c.hex().as_deref(), Some("#aabbcc"));
        assert_eq!(c.rgb(), Some((0xaa, 0xbb, 0xcc)));

        let bad = Color::from_base(base("color", json!({ "value": "red" })));
        assert_eq!(bad.hex(), None);
    }

    #[test]
    fn test_select_labels() {
        let s = Select::from_base(base(
            "checkboxes",
            json!({
                "value": ["a", "c"],
                "meta": { "options": [{ "value": "a", "text": "Alpha" }, "b", "c"] }
            }),
        ));
        assert_eq!(s.values(), ["a", "c"]);
        assert!(s.contains("c"));
        assert_eq!(s.str(&StrOptions::default()), "Alpha, c");
        assert_eq!(s.str(&StrOptions::default().separator(" / ")), "Alpha / c");
    }

    #[test]
    fn test_text_length_counts_chars() {
        let t = Text::from_base(base("text", json!({ "value": "héllo" })));
        assert_eq!(t.len(), 5);
        assert!(!t.is_empty());
    }
}
