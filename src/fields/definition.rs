//! Declarative field definitions as delivered by a form blueprint

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One selectable option: either a plain string or `{ value, text }`.
///
/// Scalar values (numbers, booleans) are read as their string form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldOption {
    Plain(String),
    Labeled {
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
}

impl<'de> Deserialize<'de> for FieldOption {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        FieldOption::from_value(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("not a field option: {}", value)))
    }
}

impl FieldOption {
    /// Read one option from JSON; containers and null are not options
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => {
                let value = map.get("value").and_then(scalar_text)?;
                let text = map.get("text").and_then(scalar_text);
                Some(FieldOption::Labeled { value, text })
            }
            other => scalar_text(other).map(FieldOption::Plain),
        }
    }

    pub fn value(&self) -> &str {
        match self {
            FieldOption::Plain(v) => v,
            FieldOption::Labeled { value, .. } => value,
        }
    }

    /// Display text, falling back to the value
    pub fn text(&self) -> &str {
        match self {
            FieldOption::Plain(v) => v,
            FieldOption::Labeled { value, text } => text.as_deref().unwrap_or(value),
        }
    }
}

/// Field definition. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDefinition {
    #[serde(rename = "type", deserialize_with = "loose_string")]
    pub field_type: String,

    /// Initial value
    pub value: Value,

    #[serde(deserialize_with = "loose_bool")]
    pub required: bool,

    #[serde(deserialize_with = "loose_count")]
    pub minlength: Option<usize>,

    #[serde(deserialize_with = "loose_count")]
    pub maxlength: Option<usize>,

    /// Number, date string or selection count depending on the kind
    pub min: Option<Value>,

    pub max: Option<Value>,

    /// Entries that are not options are skipped
    #[serde(deserialize_with = "loose_options")]
    pub options: Vec<FieldOption>,

    #[serde(deserialize_with = "loose_bool")]
    pub multiple: bool,

    /// Date fields accept a time part
    #[serde(deserialize_with = "loose_bool")]
    pub time: bool,
}

impl FieldDefinition {
    pub fn new(field_type: impl Into<String>) -> Self {
        Self {
            field_type: field_type.into(),
            ..Default::default()
        }
    }

    pub fn value(mut self, value: Value) -> Self {
        self.value = value;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn minlength(mut self, minlength: usize) -> Self {
        self.minlength = Some(minlength);
        self
    }

    pub fn maxlength(mut self, maxlength: usize) -> Self {
        self.maxlength = Some(maxlength);
        self
    }

    pub fn min(mut self, min: impl Into<Value>) -> Self {
        self.min = Some(min.into());
        self
    }

    pub fn max(mut self, max: impl Into<Value>) -> Self {
        self.max = Some(max.into());
        self
    }

    pub fn options<S: Into<String>>(mut self, options: impl IntoIterator<Item = S>) -> Self {
        self.options = options
            .into_iter()
            .map(|o| FieldOption::Plain(o.into()))
            .collect();
        self
    }

    pub fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    pub fn time(mut self, time: bool) -> Self {
        self.time = time;
        self
    }

    /// `min` read as a number
    pub fn min_f64(&self) -> Option<f64> {
        self.min.as_ref().and_then(number_of)
    }

    pub fn max_f64(&self) -> Option<f64> {
        self.max.as_ref().and_then(number_of)
    }

    /// `min` read as a count
    pub fn min_count(&self) -> Option<usize> {
        self.min.as_ref().and_then(count_of)
    }

    pub fn max_count(&self) -> Option<usize> {
        self.max.as_ref().and_then(count_of)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn count_of(value: &Value) -> Option<usize> {
    number_of(value).filter(|n| *n >= 0.0).map(|n| n as usize)
}

// Blueprints are loosely typed: null means "unset", numbers may arrive as
// floats or strings, flags as strings. None of these fail a definition.

fn loose_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_text(&value).unwrap_or_default())
}

fn loose_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::String(s) => matches!(s.trim(), "true" | "1"),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    })
}

fn loose_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(count_of(&value))
}

fn loose_options<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<FieldOption>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items.iter().filter_map(FieldOption::from_value).collect(),
        _ => Vec::new(),
    })
}

/// Numeric reading of a number or numeric string
pub(crate) fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}
