//! Choice fields: select, radio, checkboxes, multiselect, tags

use serde_json::Value;

use super::{FieldDefinition, FieldOption, Rule, Rules};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectRules {
    /// Allowed values; empty allows anything
    pub options: Vec<FieldOption>,
    pub multiple: bool,
    /// Selection count bounds, multiple only
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl SelectRules {
    pub fn from_definition(definition: &FieldDefinition) -> Self {
        let multiple = definition.multiple
            || matches!(definition.field_type.as_str(), "checkboxes" | "multiselect" | "tags");
        Self {
            options: definition.options.clone(),
            multiple,
            min: definition.min_count(),
            max: definition.max_count(),
        }
    }

    pub fn allows(&self, value: &str) -> bool {
        self.options.is_empty() || self.options.iter().any(|o| o.value() == value)
    }

    /// Label of an allowed value
    pub fn label(&self, value: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.value() == value)
            .map(FieldOption::text)
    }
}

/// Selected values; `None` when the shape is not a selection
fn selection(value: &Value) -> Option<Vec<String>> {
    let scalar = |v: &Value| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    };
    match value {
        Value::Null => Some(Vec::new()),
        Value::Array(items) => items.iter().map(scalar).collect(),
        other => scalar(other).map(|s| vec![s]),
    }
}

impl Rules for SelectRules {
    fn check(&self, value: &Value) -> Result<(), Rule> {
        let selected = selection(value).ok_or(Rule::Type)?;
        if !self.multiple && selected.len() > 1 {
            return Err(Rule::Type);
        }
        if !selected.iter().all(|v| self.allows(v)) {
            return Err(Rule::Type);
        }
        if self.multiple {
            if self.min.is_some_and(|min| selected.len() < min) {
                return Err(Rule::Min);
            }
            if self.max.is_some_and(|max| selected.len() > max) {
                return Err(Rule::Max);
            }
        }
        Ok(())
    }

    /// String array when multiple, else the single string (or null)
    fn data(&self, value: &Value) -> Value {
        let selected = selection(value).unwrap_or_default();
        if self.multiple {
            Value::Array(selected.into_iter().map(Value::String).collect())
        } else {
            selected
                .into_iter()
                .next()
                .map(Value::String)
                .unwrap_or(Value::Null)
        }
    }
}
