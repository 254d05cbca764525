//! Numeric fields: number, range

use serde_json::{Number, Value};

use super::definition::number_of;
use super::{FieldDefinition, Rule, Rules};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberRules {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumberRules {
    pub fn from_definition(definition: &FieldDefinition) -> Self {
        Self {
            min: definition.min_f64(),
            max: definition.max_f64(),
        }
    }
}

impl Rules for NumberRules {
    fn check(&self, value: &Value) -> Result<(), Rule> {
        let n = number_of(value).ok_or(Rule::Type)?;
        if self.min.is_some_and(|min| n < min) {
            return Err(Rule::Min);
        }
        if self.max.is_some_and(|max| n > max) {
            return Err(Rule::Max);
        }
        Ok(())
    }

    /// Integral values stay integers; anything unparsable becomes null
    fn data(&self, value: &Value) -> Value {
        match value {
            Value::Number(n) => Value::Number(n.clone()),
            other => number_of(other)
                .and_then(|n| {
                    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                        Some(Number::from(n as i64))
                    } else {
                        Number::from_f64(n)
                    }
                })
                .map(Value::Number)
                .unwrap_or(Value::Null),
        }
    }
}
