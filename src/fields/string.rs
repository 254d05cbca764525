//! Text-like fields: text, string, textarea, email, url, tel, password, slug

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use super::{FieldDefinition, Rule, Rules};

/// Shape enforced by the `type` rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Email,
    Url,
    Tel,
}

impl Shape {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "email" => Some(Shape::Email),
            "url" => Some(Shape::Url),
            "tel" => Some(Shape::Tel),
            _ => None,
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        static EMAIL: OnceLock<Regex> = OnceLock::new();
        static URL: OnceLock<Regex> = OnceLock::new();
        static TEL: OnceLock<Regex> = OnceLock::new();

        let re = match self {
            Shape::Email => EMAIL.get_or_init(|| {
                Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
            }),
            Shape::Url => URL.get_or_init(|| {
                Regex::new(r"^(https?://)?[^\s/$.?#][^\s]*\.[^\s]{2,}$").expect("url pattern is valid")
            }),
            Shape::Tel => TEL.get_or_init(|| {
                Regex::new(r"^\+?[0-9 ()./-]{3,}$").expect("tel pattern is valid")
            }),
        };
        re.is_match(text)
    }
}

/// Shape and length rules; lengths count characters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringRules {
    pub shape: Option<Shape>,
    pub minlength: Option<usize>,
    pub maxlength: Option<usize>,
}

impl StringRules {
    pub fn from_definition(definition: &FieldDefinition) -> Self {
        Self {
            shape: Shape::from_tag(&definition.field_type),
            minlength: definition.minlength,
            maxlength: definition.maxlength,
        }
    }

    pub fn lengths(minlength: Option<usize>, maxlength: Option<usize>) -> Self {
        Self {
            shape: None,
            minlength,
            maxlength,
        }
    }
}

/// String form of a scalar; containers are not text
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl Rules for StringRules {
    fn check(&self, value: &Value) -> Result<(), Rule> {
        let text = text_of(value).ok_or(Rule::Type)?;
        if let Some(shape) = self.shape {
            if !shape.matches(text.trim()) {
                return Err(Rule::Type);
            }
        }
        let len = text.chars().count();
        if self.minlength.is_some_and(|min| len < min) {
            return Err(Rule::MinLength);
        }
        if self.maxlength.is_some_and(|max| len > max) {
            return Err(Rule::MaxLength);
        }
        Ok(())
    }

    fn data(&self, value: &Value) -> Value {
        Value::String(text_of(value).unwrap_or_default())
    }
}
