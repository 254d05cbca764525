//! Recursive Response Parser
//!
//! Walks a JSON document and rebuilds the model graph:
//!
//! - object with `type` → [`Parser::create_model`]
//! - object without `type` → map of parsed children, keys preserved
//! - array → parsed elements, order preserved
//! - scalar → unchanged
//!
//! Concrete model constructors recurse back into the parser for their own
//! `fields` and `entries`. Unknown discriminators fall back to the base model;
//! parsing never fails.

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::models::{
    Base, Block, Boolean, Collection, Color, DateModel, Entry, Fields, File, Html, Language, Link,
    Model, Number, Page, Select, Site, Structure, Text, User,
};
use crate::registry::{ModelKind, TypeRegistry};

/// Result of [`Parser::parse`]
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    Model(Model),
    Map(BTreeMap<String, Parsed>),
    List(Vec<Parsed>),
    Scalar(Value),
}

impl Parsed {
    pub fn as_model(&self) -> Option<&Model> {
        match self {
            Parsed::Model(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_model(self) -> Option<Model> {
        match self {
            Parsed::Model(m) => Some(m),
            _ => None,
        }
    }

    /// Child of a parsed map
    pub fn get(&self, key: &str) -> Option<&Parsed> {
        match self {
            Parsed::Map(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Parsed]> {
        match self {
            Parsed::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Parser bound to a type registry
#[derive(Debug, Clone, Copy)]
pub struct Parser<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> Parser<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TypeRegistry {
        self.registry
    }

    /// Recursion driver
    pub fn parse(&self, node: &Value) -> Parsed {
        match node {
            Value::Object(map) if map.contains_key("type") => Parsed::Model(self.create_model(node)),
            Value::Object(map) => Parsed::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.parse(v)))
                    .collect(),
            ),
            Value::Array(items) => Parsed::List(items.iter().map(|v| self.parse(v)).collect()),
            scalar => Parsed::Scalar(scalar.clone()),
        }
    }

    /// Build a model from a node, defaulting a missing `type` to `"base"`
    pub fn create_model(&self, node: &Value) -> Model {
        self.create_model_or(node, "base")
    }

    /// Build a model, using `default_tag` when the node has no string `type`
    pub fn create_model_or(&self, node: &Value, default_tag: &str) -> Model {
        let tag = node
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or(default_tag);

        let (kind, type_name) = match self.registry.model_kind(tag) {
            Some(kind) => (kind, tag),
            None => {
                debug!(tag, "unknown model type, falling back to base");
                (ModelKind::Base, "base")
            }
        };

        let base = Base::from_node(type_name, node);
        match kind {
            ModelKind::Base => Model::Base(base),
            ModelKind::Text => Model::Text(Text::from_base(base)),
            ModelKind::Number => Model::Number(Number::from_base(base)),
            ModelKind::Boolean => Model::Boolean(Boolean::from_base(base)),
            ModelKind::Color => Model::Color(Color::from_base(base)),
            ModelKind::Select => Model::Select(Select::from_base(base)),
            ModelKind::Date => Model::Date(DateModel::from_node(base, node)),
            ModelKind::Link => Model::Link(Link::from_node(base)),
            ModelKind::Html => Model::Html(Html::from_base(base)),
            ModelKind::Block => Model::Block(Block::from_node(self, base, node)),
            ModelKind::Entry => Model::Entry(Entry::from_node(self, base, node)),
            ModelKind::Structure => Model::Structure(Structure::from_node(self, base, node)),
            ModelKind::Collection => Model::Collection(Collection::from_node(self, base, node)),
            ModelKind::Page => Model::Page(Page::from_node(self, base, node)),
            ModelKind::File => Model::File(File::from_node(self, base, node)),
            ModelKind::User => Model::User(User::from_node(self, base, node)),
            ModelKind::Language => Model::Language(Language::from_node(self, base, node)),
            ModelKind::Site => Model::Site(Site::from_node(self, base, node)),
        }
    }

    /// Parse the `fields` map of a node. Untyped values are kept opaque.
    pub fn parse_fields(&self, node: &Value) -> Fields {
        node.get("fields")
            .and_then(Value::as_object)
            .map(|fields| {
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), self.field_model(value)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Parse the `entries` array of a node in order
    pub fn parse_entries(&self, node: &Value, default_tag: &str) -> Vec<Model> {
        node.get("entries")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| match entry {
                        Value::Object(_) => self.create_model_or(entry, default_tag),
                        other => Model::Base(Base::opaque(other)),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn field_model(&self, value: &Value) -> Model {
        match value {
            Value::Object(map) if map.contains_key("type") => self.create_model(value),
            other => Model::Base(Base::opaque(other)),
        }
    }
}

/// Parse with the built-in vocabulary only
pub fn parse(node: &Value) -> Parsed {
    let registry = TypeRegistry::new();
    Parser::new(&registry).parse(node)
}

/// Build a model with the built-in vocabulary only
pub fn create_model(node: &Value) -> Model {
    let registry = TypeRegistry::new();
    Parser::new(&registry).create_model(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HasFields;
    use serde_json::json;

    #[test]
    fn test_type_round_trip() {
        for tag in ["page", "textarea", "pages", "structure", "html", "time", "color", "block"] {
            let model = create_model(&json!({ "type": tag }));
            assert_eq!(model.type_name(), tag);
        }
        let unknown = create_model(&json!({ "type": "mystery", "value": 1 }));
        assert_eq!(unknown.type_name(), "base");
        assert_eq!(unknown.value(), &json!(1));
    }

    #[test]
    fn test_non_string_type_defaults_to_base() {
        let model = create_model(&json!({ "type": 7 }));
        assert_eq!(model.type_name(), "base");
    }

    #[test]
    fn test_untyped_map_and_list() {
        let parsed = parse(&json!({
            "title": { "type": "text", "value": "Hi" },
            "tags": [1, { "type": "number", "value": 2 }],
            "plain": "x"
        }));
        let title = parsed.get("title").and_then(Parsed::as_model).unwrap();
        assert_eq!(title.str(&Default::default()), "Hi");

        let tags = parsed.get("tags").and_then(Parsed::as_list).unwrap();
        assert_eq!(tags[0], Parsed::Scalar(json!(1)));
        assert_eq!(tags[1].as_model().unwrap().type_name(), "number");

        assert_eq!(parsed.get("plain"), Some(&Parsed::Scalar(json!("x"))));
    }

    #[test]
    fn test_page_scenario() {
        let model = create_model(&json!({
            "type": "page",
            "meta": { "href": "/a", "title": "A" },
            "fields": { "title": { "type": "string", "value": "A" } }
        }));
        let page = model.as_page().unwrap();
        assert_eq!(page.link().unwrap().href(), "/a");
        assert_eq!(page.field("title").unwrap().value(), &json!("A"));
    }

    #[test]
    fn test_page_without_href_has_no_link() {
        let model = create_model(&json!({ "type": "page", "meta": { "title": "A" } }));
        assert!(model.link().is_none());
    }

    #[test]
    fn test_untyped_field_is_opaque() {
        let model = create_model(&json!({
            "type": "block",
            "block": "quote",
            "fields": { "raw": { "a": 1 } }
        }));
        let raw = model.field("raw").unwrap();
        assert_eq!(raw.type_name(), "base");
        assert_eq!(raw.value(), &json!({ "a": 1 }));
    }
}
