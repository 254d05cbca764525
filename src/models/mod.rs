//! Response Models
//!
//! Immutable value objects reconstructed from `type`-tagged JSON nodes. The
//! closed [`Model`] enum is what the parser produces; each variant wraps a
//! concrete struct that carries a [`Base`] (discriminator, raw value, meta)
//! plus whatever the kind derives from it.
//!
//! Two capability traits cut across the variants:
//!
//! - [`HasFields`]: page, file, user, site, block, language, entry
//! - [`HasChildren`]: collection, structure

pub mod collection;
pub mod content;
pub mod date;
pub mod html;
pub mod link;
pub mod scalar;

pub use collection::{Collection, Pagination, Structure};
pub use content::{Block, Entry, File, Language, Page, Site, User};
pub use date::{DateModel, DatePrecision};
pub use html::{Html, HtmlNode, VOID_ELEMENTS};
pub use link::{Link, LinkKind};
pub use scalar::{Boolean, Color, Number, Select, SelectOption, Text};

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::registry::ModelKind;

/// Name → model map owned by fields-bearing models
pub type Fields = BTreeMap<String, Model>;

// =============================================================================
// Base
// =============================================================================

/// Discriminator, raw value and meta shared by every model
#[derive(Debug, Clone, PartialEq)]
pub struct Base {
    type_name: String,
    value: Value,
    meta: Map<String, Value>,
}

impl Base {
    /// Read `value` and `meta` from a node, tagging it with `type_name`
    pub fn from_node(type_name: &str, node: &Value) -> Self {
        Self {
            type_name: type_name.to_string(),
            value: node.get("value").cloned().unwrap_or(Value::Null),
            meta: node
                .get("meta")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        }
    }

    /// Untyped data kept as-is under the `"base"` tag
    pub fn opaque(data: &Value) -> Self {
        Self {
            type_name: "base".to_string(),
            value: data.clone(),
            meta: Map::new(),
        }
    }

    pub fn new(type_name: impl Into<String>, value: Value) -> Self {
        Self {
            type_name: type_name.into(),
            value,
            meta: Map::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.meta.get(key)
    }

    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta.get(key).and_then(Value::as_str)
    }

    pub fn meta_u64(&self, key: &str) -> Option<u64> {
        self.meta.get(key).and_then(|v| match v {
            Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn meta_bool(&self, key: &str) -> Option<bool> {
        self.meta.get(key).and_then(Value::as_bool)
    }

    pub fn meta_map(&self) -> &Map<String, Value> {
        &self.meta
    }

    /// Plain string rendering of the raw value
    pub fn value_string(&self) -> String {
        scalar_string(&self.value)
    }
}

/// Render a scalar JSON value as text; null becomes empty
pub(crate) fn scalar_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

// =============================================================================
// String Options
// =============================================================================

/// Options for [`Model::str`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrOptions {
    /// chrono format string for dates
    pub format: Option<String>,
    /// Separator for multi-value models (default `", "`)
    pub separator: Option<String>,
    /// Fixed number of decimals for numbers
    pub decimals: Option<usize>,
}

impl StrOptions {
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    pub fn decimals(mut self, decimals: usize) -> Self {
        self.decimals = Some(decimals);
        self
    }

    pub(crate) fn separator_or_default(&self) -> &str {
        self.separator.as_deref().unwrap_or(", ")
    }
}

// =============================================================================
// Capability Traits
// =============================================================================

/// Models owning a name → model map
pub trait HasFields {
    fn fields(&self) -> &Fields;

    fn field(&self, key: &str) -> Option<&Model> {
        self.fields().get(key)
    }

    fn has_field(&self, key: &str) -> bool {
        self.fields().contains_key(key)
    }

    /// Field rendered with default options
    fn field_str(&self, key: &str) -> Option<String> {
        self.field(key).map(|m| m.str(&StrOptions::default()))
    }
}

/// Models owning an ordered list of child models
pub trait HasChildren {
    fn entries(&self) -> &[Model];

    fn len(&self) -> usize {
        self.entries().len()
    }

    fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn first(&self) -> Option<&Model> {
        self.entries().first()
    }

    fn last(&self) -> Option<&Model> {
        self.entries().last()
    }

    fn get(&self, index: usize) -> Option<&Model> {
        self.entries().get(index)
    }

    /// Child whose `meta.id` equals `id`
    fn find(&self, id: &str) -> Option<&Model> {
        self.entries()
            .iter()
            .find(|m| m.base().meta_str("id") == Some(id))
    }

    /// Children of a given discriminator
    fn of_type<'a>(&'a self, type_name: &'a str) -> Box<dyn Iterator<Item = &'a Model> + 'a> {
        Box::new(
            self.entries()
                .iter()
                .filter(move |m| m.type_name() == type_name),
        )
    }
}

// =============================================================================
// Model
// =============================================================================

/// A parsed response node
#[derive(Debug, Clone, PartialEq)]
pub enum Model {
    Base(Base),
    Text(Text),
    Number(Number),
    Boolean(Boolean),
    Color(Color),
    Select(Select),
    Date(DateModel),
    Link(Link),
    Html(Html),
    Block(Block),
    Entry(Entry),
    Structure(Structure),
    Collection(Collection),
    Page(Page),
    File(File),
    User(User),
    Language(Language),
    Site(Site),
}

impl Model {
    /// Shared core of every variant
    pub fn base(&self) -> &Base {
        match self {
            Model::Base(m) => m,
            Model::Text(m) => &m.base,
            Model::Number(m) => &m.base,
            Model::Boolean(m) => &m.base,
            Model::Color(m) => &m.base,
            Model::Select(m) => &m.base,
            Model::Date(m) => &m.base,
            Model::Link(m) => &m.base,
            Model::Html(m) => &m.base,
            Model::Block(m) => &m.base,
            Model::Entry(m) => &m.base,
            Model::Structure(m) => &m.base,
            Model::Collection(m) => &m.base,
            Model::Page(m) => &m.base,
            Model::File(m) => &m.base,
            Model::User(m) => &m.base,
            Model::Language(m) => &m.base,
            Model::Site(m) => &m.base,
        }
    }

    /// The discriminator this model was built from, or `"base"`
    pub fn type_name(&self) -> &str {
        self.base().type_name()
    }

    /// Closed kind of this variant
    pub fn kind(&self) -> ModelKind {
        match self {
            Model::Base(_) => ModelKind::Base,
            Model::Text(_) => ModelKind::Text,
            Model::Number(_) => ModelKind::Number,
            Model::Boolean(_) => ModelKind::Boolean,
            Model::Color(_) => ModelKind::Color,
            Model::Select(_) => ModelKind::Select,
            Model::Date(_) => ModelKind::Date,
            Model::Link(_) => ModelKind::Link,
            Model::Html(_) => ModelKind::Html,
            Model::Block(_) => ModelKind::Block,
            Model::Entry(_) => ModelKind::Entry,
            Model::Structure(_) => ModelKind::Structure,
            Model::Collection(_) => ModelKind::Collection,
            Model::Page(_) => ModelKind::Page,
            Model::File(_) => ModelKind::File,
            Model::User(_) => ModelKind::User,
            Model::Language(_) => ModelKind::Language,
            Model::Site(_) => ModelKind::Site,
        }
    }

    /// Raw `value` of the node
    pub fn value(&self) -> &Value {
        self.base().value()
    }

    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.base().meta(key)
    }

    /// Text rendering of the model
    pub fn str(&self, options: &StrOptions) -> String {
        match self {
            Model::Base(m) => m.value_string(),
            Model::Text(m) => m.as_str().to_string(),
            Model::Number(m) => m.str(options),
            Model::Boolean(m) => m.as_bool().to_string(),
            Model::Color(m) => m.hex().unwrap_or_else(|| m.base.value_string()),
            Model::Select(m) => m.str(options),
            Model::Date(m) => m.str(options),
            Model::Link(m) => m.label().to_string(),
            Model::Html(m) => m.render(),
            Model::Page(m) => m.title().unwrap_or_default().to_string(),
            Model::File(m) => m.filename().unwrap_or_default().to_string(),
            Model::User(m) => m.name().unwrap_or_default().to_string(),
            Model::Language(m) => m.name().unwrap_or_default().to_string(),
            Model::Site(m) => m.title().unwrap_or_default().to_string(),
            Model::Block(_) | Model::Entry(_) => fields_str(self, options),
            Model::Structure(_) | Model::Collection(_) => self
                .as_children()
                .map(|c| {
                    c.entries()
                        .iter()
                        .map(|e| e.str(options))
                        .collect::<Vec<_>>()
                        .join(options.separator_or_default())
                })
                .unwrap_or_default(),
        }
    }

    /// Fields capability, when this kind has it
    pub fn as_fields(&self) -> Option<&dyn HasFields> {
        match self {
            Model::Block(m) => Some(m),
            Model::Entry(m) => Some(m),
            Model::Page(m) => Some(m),
            Model::File(m) => Some(m),
            Model::User(m) => Some(m),
            Model::Language(m) => Some(m),
            Model::Site(m) => Some(m),
            _ => None,
        }
    }

    /// Children capability, when this kind has it
    pub fn as_children(&self) -> Option<&dyn HasChildren> {
        match self {
            Model::Structure(m) => Some(m),
            Model::Collection(m) => Some(m),
            _ => None,
        }
    }

    /// Shortcut for `as_fields()?.field(key)`
    pub fn field(&self, key: &str) -> Option<&Model> {
        self.as_fields()?.field(key)
    }

    /// Link sub-model for page, file and site, or the link itself
    pub fn link(&self) -> Option<&Link> {
        match self {
            Model::Link(m) => Some(m),
            Model::Page(m) => m.link(),
            Model::File(m) => m.link(),
            Model::Site(m) => m.link(),
            _ => None,
        }
    }

    pub fn as_page(&self) -> Option<&Page> {
        match self {
            Model::Page(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&File> {
        match self {
            Model::File(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateModel> {
        match self {
            Model::Date(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_html(&self) -> Option<&Html> {
        match self {
            Model::Html(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Model::Collection(m) => Some(m),
            _ => None,
        }
    }
}

/// Fields joined as `key: value` pairs
fn fields_str(model: &Model, options: &StrOptions) -> String {
    model
        .as_fields()
        .map(|f| {
            f.fields()
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v.str(options)))
                .collect::<Vec<_>>()
                .join(options.separator_or_default())
        })
        .unwrap_or_default()
}
