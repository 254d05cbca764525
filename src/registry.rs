//! Type Registry
//!
//! Maps the `type` discriminator of response nodes and field definitions onto
//! closed kinds. The parser and the field factory both dispatch on these kinds
//! with `match`, so an unknown tag can only ever mean "fall back", never "fail".
//!
//! The registry is an explicit object: build it once at startup (optionally
//! adding aliases for custom field types) and pass it by reference.

use std::collections::HashMap;

// =============================================================================
// Model Kinds
// =============================================================================

/// Closed set of response model kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Base,
    Text,
    Number,
    Boolean,
    Color,
    Select,
    Date,
    Link,
    Html,
    Block,
    Entry,
    Structure,
    Collection,
    Page,
    File,
    User,
    Language,
    Site,
}

impl ModelKind {
    /// Built-in vocabulary
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "base" => Some(Self::Base),
            "string" | "text" | "textarea" | "markdown" | "writer" | "slug" | "email" | "url"
            | "tel" => Some(Self::Text),
            "number" | "range" => Some(Self::Number),
            "boolean" | "toggle" | "checkbox" => Some(Self::Boolean),
            "color" => Some(Self::Color),
            "select" | "radio" | "options" | "checkboxes" | "multiselect" | "tags"
            | "toggles" => Some(Self::Select),
            "date" | "time" | "datetime" => Some(Self::Date),
            "link" => Some(Self::Link),
            "html" | "nodes" => Some(Self::Html),
            "block" => Some(Self::Block),
            "entry" => Some(Self::Entry),
            "structure" => Some(Self::Structure),
            "collection" | "pages" | "files" | "users" | "blocks" | "languages" => {
                Some(Self::Collection)
            }
            "page" => Some(Self::Page),
            "file" => Some(Self::File),
            "user" => Some(Self::User),
            "language" => Some(Self::Language),
            "site" => Some(Self::Site),
            _ => None,
        }
    }

    /// Kinds that own a name → model map
    pub fn has_fields(&self) -> bool {
        matches!(
            self,
            Self::Block | Self::Entry | Self::Page | Self::File | Self::User | Self::Language | Self::Site
        )
    }

    /// Kinds that own an ordered list of child models
    pub fn has_children(&self) -> bool {
        matches!(self, Self::Structure | Self::Collection)
    }
}

// =============================================================================
// Field Kinds
// =============================================================================

/// Closed set of form field validation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Base,
    String,
    Number,
    Date,
    Select,
    List,
}

impl FieldKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "text" | "string" | "textarea" | "email" | "url" | "tel" | "password" | "slug" => {
                Some(Self::String)
            }
            "number" | "range" => Some(Self::Number),
            "date" => Some(Self::Date),
            "select" | "radio" | "checkboxes" | "multiselect" | "tags" => Some(Self::Select),
            "list" => Some(Self::List),
            _ => None,
        }
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Discriminator lookup shared by the parser and the form
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    models: HashMap<String, ModelKind>,
    fields: HashMap<String, FieldKind>,
}

impl TypeRegistry {
    /// Registry with only the built-in vocabulary
    pub fn new() -> Self {
        Self::default()
    }

    /// Map an extra model tag onto a kind (e.g. a custom `"markdown-plus"` → text)
    pub fn register_model(&mut self, tag: impl Into<String>, kind: ModelKind) -> &mut Self {
        self.models.insert(tag.into(), kind);
        self
    }

    /// Map an extra field tag onto a validation kind
    pub fn register_field(&mut self, tag: impl Into<String>, kind: FieldKind) -> &mut Self {
        self.fields.insert(tag.into(), kind);
        self
    }

    /// Kind for a model tag. `None` means unknown; callers fall back to base.
    pub fn model_kind(&self, tag: &str) -> Option<ModelKind> {
        self.models
            .get(tag)
            .copied()
            .or_else(|| ModelKind::from_tag(tag))
    }

    /// Kind for a field tag, falling back to [`FieldKind::Base`]
    pub fn field_kind(&self, tag: &str) -> FieldKind {
        self.fields
            .get(tag)
            .copied()
            .or_else(|| FieldKind::from_tag(tag))
            .unwrap_or(FieldKind::Base)
    }
}
