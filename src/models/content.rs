//! Fields-bearing content models: page, file, user, language, site, block, entry

use serde_json::Value;

use super::{Base, Fields, HasChildren, HasFields, Link, LinkKind, Model};
use crate::parser::Parser;
use crate::store::settings::direction_for;
use crate::thumb::{self, ImageAttributes, ImageSource, ThumbOptions};

macro_rules! impl_has_fields {
    ($($ty:ty),*) => {
        $(
            impl HasFields for $ty {
                fn fields(&self) -> &Fields {
                    &self.fields
                }
            }
        )*
    };
}

impl_has_fields!(Page, File, User, Language, Site, Block, Entry);

// =============================================================================
// Page
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub(crate) base: Base,
    fields: Fields,
    link: Option<Link>,
}

impl Page {
    pub fn from_node(parser: &Parser<'_>, base: Base, node: &Value) -> Self {
        let fields = parser.parse_fields(node);
        let link = Link::from_meta(base.meta_map(), LinkKind::Page, &["title"]);
        Self { base, fields, link }
    }

    pub fn link(&self) -> Option<&Link> {
        self.link.as_ref()
    }

    pub fn id(&self) -> Option<&str> {
        self.base.meta_str("id")
    }

    /// `meta.title`, else the `title` field when it is text
    pub fn title(&self) -> Option<&str> {
        self.base.meta_str("title").or_else(|| match self.fields.get("title") {
            Some(Model::Text(t)) => Some(t.as_str()),
            _ => None,
        })
    }

    pub fn slug(&self) -> Option<&str> {
        self.base.meta_str("slug")
    }

    /// Blueprint name, falling back to the template
    pub fn blueprint(&self) -> Option<&str> {
        self.base
            .meta_str("blueprint")
            .or_else(|| self.base.meta_str("template"))
    }

    pub fn template(&self) -> Option<&str> {
        self.base.meta_str("template")
    }

    pub fn status(&self) -> Option<&str> {
        self.base.meta_str("status")
    }

    pub fn is_listed(&self) -> bool {
        self.status() == Some("listed")
    }

    pub fn is_home(&self) -> bool {
        self.base.meta_bool("isHomePage").unwrap_or(false)
    }
}

// =============================================================================
// File
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub(crate) base: Base,
    fields: Fields,
    link: Option<Link>,
}

impl File {
    pub fn from_node(parser: &Parser<'_>, base: Base, node: &Value) -> Self {
        let fields = parser.parse_fields(node);
        let link = Link::from_meta(base.meta_map(), LinkKind::File, &["title", "filename"]);
        Self { base, fields, link }
    }

    pub fn link(&self) -> Option<&Link> {
        self.link.as_ref()
    }

    pub fn filename(&self) -> Option<&str> {
        self.base.meta_str("filename")
    }

    pub fn url(&self) -> Option<&str> {
        self.base.meta_str("url")
    }

    pub fn mime(&self) -> Option<&str> {
        self.base.meta_str("mime")
    }

    pub fn is_image(&self) -> bool {
        self.base.meta_str("type") == Some("image")
            || self.mime().map(|m| m.starts_with("image/")).unwrap_or(false)
    }

    /// Image metadata for the thumb builder; alt text prefers the `alt` field
    pub fn image(&self) -> Option<ImageSource> {
        if !self.is_image() {
            return None;
        }
        let alt = match self.fields.get("alt") {
            Some(Model::Text(t)) if !t.is_empty() => Some(t.as_str().to_string()),
            _ => self.base.meta_str("alt").map(String::from),
        };
        Some(ImageSource {
            url: self.url().map(String::from),
            width: self.base.meta_u64("width").and_then(|w| u32::try_from(w).ok()),
            height: self.base.meta_u64("height").and_then(|h| u32::try_from(h).ok()),
            alt,
        })
    }

    /// Thumb attributes, recomputed on every call. Non-images yield `src: None`.
    pub fn thumb(&self, options: &ThumbOptions) -> ImageAttributes {
        thumb::build_url(&self.image().unwrap_or_default(), options)
    }

    pub fn srcset(&self, widths: &[u32], options: &ThumbOptions) -> String {
        self.image()
            .map(|image| thumb::srcset(&image, widths, options))
            .unwrap_or_default()
    }
}

// =============================================================================
// User
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub(crate) base: Base,
    fields: Fields,
}

impl User {
    pub fn from_node(parser: &Parser<'_>, base: Base, node: &Value) -> Self {
        let fields = parser.parse_fields(node);
        Self { base, fields }
    }

    pub fn name(&self) -> Option<&str> {
        self.base.meta_str("name").or_else(|| self.email())
    }

    pub fn email(&self) -> Option<&str> {
        self.base.meta_str("email")
    }

    /// Role name; `meta.role` may be a string or `{ name }`
    pub fn role(&self) -> Option<&str> {
        match self.base.meta("role")? {
            Value::String(s) => Some(s),
            Value::Object(map) => map.get("name").and_then(Value::as_str),
            _ => None,
        }
    }
}

// =============================================================================
// Language
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Language {
    pub(crate) base: Base,
    fields: Fields,
}

impl Language {
    pub fn from_node(parser: &Parser<'_>, base: Base, node: &Value) -> Self {
        let fields = parser.parse_fields(node);
        Self { base, fields }
    }

    /// `meta.code`, else a string value
    pub fn code(&self) -> Option<&str> {
        self.base
            .meta_str("code")
            .or_else(|| self.base.value().as_str())
    }

    pub fn name(&self) -> Option<&str> {
        self.base.meta_str("name").or_else(|| self.code())
    }

    pub fn locale(&self) -> Option<&str> {
        self.base.meta_str("locale")
    }

    /// `meta.direction`, else derived from the code
    pub fn direction(&self) -> &str {
        self.base
            .meta_str("direction")
            .unwrap_or_else(|| self.code().map(direction_for).unwrap_or("ltr"))
    }

    pub fn is_default(&self) -> bool {
        self.base.meta_bool("default").unwrap_or(false)
    }
}

// =============================================================================
// Site
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub(crate) base: Base,
    fields: Fields,
    link: Option<Link>,
}

impl Site {
    pub fn from_node(parser: &Parser<'_>, base: Base, node: &Value) -> Self {
        let fields = parser.parse_fields(node);
        let link = Link::from_meta(base.meta_map(), LinkKind::Page, &["title"]);
        Self { base, fields, link }
    }

    pub fn link(&self) -> Option<&Link> {
        self.link.as_ref()
    }

    pub fn title(&self) -> Option<&str> {
        self.base.meta_str("title").or_else(|| match self.fields.get("title") {
            Some(Model::Text(t)) => Some(t.as_str()),
            _ => None,
        })
    }

    pub fn url(&self) -> Option<&str> {
        self.base.meta_str("url")
    }

    /// Language models from the `languages` field
    pub fn languages(&self) -> Vec<&Language> {
        self.fields
            .get("languages")
            .and_then(Model::as_children)
            .map(|c| {
                c.entries()
                    .iter()
                    .filter_map(|m| match m {
                        Model::Language(l) => Some(l),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

// =============================================================================
// Block / Entry
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub(crate) base: Base,
    fields: Fields,
    block_type: Option<String>,
}

impl Block {
    pub fn from_node(parser: &Parser<'_>, base: Base, node: &Value) -> Self {
        let fields = parser.parse_fields(node);
        let block_type = node
            .get("block")
            .and_then(Value::as_str)
            .or_else(|| base.meta_str("block"))
            .map(String::from);
        Self {
            base,
            fields,
            block_type,
        }
    }

    /// Block name such as `"heading"` or `"image"`
    pub fn block_type(&self) -> Option<&str> {
        self.block_type.as_deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.base.meta_str("id")
    }

    pub fn is_hidden(&self) -> bool {
        self.base
            .meta_bool("isHidden")
            .or_else(|| self.base.meta_bool("hidden"))
            .unwrap_or(false)
    }
}

/// One row of a structure field
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub(crate) base: Base,
    fields: Fields,
}

impl Entry {
    pub fn from_node(parser: &Parser<'_>, base: Base, node: &Value) -> Self {
        let fields = parser.parse_fields(node);
        Self { base, fields }
    }
}
