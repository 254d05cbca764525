//! Link model
//!
//! Derived `{ kind, href, label }` data. Built from `link` nodes, from the
//! `meta.href` of pages/files/sites, and from `<a>` fragments of rich text.

use serde_json::{Map, Value};

use super::{scalar_string, Base};

/// What a link points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    Page,
    File,
    Url,
    Email,
    Tel,
    Anchor,
}

impl LinkKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "page" => Some(Self::Page),
            "file" => Some(Self::File),
            "url" => Some(Self::Url),
            "email" => Some(Self::Email),
            "tel" => Some(Self::Tel),
            "anchor" => Some(Self::Anchor),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::File => "file",
            Self::Url => "url",
            Self::Email => "email",
            Self::Tel => "tel",
            Self::Anchor => "anchor",
        }
    }

    /// Guess the kind from the href scheme
    pub fn infer(href: &str) -> Self {
        let lower = href.trim().to_lowercase();
        if lower.starts_with("mailto:") {
            Self::Email
        } else if lower.starts_with("tel:") {
            Self::Tel
        } else if lower.starts_with('#') {
            Self::Anchor
        } else if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//") {
            Self::Url
        } else {
            Self::Page
        }
    }
}

/// Immutable link value
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub(crate) base: Base,
    kind: LinkKind,
    href: String,
    label: String,
}

impl Link {
    pub fn new(kind: LinkKind, href: impl Into<String>, label: impl Into<String>) -> Self {
        let href = href.into();
        let label = label.into();
        Self {
            base: Base::new("link", Value::String(href.clone())),
            kind,
            href,
            label,
        }
    }

    /// Link with the kind inferred from `href`; an empty label falls back to the href
    pub fn from_href(href: impl Into<String>, label: impl Into<String>) -> Self {
        let href = href.into();
        let mut label = label.into();
        if label.trim().is_empty() {
            label = href.clone();
        }
        Self::new(LinkKind::infer(&href), href, label)
    }

    /// Build from a `link` node: href in `value` (or `meta.href`), optional
    /// `meta.kind` and `meta.label`/`meta.text`/`meta.title`
    pub fn from_node(base: Base) -> Self {
        let href = match base.value() {
            Value::String(s) => s.clone(),
            Value::Object(map) => map.get("href").map(scalar_string).unwrap_or_default(),
            _ => base.meta_str("href").unwrap_or_default().to_string(),
        };
        let label = ["label", "text", "title"]
            .iter()
            .find_map(|k| base.meta_str(k))
            .map(String::from)
            .unwrap_or_else(|| href.clone());
        let kind = base
            .meta_str("kind")
            .and_then(LinkKind::from_name)
            .unwrap_or_else(|| LinkKind::infer(&href));
        Self {
            base,
            kind,
            href,
            label,
        }
    }

    /// Link for a content node whose `meta.href` is set; `None` otherwise.
    ///
    /// The label is the first of `label_keys` present in meta, or the href.
    pub fn from_meta(meta: &Map<String, Value>, kind: LinkKind, label_keys: &[&str]) -> Option<Self> {
        let href = meta.get("href").and_then(Value::as_str)?;
        let label = label_keys
            .iter()
            .find_map(|k| meta.get(*k).and_then(Value::as_str))
            .unwrap_or(href);
        Some(Self::new(kind, href, label))
    }

    pub fn kind(&self) -> LinkKind {
        self.kind
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_external(&self) -> bool {
        self.kind == LinkKind::Url
    }
}
