//! Entries-bearing models: collections (pages, files, users, blocks, ...) and structures

use serde_json::Value;

use super::{Base, HasChildren, Model};
use crate::parser::Parser;

/// Pagination window of a collection.
///
/// Sets are 1-based: `set` is the current set, `sets` the number of sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub set: u64,
    pub limit: u64,
    pub start: u64,
    pub end: u64,
    pub sets: u64,
    pub total: u64,
}

impl Pagination {
    /// Read from `meta.pagination`, or from `meta` itself.
    ///
    /// `None` unless at least `set` or `sets` is present.
    pub fn from_base(base: &Base) -> Option<Self> {
        let source = base
            .meta("pagination")
            .and_then(Value::as_object)
            .unwrap_or_else(|| base.meta_map());
        let read = |key: &str| {
            source.get(key).and_then(|v| match v {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
        };
        if read("set").is_none() && read("sets").is_none() {
            return None;
        }
        Some(Self {
            set: read("set").unwrap_or(1),
            limit: read("limit").unwrap_or(0),
            start: read("start").unwrap_or(0),
            end: read("end").unwrap_or(0),
            sets: read("sets").unwrap_or(0),
            total: read("total").unwrap_or(0),
        })
    }

    /// Whether the set `n` steps back exists
    pub fn has_prev(&self, n: u64) -> bool {
        self.set.checked_sub(n).map(|p| p > 0).unwrap_or(false)
    }

    /// Whether the set `n` steps ahead exists
    pub fn has_next(&self, n: u64) -> bool {
        self.set.saturating_add(n) <= self.sets
    }

    pub fn prev_set(&self) -> Option<u64> {
        self.has_prev(1).then(|| self.set - 1)
    }

    pub fn next_set(&self) -> Option<u64> {
        self.has_next(1).then(|| self.set + 1)
    }

    pub fn is_first(&self) -> bool {
        !self.has_prev(1)
    }

    pub fn is_last(&self) -> bool {
        !self.has_next(1)
    }
}

/// List of content models with optional pagination
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub(crate) base: Base,
    entries: Vec<Model>,
    pagination: Option<Pagination>,
}

impl Collection {
    pub fn from_node(parser: &Parser<'_>, base: Base, node: &Value) -> Self {
        let entries = parser.parse_entries(node, "base");
        let pagination = Pagination::from_base(&base);
        Self {
            base,
            entries,
            pagination,
        }
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    pub fn has_prev(&self, n: u64) -> bool {
        self.pagination.map(|p| p.has_prev(n)).unwrap_or(false)
    }

    pub fn has_next(&self, n: u64) -> bool {
        self.pagination.map(|p| p.has_next(n)).unwrap_or(false)
    }
}

impl HasChildren for Collection {
    fn entries(&self) -> &[Model] {
        &self.entries
    }
}

/// Rows of a structure field. Untyped rows become `entry` models.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    pub(crate) base: Base,
    entries: Vec<Model>,
}

impl Structure {
    pub fn from_node(parser: &Parser<'_>, base: Base, node: &Value) -> Self {
        let entries = parser.parse_entries(node, "entry");
        Self { base, entries }
    }
}

impl HasChildren for Structure {
    fn entries(&self) -> &[Model] {
        &self.entries
    }
}
