//! Field Validation Models
//!
//! A field holds a raw value and a verdict in two reactive cells. `validate()`
//! recomputes the verdict on demand; `watch(true)` installs one reaction on the
//! value cell that does the same on every change.
//!
//! Rules run in a fixed order and the first failure wins:
//!
//! 1. `required` when the value is empty
//! 2. `type` (shape or option membership)
//! 3. `minlength` / `maxlength` / `min` / `max`
//!
//! Kinds are closed: [`Field`] dispatches to a [`ScalarField`] parameterised by
//! its [`Rules`], or to the [`ListField`] which owns string children.

pub mod date;
pub mod definition;
pub mod list;
pub mod number;
pub mod select;
pub mod string;

pub use date::DateRules;
pub use definition::{FieldDefinition, FieldOption};
pub use list::ListField;
pub use number::NumberRules;
pub use select::SelectRules;
pub use string::{Shape, StringRules};

use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::trace;
use uuid::Uuid;

use crate::reactive::{Disposer, ReactiveCell};
use crate::registry::{FieldKind, TypeRegistry};

// =============================================================================
// Identity & Verdicts
// =============================================================================

/// Opaque unique field token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(Uuid);

impl FieldId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FieldId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of the rule that rejected a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Required,
    Type,
    MinLength,
    MaxLength,
    Min,
    Max,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::Type => "type",
            Rule::MinLength => "minlength",
            Rule::MaxLength => "maxlength",
            Rule::Min => "min",
            Rule::Max => "max",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation state of a field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verdict {
    #[default]
    Unvalidated,
    Valid,
    Invalid(Rule),
}

impl Verdict {
    /// Anything but `Invalid`
    pub fn is_valid(&self) -> bool {
        !matches!(self, Verdict::Invalid(_))
    }

    pub fn rule(&self) -> Option<Rule> {
        match self {
            Verdict::Invalid(rule) => Some(*rule),
            _ => None,
        }
    }

    /// Rule name, or empty when valid
    pub fn msg(&self) -> &'static str {
        self.rule().map(|r| r.as_str()).unwrap_or("")
    }
}

impl From<std::result::Result<(), Rule>> for Verdict {
    fn from(result: std::result::Result<(), Rule>) -> Self {
        match result {
            Ok(()) => Verdict::Valid,
            Err(rule) => Verdict::Invalid(rule),
        }
    }
}

/// Empty means null, blank string, `[]` or `{}`
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

// =============================================================================
// Rules
// =============================================================================

/// Kind-specific checks and data coercion
pub trait Rules: fmt::Debug + 'static {
    /// Shape and range checks for a non-empty value
    fn check(&self, value: &Value) -> std::result::Result<(), Rule>;

    /// Submitted representation of the value
    fn data(&self, value: &Value) -> Value;

    fn is_empty(&self, value: &Value) -> bool {
        is_empty_value(value)
    }

    /// Full rule chain, starting with `required`
    fn verdict(&self, value: &Value, required: bool) -> Verdict {
        if self.is_empty(value) {
            return if required {
                Verdict::Invalid(Rule::Required)
            } else {
                Verdict::Valid
            };
        }
        self.check(value).into()
    }
}

/// Any other field type: only `required` applies
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseRules;

impl Rules for BaseRules {
    fn check(&self, _value: &Value) -> std::result::Result<(), Rule> {
        Ok(())
    }

    fn data(&self, value: &Value) -> Value {
        value.clone()
    }
}

// =============================================================================
// Scalar Field
// =============================================================================

/// Single-value field validated by `R`
#[derive(Debug)]
pub struct ScalarField<R: Rules> {
    id: FieldId,
    parent: Option<FieldId>,
    rules: Rc<R>,
    required: bool,
    value: ReactiveCell<Value>,
    verdict: ReactiveCell<Verdict>,
    watcher: RefCell<Option<Disposer>>,
}

pub type BaseField = ScalarField<BaseRules>;
pub type StringField = ScalarField<StringRules>;
pub type NumberField = ScalarField<NumberRules>;
pub type DateField = ScalarField<DateRules>;
pub type SelectField = ScalarField<SelectRules>;

impl<R: Rules> ScalarField<R> {
    pub fn new(rules: R, required: bool, value: Value) -> Self {
        Self {
            id: FieldId::new(),
            parent: None,
            rules: Rc::new(rules),
            required,
            value: ReactiveCell::new(value),
            verdict: ReactiveCell::new(Verdict::Unvalidated),
            watcher: RefCell::new(None),
        }
    }

    pub(crate) fn with_parent(mut self, parent: FieldId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn id(&self) -> FieldId {
        self.id
    }

    /// Id of the owning list, for list children
    pub fn parent(&self) -> Option<FieldId> {
        self.parent
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn value(&self) -> Value {
        self.value.get()
    }

    pub fn set_value(&self, value: Value) -> bool {
        self.value.set(value)
    }

    pub fn value_cell(&self) -> ReactiveCell<Value> {
        self.value.clone()
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict.get()
    }

    pub fn verdict_cell(&self) -> ReactiveCell<Verdict> {
        self.verdict.clone()
    }

    /// Run the rule chain against the current value
    pub fn validate(&self) -> bool {
        let verdict = self.value.with(|v| self.rules.verdict(v, self.required));
        self.verdict.set(verdict);
        verdict.is_valid()
    }

    /// Install (`true`) or remove (`false`) the live validation reaction
    pub fn watch(&self, start: bool) {
        let mut watcher = self.watcher.borrow_mut();
        match (start, watcher.is_some()) {
            (true, false) => {
                let rules = Rc::clone(&self.rules);
                let verdict = self.verdict.clone();
                let required = self.required;
                *watcher = Some(self.value.watch(move |value, _| {
                    verdict.set(rules.verdict(value, required));
                }));
                trace!(field = %self.id, "watcher installed");
            }
            (false, true) => {
                if let Some(disposer) = watcher.take() {
                    disposer.dispose();
                }
                trace!(field = %self.id, "watcher removed");
            }
            _ => {}
        }
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.borrow().is_some()
    }

    pub fn valid(&self) -> bool {
        self.verdict().is_valid()
    }

    pub fn msg(&self) -> &'static str {
        self.verdict().msg()
    }

    pub fn data(&self) -> Value {
        self.value.with(|v| self.rules.data(v))
    }
}

impl<R: Rules> Drop for ScalarField<R> {
    fn drop(&mut self) {
        if let Some(disposer) = self.watcher.get_mut().take() {
            disposer.dispose();
        }
    }
}

// =============================================================================
// Field
// =============================================================================

/// A form field of any kind
#[derive(Debug)]
pub enum Field {
    Base(BaseField),
    String(StringField),
    Number(NumberField),
    Date(DateField),
    Select(SelectField),
    List(ListField),
}

macro_rules! dispatch {
    ($self:expr, $f:ident => $body:expr) => {
        match $self {
            Field::Base($f) => $body,
            Field::String($f) => $body,
            Field::Number($f) => $body,
            Field::Date($f) => $body,
            Field::Select($f) => $body,
            Field::List($f) => $body,
        }
    };
}

impl Field {
    /// Build a field from its definition, resolving the kind through `registry`
    pub fn from_definition(definition: &FieldDefinition, registry: &TypeRegistry) -> Self {
        let kind = registry.field_kind(&definition.field_type);
        let value = definition.value.clone();
        let required = definition.required;
        match kind {
            FieldKind::Base => Field::Base(ScalarField::new(BaseRules, required, value)),
            FieldKind::String => Field::String(ScalarField::new(
                StringRules::from_definition(definition),
                required,
                value,
            )),
            FieldKind::Number => Field::Number(ScalarField::new(
                NumberRules::from_definition(definition),
                required,
                value,
            )),
            FieldKind::Date => Field::Date(ScalarField::new(
                DateRules::from_definition(definition),
                required,
                value,
            )),
            FieldKind::Select => Field::Select(ScalarField::new(
                SelectRules::from_definition(definition),
                required,
                value,
            )),
            FieldKind::List => Field::List(ListField::from_definition(definition)),
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Base(_) => FieldKind::Base,
            Field::String(_) => FieldKind::String,
            Field::Number(_) => FieldKind::Number,
            Field::Date(_) => FieldKind::Date,
            Field::Select(_) => FieldKind::Select,
            Field::List(_) => FieldKind::List,
        }
    }

    pub fn id(&self) -> FieldId {
        dispatch!(self, f => f.id())
    }

    pub fn value(&self) -> Value {
        dispatch!(self, f => f.value())
    }

    pub fn set_value(&self, value: Value) -> bool {
        dispatch!(self, f => f.set_value(value))
    }

    pub fn validate(&self) -> bool {
        dispatch!(self, f => f.validate())
    }

    pub fn watch(&self, start: bool) {
        dispatch!(self, f => f.watch(start))
    }

    pub fn is_watching(&self) -> bool {
        dispatch!(self, f => f.is_watching())
    }

    pub fn verdict(&self) -> Verdict {
        dispatch!(self, f => f.verdict())
    }

    pub fn verdict_cell(&self) -> ReactiveCell<Verdict> {
        dispatch!(self, f => f.verdict_cell())
    }

    pub fn valid(&self) -> bool {
        dispatch!(self, f => f.valid())
    }

    pub fn msg(&self) -> &'static str {
        dispatch!(self, f => f.msg())
    }

    pub fn data(&self) -> Value {
        dispatch!(self, f => f.data())
    }

    pub fn as_list(&self) -> Option<&ListField> {
        match self {
            Field::List(list) => Some(list),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(def: FieldDefinition) -> Field {
        Field::from_definition(&def, &TypeRegistry::new())
    }

    #[test]
    fn test_kind_resolution() {
        assert_eq!(field(FieldDefinition::new("email")).kind(), FieldKind::String);
        assert_eq!(field(FieldDefinition::new("range")).kind(), FieldKind::Number);
        assert_eq!(field(FieldDefinition::new("list")).kind(), FieldKind::List);
        assert_eq!(field(FieldDefinition::new("toggle")).kind(), FieldKind::Base);
    }

    #[test]
    fn test_unvalidated_counts_as_valid() {
        let f = field(FieldDefinition::new("text").required(true));
        assert_eq!(f.verdict(), Verdict::Unvalidated);
        assert!(f.valid());
        assert_eq!(f.msg(), "");
    }

    #[test]
    fn test_base_field_required_only() {
        let f = field(FieldDefinition::new("checkbox").required(true));
        assert!(!f.validate());
        assert_eq!(f.msg(), "required");
        f.set_value(json!(true));
        assert!(f.validate());
        assert_eq!(f.data(), json!(true));
    }

    #[test]
    fn test_watch_is_idempotent() {
        let f = StringField::new(StringRules::default(), true, Value::Null);
        f.watch(true);
        f.watch(true);
        assert_eq!(f.value_cell().watcher_count(), 1);

        f.set_value(json!(""));
        f.set_value(json!("ok"));
        assert!(f.valid());
        f.set_value(json!(" "));
        assert_eq!(f.msg(), "required");

        f.watch(false);
        f.watch(false);
        assert_eq!(f.value_cell().watcher_count(), 0);
        f.set_value(json!("changed"));
        assert_eq!(f.msg(), "required");
    }

    #[test]
    fn test_drop_detaches_watcher() {
        let f = StringField::new(StringRules::default(), false, Value::Null);
        let cell = f.value_cell();
        f.watch(true);
        drop(f);
        assert_eq!(cell.watcher_count(), 0);
    }
}
