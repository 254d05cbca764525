//! List fields
//!
//! A list owns string children. Each child is required, carries the list's
//! `minlength`/`maxlength`, and knows its parent only by id. The list's own
//! value cell mirrors the children's values so one watcher on it covers every
//! add, delete and child edit.

use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::trace;

use super::{FieldDefinition, FieldId, Rule, StringField, StringRules, Verdict};
use crate::reactive::{Disposer, ReactiveCell};

struct Child {
    field: StringField,
    sync: Disposer,
}

impl Drop for Child {
    fn drop(&mut self) {
        self.field.watch(false);
        self.sync.dispose();
    }
}

type Children = Rc<RefCell<Vec<Child>>>;

#[derive(Debug, Clone, Copy)]
struct Bounds {
    required: bool,
    min: Option<usize>,
    max: Option<usize>,
}

pub struct ListField {
    id: FieldId,
    bounds: Bounds,
    child_rules: StringRules,
    children: Children,
    value: ReactiveCell<Value>,
    verdict: ReactiveCell<Verdict>,
    watching: Cell<bool>,
    watcher: RefCell<Option<Disposer>>,
}

impl ListField {
    pub fn from_definition(definition: &FieldDefinition) -> Self {
        let list = Self::new(
            StringRules::lengths(definition.minlength, definition.maxlength),
            definition.required,
            definition.min_count(),
            definition.max_count(),
        );
        list.set_value(definition.value.clone());
        list
    }

    /// Empty list. A positive `min` makes the list required.
    pub fn new(child_rules: StringRules, required: bool, min: Option<usize>, max: Option<usize>) -> Self {
        Self {
            id: FieldId::new(),
            bounds: Bounds {
                required: required || min.is_some_and(|m| m > 0),
                min,
                max,
            },
            child_rules,
            children: Rc::new(RefCell::new(Vec::new())),
            value: ReactiveCell::new(Value::Array(Vec::new())),
            verdict: ReactiveCell::new(Verdict::Unvalidated),
            watching: Cell::new(false),
            watcher: RefCell::new(None),
        }
    }

    pub fn id(&self) -> FieldId {
        self.id
    }

    pub fn required(&self) -> bool {
        self.bounds.required
    }

    /// Array of the children's raw values
    pub fn value(&self) -> Value {
        self.value.get()
    }

    pub fn value_cell(&self) -> ReactiveCell<Value> {
        self.value.clone()
    }

    /// Replace every child. Arrays map one item per child, null clears,
    /// a scalar becomes a single child.
    pub fn set_value(&self, value: Value) -> bool {
        let items = match value {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => vec![other],
        };
        let old = std::mem::take(&mut *self.children.borrow_mut());
        drop(old);
        for item in items {
            self.push_child(item);
        }
        self.sync()
    }

    /// Append a child and return its id
    pub fn add(&self, value: Value) -> FieldId {
        let id = self.push_child(value);
        self.sync();
        id
    }

    /// Remove a child by id, detaching its watcher
    pub fn delete(&self, id: FieldId) -> bool {
        let removed = {
            let mut children = self.children.borrow_mut();
            children
                .iter()
                .position(|c| c.field.id() == id)
                .map(|pos| children.remove(pos))
        };
        match removed {
            Some(child) => {
                drop(child);
                trace!(list = %self.id, child = %id, "list child removed");
                self.sync();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.children.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn child_ids(&self) -> Vec<FieldId> {
        self.children.borrow().iter().map(|c| c.field.id()).collect()
    }

    /// Edit one child's value
    pub fn set_child(&self, id: FieldId, value: Value) -> bool {
        let cell = self
            .children
            .borrow()
            .iter()
            .find(|c| c.field.id() == id)
            .map(|c| c.field.value_cell());
        cell.map(|cell| cell.set(value)).unwrap_or(false)
    }

    pub fn child_verdict(&self, id: FieldId) -> Option<Verdict> {
        self.children
            .borrow()
            .iter()
            .find(|c| c.field.id() == id)
            .map(|c| c.field.verdict())
    }

    /// Parent id recorded on a child
    pub fn child_parent(&self, id: FieldId) -> Option<FieldId> {
        self.children
            .borrow()
            .iter()
            .find(|c| c.field.id() == id)
            .and_then(|c| c.field.parent())
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict.get()
    }

    pub fn verdict_cell(&self) -> ReactiveCell<Verdict> {
        self.verdict.clone()
    }

    pub fn valid(&self) -> bool {
        self.verdict().is_valid()
    }

    pub fn msg(&self) -> &'static str {
        self.verdict().msg()
    }

    /// Validate every child, then the list itself
    pub fn validate(&self) -> bool {
        let verdict = evaluate(&self.children.borrow(), self.bounds);
        self.verdict.set(verdict);
        verdict.is_valid()
    }

    /// Toggle live validation on the list and all of its children
    pub fn watch(&self, start: bool) {
        self.watching.set(start);
        for child in self.children.borrow().iter() {
            child.field.watch(start);
        }

        let mut watcher = self.watcher.borrow_mut();
        match (start, watcher.is_some()) {
            (true, false) => {
                let children = Rc::downgrade(&self.children);
                let verdict = self.verdict.clone();
                let bounds = self.bounds;
                *watcher = Some(self.value.watch(move |_, _| {
                    if let Some(children) = children.upgrade() {
                        if let Ok(children) = children.try_borrow() {
                            verdict.set(evaluate(&children, bounds));
                        }
                    }
                }));
                trace!(field = %self.id, "list watcher installed");
            }
            (false, true) => {
                if let Some(disposer) = watcher.take() {
                    disposer.dispose();
                }
                trace!(field = %self.id, "list watcher removed");
            }
            _ => {}
        }
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.borrow().is_some()
    }

    /// Children's values as strings
    pub fn data(&self) -> Value {
        Value::Array(self.children.borrow().iter().map(|c| c.field.data()).collect())
    }

    fn push_child(&self, value: Value) -> FieldId {
        let field = StringField::new(self.child_rules.clone(), true, value).with_parent(self.id);
        if self.watching.get() {
            field.watch(true);
        }
        let id = field.id();

        let children: Weak<RefCell<Vec<Child>>> = Rc::downgrade(&self.children);
        let mirror = self.value.clone();
        let sync = field.value_cell().watch(move |_, _| {
            if let Some(children) = children.upgrade() {
                if let Ok(children) = children.try_borrow() {
                    mirror.set(snapshot(&children));
                }
            }
        });

        self.children.borrow_mut().push(Child { field, sync });
        id
    }

    fn sync(&self) -> bool {
        let current = snapshot(&self.children.borrow());
        self.value.set(current)
    }
}

impl Drop for ListField {
    fn drop(&mut self) {
        if let Some(disposer) = self.watcher.get_mut().take() {
            disposer.dispose();
        }
    }
}

impl std::fmt::Debug for ListField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListField")
            .field("id", &self.id)
            .field("value", &self.value.get())
            .field("verdict", &self.verdict.get())
            .finish()
    }
}

fn snapshot(children: &[Child]) -> Value {
    Value::Array(children.iter().map(|c| c.field.value()).collect())
}

fn evaluate(children: &[Child], bounds: Bounds) -> Verdict {
    // every child is validated, not just up to the first failure
    let all_valid = children
        .iter()
        .map(|c| c.field.validate())
        .fold(true, |acc, ok| acc && ok);

    let count = children.len();
    if count == 0 && bounds.required {
        return Verdict::Invalid(Rule::Required);
    }
    if !all_valid {
        return Verdict::Invalid(Rule::Type);
    }
    if bounds.min.is_some_and(|min| count < min) {
        return Verdict::Invalid(Rule::Min);
    }
    if bounds.max.is_some_and(|max| count > max) {
        return Verdict::Invalid(Rule::Max);
    }
    Verdict::Valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn list(def: FieldDefinition) -> ListField {
        ListField::from_definition(&def)
    }

    #[test]
    fn test_empty_required_list() {
        let l = list(FieldDefinition::new("list").required(true));
        assert!(!l.validate());
        assert_eq!(l.msg(), "required");
    }

    #[test]
    fn test_min_implies_required_and_bounds_count() {
        let l = list(FieldDefinition::new("list").min(2).max(3));
        assert!(l.required());
        l.validate();
        assert_eq!(l.msg(), "required");

        let a = l.add(json!("a"));
        l.validate();
        assert_eq!(l.msg(), "min");

        l.add(json!("b"));
        assert!(l.validate());

        l.delete(a);
        l.validate();
        assert_eq!(l.msg(), "min");
    }

    #[test]
    fn test_invalid_child_is_type() {
        let l = list(FieldDefinition::new("list").minlength(3).value(json!(["abcd", "x"])));
        assert_eq!(l.len(), 2);
        assert!(!l.validate());
        assert_eq!(l.msg(), "type");
        let ids = l.child_ids();
        assert_eq!(l.child_verdict(ids[1]), Some(Verdict::Invalid(Rule::MinLength)));
        assert_eq!(l.child_parent(ids[1]), Some(l.id()));

        l.set_child(ids[1], json!("xyz"));
        assert!(l.validate());
        assert_eq!(l.data(), json!(["abcd", "xyz"]));
    }

    #[test]
    fn test_live_validation_follows_add_and_delete() {
        let l = list(FieldDefinition::new("list").max(1));
        l.watch(true);
        l.watch(true);
        assert_eq!(l.value_cell().watcher_count(), 1);

        let a = l.add(json!("one"));
        assert!(l.valid());
        l.add(json!("two"));
        assert_eq!(l.msg(), "max");

        l.delete(a);
        assert!(l.valid());

        l.watch(false);
        assert!(!l.is_watching());
        assert_eq!(l.value_cell().watcher_count(), 0);
    }

    #[test]
    fn test_child_edit_updates_mirror() {
        let l = list(FieldDefinition::new("list"));
        let id = l.add(json!("a"));
        l.set_child(id, json!("b"));
        assert_eq!(l.value(), json!(["b"]));
        assert!(!l.delete(FieldId::new()));
    }
}
