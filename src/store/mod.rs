//! Generic Store
//!
//! A named map of [`ReactiveCell`]s holding JSON values. Reads traverse dotted
//! paths (`"meta.title"`, `"entries.0.type"`), writes go through optional
//! per-key setters, and watches return disposers that `stop()` can tear down
//! in bulk.
//!
//! ## Key policies
//!
//! - **Closed**: the key set is fixed at construction. Raw writes to unknown
//!   keys are dropped.
//! - **Open**: `set` on a new key creates its cell.
//!
//! Keys are never removed. `stop()` detaches watchers, not data.

pub mod settings;

pub use settings::{settings_store, SETTINGS_KEYS};

use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use tracing::{debug, trace};

use crate::reactive::{Disposer, ReactiveCell};

/// Setter hook for one key.
///
/// Receives the proposed value and returns the raw writes to perform, or
/// `None` to reject the value and keep the previous state.
pub type Setter = Box<dyn Fn(&Value) -> Option<Vec<(String, Value)>>>;

/// Whether `set` may introduce new keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPolicy {
    Closed,
    Open,
}

/// Options for [`Store::watch`]
#[derive(Debug, Clone, Copy, Default)]
pub struct WatchOptions {
    /// Run the callback once right away with the current values
    pub immediate: bool,
}

impl WatchOptions {
    pub fn immediate() -> Self {
        Self { immediate: true }
    }
}

/// Named map of reactive cells
pub struct Store {
    name: String,
    policy: KeyPolicy,
    cells: RefCell<BTreeMap<String, ReactiveCell<Value>>>,
    setters: HashMap<String, Setter>,
    watches: Rc<RefCell<BTreeMap<u64, Disposer>>>,
    next_watch: Cell<u64>,
}

impl Store {
    /// Store whose key set is fixed by `defaults`
    pub fn closed<K: Into<String>>(
        name: impl Into<String>,
        defaults: impl IntoIterator<Item = (K, Value)>,
    ) -> Self {
        let cells = defaults
            .into_iter()
            .map(|(k, v)| (k.into(), ReactiveCell::new(v)))
            .collect();
        Self {
            name: name.into(),
            policy: KeyPolicy::Closed,
            cells: RefCell::new(cells),
            setters: HashMap::new(),
            watches: Rc::new(RefCell::new(BTreeMap::new())),
            next_watch: Cell::new(0),
        }
    }

    /// Store that accepts arbitrary keys
    pub fn open(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            policy: KeyPolicy::Open,
            cells: RefCell::new(BTreeMap::new()),
            setters: HashMap::new(),
            watches: Rc::new(RefCell::new(BTreeMap::new())),
            next_watch: Cell::new(0),
        }
    }

    /// Register a setter for `key`
    pub fn with_setter(
        mut self,
        key: impl Into<String>,
        setter: impl Fn(&Value) -> Option<Vec<(String, Value)>> + 'static,
    ) -> Self {
        self.setters.insert(key.into(), Box::new(setter));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> KeyPolicy {
        self.policy
    }

    /// All keys currently present, sorted
    pub fn keys(&self) -> Vec<String> {
        self.cells.borrow().keys().cloned().collect()
    }

    /// Read a dotted path. `None` when the root or any segment is missing.
    pub fn get(&self, path: &str) -> Option<Value> {
        let mut segments = path.split('.');
        let root = segments.next()?;
        let cell = self.cells.borrow().get(root).cloned()?;
        cell.with(|value| {
            let mut current = value;
            for segment in segments {
                current = descend(current, segment)?;
            }
            Some(current.clone())
        })
    }

    /// Read a dotted path as a string
    pub fn get_str(&self, path: &str) -> Option<String> {
        self.get(path).and_then(|v| v.as_str().map(String::from))
    }

    /// Whether the path resolves to a non-null value
    pub fn has(&self, path: &str) -> bool {
        self.get(path).map(|v| !v.is_null()).unwrap_or(false)
    }

    /// Whether the root key exists at all. Once true, always true.
    pub fn has_key(&self, key: &str) -> bool {
        self.cells.borrow().contains_key(key)
    }

    /// Whether the path resolves to exactly `expected`
    pub fn is(&self, path: &str, expected: &Value) -> bool {
        self.get(path).as_ref() == Some(expected)
    }

    /// Absent, null, empty string, empty array or empty object
    pub fn is_empty(&self, path: &str) -> bool {
        match self.get(path) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(Value::Array(a)) => a.is_empty(),
            Some(Value::Object(o)) => o.is_empty(),
            Some(_) => false,
        }
    }

    /// Write a value, routing through the key's setter when one exists.
    ///
    /// Returns `false` when a setter rejected the value or a closed store
    /// does not know the key. Rejections are not errors.
    pub fn set(&self, key: &str, value: Value) -> bool {
        if let Some(setter) = self.setters.get(key) {
            return match setter(&value) {
                Some(writes) => {
                    for (k, v) in writes {
                        self.write(&k, v);
                    }
                    true
                }
                None => {
                    debug!(store = %self.name, key, "setter rejected value, keeping previous");
                    false
                }
            };
        }
        self.write(key, value)
    }

    /// Replace the whole content with an object's entries.
    ///
    /// Existing keys missing from `object` are reset to null so a newer
    /// document never inherits leftovers from an older one.
    pub fn replace_all(&self, object: &serde_json::Map<String, Value>) {
        for key in self.keys() {
            if !object.contains_key(&key) {
                self.write(&key, Value::Null);
            }
        }
        for (key, value) in object {
            self.set(key, value.clone());
        }
    }

    /// Watch one or more keys. The callback receives the current values of
    /// all watched keys, in the order given; a key a closed store does not
    /// know reads as null.
    pub fn watch(
        &self,
        keys: &[&str],
        callback: impl Fn(&[Value]) + 'static,
        options: WatchOptions,
    ) -> Disposer {
        let cells: Rc<Vec<Option<ReactiveCell<Value>>>> =
            Rc::new(keys.iter().map(|key| self.cell_for_watch(key)).collect());
        let callback: Rc<dyn Fn(&[Value])> = Rc::new(callback);

        let disposers = cells
            .iter()
            .flatten()
            .map(|cell| {
                let cells = Rc::clone(&cells);
                let callback = Rc::clone(&callback);
                cell.watch(move |_, _| callback(&current(&cells)))
            })
            .collect();

        if options.immediate {
            callback(&current(&cells));
        }

        let id = self.next_watch.get();
        self.next_watch.set(id + 1);
        let inner = Disposer::combine(disposers);
        self.watches.borrow_mut().insert(id, inner.clone());
        trace!(store = %self.name, ?keys, "watch installed");

        let watches = Rc::downgrade(&self.watches);
        Disposer::new(move || {
            inner.dispose();
            if let Some(watches) = watches.upgrade() {
                watches.borrow_mut().remove(&id);
            }
        })
    }

    /// Dispose every watch installed through this store
    pub fn stop(&self) {
        let watches = std::mem::take(&mut *self.watches.borrow_mut());
        trace!(store = %self.name, count = watches.len(), "stopping watchers");
        for disposer in watches.into_values() {
            disposer.dispose();
        }
    }

    /// Number of watches neither disposed nor stopped
    pub fn watch_count(&self) -> usize {
        self.watches.borrow().len()
    }

    /// The underlying cell for a root key
    pub fn ref_cell(&self, key: &str) -> Option<ReactiveCell<Value>> {
        self.cells.borrow().get(key).cloned()
    }

    /// All keys and values as one JSON object
    pub fn snapshot(&self) -> Value {
        let cells = self.cells.borrow();
        Value::Object(cells.iter().map(|(k, c)| (k.clone(), c.get())).collect())
    }

    fn write(&self, key: &str, value: Value) -> bool {
        let existing = self.cells.borrow().get(key).cloned();
        match existing {
            Some(cell) => {
                cell.set(value);
                true
            }
            None if self.policy == KeyPolicy::Open => {
                self.cells
                    .borrow_mut()
                    .insert(key.to_string(), ReactiveCell::new(value));
                true
            }
            None => {
                debug!(store = %self.name, key, "ignoring write to unknown key on closed store");
                false
            }
        }
    }

    fn cell_for_watch(&self, key: &str) -> Option<ReactiveCell<Value>> {
        if let Some(cell) = self.ref_cell(key) {
            return Some(cell);
        }
        match self.policy {
            KeyPolicy::Open => {
                let cell = ReactiveCell::new(Value::Null);
                self.cells
                    .borrow_mut()
                    .insert(key.to_string(), cell.clone());
                Some(cell)
            }
            KeyPolicy::Closed => {
                debug!(store = %self.name, key, "cannot watch unknown key on closed store");
                None
            }
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .field("keys", &self.keys())
            .finish()
    }
}

fn current(cells: &[Option<ReactiveCell<Value>>]) -> Vec<Value> {
    cells
        .iter()
        .map(|cell| cell.as_ref().map(ReactiveCell::get).unwrap_or(Value::Null))
        .collect()
}

/// One step of dotted-path traversal
pub(crate) fn descend<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    fn page_store() -> Store {
        let store = Store::open("page");
        store.set("meta", json!({ "title": "Home", "tags": ["a", "b"] }));
        store.set("type", json!("page"));
        store
    }

    #[test]
    fn test_dotted_get() {
        let store = page_store();
        assert_eq!(store.get("meta.title"), Some(json!("Home")));
        assert_eq!(store.get("meta.tags.1"), Some(json!("b")));
        assert_eq!(store.get("meta.missing"), None);
        assert_eq!(store.get("nothing.here"), None);
    }

    #[test]
    fn test_predicates() {
        let store = page_store();
        store.set("empty", json!(""));
        assert!(store.has("meta.title"));
        assert!(!store.has("meta.nope"));
        assert!(store.is("type", &json!("page")));
        assert!(store.is_empty("empty"));
        assert!(store.is_empty("absent"));
        assert!(!store.is_empty("meta.tags"));
    }

    #[test]
    fn test_closed_store_ignores_new_keys() {
        let store = Store::closed("settings", [("title", json!("Site"))]);
        assert!(!store.set("other", json!(1)));
        assert!(!store.has_key("other"));
        assert!(store.set("title", json!("New")));
        assert_eq!(store.get_str("title").as_deref(), Some("New"));
    }

    #[test]
    fn test_setter_rejection_keeps_previous() {
        let store = Store::closed("s", [("count", json!(1))]).with_setter("count", |v| {
            v.as_i64()
                .filter(|n| *n >= 0)
                .map(|n| vec![("count".to_string(), json!(n))])
        });
        assert!(!store.set("count", json!(-4)));
        assert_eq!(store.get("count"), Some(json!(1)));
        assert!(store.set("count", json!(7)));
        assert_eq!(store.get("count"), Some(json!(7)));
    }

    #[test]
    fn test_watch_multiple_keys_and_stop() {
        let store = Store::open("s");
        store.set("a", json!(1));
        store.set("b", json!(2));

        let last = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&last);
        let _d = store.watch(
            &["a", "b"],
            move |values| *sink.borrow_mut() = values.to_vec(),
            WatchOptions::immediate(),
        );
        assert_eq!(*last.borrow(), vec![json!(1), json!(2)]);

        store.set("b", json!(3));
        assert_eq!(*last.borrow(), vec![json!(1), json!(3)]);

        store.stop();
        store.set("a", json!(9));
        assert_eq!(*last.borrow(), vec![json!(1), json!(3)]);
        assert_eq!(store.watch_count(), 0);
    }

    #[test]
    fn test_watches_accumulate() {
        let store = Store::open("s");
        let hits = Rc::new(Cell::new(0));
        for _ in 0..3 {
            let hits = Rc::clone(&hits);
            let _ = store.watch(&["x"], move |_| hits.set(hits.get() + 1), WatchOptions::default());
        }
        store.set("x", json!(true));
        assert_eq!(hits.get(), 3);
        assert_eq!(store.watch_count(), 3);
    }

    #[test]
    fn test_disposed_watches_leave_the_store() {
        let store = Store::open("s");
        let hits = Rc::new(Cell::new(0));
        for _ in 0..100 {
            let hits = Rc::clone(&hits);
            store
                .watch(&["x"], move |_| hits.set(hits.get() + 1), WatchOptions::default())
                .dispose();
        }
        assert_eq!(store.watch_count(), 0);

        let kept = store.watch(&["x"], |_| {}, WatchOptions::default());
        let gone = store.watch(&["x"], |_| {}, WatchOptions::default());
        gone.dispose();
        gone.dispose();
        assert_eq!(store.watch_count(), 1);

        store.set("x", json!(1));
        assert_eq!(hits.get(), 0);
        store.stop();
        kept.dispose();
        assert_eq!(store.watch_count(), 0);
    }

    #[test]
    fn test_unknown_keys_keep_their_position() {
        let store = Store::closed("s", [("a", json!(1)), ("c", json!(3))]);
        let last = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&last);
        let _d = store.watch(
            &["a", "b", "c"],
            move |values| *sink.borrow_mut() = values.to_vec(),
            WatchOptions::immediate(),
        );
        assert_eq!(*last.borrow(), vec![json!(1), Value::Null, json!(3)]);

        store.set("c", json!(4));
        assert_eq!(*last.borrow(), vec![json!(1), Value::Null, json!(4)]);
        assert!(!store.has_key("b"));
    }

    #[test]
    fn test_replace_all_clears_missing_keys() {
        let store = page_store();
        let next = json!({ "type": "page", "fields": {} });
        store.replace_all(next.as_object().unwrap());
        assert!(!store.has("meta"));
        assert!(store.has_key("meta"));
        assert!(store.has("fields"));
    }

    #[test]
    fn test_ref_cell_is_shared() {
        let store = page_store();
        let cell = store.ref_cell("type").unwrap();
        cell.set(json!("file"));
        assert!(store.is("type", &json!("file")));
    }
}
