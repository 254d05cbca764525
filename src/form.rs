//! Form Aggregate
//!
//! Owns one [`Field`] per definition and derives the form's validity from the
//! fields' verdict cells. In [`Mode::Live`] every field watches its own value;
//! in [`Mode::OnSubmit`] verdicts only change when `validate()` runs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::{Cell, Ref, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::fields::{Field, FieldDefinition, FieldId, Verdict};
use crate::reactive::{Disposer, ReactiveCell};
use crate::registry::TypeRegistry;
use crate::transport::Transport;

/// `errno` reported when client-side validation blocks a submit
pub const ERRNO_VALIDATION_FAILED: i64 = 100;

/// When fields validate themselves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Every value change re-validates its field
    Live,
    /// Verdicts change on `validate()` / `submit()` only
    #[default]
    OnSubmit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOptions {
    pub validate: bool,
    pub reset: bool,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            validate: true,
            reset: true,
        }
    }
}

/// Response envelope of a submit.
///
/// `errno`: 0 success, 1-99 fatal, 100 and above non-fatal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmitResult {
    #[serde(default)]
    pub ok: bool,

    #[serde(default)]
    pub errno: i64,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SubmitResult {
    pub fn validation_failed() -> Self {
        Self {
            ok: false,
            errno: ERRNO_VALIDATION_FAILED,
            extra: Map::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.ok && self.errno == 0
    }

    pub fn is_fatal(&self) -> bool {
        (1..100).contains(&self.errno)
    }
}

pub struct Form {
    registry: TypeRegistry,
    definitions: BTreeMap<String, FieldDefinition>,
    fields: RefCell<BTreeMap<String, Field>>,
    mode: Cell<Mode>,
    valid: ReactiveCell<bool>,
    processing: ReactiveCell<bool>,
    aggregate: RefCell<Vec<Disposer>>,
}

impl Form {
    /// Build a form with fields resolved through `registry`
    pub fn new(definitions: BTreeMap<String, FieldDefinition>, registry: TypeRegistry) -> Self {
        let form = Self {
            registry,
            definitions,
            fields: RefCell::new(BTreeMap::new()),
            mode: Cell::new(Mode::default()),
            valid: ReactiveCell::new(true),
            processing: ReactiveCell::new(false),
            aggregate: RefCell::new(Vec::new()),
        };
        form.build();
        form
    }

    /// Build from a JSON object of name → definition
    pub fn from_value(definitions: &Value, registry: TypeRegistry) -> Result<Self> {
        let definitions: BTreeMap<String, FieldDefinition> =
            serde_json::from_value(definitions.clone())?;
        Ok(Self::new(definitions, registry))
    }

    pub fn with_mode(self, mode: Mode) -> Self {
        self.set_mode(mode);
        self
    }

    pub fn definitions(&self) -> &BTreeMap<String, FieldDefinition> {
        &self.definitions
    }

    pub fn names(&self) -> Vec<String> {
        self.fields.borrow().keys().cloned().collect()
    }

    /// Borrow a field by name
    pub fn field(&self, name: &str) -> Option<Ref<'_, Field>> {
        Ref::filter_map(self.fields.borrow(), |fields| fields.get(name)).ok()
    }

    /// Name of the field carrying `id`
    pub fn field_name(&self, id: FieldId) -> Option<String> {
        self.fields
            .borrow()
            .iter()
            .find(|(_, field)| field.id() == id)
            .map(|(name, _)| name.clone())
    }

    pub fn value(&self, name: &str) -> Option<Value> {
        self.field(name).map(|f| f.value())
    }

    /// Write a field value; unknown names are ignored
    pub fn set_value(&self, name: &str, value: Value) -> bool {
        let fields = self.fields.borrow();
        match fields.get(name) {
            Some(field) => field.set_value(value),
            None => {
                debug!(field = name, "write to unknown form field ignored");
                false
            }
        }
    }

    pub fn msg(&self, name: &str) -> Option<&'static str> {
        self.field(name).map(|f| f.msg())
    }

    pub fn mode(&self) -> Mode {
        self.mode.get()
    }

    /// Switch watchers on or off for every field
    pub fn set_mode(&self, mode: Mode) {
        self.mode.set(mode);
        let live = mode == Mode::Live;
        for field in self.fields.borrow().values() {
            field.watch(live);
        }
        debug!(?mode, "form mode set");
    }

    /// Validate every field; no short-circuit so each verdict is current
    pub fn validate(&self) -> bool {
        let results: Vec<bool> = self
            .fields
            .borrow()
            .values()
            .map(Field::validate)
            .collect();
        results.into_iter().all(|ok| ok)
    }

    /// Derived validity of all fields
    pub fn valid(&self) -> bool {
        self.valid.get()
    }

    pub fn valid_cell(&self) -> ReactiveCell<bool> {
        self.valid.clone()
    }

    pub fn processing(&self) -> bool {
        self.processing.get()
    }

    pub fn processing_cell(&self) -> ReactiveCell<bool> {
        self.processing.clone()
    }

    /// Submitted body: field name → coerced data
    pub fn data(&self) -> Value {
        Value::Object(
            self.fields
                .borrow()
                .iter()
                .map(|(name, field)| (name.clone(), field.data()))
                .collect(),
        )
    }

    /// Stop every watcher, rebuild all fields from their definitions and
    /// restore the current mode
    pub fn reset(&self) {
        self.teardown();
        self.build();
        debug!(fields = self.definitions.len(), "form reset");
    }

    /// Validate (optionally), send the data and reset (optionally)
    pub async fn submit<T: Transport + ?Sized>(
        &self,
        transport: &T,
        path: &str,
        options: SubmitOptions,
    ) -> Result<SubmitResult> {
        if options.validate && !self.validate() {
            info!(path, "submit blocked by validation");
            return Ok(SubmitResult::validation_failed());
        }

        let body = self.data();
        info!(path, "submitting form");
        self.processing.set(true);
        let response = transport.request(path, &body).await;
        self.processing.set(false);

        let response = response?;
        if !response.is_object() {
            return Err(Error::InvalidResponse {
                url: path.to_string(),
                message: "submit response is not an object".to_string(),
            });
        }
        let result: SubmitResult = serde_json::from_value(response)?;
        info!(path, ok = result.ok, errno = result.errno, "form submitted");

        if options.reset {
            self.reset();
        }
        Ok(result)
    }

    fn build(&self) {
        let fields: BTreeMap<String, Field> = self
            .definitions
            .iter()
            .map(|(name, def)| (name.clone(), Field::from_definition(def, &self.registry)))
            .collect();

        let cells: Rc<Vec<ReactiveCell<Verdict>>> =
            Rc::new(fields.values().map(Field::verdict_cell).collect());
        let disposers = cells
            .iter()
            .map(|cell| {
                let cells = Rc::clone(&cells);
                let valid = self.valid.clone();
                cell.watch(move |_, _| {
                    valid.set(all_valid(&cells));
                })
            })
            .collect();

        *self.fields.borrow_mut() = fields;
        *self.aggregate.borrow_mut() = disposers;
        self.valid.set(all_valid(&cells));
        self.set_mode(self.mode.get());
    }

    fn teardown(&self) {
        for field in self.fields.borrow().values() {
            field.watch(false);
        }
        for disposer in self.aggregate.borrow_mut().drain(..) {
            disposer.dispose();
        }
    }
}

impl Drop for Form {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for Form {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Form")
            .field("mode", &self.mode.get())
            .field("valid", &self.valid.get())
            .field("fields", &self.fields.borrow())
            .finish()
    }
}

fn all_valid(cells: &[ReactiveCell<Verdict>]) -> bool {
    cells.iter().all(|c| c.with(Verdict::is_valid))
}
