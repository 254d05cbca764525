//! Headless Content Client
//!
//! Typed response models and reactive form validation for headless content
//! APIs.
//!
//! ## Features
//!
//! - **Typed Parsing**: `type`-tagged JSON nodes become a closed [`Model`] graph
//! - **Graceful Fallback**: unknown tags parse as the base model, never fail
//! - **Thumb URLs**: image attributes derived on demand from option chains
//! - **Reactive Validation**: per-field verdicts, live or on-submit
//! - **Stale-Response Guard**: overlapping loads never overwrite newer data
//!
//! ## Architecture
//!
//! ```text
//! Transport ──► Loader ──► Parser ──► Model ──► ReactiveCell<Model>
//!                 │          │
//!                 ▼          ▼
//!              Stores    TypeRegistry ◄── Form ──► Field ──► ReactiveCell<Verdict>
//! ```

pub mod config;
pub mod error;
pub mod fields;
pub mod form;
pub mod loader;
pub mod models;
pub mod parser;
pub mod reactive;
pub mod registry;
pub mod store;
pub mod thumb;
pub mod transport;

pub use config::ClientConfig;
pub use error::{Error, Result};
pub use fields::{Field, FieldDefinition, FieldId, Rule, Verdict};
pub use form::{Form, Mode, SubmitOptions, SubmitResult};
pub use loader::{Loader, Resource, Stores};
pub use models::{HasChildren, HasFields, Model, StrOptions};
pub use parser::{Parsed, Parser};
pub use reactive::{Disposer, ReactiveCell};
pub use registry::{FieldKind, ModelKind, TypeRegistry};
pub use store::{Store, WatchOptions};
pub use thumb::{ImageAttributes, ImageSource, ThumbOptions};
pub use transport::Transport;
