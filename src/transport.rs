//! Transport seam
//!
//! HTTP, routing and language negotiation live outside this crate. The loader
//! and the form only ever talk to a [`Transport`].

use async_trait::async_trait;
use serde_json::Value;
use std::rc::Rc;

use crate::error::Result;
use crate::store::settings::normalize_language;

/// The external request collaborator.
///
/// Single-threaded: futures are not required to be `Send`.
#[async_trait(?Send)]
pub trait Transport {
    /// Issue a request and return the decoded JSON body
    async fn request(&self, path: &str, params: &Value) -> Result<Value>;

    /// Language currently selected by the host application
    fn current_language(&self) -> Option<String> {
        None
    }

    /// Whether the content API serves `code`
    fn is_valid_language(&self, code: &str) -> bool {
        normalize_language(code).is_some()
    }
}

#[async_trait(?Send)]
impl<T: Transport + ?Sized> Transport for Rc<T> {
    async fn request(&self, path: &str, params: &Value) -> Result<Value> {
        (**self).request(path, params).await
    }

    fn current_language(&self) -> Option<String> {
        (**self).current_language()
    }

    fn is_valid_language(&self, code: &str) -> bool {
        (**self).is_valid_language(code)
    }
}
