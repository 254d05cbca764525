//! Resource Loader
//!
//! Fetches the logical resources (site, current page, home page) through the
//! [`Transport`], parses the responses and publishes them:
//!
//! - the parsed model goes into a per-resource reactive cell
//! - the raw top-level keys go into a per-resource open [`Store`]
//!
//! Every load mints a fresh token and records it as the latest for its
//! resource. A response is applied only while its token is still the latest,
//! so overlapping loads that resolve out of order never overwrite newer data.

use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, info, trace};
use uuid::Uuid;

use crate::config::ApiConfig;
use crate::error::Result;
use crate::models::Model;
use crate::parser::Parser;
use crate::reactive::ReactiveCell;
use crate::registry::TypeRegistry;
use crate::store::{settings_store, Store};
use crate::transport::Transport;

/// Logical resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Site,
    Page,
    Home,
}

impl Resource {
    pub const ALL: [Resource; 3] = [Resource::Site, Resource::Page, Resource::Home];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Site => "site",
            Resource::Page => "page",
            Resource::Home => "home",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ticket for one in-flight load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    resource: Resource,
    id: Uuid,
}

impl RequestToken {
    pub fn resource(&self) -> Resource {
        self.resource
    }
}

/// The settings store plus one open store per resource
pub struct Stores {
    settings: Store,
    resources: BTreeMap<Resource, Store>,
}

impl Stores {
    pub fn new(is_valid_language: impl Fn(&str) -> bool + 'static) -> Self {
        Self {
            settings: settings_store(is_valid_language),
            resources: Resource::ALL
                .iter()
                .map(|r| (*r, Store::open(r.as_str())))
                .collect(),
        }
    }

    pub fn settings(&self) -> &Store {
        &self.settings
    }

    pub fn resource(&self, resource: Resource) -> &Store {
        // every resource is inserted in `new`
        &self.resources[&resource]
    }

    /// Stop the watchers of every store
    pub fn stop_all(&self) {
        self.settings.stop();
        for store in self.resources.values() {
            store.stop();
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores")
            .field("settings", &self.settings)
            .field("resources", &self.resources)
            .finish()
    }
}

pub struct Loader<T: Transport> {
    transport: Rc<T>,
    registry: TypeRegistry,
    config: ApiConfig,
    stores: Stores,
    latest: RefCell<BTreeMap<Resource, Uuid>>,
    models: BTreeMap<Resource, ReactiveCell<Option<Rc<Model>>>>,
}

impl<T: Transport + 'static> Loader<T> {
    pub fn new(transport: T, registry: TypeRegistry, config: ApiConfig) -> Self {
        let transport = Rc::new(transport);
        let predicate = Rc::clone(&transport);
        let stores = Stores::new(move |code| predicate.is_valid_language(code));

        if let Some(host) = &config.host {
            stores.settings().set("host", json!(host));
        }
        if let Some(lang) = &config.language {
            stores.settings().set("lang", json!(lang));
        }

        Self {
            transport,
            registry,
            config,
            stores,
            latest: RefCell::new(BTreeMap::new()),
            models: Resource::ALL
                .iter()
                .map(|r| (*r, ReactiveCell::new(None)))
                .collect(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn settings(&self) -> &Store {
        self.stores.settings()
    }

    /// Latest committed model of a resource
    pub fn model(&self, resource: Resource) -> Option<Rc<Model>> {
        self.model_cell(resource).get()
    }

    pub fn model_cell(&self, resource: Resource) -> ReactiveCell<Option<Rc<Model>>> {
        self.models[&resource].clone()
    }

    /// Language sent with requests: the settings store, else the transport's
    /// current language. Codes the transport rejects are not sent.
    pub fn language(&self) -> Option<String> {
        self.settings()
            .get_str("lang")
            .or_else(|| self.transport.current_language())
            .filter(|code| self.transport.is_valid_language(code))
    }

    /// Mint a token and make it the latest for its resource
    pub fn begin(&self, resource: Resource) -> RequestToken {
        let token = RequestToken {
            resource,
            id: Uuid::new_v4(),
        };
        self.latest.borrow_mut().insert(resource, token.id);
        token
    }

    pub fn is_current(&self, token: &RequestToken) -> bool {
        self.latest.borrow().get(&token.resource) == Some(&token.id)
    }

    /// Publish a response if `token` is still the latest. Returns whether it
    /// was applied.
    pub fn commit(&self, token: &RequestToken, response: &Value) -> bool {
        if !self.is_current(token) {
            trace!(resource = %token.resource, "discarding superseded response");
            return false;
        }

        let model = match response {
            Value::Object(map) if map.contains_key("type") => {
                Some(Rc::new(Parser::new(&self.registry).create_model(response)))
            }
            _ => None,
        };

        if token.resource == Resource::Site {
            if let Some(title) = model.as_deref().and_then(site_title) {
                self.settings().set("title", json!(title));
            }
        }

        match response.as_object() {
            Some(map) => self.stores.resource(token.resource).replace_all(map),
            None => debug!(resource = %token.resource, "response is not an object, store left as is"),
        }
        self.models[&token.resource].set(model);
        true
    }

    /// Request `path` for `resource` and publish the result unless a newer
    /// load for the same resource started in the meantime
    pub async fn load(&self, resource: Resource, path: &str) -> Result<bool> {
        let token = self.begin(resource);
        let params = match self.language() {
            Some(lang) => json!({ "lang": lang }),
            None => json!({}),
        };

        info!(%resource, path, "loading");
        let response = self.transport.request(path, &params).await?;
        let applied = self.commit(&token, &response);
        if applied {
            info!(%resource, path, "loaded");
        }
        Ok(applied)
    }

    pub async fn load_site(&self) -> Result<bool> {
        let path = self.config.site_path.clone();
        self.load(Resource::Site, &path).await
    }

    pub async fn load_home(&self) -> Result<bool> {
        let path = self.config.home_path.clone();
        self.load(Resource::Home, &path).await
    }

    pub async fn load_page(&self, path: &str) -> Result<bool> {
        self.load(Resource::Page, path).await
    }
}

fn site_title(model: &Model) -> Option<String> {
    match model {
        Model::Site(site) => site.title().map(String::from),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::executor::block_on;

    struct Echo;

    #[async_trait(?Send)]
    impl Transport for Echo {
        async fn request(&self, path: &str, params: &Value) -> Result<Value> {
            Ok(json!({
                "type": "page",
                "meta": { "href": path, "title": path },
                "params": params
            }))
        }

        fn current_language(&self) -> Option<String> {
            Some("de".into())
        }
    }

    fn loader() -> Loader<Echo> {
        Loader::new(Echo, TypeRegistry::new(), ApiConfig::default())
    }

    #[test]
    fn test_load_publishes_model_and_store() {
        let loader = loader();
        assert!(block_on(loader.load_page("/a")).unwrap());

        let model = loader.model(Resource::Page).unwrap();
        assert_eq!(model.link().unwrap().href(), "/a");
        let store = loader.stores().resource(Resource::Page);
        assert_eq!(store.get_str("type").as_deref(), Some("page"));
        assert_eq!(store.get("params.lang"), Some(json!("de")));
    }

    #[test]
    fn test_only_latest_token_commits() {
        let loader = loader();
        let first = loader.begin(Resource::Home);
        let second = loader.begin(Resource::Home);
        let other = loader.begin(Resource::Site);

        assert!(!loader.commit(&first, &json!({ "type": "page" })));
        assert!(loader.model(Resource::Home).is_none());
        assert!(loader.commit(&second, &json!({ "type": "page" })));
        assert!(loader.is_current(&other));
    }

    #[test]
    fn test_settings_language_wins() {
        let loader = Loader::new(
            Echo,
            TypeRegistry::new(),
            ApiConfig {
                language: Some("en".into()),
                ..ApiConfig::default()
            },
        );
        assert_eq!(loader.language().as_deref(), Some("en"));
    }
}
