//! Router registry.
//!
//! Routers are plain callbacks keyed by name. The registry is handed to the
//! engine at construction; the engine never looks routers up anywhere else.

use crate::MatchedRule;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A router callback. Called synchronously, once per matched rule per target.
pub type Router = Arc<dyn Fn(&MatchedRule) + Send + Sync>;

#[derive(Clone, Default)]
pub struct RouterRegistry {
    routers: HashMap<String, Router>,
}

impl RouterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<F>(mut self, name: impl Into<String>, router: F) -> Self
    where
        F: Fn(&MatchedRule) + Send + Sync + 'static,
    {
        self.register(name, router);
        self
    }

    /// Register `router` under `name`, replacing any previous router.
    pub fn register<F>(&mut self, name: impl Into<String>, router: F) -> &mut Self
    where
        F: Fn(&MatchedRule) + Send + Sync + 'static,
    {
        self.routers.insert(name.into(), Arc::new(router));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Router> {
        self.routers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.routers.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.routers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.routers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }
}

impl fmt::Debug for RouterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.names().into_iter().map(|name| (name, "<function>"))).finish()
    }
}
