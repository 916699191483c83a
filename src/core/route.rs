//! Routes and the collection handed to the trie compiler.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::template::UriTemplate;

/// Opaque descriptor of what a matched route dispatches to. Dispatch
/// itself lives outside this crate; the matcher only carries the
/// descriptor through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAction {
    pub handler: String,
}

impl RouteAction {
    pub fn new(handler: impl Into<String>) -> Self {
        Self {
            handler: handler.into(),
        }
    }
}

/// A middleware attached to a route, by name plus free-form attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiddlewareBinding {
    pub name: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl MiddlewareBinding {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }
}

/// A registered route: method set, parsed URI template, action
/// descriptor, middleware bindings and an optional name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub http_methods: BTreeSet<String>,
    pub uri_template: UriTemplate,
    pub action: RouteAction,
    #[serde(default)]
    pub middleware_bindings: Vec<MiddlewareBinding>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Route {
    /// Create a route. Methods are normalized to uppercase here so the
    /// matcher never has to case-fold on the hot path.
    pub fn new<I, S>(http_methods: I, uri_template: UriTemplate, action: RouteAction) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let http_methods = http_methods
            .into_iter()
            .map(|method| method.as_ref().to_ascii_uppercase())
            .collect();
        Self {
            http_methods,
            uri_template,
            action,
            middleware_bindings: Vec::new(),
            name: None,
        }
    }
}

/// The compiled output of route registration: the plain set of routes the
/// trie compiler consumes. Insertion order is irrelevant to matching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteCollection {
    routes: Vec<Route>,
}

impl RouteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, route: Route) {
        self.routes.push(route);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl From<Vec<Route>> for RouteCollection {
    fn from(routes: Vec<Route>) -> Self {
        Self { routes }
    }
}

impl FromIterator<Route> for RouteCollection {
    fn from_iter<T: IntoIterator<Item = Route>>(iter: T) -> Self {
        Self {
            routes: iter.into_iter().collect(),
        }
    }
}
