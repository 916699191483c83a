//! Declarative route definition models.
//!
//! These are the serde-facing shapes loaded from YAML/JSON/TOML files.
//! Registration surfaces (builders, attribute scanning) live outside this
//! crate; a definition here is just the data needed to produce one
//! [`Route`] in the compiled [`RouteCollection`].

use serde::{Deserialize, Serialize};

use crate::core::{
    parser::{parse_uri_template, TemplateError},
    route::{MiddlewareBinding, Route, RouteAction, RouteCollection},
    rules::RuleFactory,
};

/// One declarative route definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDefinition {
    /// Path template, e.g. `/users/:{id|int}`.
    pub path: String,
    /// HTTP methods served, e.g. `["GET", "HEAD"]`.
    pub methods: Vec<String>,
    /// Handler descriptor passed through opaquely to the dispatcher.
    pub handler: String,
    /// Optional host template, e.g. `:tenant.example.com`.
    #[serde(default)]
    pub host: Option<String>,
    /// Optional route name for lookup and listing surfaces.
    #[serde(default)]
    pub name: Option<String>,
    /// Restrict the route to secure transports.
    #[serde(default)]
    pub https_only: bool,
    /// Middleware bindings carried on the route.
    #[serde(default)]
    pub middlewares: Vec<MiddlewareBinding>,
}

/// The full routing configuration: the set of route definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingConfig {
    #[serde(default)]
    pub routes: Vec<RouteDefinition>,
}

impl RoutingConfig {
    /// Build the compiled [`RouteCollection`] these definitions describe,
    /// resolving every rule application through `rule_factory`. Fails on
    /// the first malformed template, naming it.
    pub fn build_collection(
        &self,
        rule_factory: &RuleFactory,
    ) -> Result<RouteCollection, TemplateError> {
        let mut collection = RouteCollection::new();
        for definition in &self.routes {
            let template = parse_uri_template(
                &definition.path,
                definition.host.as_deref(),
                definition.https_only,
                rule_factory,
            )?;
            let mut route = Route::new(
                definition.methods.iter().map(String::as_str),
                template,
                RouteAction::new(&definition.handler),
            );
            route.middleware_bindings = definition.middlewares.clone();
            route.name = definition.name.clone();
            collection.add(route);
        }
        Ok(collection)
    }
}
