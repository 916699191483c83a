//! Dendrite - a trie-based HTTP route matching engine.
//!
//! Dendrite compiles declarative URI templates (with inline
//! variable-constraint syntax) into one shared prefix trie, and matches
//! incoming `(method, host, path)` triples against it in
//! O(path-segment-count) rather than O(route-count).
//!
//! # Features
//! - URI template mini-language: `:name`, `:name=default`,
//!   `:{name|rule1|rule2(p1,p2)}`, optional trailing groups `[ ... ]`
//! - Built-in constraint rules (alpha, alphanumeric, between, date, in,
//!   notIn, int, numeric, regex, uuidv4) plus custom rule registration
//! - One shared trie merged from independently compiled routes, with
//!   compile-time ambiguity rejection
//! - Literal-over-variable matching, per-depth, with rule evaluation in
//!   declaration order
//! - Host-restricted routes via lazily evaluated nested host tries
//! - Typed match outcomes: matched, not found, method not allowed (with
//!   the `Allow` union), host mismatch, HTTPS required
//! - Pluggable trie cache port with file and in-memory adapters speaking
//!   a versioned flat archive format
//! - Declarative route definitions loadable from YAML/JSON/TOML, with
//!   validation
//! - Structured tracing via `tracing`
//!
//! # Quick Example
//! ```no_run
//! use std::sync::Arc;
//!
//! use dendrite::{
//!     MatchResult, RouteCollection, RuleFactory, TrieFactory, TrieRouteMatcher,
//!     config::RoutingConfig,
//! };
//!
//! # #[tokio::main] async fn main() -> eyre::Result<()> {
//! let rules = RuleFactory::with_builtins();
//! let config: RoutingConfig =
//!     dendrite::config::load_routing_config("routes.yaml").await?;
//! let routes: RouteCollection = config.build_collection(&rules)?;
//!
//! let trie = TrieFactory::new().create_trie(&routes).await?;
//! let matcher = TrieRouteMatcher::new(trie);
//!
//! match matcher.match_route("GET", "api.example.com", "/users/42") {
//!     MatchResult::Matched(matched) => println!("{}", matched.route.action.handler),
//!     other => println!("no match: {other:?}"),
//! }
//! # Ok(()) }
//! ```
//!
//! # Architecture
//! The crate separates **ports** (traits) from **adapters**
//! (implementations) while keeping the engine inside `core`: lexer →
//! parser → rule factory → trie compiler → matcher. End users should
//! prefer the re-exports documented below instead of reaching into
//! internal modules directly.
//!
//! # Error Handling
//! Registration-time problems (lexing, parsing, unknown rule slugs,
//! compile ambiguity, corrupt caches) are typed errors and fatal to
//! startup. A non-matching request is **not** an error: it is an ordinary
//! [`MatchResult`] value for the caller to translate into an HTTP status.
//!
//! # Concurrency
//! The compiled trie is immutable and shared read-only; matching takes no
//! locks, performs no I/O and is bounded by segment count. Cache
//! collaborators only ever run during compilation.
// Re-export public modules with explicit visibility controls
pub mod config;
pub mod tracing_setup;

// These modules are implementation details and should not be directly used by users
pub mod adapters;
pub mod core;
pub mod ports;

// Re-export the specific types most integrations need
pub use crate::{
    adapters::{FileTrieCache, MemoryTrieCache},
    core::{
        CompileError, MatchResult, MiddlewareBinding, Route, RouteAction, RouteCollection,
        RouteMatch, RouteRule, RouteTrie, RouteVariable, Segment, TemplateError, TrieCompiler,
        TrieFactory, TrieFactoryError, TrieRouteMatcher, UriScheme, UriTemplate, RuleFactory,
        parse_uri_template,
    },
    ports::{CacheError, TrieCache},
};
