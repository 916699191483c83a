pub mod archive;
pub mod compiler;
pub mod factory;
pub mod lexer;
pub mod matcher;
pub mod parser;
pub mod route;
pub mod rules;
pub mod template;
pub mod trie;

pub use compiler::{CompileError, TrieCompiler};
pub use factory::{TrieFactory, TrieFactoryError};
pub use matcher::{MatchResult, RouteMatch, TrieRouteMatcher, UriScheme};
pub use parser::{parse_uri_template, TemplateError, UriTemplateParser};
pub use route::{MiddlewareBinding, Route, RouteAction, RouteCollection};
pub use rules::{RouteRule, RuleFactory};
pub use template::{RouteVariable, Segment, UriTemplate};
pub use trie::RouteTrie;
