//! Variable constraint rules for URI templates.
//!
//! A rule is a named, pure predicate over one captured segment value.
//! Rules are constructed once at template-parse time by the
//! [`RuleFactory`](factory::RuleFactory) and shared read-only across all
//! concurrent match operations. Built-ins:
//! - alpha / alphanumeric
//! - between (inclusive or exclusive numeric range)
//! - date (format round-trip)
//! - in / notIn (set membership)
//! - int / numeric
//! - regex (full match)
//! - uuidv4

pub mod alpha;
pub mod between;
pub mod date;
pub mod factory;
pub mod membership;
pub mod numeric;
pub mod pattern;

use std::{fmt, sync::Arc};

pub use alpha::{AlphaRule, AlphanumericRule};
pub use between::BetweenRule;
pub use date::DateRule;
pub use factory::{RuleFactory, RuleFactoryError};
pub use membership::MembershipRule;
pub use numeric::{IntRule, NumericRule};
pub use pattern::{RegexRule, UuidV4Rule};
use serde::{Deserialize, Serialize};

/// One parameter of a rule application, as written in the template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleParam {
    Int(i64),
    Float(f64),
    String(String),
}

impl RuleParam {
    /// Numeric view of the parameter, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RuleParam::Int(value) => Some(*value as f64),
            RuleParam::Float(value) => Some(*value),
            RuleParam::String(_) => None,
        }
    }

    /// String view of the parameter, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RuleParam::String(value) => Some(value),
            _ => None,
        }
    }

    /// Boolean view: the bare words `true`/`false` or the integers 1/0.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RuleParam::String(value) if value.eq_ignore_ascii_case("true") => Some(true),
            RuleParam::String(value) if value.eq_ignore_ascii_case("false") => Some(false),
            RuleParam::Int(1) => Some(true),
            RuleParam::Int(0) => Some(false),
            _ => None,
        }
    }
}

impl fmt::Display for RuleParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleParam::Int(value) => write!(f, "{value}"),
            RuleParam::Float(value) => write!(f, "{value}"),
            RuleParam::String(value) => write!(f, "{value}"),
        }
    }
}

/// A rule application as written in the template: the slug plus its
/// parameters. Kept beside the resolved [`RouteRule`] instances so tries
/// can be compared structurally and rebuilt from a cache archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleApplication {
    pub slug: String,
    #[serde(default)]
    pub params: Vec<RuleParam>,
}

/// Extension point for rules registered beyond the built-in set.
///
/// Implementations must be pure and stateless: `passes` is called
/// concurrently from every in-flight match.
pub trait CustomRule: fmt::Debug + Send + Sync {
    /// The slug this rule was registered under.
    fn slug(&self) -> &str;

    /// Whether the captured value satisfies the rule.
    fn passes(&self, value: &str) -> bool;
}

/// The closed set of constraint rules, plus an escape hatch for
/// factory-registered extensions. Each variant is an immutable predicate;
/// dispatch is a plain `match`, with no per-request construction.
#[derive(Debug, Clone)]
pub enum RouteRule {
    Alpha(AlphaRule),
    Alphanumeric(AlphanumericRule),
    Between(BetweenRule),
    Date(DateRule),
    In(MembershipRule),
    NotIn(MembershipRule),
    Int(IntRule),
    Numeric(NumericRule),
    Regex(RegexRule),
    UuidV4(UuidV4Rule),
    Custom(Arc<dyn CustomRule>),
}

impl RouteRule {
    /// Evaluate the rule against one captured segment value.
    pub fn passes(&self, value: &str) -> bool {
        match self {
            RouteRule::Alpha(rule) => rule.passes(value),
            RouteRule::Alphanumeric(rule) => rule.passes(value),
            RouteRule::Between(rule) => rule.passes(value),
            RouteRule::Date(rule) => rule.passes(value),
            RouteRule::In(rule) => rule.contains(value),
            RouteRule::NotIn(rule) => !rule.contains(value),
            RouteRule::Int(rule) => rule.passes(value),
            RouteRule::Numeric(rule) => rule.passes(value),
            RouteRule::Regex(rule) => rule.passes(value),
            RouteRule::UuidV4(rule) => rule.passes(value),
            RouteRule::Custom(rule) => rule.passes(value),
        }
    }

    /// The slug the rule answers to.
    pub fn slug(&self) -> &str {
        match self {
            RouteRule::Alpha(_) => "alpha",
            RouteRule::Alphanumeric(_) => "alphanumeric",
            RouteRule::Between(_) => "between",
            RouteRule::Date(_) => "date",
            RouteRule::In(_) => "in",
            RouteRule::NotIn(_) => "notIn",
            RouteRule::Int(_) => "int",
            RouteRule::Numeric(_) => "numeric",
            RouteRule::Regex(_) => "regex",
            RouteRule::UuidV4(_) => "uuidv4",
            RouteRule::Custom(rule) => rule.slug(),
        }
    }
}
