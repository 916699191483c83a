//! Parsed URI template data model.
//!
//! A template is an ordered list of segments, each either a literal or a
//! variable. Path templates split on `/`, host templates on `.`; host
//! segments are stored right-to-left (TLD first) so host tries share
//! suffixes the way path tries share prefixes.

use serde::{Deserialize, Serialize};

use super::rules::{RouteRule, RuleApplication, RuleFactory, RuleFactoryError};

/// A variable slot inside a template: the name, the default substituted
/// when an optional segment is absent, and the constraint rules.
///
/// The written rule applications are kept beside the resolved instances:
/// equality and serialization go through `rule_applications`, while
/// matching goes through `rules`. After deserialization the instances are
/// rebuilt with [`RouteVariable::resolve_rules`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteVariable {
    pub name: String,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub rule_applications: Vec<RuleApplication>,
    #[serde(skip)]
    pub rules: Vec<RouteRule>,
}

impl RouteVariable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_value: None,
            rule_applications: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Rebuild the resolved rule instances from the recorded
    /// applications, e.g. after loading from a cache archive.
    pub fn resolve_rules(&mut self, factory: &RuleFactory) -> Result<(), RuleFactoryError> {
        self.rules = self
            .rule_applications
            .iter()
            .map(|application| factory.create_rule(&application.slug, &application.params))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(())
    }
}

// Resolved rule instances are derived state; two variables are the same
// slot when name, default and written applications agree.
impl PartialEq for RouteVariable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.default_value == other.default_value
            && self.rule_applications == other.rule_applications
    }
}

/// One `/`-delimited (or `.`-delimited, for hosts) template chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Segment {
    Literal(String),
    Variable(RouteVariable),
}

impl Segment {
    pub fn literal(value: impl Into<String>) -> Self {
        Segment::Literal(value.into())
    }

    /// The variable inside, if this is a variable segment.
    pub fn as_variable(&self) -> Option<&RouteVariable> {
        match self {
            Segment::Variable(variable) => Some(variable),
            Segment::Literal(_) => None,
        }
    }
}

/// A fully parsed URI template: ordered path segments, optional host
/// segments (right-to-left), and the HTTPS-only flag carried as route
/// metadata into matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UriTemplate {
    pub path_segments: Vec<Segment>,
    #[serde(default)]
    pub host_segments: Option<Vec<Segment>>,
    #[serde(default)]
    pub is_https_only: bool,
}

impl UriTemplate {
    pub fn new(path_segments: Vec<Segment>) -> Self {
        Self {
            path_segments,
            host_segments: None,
            is_https_only: false,
        }
    }

    /// Rebuild rule instances on every variable segment.
    pub fn resolve_rules(&mut self, factory: &RuleFactory) -> Result<(), RuleFactoryError> {
        for segment in self.path_segments.iter_mut() {
            if let Segment::Variable(variable) = segment {
                variable.resolve_rules(factory)?;
            }
        }
        if let Some(host_segments) = self.host_segments.as_mut() {
            for segment in host_segments.iter_mut() {
                if let Segment::Variable(variable) = segment {
                    variable.resolve_rules(factory)?;
                }
            }
        }
        Ok(())
    }
}
