//! Registry resolving rule slugs to constructors at template-parse time.

use std::{collections::HashMap, sync::Arc};

use thiserror::Error;

use super::{
    AlphaRule, AlphanumericRule, BetweenRule, DateRule, IntRule, MembershipRule, NumericRule,
    RegexRule, RouteRule, RuleParam, UuidV4Rule,
};

/// Errors raised while resolving a rule application. These surface at
/// route-registration time and are fatal to startup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleFactoryError {
    #[error("no rule factory registered for slug '{slug}'")]
    UnknownSlug { slug: String },

    #[error("invalid parameters for rule '{slug}': {message}")]
    InvalidParams { slug: String, message: String },
}

impl RuleFactoryError {
    fn invalid(slug: &str, message: impl Into<String>) -> Self {
        Self::InvalidParams {
            slug: slug.to_string(),
            message: message.into(),
        }
    }
}

/// A rule constructor: parameters in, resolved rule out.
pub type RuleConstructor =
    Arc<dyn Fn(&[RuleParam]) -> Result<RouteRule, RuleFactoryError> + Send + Sync>;

/// Explicit registry mapping rule slugs to constructors. No ambient
/// global state: the factory is passed to whoever parses templates, and
/// rules are constructed exactly once per template, never per request.
#[derive(Clone)]
pub struct RuleFactory {
    factories: HashMap<String, RuleConstructor>,
}

impl RuleFactory {
    /// An empty registry with no rules at all.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// A registry pre-populated with the built-in rule set.
    pub fn with_builtins() -> Self {
        let mut factory = Self::new();
        factory.register_builtins();
        factory
    }

    /// Register (or replace) the constructor for a slug.
    pub fn register_rule_factory<F>(&mut self, slug: impl Into<String>, constructor: F)
    where
        F: Fn(&[RuleParam]) -> Result<RouteRule, RuleFactoryError> + Send + Sync + 'static,
    {
        self.factories.insert(slug.into(), Arc::new(constructor));
    }

    /// Resolve a rule application into a rule instance.
    pub fn create_rule(
        &self,
        slug: &str,
        params: &[RuleParam],
    ) -> Result<RouteRule, RuleFactoryError> {
        let constructor =
            self.factories
                .get(slug)
                .ok_or_else(|| RuleFactoryError::UnknownSlug {
                    slug: slug.to_string(),
                })?;
        constructor(params)
    }

    /// Whether a constructor is registered for the slug.
    pub fn is_registered(&self, slug: &str) -> bool {
        self.factories.contains_key(slug)
    }

    fn register_builtins(&mut self) {
        self.register_rule_factory("alpha", |params| {
            require_no_params("alpha", params)?;
            Ok(RouteRule::Alpha(AlphaRule))
        });
        self.register_rule_factory("alphanumeric", |params| {
            require_no_params("alphanumeric", params)?;
            Ok(RouteRule::Alphanumeric(AlphanumericRule))
        });
        self.register_rule_factory("int", |params| {
            require_no_params("int", params)?;
            Ok(RouteRule::Int(IntRule))
        });
        self.register_rule_factory("numeric", |params| {
            require_no_params("numeric", params)?;
            Ok(RouteRule::Numeric(NumericRule))
        });
        self.register_rule_factory("uuidv4", |params| {
            require_no_params("uuidv4", params)?;
            Ok(RouteRule::UuidV4(UuidV4Rule))
        });
        self.register_rule_factory("between", |params| {
            if params.len() < 2 || params.len() > 3 {
                return Err(RuleFactoryError::invalid(
                    "between",
                    "expected (min, max) with an optional inclusive flag",
                ));
            }
            let min = numeric_param("between", params, 0)?;
            let max = numeric_param("between", params, 1)?;
            let inclusive = match params.get(2) {
                Some(param) => param.as_bool().ok_or_else(|| {
                    RuleFactoryError::invalid("between", "inclusive flag must be true or false")
                })?,
                None => true,
            };
            Ok(RouteRule::Between(BetweenRule::new(min, max, inclusive)))
        });
        self.register_rule_factory("date", |params| {
            if params.is_empty() {
                return Err(RuleFactoryError::invalid(
                    "date",
                    "expected at least one format",
                ));
            }
            let formats = params
                .iter()
                .map(|param| {
                    param.as_str().map(str::to_string).ok_or_else(|| {
                        RuleFactoryError::invalid("date", "formats must be strings")
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(RouteRule::Date(DateRule::new(formats)))
        });
        self.register_rule_factory("in", |params| {
            if params.is_empty() {
                return Err(RuleFactoryError::invalid(
                    "in",
                    "expected at least one value",
                ));
            }
            Ok(RouteRule::In(MembershipRule::new(params.to_vec())))
        });
        self.register_rule_factory("notIn", |params| {
            if params.is_empty() {
                return Err(RuleFactoryError::invalid(
                    "notIn",
                    "expected at least one value",
                ));
            }
            Ok(RouteRule::NotIn(MembershipRule::new(params.to_vec())))
        });
        self.register_rule_factory("regex", |params| {
            let [param] = params else {
                return Err(RuleFactoryError::invalid(
                    "regex",
                    "expected exactly one pattern",
                ));
            };
            let pattern = param
                .as_str()
                .ok_or_else(|| RuleFactoryError::invalid("regex", "pattern must be a string"))?;
            let rule = RegexRule::new(pattern)
                .map_err(|error| RuleFactoryError::invalid("regex", error.to_string()))?;
            Ok(RouteRule::Regex(rule))
        });
    }
}

impl Default for RuleFactory {
    fn default() -> Self {
        Self::with_builtins()
    }
}

fn require_no_params(slug: &str, params: &[RuleParam]) -> Result<(), RuleFactoryError> {
    if params.is_empty() {
        Ok(())
    } else {
        Err(RuleFactoryError::invalid(slug, "takes no parameters"))
    }
}

fn numeric_param(slug: &str, params: &[RuleParam], index: usize) -> Result<f64, RuleFactoryError> {
    params[index].as_f64().ok_or_else(|| {
        RuleFactoryError::invalid(slug, format!("parameter {} must be numeric", index + 1))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rules::CustomRule;

    #[test]
    fn test_all_builtin_slugs_are_registered() {
        let factory = RuleFactory::with_builtins();
        for slug in [
            "alpha",
            "alphanumeric",
            "between",
            "date",
            "in",
            "notIn",
            "int",
            "numeric",
            "regex",
            "uuidv4",
        ] {
            assert!(factory.is_registered(slug), "missing builtin '{slug}'");
        }
    }

    #[test]
    fn test_unknown_slug_is_an_error() {
        let factory = RuleFactory::with_builtins();
        let err = factory.create_rule("min", &[RuleParam::Int(0)]).unwrap_err();
        assert_eq!(
            err,
            RuleFactoryError::UnknownSlug {
                slug: "min".to_string()
            }
        );
    }

    #[test]
    fn test_between_parameter_validation() {
        let factory = RuleFactory::with_builtins();
        assert!(
            factory
                .create_rule("between", &[RuleParam::Int(1)])
                .is_err()
        );
        assert!(
            factory
                .create_rule(
                    "between",
                    &[
                        RuleParam::Int(1),
                        RuleParam::Int(10),
                        RuleParam::String("maybe".to_string())
                    ]
                )
                .is_err()
        );
        let rule = factory
            .create_rule(
                "between",
                &[
                    RuleParam::Int(1),
                    RuleParam::Int(10),
                    RuleParam::String("false".to_string()),
                ],
            )
            .expect("valid between");
        assert!(!rule.passes("1"));
        assert!(rule.passes("5"));
    }

    #[test]
    fn test_regex_pattern_errors_are_invalid_params() {
        let factory = RuleFactory::with_builtins();
        let err = factory
            .create_rule("regex", &[RuleParam::String("(broken".to_string())])
            .unwrap_err();
        assert!(matches!(err, RuleFactoryError::InvalidParams { .. }));
    }

    #[test]
    fn test_custom_rule_registration() {
        #[derive(Debug)]
        struct EvenRule;

        impl CustomRule for EvenRule {
            fn slug(&self) -> &str {
                "even"
            }

            fn passes(&self, value: &str) -> bool {
                value.parse::<i64>().is_ok_and(|n| n % 2 == 0)
            }
        }

        let mut factory = RuleFactory::with_builtins();
        factory.register_rule_factory("even", |params| {
            require_no_params("even", params)?;
            Ok(RouteRule::Custom(std::sync::Arc::new(EvenRule)))
        });

        let rule = factory.create_rule("even", &[]).expect("registered");
        assert!(rule.passes("4"));
        assert!(!rule.passes("3"));
        assert_eq!(rule.slug(), "even");
    }
}
