use std::collections::HashSet;

use crate::{
    config::models::{RouteDefinition, RoutingConfig},
    core::{parser::parse_uri_template, rules::RuleFactory},
};

/// Validation result type alias
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validation error types
#[derive(Debug, thiserror::Error, Clone)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("Invalid template for route '{path}': {message}")]
    InvalidTemplate { path: String, message: String },

    #[error("Route conflict detected: {message}")]
    RouteConflict { message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },
}

/// Routing configuration validator. Walks every definition, accumulating
/// errors so a bad config reports everything wrong with it at once.
pub struct RoutingConfigValidator;

impl RoutingConfigValidator {
    /// Validate the entire routing configuration against the rule set
    /// that will compile it.
    pub fn validate(
        config: &RoutingConfig,
        rule_factory: &RuleFactory,
    ) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if config.routes.is_empty() {
            errors.push(ValidationError::MissingField {
                field: "routes".to_string(),
            });
        }

        for definition in &config.routes {
            if let Err(mut route_errors) = Self::validate_single_route(definition, rule_factory) {
                errors.append(&mut route_errors);
            }
        }

        if let Err(mut conflicts) = Self::check_name_conflicts(&config.routes) {
            errors.append(&mut conflicts);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::ValidationFailed {
                message: Self::format_multiple_errors(errors),
            })
        }
    }

    /// Validate a single route definition
    fn validate_single_route(
        definition: &RouteDefinition,
        rule_factory: &RuleFactory,
    ) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if !definition.path.starts_with('/') {
            errors.push(ValidationError::InvalidField {
                field: format!("route path: {}", definition.path),
                message: "Route paths must start with '/'".to_string(),
            });
        }

        if definition.methods.is_empty() {
            errors.push(ValidationError::MissingField {
                field: format!("methods for route '{}'", definition.path),
            });
        }
        for method in &definition.methods {
            if method.trim().is_empty() {
                errors.push(ValidationError::InvalidField {
                    field: format!("methods for route '{}'", definition.path),
                    message: "HTTP methods must be non-empty".to_string(),
                });
            }
        }

        if definition.handler.trim().is_empty() {
            errors.push(ValidationError::MissingField {
                field: format!("handler for route '{}'", definition.path),
            });
        }

        if let Err(error) = parse_uri_template(
            &definition.path,
            definition.host.as_deref(),
            definition.https_only,
            rule_factory,
        ) {
            errors.push(ValidationError::InvalidTemplate {
                path: definition.path.clone(),
                message: error.to_string(),
            });
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Route names are a lookup key; duplicates would shadow each other.
    fn check_name_conflicts(routes: &[RouteDefinition]) -> Result<(), Vec<ValidationError>> {
        let mut seen = HashSet::new();
        let mut errors = Vec::new();

        for definition in routes {
            if let Some(name) = &definition.name
                && !seen.insert(name.as_str())
            {
                errors.push(ValidationError::RouteConflict {
                    message: format!("route name '{name}' is registered more than once"),
                });
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Format multiple validation errors into a single message
    fn format_multiple_errors(errors: Vec<ValidationError>) -> String {
        let formatted: Vec<String> = errors
            .iter()
            .enumerate()
            .map(|(index, error)| format!("{}. {}", index + 1, error))
            .collect();
        format!(
            "Found {} validation error(s):\n{}",
            formatted.len(),
            formatted.join("\n")
        )
    }
}
