pub mod loader;
pub mod models;
pub mod validation;

pub use loader::load_routing_config;
pub use models::*;
pub use validation::{RoutingConfigValidator, ValidationError, ValidationResult};
