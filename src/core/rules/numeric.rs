//! Integer and numeric value rules.

use serde::{Deserialize, Serialize};

/// Passes when the value is representable as an integer, negatives
/// included. Fractions fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRule;

impl IntRule {
    pub fn passes(&self, value: &str) -> bool {
        value.parse::<i64>().is_ok()
    }
}

/// Passes when the value is a finite numeric string, integer or float.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericRule;

impl NumericRule {
    pub fn passes(&self, value: &str) -> bool {
        value.parse::<f64>().is_ok_and(|number| number.is_finite())
    }
}
