//! Alphabetic and alphanumeric value rules.

use serde::{Deserialize, Serialize};

/// Passes when the value is non-empty and purely alphabetic. Spaces and
/// digits both fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlphaRule;

impl AlphaRule {
    pub fn passes(&self, value: &str) -> bool {
        !value.is_empty() && value.chars().all(|ch| ch.is_ascii_alphabetic())
    }
}

/// Passes when the value is non-empty and purely alphanumeric, no spaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlphanumericRule;

impl AlphanumericRule {
    pub fn passes(&self, value: &str) -> bool {
        !value.is_empty() && value.chars().all(|ch| ch.is_ascii_alphanumeric())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_accepts_letters_only() {
        let rule = AlphaRule;
        assert!(rule.passes("abc"));
        assert!(rule.passes("ABC"));
        assert!(!rule.passes("abc1"));
        assert!(!rule.passes("ab c"));
        assert!(!rule.passes(""));
    }

    #[test]
    fn test_alphanumeric_accepts_letters_and_digits() {
        let rule = AlphanumericRule;
        assert!(rule.passes("abc123"));
        assert!(!rule.passes("abc 123"));
        assert!(!rule.passes("abc-123"));
        assert!(!rule.passes(""));
    }
}
