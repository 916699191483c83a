//! Set membership rules (`in` and its complement `notIn`).

use serde::{Deserialize, Serialize};

use super::RuleParam;

/// Strict membership in a fixed value set. String parameters compare by
/// equality; numeric parameters require the captured value to parse as
/// the same number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipRule {
    pub values: Vec<RuleParam>,
}

impl MembershipRule {
    pub fn new(values: Vec<RuleParam>) -> Self {
        Self { values }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|candidate| match candidate {
            RuleParam::String(expected) => expected == value,
            RuleParam::Int(expected) => value.parse::<i64>() == Ok(*expected),
            RuleParam::Float(expected) => value.parse::<f64>() == Ok(*expected),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_membership() {
        let rule = MembershipRule::new(vec![
            RuleParam::String("draft".to_string()),
            RuleParam::String("published".to_string()),
        ]);
        assert!(rule.contains("draft"));
        assert!(rule.contains("published"));
        assert!(!rule.contains("archived"));
        assert!(!rule.contains("Draft"));
    }

    #[test]
    fn test_numeric_membership() {
        let rule = MembershipRule::new(vec![RuleParam::Int(1), RuleParam::Int(2)]);
        assert!(rule.contains("1"));
        assert!(rule.contains("2"));
        assert!(!rule.contains("3"));
        assert!(!rule.contains("one"));
    }
}
