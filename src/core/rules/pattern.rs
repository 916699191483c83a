//! Pattern-shaped rules: arbitrary regex and canonical UUIDv4 text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Canonical UUIDv4 text: hyphenated groups, version nibble 4, RFC 4122
/// variant nibble.
static UUID_V4_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-4[0-9a-fA-F]{3}-[89abAB][0-9a-fA-F]{3}-[0-9a-fA-F]{12}$",
    )
    .expect("valid regex")
});

/// Passes when the value fully matches the configured pattern. The
/// pattern is compiled once, anchored at both ends.
#[derive(Debug, Clone)]
pub struct RegexRule {
    pub pattern: String,
    regex: Regex,
}

impl RegexRule {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn passes(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// Passes when the value is canonical UUIDv4 text, with optional paired
/// braces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UuidV4Rule;

impl UuidV4Rule {
    pub fn passes(&self, value: &str) -> bool {
        let unwrapped = match (value.starts_with('{'), value.ends_with('}')) {
            (true, true) if value.len() >= 2 => &value[1..value.len() - 1],
            (false, false) => value,
            _ => return false,
        };
        UUID_V4_PATTERN.is_match(unwrapped)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_regex_full_match_only() {
        let rule = RegexRule::new("[a-z]{3}").expect("valid pattern");
        assert!(rule.passes("abc"));
        assert!(!rule.passes("abcd"));
        assert!(!rule.passes("1abc"));
    }

    #[test]
    fn test_regex_rejects_invalid_pattern() {
        assert!(RegexRule::new("(unclosed").is_err());
    }

    #[test]
    fn test_uuidv4_accepts_generated_uuids() {
        let rule = UuidV4Rule;
        for _ in 0..16 {
            let id = Uuid::new_v4();
            assert!(rule.passes(&id.to_string()));
            assert!(rule.passes(&format!("{{{id}}}")));
        }
    }

    #[test]
    fn test_uuidv4_rejects_other_versions_and_noise() {
        let rule = UuidV4Rule;
        // Version nibble is 1, not 4.
        assert!(!rule.passes("a9f9b2b2-1c3d-11ee-be56-0242ac120002"));
        assert!(!rule.passes("not-a-uuid"));
        assert!(!rule.passes("{a9f9b2b2-1c3d-4abc-8e56-0242ac120002"));
        assert!(!rule.passes(""));
    }

    #[test]
    fn test_uuidv4_uppercase_is_accepted() {
        let rule = UuidV4Rule;
        let id = Uuid::new_v4().to_string().to_uppercase();
        assert!(rule.passes(&id));
    }
}
