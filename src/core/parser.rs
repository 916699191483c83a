//! Parser for the URI template mini-language.
//!
//! Consumes the lexer's token stream and produces ordered template
//! segments. The grammar, bit-exact:
//! - `:name` — simple variable, no constraints
//! - `:name=default` — variable with a default substitution
//! - `:{name|rule1|rule2(p1,p2)}` — variable chaining rule applications;
//!   a default may be given inside the braces too (`:{name=default|rule}`)
//! - `[ ... ]` — optional trailing group; every segment inside must be a
//!   defaulted variable
//!
//! Rule applications are resolved immediately through the
//! [`RuleFactory`]: rules exist before the first request ever arrives,
//! and an unknown slug aborts registration.

use thiserror::Error;

use super::{
    lexer::{LexError, NumberValue, Token, TokenKind, TokenStream, UriTemplateLexer},
    rules::{RouteRule, RuleApplication, RuleFactory, RuleFactoryError, RuleParam},
    template::{RouteVariable, Segment, UriTemplate},
};

/// Which kind of template is being parsed; decides the segment separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Path,
    Host,
}

impl TemplateKind {
    fn separator(self) -> char {
        match self {
            TemplateKind::Path => '/',
            TemplateKind::Host => '.',
        }
    }
}

/// Grammar failures. Registration-time, fatal to startup.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    #[error("unexpected {found} at position {position}, expected {expected}")]
    UnexpectedToken {
        expected: String,
        found: String,
        position: usize,
    },

    #[error("unexpected end of template, expected {expected}")]
    UnexpectedEndOfInput { expected: String },

    #[error(transparent)]
    Rule(#[from] RuleFactoryError),

    #[error("unbalanced optional bracket at position {position}")]
    UnbalancedBracket { position: usize },

    #[error("segment '{segment}' mixes literal text with a variable")]
    MixedSegment { segment: String },

    #[error("optional segment ':{name}' must declare a default value")]
    OptionalWithoutDefault { name: String },

    #[error("optional group may not contain the literal segment '{segment}'")]
    OptionalLiteral { segment: String },

    #[error("defaulted variable ':{name}' may only be followed by defaulted variables")]
    NonTrailingOptional { name: String },

    #[error("host variable ':{name}' cannot declare a default value")]
    DefaultInHost { name: String },

    #[error("optional groups are not supported in host templates (position {position})")]
    OptionalInHost { position: usize },
}

/// Template-level failure wrapper naming the offending template.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TemplateError {
    #[error("failed to lex template '{template}': {source}")]
    Lex { template: String, source: LexError },

    #[error("failed to parse template '{template}': {source}")]
    Parse {
        template: String,
        source: ParseError,
    },
}

/// Accumulates characters and variables into segments as tokens stream
/// by. A segment closes on every separator and once more at end of input,
/// so `/items/` ends in a real empty segment while `/items` does not.
struct SegmentAccumulator {
    kind: TemplateKind,
    segments: Vec<Segment>,
    text: String,
    variable: Option<RouteVariable>,
    optional: bool,
    optional_depth: usize,
    started: bool,
    leading_separator: bool,
}

impl SegmentAccumulator {
    fn new(kind: TemplateKind) -> Self {
        Self {
            kind,
            segments: Vec::new(),
            text: String::new(),
            variable: None,
            optional: false,
            optional_depth: 0,
            started: false,
            leading_separator: false,
        }
    }

    fn note_started(&mut self, is_separator: bool) {
        if !self.started {
            self.started = true;
            self.leading_separator = is_separator;
        }
    }

    fn current_display(&self) -> String {
        match &self.variable {
            Some(variable) => format!("{}:{}", self.text, variable.name),
            None => self.text.clone(),
        }
    }

    fn push_text(&mut self, text: &str) -> Result<(), ParseError> {
        for ch in text.chars() {
            self.note_started(ch == self.kind.separator());
            if ch == self.kind.separator() {
                self.close_segment()?;
            } else {
                if self.variable.is_some() {
                    return Err(ParseError::MixedSegment {
                        segment: format!("{}{}", self.current_display(), ch),
                    });
                }
                self.text.push(ch);
            }
        }
        Ok(())
    }

    fn push_variable(&mut self, variable: RouteVariable) -> Result<(), ParseError> {
        self.note_started(false);
        if self.variable.is_some() || !self.text.is_empty() {
            return Err(ParseError::MixedSegment {
                segment: format!("{}:{}", self.current_display(), variable.name),
            });
        }
        self.variable = Some(variable);
        Ok(())
    }

    fn close_segment(&mut self) -> Result<(), ParseError> {
        let optional = self.optional;
        let segment = match self.variable.take() {
            Some(variable) => Segment::Variable(variable),
            None => Segment::Literal(std::mem::take(&mut self.text)),
        };
        self.optional = self.optional_depth > 0;

        if optional {
            match &segment {
                Segment::Variable(variable) if variable.default_value.is_none() => {
                    return Err(ParseError::OptionalWithoutDefault {
                        name: variable.name.clone(),
                    });
                }
                Segment::Literal(value) => {
                    return Err(ParseError::OptionalLiteral {
                        segment: value.clone(),
                    });
                }
                _ => {}
            }
        }

        self.segments.push(segment);
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<Segment>, ParseError> {
        self.close_segment()?;
        if self.kind == TemplateKind::Path && self.leading_separator {
            self.segments.remove(0);
        }
        Ok(self.segments)
    }
}

/// The template parser. Holds the rule factory used to resolve every
/// rule application it encounters.
pub struct UriTemplateParser<'a> {
    factory: &'a RuleFactory,
}

impl<'a> UriTemplateParser<'a> {
    pub fn new(factory: &'a RuleFactory) -> Self {
        Self { factory }
    }

    /// Parse one template into its ordered segments.
    pub fn parse(
        &self,
        mut stream: TokenStream,
        kind: TemplateKind,
    ) -> Result<Vec<Segment>, ParseError> {
        let mut acc = SegmentAccumulator::new(kind);
        let mut open_brackets: Vec<usize> = Vec::new();

        loop {
            let token = stream.next_token();
            match token.kind {
                TokenKind::EndOfInput => break,
                TokenKind::Text | TokenKind::Number => acc.push_text(&token.text)?,
                TokenKind::Variable => {
                    let (variable, leftover) =
                        self.parse_variable_tail(&mut stream, token.text, false, kind)?;
                    acc.push_variable(variable)?;
                    if let Some(rest) = leftover {
                        acc.push_text(&rest)?;
                    }
                }
                TokenKind::QuotedString => {
                    return Err(Self::unexpected(&token, "template content"));
                }
                TokenKind::Punctuation => match token.text.as_str() {
                    "[" => {
                        if kind == TemplateKind::Host {
                            return Err(ParseError::OptionalInHost {
                                position: token.position,
                            });
                        }
                        open_brackets.push(token.position);
                        acc.optional_depth += 1;
                    }
                    "]" => {
                        if open_brackets.pop().is_none() {
                            return Err(ParseError::UnbalancedBracket {
                                position: token.position,
                            });
                        }
                        acc.optional_depth -= 1;
                    }
                    "{" => {
                        let name_token = stream.next_token();
                        if name_token.kind != TokenKind::Variable {
                            return Err(Self::unexpected(&name_token, "a variable name"));
                        }
                        let (variable, leftover) =
                            self.parse_variable_tail(&mut stream, name_token.text, true, kind)?;
                        acc.push_variable(variable)?;
                        if let Some(rest) = leftover {
                            acc.push_text(&rest)?;
                        }
                    }
                    other => {
                        return Err(ParseError::UnexpectedToken {
                            expected: "template content".to_string(),
                            found: format!("'{other}'"),
                            position: token.position,
                        });
                    }
                },
            }
        }

        if let Some(position) = open_brackets.pop() {
            return Err(ParseError::UnbalancedBracket { position });
        }

        let segments = acc.finish()?;
        Self::validate_defaults_are_trailing(&segments)?;
        Ok(segments)
    }

    /// Parse everything after a variable name: an optional `=default` and,
    /// in the braced form, the `|rule` chain up to the closing `}`.
    ///
    /// A text-token default swallows characters up to the next separator;
    /// the remainder is handed back for ordinary segment processing.
    fn parse_variable_tail(
        &self,
        stream: &mut TokenStream,
        name: String,
        braced: bool,
        kind: TemplateKind,
    ) -> Result<(RouteVariable, Option<String>), ParseError> {
        let mut variable = RouteVariable::new(name);
        let mut leftover = None;

        if stream.peek().kind == TokenKind::Punctuation && stream.peek().text == "=" {
            stream.next_token();
            let value_token = stream.next_token();
            match value_token.kind {
                TokenKind::Number | TokenKind::QuotedString => {
                    variable.default_value = Some(value_token.text);
                }
                TokenKind::Text => match value_token.text.find(kind.separator()) {
                    Some(index) => {
                        variable.default_value = Some(value_token.text[..index].to_string());
                        leftover = Some(value_token.text[index..].to_string());
                    }
                    None => variable.default_value = Some(value_token.text),
                },
                TokenKind::EndOfInput => {
                    return Err(ParseError::UnexpectedEndOfInput {
                        expected: "a default value".to_string(),
                    });
                }
                _ => return Err(Self::unexpected(&value_token, "a default value")),
            }

            if kind == TemplateKind::Host {
                return Err(ParseError::DefaultInHost {
                    name: variable.name,
                });
            }
        }

        if braced {
            loop {
                let token = stream.next_token();
                match (token.kind, token.text.as_str()) {
                    (TokenKind::Punctuation, "|") => {
                        let (application, rule) = self.parse_rule_application(stream)?;
                        variable.rule_applications.push(application);
                        variable.rules.push(rule);
                    }
                    (TokenKind::Punctuation, "}") => break,
                    (TokenKind::EndOfInput, _) => {
                        return Err(ParseError::UnexpectedEndOfInput {
                            expected: "'|' or '}'".to_string(),
                        });
                    }
                    _ => return Err(Self::unexpected(&token, "'|' or '}'")),
                }
            }
        }

        Ok((variable, leftover))
    }

    /// Parse `slug` or `slug(p1, p2, ...)` and resolve it right away.
    fn parse_rule_application(
        &self,
        stream: &mut TokenStream,
    ) -> Result<(RuleApplication, RouteRule), ParseError> {
        let slug_token = stream.next_token();
        if slug_token.kind == TokenKind::EndOfInput {
            return Err(ParseError::UnexpectedEndOfInput {
                expected: "a rule slug".to_string(),
            });
        }
        if slug_token.kind != TokenKind::Text {
            return Err(Self::unexpected(&slug_token, "a rule slug"));
        }
        let slug = slug_token.text;

        let mut params = Vec::new();
        if stream.peek().kind == TokenKind::Punctuation && stream.peek().text == "(" {
            stream.next_token();
            if stream.peek().kind == TokenKind::Punctuation && stream.peek().text == ")" {
                stream.next_token();
            } else {
                loop {
                    let param_token = stream.next_token();
                    let param = match param_token.kind {
                        TokenKind::Number => match param_token.number_value() {
                            Some(NumberValue::Int(value)) => RuleParam::Int(value),
                            Some(NumberValue::Float(value)) => RuleParam::Float(value),
                            None => return Err(Self::unexpected(&param_token, "a number")),
                        },
                        TokenKind::Text | TokenKind::QuotedString => {
                            RuleParam::String(param_token.text)
                        }
                        TokenKind::EndOfInput => {
                            return Err(ParseError::UnexpectedEndOfInput {
                                expected: "a rule parameter".to_string(),
                            });
                        }
                        _ => return Err(Self::unexpected(&param_token, "a rule parameter")),
                    };
                    params.push(param);

                    let delimiter = stream.next_token();
                    match (delimiter.kind, delimiter.text.as_str()) {
                        (TokenKind::Punctuation, ",") => {}
                        (TokenKind::Punctuation, ")") => break,
                        (TokenKind::EndOfInput, _) => {
                            return Err(ParseError::UnexpectedEndOfInput {
                                expected: "',' or ')'".to_string(),
                            });
                        }
                        _ => return Err(Self::unexpected(&delimiter, "',' or ')'")),
                    }
                }
            }
        }

        let rule = self.factory.create_rule(&slug, &params)?;
        Ok((RuleApplication { slug, params }, rule))
    }

    /// Once a defaulted variable appears, everything after it must be a
    /// defaulted variable too, otherwise the default could never apply.
    fn validate_defaults_are_trailing(segments: &[Segment]) -> Result<(), ParseError> {
        let mut first_defaulted: Option<&str> = None;
        for segment in segments {
            match segment {
                Segment::Variable(variable) if variable.default_value.is_some() => {
                    first_defaulted.get_or_insert(&variable.name);
                }
                _ => {
                    if let Some(name) = first_defaulted {
                        return Err(ParseError::NonTrailingOptional {
                            name: name.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn unexpected(token: &Token, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: format!("{:?} '{}'", token.kind, token.text),
            position: token.position,
        }
    }
}

/// Parse a path template (and an optional host template) into a
/// [`UriTemplate`], resolving every rule application through `factory`.
pub fn parse_uri_template(
    path_template: &str,
    host_template: Option<&str>,
    https_only: bool,
    factory: &RuleFactory,
) -> Result<UriTemplate, TemplateError> {
    let parser = UriTemplateParser::new(factory);

    let stream = UriTemplateLexer::lex(path_template).map_err(|source| TemplateError::Lex {
        template: path_template.to_string(),
        source,
    })?;
    let path_segments =
        parser
            .parse(stream, TemplateKind::Path)
            .map_err(|source| TemplateError::Parse {
                template: path_template.to_string(),
                source,
            })?;

    let mut template = UriTemplate::new(path_segments);
    template.is_https_only = https_only;

    if let Some(host) = host_template {
        let stream = UriTemplateLexer::lex(host).map_err(|source| TemplateError::Lex {
            template: host.to_string(),
            source,
        })?;
        let mut host_segments =
            parser
                .parse(stream, TemplateKind::Host)
                .map_err(|source| TemplateError::Parse {
                    template: host.to_string(),
                    source,
                })?;
        // Stored TLD-first so host tries share suffixes.
        host_segments.reverse();
        template.host_segments = Some(host_segments);
    }

    Ok(template)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_path(template: &str) -> Result<Vec<Segment>, ParseError> {
        let factory = RuleFactory::with_builtins();
        let parser = UriTemplateParser::new(&factory);
        let stream = UriTemplateLexer::lex(template).expect("lexes");
        parser.parse(stream, TemplateKind::Path)
    }

    fn literal(value: &str) -> Segment {
        Segment::literal(value)
    }

    #[test]
    fn test_literal_only_template() {
        let segments = parse_path("/users/all").expect("parses");
        assert_eq!(segments, vec![literal("users"), literal("all")]);
    }

    #[test]
    fn test_root_template_is_one_empty_segment() {
        let segments = parse_path("/").expect("parses");
        assert_eq!(segments, vec![literal("")]);
    }

    #[test]
    fn test_trailing_slash_keeps_empty_segment() {
        let segments = parse_path("/items/").expect("parses");
        assert_eq!(segments, vec![literal("items"), literal("")]);
    }

    #[test]
    fn test_simple_variable() {
        let segments = parse_path("/users/:id").expect("parses");
        assert_eq!(segments.len(), 2);
        let variable = segments[1].as_variable().expect("variable segment");
        assert_eq!(variable.name, "id");
        assert!(variable.rules.is_empty());
        assert_eq!(variable.default_value, None);
    }

    #[test]
    fn test_trailing_defaulted_variables() {
        let segments = parse_path("/archives/:year=2024/:month=1").expect("parses");
        assert_eq!(segments.len(), 3);
        assert_eq!(
            segments[1].as_variable().unwrap().default_value.as_deref(),
            Some("2024")
        );
        assert_eq!(
            segments[2].as_variable().unwrap().default_value.as_deref(),
            Some("1")
        );
    }

    #[test]
    fn test_default_followed_by_literal_is_rejected() {
        // The default could never apply: the literal after it forces the
        // segment to be present.
        let err = parse_path("/archives/:year=2024/about").unwrap_err();
        assert_eq!(
            err,
            ParseError::NonTrailingOptional {
                name: "year".to_string()
            }
        );
    }

    #[test]
    fn test_text_default_stops_at_separator() {
        let segments = parse_path("/a/:b=latest/:c=all").expect("parses");
        assert_eq!(
            segments[1].as_variable().unwrap().default_value.as_deref(),
            Some("latest")
        );
        assert_eq!(
            segments[2].as_variable().unwrap().default_value.as_deref(),
            Some("all")
        );
    }

    #[test]
    fn test_braced_variable_with_rules() {
        let segments = parse_path("/users/:{id|int}").expect("parses");
        let variable = segments[1].as_variable().expect("variable segment");
        assert_eq!(variable.name, "id");
        assert_eq!(variable.rule_applications.len(), 1);
        assert_eq!(variable.rule_applications[0].slug, "int");
        assert_eq!(variable.rules.len(), 1);
        assert!(variable.rules[0].passes("42"));
        assert!(!variable.rules[0].passes("4a"));
    }

    #[test]
    fn test_chained_rules_with_parameters() {
        let segments = parse_path("/page/:{num|int|between(1,10)}").expect("parses");
        let variable = segments[1].as_variable().expect("variable segment");
        assert_eq!(variable.rule_applications.len(), 2);
        assert_eq!(variable.rule_applications[1].slug, "between");
        assert_eq!(
            variable.rule_applications[1].params,
            vec![RuleParam::Int(1), RuleParam::Int(10)]
        );
    }

    #[test]
    fn test_quoted_and_bare_word_parameters() {
        let segments = parse_path("/posts/:{status|in(draft,'in review',published)}")
            .expect("parses");
        let variable = segments[1].as_variable().expect("variable segment");
        assert_eq!(
            variable.rule_applications[0].params,
            vec![
                RuleParam::String("draft".to_string()),
                RuleParam::String("in review".to_string()),
                RuleParam::String("published".to_string()),
            ]
        );
    }

    #[test]
    fn test_unresolved_rule_slug_fails_at_parse_time() {
        let err = parse_path("/ages/:{minAge|int|min(0)}").unwrap_err();
        assert_eq!(
            err,
            ParseError::Rule(RuleFactoryError::UnknownSlug {
                slug: "min".to_string()
            })
        );
    }

    #[test]
    fn test_optional_trailing_group_with_defaults() {
        let segments = parse_path("/archives/:year[/:month=1[/:day=1]]").expect("parses");
        assert_eq!(segments.len(), 4);
        assert_eq!(
            segments[2].as_variable().unwrap().default_value.as_deref(),
            Some("1")
        );
        assert_eq!(
            segments[3].as_variable().unwrap().default_value.as_deref(),
            Some("1")
        );
    }

    #[test]
    fn test_optional_group_requires_defaults() {
        let err = parse_path("/archives/:year[/:month]").unwrap_err();
        assert_eq!(
            err,
            ParseError::OptionalWithoutDefault {
                name: "month".to_string()
            }
        );
    }

    #[test]
    fn test_optional_group_rejects_literals() {
        let err = parse_path("/archives[/admin]").unwrap_err();
        assert_eq!(
            err,
            ParseError::OptionalLiteral {
                segment: "admin".to_string()
            }
        );
    }

    #[test]
    fn test_unbalanced_brackets() {
        assert!(matches!(
            parse_path("/a[/:b=1").unwrap_err(),
            ParseError::UnbalancedBracket { .. }
        ));
        assert!(matches!(
            parse_path("/a/:b=1]").unwrap_err(),
            ParseError::UnbalancedBracket { .. }
        ));
    }

    #[test]
    fn test_unterminated_brace_construct() {
        assert!(matches!(
            parse_path("/users/:{id|int").unwrap_err(),
            ParseError::UnexpectedEndOfInput { .. }
        ));
    }

    #[test]
    fn test_mixed_segment_is_rejected() {
        assert!(matches!(
            parse_path("/files/v:version").unwrap_err(),
            ParseError::MixedSegment { .. }
        ));
        assert!(matches!(
            parse_path("/files/:name.txt").unwrap_err(),
            ParseError::MixedSegment { .. }
        ));
    }

    #[test]
    fn test_host_template_reverses_segments() {
        let factory = RuleFactory::with_builtins();
        let template = parse_uri_template("/users", Some(":tenant.example.com"), false, &factory)
            .expect("parses");
        let host = template.host_segments.expect("host segments");
        assert_eq!(host[0], literal("com"));
        assert_eq!(host[1], literal("example"));
        assert_eq!(host[2].as_variable().unwrap().name, "tenant");
    }

    #[test]
    fn test_host_template_rejects_defaults() {
        let factory = RuleFactory::with_builtins();
        let err = parse_uri_template("/", Some(":sub=www.example.com"), false, &factory)
            .unwrap_err();
        assert!(matches!(
            err,
            TemplateError::Parse {
                source: ParseError::DefaultInHost { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_https_only_flag_is_carried() {
        let factory = RuleFactory::with_builtins();
        let template = parse_uri_template("/secure", None, true, &factory).expect("parses");
        assert!(template.is_https_only);
    }
}
