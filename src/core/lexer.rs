//! Lexer for the URI template mini-language.
//!
//! Turns a raw template string such as `/users/:{id|int}` into a finite
//! token stream consumed exactly once by the parser. The scan is a single
//! left-to-right pass over the input with a cursor; plain characters
//! accumulate into a text buffer that is flushed whenever a special token
//! is recognized, so an empty text token is never emitted.

use thiserror::Error;

/// Upper bound on variable name length inside a template.
pub const MAX_VARIABLE_NAME_LENGTH: usize = 32;

/// Characters reserved by the template grammar and lexed as one-character
/// punctuation tokens.
pub const RESERVED_PUNCTUATION: &[char] = &['(', ')', '[', ']', '{', '}', ',', '=', '|'];

/// Token classification produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A run of plain template characters (literal path/host content).
    Text,
    /// A variable name introduced by `:`.
    Variable,
    /// One reserved punctuation character.
    Punctuation,
    /// An integer or float literal.
    Number,
    /// A single- or double-quoted string with escapes resolved.
    QuotedString,
    /// End of the template.
    EndOfInput,
}

/// A numeric literal, with ints and floats told apart by comparing the
/// parsed float against its integer truncation (`4.0` is the integer 4).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberValue {
    Int(i64),
    Float(f64),
}

/// One lexed token. `text` holds the raw lexeme for `Text`, `Number` and
/// `Punctuation`, the name for `Variable`, and the unescaped content for
/// `QuotedString`. `position` is the byte offset of the lexeme start.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: usize,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }

    /// Interpret a `Number` token, distinguishing int from float.
    pub fn number_value(&self) -> Option<NumberValue> {
        if self.kind != TokenKind::Number {
            return None;
        }

        let parsed: f64 = self.text.parse().ok()?;
        if parsed == parsed.trunc() && parsed >= i64::MIN as f64 && parsed <= i64::MAX as f64 {
            Some(NumberValue::Int(parsed as i64))
        } else {
            Some(NumberValue::Float(parsed))
        }
    }
}

/// Lexing failures. These are registration-time errors: a malformed
/// template aborts startup rather than being silently skipped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LexError {
    #[error(
        "variable name '{name}' at position {position} exceeds {MAX_VARIABLE_NAME_LENGTH} characters"
    )]
    VariableNameTooLong { name: String, position: usize },

    #[error("expected a variable name after ':' at position {position}")]
    EmptyVariableName { position: usize },

    #[error("unterminated quoted string starting at position {position}")]
    UnterminatedQuote { position: usize },
}

/// The finite token sequence produced by one lex run. The stream is not
/// restartable: tokens are handed out front-to-back and once consumed are
/// gone. Reading past the end keeps yielding `EndOfInput`.
#[derive(Debug)]
pub struct TokenStream {
    tokens: std::collections::VecDeque<Token>,
    end: Token,
}

impl TokenStream {
    fn new(tokens: Vec<Token>, end_position: usize) -> Self {
        Self {
            tokens: tokens.into(),
            end: Token::new(TokenKind::EndOfInput, "", end_position),
        }
    }

    /// Look at the next token without consuming it.
    pub fn peek(&self) -> &Token {
        self.tokens.front().unwrap_or(&self.end)
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Token {
        self.tokens.pop_front().unwrap_or_else(|| self.end.clone())
    }

    /// True once every real token has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// The template lexer. Stateless; one call lexes one template.
pub struct UriTemplateLexer;

impl UriTemplateLexer {
    /// Lex a raw template into a token stream.
    pub fn lex(raw: &str) -> Result<TokenStream, LexError> {
        let chars: Vec<char> = raw.chars().collect();
        let mut tokens = Vec::new();
        let mut buffer = String::new();
        let mut buffer_start = 0;
        let mut cursor = 0;

        while cursor < chars.len() {
            let ch = chars[cursor];

            if RESERVED_PUNCTUATION.contains(&ch) {
                Self::flush_text(&mut tokens, &mut buffer, buffer_start);
                tokens.push(Token::new(TokenKind::Punctuation, ch, cursor));
                cursor += 1;
            } else if ch == ':' {
                Self::flush_text(&mut tokens, &mut buffer, buffer_start);
                cursor = Self::lex_variable(&chars, cursor, &mut tokens)?;
            } else if ch == '\'' || ch == '"' {
                Self::flush_text(&mut tokens, &mut buffer, buffer_start);
                cursor = Self::lex_quoted_string(&chars, cursor, &mut tokens)?;
            } else if ch.is_ascii_digit() || (ch == '-' && Self::digit_follows(&chars, cursor)) {
                Self::flush_text(&mut tokens, &mut buffer, buffer_start);
                cursor = Self::lex_number(&chars, cursor, &mut tokens);
            } else {
                if buffer.is_empty() {
                    buffer_start = cursor;
                }
                buffer.push(ch);
                cursor += 1;
            }
        }

        Self::flush_text(&mut tokens, &mut buffer, buffer_start);
        Ok(TokenStream::new(tokens, chars.len()))
    }

    fn flush_text(tokens: &mut Vec<Token>, buffer: &mut String, start: usize) {
        if !buffer.is_empty() {
            tokens.push(Token::new(TokenKind::Text, std::mem::take(buffer), start));
        }
    }

    fn digit_follows(chars: &[char], cursor: usize) -> bool {
        chars
            .get(cursor + 1)
            .is_some_and(|next| next.is_ascii_digit())
    }

    /// Lex `:name` or the opening of `:{name...}`. The brace form emits a
    /// `{` punctuation token ahead of the variable token so the parser
    /// knows a rule chain may follow.
    fn lex_variable(
        chars: &[char],
        start: usize,
        tokens: &mut Vec<Token>,
    ) -> Result<usize, LexError> {
        let mut cursor = start + 1;

        if chars.get(cursor) == Some(&'{') {
            tokens.push(Token::new(TokenKind::Punctuation, '{', cursor));
            cursor += 1;
        }

        let name_start = cursor;
        while cursor < chars.len()
            && (chars[cursor].is_ascii_alphanumeric() || chars[cursor] == '_')
        {
            cursor += 1;
        }

        let name: String = chars[name_start..cursor].iter().collect();
        if name.is_empty() {
            return Err(LexError::EmptyVariableName { position: start });
        }
        if name.len() > MAX_VARIABLE_NAME_LENGTH {
            return Err(LexError::VariableNameTooLong {
                name,
                position: start,
            });
        }

        tokens.push(Token::new(TokenKind::Variable, name, start));
        Ok(cursor)
    }

    /// Lex a quoted string. Either quote style may enclose the other
    /// verbatim; a backslash escapes the enclosing quote or itself.
    fn lex_quoted_string(
        chars: &[char],
        start: usize,
        tokens: &mut Vec<Token>,
    ) -> Result<usize, LexError> {
        let quote = chars[start];
        let mut content = String::new();
        let mut cursor = start + 1;

        while cursor < chars.len() {
            let ch = chars[cursor];
            if ch == '\\' {
                match chars.get(cursor + 1) {
                    Some(&next) if next == quote || next == '\\' => {
                        content.push(next);
                        cursor += 2;
                        continue;
                    }
                    _ => {
                        content.push(ch);
                        cursor += 1;
                        continue;
                    }
                }
            }
            if ch == quote {
                tokens.push(Token::new(TokenKind::QuotedString, content, start));
                return Ok(cursor + 1);
            }
            content.push(ch);
            cursor += 1;
        }

        Err(LexError::UnterminatedQuote { position: start })
    }

    /// Lex an integer or float literal: an optional leading minus, digits,
    /// and at most one fraction part.
    fn lex_number(chars: &[char], start: usize, tokens: &mut Vec<Token>) -> usize {
        let mut cursor = start;
        let mut lexeme = String::new();

        if chars[cursor] == '-' {
            lexeme.push('-');
            cursor += 1;
        }
        while cursor < chars.len() && chars[cursor].is_ascii_digit() {
            lexeme.push(chars[cursor]);
            cursor += 1;
        }
        if chars.get(cursor) == Some(&'.')
            && chars
                .get(cursor + 1)
                .is_some_and(|next| next.is_ascii_digit())
        {
            lexeme.push('.');
            cursor += 1;
            while cursor < chars.len() && chars[cursor].is_ascii_digit() {
                lexeme.push(chars[cursor]);
                cursor += 1;
            }
        }

        tokens.push(Token::new(TokenKind::Number, lexeme, start));
        cursor
    }
}
