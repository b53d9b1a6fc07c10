//! CDL Tokenizer — converts contract source text into a token stream
//!
//! Recognizes, in priority order: whitespace (discarded), `//` line comments
//! (discarded), identifiers, numeric literals, double-quoted string literals,
//! and a catch-all "other" category covering `::` and single punctuation
//! characters. The parser consumes the resulting sequence read-only; token
//! positions are stable indices into it.
//!
//! Tokenization never fails: any character the higher-priority rules reject
//! is emitted as a one-character "other" token.

use serde::{Deserialize, Serialize};

/// Token category tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    /// Letters/underscore followed by alphanumerics/underscore, length >= 2
    Identifier,
    /// Digits with an optional decimal fraction
    Number,
    /// Double-quoted literal, quotes included in the lexeme
    Str,
    /// `::` or a single punctuation/symbol character
    Other,
}

impl TokenKind {
    /// Human-readable kind name for the diagnostic token dump.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Identifier => "ID",
            TokenKind::Number => "Number",
            TokenKind::Str => "String",
            TokenKind::Other => "Other",
        }
    }
}

/// One lexeme with its category; immutable once produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub lexeme: String,
    pub kind: TokenKind,
}

impl Token {
    fn new(lexeme: impl Into<String>, kind: TokenKind) -> Self {
        Token {
            lexeme: lexeme.into(),
            kind,
        }
    }
}

/// Tokenizer for CDL source text
pub struct Tokenizer {
    input: Vec<char>,
    position: usize,
}

impl Tokenizer {
    /// Create a new tokenizer for the given input text
    pub fn new(text: &str) -> Self {
        Tokenizer {
            input: text.chars().collect(),
            position: 0,
        }
    }

    /// Tokenize the entire input into a token sequence
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();
            if self.is_at_end() {
                break;
            }
            tokens.push(self.next_token());
        }

        tokens
    }

    // ── Character helpers ──────────────────────────────────

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.input.get(self.position).copied();
        if ch.is_some() {
            self.position += 1;
        }
        ch
    }

    fn slice(&self, start: usize) -> String {
        self.input[start..self.position].iter().collect()
    }

    // ── Whitespace & Comments ──────────────────────────────

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while let Some(ch) = self.peek() {
                if ch.is_whitespace() {
                    self.advance();
                } else {
                    break;
                }
            }

            // Line comments: //
            if self.peek() == Some('/') && self.peek_ahead(1) == Some('/') {
                while let Some(ch) = self.peek() {
                    if ch == '\n' {
                        break;
                    }
                    self.advance();
                }
                continue;
            }

            break;
        }
    }

    // ── Main dispatch ──────────────────────────────────────

    fn next_token(&mut self) -> Token {
        let ch = match self.peek() {
            Some(c) => c,
            None => return Token::new("", TokenKind::Other),
        };

        match ch {
            '"' => self.read_string(),
            c if c.is_ascii_digit() => self.read_number(),
            c if c.is_ascii_alphabetic() || c == '_' => self.read_identifier(),
            _ => self.read_other(),
        }
    }

    // ── String literals ────────────────────────────────────

    fn read_string(&mut self) -> Token {
        let start = self.position;
        self.advance(); // opening quote

        loop {
            match self.advance() {
                Some('"') => {
                    return Token::new(self.slice(start), TokenKind::Str);
                }
                Some(_) => {}
                None => {
                    // No closing quote anywhere: the string rule does not
                    // match, so the opening quote falls through to "other"
                    // and scanning resumes after it.
                    self.position = start + 1;
                    return Token::new("\"", TokenKind::Other);
                }
            }
        }
    }

    // ── Numbers ────────────────────────────────────────────

    fn read_number(&mut self) -> Token {
        let start = self.position;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        // Optional decimal fraction; the dot only belongs to the number
        // when a digit follows it.
        if self.peek() == Some('.') && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            while let Some(ch) = self.peek() {
                if ch.is_ascii_digit() {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        Token::new(self.slice(start), TokenKind::Number)
    }

    // ── Identifiers ────────────────────────────────────────

    fn read_identifier(&mut self) -> Token {
        let start = self.position;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }

        // Identifiers must be at least two characters; a lone letter or
        // underscore is demoted to the catch-all category.
        if self.position - start < 2 {
            return Token::new(self.slice(start), TokenKind::Other);
        }

        Token::new(self.slice(start), TokenKind::Identifier)
    }

    // ── Catch-all symbols ──────────────────────────────────

    fn read_other(&mut self) -> Token {
        if self.peek() == Some(':') && self.peek_ahead(1) == Some(':') {
            self.advance();
            self.advance();
            return Token::new("::", TokenKind::Other);
        }

        let ch = self.advance().unwrap_or('\0');
        Token::new(ch.to_string(), TokenKind::Other)
    }
}

/// Tokenize a full source text in one call.
pub fn tokenize(text: &str) -> Vec<Token> {
    Tokenizer::new(text).tokenize()
}

/// Render the diagnostic token dump: one line per token with its position,
/// kind name, and literal text. Debugging aid, not a downstream format.
pub fn dump_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for (pos, token) in tokens.iter().enumerate() {
        out.push_str(&format!(
            "{}: {} : \"{}\"\n",
            pos,
            token.kind.name(),
            token.lexeme
        ));
    }
    out
}
