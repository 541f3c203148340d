//! Field paths and their textual notations
//!
//! A [`JsonPath`] is the relative address a property is declared at. Paths
//! are usually built in code, but two textual forms are accepted:
//!
//! - bracket/dot notation: `$.user.addresses[0]['zip code']`
//! - JSON Pointer: `/user/addresses/0/zip code` (all-digit tokens are indices)
//!
//! Copyright (c) 2025 Jsonbind Team
//! Licensed under the Apache-2.0 license

use crate::location::{Location, PathElement};
use std::fmt;
use std::iter::Peekable;
use std::str::{Chars, FromStr};
use thiserror::Error;

/// Syntax error in a textual path
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Path syntax error at position {position} in '{input}': {message}")]
pub struct PathSyntaxError {
    pub message: String,
    pub position: usize,
    pub input: String,
}

/// A relative path made of keys and indices
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct JsonPath {
    elements: Vec<PathElement>,
}

impl JsonPath {
    /// The empty path, addressing the node itself
    pub fn root() -> Self {
        Self::default()
    }

    pub fn key(mut self, name: impl Into<String>) -> Self {
        self.elements.push(PathElement::Key(name.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.elements.push(PathElement::Index(index));
        self
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    pub fn is_root(&self) -> bool {
        self.elements.is_empty()
    }

    /// The final key, if the path ends in one
    pub fn last_key(&self) -> Option<&str> {
        match self.elements.last() {
            Some(PathElement::Key(name)) => Some(name),
            _ => None,
        }
    }

    /// Resolve this relative path against a base location
    pub fn locate(&self, base: &Location) -> Location {
        self.elements
            .iter()
            .fold(base.clone(), |location, element| location.append(element.clone()))
    }

    /// Parse either notation, picked by the first character
    pub fn parse(input: &str) -> Result<Self, PathSyntaxError> {
        if input.is_empty() || input.starts_with('/') {
            Self::from_pointer(input)
        } else {
            Parser::new(input).parse()
        }
    }

    /// Parse an RFC 6901 JSON Pointer
    pub fn from_pointer(input: &str) -> Result<Self, PathSyntaxError> {
        if input.is_empty() {
            return Ok(Self::root());
        }
        let Some(rest) = input.strip_prefix('/') else {
            return Err(syntax_error("JSON Pointer must start with '/'", 0, input));
        };

        let mut elements = Vec::new();
        let mut offset = 1;
        for token in rest.split('/') {
            let element = if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
                let index = token
                    .parse::<usize>()
                    .map_err(|_| syntax_error("Index out of range", offset, input))?;
                PathElement::Index(index)
            } else {
                PathElement::Key(unescape_token(token, offset, input)?)
            };
            elements.push(element);
            offset += token.len() + 1;
        }
        Ok(Self { elements })
    }
}

fn unescape_token(token: &str, offset: usize, input: &str) -> Result<String, PathSyntaxError> {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.char_indices();
    while let Some((i, ch)) = chars.next() {
        if ch != '~' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some((_, '0')) => out.push('~'),
            Some((_, '1')) => out.push('/'),
            _ => return Err(syntax_error("'~' must be followed by '0' or '1'", offset + i, input)),
        }
    }
    Ok(out)
}

fn syntax_error(message: &str, position: usize, input: &str) -> PathSyntaxError {
    PathSyntaxError {
        message: message.to_string(),
        position,
        input: input.to_string(),
    }
}

impl FromStr for JsonPath {
    type Err = PathSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for element in &self.elements {
            match element {
                PathElement::Key(name) if is_identifier(name) => write!(f, ".{}", name)?,
                PathElement::Key(name) => write!(f, "['{}']", name.replace('\\', "\\\\").replace('\'', "\\'"))?,
                PathElement::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        }
        _ => false,
    }
}

/// A single key; use [`JsonPath::parse`] for textual paths
impl From<&str> for JsonPath {
    fn from(name: &str) -> Self {
        Self::root().key(name)
    }
}

impl From<String> for JsonPath {
    fn from(name: String) -> Self {
        Self::root().key(name)
    }
}

impl From<usize> for JsonPath {
    fn from(index: usize) -> Self {
        Self::root().index(index)
    }
}

impl From<Vec<PathElement>> for JsonPath {
    fn from(elements: Vec<PathElement>) -> Self {
        Self { elements }
    }
}

/// Recursive descent parser for the `$.a['b'][0]` notation
struct Parser<'a> {
    input: &'a str,
    chars: Peekable<Chars<'a>>,
    position: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    fn parse(mut self) -> Result<JsonPath, PathSyntaxError> {
        if self.current_char() != Some('$') {
            return Err(self.error("Path must start with '$' or '/'"));
        }
        self.advance();

        let mut elements = Vec::new();
        while let Some(ch) = self.current_char() {
            match ch {
                '.' => {
                    self.advance();
                    elements.push(PathElement::Key(self.parse_identifier()?));
                }
                '[' => {
                    self.advance();
                    elements.push(self.parse_bracket()?);
                }
                _ => return Err(self.error("Expected '.' or '['")),
            }
        }
        Ok(JsonPath { elements })
    }

    fn parse_identifier(&mut self) -> Result<String, PathSyntaxError> {
        let mut name = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' || ch == '-' {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(self.error("Expected a member name"));
        }
        Ok(name)
    }

    fn parse_bracket(&mut self) -> Result<PathElement, PathSyntaxError> {
        let element = match self.current_char() {
            Some(quote @ ('\'' | '"')) => {
                self.advance();
                PathElement::Key(self.parse_quoted(quote)?)
            }
            Some(ch) if ch.is_ascii_digit() => {
                let start = self.position;
                let mut digits = String::new();
                while let Some(ch) = self.current_char().filter(char::is_ascii_digit) {
                    digits.push(ch);
                    self.advance();
                }
                let index = digits
                    .parse::<usize>()
                    .map_err(|_| syntax_error("Index out of range", start, self.input))?;
                PathElement::Index(index)
            }
            Some(_) => return Err(self.error("Expected a quoted name or an index")),
            None => return Err(self.error("Unterminated bracket selector")),
        };

        if self.current_char() != Some(']') {
            return Err(self.error("Expected ']'"));
        }
        self.advance();
        Ok(element)
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String, PathSyntaxError> {
        let mut out = String::new();
        loop {
            match self.current_char() {
                Some('\\') => {
                    self.advance();
                    match self.current_char() {
                        Some(escaped) => {
                            out.push(escaped);
                            self.advance();
                        }
                        None => return Err(self.error("Unterminated escape sequence")),
                    }
                }
                Some(ch) if ch == quote => {
                    self.advance();
                    return Ok(out);
                }
                Some(ch) => {
                    out.push(ch);
                    self.advance();
                }
                None => return Err(self.error("Unterminated quoted name")),
            }
        }
    }

    fn current_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.chars.next() {
            self.position += ch.len_utf8();
        }
    }

    fn error(&self, message: &str) -> PathSyntaxError {
        syntax_error(message, self.position, self.input)
    }
}
