//! Lexer for TypeScript type declarations using logos.

use crate::span::Span;
use logos::Logos;

/// Token types for the type declaration subset.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    // Comments never reach the parser
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", logos::skip)]
    BlockComment,

    // Keyword types
    #[token("null")]
    Null,
    #[token("undefined")]
    Undefined,

    // Identifier (type names, keys, and the remaining keywords)
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice().to_string())]
    Ident(String),

    // String literal (double-quoted)
    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        unescape_string(&s[1..s.len() - 1])
    })]
    String(String),

    // String literal (single-quoted)
    #[regex(r#"'([^'\\]|\\.)*'"#, |lex| {
        let s = lex.slice();
        unescape_string(&s[1..s.len() - 1])
    })]
    StringSingle(String),

    // Template literal, kept raw
    #[regex(r"`([^`\\]|\\.)*`", |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].to_string()
    })]
    Template(String),

    // Numeric literal type, kept as written
    #[regex(r"-?[0-9]+(\.[0-9]+)?", |lex| lex.slice().to_string())]
    Number(String),

    // Operators
    #[token("=>")]
    Arrow,
    #[token("=")]
    Assign,
    #[token("?")]
    Question,
    #[token("|")]
    Pipe,
    #[token("&")]
    Amp,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,

    // Punctuation
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
}

impl Token {
    /// The text of a token usable as a property key, if it is one.
    pub fn key_name(&self) -> Option<&str> {
        match self {
            Token::Ident(s) | Token::String(s) | Token::StringSingle(s) | Token::Number(s) => {
                Some(s)
            }
            Token::Null => Some("null"),
            Token::Undefined => Some("undefined"),
            _ => None,
        }
    }
}

/// Unescape a string literal, handling common escape sequences.
fn unescape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some('\'') => result.push('\''),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// A token with its span in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Lexer that produces spanned tokens.
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, Token>,
}

impl<'source> Lexer<'source> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            inner: Token::lexer(source),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = SpannedToken;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(token) => {
                    return Some(SpannedToken {
                        token,
                        span: self.inner.span().into(),
                    });
                }
                // Characters outside the type grammar (`!`, `#`, `@`, ...) only show up
                // in code we never parse, so they are dropped here.
                Err(()) => continue,
            }
        }
    }
}

/// Tokenize a source string into a vector of spanned tokens.
pub fn tokenize(source: &str) -> Vec<SpannedToken> {
    Lexer::new(source).collect()
}
