//! Error type for lexing and parsing.

use crate::span::{offset_to_line_col, Span};
use thiserror::Error;

/// Error during lexing/parsing.
#[derive(Debug, Clone, Error)]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// Source span where the error occurred.
    pub span: Span,
    /// Optional hint for fixing the error.
    pub hint: Option<String>,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            hint: None,
        }
    }

    /// Add a hint to the error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Line and column (1-based) where the error starts.
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        offset_to_line_col(source, self.span.start)
    }

    /// Format the error with source context.
    pub fn format_with_source(&self, source: &str) -> String {
        let (line, col) = self.line_col(source);
        let mut result = format!("error: {}\n", self.message);
        result.push_str(&format!("  --> line {}:{}\n", line, col));

        if let Some(source_line) = source.lines().nth(line - 1) {
            result.push_str(&format!("   |\n{:3}| {}\n   |", line, source_line));

            for _ in 0..col {
                result.push(' ');
            }
            result.push('^');

            // Underline the rest of the span while it stays on this line
            let span_len = self.span.len();
            if span_len > 1 {
                let room = (source_line.len() + 1).saturating_sub(col);
                for _ in 1..span_len.min(room) {
                    result.push('~');
                }
            }
            result.push('\n');
        }

        if let Some(hint) = &self.hint {
            result.push_str(&format!("   = hint: {}\n", hint));
        }

        result
    }
}
