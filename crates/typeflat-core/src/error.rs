//! Error types for the flattening pass.

use thiserror::Error;
use typeflat_lang::span::offset_to_line_col;
use typeflat_lang::ParseError;

/// Result type for flattening operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Flattening errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The declaration file could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A table entry does not have the expected `{ Row, Insert, Update }` shape.
    #[error("malformed table '{table}' in schema '{schema}': {reason}")]
    MalformedTable {
        schema: String,
        table: String,
        reason: String,
        /// Byte offset of the table key.
        offset: usize,
    },

    /// Two planned edits touch the same text.
    #[error("overlapping edits at byte {offset}")]
    OverlappingEdits { offset: usize },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a malformed table error.
    pub fn malformed_table(
        schema: Option<&str>,
        table: &str,
        reason: impl Into<String>,
        offset: usize,
    ) -> Self {
        Error::MalformedTable {
            schema: schema.unwrap_or("?").to_string(),
            table: table.to_string(),
            reason: reason.into(),
            offset,
        }
    }

    /// Format the error with source context where a location is known.
    pub fn format_with_source(&self, source: &str) -> String {
        match self {
            Error::Parse(e) => e.format_with_source(source),
            Error::MalformedTable { offset, .. } => {
                let (line, col) = offset_to_line_col(source, *offset);
                format!("error: {}\n  --> line {}:{}\n", self, line, col)
            }
            _ => format!("error: {}\n", self),
        }
    }
}
