//! Type declaration parser for generated database types.
//!
//! This crate tokenizes and parses the subset of TypeScript used by
//! Supabase-style `database.types.ts` files: nested object type literals keyed
//! by schema and table name, each table carrying `Row`, `Insert` and `Update`
//! members.
//!
//! # Declaration Shape
//!
//! ```text
//! export type Database = {
//!   public: {
//!     Tables: {
//!       campaigns: {
//!         Row: { id: string; name: string; created_at: string | null }
//!         Insert: Omit<Database['public']['Tables']['campaigns']['Row'], 'id'> & { id?: string }
//!         Update: Partial<Database['public']['Tables']['campaigns']['Insert']>
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Only `Tables` blocks are parsed; the rest of the file is skimmed at the
//! token level and never rejected.
//!
//! # Usage
//!
//! ```rust
//! use typeflat_lang::{parse_document, parse_type};
//!
//! let doc = parse_document("type Database = { public: { Tables: { t: { Row: { id: string } } } } }").unwrap();
//! assert_eq!(doc.table_count(), 1);
//!
//! let ty = parse_type("string | null").unwrap();
//! assert!(ty.contains_null());
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;

// Re-export main types
pub use ast::{
    Document, IndexSignature, Member, ObjectType, PropertySignature, Separator, TablesBlock,
    TypeExpr, TypeKind,
};
pub use error::ParseError;
pub use span::{Span, Spanned};

/// Parse every `Tables` block of a declaration file.
///
/// # Example
///
/// ```rust
/// use typeflat_lang::parse_document;
///
/// let doc = parse_document("const x = 1").unwrap();
/// assert!(doc.blocks.is_empty());
/// ```
pub fn parse_document(source: &str) -> Result<Document, ParseError> {
    parser::parse_document(source)
}

/// Parse a single type expression.
///
/// # Example
///
/// ```rust
/// use typeflat_lang::{parse_type, TypeKind};
///
/// let ty = parse_type("Partial<Foo>").unwrap();
/// assert!(matches!(ty.kind, TypeKind::Reference { .. }));
/// ```
pub fn parse_type(source: &str) -> Result<TypeExpr, ParseError> {
    parser::parse_type(source)
}

/// Tokenize a source string (for debugging/testing).
///
/// # Example
///
/// ```rust
/// use typeflat_lang::tokenize;
///
/// let tokens = tokenize("id?: string");
/// assert_eq!(tokens.len(), 4);
/// ```
pub fn tokenize(source: &str) -> Vec<lexer::SpannedToken> {
    lexer::tokenize(source)
}
