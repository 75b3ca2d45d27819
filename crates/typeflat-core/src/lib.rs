//! Typeflat Core - Flattening of circular Insert/Update declarations.
//!
//! Generated database types often declare a table's `Insert` and `Update`
//! members in terms of the root type itself:
//!
//! ```text
//! Insert: Omit<Database['public']['Tables']['campaigns']['Row'], 'id'> & { id?: string }
//! Update: Partial<Database['public']['Tables']['campaigns']['Insert']>
//! ```
//!
//! This crate replaces those declarations with explicit object literals built
//! from the table's `Row` fields, and appends a `Relationships: []` member to
//! tables that lack one. All other text is left untouched.
//!
//! # Usage
//!
//! ```rust
//! use typeflat_core::{flatten, FlattenConfig};
//!
//! let source = "type Database = { public: { Tables: { t: {\n  Row: { id: string }\n  Relationships: []\n} } } }";
//! let outcome = flatten(source, &FlattenConfig::default()).unwrap();
//! assert!(!outcome.changed());
//! ```

pub mod circular;
pub mod config;
pub mod edit;
pub mod error;
pub mod extract;
pub mod flatten;
pub mod relationships;
pub mod report;
pub mod synth;
pub mod table;

pub use circular::{CircularInsert, OmitSet, OverrideMap, TableRef};
pub use config::{FlattenConfig, DEFAULT_TYPES_PATH};
pub use edit::{apply_edits, Edit};
pub use error::{Error, Result};
pub use extract::{FieldSpec, RowIndex, RowLayout, TableSchema};
pub use flatten::{flatten, flatten_file, FlattenOutcome};
pub use report::{BlockStatus, FlattenReport, TableReport};
pub use synth::{synthesize_insert, synthesize_update, SynthesizedField};
pub use table::{collect_tables, TableDecl};

/// Re-export the declaration parser.
pub use typeflat_lang as lang;
