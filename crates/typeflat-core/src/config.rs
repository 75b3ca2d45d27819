//! Flattening configuration.

/// Default location of the generated types, relative to the project root.
pub const DEFAULT_TYPES_PATH: &str = "lib/database.types.ts";

/// Default name of the root type that circular references index into.
pub const DEFAULT_ROOT_TYPE: &str = "Database";

/// Default indent unit used when no Row indentation can be reused.
pub const DEFAULT_INDENT_UNIT: &str = "  ";

/// Default marker appended to tables that declare no relationships.
pub const DEFAULT_RELATIONSHIPS_MARKER: &str = "Relationships: []";

/// Flattening configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenConfig {
    /// Root type name, e.g. `Database` in `Database['public']['Tables']`.
    pub root_type: String,

    /// One level of indentation.
    pub indent_unit: String,

    /// Member text inserted into tables without a relationships entry.
    pub relationships_marker: String,

    /// Whether missing relationships markers are added.
    pub add_relationships: bool,
}

impl FlattenConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self {
            root_type: DEFAULT_ROOT_TYPE.to_string(),
            indent_unit: DEFAULT_INDENT_UNIT.to_string(),
            relationships_marker: DEFAULT_RELATIONSHIPS_MARKER.to_string(),
            add_relationships: true,
        }
    }

    /// Set the root type name.
    pub fn with_root_type(mut self, name: impl Into<String>) -> Self {
        self.root_type = name.into();
        self
    }

    /// Set the indent unit to `width` spaces.
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_unit = " ".repeat(width.max(1));
        self
    }

    /// Set the relationships marker text.
    pub fn with_relationships_marker(mut self, marker: impl Into<String>) -> Self {
        self.relationships_marker = marker.into();
        self
    }

    /// Leave tables without a relationships entry untouched.
    pub fn without_relationships(mut self) -> Self {
        self.add_relationships = false;
        self
    }
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self::new()
    }
}
