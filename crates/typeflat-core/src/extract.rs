//! Row field extraction.
//!
//! Builds, per table, the ordered list of `Row` fields that the Insert and
//! Update synthesizers work from. Field types are the exact source text of the
//! parsed type expression, so object-shaped column types survive intact.

use crate::table::TableDecl;
use tracing::{debug, info};
use typeflat_lang::span::{line_indent, spans_lines};
use typeflat_lang::Separator;

/// A single Row field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name, unquoted.
    pub name: String,
    /// The key exactly as written (keeps quotes on keys like `"my-col"`).
    pub key: String,
    /// Declared type expression, verbatim.
    pub ty: String,
    /// Whether the type mentions `null`.
    pub nullable: bool,
    /// Declared with `?` in the Row.
    pub optional: bool,
}

impl FieldSpec {
    /// Build a field from name and type text.
    ///
    /// Nullability is decided by tokenizing `ty`, falling back to a plain
    /// substring test if it does not parse on its own.
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        let name = name.into();
        let ty = ty.into();
        let nullable = match typeflat_lang::parse_type(&ty) {
            Ok(expr) => expr.contains_null(),
            Err(_) => ty.contains("null"),
        };
        Self {
            key: name.clone(),
            name,
            ty,
            nullable,
            optional: false,
        }
    }

    /// Mark the field as declared with `?`.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// How a Row block was laid out, reused when rendering synthesized blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowLayout {
    /// Indentation of the first field when it sits on its own line.
    pub field_indent: Option<String>,
    /// Member separator used by the Row block.
    pub separator: Option<Separator>,
}

/// Row fields of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub schema: Option<String>,
    pub name: String,
    pub fields: Vec<FieldSpec>,
    pub layout: RowLayout,
}

impl TableSchema {
    /// Build a table from fields with a default layout.
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            fields,
            layout: RowLayout::default(),
        }
    }

    /// Set the owning schema.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Row mappings for every table of a document.
#[derive(Debug, Clone, Default)]
pub struct RowIndex {
    tables: Vec<TableSchema>,
}

impl RowIndex {
    /// Extract the Row fields of every table whose `Row` is an object literal.
    pub fn extract(source: &str, tables: &[TableDecl<'_>]) -> Self {
        let mut index = RowIndex::default();

        for decl in tables {
            let Some(row) = decl.member("Row") else {
                debug!(table = %decl.qualified_name(), "table has no Row member");
                continue;
            };
            let Some(object) = row.ty.as_object() else {
                debug!(table = %decl.qualified_name(), "Row is not an object literal");
                continue;
            };

            let fields: Vec<FieldSpec> = object
                .properties()
                .map(|p| FieldSpec {
                    name: p.name.value.clone(),
                    key: p.name.span.slice(source).to_string(),
                    ty: p.ty.text(source).to_string(),
                    nullable: p.ty.contains_null(),
                    optional: p.optional,
                })
                .collect();

            let first = object.properties().next();
            let layout = RowLayout {
                field_indent: first
                    .filter(|p| spans_lines(source, object.span.start, p.span.start))
                    .map(|p| line_indent(source, p.span.start).to_string()),
                separator: first.and_then(|p| p.separator.as_ref()).map(|s| s.value),
            };

            info!(
                schema = decl.schema.unwrap_or("-"),
                table = %decl.name.value,
                fields = fields.len(),
                "parsed Row fields"
            );

            index.insert(TableSchema {
                schema: decl.schema.map(str::to_string),
                name: decl.name.value.clone(),
                fields,
                layout,
            });
        }

        index
    }

    /// Add a table, keeping the first mapping for a repeated `schema.table`.
    pub fn insert(&mut self, table: TableSchema) {
        let exists = self
            .tables
            .iter()
            .any(|t| t.schema == table.schema && t.name == table.name);
        if !exists {
            self.tables.push(table);
        }
    }

    /// Find a table's Row mapping.
    ///
    /// An exact `schema.table` match wins. Otherwise a table name that is
    /// unique across the document is accepted.
    pub fn get(&self, schema: &str, table: &str) -> Option<&TableSchema> {
        if let Some(exact) = self
            .tables
            .iter()
            .find(|t| t.schema.as_deref() == Some(schema) && t.name == table)
        {
            return Some(exact);
        }

        let mut by_name = self.tables.iter().filter(|t| t.name == table);
        match (by_name.next(), by_name.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    /// Iterate over tables in source order.
    pub fn iter(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.iter()
    }

    /// Number of tables with a Row mapping.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no Row mappings were found.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
