//! The flattening pass: parse, extract, synthesize, normalize, apply.

use std::path::Path;

use crate::circular::{circular_insert, circular_update, TableRef};
use crate::config::FlattenConfig;
use crate::edit::{apply_edits, Edit};
use crate::error::Result;
use crate::extract::{RowIndex, TableSchema};
use crate::relationships;
use crate::report::{BlockStatus, FlattenReport, TableReport};
use crate::synth::{render_object, synthesize_insert, synthesize_update, SynthesizedField};
use crate::table::{collect_tables, TableDecl};
use tracing::{debug, info, warn};
use typeflat_lang::span::{line_indent, newline_of};
use typeflat_lang::PropertySignature;

/// Result of flattening one document.
#[derive(Debug, Clone)]
pub struct FlattenOutcome {
    /// The rewritten document.
    pub output: String,
    /// What happened per table.
    pub report: FlattenReport,
    changed: bool,
}

impl FlattenOutcome {
    /// Whether the output differs from the input.
    pub fn changed(&self) -> bool {
        self.changed
    }
}

/// Flatten every circular Insert/Update declaration in `source`.
///
/// Text outside the replaced type expressions is preserved byte for byte.
/// Running this on its own output produces no further changes.
pub fn flatten(source: &str, config: &FlattenConfig) -> Result<FlattenOutcome> {
    let document = typeflat_lang::parse_document(source)?;
    let tables = collect_tables(&document)?;
    let rows = RowIndex::extract(source, &tables);
    info!(tables = tables.len(), rows = rows.len(), "parsed declaration file");

    let flattener = Flattener {
        source,
        config,
        rows: &rows,
        newline: newline_of(source),
    };

    let mut edits = Vec::new();
    let mut report = FlattenReport::default();

    for decl in &tables {
        let row_fields = rows
            .get(decl.schema.unwrap_or_default(), &decl.name.value)
            .map(|t| t.fields.len());

        let insert = match decl.member("Insert") {
            Some(member) => flattener.insert(decl, member, &mut edits),
            None => BlockStatus::Absent,
        };
        let update = match decl.member("Update") {
            Some(member) => flattener.update(decl, member, &mut edits),
            None => BlockStatus::Absent,
        };

        report.tables.push(TableReport {
            schema: decl.schema.map(str::to_string),
            table: decl.name.value.clone(),
            row_fields,
            insert,
            update,
            relationships_added: false,
        });
    }

    if config.add_relationships {
        for planned in relationships::normalize(
            source,
            &tables,
            &config.relationships_marker,
            flattener.newline,
        ) {
            report.tables[planned.table_index].relationships_added = true;
            edits.push(planned.edit);
        }
        info!(
            added = report.relationships_added(),
            "relationships markers normalized"
        );
    }

    let changed = !edits.is_empty();
    let output = apply_edits(source, edits)?;

    Ok(FlattenOutcome {
        output,
        report,
        changed,
    })
}

/// Flatten a file in place, writing only when the content changed.
pub fn flatten_file(path: &Path, config: &FlattenConfig) -> Result<FlattenOutcome> {
    let source = std::fs::read_to_string(path)?;
    let outcome = flatten(&source, config)?;

    if outcome.changed() {
        std::fs::write(path, &outcome.output)?;
        info!(path = %path.display(), "wrote flattened declarations");
    } else {
        info!(path = %path.display(), "no circular declarations found; file left untouched");
    }

    Ok(outcome)
}

/// Shared state for per-member synthesis.
struct Flattener<'a> {
    source: &'a str,
    config: &'a FlattenConfig,
    rows: &'a RowIndex,
    /// Line ending of the document, reused for synthesized lines.
    newline: &'static str,
}

impl Flattener<'_> {
    fn insert(
        &self,
        decl: &TableDecl<'_>,
        member: &PropertySignature,
        edits: &mut Vec<Edit>,
    ) -> BlockStatus {
        if member.ty.as_object().is_some() {
            return BlockStatus::Flat;
        }

        let Some(circular) = circular_insert(&member.ty, self.source, &self.config.root_type)
        else {
            warn!(
                table = %decl.qualified_name(),
                insert = member.ty.text(self.source),
                "unrecognized Insert declaration; left as written"
            );
            return BlockStatus::Unrecognized;
        };

        let Some(row) = self.lookup(decl, &circular.target) else {
            return BlockStatus::Skipped;
        };

        for name in circular.overrides.keys().filter(|name| row.field(name).is_none()) {
            debug!(table = %decl.qualified_name(), field = %name, "override for unknown field ignored");
        }

        let fields = synthesize_insert(row, &circular.omit, &circular.overrides);
        edits.push(self.render(member, row, &fields));
        info!(table = %decl.qualified_name(), fields = fields.len(), "fixed Insert");
        BlockStatus::Fixed
    }

    fn update(
        &self,
        decl: &TableDecl<'_>,
        member: &PropertySignature,
        edits: &mut Vec<Edit>,
    ) -> BlockStatus {
        if member.ty.as_object().is_some() {
            return BlockStatus::Flat;
        }

        let Some(target) = circular_update(&member.ty, &self.config.root_type) else {
            warn!(
                table = %decl.qualified_name(),
                update = member.ty.text(self.source),
                "unrecognized Update declaration; left as written"
            );
            return BlockStatus::Unrecognized;
        };

        let Some(row) = self.lookup(decl, &target) else {
            return BlockStatus::Skipped;
        };

        let fields = synthesize_update(row);
        edits.push(self.render(member, row, &fields));
        info!(table = %decl.qualified_name(), fields = fields.len(), "fixed Update");
        BlockStatus::Fixed
    }

    fn lookup(&self, decl: &TableDecl<'_>, target: &TableRef) -> Option<&TableSchema> {
        let row = self.rows.get(&target.schema, &target.table);
        if row.is_none() {
            warn!(
                table = %decl.qualified_name(),
                target = %format!("{}.{}", target.schema, target.table),
                "no Row fields found for referenced table; left as written"
            );
        }
        row
    }

    /// Replace the member's type expression with a flat literal.
    fn render(
        &self,
        member: &PropertySignature,
        row: &TableSchema,
        fields: &[SynthesizedField],
    ) -> Edit {
        let close_indent = line_indent(self.source, member.name.span.start);
        let field_indent = row
            .layout
            .field_indent
            .clone()
            .unwrap_or_else(|| format!("{}{}", close_indent, self.config.indent_unit));
        let text = render_object(
            fields,
            &field_indent,
            close_indent,
            row.layout.separator,
            self.newline,
        );
        Edit::replace(member.ty.span, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = r#"export type Database = {
  public: {
    Tables: {
      campaigns: {
        Row: {
          id: string
          name: string
          created_at: string | null
        }
        Insert: Omit<Database['public']['Tables']['campaigns']['Row'], 'id'> & {
          id?: string
        }
        Update: Partial<Database['public']['Tables']['campaigns']['Insert']>
      }
    }
  }
}
"#;

    const EXPECTED: &str = r#"export type Database = {
  public: {
    Tables: {
      campaigns: {
        Row: {
          id: string
          name: string
          created_at: string | null
        }
        Insert: {
          id?: string
          name: string
          created_at?: string | null
        }
        Update: {
          id?: string
          name?: string
          created_at?: string | null
        }
        Relationships: []
      }
    }
  }
}
"#;

    #[test]
    fn test_flatten_scenario() {
        let outcome = flatten(SOURCE, &FlattenConfig::default()).unwrap();
        assert_eq!(outcome.output, EXPECTED);
        assert!(outcome.changed());

        let table = outcome.report.table("campaigns").unwrap();
        assert_eq!(table.row_fields, Some(3));
        assert_eq!(table.insert, BlockStatus::Fixed);
        assert_eq!(table.update, BlockStatus::Fixed);
        assert!(table.relationships_added);
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let once = flatten(SOURCE, &FlattenConfig::default()).unwrap();
        let twice = flatten(&once.output, &FlattenConfig::default()).unwrap();
        assert!(!twice.changed());
        assert_eq!(twice.output, once.output);
        let table = twice.report.table("campaigns").unwrap();
        assert_eq!(table.insert, BlockStatus::Flat);
        assert_eq!(table.update, BlockStatus::Flat);
        assert!(!table.relationships_added);
    }

    #[test]
    fn test_without_relationships() {
        let config = FlattenConfig::default().without_relationships();
        let outcome = flatten(SOURCE, &config).unwrap();
        assert!(!outcome.output.contains("Relationships"));
        assert_eq!(outcome.report.relationships_added(), 0);
    }

    #[test]
    fn test_missing_row_mapping_is_untouched() {
        let source = SOURCE
            .replace("['campaigns']['Row'], 'id'", "['ghosts']['Row'], 'id'")
            .replace("['campaigns']['Insert']", "['ghosts']['Insert']");
        let config = FlattenConfig::default().without_relationships();
        let outcome = flatten(&source, &config).unwrap();
        assert_eq!(outcome.output, source);
        assert!(!outcome.changed());
        let table = outcome.report.table("campaigns").unwrap();
        assert_eq!(table.insert, BlockStatus::Skipped);
        assert_eq!(table.update, BlockStatus::Skipped);
    }

    #[test]
    fn test_unrecognized_shape_is_untouched() {
        let source = SOURCE.replace(
            "Partial<Database['public']['Tables']['campaigns']['Insert']>",
            "Record<string, unknown>",
        );
        let config = FlattenConfig::default().without_relationships();
        let outcome = flatten(&source, &config).unwrap();
        assert!(outcome.output.contains("Update: Record<string, unknown>"));
        let table = outcome.report.table("campaigns").unwrap();
        assert_eq!(table.insert, BlockStatus::Fixed);
        assert_eq!(table.update, BlockStatus::Unrecognized);
    }

    #[test]
    fn test_indent_unit_used_without_row_layout() {
        let source = "type Database = {\n  public: {\n    Tables: {\n      t: {\n        Row: { id: number; label: string }\n        Insert: Omit<Database['public']['Tables']['t']['Row'], 'id'>\n        Relationships: []\n      }\n    }\n  }\n}\n";
        let config = FlattenConfig::default().with_indent_width(4);
        let outcome = flatten(source, &config).unwrap();
        assert!(outcome.output.contains(
            "        Insert: {\n            id?: number;\n            label: string;\n        }\n        Relationships: []"
        ));
    }

    #[test]
    fn test_crlf_document_keeps_crlf() {
        let source = SOURCE.replace('\n', "\r\n");
        let outcome = flatten(&source, &FlattenConfig::default()).unwrap();
        assert_eq!(outcome.output, EXPECTED.replace('\n', "\r\n"));

        let again = flatten(&outcome.output, &FlattenConfig::default()).unwrap();
        assert!(!again.changed());
    }

    #[test]
    fn test_optional_row_field_in_insert() {
        let source = "type Database = {\n  public: {\n    Tables: {\n      t: {\n        Row: {\n          id: string\n          note?: string\n        }\n        Insert: Omit<Database['public']['Tables']['t']['Row'], 'id'>\n        Relationships: []\n      }\n    }\n  }\n}\n";
        let outcome = flatten(source, &FlattenConfig::default()).unwrap();
        assert!(outcome.output.contains(
            "        Insert: {\n          id?: string\n          note?: string\n        }\n"
        ));
    }

    #[test]
    fn test_malformed_table_is_an_error() {
        let source = "type Database = { public: { Tables: { t: Something } } }";
        assert!(flatten(source, &FlattenConfig::default()).is_err());
    }

    #[test]
    fn test_no_tables_is_a_no_op() {
        let source = "export type Json = string | number\n";
        let outcome = flatten(source, &FlattenConfig::default()).unwrap();
        assert!(!outcome.changed());
        assert_eq!(outcome.output, source);
        assert!(outcome.report.tables.is_empty());
    }
}
