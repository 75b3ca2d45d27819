//! Integration tests for flattening a generated declaration file.

use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use typeflat_core::{flatten, flatten_file, BlockStatus, FlattenConfig};

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {}", path.display(), e))
}

#[test]
fn test_fixture_matches_golden_output() {
    let source = fixture("database.types.ts");
    let expected = fixture("expected.types.ts");

    let outcome = flatten(&source, &FlattenConfig::default()).unwrap();
    assert_eq!(outcome.output, expected);
    assert!(outcome.changed());
}

#[test]
fn test_fixture_report() {
    let source = fixture("database.types.ts");
    let outcome = flatten(&source, &FlattenConfig::default()).unwrap();
    let report = &outcome.report;

    let names: Vec<_> = report
        .tables
        .iter()
        .map(|t| format!("{}.{}", t.schema.as_deref().unwrap_or("-"), t.table))
        .collect();
    assert_eq!(
        names,
        vec!["genesis.seeds", "public.campaigns", "public.leads", "public.notes"]
    );

    assert_eq!(report.inserts_fixed(), 3);
    assert_eq!(report.updates_fixed(), 3);
    assert_eq!(report.relationships_added(), 2);
    assert_eq!(report.skipped().count(), 0);

    let campaigns = report.table("campaigns").unwrap();
    assert_eq!(campaigns.row_fields, Some(4));
    assert!(!campaigns.relationships_added);

    let notes = report.table("notes").unwrap();
    assert_eq!(notes.insert, BlockStatus::Flat);
    assert_eq!(notes.update, BlockStatus::Flat);
    assert!(notes.relationships_added);
}

#[test]
fn test_golden_output_is_a_fixed_point() {
    let expected = fixture("expected.types.ts");
    let outcome = flatten(&expected, &FlattenConfig::default()).unwrap();
    assert!(!outcome.changed());
    assert_eq!(outcome.output, expected);
    assert_eq!(outcome.report.changed_tables().count(), 0);
}

#[test]
fn test_update_fields_match_row_fields() {
    let source = fixture("database.types.ts");
    let outcome = flatten(&source, &FlattenConfig::default()).unwrap();
    let flat = typeflat_core::lang::parse_document(&outcome.output).unwrap();
    let tables = typeflat_core::collect_tables(&flat).unwrap();

    for table in tables {
        let row = table.member("Row").and_then(|m| m.ty.as_object()).unwrap();
        let update = table.member("Update").and_then(|m| m.ty.as_object()).unwrap();
        let row_names: Vec<_> = row.properties().map(|p| p.name.value.as_str()).collect();
        let update_names: Vec<_> = update.properties().map(|p| p.name.value.as_str()).collect();
        assert_eq!(row_names, update_names, "table {}", table.qualified_name());
        assert!(update.properties().all(|p| p.optional));
    }
}

#[test]
fn test_crlf_fixture_keeps_line_endings() {
    let source = fixture("database.types.ts").replace('\n', "\r\n");
    let expected = fixture("expected.types.ts").replace('\n', "\r\n");

    let outcome = flatten(&source, &FlattenConfig::default()).unwrap();
    assert_eq!(outcome.output, expected);
    assert!(!outcome.output.replace("\r\n", "").contains('\n'));
}

#[test]
fn test_unresolved_table_is_left_byte_for_byte() {
    let source = fixture("database.types.ts").replace(
        "Omit<Database['public']['Tables']['leads']['Row'], 'id'>",
        "Omit<Database['public']['Tables']['prospects']['Row'], 'id'>",
    );
    let config = FlattenConfig::default().without_relationships();
    let outcome = flatten(&source, &config).unwrap();

    let leads = outcome.report.table("leads").unwrap();
    assert_eq!(leads.insert, BlockStatus::Skipped);
    assert_eq!(leads.update, BlockStatus::Fixed);
    assert!(outcome.output.contains(
        "        Insert: Omit<Database['public']['Tables']['prospects']['Row'], 'id'> & {\n          score?: number\n        }\n"
    ));
}

#[test]
fn test_flatten_file_rewrites_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("database.types.ts");
    fs::write(&path, fixture("database.types.ts")).unwrap();

    let outcome = flatten_file(&path, &FlattenConfig::default()).unwrap();
    assert!(outcome.changed());
    assert_eq!(fs::read_to_string(&path).unwrap(), fixture("expected.types.ts"));

    let again = flatten_file(&path, &FlattenConfig::default()).unwrap();
    assert!(!again.changed());
    assert_eq!(fs::read_to_string(&path).unwrap(), fixture("expected.types.ts"));
}

#[test]
fn test_flatten_file_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let err = flatten_file(&dir.path().join("absent.ts"), &FlattenConfig::default()).unwrap_err();
    assert!(matches!(err, typeflat_core::Error::Io(_)));
}

#[test]
fn test_custom_root_type() {
    let source = fixture("database.types.ts")
        .replace("export type Database = {", "export type Schema = {")
        .replace("Database[", "Schema[");
    let config = FlattenConfig::default().with_root_type("Schema");
    let outcome = flatten(&source, &config).unwrap();
    assert_eq!(outcome.report.inserts_fixed(), 3);

    let outcome = flatten(&source, &FlattenConfig::default()).unwrap();
    assert_eq!(outcome.report.inserts_fixed(), 0);
    assert_eq!(outcome.report.table("seeds").unwrap().insert, BlockStatus::Unrecognized);
}
