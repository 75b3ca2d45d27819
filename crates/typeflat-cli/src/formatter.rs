//! Output formatters for flattening reports.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use typeflat_core::{BlockStatus, FlattenReport, TableReport};

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Text,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render a report in the requested format.
///
/// `changed` is whether the document differs from its input; `pending` marks
/// a run that did not write anything (`--check` or `--dry-run`).
pub fn format_report(
    report: &FlattenReport,
    format: OutputFormat,
    changed: bool,
    pending: bool,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(format_text(report, pending)),
        OutputFormat::Json => format_json(report, changed, pending),
    }
}

/// Table of every table's outcome followed by a summary line.
fn format_text(report: &FlattenReport, pending: bool) -> String {
    if report.tables.is_empty() {
        return "No tables found".to_string();
    }

    let mut table = Table::new();
    table.set_header(vec!["Table", "Row fields", "Insert", "Update", "Relationships"]);

    for entry in &report.tables {
        table.add_row(vec![
            Cell::new(qualified(entry)),
            Cell::new(
                entry
                    .row_fields
                    .map_or_else(|| "-".to_string(), |n| n.to_string()),
            ),
            Cell::new(status_label(entry.insert, pending)),
            Cell::new(status_label(entry.update, pending)),
            Cell::new(if entry.relationships_added {
                if pending { "would add" } else { "added" }
            } else {
                ""
            }),
        ]);
    }

    format!("{}\n{}", table, summary(report, pending))
}

fn format_json(
    report: &FlattenReport,
    changed: bool,
    pending: bool,
) -> Result<String, serde_json::Error> {
    let value = serde_json::json!({
        "changed": changed,
        "written": changed && !pending,
        "inserts_fixed": report.inserts_fixed(),
        "updates_fixed": report.updates_fixed(),
        "relationships_added": report.relationships_added(),
        "tables": report.tables,
    });
    serde_json::to_string_pretty(&value)
}

/// One-line summary of a run.
pub fn summary(report: &FlattenReport, pending: bool) -> String {
    let mut line = format!(
        "{} table(s): {} Insert and {} Update block(s) {}",
        report.tables.len(),
        report.inserts_fixed(),
        report.updates_fixed(),
        if pending { "to fix" } else { "fixed" },
    );
    if report.relationships_added() > 0 {
        line.push_str(&format!(
            ", {} Relationships marker(s) {}",
            report.relationships_added(),
            if pending { "to add" } else { "added" },
        ));
    }
    let skipped = report.skipped().count();
    if skipped > 0 {
        line.push_str(&format!(", {} table(s) skipped", skipped));
    }
    line
}

fn qualified(entry: &TableReport) -> String {
    match &entry.schema {
        Some(schema) => format!("{}.{}", schema, entry.table),
        None => entry.table.clone(),
    }
}

fn status_label(status: BlockStatus, pending: bool) -> &'static str {
    match status {
        BlockStatus::Fixed if pending => "circular",
        other => other.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> FlattenReport {
        FlattenReport {
            tables: vec![
                TableReport {
                    schema: Some("public".to_string()),
                    table: "campaigns".to_string(),
                    row_fields: Some(3),
                    insert: BlockStatus::Fixed,
                    update: BlockStatus::Fixed,
                    relationships_added: true,
                },
                TableReport {
                    schema: Some("public".to_string()),
                    table: "leads".to_string(),
                    row_fields: None,
                    insert: BlockStatus::Skipped,
                    update: BlockStatus::Flat,
                    relationships_added: false,
                },
            ],
        }
    }

    #[test]
    fn test_text_report() {
        let out = format_report(&report(), OutputFormat::Text, true, false).unwrap();
        assert!(out.contains("public.campaigns"));
        assert!(out.contains("fixed"));
        assert!(out.contains("skipped"));
        assert!(out.ends_with(
            "2 table(s): 1 Insert and 1 Update block(s) fixed, 1 Relationships marker(s) added, 1 table(s) skipped"
        ));
    }

    #[test]
    fn test_pending_labels() {
        let out = format_report(&report(), OutputFormat::Text, true, true).unwrap();
        assert!(out.contains("circular"));
        assert!(out.contains("would add"));
        assert!(out.contains("block(s) to fix"));
    }

    #[test]
    fn test_json_report() {
        let out = format_report(&report(), OutputFormat::Json, true, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["changed"], true);
        assert_eq!(value["written"], false);
        assert_eq!(value["inserts_fixed"], 1);
        assert_eq!(value["tables"][1]["insert"], "skipped");
        assert_eq!(value["tables"][1]["row_fields"], serde_json::Value::Null);
    }

    #[test]
    fn test_empty_report() {
        let out = format_report(&FlattenReport::default(), OutputFormat::Text, false, false).unwrap();
        assert_eq!(out, "No tables found");
    }

    #[test]
    fn test_display() {
        assert_eq!(OutputFormat::Text.to_string(), "text");
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }
}
