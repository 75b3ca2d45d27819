//! Per-table outcome of a flattening run.

use serde::Serialize;

/// What happened to an `Insert` or `Update` member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockStatus {
    /// Already a flat object literal.
    Flat,
    /// A circular declaration that was replaced.
    Fixed,
    /// Circular, but the referenced table has no Row mapping.
    Skipped,
    /// Some other shape; left as written.
    Unrecognized,
    /// The member is not declared.
    Absent,
}

impl BlockStatus {
    /// Short label for tables.
    pub fn as_str(self) -> &'static str {
        match self {
            BlockStatus::Flat => "flat",
            BlockStatus::Fixed => "fixed",
            BlockStatus::Skipped => "skipped",
            BlockStatus::Unrecognized => "unrecognized",
            BlockStatus::Absent => "absent",
        }
    }
}

impl std::fmt::Display for BlockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub schema: Option<String>,
    pub table: String,
    /// Number of Row fields, if a Row mapping exists.
    pub row_fields: Option<usize>,
    pub insert: BlockStatus,
    pub update: BlockStatus,
    pub relationships_added: bool,
}

impl TableReport {
    /// Whether the run changed (or, in a dry run, would change) this table.
    pub fn changed(&self) -> bool {
        self.insert == BlockStatus::Fixed
            || self.update == BlockStatus::Fixed
            || self.relationships_added
    }
}

/// Outcome of a flattening run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlattenReport {
    pub tables: Vec<TableReport>,
}

impl FlattenReport {
    /// Find the report for a table.
    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables.iter().find(|t| t.table == name)
    }

    /// Number of Insert members replaced.
    pub fn inserts_fixed(&self) -> usize {
        self.count(|t| t.insert == BlockStatus::Fixed)
    }

    /// Number of Update members replaced.
    pub fn updates_fixed(&self) -> usize {
        self.count(|t| t.update == BlockStatus::Fixed)
    }

    /// Number of relationships markers inserted.
    pub fn relationships_added(&self) -> usize {
        self.count(|t| t.relationships_added)
    }

    /// Tables whose circular members could not be resolved.
    pub fn skipped(&self) -> impl Iterator<Item = &TableReport> {
        self.tables
            .iter()
            .filter(|t| t.insert == BlockStatus::Skipped || t.update == BlockStatus::Skipped)
    }

    /// Tables touched by the run.
    pub fn changed_tables(&self) -> impl Iterator<Item = &TableReport> {
        self.tables.iter().filter(|t| t.changed())
    }

    fn count(&self, pred: impl Fn(&TableReport) -> bool) -> usize {
        self.tables.iter().filter(|t| pred(t)).count()
    }
}
