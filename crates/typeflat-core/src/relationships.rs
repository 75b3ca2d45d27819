//! Relationships marker normalization.

use std::collections::VecDeque;

use crate::edit::Edit;
use crate::table::TableDecl;
use tracing::debug;
use typeflat_lang::span::{line_end, line_indent, spans_lines};

/// Member name that marks a table's relationship list.
pub const RELATIONSHIPS_MEMBER: &str = "Relationships";

/// A planned marker insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerInsertion {
    /// Position of the table in the slice passed to [`normalize`].
    pub table_index: usize,
    pub edit: Edit,
}

/// Plan a marker insertion for every table without a relationships member.
///
/// Tables are drained from a worklist and each is visited once, so the work
/// is bounded by the table count. Positions come from the parse tree, so
/// the last table of a block needs no special handling. New lines end with
/// `newline`.
pub fn normalize(
    source: &str,
    tables: &[TableDecl<'_>],
    marker: &str,
    newline: &str,
) -> Vec<MarkerInsertion> {
    let mut worklist: VecDeque<(usize, &TableDecl<'_>)> = tables
        .iter()
        .enumerate()
        .filter(|(_, t)| t.member(RELATIONSHIPS_MEMBER).is_none())
        .collect();

    let mut planned = Vec::with_capacity(worklist.len());
    while let Some((table_index, table)) = worklist.pop_front() {
        // collect_tables rejects empty bodies
        let Some(last) = table.body.members.last() else {
            continue;
        };

        let separator = last.separator().map(|s| s.value.as_str());
        let (offset, text) = if spans_lines(source, table.body.span.start, last.span().start) {
            let indent = line_indent(source, last.span().start);
            let text = format!("{}{}{}{}", newline, indent, marker, separator.unwrap_or(""));
            (after_trailing_comment(source, last.end()), text)
        } else {
            // Single-line body: members need an explicit separator
            let text = match separator {
                Some(sep) => format!(" {}{}", marker, sep),
                None => format!("; {}", marker),
            };
            (last.end(), text)
        };

        debug!(table = %table.qualified_name(), "adding relationships marker");
        planned.push(MarkerInsertion {
            table_index,
            edit: Edit::insert(offset, text),
        });
    }

    planned
}

/// Skip a `// comment` that closes the line at `offset`, so it stays on its member.
fn after_trailing_comment(source: &str, offset: usize) -> usize {
    let end = line_end(source, offset);
    if source[offset..end].trim_start().starts_with("//") {
        end
    } else {
        offset
    }
}
