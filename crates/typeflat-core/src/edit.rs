//! Span-based text edits applied against the input text.

use crate::error::{Error, Result};
use typeflat_lang::Span;

/// Replace `span` of the input text with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub span: Span,
    pub replacement: String,
}

impl Edit {
    /// Replace a span.
    pub fn replace(span: Span, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }

    /// Insert text at an offset.
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::replace(Span::at(offset), text)
    }
}

/// Apply non-overlapping edits in a single pass.
///
/// An insertion may sit exactly at the end of a replaced span; any other
/// overlap is an error and nothing is applied.
pub fn apply_edits(source: &str, mut edits: Vec<Edit>) -> Result<String> {
    edits.sort_by_key(|e| (e.span.start, e.span.end));

    for pair in edits.windows(2) {
        if pair[0].span.end > pair[1].span.start
            || (pair[0].span == pair[1].span && pair[0].span.is_empty())
        {
            return Err(Error::OverlappingEdits {
                offset: pair[1].span.start,
            });
        }
    }

    let growth: usize = edits.iter().map(|e| e.replacement.len()).sum();
    let mut output = String::with_capacity(source.len() + growth);
    let mut cursor = 0;
    for edit in &edits {
        output.push_str(&source[cursor..edit.span.start]);
        output.push_str(&edit.replacement);
        cursor = edit.span.end;
    }
    output.push_str(&source[cursor..]);

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_in_any_order() {
        let source = "Insert: A\nUpdate: B\n";
        let edits = vec![
            Edit::replace(Span::new(18, 19), "{ b?: string }"),
            Edit::insert(19, "\nRelationships: []"),
            Edit::replace(Span::new(8, 9), "{ a: string }"),
        ];
        let out = apply_edits(source, edits).unwrap();
        assert_eq!(
            out,
            "Insert: { a: string }\nUpdate: { b?: string }\nRelationships: []\n"
        );
    }

    #[test]
    fn test_no_edits_is_identity() {
        assert_eq!(apply_edits("abc", Vec::new()).unwrap(), "abc");
    }

    #[test]
    fn test_overlap_rejected() {
        let edits = vec![
            Edit::replace(Span::new(0, 5), "x"),
            Edit::replace(Span::new(3, 6), "y"),
        ];
        let err = apply_edits("0123456789", edits).unwrap_err();
        assert!(matches!(err, Error::OverlappingEdits { offset: 3 }));

        let edits = vec![Edit::insert(2, "a"), Edit::insert(2, "b")];
        assert!(apply_edits("0123", edits).is_err());
    }
}
