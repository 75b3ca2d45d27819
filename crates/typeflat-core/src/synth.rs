//! Insert and Update type synthesis.

use crate::circular::{OmitSet, OverrideMap};
use crate::extract::TableSchema;
use typeflat_lang::Separator;

/// One field of a synthesized flat type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedField {
    /// Key as it will be written.
    pub key: String,
    pub ty: String,
    pub optional: bool,
}

impl SynthesizedField {
    fn optional(key: &str, ty: &str) -> Self {
        Self {
            key: key.to_string(),
            ty: ty.to_string(),
            optional: true,
        }
    }
}

/// Synthesize the flat Insert type of a table.
///
/// Per field, in priority order: omitted fields are optional with their Row
/// type; overridden fields are optional with the override type; nullable
/// fields and fields declared `?` in the Row are optional; everything else is
/// required. Row order is kept.
pub fn synthesize_insert(
    table: &TableSchema,
    omit: &OmitSet,
    overrides: &OverrideMap,
) -> Vec<SynthesizedField> {
    table
        .fields
        .iter()
        .map(|field| {
            if omit.contains(&field.name) {
                SynthesizedField::optional(&field.key, &field.ty)
            } else if let Some(ty) = overrides.get(&field.name) {
                SynthesizedField::optional(&field.key, ty)
            } else {
                SynthesizedField {
                    key: field.key.clone(),
                    ty: field.ty.clone(),
                    optional: field.nullable || field.optional,
                }
            }
        })
        .collect()
}

/// Synthesize the flat Update type of a table: every Row field, optional.
pub fn synthesize_update(table: &TableSchema) -> Vec<SynthesizedField> {
    table
        .fields
        .iter()
        .map(|field| SynthesizedField::optional(&field.key, &field.ty))
        .collect()
}

/// Render fields as a multi-line object literal.
///
/// `field_indent` prefixes every field line, `close_indent` the closing brace.
/// Lines end with `newline` so the block matches the surrounding document.
pub fn render_object(
    fields: &[SynthesizedField],
    field_indent: &str,
    close_indent: &str,
    separator: Option<Separator>,
    newline: &str,
) -> String {
    if fields.is_empty() {
        return "{}".to_string();
    }

    let sep = separator.map_or("", Separator::as_str);
    let mut out = String::from("{");
    out.push_str(newline);
    for field in fields {
        out.push_str(field_indent);
        out.push_str(&field.key);
        if field.optional {
            out.push('?');
        }
        out.push_str(": ");
        out.push_str(&field.ty);
        out.push_str(sep);
        out.push_str(newline);
    }
    out.push_str(close_indent);
    out.push('}');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::FieldSpec;
    use pretty_assertions::assert_eq;

    fn campaigns() -> TableSchema {
        TableSchema::new(
            "campaigns",
            vec![
                FieldSpec::new("id", "string"),
                FieldSpec::new("name", "string"),
                FieldSpec::new("created_at", "string | null"),
            ],
        )
    }

    fn shape(fields: &[SynthesizedField]) -> Vec<(String, bool, String)> {
        fields
            .iter()
            .map(|f| (f.key.clone(), f.optional, f.ty.clone()))
            .collect()
    }

    #[test]
    fn test_insert_scenario() {
        let omit = OmitSet::from(["id".to_string()]);
        let fields = synthesize_insert(&campaigns(), &omit, &OverrideMap::new());
        assert_eq!(
            shape(&fields),
            vec![
                ("id".to_string(), true, "string".to_string()),
                ("name".to_string(), false, "string".to_string()),
                ("created_at".to_string(), true, "string | null".to_string()),
            ]
        );
        assert_eq!(
            render_object(&fields, "", "", Some(Separator::Semicolon), "\n"),
            "{\nid?: string;\nname: string;\ncreated_at?: string | null;\n}"
        );
    }

    #[test]
    fn test_update_scenario() {
        let fields = synthesize_update(&campaigns());
        assert_eq!(fields.len(), 3);
        assert!(fields.iter().all(|f| f.optional));
        assert_eq!(
            render_object(&fields, "  ", "", None, "\n"),
            "{\n  id?: string\n  name?: string\n  created_at?: string | null\n}"
        );
    }

    #[test]
    fn test_priority_order() {
        let table = TableSchema::new(
            "t",
            vec![
                FieldSpec::new("a", "string"),
                FieldSpec::new("b", "number"),
                FieldSpec::new("c", "Json | null"),
                FieldSpec::new("d", "boolean"),
            ],
        );
        let omit = OmitSet::from(["a".to_string()]);
        let overrides = OverrideMap::from([
            ("a".to_string(), "never".to_string()),
            ("b".to_string(), "number | string".to_string()),
            ("zzz".to_string(), "string".to_string()),
        ]);
        let fields = synthesize_insert(&table, &omit, &overrides);
        assert_eq!(
            shape(&fields),
            vec![
                ("a".to_string(), true, "string".to_string()),
                ("b".to_string(), true, "number | string".to_string()),
                ("c".to_string(), true, "Json | null".to_string()),
                ("d".to_string(), false, "boolean".to_string()),
            ]
        );
    }

    #[test]
    fn test_optional_row_field_stays_optional() {
        let table = TableSchema::new(
            "t",
            vec![
                FieldSpec::new("id", "string"),
                FieldSpec::new("note", "string").optional(),
                FieldSpec::new("body", "string"),
            ],
        );
        let omit = OmitSet::from(["id".to_string()]);
        let fields = synthesize_insert(&table, &omit, &OverrideMap::new());
        assert_eq!(
            shape(&fields),
            vec![
                ("id".to_string(), true, "string".to_string()),
                ("note".to_string(), true, "string".to_string()),
                ("body".to_string(), false, "string".to_string()),
            ]
        );
    }

    #[test]
    fn test_crlf_rendering() {
        let fields = synthesize_update(&campaigns());
        assert_eq!(
            render_object(&fields[..2], "    ", "  ", None, "\r\n"),
            "{\r\n    id?: string\r\n    name?: string\r\n  }"
        );
    }

    #[test]
    fn test_empty_table_renders_empty_object() {
        let table = TableSchema::new("t", vec![]);
        let fields = synthesize_update(&table);
        assert_eq!(render_object(&fields, "  ", "", None, "\n"), "{}");
    }

    #[test]
    fn test_quoted_keys_are_kept() {
        let mut field = FieldSpec::new("my-col", "string");
        field.key = "\"my-col\"".to_string();
        let table = TableSchema::new("t", vec![field]);
        let fields = synthesize_insert(&table, &OmitSet::from(["my-col".to_string()]), &OverrideMap::new());
        assert_eq!(render_object(&fields, "", "", None, "\n"), "{\n\"my-col\"?: string\n}");
    }
}
