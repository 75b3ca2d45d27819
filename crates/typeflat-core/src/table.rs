//! Table declarations found in `Tables` blocks.

use crate::error::{Error, Result};
use typeflat_lang::{Document, ObjectType, PropertySignature, Spanned};

/// One table entry: `name: { Row: ..., Insert: ..., Update: ... }`.
#[derive(Debug, Clone, Copy)]
pub struct TableDecl<'d> {
    /// Schema that owns the `Tables` block, when the block is keyed.
    pub schema: Option<&'d str>,
    /// Table name as written.
    pub name: &'d Spanned<String>,
    /// Table body.
    pub body: &'d ObjectType,
}

impl<'d> TableDecl<'d> {
    /// Find a member such as `Row` or `Insert`.
    pub fn member(&self, name: &str) -> Option<&'d PropertySignature> {
        self.body.property(name)
    }

    /// `schema.table` for log output.
    pub fn qualified_name(&self) -> String {
        match self.schema {
            Some(schema) => format!("{}.{}", schema, self.name.value),
            None => self.name.value.clone(),
        }
    }
}

/// Collect every table of every `Tables` block, in source order.
///
/// A table whose value is not an object literal, or whose body is empty,
/// cannot be flattened or normalized and is reported as malformed.
pub fn collect_tables(document: &Document) -> Result<Vec<TableDecl<'_>>> {
    let mut tables = Vec::with_capacity(document.table_count());

    for block in &document.blocks {
        let schema = block.schema.as_ref().map(|s| s.value.as_str());
        for property in block.tables.properties() {
            let body = property.ty.as_object().ok_or_else(|| {
                Error::malformed_table(
                    schema,
                    &property.name.value,
                    "table body is not an object literal",
                    property.name.span.start,
                )
            })?;
            if body.members.is_empty() {
                return Err(Error::malformed_table(
                    schema,
                    &property.name.value,
                    "table body is empty",
                    property.name.span.start,
                ));
            }
            tables.push(TableDecl {
                schema,
                name: &property.name,
                body,
            });
        }
    }

    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use typeflat_lang::parse_document;

    #[test]
    fn test_collect_tables_across_schemas() {
        let source = "type Database = {\n  public: { Tables: { a: { Row: { id: string } }; b: { Row: { id: string } } } }\n  genesis: { Tables: { c: { Row: { id: number } } } }\n}";
        let doc = parse_document(source).unwrap();
        let tables = collect_tables(&doc).unwrap();
        let names: Vec<_> = tables.iter().map(|t| t.qualified_name()).collect();
        assert_eq!(names, vec!["public.a", "public.b", "genesis.c"]);
        assert!(tables[0].member("Row").is_some());
        assert!(tables[0].member("Insert").is_none());
    }

    #[test]
    fn test_non_object_table_is_malformed() {
        let source = "type Database = { public: { Tables: { a: Other['x'] } } }";
        let doc = parse_document(source).unwrap();
        let err = collect_tables(&doc).unwrap_err();
        assert!(matches!(err, Error::MalformedTable { ref table, .. } if table == "a"));
    }

    #[test]
    fn test_empty_table_is_malformed() {
        let source = "type Database = { public: { Tables: { a: {} } } }";
        let doc = parse_document(source).unwrap();
        let err = collect_tables(&doc).unwrap_err();
        assert!(err.to_string().contains("table body is empty"));
    }

    #[test]
    fn test_unkeyed_tables_block() {
        let source = "type X = { Tables: { a: { Row: { id: string } } } }";
        let doc = parse_document(source).unwrap();
        let tables = collect_tables(&doc).unwrap();
        assert_eq!(tables[0].schema, None);
        assert_eq!(tables[0].qualified_name(), "a");
    }
}
