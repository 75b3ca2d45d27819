//! Recognition of circular `Insert`/`Update` declarations.

use std::collections::{BTreeMap, BTreeSet};
use typeflat_lang::{TypeExpr, TypeKind};

/// Row fields excluded by `Omit<..., 'a' | 'b'>`.
pub type OmitSet = BTreeSet<String>;

/// Field types supplied by the `& { ... }` part of an Insert declaration.
pub type OverrideMap = BTreeMap<String, String>;

/// `Database['schema']['Tables']['table']['part']`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub schema: String,
    pub table: String,
    pub part: String,
}

/// A recognized circular Insert declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircularInsert {
    /// The referenced Row.
    pub target: TableRef,
    pub omit: OmitSet,
    pub overrides: OverrideMap,
}

/// Decode an indexed-access chain rooted at `root`.
pub fn table_ref(expr: &TypeExpr, root: &str) -> Option<TableRef> {
    let mut path = Vec::new();
    let mut cursor = expr.unparenthesized();

    loop {
        match &cursor.kind {
            TypeKind::IndexedAccess { object, index } => {
                path.push(index.as_string_literal()?.to_string());
                cursor = object.unparenthesized();
            }
            TypeKind::Reference { name, args } if name.value == root && args.is_empty() => break,
            _ => return None,
        }
    }

    path.reverse();
    match <[String; 4]>::try_from(path) {
        Ok([schema, tables, table, part]) if tables == "Tables" => Some(TableRef {
            schema,
            table,
            part,
        }),
        _ => None,
    }
}

/// Recognize the circular Insert shapes:
///
/// - `Omit<Root[s]['Tables'][t]['Row'], keys> & { overrides }` (either order)
/// - `Omit<Root[s]['Tables'][t]['Row'], keys>`
/// - `Root[s]['Tables'][t]['Row']`
pub fn circular_insert(expr: &TypeExpr, source: &str, root: &str) -> Option<CircularInsert> {
    let expr = expr.unparenthesized();

    match &expr.kind {
        TypeKind::Intersection(parts) => {
            let mut omit = None;
            let mut overrides = OverrideMap::new();

            for part in parts {
                let part = part.unparenthesized();
                if let Some(object) = part.as_object() {
                    for property in object.properties() {
                        overrides.insert(
                            property.name.value.clone(),
                            property.ty.text(source).to_string(),
                        );
                    }
                } else if omit.is_none() {
                    omit = Some(omit_of_row(part, root)?);
                } else {
                    return None;
                }
            }

            let (target, omit) = omit?;
            Some(CircularInsert {
                target,
                omit,
                overrides,
            })
        }
        TypeKind::Reference { .. } => {
            let (target, omit) = omit_of_row(expr, root)?;
            Some(CircularInsert {
                target,
                omit,
                overrides: OverrideMap::new(),
            })
        }
        TypeKind::IndexedAccess { .. } => {
            let target = table_ref(expr, root).filter(|r| r.part == "Row")?;
            Some(CircularInsert {
                target,
                omit: OmitSet::new(),
                overrides: OverrideMap::new(),
            })
        }
        _ => None,
    }
}

/// Recognize `Partial<Root[s]['Tables'][t]['Insert' | 'Row' | 'Update']>`.
pub fn circular_update(expr: &TypeExpr, root: &str) -> Option<TableRef> {
    match &expr.unparenthesized().kind {
        TypeKind::Reference { name, args } if name.value == "Partial" && args.len() == 1 => {
            table_ref(&args[0], root)
                .filter(|r| matches!(r.part.as_str(), "Insert" | "Row" | "Update"))
        }
        _ => None,
    }
}

/// `Omit<Row, keys>` into its target and key set.
fn omit_of_row(expr: &TypeExpr, root: &str) -> Option<(TableRef, OmitSet)> {
    let TypeKind::Reference { name, args } = &expr.kind else {
        return None;
    };
    if name.value != "Omit" || args.len() != 2 {
        return None;
    }
    let target = table_ref(&args[0], root).filter(|r| r.part == "Row")?;
    let keys = string_keys(&args[1])?;
    Some((target, keys))
}

/// A string literal, a union of string literals, or `never`.
fn string_keys(expr: &TypeExpr) -> Option<OmitSet> {
    let expr = expr.unparenthesized();
    match &expr.kind {
        TypeKind::StringLiteral(key) => Some(OmitSet::from([key.clone()])),
        TypeKind::Union(members) => members
            .iter()
            .map(|m| m.unparenthesized().as_string_literal().map(str::to_string))
            .collect(),
        TypeKind::Reference { name, args } if name.value == "never" && args.is_empty() => {
            Some(OmitSet::new())
        }
        _ => None,
    }
}
