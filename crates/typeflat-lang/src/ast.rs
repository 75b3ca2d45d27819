//! Abstract Syntax Tree types for type declarations.

use crate::span::{Span, Spanned};

/// A parsed type expression.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    /// What kind of type this is.
    pub kind: TypeKind,
    /// The full span of the expression.
    pub span: Span,
}

/// The shape of a type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// `A | B | C`
    Union(Vec<TypeExpr>),
    /// `A & B`
    Intersection(Vec<TypeExpr>),
    /// A named type with optional type arguments: `string`, `Omit<T, K>`, `ns.Name`.
    Reference {
        name: Spanned<String>,
        args: Vec<TypeExpr>,
    },
    /// `T[K]`
    IndexedAccess {
        object: Box<TypeExpr>,
        index: Box<TypeExpr>,
    },
    /// `T[]`
    Array(Box<TypeExpr>),
    /// `{ ... }`
    Object(ObjectType),
    /// `[A, B]`
    Tuple(Vec<TypeExpr>),
    /// `'text'`, `"text"` or a template literal.
    StringLiteral(String),
    /// `42`
    NumberLiteral(String),
    /// `null`
    Null,
    /// `undefined`
    Undefined,
    /// `(T)`
    Parenthesized(Box<TypeExpr>),
    /// `keyof T`, `typeof x`, `readonly T[]`, `unique symbol`
    TypeOperator {
        operator: String,
        operand: Box<TypeExpr>,
    },
}

impl TypeExpr {
    /// Create a new type expression.
    pub fn new(kind: TypeKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The exact source text of this expression.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        self.span.slice(source)
    }

    /// Whether a `null` type appears anywhere inside this expression.
    pub fn contains_null(&self) -> bool {
        match &self.kind {
            TypeKind::Null => true,
            TypeKind::Union(items) | TypeKind::Intersection(items) | TypeKind::Tuple(items) => {
                items.iter().any(TypeExpr::contains_null)
            }
            TypeKind::Reference { args, .. } => args.iter().any(TypeExpr::contains_null),
            TypeKind::IndexedAccess { object, index } => {
                object.contains_null() || index.contains_null()
            }
            TypeKind::Array(inner) | TypeKind::Parenthesized(inner) => inner.contains_null(),
            TypeKind::TypeOperator { operand, .. } => operand.contains_null(),
            TypeKind::Object(object) => object.members.iter().any(|m| match m {
                Member::Property(p) => p.ty.contains_null(),
                Member::Index(i) => i.key_type.contains_null() || i.ty.contains_null(),
            }),
            TypeKind::StringLiteral(_) | TypeKind::NumberLiteral(_) | TypeKind::Undefined => false,
        }
    }

    /// The string value if this is a string literal type.
    pub fn as_string_literal(&self) -> Option<&str> {
        match &self.kind {
            TypeKind::StringLiteral(s) => Some(s),
            _ => None,
        }
    }

    /// The object literal if this is one.
    pub fn as_object(&self) -> Option<&ObjectType> {
        match &self.kind {
            TypeKind::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Strip any number of enclosing parentheses.
    pub fn unparenthesized(&self) -> &TypeExpr {
        let mut expr = self;
        while let TypeKind::Parenthesized(inner) = &expr.kind {
            expr = inner;
        }
        expr
    }
}

/// An object type literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectType {
    /// Members in declaration order.
    pub members: Vec<Member>,
    /// Span from `{` to `}` inclusive.
    pub span: Span,
}

impl ObjectType {
    /// Iterate over property signatures, skipping index signatures.
    pub fn properties(&self) -> impl Iterator<Item = &PropertySignature> {
        self.members.iter().filter_map(|m| match m {
            Member::Property(p) => Some(p),
            Member::Index(_) => None,
        })
    }

    /// Find a property by name.
    pub fn property(&self, name: &str) -> Option<&PropertySignature> {
        self.properties().find(|p| p.name.value == name)
    }
}

/// Member separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// `;`
    Semicolon,
    /// `,`
    Comma,
}

impl Separator {
    /// The separator as source text.
    pub fn as_str(self) -> &'static str {
        match self {
            Separator::Semicolon => ";",
            Separator::Comma => ",",
        }
    }
}

/// A member of an object type literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    /// `name?: T`
    Property(PropertySignature),
    /// `[key: string]: T` or `[K in U]: T`
    Index(IndexSignature),
}

impl Member {
    /// Span of the member without its separator.
    pub fn span(&self) -> Span {
        match self {
            Member::Property(p) => p.span,
            Member::Index(i) => i.span,
        }
    }

    /// The separator that ended this member, if any.
    pub fn separator(&self) -> Option<&Spanned<Separator>> {
        match self {
            Member::Property(p) => p.separator.as_ref(),
            Member::Index(i) => i.separator.as_ref(),
        }
    }

    /// Byte offset just past the member, including its separator.
    pub fn end(&self) -> usize {
        self.separator()
            .map_or(self.span().end, |sep| sep.span.end)
    }
}

/// A property signature.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySignature {
    /// Property name, unquoted.
    pub name: Spanned<String>,
    /// Whether the property is marked `?`.
    pub optional: bool,
    /// Declared type.
    pub ty: TypeExpr,
    /// Trailing `;` or `,`.
    pub separator: Option<Spanned<Separator>>,
    /// Span from the name to the end of the type.
    pub span: Span,
}

/// An index or mapped-type signature.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSignature {
    /// The bound parameter name.
    pub param: Spanned<String>,
    /// `true` for `[K in U]`, `false` for `[k: U]`.
    pub mapped: bool,
    /// The key type or the mapped constraint.
    pub key_type: TypeExpr,
    /// The value type.
    pub ty: TypeExpr,
    /// Trailing `;` or `,`.
    pub separator: Option<Spanned<Separator>>,
    /// Span from `[` to the end of the value type.
    pub span: Span,
}

/// A `Tables: { ... }` block found in a document.
#[derive(Debug, Clone, PartialEq)]
pub struct TablesBlock {
    /// Key of the object that encloses the block, e.g. `public`.
    pub schema: Option<Spanned<String>>,
    /// The block body; each property is a table.
    pub tables: ObjectType,
    /// Span from the `Tables` key to the closing brace.
    pub span: Span,
}

/// Every `Tables` block of a declaration file, in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub blocks: Vec<TablesBlock>,
}

impl Document {
    /// Total number of table properties across all blocks.
    pub fn table_count(&self) -> usize {
        self.blocks.iter().map(|b| b.tables.properties().count()).sum()
    }
}
