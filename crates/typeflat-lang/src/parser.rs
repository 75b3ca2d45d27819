//! Recursive descent parser for type declarations.
//!
//! Only the object-literal type grammar used inside `Tables` blocks is parsed.
//! Everything else in a declaration file is skimmed at the token level.

use crate::ast::*;
use crate::error::ParseError;
use crate::lexer::{tokenize, SpannedToken, Token};
use crate::span::{spans_lines, Span, Spanned};

/// Parser for TypeScript type declarations.
pub struct Parser<'source> {
    source: &'source str,
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl<'source> Parser<'source> {
    /// Create a new parser for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            source,
            tokens: tokenize(source),
            pos: 0,
        }
    }

    /// Scan the whole source and parse every `Tables: { ... }` block.
    ///
    /// Tokens outside those blocks are only tracked for brace nesting, so the
    /// key that encloses a block can be reported as its schema.
    pub fn parse_document(&mut self) -> Result<Document, ParseError> {
        let mut keys: Vec<Option<Spanned<String>>> = Vec::new();
        let mut blocks = Vec::new();

        while let Some(tok) = self.tokens.get(self.pos).cloned() {
            match tok.token {
                Token::LBrace => {
                    keys.push(self.key_before(self.pos));
                    self.pos += 1;
                }
                Token::RBrace => {
                    keys.pop();
                    self.pos += 1;
                }
                Token::Ident(ref name) if name == "Tables" && self.opens_keyed_block(self.pos) => {
                    // Skip the key and its colon
                    self.pos += 2;
                    let tables = self.parse_object_type()?;
                    let schema = keys.last().cloned().flatten();
                    blocks.push(TablesBlock {
                        schema,
                        span: tok.span.merge(tables.span),
                        tables,
                    });
                }
                _ => self.pos += 1,
            }
        }

        Ok(Document { blocks })
    }

    /// Parse a complete type expression.
    pub fn parse_type(&mut self) -> Result<TypeExpr, ParseError> {
        self.parse_union()
    }

    /// Parse a standalone type and require that nothing follows it.
    pub fn parse_type_to_end(&mut self) -> Result<TypeExpr, ParseError> {
        let ty = self.parse_type()?;
        if let Some(tok) = self.peek() {
            return Err(ParseError::new(
                format!("unexpected {:?} after type", tok.token),
                tok.span,
            ));
        }
        Ok(ty)
    }

    /// Parse union types, allowing a leading `|`.
    fn parse_union(&mut self) -> Result<TypeExpr, ParseError> {
        let leading = self.eat(&Token::Pipe);
        let first = self.parse_intersection()?;
        let start = leading.map_or(first.span, |t| t.span);

        if !self.peek_is(&Token::Pipe) {
            return Ok(first);
        }

        let mut members = vec![first];
        while self.eat(&Token::Pipe).is_some() {
            members.push(self.parse_intersection()?);
        }
        let span = start.merge(members[members.len() - 1].span);
        Ok(TypeExpr::new(TypeKind::Union(members), span))
    }

    /// Parse intersection types, allowing a leading `&`.
    fn parse_intersection(&mut self) -> Result<TypeExpr, ParseError> {
        let leading = self.eat(&Token::Amp);
        let first = self.parse_postfix()?;
        let start = leading.map_or(first.span, |t| t.span);

        if !self.peek_is(&Token::Amp) {
            return Ok(first);
        }

        let mut parts = vec![first];
        while self.eat(&Token::Amp).is_some() {
            parts.push(self.parse_postfix()?);
        }
        let span = start.merge(parts[parts.len() - 1].span);
        Ok(TypeExpr::new(TypeKind::Intersection(parts), span))
    }

    /// Parse array (`T[]`) and indexed access (`T['k']`) suffixes.
    fn parse_postfix(&mut self) -> Result<TypeExpr, ParseError> {
        let mut ty = self.parse_primary()?;

        // A `[` on a new line starts the next member's index signature
        while self.peek_is(&Token::LBracket) && !self.at_line_start() {
            self.pos += 1;
            if let Some(close) = self.eat(&Token::RBracket) {
                let span = ty.span.merge(close.span);
                ty = TypeExpr::new(TypeKind::Array(Box::new(ty)), span);
            } else {
                let index = self.parse_type()?;
                let close = self.expect_token(Token::RBracket)?;
                let span = ty.span.merge(close.span);
                ty = TypeExpr::new(
                    TypeKind::IndexedAccess {
                        object: Box::new(ty),
                        index: Box::new(index),
                    },
                    span,
                );
            }
        }

        Ok(ty)
    }

    /// Parse a primary type.
    fn parse_primary(&mut self) -> Result<TypeExpr, ParseError> {
        let tok = self.current()?.clone();

        match tok.token {
            Token::LBrace => {
                let object = self.parse_object_type()?;
                let span = object.span;
                Ok(TypeExpr::new(TypeKind::Object(object), span))
            }
            Token::LBracket => self.parse_tuple(),
            Token::LParen => {
                self.pos += 1;
                let inner = self.parse_type()?;
                let close = self.expect_token(Token::RParen)?;
                if let Some(arrow) = self.eat(&Token::Arrow) {
                    return Err(ParseError::new("function types are not supported", arrow.span)
                        .with_hint("column types are expected to be plain data types"));
                }
                Ok(TypeExpr::new(
                    TypeKind::Parenthesized(Box::new(inner)),
                    tok.span.merge(close.span),
                ))
            }
            Token::String(s) | Token::StringSingle(s) | Token::Template(s) => {
                self.pos += 1;
                Ok(TypeExpr::new(TypeKind::StringLiteral(s), tok.span))
            }
            Token::Number(n) => {
                self.pos += 1;
                Ok(TypeExpr::new(TypeKind::NumberLiteral(n), tok.span))
            }
            Token::Null => {
                self.pos += 1;
                Ok(TypeExpr::new(TypeKind::Null, tok.span))
            }
            Token::Undefined => {
                self.pos += 1;
                Ok(TypeExpr::new(TypeKind::Undefined, tok.span))
            }
            Token::Ident(_) => self.parse_reference(),
            other => Err(ParseError::new(
                format!("expected type, found {:?}", other),
                tok.span,
            )),
        }
    }

    /// Parse a named type, a type operator, or a generic instantiation.
    fn parse_reference(&mut self) -> Result<TypeExpr, ParseError> {
        let first = self.expect_ident()?;

        if is_type_operator(&first.value) && self.starts_type() {
            let operand = self.parse_postfix()?;
            let span = first.span.merge(operand.span);
            return Ok(TypeExpr::new(
                TypeKind::TypeOperator {
                    operator: first.value,
                    operand: Box::new(operand),
                },
                span,
            ));
        }

        let mut name = first.value;
        let mut name_span = first.span;

        // Qualified names: ns.Type
        while self.peek_is(&Token::Dot)
            && matches!(self.peek_nth(1).map(|t| &t.token), Some(Token::Ident(_)))
        {
            self.pos += 1;
            let part = self.expect_ident()?;
            name.push('.');
            name.push_str(&part.value);
            name_span = name_span.merge(part.span);
        }

        let mut span = name_span;
        let mut args = Vec::new();
        if let Some(open) = self.eat(&Token::Lt) {
            if self.peek_is(&Token::Gt) {
                return Err(ParseError::new("empty type argument list", open.span));
            }
            loop {
                args.push(self.parse_type()?);
                if self.eat(&Token::Comma).is_none() {
                    break;
                }
            }
            let close = self.expect_token(Token::Gt)?;
            span = span.merge(close.span);
        }

        Ok(TypeExpr::new(
            TypeKind::Reference {
                name: Spanned::new(name, name_span),
                args,
            },
            span,
        ))
    }

    /// Parse a tuple type; trailing commas are allowed.
    fn parse_tuple(&mut self) -> Result<TypeExpr, ParseError> {
        let open = self.expect_token(Token::LBracket)?;
        let mut elements = Vec::new();

        while !self.peek_is(&Token::RBracket) {
            elements.push(self.parse_type()?);
            if self.eat(&Token::Comma).is_none() {
                break;
            }
        }

        let close = self.expect_token(Token::RBracket)?;
        Ok(TypeExpr::new(
            TypeKind::Tuple(elements),
            open.span.merge(close.span),
        ))
    }

    /// Parse an object type literal `{ member* }`.
    pub fn parse_object_type(&mut self) -> Result<ObjectType, ParseError> {
        let open = self.expect_token(Token::LBrace)?;
        let mut members = Vec::new();

        while !self.peek_is(&Token::RBrace) {
            if self.peek().is_none() {
                return Err(ParseError::new("unclosed '{'", open.span)
                    .with_hint("every '{' in a Tables block needs a matching '}'"));
            }
            members.push(self.parse_member()?);
        }

        let close = self.expect_token(Token::RBrace)?;
        Ok(ObjectType {
            members,
            span: open.span.merge(close.span),
        })
    }

    /// Parse one member and its optional separator.
    fn parse_member(&mut self) -> Result<Member, ParseError> {
        // `readonly name: T` (but not a property that is itself called readonly)
        if self.peek_ident("readonly")
            && !matches!(
                self.peek_nth(1).map(|t| &t.token),
                Some(Token::Colon | Token::Question)
            )
        {
            self.pos += 1;
        }

        if self.peek_is(&Token::LBracket) {
            let mut index = self.parse_index_signature()?;
            index.separator = self.parse_separator();
            Ok(Member::Index(index))
        } else {
            let mut property = self.parse_property_signature()?;
            property.separator = self.parse_separator();
            Ok(Member::Property(property))
        }
    }

    /// Parse `name?: T`.
    fn parse_property_signature(&mut self) -> Result<PropertySignature, ParseError> {
        let tok = self.next_token()?;
        let name = match tok.token.key_name() {
            Some(name) => Spanned::new(name.to_string(), tok.span),
            None => {
                return Err(ParseError::new(
                    format!("expected property name, found {:?}", tok.token),
                    tok.span,
                ))
            }
        };

        let optional = self.eat(&Token::Question).is_some();

        if self.peek_is(&Token::LParen) || self.peek_is(&Token::Lt) {
            let span = self.current()?.span;
            return Err(ParseError::new(
                format!("method signature '{}' is not supported", name.value),
                span,
            ));
        }
        self.expect_token(Token::Colon).map_err(|e| {
            e.with_hint("property signatures need a ':' between name and type")
        })?;

        let ty = self.parse_type()?;
        let span = name.span.merge(ty.span);

        Ok(PropertySignature {
            name,
            optional,
            ty,
            separator: None,
            span,
        })
    }

    /// Parse `[k: K]: T` or `[K in U]?: T`.
    fn parse_index_signature(&mut self) -> Result<IndexSignature, ParseError> {
        let open = self.expect_token(Token::LBracket)?;
        let param = self.expect_ident()?;

        let mapped = if self.peek_ident("in") {
            self.pos += 1;
            true
        } else {
            self.expect_token(Token::Colon)?;
            false
        };
        let key_type = self.parse_type()?;
        self.expect_token(Token::RBracket)?;

        // Mapped type modifiers: `?`, `-?`, `+?`
        if self.eat(&Token::Minus).is_some() || self.eat(&Token::Plus).is_some() {
            self.expect_token(Token::Question)?;
        } else {
            self.eat(&Token::Question);
        }

        self.expect_token(Token::Colon)?;
        let ty = self.parse_type()?;
        let span = open.span.merge(ty.span);

        Ok(IndexSignature {
            param,
            mapped,
            key_type,
            ty,
            separator: None,
            span,
        })
    }

    fn parse_separator(&mut self) -> Option<Spanned<Separator>> {
        if let Some(tok) = self.eat(&Token::Semi) {
            Some(Spanned::new(Separator::Semicolon, tok.span))
        } else {
            self.eat(&Token::Comma)
                .map(|tok| Spanned::new(Separator::Comma, tok.span))
        }
    }

    /// The `key` of a `key: {` pattern ending just before `pos`.
    fn key_before(&self, pos: usize) -> Option<Spanned<String>> {
        if pos < 2 || self.tokens[pos - 1].token != Token::Colon {
            return None;
        }
        let key = &self.tokens[pos - 2];
        key.token
            .key_name()
            .map(|name| Spanned::new(name.to_string(), key.span))
    }

    /// Whether `pos` holds a key followed by `: {`.
    fn opens_keyed_block(&self, pos: usize) -> bool {
        matches!(
            (
                self.tokens.get(pos + 1).map(|t| &t.token),
                self.tokens.get(pos + 2).map(|t| &t.token),
            ),
            (Some(Token::Colon), Some(Token::LBrace))
        )
    }

    /// Whether the next token can begin a type on the same line.
    fn starts_type(&self) -> bool {
        let Some(tok) = self.peek() else {
            return false;
        };
        !self.at_line_start()
            && matches!(
                tok.token,
                Token::Ident(_)
                    | Token::LBrace
                    | Token::LBracket
                    | Token::LParen
                    | Token::String(_)
                    | Token::StringSingle(_)
                    | Token::Number(_)
                    | Token::Null
                    | Token::Undefined
            )
    }

    /// Whether a line break separates the next token from the previous one.
    fn at_line_start(&self) -> bool {
        match (self.pos.checked_sub(1), self.tokens.get(self.pos)) {
            (Some(prev), Some(next)) => {
                spans_lines(self.source, self.tokens[prev].span.end, next.span.start)
            }
            _ => false,
        }
    }

    fn peek(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.pos)
    }

    fn peek_nth(&self, n: usize) -> Option<&SpannedToken> {
        self.tokens.get(self.pos + n)
    }

    fn peek_is(&self, expected: &Token) -> bool {
        self.peek().is_some_and(|t| &t.token == expected)
    }

    fn peek_ident(&self, name: &str) -> bool {
        matches!(self.peek().map(|t| &t.token), Some(Token::Ident(n)) if n == name)
    }

    /// Consume the next token if it equals `expected`.
    fn eat(&mut self, expected: &Token) -> Option<SpannedToken> {
        if self.peek_is(expected) {
            let tok = self.tokens[self.pos].clone();
            self.pos += 1;
            Some(tok)
        } else {
            None
        }
    }

    /// Expect and consume an identifier.
    fn expect_ident(&mut self) -> Result<Spanned<String>, ParseError> {
        let tok = self.next_token()?;
        match tok.token {
            Token::Ident(name) => Ok(Spanned::new(name, tok.span)),
            _ => Err(ParseError::new(
                format!("expected identifier, found {:?}", tok.token),
                tok.span,
            )),
        }
    }

    /// Expect and consume a specific token.
    fn expect_token(&mut self, expected: Token) -> Result<SpannedToken, ParseError> {
        let tok = self.next_token()?;
        if std::mem::discriminant(&tok.token) == std::mem::discriminant(&expected) {
            Ok(tok)
        } else {
            Err(ParseError::new(
                format!("expected {:?}, found {:?}", expected, tok.token),
                tok.span,
            ))
        }
    }

    /// The next token, or an error at end of input.
    fn current(&self) -> Result<&SpannedToken, ParseError> {
        self.peek().ok_or_else(|| self.eof_error())
    }

    /// Get the next token or error if EOF.
    fn next_token(&mut self) -> Result<SpannedToken, ParseError> {
        let tok = self.current()?.clone();
        self.pos += 1;
        Ok(tok)
    }

    fn eof_error(&self) -> ParseError {
        ParseError::new("unexpected end of input", Span::at(self.source.len()))
    }
}

/// Prefix operators that take a type operand.
fn is_type_operator(name: &str) -> bool {
    matches!(name, "keyof" | "typeof" | "readonly" | "unique")
}

/// Parse every `Tables` block in a declaration file.
pub fn parse_document(source: &str) -> Result<Document, ParseError> {
    Parser::new(source).parse_document()
}

/// Parse a single type expression.
pub fn parse_type(source: &str) -> Result<TypeExpr, ParseError> {
    Parser::new(source).parse_type_to_end()
}
