//! Parser for declaration sources.
//!
//! A recursive-descent parser over the full token vector. Places where the
//! grammar is ambiguous without semantic information (local declarations vs.
//! expression statements, generic names vs. comparisons, casts vs.
//! parenthesized expressions) are resolved by speculative parsing: the parser
//! records its position, tries the narrower reading, and rewinds on failure.

use mixin_foundation::{Error, ErrorKind, NamespaceName, Result};

use crate::ast::{
    Accessor, Argument, Attribute, AttributeArg, AttributeList, Block, Body, CatchClause,
    CompilationUnit, Constraint, ConstraintClause, ConstructorDecl, ConstructorInitializer,
    ConversionDecl, DestructorDecl, EventDecl, Expr, FieldDecl, IndexerDecl, LambdaParam,
    LiteralKind, Member, MethodDecl, Modifier, NameSegment, NamespaceDecl, NamespaceMember,
    OperatorDecl, Parameter, PredefinedType, PropertyBody, PropertyDecl, Stmt, TypeArgs,
    TypeDecl, TypeKind, TypeName, TypeParam, TypeRef, UsingDirective, VariableDeclarator,
};
use crate::lexer::Lexer;
use crate::span::Span;
use crate::token::{Token, TokenKind, is_reserved};

/// Assignment operators other than `=`.
const COMPOUND_ASSIGN: &[&str] = &[
    "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>=", "??=",
];

/// Binary operator precedence levels, loosest first.
const BINARY_LEVELS: &[&[&str]] = &[
    &["??"],
    &["||"],
    &["&&"],
    &["|"],
    &["^"],
    &["&"],
    &["==", "!="],
    &["<", ">", "<=", ">="],
    &["<<", ">>"],
    &["+", "-"],
    &["*", "/", "%"],
];

/// Index of the relational level, where `is` and `as` also bind.
const RELATIONAL_LEVEL: usize = 7;

/// Parser for declaration source code.
pub struct Parser<'src> {
    /// Tokens with trivia removed; always ends with `Eof`.
    tokens: Vec<Token>,
    /// Index of the current token.
    pos: usize,
    /// Source text (for error messages).
    source: &'src str,
}

impl<'src> Parser<'src> {
    /// Creates a new parser for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        let tokens = Lexer::tokenize_all(source)
            .into_iter()
            .filter(|t| !t.kind.is_trivia())
            .collect();
        Self {
            tokens,
            pos: 0,
            source,
        }
    }

    /// Parses a whole compilation unit.
    ///
    /// # Errors
    /// Returns an error if the source cannot be parsed.
    pub fn parse_compilation_unit(&mut self) -> Result<CompilationUnit> {
        let (usings, members) = self.parse_namespace_body(false)?;
        self.expect(&TokenKind::Eof)?;
        Ok(CompilationUnit { usings, members })
    }

    /// Parses a single type reference followed by end of input.
    ///
    /// # Errors
    /// Returns an error if the source is not exactly one type.
    pub fn parse_type_only(&mut self) -> Result<TypeRef> {
        let ty = self.parse_type()?;
        self.expect(&TokenKind::Eof)?;
        Ok(ty)
    }

    /// Parses a single expression followed by end of input.
    ///
    /// # Errors
    /// Returns an error if the source is not exactly one expression.
    pub fn parse_expr_only(&mut self) -> Result<Expr> {
        let expr = self.parse_expr()?;
        self.expect(&TokenKind::Eof)?;
        Ok(expr)
    }

    // =========================================================================
    // Namespaces
    // =========================================================================

    /// Parses usings followed by namespace members until `}` or end of input.
    fn parse_namespace_body(
        &mut self,
        braced: bool,
    ) -> Result<(Vec<UsingDirective>, Vec<NamespaceMember>)> {
        let mut usings = Vec::new();
        while self.at_word("using") {
            usings.push(self.parse_using()?);
        }

        let mut members = Vec::new();
        loop {
            match &self.current().kind {
                TokenKind::Eof => break,
                TokenKind::RBrace if braced => break,
                _ => {}
            }
            if self.at_word("namespace") {
                let ns = self.parse_namespace()?;
                let file_scoped = ns.file_scoped;
                members.push(NamespaceMember::Namespace(ns));
                if file_scoped {
                    break;
                }
            } else {
                let attributes = self.parse_attribute_lists()?;
                let modifiers = self.parse_modifiers();
                members.push(NamespaceMember::Type(
                    self.parse_type_decl(attributes, modifiers)?,
                ));
            }
        }
        Ok((usings, members))
    }

    /// Parses `using [static] [Alias =] Name;`.
    fn parse_using(&mut self) -> Result<UsingDirective> {
        let start = self.expect_word("using")?;
        let is_static = self.eat_word("static");
        let alias = if matches!(self.current().kind, TokenKind::Ident(_))
            && self.peek(1).kind == TokenKind::Eq
        {
            let (alias, _) = self.expect_ident()?;
            self.advance();
            Some(alias)
        } else {
            None
        };
        let target = self.parse_type_name()?;
        let end = self.expect(&TokenKind::Semi)?;
        Ok(UsingDirective {
            alias,
            is_static,
            target,
            span: start.to(end),
        })
    }

    /// Parses a block or file-scoped namespace declaration.
    fn parse_namespace(&mut self) -> Result<NamespaceDecl> {
        let start = self.expect_word("namespace")?;
        let mut segments = vec![self.expect_ident()?.0];
        while self.eat(&TokenKind::Dot) {
            segments.push(self.expect_ident()?.0);
        }
        let name = NamespaceName::new(segments);

        if self.eat(&TokenKind::Semi) {
            let (usings, members) = self.parse_namespace_body(false)?;
            let end = self.current().span;
            return Ok(NamespaceDecl {
                name,
                usings,
                members,
                file_scoped: true,
                span: start.to(end),
            });
        }

        self.expect(&TokenKind::LBrace)?;
        let (usings, members) = self.parse_namespace_body(true)?;
        let end = self.expect(&TokenKind::RBrace)?;
        self.eat(&TokenKind::Semi);
        Ok(NamespaceDecl {
            name,
            usings,
            members,
            file_scoped: false,
            span: start.to(end),
        })
    }

    // =========================================================================
    // Type declarations
    // =========================================================================

    /// Parses a type declaration after its attributes and modifiers.
    fn parse_type_decl(
        &mut self,
        attributes: Vec<AttributeList>,
        modifiers: Vec<Modifier>,
    ) -> Result<TypeDecl> {
        let start = self.current().span;
        let kind = if self.eat_word("class") {
            TypeKind::Class
        } else if self.eat_word("struct") {
            TypeKind::Struct
        } else if self.eat_word("interface") {
            TypeKind::Interface
        } else {
            return Err(self.error(&format!(
                "expected type declaration, found {}",
                self.current().kind.name()
            )));
        };

        let (name, _) = self.expect_ident()?;
        let type_params = self.parse_type_params()?;

        let mut bases = Vec::new();
        if self.eat(&TokenKind::Colon) {
            loop {
                bases.push(self.parse_type()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        let constraints = self.parse_constraints()?;

        self.expect(&TokenKind::LBrace)?;
        let mut members = Vec::new();
        while !self.at(&TokenKind::RBrace) {
            if self.at(&TokenKind::Eof) {
                return Err(self.error_at(start, "unterminated type declaration"));
            }
            members.push(self.parse_member(&name)?);
        }
        let end = self.expect(&TokenKind::RBrace)?;
        self.eat(&TokenKind::Semi);

        Ok(TypeDecl {
            attributes,
            modifiers,
            kind,
            name,
            type_params,
            bases,
            constraints,
            members,
            span: start.to(end),
        })
    }

    /// Parses `<T, in U, out V>` if present.
    fn parse_type_params(&mut self) -> Result<Vec<TypeParam>> {
        let mut params = Vec::new();
        if !self.eat(&TokenKind::Lt) {
            return Ok(params);
        }
        loop {
            let variance = if self.at_word("in") || self.at_word("out") {
                Some(self.expect_ident()?.0)
            } else {
                None
            };
            let (name, _) = self.expect_ident()?;
            params.push(TypeParam { variance, name });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::Gt)?;
        Ok(params)
    }

    /// Parses `where T : class, new(), IFoo` clauses.
    fn parse_constraints(&mut self) -> Result<Vec<ConstraintClause>> {
        let mut clauses = Vec::new();
        while self.eat_word("where") {
            let (param, _) = self.expect_ident()?;
            self.expect(&TokenKind::Colon)?;
            let mut constraints = Vec::new();
            loop {
                let constraint = if self.eat_word("class") {
                    Constraint::Class
                } else if self.eat_word("struct") {
                    Constraint::Struct
                } else if self.at_word("new") && self.peek(1).kind == TokenKind::LParen {
                    self.advance();
                    self.advance();
                    self.expect(&TokenKind::RParen)?;
                    Constraint::New
                } else {
                    Constraint::Type(self.parse_type()?)
                };
                constraints.push(constraint);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            clauses.push(ConstraintClause { param, constraints });
        }
        Ok(clauses)
    }

    // =========================================================================
    // Members
    // =========================================================================

    /// Parses one member of the type named `type_name`.
    fn parse_member(&mut self, type_name: &str) -> Result<Member> {
        let start = self.current().span;
        let attributes = self.parse_attribute_lists()?;
        let modifiers = self.parse_modifiers();

        if self.at_word("class") || self.at_word("struct") || self.at_word("interface") {
            return Ok(Member::Type(self.parse_type_decl(attributes, modifiers)?));
        }

        if self.eat_word("event") {
            let ty = self.parse_type()?;
            let declarators = self.parse_declarators()?;
            let end = self.expect(&TokenKind::Semi)?;
            return Ok(Member::Event(EventDecl {
                attributes,
                modifiers,
                ty,
                declarators,
                span: start.to(end),
            }));
        }

        if self.at(&TokenKind::Op("~".into())) {
            self.advance();
            let (name, _) = self.expect_ident()?;
            self.expect(&TokenKind::LParen)?;
            self.expect(&TokenKind::RParen)?;
            let body = self.parse_body()?;
            return Ok(Member::Destructor(DestructorDecl {
                attributes,
                name,
                body,
                span: start.to(self.previous_span()),
            }));
        }

        if self.at_word("implicit") || self.at_word("explicit") {
            let implicit = self.expect_ident()?.0 == "implicit";
            self.expect_word("operator")?;
            let ty = self.parse_type()?;
            let params = self.parse_params(&TokenKind::LParen, &TokenKind::RParen)?;
            let body = self.parse_body()?;
            return Ok(Member::Conversion(ConversionDecl {
                attributes,
                modifiers,
                implicit,
                ty,
                params,
                body,
                span: start.to(self.previous_span()),
            }));
        }

        if self.current().is_word(type_name) && self.peek(1).kind == TokenKind::LParen {
            let (name, _) = self.expect_ident()?;
            let params = self.parse_params(&TokenKind::LParen, &TokenKind::RParen)?;
            let initializer = if self.eat(&TokenKind::Colon) {
                let keyword = if self.eat_word("base") {
                    "base"
                } else {
                    self.expect_word("this")?;
                    "this"
                };
                Some(ConstructorInitializer {
                    keyword: keyword.to_string(),
                    args: self.parse_args(&TokenKind::LParen, &TokenKind::RParen)?,
                })
            } else {
                None
            };
            let body = self.parse_body()?;
            return Ok(Member::Constructor(ConstructorDecl {
                attributes,
                modifiers,
                name,
                params,
                initializer,
                body,
                span: start.to(self.previous_span()),
            }));
        }

        let ty = self.parse_type()?;

        if self.eat_word("operator") {
            let operator = self.parse_operator_token()?;
            let params = self.parse_params(&TokenKind::LParen, &TokenKind::RParen)?;
            let body = self.parse_body()?;
            return Ok(Member::Operator(OperatorDecl {
                attributes,
                modifiers,
                return_type: ty,
                operator,
                params,
                body,
                span: start.to(self.previous_span()),
            }));
        }

        if self.eat_word("this") {
            let params = self.parse_params(&TokenKind::LBracket, &TokenKind::RBracket)?;
            let body = self.parse_property_body()?;
            return Ok(Member::Indexer(IndexerDecl {
                attributes,
                modifiers,
                ty,
                params,
                body,
                span: start.to(self.previous_span()),
            }));
        }

        let (name, _) = self.expect_ident()?;

        if self.at(&TokenKind::Lt) || self.at(&TokenKind::LParen) {
            let type_params = self.parse_type_params()?;
            let params = self.parse_params(&TokenKind::LParen, &TokenKind::RParen)?;
            let constraints = self.parse_constraints()?;
            let body = self.parse_body()?;
            return Ok(Member::Method(MethodDecl {
                attributes,
                modifiers,
                return_type: ty,
                name,
                type_params,
                params,
                constraints,
                body,
                span: start.to(self.previous_span()),
            }));
        }

        if self.at(&TokenKind::LBrace) || self.at(&TokenKind::FatArrow) {
            let body = self.parse_property_body()?;
            let init = if matches!(body, PropertyBody::Accessors(_)) && self.eat(&TokenKind::Eq) {
                let value = self.parse_expr()?;
                self.expect(&TokenKind::Semi)?;
                Some(value)
            } else {
                None
            };
            return Ok(Member::Property(PropertyDecl {
                attributes,
                modifiers,
                ty,
                name,
                body,
                init,
                span: start.to(self.previous_span()),
            }));
        }

        let mut declarators = vec![VariableDeclarator {
            name,
            init: self.parse_initializer()?,
        }];
        if self.eat(&TokenKind::Comma) {
            declarators.extend(self.parse_declarators()?);
        }
        let end = self.expect(&TokenKind::Semi)?;
        Ok(Member::Field(FieldDecl {
            attributes,
            modifiers,
            ty,
            declarators,
            span: start.to(end),
        }))
    }

    /// Parses the token(s) after `operator`.
    fn parse_operator_token(&mut self) -> Result<String> {
        if let Some((op, 2)) = self.peek_operator() {
            self.advance_by(2);
            return Ok(op);
        }
        let token = self.advance();
        let op = match token.kind {
            TokenKind::Op(op) => op,
            TokenKind::Lt => "<".into(),
            TokenKind::Gt => ">".into(),
            TokenKind::Ident(word) if word == "true" || word == "false" => word,
            other => {
                return Err(self.error_at(
                    token.span,
                    &format!("expected overloadable operator, found {}", other.name()),
                ));
            }
        };
        Ok(op)
    }

    /// Parses `{ get; set; }` or `=> expr;`.
    fn parse_property_body(&mut self) -> Result<PropertyBody> {
        if self.eat(&TokenKind::FatArrow) {
            let expr = self.parse_expr()?;
            self.expect(&TokenKind::Semi)?;
            return Ok(PropertyBody::Expr(expr));
        }
        self.expect(&TokenKind::LBrace)?;
        let mut accessors = Vec::new();
        while !self.eat(&TokenKind::RBrace) {
            let attributes = self.parse_attribute_lists()?;
            let modifiers = self.parse_modifiers();
            let (kind, span) = self.expect_ident()?;
            if !matches!(kind.as_str(), "get" | "set" | "init" | "add" | "remove") {
                return Err(self.error_at(span, &format!("expected accessor, found '{kind}'")));
            }
            let body = self.parse_body()?;
            accessors.push(Accessor {
                attributes,
                modifiers,
                kind,
                body,
            });
        }
        Ok(PropertyBody::Accessors(accessors))
    }

    /// Parses `;`, `{ ... }`, or `=> expr;`.
    fn parse_body(&mut self) -> Result<Option<Body>> {
        if self.eat(&TokenKind::Semi) {
            return Ok(None);
        }
        if self.eat(&TokenKind::FatArrow) {
            let expr = self.parse_expr()?;
            self.expect(&TokenKind::Semi)?;
            return Ok(Some(Body::Expr(expr)));
        }
        Ok(Some(Body::Block(self.parse_block()?)))
    }

    /// Parses a delimited parameter list.
    fn parse_params(&mut self, open: &TokenKind, close: &TokenKind) -> Result<Vec<Parameter>> {
        self.expect(open)?;
        let mut params = Vec::new();
        if self.eat(close) {
            return Ok(params);
        }
        loop {
            let attributes = self.parse_attribute_lists()?;
            let modifier = ["ref", "out", "in", "params", "this"]
                .into_iter()
                .find(|m| self.at_word(m))
                .map(str::to_string);
            if modifier.is_some() {
                self.advance();
            }
            let ty = self.parse_type()?;
            let (name, _) = self.expect_ident()?;
            let default = self.parse_initializer()?;
            params.push(Parameter {
                attributes,
                modifier,
                ty,
                name,
                default,
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(close)?;
        Ok(params)
    }

    /// Parses `name [= init] (, name [= init])*`.
    fn parse_declarators(&mut self) -> Result<Vec<VariableDeclarator>> {
        let mut declarators = Vec::new();
        loop {
            let (name, _) = self.expect_ident()?;
            let init = self.parse_initializer()?;
            declarators.push(VariableDeclarator { name, init });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(declarators)
    }

    /// Parses an optional `= expr`.
    fn parse_initializer(&mut self) -> Result<Option<Expr>> {
        if self.eat(&TokenKind::Eq) {
            Ok(Some(self.parse_expr()?))
        } else {
            Ok(None)
        }
    }

    // =========================================================================
    // Attributes and modifiers
    // =========================================================================

    /// Parses zero or more `[...]` attribute lists.
    fn parse_attribute_lists(&mut self) -> Result<Vec<AttributeList>> {
        let mut lists = Vec::new();
        while self.at(&TokenKind::LBracket) {
            let start = self.expect(&TokenKind::LBracket)?;
            let target = if matches!(self.current().kind, TokenKind::Ident(_))
                && self.peek(1).kind == TokenKind::Colon
            {
                let (target, _) = self.expect_ident()?;
                self.advance();
                Some(target)
            } else {
                None
            };
            let mut attributes = Vec::new();
            loop {
                attributes.push(self.parse_attribute()?);
                if !self.eat(&TokenKind::Comma) || self.at(&TokenKind::RBracket) {
                    break;
                }
            }
            let end = self.expect(&TokenKind::RBracket)?;
            lists.push(AttributeList {
                target,
                attributes,
                span: start.to(end),
            });
        }
        Ok(lists)
    }

    /// Parses `Name` or `Name(args)`.
    fn parse_attribute(&mut self) -> Result<Attribute> {
        let name = self.parse_type_name()?;
        let mut args = Vec::new();
        if self.eat(&TokenKind::LParen) && !self.eat(&TokenKind::RParen) {
            loop {
                let arg_name = if matches!(self.current().kind, TokenKind::Ident(_))
                    && self.peek(1).kind == TokenKind::Eq
                {
                    let (arg_name, _) = self.expect_ident()?;
                    self.advance();
                    Some(arg_name)
                } else {
                    None
                };
                args.push(AttributeArg {
                    name: arg_name,
                    value: self.parse_expr()?,
                });
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RParen)?;
        }
        let span = name.span.to(self.previous_span());
        Ok(Attribute { name, args, span })
    }

    /// Parses modifier keywords.
    fn parse_modifiers(&mut self) -> Vec<Modifier> {
        let mut modifiers = Vec::new();
        while let TokenKind::Ident(word) = &self.current().kind {
            let Some(modifier) = Modifier::from_keyword(word) else {
                break;
            };
            modifiers.push(modifier);
            self.advance();
        }
        modifiers
    }

    // =========================================================================
    // Types
    // =========================================================================

    /// Parses a type reference including array and nullable suffixes.
    fn parse_type(&mut self) -> Result<TypeRef> {
        let mut ty = self.parse_non_array_type()?;
        while self.at(&TokenKind::LBracket)
            && matches!(self.peek(1).kind, TokenKind::RBracket | TokenKind::Comma)
        {
            self.advance();
            let mut rank = 1;
            while self.eat(&TokenKind::Comma) {
                rank += 1;
            }
            self.expect(&TokenKind::RBracket)?;
            ty = TypeRef::Array(Box::new(ty), rank);
            if self.eat(&TokenKind::Question) {
                ty = TypeRef::Nullable(Box::new(ty));
            }
        }
        Ok(ty)
    }

    /// Parses a predefined or named type with an optional `?` suffix.
    fn parse_non_array_type(&mut self) -> Result<TypeRef> {
        let token = self.current().clone();
        let ty = match &token.kind {
            TokenKind::Ident(word) => {
                if let Some(predefined) = PredefinedType::from_keyword(word) {
                    self.advance();
                    TypeRef::Predefined(predefined, token.span)
                } else if word == "var"
                    && !matches!(
                        self.peek(1).kind,
                        TokenKind::Dot | TokenKind::Lt | TokenKind::ColonColon
                    )
                {
                    self.advance();
                    TypeRef::Var(token.span)
                } else {
                    TypeRef::Named(self.parse_type_name()?)
                }
            }
            other => {
                return Err(self.error(&format!("expected type, found {}", other.name())));
            }
        };
        if self.eat(&TokenKind::Question) {
            return Ok(TypeRef::Nullable(Box::new(ty)));
        }
        Ok(ty)
    }

    /// Parses `[global::]A<B>.C`.
    fn parse_type_name(&mut self) -> Result<TypeName> {
        let start = self.current().span;
        let global = self.at_word("global") && self.peek(1).kind == TokenKind::ColonColon;
        if global {
            self.advance();
            self.advance();
        }
        let mut segments = vec![self.parse_name_segment()?];
        while self.at(&TokenKind::Dot) && matches!(self.peek(1).kind, TokenKind::Ident(_)) {
            self.advance();
            segments.push(self.parse_name_segment()?);
        }
        Ok(TypeName {
            global,
            segments,
            span: start.to(self.previous_span()),
        })
    }

    /// Parses `Ident` or `Ident<...>` in a type context.
    fn parse_name_segment(&mut self) -> Result<NameSegment> {
        let (ident, span) = self.expect_ident()?;
        if is_reserved(&ident) {
            return Err(self.error_at(span, &format!("unexpected keyword '{ident}'")));
        }
        let args = if self.at(&TokenKind::Lt) {
            self.parse_type_args()?
        } else {
            TypeArgs::None
        };
        Ok(NameSegment { ident, args })
    }

    /// Parses `<A, B>`, `<>`, or `<,>`.
    fn parse_type_args(&mut self) -> Result<TypeArgs> {
        self.expect(&TokenKind::Lt)?;
        if self.at(&TokenKind::Gt) || self.at(&TokenKind::Comma) {
            let mut arity = 1;
            while self.eat(&TokenKind::Comma) {
                arity += 1;
            }
            self.expect(&TokenKind::Gt)?;
            return Ok(TypeArgs::Open(arity));
        }
        let mut args = Vec::new();
        loop {
            args.push(self.parse_type()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::Gt)?;
        Ok(TypeArgs::Bound(args))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Parses `{ statements }`.
    fn parse_block(&mut self) -> Result<Block> {
        let start = self.expect(&TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.at(&TokenKind::RBrace) {
            if self.at(&TokenKind::Eof) {
                return Err(self.error_at(start, "unterminated block"));
            }
            stmts.push(self.parse_stmt()?);
        }
        let end = self.expect(&TokenKind::RBrace)?;
        Ok(Block {
            stmts,
            span: start.to(end),
        })
    }

    /// Parses a statement.
    fn parse_stmt(&mut self) -> Result<Stmt> {
        let start = self.current().span;

        if self.at(&TokenKind::LBrace) {
            return Ok(Stmt::Block(self.parse_block()?));
        }
        if self.eat(&TokenKind::Semi) {
            return Ok(Stmt::Empty(start));
        }
        if self.eat_word("return") {
            let value = self.parse_optional_expr()?;
            let end = self.expect(&TokenKind::Semi)?;
            return Ok(Stmt::Return(value, start.to(end)));
        }
        if self.eat_word("throw") {
            let value = self.parse_optional_expr()?;
            let end = self.expect(&TokenKind::Semi)?;
            return Ok(Stmt::Throw(value, start.to(end)));
        }
        if self.eat_word("break") {
            let end = self.expect(&TokenKind::Semi)?;
            return Ok(Stmt::Break(start.to(end)));
        }
        if self.eat_word("continue") {
            let end = self.expect(&TokenKind::Semi)?;
            return Ok(Stmt::Continue(start.to(end)));
        }
        if self.eat_word("if") {
            self.expect(&TokenKind::LParen)?;
            let cond = self.parse_expr()?;
            self.expect(&TokenKind::RParen)?;
            let then = Box::new(self.parse_stmt()?);
            let otherwise = if self.eat_word("else") {
                Some(Box::new(self.parse_stmt()?))
            } else {
                None
            };
            return Ok(Stmt::If {
                cond,
                then,
                otherwise,
                span: start.to(self.previous_span()),
            });
        }
        if self.eat_word("while") {
            self.expect(&TokenKind::LParen)?;
            let cond = self.parse_expr()?;
            self.expect(&TokenKind::RParen)?;
            let body = Box::new(self.parse_stmt()?);
            return Ok(Stmt::While(cond, body, start.to(self.previous_span())));
        }
        if self.eat_word("for") {
            return self.parse_for(start);
        }
        if self.eat_word("foreach") {
            self.expect(&TokenKind::LParen)?;
            let ty = self.parse_type()?;
            let (name, _) = self.expect_ident()?;
            self.expect_word("in")?;
            let iter = self.parse_expr()?;
            self.expect(&TokenKind::RParen)?;
            let body = Box::new(self.parse_stmt()?);
            return Ok(Stmt::Foreach {
                ty,
                name,
                iter,
                body,
                span: start.to(self.previous_span()),
            });
        }
        if self.eat_word("try") {
            return self.parse_try(start);
        }

        if let Some(local) = self.try_parse_local()? {
            self.expect(&TokenKind::Semi)?;
            return Ok(local);
        }

        let expr = self.parse_expr()?;
        let end = self.expect(&TokenKind::Semi)?;
        Ok(Stmt::Expr(expr, start.to(end)))
    }

    /// Parses the rest of a `for` statement.
    fn parse_for(&mut self, start: Span) -> Result<Stmt> {
        self.expect(&TokenKind::LParen)?;
        let init = if self.at(&TokenKind::Semi) {
            None
        } else if let Some(local) = self.try_parse_local()? {
            Some(Box::new(local))
        } else {
            let expr = self.parse_expr()?;
            let span = expr.span();
            Some(Box::new(Stmt::Expr(expr, span)))
        };
        self.expect(&TokenKind::Semi)?;
        let cond = self.parse_optional_expr()?;
        self.expect(&TokenKind::Semi)?;
        let mut step = Vec::new();
        if !self.at(&TokenKind::RParen) {
            loop {
                step.push(self.parse_expr()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;
        let body = Box::new(self.parse_stmt()?);
        Ok(Stmt::For {
            init,
            cond,
            step,
            body,
            span: start.to(self.previous_span()),
        })
    }

    /// Parses the rest of a `try` statement.
    fn parse_try(&mut self, start: Span) -> Result<Stmt> {
        let body = self.parse_block()?;
        let mut catches = Vec::new();
        while self.eat_word("catch") {
            let (ty, name) = if self.eat(&TokenKind::LParen) {
                let ty = self.parse_type()?;
                let name = if matches!(self.current().kind, TokenKind::Ident(_)) {
                    Some(self.expect_ident()?.0)
                } else {
                    None
                };
                self.expect(&TokenKind::RParen)?;
                (Some(ty), name)
            } else {
                (None, None)
            };
            catches.push(CatchClause {
                ty,
                name,
                body: self.parse_block()?,
            });
        }
        let finally = if self.eat_word("finally") {
            Some(self.parse_block()?)
        } else {
            None
        };
        if catches.is_empty() && finally.is_none() {
            return Err(self.error("expected catch or finally"));
        }
        Ok(Stmt::Try {
            body,
            catches,
            finally,
            span: start.to(self.previous_span()),
        })
    }

    /// Tries to parse `[const] Type name [= init], ...` without the trailing `;`.
    /// Rewinds and returns `None` if the tokens do not form a declaration.
    fn try_parse_local(&mut self) -> Result<Option<Stmt>> {
        let start = self.current().span;
        let saved = self.pos;
        let is_const = self.eat_word("const");

        let ty = match self.parse_type() {
            Ok(ty) => ty,
            Err(err) => {
                self.pos = saved;
                return if is_const { Err(err) } else { Ok(None) };
            }
        };
        let is_declaration = matches!(&self.current().kind, TokenKind::Ident(name) if !is_reserved(name))
            && matches!(
                self.peek(1).kind,
                TokenKind::Eq | TokenKind::Semi | TokenKind::Comma
            );
        if !is_declaration {
            self.pos = saved;
            return Ok(None);
        }
        let declarators = self.parse_declarators()?;
        Ok(Some(Stmt::Local {
            is_const,
            ty,
            declarators,
            span: start.to(self.previous_span()),
        }))
    }

    fn parse_optional_expr(&mut self) -> Result<Option<Expr>> {
        if self.at(&TokenKind::Semi) || self.at(&TokenKind::RParen) {
            Ok(None)
        } else {
            Ok(Some(self.parse_expr()?))
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Parses an expression (lowest precedence: assignment and lambdas).
    fn parse_expr(&mut self) -> Result<Expr> {
        if let Some(lambda) = self.try_parse_lambda()? {
            return Ok(lambda);
        }
        let target = self.parse_conditional()?;
        let op = match self.peek_operator() {
            _ if self.at(&TokenKind::Eq) => Some(("=".to_string(), 1)),
            Some((op, width)) if COMPOUND_ASSIGN.contains(&op.as_str()) => Some((op, width)),
            _ => None,
        };
        if let Some((op, width)) = op {
            self.advance_by(width);
            let value = self.parse_expr()?;
            let span = target.span().to(value.span());
            return Ok(Expr::Assign(op, Box::new(target), Box::new(value), span));
        }
        Ok(target)
    }

    /// Tries `x => body` and `(params) => body`.
    fn try_parse_lambda(&mut self) -> Result<Option<Expr>> {
        let start = self.current().span;
        let saved = self.pos;

        let params = if matches!(self.current().kind, TokenKind::Ident(_))
            && self.peek(1).kind == TokenKind::FatArrow
        {
            let (name, _) = self.expect_ident()?;
            vec![LambdaParam { ty: None, name }]
        } else if self.at(&TokenKind::LParen) {
            match self.parse_lambda_params() {
                Some(params) if self.at(&TokenKind::FatArrow) => params,
                _ => {
                    self.pos = saved;
                    return Ok(None);
                }
            }
        } else {
            return Ok(None);
        };

        self.expect(&TokenKind::FatArrow)?;
        let body = if self.at(&TokenKind::LBrace) {
            Body::Block(self.parse_block()?)
        } else {
            Body::Expr(self.parse_expr()?)
        };
        Ok(Some(Expr::Lambda(
            params,
            Box::new(body),
            start.to(self.previous_span()),
        )))
    }

    /// Parses `(a, b)` or `(T a, U b)`; `None` if this is not a parameter list.
    fn parse_lambda_params(&mut self) -> Option<Vec<LambdaParam>> {
        self.eat(&TokenKind::LParen);
        let mut params = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Some(params);
        }
        loop {
            let param = if matches!(self.current().kind, TokenKind::Ident(_))
                && matches!(self.peek(1).kind, TokenKind::Comma | TokenKind::RParen)
            {
                let (name, _) = self.expect_ident().ok()?;
                LambdaParam { ty: None, name }
            } else {
                let ty = self.parse_type().ok()?;
                let (name, _) = self.expect_ident().ok()?;
                LambdaParam { ty: Some(ty), name }
            };
            params.push(param);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.eat(&TokenKind::RParen).then_some(params)
    }

    /// Parses `c ? a : b`.
    fn parse_conditional(&mut self) -> Result<Expr> {
        let cond = self.parse_binary(0)?;
        if !self.eat(&TokenKind::Question) {
            return Ok(cond);
        }
        let then = self.parse_expr()?;
        self.expect(&TokenKind::Colon)?;
        let otherwise = self.parse_expr()?;
        let span = cond.span().to(otherwise.span());
        Ok(Expr::Conditional(
            Box::new(cond),
            Box::new(then),
            Box::new(otherwise),
            span,
        ))
    }

    /// Parses binary operators by precedence level.
    fn parse_binary(&mut self, level: usize) -> Result<Expr> {
        if level == BINARY_LEVELS.len() {
            return self.parse_unary();
        }
        let mut left = self.parse_binary(level + 1)?;
        loop {
            if level == RELATIONAL_LEVEL && (self.at_word("is") || self.at_word("as")) {
                let is = self.expect_ident()?.0 == "is";
                let ty = self.parse_type()?;
                let span = left.span().to(self.previous_span());
                left = if is {
                    Expr::Is(Box::new(left), ty, span)
                } else {
                    Expr::As(Box::new(left), ty, span)
                };
                continue;
            }
            let Some((op, width)) = self.peek_operator() else {
                break;
            };
            if !BINARY_LEVELS[level].contains(&op.as_str()) {
                break;
            }
            self.advance_by(width);
            let right = self.parse_binary(level + 1)?;
            let span = left.span().to(right.span());
            left = Expr::Binary(op, Box::new(left), Box::new(right), span);
        }
        Ok(left)
    }

    /// Parses prefix operators and casts.
    fn parse_unary(&mut self) -> Result<Expr> {
        let start = self.current().span;
        if let TokenKind::Op(op) = &self.current().kind {
            if matches!(op.as_str(), "!" | "-" | "+" | "~" | "++" | "--") {
                let op = op.clone();
                self.advance();
                let operand = self.parse_unary()?;
                let span = start.to(operand.span());
                return Ok(Expr::Unary(op, Box::new(operand), span));
            }
        }
        if let Some(cast) = self.try_parse_cast()? {
            return Ok(cast);
        }
        self.parse_postfix()
    }

    /// Tries `(Type)operand`.
    fn try_parse_cast(&mut self) -> Result<Option<Expr>> {
        if !self.at(&TokenKind::LParen) {
            return Ok(None);
        }
        let start = self.current().span;
        let saved = self.pos;
        self.advance();
        let Ok(ty) = self.parse_type() else {
            self.pos = saved;
            return Ok(None);
        };
        if !self.eat(&TokenKind::RParen) || !self.starts_cast_operand() {
            self.pos = saved;
            return Ok(None);
        }
        let operand = self.parse_unary()?;
        let span = start.to(operand.span());
        Ok(Some(Expr::Cast(ty, Box::new(operand), span)))
    }

    /// Returns true if the current token can begin the operand of a cast.
    fn starts_cast_operand(&self) -> bool {
        match &self.current().kind {
            TokenKind::Ident(word) => !matches!(word.as_str(), "is" | "as"),
            TokenKind::Number(_)
            | TokenKind::Str(_)
            | TokenKind::Char(_)
            | TokenKind::LParen => true,
            TokenKind::Op(op) => matches!(op.as_str(), "!" | "~"),
            _ => false,
        }
    }

    /// Parses member access, calls, indexing, and postfix operators.
    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match &self.current().kind {
                TokenKind::Dot => {
                    self.advance();
                    let segment = self.parse_expr_name_segment()?;
                    let span = expr.span().to(self.previous_span());
                    expr = Expr::Member(Box::new(expr), segment, span);
                }
                TokenKind::LParen => {
                    let args = self.parse_args(&TokenKind::LParen, &TokenKind::RParen)?;
                    let span = expr.span().to(self.previous_span());
                    expr = Expr::Call(Box::new(expr), args, span);
                }
                TokenKind::LBracket => {
                    let args = self.parse_args(&TokenKind::LBracket, &TokenKind::RBracket)?;
                    let span = expr.span().to(self.previous_span());
                    expr = Expr::Index(Box::new(expr), args, span);
                }
                TokenKind::Op(op) if op == "++" || op == "--" => {
                    let op = op.clone();
                    self.advance();
                    let span = expr.span().to(self.previous_span());
                    expr = Expr::Postfix(op, Box::new(expr), span);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// Parses a primary expression.
    fn parse_primary(&mut self) -> Result<Expr> {
        let token = self.current().clone();
        let span = token.span;
        match &token.kind {
            TokenKind::Number(text) => {
                self.advance();
                Ok(Expr::Literal(LiteralKind::Number, text.clone(), span))
            }
            TokenKind::Str(text) => {
                self.advance();
                Ok(Expr::Literal(LiteralKind::String, text.clone(), span))
            }
            TokenKind::Char(text) => {
                self.advance();
                Ok(Expr::Literal(LiteralKind::Char, text.clone(), span))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                let end = self.expect(&TokenKind::RParen)?;
                Ok(Expr::Paren(Box::new(inner), span.to(end)))
            }
            TokenKind::Ident(word) => match word.as_str() {
                "true" | "false" => {
                    self.advance();
                    Ok(Expr::Literal(LiteralKind::Bool, word.clone(), span))
                }
                "null" => {
                    self.advance();
                    Ok(Expr::Literal(LiteralKind::Null, word.clone(), span))
                }
                "this" => {
                    self.advance();
                    Ok(Expr::This(span))
                }
                "base" => {
                    self.advance();
                    Ok(Expr::Base(span))
                }
                "new" => self.parse_new(),
                "typeof" => {
                    self.advance();
                    self.expect(&TokenKind::LParen)?;
                    let ty = self.parse_type()?;
                    let end = self.expect(&TokenKind::RParen)?;
                    Ok(Expr::Typeof(ty, span.to(end)))
                }
                "default" => {
                    self.advance();
                    if self.eat(&TokenKind::LParen) {
                        let ty = self.parse_type()?;
                        let end = self.expect(&TokenKind::RParen)?;
                        Ok(Expr::Default(Some(ty), span.to(end)))
                    } else {
                        Ok(Expr::Default(None, span))
                    }
                }
                "global" if self.peek(1).kind == TokenKind::ColonColon => {
                    self.advance();
                    self.advance();
                    let segment = self.parse_expr_name_segment()?;
                    Ok(Expr::Name(TypeName {
                        global: true,
                        segments: vec![segment],
                        span: span.to(self.previous_span()),
                    }))
                }
                w if PredefinedType::from_keyword(w).is_some() => {
                    self.advance();
                    Ok(Expr::Name(TypeName {
                        global: false,
                        segments: vec![NameSegment::new(w)],
                        span,
                    }))
                }
                w if is_reserved(w) => Err(self.error(&format!("unexpected keyword '{w}'"))),
                _ => {
                    let segment = self.parse_expr_name_segment()?;
                    Ok(Expr::Name(TypeName {
                        global: false,
                        segments: vec![segment],
                        span: span.to(self.previous_span()),
                    }))
                }
            },
            TokenKind::Error(msg) => Err(self.error(msg)),
            other => Err(self.error(&format!("expected expression, found {}", other.name()))),
        }
    }

    /// Parses an identifier in expression position, taking a type argument
    /// list only when the tokens after it disambiguate it from a comparison.
    fn parse_expr_name_segment(&mut self) -> Result<NameSegment> {
        let (ident, _) = self.expect_ident()?;
        if !self.at(&TokenKind::Lt) {
            return Ok(NameSegment::new(ident));
        }
        let saved = self.pos;
        if let Ok(TypeArgs::Bound(args)) = self.parse_type_args() {
            let follows = match &self.current().kind {
                TokenKind::LParen
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
                | TokenKind::Dot
                | TokenKind::Semi
                | TokenKind::Comma
                | TokenKind::Colon
                | TokenKind::Question
                | TokenKind::Eof => true,
                TokenKind::Op(op) => matches!(op.as_str(), "==" | "!="),
                _ => false,
            };
            if follows {
                return Ok(NameSegment {
                    ident,
                    args: TypeArgs::Bound(args),
                });
            }
        }
        self.pos = saved;
        Ok(NameSegment::new(ident))
    }

    /// Parses `new T(args) { init }` and `new T[n] { init }`.
    fn parse_new(&mut self) -> Result<Expr> {
        let start = self.expect_word("new")?;
        let ty = self.parse_non_array_type()?;

        if self.at(&TokenKind::LBracket) {
            self.advance();
            let mut sizes = Vec::new();
            let mut rank = 1;
            if self.at(&TokenKind::RBracket) || self.at(&TokenKind::Comma) {
                while self.eat(&TokenKind::Comma) {
                    rank += 1;
                }
            } else {
                loop {
                    sizes.push(self.parse_expr()?);
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                rank = sizes.len();
            }
            self.expect(&TokenKind::RBracket)?;
            let init = self.parse_collection_init()?;
            return Ok(Expr::NewArray {
                elem: ty,
                sizes,
                rank,
                init,
                span: start.to(self.previous_span()),
            });
        }

        let args = if self.at(&TokenKind::LParen) {
            Some(self.parse_args(&TokenKind::LParen, &TokenKind::RParen)?)
        } else {
            None
        };
        let init = self.parse_collection_init()?;
        if args.is_none() && init.is_none() {
            return Err(self.error("expected '(' or '{' after type in object creation"));
        }
        Ok(Expr::New {
            ty,
            args,
            init,
            span: start.to(self.previous_span()),
        })
    }

    /// Parses an optional `{ a, b, X = c }` initializer.
    fn parse_collection_init(&mut self) -> Result<Option<Vec<Expr>>> {
        if !self.eat(&TokenKind::LBrace) {
            return Ok(None);
        }
        let mut items = Vec::new();
        while !self.eat(&TokenKind::RBrace) {
            items.push(self.parse_expr()?);
            if !self.eat(&TokenKind::Comma) {
                self.expect(&TokenKind::RBrace)?;
                break;
            }
        }
        Ok(Some(items))
    }

    /// Parses a delimited argument list.
    fn parse_args(&mut self, open: &TokenKind, close: &TokenKind) -> Result<Vec<Argument>> {
        self.expect(open)?;
        let mut args = Vec::new();
        if self.eat(close) {
            return Ok(args);
        }
        loop {
            let modifier = ["ref", "out", "in"]
                .into_iter()
                .find(|m| self.at_word(m))
                .map(str::to_string);
            if modifier.is_some() {
                self.advance();
            }
            args.push(Argument {
                modifier,
                value: self.parse_expr()?,
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(close)?;
        Ok(args)
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    fn current(&self) -> &Token {
        self.peek(0)
    }

    fn peek(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    fn previous_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .map_or_else(Span::default, |i| self.tokens[i].span)
    }

    /// Advances and returns the consumed token.
    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            self.advance();
        }
    }

    /// The operator at the current position and how many tokens it spans.
    /// `>>` and `>>=` are lexed as adjacent `>` tokens so that nested type
    /// argument lists still close.
    fn peek_operator(&self) -> Option<(String, usize)> {
        let current = self.current();
        match &current.kind {
            TokenKind::Op(op) => Some((op.clone(), 1)),
            TokenKind::Lt => Some(("<".to_string(), 1)),
            TokenKind::Gt => {
                let next = self.peek(1);
                let adjacent = next.span.start == current.span.end;
                match &next.kind {
                    TokenKind::Gt if adjacent => Some((">>".to_string(), 2)),
                    TokenKind::Op(op) if adjacent && op == ">=" => Some((">>=".to_string(), 2)),
                    _ => Some((">".to_string(), 1)),
                }
            }
            _ => None,
        }
    }

    fn at(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    fn at_word(&self, word: &str) -> bool {
        self.current().is_word(word)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.at_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects the current token to be `expected`, then advances.
    fn expect(&mut self, expected: &TokenKind) -> Result<Span> {
        if let TokenKind::Error(msg) = &self.current().kind {
            return Err(self.error(msg));
        }
        if self.at(expected) {
            Ok(self.advance().span)
        } else {
            Err(self.error(&format!(
                "expected {}, found {}",
                expected.name(),
                self.current().kind.name()
            )))
        }
    }

    fn expect_word(&mut self, word: &str) -> Result<Span> {
        if self.at_word(word) {
            Ok(self.advance().span)
        } else {
            Err(self.error(&format!(
                "expected '{word}', found {}",
                self.current().kind.name()
            )))
        }
    }

    fn expect_ident(&mut self) -> Result<(String, Span)> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok((name, token.span))
            }
            TokenKind::Error(msg) => Err(self.error(&msg)),
            other => Err(self.error(&format!("expected identifier, found {}", other.name()))),
        }
    }

    /// Creates a parse error at the current position.
    fn error(&self, message: &str) -> Error {
        self.error_at(self.current().span, message)
    }

    /// Creates a parse error at a specific span.
    fn error_at(&self, span: Span, message: &str) -> Error {
        Error::new(ErrorKind::ParseError {
            message: message.to_string(),
            line: span.line,
            column: span.column,
            context: self.context_at(span),
        })
    }

    /// Gets the source line containing a span.
    fn context_at(&self, span: Span) -> String {
        let start = span.start.min(self.source.len());
        let line_start = self.source[..start].rfind('\n').map_or(0, |i| i + 1);
        let line_end = self.source[start..]
            .find('\n')
            .map_or(self.source.len(), |i| start + i);
        self.source[line_start..line_end].to_string()
    }
}

/// Parses a compilation unit.
///
/// # Errors
/// Returns an error if the source cannot be parsed.
pub fn parse(source: &str) -> Result<CompilationUnit> {
    Parser::new(source).parse_compilation_unit()
}

/// Parses a single type reference.
///
/// # Errors
/// Returns an error if the source is not exactly one type.
pub fn parse_type_ref(source: &str) -> Result<TypeRef> {
    Parser::new(source).parse_type_only()
}

/// Parses a single expression.
///
/// # Errors
/// Returns an error if the source is not exactly one expression.
pub fn parse_expr(source: &str) -> Result<Expr> {
    Parser::new(source).parse_expr_only()
}
