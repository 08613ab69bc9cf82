//! Syntax tree traversal.
//!
//! This module provides two traits:
//! - [`SyntaxVisitor`] - read-only traversal, driven by the `walk_*` functions
//! - [`SyntaxTransform`] - consuming rewrite, driven by the `fold_*` functions
//!
//! Override the method for the node kind of interest and call the matching
//! free function to keep descending.
//!
//! # Example
//!
//! ```
//! use mixin_syntax::parse;
//! use mixin_syntax::ast::TypeName;
//! use mixin_syntax::visitor::{SyntaxVisitor, walk_unit};
//!
//! struct NameCounter(usize);
//!
//! impl SyntaxVisitor for NameCounter {
//!     fn visit_type_name(&mut self, _name: &TypeName) {
//!         self.0 += 1;
//!     }
//! }
//!
//! let unit = parse("class A { List<T> items; }").unwrap();
//! let mut counter = NameCounter(0);
//! walk_unit(&mut counter, &unit);
//! assert_eq!(counter.0, 1);
//! ```

use std::collections::BTreeSet;

use crate::ast::{
    Accessor, Argument, Attribute, AttributeList, Block, Body, CompilationUnit, Constraint,
    ConstraintClause, Expr, LambdaParam, Member, NameSegment, NamespaceMember, Parameter,
    PropertyBody, Stmt, TypeArgs, TypeDecl, TypeName, TypeRef, VariableDeclarator,
};

// =============================================================================
// Read-only visitor
// =============================================================================

/// Trait for read-only syntax visitors.
///
/// Default implementations descend into children.
#[allow(unused_variables)]
pub trait SyntaxVisitor {
    /// Visit a type declaration.
    fn visit_type_decl(&mut self, decl: &TypeDecl) {
        walk_type_decl(self, decl);
    }

    /// Visit a member.
    fn visit_member(&mut self, member: &Member) {
        walk_member(self, member);
    }

    /// Visit an attribute.
    fn visit_attribute(&mut self, attribute: &Attribute) {
        walk_attribute(self, attribute);
    }

    /// Visit a formal parameter.
    fn visit_param(&mut self, param: &Parameter) {
        walk_param(self, param);
    }

    /// Visit a statement.
    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    /// Visit an expression.
    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    /// Visit a type reference.
    fn visit_type_ref(&mut self, ty: &TypeRef) {
        walk_type_ref(self, ty);
    }

    /// Visit a name in type or expression position.
    fn visit_type_name(&mut self, name: &TypeName) {
        walk_type_name(self, name);
    }

    /// Called for every value name introduced by a parameter, local,
    /// loop variable, catch variable, or lambda parameter.
    fn visit_local(&mut self, name: &str) {}
}

/// Visit every declaration in a compilation unit.
pub fn walk_unit<V: SyntaxVisitor + ?Sized>(visitor: &mut V, unit: &CompilationUnit) {
    walk_namespace_members(visitor, &unit.members);
}

fn walk_namespace_members<V: SyntaxVisitor + ?Sized>(visitor: &mut V, members: &[NamespaceMember]) {
    for member in members {
        match member {
            NamespaceMember::Namespace(ns) => walk_namespace_members(visitor, &ns.members),
            NamespaceMember::Type(decl) => visitor.visit_type_decl(decl),
        }
    }
}

/// Visit the children of a type declaration.
pub fn walk_type_decl<V: SyntaxVisitor + ?Sized>(visitor: &mut V, decl: &TypeDecl) {
    walk_attribute_lists(visitor, &decl.attributes);
    for base in &decl.bases {
        visitor.visit_type_ref(base);
    }
    walk_constraints(visitor, &decl.constraints);
    for member in &decl.members {
        visitor.visit_member(member);
    }
}

fn walk_attribute_lists<V: SyntaxVisitor + ?Sized>(visitor: &mut V, lists: &[AttributeList]) {
    for attribute in lists.iter().flat_map(|l| &l.attributes) {
        visitor.visit_attribute(attribute);
    }
}

fn walk_constraints<V: SyntaxVisitor + ?Sized>(visitor: &mut V, clauses: &[ConstraintClause]) {
    for constraint in clauses.iter().flat_map(|c| &c.constraints) {
        if let Constraint::Type(ty) = constraint {
            visitor.visit_type_ref(ty);
        }
    }
}

/// Visit the children of a member.
pub fn walk_member<V: SyntaxVisitor + ?Sized>(visitor: &mut V, member: &Member) {
    if let Member::Type(decl) = member {
        visitor.visit_type_decl(decl);
        return;
    }
    walk_attribute_lists(visitor, member.attributes());
    match member {
        Member::Field(field) => {
            visitor.visit_type_ref(&field.ty);
            walk_declarators(visitor, &field.declarators);
        }
        Member::Event(event) => {
            visitor.visit_type_ref(&event.ty);
            walk_declarators(visitor, &event.declarators);
        }
        Member::Property(prop) => {
            visitor.visit_type_ref(&prop.ty);
            walk_property_body(visitor, &prop.body);
            if let Some(init) = &prop.init {
                visitor.visit_expr(init);
            }
        }
        Member::Indexer(indexer) => {
            visitor.visit_type_ref(&indexer.ty);
            walk_params(visitor, &indexer.params);
            walk_property_body(visitor, &indexer.body);
        }
        Member::Method(method) => {
            visitor.visit_type_ref(&method.return_type);
            walk_params(visitor, &method.params);
            walk_constraints(visitor, &method.constraints);
            walk_body(visitor, method.body.as_ref());
        }
        Member::Constructor(ctor) => {
            walk_params(visitor, &ctor.params);
            if let Some(init) = &ctor.initializer {
                walk_args(visitor, &init.args);
            }
            walk_body(visitor, ctor.body.as_ref());
        }
        Member::Destructor(dtor) => walk_body(visitor, dtor.body.as_ref()),
        Member::Operator(op) => {
            visitor.visit_type_ref(&op.return_type);
            walk_params(visitor, &op.params);
            walk_body(visitor, op.body.as_ref());
        }
        Member::Conversion(conv) => {
            visitor.visit_type_ref(&conv.ty);
            walk_params(visitor, &conv.params);
            walk_body(visitor, conv.body.as_ref());
        }
        Member::Type(_) => {}
    }
}

fn walk_declarators<V: SyntaxVisitor + ?Sized>(visitor: &mut V, declarators: &[VariableDeclarator]) {
    for declarator in declarators {
        if let Some(init) = &declarator.init {
            visitor.visit_expr(init);
        }
    }
}

fn walk_property_body<V: SyntaxVisitor + ?Sized>(visitor: &mut V, body: &PropertyBody) {
    match body {
        PropertyBody::Expr(expr) => visitor.visit_expr(expr),
        PropertyBody::Accessors(accessors) => {
            for accessor in accessors {
                walk_attribute_lists(visitor, &accessor.attributes);
                walk_body(visitor, accessor.body.as_ref());
            }
        }
    }
}

fn walk_params<V: SyntaxVisitor + ?Sized>(visitor: &mut V, params: &[Parameter]) {
    for param in params {
        visitor.visit_param(param);
    }
}

/// Visit the children of a parameter and report its name as a local.
pub fn walk_param<V: SyntaxVisitor + ?Sized>(visitor: &mut V, param: &Parameter) {
    walk_attribute_lists(visitor, &param.attributes);
    visitor.visit_type_ref(&param.ty);
    if let Some(default) = &param.default {
        visitor.visit_expr(default);
    }
    visitor.visit_local(&param.name);
}

fn walk_body<V: SyntaxVisitor + ?Sized>(visitor: &mut V, body: Option<&Body>) {
    match body {
        Some(Body::Block(block)) => walk_block(visitor, block),
        Some(Body::Expr(expr)) => visitor.visit_expr(expr),
        None => {}
    }
}

fn walk_block<V: SyntaxVisitor + ?Sized>(visitor: &mut V, block: &Block) {
    for stmt in &block.stmts {
        visitor.visit_stmt(stmt);
    }
}

/// Visit the arguments of an attribute.
pub fn walk_attribute<V: SyntaxVisitor + ?Sized>(visitor: &mut V, attribute: &Attribute) {
    visitor.visit_type_name(&attribute.name);
    for arg in &attribute.args {
        visitor.visit_expr(&arg.value);
    }
}

/// Visit the children of a statement.
pub fn walk_stmt<V: SyntaxVisitor + ?Sized>(visitor: &mut V, stmt: &Stmt) {
    match stmt {
        Stmt::Local {
            ty, declarators, ..
        } => {
            visitor.visit_type_ref(ty);
            for declarator in declarators {
                visitor.visit_local(&declarator.name);
            }
            walk_declarators(visitor, declarators);
        }
        Stmt::Expr(expr, _) => visitor.visit_expr(expr),
        Stmt::Return(expr, _) | Stmt::Throw(expr, _) => {
            if let Some(expr) = expr {
                visitor.visit_expr(expr);
            }
        }
        Stmt::If {
            cond,
            then,
            otherwise,
            ..
        } => {
            visitor.visit_expr(cond);
            visitor.visit_stmt(then);
            if let Some(otherwise) = otherwise {
                visitor.visit_stmt(otherwise);
            }
        }
        Stmt::While(cond, body, _) => {
            visitor.visit_expr(cond);
            visitor.visit_stmt(body);
        }
        Stmt::For {
            init,
            cond,
            step,
            body,
            ..
        } => {
            if let Some(init) = init {
                visitor.visit_stmt(init);
            }
            if let Some(cond) = cond {
                visitor.visit_expr(cond);
            }
            for expr in step {
                visitor.visit_expr(expr);
            }
            visitor.visit_stmt(body);
        }
        Stmt::Foreach {
            ty,
            name,
            iter,
            body,
            ..
        } => {
            visitor.visit_type_ref(ty);
            visitor.visit_local(name);
            visitor.visit_expr(iter);
            visitor.visit_stmt(body);
        }
        Stmt::Try {
            body,
            catches,
            finally,
            ..
        } => {
            walk_block(visitor, body);
            for catch in catches {
                if let Some(ty) = &catch.ty {
                    visitor.visit_type_ref(ty);
                }
                if let Some(name) = &catch.name {
                    visitor.visit_local(name);
                }
                walk_block(visitor, &catch.body);
            }
            if let Some(finally) = finally {
                walk_block(visitor, finally);
            }
        }
        Stmt::Block(block) => walk_block(visitor, block),
        Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty(_) => {}
    }
}

fn walk_args<V: SyntaxVisitor + ?Sized>(visitor: &mut V, args: &[Argument]) {
    for arg in args {
        visitor.visit_expr(&arg.value);
    }
}

fn walk_segment_args<V: SyntaxVisitor + ?Sized>(visitor: &mut V, segment: &NameSegment) {
    if let TypeArgs::Bound(args) = &segment.args {
        for arg in args {
            visitor.visit_type_ref(arg);
        }
    }
}

/// Visit the children of an expression.
pub fn walk_expr<V: SyntaxVisitor + ?Sized>(visitor: &mut V, expr: &Expr) {
    match expr {
        Expr::Literal(..) | Expr::This(_) | Expr::Base(_) | Expr::Default(None, _) => {}
        Expr::Name(name) => visitor.visit_type_name(name),
        Expr::Member(inner, segment, _) => {
            visitor.visit_expr(inner);
            walk_segment_args(visitor, segment);
        }
        Expr::Call(callee, args, _) | Expr::Index(callee, args, _) => {
            visitor.visit_expr(callee);
            walk_args(visitor, args);
        }
        Expr::New { ty, args, init, .. } => {
            visitor.visit_type_ref(ty);
            if let Some(args) = args {
                walk_args(visitor, args);
            }
            for item in init.iter().flatten() {
                visitor.visit_expr(item);
            }
        }
        Expr::NewArray {
            elem, sizes, init, ..
        } => {
            visitor.visit_type_ref(elem);
            for expr in sizes.iter().chain(init.iter().flatten()) {
                visitor.visit_expr(expr);
            }
        }
        Expr::Typeof(ty, _) | Expr::Default(Some(ty), _) => visitor.visit_type_ref(ty),
        Expr::Cast(ty, inner, _) => {
            visitor.visit_type_ref(ty);
            visitor.visit_expr(inner);
        }
        Expr::Is(inner, ty, _) | Expr::As(inner, ty, _) => {
            visitor.visit_expr(inner);
            visitor.visit_type_ref(ty);
        }
        Expr::Unary(_, inner, _) | Expr::Postfix(_, inner, _) | Expr::Paren(inner, _) => {
            visitor.visit_expr(inner);
        }
        Expr::Binary(_, left, right, _) | Expr::Assign(_, left, right, _) => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
        Expr::Conditional(cond, then, otherwise, _) => {
            visitor.visit_expr(cond);
            visitor.visit_expr(then);
            visitor.visit_expr(otherwise);
        }
        Expr::Lambda(params, body, _) => {
            for param in params {
                if let Some(ty) = &param.ty {
                    visitor.visit_type_ref(ty);
                }
                visitor.visit_local(&param.name);
            }
            walk_body(visitor, Some(&**body));
        }
    }
}

/// Visit the children of a type reference.
pub fn walk_type_ref<V: SyntaxVisitor + ?Sized>(visitor: &mut V, ty: &TypeRef) {
    match ty {
        TypeRef::Named(name) => visitor.visit_type_name(name),
        TypeRef::Array(elem, _) | TypeRef::Nullable(elem) => visitor.visit_type_ref(elem),
        TypeRef::Predefined(..) | TypeRef::Var(_) => {}
    }
}

/// Visit the type arguments of a name.
pub fn walk_type_name<V: SyntaxVisitor + ?Sized>(visitor: &mut V, name: &TypeName) {
    for segment in &name.segments {
        walk_segment_args(visitor, segment);
    }
}

/// Collects every value name declared inside a member: parameters, locals,
/// loop and catch variables, and lambda parameters.
#[derive(Debug, Default)]
pub struct LocalCollector {
    /// Names found so far.
    pub names: BTreeSet<String>,
}

impl SyntaxVisitor for LocalCollector {
    fn visit_type_decl(&mut self, _decl: &TypeDecl) {}

    fn visit_local(&mut self, name: &str) {
        self.names.insert(name.to_string());
    }
}

/// Returns the value names declared inside a member.
#[must_use]
pub fn collect_locals(member: &Member) -> BTreeSet<String> {
    let mut collector = LocalCollector::default();
    collector.visit_member(member);
    collector.names
}

// =============================================================================
// Transforming visitor
// =============================================================================

/// Trait for syntax transformations.
///
/// Each method receives a node by value and returns its replacement.
/// Default implementations rebuild the node with transformed children.
pub trait SyntaxTransform {
    /// Transform a type declaration.
    fn transform_type_decl(&mut self, decl: TypeDecl) -> TypeDecl {
        fold_type_decl(self, decl)
    }

    /// Transform a member.
    fn transform_member(&mut self, member: Member) -> Member {
        fold_member(self, member)
    }

    /// Transform an attribute.
    fn transform_attribute(&mut self, attribute: Attribute) -> Attribute {
        fold_attribute(self, attribute)
    }

    /// Transform a statement.
    fn transform_stmt(&mut self, stmt: Stmt) -> Stmt {
        fold_stmt(self, stmt)
    }

    /// Transform an expression.
    fn transform_expr(&mut self, expr: Expr) -> Expr {
        fold_expr(self, expr)
    }

    /// Transform a type reference.
    fn transform_type_ref(&mut self, ty: TypeRef) -> TypeRef {
        fold_type_ref(self, ty)
    }
}

/// Rebuild a type declaration with transformed children.
pub fn fold_type_decl<T: SyntaxTransform + ?Sized>(t: &mut T, decl: TypeDecl) -> TypeDecl {
    TypeDecl {
        attributes: fold_attribute_lists(t, decl.attributes),
        bases: decl
            .bases
            .into_iter()
            .map(|b| t.transform_type_ref(b))
            .collect(),
        constraints: fold_constraints(t, decl.constraints),
        members: decl
            .members
            .into_iter()
            .map(|m| t.transform_member(m))
            .collect(),
        ..decl
    }
}

fn fold_attribute_lists<T: SyntaxTransform + ?Sized>(
    t: &mut T,
    lists: Vec<AttributeList>,
) -> Vec<AttributeList> {
    lists
        .into_iter()
        .map(|list| AttributeList {
            attributes: list
                .attributes
                .into_iter()
                .map(|a| t.transform_attribute(a))
                .collect(),
            ..list
        })
        .collect()
}

fn fold_constraints<T: SyntaxTransform + ?Sized>(
    t: &mut T,
    clauses: Vec<ConstraintClause>,
) -> Vec<ConstraintClause> {
    clauses
        .into_iter()
        .map(|clause| ConstraintClause {
            param: clause.param,
            constraints: clause
                .constraints
                .into_iter()
                .map(|c| match c {
                    Constraint::Type(ty) => Constraint::Type(t.transform_type_ref(ty)),
                    other => other,
                })
                .collect(),
        })
        .collect()
}

/// Rebuild a member with transformed children.
pub fn fold_member<T: SyntaxTransform + ?Sized>(t: &mut T, member: Member) -> Member {
    match member {
        Member::Type(decl) => Member::Type(t.transform_type_decl(decl)),
        Member::Field(mut field) => {
            field.attributes = fold_attribute_lists(t, field.attributes);
            field.ty = t.transform_type_ref(field.ty);
            field.declarators = fold_declarators(t, field.declarators);
            Member::Field(field)
        }
        Member::Event(mut event) => {
            event.attributes = fold_attribute_lists(t, event.attributes);
            event.ty = t.transform_type_ref(event.ty);
            event.declarators = fold_declarators(t, event.declarators);
            Member::Event(event)
        }
        Member::Property(mut prop) => {
            prop.attributes = fold_attribute_lists(t, prop.attributes);
            prop.ty = t.transform_type_ref(prop.ty);
            prop.body = fold_property_body(t, prop.body);
            prop.init = prop.init.map(|e| t.transform_expr(e));
            Member::Property(prop)
        }
        Member::Indexer(mut indexer) => {
            indexer.attributes = fold_attribute_lists(t, indexer.attributes);
            indexer.ty = t.transform_type_ref(indexer.ty);
            indexer.params = fold_params(t, indexer.params);
            indexer.body = fold_property_body(t, indexer.body);
            Member::Indexer(indexer)
        }
        Member::Method(mut method) => {
            method.attributes = fold_attribute_lists(t, method.attributes);
            method.return_type = t.transform_type_ref(method.return_type);
            method.params = fold_params(t, method.params);
            method.constraints = fold_constraints(t, method.constraints);
            method.body = fold_body(t, method.body);
            Member::Method(method)
        }
        Member::Constructor(mut ctor) => {
            ctor.attributes = fold_attribute_lists(t, ctor.attributes);
            ctor.params = fold_params(t, ctor.params);
            if let Some(init) = ctor.initializer.as_mut() {
                init.args = fold_args(t, std::mem::take(&mut init.args));
            }
            ctor.body = fold_body(t, ctor.body);
            Member::Constructor(ctor)
        }
        Member::Destructor(mut dtor) => {
            dtor.attributes = fold_attribute_lists(t, dtor.attributes);
            dtor.body = fold_body(t, dtor.body);
            Member::Destructor(dtor)
        }
        Member::Operator(mut op) => {
            op.attributes = fold_attribute_lists(t, op.attributes);
            op.return_type = t.transform_type_ref(op.return_type);
            op.params = fold_params(t, op.params);
            op.body = fold_body(t, op.body);
            Member::Operator(op)
        }
        Member::Conversion(mut conv) => {
            conv.attributes = fold_attribute_lists(t, conv.attributes);
            conv.ty = t.transform_type_ref(conv.ty);
            conv.params = fold_params(t, conv.params);
            conv.body = fold_body(t, conv.body);
            Member::Conversion(conv)
        }
    }
}

fn fold_declarators<T: SyntaxTransform + ?Sized>(
    t: &mut T,
    declarators: Vec<VariableDeclarator>,
) -> Vec<VariableDeclarator> {
    declarators
        .into_iter()
        .map(|d| VariableDeclarator {
            name: d.name,
            init: d.init.map(|e| t.transform_expr(e)),
        })
        .collect()
}

fn fold_property_body<T: SyntaxTransform + ?Sized>(t: &mut T, body: PropertyBody) -> PropertyBody {
    match body {
        PropertyBody::Expr(expr) => PropertyBody::Expr(t.transform_expr(expr)),
        PropertyBody::Accessors(accessors) => PropertyBody::Accessors(
            accessors
                .into_iter()
                .map(|a| Accessor {
                    attributes: fold_attribute_lists(t, a.attributes),
                    modifiers: a.modifiers,
                    kind: a.kind,
                    body: fold_body(t, a.body),
                })
                .collect(),
        ),
    }
}

fn fold_params<T: SyntaxTransform + ?Sized>(t: &mut T, params: Vec<Parameter>) -> Vec<Parameter> {
    params
        .into_iter()
        .map(|p| Parameter {
            attributes: fold_attribute_lists(t, p.attributes),
            modifier: p.modifier,
            ty: t.transform_type_ref(p.ty),
            name: p.name,
            default: p.default.map(|e| t.transform_expr(e)),
        })
        .collect()
}

fn fold_body<T: SyntaxTransform + ?Sized>(t: &mut T, body: Option<Body>) -> Option<Body> {
    body.map(|body| match body {
        Body::Block(block) => Body::Block(fold_block(t, block)),
        Body::Expr(expr) => Body::Expr(t.transform_expr(expr)),
    })
}

fn fold_block<T: SyntaxTransform + ?Sized>(t: &mut T, block: Block) -> Block {
    Block {
        stmts: block
            .stmts
            .into_iter()
            .map(|s| t.transform_stmt(s))
            .collect(),
        span: block.span,
    }
}

/// Rebuild an attribute with transformed arguments. The name is left as is.
pub fn fold_attribute<T: SyntaxTransform + ?Sized>(t: &mut T, attribute: Attribute) -> Attribute {
    Attribute {
        args: attribute
            .args
            .into_iter()
            .map(|mut arg| {
                arg.value = t.transform_expr(arg.value);
                arg
            })
            .collect(),
        ..attribute
    }
}

/// Rebuild a statement with transformed children.
pub fn fold_stmt<T: SyntaxTransform + ?Sized>(t: &mut T, stmt: Stmt) -> Stmt {
    let boxed = |t: &mut T, s: Box<Stmt>| Box::new(t.transform_stmt(*s));
    match stmt {
        Stmt::Local {
            is_const,
            ty,
            declarators,
            span,
        } => Stmt::Local {
            is_const,
            ty: t.transform_type_ref(ty),
            declarators: fold_declarators(t, declarators),
            span,
        },
        Stmt::Expr(expr, span) => Stmt::Expr(t.transform_expr(expr), span),
        Stmt::Return(expr, span) => Stmt::Return(expr.map(|e| t.transform_expr(e)), span),
        Stmt::Throw(expr, span) => Stmt::Throw(expr.map(|e| t.transform_expr(e)), span),
        Stmt::If {
            cond,
            then,
            otherwise,
            span,
        } => Stmt::If {
            cond: t.transform_expr(cond),
            then: boxed(t, then),
            otherwise: otherwise.map(|s| boxed(t, s)),
            span,
        },
        Stmt::While(cond, body, span) => Stmt::While(t.transform_expr(cond), boxed(t, body), span),
        Stmt::For {
            init,
            cond,
            step,
            body,
            span,
        } => Stmt::For {
            init: init.map(|s| boxed(t, s)),
            cond: cond.map(|e| t.transform_expr(e)),
            step: step.into_iter().map(|e| t.transform_expr(e)).collect(),
            body: boxed(t, body),
            span,
        },
        Stmt::Foreach {
            ty,
            name,
            iter,
            body,
            span,
        } => Stmt::Foreach {
            ty: t.transform_type_ref(ty),
            name,
            iter: t.transform_expr(iter),
            body: boxed(t, body),
            span,
        },
        Stmt::Try {
            body,
            catches,
            finally,
            span,
        } => Stmt::Try {
            body: fold_block(t, body),
            catches: catches
                .into_iter()
                .map(|mut c| {
                    c.ty = c.ty.map(|ty| t.transform_type_ref(ty));
                    c.body = fold_block(t, c.body);
                    c
                })
                .collect(),
            finally: finally.map(|b| fold_block(t, b)),
            span,
        },
        Stmt::Block(block) => Stmt::Block(fold_block(t, block)),
        other @ (Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty(_)) => other,
    }
}

fn fold_args<T: SyntaxTransform + ?Sized>(t: &mut T, args: Vec<Argument>) -> Vec<Argument> {
    args.into_iter()
        .map(|a| Argument {
            modifier: a.modifier,
            value: t.transform_expr(a.value),
        })
        .collect()
}

/// Transform the type arguments of a name segment.
pub fn fold_segment<T: SyntaxTransform + ?Sized>(t: &mut T, segment: NameSegment) -> NameSegment {
    NameSegment {
        ident: segment.ident,
        args: match segment.args {
            TypeArgs::Bound(args) => {
                TypeArgs::Bound(args.into_iter().map(|a| t.transform_type_ref(a)).collect())
            }
            other => other,
        },
    }
}

/// Rebuild an expression with transformed children.
pub fn fold_expr<T: SyntaxTransform + ?Sized>(t: &mut T, expr: Expr) -> Expr {
    let boxed = |t: &mut T, e: Box<Expr>| Box::new(t.transform_expr(*e));
    match expr {
        leaf @ (Expr::Literal(..) | Expr::This(_) | Expr::Base(_)) => leaf,
        Expr::Name(name) => Expr::Name(TypeName {
            segments: name
                .segments
                .into_iter()
                .map(|s| fold_segment(t, s))
                .collect(),
            ..name
        }),
        Expr::Member(inner, segment, span) => {
            Expr::Member(boxed(t, inner), fold_segment(t, segment), span)
        }
        Expr::Call(callee, args, span) => Expr::Call(boxed(t, callee), fold_args(t, args), span),
        Expr::Index(target, args, span) => Expr::Index(boxed(t, target), fold_args(t, args), span),
        Expr::New {
            ty,
            args,
            init,
            span,
        } => Expr::New {
            ty: t.transform_type_ref(ty),
            args: args.map(|a| fold_args(t, a)),
            init: init.map(|items| items.into_iter().map(|e| t.transform_expr(e)).collect()),
            span,
        },
        Expr::NewArray {
            elem,
            sizes,
            rank,
            init,
            span,
        } => Expr::NewArray {
            elem: t.transform_type_ref(elem),
            sizes: sizes.into_iter().map(|e| t.transform_expr(e)).collect(),
            rank,
            init: init.map(|items| items.into_iter().map(|e| t.transform_expr(e)).collect()),
            span,
        },
        Expr::Typeof(ty, span) => Expr::Typeof(t.transform_type_ref(ty), span),
        Expr::Default(ty, span) => Expr::Default(ty.map(|ty| t.transform_type_ref(ty)), span),
        Expr::Cast(ty, inner, span) => Expr::Cast(t.transform_type_ref(ty), boxed(t, inner), span),
        Expr::Is(inner, ty, span) => {
            let inner = boxed(t, inner);
            Expr::Is(inner, t.transform_type_ref(ty), span)
        }
        Expr::As(inner, ty, span) => {
            let inner = boxed(t, inner);
            Expr::As(inner, t.transform_type_ref(ty), span)
        }
        Expr::Unary(op, inner, span) => Expr::Unary(op, boxed(t, inner), span),
        Expr::Postfix(op, inner, span) => Expr::Postfix(op, boxed(t, inner), span),
        Expr::Binary(op, left, right, span) => {
            let left = boxed(t, left);
            Expr::Binary(op, left, boxed(t, right), span)
        }
        Expr::Assign(op, left, right, span) => {
            let left = boxed(t, left);
            Expr::Assign(op, left, boxed(t, right), span)
        }
        Expr::Conditional(cond, then, otherwise, span) => {
            let cond = boxed(t, cond);
            let then = boxed(t, then);
            Expr::Conditional(cond, then, boxed(t, otherwise), span)
        }
        Expr::Lambda(params, body, span) => {
            let params = params
                .into_iter()
                .map(|p| LambdaParam {
                    ty: p.ty.map(|ty| t.transform_type_ref(ty)),
                    name: p.name,
                })
                .collect();
            let body = match *body {
                Body::Block(block) => Body::Block(fold_block(t, block)),
                Body::Expr(expr) => Body::Expr(t.transform_expr(expr)),
            };
            Expr::Lambda(params, Box::new(body), span)
        }
        Expr::Paren(inner, span) => Expr::Paren(boxed(t, inner), span),
    }
}

/// Rebuild a type reference with transformed children.
pub fn fold_type_ref<T: SyntaxTransform + ?Sized>(t: &mut T, ty: TypeRef) -> TypeRef {
    match ty {
        TypeRef::Named(name) => TypeRef::Named(TypeName {
            segments: name
                .segments
                .into_iter()
                .map(|s| fold_segment(t, s))
                .collect(),
            ..name
        }),
        TypeRef::Array(elem, rank) => TypeRef::Array(Box::new(t.transform_type_ref(*elem)), rank),
        TypeRef::Nullable(inner) => TypeRef::Nullable(Box::new(t.transform_type_ref(*inner))),
        leaf @ (TypeRef::Predefined(..) | TypeRef::Var(_)) => leaf,
    }
}
