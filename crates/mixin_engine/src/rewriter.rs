//! Reference rewriting.
//!
//! Template members are copied into a target that may live in a different
//! namespace with different imports, so every reference in them is rewritten
//! to a form that means the same thing anywhere:
//!
//! - type parameters of the template become their bound arguments
//! - names that resolve to a type become root-qualified (`global::A.B<C>`)
//! - references to types nested in the template point at the target's copy
//! - attribute names become the full attribute type name
//!
//! Keyword types, `var`, locals, parameters, and the template's own members
//! are left alone. Names that resolve to nothing are left unchanged.
//!
//! Substitution markers are removed from rendered output. A rewriter built
//! with [`Rewriter::retaining_markers`] keeps them, root-qualified, so a
//! declaration registered for later targets still says which types follow
//! the composed type; [`strip_markers`] removes them before rendering.

use std::collections::BTreeSet;

use mixin_foundation::DeclKey;
use mixin_syntax::TypeName;
use mixin_syntax::ast::{
    Attribute, AttributeList, Expr, Member, NameSegment, Parameter, TypeArgs, TypeDecl, TypeRef,
};
use mixin_syntax::Span;
use mixin_syntax::visitor::{
    SyntaxTransform, collect_locals, fold_attribute, fold_expr, fold_member, fold_segment,
    fold_type_decl, fold_type_ref,
};
use tracing::{trace, warn};

use crate::binder::Binding;
use crate::universe::{LookupContext, Resolved, Universe};

/// Builds the root-qualified name of `key`.
///
/// `written` holds the segments as they appeared in source (arguments already
/// rewritten). They line up with the tail of the key's full path and supply
/// type arguments for the levels they cover; any other generic level takes
/// its own type parameter names.
#[must_use]
pub fn qualified_name(universe: &Universe, key: &DeclKey, written: &[NameSegment]) -> TypeName {
    let namespace_len = key.namespace.segments.len();
    let total = namespace_len + key.path.len();
    let offset = total.saturating_sub(written.len());

    let mut segments: Vec<NameSegment> = key.namespace.segments.iter().map(NameSegment::new).collect();
    for (depth, level) in key.path.iter().enumerate() {
        let args = if level.arity == 0 {
            TypeArgs::None
        } else {
            let source = (namespace_len + depth)
                .checked_sub(offset)
                .and_then(|i| written.get(i))
                .filter(|w| w.arity() == level.arity);
            match source {
                Some(w) => w.args.clone(),
                None => {
                    let level_key = DeclKey {
                        namespace: key.namespace.clone(),
                        path: key.path[..=depth].to_vec(),
                    };
                    let params = universe.type_params_of(&level_key);
                    if params.len() == level.arity {
                        TypeArgs::Bound(params.into_iter().map(TypeRef::simple).collect())
                    } else {
                        TypeArgs::Open(level.arity)
                    }
                }
            }
        };
        segments.push(NameSegment {
            ident: level.name.clone(),
            args,
        });
    }
    TypeName::global(segments)
}

/// Rewrites template syntax for one target.
pub struct Rewriter<'a> {
    universe: &'a Universe,
    binding: &'a Binding,
    context: LookupContext,
    redirect: Option<(DeclKey, DeclKey)>,
    substitution: Option<(DeclKey, TypeRef)>,
    retain_markers: bool,
    expand_keywords: bool,
    values: BTreeSet<String>,
    method_type_params: BTreeSet<String>,
    unresolved: BTreeSet<String>,
}

impl<'a> Rewriter<'a> {
    /// Creates a rewriter resolving names from `context`.
    #[must_use]
    pub fn new(universe: &'a Universe, binding: &'a Binding, context: LookupContext) -> Self {
        Self {
            universe,
            binding,
            context,
            redirect: None,
            substitution: None,
            retain_markers: false,
            expand_keywords: false,
            values: BTreeSet::new(),
            method_type_params: BTreeSet::new(),
            unresolved: BTreeSet::new(),
        }
    }

    /// References to types nested in `template` are redirected into `target`,
    /// and constructors are renamed after `target`.
    #[must_use]
    pub fn with_redirect(mut self, template: DeclKey, target: DeclKey) -> Self {
        self.redirect = Some((template, target));
        self
    }

    /// Members and parameters marked with `marker` get `self_type` as their type.
    #[must_use]
    pub fn with_substitution(mut self, marker: DeclKey, self_type: TypeRef) -> Self {
        self.substitution = Some((marker, self_type));
        self
    }

    /// Substituted members and parameters keep a root-qualified marker.
    #[must_use]
    pub fn retaining_markers(mut self) -> Self {
        self.retain_markers = true;
        self
    }

    /// Keyword types are rewritten to their root-qualified system names.
    #[must_use]
    pub fn with_keyword_expansion(mut self) -> Self {
        self.expand_keywords = true;
        self
    }

    /// Names that always denote values (members of the type being copied).
    #[must_use]
    pub fn with_values<I: IntoIterator<Item = String>>(mut self, names: I) -> Self {
        self.values.extend(names);
        self
    }

    /// Rewrites top-level members of a template part.
    pub fn rewrite_members(&mut self, members: Vec<Member>) -> Vec<Member> {
        let target_name = self.redirect.as_ref().map(|(_, target)| target.name().to_string());
        members
            .into_iter()
            .map(|member| {
                let mut member = self.transform_member(member);
                if let Some(name) = &target_name {
                    match &mut member {
                        Member::Constructor(ctor) => ctor.name.clone_from(name),
                        Member::Destructor(dtor) => dtor.name.clone_from(name),
                        _ => {}
                    }
                }
                member
            })
            .collect()
    }

    /// Rewrites a single type reference.
    pub fn rewrite_type_ref(&mut self, ty: TypeRef) -> TypeRef {
        self.transform_type_ref(ty)
    }

    /// Type names that could not be resolved while rewriting.
    #[must_use]
    pub fn unresolved(&self) -> &BTreeSet<String> {
        &self.unresolved
    }

    fn is_value(&self, ident: &str) -> bool {
        self.values.contains(ident) || self.method_type_params.contains(ident)
    }

    fn redirect_key(&self, key: DeclKey) -> DeclKey {
        match &self.redirect {
            Some((template, target)) if key.is_nested_in(template) => DeclKey {
                namespace: target.namespace.clone(),
                path: target
                    .path
                    .iter()
                    .chain(&key.path[template.path.len()..])
                    .cloned()
                    .collect(),
            },
            _ => key,
        }
    }

    fn qualify(&self, key: DeclKey, written: &[NameSegment]) -> TypeName {
        qualified_name(self.universe, &self.redirect_key(key), written)
    }

    fn note_unresolved(&mut self, name: String) {
        warn!(name = %name, "reference left unresolved");
        self.unresolved.insert(name);
    }

    fn rewrite_type_name(&mut self, name: TypeName) -> TypeRef {
        if name.is_simple() && self.method_type_params.contains(&name.segments[0].ident) {
            return TypeRef::Named(name);
        }
        let resolved = self.universe.resolve_name(&self.context, &name);
        let dotted = name.dotted();
        let TypeName { global, segments, span } = name;
        let segments: Vec<NameSegment> = segments.into_iter().map(|s| fold_segment(self, s)).collect();
        match resolved {
            Some(Resolved::TypeParam(param)) => match self.binding.get(&param) {
                Some(bound) => bound.clone(),
                None => TypeRef::Named(TypeName { global, segments, span }),
            },
            Some(Resolved::Type(key)) => TypeRef::Named(TypeName {
                span,
                ..self.qualify(key, &segments)
            }),
            Some(Resolved::Namespace(_)) => TypeRef::Named(TypeName { global, segments, span }),
            None => {
                self.note_unresolved(dotted);
                TypeRef::Named(TypeName { global, segments, span })
            }
        }
    }

    fn rewrite_expr_name(&mut self, name: TypeName) -> Expr {
        let first_is_value = name.segments.first().is_some_and(|s| self.is_value(&s.ident));
        if (!name.global && first_is_value) || name.segments.is_empty() {
            return fold_expr(self, Expr::Name(name));
        }
        match self.universe.resolve_name(&self.context, &name) {
            Some(Resolved::TypeParam(param)) => match self.binding.get(&param).and_then(type_ref_to_expr) {
                Some(expr) => expr,
                None => fold_expr(self, Expr::Name(name)),
            },
            Some(Resolved::Type(key)) => {
                let span = name.span;
                let segments: Vec<NameSegment> = name.segments.into_iter().map(|s| fold_segment(self, s)).collect();
                Expr::Name(TypeName {
                    span,
                    ..self.qualify(key, &segments)
                })
            }
            Some(Resolved::Namespace(_)) | None => {
                trace!(name = %name.dotted(), "expression name left as written");
                fold_expr(self, Expr::Name(name))
            }
        }
    }

    /// Rewrites the longest prefix of `A.B.C.member` that names a type.
    fn qualify_member_chain(&mut self, expr: &Expr) -> Option<Expr> {
        let mut trailing = Vec::new();
        let mut current = expr;
        while let Expr::Member(inner, segment, span) = current {
            trailing.push((segment.clone(), *span));
            current = inner;
        }
        let Expr::Name(base) = current else {
            return None;
        };
        let [first] = base.segments.as_slice() else {
            return None;
        };
        if base.global || self.is_value(&first.ident) {
            return None;
        }
        trailing.reverse();

        let mut resolved = self.universe.resolve_simple(&self.context, &first.ident, first.arity())?;
        if let Resolved::TypeParam(param) = &resolved {
            let head = self.binding.get(param).and_then(type_ref_to_expr)?;
            return Some(self.attach(head, trailing));
        }

        let mut consumed = 0;
        for (segment, _) in &trailing {
            match self.universe.resolve_member(&resolved, &segment.ident, segment.arity()) {
                Some(next) => {
                    resolved = next;
                    consumed += 1;
                }
                None => break,
            }
        }
        let Resolved::Type(key) = resolved else {
            return None;
        };

        let rest = trailing.split_off(consumed);
        let written: Vec<NameSegment> = std::iter::once(first.clone())
            .chain(trailing.into_iter().map(|(segment, _)| segment))
            .map(|s| fold_segment(self, s))
            .collect();
        let head = Expr::Name(TypeName {
            span: base.span,
            ..self.qualify(key, &written)
        });
        Some(self.attach(head, rest))
    }

    fn attach(&mut self, head: Expr, trailing: Vec<(NameSegment, Span)>) -> Expr {
        trailing.into_iter().fold(head, |inner, (segment, span)| {
            Expr::Member(Box::new(inner), fold_segment(self, segment), span)
        })
    }

    /// Removes marker attributes, returning the target of the list the
    /// marker was found in.
    fn strip_marker(&self, lists: &mut Vec<AttributeList>) -> Option<Option<String>> {
        let (marker, _) = self.substitution.as_ref()?;
        let mut found = None;
        for list in lists.iter_mut() {
            let before = list.attributes.len();
            list.attributes
                .retain(|attribute| self.universe.resolve_attribute(&self.context, &attribute.name).as_ref() != Some(marker));
            if list.attributes.len() != before && found.is_none() {
                found = Some(list.target.clone());
            }
        }
        lists.retain(|list| !list.attributes.is_empty());
        found
    }

    fn strip_param_markers(&self, member: &mut Member) -> Vec<(usize, Option<String>)> {
        let Some(params) = params_mut(member) else {
            return Vec::new();
        };
        params
            .iter_mut()
            .enumerate()
            .filter_map(|(i, param)| self.strip_marker(&mut param.attributes).map(|target| (i, target)))
            .collect()
    }

    fn marker_list(&self, target: Option<String>) -> Option<AttributeList> {
        if !self.retain_markers {
            return None;
        }
        let (marker, _) = self.substitution.as_ref()?;
        Some(AttributeList {
            target,
            attributes: vec![Attribute {
                name: qualified_name(self.universe, marker, &[]),
                args: Vec::new(),
                span: Span::synthetic(),
            }],
            span: Span::synthetic(),
        })
    }
}

/// Removes root-qualified `marker` attributes from every member and
/// parameter of `decl`, including nested declarations.
#[must_use]
pub fn strip_markers(decl: TypeDecl, marker: &TypeName) -> TypeDecl {
    MarkerStripper { marker: marker.dotted() }.transform_type_decl(decl)
}

struct MarkerStripper {
    marker: String,
}

impl MarkerStripper {
    fn strip(&self, lists: &mut Vec<AttributeList>) {
        for list in lists.iter_mut() {
            list.attributes.retain(|attribute| attribute.name.dotted() != self.marker);
        }
        lists.retain(|list| !list.attributes.is_empty());
    }
}

impl SyntaxTransform for MarkerStripper {
    fn transform_member(&mut self, member: Member) -> Member {
        let mut member = member;
        self.strip(member.attributes_mut());
        if let Some(params) = params_mut(&mut member) {
            for param in params.iter_mut() {
                self.strip(&mut param.attributes);
            }
        }
        fold_member(self, member)
    }
}

impl SyntaxTransform for Rewriter<'_> {
    fn transform_type_decl(&mut self, decl: TypeDecl) -> TypeDecl {
        let Some(outer) = self.context.enclosing.first().cloned() else {
            return fold_type_decl(self, decl);
        };
        let key = outer.nested(decl.name.clone(), decl.arity());
        let nested_context = self.context.nested_in(&key);
        let saved_context = std::mem::replace(&mut self.context, nested_context);
        let saved_values = self.values.clone();
        for member in &decl.members {
            self.values.extend(member.declared_names().into_iter().map(String::from));
        }

        let decl = fold_type_decl(self, decl);

        self.context = saved_context;
        self.values = saved_values;
        decl
    }

    fn transform_member(&mut self, member: Member) -> Member {
        if let Member::Type(decl) = member {
            return Member::Type(self.transform_type_decl(decl));
        }

        let saved_values = self.values.clone();
        let saved_method_params = self.method_type_params.clone();
        self.values.extend(collect_locals(&member));
        if let Member::Method(method) = &member {
            self.method_type_params
                .extend(method.type_params.iter().map(|tp| tp.name.clone()));
        }

        let mut member = member;
        let substitute_member = self.strip_marker(member.attributes_mut());
        let substitute_params = self.strip_param_markers(&mut member);
        let mut member = fold_member(self, member);

        if let Some((_, self_type)) = self.substitution.clone() {
            if let Some(target) = substitute_member {
                set_declared_type(&mut member, self_type.clone());
                if let Some(list) = self.marker_list(target) {
                    member.attributes_mut().push(list);
                }
            }
            let param_markers: Vec<_> = substitute_params
                .into_iter()
                .map(|(i, target)| (i, self.marker_list(target)))
                .collect();
            if let Some(params) = params_mut(&mut member) {
                for (i, list) in param_markers {
                    params[i].ty = self_type.clone();
                    params[i].attributes.extend(list);
                }
            }
        }

        self.values = saved_values;
        self.method_type_params = saved_method_params;
        member
    }

    fn transform_attribute(&mut self, attribute: Attribute) -> Attribute {
        let attribute = fold_attribute(self, attribute);
        match self.universe.resolve_attribute(&self.context, &attribute.name) {
            Some(key) => {
                let name = TypeName {
                    span: attribute.name.span,
                    ..self.qualify(key, &attribute.name.segments)
                };
                Attribute { name, ..attribute }
            }
            None => {
                self.note_unresolved(attribute.name.dotted());
                attribute
            }
        }
    }

    fn transform_expr(&mut self, expr: Expr) -> Expr {
        match expr {
            Expr::Name(name) => self.rewrite_expr_name(name),
            member @ Expr::Member(..) => match self.qualify_member_chain(&member) {
                Some(rewritten) => rewritten,
                None => fold_expr(self, member),
            },
            other => fold_expr(self, other),
        }
    }

    fn transform_type_ref(&mut self, ty: TypeRef) -> TypeRef {
        match ty {
            TypeRef::Named(name) => self.rewrite_type_name(name),
            TypeRef::Predefined(predefined, span) if self.expand_keywords => {
                let key = DeclKey::parse_metadata(predefined.metadata_name());
                TypeRef::Named(TypeName {
                    span,
                    ..qualified_name(self.universe, &key, &[])
                })
            }
            other => fold_type_ref(self, other),
        }
    }
}

fn type_ref_to_expr(ty: &TypeRef) -> Option<Expr> {
    match ty {
        TypeRef::Named(name) => Some(Expr::Name(name.clone())),
        TypeRef::Predefined(predefined, span) => Some(Expr::Name(TypeName {
            span: *span,
            ..TypeName::simple(predefined.keyword())
        })),
        TypeRef::Array(..) | TypeRef::Nullable(_) | TypeRef::Var(_) => None,
    }
}

fn params_mut(member: &mut Member) -> Option<&mut Vec<Parameter>> {
    match member {
        Member::Method(m) => Some(&mut m.params),
        Member::Constructor(m) => Some(&mut m.params),
        Member::Indexer(m) => Some(&mut m.params),
        Member::Operator(m) => Some(&mut m.params),
        Member::Conversion(m) => Some(&mut m.params),
        Member::Field(_) | Member::Property(_) | Member::Destructor(_) | Member::Event(_) | Member::Type(_) => None,
    }
}

fn set_declared_type(member: &mut Member, ty: TypeRef) {
    match member {
        Member::Field(m) => m.ty = ty,
        Member::Property(m) => m.ty = ty,
        Member::Indexer(m) => m.ty = ty,
        Member::Method(m) => m.return_type = ty,
        Member::Operator(m) => m.return_type = ty,
        Member::Conversion(m) => m.ty = ty,
        Member::Event(m) => m.ty = ty,
        Member::Constructor(_) | Member::Destructor(_) | Member::Type(_) => {}
    }
}
