//! Discovery of composition directives and the dependency graph between
//! annotated declarations.

use mixin_foundation::{DeclKey, Error, Result};
use mixin_syntax::Span;
use mixin_syntax::ast::{Attribute, Expr, TypeArgs, TypeRef};
use mixin_syntax::pretty::pretty_print_type_ref;
use tracing::{debug, trace};

use crate::config::ComposeConfig;
use crate::universe::{LookupContext, Universe};

/// Annotation declarations a pass keys on, validated against their module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationKeys {
    /// The composition directive annotation.
    pub directive: DeclKey,
    /// The member substitution marker.
    pub substitute: DeclKey,
}

/// Checks that the configured annotations come from the configured module.
///
/// # Errors
///
/// Returns a `ForeignAnnotation` error if any part of either annotation was
/// loaded from a different module, and a `MissingAnnotation` error if the
/// directive annotation is not declared at all.
pub fn validate_annotations(universe: &Universe, config: &ComposeConfig) -> Result<AnnotationKeys> {
    let keys = AnnotationKeys {
        directive: DeclKey::parse_metadata(&config.directive_annotation),
        substitute: DeclKey::parse_metadata(&config.substitute_annotation),
    };
    if universe.parts(&keys.directive).next().is_none() {
        return Err(Error::missing_annotation(&keys.directive, config.annotation_module.clone()));
    }
    for key in [&keys.directive, &keys.substitute] {
        for part in universe.parts(key) {
            if part.module != config.annotation_module {
                return Err(Error::foreign_annotation(
                    key,
                    config.annotation_module.clone(),
                    part.module.clone(),
                ));
            }
        }
    }
    Ok(keys)
}

/// One `[Mixin(typeof(Template<Args>))]` application.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositionDirective {
    /// The annotated declaration.
    pub target: DeclKey,
    /// The named template, or `None` when it could not be resolved.
    pub template: Option<DeclKey>,
    /// The template as written.
    pub written: String,
    /// Type arguments written on the template name.
    pub type_args: TypeArgs,
    /// Context the template name and its arguments are resolved in.
    pub context: LookupContext,
    /// Location of the annotation.
    pub span: Span,
}

/// A declaration carrying at least one directive.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotatedDecl {
    /// The annotated declaration.
    pub key: DeclKey,
    /// Directives in source order, across every part.
    pub directives: Vec<CompositionDirective>,
}

impl AnnotatedDecl {
    /// Resolved templates in directive order.
    pub fn templates(&self) -> impl Iterator<Item = &DeclKey> {
        self.directives.iter().filter_map(|d| d.template.as_ref())
    }
}

/// Annotated declarations in discovery order.
#[derive(Clone, Debug, Default)]
pub struct SymbolGraph {
    annotated: Vec<AnnotatedDecl>,
}

impl SymbolGraph {
    /// Scans every declaration in the universe for directives.
    #[must_use]
    pub fn build(universe: &Universe, annotations: &AnnotationKeys) -> Self {
        let mut annotated = Vec::new();
        for key in universe.keys() {
            let mut directives = Vec::new();
            for part in universe.parts(key).filter(|p| !p.synthesized) {
                let context = part.member_context();
                for attribute in part.decl.all_attributes() {
                    if universe.resolve_attribute(&part.context, &attribute.name).as_ref()
                        != Some(&annotations.directive)
                    {
                        continue;
                    }
                    let directive = read_directive(universe, key, attribute, &context);
                    trace!(
                        target_decl = %key,
                        template = %directive.written,
                        resolved = directive.template.is_some(),
                        "found directive"
                    );
                    directives.push(directive);
                }
            }
            if !directives.is_empty() {
                annotated.push(AnnotatedDecl {
                    key: key.clone(),
                    directives,
                });
            }
        }
        debug!(annotated = annotated.len(), "symbol graph built");
        Self { annotated }
    }

    /// Annotated declarations in discovery order.
    #[must_use]
    pub fn annotated(&self) -> &[AnnotatedDecl] {
        &self.annotated
    }

    /// Keys of annotated declarations in discovery order.
    #[must_use]
    pub fn keys(&self) -> Vec<DeclKey> {
        self.annotated.iter().map(|a| a.key.clone()).collect()
    }

    /// The annotated declaration for `key`.
    #[must_use]
    pub fn get(&self, key: &DeclKey) -> Option<&AnnotatedDecl> {
        self.annotated.iter().find(|a| &a.key == key)
    }

    /// Returns true if `key` carries directives.
    #[must_use]
    pub fn is_annotated(&self, key: &DeclKey) -> bool {
        self.get(key).is_some()
    }

    /// Templates of `key` that are themselves annotated.
    #[must_use]
    pub fn dependencies(&self, key: &DeclKey) -> Vec<DeclKey> {
        self.get(key)
            .map(|a| {
                a.templates()
                    .filter(|t| self.is_annotated(t))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of annotated declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.annotated.len()
    }

    /// Returns true if nothing is annotated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotated.is_empty()
    }
}

fn read_directive(
    universe: &Universe,
    target: &DeclKey,
    attribute: &Attribute,
    context: &LookupContext,
) -> CompositionDirective {
    let template_ref = match attribute.args.as_slice() {
        [arg] if arg.name.is_none() => match &arg.value {
            Expr::Typeof(ty, _) => Some(ty),
            _ => None,
        },
        _ => None,
    };
    let (template, written, type_args) = match template_ref {
        Some(TypeRef::Named(name)) => {
            let args = name.last().map_or(TypeArgs::None, |s| s.args.clone());
            (
                universe.resolve_type_any_arity(context, name),
                pretty_print_type_ref(&TypeRef::Named(name.clone())),
                args,
            )
        }
        Some(other) => (None, pretty_print_type_ref(other), TypeArgs::None),
        None => (None, attribute.name.dotted(), TypeArgs::None),
    };
    CompositionDirective {
        target: target.clone(),
        template,
        written,
        type_args,
        context: context.clone(),
        span: attribute.span,
    }
}
