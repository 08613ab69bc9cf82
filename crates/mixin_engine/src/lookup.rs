//! Name lookup against the universe.
//!
//! A simple name is looked up in this order, first match wins:
//!
//! 1. type parameters and nested types of each enclosing declaration,
//!    innermost declaration first
//! 2. each enclosing namespace, innermost outward (not the global
//!    namespace), followed by the imports declared in that namespace's own
//!    declaration: aliases, imported namespaces, and static imports
//! 3. file-level imports
//! 4. the global namespace
//! 5. keyword types, mapped to their system declarations
//!
//! Qualified names resolve their first segment this way and every following
//! segment as a member of the previous resolution.

use mixin_foundation::{DeclKey, NamespaceName, TypeParamKey};
use mixin_syntax::TypeName;
use mixin_syntax::ast::{PredefinedType, TypeArgs};

use crate::universe::{Import, LookupContext, Resolved, Universe};

/// Suffix tried first when resolving attribute names.
pub const ATTRIBUTE_SUFFIX: &str = "Attribute";

/// Largest arity tried when a name is looked up without regard to arity.
const MAX_PROBED_ARITY: usize = 16;

impl Universe {
    /// Resolves a possibly qualified name.
    #[must_use]
    pub fn resolve_name(&self, context: &LookupContext, name: &TypeName) -> Option<Resolved> {
        let (first, rest) = name.segments.split_first()?;
        let mut current = if name.global {
            self.resolve_in_namespace(&NamespaceName::global(), &first.ident, first.arity())
        } else {
            self.resolve_simple(context, &first.ident, first.arity())
        }?;
        for segment in rest {
            current = self.resolve_member(&current, &segment.ident, segment.arity())?;
        }
        Some(current)
    }

    /// Resolves a name to a type declaration.
    #[must_use]
    pub fn resolve_type(&self, context: &LookupContext, name: &TypeName) -> Option<DeclKey> {
        match self.resolve_name(context, name)? {
            Resolved::Type(key) => Some(key),
            Resolved::Namespace(_) | Resolved::TypeParam(_) => None,
        }
    }

    /// Resolves a name to a type declaration, trying every arity for the last
    /// segment when the written arity finds nothing.
    #[must_use]
    pub fn resolve_type_any_arity(&self, context: &LookupContext, name: &TypeName) -> Option<DeclKey> {
        if let Some(key) = self.resolve_type(context, name) {
            return Some(key);
        }
        let written = name.last()?.arity();
        (0..=MAX_PROBED_ARITY).filter(|&a| a != written).find_map(|arity| {
            let mut probe = name.clone();
            let last = probe.segments.last_mut()?;
            last.args = if arity == 0 { TypeArgs::None } else { TypeArgs::Open(arity) };
            self.resolve_type(context, &probe)
        })
    }

    /// Resolves an attribute name: `XAttribute` is tried before `X`.
    #[must_use]
    pub fn resolve_attribute(&self, context: &LookupContext, name: &TypeName) -> Option<DeclKey> {
        let last = name.last()?;
        if !last.ident.ends_with(ATTRIBUTE_SUFFIX) || last.ident == ATTRIBUTE_SUFFIX {
            let mut suffixed = name.clone();
            if let Some(segment) = suffixed.segments.last_mut() {
                segment.ident.push_str(ATTRIBUTE_SUFFIX);
            }
            if let Some(key) = self.resolve_type(context, &suffixed) {
                return Some(key);
            }
        }
        self.resolve_type(context, name)
    }

    /// Resolves a single identifier with the given generic arity.
    #[must_use]
    pub fn resolve_simple(&self, context: &LookupContext, ident: &str, arity: usize) -> Option<Resolved> {
        for enclosing in &context.enclosing {
            if arity == 0 && self.type_params_of(enclosing).iter().any(|tp| tp == ident) {
                return Some(Resolved::TypeParam(TypeParamKey::new(enclosing.clone(), ident)));
            }
            let nested = enclosing.nested(ident, arity);
            if self.contains(&nested) {
                return Some(Resolved::Type(nested));
            }
        }

        for namespace in context.namespace.ancestors() {
            if !namespace.is_global() {
                if let Some(found) = self.resolve_in_namespace(&namespace, ident, arity) {
                    return Some(found);
                }
            }
            let declared_here = context.imports.iter().filter(|(scope, _)| *scope == namespace);
            for (_, import) in declared_here {
                if let Some(found) = self.resolve_import(import, ident, arity) {
                    return Some(found);
                }
            }
        }

        self.resolve_in_namespace(&NamespaceName::global(), ident, arity)
            .or_else(|| predefined_key(ident, arity).map(Resolved::Type))
    }

    /// Resolves `ident` as a member of a previous resolution.
    #[must_use]
    pub fn resolve_member(&self, scope: &Resolved, ident: &str, arity: usize) -> Option<Resolved> {
        match scope {
            Resolved::Namespace(namespace) => self.resolve_in_namespace(namespace, ident, arity),
            Resolved::Type(key) => {
                let nested = key.nested(ident, arity);
                self.contains(&nested).then_some(Resolved::Type(nested))
            }
            Resolved::TypeParam(_) => None,
        }
    }

    fn resolve_in_namespace(&self, namespace: &NamespaceName, ident: &str, arity: usize) -> Option<Resolved> {
        let key = DeclKey::new(namespace.clone(), ident, arity);
        if self.contains(&key) {
            return Some(Resolved::Type(key));
        }
        let child = namespace.child(ident);
        (arity == 0 && self.has_namespace(&child)).then_some(Resolved::Namespace(child))
    }

    fn resolve_import(&self, import: &Import, ident: &str, arity: usize) -> Option<Resolved> {
        match import {
            Import::Alias { alias, target } if arity == 0 && alias == ident => {
                self.resolve_name(&LookupContext::global(), target)
            }
            Import::Alias { .. } => None,
            Import::Namespace(namespace) => {
                let key = DeclKey::new(namespace.clone(), ident, arity);
                self.contains(&key).then_some(Resolved::Type(key))
            }
            Import::Static(target) => match self.resolve_name(&LookupContext::global(), target)? {
                Resolved::Type(key) => self.resolve_member(&Resolved::Type(key), ident, arity),
                Resolved::Namespace(_) | Resolved::TypeParam(_) => None,
            },
        }
    }
}

/// Key of the system declaration a keyword type stands for.
#[must_use]
pub fn predefined_key(ident: &str, arity: usize) -> Option<DeclKey> {
    if arity != 0 {
        return None;
    }
    PredefinedType::from_keyword(ident).map(|p| DeclKey::parse_metadata(p.metadata_name()))
}
