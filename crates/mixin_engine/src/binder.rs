//! Generic binding: mapping a template's type parameters to the type
//! arguments a directive supplies.

use std::collections::BTreeMap;

use mixin_foundation::{Error, Result, TypeParamKey};
use mixin_syntax::ast::{TypeArgs, TypeRef};
use tracing::trace;

use crate::graph::CompositionDirective;
use crate::rewriter::Rewriter;
use crate::universe::Universe;

/// Type parameter to type argument map for one directive.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Binding {
    map: BTreeMap<TypeParamKey, TypeRef>,
}

impl Binding {
    /// An empty binding.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Binds `param` to `arg`.
    pub fn insert(&mut self, param: TypeParamKey, arg: TypeRef) {
        self.map.insert(param, arg);
    }

    /// The argument bound to `param`.
    #[must_use]
    pub fn get(&self, param: &TypeParamKey) -> Option<&TypeRef> {
        self.map.get(param)
    }

    /// Number of bound parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Bound pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&TypeParamKey, &TypeRef)> {
        self.map.iter()
    }
}

/// Builds the binding for `directive`.
///
/// Closed arguments are canonicalized in the target's context, so keyword
/// types become their root-qualified system names and references to the
/// target's own type parameters stay bare. An open template (`Box<>`) binds
/// its parameters positionally to the target's type parameters.
///
/// # Errors
///
/// Returns `UnresolvedTemplate` when the directive names nothing, and
/// `BindingArity` when the argument count differs from the template's
/// parameter count.
pub fn bind(universe: &Universe, directive: &CompositionDirective, target_params: &[String]) -> Result<Binding> {
    let template = directive
        .template
        .as_ref()
        .ok_or_else(|| Error::unresolved_template(directive.written.clone()))?;
    let params = universe.type_params_of(template);

    let args: Vec<TypeRef> = match &directive.type_args {
        TypeArgs::None => Vec::new(),
        TypeArgs::Open(_) => {
            if target_params.len() != params.len() {
                return Err(Error::binding_arity(template, params.len(), target_params.len()));
            }
            target_params.iter().map(TypeRef::simple).collect()
        }
        TypeArgs::Bound(args) => {
            let empty = Binding::empty();
            let mut canonical = Rewriter::new(universe, &empty, directive.context.clone()).with_keyword_expansion();
            args.iter().cloned().map(|arg| canonical.rewrite_type_ref(arg)).collect()
        }
    };

    if args.len() != params.len() {
        return Err(Error::binding_arity(template, params.len(), args.len()));
    }

    let mut binding = Binding::empty();
    for (param, arg) in params.into_iter().zip(args) {
        trace!(template = %template, param = %param, "bound type parameter");
        binding.insert(TypeParamKey::new(template.clone(), param), arg);
    }
    Ok(binding)
}
