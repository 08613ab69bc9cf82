//! The symbol universe: every declaration visible to a composition pass.
//!
//! The universe is a persistent map from [`DeclKey`] to the partial
//! declarations registered under that key. Cloning it is cheap, so a pass can
//! hand out snapshots while it keeps registering synthesized declarations.
//! Registration is append-only: nothing is ever removed or replaced.

use std::sync::Arc;

use im::{OrdMap, OrdSet, Vector};
use mixin_foundation::{DeclKey, NamespaceName, Result, TypeParamKey};
use mixin_syntax::ast::{CompilationUnit, Member, NamespaceMember, TypeDecl, TypeKind, UsingDirective};
use mixin_syntax::{TypeName, parse};
use tracing::{debug, trace};

use crate::reference::{ANNOTATION_SOURCE, REFERENCE_MODULE, REFERENCE_SOURCE};

/// An imported name from a `using` directive.
#[derive(Clone, Debug, PartialEq)]
pub enum Import {
    /// `using A.B;`
    Namespace(NamespaceName),
    /// `using X = A.B;`
    Alias {
        /// The alias.
        alias: String,
        /// What the alias names.
        target: TypeName,
    },
    /// `using static A.B;`
    Static(TypeName),
}

impl Import {
    fn from_directive(using: &UsingDirective) -> Self {
        if let Some(alias) = &using.alias {
            Self::Alias {
                alias: alias.clone(),
                target: using.target.clone(),
            }
        } else if using.is_static {
            Self::Static(using.target.clone())
        } else {
            Self::Namespace(NamespaceName::new(
                using.target.segments.iter().map(|s| s.ident.clone()).collect(),
            ))
        }
    }
}

/// Where a name is being looked up from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LookupContext {
    /// Innermost enclosing namespace.
    pub namespace: NamespaceName,
    /// Imports in scope, innermost scope first, each with the namespace
    /// whose declaration holds it (global for file-level usings).
    pub imports: Vec<(NamespaceName, Import)>,
    /// Enclosing type declarations, innermost first.
    pub enclosing: Vec<DeclKey>,
}

impl LookupContext {
    /// Context at file level with nothing imported.
    #[must_use]
    pub fn global() -> Self {
        Self::default()
    }

    /// Context for names inside the body of `key`.
    #[must_use]
    pub fn nested_in(&self, key: &DeclKey) -> Self {
        let mut enclosing = Vec::with_capacity(self.enclosing.len() + 1);
        enclosing.push(key.clone());
        enclosing.extend(self.enclosing.iter().cloned());
        Self {
            namespace: self.namespace.clone(),
            imports: self.imports.clone(),
            enclosing,
        }
    }
}

/// One partial declaration registered under a key.
#[derive(Clone, Debug)]
pub struct DeclPart {
    /// Key the part is registered under.
    pub key: DeclKey,
    /// The declaration.
    pub decl: Arc<TypeDecl>,
    /// Lookup context the declaration appears in.
    pub context: LookupContext,
    /// Module the declaration was loaded from.
    pub module: String,
    /// True for declarations produced by composition.
    pub synthesized: bool,
}

impl DeclPart {
    /// Lookup context for names inside the declaration's body.
    #[must_use]
    pub fn member_context(&self) -> LookupContext {
        self.context.nested_in(&self.key)
    }
}

/// Resolution of a name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolved {
    /// A namespace.
    Namespace(NamespaceName),
    /// A type declaration.
    Type(DeclKey),
    /// A type parameter of an enclosing declaration.
    TypeParam(TypeParamKey),
}

/// Every declaration visible to a composition pass.
#[derive(Clone, Debug, Default)]
pub struct Universe {
    parts: OrdMap<DeclKey, Vector<DeclPart>>,
    namespaces: OrdSet<NamespaceName>,
    discovery: Vector<DeclKey>,
}

impl Universe {
    /// Creates an empty universe containing only the global namespace.
    #[must_use]
    pub fn new() -> Self {
        let mut namespaces = OrdSet::new();
        namespaces.insert(NamespaceName::global());
        Self {
            parts: OrdMap::new(),
            namespaces,
            discovery: Vector::new(),
        }
    }

    /// Creates a universe preloaded with the framework reference declarations
    /// and the annotation declarations under `annotation_module`.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded sources fail to parse.
    pub fn with_reference(annotation_module: &str) -> Result<Self> {
        let mut universe = Self::new();
        universe.add_source(REFERENCE_SOURCE, REFERENCE_MODULE)?;
        universe.add_source(ANNOTATION_SOURCE, annotation_module)?;
        Ok(universe)
    }

    /// Parses `source` and registers its declarations under `module`.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the source is malformed.
    pub fn add_source(&mut self, source: &str, module: &str) -> Result<()> {
        let unit = parse(source)?;
        self.add_unit(&unit, module);
        Ok(())
    }

    /// Registers every declaration in a compilation unit.
    pub fn add_unit(&mut self, unit: &CompilationUnit, module: &str) {
        let imports = unit
            .usings
            .iter()
            .map(|using| (NamespaceName::global(), Import::from_directive(using)))
            .collect();
        let context = LookupContext {
            namespace: NamespaceName::global(),
            imports,
            enclosing: Vec::new(),
        };
        self.add_namespace_members(&unit.members, &context, module);
    }

    fn add_namespace_members(&mut self, members: &[NamespaceMember], context: &LookupContext, module: &str) {
        for member in members {
            match member {
                NamespaceMember::Namespace(ns) => {
                    let mut namespace = context.namespace.clone();
                    for segment in &ns.name.segments {
                        namespace = namespace.child(segment);
                    }
                    let mut imports: Vec<(NamespaceName, Import)> = ns
                        .usings
                        .iter()
                        .map(|using| (namespace.clone(), Import::from_directive(using)))
                        .collect();
                    imports.extend(context.imports.iter().cloned());
                    let inner = LookupContext {
                        namespace,
                        imports,
                        enclosing: Vec::new(),
                    };
                    self.add_namespace(&inner.namespace);
                    self.add_namespace_members(&ns.members, &inner, module);
                }
                NamespaceMember::Type(decl) => {
                    let key = DeclKey::new(context.namespace.clone(), decl.name.clone(), decl.arity());
                    self.register_decl(key, Arc::new(decl.clone()), context.clone(), module, false);
                }
            }
        }
    }

    /// Registers a declaration and every type nested in it.
    pub fn register_decl(
        &mut self,
        key: DeclKey,
        decl: Arc<TypeDecl>,
        context: LookupContext,
        module: &str,
        synthesized: bool,
    ) {
        let member_context = context.nested_in(&key);
        self.register(DeclPart {
            key: key.clone(),
            decl: Arc::clone(&decl),
            context,
            module: module.to_string(),
            synthesized,
        });
        for member in &decl.members {
            if let Member::Type(nested) = member {
                let nested_key = key.nested(nested.name.clone(), nested.arity());
                self.register_decl(
                    nested_key,
                    Arc::new(nested.clone()),
                    member_context.clone(),
                    module,
                    synthesized,
                );
            }
        }
    }

    /// Registers one declaration part. Parts of the same key accumulate.
    pub fn register(&mut self, part: DeclPart) {
        trace!(key = %part.key, module = %part.module, synthesized = part.synthesized, "registering declaration");
        self.add_namespace(&part.key.namespace);
        let key = part.key.clone();
        if !self.parts.contains_key(&key) {
            self.discovery.push_back(key.clone());
        }
        let mut parts = self.parts.get(&key).cloned().unwrap_or_default();
        parts.push_back(part);
        self.parts.insert(key, parts);
    }

    fn add_namespace(&mut self, namespace: &NamespaceName) {
        for ancestor in namespace.ancestors() {
            if self.namespaces.insert(ancestor).is_some() {
                break;
            }
        }
    }

    /// Parts registered under `key`, in registration order.
    pub fn parts(&self, key: &DeclKey) -> impl Iterator<Item = &DeclPart> {
        self.parts.get(key).into_iter().flat_map(|parts| parts.iter())
    }

    /// Returns true if any part is registered under `key`.
    #[must_use]
    pub fn contains(&self, key: &DeclKey) -> bool {
        self.parts.contains_key(key)
    }

    /// Returns true if the namespace holds at least one declaration.
    #[must_use]
    pub fn has_namespace(&self, namespace: &NamespaceName) -> bool {
        self.namespaces.contains(namespace)
    }

    /// Keys in the order they were first registered.
    pub fn keys(&self) -> impl Iterator<Item = &DeclKey> {
        self.discovery.iter()
    }

    /// Number of distinct declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// The first part registered under `key` that did not come from composition.
    #[must_use]
    pub fn primary_part(&self, key: &DeclKey) -> Option<&DeclPart> {
        let mut parts = self.parts(key);
        let first = self.parts(key).next();
        parts.find(|p| !p.synthesized).or(first)
    }

    /// Declaration kind of `key`.
    #[must_use]
    pub fn kind_of(&self, key: &DeclKey) -> Option<TypeKind> {
        self.primary_part(key).map(|p| p.decl.kind)
    }

    /// Module `key` was loaded from.
    #[must_use]
    pub fn module_of(&self, key: &DeclKey) -> Option<&str> {
        self.primary_part(key).map(|p| p.module.as_str())
    }

    /// Type parameter names declared by `key`.
    #[must_use]
    pub fn type_params_of(&self, key: &DeclKey) -> Vec<String> {
        self.primary_part(key)
            .map(|p| p.decl.type_params.iter().map(|tp| tp.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Names of all members declared across every part of `key`.
    #[must_use]
    pub fn member_names_of(&self, key: &DeclKey) -> Vec<String> {
        let mut names = Vec::new();
        for part in self.parts(key) {
            for member in &part.decl.members {
                names.extend(member.declared_names().into_iter().map(String::from));
            }
        }
        names
    }

    /// Logs a summary of the universe contents.
    pub fn log_summary(&self) {
        debug!(
            declarations = self.parts.len(),
            namespaces = self.namespaces.len(),
            "universe loaded"
        );
    }
}
