//! The composition pass.
//!
//! Validation, directive discovery, and ordering run once over the whole
//! universe; each target is then bound, rewritten, synthesized, and
//! registered back into the universe before the next target, so a template
//! that is itself a target is seen with everything composed into it.

use std::collections::BTreeSet;
use std::sync::Arc;

use mixin_foundation::{DeclKey, Error, ErrorContext, ErrorKind, Result};
use mixin_syntax::CompilationUnit;
use mixin_syntax::ast::{TypeDecl, TypeKind, TypeRef};
use mixin_syntax::pretty::{PrettyConfig, pretty_print_unit_with_config};
use tracing::{debug, info, warn};

use crate::binder::bind;
use crate::config::{ComposeConfig, FailurePolicy};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::graph::{AnnotatedDecl, AnnotationKeys, CompositionDirective, SymbolGraph, validate_annotations};
use crate::provenance::Attributor;
use crate::rewriter::{Rewriter, qualified_name, strip_markers};
use crate::synthesizer::{Contribution, merge_contributions, synthesize, wrap_in_scope};
use crate::topo::order_topological;
use crate::universe::Universe;

/// A synthesized declaration ready for rendering.
#[derive(Clone, Debug)]
pub struct SynthesizedDecl {
    /// The target declaration.
    pub key: DeclKey,
    /// The merged partial declaration.
    pub decl: TypeDecl,
    /// The declaration wrapped in its namespace and containing types.
    pub unit: CompilationUnit,
}

impl SynthesizedDecl {
    /// Renders the declaration as source text.
    #[must_use]
    pub fn render(&self, config: &PrettyConfig) -> String {
        pretty_print_unit_with_config(&self.unit, config.clone())
    }
}

/// A target that produced no output.
#[derive(Clone, Debug)]
pub struct TargetFailure {
    /// The target declaration.
    pub target: DeclKey,
    /// Why it failed.
    pub error: Error,
}

/// Result of a composition pass.
#[derive(Clone, Debug)]
pub struct CompositionOutput {
    /// Synthesized declarations in processing order.
    pub declarations: Vec<SynthesizedDecl>,
    /// Targets that failed, in processing order.
    pub failures: Vec<TargetFailure>,
    /// Warnings and errors reported during the pass.
    pub diagnostics: Diagnostics,
    /// Processing order of every annotated declaration.
    pub order: Vec<DeclKey>,
    /// The universe after every synthesized declaration was registered.
    pub universe: Universe,
    pretty: PrettyConfig,
}

impl CompositionOutput {
    /// The synthesized declaration for `key`.
    #[must_use]
    pub fn get(&self, key: &DeclKey) -> Option<&SynthesizedDecl> {
        self.declarations.iter().find(|d| &d.key == key)
    }

    /// The failure recorded for `key`.
    #[must_use]
    pub fn failure(&self, key: &DeclKey) -> Option<&Error> {
        self.failures.iter().find(|f| &f.target == key).map(|f| &f.error)
    }

    /// Renders the synthesized declaration for `key`.
    #[must_use]
    pub fn render_target(&self, key: &DeclKey) -> Option<String> {
        self.get(key).map(|d| d.render(&self.pretty))
    }

    /// Renders every synthesized declaration, separated by blank lines.
    #[must_use]
    pub fn render(&self) -> String {
        self.declarations
            .iter()
            .map(|d| d.render(&self.pretty))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Returns true if every target was composed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Owns the universe and runs composition passes over it.
#[derive(Clone, Debug)]
pub struct Composer {
    config: ComposeConfig,
    universe: Universe,
}

impl Composer {
    /// Creates a composer whose universe holds the reference and annotation
    /// declarations.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded declarations fail to parse.
    pub fn new(config: ComposeConfig) -> Result<Self> {
        let universe = Universe::with_reference(&config.annotation_module)?;
        Ok(Self { config, universe })
    }

    /// Creates a composer over an existing universe.
    #[must_use]
    pub fn with_universe(config: ComposeConfig, universe: Universe) -> Self {
        Self { config, universe }
    }

    /// The pass configuration.
    #[must_use]
    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    /// The current universe.
    #[must_use]
    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    /// Parses and registers a source under `module`.
    ///
    /// # Errors
    ///
    /// Returns a parse error naming the module if the source is malformed.
    pub fn add_source(&mut self, source: &str, module: &str) -> Result<()> {
        self.universe
            .add_source(source, module)
            .map_err(|e| e.with_context(ErrorContext::new().with_source(module)))
    }

    /// Registers an already parsed unit under `module`.
    pub fn add_unit(&mut self, unit: &CompilationUnit, module: &str) {
        self.universe.add_unit(unit, module);
    }

    /// Runs the composition pass.
    ///
    /// # Errors
    ///
    /// Returns an error for a dependency cycle or a foreign annotation, and,
    /// under [`FailurePolicy::AbortPass`], for the first target that fails.
    pub fn compose(mut self) -> Result<CompositionOutput> {
        self.universe.log_summary();
        let annotations = validate_annotations(&self.universe, &self.config)?;
        let graph = SymbolGraph::build(&self.universe, &annotations);

        let order = order_topological(&graph.keys(), |key| graph.dependencies(key)).map_err(|cycle| {
            match cycle.path.first().cloned() {
                Some(start) => Error::circular_dependency(&start, cycle.path),
                None => Error::new(ErrorKind::Internal("empty dependency cycle".to_string())),
            }
        })?;
        debug!(
            order = %order.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
            "composition order resolved"
        );

        let mut attributor = Attributor::new(&self.config.generator_name, &self.config.generator_version);
        let mut declarations = Vec::new();
        let mut failures = Vec::new();
        let mut diagnostics = Diagnostics::new();
        let mut failed = BTreeSet::new();

        for key in &order {
            let Some(annotated) = graph.get(key) else {
                continue;
            };
            let blocked = graph.dependencies(key).into_iter().find(|d| failed.contains(d));
            let result = match blocked {
                Some(dependency) => Err(Error::dependency_failed(key, &dependency)
                    .with_context(ErrorContext::new().with_declaration(key.to_string()))),
                None => self.compose_target(annotated, &annotations, &mut attributor, &mut diagnostics),
            };

            match result {
                Ok((synthesized, registered)) => {
                    self.register(&synthesized.key, registered);
                    debug!(target_decl = %key, members = synthesized.decl.members.len(), "target composed");
                    declarations.push(synthesized);
                }
                Err(error) => {
                    warn!(target_decl = %key, error = %error, "target failed");
                    if self.config.failure_policy == FailurePolicy::AbortPass {
                        return Err(error);
                    }
                    diagnostics.push(Diagnostic::from_error(Some(key), &error));
                    failed.insert(key.clone());
                    failures.push(TargetFailure {
                        target: key.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            composed = declarations.len(),
            failed = failures.len(),
            warnings = diagnostics.warnings().count(),
            "composition pass finished"
        );
        Ok(CompositionOutput {
            declarations,
            failures,
            diagnostics,
            order,
            universe: self.universe,
            pretty: self.config.pretty,
        })
    }

    /// Registers the synthesized part with its substitution markers intact,
    /// so targets composing it substitute their own type.
    fn register(&mut self, key: &DeclKey, decl: TypeDecl) {
        let Some(part) = self.universe.primary_part(key) else {
            return;
        };
        let context = part.context.clone();
        let module = part.module.clone();
        self.universe.register_decl(key.clone(), Arc::new(decl), context, &module, true);
    }

    fn compose_target(
        &self,
        annotated: &AnnotatedDecl,
        annotations: &AnnotationKeys,
        attributor: &mut Attributor,
        diagnostics: &mut Diagnostics,
    ) -> Result<(SynthesizedDecl, TypeDecl)> {
        let key = &annotated.key;
        let target = self
            .universe
            .primary_part(key)
            .map(|part| Arc::clone(&part.decl))
            .ok_or_else(|| Error::new(ErrorKind::Internal(format!("{key} has no declaration"))))?;
        let target_params = self.universe.type_params_of(key);
        let self_type = TypeRef::Named(qualified_name(&self.universe, key, &[]));

        let mut contributions = Vec::with_capacity(annotated.directives.len());
        for directive in &annotated.directives {
            let contribution = self
                .contribute(directive, &target_params, &self_type, annotations, diagnostics)
                .map_err(|e| {
                    e.with_context(
                        ErrorContext::new()
                            .with_declaration(key.to_string())
                            .with_directive(directive.written.clone())
                            .with_position(directive.span.line, directive.span.column),
                    )
                })?;
            contributions.push(contribution);
        }

        let (members, bases) = merge_contributions(key, &contributions, self.config.conflict_policy)
            .map_err(|e| e.with_context(ErrorContext::new().with_declaration(key.to_string())))?;
        let registered = synthesize(&target, members, bases, attributor);
        let marker = qualified_name(&self.universe, &annotations.substitute, &[]);
        let decl = strip_markers(registered.clone(), &marker);
        let unit = wrap_in_scope(&self.universe, key, decl.clone());
        Ok((
            SynthesizedDecl {
                key: key.clone(),
                decl,
                unit,
            },
            registered,
        ))
    }

    fn contribute(
        &self,
        directive: &CompositionDirective,
        target_params: &[String],
        self_type: &TypeRef,
        annotations: &AnnotationKeys,
        diagnostics: &mut Diagnostics,
    ) -> Result<Contribution> {
        let binding = bind(&self.universe, directive, target_params)?;
        let template = directive
            .template
            .clone()
            .ok_or_else(|| Error::unresolved_template(directive.written.clone()))?;
        debug!(
            target_decl = %directive.target,
            template = %template,
            bound = binding.len(),
            "applying directive"
        );

        let values = self.universe.member_names_of(&template);
        let mut members = Vec::new();
        let mut bases = Vec::new();
        for part in self.universe.parts(&template) {
            let mut rewriter = Rewriter::new(&self.universe, &binding, part.member_context())
                .with_redirect(template.clone(), directive.target.clone())
                .with_substitution(annotations.substitute.clone(), self_type.clone())
                .retaining_markers()
                .with_values(values.iter().cloned());
            members.extend(rewriter.rewrite_members(part.decl.members.clone()));

            for base in &part.decl.bases {
                let is_interface = base
                    .as_named()
                    .and_then(|name| self.universe.resolve_type(&part.member_context(), name))
                    .and_then(|base_key| self.universe.kind_of(&base_key))
                    == Some(TypeKind::Interface);
                if is_interface {
                    bases.push(rewriter.rewrite_type_ref(base.clone()));
                }
            }

            for name in rewriter.unresolved() {
                diagnostics.push(Diagnostic::warning(
                    &directive.target,
                    Some(&directive.written),
                    format!("reference left unresolved: {name}"),
                ));
            }
        }

        Ok(Contribution {
            directive: directive.written.clone(),
            members,
            bases,
        })
    }
}

/// Composes a set of `(source, module)` pairs in one pass.
///
/// # Errors
///
/// Returns parse errors and pass-level composition errors.
pub fn compose_sources(sources: &[(&str, &str)], config: ComposeConfig) -> Result<CompositionOutput> {
    let mut composer = Composer::new(config)?;
    for (source, module) in sources {
        composer.add_source(source, module)?;
    }
    composer.compose()
}
