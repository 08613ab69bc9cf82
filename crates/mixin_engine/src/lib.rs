//! Symbol universe, dependency ordering, generic binding, and reference
//! rewriting for mixin composition.
//!
//! This crate provides:
//! - [`Universe`] - Every declaration visible to a pass, with name lookup
//! - [`SymbolGraph`] - Composition directives discovered in the universe
//! - [`Rewriter`] - Canonicalization of copied template members
//! - [`Composer`] - The composition pass itself
//! - [`Diagnostics`] - Per-target warnings and errors

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod binder;
pub mod config;
pub mod diagnostics;
pub mod graph;
pub mod lookup;
pub mod pipeline;
pub mod provenance;
pub mod reference;
pub mod rewriter;
pub mod synthesizer;
pub mod topo;
pub mod universe;

pub use binder::{Binding, bind};
pub use config::{ComposeConfig, ConflictPolicy, FailurePolicy};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use graph::{AnnotatedDecl, AnnotationKeys, CompositionDirective, SymbolGraph, validate_annotations};
pub use pipeline::{Composer, CompositionOutput, SynthesizedDecl, TargetFailure, compose_sources};
pub use provenance::Attributor;
pub use rewriter::{Rewriter, qualified_name};
pub use synthesizer::{Contribution, member_signatures, merge_contributions, synthesize, wrap_in_scope};
pub use topo::{Cycle, order_topological};
pub use universe::{DeclPart, Import, LookupContext, Resolved, Universe};
