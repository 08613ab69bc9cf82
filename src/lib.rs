//! Mixin - source-to-source composition of template members into partial types
//!
//! This crate re-exports all layers of the Mixin system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: mixin_engine     - Universe, lookup, ordering, binding, rewriting, synthesis
//! Layer 1: mixin_syntax     - Lexer, parser, syntax tree, visitors, printer
//! Layer 0: mixin_foundation - Core names (DeclKey, NamespaceName) and Error
//! ```

pub use mixin_engine as engine;
pub use mixin_foundation as foundation;
pub use mixin_syntax as syntax;
