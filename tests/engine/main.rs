//! Integration tests for Layer 2: Engine
//!
//! Tests for the universe, name lookup, ordering, binding, and rewriting.

mod binding;
mod lookup;
mod ordering;
mod rewriting;
