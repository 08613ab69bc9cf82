//! Cross-layer integration tests for Mixin
//!
//! Tests that parse sources, run a full composition pass, and check the
//! rendered output.

mod composition;
mod failures;
mod policies;
