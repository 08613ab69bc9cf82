//! Integration tests for Layer 1: Syntax
//!
//! Tests for the parser, the printer, and tree traversal.

mod parsing;
mod printing;
mod traversal;
