//! Integration tests for Layer 0: Foundation
//!
//! Tests for core identities (NamespaceName, DeclKey, TypeParamKey) and Error.

mod errors;
mod names;
