//! Core names, keys, and errors for the mixin composition engine.
//!
//! This crate provides:
//! - [`NamespaceName`], [`DeclKey`], [`TypeParamKey`] - value-equality identities
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod name;

pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use name::{DeclKey, GLOBAL_PREFIX, NamespaceName, TypeParamKey, TypeSegment};
