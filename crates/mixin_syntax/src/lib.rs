//! Lexer, parser, syntax tree, and printer for mixin declaration sources.
//!
//! This crate provides:
//! - `Lexer` - Tokenization of declaration source
//! - `Parser` - Parsing tokens into a [`CompilationUnit`]
//! - `visitor` - Read-only and rewriting traversals over the tree
//! - `pretty` - Rendering trees back to source text

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod pretty;
pub mod span;
pub mod token;
pub mod visitor;

pub use ast::{CompilationUnit, Expr, Member, NamespaceMember, TypeDecl, TypeName, TypeRef};
pub use lexer::Lexer;
pub use parser::{Parser, parse, parse_expr, parse_type_ref};
pub use span::Span;
pub use token::{Token, TokenKind};
