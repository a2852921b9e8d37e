//! Resin language syntax definitions and abstract syntax tree.
//!
//! This crate provides the foundational types for the Resin toolchain:
//! token definitions, the AST node arena, error handling utilities and the
//! tree printer. All other crates in the workspace depend on these types.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │            Evaluator                │  <- Rewrites the tree in place
//! ├─────────────────────────────────────┤
//! │             Binder                  │  <- Produces a bound tree
//! ├─────────────────────────────────────┤
//! │              Lexer                  │  <- Produces tokens
//! ├─────────────────────────────────────┤
//! │           Source text               │
//! └─────────────────────────────────────┘
//! ```
//!
//! The tree is an arena ([`ast::Tree`]) addressed by stable integer handles.
//! The evaluator mutates node contents in place while the program runs; the
//! printer ([`printer`]) renders the tree before and after to show which
//! sub-programs were resolved statically.

/// Token definitions produced by the lexer.
pub mod token;

/// AST node and arena definitions.
pub mod ast;

/// Error handling utilities and types.
pub mod error;

/// Tree rendering for human inspection.
pub mod printer;

pub use ast::*;
pub use error::*;
pub use token::*;
