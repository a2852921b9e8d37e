//! Resin evaluator: partial evaluation of a bound tree.
//!
//! This crate provides the runtime for the Resin language. Evaluation walks
//! the tree produced by the binder, computes the program's value, and at
//! the same time rewrites the tree in place: constants fold into literal
//! nodes, conditionals with literal predicates lose their dead branch, and
//! user calls are inlined as anonymous scopes. The tree left behind is the
//! residual program showing what was resolved statically.

pub mod evaluator;
pub mod stack;
pub mod value;

pub use evaluator::Evaluator;
pub use stack::VarStack;
pub use value::{Num, Value};
