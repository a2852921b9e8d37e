//! Human-readable tree rendering, used before and after evaluation.
//!
//! One node per line, two spaces of indent per depth level:
//!
//! ```text
//! let: unknown fib
//!   init: unknown n (2)
//!   call: unknown ifzero
//!     var: unknown n (2)
//! ```
//!
//! The synthetic root scope is not printed; its children render at depth 0.
//! `init` and `var` lines show the binding handle in parentheses.

use std::fmt::Write;

use crate::ast::{NodeId, NodeKind, Tree};

/// Render the whole program tree.
pub fn render(tree: &Tree) -> String {
    let mut out = String::new();
    for &child in &tree.node(crate::ast::ROOT).children {
        render_node(tree, child, 0, &mut out);
    }
    out
}

/// Render one sub-tree.
pub fn render_node(tree: &Tree, id: NodeId, depth: usize, out: &mut String) {
    let node = tree.node(id);
    for _ in 0..depth {
        out.push_str("  ");
    }
    // writing to a String cannot fail
    let _ = match &node.kind {
        NodeKind::Let { name: Some(name) } => writeln!(out, "let: {} {}", node.rtype, name),
        NodeKind::Let { name: None } => writeln!(out, "let: {}", node.rtype),
        NodeKind::Init { name, binding } => {
            writeln!(out, "init: {} {} ({})", node.rtype, name, binding)
        }
        NodeKind::Var { name, binding } => {
            writeln!(out, "var: {} {} ({})", node.rtype, name, binding)
        }
        NodeKind::Call { name, .. } => writeln!(out, "call: {} {}", node.rtype, name),
        NodeKind::LitI32(v) => writeln!(out, "lit: i32 {}", v),
        NodeKind::LitF32(v) => writeln!(out, "lit: f32 {:.6}", v),
    };
    for &child in &node.children {
        render_node(tree, child, depth + 1, out);
    }
}
