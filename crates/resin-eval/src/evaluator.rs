//! The evaluator: a recursive visitor over the tree arena that produces
//! values while rewriting the program in place.
//!
//! Three rewrites happen as evaluation proceeds:
//!
//! - any non-root, non-init node whose value is literal and free of side
//!   effects collapses into a literal node;
//! - a conditional with a literal predicate disappears, either by splicing
//!   the selected branch into the parent or, when the predicate had side
//!   effects, by turning into an anonymous scope of predicate and branch;
//! - a user call is replaced by a freshly cloned scope of its definition
//!   with the arguments attached as initialisers.
//!
//! Handles stay valid throughout: rewrites change node contents, never
//! remove nodes.

use std::io::{BufRead, Write};

use resin_syntax::ast::{Intrinsic, Node, NodeId, NodeKind, RetType, Target, Tree, ROOT};
use resin_syntax::error::{error, Error, Result};

use crate::stack::VarStack;
use crate::value::{Num, Value};

/// Evaluates a bound tree against an input and an output stream.
///
/// The streams are generic so the driver can pass stdin/stdout and tests
/// can pass in-memory buffers.
pub struct Evaluator<R, W> {
    input: R,
    output: W,
}

/// What the walker has to do for a node, extracted up front so the tree
/// can be borrowed mutably while the node is processed.
enum Step {
    Scope,
    Init,
    Var(NodeId),
    Call(Target),
}

impl<R: BufRead, W: Write> Evaluator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Evaluate the whole program and return the root value. The tree is
    /// left in its rewritten (residual) form.
    pub fn run(&mut self, tree: &mut Tree) -> Result<Value> {
        let mut stack = VarStack::new();
        let value = self.eval(tree, ROOT, &mut stack)?;
        debug_assert!(stack.is_empty());
        Ok(value)
    }

    fn eval(&mut self, tree: &mut Tree, id: NodeId, stack: &mut VarStack) -> Result<Value> {
        let step = match &tree.node(id).kind {
            // literals and reads never rewrite their node; return straight away
            NodeKind::LitI32(v) => return Ok(Value::lit_i32(*v)),
            NodeKind::LitF32(v) => return Ok(Value::lit_f32(*v)),
            NodeKind::Let { .. } => Step::Scope,
            NodeKind::Init { .. } => Step::Init,
            NodeKind::Var { binding, .. } => Step::Var(*binding),
            NodeKind::Call {
                target: Some(target),
                ..
            } => Step::Call(*target),
            NodeKind::Call { target: None, .. } => return error("call without a bound target"),
        };

        let (ret, spliced) = match step {
            Step::Scope => (self.eval_scope(tree, id, stack)?, false),
            Step::Init => (self.eval_init(tree, id, stack)?, false),
            Step::Var(binding) => {
                let value = stack
                    .lookup(binding)
                    .ok_or_else(|| Error::new("unbound variable"))?;
                (value, false)
            }
            Step::Call(Target::Defun(defun)) => return self.inline_call(tree, id, defun, stack),
            Step::Call(Target::Intrinsic(intr)) => match intr {
                Intrinsic::Add => (
                    self.eval_arith(tree, id, stack, |a, b| a.wrapping_add(b), |a, b| a + b)?,
                    false,
                ),
                Intrinsic::Sub => (
                    self.eval_arith(tree, id, stack, |a, b| a.wrapping_sub(b), |a, b| a - b)?,
                    false,
                ),
                Intrinsic::Mul => (
                    self.eval_arith(tree, id, stack, |a, b| a.wrapping_mul(b), |a, b| a * b)?,
                    false,
                ),
                Intrinsic::Div => (
                    self.eval_arith(tree, id, stack, |a, b| a.wrapping_div(b), |a, b| a / b)?,
                    false,
                ),
                Intrinsic::IfZero => self.eval_if(tree, id, stack, |n| match n {
                    Num::I32(v) => v == 0,
                    Num::F32(v) => v == 0.0,
                })?,
                Intrinsic::IfNeg => self.eval_if(tree, id, stack, |n| match n {
                    Num::I32(v) => v < 0,
                    Num::F32(v) => v < 0.0,
                })?,
                Intrinsic::Print => (self.eval_print(tree, id, stack)?, false),
                Intrinsic::ReadI32 => {
                    let word = self.read_word("i: ")?;
                    let v = word.parse::<i32>().map_err(|_| Error::new("invalid input"))?;
                    return Ok(Value::read_i32(v));
                }
                Intrinsic::ReadF32 => {
                    let word = self.read_word("f: ")?;
                    let v = word.parse::<f32>().map_err(|_| Error::new("invalid input"))?;
                    return Ok(Value::read_f32(v));
                }
            },
        };

        if !spliced {
            // collapse pure literal results into literal nodes; never the
            // root, and never an init, which must keep its binding relation
            if id != ROOT && !tree.is_init(id) && ret.literal && !ret.sidefx {
                let parent = tree.node(id).parent;
                let kind = match ret.num {
                    Num::I32(v) => NodeKind::LitI32(v),
                    Num::F32(v) => NodeKind::LitF32(v),
                };
                tree.replace(id, Node::new(kind, ret.rtype(), parent));
            } else {
                tree.node_mut(id).rtype = if ret.incoh {
                    RetType::Unknown
                } else {
                    ret.rtype()
                };
            }
        }
        Ok(ret)
    }

    /// A scope: run the binding group, publish it, then run the body in
    /// order, skipping nested definitions. The last non-definition body
    /// expression provides the value; side effects accumulate over the
    /// whole scope. On exit the stack drops back to its saved height.
    fn eval_scope(&mut self, tree: &mut Tree, id: NodeId, stack: &mut VarStack) -> Result<Value> {
        let restore = stack.len();
        let count = tree.node(id).children.len();
        let mut sidefx = false;
        let mut index = 0;
        while index < count {
            let child = tree.node(id).children[index];
            if !tree.is_init(child) {
                break;
            }
            let value = self.eval(tree, child, stack)?;
            sidefx |= value.sidefx;
            index += 1;
        }
        // de-anonymise the new frames under the binding handles of the group
        let bindings: Vec<NodeId> = tree.node(id).children[..index]
            .iter()
            .map(|&c| match &tree.node(c).kind {
                NodeKind::Init { binding, .. } => *binding,
                _ => c,
            })
            .collect();
        stack.publish(restore, &bindings);

        let mut ret = None;
        while index < count {
            let child = tree.node(id).children[index];
            if tree.is_defun(child) {
                index += 1;
                continue;
            }
            let value = self.eval(tree, child, stack)?;
            sidefx |= value.sidefx;
            ret = Some(value);
            index += 1;
        }
        stack.truncate(restore);
        let mut ret = ret.ok_or_else(|| Error::new("scope does not return"))?;
        ret.sidefx = sidefx;
        Ok(ret)
    }

    /// Evaluate the initialiser and push its value as an anonymous frame.
    /// The raw value, flags intact, still flows to the enclosing scope.
    fn eval_init(&mut self, tree: &mut Tree, id: NodeId, stack: &mut VarStack) -> Result<Value> {
        let child = match tree.node(id).children.first() {
            Some(&c) => c,
            None => return error("binding without an initialiser"),
        };
        let value = self.eval(tree, child, stack)?;
        stack.push_anonymous(value);
        Ok(value)
    }

    /// Arithmetic over two or more arguments, left-associative. The
    /// accumulator promotes to f32 at the first f32 operand; subsequent
    /// i32 operands are cast.
    fn eval_arith(
        &mut self,
        tree: &mut Tree,
        id: NodeId,
        stack: &mut VarStack,
        op_i32: fn(i32, i32) -> i32,
        op_f32: fn(f32, f32) -> f32,
    ) -> Result<Value> {
        let count = tree.node(id).children.len();
        let first = tree.node(id).children[0];
        let lead = self.eval(tree, first, stack)?;
        let mut literal = lead.literal;
        let mut sidefx = lead.sidefx;
        let mut incoh = lead.incoh;
        let mut acc = lead.num;
        for index in 1..count {
            let child = tree.node(id).children[index];
            let arg = self.eval(tree, child, stack)?;
            literal &= arg.literal;
            sidefx |= arg.sidefx;
            incoh |= arg.incoh;
            acc = match (acc, arg.num) {
                (Num::I32(a), Num::I32(b)) => Num::I32(op_i32(a, b)),
                (Num::I32(a), Num::F32(b)) => Num::F32(op_f32(a as f32, b)),
                (Num::F32(a), Num::I32(b)) => Num::F32(op_f32(a, b as f32)),
                (Num::F32(a), Num::F32(b)) => Num::F32(op_f32(a, b)),
            };
        }
        Ok(Value {
            num: acc,
            literal,
            sidefx,
            incoh,
        })
    }

    /// A conditional: the predicate runs, then only the selected branch.
    /// A literal predicate makes the conditional disappear: a pure one lets
    /// the selected branch replace the whole node in the parent, a
    /// side-effectful one leaves an anonymous scope of predicate and
    /// branch. Returns the value and whether the node was spliced out.
    fn eval_if(
        &mut self,
        tree: &mut Tree,
        id: NodeId,
        stack: &mut VarStack,
        taken: fn(Num) -> bool,
    ) -> Result<(Value, bool)> {
        let pred_id = tree.node(id).children[0];
        let pred = self.eval(tree, pred_id, stack)?;
        let literal = pred.literal;
        let sidefx = pred.sidefx;
        let branch = if taken(pred.num) { 1 } else { 2 };

        // this eval may inline, replacing the node in our child slot
        let branch_id = tree.node(id).children[branch];
        let mut ret = self.eval(tree, branch_id, stack)?;
        ret.literal &= literal;
        ret.sidefx |= sidefx;
        let then_t = tree.node(tree.node(id).children[1]).rtype;
        let else_t = tree.node(tree.node(id).children[2]).rtype;
        ret.incoh |= !literal && then_t != else_t;

        if !literal {
            return Ok((ret, false));
        }
        let parent = tree.node(id).parent;
        let kept = tree.node(id).children[branch];
        if sidefx {
            // keep the effect, drop the test
            let pred_kept = tree.node(id).children[0];
            let mut scope = Node::new(NodeKind::Let { name: None }, RetType::None, parent);
            scope.children = vec![pred_kept, kept];
            tree.replace(id, scope);
            Ok((ret, false))
        } else {
            if let Some(p) = parent {
                tree.replace_child(p, id, kept);
            }
            Ok((ret, true))
        }
    }

    fn eval_print(&mut self, tree: &mut Tree, id: NodeId, stack: &mut VarStack) -> Result<Value> {
        let child = tree.node(id).children[0];
        let mut value = self.eval(tree, child, stack)?;
        match value.num {
            Num::I32(v) => writeln!(self.output, "{}", v),
            Num::F32(v) => writeln!(self.output, "{:.6}", v),
        }
        .map_err(|e| Error::new(format!("i/o error: {}", e)))?;
        value.sidefx = true;
        Ok(value)
    }

    /// Execute a user call by materialising the definition as a fresh
    /// anonymous scope at the call site: parameters and body are deep
    /// copied, the caller's argument sub-trees become the initialisers of
    /// the copied parameters, and the new scope replaces the call in its
    /// parent. Repeated calls produce repeated copies, so recursion unrolls
    /// exactly as far as a conditional guard forces it.
    fn inline_call(
        &mut self,
        tree: &mut Tree,
        id: NodeId,
        defun: NodeId,
        stack: &mut VarStack,
    ) -> Result<Value> {
        let parent = tree.node(id).parent;
        let scope = tree.alloc(Node::new(NodeKind::Let { name: None }, RetType::None, parent));
        clone_children(tree, defun, scope);
        if let Some(p) = parent {
            tree.replace_child(p, id, scope);
        }
        let args: Vec<NodeId> = tree.node(id).children.clone();
        let params: Vec<NodeId> = tree.node(scope).children[..args.len()].to_vec();
        for (arg, param) in args.into_iter().zip(params) {
            tree.node_mut(param).children.push(arg);
            tree.node_mut(arg).parent = Some(param);
        }
        self.eval(tree, scope, stack)
    }

    /// Write a prompt, then read one whitespace-delimited word.
    fn read_word(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}", prompt)
            .and_then(|_| self.output.flush())
            .map_err(|e| Error::new(format!("i/o error: {}", e)))?;
        let mut word = String::new();
        loop {
            let (used, done) = {
                let buf = self
                    .input
                    .fill_buf()
                    .map_err(|e| Error::new(format!("i/o error: {}", e)))?;
                if buf.is_empty() {
                    break;
                }
                let mut used = 0;
                let mut done = false;
                for &b in buf {
                    if b.is_ascii_whitespace() {
                        if word.is_empty() {
                            used += 1;
                            continue;
                        }
                        done = true;
                        break;
                    }
                    word.push(b as char);
                    used += 1;
                }
                (used, done)
            };
            self.input.consume(used);
            if done {
                break;
            }
        }
        if word.is_empty() {
            return error("invalid input");
        }
        Ok(word)
    }
}

/// Deep-copy the children of `src` under `dst`, re-pointing parents into
/// the cloned range. Binding handles are preserved, so variable references
/// in a cloned body keep resolving against the frames its cloned inits
/// publish.
fn clone_children(tree: &mut Tree, src: NodeId, dst: NodeId) {
    let children = tree.node(src).children.clone();
    for child in children {
        let mut node = tree.node(child).clone();
        node.parent = Some(dst);
        node.children = Vec::new();
        let copy = tree.alloc(node);
        tree.add_child(dst, copy);
        clone_children(tree, child, copy);
    }
}
