//! The binder: a recursive descent over token spans that builds the tree
//! arena while resolving names and checking arities. There is no separate
//! semantic-analysis pass; return types are pre-labelled from the table in
//! the module docs of [`crate`] and finalised later by the evaluator.

use resin_syntax::ast::{Intrinsic, Node, NodeId, NodeKind, RetType, Target, Tree, ROOT};
use resin_syntax::error::{error, error_at, Result};
use resin_syntax::token::{Token, TokenKind};

/// Expected argument count of a call.
enum Arity {
    Exact(usize),
    AtLeast(usize),
}

/// Builds a bound [`Tree`] from a token stream.
pub struct Binder {
    tokens: Vec<Token>,
    tree: Tree,
}

impl Binder {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            tree: Tree::new(),
        }
    }

    /// Parse top-level forms until tokens are exhausted, registering each as
    /// a child of the synthetic root scope. The root must end up with at
    /// least one non-definition expression to provide the program's value.
    pub fn parse_program(mut self) -> Result<Tree> {
        let mut start = 0;
        let mut len = self.tokens.len();
        while len > 0 {
            let span = self.parse_expr(start, len, ROOT)?;
            start += span;
            len -= span;
        }
        if self.tree.body_expr_count(ROOT) == 0 {
            return error("root expression does not return");
        }
        Ok(self.tree)
    }

    fn err<T>(&self, at: usize, msg: &str) -> Result<T> {
        let t = &self.tokens[at];
        error_at(t.row, t.col, msg)
    }

    /// Length of the parenthesis-balanced leading sub-span, counting both
    /// parentheses. `tokens[start]` must be a left parenthesis.
    fn matching_parens(&self, start: usize, len: usize) -> Option<usize> {
        let mut depth = 0usize;
        for i in start + 1..start + len {
            match self.tokens[i].kind {
                TokenKind::RParen => {
                    if depth == 0 {
                        return Some(i - start + 1);
                    }
                    depth -= 1;
                }
                TokenKind::LParen => depth += 1,
                _ => {}
            }
        }
        None
    }

    /// Parse the leading expression of a token span as a child of `parent`;
    /// returns the number of tokens consumed.
    fn parse_expr(&mut self, start: usize, len: usize, parent: NodeId) -> Result<usize> {
        if len == 0 {
            return error("unexpected end of input");
        }
        let kind = self.tokens[start].kind.clone();
        match kind {
            TokenKind::RParen => self.err(start, "stray right parenthesis"),
            TokenKind::LParen => self.parse_compound(start, len, parent),
            TokenKind::LitI32(v) => {
                let id = self
                    .tree
                    .alloc(Node::new(NodeKind::LitI32(v), RetType::I32, Some(parent)));
                self.tree.add_child(parent, id);
                Ok(1)
            }
            TokenKind::LitF32(v) => {
                let id = self
                    .tree
                    .alloc(Node::new(NodeKind::LitF32(v), RetType::F32, Some(parent)));
                self.tree.add_child(parent, id);
                Ok(1)
            }
            TokenKind::Ident(name) => {
                let init = match self.lookup_var(&name, Some(parent)) {
                    Some(init) => init,
                    None => return self.err(start, "unknown var"),
                };
                let rtype = self.tree.node(init).rtype;
                let id = self.tree.alloc(Node::new(
                    NodeKind::Var {
                        name,
                        binding: init,
                    },
                    rtype,
                    Some(parent),
                ));
                self.tree.add_child(parent, id);
                Ok(1)
            }
            _ => self.err(start, "unexpected token"),
        }
    }

    /// Parse a parenthesized expression: a scope, a definition, or a call.
    fn parse_compound(&mut self, start: usize, len: usize, parent: NodeId) -> Result<usize> {
        let span = match self.matching_parens(start, len) {
            Some(s) => s,
            None => return self.err(start, "stray left parenthesis"),
        };
        if span == 2 {
            return self.err(start, "empty parentheses");
        }
        let mut it = start + 1;
        let mut rem = span - 2;

        let head = self.tokens[it].kind.clone();
        let new_id = match head {
            TokenKind::Defun => {
                // definitions are only admissible directly inside a scope
                if !matches!(self.tree.node(parent).kind, NodeKind::Let { .. }) {
                    return self.err(start, "misplaced defun");
                }
                // minimal shape: defun f ( ) expr
                if rem < 5 {
                    return self.err(start, "invalid defun");
                }
                let name = match &self.tokens[it + 1].kind {
                    TokenKind::Ident(n) => n.clone(),
                    _ => return self.err(start, "invalid defun"),
                };
                it += 1;
                rem -= 1;
                let id = self.tree.alloc(Node::new(
                    NodeKind::Let { name: Some(name) },
                    RetType::Unknown,
                    Some(parent),
                ));
                self.tree.add_child(parent, id);
                let sub = self.parse_defun_params(it, rem, id)?;
                it += sub;
                rem -= sub;
                id
            }
            TokenKind::Let => {
                // minimal shape: let ( ) expr
                if rem < 4 || !matches!(self.tokens[it + 1].kind, TokenKind::LParen) {
                    return self.err(start, "invalid let");
                }
                let id = self.tree.alloc(Node::new(
                    NodeKind::Let { name: None },
                    RetType::None,
                    Some(parent),
                ));
                self.tree.add_child(parent, id);
                it += 1;
                rem -= 1;
                let sub = self.parse_let_inits(it, rem, id)?;
                it += sub;
                rem -= sub;
                id
            }
            TokenKind::Ident(name) => {
                // user call; the target is resolved once the arguments are in
                let id = self.tree.alloc(Node::new(
                    NodeKind::Call { name, target: None },
                    RetType::None,
                    Some(parent),
                ));
                self.tree.add_child(parent, id);
                it += 1;
                rem -= 1;
                id
            }
            other => match Intrinsic::of_token(&other) {
                Some(intr) => {
                    let id = self.tree.alloc(Node::new(
                        NodeKind::Call {
                            name: intr.name().to_string(),
                            target: Some(Target::Intrinsic(intr)),
                        },
                        RetType::None,
                        Some(parent),
                    ));
                    self.tree.add_child(parent, id);
                    it += 1;
                    rem -= 1;
                    id
                }
                None => return self.err(start, "unexpected token"),
            },
        };

        // the rest of the parenthesis body is a sub-expression sequence
        while rem > 0 {
            let sub = self.parse_expr(it, rem, new_id)?;
            it += sub;
            rem -= sub;
        }

        // arity and return-type validation
        if matches!(self.tree.node(new_id).kind, NodeKind::Let { .. }) {
            // scopes need at least one expression to return
            if self.tree.body_expr_count(new_id) == 0 {
                return self.err(start, "invalid let/defun");
            }
            if let Some(last) = self.tree.last_body_expr(new_id) {
                let rtype = self.tree.node(last).rtype;
                self.tree.node_mut(new_id).rtype = rtype;
            }
        } else if matches!(self.tree.node(new_id).kind, NodeKind::Call { .. }) {
            let argc = self.tree.body_expr_count(new_id);
            let arity = match self.resolve_call(new_id) {
                Some(a) => a,
                None => return self.err(start, "unknown function call"),
            };
            let ok = match arity {
                Arity::Exact(n) => argc == n,
                Arity::AtLeast(n) => argc >= n,
            };
            if !ok {
                return self.err(start, "invalid function call");
            }
        }

        Ok(span)
    }

    /// Parse the parameter list of a definition. `tokens[start]` is the
    /// function name; parameters become `Init` nodes without initialisers,
    /// typed `unknown`. Returns the tokens consumed including the name.
    fn parse_defun_params(&mut self, start: usize, len: usize, parent: NodeId) -> Result<usize> {
        if len < 2 || !matches!(self.tokens[start + 1].kind, TokenKind::LParen) {
            return self.err(start, "invalid defun");
        }
        let span = match self.matching_parens(start + 1, len - 1) {
            Some(s) => s,
            None => return self.err(start + 1, "invalid defun"),
        };
        let mut it = start + 2;
        let mut inner = span - 2;
        while inner > 0 {
            let name = match &self.tokens[it].kind {
                TokenKind::Ident(n) => n.clone(),
                _ => return self.err(it, "invalid defun-arg"),
            };
            let binding = self.tree.len();
            let id = self.tree.alloc(Node::new(
                NodeKind::Init { name, binding },
                RetType::Unknown,
                Some(parent),
            ));
            self.tree.add_child(parent, id);
            it += 1;
            inner -= 1;
        }
        Ok(span + 1)
    }

    /// Parse the binding list of a `let`: a parenthesized sequence of
    /// `(name expr)` pairs, each becoming an `Init` node whose single child
    /// is the initialiser and whose return type copies the child's.
    fn parse_let_inits(&mut self, start: usize, len: usize, parent: NodeId) -> Result<usize> {
        let span = match self.matching_parens(start, len) {
            Some(s) => s,
            None => return self.err(start, "invalid let"),
        };
        let mut it = start + 1;
        let mut rem = span - 2;
        while rem > 0 {
            // each binding is (name expr), at least four tokens
            if rem < 4
                || !matches!(self.tokens[it].kind, TokenKind::LParen)
                || !matches!(self.tokens[it + 1].kind, TokenKind::Ident(_))
            {
                return self.err(it, "invalid var-init");
            }
            let sub = match self.matching_parens(it, rem) {
                Some(s) => s,
                None => return self.err(it, "invalid var-init"),
            };
            let inner = sub - 3; // minus both parentheses and the name
            if inner == 0 {
                return self.err(it, "invalid var-init");
            }
            let name = match &self.tokens[it + 1].kind {
                TokenKind::Ident(n) => n.clone(),
                _ => return self.err(it + 1, "invalid var-init"),
            };
            let binding = self.tree.len();
            let init_id = self.tree.alloc(Node::new(
                NodeKind::Init { name, binding },
                RetType::None,
                Some(parent),
            ));
            self.tree.add_child(parent, init_id);
            let used = self.parse_expr(it + 2, inner, init_id)?;
            if used != inner {
                return self.err(it + 2, "invalid var-init");
            }
            let child = self.tree.node(init_id).children[0];
            let rtype = self.tree.node(child).rtype;
            self.tree.node_mut(init_id).rtype = rtype;
            it += sub;
            rem -= sub;
        }
        Ok(span)
    }

    /// Find the `Init` a variable name refers to by walking parent links.
    /// Only the leading `Init` run of each scope is inspected, and a walk
    /// that starts inside a binding group first backtracks out of its scope:
    /// a binding may not refer to a sibling introduced by the same `let`.
    fn lookup_var(&self, name: &str, at: Option<NodeId>) -> Option<NodeId> {
        let mut cur = at?;
        if self.tree.is_init(cur) {
            let group = self.tree.node(cur).parent?;
            cur = self.tree.node(group).parent?;
        }
        if matches!(self.tree.node(cur).kind, NodeKind::Let { .. }) {
            for &child in &self.tree.node(cur).children {
                match &self.tree.node(child).kind {
                    NodeKind::Init { name: n, .. } => {
                        if n == name {
                            return Some(child);
                        }
                    }
                    _ => break, // inits only lead
                }
            }
        }
        self.lookup_var(name, self.tree.node(cur).parent)
    }

    /// Find the definition a function name refers to: each ancestor scope is
    /// checked for its own name and the names of its definition children.
    /// Siblings parsed so far are visible, which admits calls to earlier
    /// definitions but not forward references.
    fn lookup_defun(&self, name: &str, at: Option<NodeId>) -> Option<NodeId> {
        let cur = at?;
        if matches!(self.tree.node(cur).kind, NodeKind::Let { .. }) {
            if let NodeKind::Let { name: Some(n) } = &self.tree.node(cur).kind {
                if n == name {
                    return Some(cur);
                }
            }
            for &child in &self.tree.node(cur).children {
                if let NodeKind::Let { name: Some(n) } = &self.tree.node(child).kind {
                    if n == name {
                        return Some(child);
                    }
                }
            }
        }
        self.lookup_defun(name, self.tree.node(cur).parent)
    }

    /// Pre-label the return type of a call and resolve user-call targets.
    /// Returns the expected arity, or `None` for a call to an unknown name.
    fn resolve_call(&mut self, id: NodeId) -> Option<Arity> {
        let (name, target) = match &self.tree.node(id).kind {
            NodeKind::Call { name, target } => (name.clone(), *target),
            _ => return None,
        };
        match target {
            Some(Target::Intrinsic(intr)) => {
                let (rtype, arity) = match intr {
                    Intrinsic::Add | Intrinsic::Sub | Intrinsic::Mul | Intrinsic::Div => {
                        (self.args_rtype(id), Arity::AtLeast(2))
                    }
                    Intrinsic::IfZero | Intrinsic::IfNeg => (self.if_rtype(id), Arity::Exact(3)),
                    Intrinsic::Print => (self.first_arg_rtype(id), Arity::Exact(1)),
                    Intrinsic::ReadI32 => (RetType::I32, Arity::Exact(0)),
                    Intrinsic::ReadF32 => (RetType::F32, Arity::Exact(0)),
                };
                self.tree.node_mut(id).rtype = rtype;
                Some(arity)
            }
            Some(Target::Defun(defun)) => Some(Arity::Exact(self.tree.init_count(defun))),
            None => {
                let parent = self.tree.node(id).parent;
                let defun = self.lookup_defun(&name, parent)?;
                let rtype = self.tree.node(defun).rtype;
                let node = self.tree.node_mut(id);
                node.rtype = rtype;
                if let NodeKind::Call { target, .. } = &mut node.kind {
                    *target = Some(Target::Defun(defun));
                }
                Some(Arity::Exact(self.tree.init_count(defun)))
            }
        }
    }

    /// Promoted type over the arguments of an arithmetic call.
    fn args_rtype(&self, id: NodeId) -> RetType {
        self.tree
            .node(id)
            .children
            .iter()
            .map(|&c| self.tree.node(c).rtype)
            .fold(RetType::None, RetType::max)
    }

    /// Common type of the two branches of a conditional, `unknown` if they
    /// differ.
    fn if_rtype(&self, id: NodeId) -> RetType {
        let children = &self.tree.node(id).children;
        if children.len() != 3 {
            return RetType::None;
        }
        let then_t = self.tree.node(children[1]).rtype;
        let else_t = self.tree.node(children[2]).rtype;
        if then_t == else_t {
            then_t
        } else {
            RetType::Unknown
        }
    }

    fn first_arg_rtype(&self, id: NodeId) -> RetType {
        self.tree
            .node(id)
            .children
            .first()
            .map_or(RetType::None, |&c| self.tree.node(c).rtype)
    }
}
