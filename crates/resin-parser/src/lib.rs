//! Resin binder: builds a bound AST from a token stream.
//!
//! Parsing and semantic binding are one pass: while the tree is built, the
//! binder resolves every name to its binding handle and validates call
//! arities. Return types are pre-labelled as follows; the evaluator
//! finalises them later:
//!
//! | form | pre-labelled type |
//! |------|-------------------|
//! | `+ - * /` | promoted type of the arguments |
//! | `ifzero` / `ifneg` | common type of the branches, else `unknown` |
//! | `print` | type of its argument |
//! | `readi32` / `readf32` | `i32` / `f32` |
//! | user call | current type of the target definition |
//! | scope | type of its last body expression |

pub mod binder;

pub use binder::Binder;

#[cfg(test)]
mod tests {
    use super::*;
    use resin_lexer::Lexer;
    use resin_syntax::ast::{NodeKind, Target, Tree};
    use resin_syntax::error::Error;
    use resin_syntax::printer;

    fn parse(input: &str) -> Tree {
        let tokens = Lexer::new(input).tokenize().expect("lexing should succeed");
        Binder::new(tokens)
            .parse_program()
            .expect("binding should succeed")
    }

    fn parse_err(input: &str) -> Error {
        let tokens = Lexer::new(input).tokenize().expect("lexing should succeed");
        Binder::new(tokens)
            .parse_program()
            .expect_err("binding should fail")
    }

    /// Every variable reference must resolve to an `Init` whose scope is an
    /// ancestor of the reference.
    fn assert_bindings_in_scope(tree: &Tree) {
        for id in 0..tree.len() {
            if let NodeKind::Var { binding, .. } = &tree.node(id).kind {
                assert!(tree.is_init(*binding), "binding of node {} is not an init", id);
                let scope = tree.node(*binding).parent.expect("init without a scope");
                let mut cur = tree.node(id).parent;
                let mut found = false;
                while let Some(c) = cur {
                    if c == scope {
                        found = true;
                        break;
                    }
                    cur = tree.node(c).parent;
                }
                assert!(found, "binding of node {} is not in scope", id);
            }
        }
    }

    #[test]
    fn literal_and_call_nodes() {
        assert_eq!(
            printer::render(&parse("(+ 1 2)")),
            "call: i32 +\n  lit: i32 1\n  lit: i32 2\n"
        );
        assert_eq!(printer::render(&parse("42")), "lit: i32 42\n");
        assert_eq!(printer::render(&parse("2.5")), "lit: f32 2.500000\n");
    }

    #[test]
    fn let_binds_and_resolves_variables() {
        let tree = parse("(let ((x 1)) x)");
        assert_eq!(
            printer::render(&tree),
            concat!(
                "let: i32\n",
                "  init: i32 x (2)\n",
                "    lit: i32 1\n",
                "  var: i32 x (2)\n",
            )
        );
        assert_bindings_in_scope(&tree);
    }

    #[test]
    fn defun_registers_a_named_scope() {
        let tree = parse("(defun id(x) x) (id 5)");
        assert_eq!(
            printer::render(&tree),
            concat!(
                "let: unknown id\n",
                "  init: unknown x (2)\n",
                "  var: unknown x (2)\n",
                "call: unknown id\n",
                "  lit: i32 5\n",
            )
        );
        // the call site resolved against the definition node
        assert!(matches!(
            tree.node(4).kind,
            NodeKind::Call {
                target: Some(Target::Defun(1)),
                ..
            }
        ));
        assert_bindings_in_scope(&tree);
    }

    #[test]
    fn recursive_definitions_bind() {
        let tree = parse("(defun fact(n) (ifzero n 1 (* n (fact (- n 1))))) (fact 5)");
        assert_bindings_in_scope(&tree);
    }

    #[test]
    fn return_type_pre_labelling() {
        assert!(printer::render(&parse("(+ 1 2.0)")).starts_with("call: f32 +\n"));
        assert!(printer::render(&parse("(print 2.5)")).starts_with("call: f32 print\n"));
        assert!(printer::render(&parse("(readi32)")).starts_with("call: i32 readi32\n"));
        assert!(printer::render(&parse("(readf32)")).starts_with("call: f32 readf32\n"));
        assert!(printer::render(&parse("(ifzero 1 2 3)")).starts_with("call: i32 ifzero\n"));
        // branches of different static types are unknown
        assert!(printer::render(&parse("(ifzero 1 2 3.0)")).starts_with("call: unknown ifzero\n"));
    }

    #[test]
    fn empty_binding_lists_are_fine() {
        assert_eq!(printer::render(&parse("(let () 5)")), "let: i32\n  lit: i32 5\n");
    }

    #[test]
    fn arity_violations() {
        assert_eq!(parse_err("(+ 1)").msg, "invalid function call");
        assert_eq!(parse_err("(print 1 2)").msg, "invalid function call");
        assert_eq!(parse_err("(ifzero 1 2)").msg, "invalid function call");
        assert_eq!(parse_err("(readi32 1)").msg, "invalid function call");
        assert_eq!(
            parse_err("(defun id(x) x) (id 1 2)").msg,
            "invalid function call"
        );
    }

    #[test]
    fn unknown_names() {
        assert_eq!(parse_err("x").msg, "unknown var");
        assert_eq!(parse_err("(f 1)").msg, "unknown function call");
    }

    #[test]
    fn a_binding_group_cannot_see_itself() {
        let err = parse_err("(let ((x 1) (y x)) y)");
        assert_eq!(err.msg, "unknown var");
        assert_eq!((err.row, err.col), (Some(0), Some(15)));
    }

    #[test]
    fn shadowing_is_by_enclosing_scope_only() {
        // the inner initialiser resolves x in the outer scope
        let tree = parse("(let ((x 1)) (let ((x x)) x))");
        assert_bindings_in_scope(&tree);
        let rendered = printer::render(&tree);
        // outer init is node 2; the initialiser of the inner x reads it
        assert!(rendered.contains("      var: i32 x (2)\n"), "got:\n{}", rendered);
    }

    #[test]
    fn forward_references_are_rejected() {
        assert_eq!(
            parse_err("(f 1) (defun f(x) x)").msg,
            "unknown function call"
        );
    }

    #[test]
    fn defun_is_only_admissible_inside_a_scope() {
        assert_eq!(parse_err("(+ (defun f(x) x) 1)").msg, "misplaced defun");
    }

    #[test]
    fn the_root_must_return_a_value() {
        assert_eq!(
            parse_err("(defun f(x) x)").msg,
            "root expression does not return"
        );
    }

    #[test]
    fn malformed_parentheses() {
        assert_eq!(parse_err(")").msg, "stray right parenthesis");
        assert_eq!(parse_err("(+ 1 2").msg, "stray left parenthesis");
        assert_eq!(parse_err("()").msg, "empty parentheses");
    }

    #[test]
    fn malformed_forms() {
        assert_eq!(parse_err("(let x 1)").msg, "invalid let");
        assert_eq!(parse_err("(let ((x)) x)").msg, "invalid var-init");
        assert_eq!(parse_err("(let ((1 2)) 3)").msg, "invalid var-init");
        assert_eq!(parse_err("(defun f x)").msg, "invalid defun");
        assert_eq!(parse_err("(defun f(1) x)").msg, "invalid defun-arg");
        assert_eq!(parse_err("(let () (defun f(x) x))").msg, "invalid let/defun");
        assert_eq!(parse_err("(1 2)").msg, "unexpected token");
    }
}
