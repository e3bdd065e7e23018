//! Integration tests for function declarations and calls.
//!
//! These cover pre-registration (direct recursion), parameter inference
//! from the body, reconciliation with recursive call sites, return-type
//! validation, call-site refinement of unconstrained callees, and the
//! output-tree invariants (unique names, no residual inference
//! placeholders).

use odds_ast::{BinOp, Expr, Stmt};
use odds_typeck::{analyze, SemanticError, TExpr, TExprKind, TFdecl, TStmt, Type};

// ── Helpers ────────────────────────────────────────────────────────────

fn do_(e: Expr) -> Stmt {
    Stmt::Do(e)
}

fn accept(program: Vec<Stmt>) -> Vec<TStmt> {
    analyze(&program).expect("expected the program to be accepted")
}

fn reject(program: Vec<Stmt>) -> SemanticError {
    analyze(&program).expect_err("expected the program to be rejected")
}

/// The typed expression of the `i`-th statement.
fn stmt_expr(stmts: &[TStmt], i: usize) -> &TExpr {
    match &stmts[i] {
        TStmt::Do(te) => te,
    }
}

/// Collect every expression node in the output tree.
fn collect<'a>(stmts: &'a [TStmt], out: &mut Vec<&'a TExpr>) {
    for stmt in stmts {
        match stmt {
            TStmt::Do(te) => collect_expr(te, out),
        }
    }
}

fn collect_expr<'a>(te: &'a TExpr, out: &mut Vec<&'a TExpr>) {
    out.push(te);
    match &te.kind {
        TExprKind::Unop(_, e) | TExprKind::Assign(_, e) => collect_expr(e, out),
        TExprKind::Binop(lhs, _, rhs) => {
            collect_expr(lhs, out);
            collect_expr(rhs, out);
        }
        TExprKind::Call(callee, args) => {
            collect_expr(callee, out);
            for arg in args {
                collect_expr(arg, out);
            }
        }
        TExprKind::List(elems) => {
            for elem in elems {
                collect_expr(elem, out);
            }
        }
        TExprKind::Fdecl(fdecl) => {
            collect(&fdecl.body, out);
            collect_expr(&fdecl.ret, out);
        }
        TExprKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            collect_expr(cond, out);
            collect_expr(then_branch, out);
            collect_expr(else_branch, out);
        }
        _ => {}
    }
}

fn as_fdecl(te: &TExpr) -> &TFdecl {
    match &te.kind {
        TExprKind::Fdecl(fdecl) => fdecl,
        other => panic!("expected Fdecl, got {:?}", other),
    }
}

// ── Parameter inference ────────────────────────────────────────────────

#[test]
fn parameter_inferred_from_the_body() {
    // do foo = (x) -> do y = x + 1 return y
    let stmts = accept(vec![do_(Expr::assign(
        "foo",
        Expr::fdecl(
            vec!["x"],
            vec![do_(Expr::assign(
                "y",
                Expr::binop(Expr::id("x"), BinOp::Add, Expr::int(1)),
            ))],
            Expr::id("y"),
        ),
    ))]);

    let te = stmt_expr(&stmts, 0);
    assert_eq!(te.ty, Type::func(vec![Type::Num], Type::Num));

    let fdecl = as_fdecl(te);
    assert_eq!(fdecl.uname, "foo_3");
    assert_eq!(fdecl.params, vec!["x_4".to_string()]);
    assert!(!fdecl.is_anon);
    assert_eq!(fdecl.ret.ty, Type::Num);
}

#[test]
fn parameters_inferred_through_an_if() {
    // do pick = (x, y) -> return if x then y else 1
    let stmts = accept(vec![do_(Expr::assign(
        "pick",
        Expr::fdecl(
            vec!["x", "y"],
            vec![],
            Expr::if_(Expr::id("x"), Expr::id("y"), Expr::int(1)),
        ),
    ))]);
    assert_eq!(
        stmt_expr(&stmts, 0).ty,
        Type::func(vec![Type::Bool, Type::Num], Type::Num)
    );
}

#[test]
fn unconstrained_return_is_rejected() {
    // do id = (x) -> return x
    // The parameter is never constrained, generalizes to Any, and the
    // return comes back as Any.
    let err = reject(vec![do_(Expr::assign(
        "id",
        Expr::fdecl(vec!["x"], vec![], Expr::id("x")),
    ))]);
    assert_eq!(
        err,
        SemanticError::UnconstrainedReturn {
            name: "id".into(),
            found: Type::Any,
        }
    );
}

#[test]
fn empty_list_return_is_rejected() {
    // do f = () -> return []
    let err = reject(vec![do_(Expr::assign(
        "f",
        Expr::fdecl(vec![], vec![], Expr::List(vec![])),
    ))]);
    assert_eq!(
        err,
        SemanticError::UnconstrainedReturn {
            name: "f".into(),
            found: Type::list(Type::Unconst),
        }
    );
}

#[test]
fn equality_does_not_constrain_a_parameter() {
    // do f = (x) -> return x == 1
    // Equality is heterogeneous, so x stays unconstrained and closes
    // over as Any; the Bool return is fine.
    let stmts = accept(vec![do_(Expr::assign(
        "f",
        Expr::fdecl(
            vec!["x"],
            vec![],
            Expr::binop(Expr::id("x"), BinOp::Eq, Expr::int(1)),
        ),
    ))]);
    assert_eq!(
        stmt_expr(&stmts, 0).ty,
        Type::func(vec![Type::Any], Type::Bool)
    );
}

// ── Recursion ──────────────────────────────────────────────────────────

#[test]
fn direct_recursion_resolves_via_preregistration() {
    // do g = (x) -> return g(x) + 1
    // The `+` constrains the recursive call's result, which flows into
    // the pre-registered return slot; the pass-through parameter is never
    // constrained and generalizes to Any.
    let stmts = accept(vec![do_(Expr::assign(
        "g",
        Expr::fdecl(
            vec!["x"],
            vec![],
            Expr::binop(
                Expr::call(Expr::id("g"), vec![Expr::id("x")]),
                BinOp::Add,
                Expr::int(1),
            ),
        ),
    ))]);
    assert_eq!(
        stmt_expr(&stmts, 0).ty,
        Type::func(vec![Type::Any], Type::Num)
    );
}

#[test]
fn recursive_countdown_infers_its_parameter() {
    // do f = (n) -> return if n < 1 then 1 else n * f(n - 1)
    let stmts = accept(vec![do_(Expr::assign(
        "f",
        Expr::fdecl(
            vec!["n"],
            vec![],
            Expr::if_(
                Expr::binop(Expr::id("n"), BinOp::Lt, Expr::int(1)),
                Expr::int(1),
                Expr::binop(
                    Expr::id("n"),
                    BinOp::Mul,
                    Expr::call(
                        Expr::id("f"),
                        vec![Expr::binop(Expr::id("n"), BinOp::Sub, Expr::int(1))],
                    ),
                ),
            ),
        ),
    ))]);
    assert_eq!(
        stmt_expr(&stmts, 0).ty,
        Type::func(vec![Type::Num], Type::Num)
    );
}

#[test]
fn if_over_two_unconstrained_parameters_is_rejected() {
    // do f = (x, y) -> return if true then x else y
    // Neither branch ever acquires a type.
    let err = reject(vec![do_(Expr::assign(
        "f",
        Expr::fdecl(
            vec!["x", "y"],
            vec![],
            Expr::if_(Expr::bool(true), Expr::id("x"), Expr::id("y")),
        ),
    ))]);
    assert_eq!(err, SemanticError::UnconstrainedIf);
}

#[test]
fn pass_through_recursion_never_constrains_its_return() {
    // do g = (x) -> return g(x)
    // The recursive call is the only source of return information, so
    // the return slot stays a placeholder.
    let err = reject(vec![do_(Expr::assign(
        "g",
        Expr::fdecl(
            vec!["x"],
            vec![],
            Expr::call(Expr::id("g"), vec![Expr::id("x")]),
        ),
    ))]);
    assert_eq!(
        err,
        SemanticError::UnconstrainedReturn {
            name: "g".into(),
            found: Type::Unconst,
        }
    );
}

#[test]
fn recursive_call_conflicting_with_body_use_is_rejected() {
    // do f = (x) -> do b = x && true return f(1)
    // The body pins x to Bool while the recursive call pins the formal
    // to Num.
    let err = reject(vec![do_(Expr::assign(
        "f",
        Expr::fdecl(
            vec!["x"],
            vec![do_(Expr::assign(
                "b",
                Expr::binop(Expr::id("x"), BinOp::And, Expr::bool(true)),
            ))],
            Expr::call(Expr::id("f"), vec![Expr::int(1)]),
        ),
    ))]);
    assert_eq!(
        err,
        SemanticError::RecursiveTypeMismatch {
            name: "f".into(),
            param: "x".into(),
        }
    );
}

#[test]
fn redefining_an_in_progress_function_is_rejected() {
    // do f = (x) -> do f = (y) -> return y + 1 return x + 1
    let err = reject(vec![do_(Expr::assign(
        "f",
        Expr::fdecl(
            vec!["x"],
            vec![do_(Expr::assign(
                "f",
                Expr::fdecl(
                    vec!["y"],
                    vec![],
                    Expr::binop(Expr::id("y"), BinOp::Add, Expr::int(1)),
                ),
            ))],
            Expr::binop(Expr::id("x"), BinOp::Add, Expr::int(1)),
        ),
    ))]);
    assert_eq!(err, SemanticError::FdeclReassign { name: "f".into() });
}

#[test]
fn redefining_a_finished_function_is_allowed() {
    // do f = (x) -> return x + 1
    // do f = (x) -> return x * 2
    let stmts = accept(vec![
        do_(Expr::assign(
            "f",
            Expr::fdecl(
                vec!["x"],
                vec![],
                Expr::binop(Expr::id("x"), BinOp::Add, Expr::int(1)),
            ),
        )),
        do_(Expr::assign(
            "f",
            Expr::fdecl(
                vec!["x"],
                vec![],
                Expr::binop(Expr::id("x"), BinOp::Mul, Expr::int(2)),
            ),
        )),
    ]);
    // Both declarations finish with the same signature but distinct
    // minted names.
    let first = as_fdecl(stmt_expr(&stmts, 0));
    let second = as_fdecl(stmt_expr(&stmts, 1));
    assert_ne!(first.uname, second.uname);
    assert_eq!(stmt_expr(&stmts, 1).ty, Type::func(vec![Type::Num], Type::Num));
}

// ── Nested functions ───────────────────────────────────────────────────

#[test]
fn closure_body_constrains_the_enclosing_parameter() {
    // do outer = (x) -> do inner = () -> return x + 1 return inner()
    // The constraint on x is recorded inside inner's body but must be
    // visible when outer's parameters are reconciled.
    let stmts = accept(vec![do_(Expr::assign(
        "outer",
        Expr::fdecl(
            vec!["x"],
            vec![do_(Expr::assign(
                "inner",
                Expr::fdecl(
                    vec![],
                    vec![],
                    Expr::binop(Expr::id("x"), BinOp::Add, Expr::int(1)),
                ),
            ))],
            Expr::call(Expr::id("inner"), vec![]),
        ),
    ))]);
    assert_eq!(
        stmt_expr(&stmts, 0).ty,
        Type::func(vec![Type::Num], Type::Num)
    );
}

#[test]
fn anonymous_functions_mint_from_anon() {
    // do (x) -> return x + 1
    let stmts = accept(vec![do_(Expr::fdecl(
        vec!["x"],
        vec![],
        Expr::binop(Expr::id("x"), BinOp::Add, Expr::int(1)),
    ))]);
    let fdecl = as_fdecl(stmt_expr(&stmts, 0));
    assert!(fdecl.is_anon);
    assert_eq!(fdecl.uname, "anon_3");
    assert_eq!(
        stmt_expr(&stmts, 0).ty,
        Type::func(vec![Type::Num], Type::Num)
    );
}

// ── Calls ──────────────────────────────────────────────────────────────

#[test]
fn calling_a_non_function_is_rejected() {
    let err = reject(vec![do_(Expr::call(Expr::id("EUL"), vec![Expr::int(1)]))]);
    assert_eq!(err, SemanticError::CallNonFunction { found: Type::Num });
}

#[test]
fn arity_mismatch_is_rejected() {
    let err = reject(vec![do_(Expr::call(
        Expr::id("print"),
        vec![Expr::int(1), Expr::int(2)],
    ))]);
    assert_eq!(
        err,
        SemanticError::CallArityMismatch {
            expected: 1,
            found: 2,
        }
    );
}

#[test]
fn argument_type_mismatch_is_rejected() {
    // do f = (x) -> return x + 1
    // do f("s")
    let err = reject(vec![
        do_(Expr::assign(
            "f",
            Expr::fdecl(
                vec!["x"],
                vec![],
                Expr::binop(Expr::id("x"), BinOp::Add, Expr::int(1)),
            ),
        )),
        do_(Expr::call(Expr::id("f"), vec![Expr::string("s")])),
    ]);
    assert_eq!(
        err,
        SemanticError::CallArgType {
            index: 0,
            expected: Type::Num,
            found: Type::String,
        }
    );
}

#[test]
fn print_accepts_anything() {
    let stmts = accept(vec![
        do_(Expr::call(Expr::id("print"), vec![Expr::int(1)])),
        do_(Expr::call(Expr::id("print"), vec![Expr::string("hi")])),
        do_(Expr::call(
            Expr::id("print"),
            vec![Expr::List(vec![Expr::bool(true)])],
        )),
    ]);
    for i in 0..3 {
        assert_eq!(stmt_expr(&stmts, i).ty, Type::Void);
    }
}

#[test]
fn unconstrained_callee_is_inferred_from_its_call_site() {
    // do apply = (g) -> return g(1) + 2
    // Calling g commits it to a one-argument function; the argument pins
    // its parameter to Num and the `+` pins its return to Num.
    let stmts = accept(vec![do_(Expr::assign(
        "apply",
        Expr::fdecl(
            vec!["g"],
            vec![],
            Expr::binop(
                Expr::call(Expr::id("g"), vec![Expr::int(1)]),
                BinOp::Add,
                Expr::int(2),
            ),
        ),
    ))]);
    assert_eq!(
        stmt_expr(&stmts, 0).ty,
        Type::func(
            vec![Type::func(vec![Type::Num], Type::Num)],
            Type::Num
        )
    );
}

#[test]
fn declared_function_can_be_called_and_passed_around() {
    // do double = (n) -> return n * 2
    // do x = double(21)
    let stmts = accept(vec![
        do_(Expr::assign(
            "double",
            Expr::fdecl(
                vec!["n"],
                vec![],
                Expr::binop(Expr::id("n"), BinOp::Mul, Expr::int(2)),
            ),
        )),
        do_(Expr::assign(
            "x",
            Expr::call(Expr::id("double"), vec![Expr::int(21)]),
        )),
    ]);
    assert_eq!(stmt_expr(&stmts, 1).ty, Type::Num);
}

// ── Output invariants ──────────────────────────────────────────────────

#[test]
fn output_names_are_unique_and_resolve() {
    // A program touching every introduction form.
    let stmts = accept(vec![
        do_(Expr::assign("a", Expr::int(1))),
        do_(Expr::assign(
            "f",
            Expr::fdecl(
                vec!["n"],
                vec![do_(Expr::assign(
                    "m",
                    Expr::binop(Expr::id("n"), BinOp::Add, Expr::id("a")),
                ))],
                Expr::id("m"),
            ),
        )),
        do_(Expr::assign(
            "b",
            Expr::call(Expr::id("f"), vec![Expr::id("a")]),
        )),
        do_(Expr::call(Expr::id("print"), vec![Expr::id("b")])),
    ]);

    let mut nodes = Vec::new();
    collect(&stmts, &mut nodes);

    // Gather every introduced name and check pairwise uniqueness.
    let mut introduced: Vec<String> = vec!["EUL_0".into(), "PI_1".into(), "print_2".into()];
    for node in &nodes {
        match &node.kind {
            TExprKind::Assign(uname, _) => introduced.push(uname.clone()),
            TExprKind::Fdecl(fdecl) => {
                introduced.push(fdecl.uname.clone());
                introduced.extend(fdecl.params.iter().cloned());
            }
            _ => {}
        }
    }
    let mut deduped = introduced.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), introduced.len(), "minted names must be unique");

    // Every reference resolves to an introduced name or a builtin.
    for node in &nodes {
        if let TExprKind::Id(uname) = &node.kind {
            assert!(
                introduced.contains(uname),
                "unresolved reference `{}`",
                uname
            );
        }
    }

    // No inference placeholder survives analysis.
    for node in &nodes {
        assert!(
            !node.ty.contains_unconst(),
            "residual placeholder in {:?}",
            node
        );
    }
}
