//! The Odds checker: a single-pass traversal from source AST to typed AST.
//!
//! Walks the program statement by statement, resolving names against the
//! environment, minting unique names for every introduced identifier, and
//! flowing type information both ways through expression trees:
//! - downward, when an operator or call site demands an operand type;
//! - upward, when a sub-expression's inferred type refines a binding.
//!
//! Constraining is deliberately one level deep (`constrain`): it acts on
//! identifiers, function declarations, and calls of identifiers, never on
//! the innards of compound expressions. Function declarations resolve
//! direct recursion by pre-registering their name with a fully
//! unconstrained signature before the body is checked.

use odds_ast::{BinOp, Expr, Fdecl, Stmt, UnOp};

use crate::builtins;
use crate::env::Env;
use crate::error::{Result, SemanticError};
use crate::tast::{TExpr, TExprKind, TFdecl, TStmt};
use crate::ty::{generalize, meet, Type};

/// Analyze a parsed Odds program.
///
/// Runs the statement list against the root environment and returns the
/// typed, alpha-renamed statement list, or the first semantic error.
pub fn analyze(program: &[Stmt]) -> Result<Vec<TStmt>> {
    let mut env = builtins::root_env();
    infer_stmts(&mut env, program)
}

// ── Statements ─────────────────────────────────────────────────────────

/// Check a statement list, threading the environment left to right.
fn infer_stmts(env: &mut Env, stmts: &[Stmt]) -> Result<Vec<TStmt>> {
    stmts.iter().map(|stmt| infer_stmt(env, stmt)).collect()
}

fn infer_stmt(env: &mut Env, stmt: &Stmt) -> Result<TStmt> {
    match stmt {
        Stmt::Do(expr) => Ok(TStmt::Do(infer_expr(env, expr)?)),
    }
}

// ── Expressions ────────────────────────────────────────────────────────

/// Check an expression, producing a typed node.
///
/// The main dispatcher: matches every source form and delegates to a
/// specialized checker. Sub-terms are always checked left to right.
fn infer_expr(env: &mut Env, expr: &Expr) -> Result<TExpr> {
    match expr {
        Expr::Num(n) => Ok(TExpr::new(TExprKind::Num(n.clone()), Type::Num)),
        Expr::Str(s) => Ok(TExpr::new(TExprKind::Str(s.clone()), Type::String)),
        Expr::Bool(b) => Ok(TExpr::new(TExprKind::Bool(*b), Type::Bool)),
        Expr::Void => Ok(TExpr::new(TExprKind::Void, Type::Void)),
        Expr::Id(name) => {
            let var = env.lookup(name)?;
            let var = var.borrow();
            Ok(TExpr::new(TExprKind::Id(var.uname.clone()), var.ty.clone()))
        }
        Expr::Unop(op, operand) => infer_unop(env, *op, operand),
        Expr::Binop(lhs, op, rhs) => infer_binop(env, lhs, *op, rhs),
        Expr::Assign(name, rhs) => infer_assign(env, name, rhs),
        Expr::Call(callee, args) => infer_call(env, callee, args),
        Expr::List(elems) => infer_list(env, elems),
        Expr::Fdecl(fdecl) => infer_fdecl(env, "anon", fdecl, true),
        Expr::If(cond, then_branch, else_branch) => {
            infer_if(env, cond, then_branch, else_branch)
        }
    }
}

fn infer_unop(env: &mut Env, op: UnOp, operand: &Expr) -> Result<TExpr> {
    let te = infer_expr(env, operand)?;
    let want = match op {
        UnOp::Not => Type::Bool,
        UnOp::Neg => Type::Num,
    };
    let te = if te.ty == want {
        te
    } else if te.ty == Type::Unconst {
        constrain(env, te, &want)?
    } else {
        return Err(SemanticError::UnopType { op, operand: te.ty });
    };
    Ok(TExpr::new(TExprKind::Unop(op, Box::new(te)), want))
}

fn infer_binop(env: &mut Env, lhs: &Expr, op: BinOp, rhs: &Expr) -> Result<TExpr> {
    let tl = infer_expr(env, lhs)?;
    let tr = infer_expr(env, rhs)?;
    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod | BinOp::Pow => {
            let (tl, tr) = coerce_operands(env, op, tl, tr, &Type::Num)?;
            Ok(TExpr::new(
                TExprKind::Binop(Box::new(tl), op, Box::new(tr)),
                Type::Num,
            ))
        }
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            let (tl, tr) = coerce_operands(env, op, tl, tr, &Type::Num)?;
            Ok(TExpr::new(
                TExprKind::Binop(Box::new(tl), op, Box::new(tr)),
                Type::Bool,
            ))
        }
        // Equality is heterogeneous at this layer: any two operand types,
        // no constraining.
        BinOp::Eq | BinOp::Ne => Ok(TExpr::new(
            TExprKind::Binop(Box::new(tl), op, Box::new(tr)),
            Type::Bool,
        )),
        BinOp::And | BinOp::Or => {
            let (tl, tr) = coerce_operands(env, op, tl, tr, &Type::Bool)?;
            Ok(TExpr::new(
                TExprKind::Binop(Box::new(tl), op, Box::new(tr)),
                Type::Bool,
            ))
        }
    }
}

/// Demand that both operands have (or can be constrained to) `want`.
fn coerce_operands(
    env: &Env,
    op: BinOp,
    lhs: TExpr,
    rhs: TExpr,
    want: &Type,
) -> Result<(TExpr, TExpr)> {
    let admissible = |t: &Type| t == want || *t == Type::Unconst;
    if !admissible(&lhs.ty) || !admissible(&rhs.ty) {
        return Err(SemanticError::BinopType {
            op,
            lhs: lhs.ty,
            rhs: rhs.ty,
        });
    }
    let lhs = if lhs.ty == Type::Unconst {
        constrain(env, lhs, want)?
    } else {
        lhs
    };
    let rhs = if rhs.ty == Type::Unconst {
        constrain(env, rhs, want)?
    } else {
        rhs
    };
    Ok((lhs, rhs))
}

fn infer_assign(env: &mut Env, name: &str, rhs: &Expr) -> Result<TExpr> {
    // A function literal on the right-hand side is a declaration: it must
    // know its own name before its body is checked, for recursion.
    if let Expr::Fdecl(fdecl) = rhs {
        return infer_fdecl(env, name, fdecl, false);
    }
    let te = infer_expr(env, rhs)?;
    if te.ty == Type::Void {
        return Err(SemanticError::AssignToVoid {
            name: name.to_string(),
        });
    }
    let var = env.add_to_scope(name, te.ty.clone());
    let uname = var.borrow().uname.clone();
    let ty = te.ty.clone();
    Ok(TExpr::new(TExprKind::Assign(uname, Box::new(te)), ty))
}

fn infer_list(env: &mut Env, elems: &[Expr]) -> Result<TExpr> {
    let mut telems = Vec::with_capacity(elems.len());
    for elem in elems {
        telems.push(infer_expr(env, elem)?);
    }

    // The first concretely-typed element fixes the element type; every
    // other concrete element must agree with it.
    let mut elem_ty = Type::Unconst;
    for te in &telems {
        if te.ty == Type::Unconst {
            continue;
        }
        if elem_ty == Type::Unconst {
            elem_ty = te.ty.clone();
        } else if te.ty != elem_ty {
            return Err(SemanticError::ListElementType {
                expected: elem_ty,
                found: te.ty.clone(),
            });
        }
    }

    // Once the element type is known, unconstrained elements adopt it.
    if elem_ty != Type::Unconst {
        let mut constrained = Vec::with_capacity(telems.len());
        for te in telems {
            if te.ty == Type::Unconst {
                constrained.push(constrain(env, te, &elem_ty)?);
            } else {
                constrained.push(te);
            }
        }
        telems = constrained;
    }

    Ok(TExpr::new(TExprKind::List(telems), Type::list(elem_ty)))
}

fn infer_if(
    env: &mut Env,
    cond: &Expr,
    then_branch: &Expr,
    else_branch: &Expr,
) -> Result<TExpr> {
    let tcond = infer_expr(env, cond)?;
    let tcond = if tcond.ty == Type::Bool {
        tcond
    } else if tcond.ty == Type::Unconst {
        constrain(env, tcond, &Type::Bool)?
    } else {
        return Err(SemanticError::ExpectedBool { found: tcond.ty });
    };

    let tthen = infer_expr(env, then_branch)?;
    let telse = infer_expr(env, else_branch)?;

    let branch_ty = meet(&tthen.ty, &telse.ty).map_err(|_| SemanticError::IfBranchMismatch {
        then_ty: tthen.ty.clone(),
        else_ty: telse.ty.clone(),
    })?;
    if branch_ty == Type::Unconst {
        return Err(SemanticError::UnconstrainedIf);
    }

    let tthen = constrain(env, tthen, &branch_ty)?;
    let telse = constrain(env, telse, &branch_ty)?;

    Ok(TExpr::new(
        TExprKind::If {
            cond: Box::new(tcond),
            then_branch: Box::new(tthen),
            else_branch: Box::new(telse),
        },
        branch_ty,
    ))
}

// ── Calls ──────────────────────────────────────────────────────────────

fn infer_call(env: &mut Env, callee: &Expr, args: &[Expr]) -> Result<TExpr> {
    let mut tcallee = infer_expr(env, callee)?;

    // An unconstrained callee is committed to a function shape matching
    // the call site, with everything still to be inferred.
    let (formals, ret) = match tcallee.ty.clone() {
        Type::Func { params, ret } => (params, *ret),
        Type::Unconst => {
            let synth = Type::func(vec![Type::Unconst; args.len()], Type::Unconst);
            tcallee = constrain(env, tcallee, &synth)?;
            (vec![Type::Unconst; args.len()], Type::Unconst)
        }
        found => return Err(SemanticError::CallNonFunction { found }),
    };

    if args.len() != formals.len() {
        return Err(SemanticError::CallArityMismatch {
            expected: formals.len(),
            found: args.len(),
        });
    }

    // Arguments refine the formals and formals constrain the arguments,
    // position by position.
    let mut targs = Vec::with_capacity(args.len());
    let mut refined = Vec::with_capacity(formals.len());
    for (i, (arg, formal)) in args.iter().zip(&formals).enumerate() {
        let targ = infer_expr(env, arg)?;
        if targ.ty == *formal || *formal == Type::Any {
            refined.push(formal.clone());
            targs.push(targ);
            continue;
        }
        let narrowed = meet(&targ.ty, formal).map_err(|_| SemanticError::CallArgType {
            index: i,
            expected: formal.clone(),
            found: targ.ty.clone(),
        })?;
        let targ = if targ.ty != narrowed {
            constrain(env, targ, &narrowed)?
        } else {
            targ
        };
        refined.push(narrowed);
        targs.push(targ);
    }

    // Anything the arguments taught us about the formals flows back into
    // the callee's binding, and into the emitted callee node.
    let refined_ty = Type::func(refined.clone(), ret.clone());
    if refined != formals {
        match &tcallee.kind {
            TExprKind::Id(uname) => env.update_type(uname, refined_ty.clone())?,
            TExprKind::Fdecl(fdecl) => env.update_type(&fdecl.uname, refined_ty.clone())?,
            _ => {}
        }
    }
    tcallee.ty = refined_ty;

    Ok(TExpr::new(TExprKind::Call(Box::new(tcallee), targs), ret))
}

// ── Function declarations ──────────────────────────────────────────────

/// Check a function declaration bound to `name` (`"anon"` for anonymous
/// function literals).
///
/// The declaration is pre-registered with a fully unconstrained signature
/// so recursive calls in the body resolve, then the body and return
/// expression are checked twice around a reconciliation step that folds
/// call-site knowledge into the parameters and generalizes whatever was
/// never constrained.
fn infer_fdecl(env: &mut Env, name: &str, fdecl: &Fdecl, is_anon: bool) -> Result<TExpr> {
    // Redefining a function whose declaration is still being checked
    // would tear the pre-registered signature out from under it.
    if let Some(existing) = env.in_scope(name) {
        if let Type::Func { ret, .. } = &existing.borrow().ty {
            if **ret == Type::Unconst {
                return Err(SemanticError::FdeclReassign {
                    name: name.to_string(),
                });
            }
        }
    }

    let pre = Type::func(vec![Type::Unconst; fdecl.params.len()], Type::Unconst);
    let fvar = env.add_to_scope(name, pre);
    let uname = fvar.borrow().uname.clone();

    // The body environment shares binding cells with the outer one, so
    // constraints recorded inside the body survive it.
    let mut local = env.clone();
    let mut pvars = Vec::with_capacity(fdecl.params.len());
    for param in &fdecl.params {
        pvars.push(local.add_to_param(param));
    }
    let param_unames: Vec<String> = pvars.iter().map(|p| p.borrow().uname.clone()).collect();

    let body = infer_stmts(&mut local, &fdecl.body)?;

    // First pass over the return expression, run for the constraints it
    // pushes into the parameters and the pre-registered signature.
    infer_expr(&mut local, &fdecl.ret)?;

    // Reconcile each parameter with what recursive call sites recorded
    // against the signature; parameters nothing constrained become Any.
    let entry_params = {
        let entry = fvar.borrow();
        match &entry.ty {
            Type::Func { params, .. } => params.clone(),
            _ => unreachable!("pre-registered function binding must keep a function type"),
        }
    };
    for ((pvar, src), entry_param) in pvars.iter().zip(&fdecl.params).zip(&entry_params) {
        let current = pvar.borrow().ty.clone();
        let reconciled = meet(&current, entry_param).map_err(|_| {
            SemanticError::RecursiveTypeMismatch {
                name: name.to_string(),
                param: src.clone(),
            }
        })?;
        let reconciled = generalize(&reconciled);
        if reconciled != current {
            pvar.borrow_mut().ty = reconciled;
        }
    }

    // Second pass sees the reconciled parameter types.
    let tret = infer_expr(&mut local, &fdecl.ret)?;

    let ret_ty = tret.ty.clone();
    if ret_ty == Type::Any || ret_ty.contains_unconst() {
        return Err(SemanticError::UnconstrainedReturn {
            name: name.to_string(),
            found: ret_ty,
        });
    }

    let final_params: Vec<Type> = pvars.iter().map(|p| p.borrow().ty.clone()).collect();
    let final_ty = Type::func(final_params, ret_ty);

    // Publish: constraining the synthetic node writes the finished
    // signature into the pre-registered binding and types the result.
    let node = TExpr::new(
        TExprKind::Fdecl(TFdecl {
            uname,
            params: param_unames,
            body,
            ret: Box::new(tret),
            is_anon,
        }),
        Type::Unconst,
    );
    constrain(env, node, &final_ty)
}

// ── Constraining ───────────────────────────────────────────────────────

/// Constrain a typed expression to a requested type.
///
/// The node's current type must be `Unconst` or already equal to the
/// request. Structurally this is one level deep: identifiers and function
/// declarations have their binding retyped; a call of an identifier has
/// the callee's return slot retyped; every other form just takes the
/// requested type. Deeper propagation would break the equality operator's
/// heterogeneity.
fn constrain(env: &Env, te: TExpr, want: &Type) -> Result<TExpr> {
    if te.ty != Type::Unconst && te.ty != *want {
        return Err(SemanticError::ConstrainConflict {
            found: te.ty,
            requested: want.clone(),
        });
    }

    match &te.kind {
        TExprKind::Id(uname) => env.update_type(uname, want.clone())?,
        TExprKind::Fdecl(fdecl) => env.update_type(&fdecl.uname, want.clone())?,
        TExprKind::Call(callee, _) => {
            if let TExprKind::Id(uname) = &callee.kind {
                if let Some(var) = env.find_uname(uname) {
                    let current = var.borrow().ty.clone();
                    if let Type::Func { params, ret } = current {
                        if *ret != Type::Unconst && *ret != *want {
                            return Err(SemanticError::ConstrainConflict {
                                found: *ret,
                                requested: want.clone(),
                            });
                        }
                        env.update_type(
                            uname,
                            Type::Func {
                                params,
                                ret: Box::new(want.clone()),
                            },
                        )?;
                    }
                }
            }
        }
        _ => {}
    }

    Ok(TExpr::new(te.kind, want.clone()))
}
