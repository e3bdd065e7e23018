//! Typed, alpha-renamed AST.
//!
//! The analyzer's output mirrors the source AST, with two differences:
//! every expression node carries its resolved type, and every identifier
//! has been replaced by its globally unique minted name. This is the tree
//! the pretty-printer consumes.

use odds_ast::{BinOp, Number, UnOp};
use serde::Serialize;

use crate::ty::Type;

/// A typed expression: a kind/type pair.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TExpr {
    pub kind: TExprKind,
    pub ty: Type,
}

impl TExpr {
    pub fn new(kind: TExprKind, ty: Type) -> Self {
        TExpr { kind, ty }
    }
}

/// The expression forms of the typed tree.
///
/// Identifier-carrying variants (`Id`, `Assign`, `Fdecl`) hold unique
/// names of the form `<source>_<counter>`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum TExprKind {
    Num(Number),
    Str(String),
    Bool(bool),
    Void,
    Id(String),
    Unop(UnOp, Box<TExpr>),
    Binop(Box<TExpr>, BinOp, Box<TExpr>),
    Assign(String, Box<TExpr>),
    Call(Box<TExpr>, Vec<TExpr>),
    List(Vec<TExpr>),
    Fdecl(TFdecl),
    If {
        cond: Box<TExpr>,
        then_branch: Box<TExpr>,
        else_branch: Box<TExpr>,
    },
}

/// A checked function declaration.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TFdecl {
    /// The function's own minted name (`anon_<n>` for anonymous functions).
    pub uname: String,
    /// Minted parameter names, in declaration order.
    pub params: Vec<String>,
    pub body: Vec<TStmt>,
    pub ret: Box<TExpr>,
    pub is_anon: bool,
}

/// A typed statement.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum TStmt {
    Do(TExpr),
}
