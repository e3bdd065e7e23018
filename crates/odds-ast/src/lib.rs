//! Source AST for the Odds language.
//!
//! This is the tree the parser hands to the semantic analyzer: plain owned
//! nodes, no type information, identifiers still carrying their source
//! spellings. The analyzer resolves and alpha-renames them into its own
//! typed tree (`odds-typeck`).

use std::fmt;

use serde::Serialize;

/// A numeric literal. Odds has a single `Num` type at the semantic level,
/// but the written form (integer vs. float) is preserved for the printer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{}", n),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

/// A unary operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum UnOp {
    /// Logical negation: `!e`.
    Not,
    /// Arithmetic negation: `-e`.
    Neg,
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnOp::Not => write!(f, "!"),
            UnOp::Neg => write!(f, "-"),
        }
    }
}

/// A binary operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sym = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        };
        write!(f, "{}", sym)
    }
}

/// An Odds expression as parsed.
///
/// Identifiers are source spellings; binding forms (`Assign`, `Fdecl`
/// parameters) introduce them. The analyzer is responsible for scope
/// resolution, so the parser performs none.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Expr {
    Num(Number),
    Str(String),
    Bool(bool),
    Void,
    /// A reference to a previously bound identifier.
    Id(String),
    Unop(UnOp, Box<Expr>),
    Binop(Box<Expr>, BinOp, Box<Expr>),
    /// `id = expr` -- binds `id` in the enclosing scope.
    Assign(String, Box<Expr>),
    Call(Box<Expr>, Vec<Expr>),
    List(Vec<Expr>),
    /// A function literal. Named when it is the right-hand side of an
    /// assignment, anonymous otherwise.
    Fdecl(Fdecl),
    If(Box<Expr>, Box<Expr>, Box<Expr>),
}

/// A function literal: `(params) -> body... return ret`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Fdecl {
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
    pub ret: Box<Expr>,
}

/// A statement. Odds has exactly one form: evaluate an expression for
/// effect.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Stmt {
    Do(Expr),
}

/// A program is an ordered sequence of statements.
pub type Program = Vec<Stmt>;

impl Expr {
    /// An integer literal.
    pub fn int(n: i64) -> Expr {
        Expr::Num(Number::Int(n))
    }

    /// A float literal.
    pub fn float(x: f64) -> Expr {
        Expr::Num(Number::Float(x))
    }

    /// A string literal.
    pub fn string(s: impl Into<String>) -> Expr {
        Expr::Str(s.into())
    }

    /// A boolean literal.
    pub fn bool(b: bool) -> Expr {
        Expr::Bool(b)
    }

    /// An identifier reference.
    pub fn id(name: impl Into<String>) -> Expr {
        Expr::Id(name.into())
    }

    /// `name = rhs`.
    pub fn assign(name: impl Into<String>, rhs: Expr) -> Expr {
        Expr::Assign(name.into(), Box::new(rhs))
    }

    /// `op e`.
    pub fn unop(op: UnOp, e: Expr) -> Expr {
        Expr::Unop(op, Box::new(e))
    }

    /// `lhs op rhs`.
    pub fn binop(lhs: Expr, op: BinOp, rhs: Expr) -> Expr {
        Expr::Binop(Box::new(lhs), op, Box::new(rhs))
    }

    /// `callee(args...)`.
    pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
        Expr::Call(Box::new(callee), args)
    }

    /// `if cond then then_branch else else_branch`.
    pub fn if_(cond: Expr, then_branch: Expr, else_branch: Expr) -> Expr {
        Expr::If(Box::new(cond), Box::new(then_branch), Box::new(else_branch))
    }

    /// A function literal.
    pub fn fdecl(params: Vec<&str>, body: Vec<Stmt>, ret: Expr) -> Expr {
        Expr::Fdecl(Fdecl {
            params: params.into_iter().map(String::from).collect(),
            body,
            ret: Box::new(ret),
        })
    }
}
