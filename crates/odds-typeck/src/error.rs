//! Semantic error taxonomy.
//!
//! A single error type covers every condition the analyzer can reject a
//! program for. Analysis aborts on the first error; nothing is recovered
//! or accumulated, so each variant carries just enough context to render
//! one diagnostic line.

use std::fmt;

use odds_ast::{BinOp, UnOp};

use crate::ty::Type;

/// Result alias threaded through the whole analyzer.
pub type Result<T> = std::result::Result<T, SemanticError>;

/// A semantic error encountered during analysis.
#[derive(Clone, Debug, PartialEq)]
pub enum SemanticError {
    /// An identifier unknown in both the scope and parameter maps.
    UndefinedVariable { name: String },
    /// A unary operator applied to an operand of the wrong type.
    UnopType { op: UnOp, operand: Type },
    /// A binary operator applied to operands of the wrong types.
    BinopType { op: BinOp, lhs: Type, rhs: Type },
    /// A non-boolean `if` condition.
    ExpectedBool { found: Type },
    /// An attempt to bind a void-typed expression.
    AssignToVoid { name: String },
    /// A list literal with inhomogeneous elements.
    ListElementType { expected: Type, found: Type },
    /// A call whose callee is not a function.
    CallNonFunction { found: Type },
    /// A call with the wrong number of arguments.
    CallArityMismatch { expected: usize, found: usize },
    /// A call argument incompatible with the formal parameter.
    CallArgType {
        index: usize,
        expected: Type,
        found: Type,
    },
    /// A parameter type inferred from the body conflicts with what the
    /// function's recursive call sites recorded.
    RecursiveTypeMismatch { name: String, param: String },
    /// A function whose return type was never concretely constrained.
    UnconstrainedReturn { name: String, found: Type },
    /// A function identifier redefined while its declaration is still
    /// being analyzed.
    FdeclReassign { name: String },
    /// A requested constraint contradicts an already-concrete type.
    ConstrainConflict { found: Type, requested: Type },
    /// Two types with no common constrained form.
    ConstraintConflict { left: Type, right: Type },
    /// An `if` whose branches are both unconstrained.
    UnconstrainedIf,
    /// An `if` whose branches have incompatible concrete types.
    IfBranchMismatch { then_ty: Type, else_ty: Type },
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticError::UndefinedVariable { name } => {
                write!(f, "undefined variable `{}`", name)
            }
            SemanticError::UnopType { op, operand } => {
                write!(f, "unary `{}` cannot be applied to `{}`", op, operand)
            }
            SemanticError::BinopType { op, lhs, rhs } => {
                write!(
                    f,
                    "`{}` cannot be applied to `{}` and `{}`",
                    op, lhs, rhs
                )
            }
            SemanticError::ExpectedBool { found } => {
                write!(f, "if condition must be `Bool`, found `{}`", found)
            }
            SemanticError::AssignToVoid { name } => {
                write!(f, "cannot bind `{}` to a `Void` expression", name)
            }
            SemanticError::ListElementType { expected, found } => {
                write!(
                    f,
                    "list elements must all be `{}`, found `{}`",
                    expected, found
                )
            }
            SemanticError::CallNonFunction { found } => {
                write!(f, "`{}` is not a function", found)
            }
            SemanticError::CallArityMismatch { expected, found } => {
                write!(
                    f,
                    "arity mismatch: expected {} arguments, found {}",
                    expected, found
                )
            }
            SemanticError::CallArgType {
                index,
                expected,
                found,
            } => {
                write!(
                    f,
                    "argument {}: expected `{}`, found `{}`",
                    index + 1,
                    expected,
                    found
                )
            }
            SemanticError::RecursiveTypeMismatch { name, param } => {
                write!(
                    f,
                    "parameter `{}` of `{}` is used at a type that conflicts with its recursive calls",
                    param, name
                )
            }
            SemanticError::UnconstrainedReturn { name, found } => {
                write!(
                    f,
                    "return type of `{}` was never constrained (inferred `{}`)",
                    name, found
                )
            }
            SemanticError::FdeclReassign { name } => {
                write!(
                    f,
                    "function `{}` is redefined while its declaration is still being checked",
                    name
                )
            }
            SemanticError::ConstrainConflict { found, requested } => {
                write!(
                    f,
                    "cannot constrain `{}` to `{}`",
                    found, requested
                )
            }
            SemanticError::ConstraintConflict { left, right } => {
                write!(f, "incompatible types `{}` and `{}`", left, right)
            }
            SemanticError::UnconstrainedIf => {
                write!(f, "neither branch of this `if` has a known type")
            }
            SemanticError::IfBranchMismatch { then_ty, else_ty } => {
                write!(
                    f,
                    "if branches disagree: `{}` vs `{}`",
                    then_ty, else_ty
                )
            }
        }
    }
}

impl std::error::Error for SemanticError {}
