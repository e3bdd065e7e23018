//! Odds semantic analyzer: scope resolution and bidirectional type
//! inference over the parsed AST.
//!
//! The analyzer consumes the parser's untyped tree (`odds-ast`) and emits
//! a typed, alpha-renamed tree in which every expression carries a
//! resolved type and every identifier has a globally unique name. Type
//! information flows both ways: operators and call sites constrain their
//! operands, and inferred sub-expression types refine the bindings they
//! came from. Function declarations pre-register their own name before
//! the body is checked, so direct recursion resolves without a fixpoint
//! pass.
//!
//! Analysis aborts on the first semantic error; there is no recovery.
//!
//! # Architecture
//!
//! - [`ty`]: type representation (`Type`), the `meet` constraint
//!   operation, and `generalize`
//! - [`env`]: two-scope environment with unique-name minting
//! - [`builtins`]: root environment registration
//! - [`error`]: the semantic error taxonomy
//! - [`tast`]: the typed output AST
//! - [`infer`]: the checker itself

pub mod builtins;
pub mod env;
pub mod error;
pub mod infer;
pub mod tast;
pub mod ty;

pub use crate::error::{Result, SemanticError};
pub use crate::tast::{TExpr, TExprKind, TFdecl, TStmt};
pub use crate::ty::Type;

/// Analyze a parsed Odds program.
///
/// This is the main entry point. Returns the typed statement list, or
/// the first semantic error encountered.
pub fn analyze(program: &[odds_ast::Stmt]) -> Result<Vec<TStmt>> {
    infer::analyze(program)
}
