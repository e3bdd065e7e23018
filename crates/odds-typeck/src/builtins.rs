//! Built-in registration.
//!
//! Every Odds program starts from an environment carrying the language's
//! built-in names. They go through the ordinary minting path, so their
//! unique names occupy the first counter values of the run.

use crate::env::Env;
use crate::ty::Type;

/// Build the root environment.
///
/// After this call the environment contains:
/// - `EUL`, `PI` of type `Num`
/// - `print` of type `(Any) -> Void`
pub fn root_env() -> Env {
    let mut env = Env::new();
    env.add_to_scope("EUL", Type::Num);
    env.add_to_scope("PI", Type::Num);
    env.add_to_scope("print", Type::func(vec![Type::Any], Type::Void));
    env
}
