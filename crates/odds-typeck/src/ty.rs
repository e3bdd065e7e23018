//! Type representation for the Odds type system.
//!
//! Defines the core `Type` enum together with the two operations the
//! checker constrains with: `meet`, which computes the most-constrained
//! type compatible with two inputs, and `generalize`, which closes an
//! inferred type over its remaining `Unconst` placeholders.

use std::fmt;

use serde::Serialize;

use crate::error::{Result, SemanticError};

/// An Odds type.
///
/// `Unconst` is the inference placeholder: a position whose type has not
/// been determined yet. It only exists while the checker runs; a fully
/// analyzed program never exposes it. `Any` is the top type, accepted in
/// place of any type at a call site -- built-ins such as `print` use it,
/// and unconstrained user parameters generalize to it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Type {
    /// All numeric values, integer or floating.
    Num,
    String,
    Bool,
    Void,
    /// A homogeneous list.
    List(Box<Type>),
    /// A first-class function type: `(param_types) -> return_type`.
    Func { params: Vec<Type>, ret: Box<Type> },
    /// The top type.
    Any,
    /// Not yet constrained. Transient.
    Unconst,
}

impl Type {
    /// Create a function type.
    pub fn func(params: Vec<Type>, ret: Type) -> Type {
        Type::Func {
            params,
            ret: Box::new(ret),
        }
    }

    /// Create a list type.
    pub fn list(elem: Type) -> Type {
        Type::List(Box::new(elem))
    }

    /// Whether `Unconst` occurs anywhere within this type.
    pub fn contains_unconst(&self) -> bool {
        match self {
            Type::Unconst => true,
            Type::List(elem) => elem.contains_unconst(),
            Type::Func { params, ret } => {
                params.iter().any(Type::contains_unconst) || ret.contains_unconst()
            }
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Num => write!(f, "Num"),
            Type::String => write!(f, "String"),
            Type::Bool => write!(f, "Bool"),
            Type::Void => write!(f, "Void"),
            Type::List(elem) => write!(f, "[{}]", elem),
            Type::Func { params, ret } => {
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ") -> {}", ret)
            }
            Type::Any => write!(f, "Any"),
            Type::Unconst => write!(f, "?"),
        }
    }
}

/// Compute the most-constrained type compatible with both inputs.
///
/// `Unconst` is the identity; function types meet element-wise on their
/// parameters (the lists must have equal length) and on their returns;
/// any other pair must already be equal.
pub fn meet(t1: &Type, t2: &Type) -> Result<Type> {
    match (t1, t2) {
        (Type::Unconst, t) | (t, Type::Unconst) => Ok(t.clone()),
        (
            Type::Func {
                params: p1,
                ret: r1,
            },
            Type::Func {
                params: p2,
                ret: r2,
            },
        ) => {
            if p1.len() != p2.len() {
                return Err(SemanticError::ConstraintConflict {
                    left: t1.clone(),
                    right: t2.clone(),
                });
            }
            let params = p1
                .iter()
                .zip(p2)
                .map(|(a, b)| meet(a, b))
                .collect::<Result<Vec<_>>>()?;
            Ok(Type::Func {
                params,
                ret: Box::new(meet(r1, r2)?),
            })
        }
        _ if t1 == t2 => Ok(t1.clone()),
        _ => Err(SemanticError::ConstraintConflict {
            left: t1.clone(),
            right: t2.clone(),
        }),
    }
}

/// Replace every `Unconst` inside a type with `Any`.
///
/// Used when closing over a function declaration's formal parameters: a
/// parameter the body never constrained accepts anything.
pub fn generalize(ty: &Type) -> Type {
    match ty {
        Type::Unconst => Type::Any,
        Type::List(elem) => Type::list(generalize(elem)),
        Type::Func { params, ret } => Type::Func {
            params: params.iter().map(generalize).collect(),
            ret: Box::new(generalize(ret)),
        },
        other => other.clone(),
    }
}
