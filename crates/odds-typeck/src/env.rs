//! Scope environment and unique-name minting.
//!
//! The environment keeps two disjoint maps keyed by source identifier:
//! `scope` holds ordinary bindings (outer variables, declared functions,
//! built-ins) and `params` holds the formal parameters of the function
//! body currently being analyzed. Parameters start unconstrained and are
//! refined from their uses, so they are looked up and mutated separately;
//! introducing a parameter shadows any scope binding of the same name.
//!
//! Bindings are shared cells: cloning an environment (entering a function
//! body) clones the maps but not the `Var`s, so a constraint recorded deep
//! inside the body is visible to the enclosing scope after the body
//! environment is gone.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::error::{Result, SemanticError};
use crate::ty::Type;

/// A resolved binding: the alpha-renamed identifier plus its current type.
///
/// The type is refined in place as constraints are discovered; every
/// environment that can reach the binding observes the refinement.
#[derive(Clone, Debug)]
pub struct Var {
    pub uname: String,
    pub ty: Type,
}

/// Shared handle to a binding.
pub type VarRef = Rc<RefCell<Var>>;

/// The two-scope environment threaded through the analyzer.
#[derive(Clone, Debug)]
pub struct Env {
    scope: FxHashMap<String, VarRef>,
    params: FxHashMap<String, VarRef>,
    /// Unique-name counter, shared by every clone so minting stays
    /// strictly monotonic across the whole run.
    counter: Rc<Cell<u64>>,
}

impl Env {
    /// Create an empty environment with a fresh name counter.
    pub fn new() -> Self {
        Env {
            scope: FxHashMap::default(),
            params: FxHashMap::default(),
            counter: Rc::new(Cell::new(0)),
        }
    }

    /// Mint a fresh unique name for a source identifier.
    fn mint(&self, name: &str) -> String {
        let n = self.counter.get();
        self.counter.set(n + 1);
        format!("{}_{}", name, n)
    }

    /// Recover the source identifier from an alpha-renamed one: the prefix
    /// before the final `_`.
    pub fn base_name(uname: &str) -> &str {
        uname.rsplit_once('_').map_or(uname, |(base, _)| base)
    }

    /// Look up a source identifier, searching `scope` then `params`.
    pub fn lookup(&self, id: &str) -> Result<VarRef> {
        self.scope
            .get(id)
            .or_else(|| self.params.get(id))
            .cloned()
            .ok_or_else(|| SemanticError::UndefinedVariable {
                name: id.to_string(),
            })
    }

    /// The scope binding of `id`, if any. Does not consult `params`.
    pub fn in_scope(&self, id: &str) -> Option<VarRef> {
        self.scope.get(id).cloned()
    }

    /// Bind `id` in `scope` at the given type, minting a fresh unique
    /// name. Any prior scope binding of `id` is shadowed.
    pub fn add_to_scope(&mut self, id: &str, ty: Type) -> VarRef {
        let var = Rc::new(RefCell::new(Var {
            uname: self.mint(id),
            ty,
        }));
        self.scope.insert(id.to_string(), Rc::clone(&var));
        var
    }

    /// Bind `id` as an unconstrained formal parameter, removing any scope
    /// binding of the same name.
    pub fn add_to_param(&mut self, id: &str) -> VarRef {
        let var = Rc::new(RefCell::new(Var {
            uname: self.mint(id),
            ty: Type::Unconst,
        }));
        self.scope.remove(id);
        self.params.insert(id.to_string(), Rc::clone(&var));
        var
    }

    /// Find the binding a unique name refers to, if its source name is
    /// still bound to that exact binding.
    pub fn find_uname(&self, uname: &str) -> Option<VarRef> {
        let base = Self::base_name(uname);
        [self.scope.get(base), self.params.get(base)]
            .into_iter()
            .flatten()
            .find(|var| var.borrow().uname == uname)
            .cloned()
    }

    /// Replace the stored type of the binding `uname` refers to.
    pub fn update_type(&self, uname: &str, ty: Type) -> Result<()> {
        let var = self
            .find_uname(uname)
            .ok_or_else(|| SemanticError::UndefinedVariable {
                name: uname.to_string(),
            })?;
        var.borrow_mut().ty = ty;
        Ok(())
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
