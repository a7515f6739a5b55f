//! Symbol tables owned by a single compilation.
//!
//! Mirrors the teacher's "no global mutable state" rule (see
//! `ModuleTree`/`ProgramGraph`): a [`SymbolTables`] is an instance the
//! compiler creates per compilation, mutates only during inference, reads
//! only during emission, and discards afterwards. Two compilations never
//! share one, so they can run independently (and, in principle, in
//! parallel).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::NumType;

/// Per-function symbol data: parameters (order preserved) and locals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionScope {
    /// Declaration-order-preserved name -> type.
    pub params: IndexMap<String, NumType>,
    pub locals: IndexMap<String, NumType>,
}

/// The four symbol tables named by the data model: module-scope globals,
/// per-function params, per-function locals, and per-function return types.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolTables {
    pub globals: IndexMap<String, NumType>,
    pub functions: IndexMap<String, FunctionScope>,
    pub returns: IndexMap<String, NumType>,
}

impl SymbolTables {
    pub fn new() -> Self {
        SymbolTables::default()
    }

    /// Name lookup order: params -> locals -> globals -> default `INT`.
    /// `current_function` is `None` at module (top-level) scope.
    pub fn lookup(&self, current_function: Option<&str>, name: &str) -> NumType {
        if let Some(func) = current_function {
            if let Some(scope) = self.functions.get(func) {
                if let Some(ty) = scope.params.get(name) {
                    return *ty;
                }
                if let Some(ty) = scope.locals.get(name) {
                    return *ty;
                }
            }
        }
        self.globals.get(name).copied().unwrap_or_default()
    }

    /// Sets a name's type within the given scope (or at module scope when
    /// `current_function` is `None`). A name that is already a parameter of
    /// the current function is the same variable as that parameter -- it
    /// updates the parameter's entry directly rather than creating a
    /// shadowing local the lookup order would never see, since source-level
    /// reassignment of a parameter is not a new declaration. Any other name
    /// lands in (or updates) the function's locals.
    pub fn set(&mut self, current_function: Option<&str>, name: &str, ty: NumType) {
        match current_function {
            Some(func) => {
                let scope = self.functions.entry(func.to_string()).or_default();
                if scope.params.contains_key(name) {
                    scope.params.insert(name.to_string(), ty);
                } else {
                    scope.locals.insert(name.to_string(), ty);
                }
            }
            None => {
                self.globals.insert(name.to_string(), ty);
            }
        }
    }

    /// Opens a fresh scope for `function`, seeding its params table. Returns
    /// the function's name for symmetry with callers that restore the
    /// caller's scope afterward -- the table itself doesn't need restoring
    /// since each function's params/locals live under its own key.
    pub fn declare_function(&mut self, function: &str, params: IndexMap<String, NumType>) {
        self.functions.insert(
            function.to_string(),
            FunctionScope { params, locals: IndexMap::new() },
        );
    }

    pub fn return_type(&self, function: &str) -> NumType {
        self.returns.get(function).copied().unwrap_or_default()
    }

    pub fn set_return_type(&mut self, function: &str, ty: NumType) {
        self.returns.insert(function.to_string(), ty);
    }

    pub fn param_type(&self, function: &str, param: &str) -> NumType {
        self.functions
            .get(function)
            .and_then(|scope| scope.params.get(param))
            .copied()
            .unwrap_or_default()
    }

    pub fn set_param_type(&mut self, function: &str, param: &str, ty: NumType) {
        if let Some(scope) = self.functions.get_mut(function) {
            scope.params.insert(param.to_string(), ty);
        }
    }

    pub fn params_in_order(&self, function: &str) -> Vec<(String, NumType)> {
        self.functions
            .get(function)
            .map(|scope| scope.params.iter().map(|(n, t)| (n.clone(), *t)).collect())
            .unwrap_or_default()
    }

    pub fn is_known_function(&self, name: &str) -> bool {
        self.returns.contains_key(name)
    }
}
