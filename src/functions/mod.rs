pub mod collection;
pub mod pattern;

use crate::ast::{resolve_identifier, Callable, Node, Scope, Value};
use crate::error::Result;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::Arc;

lazy_static! {
    static ref BUILTINS: Arc<Registry> = Arc::new(Registry::builtin());
}

/// Shared, immutable registry holding the built-in functions.
pub fn builtins() -> Arc<Registry> {
    Arc::clone(&BUILTINS)
}

pub fn register_functions(registry: &mut Registry) {
    collection::register(registry);
    pattern::register(registry);
}

/// Named table of functions reachable from call expressions.
///
/// Kept apart from the caller's environment: a call never resolves against it.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    functions: HashMap<String, Value>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding `contains`, `matchString`, `findAllString`,
    /// `newSlice` and `isEmpty`.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        register_functions(&mut registry);
        registry
    }

    /// Registers a function, replacing any previous one with the same name.
    pub fn register_function<F>(&mut self, name: &str, function: F)
    where
        F: Fn(&[Node], &Scope<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.functions.insert(
            name.to_string(),
            Value::Function(Callable::new(name, Arc::new(function))),
        );
    }

    /// Resolves `name` with the same rules as an identifier.
    pub fn resolve(&self, name: &str) -> Value {
        resolve_identifier(name, &self.functions)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
