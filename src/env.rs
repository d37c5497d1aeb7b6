use std::collections::HashMap;

use crate::lexer::Token;
use crate::value::{DataType, Variable};

/// A user-declared function: return type, parameter names in declaration
/// order, and the body tokens captured verbatim. The body is stored but never
/// interpreted; calling the function only produces a diagnostic.
#[derive(Debug, Clone)]
pub struct FunctionEntry {
    pub return_type: DataType,
    pub params: Vec<String>,
    pub body: Vec<Token>,
}

/// The program's single flat namespace. Nested blocks share it: later writes
/// overwrite earlier ones and there is no shadowing.
#[derive(Debug, Default)]
pub struct Env {
    vars: HashMap<String, Variable>,
    funcs: HashMap<String, FunctionEntry>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_var(&self, name: &str) -> Option<&Variable> {
        self.vars.get(name)
    }

    pub fn set_var(&mut self, name: String, value: Variable) {
        self.vars.insert(name, value);
    }

    pub fn define_func(&mut self, name: String, func: FunctionEntry) {
        self.funcs.insert(name, func);
    }

    pub fn get_func(&self, name: &str) -> Option<&FunctionEntry> {
        self.funcs.get(name)
    }

    pub fn has_func(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_writes_overwrite() {
        let mut env = Env::new();
        env.set_var("x".to_string(), Variable::new(DataType::Int, "5"));
        env.set_var("x".to_string(), Variable::new(DataType::Int, "7"));
        assert_eq!(env.get_var("x").unwrap().value, "7");
    }

    #[test]
    fn unbound_lookup_is_none() {
        let env = Env::new();
        assert!(env.get_var("missing").is_none());
        assert!(!env.has_func("missing"));
    }
}
