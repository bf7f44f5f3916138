use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::value::Value;

/// Shared mutable handle to a [`SymbolTable`]. Closures keep their defining
/// table alive through this.
pub type SharedSymbolTable = Rc<RefCell<SymbolTable>>;

/// Name→value mapping with parent-chain lookup implementing lexical scope.
/// Assignment always writes to the local table, never to a parent.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Value>,
    parent: Option<SharedSymbolTable>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(parent: SharedSymbolTable) -> Self {
        Self {
            symbols: HashMap::new(),
            parent: Some(parent),
        }
    }

    pub fn shared(self) -> SharedSymbolTable {
        Rc::new(RefCell::new(self))
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.symbols.get(name) {
            return Some(value.clone());
        }
        self.parent
            .as_ref()
            .and_then(|parent| parent.borrow().get(name))
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.symbols.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) {
        self.symbols.remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_parents() {
        let parent = SymbolTable::new().shared();
        parent.borrow_mut().set("x", Value::int(10));

        let child = SymbolTable::with_parent(Rc::clone(&parent));
        assert!(matches!(child.get("x"), Some(_)));
        assert!(child.get("y").is_none());
    }

    #[test]
    fn test_set_shadows_locally() {
        let parent = SymbolTable::new().shared();
        parent.borrow_mut().set("x", Value::int(10));

        let child = SymbolTable::with_parent(Rc::clone(&parent)).shared();
        child.borrow_mut().set("x", Value::int(20));

        let shadowed = child.borrow().get("x").map(|v| v.to_string());
        assert_eq!(shadowed.as_deref(), Some("20"));
        let outer = parent.borrow().get("x").map(|v| v.to_string());
        assert_eq!(outer.as_deref(), Some("10"));
    }

    #[test]
    fn test_parent_mutation_is_visible_through_child() {
        let parent = SymbolTable::new().shared();
        let child = SymbolTable::with_parent(Rc::clone(&parent));

        parent.borrow_mut().set("x", Value::int(42));
        let seen = child.get("x").map(|v| v.to_string());
        assert_eq!(seen.as_deref(), Some("42"));
    }
}
