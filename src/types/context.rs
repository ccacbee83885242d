use std::collections::HashMap;

use crate::errors::errors::{unsupported, Error, ErrorImpl};

use super::types::{Binding, BindingId, Type};

pub type ScopeId = usize;

pub const ROOT_SCOPE: ScopeId = 0;

/// Binding ids and heap addresses handed out during one compilation.
#[derive(Debug, Default)]
pub struct Allocator {
    next_id: BindingId,
    next_heap_address: u32,
}

impl Allocator {
    pub fn new() -> Self {
        Allocator::default()
    }

    pub fn next_id(&mut self) -> BindingId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Bump allocation: returns the current offset and advances past `size`
    /// bytes, or `None` if the end of the block would not fit in a `u32`.
    pub fn allocate(&mut self, size: u32) -> Option<u32> {
        let address = self.next_heap_address;
        self.next_heap_address = address.checked_add(size)?;
        Some(address)
    }

    pub fn heap_size(&self) -> u32 {
        self.next_heap_address
    }
}

#[derive(Debug)]
pub struct Environment {
    pub parent: Option<ScopeId>,
    pub variable_lookup: HashMap<String, Binding>,
    pub return_type: Option<Type>,
}

impl Environment {
    pub fn new(parent: Option<ScopeId>, return_type: Option<Type>) -> Self {
        Environment {
            parent,
            variable_lookup: HashMap::new(),
            return_type,
        }
    }

    pub fn get_variable(&self, name: &str) -> Option<&Binding> {
        self.variable_lookup.get(name)
    }
}

/// The scope tree of one compilation, stored as an arena. Scope 0 is the root.
#[derive(Debug)]
pub struct Context {
    pub environments: Vec<Environment>,
    pub allocator: Allocator,
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Context {
            environments: vec![Environment::new(None, None)],
            allocator: Allocator::new(),
        }
    }

    pub fn root(&self) -> ScopeId {
        ROOT_SCOPE
    }

    /// Defines `name` in `scope`, shadowing any outer binding. A second
    /// definition in the same scope replaces the first.
    pub fn define(&mut self, scope: ScopeId, name: &str, ty: Type) -> Binding {
        let binding = Binding {
            name: String::from(name),
            ty,
            id: self.allocator.next_id(),
            is_global: scope == ROOT_SCOPE,
        };
        self.environments[scope]
            .variable_lookup
            .insert(String::from(name), binding.clone());
        binding
    }

    pub fn get(&self, scope: ScopeId, name: &str) -> Option<&Binding> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let environment = &self.environments[id];
            if let Some(binding) = environment.get_variable(name) {
                return Some(binding);
            }
            current = environment.parent;
        }
        None
    }

    pub fn create_child_context(&mut self, parent: ScopeId) -> ScopeId {
        let return_type = self.environments[parent].return_type.clone();
        self.environments
            .push(Environment::new(Some(parent), return_type));
        self.environments.len() - 1
    }

    pub fn create_function_context(&mut self, parent: ScopeId, return_type: Type) -> ScopeId {
        self.environments
            .push(Environment::new(Some(parent), Some(return_type)));
        self.environments.len() - 1
    }

    pub fn return_type(&self, scope: ScopeId) -> Option<&Type> {
        self.environments[scope].return_type.as_ref()
    }

    pub fn allocate_from_heap(&mut self, scope: ScopeId, size: u32) -> Result<u32, Error> {
        if scope != ROOT_SCOPE {
            return Err(Error::new(
                ErrorImpl::InvalidAllocationContext,
                format!("scope {}", scope),
            ));
        }
        self.allocator.allocate(size).ok_or_else(|| {
            unsupported(
                "arrays larger than the heap",
                format!("allocation of {} bytes", size),
            )
        })
    }
}
