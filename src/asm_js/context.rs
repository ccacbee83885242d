use std::collections::{HashMap, HashSet};

use crate::{
    errors::errors::{Error, ErrorImpl},
    types::types::{Binding, BindingId, Type},
};

use super::{
    estree::{self, VariableDeclarator},
    types::AsmType,
};

/// A JavaScript identifier standing for a C binding or a temporary.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub ty: AsmType,
    /// The C type the value is meant to have; `int` is treated as signed.
    pub intended_type: Type,
}

fn unique_name(suggested: &str, is_used: impl Fn(&str) -> bool) -> String {
    let mut candidate = String::from(suggested);
    let mut suffix = 0;
    while is_used(&candidate) {
        candidate = format!("{}_{}", suggested, suffix);
        suffix += 1;
    }
    candidate
}

/// Names visible to the whole module: the functions.
#[derive(Debug, Default)]
pub struct ModuleContext {
    names: HashSet<String>,
    functions: HashMap<BindingId, Variable>,
}

impl ModuleContext {
    pub fn new() -> Self {
        ModuleContext::default()
    }

    pub fn name_is_used(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn declare_function(&mut self, binding: &Binding) -> Variable {
        let name = unique_name(&binding.name, |name| self.name_is_used(name));
        let variable = Variable {
            name: name.clone(),
            ty: AsmType::Extern,
            intended_type: binding.ty.clone(),
        };
        self.names.insert(name);
        self.functions.insert(binding.id, variable.clone());
        variable
    }

    pub fn get_function(&self, id: BindingId) -> Option<&Variable> {
        self.functions.get(&id)
    }
}

/// Names of one function: parameters, locals and temporaries. Every local is
/// hoisted into the single `var` statement collected in `declarations`.
#[derive(Debug)]
pub struct FunctionContext<'a> {
    pub module: &'a ModuleContext,
    pub return_type: Type,
    pub declarations: Vec<VariableDeclarator>,
    names: HashSet<String>,
    variables: HashMap<BindingId, Variable>,
}

impl<'a> FunctionContext<'a> {
    pub fn new(module: &'a ModuleContext, return_type: Type) -> Self {
        FunctionContext {
            module,
            return_type,
            declarations: vec![],
            names: HashSet::new(),
            variables: HashMap::new(),
        }
    }

    pub fn name_is_used(&self, name: &str) -> bool {
        self.names.contains(name) || self.module.name_is_used(name)
    }

    /// Registers a fresh identifier. `id` is `None` for temporaries that have
    /// no C counterpart.
    pub fn allocate_variable(
        &mut self,
        suggested_name: &str,
        ty: AsmType,
        intended_type: Type,
        id: Option<BindingId>,
    ) -> Variable {
        let name = unique_name(suggested_name, |name| self.name_is_used(name));
        let variable = Variable {
            name: name.clone(),
            ty,
            intended_type,
        };
        self.names.insert(name);
        if let Some(id) = id {
            self.variables.insert(id, variable.clone());
        }
        variable
    }

    /// Allocates a local and hoists it with the given literal initial value.
    pub fn declare_local(
        &mut self,
        suggested_name: &str,
        id: Option<BindingId>,
        intended_type: Type,
        initial_value: i64,
    ) -> Result<Variable, Error> {
        let ty = match intended_type {
            Type::Int => AsmType::Int,
            _ => {
                return Err(Error::new(
                    ErrorImpl::UnsupportedFeature {
                        feature: format!("local variables of type `{}`", intended_type),
                    },
                    String::from(suggested_name),
                ))
            }
        };

        let variable = self.allocate_variable(suggested_name, ty, intended_type, id);
        self.declarations.push(VariableDeclarator {
            id: estree::identifier(&variable.name),
            init: Some(estree::integer_literal(initial_value)),
        });
        Ok(variable)
    }

    /// Looks up a local, parameter or function by binding id.
    pub fn get(&self, id: BindingId) -> Option<&Variable> {
        self.variables
            .get(&id)
            .or_else(|| self.module.get_function(id))
    }
}
