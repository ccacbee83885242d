use crate::{
    abstractor::semantic::{
        Constant, Expression, FunctionDefinition, Module, Statement, VariableDeclaration,
    },
    errors::errors::{unsupported, Error, ErrorImpl},
    types::types::Type,
};

use super::{
    context::{FunctionContext, ModuleContext, Variable},
    estree::{self, Program},
    expressions::{assignment_expression, coerce, compile_expression, wrap_function_call},
    types::AsmType,
};

pub const ASM_DIRECTIVE: &str = "use asm";
pub const MODULE_NAME: &str = "Module";

/// An initializer that runs where its declaration stood, so a declaration
/// inside a loop body re-initializes its local on every iteration.
#[derive(Debug)]
pub struct DeferredInitializer<'e> {
    pub variable: Variable,
    pub initializer: &'e Expression,
}

/// First phase of declaration lowering: hoists every declarator into the
/// function's `var` statement and returns the initializers to run in place.
/// A literal initializer also becomes the hoisted initial value, otherwise
/// the local starts at zero.
pub fn hoist_declarations<'e>(
    context: &mut FunctionContext,
    declarations: &'e [VariableDeclaration],
) -> Result<Vec<DeferredInitializer<'e>>, Error> {
    let mut deferred = vec![];

    for declaration in declarations {
        let literal = match declaration
            .initializer
            .as_ref()
            .and_then(|initializer| initializer.compile_time_constant())
        {
            Some(Constant::Int(value)) => Some(i64::from(value)),
            _ => None,
        };

        let variable = context.declare_local(
            &declaration.variable.name,
            Some(declaration.variable.id),
            declaration.variable.ty.clone(),
            literal.unwrap_or(0),
        )?;

        if let Some(initializer) = &declaration.initializer {
            deferred.push(DeferredInitializer {
                variable,
                initializer,
            });
        }
    }

    Ok(deferred)
}

/// Second phase: the deferred initializers as assignment statements, in
/// declaration order.
pub fn emit_deferred_initializers(
    context: &mut FunctionContext,
    deferred: Vec<DeferredInitializer>,
) -> Result<Vec<estree::Expression>, Error> {
    let mut assignments = vec![];
    for DeferredInitializer {
        variable,
        initializer,
    } in deferred
    {
        let value = compile_expression(context, initializer)?;
        assignments.push(assignment_expression(&variable, value)?.tree);
    }
    Ok(assignments)
}

fn condition(context: &mut FunctionContext, expression: &Expression) -> Result<estree::Expression, Error> {
    let compiled = compile_expression(context, expression)?;
    Ok(coerce(wrap_function_call(compiled)?, AsmType::Signed)?.tree)
}

/// Collapses a lowered statement list into the single statement a loop or
/// branch body needs.
fn single_statement(mut statements: Vec<estree::Statement>) -> estree::Statement {
    match statements.len() {
        0 => estree::Statement::EmptyStatement,
        1 => statements.remove(0),
        _ => estree::block(statements),
    }
}

fn compile_body(
    context: &mut FunctionContext,
    statement: &Statement,
) -> Result<Box<estree::Statement>, Error> {
    let mut out = vec![];
    compile_statement(context, statement, &mut out)?;
    Ok(Box::new(single_statement(out)))
}

fn compile_return(
    context: &mut FunctionContext,
    value: Option<&Expression>,
) -> Result<estree::Statement, Error> {
    let value = match value {
        Some(value) => value,
        None => return Ok(estree::Statement::ReturnStatement { argument: None }),
    };

    let compiled = compile_expression(context, value)?;
    let argument = match context.return_type {
        Type::Int => coerce(wrap_function_call(compiled)?, AsmType::Signed)?,
        Type::Void => compiled,
        ref other => {
            return Err(Error::new(
                ErrorImpl::UnsupportedCoercion {
                    from: compiled.ty.to_string(),
                    to: other.to_string(),
                },
                String::from("return statement"),
            ))
        }
    };

    Ok(estree::Statement::ReturnStatement {
        argument: Some(argument.tree),
    })
}

pub fn compile_statement(
    context: &mut FunctionContext,
    statement: &Statement,
    out: &mut Vec<estree::Statement>,
) -> Result<(), Error> {
    match statement {
        Statement::Block(statements) => {
            let mut body = vec![];
            for statement in statements {
                compile_statement(context, statement, &mut body)?;
            }
            out.push(estree::block(body));
        }
        Statement::Declaration(declarations) => {
            let deferred = hoist_declarations(context, declarations)?;
            for assignment in emit_deferred_initializers(context, deferred)? {
                out.push(estree::expression_statement(assignment));
            }
        }
        Statement::Expression(expression) => {
            let compiled = compile_expression(context, expression)?;
            out.push(estree::expression_statement(compiled.tree));
        }
        Statement::Return(value) => out.push(compile_return(context, value.as_ref())?),
        Statement::While { condition: test, body } => {
            let test = condition(context, test)?;
            out.push(estree::Statement::WhileStatement {
                test,
                body: compile_body(context, body)?,
            });
        }
        Statement::DoWhile {
            body,
            condition: test,
        } => {
            let body = compile_body(context, body)?;
            out.push(estree::Statement::DoWhileStatement {
                body,
                test: condition(context, test)?,
            });
        }
        Statement::For {
            init,
            test,
            update,
            body,
        } => {
            let init = match init.as_deref() {
                Some(Statement::Expression(expression)) => {
                    Some(compile_expression(context, expression)?.tree)
                }
                Some(Statement::Declaration(declarations)) => {
                    let deferred = hoist_declarations(context, declarations)?;
                    let mut assignments = emit_deferred_initializers(context, deferred)?;
                    match assignments.len() {
                        0 => None,
                        1 => Some(assignments.remove(0)),
                        _ => Some(estree::sequence(assignments)),
                    }
                }
                Some(other) => {
                    return Err(unsupported(
                        format!("{} as a for loop initializer", other.name()),
                        statement.name(),
                    ))
                }
                None => None,
            };
            let test = match test {
                Some(test) => Some(condition(context, test)?),
                None => None,
            };
            let update = match update {
                Some(update) => Some(compile_expression(context, update)?.tree),
                None => None,
            };
            out.push(estree::Statement::ForStatement {
                init,
                test,
                update,
                body: compile_body(context, body)?,
            });
        }
        Statement::If {
            test,
            then_statement,
            else_statement,
        } => {
            let test = condition(context, test)?;
            let consequent = compile_body(context, then_statement)?;
            let alternate = match else_statement {
                Some(else_statement) => Some(compile_body(context, else_statement)?),
                None => None,
            };
            out.push(estree::Statement::IfStatement {
                test,
                consequent,
                alternate,
            });
        }
        Statement::Break => out.push(estree::Statement::BreakStatement),
        Statement::Continue => out.push(estree::Statement::ContinueStatement),
        Statement::Null => out.push(estree::Statement::EmptyStatement),
    }
    Ok(())
}

pub fn compile_function(
    module: &ModuleContext,
    function: &FunctionDefinition,
) -> Result<estree::Statement, Error> {
    let mut context = FunctionContext::new(module, function.return_type.clone());
    let name = module
        .get_function(function.binding.id)
        .map(|variable| variable.name.clone())
        .unwrap_or_else(|| function.name.clone());

    let mut params = vec![];
    let mut annotations = vec![];
    for parameter in &function.parameters {
        if parameter.ty != Type::Int {
            return Err(unsupported(
                format!("parameters of type `{}`", parameter.ty),
                format!("function {}", function.name),
            ));
        }

        let variable = context.allocate_variable(
            &parameter.name,
            AsmType::Int,
            parameter.ty.clone(),
            Some(parameter.id),
        );
        // p = p | 0
        annotations.push(estree::expression_statement(estree::assignment(
            estree::identifier(&variable.name),
            estree::or_zero(estree::identifier(&variable.name)),
        )));
        params.push(estree::identifier(&variable.name));
    }

    let mut body = vec![];
    for statement in &function.body {
        compile_statement(&mut context, statement, &mut body)?;
    }

    let mut output = annotations;
    if !context.declarations.is_empty() {
        output.push(estree::var_declaration(context.declarations));
    }
    output.extend(body);

    Ok(estree::function_declaration(&name, params, output))
}

/// Lowers a module to an asm.js program: a single `Module` factory holding
/// every function and returning them in an export object.
pub fn compile_module(module: &Module) -> Result<Program, Error> {
    let mut module_context = ModuleContext::new();
    let mut exports = vec![];
    for function in &module.declarations {
        let variable = module_context.declare_function(&function.binding);
        exports.push(estree::property(&function.name, &variable.name));
    }

    let mut body = vec![estree::expression_statement(estree::string_literal(
        ASM_DIRECTIVE,
    ))];
    for function in &module.declarations {
        body.push(compile_function(&module_context, function)?);
    }
    body.push(estree::Statement::ReturnStatement {
        argument: Some(estree::Expression::ObjectExpression {
            properties: exports,
        }),
    });

    Ok(Program {
        body: vec![estree::function_declaration(MODULE_NAME, vec![], body)],
    })
}

