use std::collections::HashMap;

use crate::{
    abstractor::semantic::{
        AssignmentOperator, BinaryOperator, Constant, Expression, ExpressionKind,
        FunctionDefinition, Module, PostupdateOperator, Statement, UnaryOperator,
    },
    errors::errors::{unsupported, Error, ErrorImpl},
    types::types::{Binding, BindingId, Type},
};

use super::{
    instructions::{Instruction, NumericOp},
    module::WasmModule,
    types::{FunctionType, ValueType, WasmType},
};

/// Module-wide state: the module being built and the index assigned to
/// every function binding.
#[derive(Debug, Default)]
pub struct WasmCompiler {
    pub module: WasmModule,
    pub function_indices: HashMap<BindingId, u32>,
}

/// State of the function whose body is being lowered.
#[derive(Debug)]
pub struct FunctionContext<'a> {
    pub compiler: &'a WasmCompiler,
    pub name: String,
    pub return_type: Option<ValueType>,
    pub locals: HashMap<BindingId, (u32, ValueType)>,
    pub body: Vec<Instruction>,
}

impl<'a> FunctionContext<'a> {
    fn construct(&self) -> String {
        format!("function {}", self.name)
    }

    fn emit(&mut self, instruction: Instruction) {
        self.body.push(instruction);
    }

    fn emit_numeric(&mut self, op: NumericOp, ty: ValueType) -> Result<(), Error> {
        let instruction = Instruction::numeric(op, ty)?;
        self.emit(instruction);
        Ok(())
    }

    fn local(&self, binding: &Binding) -> Result<(u32, ValueType), Error> {
        self.locals.get(&binding.id).copied().ok_or_else(|| {
            unsupported(
                format!("variable `{}` that is not a parameter", binding.name),
                self.construct(),
            )
        })
    }

    fn value_type(&self, ty: &Type) -> Result<Option<ValueType>, Error> {
        WasmType::from_c_type(ty).result_type(&self.construct())
    }
}

fn signature(function: &FunctionDefinition) -> Type {
    Type::function(
        function.return_type.clone(),
        function.parameter_types.clone(),
    )
}

fn constant_instruction(constant: Constant) -> Instruction {
    match constant {
        Constant::Int(value) => Instruction::I32Const(value),
        Constant::Double(value) => Instruction::F64Const(value),
    }
}

fn comparison(operator: BinaryOperator) -> Option<NumericOp> {
    match operator {
        BinaryOperator::LessThan => Some(NumericOp::Lt),
        BinaryOperator::GreaterThan => Some(NumericOp::Gt),
        BinaryOperator::LessThanEquals => Some(NumericOp::Le),
        BinaryOperator::GreaterThanEquals => Some(NumericOp::Ge),
        BinaryOperator::Equals => Some(NumericOp::Eq),
        BinaryOperator::NotEquals => Some(NumericOp::Ne),
        BinaryOperator::Add | BinaryOperator::Subtract | BinaryOperator::LogicalAnd => None,
    }
}

/// Lowers `expression` so that a value of type `target` is left on the
/// stack. `int` values are widened with `f64.convert_i32_s`, and `int`
/// constants are emitted directly as `f64.const`.
pub fn compile_expression_as(
    context: &mut FunctionContext,
    expression: &Expression,
    target: ValueType,
) -> Result<(), Error> {
    if target == ValueType::F64 && expression.ty == Type::Int {
        if let Some(Constant::Int(value)) = expression.compile_time_constant() {
            context.emit(Instruction::F64Const(f64::from(value)));
            return Ok(());
        }
    }

    let produced = compile_expression(context, expression)?;
    match produced {
        Some(ty) if ty == target => Ok(()),
        Some(ValueType::I32) if target == ValueType::F64 => {
            context.emit_numeric(NumericOp::ConvertI32S, ValueType::F64)
        }
        other => Err(Error::new(
            ErrorImpl::UnsupportedCoercion {
                from: other.map_or(String::from("void"), |ty| ty.to_string()),
                to: target.to_string(),
            },
            context.construct(),
        )),
    }
}

/// Lowers `expression` and returns the type of the value it leaves on the
/// stack, or `None` if it leaves nothing. Assignments and postupdates whose
/// result is unused leave nothing.
pub fn compile_expression(
    context: &mut FunctionContext,
    expression: &Expression,
) -> Result<Option<ValueType>, Error> {
    if let Some(constant) = expression.compile_time_constant() {
        let instruction = constant_instruction(constant);
        context.emit(instruction);
        return context.value_type(&expression.ty);
    }

    match &expression.kind {
        ExpressionKind::Const(constant) => {
            context.emit(constant_instruction(*constant));
            context.value_type(&expression.ty)
        }
        ExpressionKind::Variable(binding) => {
            let (index, ty) = context.local(binding)?;
            context.emit(Instruction::LocalGet(index));
            Ok(Some(ty))
        }
        ExpressionKind::Assignment {
            target,
            operator,
            value,
        } => {
            let (index, ty) = context.local(target)?;
            match operator {
                AssignmentOperator::Assign => compile_expression_as(context, value, ty)?,
                AssignmentOperator::AddAssign | AssignmentOperator::SubtractAssign => {
                    context.emit(Instruction::LocalGet(index));
                    compile_expression_as(context, value, ty)?;
                    let op = match operator {
                        AssignmentOperator::AddAssign => NumericOp::Add,
                        _ => NumericOp::Sub,
                    };
                    context.emit_numeric(op, ty)?;
                }
            }

            if expression.result_is_used {
                context.emit(Instruction::LocalTee(index));
                Ok(Some(ty))
            } else {
                context.emit(Instruction::LocalSet(index));
                Ok(None)
            }
        }
        ExpressionKind::Binary {
            operator: BinaryOperator::LogicalAnd,
            left,
            right,
            ..
        } => {
            compile_expression_as(context, left, ValueType::I32)?;
            context.emit(Instruction::If(Some(ValueType::I32)));
            compile_expression_as(context, right, ValueType::I32)?;
            context.emit(Instruction::I32Const(0));
            context.emit_numeric(NumericOp::Ne, ValueType::I32)?;
            context.emit(Instruction::Else);
            context.emit(Instruction::I32Const(0));
            context.emit(Instruction::End);
            Ok(Some(ValueType::I32))
        }
        ExpressionKind::Binary {
            operator,
            operand_type,
            left,
            right,
        } => {
            let ty = context.value_type(operand_type)?.ok_or_else(|| {
                unsupported(
                    format!("`{}` on void operands", operator.as_str()),
                    context.construct(),
                )
            })?;
            compile_expression_as(context, left, ty)?;
            compile_expression_as(context, right, ty)?;
            let op = match operator {
                BinaryOperator::Add => NumericOp::Add,
                BinaryOperator::Subtract => NumericOp::Sub,
                other => comparison(*other).ok_or_else(|| {
                    unsupported(
                        format!("binary operator `{}`", other.as_str()),
                        context.construct(),
                    )
                })?,
            };
            context.emit_numeric(op, ty)?;
            context.value_type(&expression.ty)
        }
        ExpressionKind::Conditional {
            test,
            consequent,
            alternate,
        } => {
            let result = context.value_type(&expression.ty)?;
            compile_expression_as(context, test, ValueType::I32)?;
            context.emit(Instruction::If(result));
            compile_branch(context, consequent, result)?;
            context.emit(Instruction::Else);
            compile_branch(context, alternate, result)?;
            context.emit(Instruction::End);
            Ok(result)
        }
        ExpressionKind::Comma { left, right } => {
            if compile_expression(context, left)?.is_some() {
                context.emit(Instruction::Drop);
            }
            compile_expression(context, right)
        }
        ExpressionKind::Call { callee, arguments } => {
            let index = *context
                .compiler
                .function_indices
                .get(&callee.id)
                .ok_or_else(|| {
                    unsupported(
                        format!("calls through `{}`", callee.name),
                        context.construct(),
                    )
                })?;
            let (return_type, parameter_types) = match &callee.ty {
                Type::Function(return_type, parameter_types) => {
                    (return_type.as_ref().clone(), parameter_types.clone())
                }
                other => {
                    return Err(Error::new(
                        ErrorImpl::NotCallable {
                            received: other.to_string(),
                        },
                        context.construct(),
                    ))
                }
            };

            // A mismatched operand stack would fail validation of the module.
            if arguments.len() != parameter_types.len() {
                return Err(unsupported(
                    format!(
                        "passing {} arguments to {} parameters",
                        arguments.len(),
                        parameter_types.len()
                    ),
                    context.construct(),
                ));
            }

            for (argument, parameter_type) in arguments.iter().zip(&parameter_types) {
                match context.value_type(parameter_type)? {
                    Some(ty) => compile_expression_as(context, argument, ty)?,
                    None => {
                        compile_expression(context, argument)?;
                    }
                }
            }
            context.emit(Instruction::Call(index));
            context.value_type(&return_type)
        }
        ExpressionKind::Unary {
            operator: UnaryOperator::Negate,
            argument,
        } => match context.value_type(&argument.ty)? {
            Some(ValueType::F64) => {
                compile_expression_as(context, argument, ValueType::F64)?;
                context.emit_numeric(NumericOp::Neg, ValueType::F64)?;
                Ok(Some(ValueType::F64))
            }
            Some(ty) if ty.is_integer() => {
                // 0 - x
                context.emit(Instruction::I32Const(0));
                compile_expression_as(context, argument, ty)?;
                context.emit_numeric(NumericOp::Sub, ty)?;
                Ok(Some(ty))
            }
            _ => Err(unsupported("negation of this operand", context.construct())),
        },
        ExpressionKind::Unary {
            operator: UnaryOperator::LogicalNot,
            argument,
        } => {
            compile_expression_as(context, argument, ValueType::I32)?;
            context.emit_numeric(NumericOp::Eqz, ValueType::I32)?;
            Ok(Some(ValueType::I32))
        }
        ExpressionKind::Postupdate { operator, target } => {
            let (index, ty) = context.local(target)?;
            if expression.result_is_used {
                context.emit(Instruction::LocalGet(index));
            }
            context.emit(Instruction::LocalGet(index));
            context.emit(Instruction::I32Const(1));
            let op = match operator {
                PostupdateOperator::Increment => NumericOp::Add,
                PostupdateOperator::Decrement => NumericOp::Sub,
            };
            context.emit_numeric(op, ty)?;
            context.emit(Instruction::LocalSet(index));
            Ok(expression.result_is_used.then_some(ty))
        }
    }
}

fn compile_branch(
    context: &mut FunctionContext,
    expression: &Expression,
    result: Option<ValueType>,
) -> Result<(), Error> {
    match result {
        Some(ty) => compile_expression_as(context, expression, ty),
        None => {
            if compile_expression(context, expression)?.is_some() {
                context.emit(Instruction::Drop);
            }
            Ok(())
        }
    }
}

pub fn compile_statement(context: &mut FunctionContext, statement: &Statement) -> Result<(), Error> {
    match statement {
        Statement::Return(Some(value)) => {
            match context.return_type {
                Some(ty) => compile_expression_as(context, value, ty)?,
                None => {
                    if compile_expression(context, value)?.is_some() {
                        context.emit(Instruction::Drop);
                    }
                }
            }
            context.emit(Instruction::Return);
            Ok(())
        }
        Statement::Return(None) => {
            context.emit(Instruction::Return);
            Ok(())
        }
        other => Err(unsupported(
            format!("{} in wasm output", other.name()),
            context.construct(),
        )),
    }
}

pub fn compile_function(
    compiler: &WasmCompiler,
    function: &FunctionDefinition,
    ty: &FunctionType,
) -> Result<Vec<Instruction>, Error> {
    let mut context = FunctionContext {
        compiler,
        name: function.name.clone(),
        return_type: ty.result,
        locals: HashMap::new(),
        body: vec![],
    };
    for (index, (parameter, value_type)) in
        function.parameters.iter().zip(&ty.parameters).enumerate()
    {
        context
            .locals
            .insert(parameter.id, (index as u32, *value_type));
    }

    for statement in &function.body {
        compile_statement(&mut context, statement)?;
    }

    if context.return_type.is_some() && context.body.last() != Some(&Instruction::Return) {
        context.emit(Instruction::Unreachable);
    }

    Ok(context.body)
}

/// Lowers a module. Every function gets its type and index before any body
/// is compiled, so forward and recursive calls resolve.
pub fn compile_module(module: &Module) -> Result<WasmModule, Error> {
    let mut compiler = WasmCompiler::default();
    let mut signatures = vec![];

    for function in &module.declarations {
        let construct = format!("function {}", function.name);
        let ty = FunctionType::from_wasm_type(
            &WasmType::from_c_type(&signature(function)),
            &construct,
        )?;
        let type_index = compiler.module.add_type(ty.clone());
        let index = compiler.module.declare_function(type_index);
        compiler.function_indices.insert(function.binding.id, index);
        compiler.module.add_export(&function.name, index);
        signatures.push((index, ty));
    }

    let mut bodies = vec![];
    for (function, (index, ty)) in module.declarations.iter().zip(&signatures) {
        bodies.push((*index, compile_function(&compiler, function, ty)?));
    }
    for (index, body) in bodies {
        compiler.module.set_body(index, body);
    }

    Ok(compiler.module)
}
