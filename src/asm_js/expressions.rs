use crate::{
    abstractor::semantic::{
        AssignmentOperator, BinaryOperator, Constant, Expression, ExpressionKind,
        PostupdateOperator, UnaryOperator,
    },
    errors::errors::{unsupported, Error, ErrorImpl},
    types::types::{Binding, Type},
};

use super::{
    context::{FunctionContext, Variable},
    estree,
    types::{lattice_type_of, satisfies, AsmType},
};

/// A compiled expression together with what the lattice knows about it.
#[derive(Debug, Clone, PartialEq)]
pub struct AsmExpression {
    pub tree: estree::Expression,
    pub ty: AsmType,
    pub intended_type: Option<Type>,
    pub is_function_call: bool,
    /// Set for literals, including negated ones.
    pub numeric_literal: Option<i64>,
}

impl AsmExpression {
    pub fn new(tree: estree::Expression, ty: AsmType) -> Self {
        AsmExpression {
            tree,
            ty,
            intended_type: None,
            is_function_call: false,
            numeric_literal: None,
        }
    }
}

fn coercion_error(ty: AsmType, target: AsmType) -> Error {
    Error::new(
        ErrorImpl::UnsupportedCoercion {
            from: ty.to_string(),
            to: target.to_string(),
        },
        format!("{} expression", ty),
    )
}

pub fn const_expression(value: i64) -> Result<AsmExpression, Error> {
    let ty = if (0..0x8000_0000).contains(&value) {
        AsmType::Fixnum
    } else if (-0x8000_0000..0).contains(&value) {
        AsmType::Signed
    } else {
        return Err(unsupported(
            "integer literals outside the signed 32-bit range",
            value.to_string(),
        ));
    };

    Ok(AsmExpression {
        tree: estree::integer_literal(value),
        ty,
        intended_type: Some(Type::Int),
        is_function_call: false,
        numeric_literal: Some(value),
    })
}

pub fn variable_expression(variable: &Variable) -> AsmExpression {
    AsmExpression {
        tree: estree::identifier(&variable.name),
        ty: variable.ty,
        intended_type: Some(variable.intended_type.clone()),
        is_function_call: false,
        numeric_literal: None,
    }
}

/// Converts `expression` so that it satisfies `target`: unchanged if it
/// already does, `expression | 0` for an intish value required as signed.
pub fn coerce(expression: AsmExpression, target: AsmType) -> Result<AsmExpression, Error> {
    if satisfies(expression.ty, target) {
        return Ok(expression);
    }

    if target == AsmType::Signed && satisfies(expression.ty, AsmType::Intish) {
        return Ok(AsmExpression {
            tree: estree::or_zero(expression.tree),
            ty: AsmType::Signed,
            intended_type: expression.intended_type,
            is_function_call: false,
            numeric_literal: None,
        });
    }

    Err(coercion_error(expression.ty, target))
}

/// Coerces to the lattice type of a C type; `int` means signed.
pub fn coerce_to(expression: AsmExpression, intended_type: &Type) -> Result<AsmExpression, Error> {
    coerce(expression, lattice_type_of(intended_type)?)
}

/// Calls may only appear where their result is coerced, so a call used as
/// an operand is wrapped as `f(...) | 0`.
pub fn wrap_function_call(expression: AsmExpression) -> Result<AsmExpression, Error> {
    if !expression.is_function_call {
        return Ok(expression);
    }

    if satisfies(expression.ty, AsmType::Signed) {
        Ok(AsmExpression {
            tree: estree::or_zero(expression.tree),
            ty: AsmType::Signed,
            intended_type: expression.intended_type,
            is_function_call: false,
            numeric_literal: None,
        })
    } else {
        Err(coercion_error(expression.ty, AsmType::Signed))
    }
}

/// Prepares an operand of integer arithmetic: calls are wrapped and
/// intish intermediates narrowed back to signed.
fn int_operand(expression: AsmExpression) -> Result<AsmExpression, Error> {
    let expression = wrap_function_call(expression)?;
    if satisfies(expression.ty, AsmType::Int) {
        Ok(expression)
    } else {
        coerce(expression, AsmType::Signed)
    }
}

fn signed_operand(expression: AsmExpression) -> Result<AsmExpression, Error> {
    coerce(wrap_function_call(expression)?, AsmType::Signed)
}

pub fn additive_expression(
    operator: &str,
    left: AsmExpression,
    right: AsmExpression,
) -> Result<AsmExpression, Error> {
    let left = int_operand(left)?;
    let right = int_operand(right)?;

    let mut result = AsmExpression::new(
        estree::binary(operator, left.tree, right.tree),
        AsmType::Intish,
    );
    result.intended_type = Some(Type::Int);
    Ok(result)
}

pub fn assignment_expression(
    target: &Variable,
    value: AsmExpression,
) -> Result<AsmExpression, Error> {
    let value = wrap_function_call(coerce_to(value, &target.intended_type)?)?;

    Ok(AsmExpression {
        tree: estree::assignment(estree::identifier(&target.name), value.tree),
        ty: value.ty,
        intended_type: Some(target.intended_type.clone()),
        is_function_call: false,
        numeric_literal: None,
    })
}

pub fn comma_expression(
    left: AsmExpression,
    right: AsmExpression,
) -> Result<AsmExpression, Error> {
    let right = wrap_function_call(right)?;

    Ok(AsmExpression {
        tree: estree::sequence(vec![left.tree, right.tree]),
        ty: right.ty,
        intended_type: right.intended_type,
        is_function_call: false,
        numeric_literal: None,
    })
}

fn lookup<'a>(context: &'a FunctionContext, binding: &Binding) -> Result<&'a Variable, Error> {
    context.get(binding.id).ok_or_else(|| {
        Error::new(
            ErrorImpl::VariableNotDeclared {
                variable: binding.name.clone(),
            },
            format!("binding {}", binding.id),
        )
    })
}

pub fn compile_expression(
    context: &mut FunctionContext,
    expression: &Expression,
) -> Result<AsmExpression, Error> {
    match &expression.kind {
        ExpressionKind::Const(Constant::Int(value)) => const_expression(i64::from(*value)),
        ExpressionKind::Const(Constant::Double(value)) => {
            let mut result = AsmExpression::new(estree::float_literal(*value), AsmType::Double);
            result.intended_type = Some(Type::Double);
            Ok(result)
        }
        ExpressionKind::Variable(binding) => Ok(variable_expression(lookup(context, binding)?)),
        ExpressionKind::Assignment {
            target,
            operator,
            value,
        } => {
            let target = lookup(context, target)?.clone();
            let value = compile_expression(context, value)?;
            let value = match operator {
                AssignmentOperator::Assign => value,
                AssignmentOperator::AddAssign => {
                    additive_expression("+", variable_expression(&target), value)?
                }
                AssignmentOperator::SubtractAssign => {
                    additive_expression("-", variable_expression(&target), value)?
                }
            };
            assignment_expression(&target, value)
        }
        ExpressionKind::Binary {
            operator,
            operand_type,
            left,
            right,
        } => {
            let left = compile_expression(context, left)?;
            let right = compile_expression(context, right)?;

            match operator {
                BinaryOperator::Add | BinaryOperator::Subtract => {
                    additive_expression(operator.as_str(), left, right)
                }
                BinaryOperator::LogicalAnd => {
                    // a && b  =>  a ? (b != 0) : 0
                    let left = signed_operand(left)?;
                    let right = signed_operand(right)?;
                    let mut result = AsmExpression::new(
                        estree::conditional(
                            left.tree,
                            estree::binary("!=", right.tree, estree::integer_literal(0)),
                            estree::integer_literal(0),
                        ),
                        AsmType::Int,
                    );
                    result.intended_type = Some(Type::Int);
                    Ok(result)
                }
                _ => {
                    if *operand_type != Type::Int {
                        return Err(unsupported(
                            format!("`{}` comparisons", operand_type),
                            format!("{} expression", operator.as_str()),
                        ));
                    }
                    let left = signed_operand(left)?;
                    let right = signed_operand(right)?;
                    let mut result = AsmExpression::new(
                        estree::binary(operator.as_str(), left.tree, right.tree),
                        AsmType::Int,
                    );
                    result.intended_type = Some(Type::Int);
                    Ok(result)
                }
            }
        }
        ExpressionKind::Conditional {
            test,
            consequent,
            alternate,
        } => {
            let test = signed_operand(compile_expression(context, test)?)?;
            let consequent = signed_operand(compile_expression(context, consequent)?)?;
            let alternate = signed_operand(compile_expression(context, alternate)?)?;

            let mut result = AsmExpression::new(
                estree::conditional(test.tree, consequent.tree, alternate.tree),
                AsmType::Int,
            );
            result.intended_type = Some(Type::Int);
            Ok(result)
        }
        ExpressionKind::Comma { left, right } => {
            let left = compile_expression(context, left)?;
            let right = compile_expression(context, right)?;
            comma_expression(left, right)
        }
        ExpressionKind::Call { callee, arguments } => {
            let callee = lookup(context, callee)?.clone();
            let (return_type, parameter_types) = match &callee.intended_type {
                Type::Function(return_type, parameter_types) => {
                    (return_type.as_ref().clone(), parameter_types.clone())
                }
                other => {
                    return Err(Error::new(
                        ErrorImpl::NotCallable {
                            received: other.to_string(),
                        },
                        callee.name.clone(),
                    ))
                }
            };

            if arguments.len() != parameter_types.len() {
                return Err(unsupported(
                    format!(
                        "passing {} arguments to {} parameters",
                        arguments.len(),
                        parameter_types.len()
                    ),
                    callee.name.clone(),
                ));
            }

            let mut argument_trees = vec![];
            for (argument, intended_type) in arguments.iter().zip(&parameter_types) {
                let compiled = compile_expression(context, argument)?;
                let compiled = wrap_function_call(coerce_to(compiled, intended_type)?)?;
                argument_trees.push(compiled.tree);
            }

            Ok(AsmExpression {
                tree: estree::call(estree::identifier(&callee.name), argument_trees),
                ty: lattice_type_of(&return_type)?,
                intended_type: Some(return_type),
                is_function_call: true,
                numeric_literal: None,
            })
        }
        ExpressionKind::Unary { operator, argument } => {
            let argument = compile_expression(context, argument)?;
            match operator {
                UnaryOperator::Negate => negation_expression(argument),
                UnaryOperator::LogicalNot => {
                    let argument = signed_operand(argument)?;
                    let mut result =
                        AsmExpression::new(estree::unary("!", argument.tree), AsmType::Int);
                    result.intended_type = Some(Type::Int);
                    Ok(result)
                }
            }
        }
        ExpressionKind::Postupdate { operator, target } => {
            let target = lookup(context, target)?.clone();
            let operator = match operator {
                PostupdateOperator::Increment => "+",
                PostupdateOperator::Decrement => "-",
            };
            postupdate_expression(context, operator, &target, expression.result_is_used)
        }
    }
}

fn negation_expression(argument: AsmExpression) -> Result<AsmExpression, Error> {
    if let Some(value) = argument.numeric_literal {
        return const_expression(-value);
    }

    if argument.ty == AsmType::Double {
        let mut result = AsmExpression::new(estree::unary("-", argument.tree), AsmType::Double);
        result.intended_type = Some(Type::Double);
        return Ok(result);
    }

    let argument = int_operand(argument)?;
    let mut result = AsmExpression::new(estree::unary("-", argument.tree), AsmType::Intish);
    result.intended_type = Some(Type::Int);
    Ok(result)
}

/// `x++` is `x = (x + 1) | 0` when its value is discarded. When the value is
/// used, the old value is kept in a temporary: `(x = ((tmp = x) + 1) | 0), tmp`.
fn postupdate_expression(
    context: &mut FunctionContext,
    operator: &str,
    target: &Variable,
    result_is_used: bool,
) -> Result<AsmExpression, Error> {
    if !satisfies(target.ty, AsmType::Int) {
        return Err(coercion_error(target.ty, AsmType::Int));
    }

    if !result_is_used {
        let updated = additive_expression(operator, variable_expression(target), const_expression(1)?)?;
        return assignment_expression(target, updated);
    }

    let temp = context.declare_local("temp", None, target.intended_type.clone(), 0)?;
    let saved = AsmExpression {
        tree: estree::assignment(estree::identifier(&temp.name), estree::identifier(&target.name)),
        ty: target.ty,
        intended_type: Some(target.intended_type.clone()),
        is_function_call: false,
        numeric_literal: None,
    };
    let updated = additive_expression(operator, saved, const_expression(1)?)?;
    let assignment = assignment_expression(target, updated)?;

    comma_expression(assignment, variable_expression(&temp))
}
