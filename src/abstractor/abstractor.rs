use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    errors::errors::{unsupported, Error, ErrorImpl},
    syntax::{
        node::Node,
        shapes::{
            DeclarationNode, DeclaratorNode, ExprNode, ExternalNode, FunctionDefinitionNode,
            ParameterNode, SpecifiersNode, StmtNode,
        },
    },
    types::{
        context::{Context, ScopeId},
        types::{Binding, Type},
    },
};

use super::semantic::{
    AssignmentOperator, BinaryOperator, Constant, Expression, ExpressionKind, FunctionDefinition,
    Module, PostupdateOperator, Statement, UnaryOperator, VariableDeclaration,
};

lazy_static! {
    static ref INT_CONSTANT: Regex = Regex::new(r"^[0-9]+$").unwrap();
    static ref DOUBLE_CONSTANT: Regex = Regex::new(r"^[0-9]*\.[0-9]*$").unwrap();
}

#[derive(Debug, Default)]
pub struct Abstractor {
    pub context: Context,
    /// How many loop bodies enclose the statement being abstracted.
    loop_depth: u32,
}

impl Abstractor {
    pub fn new() -> Self {
        Abstractor {
            context: Context::new(),
            loop_depth: 0,
        }
    }
}

/// Builds the semantic tree of a whole translation unit.
pub fn abstract_module(declarations: &[Node]) -> Result<(Module, Context), Error> {
    let mut abstractor = Abstractor::new();
    let mut functions = vec![];

    for node in declarations {
        match ExternalNode::classify(node)? {
            ExternalNode::FunctionDefinition(definition) => {
                functions.push(abstract_function(&mut abstractor, &definition)?)
            }
            ExternalNode::Declaration(declaration) => {
                return Err(unsupported(
                    "module-level declarations",
                    declaration.node.describe(),
                ))
            }
        }
    }

    Ok((
        Module {
            declarations: functions,
        },
        abstractor.context,
    ))
}

pub fn resolve_specifiers(specifiers: &SpecifiersNode) -> Result<Type, Error> {
    if !specifiers.storage_classes.is_empty() {
        return Err(unsupported("storage classes", specifiers.node.describe()));
    }
    if specifiers.type_specifiers.len() != 1 {
        return Err(unsupported(
            "multiple type specifiers",
            specifiers.node.describe(),
        ));
    }

    let specifier = specifiers.type_specifiers[0];
    Type::from_specifier(specifier).ok_or_else(|| {
        unsupported(
            format!("type specifier `{}`", specifier),
            specifiers.node.describe(),
        )
    })
}

pub fn abstract_function(
    abstractor: &mut Abstractor,
    definition: &FunctionDefinitionNode,
) -> Result<FunctionDefinition, Error> {
    let construct = definition.node.describe();
    let return_type = resolve_specifiers(&definition.specifiers)?;

    if !definition.declarations.is_empty() {
        return Err(unsupported("old-style parameter declarations", construct));
    }

    let (name, parameter_nodes) = match &definition.declarator {
        DeclaratorNode::Function { sub, parameters } => match sub.as_ref() {
            DeclaratorNode::Identifier(name) => (*name, parameters),
            other => {
                return Err(unsupported(
                    "nested function declarators",
                    other.describe(),
                ))
            }
        },
        other => {
            return Err(Error::new(
                ErrorImpl::UnexpectedNode {
                    expected: String::from("FunctionDeclarator"),
                    received: other.describe(),
                },
                construct,
            ))
        }
    };

    let parameters = resolve_parameters(parameter_nodes, &construct)?;
    let parameter_types = parameters
        .iter()
        .map(|(_, ty)| ty.clone())
        .collect::<Vec<Type>>();

    // Defined before the body is walked so recursive calls resolve.
    let root = abstractor.context.root();
    let binding = abstractor.context.define(
        root,
        name,
        Type::function(return_type.clone(), parameter_types.clone()),
    );

    let scope = abstractor
        .context
        .create_function_context(root, return_type.clone());
    let parameters = parameters
        .into_iter()
        .map(|(name, ty)| abstractor.context.define(scope, name, ty))
        .collect::<Vec<Binding>>();

    let body = abstract_statements(abstractor, scope, &definition.body)?;

    Ok(FunctionDefinition {
        name: String::from(name),
        binding,
        return_type,
        parameters,
        parameter_types,
        body,
    })
}

fn resolve_parameters<'a>(
    parameters: &[ParameterNode<'a>],
    construct: &str,
) -> Result<Vec<(&'a str, Type)>, Error> {
    if let [ParameterNode::TypeOnly { specifiers }] = parameters {
        if resolve_specifiers(specifiers)? == Type::Void {
            return Ok(vec![]);
        }
    }

    let mut resolved = vec![];
    for parameter in parameters {
        match parameter {
            ParameterNode::Typed {
                specifiers,
                declarator,
            } => {
                let base_type = resolve_specifiers(specifiers)?;
                let (name, ty) = resolve_parameter_declarator(declarator, base_type)?;
                if ty == Type::Void {
                    return Err(Error::new(
                        ErrorImpl::TypeMatchError {
                            expected: String::from("a non-void type"),
                            received: ty.to_string(),
                        },
                        declarator.describe(),
                    ));
                }
                resolved.push((name, ty));
            }
            ParameterNode::TypeOnly { .. } => {
                return Err(unsupported("unnamed parameters", construct))
            }
        }
    }
    Ok(resolved)
}

fn resolve_parameter_declarator<'a>(
    declarator: &DeclaratorNode<'a>,
    ty: Type,
) -> Result<(&'a str, Type), Error> {
    match declarator {
        DeclaratorNode::Identifier(name) => Ok((*name, ty)),
        DeclaratorNode::Indirect { pointers, sub } => {
            resolve_parameter_declarator(sub, wrap_pointers(pointers, ty, declarator)?)
        }
        DeclaratorNode::Array { .. } => {
            Err(unsupported("array parameters", declarator.describe()))
        }
        DeclaratorNode::Function { .. } => {
            Err(unsupported("function parameters", declarator.describe()))
        }
    }
}

fn wrap_pointers(
    pointers: &[Vec<&str>],
    mut ty: Type,
    declarator: &DeclaratorNode,
) -> Result<Type, Error> {
    for qualifiers in pointers {
        if !qualifiers.is_empty() {
            return Err(unsupported("pointer qualifiers", declarator.describe()));
        }
        ty = Type::pointer(ty);
    }
    Ok(ty)
}

pub fn abstract_statements(
    abstractor: &mut Abstractor,
    scope: ScopeId,
    nodes: &[&Node],
) -> Result<Vec<Statement>, Error> {
    nodes
        .iter()
        .map(|node| abstract_stmt(abstractor, scope, node))
        .collect()
}

pub fn abstract_stmt(
    abstractor: &mut Abstractor,
    scope: ScopeId,
    node: &Node,
) -> Result<Statement, Error> {
    match StmtNode::classify(node)? {
        StmtNode::Block(statements) => {
            let block_scope = abstractor.context.create_child_context(scope);
            Ok(Statement::Block(abstract_statements(
                abstractor,
                block_scope,
                &statements,
            )?))
        }
        StmtNode::Declaration(declaration) => Ok(Statement::Declaration(abstract_declaration(
            abstractor,
            scope,
            &declaration,
        )?)),
        StmtNode::Expression(expression) => Ok(Statement::Expression(abstract_expr(
            abstractor, scope, expression, false,
        )?)),
        StmtNode::Return(value) => abstract_return(abstractor, scope, node, value),
        StmtNode::While { condition, body } => Ok(Statement::While {
            condition: abstract_condition(abstractor, scope, condition)?,
            body: Box::new(abstract_loop_body(abstractor, scope, body)?),
        }),
        StmtNode::DoWhile { body, condition } => {
            let body = abstract_loop_body(abstractor, scope, body)?;
            Ok(Statement::DoWhile {
                body: Box::new(body),
                condition: abstract_condition(abstractor, scope, condition)?,
            })
        }
        StmtNode::For {
            init,
            test,
            update,
            body,
        } => {
            let for_scope = abstractor.context.create_child_context(scope);
            let init = match init {
                Some(init) => Some(Box::new(abstract_stmt(abstractor, for_scope, init)?)),
                None => None,
            };
            let test = match test {
                Some(test) => Some(abstract_condition(abstractor, for_scope, test)?),
                None => None,
            };
            let update = match update {
                Some(update) => Some(abstract_expr(abstractor, for_scope, update, false)?),
                None => None,
            };
            Ok(Statement::For {
                init,
                test,
                update,
                body: Box::new(abstract_loop_body(abstractor, for_scope, body)?),
            })
        }
        StmtNode::If {
            test,
            then_statement,
            else_statement,
        } => {
            let test = abstract_condition(abstractor, scope, test)?;
            let then_statement = Box::new(abstract_stmt(abstractor, scope, then_statement)?);
            let else_statement = match else_statement {
                Some(else_statement) => {
                    Some(Box::new(abstract_stmt(abstractor, scope, else_statement)?))
                }
                None => None,
            };
            Ok(Statement::If {
                test,
                then_statement,
                else_statement,
            })
        }
        StmtNode::Break if abstractor.loop_depth > 0 => Ok(Statement::Break),
        StmtNode::Continue if abstractor.loop_depth > 0 => Ok(Statement::Continue),
        StmtNode::Break => Err(unsupported("`break` outside a loop", node.describe())),
        StmtNode::Continue => Err(unsupported("`continue` outside a loop", node.describe())),
        StmtNode::Null => Ok(Statement::Null),
    }
}

fn abstract_loop_body(
    abstractor: &mut Abstractor,
    scope: ScopeId,
    body: &Node,
) -> Result<Statement, Error> {
    abstractor.loop_depth += 1;
    let body = abstract_stmt(abstractor, scope, body);
    abstractor.loop_depth -= 1;
    body
}

fn abstract_return(
    abstractor: &mut Abstractor,
    scope: ScopeId,
    node: &Node,
    value: Option<&Node>,
) -> Result<Statement, Error> {
    let return_type = abstractor
        .context
        .return_type(scope)
        .cloned()
        .unwrap_or(Type::Void);

    let value = match value {
        Some(value) => Some(abstract_expr(abstractor, scope, value, true)?),
        None => None,
    };

    let received = value.as_ref().map_or(Type::Void, |value| value.ty.clone());
    let valid = match (&return_type, &value) {
        (Type::Void, None) => true,
        (Type::Void, Some(_)) | (_, None) => false,
        (_, Some(_)) => return_type.accepts(&received),
    };

    if !valid {
        return Err(Error::new(
            ErrorImpl::TypeMatchError {
                expected: return_type.to_string(),
                received: received.to_string(),
            },
            node.describe(),
        ));
    }

    Ok(Statement::Return(value))
}

/// Loop and branch conditions must be `int`.
fn abstract_condition(
    abstractor: &mut Abstractor,
    scope: ScopeId,
    node: &Node,
) -> Result<Expression, Error> {
    let condition = abstract_expr(abstractor, scope, node, true)?;
    expect_type(&condition, &Type::Int, node)?;
    Ok(condition)
}

pub fn abstract_declaration(
    abstractor: &mut Abstractor,
    scope: ScopeId,
    declaration: &DeclarationNode,
) -> Result<Vec<VariableDeclaration>, Error> {
    let base_type = resolve_specifiers(&declaration.specifiers)?;

    let mut variables = vec![];
    for init_declarator in &declaration.init_declarators {
        variables.push(declare_variable(
            abstractor,
            scope,
            &init_declarator.declarator,
            base_type.clone(),
            init_declarator.initializer,
        )?);
    }
    Ok(variables)
}

fn declare_variable(
    abstractor: &mut Abstractor,
    scope: ScopeId,
    declarator: &DeclaratorNode,
    ty: Type,
    initializer: Option<&Node>,
) -> Result<VariableDeclaration, Error> {
    match declarator {
        DeclaratorNode::Identifier(name) => {
            if ty == Type::Void {
                return Err(Error::new(
                    ErrorImpl::TypeMatchError {
                        expected: String::from("a non-void type"),
                        received: ty.to_string(),
                    },
                    declarator.describe(),
                ));
            }

            // The initializer sees the enclosing binding of a shadowed name.
            let initializer = match initializer {
                Some(node) => {
                    let value = abstract_expr(abstractor, scope, node, true)?;
                    if !ty.accepts(&value.ty) {
                        return Err(Error::new(
                            ErrorImpl::TypeMatchError {
                                expected: ty.to_string(),
                                received: value.ty.to_string(),
                            },
                            node.describe(),
                        ));
                    }
                    Some(value)
                }
                None => None,
            };

            Ok(VariableDeclaration {
                variable: abstractor.context.define(scope, name, ty),
                initializer,
            })
        }
        DeclaratorNode::Indirect { pointers, sub } => {
            let ty = wrap_pointers(pointers, ty, declarator)?;
            declare_variable(abstractor, scope, sub, ty, initializer)
        }
        DeclaratorNode::Array { sub, size } => {
            if initializer.is_some() {
                return Err(unsupported("array initializers", declarator.describe()));
            }
            let name = match sub.as_ref() {
                DeclaratorNode::Identifier(name) => *name,
                other => return Err(unsupported("nested array declarators", other.describe())),
            };

            let count = array_size(abstractor, scope, size)?;
            let element_size = ty.size_of().ok_or_else(|| {
                unsupported(format!("arrays of `{}`", ty), declarator.describe())
            })?;
            let bytes = count
                .checked_mul(element_size)
                .ok_or_else(|| unsupported("arrays larger than the heap", declarator.describe()))?;

            let root = abstractor.context.root();
            let address = abstractor.context.allocate_from_heap(root, bytes)?;
            let address = i32::try_from(address)
                .map_err(|_| unsupported("heap addresses above 2GiB", declarator.describe()))?;

            let pointer = Type::pointer(ty);
            Ok(VariableDeclaration {
                variable: abstractor.context.define(scope, name, pointer.clone()),
                initializer: Some(Expression::new(
                    ExpressionKind::Const(Constant::Int(address)),
                    pointer,
                    true,
                )),
            })
        }
        DeclaratorNode::Function { .. } => Err(unsupported(
            "function declarations",
            declarator.describe(),
        )),
    }
}

fn array_size(abstractor: &mut Abstractor, scope: ScopeId, node: &Node) -> Result<u32, Error> {
    let size = abstract_expr(abstractor, scope, node, true)?;
    match size.compile_time_constant() {
        Some(Constant::Int(count)) => u32::try_from(count).map_err(|_| {
            Error::new(
                ErrorImpl::NegativeArraySize {
                    size: i64::from(count),
                },
                node.describe(),
            )
        }),
        _ => Err(Error::new(
            ErrorImpl::ExpectedCompileTimeConstant,
            node.describe(),
        )),
    }
}

pub fn parse_constant(token: &str, node: &Node) -> Result<Expression, Error> {
    let parse_error = || {
        Error::new(
            ErrorImpl::NumberParseError {
                token: String::from(token),
            },
            node.describe(),
        )
    };

    if INT_CONSTANT.is_match(token) {
        let value = token.parse::<i32>().map_err(|_| parse_error())?;
        return Ok(Expression::new(
            ExpressionKind::Const(Constant::Int(value)),
            Type::Int,
            true,
        ));
    }

    if DOUBLE_CONSTANT.is_match(token) && token.chars().any(|c| c.is_ascii_digit()) {
        let value = token.parse::<f64>().map_err(|_| parse_error())?;
        return Ok(Expression::new(
            ExpressionKind::Const(Constant::Double(value)),
            Type::Double,
            true,
        ));
    }

    Err(parse_error())
}

fn expect_type(expression: &Expression, expected: &Type, node: &Node) -> Result<(), Error> {
    if expression.ty != *expected {
        return Err(Error::new(
            ErrorImpl::TypeMatchError {
                expected: expected.to_string(),
                received: expression.ty.to_string(),
            },
            node.describe(),
        ));
    }
    Ok(())
}

fn lookup(abstractor: &Abstractor, scope: ScopeId, name: &str, node: &Node) -> Result<Binding, Error> {
    abstractor
        .context
        .get(scope, name)
        .cloned()
        .ok_or_else(|| {
            Error::new(
                ErrorImpl::VariableNotDeclared {
                    variable: String::from(name),
                },
                node.describe(),
            )
        })
}

/// Resolves the target of an assignment or update. Only plain variables are lvalues.
fn lvalue(abstractor: &Abstractor, scope: ScopeId, node: &Node) -> Result<Binding, Error> {
    match ExprNode::classify(node)? {
        ExprNode::Var(name) => lookup(abstractor, scope, name, node),
        _ => Err(Error::new(ErrorImpl::NotAssignable, node.describe())),
    }
}

pub fn abstract_expr(
    abstractor: &mut Abstractor,
    scope: ScopeId,
    node: &Node,
    result_is_used: bool,
) -> Result<Expression, Error> {
    match ExprNode::classify(node)? {
        ExprNode::Const(token) => {
            let mut constant = parse_constant(token, node)?;
            constant.result_is_used = result_is_used;
            Ok(constant)
        }
        ExprNode::Var(name) => {
            let binding = lookup(abstractor, scope, name, node)?;
            let ty = binding.ty.clone();
            Ok(Expression::new(
                ExpressionKind::Variable(binding),
                ty,
                result_is_used,
            ))
        }
        ExprNode::BinaryOp {
            operator,
            left,
            right,
        } => {
            let binary_operator = BinaryOperator::from_token(operator).ok_or_else(|| {
                unsupported(format!("binary operator `{}`", operator), node.describe())
            })?;
            let left = abstract_expr(abstractor, scope, left, true)?;
            let right = abstract_expr(abstractor, scope, right, true)?;

            let operand_type = if binary_operator.is_relational() {
                if !left.ty.is_numeric() || !right.ty.is_numeric() {
                    return Err(operand_error(operator, &left, &right, node));
                }
                if left.ty == Type::Double || right.ty == Type::Double {
                    Type::Double
                } else {
                    Type::Int
                }
            } else {
                if left.ty != Type::Int || right.ty != Type::Int {
                    return Err(operand_error(operator, &left, &right, node));
                }
                Type::Int
            };

            Ok(Expression::new(
                ExpressionKind::Binary {
                    operator: binary_operator,
                    operand_type,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                Type::Int,
                result_is_used,
            ))
        }
        ExprNode::Assign {
            left,
            operator,
            right,
        } => {
            let assignment_operator = AssignmentOperator::from_token(operator).ok_or_else(|| {
                unsupported(
                    format!("assignment operator `{}`", operator),
                    node.describe(),
                )
            })?;
            let target = lvalue(abstractor, scope, left)?;
            let value = abstract_expr(abstractor, scope, right, true)?;

            match assignment_operator {
                AssignmentOperator::Assign => {
                    if !target.ty.accepts(&value.ty) {
                        return Err(Error::new(
                            ErrorImpl::TypeMatchError {
                                expected: target.ty.to_string(),
                                received: value.ty.to_string(),
                            },
                            node.describe(),
                        ));
                    }
                }
                AssignmentOperator::AddAssign | AssignmentOperator::SubtractAssign => {
                    if target.ty != Type::Int || value.ty != Type::Int {
                        return Err(Error::new(
                            ErrorImpl::OperandTypeError {
                                operator: String::from(operator),
                                left: target.ty.to_string(),
                                right: value.ty.to_string(),
                            },
                            node.describe(),
                        ));
                    }
                }
            }

            let ty = target.ty.clone();
            Ok(Expression::new(
                ExpressionKind::Assignment {
                    target,
                    operator: assignment_operator,
                    value: Box::new(value),
                },
                ty,
                result_is_used,
            ))
        }
        ExprNode::Sequence { left, right } => {
            let left = abstract_expr(abstractor, scope, left, false)?;
            let right = abstract_expr(abstractor, scope, right, result_is_used)?;
            let ty = right.ty.clone();
            Ok(Expression::new(
                ExpressionKind::Comma {
                    left: Box::new(left),
                    right: Box::new(right),
                },
                ty,
                result_is_used,
            ))
        }
        ExprNode::Conditional {
            test,
            consequent,
            alternate,
        } => {
            let test_expression = abstract_expr(abstractor, scope, test, true)?;
            expect_type(&test_expression, &Type::Int, test)?;
            let consequent_expression = abstract_expr(abstractor, scope, consequent, true)?;
            expect_type(&consequent_expression, &Type::Int, consequent)?;
            let alternate_expression = abstract_expr(abstractor, scope, alternate, true)?;
            expect_type(&alternate_expression, &Type::Int, alternate)?;

            Ok(Expression::new(
                ExpressionKind::Conditional {
                    test: Box::new(test_expression),
                    consequent: Box::new(consequent_expression),
                    alternate: Box::new(alternate_expression),
                },
                Type::Int,
                result_is_used,
            ))
        }
        ExprNode::FunctionCall { callee, arguments } => {
            let callee = match ExprNode::classify(callee)? {
                ExprNode::Var(name) => lookup(abstractor, scope, name, callee)?,
                _ => {
                    return Err(Error::new(
                        ErrorImpl::NotCallable {
                            received: callee.describe(),
                        },
                        node.describe(),
                    ))
                }
            };
            let return_type = match &callee.ty {
                Type::Function(return_type, _) => return_type.as_ref().clone(),
                _ => {
                    return Err(Error::new(
                        ErrorImpl::NotCallable {
                            received: callee.name.clone(),
                        },
                        node.describe(),
                    ))
                }
            };

            // Argument types are not checked against the parameter types.
            let arguments = arguments
                .into_iter()
                .map(|argument| abstract_expr(abstractor, scope, argument, true))
                .collect::<Result<Vec<Expression>, Error>>()?;

            Ok(Expression::new(
                ExpressionKind::Call { callee, arguments },
                return_type,
                result_is_used,
            ))
        }
        ExprNode::UnaryOp { operator, argument } => {
            let argument_node = argument;
            let argument = abstract_expr(abstractor, scope, argument_node, true)?;
            let unary_operator = match operator {
                "-" => {
                    if !argument.ty.is_numeric() {
                        return Err(Error::new(
                            ErrorImpl::TypeMatchError {
                                expected: String::from("int or double"),
                                received: argument.ty.to_string(),
                            },
                            node.describe(),
                        ));
                    }
                    UnaryOperator::Negate
                }
                "!" => {
                    expect_type(&argument, &Type::Int, argument_node)?;
                    UnaryOperator::LogicalNot
                }
                _ => {
                    return Err(unsupported(
                        format!("unary operator `{}`", operator),
                        node.describe(),
                    ))
                }
            };

            let ty = match unary_operator {
                UnaryOperator::Negate => argument.ty.clone(),
                UnaryOperator::LogicalNot => Type::Int,
            };
            Ok(Expression::new(
                ExpressionKind::Unary {
                    operator: unary_operator,
                    argument: Box::new(argument),
                },
                ty,
                result_is_used,
            ))
        }
        ExprNode::Postupdate { operator, argument } => {
            let postupdate_operator = match operator {
                "++" => PostupdateOperator::Increment,
                "--" => PostupdateOperator::Decrement,
                _ => {
                    return Err(unsupported(
                        format!("postfix operator `{}`", operator),
                        node.describe(),
                    ))
                }
            };
            let target = lvalue(abstractor, scope, argument)?;
            if target.ty != Type::Int {
                return Err(Error::new(
                    ErrorImpl::TypeMatchError {
                        expected: Type::Int.to_string(),
                        received: target.ty.to_string(),
                    },
                    node.describe(),
                ));
            }

            Ok(Expression::new(
                ExpressionKind::Postupdate {
                    operator: postupdate_operator,
                    target,
                },
                Type::Int,
                result_is_used,
            ))
        }
    }
}

fn operand_error(operator: &str, left: &Expression, right: &Expression, node: &Node) -> Error {
    Error::new(
        ErrorImpl::OperandTypeError {
            operator: String::from(operator),
            left: left.ty.to_string(),
            right: right.ty.to_string(),
        },
        node.describe(),
    )
}
