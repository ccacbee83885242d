//! ESTree node shapes for the generated JavaScript.
//!
//! The tree serializes with a `"type"` discriminator on every node, which is
//! the JSON an ESTree code generator expects.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Program {
    pub body: Vec<Statement>,
}

impl Program {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Statement {
    ExpressionStatement {
        expression: Expression,
    },
    BlockStatement {
        body: Vec<Statement>,
    },
    ReturnStatement {
        argument: Option<Expression>,
    },
    VariableDeclaration {
        declarations: Vec<VariableDeclarator>,
        kind: String,
    },
    FunctionDeclaration {
        id: Expression,
        params: Vec<Expression>,
        body: Box<Statement>,
    },
    WhileStatement {
        test: Expression,
        body: Box<Statement>,
    },
    DoWhileStatement {
        body: Box<Statement>,
        test: Expression,
    },
    ForStatement {
        init: Option<Expression>,
        test: Option<Expression>,
        update: Option<Expression>,
        body: Box<Statement>,
    },
    IfStatement {
        test: Expression,
        consequent: Box<Statement>,
        alternate: Option<Box<Statement>>,
    },
    BreakStatement,
    ContinueStatement,
    EmptyStatement,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct VariableDeclarator {
    pub id: Expression,
    pub init: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Property {
    pub key: Expression,
    pub value: Expression,
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Integer(i64),
    Float(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Expression {
    Identifier {
        name: String,
    },
    Literal {
        value: LiteralValue,
    },
    BinaryExpression {
        operator: String,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    AssignmentExpression {
        operator: String,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    UnaryExpression {
        operator: String,
        argument: Box<Expression>,
        prefix: bool,
    },
    ConditionalExpression {
        test: Box<Expression>,
        consequent: Box<Expression>,
        alternate: Box<Expression>,
    },
    SequenceExpression {
        expressions: Vec<Expression>,
    },
    CallExpression {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    ObjectExpression {
        properties: Vec<Property>,
    },
}

pub fn identifier(name: &str) -> Expression {
    Expression::Identifier {
        name: String::from(name),
    }
}

pub fn string_literal(value: &str) -> Expression {
    Expression::Literal {
        value: LiteralValue::String(String::from(value)),
    }
}

/// A numeric literal. Negative values become a unary minus applied to the
/// magnitude, as ESTree literals carry no sign.
pub fn integer_literal(value: i64) -> Expression {
    if value < 0 {
        unary("-", Expression::Literal {
            value: LiteralValue::Integer(-value),
        })
    } else {
        Expression::Literal {
            value: LiteralValue::Integer(value),
        }
    }
}

pub fn float_literal(value: f64) -> Expression {
    if value.is_sign_negative() {
        unary("-", Expression::Literal {
            value: LiteralValue::Float(-value),
        })
    } else {
        Expression::Literal {
            value: LiteralValue::Float(value),
        }
    }
}

pub fn binary(operator: &str, left: Expression, right: Expression) -> Expression {
    Expression::BinaryExpression {
        operator: String::from(operator),
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn assignment(left: Expression, right: Expression) -> Expression {
    Expression::AssignmentExpression {
        operator: String::from("="),
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn unary(operator: &str, argument: Expression) -> Expression {
    Expression::UnaryExpression {
        operator: String::from(operator),
        argument: Box::new(argument),
        prefix: true,
    }
}

pub fn conditional(test: Expression, consequent: Expression, alternate: Expression) -> Expression {
    Expression::ConditionalExpression {
        test: Box::new(test),
        consequent: Box::new(consequent),
        alternate: Box::new(alternate),
    }
}

pub fn sequence(expressions: Vec<Expression>) -> Expression {
    Expression::SequenceExpression { expressions }
}

pub fn call(callee: Expression, arguments: Vec<Expression>) -> Expression {
    Expression::CallExpression {
        callee: Box::new(callee),
        arguments,
    }
}

/// `expression | 0`
pub fn or_zero(expression: Expression) -> Expression {
    binary("|", expression, integer_literal(0))
}

pub fn expression_statement(expression: Expression) -> Statement {
    Statement::ExpressionStatement { expression }
}

pub fn block(body: Vec<Statement>) -> Statement {
    Statement::BlockStatement { body }
}

pub fn var_declaration(declarations: Vec<VariableDeclarator>) -> Statement {
    Statement::VariableDeclaration {
        declarations,
        kind: String::from("var"),
    }
}

pub fn function_declaration(name: &str, params: Vec<Expression>, body: Vec<Statement>) -> Statement {
    Statement::FunctionDeclaration {
        id: identifier(name),
        params,
        body: Box::new(block(body)),
    }
}

pub fn property(key: &str, value: &str) -> Property {
    Property {
        key: identifier(key),
        value: identifier(value),
        kind: String::from("init"),
    }
}
