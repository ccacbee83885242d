use crate::types::types::{Binding, Type};

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub declarations: Vec<FunctionDefinition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub binding: Binding,
    pub return_type: Type,
    pub parameters: Vec<Binding>,
    pub parameter_types: Vec<Type>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub variable: Binding,
    pub initializer: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Block(Vec<Statement>),
    Declaration(Vec<VariableDeclaration>),
    Expression(Expression),
    Return(Option<Expression>),
    While {
        condition: Expression,
        body: Box<Statement>,
    },
    DoWhile {
        body: Box<Statement>,
        condition: Expression,
    },
    For {
        init: Option<Box<Statement>>,
        test: Option<Expression>,
        update: Option<Expression>,
        body: Box<Statement>,
    },
    If {
        test: Expression,
        then_statement: Box<Statement>,
        else_statement: Option<Box<Statement>>,
    },
    Break,
    Continue,
    Null,
}

impl Statement {
    pub fn name(&self) -> &'static str {
        match self {
            Statement::Block(_) => "block statement",
            Statement::Declaration(_) => "declaration statement",
            Statement::Expression(_) => "expression statement",
            Statement::Return(_) => "return statement",
            Statement::While { .. } => "while statement",
            Statement::DoWhile { .. } => "do-while statement",
            Statement::For { .. } => "for statement",
            Statement::If { .. } => "if statement",
            Statement::Break => "break statement",
            Statement::Continue => "continue statement",
            Statement::Null => "null statement",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constant {
    Int(i32),
    Double(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    LessThan,
    GreaterThan,
    LessThanEquals,
    GreaterThanEquals,
    Equals,
    NotEquals,
    LogicalAnd,
}

impl BinaryOperator {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "+" => Some(BinaryOperator::Add),
            "-" => Some(BinaryOperator::Subtract),
            "<" => Some(BinaryOperator::LessThan),
            ">" => Some(BinaryOperator::GreaterThan),
            "<=" => Some(BinaryOperator::LessThanEquals),
            ">=" => Some(BinaryOperator::GreaterThanEquals),
            "==" => Some(BinaryOperator::Equals),
            "!=" => Some(BinaryOperator::NotEquals),
            "&&" => Some(BinaryOperator::LogicalAnd),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::LessThan => "<",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::LessThanEquals => "<=",
            BinaryOperator::GreaterThanEquals => ">=",
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::LogicalAnd => "&&",
        }
    }

    pub fn is_relational(&self) -> bool {
        !matches!(
            self,
            BinaryOperator::Add | BinaryOperator::Subtract | BinaryOperator::LogicalAnd
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOperator {
    Assign,
    AddAssign,
    SubtractAssign,
}

impl AssignmentOperator {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "=" => Some(AssignmentOperator::Assign),
            "+=" => Some(AssignmentOperator::AddAssign),
            "-=" => Some(AssignmentOperator::SubtractAssign),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    LogicalNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostupdateOperator {
    Increment,
    Decrement,
}

/// A typed expression.
///
/// `result_is_used` is false for expressions whose value is discarded (the
/// expression of an expression statement, the left of a comma) so backends
/// can skip materializing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub ty: Type,
    pub result_is_used: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Const(Constant),
    Variable(Binding),
    Assignment {
        target: Binding,
        operator: AssignmentOperator,
        value: Box<Expression>,
    },
    /// `operand_type` is the type both sides are compared or combined at.
    Binary {
        operator: BinaryOperator,
        operand_type: Type,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Conditional {
        test: Box<Expression>,
        consequent: Box<Expression>,
        alternate: Box<Expression>,
    },
    Comma {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Call {
        callee: Binding,
        arguments: Vec<Expression>,
    },
    Unary {
        operator: UnaryOperator,
        argument: Box<Expression>,
    },
    Postupdate {
        operator: PostupdateOperator,
        target: Binding,
    },
}

impl Expression {
    pub fn new(kind: ExpressionKind, ty: Type, result_is_used: bool) -> Self {
        Expression {
            kind,
            ty,
            result_is_used,
        }
    }

    /// The value of this expression if it can be evaluated at compile time:
    /// a constant, or the negation of one.
    pub fn compile_time_constant(&self) -> Option<Constant> {
        match &self.kind {
            ExpressionKind::Const(constant) => Some(*constant),
            ExpressionKind::Unary {
                operator: UnaryOperator::Negate,
                argument,
            } => match argument.compile_time_constant()? {
                Constant::Int(value) => value.checked_neg().map(Constant::Int),
                Constant::Double(value) => Some(Constant::Double(-value)),
            },
            _ => None,
        }
    }
}
