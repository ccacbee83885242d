use std::fmt::Display;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    construct: String,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, construct: impl Into<String>) -> Self {
        Error {
            internal_error: error_impl,
            construct: construct.into(),
        }
    }

    pub fn get_construct(&self) -> &str {
        &self.construct
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_category(&self) -> ErrorCategory {
        match &self.internal_error {
            ErrorImpl::UnexpectedNode { .. }
            | ErrorImpl::UnexpectedArity { .. }
            | ErrorImpl::UnexpectedParam { .. } => ErrorCategory::SyntaxShape,
            ErrorImpl::UnsupportedFeature { .. } => ErrorCategory::UnsupportedFeature,
            ErrorImpl::TypeMatchError { .. }
            | ErrorImpl::OperandTypeError { .. }
            | ErrorImpl::NotAssignable
            | ErrorImpl::NotCallable { .. }
            | ErrorImpl::NumberParseError { .. }
            | ErrorImpl::ExpectedCompileTimeConstant
            | ErrorImpl::NegativeArraySize { .. } => ErrorCategory::Type,
            ErrorImpl::VariableNotDeclared { .. } => ErrorCategory::UndefinedIdentifier,
            ErrorImpl::InvalidAllocationContext => ErrorCategory::InvalidAllocationContext,
            ErrorImpl::UnsupportedCoercion { .. } => ErrorCategory::UnsupportedCoercion,
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnexpectedNode { .. } => "UnexpectedNode",
            ErrorImpl::UnexpectedArity { .. } => "UnexpectedArity",
            ErrorImpl::UnexpectedParam { .. } => "UnexpectedParam",
            ErrorImpl::UnsupportedFeature { .. } => "UnsupportedFeature",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::OperandTypeError { .. } => "OperandTypeError",
            ErrorImpl::NotAssignable => "NotAssignable",
            ErrorImpl::NotCallable { .. } => "NotCallable",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::ExpectedCompileTimeConstant => "ExpectedCompileTimeConstant",
            ErrorImpl::NegativeArraySize { .. } => "NegativeArraySize",
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::InvalidAllocationContext => "InvalidAllocationContext",
            ErrorImpl::UnsupportedCoercion { .. } => "UnsupportedCoercion",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnexpectedNode { expected, received } => ErrorTip::Suggestion(format!(
                "Expected {} node, received `{}`",
                expected, received
            )),
            ErrorImpl::UnexpectedArity { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedParam { .. } => ErrorTip::None,
            ErrorImpl::UnsupportedFeature { feature } => ErrorTip::Suggestion(format!(
                "{} is recognised, but has not yet been implemented",
                feature
            )),
            ErrorImpl::TypeMatchError { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::OperandTypeError {
                operator,
                left,
                right,
            } => ErrorTip::Suggestion(format!(
                "Operator `{}` cannot be applied to `{}` and `{}`",
                operator, left, right
            )),
            ErrorImpl::NotAssignable => ErrorTip::Suggestion(String::from(
                "Only variables can appear on the left of an assignment",
            )),
            ErrorImpl::NotCallable { received } => {
                ErrorTip::Suggestion(format!("`{}` is not a function", received))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::ExpectedCompileTimeConstant => ErrorTip::Suggestion(String::from(
                "Array sizes must be integer constants",
            )),
            ErrorImpl::NegativeArraySize { size } => {
                ErrorTip::Suggestion(format!("Array size `{}` is negative", size))
            }
            ErrorImpl::VariableNotDeclared { variable } => {
                ErrorTip::Suggestion(format!("Variable `{}` not declared", variable))
            }
            ErrorImpl::InvalidAllocationContext => ErrorTip::Suggestion(String::from(
                "Heap storage can only be allocated from the root scope",
            )),
            ErrorImpl::UnsupportedCoercion { from, to } => ErrorTip::Suggestion(format!(
                "No coercion from `{}` to `{}` is defined",
                from, to
            )),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} (in {})", self.get_error_name(), self.internal_error, self.construct)
    }
}

impl std::error::Error for Error {}

/// The fatal failure classes a compilation can end with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    SyntaxShape,
    UnsupportedFeature,
    Type,
    UndefinedIdentifier,
    InvalidAllocationContext,
    UnsupportedCoercion,
}

impl Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorCategory::SyntaxShape => "SyntaxShapeError",
            ErrorCategory::UnsupportedFeature => "UnsupportedFeatureError",
            ErrorCategory::Type => "TypeError",
            ErrorCategory::UndefinedIdentifier => "UndefinedIdentifierError",
            ErrorCategory::InvalidAllocationContext => "InvalidAllocationContext",
            ErrorCategory::UnsupportedCoercion => "UnsupportedCoercion",
        };
        write!(f, "{}", name)
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("expected {expected} node, received {received:?}")]
    UnexpectedNode { expected: String, received: String },
    #[error("node {tag:?} expects {expected} params, received {received}")]
    UnexpectedArity {
        tag: String,
        expected: String,
        received: usize,
    },
    #[error("param {index} of {tag:?} should be {expected}")]
    UnexpectedParam {
        tag: String,
        index: usize,
        expected: String,
    },
    #[error("{feature} is not supported")]
    UnsupportedFeature { feature: String },
    #[error("types do not match: expected {expected:?}, received {received:?}")]
    TypeMatchError { expected: String, received: String },
    #[error("operator {operator:?} cannot be applied to {left:?} and {right:?}")]
    OperandTypeError {
        operator: String,
        left: String,
        right: String,
    },
    #[error("left hand side of an assignment must be a variable")]
    NotAssignable,
    #[error("{received:?} is not callable")]
    NotCallable { received: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("expected a compile-time constant int")]
    ExpectedCompileTimeConstant,
    #[error("array size {size} is negative")]
    NegativeArraySize { size: i64 },
    #[error("variable {variable:?} not declared")]
    VariableNotDeclared { variable: String },
    #[error("heap allocation requested outside the root scope")]
    InvalidAllocationContext,
    #[error("cannot coerce {from} to {to}")]
    UnsupportedCoercion { from: String, to: String },
}

/// Shorthand for the `UnsupportedFeature` error used across the backends.
pub fn unsupported(feature: impl Into<String>, construct: impl Into<String>) -> Error {
    Error::new(
        ErrorImpl::UnsupportedFeature {
            feature: feature.into(),
        },
        construct,
    )
}
