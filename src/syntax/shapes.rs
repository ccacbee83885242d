//! Shape classification of raw nodes.
//!
//! Each syntactic category (external declaration, statement, expression,
//! declarator, parameter) is a closed enum borrowing from the raw tree.
//! `classify` checks the tag and arity once, so the abstractor can match
//! exhaustively and never has to look at tag strings itself.

use crate::errors::errors::{Error, ErrorImpl};

use super::node::{Node, Param};

fn unexpected(expected: &str, node: &Node) -> Error {
    Error::new(
        ErrorImpl::UnexpectedNode {
            expected: String::from(expected),
            received: node.tag.clone(),
        },
        node.describe(),
    )
}

/// A top-level node of a translation unit.
#[derive(Debug)]
pub enum ExternalNode<'a> {
    FunctionDefinition(FunctionDefinitionNode<'a>),
    Declaration(DeclarationNode<'a>),
}

impl<'a> ExternalNode<'a> {
    pub fn classify(node: &'a Node) -> Result<Self, Error> {
        match node.tag.as_str() {
            "FunctionDefinition" => Ok(ExternalNode::FunctionDefinition(
                FunctionDefinitionNode::classify(node)?,
            )),
            "Declaration" => Ok(ExternalNode::Declaration(DeclarationNode::classify(node)?)),
            _ => Err(unexpected("external declaration", node)),
        }
    }
}

#[derive(Debug)]
pub struct FunctionDefinitionNode<'a> {
    pub specifiers: SpecifiersNode<'a>,
    pub declarator: DeclaratorNode<'a>,
    /// Old-style parameter declarations between the declarator and the body.
    pub declarations: Vec<&'a Node>,
    pub body: Vec<&'a Node>,
    pub node: &'a Node,
}

impl<'a> FunctionDefinitionNode<'a> {
    pub fn classify(node: &'a Node) -> Result<Self, Error> {
        node.expect_arity(4)?;
        let body = node.node(3)?;
        if body.tag != "Block" {
            return Err(unexpected("Block", body));
        }
        body.expect_arity(1)?;

        Ok(FunctionDefinitionNode {
            specifiers: SpecifiersNode::classify(node.node(0)?)?,
            declarator: DeclaratorNode::classify(node.node(1)?)?,
            declarations: node.node_list(2)?,
            body: body.node_list(0)?,
            node,
        })
    }
}

#[derive(Debug)]
pub struct SpecifiersNode<'a> {
    pub storage_classes: Vec<&'a str>,
    pub type_specifiers: Vec<&'a str>,
    pub node: &'a Node,
}

impl<'a> SpecifiersNode<'a> {
    pub fn classify(node: &'a Node) -> Result<Self, Error> {
        if node.tag != "DeclarationSpecifiers" {
            return Err(unexpected("DeclarationSpecifiers", node));
        }
        node.expect_arity(2)?;

        Ok(SpecifiersNode {
            storage_classes: node.token_list(0)?,
            type_specifiers: node.token_list(1)?,
            node,
        })
    }
}

#[derive(Debug)]
pub struct DeclarationNode<'a> {
    pub specifiers: SpecifiersNode<'a>,
    pub init_declarators: Vec<InitDeclaratorNode<'a>>,
    pub node: &'a Node,
}

impl<'a> DeclarationNode<'a> {
    pub fn classify(node: &'a Node) -> Result<Self, Error> {
        node.expect_arity(2)?;

        let mut init_declarators = vec![];
        for init_declarator in node.node_list(1)? {
            if init_declarator.tag != "InitDeclarator" {
                return Err(unexpected("InitDeclarator", init_declarator));
            }
            init_declarator.expect_arity(2)?;
            init_declarators.push(InitDeclaratorNode {
                declarator: DeclaratorNode::classify(init_declarator.node(0)?)?,
                initializer: init_declarator.optional_node(1)?,
                node: init_declarator,
            });
        }

        Ok(DeclarationNode {
            specifiers: SpecifiersNode::classify(node.node(0)?)?,
            init_declarators,
            node,
        })
    }
}

#[derive(Debug)]
pub struct InitDeclaratorNode<'a> {
    pub declarator: DeclaratorNode<'a>,
    pub initializer: Option<&'a Node>,
    pub node: &'a Node,
}

#[derive(Debug)]
pub enum DeclaratorNode<'a> {
    Identifier(&'a str),
    Array {
        sub: Box<DeclaratorNode<'a>>,
        size: &'a Node,
    },
    /// One entry per `*`, each holding that level's type qualifiers.
    Indirect {
        pointers: Vec<Vec<&'a str>>,
        sub: Box<DeclaratorNode<'a>>,
    },
    Function {
        sub: Box<DeclaratorNode<'a>>,
        parameters: Vec<ParameterNode<'a>>,
    },
}

impl<'a> DeclaratorNode<'a> {
    pub fn classify(node: &'a Node) -> Result<Self, Error> {
        match node.tag.as_str() {
            "Identifier" => {
                node.expect_arity(1)?;
                Ok(DeclaratorNode::Identifier(node.token(0)?))
            }
            "ArrayDeclarator" => {
                node.expect_arity(2)?;
                Ok(DeclaratorNode::Array {
                    sub: Box::new(DeclaratorNode::classify(node.node(0)?)?),
                    size: node.node(1)?,
                })
            }
            "IndirectDeclarator" => {
                node.expect_arity(2)?;
                let pointers = node
                    .list(0)?
                    .iter()
                    .map(|pointer| qualifier_tokens(node, pointer))
                    .collect::<Result<Vec<Vec<&str>>, Error>>()?;
                Ok(DeclaratorNode::Indirect {
                    pointers,
                    sub: Box::new(DeclaratorNode::classify(node.node(1)?)?),
                })
            }
            "FunctionDeclarator" => {
                node.expect_arity(2)?;
                let parameters = node
                    .node_list(1)?
                    .into_iter()
                    .map(ParameterNode::classify)
                    .collect::<Result<Vec<ParameterNode>, Error>>()?;
                Ok(DeclaratorNode::Function {
                    sub: Box::new(DeclaratorNode::classify(node.node(0)?)?),
                    parameters,
                })
            }
            _ => Err(unexpected("declarator", node)),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DeclaratorNode::Identifier(name) => format!("Identifier({})", name),
            DeclaratorNode::Array { sub, .. } => format!("ArrayDeclarator({})", sub.describe()),
            DeclaratorNode::Indirect { sub, .. } => {
                format!("IndirectDeclarator({})", sub.describe())
            }
            DeclaratorNode::Function { sub, .. } => {
                format!("FunctionDeclarator({})", sub.describe())
            }
        }
    }
}

fn qualifier_tokens<'a>(node: &'a Node, pointer: &'a Param) -> Result<Vec<&'a str>, Error> {
    match pointer {
        Param::List(qualifiers) => qualifiers
            .iter()
            .map(|qualifier| match qualifier {
                Param::Token(token) => Ok(token.as_str()),
                _ => Err(Error::new(
                    ErrorImpl::UnexpectedParam {
                        tag: node.tag.clone(),
                        index: 0,
                        expected: String::from("a list of qualifier tokens"),
                    },
                    node.describe(),
                )),
            })
            .collect(),
        _ => Err(Error::new(
            ErrorImpl::UnexpectedParam {
                tag: node.tag.clone(),
                index: 0,
                expected: String::from("a list of qualifier lists"),
            },
            node.describe(),
        )),
    }
}

#[derive(Debug)]
pub enum ParameterNode<'a> {
    Typed {
        specifiers: SpecifiersNode<'a>,
        declarator: DeclaratorNode<'a>,
    },
    /// A parameter without a declarator; only `(void)` is accepted later on.
    TypeOnly { specifiers: SpecifiersNode<'a> },
}

impl<'a> ParameterNode<'a> {
    pub fn classify(node: &'a Node) -> Result<Self, Error> {
        match node.tag.as_str() {
            "ParameterDeclaration" => {
                node.expect_arity(2)?;
                Ok(ParameterNode::Typed {
                    specifiers: SpecifiersNode::classify(node.node(0)?)?,
                    declarator: DeclaratorNode::classify(node.node(1)?)?,
                })
            }
            "TypeOnlyParameterDeclaration" => {
                node.expect_arity(1)?;
                Ok(ParameterNode::TypeOnly {
                    specifiers: SpecifiersNode::classify(node.node(0)?)?,
                })
            }
            _ => Err(unexpected("parameter declaration", node)),
        }
    }
}

#[derive(Debug)]
pub enum StmtNode<'a> {
    Block(Vec<&'a Node>),
    Declaration(DeclarationNode<'a>),
    Expression(&'a Node),
    Return(Option<&'a Node>),
    While {
        condition: &'a Node,
        body: &'a Node,
    },
    DoWhile {
        body: &'a Node,
        condition: &'a Node,
    },
    For {
        init: Option<&'a Node>,
        test: Option<&'a Node>,
        update: Option<&'a Node>,
        body: &'a Node,
    },
    If {
        test: &'a Node,
        then_statement: &'a Node,
        else_statement: Option<&'a Node>,
    },
    Break,
    Continue,
    Null,
}

impl<'a> StmtNode<'a> {
    pub fn classify(node: &'a Node) -> Result<Self, Error> {
        match node.tag.as_str() {
            "Block" => {
                node.expect_arity(1)?;
                Ok(StmtNode::Block(node.node_list(0)?))
            }
            "Declaration" => Ok(StmtNode::Declaration(DeclarationNode::classify(node)?)),
            "ExpressionStatement" => {
                node.expect_arity(1)?;
                Ok(StmtNode::Expression(node.node(0)?))
            }
            "Return" => match node.params.len() {
                0 => Ok(StmtNode::Return(None)),
                1 => Ok(StmtNode::Return(node.optional_node(0)?)),
                received => Err(Error::new(
                    ErrorImpl::UnexpectedArity {
                        tag: node.tag.clone(),
                        expected: String::from("0 or 1"),
                        received,
                    },
                    node.describe(),
                )),
            },
            "While" => {
                node.expect_arity(2)?;
                Ok(StmtNode::While {
                    condition: node.node(0)?,
                    body: node.node(1)?,
                })
            }
            "DoWhile" => {
                node.expect_arity(2)?;
                Ok(StmtNode::DoWhile {
                    body: node.node(0)?,
                    condition: node.node(1)?,
                })
            }
            "For" => {
                node.expect_arity(4)?;
                Ok(StmtNode::For {
                    init: node.optional_node(0)?,
                    test: node.optional_node(1)?,
                    update: node.optional_node(2)?,
                    body: node.node(3)?,
                })
            }
            "If" => {
                node.expect_arity(3)?;
                Ok(StmtNode::If {
                    test: node.node(0)?,
                    then_statement: node.node(1)?,
                    else_statement: node.optional_node(2)?,
                })
            }
            "Break" => {
                node.expect_arity(0)?;
                Ok(StmtNode::Break)
            }
            "Continue" => {
                node.expect_arity(0)?;
                Ok(StmtNode::Continue)
            }
            "NullStatement" => {
                node.expect_arity(0)?;
                Ok(StmtNode::Null)
            }
            _ => Err(unexpected("statement", node)),
        }
    }
}

#[derive(Debug)]
pub enum ExprNode<'a> {
    BinaryOp {
        operator: &'a str,
        left: &'a Node,
        right: &'a Node,
    },
    Assign {
        left: &'a Node,
        operator: &'a str,
        right: &'a Node,
    },
    Const(&'a str),
    Var(&'a str),
    FunctionCall {
        callee: &'a Node,
        arguments: Vec<&'a Node>,
    },
    Postupdate {
        operator: &'a str,
        argument: &'a Node,
    },
    UnaryOp {
        operator: &'a str,
        argument: &'a Node,
    },
    Conditional {
        test: &'a Node,
        consequent: &'a Node,
        alternate: &'a Node,
    },
    Sequence {
        left: &'a Node,
        right: &'a Node,
    },
}

impl<'a> ExprNode<'a> {
    pub fn classify(node: &'a Node) -> Result<Self, Error> {
        match node.tag.as_str() {
            "BinaryOp" => {
                node.expect_arity(3)?;
                Ok(ExprNode::BinaryOp {
                    operator: node.token(0)?,
                    left: node.node(1)?,
                    right: node.node(2)?,
                })
            }
            "Assign" => {
                node.expect_arity(3)?;
                Ok(ExprNode::Assign {
                    left: node.node(0)?,
                    operator: node.token(1)?,
                    right: node.node(2)?,
                })
            }
            "Const" => {
                node.expect_arity(1)?;
                Ok(ExprNode::Const(node.token(0)?))
            }
            "Var" => {
                node.expect_arity(1)?;
                Ok(ExprNode::Var(node.token(0)?))
            }
            "FunctionCall" => {
                node.expect_arity(2)?;
                Ok(ExprNode::FunctionCall {
                    callee: node.node(0)?,
                    arguments: node.node_list(1)?,
                })
            }
            "Postupdate" => {
                node.expect_arity(2)?;
                Ok(ExprNode::Postupdate {
                    operator: node.token(0)?,
                    argument: node.node(1)?,
                })
            }
            "UnaryOp" => {
                node.expect_arity(2)?;
                Ok(ExprNode::UnaryOp {
                    operator: node.token(0)?,
                    argument: node.node(1)?,
                })
            }
            "Conditional" => {
                node.expect_arity(3)?;
                Ok(ExprNode::Conditional {
                    test: node.node(0)?,
                    consequent: node.node(1)?,
                    alternate: node.node(2)?,
                })
            }
            "Sequence" => {
                node.expect_arity(2)?;
                Ok(ExprNode::Sequence {
                    left: node.node(0)?,
                    right: node.node(1)?,
                })
            }
            _ => Err(unexpected("expression", node)),
        }
    }
}
