//! Raw syntax tree nodes.
//!
//! These are produced by the external parser: every node has a tag and an
//! ordered list of params whose arity is fixed per tag. The accessors here
//! check the shape of a single param and report a syntax shape error
//! naming the node when it does not match.

use serde::{Deserialize, Serialize};

use crate::errors::errors::{Error, ErrorImpl};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub tag: String,
    pub params: Vec<Param>,
}

/// A single param of a raw node.
///
/// The JSON form is untagged: an object is a node, an array a list, a
/// string a token and `null` an absent optional param.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Param {
    Node(Node),
    List(Vec<Param>),
    Token(String),
    Null,
}

impl From<Node> for Param {
    fn from(node: Node) -> Self {
        Param::Node(node)
    }
}

impl From<Option<Node>> for Param {
    fn from(node: Option<Node>) -> Self {
        match node {
            Some(node) => Param::Node(node),
            None => Param::Null,
        }
    }
}

impl From<&str> for Param {
    fn from(token: &str) -> Self {
        Param::Token(token.to_string())
    }
}

impl From<String> for Param {
    fn from(token: String) -> Self {
        Param::Token(token)
    }
}

impl From<Vec<Node>> for Param {
    fn from(nodes: Vec<Node>) -> Self {
        Param::List(nodes.into_iter().map(Param::Node).collect())
    }
}

impl From<Vec<&str>> for Param {
    fn from(tokens: Vec<&str>) -> Self {
        Param::List(tokens.into_iter().map(Param::from).collect())
    }
}

impl From<Vec<Param>> for Param {
    fn from(params: Vec<Param>) -> Self {
        Param::List(params)
    }
}

impl Node {
    pub fn new(tag: impl Into<String>, params: Vec<Param>) -> Self {
        Node {
            tag: tag.into(),
            params,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads a whole translation unit: a JSON array of top-level nodes.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// A short human readable rendering used in error messages,
    /// e.g. `BinaryOp(+, Var, Const)`.
    pub fn describe(&self) -> String {
        let params = self
            .params
            .iter()
            .map(|param| match param {
                Param::Node(node) => node.tag.clone(),
                Param::List(list) => format!("[{}]", list.len()),
                Param::Token(token) => token.clone(),
                Param::Null => String::from("null"),
            })
            .collect::<Vec<String>>();

        format!("{}({})", self.tag, params.join(", "))
    }

    pub fn expect_arity(&self, expected: usize) -> Result<(), Error> {
        if self.params.len() != expected {
            return Err(Error::new(
                ErrorImpl::UnexpectedArity {
                    tag: self.tag.clone(),
                    expected: expected.to_string(),
                    received: self.params.len(),
                },
                self.describe(),
            ));
        }
        Ok(())
    }

    pub fn param(&self, index: usize) -> Result<&Param, Error> {
        self.params
            .get(index)
            .ok_or_else(|| self.param_error(index, "present"))
    }

    pub fn node(&self, index: usize) -> Result<&Node, Error> {
        match self.param(index)? {
            Param::Node(node) => Ok(node),
            _ => Err(self.param_error(index, "a node")),
        }
    }

    pub fn optional_node(&self, index: usize) -> Result<Option<&Node>, Error> {
        match self.param(index)? {
            Param::Node(node) => Ok(Some(node)),
            Param::Null => Ok(None),
            _ => Err(self.param_error(index, "a node or null")),
        }
    }

    pub fn token(&self, index: usize) -> Result<&str, Error> {
        match self.param(index)? {
            Param::Token(token) => Ok(token),
            _ => Err(self.param_error(index, "a token")),
        }
    }

    pub fn list(&self, index: usize) -> Result<&[Param], Error> {
        match self.param(index)? {
            Param::List(list) => Ok(list),
            _ => Err(self.param_error(index, "a list")),
        }
    }

    pub fn node_list(&self, index: usize) -> Result<Vec<&Node>, Error> {
        self.list(index)?
            .iter()
            .map(|param| match param {
                Param::Node(node) => Ok(node),
                _ => Err(self.param_error(index, "a list of nodes")),
            })
            .collect()
    }

    pub fn token_list(&self, index: usize) -> Result<Vec<&str>, Error> {
        self.list(index)?
            .iter()
            .map(|param| match param {
                Param::Token(token) => Ok(token.as_str()),
                _ => Err(self.param_error(index, "a list of tokens")),
            })
            .collect()
    }

    fn param_error(&self, index: usize, expected: &str) -> Error {
        Error::new(
            ErrorImpl::UnexpectedParam {
                tag: self.tag.clone(),
                index,
                expected: String::from(expected),
            },
            self.describe(),
        )
    }
}
