//! Raw syntax tree handling.
//!
//! The compiler does not tokenize or parse source text. It consumes the
//! tree produced by an external parser, in which every node carries a tag
//! and a fixed-arity list of params. This module provides:
//!
//! - `node`: the generic `Node`/`Param` values and their JSON form
//! - `shapes`: classification of nodes into closed per-category enums
//! - `builder`: constructors for every shape the compiler understands

pub mod builder;
pub mod node;
pub mod shapes;
