//! WebAssembly backend.
//!
//! Lowers the semantic tree to a wasm module that can be rendered either in
//! the text format or in the binary format:
//!
//! - `types`: the C to wasm type map and function signatures
//! - `instructions`: the instruction set with its text and opcodes
//! - `binary`: LEB128 and section encoding
//! - `module`: the type, function and export tables
//! - `compiler`: function and expression lowering
//!
//! Only `return` statements are lowered so far.

pub mod binary;
pub mod compiler;
pub mod instructions;
pub mod module;
pub mod types;
