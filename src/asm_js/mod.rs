//! asm.js backend.
//!
//! Lowers the semantic tree to an ESTree program in the asm.js subset of
//! JavaScript. Every value is placed in the asm.js type lattice and explicit
//! `| 0` coercions are inserted wherever a value does not already satisfy
//! the type its use site requires.

pub mod asm_js;
pub mod context;
pub mod estree;
pub mod expressions;
pub mod types;

#[cfg(test)]
mod tests;
