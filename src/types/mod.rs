//! Semantic types and scoping.
//!
//! `types` holds the C-level value types and the `Binding` record every
//! resolved identifier points to. `context` holds the scope arena used while
//! abstracting a module, together with the allocator that numbers bindings
//! and lays out statically sized arrays on the heap.

pub mod context;
pub mod types;

#[cfg(test)]
mod tests;
