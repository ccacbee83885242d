//! Semantic abstraction of the raw syntax tree.
//!
//! This module walks the raw tree once and produces the typed semantic tree
//! consumed by the backends. While doing so it:
//!
//! - Resolves declaration specifiers and declarators to types
//! - Resolves every identifier to a binding in the scope arena
//! - Lays out statically sized arrays on the heap and decays them to pointers
//! - Checks operator, assignment and return typing
//!
//! The first violation aborts abstraction; no partial tree is returned.

pub mod abstractor;
pub mod semantic;
