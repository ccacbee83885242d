//! Utility macros for the compiler.
//!
//! This module defines helper macros used throughout the compiler:
//!
//! - `MK_NODE!` - Creates a raw syntax tree Node
//!
//! These macros reduce boilerplate when assembling raw trees by hand.

/// Creates a raw syntax tree Node.
///
/// # Arguments
///
/// * `$tag` - The node's tag
/// * `$param` - Any number of params, each converted with `Param::from`
///
/// # Example
///
/// ```ignore
/// let node = MK_NODE!("BinaryOp", "+", MK_NODE!("Var", "a"), MK_NODE!("Const", "1"));
/// ```
#[macro_export]
macro_rules! MK_NODE {
    ($tag:expr $(, $param:expr)* $(,)?) => {
        $crate::syntax::node::Node::new(
            $tag,
            vec![$($crate::syntax::node::Param::from($param)),*],
        )
    };
}
