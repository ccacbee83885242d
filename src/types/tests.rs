//! Unit tests for types and scopes.

use pretty_assertions::assert_eq;

use crate::errors::errors::ErrorCategory;
use crate::types::context::{Allocator, Context};
use crate::types::types::Type;

#[test]
fn test_type_display() {
    assert_eq!(Type::Int.to_string(), "int");
    assert_eq!(Type::pointer(Type::pointer(Type::Double)).to_string(), "double**");
    assert_eq!(
        Type::function(Type::Int, vec![Type::Int, Type::Double]).to_string(),
        "int (int, double)"
    );
    assert_eq!(Type::function(Type::Void, vec![]).to_string(), "void ()");
}

#[test]
fn test_type_structural_equality() {
    assert_eq!(
        Type::function(Type::Int, vec![Type::Int]),
        Type::function(Type::Int, vec![Type::Int])
    );
    assert_ne!(
        Type::function(Type::Int, vec![Type::Int]),
        Type::function(Type::Int, vec![Type::Double])
    );
    assert_ne!(Type::pointer(Type::Int), Type::pointer(Type::Double));
}

#[test]
fn test_type_sizes() {
    assert_eq!(Type::Int.size_of(), Some(4));
    assert_eq!(Type::Double.size_of(), Some(8));
    assert_eq!(Type::pointer(Type::Double).size_of(), Some(4));
    assert_eq!(Type::Void.size_of(), None);
}

#[test]
fn test_type_accepts() {
    assert!(Type::Double.accepts(&Type::Int));
    assert!(!Type::Int.accepts(&Type::Double));
    assert!(Type::Int.accepts(&Type::Int));
}

#[test]
fn test_define_assigns_sequential_ids() {
    let mut context = Context::new();
    let root = context.root();

    let a = context.define(root, "a", Type::Int);
    let b = context.define(root, "b", Type::Double);

    assert_eq!(a.id, 0);
    assert_eq!(b.id, 1);
    assert!(a.is_global);
}

#[test]
fn test_shadowing_resolves_to_nearest_scope() {
    let mut context = Context::new();
    let root = context.root();
    let function = context.create_function_context(root, Type::Int);
    let outer = context.define(function, "x", Type::Int);

    let inner_scope = context.create_child_context(function);
    let inner = context.define(inner_scope, "x", Type::Double);

    assert_eq!(context.get(inner_scope, "x"), Some(&inner));
    assert_eq!(context.get(function, "x"), Some(&outer));
    assert!(!inner.is_global);
    assert_eq!(context.get(inner_scope, "y"), None);
}

#[test]
fn test_redefinition_in_same_scope_replaces() {
    let mut context = Context::new();
    let root = context.root();
    context.define(root, "f", Type::Int);
    let second = context.define(root, "f", Type::Double);

    assert_eq!(context.get(root, "f"), Some(&second));
}

#[test]
fn test_return_type_is_inherited() {
    let mut context = Context::new();
    let root = context.root();
    assert_eq!(context.return_type(root), None);

    let function = context.create_function_context(root, Type::Double);
    let block = context.create_child_context(function);
    let nested = context.create_child_context(block);

    assert_eq!(context.return_type(nested), Some(&Type::Double));
}

#[test]
fn test_heap_allocation_only_from_root() {
    let mut context = Context::new();
    let root = context.root();
    let child = context.create_child_context(root);

    assert_eq!(context.allocate_from_heap(root, 12).unwrap(), 0);
    assert_eq!(context.allocate_from_heap(root, 8).unwrap(), 12);

    let error = context.allocate_from_heap(child, 4).unwrap_err();
    assert_eq!(error.get_category(), ErrorCategory::InvalidAllocationContext);
    assert_eq!(context.allocator.heap_size(), 20);
}

#[test]
fn test_allocator_standalone() {
    let mut allocator = Allocator::new();
    assert_eq!(allocator.next_id(), 0);
    assert_eq!(allocator.next_id(), 1);
    assert_eq!(allocator.allocate(0), Some(0));
    assert_eq!(allocator.allocate(3), Some(0));
    assert_eq!(allocator.allocate(1), Some(3));
}

#[test]
fn test_allocation_past_address_space() {
    let mut allocator = Allocator::new();
    assert_eq!(allocator.allocate(u32::MAX - 4), Some(0));
    assert_eq!(allocator.allocate(8), None);
    assert_eq!(allocator.heap_size(), u32::MAX - 4);
    assert_eq!(allocator.allocate(4), Some(u32::MAX - 4));

    let mut context = Context::new();
    let root = context.root();
    context.allocate_from_heap(root, u32::MAX).unwrap();
    let error = context.allocate_from_heap(root, 1).unwrap_err();
    assert_eq!(error.get_category(), ErrorCategory::UnsupportedFeature);
}
