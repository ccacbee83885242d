//! Constructors for raw tree shapes.
//!
//! These assemble the same nodes the external parser would emit, so tests
//! and embedders can build programs without going through source text.

use super::node::{Node, Param};
use crate::MK_NODE;

pub fn specifiers(type_specifier: &str) -> Node {
    MK_NODE!("DeclarationSpecifiers", Vec::<&str>::new(), vec![type_specifier])
}

pub fn identifier(name: &str) -> Node {
    MK_NODE!("Identifier", name)
}

pub fn array_declarator(sub: Node, size: Node) -> Node {
    MK_NODE!("ArrayDeclarator", sub, size)
}

/// A declarator with one `*` per entry of `pointers`, each entry holding that
/// level's qualifier tokens.
pub fn indirect_declarator(pointers: Vec<Vec<&str>>, sub: Node) -> Node {
    let pointers = pointers.into_iter().map(Param::from).collect::<Vec<Param>>();
    MK_NODE!("IndirectDeclarator", pointers, sub)
}

/// Shorthand for a single unqualified `*`.
pub fn pointer_to(sub: Node) -> Node {
    indirect_declarator(vec![vec![]], sub)
}

pub fn function_declarator(name: &str, parameters: Vec<Node>) -> Node {
    MK_NODE!("FunctionDeclarator", identifier(name), parameters)
}

pub fn parameter(type_specifier: &str, declarator: Node) -> Node {
    MK_NODE!("ParameterDeclaration", specifiers(type_specifier), declarator)
}

/// The `(void)` parameter list entry.
pub fn void_parameter() -> Node {
    MK_NODE!("TypeOnlyParameterDeclaration", specifiers("void"))
}

pub fn function_definition(
    return_type: &str,
    name: &str,
    parameters: Vec<Node>,
    body: Vec<Node>,
) -> Node {
    MK_NODE!(
        "FunctionDefinition",
        specifiers(return_type),
        function_declarator(name, parameters),
        Vec::<Node>::new(),
        block(body)
    )
}

pub fn declaration(type_specifier: &str, init_declarators: Vec<Node>) -> Node {
    MK_NODE!("Declaration", specifiers(type_specifier), init_declarators)
}

pub fn init_declarator(declarator: Node, initializer: Option<Node>) -> Node {
    MK_NODE!("InitDeclarator", declarator, initializer)
}

/// `type name = initializer;` or `type name;`
pub fn declare(type_specifier: &str, name: &str, initializer: Option<Node>) -> Node {
    declaration(
        type_specifier,
        vec![init_declarator(identifier(name), initializer)],
    )
}

pub fn block(statements: Vec<Node>) -> Node {
    MK_NODE!("Block", statements)
}

pub fn expression_statement(expression: Node) -> Node {
    MK_NODE!("ExpressionStatement", expression)
}

pub fn return_value(expression: Node) -> Node {
    MK_NODE!("Return", expression)
}

pub fn return_void() -> Node {
    MK_NODE!("Return")
}

pub fn while_loop(condition: Node, body: Node) -> Node {
    MK_NODE!("While", condition, body)
}

pub fn do_while(body: Node, condition: Node) -> Node {
    MK_NODE!("DoWhile", body, condition)
}

pub fn for_loop(
    init: Option<Node>,
    test: Option<Node>,
    update: Option<Node>,
    body: Node,
) -> Node {
    MK_NODE!("For", init, test, update, body)
}

pub fn if_statement(test: Node, then_statement: Node, else_statement: Option<Node>) -> Node {
    MK_NODE!("If", test, then_statement, else_statement)
}

pub fn break_statement() -> Node {
    MK_NODE!("Break")
}

pub fn continue_statement() -> Node {
    MK_NODE!("Continue")
}

pub fn null_statement() -> Node {
    MK_NODE!("NullStatement")
}

pub fn binary(operator: &str, left: Node, right: Node) -> Node {
    MK_NODE!("BinaryOp", operator, left, right)
}

pub fn assign(left: Node, operator: &str, right: Node) -> Node {
    MK_NODE!("Assign", left, operator, right)
}

pub fn constant(token: &str) -> Node {
    MK_NODE!("Const", token)
}

pub fn var(name: &str) -> Node {
    MK_NODE!("Var", name)
}

pub fn call(callee: &str, arguments: Vec<Node>) -> Node {
    MK_NODE!("FunctionCall", var(callee), arguments)
}

pub fn postupdate(operator: &str, argument: Node) -> Node {
    MK_NODE!("Postupdate", operator, argument)
}

pub fn unary(operator: &str, argument: Node) -> Node {
    MK_NODE!("UnaryOp", operator, argument)
}

pub fn conditional(test: Node, consequent: Node, alternate: Node) -> Node {
    MK_NODE!("Conditional", test, consequent, alternate)
}

pub fn sequence(left: Node, right: Node) -> Node {
    MK_NODE!("Sequence", left, right)
}
