//! Unit tests for the asm.js backend.

use pretty_assertions::assert_eq;

use crate::abstractor::abstractor::abstract_module;
use crate::asm_js::asm_js::compile_module;
use crate::asm_js::context::{FunctionContext, ModuleContext};
use crate::asm_js::estree::{self, Expression, Program, Statement};
use crate::asm_js::expressions::{coerce, const_expression, wrap_function_call, AsmExpression};
use crate::asm_js::types::{satisfies, AsmType};
use crate::errors::errors::{Error, ErrorCategory};
use crate::syntax::builder::*;
use crate::syntax::node::Node;
use crate::types::types::Type;

fn compile(functions: Vec<Node>) -> Result<Program, Error> {
    let (module, _) = abstract_module(&functions)?;
    compile_module(&module)
}

/// The statements of the `Module` factory.
fn module_body(program: &Program) -> &Vec<Statement> {
    match &program.body[0] {
        Statement::FunctionDeclaration { body, .. } => match body.as_ref() {
            Statement::BlockStatement { body } => body,
            other => panic!("Expected block, got {:?}", other),
        },
        other => panic!("Expected function declaration, got {:?}", other),
    }
}

/// The statements of the `index`th compiled C function.
fn function_body(program: &Program, index: usize) -> Vec<Statement> {
    match &module_body(program)[index + 1] {
        Statement::FunctionDeclaration { body, .. } => match body.as_ref() {
            Statement::BlockStatement { body } => body.clone(),
            other => panic!("Expected block, got {:?}", other),
        },
        other => panic!("Expected function declaration, got {:?}", other),
    }
}

fn int(value: i64) -> Expression {
    estree::integer_literal(value)
}

fn id(name: &str) -> Expression {
    estree::identifier(name)
}

fn ret(argument: Expression) -> Statement {
    Statement::ReturnStatement {
        argument: Some(argument),
    }
}

#[test]
fn test_lattice() {
    use AsmType::*;

    assert!(satisfies(Fixnum, Signed));
    assert!(satisfies(Fixnum, Unsigned));
    assert!(satisfies(Signed, Extern));
    assert!(!satisfies(Signed, Unsigned));
    assert!(!satisfies(Unsigned, Extern));
    assert!(satisfies(Int, Intish));
    assert!(!satisfies(Int, Signed));
    assert!(!satisfies(Intish, Int));
    assert!(satisfies(Double, Extern));
    assert!(!satisfies(Void, Extern));
}

#[test]
fn test_coercion_closure() {
    let intish = AsmExpression::new(estree::binary("+", id("a"), id("b")), AsmType::Intish);
    let coerced = coerce(intish, AsmType::Signed).unwrap();
    assert_eq!(coerced.ty, AsmType::Signed);
    assert_eq!(
        coerced.tree,
        estree::or_zero(estree::binary("+", id("a"), id("b")))
    );

    let signed = AsmExpression::new(id("s"), AsmType::Signed);
    assert_eq!(coerce(signed, AsmType::Signed).unwrap().tree, id("s"));

    let literal = const_expression(7).unwrap();
    assert_eq!(coerce(literal, AsmType::Signed).unwrap().tree, int(7));
}

#[test]
fn test_unsupported_coercion() {
    let double = AsmExpression::new(id("d"), AsmType::Double);
    let error = coerce(double, AsmType::Signed).unwrap_err();
    assert_eq!(error.get_category(), ErrorCategory::UnsupportedCoercion);

    let intish = AsmExpression::new(id("x"), AsmType::Intish);
    let error = coerce(intish, AsmType::Int).unwrap_err();
    assert_eq!(error.get_category(), ErrorCategory::UnsupportedCoercion);
}

#[test]
fn test_wrap_function_call() {
    let mut call = AsmExpression::new(estree::call(id("f"), vec![]), AsmType::Signed);
    call.is_function_call = true;

    let wrapped = wrap_function_call(call.clone()).unwrap();
    assert_eq!(wrapped.tree, estree::or_zero(call.tree.clone()));
    assert!(!wrapped.is_function_call);

    let mut void_call = call;
    void_call.ty = AsmType::Void;
    assert!(wrap_function_call(void_call).is_err());
}

#[test]
fn test_const_expression_types() {
    assert_eq!(const_expression(0).unwrap().ty, AsmType::Fixnum);
    assert_eq!(const_expression(2147483647).unwrap().ty, AsmType::Fixnum);
    assert_eq!(const_expression(-1).unwrap().ty, AsmType::Signed);
    assert_eq!(
        const_expression(-5).unwrap().tree,
        estree::unary("-", int(5))
    );
    assert!(const_expression(2147483648).is_err());
}

#[test]
fn test_name_allocation_suffixes() {
    let mut module = ModuleContext::new();
    let function = module.declare_function(&crate::types::types::Binding {
        name: String::from("x"),
        ty: Type::function(Type::Int, vec![]),
        id: 0,
        is_global: true,
    });
    assert_eq!(function.name, "x");

    let mut context = FunctionContext::new(&module, Type::Int);
    let first = context.allocate_variable("x", AsmType::Int, Type::Int, Some(1));
    let second = context.allocate_variable("x", AsmType::Int, Type::Int, Some(2));
    let third = context.allocate_variable("x", AsmType::Int, Type::Int, None);

    assert_eq!(first.name, "x_0");
    assert_eq!(second.name, "x_1");
    assert_eq!(third.name, "x_2");
    assert_eq!(context.get(2).unwrap().name, "x_1");
    assert_eq!(context.get(0).unwrap().name, "x");
}

#[test]
fn test_return_literal_is_bare() {
    let program = compile(vec![function_definition(
        "int",
        "main",
        vec![void_parameter()],
        vec![return_value(constant("42"))],
    )])
    .unwrap();

    let body = module_body(&program);
    assert_eq!(
        body[0],
        estree::expression_statement(estree::string_literal("use asm"))
    );
    assert_eq!(
        body[1],
        estree::function_declaration("main", vec![], vec![ret(int(42))])
    );
    assert_eq!(
        body[2],
        ret(Expression::ObjectExpression {
            properties: vec![estree::property("main", "main")]
        })
    );
    match &program.body[0] {
        Statement::FunctionDeclaration { id: name, params, .. } => {
            assert_eq!(name, &id("Module"));
            assert!(params.is_empty());
        }
        other => panic!("Expected Module factory, got {:?}", other),
    }
}

#[test]
fn test_parameters_annotated_and_sum_coerced() {
    let program = compile(vec![function_definition(
        "int",
        "add",
        vec![
            parameter("int", identifier("a")),
            parameter("int", identifier("b")),
        ],
        vec![return_value(binary("+", var("a"), var("b")))],
    )])
    .unwrap();

    assert_eq!(
        function_body(&program, 0),
        vec![
            estree::expression_statement(estree::assignment(id("a"), estree::or_zero(id("a")))),
            estree::expression_statement(estree::assignment(id("b"), estree::or_zero(id("b")))),
            ret(estree::or_zero(estree::binary("+", id("a"), id("b")))),
        ]
    );
}

#[test]
fn test_declarations_are_hoisted() {
    let program = compile(vec![function_definition(
        "int",
        "f",
        vec![parameter("int", identifier("n"))],
        vec![
            declaration(
                "int",
                vec![
                    init_declarator(identifier("a"), Some(constant("5"))),
                    init_declarator(identifier("b"), Some(binary("+", var("n"), constant("1")))),
                    init_declarator(identifier("c"), None),
                    init_declarator(identifier("d"), Some(unary("-", constant("3")))),
                ],
            ),
            return_value(var("b")),
        ],
    )])
    .unwrap();

    let declarator = |name: &str, value: i64| estree::VariableDeclarator {
        id: id(name),
        init: Some(int(value)),
    };

    assert_eq!(
        function_body(&program, 0),
        vec![
            estree::expression_statement(estree::assignment(id("n"), estree::or_zero(id("n")))),
            estree::var_declaration(vec![
                declarator("a", 5),
                declarator("b", 0),
                declarator("c", 0),
                declarator("d", -3),
            ]),
            estree::expression_statement(estree::assignment(id("a"), int(5))),
            estree::expression_statement(estree::assignment(
                id("b"),
                estree::or_zero(estree::binary("+", id("n"), int(1)))
            )),
            estree::expression_statement(estree::assignment(id("d"), int(-3))),
            ret(estree::or_zero(id("b"))),
        ]
    );
}

#[test]
fn test_shadowed_locals_get_distinct_names() {
    let program = compile(vec![function_definition(
        "int",
        "f",
        vec![],
        vec![
            declare("int", "x", Some(constant("1"))),
            block(vec![
                declare("int", "x", Some(constant("2"))),
                expression_statement(assign(var("x"), "=", constant("3"))),
            ]),
            return_value(var("x")),
        ],
    )])
    .unwrap();

    let body = function_body(&program, 0);
    assert_eq!(
        body[1],
        estree::expression_statement(estree::assignment(id("x"), int(1)))
    );
    assert_eq!(
        body[2],
        estree::block(vec![
            estree::expression_statement(estree::assignment(id("x_0"), int(2))),
            estree::expression_statement(estree::assignment(id("x_0"), int(3))),
        ])
    );
    assert_eq!(body[3], ret(estree::or_zero(id("x"))));
}

#[test]
fn test_postupdate_lowering() {
    let program = compile(vec![function_definition(
        "int",
        "f",
        vec![parameter("int", identifier("i"))],
        vec![
            expression_statement(postupdate("++", var("i"))),
            return_value(postupdate("--", var("i"))),
        ],
    )])
    .unwrap();

    let body = function_body(&program, 0);
    assert_eq!(
        body[1],
        estree::var_declaration(vec![estree::VariableDeclarator {
            id: id("temp"),
            init: Some(int(0)),
        }])
    );
    assert_eq!(
        body[2],
        estree::expression_statement(estree::assignment(
            id("i"),
            estree::or_zero(estree::binary("+", id("i"), int(1)))
        ))
    );
    assert_eq!(
        body[3],
        ret(estree::or_zero(estree::sequence(vec![
            estree::assignment(
                id("i"),
                estree::or_zero(estree::binary(
                    "-",
                    estree::assignment(id("temp"), id("i")),
                    int(1)
                ))
            ),
            id("temp"),
        ])))
    );
}

#[test]
fn test_logical_and_and_calls() {
    let program = compile(vec![
        function_definition(
            "int",
            "g",
            vec![parameter("int", identifier("x"))],
            vec![return_value(var("x"))],
        ),
        function_definition(
            "int",
            "f",
            vec![parameter("int", identifier("a"))],
            vec![return_value(binary(
                "&&",
                var("a"),
                call("g", vec![binary("+", var("a"), constant("1"))]),
            ))],
        ),
    ])
    .unwrap();

    let call = estree::call(
        id("g"),
        vec![estree::or_zero(estree::binary("+", id("a"), int(1)))],
    );
    let body = function_body(&program, 1);
    assert_eq!(
        body[1],
        ret(estree::or_zero(estree::conditional(
            estree::or_zero(id("a")),
            estree::binary("!=", estree::or_zero(call), int(0)),
            int(0)
        )))
    );
}

#[test]
fn test_call_argument_count_mismatch() {
    let error = compile(vec![
        function_definition(
            "int",
            "g",
            vec![void_parameter()],
            vec![return_value(constant("7"))],
        ),
        function_definition(
            "int",
            "main",
            vec![void_parameter()],
            vec![return_value(call("g", vec![constant("1")]))],
        ),
    ])
    .unwrap_err();

    assert_eq!(error.get_category(), ErrorCategory::UnsupportedFeature);
    assert_eq!(error.get_construct(), "g");
}

#[test]
fn test_control_flow() {
    let program = compile(vec![function_definition(
        "int",
        "f",
        vec![parameter("int", identifier("n"))],
        vec![
            declare("int", "s", Some(constant("0"))),
            for_loop(
                Some(declare("int", "i", Some(constant("0")))),
                Some(binary("<", var("i"), var("n"))),
                Some(postupdate("++", var("i"))),
                expression_statement(assign(var("s"), "+=", var("i"))),
            ),
            while_loop(
                constant("0"),
                if_statement(var("s"), break_statement(), Some(continue_statement())),
            ),
            return_value(var("s")),
        ],
    )])
    .unwrap();

    let body = function_body(&program, 0);
    assert_eq!(
        body[2],
        estree::expression_statement(estree::assignment(id("s"), int(0)))
    );
    assert_eq!(
        body[3],
        Statement::ForStatement {
            init: Some(estree::assignment(id("i"), int(0))),
            test: Some(estree::binary(
                "<",
                estree::or_zero(id("i")),
                estree::or_zero(id("n"))
            )),
            update: Some(estree::assignment(
                id("i"),
                estree::or_zero(estree::binary("+", id("i"), int(1)))
            )),
            body: Box::new(estree::expression_statement(estree::assignment(
                id("s"),
                estree::or_zero(estree::binary("+", id("s"), id("i")))
            ))),
        }
    );
    assert_eq!(
        body[4],
        Statement::WhileStatement {
            test: int(0),
            body: Box::new(Statement::IfStatement {
                test: estree::or_zero(id("s")),
                consequent: Box::new(Statement::BreakStatement),
                alternate: Some(Box::new(Statement::ContinueStatement)),
            }),
        }
    );
}

#[test]
fn test_loop_locals_are_reinitialized() {
    let program = compile(vec![function_definition(
        "int",
        "f",
        vec![parameter("int", identifier("n"))],
        vec![
            declare("int", "s", Some(constant("0"))),
            while_loop(
                var("n"),
                block(vec![
                    declare("int", "i", Some(constant("5"))),
                    expression_statement(assign(var("s"), "+=", var("i"))),
                    expression_statement(assign(var("i"), "=", constant("0"))),
                    expression_statement(assign(var("n"), "-=", constant("1"))),
                ]),
            ),
            return_value(var("s")),
        ],
    )])
    .unwrap();

    let body = function_body(&program, 0);
    assert_eq!(
        body[1],
        estree::var_declaration(vec![
            estree::VariableDeclarator {
                id: id("s"),
                init: Some(int(0)),
            },
            estree::VariableDeclarator {
                id: id("i"),
                init: Some(int(5)),
            },
        ])
    );
    match &body[3] {
        Statement::WhileStatement { body, .. } => match body.as_ref() {
            Statement::BlockStatement { body } => assert_eq!(
                body[0],
                estree::expression_statement(estree::assignment(id("i"), int(5)))
            ),
            other => panic!("Expected block, got {:?}", other),
        },
        other => panic!("Expected while, got {:?}", other),
    }
}

#[test]
fn test_double_locals_unsupported() {
    let error = compile(vec![function_definition(
        "int",
        "f",
        vec![],
        vec![declare("double", "d", None), return_value(constant("0"))],
    )])
    .unwrap_err();

    assert_eq!(error.get_category(), ErrorCategory::UnsupportedFeature);
}

#[test]
fn test_array_locals_unsupported() {
    let error = compile(vec![function_definition(
        "int",
        "f",
        vec![void_parameter()],
        vec![
            declaration(
                "int",
                vec![init_declarator(
                    array_declarator(identifier("x"), constant("3")),
                    None,
                )],
            ),
            return_value(constant("0")),
        ],
    )])
    .unwrap_err();

    assert_eq!(error.get_category(), ErrorCategory::UnsupportedFeature);
}

#[test]
fn test_double_return_unsupported() {
    let error = compile(vec![function_definition(
        "double",
        "f",
        vec![],
        vec![return_value(constant("1"))],
    )])
    .unwrap_err();

    assert_eq!(error.get_category(), ErrorCategory::UnsupportedCoercion);
}

#[test]
fn test_void_function() {
    let program = compile(vec![function_definition(
        "void",
        "f",
        vec![],
        vec![return_void()],
    )])
    .unwrap();

    assert_eq!(
        function_body(&program, 0),
        vec![Statement::ReturnStatement { argument: None }]
    );
}

#[test]
fn test_serializes_to_estree_json() {
    let program = compile(vec![function_definition(
        "int",
        "main",
        vec![],
        vec![return_value(constant("42"))],
    )])
    .unwrap();

    let json: serde_json::Value = serde_json::from_str(&program.to_json().unwrap()).unwrap();
    assert_eq!(json["type"], "Program");
    let factory = &json["body"][0];
    assert_eq!(factory["type"], "FunctionDeclaration");
    assert_eq!(factory["id"]["name"], "Module");
    assert_eq!(factory["body"]["type"], "BlockStatement");
    assert_eq!(factory["body"]["body"][0]["expression"]["value"], "use asm");

    let main = &factory["body"]["body"][1];
    assert_eq!(main["body"]["body"][0]["type"], "ReturnStatement");
    assert_eq!(main["body"]["body"][0]["argument"]["value"], 42);

    let exports = &factory["body"]["body"][2]["argument"];
    assert_eq!(exports["type"], "ObjectExpression");
    assert_eq!(exports["properties"][0]["type"], "Property");
    assert_eq!(exports["properties"][0]["kind"], "init");
}
