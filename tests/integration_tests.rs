//! Integration tests for end-to-end compilation.
//!
//! These tests drive the complete pipeline from raw syntax trees through
//! abstraction to each of the backends.

use bonsai::{
    abstract_module,
    abstractor::semantic::{Constant, ExpressionKind, Statement},
    asm_js::estree::{self, Program, VariableDeclarator},
    compile,
    errors::errors::ErrorCategory,
    format_error,
    syntax::{builder::*, node::Node},
    types::types::Type,
    Output, Target,
};
use pretty_assertions::assert_eq;

fn asm_js(declarations: &[Node]) -> Program {
    match compile(declarations, Target::AsmJs).unwrap() {
        Output::AsmJs(program) => program,
        other => panic!("Expected asm.js output, got {:?}", other),
    }
}

fn wasm_text(declarations: &[Node]) -> String {
    match compile(declarations, Target::WasmText).unwrap() {
        Output::WasmText(text) => text,
        other => panic!("Expected wasm text, got {:?}", other),
    }
}

/// The asm.js module factory wrapping `functions` and exporting each under
/// its own name.
fn asm_module(functions: Vec<(&str, estree::Statement)>) -> Program {
    let mut body = vec![estree::expression_statement(estree::string_literal(
        "use asm",
    ))];
    let mut exports = vec![];
    for (name, function) in functions {
        body.push(function);
        exports.push(estree::property(name, name));
    }
    body.push(estree::Statement::ReturnStatement {
        argument: Some(estree::Expression::ObjectExpression {
            properties: exports,
        }),
    });

    Program {
        body: vec![estree::function_declaration("Module", vec![], body)],
    }
}

fn annotate(name: &str) -> estree::Statement {
    estree::expression_statement(estree::assignment(
        estree::identifier(name),
        estree::or_zero(estree::identifier(name)),
    ))
}

fn ret(argument: estree::Expression) -> estree::Statement {
    estree::Statement::ReturnStatement {
        argument: Some(argument),
    }
}

fn main_returning_42() -> Vec<Node> {
    vec![function_definition(
        "int",
        "main",
        vec![void_parameter()],
        vec![return_value(constant("42"))],
    )]
}

fn add() -> Node {
    function_definition(
        "int",
        "add",
        vec![
            parameter("int", identifier("a")),
            parameter("int", identifier("b")),
        ],
        vec![return_value(binary("+", var("a"), var("b")))],
    )
}

#[test]
fn test_return_constant_to_asm_js() {
    let program = asm_js(&main_returning_42());

    assert_eq!(
        program,
        asm_module(vec![(
            "main",
            estree::function_declaration("main", vec![], vec![ret(estree::integer_literal(42))])
        )])
    );
}

#[test]
fn test_return_constant_to_wasm_text() {
    assert_eq!(
        wasm_text(&main_returning_42()),
        concat!(
            "(module\n",
            "  (type (;0;) (func (param) (result i32)))\n",
            "  (func (;0;) (type 0) (result i32)\n",
            "    i32.const 42\n",
            "    return\n",
            "  )\n",
            "  (export \"main\" (func 0))\n",
            ")\n"
        )
    );
}

#[test]
fn test_return_constant_to_wasm_binary() {
    let bytes = match compile(&main_returning_42(), Target::WasmBinary).unwrap() {
        Output::WasmBinary(bytes) => bytes,
        other => panic!("Expected wasm binary, got {:?}", other),
    };

    assert_eq!(&bytes[..8], b"\0asm\x01\x00\x00\x00");
    assert_eq!(&bytes[bytes.len() - 4..], &[0x41, 0x2A, 0x0F, 0x0B]);
}

#[test]
fn test_addition_is_coerced() {
    let program = asm_js(&[add()]);

    assert_eq!(
        program,
        asm_module(vec![(
            "add",
            estree::function_declaration(
                "add",
                vec![estree::identifier("a"), estree::identifier("b")],
                vec![
                    annotate("a"),
                    annotate("b"),
                    ret(estree::or_zero(estree::binary(
                        "+",
                        estree::identifier("a"),
                        estree::identifier("b")
                    ))),
                ]
            )
        )])
    );
}

#[test]
fn test_array_is_laid_out_on_heap() {
    let (module, context) = abstract_module(&[function_definition(
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
    .unwrap();

    assert_eq!(context.allocator.heap_size(), 12);
    match &module.declarations[0].body[0] {
        Statement::Declaration(declarations) => {
            assert_eq!(declarations[0].variable.name, "x");
            assert_eq!(declarations[0].variable.ty, Type::pointer(Type::Int));
            assert_eq!(
                declarations[0].initializer.as_ref().unwrap().kind,
                ExpressionKind::Const(Constant::Int(0))
            );
        }
        other => panic!("Expected declaration, got {:?}", other),
    }
}

#[test]
fn test_double_function_in_wasm() {
    let returning_one = function_definition(
        "double",
        "f",
        vec![void_parameter()],
        vec![return_value(constant("1"))],
    );
    let text = wasm_text(&[returning_one]);
    assert!(text.contains("(func (param) (result f64))"));
    assert!(text.contains("    f64.const 1\n    return\n"));

    let with_local = function_definition(
        "double",
        "f",
        vec![void_parameter()],
        vec![
            declare("int", "i", Some(constant("0"))),
            return_value(constant("1")),
        ],
    );
    for target in [Target::WasmText, Target::WasmBinary] {
        let error = compile(&[with_local.clone()], target).unwrap_err();
        assert_eq!(error.get_category(), ErrorCategory::UnsupportedFeature);
    }
}

#[test]
fn test_runtime_array_size() {
    let declarations = [function_definition(
        "int",
        "f",
        vec![parameter("int", identifier("n"))],
        vec![
            declaration(
                "int",
                vec![init_declarator(
                    array_declarator(identifier("x"), var("n")),
                    None,
                )],
            ),
            return_value(constant("0")),
        ],
    )];

    for target in [Target::AsmJs, Target::WasmText, Target::WasmBinary] {
        let error = compile(&declarations, target).unwrap_err();
        assert_eq!(error.get_error_name(), "ExpectedCompileTimeConstant");
        assert_eq!(error.get_category(), ErrorCategory::Type);
    }
}

#[test]
fn test_compilation_is_deterministic() {
    let declarations = vec![
        add(),
        function_definition(
            "int",
            "count",
            vec![parameter("int", identifier("n"))],
            vec![
                declare("int", "total", Some(constant("0"))),
                for_loop(
                    Some(declare("int", "i", Some(constant("0")))),
                    Some(binary("<", var("i"), var("n"))),
                    Some(postupdate("++", var("i"))),
                    expression_statement(assign(var("total"), "+=", call("add", vec![var("i"), constant("1")]))),
                ),
                return_value(var("total")),
            ],
        ),
    ];

    let first = compile(&declarations, Target::AsmJs).unwrap();
    let second = compile(&declarations, Target::AsmJs).unwrap();
    assert_eq!(first, second);

    match (first, second) {
        (Output::AsmJs(first), Output::AsmJs(second)) => {
            assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
        }
        other => panic!("Expected asm.js output, got {:?}", other),
    }

    let wasm = [add()];
    assert_eq!(wasm_text(&wasm), wasm_text(&wasm));
    assert_eq!(
        compile(&wasm, Target::WasmBinary).unwrap(),
        compile(&wasm, Target::WasmBinary).unwrap()
    );
}

#[test]
fn test_shadowed_local_is_renamed() {
    let program = asm_js(&[function_definition(
        "int",
        "f",
        vec![parameter("int", identifier("x"))],
        vec![
            block(vec![declare("int", "x", Some(constant("2")))]),
            return_value(var("x")),
        ],
    )]);

    let expected = estree::function_declaration(
        "f",
        vec![estree::identifier("x")],
        vec![
            annotate("x"),
            estree::var_declaration(vec![VariableDeclarator {
                id: estree::identifier("x_0"),
                init: Some(estree::integer_literal(2)),
            }]),
            estree::block(vec![estree::expression_statement(estree::assignment(
                estree::identifier("x_0"),
                estree::integer_literal(2),
            ))]),
            ret(estree::or_zero(estree::identifier("x"))),
        ],
    );
    assert_eq!(program, asm_module(vec![("f", expected)]));
}

#[test]
fn test_asm_js_json_output() {
    let json = asm_js(&[add()]).to_json().unwrap();

    assert!(json.starts_with(r#"{"type":"Program","body":[{"type":"FunctionDeclaration""#));
    assert!(json.contains(r#"{"type":"Literal","value":"use asm"}"#));
    assert!(json.contains(r#""operator":"|""#));
}

#[test]
fn test_json_input() {
    let json = r#"[{
        "type": "FunctionDefinition",
        "params": [
            {"type": "DeclarationSpecifiers", "params": [[], ["int"]]},
            {"type": "FunctionDeclarator", "params": [
                {"type": "Identifier", "params": ["main"]},
                [{"type": "TypeOnlyParameterDeclaration", "params": [
                    {"type": "DeclarationSpecifiers", "params": [[], ["void"]]}
                ]}]
            ]},
            [],
            {"type": "Block", "params": [[
                {"type": "Return", "params": [{"type": "Const", "params": ["42"]}]}
            ]]}
        ]
    }]"#;

    let declarations = Node::list_from_json(json).unwrap();
    assert_eq!(declarations, main_returning_42());
    assert_eq!(
        compile(&declarations, Target::WasmText).unwrap(),
        compile(&main_returning_42(), Target::WasmText).unwrap()
    );
}

#[test]
fn test_errors_abort_compilation() {
    let declarations = [function_definition(
        "int",
        "f",
        vec![void_parameter()],
        vec![return_value(var("missing"))],
    )];

    let error = compile(&declarations, Target::AsmJs).unwrap_err();
    assert_eq!(error.get_category(), ErrorCategory::UndefinedIdentifier);
    assert_eq!(
        format_error(&error),
        "Error: VariableNotDeclared (Variable `missing` not declared)\n-> Var(missing)"
    );
}
