#![allow(clippy::module_inception)]

use crate::{
    abstractor::semantic::Module,
    asm_js::estree::Program,
    errors::errors::{Error, ErrorTip},
    syntax::node::Node,
};

pub mod abstractor;
pub mod asm_js;
pub mod errors;
pub mod macros;
pub mod syntax;
pub mod types;
pub mod wasm;

extern crate regex;

pub use crate::abstractor::abstractor::abstract_module;

/// The artifact `compile` should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    AsmJs,
    WasmText,
    WasmBinary,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    AsmJs(Program),
    WasmText(String),
    WasmBinary(Vec<u8>),
}

/// Compiles the external declarations of one translation unit.
///
/// Abstraction runs first and the selected backend lowers its result; the
/// first error from either aborts the compilation.
pub fn compile(declarations: &[Node], target: Target) -> Result<Output, Error> {
    let (module, _) = abstract_module(declarations)?;
    lower(&module, target)
}

/// Runs the backend selected by `target` on an already abstracted module.
pub fn lower(module: &Module, target: Target) -> Result<Output, Error> {
    match target {
        Target::AsmJs => Ok(Output::AsmJs(asm_js::asm_js::compile_module(module)?)),
        Target::WasmText => Ok(Output::WasmText(
            wasm::compiler::compile_module(module)?.as_text()?,
        )),
        Target::WasmBinary => Ok(Output::WasmBinary(
            wasm::compiler::compile_module(module)?.as_binary()?,
        )),
    }
}

pub fn format_error(error: &Error) -> String {
    /*
        Error: name (tip)
        -> construct
    */

    let mut output = if let ErrorTip::None = error.get_tip() {
        format!("Error: {}", error.get_error_name())
    } else {
        format!("Error: {} ({})", error.get_error_name(), error.get_tip())
    };
    output.push_str(&format!("\n-> {}", error.get_construct()));
    output
}
