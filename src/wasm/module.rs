use crate::errors::errors::Error;

use super::{
    binary::BinaryWriter,
    instructions::{self, Instruction},
    types::{FunctionType, FUNCTION_TYPE_TAG},
};

pub const MAGIC: &[u8; 4] = b"\0asm";
pub const VERSION: u32 = 1;

pub const TYPE_SECTION: u8 = 1;
pub const FUNCTION_SECTION: u8 = 3;
pub const EXPORT_SECTION: u8 = 7;
pub const CODE_SECTION: u8 = 10;

pub const EXPORT_KIND_FUNCTION: u8 = 0x00;

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub type_index: u32,
    pub body: Vec<Instruction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Export {
    pub name: String,
    pub function_index: u32,
}

/// A wasm module under construction: the type, function and export tables,
/// each in insertion order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WasmModule {
    pub types: Vec<FunctionType>,
    pub functions: Vec<Function>,
    pub exports: Vec<Export>,
}

impl WasmModule {
    pub fn new() -> Self {
        WasmModule::default()
    }

    /// Interns `ty`: a signature equal to an existing entry reuses its index.
    pub fn add_type(&mut self, ty: FunctionType) -> u32 {
        if let Some(index) = self.types.iter().position(|existing| *existing == ty) {
            return index as u32;
        }
        self.types.push(ty);
        (self.types.len() - 1) as u32
    }

    /// Reserves a function index before its body is known.
    pub fn declare_function(&mut self, type_index: u32) -> u32 {
        self.functions.push(Function {
            type_index,
            body: vec![],
        });
        (self.functions.len() - 1) as u32
    }

    pub fn set_body(&mut self, function_index: u32, body: Vec<Instruction>) {
        if let Some(function) = self.functions.get_mut(function_index as usize) {
            function.body = body;
        }
    }

    pub fn add_export(&mut self, name: &str, function_index: u32) {
        self.exports.push(Export {
            name: String::from(name),
            function_index,
        });
    }

    pub fn function_type(&self, function: &Function) -> Option<&FunctionType> {
        self.types.get(function.type_index as usize)
    }

    pub fn as_text(&self) -> Result<String, Error> {
        let mut text = String::from("(module\n");

        for (index, ty) in self.types.iter().enumerate() {
            text.push_str(&format!("  (type (;{};) {})\n", index, ty.as_text()));
        }

        for (index, function) in self.functions.iter().enumerate() {
            text.push_str(&format!("  (func (;{};) (type {})", index, function.type_index));
            if let Some(ty) = self.function_type(function) {
                if !ty.parameters.is_empty() {
                    let parameters = ty
                        .parameters
                        .iter()
                        .map(|parameter| parameter.to_string())
                        .collect::<Vec<String>>();
                    text.push_str(&format!(" (param {})", parameters.join(" ")));
                }
                if let Some(result) = ty.result {
                    text.push_str(&format!(" (result {})", result));
                }
            }
            text.push('\n');
            for instruction in &function.body {
                text.push_str(&format!("    {}\n", instructions::as_text(instruction)?));
            }
            text.push_str("  )\n");
        }

        for export in &self.exports {
            text.push_str(&format!(
                "  (export \"{}\" (func {}))\n",
                export.name, export.function_index
            ));
        }

        text.push_str(")\n");
        Ok(text)
    }

    pub fn as_binary(&self) -> Result<Vec<u8>, Error> {
        let mut writer = BinaryWriter::new();
        writer.raw(MAGIC);
        writer.raw(&VERSION.to_le_bytes());

        let mut types = BinaryWriter::new();
        types.vector(&self.types, |writer, ty| {
            writer.byte(FUNCTION_TYPE_TAG);
            writer.vector(&ty.parameters, |writer, parameter| {
                writer.byte(parameter.as_byte());
                Ok(())
            })?;
            let results = ty.result.iter().copied().collect::<Vec<_>>();
            writer.vector(&results, |writer, result| {
                writer.byte(result.as_byte());
                Ok(())
            })
        })?;
        writer.section(TYPE_SECTION, types)?;

        let mut functions = BinaryWriter::new();
        functions.vector(&self.functions, |writer, function| {
            writer.unsigned(function.type_index);
            Ok(())
        })?;
        writer.section(FUNCTION_SECTION, functions)?;

        let mut exports = BinaryWriter::new();
        exports.vector(&self.exports, |writer, export| {
            writer.name(&export.name)?;
            writer.byte(EXPORT_KIND_FUNCTION);
            writer.unsigned(export.function_index);
            Ok(())
        })?;
        writer.section(EXPORT_SECTION, exports)?;

        let mut code = BinaryWriter::new();
        code.length(self.functions.len())?;
        for function in &self.functions {
            let mut entry = BinaryWriter::new();
            // no locals beyond the parameters
            entry.length(0)?;
            for instruction in &function.body {
                instructions::write_binary(&mut entry, instruction)?;
            }
            instructions::write_binary(&mut entry, &Instruction::End)?;
            code.sized(entry)?;
        }
        writer.section(CODE_SECTION, code)?;

        Ok(writer.bytes)
    }
}
