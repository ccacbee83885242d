use std::fmt::Display;

use crate::{
    errors::errors::{unsupported, Error},
    types::types::Type,
};

pub const FUNCTION_TYPE_TAG: u8 = 0x60;
pub const EMPTY_BLOCK_TYPE: u8 = 0x40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    I32,
    I64,
    F32,
    F64,
}

impl ValueType {
    pub fn as_byte(&self) -> u8 {
        match self {
            ValueType::I32 => 0x7F,
            ValueType::I64 => 0x7E,
            ValueType::F32 => 0x7D,
            ValueType::F64 => 0x7C,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, ValueType::I32 | ValueType::I64)
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueType::I32 => "i32",
            ValueType::I64 => "i64",
            ValueType::F32 => "f32",
            ValueType::F64 => "f64",
        };
        write!(f, "{}", name)
    }
}

/// A C type as seen by the wasm backend.
#[derive(Debug, Clone, PartialEq)]
pub enum WasmType {
    Void,
    Value(ValueType),
    Function(Box<WasmType>, Vec<WasmType>),
}

impl WasmType {
    /// Pointers are addresses into linear memory and become `i32`.
    pub fn from_c_type(ty: &Type) -> Self {
        match ty {
            Type::Void => WasmType::Void,
            Type::Int | Type::Pointer(_) => WasmType::Value(ValueType::I32),
            Type::Double => WasmType::Value(ValueType::F64),
            Type::Function(return_type, parameter_types) => WasmType::Function(
                Box::new(WasmType::from_c_type(return_type)),
                parameter_types.iter().map(WasmType::from_c_type).collect(),
            ),
        }
    }

    /// The value type a result of this type occupies on the stack, `None`
    /// for `void`.
    pub fn result_type(&self, construct: &str) -> Result<Option<ValueType>, Error> {
        match self {
            WasmType::Void => Ok(None),
            WasmType::Value(value_type) => Ok(Some(*value_type)),
            WasmType::Function(..) => Err(unsupported("function values", construct)),
        }
    }
}

/// An entry of the type section.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub parameters: Vec<ValueType>,
    pub result: Option<ValueType>,
}

impl FunctionType {
    pub fn from_wasm_type(ty: &WasmType, construct: &str) -> Result<Self, Error> {
        match ty {
            WasmType::Function(return_type, parameter_types) => {
                let mut parameters = vec![];
                for parameter in parameter_types {
                    match parameter.result_type(construct)? {
                        Some(value_type) => parameters.push(value_type),
                        None => return Err(unsupported("void parameters", construct)),
                    }
                }
                Ok(FunctionType {
                    parameters,
                    result: return_type.result_type(construct)?,
                })
            }
            _ => Err(unsupported("non-function signatures", construct)),
        }
    }

    pub fn as_text(&self) -> String {
        let mut text = String::from("(func (param");
        for parameter in &self.parameters {
            text.push_str(&format!(" {}", parameter));
        }
        text.push(')');
        if let Some(result) = self.result {
            text.push_str(&format!(" (result {})", result));
        }
        text.push(')');
        text
    }
}
