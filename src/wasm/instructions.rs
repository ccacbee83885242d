use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::errors::errors::{unsupported, Error};

use super::{
    binary::BinaryWriter,
    types::{ValueType, EMPTY_BLOCK_TYPE},
};

/// Operations whose opcode depends on the value type they act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericOp {
    Add,
    Sub,
    Mul,
    Div,
    RemS,
    Eq,
    Ne,
    Eqz,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Neg,
    ConvertI32S,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub mnemonic: &'static str,
    pub byte: u8,
}

lazy_static! {
    pub static ref NUMERIC_LOOKUP: HashMap<(NumericOp, ValueType), Opcode> = {
        use NumericOp::*;
        use ValueType::*;

        let entries: &[(NumericOp, ValueType, &'static str, u8)] = &[
            (Eqz, I32, "eqz", 0x45),
            (Eq, I32, "eq", 0x46),
            (Ne, I32, "ne", 0x47),
            (Lt, I32, "lt_s", 0x48),
            (Gt, I32, "gt_s", 0x4A),
            (Le, I32, "le_s", 0x4C),
            (Ge, I32, "ge_s", 0x4E),
            (Eqz, I64, "eqz", 0x50),
            (Eq, I64, "eq", 0x51),
            (Ne, I64, "ne", 0x52),
            (Lt, I64, "lt_s", 0x53),
            (Gt, I64, "gt_s", 0x55),
            (Le, I64, "le_s", 0x57),
            (Ge, I64, "ge_s", 0x59),
            (Eq, F32, "eq", 0x5B),
            (Ne, F32, "ne", 0x5C),
            (Lt, F32, "lt", 0x5D),
            (Gt, F32, "gt", 0x5E),
            (Le, F32, "le", 0x5F),
            (Ge, F32, "ge", 0x60),
            (Eq, F64, "eq", 0x61),
            (Ne, F64, "ne", 0x62),
            (Lt, F64, "lt", 0x63),
            (Gt, F64, "gt", 0x64),
            (Le, F64, "le", 0x65),
            (Ge, F64, "ge", 0x66),
            (Add, I32, "add", 0x6A),
            (Sub, I32, "sub", 0x6B),
            (Mul, I32, "mul", 0x6C),
            (Div, I32, "div_s", 0x6D),
            (RemS, I32, "rem_s", 0x6F),
            (And, I32, "and", 0x71),
            (Add, I64, "add", 0x7C),
            (Sub, I64, "sub", 0x7D),
            (Mul, I64, "mul", 0x7E),
            (Div, I64, "div_s", 0x7F),
            (RemS, I64, "rem_s", 0x81),
            (And, I64, "and", 0x83),
            (Neg, F32, "neg", 0x8C),
            (Add, F32, "add", 0x92),
            (Sub, F32, "sub", 0x93),
            (Mul, F32, "mul", 0x94),
            (Div, F32, "div", 0x95),
            (Neg, F64, "neg", 0x9A),
            (Add, F64, "add", 0xA0),
            (Sub, F64, "sub", 0xA1),
            (Mul, F64, "mul", 0xA2),
            (Div, F64, "div", 0xA3),
            (ConvertI32S, F64, "convert_i32_s", 0xB7),
        ];

        let mut map = HashMap::new();
        for (op, ty, mnemonic, byte) in entries {
            map.insert((*op, *ty), Opcode { mnemonic: *mnemonic, byte: *byte });
        }
        map
    };
}

/// The opcode of `op` at value type `ty`.
pub fn numeric_opcode(op: NumericOp, ty: ValueType) -> Result<Opcode, Error> {
    NUMERIC_LOOKUP
        .get(&(op, ty))
        .copied()
        .ok_or_else(|| unsupported(format!("{:?} on {}", op, ty), "wasm instruction"))
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Unreachable,
    Block(Option<ValueType>),
    Loop(Option<ValueType>),
    If(Option<ValueType>),
    Else,
    End,
    Br(u32),
    BrIf(u32),
    Return,
    Call(u32),
    Drop,
    LocalGet(u32),
    LocalSet(u32),
    LocalTee(u32),
    I32Const(i32),
    I64Const(i64),
    F32Const(f32),
    F64Const(f64),
    Numeric(NumericOp, ValueType),
}

impl Instruction {
    /// A typed instruction, rejected up front if the pairing has no opcode.
    pub fn numeric(op: NumericOp, ty: ValueType) -> Result<Self, Error> {
        numeric_opcode(op, ty)?;
        Ok(Instruction::Numeric(op, ty))
    }
}

fn block_type_text(result: &Option<ValueType>) -> String {
    match result {
        Some(ty) => format!(" (result {})", ty),
        None => String::new(),
    }
}

pub fn as_text(instruction: &Instruction) -> Result<String, Error> {
    let text = match instruction {
        Instruction::Unreachable => String::from("unreachable"),
        Instruction::Block(result) => format!("block{}", block_type_text(result)),
        Instruction::Loop(result) => format!("loop{}", block_type_text(result)),
        Instruction::If(result) => format!("if{}", block_type_text(result)),
        Instruction::Else => String::from("else"),
        Instruction::End => String::from("end"),
        Instruction::Br(depth) => format!("br {}", depth),
        Instruction::BrIf(depth) => format!("br_if {}", depth),
        Instruction::Return => String::from("return"),
        Instruction::Call(index) => format!("call {}", index),
        Instruction::Drop => String::from("drop"),
        Instruction::LocalGet(index) => format!("local.get {}", index),
        Instruction::LocalSet(index) => format!("local.set {}", index),
        Instruction::LocalTee(index) => format!("local.tee {}", index),
        Instruction::I32Const(value) => format!("i32.const {}", value),
        Instruction::I64Const(value) => format!("i64.const {}", value),
        Instruction::F32Const(value) => format!("f32.const {}", value),
        Instruction::F64Const(value) => format!("f64.const {}", value),
        Instruction::Numeric(op, ty) => format!("{}.{}", ty, numeric_opcode(*op, *ty)?.mnemonic),
    };
    Ok(text)
}

fn write_block_type(writer: &mut BinaryWriter, result: &Option<ValueType>) {
    writer.byte(match result {
        Some(ty) => ty.as_byte(),
        None => EMPTY_BLOCK_TYPE,
    });
}

pub fn write_binary(writer: &mut BinaryWriter, instruction: &Instruction) -> Result<(), Error> {
    match instruction {
        Instruction::Unreachable => writer.byte(0x00),
        Instruction::Block(result) => {
            writer.byte(0x02);
            write_block_type(writer, result);
        }
        Instruction::Loop(result) => {
            writer.byte(0x03);
            write_block_type(writer, result);
        }
        Instruction::If(result) => {
            writer.byte(0x04);
            write_block_type(writer, result);
        }
        Instruction::Else => writer.byte(0x05),
        Instruction::End => writer.byte(0x0B),
        Instruction::Br(depth) => {
            writer.byte(0x0C);
            writer.unsigned(*depth);
        }
        Instruction::BrIf(depth) => {
            writer.byte(0x0D);
            writer.unsigned(*depth);
        }
        Instruction::Return => writer.byte(0x0F),
        Instruction::Call(index) => {
            writer.byte(0x10);
            writer.unsigned(*index);
        }
        Instruction::Drop => writer.byte(0x1A),
        Instruction::LocalGet(index) => {
            writer.byte(0x20);
            writer.unsigned(*index);
        }
        Instruction::LocalSet(index) => {
            writer.byte(0x21);
            writer.unsigned(*index);
        }
        Instruction::LocalTee(index) => {
            writer.byte(0x22);
            writer.unsigned(*index);
        }
        Instruction::I32Const(value) => {
            writer.byte(0x41);
            writer.signed(*value);
        }
        Instruction::I64Const(value) => {
            writer.byte(0x42);
            writer.signed64(*value);
        }
        Instruction::F32Const(value) => {
            writer.byte(0x43);
            writer.float32(*value);
        }
        Instruction::F64Const(value) => {
            writer.byte(0x44);
            writer.float64(*value);
        }
        Instruction::Numeric(op, ty) => writer.byte(numeric_opcode(*op, *ty)?.byte),
    }
    Ok(())
}
