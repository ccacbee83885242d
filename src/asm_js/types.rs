use std::fmt::Display;

use crate::{
    errors::errors::{Error, ErrorImpl},
    types::types::Type,
};

/// Value types of the asm.js validation lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsmType {
    Fixnum,
    Signed,
    Unsigned,
    Int,
    Intish,
    Extern,
    Double,
    Void,
}

impl Display for AsmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AsmType::Fixnum => "fixnum",
            AsmType::Signed => "signed",
            AsmType::Unsigned => "unsigned",
            AsmType::Int => "int",
            AsmType::Intish => "intish",
            AsmType::Extern => "extern",
            AsmType::Double => "double",
            AsmType::Void => "void",
        };
        write!(f, "{}", name)
    }
}

/// The subtyping relation of the lattice: whether a value of type `source`
/// may be used where `target` is required.
pub fn satisfies(source: AsmType, target: AsmType) -> bool {
    use AsmType::*;

    match source {
        Fixnum => matches!(target, Fixnum | Signed | Unsigned | Extern | Int | Intish),
        Signed => matches!(target, Signed | Extern | Int | Intish),
        Unsigned => matches!(target, Unsigned | Int | Intish),
        Int => matches!(target, Int | Intish),
        Intish => target == Intish,
        Extern => target == Extern,
        Double => matches!(target, Double | Extern),
        Void => target == Void,
    }
}

/// The lattice type a C value of type `ty` is represented as.
pub fn lattice_type_of(ty: &Type) -> Result<AsmType, Error> {
    match ty {
        Type::Int => Ok(AsmType::Signed),
        Type::Double => Ok(AsmType::Double),
        Type::Void => Ok(AsmType::Void),
        Type::Pointer(_) | Type::Function(..) => Err(Error::new(
            ErrorImpl::UnsupportedCoercion {
                from: ty.to_string(),
                to: String::from("an asm.js value type"),
            },
            ty.to_string(),
        )),
    }
}
