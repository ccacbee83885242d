use std::fmt::Display;

/// Byte sizes of the types that can be stored in heap arrays.
pub const INT_SIZE: u32 = 4;
pub const DOUBLE_SIZE: u32 = 8;
pub const POINTER_SIZE: u32 = 4;

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Void,
    Int,
    Double,
    Pointer(Box<Type>),
    Function(Box<Type>, Vec<Type>),
}

impl Type {
    pub fn pointer(target: Type) -> Self {
        Type::Pointer(Box::new(target))
    }

    pub fn function(return_type: Type, parameter_types: Vec<Type>) -> Self {
        Type::Function(Box::new(return_type), parameter_types)
    }

    pub fn from_specifier(specifier: &str) -> Option<Self> {
        match specifier {
            "void" => Some(Type::Void),
            "int" => Some(Type::Int),
            "double" => Some(Type::Double),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Double)
    }

    /// Byte size of one element of this type, or `None` if it cannot be stored.
    pub fn size_of(&self) -> Option<u32> {
        match self {
            Type::Int => Some(INT_SIZE),
            Type::Double => Some(DOUBLE_SIZE),
            Type::Pointer(_) => Some(POINTER_SIZE),
            Type::Void | Type::Function(..) => None,
        }
    }

    /// Whether a value of type `source` may be stored where `self` is expected.
    /// Only the `int` to `double` promotion is implicit.
    pub fn accepts(&self, source: &Type) -> bool {
        self == source || (*self == Type::Double && *source == Type::Int)
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Int => write!(f, "int"),
            Type::Double => write!(f, "double"),
            Type::Pointer(target) => write!(f, "{}*", target),
            Type::Function(return_type, parameter_types) => {
                let parameters = parameter_types
                    .iter()
                    .map(|ty| ty.to_string())
                    .collect::<Vec<String>>();
                write!(f, "{} ({})", return_type, parameters.join(", "))
            }
        }
    }
}

pub type BindingId = u32;

/// A resolved variable, parameter or function.
///
/// Backends identify bindings by `id` only; names may repeat across scopes.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub ty: Type,
    pub id: BindingId,
    pub is_global: bool,
}
