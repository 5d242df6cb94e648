//! Field descriptors and the instruction families they select.
//!
//! Every field descriptor maps to one of five computational type tags.
//! Accessor synthesis must pick the load/return opcode family matching the
//! tag; the wrong family produces an unverifiable class.

use crate::error::{Result, WeaverError};
use std::fmt;

/// Computational type of a field, derived from its descriptor.
///
/// `boolean`, `byte`, `char` and `short` share the 32-bit integer family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// `Z`, `B`, `C`, `S`, `I`
    Int,
    /// `J`
    Long,
    /// `F`
    Float,
    /// `D`
    Double,
    /// `L...;` and array descriptors
    Reference,
}

impl TypeTag {
    /// Classify a field descriptor.
    pub fn from_descriptor(descriptor: &str) -> Result<Self> {
        let malformed =
            || WeaverError::ClassFormat(format!("invalid field descriptor {descriptor:?}"));
        let Some(first) = descriptor.as_bytes().first().copied() else {
            return Err(malformed());
        };
        let tag = match first {
            b'Z' | b'B' | b'C' | b'S' | b'I' => TypeTag::Int,
            b'J' => TypeTag::Long,
            b'F' => TypeTag::Float,
            b'D' => TypeTag::Double,
            b'L' => {
                if descriptor.len() < 3 || !descriptor.ends_with(';') {
                    return Err(malformed());
                }
                TypeTag::Reference
            }
            b'[' => {
                if descriptor.len() < 2 {
                    return Err(malformed());
                }
                TypeTag::Reference
            }
            _ => return Err(malformed()),
        };
        if matches!(tag, TypeTag::Int | TypeTag::Long | TypeTag::Float | TypeTag::Double)
            && descriptor.len() != 1
        {
            return Err(malformed());
        }
        Ok(tag)
    }

    /// Operand stack / local variable slots occupied by a value of this type.
    pub fn width(self) -> u16 {
        match self {
            TypeTag::Long | TypeTag::Double => 2,
            _ => 1,
        }
    }

    /// Return opcode for a value of this type (`ireturn` family).
    pub fn return_opcode(self) -> u8 {
        match self {
            TypeTag::Int => 0xAC,       // ireturn
            TypeTag::Long => 0xAD,      // lreturn
            TypeTag::Float => 0xAE,     // freturn
            TypeTag::Double => 0xAF,    // dreturn
            TypeTag::Reference => 0xB0, // areturn
        }
    }

    /// Load opcode for the first method argument (`iload_1` family).
    pub fn load_arg_opcode(self) -> u8 {
        match self {
            TypeTag::Int => 0x1B,       // iload_1
            TypeTag::Long => 0x1F,      // lload_1
            TypeTag::Float => 0x23,     // fload_1
            TypeTag::Double => 0x27,    // dload_1
            TypeTag::Reference => 0x2B, // aload_1
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeTag::Int => "int",
            TypeTag::Long => "long",
            TypeTag::Float => "float",
            TypeTag::Double => "double",
            TypeTag::Reference => "reference",
        };
        f.write_str(name)
    }
}

/// Descriptor of a class from its internal binary name.
pub fn class_descriptor(internal_name: &str) -> String {
    format!("L{internal_name};")
}
