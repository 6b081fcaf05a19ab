//! Dynamic type categories reported by the engine.
//!
//! # Design
//!
//! The engine exposes its dynamic typing as small integer codes. `TypeTag`
//! models them as a closed enum instead of passing raw integers around:
//! - `TypeTag::from_code` canonicalizes any integer; unknown codes become `None`
//! - equality works against both `TypeTag` and raw codes
//! - `name()` gives the engine's own spelling for diagnostics
//!
//! A new engine type code has to be added here explicitly.

use std::fmt;

/// Dynamic type of a stack slot.
///
/// Discriminants are the Lua 5.4 `LUA_T*` codes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[repr(i32)]
pub enum TypeTag {
    /// No value: the index names no slot.
    #[default]
    None = -1,
    Nil = 0,
    Boolean = 1,
    LightUserdata = 2,
    Number = 3,
    String = 4,
    Table = 5,
    Function = 6,
    Userdata = 7,
    Thread = 8,
}

impl TypeTag {
    /// Every tag, in code order.
    pub const ALL: [TypeTag; 10] = [
        TypeTag::None,
        TypeTag::Nil,
        TypeTag::Boolean,
        TypeTag::LightUserdata,
        TypeTag::Number,
        TypeTag::String,
        TypeTag::Table,
        TypeTag::Function,
        TypeTag::Userdata,
        TypeTag::Thread,
    ];

    /// Canonicalize an engine type code. Unrecognized codes map to `None`.
    pub const fn from_code(code: i32) -> Self {
        match code {
            0 => TypeTag::Nil,
            1 => TypeTag::Boolean,
            2 => TypeTag::LightUserdata,
            3 => TypeTag::Number,
            4 => TypeTag::String,
            5 => TypeTag::Table,
            6 => TypeTag::Function,
            7 => TypeTag::Userdata,
            8 => TypeTag::Thread,
            _ => TypeTag::None,
        }
    }

    /// The engine's type code for this tag.
    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Canonical type name, as the engine's `type()` builtin spells it.
    pub const fn name(self) -> &'static str {
        match self {
            TypeTag::None => "none",
            TypeTag::Nil => "nil",
            TypeTag::Boolean => "boolean",
            TypeTag::LightUserdata => "lightuserdata",
            TypeTag::Number => "number",
            TypeTag::String => "string",
            TypeTag::Table => "table",
            TypeTag::Function => "function",
            TypeTag::Userdata => "userdata",
            TypeTag::Thread => "thread",
        }
    }
}

/// Render a raw engine type code.
///
/// Unlike [`TypeTag::from_code`] this does not fold unknown codes into
/// `none`; they render as `"unknown"`.
pub fn type_name(code: i32) -> &'static str {
    match TypeTag::from_code(code) {
        TypeTag::None if code != TypeTag::None.code() => "unknown",
        tag => tag.name(),
    }
}

impl From<i32> for TypeTag {
    #[inline]
    fn from(code: i32) -> Self {
        TypeTag::from_code(code)
    }
}

impl PartialEq<i32> for TypeTag {
    fn eq(&self, other: &i32) -> bool {
        self.code() == *other
    }
}

impl PartialEq<TypeTag> for i32 {
    fn eq(&self, other: &TypeTag) -> bool {
        *self == other.code()
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests;
