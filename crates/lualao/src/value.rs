//! Values the host can push onto the stack.

use std::borrow::Cow;

use lao_types::TypeTag;

/// A native callback the engine can call, using the engine's own ABI.
///
/// Write these against [`crate::ffi`].
pub type NativeFunction = mlua_sys::lua_CFunction;

/// One value to push onto the stack.
///
/// Built implicitly through the `From` conversions:
///
/// ```text
/// state.push(());        // nil
/// state.push(3);         // integer
/// state.push(0.5);       // float
/// state.push(true);
/// state.push("Rin");
/// ```
#[derive(Clone, Debug)]
pub enum StackValue<'a> {
    Nil,
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(Cow<'a, str>),
    Function(NativeFunction),
}

impl StackValue<'_> {
    /// Tag the value will have once pushed.
    pub fn tag(&self) -> TypeTag {
        match self {
            StackValue::Nil => TypeTag::Nil,
            StackValue::Boolean(_) => TypeTag::Boolean,
            StackValue::Integer(_) | StackValue::Number(_) => TypeTag::Number,
            StackValue::String(_) => TypeTag::String,
            StackValue::Function(_) => TypeTag::Function,
        }
    }
}

impl From<()> for StackValue<'_> {
    fn from((): ()) -> Self {
        StackValue::Nil
    }
}

impl From<bool> for StackValue<'_> {
    fn from(b: bool) -> Self {
        StackValue::Boolean(b)
    }
}

impl From<i32> for StackValue<'_> {
    fn from(n: i32) -> Self {
        StackValue::Integer(i64::from(n))
    }
}

impl From<i64> for StackValue<'_> {
    fn from(n: i64) -> Self {
        StackValue::Integer(n)
    }
}

impl From<f64> for StackValue<'_> {
    fn from(n: f64) -> Self {
        StackValue::Number(n)
    }
}

impl<'a> From<&'a str> for StackValue<'a> {
    fn from(s: &'a str) -> Self {
        StackValue::String(Cow::Borrowed(s))
    }
}

impl<'a> From<&'a String> for StackValue<'a> {
    fn from(s: &'a String) -> Self {
        StackValue::String(Cow::Borrowed(s.as_str()))
    }
}

impl From<String> for StackValue<'_> {
    fn from(s: String) -> Self {
        StackValue::String(Cow::Owned(s))
    }
}

impl From<NativeFunction> for StackValue<'_> {
    fn from(f: NativeFunction) -> Self {
        StackValue::Function(f)
    }
}
