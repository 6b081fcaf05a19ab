//! Errors surfaced by privileged stack operations.
//!
//! Only failures that leave the caller unable to continue are errors.
//! Stale or mistyped references are not: they show up through
//! `is_valid()` and read as the type's identity value.

use lao_types::StackIndex;
use thiserror::Error;

/// Result alias for fallible `lualao` operations.
pub type LuaResult<T> = Result<T, LuaError>;

/// A failed privileged operation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LuaError {
    /// Every `State` sharing the engine has been dropped.
    #[error("interpreter state is no longer alive")]
    StateExpired,

    /// A function was called with fewer values above it than its input arity.
    #[error("not enough arguments for function call: expected {expected}, found {found}")]
    InsufficientArguments { expected: u32, found: i32 },

    /// A message handler index did not name a live slot below the function.
    #[error("message handler index {index} does not name a slot below the called function")]
    InvalidHandler { index: StackIndex },

    /// The engine stack cannot grow enough to hold a call's results.
    #[error("engine stack cannot hold {needed} more values")]
    StackExhausted { needed: u32 },

    /// The engine's protected call failed. Carries the engine's message verbatim.
    #[error("{message}")]
    Runtime { message: String },

    /// A script failed to compile or its top-level code raised.
    #[error("{message}")]
    ScriptLoad { message: String },

    /// A global name contained an interior NUL byte.
    #[error("invalid global name {name:?}: names cannot contain NUL bytes")]
    InvalidName { name: String },

    /// The engine could not allocate a new state.
    #[error("not enough memory to open an interpreter state")]
    OutOfMemory,
}

impl LuaError {
    /// `true` for errors raised by script code rather than by this layer.
    pub fn is_engine_error(&self) -> bool {
        matches!(self, LuaError::Runtime { .. } | LuaError::ScriptLoad { .. })
    }
}
