//! Lualao - safe, typed access to an embedded Lua 5.4 stack.
//!
//! The engine's native interface is one mutable value stack indexed by raw
//! integers. This crate puts three guarantees on top of it:
//! - **Typed, re-validated references**: [`NumberRef`], [`StringRef`],
//!   [`BooleanRef`], [`FunctionRef`] and [`TableRef`] check bounds and type
//!   on every access
//! - **Lifetime-checked ownership**: [`State`] owns the engine; references
//!   observe it weakly and never outlive it unsafely
//! - **Balanced scopes**: [`StackContext`] restores the stack depth on drop
//!
//! # Example
//!
//! ```text
//! let state = State::new()?;
//! state.load_string("function add(a, b) return a + b end")?;
//!
//! let sum = state.run_context(|state| {
//!     let add = state.get_function("add", 2, 1);
//!     state.push(3);
//!     state.push(4);
//!     add.call()?;
//!     Ok::<_, LuaError>(state.number_at(StackIndex::TOP).value())
//! })?;
//! assert_eq!(sum, 7.0);
//! ```
//!
//! # Errors
//!
//! Stale or mistyped references never error: `is_valid()` reports them and
//! reads return `0.0`, `""` or `false`. Calls, loads and assignments that
//! cannot proceed return [`LuaError`].

mod context;
mod dump;
mod engine;
mod error;
mod reference;
mod state;
mod tracing_setup;
mod value;

pub use context::StackContext;
pub use dump::{SlotInfo, StackDump};
pub use error::{LuaError, LuaResult};
pub use lao_types::{type_name, StackIndex, TypeTag};
pub use reference::{BooleanRef, FunctionRef, NumberRef, StackReference, StringRef, TableRef};
pub use state::{State, StateBuilder};
pub use tracing_setup::init_tracing;
pub use value::{NativeFunction, StackValue};

/// The raw Lua 5.4 C API this crate is built on, for writing native callbacks.
pub use mlua_sys as ffi;
