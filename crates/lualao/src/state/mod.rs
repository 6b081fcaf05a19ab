//! The interpreter handle.
//!
//! `State` is the only owner of an engine instance. Clones share the same
//! engine; it is closed when the last clone is dropped. Everything derived
//! from a `State` (references, scope guards) observes the engine without
//! keeping it alive.

mod builder;

use std::ffi::CString;
use std::fmt;
use std::path::Path;
use std::rc::{Rc, Weak};

use lao_types::{StackIndex, TypeTag};

use crate::dump::StackDump;
use crate::engine::Engine;
use crate::error::{LuaError, LuaResult};
use crate::reference::{BooleanRef, FunctionRef, NumberRef, StringRef, TableRef};
use crate::value::StackValue;
use crate::StackContext;

pub use builder::StateBuilder;

/// Shared handle to one engine instance and its value stack.
///
/// All operations take `&self`: the stack is engine-side state, and the
/// handle is `!Send`, so exactly one thread ever touches it.
#[derive(Clone)]
pub struct State {
    engine: Rc<Engine>,
    chunk_name: Rc<CString>,
}

impl State {
    /// Open an engine with the standard libraries loaded.
    pub fn new() -> LuaResult<Self> {
        StateBuilder::new().build()
    }

    pub fn builder() -> StateBuilder {
        StateBuilder::new()
    }

    pub(crate) fn downgrade(&self) -> Weak<Engine> {
        Rc::downgrade(&self.engine)
    }

    /// Raw engine pointer, for primitives this crate does not wrap.
    ///
    /// The pointer is valid while any clone of this `State` is alive.
    pub fn as_ptr(&self) -> *mut mlua_sys::lua_State {
        self.engine.as_ptr()
    }

    /// Load the standard libraries into the global table.
    pub fn open_libs(&self) {
        self.engine.open_libs();
    }

    /// Compile and run the script at `path`.
    pub fn load_file(&self, path: impl AsRef<Path>) -> LuaResult<()> {
        self.load_path(path.as_ref())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn load_path(&self, path: &Path) -> LuaResult<()> {
        self.engine
            .do_file(path)
            .map_err(|message| LuaError::ScriptLoad { message })
    }

    /// Compile and run an in-memory chunk.
    #[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
    pub fn load_string(&self, source: &str) -> LuaResult<()> {
        self.engine
            .do_string(source, &self.chunk_name)
            .map_err(|message| LuaError::ScriptLoad { message })
    }

    // Stack primitives

    /// Push one value. The stack always grows by exactly one.
    ///
    /// # Panics
    ///
    /// Panics if the engine cannot grow its stack any further.
    pub fn push<'v>(&self, value: impl Into<StackValue<'v>>) {
        self.engine.push(&value.into());
    }

    pub fn push_nil(&self) {
        self.engine.push(&StackValue::Nil);
    }

    /// Remove up to `count` values from the top.
    ///
    /// Non-positive counts do nothing. Counts beyond the current depth are
    /// clamped, since the engine has no slots below its base.
    pub fn pop(&self, count: i32) {
        if count <= 0 {
            return;
        }
        let depth = self.size();
        if count > depth {
            tracing::warn!(count, depth, "pop past the stack base clamped");
        }
        self.engine.pop(count.min(depth));
    }

    /// Number of values on the stack.
    pub fn size(&self) -> i32 {
        self.engine.top()
    }

    /// Bottom-relative index of the topmost slot (`0` when empty).
    pub fn top(&self) -> StackIndex {
        StackIndex::new(self.size())
    }

    /// Dynamic type at `index`, `TypeTag::None` if it names no live slot.
    pub fn type_at(&self, index: impl Into<StackIndex>) -> TypeTag {
        index
            .into()
            .resolve(self.size())
            .map_or(TypeTag::None, |slot| self.engine.type_at(slot))
    }

    // References to existing slots

    pub fn number_at(&self, index: impl Into<StackIndex>) -> NumberRef {
        NumberRef::new(self, index)
    }

    pub fn string_at(&self, index: impl Into<StackIndex>) -> StringRef {
        StringRef::new(self, index)
    }

    pub fn boolean_at(&self, index: impl Into<StackIndex>) -> BooleanRef {
        BooleanRef::new(self, index)
    }

    pub fn function_at(&self, index: impl Into<StackIndex>, input: u32, output: u32) -> FunctionRef {
        FunctionRef::new(self, index, input, output)
    }

    pub fn table_at(&self, index: impl Into<StackIndex>) -> TableRef {
        TableRef::new(self, index)
    }

    // Global lookups. Each pushes the looked-up value.

    pub fn get_number(&self, name: &str) -> NumberRef {
        NumberRef::attach(self.downgrade(), self.push_global(name))
    }

    pub fn get_string(&self, name: &str) -> StringRef {
        StringRef::attach(self.downgrade(), self.push_global(name))
    }

    pub fn get_boolean(&self, name: &str) -> BooleanRef {
        BooleanRef::attach(self.downgrade(), self.push_global(name))
    }

    /// Look up a global function expecting `input` arguments and leaving
    /// `output` results.
    pub fn get_function(&self, name: &str, input: u32, output: u32) -> FunctionRef {
        FunctionRef::attach(self.downgrade(), self.push_global(name), input, output)
    }

    pub fn get_table(&self, name: &str) -> TableRef {
        TableRef::attach(self.downgrade(), self.push_global(name))
    }

    fn push_global(&self, name: &str) -> StackIndex {
        if let Err(message) = self.engine.get_global(name) {
            tracing::warn!(name, %message, "global lookup failed; pushing nil");
        }
        self.top()
    }

    /// Assign a global. No net stack growth.
    ///
    /// A `__newindex` on the global table that raises yields
    /// [`LuaError::Runtime`].
    pub fn set_global<'v>(&self, name: &str, value: impl Into<StackValue<'v>>) -> LuaResult<()> {
        if name.contains('\0') {
            return Err(LuaError::InvalidName {
                name: name.to_owned(),
            });
        }
        self.engine
            .set_global(name, &value.into())
            .map_err(|message| LuaError::Runtime { message })
    }

    // Scopes

    /// Guard that restores the current stack depth when dropped.
    pub fn scoped(&self) -> StackContext<'_> {
        StackContext::new(self)
    }

    /// Run `f`, then pop whatever net growth it left behind.
    ///
    /// Cleanup also happens when `f` panics.
    pub fn run_context<T>(&self, f: impl FnOnce(&State) -> T) -> T {
        let scoped = self.scoped();
        f(scoped.state())
    }

    // Introspection

    /// Snapshot of every slot's indices and type, top first.
    pub fn dump(&self) -> StackDump {
        StackDump::capture(&self.engine)
    }

    /// Log the current stack layout at DEBUG level.
    pub fn debug_print(&self) {
        tracing::debug!("{}", self.dump());
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("size", &self.size())
            .field("handles", &Rc::strong_count(&self.engine))
            .finish()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
