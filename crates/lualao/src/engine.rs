//! Thin safe wrappers over the Lua 5.4 C API.
//!
//! Every `unsafe` call into the engine lives here. The wrappers uphold the
//! C API preconditions the rest of the crate relies on:
//! - slots passed to readers are live (`1 <= slot <= top`) or the top-relative `-1`
//! - stack space is reserved with `lua_checkstack` before anything is pushed
//! - `pop` never removes more values than the stack holds
//!
//! Engine errors raised outside a protected call abort the process through
//! the engine's panic handler. Table and global access can run metamethods,
//! so it goes through small C trampolines called with `lua_pcall`.

#![allow(
    unsafe_code,
    reason = "engine access goes through the Lua C API"
)]

use std::borrow::Cow;
use std::ffi::{c_int, CString};
use std::path::Path;
use std::ptr::{self, NonNull};

use lao_types::TypeTag;
use mlua_sys as ffi;

use crate::value::StackValue;

// `TypeTag` discriminants must track the engine's type codes.
const _: () = {
    assert!(TypeTag::None.code() == ffi::LUA_TNONE);
    assert!(TypeTag::Nil.code() == ffi::LUA_TNIL);
    assert!(TypeTag::Boolean.code() == ffi::LUA_TBOOLEAN);
    assert!(TypeTag::LightUserdata.code() == ffi::LUA_TLIGHTUSERDATA);
    assert!(TypeTag::Number.code() == ffi::LUA_TNUMBER);
    assert!(TypeTag::String.code() == ffi::LUA_TSTRING);
    assert!(TypeTag::Table.code() == ffi::LUA_TTABLE);
    assert!(TypeTag::Function.code() == ffi::LUA_TFUNCTION);
    assert!(TypeTag::Userdata.code() == ffi::LUA_TUSERDATA);
    assert!(TypeTag::Thread.code() == ffi::LUA_TTHREAD);
};

/// An open engine instance. Closed exactly once, on drop.
pub(crate) struct Engine {
    raw: NonNull<ffi::lua_State>,
}

impl Engine {
    /// Open a fresh engine. `None` if the engine could not allocate its state.
    pub(crate) fn open() -> Option<Self> {
        // SAFETY: luaL_newstate has no preconditions; null signals allocation failure.
        let raw = NonNull::new(unsafe { ffi::luaL_newstate() })?;
        tracing::debug!(state = ?raw, "opened engine");
        Some(Engine { raw })
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut ffi::lua_State {
        self.raw.as_ptr()
    }

    pub(crate) fn open_libs(&self) {
        // SAFETY: the state is open; opening libraries pushes nothing net.
        unsafe { ffi::luaL_openlibs(self.as_ptr()) }
    }

    /// Number of values on the stack.
    #[inline]
    pub(crate) fn top(&self) -> i32 {
        // SAFETY: the state is open.
        unsafe { ffi::lua_gettop(self.as_ptr()) }
    }

    /// Dynamic type of a live slot.
    pub(crate) fn type_at(&self, slot: i32) -> TypeTag {
        // SAFETY: callers pass live slots, which are acceptable indices.
        TypeTag::from_code(unsafe { ffi::lua_type(self.as_ptr(), slot) })
    }

    pub(crate) fn to_number(&self, slot: i32) -> f64 {
        // SAFETY: live slot; lua_tonumberx accepts a null out-flag.
        unsafe { ffi::lua_tonumberx(self.as_ptr(), slot, ptr::null_mut()) }
    }

    pub(crate) fn to_boolean(&self, slot: i32) -> bool {
        // SAFETY: live slot.
        unsafe { ffi::lua_toboolean(self.as_ptr(), slot) != 0 }
    }

    /// Read a string slot. Non-UTF-8 bytes are replaced.
    ///
    /// Only call this on string or number slots: the engine converts numbers
    /// in place.
    pub(crate) fn to_string(&self, slot: i32) -> Option<String> {
        let mut len = 0usize;
        // SAFETY: live slot; `len` outlives the call.
        let data = unsafe { ffi::lua_tolstring(self.as_ptr(), slot, &mut len) };
        if data.is_null() {
            return None;
        }
        // SAFETY: the engine guarantees `len` readable bytes at `data` while
        // the value stays on the stack, and we copy before returning.
        let bytes = unsafe { std::slice::from_raw_parts(data.cast::<u8>(), len) };
        Some(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Try to make room for `extra` more values.
    pub(crate) fn try_reserve(&self, extra: i32) -> bool {
        // SAFETY: the state is open; `extra` is non-negative.
        extra <= 0 || unsafe { ffi::lua_checkstack(self.as_ptr(), extra) } != 0
    }

    /// Make room for `extra` more values.
    ///
    /// # Panics
    ///
    /// Panics if the engine cannot grow its stack that far.
    fn reserve(&self, extra: i32) {
        if !self.try_reserve(extra) {
            panic!("engine stack cannot grow by {extra} slots");
        }
    }

    pub(crate) fn push(&self, value: &StackValue<'_>) {
        self.reserve(1);
        self.push_reserved(value);
    }

    fn push_reserved(&self, value: &StackValue<'_>) {
        let state = self.as_ptr();
        // SAFETY: one slot has been reserved by the caller.
        unsafe {
            match value {
                StackValue::Nil => ffi::lua_pushnil(state),
                StackValue::Boolean(b) => ffi::lua_pushboolean(state, c_int::from(*b)),
                StackValue::Integer(n) => ffi::lua_pushinteger(state, *n),
                StackValue::Number(n) => ffi::lua_pushnumber(state, *n),
                StackValue::String(s) => {
                    ffi::lua_pushlstring(state, s.as_ptr().cast(), s.len());
                }
                StackValue::Function(f) => ffi::lua_pushcfunction(state, *f),
            }
        }
    }

    /// Push a copy of the live slot `slot`. One slot must be reserved.
    fn push_copy_reserved(&self, slot: i32) {
        // SAFETY: `slot` is live and one slot has been reserved.
        unsafe { ffi::lua_pushvalue(self.as_ptr(), slot) }
    }

    /// Remove `count` values. `count` must not exceed `top()`.
    pub(crate) fn pop(&self, count: i32) {
        debug_assert!(count >= 0 && count <= self.top());
        // SAFETY: `count` is within the current stack per the contract above.
        unsafe { ffi::lua_pop(self.as_ptr(), count) }
    }

    /// Push the global `name`.
    ///
    /// Always pushes exactly one value. If the name cannot be passed to the
    /// engine, or a metamethod on the global table raises, that value is
    /// `nil` and the error is returned.
    pub(crate) fn get_global(&self, name: &str) -> Result<TypeTag, String> {
        if name.contains('\0') {
            self.push(&StackValue::Nil);
            return Err(format!("global name {name:?} contains a NUL byte"));
        }
        self.reserve(2);
        self.push_reserved(&StackValue::Function(get_global_trampoline));
        self.push_reserved(&StackValue::String(Cow::Borrowed(name)));
        self.pcall_or_nil(1)
    }

    /// `_G[name] = value`, with no net stack growth. `name` must not
    /// contain NUL.
    pub(crate) fn set_global(&self, name: &str, value: &StackValue<'_>) -> Result<(), String> {
        self.reserve(3);
        self.push_reserved(&StackValue::Function(set_global_trampoline));
        self.push_reserved(&StackValue::String(Cow::Borrowed(name)));
        self.push_reserved(value);
        self.pcall(2, 0, 0)
    }

    /// Push `table[name]`. `table` must be a live absolute slot holding a
    /// table.
    ///
    /// Metamethods run in protected mode. Always pushes exactly one value:
    /// `nil` when the lookup raised, with the error returned.
    pub(crate) fn get_field(&self, table: i32, name: &str) -> Result<TypeTag, String> {
        self.reserve(3);
        self.push_reserved(&StackValue::Function(get_field_trampoline));
        self.push_copy_reserved(table);
        self.push_reserved(&StackValue::String(Cow::Borrowed(name)));
        self.pcall_or_nil(2)
    }

    /// `table[name] = value`, with no net stack growth. `table` must be a
    /// live absolute slot holding a table. Metamethods run in protected mode.
    pub(crate) fn set_field(
        &self,
        table: i32,
        name: &str,
        value: &StackValue<'_>,
    ) -> Result<(), String> {
        self.reserve(4);
        self.push_reserved(&StackValue::Function(set_field_trampoline));
        self.push_copy_reserved(table);
        self.push_reserved(&StackValue::String(Cow::Borrowed(name)));
        self.push_reserved(value);
        self.pcall(3, 0, 0)
    }

    /// Call a trampoline expecting one result; leave `nil` in its place if
    /// it raised.
    fn pcall_or_nil(&self, nargs: i32) -> Result<TypeTag, String> {
        match self.pcall(nargs, 1, 0) {
            Ok(()) => Ok(self.type_at(-1)),
            Err(message) => {
                // The failed call left `nargs + 1` free slots behind it.
                self.push_reserved(&StackValue::Nil);
                Err(message)
            }
        }
    }

    /// Protected call of the function below the top `nargs` values.
    ///
    /// The caller must have checked that a function and `nargs` values are
    /// present, reserved room for `nresults - nargs` extra slots, and that
    /// `handler` is `0` or a live absolute slot below the function.
    /// On failure the engine's error object is popped and returned as text.
    pub(crate) fn pcall(&self, nargs: i32, nresults: i32, handler: i32) -> Result<(), String> {
        // SAFETY: the preconditions above are upheld by every caller.
        let status = unsafe { ffi::lua_pcall(self.as_ptr(), nargs, nresults, handler) };
        if status == ffi::LUA_OK {
            Ok(())
        } else {
            Err(self.take_error())
        }
    }

    /// Compile and run a script file. Chunk results are discarded.
    pub(crate) fn do_file(&self, path: &Path) -> Result<(), String> {
        let Some(c_path) = path.to_str().and_then(|p| CString::new(p).ok()) else {
            return Err(format!("cannot open {}: unsupported path", path.display()));
        };
        self.reserve(1);
        // SAFETY: one slot reserved; null mode accepts text and binary chunks.
        let status = unsafe { ffi::luaL_loadfilex(self.as_ptr(), c_path.as_ptr(), ptr::null()) };
        if status != ffi::LUA_OK {
            return Err(self.take_error());
        }
        self.pcall(0, 0, 0)
    }

    /// Compile and run an in-memory chunk. Chunk results are discarded.
    pub(crate) fn do_string(&self, source: &str, chunk_name: &CString) -> Result<(), String> {
        self.reserve(1);
        // SAFETY: one slot reserved; `source` is read for exactly `len` bytes.
        let status = unsafe {
            ffi::luaL_loadbufferx(
                self.as_ptr(),
                source.as_ptr().cast(),
                source.len(),
                chunk_name.as_ptr(),
                ptr::null(),
            )
        };
        if status != ffi::LUA_OK {
            return Err(self.take_error());
        }
        self.pcall(0, 0, 0)
    }

    /// Pop the error object on top of the stack and render it.
    fn take_error(&self) -> String {
        let message = match self.type_at(-1) {
            TypeTag::String | TypeTag::Number => self.to_string(-1).unwrap_or_default(),
            tag => format!("(error object is a {tag} value)"),
        };
        self.pop(1);
        message
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        tracing::debug!(state = ?self.raw, "closing engine");
        // SAFETY: `raw` came from luaL_newstate and is closed only here.
        unsafe { ffi::lua_close(self.as_ptr()) }
    }
}

// Trampolines run table and global access inside `lua_pcall`, so errors
// raised by metamethods unwind to the protected call instead of the panic
// handler. Each receives its operands as arguments.

/// `(name) -> _G[name]`
unsafe extern "C-unwind" fn get_global_trampoline(state: *mut ffi::lua_State) -> c_int {
    // SAFETY: argument 1 is a string without NUL bytes, kept alive on the
    // stack for the duration of the lookup.
    let name = ffi::lua_tolstring(state, 1, ptr::null_mut());
    ffi::lua_getglobal(state, name);
    1
}

/// `(name, value) -> ()`, assigning `_G[name] = value`
unsafe extern "C-unwind" fn set_global_trampoline(state: *mut ffi::lua_State) -> c_int {
    // SAFETY: as above; the value on top is popped into the global.
    let name = ffi::lua_tolstring(state, 1, ptr::null_mut());
    ffi::lua_setglobal(state, name);
    0
}

/// `(table, key) -> table[key]`
unsafe extern "C-unwind" fn get_field_trampoline(state: *mut ffi::lua_State) -> c_int {
    ffi::lua_gettable(state, 1);
    1
}

/// `(table, key, value) -> ()`, assigning `table[key] = value`
unsafe extern "C-unwind" fn set_field_trampoline(state: *mut ffi::lua_State) -> c_int {
    ffi::lua_settable(state, 1);
    0
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
