//! `StateBuilder` for opening engines with non-default settings.

use std::ffi::CString;
use std::rc::Rc;

use super::State;
use crate::engine::Engine;
use crate::error::{LuaError, LuaResult};

/// Chunk name used for `load_string` diagnostics unless overridden.
const DEFAULT_CHUNK_NAME: &str = "=lualao";

/// Builder for [`State`].
///
/// ```text
/// let state = State::builder()
///     .open_libs(false)
///     .chunk_name("=config")
///     .build()?;
/// ```
#[derive(Clone, Debug)]
pub struct StateBuilder {
    open_libs: bool,
    chunk_name: String,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            open_libs: true,
            chunk_name: DEFAULT_CHUNK_NAME.to_owned(),
        }
    }

    /// Whether to load the standard libraries. Defaults to `true`.
    #[must_use]
    pub fn open_libs(mut self, open: bool) -> Self {
        self.open_libs = open;
        self
    }

    /// Name reported by the engine for chunks run with `load_string`.
    ///
    /// Follows the engine convention: a leading `=` is shown verbatim,
    /// a leading `@` marks a file name.
    #[must_use]
    pub fn chunk_name(mut self, name: impl Into<String>) -> Self {
        self.chunk_name = name.into();
        self
    }

    pub fn build(self) -> LuaResult<State> {
        let chunk_name = CString::new(self.chunk_name.as_str()).map_err(|_| {
            LuaError::InvalidName {
                name: self.chunk_name.clone(),
            }
        })?;
        let engine = Engine::open().ok_or(LuaError::OutOfMemory)?;
        if self.open_libs {
            engine.open_libs();
        }
        Ok(State {
            engine: Rc::new(engine),
            chunk_name: Rc::new(chunk_name),
        })
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
