//! Arity-checked references to callable slots.

use std::rc::Weak;

use lao_types::{StackIndex, TypeTag};

use super::StackReference;
use crate::engine::Engine;
use crate::error::{LuaError, LuaResult};
use crate::State;

/// Reference to a function slot, with the arity it is called with.
///
/// A successful call replaces the function and its arguments with `output`
/// results, so the slot no longer holds the function. Calling therefore
/// consumes the reference; look the function up again to call it twice.
#[derive(Debug)]
pub struct FunctionRef {
    pub(super) base: StackReference,
    input: u32,
    output: u32,
}

impl FunctionRef {
    pub fn new(state: &State, index: impl Into<StackIndex>, input: u32, output: u32) -> Self {
        FunctionRef {
            base: StackReference::new(state, index, TypeTag::Function),
            input,
            output,
        }
    }

    pub(crate) fn attach(parent: Weak<Engine>, index: StackIndex, input: u32, output: u32) -> Self {
        FunctionRef {
            base: StackReference::attach(parent, index, TypeTag::Function),
            input,
            output,
        }
    }

    pub(crate) fn detached(input: u32, output: u32) -> Self {
        FunctionRef {
            base: StackReference::detached(TypeTag::Function),
            input,
            output,
        }
    }

    /// Number of arguments the call consumes.
    pub fn input(&self) -> u32 {
        self.input
    }

    /// Number of results the call leaves.
    pub fn output(&self) -> u32 {
        self.output
    }

    /// Call without a message handler.
    pub fn call(self) -> LuaResult<()> {
        self.call_with_handler(StackIndex::new(0))
    }

    /// Call in protected mode, using the function at `handler` as message
    /// handler (`0` for none).
    ///
    /// - engine gone: [`LuaError::StateExpired`]
    /// - reference invalid: nothing happens
    /// - fewer than `input` values above the function:
    ///   [`LuaError::InsufficientArguments`], the stack is untouched
    /// - `handler` names no live slot below the function:
    ///   [`LuaError::InvalidHandler`], the stack is untouched
    /// - no room for `output` results: [`LuaError::StackExhausted`], the
    ///   stack is untouched
    /// - the call raises: [`LuaError::Runtime`] with the engine's message;
    ///   the function, its arguments and the message are gone from the stack
    #[tracing::instrument(
        level = "debug",
        skip(self),
        fields(index = %self.base.index(), input = self.input, output = self.output)
    )]
    pub fn call_with_handler(self, handler: StackIndex) -> LuaResult<()> {
        let engine = self.base.parent()?;
        let Some(slot) = self.base.slot_in(&engine) else {
            tracing::debug!("function reference is not valid; call skipped");
            return Ok(());
        };

        let top = engine.top();
        let found = top - slot;
        let expected = arity(self.input);
        if found < expected {
            return Err(LuaError::InsufficientArguments {
                expected: self.input,
                found,
            });
        }

        let handler_slot = if handler.get() == 0 {
            0
        } else {
            handler
                .resolve(top)
                .filter(|&h| h < slot)
                .ok_or(LuaError::InvalidHandler { index: handler })?
        };

        let needed = self.output.saturating_sub(self.input);
        if !engine.try_reserve(arity(needed)) {
            return Err(LuaError::StackExhausted { needed });
        }

        engine
            .pcall(expected, arity(self.output), handler_slot)
            .map_err(|message| LuaError::Runtime { message })
    }
}

/// Arity as the engine's integer type. Anything past `i32::MAX` can never be
/// satisfied by a real stack, so saturating keeps the comparison honest.
fn arity(count: u32) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}
