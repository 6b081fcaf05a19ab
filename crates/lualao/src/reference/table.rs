//! References to table slots, with named-field access.
//!
//! Every `get_*` lookup pushes exactly one value: the field, or `nil` when
//! the table reference itself is invalid. The returned reference points at
//! that new top slot, so an absent field yields an invalid reference of the
//! requested type. Metamethods run in protected mode: a lookup whose
//! `__index` raises is logged and leaves `nil`, so the reference is invalid.
//! Balance the pushes with a [`crate::StackContext`].

use std::rc::{Rc, Weak};

use lao_types::{StackIndex, TypeTag};

use super::{BooleanRef, FunctionRef, NumberRef, StackReference, StringRef};
use crate::engine::Engine;
use crate::error::{LuaError, LuaResult};
use crate::value::StackValue;
use crate::State;

/// Reference to a table slot.
#[derive(Clone, Debug)]
pub struct TableRef {
    pub(super) base: StackReference,
}

impl TableRef {
    pub fn new(state: &State, index: impl Into<StackIndex>) -> Self {
        TableRef {
            base: StackReference::new(state, index, TypeTag::Table),
        }
    }

    pub(crate) fn attach(parent: Weak<Engine>, index: StackIndex) -> Self {
        TableRef {
            base: StackReference::attach(parent, index, TypeTag::Table),
        }
    }

    pub fn get_string(&self, name: &str) -> StringRef {
        match self.push_field(name) {
            Some((parent, index)) => StringRef::attach(parent, index),
            None => StringRef::detached(),
        }
    }

    pub fn get_number(&self, name: &str) -> NumberRef {
        match self.push_field(name) {
            Some((parent, index)) => NumberRef::attach(parent, index),
            None => NumberRef::detached(),
        }
    }

    pub fn get_boolean(&self, name: &str) -> BooleanRef {
        match self.push_field(name) {
            Some((parent, index)) => BooleanRef::attach(parent, index),
            None => BooleanRef::detached(),
        }
    }

    pub fn get_function(&self, name: &str, input: u32, output: u32) -> FunctionRef {
        match self.push_field(name) {
            Some((parent, index)) => FunctionRef::attach(parent, index, input, output),
            None => FunctionRef::detached(input, output),
        }
    }

    /// Nested table field.
    pub fn get_table(&self, name: &str) -> TableRef {
        match self.push_field(name) {
            Some((parent, index)) => TableRef::attach(parent, index),
            None => TableRef {
                base: StackReference::detached(TypeTag::Table),
            },
        }
    }

    /// `table[name] = value`, with no net stack growth.
    ///
    /// Fails when the engine is gone ([`LuaError::StateExpired`]) or a
    /// `__newindex` metamethod raises ([`LuaError::Runtime`]). Assigning
    /// through an invalid table reference is logged and skipped.
    pub fn set<'v>(&self, name: &str, value: impl Into<StackValue<'v>>) -> LuaResult<()> {
        let engine = self.base.parent()?;
        let Some(slot) = self.base.slot_in(&engine) else {
            tracing::warn!(name, index = %self.base.index(), "set on an invalid table reference skipped");
            return Ok(());
        };
        engine
            .set_field(slot, name, &value.into())
            .map_err(|message| LuaError::Runtime { message })
    }

    /// Push `self[name]` and return where it landed.
    ///
    /// `None` when the engine is gone; nothing is pushed then.
    fn push_field(&self, name: &str) -> Option<(Weak<Engine>, StackIndex)> {
        let Ok(engine) = self.base.parent() else {
            tracing::warn!(name, "field lookup on a table whose state is gone");
            return None;
        };
        match self.base.slot_in(&engine) {
            Some(slot) => {
                if let Err(message) = engine.get_field(slot, name) {
                    tracing::warn!(name, %message, "field lookup raised; pushing nil");
                }
            }
            None => {
                tracing::warn!(name, index = %self.base.index(), "field lookup on an invalid table reference; pushing nil");
                engine.push(&StackValue::Nil);
            }
        }
        Some((Rc::downgrade(&engine), StackIndex::new(engine.top())))
    }
}
