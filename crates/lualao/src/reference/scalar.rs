//! References to number, string and boolean slots.
//!
//! `value()` never fails: an invalid reference reads as `0.0`, `""` or
//! `false`. Use `get()` to tell absence apart from a real identity value.

use std::rc::Weak;

use lao_types::{StackIndex, TypeTag};

use super::StackReference;
use crate::engine::Engine;
use crate::State;

/// Reference to a number slot.
#[derive(Clone, Debug)]
pub struct NumberRef {
    pub(super) base: StackReference,
}

impl NumberRef {
    pub fn new(state: &State, index: impl Into<StackIndex>) -> Self {
        NumberRef {
            base: StackReference::new(state, index, TypeTag::Number),
        }
    }

    pub(crate) fn attach(parent: Weak<Engine>, index: StackIndex) -> Self {
        NumberRef {
            base: StackReference::attach(parent, index, TypeTag::Number),
        }
    }

    pub(crate) fn detached() -> Self {
        NumberRef {
            base: StackReference::detached(TypeTag::Number),
        }
    }

    /// The number, or `0.0` if the reference is invalid.
    pub fn value(&self) -> f64 {
        self.get().unwrap_or(0.0)
    }

    pub fn get(&self) -> Option<f64> {
        let (engine, slot) = self.base.live_slot()?;
        Some(engine.to_number(slot))
    }
}

/// Reference to a string slot.
#[derive(Clone, Debug)]
pub struct StringRef {
    pub(super) base: StackReference,
}

impl StringRef {
    pub fn new(state: &State, index: impl Into<StackIndex>) -> Self {
        StringRef {
            base: StackReference::new(state, index, TypeTag::String),
        }
    }

    pub(crate) fn attach(parent: Weak<Engine>, index: StackIndex) -> Self {
        StringRef {
            base: StackReference::attach(parent, index, TypeTag::String),
        }
    }

    pub(crate) fn detached() -> Self {
        StringRef {
            base: StackReference::detached(TypeTag::String),
        }
    }

    /// The string, or `""` if the reference is invalid.
    ///
    /// Bytes that are not UTF-8 are replaced with U+FFFD.
    pub fn value(&self) -> String {
        self.get().unwrap_or_default()
    }

    pub fn get(&self) -> Option<String> {
        let (engine, slot) = self.base.live_slot()?;
        engine.to_string(slot)
    }
}

/// Reference to a boolean slot.
#[derive(Clone, Debug)]
pub struct BooleanRef {
    pub(super) base: StackReference,
}

impl BooleanRef {
    pub fn new(state: &State, index: impl Into<StackIndex>) -> Self {
        BooleanRef {
            base: StackReference::new(state, index, TypeTag::Boolean),
        }
    }

    pub(crate) fn attach(parent: Weak<Engine>, index: StackIndex) -> Self {
        BooleanRef {
            base: StackReference::attach(parent, index, TypeTag::Boolean),
        }
    }

    pub(crate) fn detached() -> Self {
        BooleanRef {
            base: StackReference::detached(TypeTag::Boolean),
        }
    }

    /// The boolean, or `false` if the reference is invalid.
    pub fn value(&self) -> bool {
        self.get().unwrap_or(false)
    }

    pub fn get(&self) -> Option<bool> {
        let (engine, slot) = self.base.live_slot()?;
        Some(engine.to_boolean(slot))
    }
}
