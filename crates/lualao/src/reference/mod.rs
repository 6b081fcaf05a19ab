//! Typed, re-validated references to stack slots.
//!
//! # Design
//!
//! A reference is a coordinate, not a cached value. It records:
//! - the `TypeTag` the slot held when the reference was made
//! - a `StackIndex` naming the slot
//! - a `Weak` link to the engine
//!
//! Every access re-reads the live stack. A reference is valid only while
//! the engine is alive, the index names a live slot, and that slot still
//! holds a value of the recorded type.
//!
//! Reads through an invalid reference return the type's identity value
//! (`0.0`, `""`, `false`). Calls and assignments that need a live engine
//! return [`LuaError::StateExpired`] instead.
//!
//! Typed references deref to [`StackReference`], so the validity check is
//! always `reference.is_valid()`.

mod function;
mod scalar;
mod table;

use std::rc::{Rc, Weak};

use lao_types::{StackIndex, TypeTag};

use crate::engine::Engine;
use crate::error::{LuaError, LuaResult};
use crate::State;

pub use function::FunctionRef;
pub use scalar::{BooleanRef, NumberRef, StringRef};
pub use table::TableRef;

/// Untyped core shared by every typed reference.
#[derive(Clone, Debug)]
pub struct StackReference {
    tag: TypeTag,
    index: StackIndex,
    parent: Weak<Engine>,
}

impl StackReference {
    pub fn new(state: &State, index: impl Into<StackIndex>, tag: TypeTag) -> Self {
        Self::attach(state.downgrade(), index.into(), tag)
    }

    pub(crate) fn attach(parent: Weak<Engine>, index: StackIndex, tag: TypeTag) -> Self {
        StackReference { tag, index, parent }
    }

    /// A reference that never becomes valid.
    pub(crate) fn detached(tag: TypeTag) -> Self {
        Self::attach(Weak::new(), StackIndex::TOP, tag)
    }

    /// Type the slot is expected to hold.
    #[inline]
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    #[inline]
    pub fn index(&self) -> StackIndex {
        self.index
    }

    /// Whether the slot is live and still holds a value of the recorded type.
    ///
    /// Side-effect free. Fails closed when the engine is gone, the stack is
    /// empty, the index is out of bounds (index 0 always is), or the type
    /// differs.
    pub fn is_valid(&self) -> bool {
        self.live_slot().is_some()
    }

    /// `true` once every `State` owning the engine has been dropped.
    pub fn is_detached(&self) -> bool {
        self.parent.strong_count() == 0
    }

    pub(crate) fn parent(&self) -> LuaResult<Rc<Engine>> {
        self.parent.upgrade().ok_or(LuaError::StateExpired)
    }

    /// The engine plus the absolute slot, if the reference is valid.
    pub(crate) fn live_slot(&self) -> Option<(Rc<Engine>, i32)> {
        let engine = self.parent.upgrade()?;
        let slot = self.slot_in(&engine)?;
        Some((engine, slot))
    }

    /// Absolute slot in `engine`, if the reference is valid there.
    pub(crate) fn slot_in(&self, engine: &Engine) -> Option<i32> {
        let depth = engine.top();
        if depth == 0 {
            return None;
        }
        let slot = self.index.resolve(depth)?;
        (engine.type_at(slot) == self.tag).then_some(slot)
    }
}

/// Deref each typed reference to its [`StackReference`].
macro_rules! deref_to_base {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl std::ops::Deref for $ty {
                type Target = StackReference;

                fn deref(&self) -> &StackReference {
                    &self.base
                }
            }
        )+
    };
}

deref_to_base!(NumberRef, StringRef, BooleanRef, FunctionRef, TableRef);

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
