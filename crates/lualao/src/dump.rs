//! Read-only snapshots of the stack layout, for tests and diagnostics.

use std::fmt;

use lao_types::{StackIndex, TypeTag};

use crate::engine::Engine;

/// One slot of a [`StackDump`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SlotInfo {
    /// Positive, bottom-relative index.
    pub from_bottom: StackIndex,
    /// Negative, top-relative index.
    pub from_top: StackIndex,
    pub tag: TypeTag,
}

/// Every slot on the stack, topmost first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StackDump {
    slots: Vec<SlotInfo>,
}

impl StackDump {
    pub(crate) fn capture(engine: &Engine) -> Self {
        let depth = engine.top();
        let slots = (1..=depth)
            .rev()
            .map(|slot| SlotInfo {
                from_bottom: StackIndex::new(slot),
                from_top: StackIndex::new(slot - depth - 1),
                tag: engine.type_at(slot),
            })
            .collect();
        StackDump { slots }
    }

    pub fn slots(&self) -> &[SlotInfo] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Tags from top to bottom.
    pub fn tags(&self) -> Vec<TypeTag> {
        self.slots.iter().map(|slot| slot.tag).collect()
    }
}

impl fmt::Display for StackDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stack size {}", self.slots.len())?;
        for slot in &self.slots {
            write!(
                f,
                "\nindex({}, {}) => {}",
                slot.from_bottom.get(),
                slot.from_top.get(),
                slot.tag
            )?;
        }
        Ok(())
    }
}
