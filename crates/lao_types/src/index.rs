//! Signed stack coordinates.

use std::fmt;

/// A position on the engine's value stack.
///
/// Follows the engine convention:
/// - negative values count from the top (`-1` is the top slot)
/// - positive values are 1-based offsets from the bottom
/// - zero names no slot at all
///
/// The index is only a coordinate. Whether it names a live slot depends on
/// the stack depth at the moment of use, see [`StackIndex::resolve`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct StackIndex(i32);

impl StackIndex {
    /// The topmost slot.
    pub const TOP: StackIndex = StackIndex(-1);

    #[inline]
    pub const fn new(raw: i32) -> Self {
        StackIndex(raw)
    }

    /// Raw value for passing to engine primitives.
    #[inline]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// `true` for negative (top-relative) indices.
    #[inline]
    pub const fn is_from_top(self) -> bool {
        self.0 < 0
    }

    /// `true` for positive (bottom-relative) indices.
    #[inline]
    pub const fn is_from_bottom(self) -> bool {
        self.0 > 0
    }

    /// Map this index onto an absolute slot of a stack holding `depth` values.
    ///
    /// Returns `Some(slot)` with `1 <= slot <= depth`, or `None` when the index
    /// names no live slot. Index 0 never resolves.
    pub fn resolve(self, depth: i32) -> Option<i32> {
        if depth <= 0 {
            return None;
        }
        let slot = if self.is_from_bottom() {
            self.0
        } else if self.is_from_top() {
            depth.checked_add(self.0)?.checked_add(1)?
        } else {
            return None;
        };
        (1..=depth).contains(&slot).then_some(slot)
    }
}

impl From<i32> for StackIndex {
    #[inline]
    fn from(raw: i32) -> Self {
        StackIndex(raw)
    }
}

impl From<StackIndex> for i32 {
    #[inline]
    fn from(index: StackIndex) -> Self {
        index.0
    }
}

impl Default for StackIndex {
    fn default() -> Self {
        Self::TOP
    }
}

impl fmt::Display for StackIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.0)
    }
}

#[cfg(test)]
mod tests;
