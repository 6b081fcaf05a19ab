//! RAII-style stack balancing.
//!
//! [`StackContext`] records the stack depth when created and pops anything
//! above that depth when dropped. Drop runs on every exit path: normal end
//! of scope, early `return`, `?`, and panic unwinding.
//!
//! # Usage
//!
//! ```text
//! {
//!     let scoped = state.scoped();
//!     let player = scoped.get_table("Player");
//!     let name = player.get_string("Name").value();
//! } // Player and Name popped here
//!
//! // Closure-based
//! state.run_context(|state| state.get_number("Level").value())
//! ```
//!
//! Guards nest: each one trims back to its own recorded depth only.

use std::ops::Deref;

use crate::State;

/// Guard restoring the stack depth recorded at construction.
///
/// Derefs to [`State`], so the guarded state is used through the guard and
/// an inner guard is made with `outer.scoped()`.
pub struct StackContext<'state> {
    state: &'state State,
    depth: i32,
}

impl<'state> StackContext<'state> {
    pub fn new(state: &'state State) -> Self {
        StackContext {
            state,
            depth: state.size(),
        }
    }

    /// Depth recorded at construction.
    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn state(&self) -> &'state State {
        self.state
    }
}

impl Drop for StackContext<'_> {
    fn drop(&mut self) {
        let current = self.state.size();
        let grown = current - self.depth;
        tracing::trace!(recorded = self.depth, current, "releasing stack context");
        if grown > 0 {
            self.state.pop(grown);
        } else if grown < 0 {
            tracing::trace!(
                below = -grown,
                "scope ended below its recorded depth; nothing popped"
            );
        }
    }
}

impl Deref for StackContext<'_> {
    type Target = State;

    fn deref(&self) -> &State {
        self.state
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
