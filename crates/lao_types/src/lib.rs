//! Lao Types - value types describing positions and contents of the Lua stack.
//!
//! This crate contains the two pure value types the rest of `lualao` builds on:
//! - [`StackIndex`]: a signed slot coordinate (negative = from top, positive = from bottom)
//! - [`TypeTag`]: the closed set of dynamic type codes the engine reports
//!
//! Neither type links against the engine. The discriminants of [`TypeTag`]
//! equal the Lua 5.4 type codes; the engine bindings in `lualao` assert this
//! at compile time.

mod index;
mod type_tag;

pub use index::StackIndex;
pub use type_tag::{type_name, TypeTag};
