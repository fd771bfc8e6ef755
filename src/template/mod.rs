//! Placeholder templates: `{key}`, `{key.modifier}`, `{{` / `}}` escapes.
//!
//! Parsing produces an immutable [`Template`] that can be rendered any
//! number of times against different [`Values`].

pub mod modifier;
pub mod parse;
pub mod render;

pub use modifier::{ChainState, Modifier, ModifierFn, Modifiers, StatefulModifierFn};
pub use parse::{parse, ModifierCall, Placeholder, Segment, Template};
pub use render::{render, render_str, Renderer, Values};
