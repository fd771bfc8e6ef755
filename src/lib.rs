//! Color-scheme templates for pywal-style theming.
//!
//! A [`Template`] is parsed once from text such as
//! `static const char norm_fg[] = "{color15}";` and rendered against a
//! [`Palette`] (or any other [`Values`]) to produce the final file content.

pub mod color;
pub mod error;
pub mod export;
pub mod scheme;
pub mod template;

pub use color::Color;
pub use error::{PaletteError, ParseError, ParseErrorKind, RenderError, TemplateError};
pub use scheme::Palette;
pub use template::{parse, render, render_str, Modifiers, Renderer, Template, Values};
