use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use crate::error::{RenderError, TemplateError};

use super::modifier::{self, ChainState, Modifiers};
use super::parse::{parse, Placeholder, Segment, Template};

/// Something placeholders can be resolved against.
pub trait Values {
    fn lookup(&self, key: &str) -> Option<&str>;
}

impl<K, V, S> Values for HashMap<K, V, S>
where
    K: Borrow<str> + Hash + Eq,
    V: AsRef<str>,
    S: BuildHasher,
{
    fn lookup(&self, key: &str) -> Option<&str> {
        self.get(key).map(AsRef::as_ref)
    }
}

impl<K, V> Values for BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: AsRef<str>,
{
    fn lookup(&self, key: &str) -> Option<&str> {
        self.get(key).map(AsRef::as_ref)
    }
}

impl<T: Values + ?Sized> Values for &T {
    fn lookup(&self, key: &str) -> Option<&str> {
        (**self).lookup(key)
    }
}

/// Renders templates with a particular modifier registry.
#[derive(Debug, Clone)]
pub struct Renderer {
    modifiers: Modifiers,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Modifiers::builtin())
    }
}

impl Renderer {
    pub fn new(modifiers: Modifiers) -> Self {
        Self { modifiers }
    }

    pub fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }

    pub fn modifiers_mut(&mut self) -> &mut Modifiers {
        &mut self.modifiers
    }

    /// Substitute `values` into `template`.
    ///
    /// All-or-nothing: the first unresolved placeholder aborts the render and
    /// no partial output is returned.
    pub fn render<V: Values + ?Sized>(
        &self,
        template: &Template,
        values: &V,
    ) -> Result<String, RenderError> {
        render_with(&self.modifiers, template, values)
    }
}

/// Substitute `values` into `template` using the built-in modifiers.
pub fn render<V: Values + ?Sized>(template: &Template, values: &V) -> Result<String, RenderError> {
    render_with(modifier::builtin(), template, values)
}

/// Parse `text` and render it in one step.
pub fn render_str<V: Values + ?Sized>(text: &str, values: &V) -> Result<String, TemplateError> {
    let template = parse(text)?;
    Ok(render(&template, values)?)
}

fn render_with<V: Values + ?Sized>(
    modifiers: &Modifiers,
    template: &Template,
    values: &V,
) -> Result<String, RenderError> {
    let mut out = String::new();
    for segment in template.segments() {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder(placeholder) => {
                out.push_str(&resolve(modifiers, placeholder, values)?);
            }
        }
    }
    Ok(out)
}

fn resolve<V: Values + ?Sized>(
    modifiers: &Modifiers,
    placeholder: &Placeholder,
    values: &V,
) -> Result<String, RenderError> {
    let mut value = values
        .lookup(&placeholder.key)
        .ok_or_else(|| RenderError::UnknownKey {
            key: placeholder.key.clone(),
        })?
        .to_owned();

    // `adjust_alpha` only affects the rest of this placeholder's chain.
    let mut state = ChainState::new(values.lookup("alpha"));
    for call in &placeholder.modifiers {
        let modifier = modifiers
            .get(&call.name)
            .ok_or_else(|| RenderError::UnknownModifier {
                name: call.name.clone(),
            })?;
        value = modifier
            .apply(&value, &call.args, &mut state)
            .map_err(|err| RenderError::InvalidValue {
            modifier: call.name.clone(),
            value: value.clone(),
            reason: err.to_string(),
        })?;
    }

    Ok(value)
}
