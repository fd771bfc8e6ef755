use std::collections::BTreeMap;

use anyhow::Result;
use serde::Deserialize;

use crate::color::Color;
use crate::error::PaletteError;
use crate::template::Values;

/// The 16 color slots every palette must define.
pub const COLOR_KEYS: [&str; 16] = [
    "color0", "color1", "color2", "color3", "color4", "color5", "color6", "color7", "color8",
    "color9", "color10", "color11", "color12", "color13", "color14", "color15",
];

/// Special names filled from a slot when not supplied explicitly.
pub const ALIASES: [(&str, &str); 3] = [
    ("background", "color0"),
    ("foreground", "color15"),
    ("cursor", "color15"),
];

/// Named color values handed to templates.
///
/// Always holds `color0`..`color15` and the [`ALIASES`]; may hold any
/// number of extra values (`wallpaper`, `alpha`, ...). Values are stored as
/// given, e.g. `"#1a1b26"` or `"1a1b26"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    values: BTreeMap<String, String>,
}

/// The `colors.json` layout written by pywal-style generators.
#[derive(Debug, Deserialize)]
struct SchemeFile {
    #[serde(default)]
    special: BTreeMap<String, String>,
    colors: BTreeMap<String, String>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl Palette {
    /// Build a palette from key/value pairs.
    ///
    /// Fails if any of `color0`..`color15` is missing.
    pub fn new<I, K, V>(values: I) -> Result<Self, PaletteError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut values: BTreeMap<String, String> = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        if let Some(missing) = COLOR_KEYS.iter().find(|key| !values.contains_key(**key)) {
            return Err(PaletteError::MissingKey((*missing).to_owned()));
        }

        for (alias, slot) in ALIASES {
            if !values.contains_key(alias) {
                let value = values[slot].clone();
                values.insert(alias.to_owned(), value);
            }
        }

        Ok(Self { values })
    }

    /// Build a palette of `#rrggbb` values from 16 colors.
    pub fn from_colors(colors: &[Color; 16]) -> Self {
        let mut values: BTreeMap<String, String> = COLOR_KEYS
            .iter()
            .zip(colors)
            .map(|(key, color)| ((*key).to_owned(), color.to_hex()))
            .collect();
        for (alias, slot) in ALIASES {
            let value = values[slot].clone();
            values.insert(alias.to_owned(), value);
        }
        Self { values }
    }

    /// Read a `colors.json` document.
    ///
    /// `special` and `colors` are merged into one namespace, and top-level
    /// scalars such as `wallpaper` and `alpha` become extra values.
    pub fn from_json(text: &str) -> Result<Self, PaletteError> {
        let file: SchemeFile = serde_json::from_str(text)?;

        let scalars = file.extra.into_iter().filter_map(|(key, value)| match value {
            serde_json::Value::String(s) => Some((key, s)),
            serde_json::Value::Number(n) => Some((key, n.to_string())),
            serde_json::Value::Bool(b) => Some((key, b.to_string())),
            _ => None,
        });

        Self::new(scalars.chain(file.special).chain(file.colors))
    }

    /// Add or replace a value.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// The 16 slot values in order.
    pub fn colors(&self) -> impl Iterator<Item = &str> {
        COLOR_KEYS.iter().map(move |key| self.values[*key].as_str())
    }

    /// Parse the 16 slot values as colors.
    pub fn to_colors(&self) -> Result<Vec<Color>> {
        self.colors().map(Color::from_hex).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Values for Palette {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.get(key)
    }
}
