use std::collections::HashMap;
use std::sync::OnceLock;

use anyhow::{bail, Result};

use crate::color::Color;

/// Alpha used when the values carry no `alpha` entry.
pub const DEFAULT_ALPHA: &str = "100";

/// A named transformation applied to a resolved value.
///
/// Receives the current value and the numeric arguments written in the
/// template (`lighten(20)` passes `[20.0]`).
pub type ModifierFn = fn(&str, &[f64]) -> Result<String>;

/// A modifier that also reads or updates the [`ChainState`].
pub type StatefulModifierFn = fn(&str, &[f64], &mut ChainState) -> Result<String>;

/// State carried along the modifier chain of one placeholder.
///
/// `alpha` starts as the `alpha` value of the palette (or
/// [`DEFAULT_ALPHA`]) and is replaced by `adjust_alpha(n)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainState {
    pub alpha: String,
}

impl ChainState {
    pub fn new(alpha: Option<&str>) -> Self {
        Self {
            alpha: alpha.unwrap_or(DEFAULT_ALPHA).to_owned(),
        }
    }
}

impl Default for ChainState {
    fn default() -> Self {
        Self::new(None)
    }
}

#[derive(Clone, Copy)]
pub enum Modifier {
    Plain(ModifierFn),
    Stateful(StatefulModifierFn),
}

impl Modifier {
    pub fn apply(self, value: &str, args: &[f64], state: &mut ChainState) -> Result<String> {
        match self {
            Modifier::Plain(f) => f(value, args),
            Modifier::Stateful(f) => f(value, args, state),
        }
    }
}

/// Registry of modifiers, looked up by name at render time.
#[derive(Clone, Default)]
pub struct Modifiers {
    table: HashMap<String, Modifier>,
}

impl std::fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

impl Modifiers {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in modifier.
    pub fn builtin() -> Self {
        let mut modifiers = Self::new();
        for (name, modifier) in BUILTINS {
            modifiers.table.insert((*name).to_owned(), *modifier);
        }
        modifiers
    }

    /// Register `f` under `name`, returning any modifier it replaces.
    pub fn register(&mut self, name: impl Into<String>, f: ModifierFn) -> Option<Modifier> {
        self.table.insert(name.into(), Modifier::Plain(f))
    }

    pub fn register_stateful(
        &mut self,
        name: impl Into<String>,
        f: StatefulModifierFn,
    ) -> Option<Modifier> {
        self.table.insert(name.into(), Modifier::Stateful(f))
    }

    pub fn get(&self, name: &str) -> Option<Modifier> {
        self.table.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.table.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Shared built-in registry, built on first use.
pub(crate) fn builtin() -> &'static Modifiers {
    static BUILTIN: OnceLock<Modifiers> = OnceLock::new();
    BUILTIN.get_or_init(Modifiers::builtin)
}

const BUILTINS: &[(&str, Modifier)] = &[
    ("strip", Modifier::Plain(strip)),
    ("rgb", Modifier::Plain(rgb)),
    ("rgbspace", Modifier::Plain(rgbspace)),
    ("rgba", Modifier::Stateful(rgba)),
    ("xrgba", Modifier::Plain(xrgba)),
    ("red", Modifier::Plain(red)),
    ("green", Modifier::Plain(green)),
    ("blue", Modifier::Plain(blue)),
    ("red_hex", Modifier::Plain(red_hex)),
    ("green_hex", Modifier::Plain(green_hex)),
    ("blue_hex", Modifier::Plain(blue_hex)),
    ("red_dec", Modifier::Plain(red_dec)),
    ("green_dec", Modifier::Plain(green_dec)),
    ("blue_dec", Modifier::Plain(blue_dec)),
    ("decimal", Modifier::Plain(decimal)),
    ("decimal_strip", Modifier::Plain(decimal_strip)),
    ("octal", Modifier::Plain(octal)),
    ("octal_strip", Modifier::Plain(octal_strip)),
    ("w3_luminance", Modifier::Plain(w3_luminance)),
    ("alpha", Modifier::Stateful(alpha)),
    ("alpha_dec", Modifier::Stateful(alpha_dec)),
    ("alpha_hex", Modifier::Stateful(alpha_hex)),
    ("hex_argb", Modifier::Stateful(hex_argb)),
    ("adjust_alpha", Modifier::Stateful(adjust_alpha)),
    ("lighten", Modifier::Plain(lighten)),
    ("darken", Modifier::Plain(darken)),
    ("saturate", Modifier::Plain(saturate)),
];

fn no_args(args: &[f64]) -> Result<()> {
    if !args.is_empty() {
        bail!("takes no arguments, got {}", args.len());
    }
    Ok(())
}

/// A single percentage argument as a fraction. The sign is ignored.
fn percent(args: &[f64]) -> Result<f64> {
    match args {
        [p] => Ok(p.abs() / 100.0),
        _ => bail!("expects one percentage argument, got {}", args.len()),
    }
}

fn hex(value: &str, args: &[f64]) -> Result<Color> {
    no_args(args)?;
    Color::from_hex(value)
}

/// Format a derived color with the same `#` convention as its input.
fn like_input(input: &str, color: Color) -> String {
    if input.trim_start().starts_with('#') {
        color.to_hex()
    } else {
        color.strip()
    }
}

/// Trim surrounding whitespace, then drop one leading `#`.
fn strip(value: &str, args: &[f64]) -> Result<String> {
    no_args(args)?;
    let trimmed = value.trim();
    Ok(trimmed.strip_prefix('#').unwrap_or(trimmed).to_owned())
}

fn rgb(value: &str, args: &[f64]) -> Result<String> {
    let c = hex(value, args)?;
    Ok(format!("{},{},{}", c.r, c.g, c.b))
}

fn rgbspace(value: &str, args: &[f64]) -> Result<String> {
    let c = hex(value, args)?;
    Ok(format!("{} {} {}", c.r, c.g, c.b))
}

fn xrgba(value: &str, args: &[f64]) -> Result<String> {
    let c = hex(value, args)?;
    Ok(format!("{:02x}/{:02x}/{:02x}/ff", c.r, c.g, c.b))
}

fn unit(channel: u8) -> String {
    format!("{:.3}", f64::from(channel) / 255.0)
}

fn red(value: &str, args: &[f64]) -> Result<String> {
    Ok(unit(hex(value, args)?.r))
}

fn green(value: &str, args: &[f64]) -> Result<String> {
    Ok(unit(hex(value, args)?.g))
}

fn blue(value: &str, args: &[f64]) -> Result<String> {
    Ok(unit(hex(value, args)?.b))
}

/// Two hex digits of a channel, in the case they were written.
fn channel_digits(value: &str, args: &[f64], channel: usize) -> Result<String> {
    hex(value, args)?;
    let trimmed = value.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    Ok(digits[channel * 2..channel * 2 + 2].to_owned())
}

fn red_hex(value: &str, args: &[f64]) -> Result<String> {
    channel_digits(value, args, 0)
}

fn green_hex(value: &str, args: &[f64]) -> Result<String> {
    channel_digits(value, args, 1)
}

fn blue_hex(value: &str, args: &[f64]) -> Result<String> {
    channel_digits(value, args, 2)
}

fn red_dec(value: &str, args: &[f64]) -> Result<String> {
    Ok(hex(value, args)?.r.to_string())
}

fn green_dec(value: &str, args: &[f64]) -> Result<String> {
    Ok(hex(value, args)?.g.to_string())
}

fn blue_dec(value: &str, args: &[f64]) -> Result<String> {
    Ok(hex(value, args)?.b.to_string())
}

fn decimal(value: &str, args: &[f64]) -> Result<String> {
    Ok(format!("#{}", hex(value, args)?.to_u32()))
}

fn decimal_strip(value: &str, args: &[f64]) -> Result<String> {
    Ok(hex(value, args)?.to_u32().to_string())
}

fn octal(value: &str, args: &[f64]) -> Result<String> {
    Ok(format!("#{:o}", hex(value, args)?.to_u32()))
}

fn octal_strip(value: &str, args: &[f64]) -> Result<String> {
    Ok(format!("{:o}", hex(value, args)?.to_u32()))
}

/// WCAG relative luminance, computed from the 3-decimal channel values.
fn w3_luminance(value: &str, args: &[f64]) -> Result<String> {
    let c = hex(value, args)?;
    let linear = |channel: u8| {
        let v: f64 = unit(channel).parse().unwrap_or_default();
        if v <= 0.04045 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    };
    let luminance = 0.2126 * linear(c.r) + 0.7152 * linear(c.g) + 0.0722 * linear(c.b);
    Ok(format!("{luminance:?}"))
}

/// Normalize an alpha to an integer percentage in [0, 100].
///
/// Negative values use their magnitude and fractions below 1 are scaled
/// by 100, so `0.7`, `70` and `-70` all mean 70.
pub fn alpha_percent(alpha: &str) -> Result<u32> {
    let a: f64 = match alpha.trim().parse() {
        Ok(a) if f64::is_finite(a) => a,
        _ => bail!("invalid alpha value {alpha:?}"),
    };
    let mut a = a.abs();
    if a < 1.0 {
        a *= 100.0;
    }
    Ok(a.min(100.0) as u32)
}

fn alpha_byte(state: &ChainState) -> Result<u32> {
    Ok(alpha_percent(&state.alpha)? * 255 / 100)
}

fn rgba(value: &str, args: &[f64], state: &mut ChainState) -> Result<String> {
    let c = hex(value, args)?;
    let a = f64::from(alpha_percent(&state.alpha)?) / 100.0;
    Ok(format!("rgba({},{},{},{a:?})", c.r, c.g, c.b))
}

/// URxvt style `[alpha]#rrggbb`.
fn alpha(value: &str, args: &[f64], state: &mut ChainState) -> Result<String> {
    no_args(args)?;
    Ok(format!("[{}]{}", alpha_percent(&state.alpha)?, value))
}

fn alpha_dec(_: &str, args: &[f64], state: &mut ChainState) -> Result<String> {
    no_args(args)?;
    let a = f64::from(alpha_percent(&state.alpha)?) / 100.0;
    Ok(format!("{a:?}"))
}

fn alpha_hex(_: &str, args: &[f64], state: &mut ChainState) -> Result<String> {
    no_args(args)?;
    Ok(format!("{:02X}", alpha_byte(state)?))
}

fn hex_argb(value: &str, args: &[f64], state: &mut ChainState) -> Result<String> {
    hex(value, args)?;
    let trimmed = value.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    Ok(format!("#{:02X}{digits}", alpha_byte(state)?))
}

/// Replace the alpha for the rest of the chain; the value passes through.
fn adjust_alpha(value: &str, args: &[f64], state: &mut ChainState) -> Result<String> {
    let alpha = match args {
        [] => DEFAULT_ALPHA.to_owned(),
        [a] => a.to_string(),
        _ => bail!("expects at most one alpha argument, got {}", args.len()),
    };
    alpha_percent(&alpha)?;
    state.alpha = alpha;
    Ok(value.to_owned())
}

fn lighten(value: &str, args: &[f64]) -> Result<String> {
    let amount = percent(args)?;
    Ok(like_input(value, Color::from_hex(value)?.lighten(amount)))
}

fn darken(value: &str, args: &[f64]) -> Result<String> {
    let amount = percent(args)?;
    Ok(like_input(value, Color::from_hex(value)?.darken(amount)))
}

fn saturate(value: &str, args: &[f64]) -> Result<String> {
    let amount = percent(args)?;
    Ok(like_input(value, Color::from_hex(value)?.saturate(amount as f32)))
}
