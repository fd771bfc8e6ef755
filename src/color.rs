use anyhow::{bail, Result};
use palette::{FromColor, Hsl, Srgb};

/// An sRGB color as it appears in a palette value.
///
/// Palette values are plain strings; this type is only materialized when a
/// modifier needs channel access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color string like `#ff8800`, `FF8800` or ` ff8800 `.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let trimmed = hex.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            bail!("invalid hex color {hex:?}: expected 6 hex digits");
        }
        let r = u8::from_str_radix(&digits[0..2], 16)?;
        let g = u8::from_str_radix(&digits[2..4], 16)?;
        let b = u8::from_str_radix(&digits[4..6], 16)?;
        Ok(Self { r, g, b })
    }

    /// Serialize to lowercase hex `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{}", self.strip())
    }

    /// Lowercase hex digits without the leading `#`.
    pub fn strip(self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// The color packed as a 24-bit integer, `0xrrggbb`.
    pub fn to_u32(self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }

    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Mix toward white. `amount` is a fraction in [0, 1].
    pub fn lighten(self, amount: f64) -> Color {
        let amount = amount.clamp(0.0, 1.0);
        let [r, g, b] = self
            .channels()
            .map(|c| (f64::from(c) + (255.0 - f64::from(c)) * amount) as u8);
        Color::new(r, g, b)
    }

    /// Scale toward black. `amount` is a fraction in [0, 1].
    pub fn darken(self, amount: f64) -> Color {
        let amount = amount.clamp(0.0, 1.0);
        let [r, g, b] = self
            .channels()
            .map(|c| (f64::from(c) * (1.0 - amount)) as u8);
        Color::new(r, g, b)
    }

    /// Replace the HSL saturation with `amount`, keeping hue and lightness.
    pub fn saturate(self, amount: f32) -> Color {
        let srgb: Srgb<f32> = Srgb::new(self.r, self.g, self.b).into_format();
        let mut hsl = Hsl::from_color(srgb);
        hsl.saturation = amount.clamp(0.0, 1.0);
        let out = Srgb::from_color(hsl);
        // Channels truncate rather than round.
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0) as u8;
        Color::new(channel(out.red), channel(out.green), channel(out.blue))
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };

    #[test]
    fn hex_parses_with_and_without_hash() {
        let color = Color::from_hex("#ff8800").unwrap();
        assert_eq!((color.r, color.g, color.b), (255, 136, 0));
        assert_eq!(Color::from_hex("ff8800").unwrap(), color);
    }

    #[test]
    fn hex_uppercase_input() {
        let color = Color::from_hex("#FF8800").unwrap();
        assert_eq!(color.to_hex(), "#ff8800");
    }

    #[test]
    fn hex_surrounding_whitespace_is_ignored() {
        let color = Color::from_hex("  1a1b26  ").unwrap();
        assert_eq!(color.strip(), "1a1b26");
    }

    #[test]
    fn hex_invalid_length() {
        assert!(Color::from_hex("#fff").is_err());
        assert!(Color::from_hex("").is_err());
    }

    #[test]
    fn hex_invalid_chars() {
        assert!(Color::from_hex("#gggggg").is_err());
        assert!(Color::from_hex("#+f+f+f").is_err());
        // Multi-byte input must not panic on slicing.
        assert!(Color::from_hex("ééé").is_err());
    }

    #[test]
    fn packed_value() {
        let color = Color::from_hex("#1f211e").unwrap();
        assert_eq!(color.to_u32(), 2_040_094);
    }

    #[test]
    fn lighten_fully_gives_white() {
        assert_eq!(BLACK.lighten(1.0), WHITE);
    }

    #[test]
    fn lighten_truncates_channels() {
        let color = Color::from_hex("#d0d0d1").unwrap();
        assert_eq!(color.lighten(0.2).to_hex(), "#d9d9da");
    }

    #[test]
    fn darken_fully_gives_black() {
        assert_eq!(WHITE.darken(1.0), BLACK);
    }

    #[test]
    fn darken_truncates_channels() {
        let color = Color::from_hex("#a3a3a4").unwrap();
        assert_eq!(color.darken(0.2).strip(), "828283");
    }

    #[test]
    fn saturate_sets_saturation() {
        let color = Color::from_hex("#262826").unwrap();
        assert_eq!(color.saturate(0.5), Color::new(19, 58, 19));
    }

    #[test]
    fn saturate_zero_gives_gray() {
        let color = Color::new(200, 50, 50);
        let gray = color.saturate(0.0);
        assert_eq!(gray.r, gray.g);
        assert_eq!(gray.g, gray.b);
    }

    #[test]
    fn display_matches_to_hex() {
        let color = Color::new(171, 205, 239);
        assert_eq!(format!("{color}"), color.to_hex());
    }
}
