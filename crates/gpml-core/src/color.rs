//! Color handling for pathway elements.
//!
//! This module provides the [`Color`] type together with the legacy GPML
//! color codec: decoding of named palette colors and hex-binary strings,
//! and encoding back to six-digit hex.
//!
//! The codec is intentionally asymmetric. Decoding accepts both the named
//! palette and hex digits; encoding always emits hex, even when the value
//! matches a palette entry. Historical documents rely on both forms.

use std::fmt;

use log::warn;

/// An opaque RGB color.
///
/// "Transparent" is not a color value. Elements that can be unfilled carry a
/// separate transparency flag next to their fill color, and the format layer
/// maps the `Transparent` sentinel onto that flag.
///
/// # Examples
///
/// ```
/// use gpml_core::color::Color;
///
/// let red = Color::new(255, 0, 0);
/// assert_eq!(red.to_hex_string(), "ff0000");
/// assert_eq!(Color::decode("Red"), red);
/// assert_eq!(Color::decode("ff0000"), red);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
}

/// The fixed palette of named colors the legacy format understands.
///
/// The RGB values reproduce the original palette exactly, including its
/// truncated half-intensity channels (`Gray` is `(127,127,127)`, not 128).
/// `Transparent` decodes to black; whether an element is actually drawn
/// unfilled is tracked separately.
pub const NAMED_COLORS: &[(&str, Color)] = &[
    ("Aqua", Color::new(0, 255, 255)),
    ("Black", Color::new(0, 0, 0)),
    ("Blue", Color::new(0, 0, 255)),
    ("Fuchsia", Color::new(255, 0, 255)),
    ("Gray", Color::new(127, 127, 127)),
    ("Green", Color::new(0, 127, 0)),
    ("Lime", Color::new(0, 255, 0)),
    ("Maroon", Color::new(127, 0, 0)),
    ("Navy", Color::new(0, 0, 127)),
    ("Olive", Color::new(127, 127, 0)),
    ("Purple", Color::new(127, 0, 127)),
    ("Red", Color::new(255, 0, 0)),
    ("Silver", Color::new(191, 191, 191)),
    ("Teal", Color::new(0, 127, 127)),
    ("White", Color::new(255, 255, 255)),
    ("Yellow", Color::new(255, 255, 0)),
    ("Transparent", Color::new(0, 0, 0)),
];

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    /// Outline color applied when deprecated compartment shapes are upgraded.
    pub const LIGHT_GRAY: Color = Color::new(192, 192, 192);

    /// Creates a color from its red, green and blue components
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Returns the red component
    pub fn red(self) -> u8 {
        self.r
    }

    /// Returns the green component
    pub fn green(self) -> u8 {
        self.g
    }

    /// Returns the blue component
    pub fn blue(self) -> u8 {
        self.b
    }

    /// Decodes a legacy color string into a color.
    ///
    /// The string is first looked up in the named palette (case-sensitive,
    /// as in historical documents); anything else is treated as hex digits,
    /// left-padded with `'0'` to six digits and split into R/G/B byte pairs.
    ///
    /// Decoding never fails: a string that is neither a palette name nor
    /// valid hex yields black and a logged warning, because a pathway must
    /// stay viewable even when one decorative attribute is malformed.
    pub fn decode(text: &str) -> Color {
        if let Some((_, color)) = NAMED_COLORS.iter().find(|(name, _)| *name == text) {
            return *color;
        }
        match Self::parse_hex(text) {
            Some(color) => color,
            None => {
                warn!(value = text; "invalid color string, substituting black");
                Color::BLACK
            }
        }
    }

    fn parse_hex(text: &str) -> Option<Color> {
        if text.is_empty() || text.len() > 6 || !text.is_ascii() {
            return None;
        }
        let padded = format!("{text:0>6}");
        let r = u8::from_str_radix(&padded[0..2], 16).ok()?;
        let g = u8::from_str_radix(&padded[2..4], 16).ok()?;
        let b = u8::from_str_radix(&padded[4..6], 16).ok()?;
        Some(Color::new(r, g, b))
    }

    /// Encodes this color as six lowercase hex digits.
    ///
    /// Always hex, never a palette name, matching how current documents are
    /// written.
    pub fn to_hex_string(self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}
