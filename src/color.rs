//! Color parsing and formatting at the settings boundary.
//!
//! Text from the page (theme custom property, color picker, persisted value)
//! is parsed once into [`Color`]; nothing past this module handles raw color
//! strings.

use std::fmt;
use std::str::FromStr;

/// Used when neither the theme nor persisted storage supplies a usable color.
pub const FALLBACK_COLOR: Color = Color::new(0x00, 0x9c, 0xbf);

/// An opaque RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColorError {
    Empty,
    /// Hex body was not 3 or 6 hex digits.
    BadHex(String),
    /// `rgb()`/`rgba()` with fewer than three integer channels, or a channel above 255.
    BadRgb(String),
    Unrecognized(String),
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorError::Empty => write!(f, "empty color"),
            ColorError::BadHex(s) => write!(f, "invalid hex color {s:?}"),
            ColorError::BadRgb(s) => write!(f, "invalid rgb() color {s:?}"),
            ColorError::Unrecognized(s) => write!(f, "unrecognized color {s:?}"),
        }
    }
}

impl std::error::Error for ColorError {}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn rgb(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Canonical `#rrggbb` form, lowercase.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parse `text`, or return `fallback` when it is not a color.
    pub fn parse_or(text: &str, fallback: Color) -> Color {
        text.parse().unwrap_or(fallback)
    }

    pub fn with_alpha(self, a: f64) -> Rgba {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorError;

    /// Accepts `#rrggbb`, `#rgb` (with or without `#`) and `rgb(r,g,b)` /
    /// `rgba(r,g,b,a)`; the alpha channel is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ColorError::Empty);
        }
        if s.starts_with("rgb") {
            return parse_rgb_fn(s);
        }
        let body = s.strip_prefix('#').unwrap_or(s);
        if !body.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(if s.starts_with('#') {
                ColorError::BadHex(s.to_string())
            } else {
                ColorError::Unrecognized(s.to_string())
            });
        }
        let expanded: String = match body.len() {
            3 => body.chars().flat_map(|c| [c, c]).collect(),
            6 => body.to_string(),
            _ => return Err(ColorError::BadHex(s.to_string())),
        };
        let num = u32::from_str_radix(&expanded, 16).map_err(|_| ColorError::BadHex(s.to_string()))?;
        Ok(Color::new((num >> 16) as u8, (num >> 8) as u8, num as u8))
    }
}

fn parse_rgb_fn(s: &str) -> Result<Color, ColorError> {
    let bad = || ColorError::BadRgb(s.to_string());
    let inner = s
        .trim_start_matches("rgba")
        .trim_start_matches("rgb")
        .trim()
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(bad)?;
    let mut channels = inner.split(',').map(|part| part.trim().parse::<u8>());
    let mut next = || channels.next().ok_or_else(bad)?.map_err(|_| bad());
    Ok(Color::new(next()?, next()?, next()?))
}

/// Color plus opacity, as handed to a drawing surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0,
        g: 0,
        b: 0,
        a: 0.0,
    };

    /// CSS `rgba()` text, as canvas fill/stroke styles expect.
    pub fn to_css(self) -> String {
        format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}
