//! Chart colors: CSS names or `#rrggbb`, resolved to RGB for translucent overlays.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Named colors accepted in chart configuration.
const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("blue", [0, 0, 255]),
    ("brown", [165, 42, 42]),
    ("crimson", [220, 20, 60]),
    ("cyan", [0, 255, 255]),
    ("darkblue", [0, 0, 139]),
    ("darkgray", [169, 169, 169]),
    ("darkgreen", [0, 100, 0]),
    ("darkorange", [255, 140, 0]),
    ("darkred", [139, 0, 0]),
    ("gold", [255, 215, 0]),
    ("gray", [128, 128, 128]),
    ("green", [0, 128, 0]),
    ("indigo", [75, 0, 130]),
    ("lightgray", [211, 211, 211]),
    ("magenta", [255, 0, 255]),
    ("navy", [0, 0, 128]),
    ("olive", [128, 128, 0]),
    ("orange", [255, 165, 0]),
    ("pink", [255, 192, 203]),
    ("purple", [128, 0, 128]),
    ("red", [255, 0, 0]),
    ("steelblue", [70, 130, 180]),
    ("teal", [0, 128, 128]),
    ("violet", [238, 130, 238]),
    ("yellow", [255, 255, 0]),
];

/// A validated chart color. Keeps the spelling it was configured with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChartColor {
    name: String,
    rgb: [u8; 3],
}

impl ChartColor {
    /// Parse a CSS color name (case-insensitive) or a `#rrggbb` hex string.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let rgb = match trimmed.strip_prefix('#') {
            Some(hex) => parse_hex(hex)?,
            None => {
                let lower = trimmed.to_ascii_lowercase();
                NAMED_COLORS
                    .iter()
                    .find(|(name, _)| *name == lower)
                    .map(|(_, rgb)| *rgb)?
            }
        };
        Some(Self {
            name: trimmed.to_string(),
            rgb,
        })
    }

    /// Color as configured.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn rgb(&self) -> [u8; 3] {
        self.rgb
    }

    /// `rgba(r,g,b,a)` string for translucent strokes.
    #[must_use]
    pub fn rgba(&self, alpha: f64) -> String {
        let [r, g, b] = self.rgb;
        format!("rgba({r},{g},{b},{alpha})")
    }
}

fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

impl fmt::Display for ChartColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl TryFrom<String> for ChartColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown chart color {value:?}"))
    }
}

impl From<ChartColor> for String {
    fn from(value: ChartColor) -> Self {
        value.name
    }
}
