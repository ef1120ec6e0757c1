//! The fixed color palette accepted by status definitions and options.
//!
//! Colors are referenced by their camelCase names (`"redBright"`). A color
//! field may also be explicitly disabled, which is spelled `false` in JSON
//! and [`ColorChoice::Disabled`] in code.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::SpinnersError;

/// One of the sixteen palette colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Gray,
    RedBright,
    GreenBright,
    YellowBright,
    BlueBright,
    MagentaBright,
    CyanBright,
    WhiteBright,
}

impl Color {
    /// Every palette entry, in declaration order.
    pub const ALL: [Color; 16] = [
        Color::Black,
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Blue,
        Color::Magenta,
        Color::Cyan,
        Color::White,
        Color::Gray,
        Color::RedBright,
        Color::GreenBright,
        Color::YellowBright,
        Color::BlueBright,
        Color::MagentaBright,
        Color::CyanBright,
        Color::WhiteBright,
    ];

    /// The camelCase palette name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Black => "black",
            Color::Red => "red",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Blue => "blue",
            Color::Magenta => "magenta",
            Color::Cyan => "cyan",
            Color::White => "white",
            Color::Gray => "gray",
            Color::RedBright => "redBright",
            Color::GreenBright => "greenBright",
            Color::YellowBright => "yellowBright",
            Color::BlueBright => "blueBright",
            Color::MagentaBright => "magentaBright",
            Color::CyanBright => "cyanBright",
            Color::WhiteBright => "whiteBright",
        }
    }
}

impl FromStr for Color {
    type Err = SpinnersError;

    /// Exact (case-sensitive) lookup by palette name.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Color::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == value)
            .ok_or_else(|| SpinnersError::InvalidColor(value.to_string()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ColorChoice ──────────────────────────────────────────────────────────────

/// A color field value: either a palette color or explicitly disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorChoice {
    /// Do not paint.
    Disabled,
    /// Paint with the given palette color.
    Paint(Color),
}

impl ColorChoice {
    /// The color to paint with, if any.
    pub fn color(self) -> Option<Color> {
        match self {
            ColorChoice::Disabled => None,
            ColorChoice::Paint(color) => Some(color),
        }
    }

    /// Validate a raw JSON value against the palette.
    ///
    /// `false` maps to [`ColorChoice::Disabled`], a known palette name to
    /// [`ColorChoice::Paint`]; anything else is rejected with `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(false) => Some(ColorChoice::Disabled),
            Value::String(name) => name.parse().ok().map(ColorChoice::Paint),
            _ => None,
        }
    }
}

impl From<Color> for ColorChoice {
    fn from(color: Color) -> Self {
        ColorChoice::Paint(color)
    }
}

impl From<Option<Color>> for ColorChoice {
    fn from(color: Option<Color>) -> Self {
        color.map_or(ColorChoice::Disabled, ColorChoice::Paint)
    }
}
