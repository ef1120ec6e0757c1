//! Palette colors rendered as ANSI foreground sequences.

use crossterm::style::{self, Stylize};
use multispin_core::Color;

/// Map a palette color onto the terminal's 16-color set.
///
/// The plain names are the dim half of the set and the `*Bright` names the
/// bright half. `white` is the light grey most terminals draw for "white",
/// `gray` is bright black.
pub fn to_crossterm(color: Color) -> style::Color {
    match color {
        Color::Black => style::Color::Black,
        Color::Red => style::Color::DarkRed,
        Color::Green => style::Color::DarkGreen,
        Color::Yellow => style::Color::DarkYellow,
        Color::Blue => style::Color::DarkBlue,
        Color::Magenta => style::Color::DarkMagenta,
        Color::Cyan => style::Color::DarkCyan,
        Color::White => style::Color::Grey,
        Color::Gray => style::Color::DarkGrey,
        Color::RedBright => style::Color::Red,
        Color::GreenBright => style::Color::Green,
        Color::YellowBright => style::Color::Yellow,
        Color::BlueBright => style::Color::Blue,
        Color::MagentaBright => style::Color::Magenta,
        Color::CyanBright => style::Color::Cyan,
        Color::WhiteBright => style::Color::White,
    }
}

/// Wrap `text` in the foreground color, or return it untouched when `color`
/// is `None` or `text` is empty.
pub fn paint(text: &str, color: Option<Color>) -> String {
    match color {
        Some(color) if !text.is_empty() => text.with(to_crossterm(color)).to_string(),
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use multispin_core::layout::display_width;

    #[test]
    fn test_paint_without_color_is_identity() {
        assert_eq!(paint("plain", None), "plain");
    }

    #[test]
    fn test_paint_empty_text_stays_empty() {
        assert_eq!(paint("", Some(Color::Red)), "");
    }

    #[test]
    fn test_paint_keeps_printable_width() {
        let painted = paint("✓ done", Some(Color::Green));
        assert!(painted.contains("✓ done"));
        assert_eq!(display_width(&painted), 6);
    }

    #[test]
    fn test_bright_and_dim_halves_differ() {
        for (dim, bright) in [
            (Color::Red, Color::RedBright),
            (Color::Green, Color::GreenBright),
            (Color::Cyan, Color::CyanBright),
            (Color::White, Color::WhiteBright),
        ] {
            assert_ne!(to_crossterm(dim), to_crossterm(bright));
        }
    }

    #[test]
    fn test_gray_is_bright_black() {
        assert_eq!(to_crossterm(Color::Gray), style::Color::DarkGrey);
    }
}
