//! Pure text-layout helpers: wrapping, hanging indents and line measurement.
//!
//! A rendered spinner is laid out in three stages:
//!
//! 1. [`break_text`] wraps the body to `columns - prefix - indent - 1`.
//! 2. [`indent_text`] pads every continuation line by `prefix + indent` so it
//!    sits under the first line's text.
//! 3. [`second_stage_indent`] shifts the block start (the prefix line) right
//!    by `indent`.
//!
//! [`lines_length`] measures the printable width of each visual line with
//! escape sequences removed; the repaint loop uses it for shrink-clearing.

use std::sync::OnceLock;

use regex::Regex;
use textwrap::{Options, WordSplitter, WrapAlgorithm};
use unicode_width::UnicodeWidthStr;

/// Column count assumed when the stream cannot report one.
pub const DEFAULT_COLUMNS: usize = 95;

/// Line separator written between rendered lines.
pub const EOL: &str = "\n";

fn line_break() -> &'static Regex {
    static LINE_BREAK: OnceLock<Regex> = OnceLock::new();
    LINE_BREAK.get_or_init(|| Regex::new(r"\r\n|\r|\n").expect("regex is valid"))
}

/// Split on `\r\n`, `\r` or `\n`.
pub fn split_lines(text: &str) -> Vec<&str> {
    line_break().split(text).collect()
}

/// The body width available once prefix, indent and the cursor column are
/// taken out of `columns`. Never less than 1.
pub fn wrap_width(columns: usize, prefix_len: usize, indent: usize) -> usize {
    columns
        .saturating_sub(prefix_len + indent + 1)
        .max(1)
}

/// Wrap `text` to the width left by the prefix and indent.
///
/// Words longer than the width are broken. Existing line breaks are kept.
pub fn break_text(text: &str, prefix_len: usize, indent: usize, columns: usize) -> String {
    let width = wrap_width(columns, prefix_len, indent);
    let options = Options::new(width)
        .break_words(true)
        .word_splitter(WordSplitter::NoHyphenation)
        .wrap_algorithm(WrapAlgorithm::FirstFit);

    split_lines(text)
        .into_iter()
        .flat_map(|line| {
            textwrap::wrap(line, &options)
                .into_iter()
                .map(|cow| cow.into_owned())
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .join(EOL)
}

/// Pad every line after the first by `prefix_len + indent` spaces.
pub fn indent_text(text: &str, prefix_len: usize, indent: usize) -> String {
    if prefix_len == 0 && indent == 0 {
        return text.to_string();
    }
    let pad = " ".repeat(prefix_len + indent);
    split_lines(text)
        .into_iter()
        .enumerate()
        .map(|(index, line)| {
            if index == 0 {
                line.to_string()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join(EOL)
}

/// Shift the start of the block right by `indent` spaces.
pub fn second_stage_indent(text: &str, indent: usize) -> String {
    format!("{}{}", " ".repeat(indent), text)
}

/// `text` with every escape sequence removed.
pub fn plain_text(text: &str) -> String {
    strip_ansi_escapes::strip_str(text)
}

/// Printable width of `text`, escape sequences excluded.
pub fn display_width(text: &str) -> usize {
    plain_text(text).width()
}

/// Printable width of each visual line of `text`.
pub fn lines_length(text: &str) -> Vec<usize> {
    let plain = plain_text(text);
    split_lines(&plain)
        .into_iter()
        .map(UnicodeWidthStr::width)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── wrapping ──────────────────────────────────────────────────────────

    #[test]
    fn test_wrap_width_floor_is_one() {
        assert_eq!(wrap_width(10, 8, 4), 1);
        assert_eq!(wrap_width(0, 0, 0), 1);
        assert_eq!(wrap_width(80, 2, 0), 77);
    }

    #[test]
    fn test_break_text_short_text_untouched() {
        assert_eq!(break_text("hello world", 2, 0, 80), "hello world");
    }

    #[test]
    fn test_break_text_line_count_matches_ceil() {
        for (len, prefix, indent, columns) in [
            (10, 2, 0, 20),
            (50, 2, 0, 20),
            (51, 2, 2, 20),
            (7, 0, 0, 4),
            (30, 5, 5, 8),
            (1, 0, 0, 1),
        ] {
            let body = "x".repeat(len);
            let wrapped = break_text(&body, prefix, indent, columns);
            let width = wrap_width(columns, prefix, indent);
            let expected = len.div_ceil(width);
            assert_eq!(
                split_lines(&wrapped).len(),
                expected,
                "len={len} prefix={prefix} indent={indent} columns={columns}"
            );
        }
    }

    #[test]
    fn test_break_text_monotone_in_length_and_width() {
        let mut previous = 0;
        for len in 1..60 {
            let lines = split_lines(&break_text(&"y".repeat(len), 2, 1, 16)).len();
            assert!(lines >= previous);
            previous = lines;
        }
        let mut previous = usize::MAX;
        for columns in 4..40 {
            let lines = split_lines(&break_text(&"y".repeat(40), 2, 1, columns)).len();
            assert!(lines <= previous);
            previous = lines;
        }
    }

    #[test]
    fn test_break_text_keeps_existing_breaks() {
        let wrapped = break_text("first\r\nsecond\rthird", 0, 0, 80);
        assert_eq!(wrapped, "first\nsecond\nthird");
    }

    #[test]
    fn test_break_text_wraps_on_words() {
        let wrapped = break_text("alpha beta gamma", 0, 0, 12);
        assert_eq!(split_lines(&wrapped), vec!["alpha beta", "gamma"]);
    }

    // ── indentation ───────────────────────────────────────────────────────

    #[test]
    fn test_indent_text_noop_without_prefix_or_indent() {
        assert_eq!(indent_text("a\nb", 0, 0), "a\nb");
    }

    #[test]
    fn test_indent_text_hanging_indent() {
        assert_eq!(indent_text("a\nb\nc", 2, 1), "a\n   b\n   c");
    }

    #[test]
    fn test_second_stage_indent_only_shifts_block_start() {
        assert_eq!(second_stage_indent("- a\n     b", 2), "  - a\n     b");
    }

    #[test]
    fn test_full_layout_aligns_continuation_under_text() {
        let indent = 2;
        let prefix = "- ";
        let body = break_text("aaaa bbbb", prefix.len(), indent, 11);
        let body = indent_text(&body, prefix.len(), indent);
        let block = second_stage_indent(&format!("{prefix}{body}"), indent);
        let lines = split_lines(&block);
        assert_eq!(lines, vec!["  - aaaa", "    bbbb"]);
    }

    // ── measuring ─────────────────────────────────────────────────────────

    #[test]
    fn test_lines_length_ignores_escape_sequences() {
        let text = "\u{1b}[32m✓ done\u{1b}[39m\n\u{1b}[90mtrace\u{1b}[39m";
        assert_eq!(lines_length(text), vec![6, 5]);
    }

    #[test]
    fn test_plain_text_removes_colors_and_cursor_moves() {
        assert_eq!(plain_text("\u{1b}[32mok\u{1b}[39m\u{1b}[2A"), "ok");
    }

    #[test]
    fn test_display_width() {
        assert_eq!(display_width("\u{1b}[31mabc\u{1b}[0m"), 3);
        assert_eq!(display_width("⠋ x"), 3);
    }

    #[test]
    fn test_lines_length_trailing_newline_counts_empty_line() {
        assert_eq!(lines_length("ab\n"), vec![2, 0]);
    }
}
