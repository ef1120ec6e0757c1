//! Platform glyphs for the symbolic statuses.

/// Whether the current terminal can be trusted to draw unicode glyphs.
///
/// The classic Windows console cannot; the VS Code integrated terminal and
/// Windows Terminal can.
pub fn supports_unicode() -> bool {
    !cfg!(windows)
        || std::env::var("TERM_PROGRAM").is_ok_and(|v| v == "vscode")
        || std::env::var_os("WT_SESSION").is_some()
}

/// Default prefixes for the success/fail/warn/info statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbols {
    pub succeed: &'static str,
    pub fail: &'static str,
    pub warn: &'static str,
    pub info: &'static str,
}

impl Symbols {
    pub const UNICODE: Symbols = Symbols {
        succeed: "✓",
        fail: "✖",
        warn: "⚠",
        info: "ℹ",
    };

    pub const ASCII: Symbols = Symbols {
        succeed: "√",
        fail: "×",
        warn: "!!",
        info: "i",
    };

    pub fn for_terminal(unicode: bool) -> Symbols {
        if unicode {
            Symbols::UNICODE
        } else {
            Symbols::ASCII
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_terminal() {
        assert_eq!(Symbols::for_terminal(true).succeed, "✓");
        assert_eq!(Symbols::for_terminal(false).warn, "!!");
    }
}
