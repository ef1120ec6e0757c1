//! Typed spinner options and the lenient purging layer behind them.
//!
//! Options arriving as JSON (config files, scripted callers) are validated
//! field by field. A field with the wrong type, an unknown color name, or an
//! invalid prefix is dropped and the previous or default value stays in
//! effect. Unrecognised keys are dropped the same way. Nothing here returns an
//! error: permissiveness is part of the options contract.

use serde_json::{Map, Value};

use crate::color::ColorChoice;

// ── PrefixChoice ──────────────────────────────────────────────────────────────

/// A prefix field value: a glyph to show, or explicitly no prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefixChoice {
    /// Show no prefix at all.
    Disabled,
    /// Show this glyph.
    Glyph(String),
}

impl PrefixChoice {
    /// The glyph to show, if any.
    pub fn glyph(&self) -> Option<&str> {
        match self {
            PrefixChoice::Disabled => None,
            PrefixChoice::Glyph(glyph) => Some(glyph),
        }
    }

    /// Validate a raw JSON value as a prefix.
    ///
    /// Accepts `false`, strings and numbers (numbers are shown as written).
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(false) => Some(PrefixChoice::Disabled),
            Value::String(glyph) => Some(PrefixChoice::Glyph(glyph.clone())),
            Value::Number(n) => Some(PrefixChoice::Glyph(n.to_string())),
            _ => None,
        }
    }
}

impl From<&str> for PrefixChoice {
    fn from(glyph: &str) -> Self {
        PrefixChoice::Glyph(glyph.to_string())
    }
}

impl From<String> for PrefixChoice {
    fn from(glyph: String) -> Self {
        PrefixChoice::Glyph(glyph)
    }
}

// ── Field rules ───────────────────────────────────────────────────────────────

/// Look up `key` in `obj` and keep it only if `rule` accepts the value.
pub(crate) fn purge<T>(
    obj: &Map<String, Value>,
    key: &str,
    rule: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    let value = obj.get(key)?;
    let purged = rule(value);
    if purged.is_none() {
        tracing::debug!(key, %value, "dropping malformed option");
    }
    purged
}

/// Trace every key of `obj` that is not in `known`.
pub(crate) fn report_unknown(obj: &Map<String, Value>, known: &[&str]) {
    for key in obj.keys().filter(|k| !known.contains(&k.as_str())) {
        tracing::debug!(key = key.as_str(), "dropping unrecognised option");
    }
}

pub(crate) fn string_rule(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

pub(crate) fn bool_rule(value: &Value) -> Option<bool> {
    value.as_bool()
}

pub(crate) fn count_rule(value: &Value) -> Option<usize> {
    value.as_u64().and_then(|n| usize::try_from(n).ok())
}

const COLOR_KEYS: [&str; 6] = [
    "color",
    "succeedColor",
    "failColor",
    "warnColor",
    "infoColor",
    "spinnerColor",
];

const PREFIX_KEYS: [&str; 4] = ["succeedPrefix", "failPrefix", "warnPrefix", "infoPrefix"];

// ── ColorOptions ──────────────────────────────────────────────────────────────

/// Per-status color fields shared by global and per-spinner options.
///
/// `None` means "not given"; `Some(ColorChoice::Disabled)` means "given as
/// `false`".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorOptions {
    /// Color of the spinning status (prefix and text).
    pub color: Option<ColorChoice>,
    pub succeed_color: Option<ColorChoice>,
    pub fail_color: Option<ColorChoice>,
    pub warn_color: Option<ColorChoice>,
    pub info_color: Option<ColorChoice>,
    /// Color of the animated frame glyph.
    pub spinner_color: Option<ColorChoice>,
}

impl ColorOptions {
    /// Extract the color fields of a JSON object.
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            color: purge(obj, "color", ColorChoice::from_value),
            succeed_color: purge(obj, "succeedColor", ColorChoice::from_value),
            fail_color: purge(obj, "failColor", ColorChoice::from_value),
            warn_color: purge(obj, "warnColor", ColorChoice::from_value),
            info_color: purge(obj, "infoColor", ColorChoice::from_value),
            spinner_color: purge(obj, "spinnerColor", ColorChoice::from_value),
        }
    }

    /// `true` when no color field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fields of `other` win over fields of `self`.
    pub fn merged(&self, other: &ColorOptions) -> ColorOptions {
        ColorOptions {
            color: other.color.or(self.color),
            succeed_color: other.succeed_color.or(self.succeed_color),
            fail_color: other.fail_color.or(self.fail_color),
            warn_color: other.warn_color.or(self.warn_color),
            info_color: other.info_color.or(self.info_color),
            spinner_color: other.spinner_color.or(self.spinner_color),
        }
    }
}

// ── PrefixOptions ─────────────────────────────────────────────────────────────

/// Per-status prefix fields shared by global and per-spinner options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixOptions {
    pub succeed_prefix: Option<PrefixChoice>,
    pub fail_prefix: Option<PrefixChoice>,
    pub warn_prefix: Option<PrefixChoice>,
    pub info_prefix: Option<PrefixChoice>,
}

impl PrefixOptions {
    /// Extract the prefix fields of a JSON object.
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            succeed_prefix: purge(obj, "succeedPrefix", PrefixChoice::from_value),
            fail_prefix: purge(obj, "failPrefix", PrefixChoice::from_value),
            warn_prefix: purge(obj, "warnPrefix", PrefixChoice::from_value),
            info_prefix: purge(obj, "infoPrefix", PrefixChoice::from_value),
        }
    }

    /// `true` when no prefix field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fields of `other` win over fields of `self`.
    pub fn merged(&self, other: &PrefixOptions) -> PrefixOptions {
        PrefixOptions {
            succeed_prefix: other
                .succeed_prefix
                .clone()
                .or_else(|| self.succeed_prefix.clone()),
            fail_prefix: other.fail_prefix.clone().or_else(|| self.fail_prefix.clone()),
            warn_prefix: other.warn_prefix.clone().or_else(|| self.warn_prefix.clone()),
            info_prefix: other.info_prefix.clone().or_else(|| self.info_prefix.clone()),
        }
    }
}

// ── SpinnerOptions ────────────────────────────────────────────────────────────

/// Options accepted by `add` and `update` for a single spinner.
///
/// Every field is optional; unset fields leave the spinner's current value
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpinnerOptions {
    pub text: Option<String>,
    pub status: Option<String>,
    pub indent: Option<usize>,
    pub hidden: Option<bool>,
    pub colors: ColorOptions,
    pub prefixes: PrefixOptions,
}

impl SpinnerOptions {
    /// Empty options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = Some(indent);
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = Some(hidden);
        self
    }

    pub fn color(mut self, color: impl Into<ColorChoice>) -> Self {
        self.colors.color = Some(color.into());
        self
    }

    pub fn spinner_color(mut self, color: impl Into<ColorChoice>) -> Self {
        self.colors.spinner_color = Some(color.into());
        self
    }

    pub fn succeed_color(mut self, color: impl Into<ColorChoice>) -> Self {
        self.colors.succeed_color = Some(color.into());
        self
    }

    pub fn fail_color(mut self, color: impl Into<ColorChoice>) -> Self {
        self.colors.fail_color = Some(color.into());
        self
    }

    pub fn warn_color(mut self, color: impl Into<ColorChoice>) -> Self {
        self.colors.warn_color = Some(color.into());
        self
    }

    pub fn info_color(mut self, color: impl Into<ColorChoice>) -> Self {
        self.colors.info_color = Some(color.into());
        self
    }

    pub fn succeed_prefix(mut self, prefix: impl Into<PrefixChoice>) -> Self {
        self.prefixes.succeed_prefix = Some(prefix.into());
        self
    }

    pub fn fail_prefix(mut self, prefix: impl Into<PrefixChoice>) -> Self {
        self.prefixes.fail_prefix = Some(prefix.into());
        self
    }

    pub fn warn_prefix(mut self, prefix: impl Into<PrefixChoice>) -> Self {
        self.prefixes.warn_prefix = Some(prefix.into());
        self
    }

    pub fn info_prefix(mut self, prefix: impl Into<PrefixChoice>) -> Self {
        self.prefixes.info_prefix = Some(prefix.into());
        self
    }

    /// Purge a JSON value into spinner options.
    ///
    /// Non-object values yield empty options.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let mut known = vec!["text", "status", "indent", "hidden"];
        known.extend(COLOR_KEYS);
        known.extend(PREFIX_KEYS);
        report_unknown(obj, &known);

        Self {
            text: purge(obj, "text", string_rule),
            status: purge(obj, "status", string_rule),
            indent: purge(obj, "indent", count_rule),
            hidden: purge(obj, "hidden", bool_rule),
            colors: ColorOptions::from_object(obj),
            prefixes: PrefixOptions::from_object(obj),
        }
    }

    /// `true` when `status` is the only field set.
    pub fn is_status_only(&self) -> bool {
        self.status.is_some()
            && self.text.is_none()
            && self.indent.is_none()
            && self.hidden.is_none()
            && self.colors.is_empty()
            && self.prefixes.is_empty()
    }
}

pub(crate) fn known_config_keys() -> Vec<&'static str> {
    let mut known = vec!["spinner", "disableSpins"];
    known.extend(COLOR_KEYS);
    known.extend(PREFIX_KEYS);
    known
}
