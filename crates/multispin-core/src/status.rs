//! Status definitions and the registry that resolves names and aliases.
//!
//! A status decides how a spinner line looks (prefix glyph, colors) and
//! whether the spinner counts as finished. Statuses are registered by name;
//! aliases map alternate names onto a canonical one in a single hop.

use std::collections::HashMap;

use serde_json::Value;

use crate::color::{Color, ColorChoice};
use crate::config::SpinnersConfig;
use crate::error::{Result, SpinnersError};
use crate::options::{bool_rule, purge, PrefixChoice};

/// Name of the status every spinner starts in and unknown names fall back to.
pub const DEFAULT_STATUS: &str = "spinning";

// ── StatusDefinition ──────────────────────────────────────────────────────────

/// A fully resolved status style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusDefinition {
    /// Fixed prefix glyph, shown only by static statuses.
    pub prefix: Option<String>,
    /// Color of the fixed prefix.
    pub prefix_color: Option<Color>,
    /// Color of the animated frame.
    pub spinner_color: Option<Color>,
    /// Color of the spinner text.
    pub text_color: Option<Color>,
    /// Shows the fixed prefix instead of an animation frame.
    pub is_static: bool,
    /// Omit the space between prefix and text.
    pub no_space_after_prefix: bool,
    /// A spinner in this status no longer keeps the repaint loop alive.
    pub is_done: bool,
}

impl StatusDefinition {
    /// The style every newly introduced status starts from.
    pub fn baseline() -> Self {
        Self {
            prefix: None,
            prefix_color: Some(Color::Cyan),
            spinner_color: Some(Color::Cyan),
            text_color: None,
            is_static: false,
            no_space_after_prefix: false,
            is_done: false,
        }
    }

    /// Apply `layers` in order on top of this definition; later layers win.
    pub fn layered(&self, layers: &[&StatusStyle]) -> StatusDefinition {
        let mut resolved = self.clone();
        for layer in layers {
            layer.apply_to(&mut resolved);
        }
        resolved
    }
}

// ── StatusStyle ───────────────────────────────────────────────────────────────

/// A partial style: every set field overrides the layer beneath it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusStyle {
    pub prefix: Option<PrefixChoice>,
    pub prefix_color: Option<ColorChoice>,
    pub spinner_color: Option<ColorChoice>,
    pub text_color: Option<ColorChoice>,
    pub is_static: Option<bool>,
    pub no_space_after_prefix: Option<bool>,
    pub is_done: Option<bool>,
}

impl StatusStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, prefix: impl Into<PrefixChoice>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn prefix_color(mut self, color: impl Into<ColorChoice>) -> Self {
        self.prefix_color = Some(color.into());
        self
    }

    pub fn spinner_color(mut self, color: impl Into<ColorChoice>) -> Self {
        self.spinner_color = Some(color.into());
        self
    }

    pub fn text_color(mut self, color: impl Into<ColorChoice>) -> Self {
        self.text_color = Some(color.into());
        self
    }

    pub fn is_static(mut self, is_static: bool) -> Self {
        self.is_static = Some(is_static);
        self
    }

    pub fn no_space_after_prefix(mut self, flag: bool) -> Self {
        self.no_space_after_prefix = Some(flag);
        self
    }

    pub fn is_done(mut self, is_done: bool) -> Self {
        self.is_done = Some(is_done);
        self
    }

    /// Purge a JSON object into a style, dropping malformed fields.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        Self {
            prefix: purge(obj, "prefix", PrefixChoice::from_value),
            prefix_color: purge(obj, "prefixColor", ColorChoice::from_value),
            spinner_color: purge(obj, "spinnerColor", ColorChoice::from_value),
            text_color: purge(obj, "textColor", ColorChoice::from_value),
            is_static: purge(obj, "isStatic", bool_rule),
            no_space_after_prefix: purge(obj, "noSpaceAfterPrefix", bool_rule),
            is_done: purge(obj, "isDone", bool_rule),
        }
    }

    /// Fields of `other` win over fields of `self`.
    pub fn merge(&mut self, other: &StatusStyle) {
        if other.prefix.is_some() {
            self.prefix.clone_from(&other.prefix);
        }
        self.prefix_color = other.prefix_color.or(self.prefix_color);
        self.spinner_color = other.spinner_color.or(self.spinner_color);
        self.text_color = other.text_color.or(self.text_color);
        self.is_static = other.is_static.or(self.is_static);
        self.no_space_after_prefix = other.no_space_after_prefix.or(self.no_space_after_prefix);
        self.is_done = other.is_done.or(self.is_done);
    }

    fn apply_to(&self, def: &mut StatusDefinition) {
        if let Some(prefix) = &self.prefix {
            def.prefix = prefix.glyph().map(str::to_string);
        }
        if let Some(color) = self.prefix_color {
            def.prefix_color = color.color();
        }
        if let Some(color) = self.spinner_color {
            def.spinner_color = color.color();
        }
        if let Some(color) = self.text_color {
            def.text_color = color.color();
        }
        if let Some(flag) = self.is_static {
            def.is_static = flag;
        }
        if let Some(flag) = self.no_space_after_prefix {
            def.no_space_after_prefix = flag;
        }
        if let Some(flag) = self.is_done {
            def.is_done = flag;
        }
    }
}

/// Read an `aliases` JSON field: a single string or an array of strings.
pub fn aliases_from_value(value: &Value) -> Vec<String> {
    match value {
        Value::String(alias) => vec![alias.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

// ── StatusRegistry ────────────────────────────────────────────────────────────

/// Named status definitions plus a one-hop alias table.
#[derive(Debug, Clone)]
pub struct StatusRegistry {
    default_status: String,
    statuses: HashMap<String, StatusDefinition>,
    aliases: HashMap<String, String>,
    /// Every name and alias in the order it was introduced.
    introduced: Vec<String>,
    /// Returned when even the default status is missing.
    baseline: StatusDefinition,
}

impl StatusRegistry {
    /// An empty registry falling back to `default_status`.
    pub fn new(default_status: &str) -> Self {
        Self {
            default_status: default_status.to_string(),
            statuses: HashMap::new(),
            aliases: HashMap::new(),
            introduced: Vec::new(),
            baseline: StatusDefinition::baseline(),
        }
    }

    /// A registry holding the seven built-in statuses, seeded from `config`.
    pub fn with_builtins(config: &SpinnersConfig) -> Self {
        let mut registry = Self::new(DEFAULT_STATUS);
        let builtins: [(&str, StatusStyle, &[&str]); 7] = [
            (
                "spinning",
                StatusStyle::new()
                    .prefix("-")
                    .spinner_color(config.color)
                    .prefix_color(config.color)
                    .text_color(config.color),
                &["spin", "active", "default"],
            ),
            (
                "success",
                symbolic(&config.succeed_prefix, config.succeed_color),
                &["succeed", "done"],
            ),
            (
                "fail",
                symbolic(&config.fail_prefix, config.fail_color),
                &["failed", "error"],
            ),
            (
                "warn",
                symbolic(&config.warn_prefix, config.warn_color),
                &["warning"],
            ),
            (
                "info",
                symbolic(&config.info_prefix, config.info_color),
                &["information"],
            ),
            (
                "non-spinnable",
                StatusStyle::new()
                    .prefix(PrefixChoice::Disabled)
                    .is_static(true),
                &["static", "inactive"],
            ),
            (
                "stopped",
                StatusStyle::new()
                    .prefix(PrefixChoice::Disabled)
                    .is_static(true)
                    .text_color(Color::Gray),
                &["stop", "cancel"],
            ),
        ];

        for (name, style, aliases) in builtins {
            registry.register(name, &style, aliases);
        }
        registry
    }

    /// Create or update the status `name` and register `aliases` for it.
    ///
    /// `style` is merged onto the existing definition (or the baseline for a
    /// new name). A new status that leaves `is_done` unset follows
    /// `is_static`; an existing one keeps its current `is_done`.
    ///
    /// Returns the names and aliases this call introduced for the first
    /// time; updating an existing status with known aliases returns nothing.
    pub fn configure_status<S: AsRef<str>>(
        &mut self,
        name: &str,
        style: &StatusStyle,
        aliases: &[S],
    ) -> Result<Vec<String>> {
        if name.is_empty() {
            return Err(SpinnersError::MissingStatusName);
        }
        Ok(self.register(name, style, aliases))
    }

    /// [`configure_status`](Self::configure_status) from a JSON object.
    ///
    /// Style fields are purged like any other options; `aliases` may be a
    /// string or an array of strings.
    pub fn configure_status_value(&mut self, name: &str, value: &Value) -> Result<Vec<String>> {
        let style = StatusStyle::from_value(value);
        let aliases = value
            .get("aliases")
            .map(aliases_from_value)
            .unwrap_or_default();
        self.configure_status(name, &style, aliases.as_slice())
    }

    fn register<S: AsRef<str>>(
        &mut self,
        name: &str,
        style: &StatusStyle,
        aliases: &[S],
    ) -> Vec<String> {
        let mut added = Vec::new();
        let existing = self.statuses.get(name).cloned();
        let is_new = existing.is_none();
        let mut definition = existing.unwrap_or_else(StatusDefinition::baseline);
        style.apply_to(&mut definition);
        if is_new && style.is_done.is_none() {
            definition.is_done = definition.is_static;
        }

        if is_new {
            self.introduced.push(name.to_string());
            added.push(name.to_string());
        }
        self.statuses.insert(name.to_string(), definition);

        for alias in aliases {
            let alias = alias.as_ref();
            if alias.is_empty() {
                continue;
            }
            if self.aliases.insert(alias.to_string(), name.to_string()).is_none() {
                self.introduced.push(alias.to_string());
                added.push(alias.to_string());
            }
        }

        if !added.is_empty() {
            tracing::debug!(status = name, ?added, "status names introduced");
        }
        added
    }

    /// The definition for `name`, following one alias hop, falling back to
    /// the default status. Never fails.
    pub fn get_status(&self, name: &str) -> &StatusDefinition {
        if let Some(status) = self.statuses.get(name) {
            return status;
        }
        if let Some(status) = self.aliases.get(name).and_then(|n| self.statuses.get(n)) {
            return status;
        }
        self.statuses
            .get(&self.default_status)
            .unwrap_or(&self.baseline)
    }

    /// The canonical status name for a name or alias, if either exists.
    pub fn actual_name<'a>(&'a self, name_or_alias: &'a str) -> Option<&'a str> {
        if self.statuses.contains_key(name_or_alias) {
            return Some(name_or_alias);
        }
        self.aliases.get(name_or_alias).map(String::as_str)
    }

    /// Name of the fallback status.
    pub fn default_status(&self) -> &str {
        &self.default_status
    }

    /// Every status name and alias, in the order first introduced.
    pub fn names(&self) -> &[String] {
        &self.introduced
    }
}

fn symbolic(prefix: &PrefixChoice, color: ColorChoice) -> StatusStyle {
    StatusStyle::new()
        .prefix(prefix.clone())
        .is_static(true)
        .no_space_after_prefix(false)
        .prefix_color(color)
        .text_color(color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn builtins() -> StatusRegistry {
        StatusRegistry::with_builtins(&SpinnersConfig::for_terminal(true))
    }

    // ── built-ins ─────────────────────────────────────────────────────────

    #[test]
    fn test_builtins_present() {
        let reg = builtins();
        for name in [
            "spinning",
            "success",
            "fail",
            "warn",
            "info",
            "non-spinnable",
            "stopped",
        ] {
            assert_eq!(reg.actual_name(name), Some(name), "missing {name}");
        }
    }

    #[test]
    fn test_builtin_aliases_resolve() {
        let reg = builtins();
        let expected = [
            ("spin", "spinning"),
            ("active", "spinning"),
            ("default", "spinning"),
            ("succeed", "success"),
            ("done", "success"),
            ("failed", "fail"),
            ("error", "fail"),
            ("warning", "warn"),
            ("information", "info"),
            ("static", "non-spinnable"),
            ("inactive", "non-spinnable"),
            ("stop", "stopped"),
            ("cancel", "stopped"),
        ];
        for (alias, canonical) in expected {
            assert_eq!(reg.actual_name(alias), Some(canonical), "alias {alias}");
        }
    }

    #[test]
    fn test_builtin_styles_seeded_from_config() {
        let reg = builtins();
        let success = reg.get_status("success");
        assert_eq!(success.prefix.as_deref(), Some("✓"));
        assert_eq!(success.prefix_color, Some(Color::Green));
        assert!(success.is_static && success.is_done);

        let spinning = reg.get_status("spinning");
        assert!(!spinning.is_static && !spinning.is_done);
        assert_eq!(spinning.spinner_color, Some(Color::White));

        let stopped = reg.get_status("stopped");
        assert_eq!(stopped.prefix, None);
        assert_eq!(stopped.text_color, Some(Color::Gray));
        assert!(stopped.is_done);
    }

    #[test]
    fn test_disabled_prefix_in_config_means_no_prefix() {
        let mut cfg = SpinnersConfig::for_terminal(true);
        cfg.succeed_prefix = PrefixChoice::Disabled;
        let reg = StatusRegistry::with_builtins(&cfg);
        assert_eq!(reg.get_status("success").prefix, None);
    }

    // ── configure_status ──────────────────────────────────────────────────

    #[test]
    fn test_configure_status_empty_name_errors() {
        let mut reg = builtins();
        let err = reg
            .configure_status("", &StatusStyle::new(), &["x"])
            .unwrap_err();
        assert!(matches!(err, SpinnersError::MissingStatusName));
    }

    #[test]
    fn test_configure_status_reports_new_names_once() {
        let mut reg = builtins();
        let added = reg
            .configure_status("retry", &StatusStyle::new(), &["again", "redo"])
            .unwrap();
        assert_eq!(added, vec!["retry", "again", "redo"]);

        let added = reg
            .configure_status("retry", &StatusStyle::new().prefix("↻"), &["again"])
            .unwrap();
        assert!(added.is_empty(), "got {added:?}");

        let added = reg
            .configure_status("retry", &StatusStyle::new(), &["again", "once-more"])
            .unwrap();
        assert_eq!(added, vec!["once-more"]);
    }

    #[test]
    fn test_configure_status_merges_onto_existing() {
        let mut reg = builtins();
        reg.configure_status("fail", &StatusStyle::new().prefix("!"), &[] as &[&str])
            .unwrap();
        let fail = reg.get_status("fail");
        assert_eq!(fail.prefix.as_deref(), Some("!"));
        assert_eq!(fail.prefix_color, Some(Color::Red));
        assert!(fail.is_static);
    }

    #[test]
    fn test_is_done_defaults_to_is_static() {
        let mut reg = builtins();
        reg.configure_status("paused", &StatusStyle::new().is_static(true), &[] as &[&str])
            .unwrap();
        assert!(reg.get_status("paused").is_done);

        reg.configure_status(
            "waiting",
            &StatusStyle::new().is_static(true).is_done(false),
            &[] as &[&str],
        )
        .unwrap();
        assert!(!reg.get_status("waiting").is_done);
    }

    #[test]
    fn test_restyle_keeps_existing_is_done() {
        let mut reg = builtins();
        reg.configure_status(
            "waiting",
            &StatusStyle::new().is_static(true).is_done(false),
            &[] as &[&str],
        )
        .unwrap();
        reg.configure_status("waiting", &StatusStyle::new().prefix("…"), &[] as &[&str])
            .unwrap();
        let waiting = reg.get_status("waiting");
        assert_eq!(waiting.prefix.as_deref(), Some("…"));
        assert!(!waiting.is_done);

        reg.configure_status("retry", &StatusStyle::new(), &[] as &[&str])
            .unwrap();
        reg.configure_status("retry", &StatusStyle::new().is_static(true), &[] as &[&str])
            .unwrap();
        let retry = reg.get_status("retry");
        assert!(retry.is_static);
        assert!(!retry.is_done);
    }

    #[test]
    fn test_restyle_with_explicit_is_done_wins() {
        let mut reg = builtins();
        reg.configure_status("success", &StatusStyle::new().is_done(false), &[] as &[&str])
            .unwrap();
        assert!(!reg.get_status("success").is_done);
        assert!(reg.get_status("success").is_static);
    }

    #[test]
    fn test_configure_status_value() {
        let mut reg = builtins();
        let added = reg
            .configure_status_value(
                "queued",
                &json!({"prefix": "…", "isStatic": true, "textColor": "nope", "aliases": ["waiting", 3]}),
            )
            .unwrap();
        assert_eq!(added, vec!["queued", "waiting"]);
        let queued = reg.get_status("waiting");
        assert_eq!(queued.prefix.as_deref(), Some("…"));
        assert!(queued.is_static && queued.is_done);
        assert_eq!(queued.text_color, None);

        let added = reg
            .configure_status_value("solo", &json!({"aliases": "alone"}))
            .unwrap();
        assert_eq!(added, vec!["solo", "alone"]);
        assert!(reg.configure_status_value("", &json!({})).is_err());
    }

    #[test]
    fn test_baseline_for_new_status() {
        let mut reg = builtins();
        reg.configure_status("plain", &StatusStyle::new(), &[] as &[&str])
            .unwrap();
        assert_eq!(reg.get_status("plain"), &StatusDefinition::baseline());
    }

    // ── lookups ───────────────────────────────────────────────────────────

    #[test]
    fn test_get_status_unknown_falls_back_to_default() {
        let reg = builtins();
        assert_eq!(reg.get_status("nope"), reg.get_status(DEFAULT_STATUS));
    }

    #[test]
    fn test_get_status_on_empty_registry_is_baseline() {
        let reg = StatusRegistry::new(DEFAULT_STATUS);
        assert_eq!(reg.get_status("anything"), &StatusDefinition::baseline());
    }

    #[test]
    fn test_alias_equals_canonical_after_updates() {
        let mut reg = builtins();
        reg.configure_status("retry", &StatusStyle::new(), &["again"])
            .unwrap();
        reg.configure_status(
            "retry",
            &StatusStyle::new().prefix("↻").text_color(Color::Magenta),
            &[] as &[&str],
        )
        .unwrap();
        for name in reg.names().to_vec() {
            if let Some(canonical) = reg.actual_name(&name) {
                assert_eq!(reg.get_status(&name), reg.get_status(canonical));
            }
        }
    }

    #[test]
    fn test_actual_name_idempotent() {
        let reg = builtins();
        for name in reg.names() {
            let once = reg.actual_name(name).unwrap();
            assert_eq!(reg.actual_name(once), Some(once));
        }
        assert_eq!(reg.actual_name("unknown"), None);
    }

    // ── layering ──────────────────────────────────────────────────────────

    #[test]
    fn test_layered_later_layers_win() {
        let base = StatusDefinition::baseline();
        let first = StatusStyle::new().text_color(Color::Red).prefix("a");
        let second = StatusStyle::new().text_color(ColorChoice::Disabled);
        let resolved = base.layered(&[&first, &second]);
        assert_eq!(resolved.text_color, None);
        assert_eq!(resolved.prefix.as_deref(), Some("a"));
        assert_eq!(resolved.prefix_color, Some(Color::Cyan));
    }

    #[test]
    fn test_style_merge() {
        let mut style = StatusStyle::new().prefix("x").text_color(Color::Red);
        style.merge(&StatusStyle::new().text_color(Color::Blue));
        assert_eq!(style.prefix, Some(PrefixChoice::from("x")));
        assert_eq!(style.text_color, Some(ColorChoice::Paint(Color::Blue)));
    }

    #[test]
    fn test_style_from_value() {
        let style = StatusStyle::from_value(&json!({
            "prefix": "↻",
            "isStatic": false,
            "textColor": "nope",
            "prefixColor": false
        }));
        assert_eq!(style.prefix, Some(PrefixChoice::from("↻")));
        assert_eq!(style.is_static, Some(false));
        assert_eq!(style.text_color, None);
        assert_eq!(style.prefix_color, Some(ColorChoice::Disabled));
    }

    #[test]
    fn test_aliases_from_value() {
        assert_eq!(aliases_from_value(&json!("one")), vec!["one"]);
        assert_eq!(aliases_from_value(&json!(["a", 1, "b"])), vec!["a", "b"]);
        assert!(aliases_from_value(&json!(null)).is_empty());
    }
}
