//! A single tracked status line.
//!
//! A [`Spinner`] owns its text, status, indent and visibility plus a layer
//! of per-status style overrides. It never talks to the terminal: every
//! mutation is announced as a [`SpinnerEvent`] and the orchestrator decides
//! what to repaint.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use multispin_core::layout::{
    break_text, display_width, indent_text, second_stage_indent,
};
use multispin_core::{
    ColorOptions, PrefixOptions, SpinnerOptions, SpinnersConfig, StatusDefinition,
    StatusRegistry, StatusStyle, DEFAULT_STATUS,
};
use multispin_term::paint;
use tokio::sync::mpsc::UnboundedSender;

/// Log lines shared between a spinner set and its spinners.
pub type SharedLogs = Arc<Mutex<Vec<String>>>;

/// What a spinner tells its orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpinnerEvent {
    /// Something visible changed; repaint.
    StateChanged(String),
    /// The spinner asked to be removed from its set.
    RemoveRequested(String),
}

/// A snapshot of a spinner's own options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpinnerState {
    pub name: String,
    pub text: String,
    pub status: String,
    pub indent: usize,
    pub hidden: bool,
}

// ── Spinner ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Spinner {
    name: String,
    text: String,
    status: String,
    indent: usize,
    hidden: bool,
    /// Canonical status name → style layered over the registry definition.
    overrides: HashMap<String, StatusStyle>,
    logs: SharedLogs,
    events: Option<UnboundedSender<SpinnerEvent>>,
}

impl Spinner {
    /// Build a spinner named `name`.
    ///
    /// The text falls back to the name when absent or empty. Overrides are
    /// seeded from the global colors and the global success/fail prefixes,
    /// then layered with `options`.
    pub fn new(
        name: &str,
        options: SpinnerOptions,
        config: &SpinnersConfig,
        logs: SharedLogs,
    ) -> Self {
        let colors = config.color_options().merged(&options.colors);
        let prefixes = config.inherited_prefixes().merged(&options.prefixes);

        let mut spinner = Self {
            name: name.to_string(),
            text: options
                .text
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| name.to_string()),
            status: options
                .status
                .filter(|status| !status.is_empty())
                .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            indent: options.indent.unwrap_or(0),
            hidden: options.hidden.unwrap_or(false),
            overrides: HashMap::new(),
            logs,
            events: None,
        };
        spinner.apply_status_overrides(&colors, &prefixes);
        spinner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current_text(&self) -> &str {
        &self.text
    }

    pub fn current_status(&self) -> &str {
        &self.status
    }

    pub fn current_indent(&self) -> usize {
        self.indent
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn options(&self) -> SpinnerState {
        SpinnerState {
            name: self.name.clone(),
            text: self.text.clone(),
            status: self.status.clone(),
            indent: self.indent,
            hidden: self.hidden,
        }
    }

    // ── signals ───────────────────────────────────────────────────────────

    /// Route this spinner's events to `tx`.
    pub fn subscribe(&mut self, tx: UnboundedSender<SpinnerEvent>) {
        self.events = Some(tx);
    }

    /// Stop emitting events.
    pub fn unsubscribe(&mut self) {
        self.events = None;
    }

    fn emit(&self, event: SpinnerEvent) {
        if let Some(tx) = &self.events {
            if tx.send(event).is_err() {
                tracing::debug!(name = self.name.as_str(), "spinner event dropped");
            }
        }
    }

    fn changed(&self) {
        self.emit(SpinnerEvent::StateChanged(self.name.clone()));
    }

    // ── mutations ─────────────────────────────────────────────────────────

    /// Apply `options`.
    ///
    /// A status-only update is a plain [`Spinner::status`] call. Otherwise
    /// color and prefix fields are layered onto the overrides, the other set
    /// fields replace current values, and the status is kept unless a
    /// non-empty one is given.
    pub fn update(&mut self, options: SpinnerOptions) {
        if options.is_status_only() {
            self.status(options.status.unwrap_or_default());
            return;
        }

        self.apply_status_overrides(&options.colors, &options.prefixes);
        if let Some(text) = options.text {
            self.text = text;
        }
        if let Some(indent) = options.indent {
            self.indent = indent;
        }
        if let Some(hidden) = options.hidden {
            self.hidden = hidden;
        }
        if let Some(status) = options.status.filter(|s| !s.is_empty()) {
            self.status = status;
        }
        self.changed();
    }

    /// Switch to `name`. Empty names are ignored.
    pub fn status(&mut self, name: impl Into<String>) {
        let name = name.into();
        if name.is_empty() {
            return;
        }
        self.status = name;
        self.changed();
    }

    /// Set the status without announcing it.
    pub(crate) fn force_status(&mut self, name: &str) {
        self.status = name.to_string();
    }

    pub fn text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.changed();
    }

    pub fn indent(&mut self, indent: usize) {
        self.indent = indent;
        self.changed();
    }

    /// Read visibility, or change it when `flag` differs from the current
    /// value. Returns the visibility after the call.
    pub fn hidden(&mut self, flag: Option<bool>) -> bool {
        if let Some(flag) = flag {
            if flag != self.hidden {
                self.hidden = flag;
                self.changed();
            }
        }
        self.hidden
    }

    pub fn hide(&mut self) -> bool {
        self.hidden(Some(true))
    }

    pub fn show(&mut self) -> bool {
        self.hidden(Some(false))
    }

    /// Ask the owning set to remove this spinner.
    pub fn remove(&self) {
        self.emit(SpinnerEvent::RemoveRequested(self.name.clone()));
    }

    pub fn add_log(&self, line: impl Into<String>) {
        self.logs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.into());
    }

    // ── style resolution ──────────────────────────────────────────────────

    /// Derive override layers from color and prefix fields.
    ///
    /// Each of `success fail warn info spinning` reads its prefix and color
    /// field. A color sets both prefix and text color. `spinnerColor` sets
    /// the spinning frame and prefix color and wins over `color`.
    pub fn apply_status_overrides(&mut self, colors: &ColorOptions, prefixes: &PrefixOptions) {
        let families = [
            ("success", prefixes.succeed_prefix.clone(), colors.succeed_color),
            ("fail", prefixes.fail_prefix.clone(), colors.fail_color),
            ("warn", prefixes.warn_prefix.clone(), colors.warn_color),
            ("info", prefixes.info_prefix.clone(), colors.info_color),
            ("spinning", None, colors.color),
        ];

        for (family, prefix, color) in families {
            let mut layer = StatusStyle {
                prefix,
                ..StatusStyle::default()
            };
            if let Some(color) = color {
                layer.prefix_color = Some(color);
                layer.text_color = Some(color);
            }
            if family == DEFAULT_STATUS {
                if let Some(spinner_color) = colors.spinner_color {
                    layer.spinner_color = Some(spinner_color);
                    layer.prefix_color = Some(spinner_color);
                }
            }
            self.overrides
                .entry(family.to_string())
                .or_default()
                .merge(&layer);
        }
    }

    /// The override layer for a canonical status name, created on demand.
    pub(crate) fn override_mut(&mut self, family: &str) -> &mut StatusStyle {
        self.overrides.entry(family.to_string()).or_default()
    }

    /// The registry definition for `name` with this spinner's override for
    /// the canonical name on top.
    pub fn get_status(&self, name: &str, registry: &StatusRegistry) -> StatusDefinition {
        let base = registry.get_status(name);
        match registry
            .actual_name(name)
            .and_then(|canonical| self.overrides.get(canonical))
        {
            Some(layer) => base.layered(&[layer]),
            None => base.clone(),
        }
    }

    /// `true` while the current status is not a done status.
    pub fn is_active(&self, registry: &StatusRegistry) -> bool {
        !self.get_status(&self.status, registry).is_done
    }

    // ── rendering ─────────────────────────────────────────────────────────

    /// Render for an animation tick with `frame` as the glyph of an
    /// animated status.
    pub fn render(&self, frame: &str, registry: &StatusRegistry, columns: usize) -> String {
        let status = self.get_status(&self.status, registry);
        let glyph = if status.is_static {
            status.prefix.as_deref().unwrap_or("")
        } else {
            frame
        };
        let prefix = if status.is_static && glyph.is_empty() {
            String::new()
        } else if status.no_space_after_prefix {
            glyph.to_string()
        } else {
            format!("{glyph} ")
        };
        let prefix_len = display_width(&prefix);
        let prefix_color = if status.is_static {
            status.prefix_color
        } else {
            status.spinner_color
        };

        let body = break_text(&self.text, prefix_len, self.indent, columns);
        let body = indent_text(&body, prefix_len, self.indent);
        let line = format!(
            "{}{}",
            paint(&prefix, prefix_color),
            paint(&body, status.text_color)
        );
        second_stage_indent(&line, self.indent)
    }

    /// Render without animation: the definition's fixed prefix is used
    /// whether or not the status is static.
    pub fn raw_render(&self, registry: &StatusRegistry, columns: usize) -> String {
        let status = self.get_status(&self.status, registry);
        let (prefix, prefix_len) = match status.prefix.as_deref().filter(|p| !p.is_empty()) {
            Some(glyph) => {
                let space = if status.no_space_after_prefix { "" } else { " " };
                let width = display_width(glyph) + space.len();
                (format!("{}{space}", paint(glyph, status.prefix_color)), width)
            }
            None => (String::new(), 0),
        };

        let output = format!("{prefix}{}", paint(&self.text, status.text_color));
        let output = break_text(&output, 0, self.indent, columns);
        let output = indent_text(&output, prefix_len, self.indent);
        second_stage_indent(&output, self.indent)
    }
}
