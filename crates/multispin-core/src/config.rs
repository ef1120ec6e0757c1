//! Construction-time configuration for a spinner set.
//!
//! [`SpinnersConfig`] carries the global colors, the symbolic prefixes and
//! the animation. It can be built in code, or read leniently from JSON where
//! malformed fields are dropped and defaults stay in effect.

use std::path::Path;

use serde_json::Value;

use crate::animation::{platform_default, AnimationSpec, SpinnerAnimation};
use crate::color::{Color, ColorChoice};
use crate::error::{Result, SpinnersError};
use crate::options::{
    bool_rule, known_config_keys, purge, report_unknown, ColorOptions, PrefixChoice,
    PrefixOptions,
};
use crate::symbols::{supports_unicode, Symbols};

/// Global spinner configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpinnersConfig {
    /// Color of the spinning status text (and its nominal prefix).
    pub color: ColorChoice,
    /// Color of the animated frame glyph.
    pub spinner_color: ColorChoice,
    pub succeed_color: ColorChoice,
    pub fail_color: ColorChoice,
    pub warn_color: ColorChoice,
    pub info_color: ColorChoice,
    pub succeed_prefix: PrefixChoice,
    pub fail_prefix: PrefixChoice,
    pub warn_prefix: PrefixChoice,
    pub info_prefix: PrefixChoice,
    /// Active animation.
    pub spinner: SpinnerAnimation,
    /// Never animate, even on an interactive terminal.
    pub disable_spins: bool,
    /// Whether unicode glyphs are drawable; selects fallback glyphs and frames.
    pub unicode: bool,
}

impl SpinnersConfig {
    /// Defaults for a terminal with or without unicode support.
    pub fn for_terminal(unicode: bool) -> Self {
        let symbols = Symbols::for_terminal(unicode);
        Self {
            color: ColorChoice::Paint(Color::White),
            spinner_color: ColorChoice::Paint(Color::GreenBright),
            succeed_color: ColorChoice::Paint(Color::Green),
            fail_color: ColorChoice::Paint(Color::Red),
            warn_color: ColorChoice::Paint(Color::Yellow),
            info_color: ColorChoice::Paint(Color::Blue),
            succeed_prefix: PrefixChoice::from(symbols.succeed),
            fail_prefix: PrefixChoice::from(symbols.fail),
            warn_prefix: PrefixChoice::from(symbols.warn),
            info_prefix: PrefixChoice::from(symbols.info),
            spinner: platform_default(unicode),
            disable_spins: false,
            unicode,
        }
    }

    /// Purge a JSON value into a configuration on top of the defaults.
    pub fn from_value(value: &Value) -> Self {
        Self::default().with_value(value)
    }

    /// Merge the recognised, well-typed fields of `value` onto `self`.
    pub fn with_value(mut self, value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return self;
        };
        report_unknown(obj, &known_config_keys());

        self.apply_colors(&ColorOptions::from_object(obj));
        self.apply_prefixes(&PrefixOptions::from_object(obj));
        if let Some(spinner) = obj.get("spinner") {
            self.spinner = AnimationSpec::from_value(spinner).resolve(self.unicode);
        }
        if let Some(disable) = purge(obj, "disableSpins", bool_rule) {
            self.disable_spins = disable;
        }
        self
    }

    /// Parse a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(&value))
    }

    /// Read and parse a JSON config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| SpinnersError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Overwrite the color fields that are set in `colors`.
    pub fn apply_colors(&mut self, colors: &ColorOptions) {
        let slots = [
            (&mut self.color, colors.color),
            (&mut self.spinner_color, colors.spinner_color),
            (&mut self.succeed_color, colors.succeed_color),
            (&mut self.fail_color, colors.fail_color),
            (&mut self.warn_color, colors.warn_color),
            (&mut self.info_color, colors.info_color),
        ];
        for (slot, value) in slots {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }

    /// Overwrite the prefix fields that are set in `prefixes`.
    pub fn apply_prefixes(&mut self, prefixes: &PrefixOptions) {
        let slots = [
            (&mut self.succeed_prefix, &prefixes.succeed_prefix),
            (&mut self.fail_prefix, &prefixes.fail_prefix),
            (&mut self.warn_prefix, &prefixes.warn_prefix),
            (&mut self.info_prefix, &prefixes.info_prefix),
        ];
        for (slot, value) in slots {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }
    }

    /// The global colors as a fully populated option set.
    pub fn color_options(&self) -> ColorOptions {
        ColorOptions {
            color: Some(self.color),
            succeed_color: Some(self.succeed_color),
            fail_color: Some(self.fail_color),
            warn_color: Some(self.warn_color),
            info_color: Some(self.info_color),
            spinner_color: Some(self.spinner_color),
        }
    }

    /// The prefixes every new spinner inherits as its own overrides.
    ///
    /// Only the success and fail prefixes are inherited; warn and info
    /// prefixes come from the status registry.
    pub fn inherited_prefixes(&self) -> PrefixOptions {
        PrefixOptions {
            succeed_prefix: Some(self.succeed_prefix.clone()),
            fail_prefix: Some(self.fail_prefix.clone()),
            ..Default::default()
        }
    }
}

impl Default for SpinnersConfig {
    fn default() -> Self {
        Self::for_terminal(supports_unicode())
    }
}
