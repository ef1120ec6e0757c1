//! Spinner animations: named presets and validation of custom frame sets.
//!
//! Presets are bundled as JSON (`spinners.json`) and parsed once on first use.
//! `dots` is the platform default on unicode-capable terminals, `dashes`
//! everywhere else.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Deserialize;
use serde_json::Value;

use crate::options::purge;

const PRESETS_JSON: &str = include_str!("spinners.json");

/// Interval used when a custom animation gives none (or zero).
pub const DEFAULT_INTERVAL_MS: u64 = 80;

/// A frame sequence and the delay between frames.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpinnerAnimation {
    /// Milliseconds between frames.
    pub interval: u64,
    /// Frame glyphs, cycled in order.
    pub frames: Vec<String>,
}

impl SpinnerAnimation {
    /// The glyph at `index`, wrapping around the frame count.
    pub fn frame(&self, index: usize) -> &str {
        if self.frames.is_empty() {
            return "";
        }
        &self.frames[index % self.frames.len()]
    }

    /// The index following `index`, wrapping to 0 after the last frame.
    pub fn next_index(&self, index: usize) -> usize {
        if index + 1 >= self.frames.len() {
            0
        } else {
            index + 1
        }
    }
}

fn presets() -> &'static HashMap<String, SpinnerAnimation> {
    static PRESETS: OnceLock<HashMap<String, SpinnerAnimation>> = OnceLock::new();
    PRESETS.get_or_init(|| {
        serde_json::from_str(PRESETS_JSON).unwrap_or_else(|err| {
            tracing::error!(error = %err, "bundled spinner presets are malformed");
            HashMap::new()
        })
    })
}

/// Look up a bundled preset by name.
pub fn preset(name: &str) -> Option<SpinnerAnimation> {
    presets().get(name).cloned()
}

/// Names of all bundled presets, sorted.
pub fn preset_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = presets().keys().map(String::as_str).collect();
    names.sort_unstable();
    names
}

/// The default animation for a terminal with or without unicode support.
pub fn platform_default(unicode: bool) -> SpinnerAnimation {
    let name = if unicode { "dots" } else { "dashes" };
    preset(name).unwrap_or_else(|| SpinnerAnimation {
        interval: DEFAULT_INTERVAL_MS,
        frames: vec!["-".to_string(), "_".to_string()],
    })
}

// ── AnimationSpec ─────────────────────────────────────────────────────────────

/// An unvalidated animation request: a preset name or a custom frame set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationSpec {
    /// A bundled preset, looked up by name.
    Named(String),
    /// A custom animation; missing parts fall back to the platform default.
    Custom {
        interval: Option<u64>,
        frames: Option<Vec<String>>,
    },
}

impl AnimationSpec {
    /// Interpret a raw JSON value as an animation request.
    ///
    /// Strings name a preset; objects are read for `interval` and `frames`.
    /// Anything else is an empty custom request and so resolves to the
    /// platform default.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(name) => AnimationSpec::Named(name.clone()),
            Value::Object(obj) => AnimationSpec::Custom {
                interval: purge(obj, "interval", |v| {
                    v.as_f64().filter(|n| *n >= 0.0).map(|n| n.round() as u64)
                }),
                frames: purge(obj, "frames", |v| {
                    let frames: Vec<String> = v
                        .as_array()?
                        .iter()
                        .filter_map(|f| f.as_str().map(str::to_string))
                        .collect();
                    Some(frames)
                }),
            },
            _ => AnimationSpec::Custom {
                interval: None,
                frames: None,
            },
        }
    }

    /// Produce a usable animation, substituting the platform default for
    /// anything missing or malformed.
    ///
    /// An unknown preset name yields the whole platform default. A custom
    /// request with no frames borrows the default frames; one with no
    /// interval (or a zero interval) borrows the default interval.
    pub fn resolve(self, unicode: bool) -> SpinnerAnimation {
        let fallback = platform_default(unicode);
        match self {
            AnimationSpec::Named(name) => preset(&name).unwrap_or_else(|| {
                tracing::debug!(name = name.as_str(), "unknown spinner preset");
                fallback
            }),
            AnimationSpec::Custom { interval, frames } => SpinnerAnimation {
                interval: interval.filter(|i| *i > 0).unwrap_or(fallback.interval),
                frames: frames.filter(|f| !f.is_empty()).unwrap_or(fallback.frames),
            },
        }
    }
}

impl From<SpinnerAnimation> for AnimationSpec {
    fn from(animation: SpinnerAnimation) -> Self {
        AnimationSpec::Custom {
            interval: Some(animation.interval),
            frames: Some(animation.frames),
        }
    }
}

impl From<&str> for AnimationSpec {
    fn from(name: &str) -> Self {
        AnimationSpec::Named(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bundled_presets_parse() {
        let names = preset_names();
        assert!(names.contains(&"dots"), "got {names:?}");
        assert!(names.contains(&"dashes"), "got {names:?}");
        for name in names {
            let anim = preset(name).unwrap();
            assert!(!anim.frames.is_empty(), "{name} has no frames");
            assert!(anim.interval > 0, "{name} has a zero interval");
        }
    }

    #[test]
    fn test_platform_default() {
        assert_eq!(platform_default(true).frames[0], "⠋");
        assert_eq!(platform_default(false).frames, vec!["-", "_"]);
    }

    #[test]
    fn test_frame_and_next_index_wrap() {
        let anim = SpinnerAnimation {
            interval: 10,
            frames: vec!["a".into(), "b".into(), "c".into()],
        };
        assert_eq!(anim.frame(4), "b");
        assert_eq!(anim.next_index(0), 1);
        assert_eq!(anim.next_index(2), 0);
    }

    #[test]
    fn test_frame_of_empty_animation_is_empty() {
        let anim = SpinnerAnimation {
            interval: 10,
            frames: vec![],
        };
        assert_eq!(anim.frame(3), "");
        assert_eq!(anim.next_index(0), 0);
    }

    // ── AnimationSpec ─────────────────────────────────────────────────────

    #[test]
    fn test_named_known_preset() {
        let anim = AnimationSpec::from("line").resolve(true);
        assert_eq!(anim.interval, 130);
        assert_eq!(anim.frames.len(), 4);
    }

    #[test]
    fn test_named_unknown_preset_falls_back() {
        let anim = AnimationSpec::from("no-such-spinner").resolve(false);
        assert_eq!(anim, platform_default(false));
    }

    #[test]
    fn test_custom_missing_frames_borrow_default() {
        let anim = AnimationSpec::from_value(&json!({ "interval": 200, "frames": [] }))
            .resolve(true);
        assert_eq!(anim.interval, 200);
        assert_eq!(anim.frames, platform_default(true).frames);
    }

    #[test]
    fn test_custom_bad_interval_borrows_default() {
        let anim = AnimationSpec::from_value(&json!({ "interval": "fast", "frames": ["x", "y"] }))
            .resolve(true);
        assert_eq!(anim.interval, platform_default(true).interval);
        assert_eq!(anim.frames, vec!["x", "y"]);
    }

    #[test]
    fn test_custom_zero_interval_borrows_default() {
        let spec = AnimationSpec::Custom {
            interval: Some(0),
            frames: Some(vec!["x".into()]),
        };
        assert_eq!(spec.resolve(true).interval, DEFAULT_INTERVAL_MS);
    }

    #[test]
    fn test_non_object_value_is_platform_default() {
        let anim = AnimationSpec::from_value(&json!(12)).resolve(true);
        assert_eq!(anim, platform_default(true));
    }
}
