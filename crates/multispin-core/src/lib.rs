//! Core types for multispin.
//!
//! Holds everything that does not touch a terminal or a runtime: the color
//! palette, option purging, global configuration, spinner animations, the
//! status registry and the text-layout functions used by rendering.

pub mod animation;
pub mod color;
pub mod config;
pub mod error;
pub mod layout;
pub mod options;
pub mod status;
pub mod symbols;

pub use color::{Color, ColorChoice};
pub use config::SpinnersConfig;
pub use error::{Result, SpinnersError};
pub use options::{ColorOptions, PrefixChoice, PrefixOptions, SpinnerOptions};
pub use status::{StatusDefinition, StatusRegistry, StatusStyle, DEFAULT_STATUS};
