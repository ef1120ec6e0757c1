//! What the output stream can do, decided once per spinner set.

use crate::stream::TermStream;

/// Environment variables whose presence marks a CI run.
pub const CI_VARS: [&str; 4] = ["CI", "CONTINUOUS_INTEGRATION", "BUILD_NUMBER", "RUN_ID"];

/// Terminal capabilities relevant to animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// The stream is an interactive terminal.
    pub interactive: bool,
    /// A CI environment was detected.
    pub ci: bool,
    /// Spinning was disabled by configuration.
    pub spins_disabled: bool,
}

impl Capabilities {
    /// Probe `stream` and the process environment.
    pub fn detect(stream: &dyn TermStream, disable_spins: bool) -> Self {
        let caps = Self {
            interactive: stream.is_terminal(),
            ci: is_ci(),
            spins_disabled: disable_spins,
        };
        tracing::debug!(
            interactive = caps.interactive,
            ci = caps.ci,
            spins_disabled = caps.spins_disabled,
            "detected terminal capabilities"
        );
        caps
    }

    /// Animate only on an interactive, non-CI terminal with spinning enabled.
    /// Otherwise state changes are written as plain lines.
    pub fn should_animate(&self) -> bool {
        self.interactive && !self.ci && !self.spins_disabled
    }
}

/// Whether any of [`CI_VARS`] is set in the process environment.
pub fn is_ci() -> bool {
    is_ci_from(|key| std::env::var_os(key).is_some())
}

/// [`is_ci`] against an arbitrary lookup.
pub fn is_ci_from(is_set: impl Fn(&str) -> bool) -> bool {
    CI_VARS.iter().any(|key| is_set(key))
}
