use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use multispin_core::animation::AnimationSpec;
use multispin_core::{Color, ColorChoice, SpinnersConfig};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Run a set of simulated tasks behind live terminal spinners
#[derive(Parser, Debug, Clone)]
#[command(
    name = "multispin",
    about = "Run a set of simulated tasks behind live terminal spinners",
    version
)]
pub struct Settings {
    /// JSON config file (defaults to <config dir>/multispin/config.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Spinner preset name
    #[arg(long)]
    pub spinner: Option<String>,

    /// Text color of spinning lines
    #[arg(long, value_parser = parse_color)]
    pub color: Option<Color>,

    /// Color of the animated frame
    #[arg(long, value_parser = parse_color)]
    pub spinner_color: Option<Color>,

    /// Stream the spinners paint on
    #[arg(long, default_value = "stderr", value_parser = ["stderr", "stdout"])]
    pub stream: String,

    /// Write plain lines instead of animating
    #[arg(long)]
    pub disable_spins: bool,

    /// Number of simulated tasks (1-32)
    #[arg(long, default_value = "4", value_parser = clap::value_parser!(u32).range(1..=32))]
    pub tasks: u32,

    /// Make every Nth task fail (0 disables failures)
    #[arg(long, default_value = "3")]
    pub fail_every: u32,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

fn parse_color(value: &str) -> Result<Color, String> {
    Color::from_str(value).map_err(|err| err.to_string())
}

impl Settings {
    /// `<config dir>/multispin/config.json`, if a config dir exists.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| Self::config_path_in(&dir))
    }

    /// The config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join("multispin").join("config.json")
    }

    /// Build the spinner configuration from the default config location.
    pub fn spinners_config(&self) -> anyhow::Result<SpinnersConfig> {
        self.spinners_config_with_default(Self::default_config_path().as_deref())
    }

    /// Build the spinner configuration: the config file first, CLI flags on
    /// top.
    ///
    /// An explicit `--config` must exist; the default location is optional.
    pub fn spinners_config_with_default(
        &self,
        default_path: Option<&Path>,
    ) -> anyhow::Result<SpinnersConfig> {
        let mut config = match (&self.config, default_path) {
            (Some(path), _) => SpinnersConfig::load_from(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            (None, Some(path)) if path.exists() => {
                tracing::debug!(path = %path.display(), "using default config file");
                SpinnersConfig::load_from(path)
                    .with_context(|| format!("loading config {}", path.display()))?
            }
            _ => SpinnersConfig::default(),
        };

        if let Some(name) = &self.spinner {
            config.spinner = AnimationSpec::Named(name.clone()).resolve(config.unicode);
        }
        if let Some(color) = self.color {
            config.color = ColorChoice::Paint(color);
        }
        if let Some(color) = self.spinner_color {
            config.spinner_color = ColorChoice::Paint(color);
        }
        if self.disable_spins {
            config.disable_spins = true;
        }
        Ok(config)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
