//! Layered settings.
//!
//! Defaults, then an optional TOML file, then `METRICWATCH_*` environment
//! variables. Command-line flags are applied on top by the binary.
//!
//! ```toml
//! lookback = "30m"
//! refresh = "100ms"
//! replay_interval = "1s"
//! max_events_per_tick = 256
//! theme = "auto"
//! log_file = "metricwatch.log"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::duration::parse_duration;

/// Which color theme to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ThemeChoice {
    #[default]
    Auto,
    Dark,
    Light,
}

/// Settings as read from file and environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// How far back the one-time history query reaches.
    pub lookback: String,
    /// Redraw/poll interval of the UI loop.
    pub refresh: String,
    /// Delay between replayed live entries of a fixture file.
    pub replay_interval: String,
    /// Upper bound on feed events applied per UI tick.
    pub max_events_per_tick: usize,
    pub theme: ThemeChoice,
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lookback: "30m".to_string(),
            refresh: "100ms".to_string(),
            replay_interval: "1s".to_string(),
            max_events_per_tick: 256,
            theme: ThemeChoice::Auto,
            log_file: PathBuf::from("metricwatch.log"),
        }
    }
}

impl Settings {
    /// Load settings from an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(Environment::with_prefix("METRICWATCH"))
            .build()
            .context("failed to read configuration")?;

        let settings: Settings = config.try_deserialize().context("invalid configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        self.lookback_duration()?;
        self.refresh_duration()?;
        self.replay_duration()?;
        Ok(())
    }

    pub fn lookback_duration(&self) -> Result<Duration> {
        parse_duration(&self.lookback).with_context(|| format!("invalid lookback {:?}", self.lookback))
    }

    pub fn refresh_duration(&self) -> Result<Duration> {
        parse_duration(&self.refresh).with_context(|| format!("invalid refresh {:?}", self.refresh))
    }

    pub fn replay_duration(&self) -> Result<Duration> {
        parse_duration(&self.replay_interval)
            .with_context(|| format!("invalid replay_interval {:?}", self.replay_interval))
    }
}
