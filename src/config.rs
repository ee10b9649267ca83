use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::audio::analysis::{
    DEFAULT_ALPHA, DEFAULT_FREQ_CUTOFF, DEFAULT_HOP_LENGTH, DEFAULT_N_FFT,
    DEFAULT_SMOOTHING_WINDOW,
};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub plot: PlotConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    #[serde(default = "default_n_fft")]
    pub n_fft: usize,
    #[serde(default = "default_hop_length")]
    pub hop_length: usize,
    #[serde(default = "default_freq_cutoff")]
    pub freq_cutoff: f64,
    #[serde(default = "default_smoothing_window")]
    pub smoothing_window: usize,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_center")]
    pub center: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    /// Seconds of audio to analyse; absent or 0 means the whole file
    #[serde(default = "default_max_duration")]
    pub max_duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlotConfig {
    #[serde(default = "default_plot_width")]
    pub width: u32,
    #[serde(default = "default_plot_height")]
    pub height: u32,
    /// TrueType font used for chart labels
    #[serde(default)]
    pub font: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            n_fft: default_n_fft(),
            hop_length: default_hop_length(),
            freq_cutoff: default_freq_cutoff(),
            smoothing_window: default_smoothing_window(),
            alpha: default_alpha(),
            center: default_center(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_duration: default_max_duration(),
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: default_plot_width(),
            height: default_plot_height(),
            font: None,
        }
    }
}

fn default_n_fft() -> usize { DEFAULT_N_FFT }
fn default_hop_length() -> usize { DEFAULT_HOP_LENGTH }
fn default_freq_cutoff() -> f64 { DEFAULT_FREQ_CUTOFF }
fn default_smoothing_window() -> usize { DEFAULT_SMOOTHING_WINDOW }
fn default_alpha() -> f64 { DEFAULT_ALPHA }
fn default_center() -> bool { true }
fn default_max_duration() -> Option<f64> { Some(60.0) }
fn default_plot_width() -> u32 { 1000 }
fn default_plot_height() -> u32 { 400 }

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Failed to parse config: {}", path.display()))
}

fn parse_config(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}

/// Explicit path first, then `./introflux.toml`, then the per-user config.
pub fn find_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from("introflux.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("introflux").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("introflux").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}
