use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::pipeline::RefineOptions;

/// Settings file looked up in the working directory.
pub const SETTINGS_FILE: &str = "rusty-xrd.json";

/// Environment variable that overrides [`SETTINGS_FILE`].
pub const SETTINGS_ENV: &str = "RUSTY_XRD_SETTINGS";

// ---------------------------------------------------------------------------
// Processing settings
// ---------------------------------------------------------------------------

/// Tunables for every user-triggered processing step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingSettings {
    /// Moving-average window, in samples.
    pub smoothing_window: usize,
    /// Degree of the background polynomial.
    pub baseline_degree: usize,
    /// Peak threshold as a multiple of the mean intensity.
    pub threshold_factor: f64,
    /// Minimum separation between peaks, in samples.
    pub min_distance: usize,
    /// Samples on each side of a peak used for the Gaussian fit.
    pub fit_window_radius: usize,
    pub refine: RefineOptions,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            smoothing_window: 5,
            baseline_degree: 1,
            threshold_factor: 1.5,
            min_distance: 5,
            fit_window_radius: 15,
            refine: RefineOptions::default(),
        }
    }
}

impl ProcessingSettings {
    /// Read settings from a JSON file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing settings file {}", path.display()))
    }

    /// Load from `$RUSTY_XRD_SETTINGS`, else `./rusty-xrd.json`, else defaults.
    pub fn load() -> Result<Self> {
        match settings_path() {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }
}

fn settings_path() -> Option<PathBuf> {
    if let Some(p) = std::env::var_os(SETTINGS_ENV) {
        return Some(PathBuf::from(p));
    }
    let local = PathBuf::from(SETTINGS_FILE);
    local.exists().then_some(local)
}
