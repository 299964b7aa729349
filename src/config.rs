//! Configuration management for the repetition counter

use crate::constants::{DEFAULT_CONFIDENCE_FLOOR, DEFAULT_MIN_REP_INTERVAL_SECS, DEFAULT_SMOOTHING_WINDOW};
use crate::filters::{create_filter, create_moving_average, LandmarkFilter};
use crate::profile::{ExerciseProfile, ProfileRegistry};
use crate::{Error, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Landmark smoothing configuration
    pub smoothing: SmoothingConfig,

    /// Landmark gating configuration
    pub detection: DetectionConfig,

    /// Rep counting configuration
    pub reps: RepConfig,

    /// Additional exercise rows; a row with a built-in id replaces it
    pub profiles: Vec<ExerciseProfile>,
}

/// Smoothing filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Filter type (`moving_average` or `none`)
    pub filter: String,

    /// Moving average window size in frames
    pub window: usize,
}

/// Detection gating configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum landmark confidence (0.0-1.0)
    pub confidence_floor: f64,
}

/// Rep counting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepConfig {
    /// Reps closer together than this get a "slow down" hint; `null` disables
    pub min_rep_interval_secs: Option<f64>,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            filter: "moving_average".to_string(),
            window: DEFAULT_SMOOTHING_WINDOW,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            confidence_floor: DEFAULT_CONFIDENCE_FLOOR,
        }
    }
}

impl Default for RepConfig {
    fn default() -> Self {
        Self {
            min_rep_interval_secs: Some(DEFAULT_MIN_REP_INTERVAL_SECS),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Create a fresh per-session smoother from configuration
    ///
    /// A bare moving average name takes its window from `smoothing.window`;
    /// `moving_average:<N>` and `none` are passed to [`create_filter`].
    pub fn create_filter(&self) -> Result<Box<dyn LandmarkFilter>> {
        let name = self.smoothing.filter.trim().to_lowercase();
        match name.as_str() {
            "moving_average" | "movingaverage" => create_moving_average(self.smoothing.window),
            _ => create_filter(&name),
        }
    }

    /// Built-in profiles overlaid with the configured rows
    ///
    /// A configured row that fails validation is logged and skipped; the
    /// built-in rows and the other configured rows stay available.
    ///
    /// # Errors
    ///
    /// Only if a built-in row fails validation.
    pub fn build_registry(&self) -> Result<ProfileRegistry> {
        self.build_registry_with_rejects().map(|(registry, _)| registry)
    }

    /// Like [`Config::build_registry`], also returning the error of every
    /// rejected configured row
    pub fn build_registry_with_rejects(&self) -> Result<(ProfileRegistry, Vec<Error>)> {
        let mut registry = ProfileRegistry::with_builtin()?;
        let mut rejected = Vec::new();
        for profile in &self.profiles {
            match registry.register_or_replace(profile.clone()) {
                Ok(Some(_)) => warn!("Configured profile {} overrides the built-in row", profile.id),
                Ok(None) => {}
                Err(e) => {
                    warn!("Rejected configured profile: {e}");
                    rejected.push(e);
                }
            }
        }
        Ok((registry, rejected))
    }

    /// Validate the engine settings
    ///
    /// Profile rows are checked one by one in [`Config::build_registry`].
    pub fn validate(&self) -> Result<()> {
        self.create_filter()
            .map_err(|e| Error::ConfigError(format!("Invalid smoothing filter: {e}")))?;

        if !(0.0..=1.0).contains(&self.detection.confidence_floor) {
            return Err(Error::ConfigError(
                "Confidence floor must be between 0.0 and 1.0".to_string(),
            ));
        }

        if let Some(interval) = self.reps.min_rep_interval_secs {
            if !interval.is_finite() || interval < 0.0 {
                return Err(Error::ConfigError(
                    "Minimum rep interval must be a non-negative number of seconds".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Repetition counter configuration

# Landmark smoothing
smoothing:
  filter: "moving_average"
  window: 5

# Landmark gating
detection:
  confidence_floor: 0.5

# Rep counting (set min_rep_interval_secs to null to disable the hint)
reps:
  min_rep_interval_secs: 1.0

# Extra exercises, or overrides of the built-in squat / pushup / lunge rows
profiles:
  - id: curl
    label: Curls
    angles:
      pair:
        left: {a: 11, vertex: 13, c: 15}
        right: {a: 12, vertex: 14, c: 16}
    down_threshold: 60.0
    up_threshold: 150.0
    ideal_angle: 40.0
    low_form_bound: 30.0
    low_form_warning: "Don't swing the weight!"
"#;
