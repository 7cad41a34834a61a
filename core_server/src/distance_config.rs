//! Configuration for the adaptive distance controller.
//!
//! Loaded from `distance_config.json`, with an environment variable override
//! for the file path. Read once at startup and immutable afterwards.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

pub const BUILTIN_DISTANCE_CONFIG: &str = include_str!("data/distance_config.json");

/// Environment variable naming an alternative config file.
pub const DISTANCE_CONFIG_ENV: &str = "DISTANCE_CONFIG_PATH";

/// Bounds and policy knobs for the distance controller.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DistanceControlConfig {
    pub min_view_distance: i32,
    pub max_view_distance: i32,
    pub min_simulation_distance: i32,
    pub max_simulation_distance: i32,
    /// Target for the rolling mean tick time, in milliseconds.
    pub mean_tick_to_stay_below_ms: f64,
    /// Symmetric dead band around the target; no adjustment inside it.
    pub tick_leeway_ms: f64,
    /// When false, the simulation distance is still tracked but never
    /// fanned out to levels by the automatic path.
    pub adjust_simulation_distance: bool,
    pub log_adjustments: bool,
    /// Ticks between regulation decisions.
    pub adjust_interval_ticks: u64,
}

impl Default for DistanceControlConfig {
    fn default() -> Self {
        Self {
            min_view_distance: 5,
            max_view_distance: 15,
            min_simulation_distance: 3,
            max_simulation_distance: 10,
            mean_tick_to_stay_below_ms: 45.0,
            tick_leeway_ms: 3.0,
            adjust_simulation_distance: true,
            log_adjustments: true,
            adjust_interval_ticks: 100,
        }
    }
}

impl DistanceControlConfig {
    pub fn builtin() -> Self {
        serde_json::from_str(BUILTIN_DISTANCE_CONFIG)
            .expect("builtin distance config should parse")
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, DistanceConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| DistanceConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&contents)?;
        Ok(config)
    }

    /// Reject configurations the controller cannot operate under.
    ///
    /// Inverted bounds would leave the controller with an empty operating
    /// range; they fail here, at startup.
    pub fn validate(&self) -> Result<(), DistanceConfigError> {
        if self.min_view_distance > self.max_view_distance {
            return Err(DistanceConfigError::InvertedViewBounds {
                min: self.min_view_distance,
                max: self.max_view_distance,
            });
        }
        if self.min_simulation_distance > self.max_simulation_distance {
            return Err(DistanceConfigError::InvertedSimulationBounds {
                min: self.min_simulation_distance,
                max: self.max_simulation_distance,
            });
        }
        if self.min_view_distance < 0 {
            return Err(DistanceConfigError::NegativeBound {
                axis: "view",
                value: self.min_view_distance,
            });
        }
        if self.min_simulation_distance < 0 {
            return Err(DistanceConfigError::NegativeBound {
                axis: "simulation",
                value: self.min_simulation_distance,
            });
        }
        if self.tick_leeway_ms < 0.0 {
            return Err(DistanceConfigError::NegativeLeeway(self.tick_leeway_ms));
        }
        if self.adjust_interval_ticks == 0 {
            return Err(DistanceConfigError::ZeroAdjustInterval);
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum DistanceConfigError {
    #[error("failed to parse distance config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read distance config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("view distance bounds are inverted: min {min} > max {max}")]
    InvertedViewBounds { min: i32, max: i32 },
    #[error("simulation distance bounds are inverted: min {min} > max {max}")]
    InvertedSimulationBounds { min: i32, max: i32 },
    #[error("{axis} distance minimum {value} is negative")]
    NegativeBound { axis: &'static str, value: i32 },
    #[error("tick leeway {0} ms is negative")]
    NegativeLeeway(f64),
    #[error("adjust interval must be at least one tick")]
    ZeroAdjustInterval,
}

/// Load the distance configuration, honoring the path override.
///
/// A broken override file falls back to the builtin configuration so the
/// server still comes up; validation happens later, at controller
/// construction.
pub fn load_distance_config_from_env() -> DistanceControlConfig {
    let Some(path) = env::var(DISTANCE_CONFIG_ENV).ok().map(PathBuf::from) else {
        tracing::info!(
            target: "rangekeeper::config",
            "distance_config.loaded=builtin"
        );
        return DistanceControlConfig::builtin();
    };

    match DistanceControlConfig::from_file(&path) {
        Ok(config) => {
            tracing::info!(
                target: "rangekeeper::config",
                path = %path.display(),
                "distance_config.loaded=file"
            );
            config
        }
        Err(err) => {
            tracing::warn!(
                target: "rangekeeper::config",
                path = %path.display(),
                error = %err,
                "distance_config.load_failed"
            );
            DistanceControlConfig::builtin()
        }
    }
}
