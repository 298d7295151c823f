//! Simulation configuration
//!
//! Supports loading configs from RON (Rusty Object Notation) or JSON.

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::ai::{BehaviorParams, DEFAULT_CELL_SIZE, VehicleConfig};
use crate::physics::{CubePlane, Obstacle, ObstacleField};

/// Everything needed to set up and run a simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Ground the agents move on
    pub plane: CubePlane,
    /// Tuning shared by every prey
    pub prey: VehicleConfig,
    /// Tuning shared by every predator
    pub predator: VehicleConfig,
    /// Number of prey spawned at start
    pub prey_count: usize,
    /// Number of predators spawned at start
    pub predator_count: usize,
    /// Minimum distance between a spawned prey and the nearest predator
    pub spawn_clearance: f32,
    /// Multiplier on the plane's containment force
    pub bounding_force_scale: f32,
    /// Static obstacles
    pub obstacles: ObstacleField,
    /// Cell size of the per-tick spatial grids
    pub cell_size: f32,
    /// Seed for every random decision
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let mut prey = VehicleConfig::default();
        prey.steering.fleeing = BehaviorParams::new(2.0, 2.0).with_radius(10.0);
        prey.steering.evading = BehaviorParams::new(1.0, 2.0);

        let mut predator = VehicleConfig::default();
        predator.steering.seeking = BehaviorParams::new(1.8, 2.0).with_radius(15.0);
        predator.steering.wandering = BehaviorParams::new(1.0, 1.0);

        Self {
            plane: CubePlane::default(),
            prey,
            predator,
            prey_count: 20,
            predator_count: 3,
            spawn_clearance: 10.0,
            bounding_force_scale: 2.0,
            obstacles: ObstacleField::default(),
            cell_size: DEFAULT_CELL_SIZE,
            seed: 0,
        }
    }
}

impl SimulationConfig {
    /// Set the population sizes
    pub fn with_population(mut self, prey: usize, predators: usize) -> Self {
        self.prey_count = prey;
        self.predator_count = predators;
        self
    }

    /// Set the play area
    pub fn with_plane(mut self, plane: CubePlane) -> Self {
        self.plane = plane;
        self
    }

    /// Add a static obstacle
    pub fn with_obstacle(mut self, center: Vec3, radius: f32) -> Self {
        self.obstacles.obstacles.push(Obstacle::new(center, radius));
        self
    }

    /// Set the RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check the config for values the simulation cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.prey.is_valid() {
            return Err(ConfigError::Invalid(
                "prey: mass must be positive and speeds, scales, radii non-negative".into(),
            ));
        }
        if !self.predator.is_valid() {
            return Err(ConfigError::Invalid(
                "predator: mass must be positive and speeds, scales, radii non-negative".into(),
            ));
        }
        if !self.plane.size.is_finite() || !self.plane.center.is_finite() {
            return Err(ConfigError::Invalid("plane: center and size must be finite".into()));
        }
        for (name, value) in [
            ("spawn_clearance", self.spawn_clearance),
            ("bounding_force_scale", self.bounding_force_scale),
            ("obstacles.look_ahead", self.obstacles.look_ahead),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be non-negative, got {value}")));
            }
        }

        // Prey spawn by rejection sampling away from predators. A clearance
        // up to half the shorter side leaves a band along the far edges even
        // for a predator in the middle of the plane.
        let half_side = self.plane.size.x.abs().min(self.plane.size.z.abs()) * 0.5;
        if self.predator_count > 0 && self.prey_count > 0 && self.spawn_clearance > half_side {
            return Err(ConfigError::Invalid(format!(
                "spawn_clearance {} exceeds half the shorter plane side ({half_side})",
                self.spawn_clearance
            )));
        }
        Ok(())
    }

    /// Parse a config from a RON string
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid config
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        ron::from_str(content).map_err(|e| ConfigError::DeserializeError(e.to_string()))
    }

    /// Parse a config from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid config
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::DeserializeError(e.to_string()))
    }

    /// Save the config to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a config from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Load a config from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Load a config, picking the format from the file extension
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is unknown or loading fails
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("ron") => Self::load_ron(path),
            Some("json") => Self::load_json(path),
            other => Err(ConfigError::UnknownFormat(other.unwrap_or_default().to_string())),
        }
    }
}

/// Errors that can occur while loading or validating a config
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
    /// File extension is neither `ron` nor `json`
    UnknownFormat(String),
    /// Values the simulation cannot run with
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
            Self::UnknownFormat(ext) => write!(f, "Unknown config format: {ext:?}"),
            Self::Invalid(e) => write!(f, "Invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
