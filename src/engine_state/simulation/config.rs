//! Tunable constants of the simulation.
//!
//! Every value is expressed per tick: the integrator takes one fixed step per
//! call, so speeds assume the host calls it at a steady display refresh rate.

use std::path::Path;

use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::error::ConfigError;

/// Simulation parameters. Missing JSON fields fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Height of the floor plane; also the zero point for activation delays
    pub floor_y: f32,
    /// Downward velocity added per tick while dismantling
    pub gravity: f32,
    /// Fraction of vertical speed kept when bouncing off the floor
    pub bounce: f32,
    /// Fraction of horizontal speed kept when touching the floor
    pub floor_friction: f32,
    /// Spread of the initial explosion velocity
    pub explosion_speed: f32,
    /// Spread of the initial explosion spin
    pub explosion_spin: f32,
    /// Fraction of the remaining offset closed per tick while rebuilding
    pub convergence_rate: f32,
    /// Squared distance under which a voxel snaps onto its target
    pub snap_tolerance_sq: f32,
    /// Color distance at which the assigner stops searching
    pub near_match_distance: f32,
    /// Activation delay per unit of target height, in milliseconds
    pub delay_per_unit_ms: f32,
    /// Minimum length of a rebuild animation, in milliseconds
    pub min_rebuild_ms: u64,
    /// Per-tick chance that a waiting voxel jitters
    pub jitter_chance: f32,
    /// Maximum jitter offset per axis
    pub jitter_amplitude: f32,
    /// Width of the square around the origin that rubble is scattered over
    pub rubble_spread: f32,
    /// How far below the floor rubble is parked
    pub rubble_depth: f32,
    /// Seed for the simulation RNG; random when absent
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            floor_y: -12.0,
            gravity: 0.05,
            bounce: 0.6,
            floor_friction: 0.9,
            explosion_speed: 1.5,
            explosion_spin: 0.4,
            convergence_rate: 0.15,
            snap_tolerance_sq: 0.01,
            near_match_distance: 0.05,
            delay_per_unit_ms: 100.0,
            min_rebuild_ms: 1000,
            jitter_chance: 0.1,
            jitter_amplitude: 0.1,
            rubble_spread: 50.0,
            rubble_depth: 5.0,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Parses a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Reads `path` if it exists, otherwise uses the defaults.
    ///
    /// A file that exists but fails to parse is reported and ignored.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No simulation config at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded simulation config from {}", path.display());
                config
            }
            Err(err) => {
                log::warn!("{err}; using default simulation config");
                Self::default()
            }
        }
    }

    /// A random generator honoring `seed`.
    pub fn rng(&self) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }

    /// How long a voxel targeting height `y` waits before moving.
    ///
    /// Targets at or below the floor start immediately. Delays too large
    /// to represent saturate at `Duration::MAX`.
    pub fn activation_delay(&self, y: f32) -> Duration {
        let height = (y - self.floor_y).max(0.0);
        let seconds = height * self.delay_per_unit_ms.max(0.0) / 1000.0;
        Duration::try_from_secs_f32(seconds).unwrap_or(Duration::MAX)
    }

    /// Minimum length of a rebuild animation.
    pub fn min_rebuild_duration(&self) -> Duration {
        Duration::from_millis(self.min_rebuild_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config = SimulationConfig::from_json_str("{}").expect("valid config");
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn json_overrides_single_fields() {
        let config = SimulationConfig::from_json_str(r#"{ "floor_y": 0.0, "seed": 42 }"#)
            .expect("valid config");

        assert_eq!(config.floor_y, 0.0);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.convergence_rate, 0.15);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let result = SimulationConfig::from_json_str(r#"{ "gravity": "down" }"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let result = SimulationConfig::load("does/not/exist.json");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn delay_grows_with_height_above_the_floor() {
        let config = SimulationConfig::default();

        assert_eq!(config.activation_delay(-12.0), Duration::ZERO);
        assert_eq!(config.activation_delay(-20.0), Duration::ZERO);

        let delay = config.activation_delay(-2.0);
        assert!((delay.as_secs_f32() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn oversized_delays_saturate() {
        let config = SimulationConfig::from_json_str(r#"{ "delay_per_unit_ms": 1e38 }"#)
            .expect("valid config");

        assert_eq!(config.activation_delay(20.0), Duration::MAX);
        assert_eq!(config.activation_delay(config.floor_y), Duration::ZERO);
    }

    #[test]
    fn seeded_generators_repeat() {
        let config = SimulationConfig {
            seed: Some(9),
            ..SimulationConfig::default()
        };
        assert_eq!(config.rng().u64(..), config.rng().u64(..));
    }
}
