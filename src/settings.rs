//! Simulation configuration and frame driving
//!
//! `SimConfig` is plain serde data so hosts can keep it in a JSON file.
//! `FrameDriver` turns wall-clock time into per-tick inputs.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::consts::*;
use crate::error::{Result, SimError};
use crate::sim::{FieldModel, FrameInput, StepParams};

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Number of orbiters created on spawn
    pub orbiter_count: usize,
    /// Orbiters spawn uniformly inside a ball of this radius
    pub spawn_radius: f32,
    /// Instances per renderer batch
    pub batch_size: usize,
    /// Orbiters per parallel work unit
    pub chunk_size: usize,

    // === Integration ===
    pub jitter: f32,
    pub attraction: f32,

    // === Frame driving ===
    /// Field time per wall-clock second
    pub time_scale: f32,
    /// Model index advance per wall-clock second
    pub model_cycle_rate: f32,
    /// Fixed model; cycles through every model when unset
    pub model: Option<FieldModel>,

    /// Master seed for spawning and jitter streams
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            orbiter_count: DEFAULT_ORBITER_COUNT,
            spawn_radius: SPAWN_RADIUS,
            batch_size: DEFAULT_BATCH_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,

            jitter: DEFAULT_JITTER,
            attraction: DEFAULT_ATTRACTION,

            time_scale: TIME_SCALE,
            model_cycle_rate: MODEL_CYCLE_RATE,
            model: None,

            seed: DEFAULT_SEED,
        }
    }
}

impl SimConfig {
    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(SimError::ConfigParse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(SimError::ConfigRead)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(SimError::ConfigParse)
    }

    pub fn step_params(&self) -> StepParams {
        StepParams {
            jitter: self.jitter,
            attraction: self.attraction,
        }
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> SimError {
            SimError::InvalidConfig {
                field,
                reason: reason.into(),
            }
        }

        if self.batch_size == 0 {
            return Err(invalid("batch_size", "must be at least 1"));
        }
        if self.chunk_size == 0 {
            return Err(invalid("chunk_size", "must be at least 1"));
        }
        if !self.spawn_radius.is_finite() || self.spawn_radius < 0.0 {
            return Err(invalid(
                "spawn_radius",
                format!("must be finite and non-negative, got {}", self.spawn_radius),
            ));
        }
        if !self.jitter.is_finite() || self.jitter < 0.0 {
            return Err(invalid(
                "jitter",
                format!("must be finite and non-negative, got {}", self.jitter),
            ));
        }
        if !self.attraction.is_finite() {
            return Err(invalid("attraction", "must be finite"));
        }
        if !self.time_scale.is_finite() {
            return Err(invalid("time_scale", "must be finite"));
        }
        if !self.model_cycle_rate.is_finite() {
            return Err(invalid("model_cycle_rate", "must be finite"));
        }
        Ok(())
    }
}

/// Produces per-tick inputs from wall-clock time
#[derive(Debug, Clone)]
pub struct FrameDriver {
    time_scale: f32,
    model_cycle_rate: f32,
    fixed_model: Option<FieldModel>,
    params: StepParams,
    last_model: Option<FieldModel>,
}

impl FrameDriver {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            time_scale: config.time_scale,
            model_cycle_rate: config.model_cycle_rate,
            fixed_model: config.model,
            params: config.step_params(),
            last_model: None,
        }
    }

    /// Inputs for the frame at `wall_seconds` since start
    pub fn frame(&mut self, wall_seconds: f32) -> FrameInput {
        let model = self
            .fixed_model
            .unwrap_or_else(|| FieldModel::cycle(wall_seconds * self.model_cycle_rate));

        if self.last_model != Some(model) {
            log::debug!("Field model -> {}", model.as_str());
            self.last_model = Some(model);
        }

        FrameInput {
            time: wall_seconds * self.time_scale,
            model,
            params: self.params,
        }
    }

    pub fn set_model(&mut self, model: Option<FieldModel>) {
        self.fixed_model = model;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.orbiter_count, 4000);
        assert_eq!(config.batch_size, 512);
        assert_eq!(config.model, None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimConfig::from_json(r#"{ "orbiter_count": 10, "model": "FigureEight" }"#)
            .expect("valid config");
        assert_eq!(config.orbiter_count, 10);
        assert_eq!(config.model, Some(FieldModel::FigureEight));
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn test_json_round_trip() {
        let config = SimConfig {
            model: Some(FieldModel::SphereField),
            seed: 77,
            ..Default::default()
        };
        let json = config.to_json().expect("serialize");
        assert_eq!(SimConfig::from_json(&json).expect("parse"), config);
    }

    #[test]
    fn test_rejects_zero_batch_size() {
        let err = SimConfig::from_json(r#"{ "batch_size": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidConfig {
                field: "batch_size",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_negative_jitter() {
        let config = SimConfig {
            jitter: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            SimConfig::from_json("{ nope"),
            Err(SimError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SimConfig::load("/definitely/not/here.json"),
            Err(SimError::ConfigRead(_))
        ));
    }

    #[test]
    fn test_driver_cycles_models() {
        let mut driver = FrameDriver::new(&SimConfig::default());
        // One model every ten wall seconds
        assert_eq!(driver.frame(0.0).model, FieldModel::Metaballs);
        assert_eq!(driver.frame(25.0).model, FieldModel::SpherePlane);
        assert_eq!(driver.frame(59.0).model, FieldModel::PerlinNoise);
        assert_eq!(driver.frame(61.0).model, FieldModel::Metaballs);

        let frame = driver.frame(30.0);
        assert!((frame.time - 3.0).abs() < 1e-6);
        assert_eq!(frame.params, StepParams::default());
    }

    #[test]
    fn test_driver_fixed_model() {
        let config = SimConfig {
            model: Some(FieldModel::SpinMixer),
            ..Default::default()
        };
        let mut driver = FrameDriver::new(&config);
        for t in [0.0, 15.0, 300.0] {
            assert_eq!(driver.frame(t).model, FieldModel::SpinMixer);
        }
        driver.set_model(None);
        assert_eq!(driver.frame(0.0).model, FieldModel::Metaballs);
    }
}
