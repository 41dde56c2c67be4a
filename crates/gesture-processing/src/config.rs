//! Pipeline configuration
//!
//! One serializable struct covering acquisition geometry, segmentation
//! thresholds, polling cadence, and the nested conditioner and feature
//! settings. Defaults match an 8-channel EMG armband with a 3-axis
//! gyroscope sampled at 500 Hz.

use crate::conditioner::ConditionerConfig;
use crate::features::FeatureConfig;
use gesture_core::{GestureError, GestureResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Samples per second, shared by EMG and inertial channels
    pub sampling_rate: f32,
    /// Muscle activity channels
    pub emg_channels: usize,
    /// Gyroscope axes used for movement detection
    pub inertial_channels: usize,
    /// Any single inertial sample beyond this magnitude marks movement
    pub inertial_threshold: f32,
    /// Closed segments shorter than this many frames are discarded
    pub min_segment_samples: usize,
    /// Frames drained from the source per poll tick
    pub poll_batch_size: usize,
    /// Runner tick period in milliseconds
    pub poll_interval_ms: u64,
    /// JSON classifier artifact
    pub model_path: PathBuf,
    pub conditioner: ConditionerConfig,
    pub features: FeatureConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            sampling_rate: 500.0,
            emg_channels: 8,
            inertial_channels: 3,
            inertial_threshold: 2000.0,
            min_segment_samples: 40,
            poll_batch_size: 20,
            poll_interval_ms: 20,
            model_path: PathBuf::from("gesture_model.json"),
            conditioner: ConditionerConfig::default(),
            features: FeatureConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> GestureResult<()> {
        if self.sampling_rate <= 0.0 || !self.sampling_rate.is_finite() {
            return Err(GestureError::config(format!(
                "sampling rate must be positive, got {}",
                self.sampling_rate
            )));
        }
        if self.emg_channels == 0 {
            return Err(GestureError::config("at least one EMG channel required"));
        }
        if self.inertial_channels == 0 {
            return Err(GestureError::config(
                "at least one inertial channel required",
            ));
        }
        if self.inertial_threshold <= 0.0 || !self.inertial_threshold.is_finite() {
            return Err(GestureError::config(format!(
                "inertial threshold must be positive, got {}",
                self.inertial_threshold
            )));
        }
        if self.min_segment_samples == 0 {
            return Err(GestureError::config(
                "minimum segment length must be non-zero",
            ));
        }
        if self.poll_batch_size == 0 {
            return Err(GestureError::config("poll batch size must be non-zero"));
        }
        if self.poll_interval_ms == 0 {
            return Err(GestureError::config("poll interval must be non-zero"));
        }
        self.conditioner.validate(self.sampling_rate)?;
        Ok(())
    }

    pub fn to_json(&self) -> GestureResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GestureError::config(format!("cannot serialize config: {}", e)))
    }

    pub fn from_json(json: &str) -> GestureResult<Self> {
        let config: PipelineConfig = serde_json::from_str(json)
            .map_err(|e| GestureError::config(format!("cannot parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> GestureResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            GestureError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }
}
