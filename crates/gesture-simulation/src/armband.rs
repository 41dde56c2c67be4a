//! Scripted armband simulator
//!
//! Replays a scripted sequence of gyroscope envelopes while generating
//! seeded Gaussian EMG noise, so segmentation scenarios are
//! deterministic and repeatable. Each drain yields a fixed number of
//! frames and advances to the next script entry once its frame count
//! is exhausted.

use gesture_core::{GestureError, GestureResult, SampleBatch, SampleSource};
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// One stretch of the gyro script: a constant envelope held for a
/// number of frames
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GyroPhase {
    /// Peak |value| emitted on each gyro axis during this phase
    pub envelope: f32,
    /// Frames before the script advances
    pub frames: usize,
}

impl GyroPhase {
    pub fn new(envelope: f32, frames: usize) -> Self {
        GyroPhase { envelope, frames }
    }
}

/// Configuration for the scripted armband
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmbandConfig {
    /// Sampling rate in Hz
    pub sampling_rate: f32,
    /// EMG channels to simulate
    pub emg_channels: usize,
    /// Gyroscope axes to simulate
    pub inertial_channels: usize,
    /// Frames produced per drain call
    pub frames_per_drain: usize,
    /// Gaussian noise standard deviation on EMG channels
    pub emg_noise_std: f32,
    /// EMG amplitude added on top of the noise while the gyro script is
    /// in an active phase
    pub emg_burst_amplitude: f32,
    /// Random seed for reproducibility
    pub seed: u64,
}

impl Default for ArmbandConfig {
    fn default() -> Self {
        ArmbandConfig {
            sampling_rate: 500.0,
            emg_channels: 8,
            inertial_channels: 3,
            frames_per_drain: 20,
            emg_noise_std: 20.0,
            emg_burst_amplitude: 150.0,
            seed: 7,
        }
    }
}

/// Deterministic armband stand-in driven by a gyro script
pub struct ScriptedArmband {
    config: ArmbandConfig,
    script: Vec<GyroPhase>,
    /// Index into `script`; past the end means the armband idles at rest
    phase_index: usize,
    /// Frames already emitted from the current phase
    phase_emitted: usize,
    frame_counter: usize,
    rng: rand::rngs::StdRng,
    noise_dist: Normal<f32>,
    /// Envelope considered "active" for the EMG burst overlay
    burst_threshold: f32,
}

impl ScriptedArmband {
    pub fn new(config: ArmbandConfig, script: Vec<GyroPhase>) -> GestureResult<Self> {
        if config.emg_channels == 0 || config.inertial_channels == 0 {
            return Err(GestureError::config(
                "simulated armband needs at least one channel per group",
            ));
        }
        if config.frames_per_drain == 0 {
            return Err(GestureError::config("frames per drain must be non-zero"));
        }
        let noise_dist = Normal::new(0.0, config.emg_noise_std).map_err(|e| {
            GestureError::config(format!("invalid EMG noise std: {}", e))
        })?;

        Ok(ScriptedArmband {
            rng: rand::rngs::StdRng::seed_from_u64(config.seed),
            config,
            script,
            phase_index: 0,
            phase_emitted: 0,
            frame_counter: 0,
            noise_dist,
            burst_threshold: 1000.0,
        })
    }

    /// Convenience constructor: one phase per envelope value, each held
    /// for the same number of frames
    pub fn from_envelopes(
        config: ArmbandConfig,
        envelopes: &[f32],
        frames_per_phase: usize,
    ) -> GestureResult<Self> {
        let script = envelopes
            .iter()
            .map(|&envelope| GyroPhase::new(envelope, frames_per_phase))
            .collect();
        Self::new(config, script)
    }

    /// True once every scripted phase has been fully emitted
    pub fn script_exhausted(&self) -> bool {
        self.phase_index >= self.script.len()
    }

    pub fn config(&self) -> &ArmbandConfig {
        &self.config
    }

    /// Current phase envelope, 0 after the script ends
    fn current_envelope(&self) -> f32 {
        self.script
            .get(self.phase_index)
            .map(|phase| phase.envelope)
            .unwrap_or(0.0)
    }

    fn advance_phase(&mut self) {
        self.phase_emitted += 1;
        if let Some(phase) = self.script.get(self.phase_index) {
            if self.phase_emitted >= phase.frames {
                self.phase_index += 1;
                self.phase_emitted = 0;
            }
        }
    }

    fn next_frame(&mut self, emg: &mut Vec<f32>, inertial: &mut Vec<f32>) {
        let envelope = self.current_envelope();
        let bursting = envelope.abs() > self.burst_threshold;

        for _ in 0..self.config.emg_channels {
            let mut value = self.noise_dist.sample(&mut self.rng);
            if bursting {
                value += self.config.emg_burst_amplitude
                    * (2.0 * std::f32::consts::PI * 80.0 * self.frame_counter as f32
                        / self.config.sampling_rate)
                        .sin();
            }
            emg.push(value);
        }

        // Alternate sign so the envelope exercises both polarities
        let sign = if self.frame_counter % 2 == 0 { 1.0 } else { -1.0 };
        for _ in 0..self.config.inertial_channels {
            inertial.push(sign * envelope);
        }

        self.frame_counter += 1;
        self.advance_phase();
    }
}

impl SampleSource for ScriptedArmband {
    fn buffered_len(&self) -> usize {
        self.config.frames_per_drain
    }

    fn drain(&mut self) -> GestureResult<SampleBatch> {
        let frames = self.config.frames_per_drain;
        let mut emg = Vec::with_capacity(frames * self.config.emg_channels);
        let mut inertial = Vec::with_capacity(frames * self.config.inertial_channels);

        for _ in 0..frames {
            self.next_frame(&mut emg, &mut inertial);
        }

        SampleBatch::new(
            emg,
            inertial,
            self.config.emg_channels,
            self.config.inertial_channels,
        )
    }

    fn sampling_rate(&self) -> f32 {
        self.config.sampling_rate
    }
}
