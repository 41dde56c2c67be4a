//! Fixed-order feature extraction for gesture classification
//!
//! Each cleaned EMG channel is summarized by the same ordered feature
//! block; the multi-channel entry point concatenates blocks in channel
//! order. The layout is part of the classifier contract and must stay
//! stable across calls.

use gesture_core::{GestureError, GestureResult};
use rustfft::{num_complex::Complex, FftPlanner};
use serde::{Deserialize, Serialize};

/// Time-domain feature names per channel, in vector order
const TIME_FEATURES: [&str; 5] = ["mav", "rms", "wl", "zc", "ssc"];
/// Spectral feature names per channel, appended when enabled
const SPECTRAL_FEATURES: [&str; 2] = ["mnf", "mdf"];

/// Feature extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Report zero-crossings and slope-sign-changes per second instead
    /// of as raw counts
    pub rate_normalized: bool,
    /// Append mean/median frequency from the discrete spectrum
    pub spectral: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        FeatureConfig {
            rate_normalized: false,
            spectral: true,
        }
    }
}

/// Turns cleaned channels into one fixed-length feature vector
pub struct FeatureExtractor {
    config: FeatureConfig,
    fft_planner: FftPlanner<f32>,
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig) -> Self {
        FeatureExtractor {
            config,
            fft_planner: FftPlanner::new(),
        }
    }

    /// Number of features emitted per channel
    pub fn features_per_channel(&self) -> usize {
        TIME_FEATURES.len() + if self.config.spectral { SPECTRAL_FEATURES.len() } else { 0 }
    }

    /// Qualified feature names matching the vector layout
    /// (`ch0_mav`, `ch0_rms`, ..., `ch1_mav`, ...)
    pub fn feature_names(&self, channel_count: usize) -> Vec<String> {
        let mut names = Vec::with_capacity(channel_count * self.features_per_channel());
        for ch in 0..channel_count {
            for name in TIME_FEATURES {
                names.push(format!("ch{}_{}", ch, name));
            }
            if self.config.spectral {
                for name in SPECTRAL_FEATURES {
                    names.push(format!("ch{}_{}", ch, name));
                }
            }
        }
        names
    }

    /// Extract the per-channel feature block for one cleaned time series
    pub fn channel_features(&mut self, data: &[f32], sampling_rate: f32) -> Vec<f32> {
        let mut features = Vec::with_capacity(self.features_per_channel());
        let n = data.len() as f32;

        let mav = if data.is_empty() {
            0.0
        } else {
            data.iter().map(|x| x.abs()).sum::<f32>() / n
        };
        let rms = if data.is_empty() {
            0.0
        } else {
            (data.iter().map(|x| x * x).sum::<f32>() / n).sqrt()
        };
        let waveform_length: f32 = data.windows(2).map(|w| (w[1] - w[0]).abs()).sum();

        let mut zero_crossings = 0u32;
        for w in data.windows(2) {
            if (w[1] >= 0.0) != (w[0] >= 0.0) {
                zero_crossings += 1;
            }
        }

        let mut slope_sign_changes = 0u32;
        if data.len() > 2 {
            let mut prev_rising = data[1] > data[0];
            for w in data[1..].windows(2) {
                let rising = w[1] > w[0];
                if rising != prev_rising {
                    slope_sign_changes += 1;
                }
                prev_rising = rising;
            }
        }

        let (zc, ssc) = if self.config.rate_normalized && n > 0.0 && sampling_rate > 0.0 {
            let duration = n / sampling_rate;
            (zero_crossings as f32 / duration, slope_sign_changes as f32 / duration)
        } else {
            (zero_crossings as f32, slope_sign_changes as f32)
        };

        features.push(mav);
        features.push(rms);
        features.push(waveform_length);
        features.push(zc);
        features.push(ssc);

        if self.config.spectral {
            let (mnf, mdf) = self.spectral_features(data, sampling_rate);
            features.push(mnf);
            features.push(mdf);
        }

        features
    }

    /// Multi-channel entry point: one block per channel, concatenated in
    /// channel order
    pub fn feature_vector(
        &mut self,
        channels: &[Vec<f32>],
        sampling_rate: f32,
    ) -> GestureResult<Vec<f32>> {
        if channels.is_empty() {
            return Err(GestureError::shape("feature input has zero channels"));
        }
        let samples = channels[0].len();
        if samples == 0 {
            return Err(GestureError::shape("feature input has zero samples"));
        }
        if channels.iter().any(|c| c.len() != samples) {
            return Err(GestureError::shape("feature input channels have ragged lengths"));
        }

        let mut vector = Vec::with_capacity(channels.len() * self.features_per_channel());
        for channel in channels {
            vector.extend(self.channel_features(channel, sampling_rate));
        }
        Ok(vector)
    }

    /// Mean and median frequency from the one-sided magnitude spectrum.
    ///
    /// Degenerate spectra (constant input, too-short segments) yield
    /// (0, 0) instead of NaN.
    fn spectral_features(&mut self, data: &[f32], sampling_rate: f32) -> (f32, f32) {
        if data.len() < 4 || sampling_rate <= 0.0 {
            return (0.0, 0.0);
        }

        let n = data.len();
        let fft = self.fft_planner.plan_fft_forward(n);
        let mut buffer: Vec<Complex<f32>> =
            data.iter().map(|&x| Complex::new(x, 0.0)).collect();
        fft.process(&mut buffer);

        let freq_resolution = sampling_rate / n as f32;
        let magnitudes: Vec<f32> = buffer[..n / 2].iter().map(|c| c.norm()).collect();

        let total: f32 = magnitudes.iter().sum();
        if total <= 0.0 {
            return (0.0, 0.0);
        }

        // Mean frequency; the DC bin carries zero weight in the numerator
        let weighted: f32 = magnitudes
            .iter()
            .enumerate()
            .map(|(i, &m)| i as f32 * freq_resolution * m)
            .sum();
        let mean_frequency = weighted / total;

        let mut median_frequency = 0.0;
        let mut cumulative = 0.0;
        for (i, &m) in magnitudes.iter().enumerate() {
            cumulative += m;
            if cumulative >= total / 2.0 {
                median_frequency = i as f32 * freq_resolution;
                break;
            }
        }

        (mean_frequency, median_frequency)
    }
}
