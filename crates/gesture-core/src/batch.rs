//! Sample batches: one polling tick's worth of frames
//!
//! A batch carries the frames drained from the upstream source since the
//! previous tick, split into named channel groups (EMG and inertial),
//! both interleaved frame-major.

use crate::error::{GestureError, GestureResult};

/// Time-aligned frames across the EMG and inertial channel groups
#[derive(Debug, Clone)]
pub struct SampleBatch {
    /// Interleaved EMG data: frame 0 channels, frame 1 channels, ...
    pub emg: Vec<f32>,
    /// Interleaved inertial data (gyroscope axes), same frame count
    pub inertial: Vec<f32>,
    /// Number of EMG channels per frame
    pub emg_channels: usize,
    /// Number of inertial channels per frame
    pub inertial_channels: usize,
}

impl SampleBatch {
    /// Create a batch, validating that both channel groups describe the
    /// same whole number of frames
    pub fn new(
        emg: Vec<f32>,
        inertial: Vec<f32>,
        emg_channels: usize,
        inertial_channels: usize,
    ) -> GestureResult<Self> {
        if emg_channels == 0 || inertial_channels == 0 {
            return Err(GestureError::shape("channel counts must be non-zero"));
        }
        if emg.len() % emg_channels != 0 {
            return Err(GestureError::shape(format!(
                "EMG data length {} is not a multiple of {} channels",
                emg.len(),
                emg_channels
            )));
        }
        if inertial.len() % inertial_channels != 0 {
            return Err(GestureError::shape(format!(
                "inertial data length {} is not a multiple of {} channels",
                inertial.len(),
                inertial_channels
            )));
        }

        let emg_frames = emg.len() / emg_channels;
        let inertial_frames = inertial.len() / inertial_channels;
        if emg_frames != inertial_frames {
            return Err(GestureError::shape(format!(
                "EMG group has {} frames but inertial group has {}",
                emg_frames, inertial_frames
            )));
        }

        Ok(SampleBatch {
            emg,
            inertial,
            emg_channels,
            inertial_channels,
        })
    }

    /// A batch with zero frames
    pub fn empty(emg_channels: usize, inertial_channels: usize) -> Self {
        SampleBatch {
            emg: Vec::new(),
            inertial: Vec::new(),
            emg_channels,
            inertial_channels,
        }
    }

    /// Number of time-aligned frames in this batch
    pub fn frame_count(&self) -> usize {
        if self.emg_channels == 0 {
            0
        } else {
            self.emg.len() / self.emg_channels
        }
    }

    /// Check if the batch carries no frames
    pub fn is_empty(&self) -> bool {
        self.emg.is_empty()
    }

    /// Largest absolute inertial reading in the batch, across all axes.
    ///
    /// The gesture-active condition is per-axis absolute value, not a
    /// vector norm: a single axis spiking past the threshold counts.
    pub fn peak_inertial_abs(&self) -> f32 {
        self.inertial.iter().fold(0.0f32, |acc, v| acc.max(v.abs()))
    }

    /// True when any inertial sample in the batch exceeds the threshold
    pub fn crosses_threshold(&self, threshold: f32) -> bool {
        self.inertial.iter().any(|v| v.abs() > threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_frame_alignment() {
        // 2 frames, 4 EMG channels, 2 inertial channels
        let batch = SampleBatch::new(vec![0.0; 8], vec![0.0; 4], 4, 2).unwrap();
        assert_eq!(batch.frame_count(), 2);

        // Mismatched frame counts between groups
        let err = SampleBatch::new(vec![0.0; 8], vec![0.0; 6], 4, 2);
        assert!(err.is_err());
    }

    #[test]
    fn test_ragged_group_rejected() {
        let err = SampleBatch::new(vec![0.0; 7], vec![0.0; 4], 4, 2);
        assert!(matches!(err, Err(GestureError::InvalidShape { .. })));
    }

    #[test]
    fn test_peak_inertial_abs_uses_magnitude() {
        let batch = SampleBatch::new(
            vec![0.0; 4],
            vec![100.0, -2500.0, 30.0, 40.0, 50.0, 60.0],
            2,
            3,
        )
        .unwrap();
        assert_eq!(batch.peak_inertial_abs(), 2500.0);
        assert!(batch.crosses_threshold(2000.0));
        assert!(!batch.crosses_threshold(3000.0));
    }

    #[test]
    fn test_empty_batch_never_crosses() {
        let batch = SampleBatch::empty(8, 3);
        assert_eq!(batch.frame_count(), 0);
        assert!(!batch.crosses_threshold(0.0));
    }
}
