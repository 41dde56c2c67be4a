//! Two-state segmentation machine
//!
//! Movement detection rides on the inertial channels: any single sample
//! beyond the configured magnitude marks the whole batch as active. EMG
//! frames accumulate while active; the first quiet batch closes the
//! segment and hands it downstream. Segments shorter than the minimum
//! are discarded, which absorbs isolated gyro spikes.

use gesture_core::{GestureResult, SampleBatch, SegmentBuffer};
use serde::{Deserialize, Serialize};

/// Counters exposed for logging and tests
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SegmenterStats {
    pub batches_seen: u64,
    pub segments_opened: u64,
    pub segments_closed: u64,
    pub segments_discarded: u64,
}

enum SegmentationState {
    Idle,
    Active { segment: SegmentBuffer },
}

/// Gyro-gated gesture boundary detector
pub struct Segmenter {
    emg_channels: usize,
    inertial_threshold: f32,
    min_segment_samples: usize,
    state: SegmentationState,
    stats: SegmenterStats,
}

impl Segmenter {
    pub fn new(emg_channels: usize, inertial_threshold: f32, min_segment_samples: usize) -> Self {
        Segmenter {
            emg_channels,
            inertial_threshold,
            min_segment_samples,
            state: SegmentationState::Idle,
            stats: SegmenterStats::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SegmentationState::Active { .. })
    }

    /// Frames accumulated in the currently open segment
    pub fn open_frame_count(&self) -> usize {
        match &self.state {
            SegmentationState::Active { segment } => segment.frame_count(),
            SegmentationState::Idle => 0,
        }
    }

    pub fn stats(&self) -> SegmenterStats {
        self.stats
    }

    /// Drop any open segment and return to idle. Used after a
    /// downstream tick failure so the next gesture starts clean.
    pub fn reset(&mut self) {
        self.state = SegmentationState::Idle;
    }

    /// Advance the machine with one drained batch. Returns the closed
    /// segment when a gesture just ended and survived the minimum
    /// length check.
    pub fn on_batch(&mut self, batch: &SampleBatch) -> GestureResult<Option<SegmentBuffer>> {
        self.stats.batches_seen += 1;
        let moving = batch.crosses_threshold(self.inertial_threshold);
        let state = std::mem::replace(&mut self.state, SegmentationState::Idle);

        match (state, moving) {
            (SegmentationState::Idle, false) => Ok(None),
            (SegmentationState::Idle, true) => {
                let mut segment = SegmentBuffer::new(self.emg_channels)?;
                segment.append_batch(batch)?;
                self.stats.segments_opened += 1;
                self.state = SegmentationState::Active { segment };
                Ok(None)
            }
            (SegmentationState::Active { mut segment }, true) => {
                segment.append_batch(batch)?;
                self.state = SegmentationState::Active { segment };
                Ok(None)
            }
            (SegmentationState::Active { segment }, false) => {
                if segment.frame_count() < self.min_segment_samples {
                    self.stats.segments_discarded += 1;
                    Ok(None)
                } else {
                    self.stats.segments_closed += 1;
                    Ok(Some(segment))
                }
            }
        }
    }
}
