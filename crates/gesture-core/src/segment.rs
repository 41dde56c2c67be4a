//! SegmentBuffer: EMG frames accumulated for one candidate gesture
//!
//! Owned exclusively by the segmentation state machine while open, then
//! moved by value into the conditioner once the gesture ends.

use crate::batch::SampleBatch;
use crate::error::{GestureError, GestureResult};
use uuid::Uuid;

/// Ordered EMG frames belonging to one candidate gesture event
#[derive(Debug, Clone)]
pub struct SegmentBuffer {
    /// Unique identifier for this segment
    pub id: Uuid,
    /// EMG data, interleaved frame-major
    data: Vec<f32>,
    /// Number of EMG channels per frame
    channel_count: usize,
}

impl SegmentBuffer {
    /// Create an empty segment for the given channel layout
    pub fn new(channel_count: usize) -> GestureResult<Self> {
        if channel_count == 0 {
            return Err(GestureError::shape("segment requires at least one channel"));
        }
        Ok(SegmentBuffer {
            id: Uuid::new_v4(),
            data: Vec::new(),
            channel_count,
        })
    }

    /// Append one batch's EMG frames to the open segment
    pub fn append_batch(&mut self, batch: &SampleBatch) -> GestureResult<()> {
        if batch.emg_channels != self.channel_count {
            return Err(GestureError::shape(format!(
                "batch has {} EMG channels, segment expects {}",
                batch.emg_channels, self.channel_count
            )));
        }
        self.data.extend_from_slice(&batch.emg);
        Ok(())
    }

    /// Append raw interleaved frames (used by tests and the history window)
    pub fn append_frames(&mut self, frames: &[f32]) -> GestureResult<()> {
        if frames.len() % self.channel_count != 0 {
            return Err(GestureError::shape(format!(
                "frame data length {} is not a multiple of {} channels",
                frames.len(),
                self.channel_count
            )));
        }
        self.data.extend_from_slice(frames);
        Ok(())
    }

    /// Number of frames accumulated so far
    pub fn frame_count(&self) -> usize {
        self.data.len() / self.channel_count
    }

    /// Number of EMG channels per frame
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Check if the segment holds no frames
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Extract one channel's time series
    pub fn channel_data(&self, channel_index: usize) -> GestureResult<Vec<f32>> {
        if channel_index >= self.channel_count {
            return Err(GestureError::shape(format!(
                "channel index {} out of bounds (0-{})",
                channel_index,
                self.channel_count - 1
            )));
        }

        let frames = self.frame_count();
        let mut channel = Vec::with_capacity(frames);
        for frame_idx in 0..frames {
            channel.push(self.data[frame_idx * self.channel_count + channel_index]);
        }
        Ok(channel)
    }

    /// Extract every channel as a separate time series
    pub fn all_channels(&self) -> GestureResult<Vec<Vec<f32>>> {
        let mut channels = Vec::with_capacity(self.channel_count);
        for ch in 0..self.channel_count {
            channels.push(self.channel_data(ch)?);
        }
        Ok(channels)
    }

    /// Drop all but the most recent `frames` frames.
    ///
    /// The runner uses this to keep a bounded pre-gesture history for
    /// filter-transient padding.
    pub fn retain_last(&mut self, frames: usize) {
        let keep = frames * self.channel_count;
        if self.data.len() > keep {
            self.data.drain(0..self.data.len() - keep);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(frames: usize, channels: usize, fill: f32) -> SampleBatch {
        SampleBatch::new(vec![fill; frames * channels], vec![0.0; frames * 3], channels, 3)
            .unwrap()
    }

    #[test]
    fn test_segment_growth() {
        let mut segment = SegmentBuffer::new(8).unwrap();
        assert!(segment.is_empty());

        segment.append_batch(&batch(50, 8, 1.0)).unwrap();
        segment.append_batch(&batch(50, 8, 2.0)).unwrap();
        assert_eq!(segment.frame_count(), 100);
        assert_eq!(segment.channel_count(), 8);
    }

    #[test]
    fn test_channel_mismatch_rejected() {
        let mut segment = SegmentBuffer::new(8).unwrap();
        let err = segment.append_batch(&batch(10, 4, 0.0));
        assert!(matches!(err, Err(GestureError::InvalidShape { .. })));
    }

    #[test]
    fn test_channel_extraction_interleaved() {
        let mut segment = SegmentBuffer::new(2).unwrap();
        // Frames: [0,1], [2,3], [4,5]
        segment.append_frames(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();

        assert_eq!(segment.channel_data(0).unwrap(), vec![0.0, 2.0, 4.0]);
        assert_eq!(segment.channel_data(1).unwrap(), vec![1.0, 3.0, 5.0]);
        assert!(segment.channel_data(2).is_err());
    }

    #[test]
    fn test_retain_last_keeps_recent_frames() {
        let mut segment = SegmentBuffer::new(2).unwrap();
        segment
            .append_frames(&[0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0])
            .unwrap();

        segment.retain_last(2);
        assert_eq!(segment.frame_count(), 2);
        assert_eq!(segment.channel_data(0).unwrap(), vec![2.0, 3.0]);

        // Retaining more than present is a no-op
        segment.retain_last(100);
        assert_eq!(segment.frame_count(), 2);
    }
}
