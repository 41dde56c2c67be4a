//! Upstream sample source boundary
//!
//! The device/session layer lives behind this trait. The core only asks
//! how many unread frames are buffered and drains them; it never seeks
//! backward.

use crate::batch::SampleBatch;
use crate::error::GestureResult;

/// A buffered stream of sample frames from a wearable sensor
pub trait SampleSource: Send {
    /// Number of unread frames currently buffered
    fn buffered_len(&self) -> usize;

    /// Withdraw all unread frames accumulated since the previous call,
    /// split into EMG and inertial channel groups. Frames left unread
    /// stay buffered for the next call; drained frames are never
    /// re-delivered.
    fn drain(&mut self) -> GestureResult<SampleBatch>;

    /// Samples per second of the underlying stream
    fn sampling_rate(&self) -> f32;
}
