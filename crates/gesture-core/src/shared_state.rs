//! Shared gesture state: the producer/consumer boundary record
//!
//! A single mutex-guarded record, not a queue. Only the latest label
//! matters; if the consumer is slow, stale labels are intentionally
//! overwritten and lost. The producer sets `action_ready` once per
//! classified segment and never clears it; the consumer clears it via
//! `acknowledge` after acting.

use crate::label::GestureLabel;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// The record the segmentation core writes and the actuator side reads
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureOutput {
    /// Latest classified label; `None` until the first segment closes
    pub label: Option<GestureLabel>,
    /// One-shot "new result available" flag
    pub action_ready: bool,
}

impl Default for GestureOutput {
    fn default() -> Self {
        GestureOutput {
            label: None,
            action_ready: false,
        }
    }
}

/// Clonable handle to the shared gesture record
#[derive(Debug, Clone, Default)]
pub struct SharedGestureState {
    inner: Arc<Mutex<GestureOutput>>,
}

impl SharedGestureState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Producer side: write the label and raise the flag together,
    /// under one lock acquisition. Never blocks on the consumer.
    pub fn publish(&self, label: GestureLabel) {
        let mut output = self.inner.lock().expect("gesture state lock poisoned");
        output.label = Some(label);
        output.action_ready = true;
    }

    /// Consumer side: clear the flag and return the label if a new
    /// result was pending
    pub fn acknowledge(&self) -> Option<GestureLabel> {
        let mut output = self.inner.lock().expect("gesture state lock poisoned");
        if output.action_ready {
            output.action_ready = false;
            output.label
        } else {
            None
        }
    }

    /// Copy of the current record without consuming the flag
    pub fn snapshot(&self) -> GestureOutput {
        *self.inner.lock().expect("gesture state lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_has_no_label() {
        let state = SharedGestureState::new();
        let snapshot = state.snapshot();
        assert_eq!(snapshot.label, None);
        assert!(!snapshot.action_ready);
        assert_eq!(state.acknowledge(), None);
    }

    #[test]
    fn test_publish_then_acknowledge() {
        let state = SharedGestureState::new();
        state.publish(GestureLabel::Close);

        assert!(state.snapshot().action_ready);
        assert_eq!(state.acknowledge(), Some(GestureLabel::Close));

        // Flag is one-shot; the label itself remains readable
        assert_eq!(state.acknowledge(), None);
        assert_eq!(state.snapshot().label, Some(GestureLabel::Close));
    }

    #[test]
    fn test_rest_label_is_published() {
        let state = SharedGestureState::new();
        state.publish(GestureLabel::Rest);
        assert_eq!(state.acknowledge(), Some(GestureLabel::Rest));
    }

    #[test]
    fn test_slow_consumer_sees_latest_label_only() {
        let state = SharedGestureState::new();
        state.publish(GestureLabel::Open);
        state.publish(GestureLabel::RotateLeft);
        assert_eq!(state.acknowledge(), Some(GestureLabel::RotateLeft));
    }

    #[test]
    fn test_handles_share_one_record() {
        let producer = SharedGestureState::new();
        let consumer = producer.clone();
        producer.publish(GestureLabel::Open);
        assert_eq!(consumer.acknowledge(), Some(GestureLabel::Open));
        assert!(!producer.snapshot().action_ready);
    }
}
