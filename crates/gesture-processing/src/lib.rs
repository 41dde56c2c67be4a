//! Gesture-Processing: Signal conditioning, features, and classification
//!
//! Offline-per-segment processing: a closed gesture segment goes through
//! conditioning (gap repair, referencing, IIR filtering), fixed-order
//! feature extraction, and classifier inference.

pub mod classifier;
pub mod conditioner;
pub mod config;
pub mod features;
pub mod filters;

pub use classifier::{GestureClassifier, GestureModel};
pub use conditioner::{ConditionerConfig, Normalization, SignalConditioner};
pub use config::PipelineConfig;
pub use features::{FeatureConfig, FeatureExtractor};
pub use filters::{Biquad, IirCascade};
