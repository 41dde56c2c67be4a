//! Real-time gesture pipeline: polling runner and segmentation state
//! machine tying the source, conditioner, features, and classifier
//! together

pub mod runner;
pub mod segmentation;

pub use runner::{start_runner, GestureRunner, RunnerCommand, RunnerStats};
pub use segmentation::{Segmenter, SegmenterStats};
