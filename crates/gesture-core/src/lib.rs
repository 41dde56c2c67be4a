//! Gesture-Core: Foundation types for the EMG gesture pipeline
//!
//! Sample batches, segment buffers, gesture labels, the shared
//! producer/consumer gesture record, and the upstream source boundary.

pub mod batch;
pub mod error;
pub mod label;
pub mod segment;
pub mod shared_state;
pub mod source;

pub use batch::*;
pub use error::{GestureError, GestureResult};
pub use label::*;
pub use segment::*;
pub use shared_state::*;
pub use source::SampleSource;
