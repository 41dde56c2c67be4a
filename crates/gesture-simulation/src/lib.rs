//! Scripted armband simulation for exercising the gesture pipeline
//! without hardware

pub mod armband;

pub use armband::{ArmbandConfig, GyroPhase, ScriptedArmband};
