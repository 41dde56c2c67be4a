//! Live session demo: scripted armband through the full pipeline
//!
//! Runs the polling runner against the simulated armband while a
//! consumer task acknowledges classified gestures.
//!
//! Run with: cargo run --example live_session

use gesture_core::GestureLabel;
use gesture_processing::{FeatureExtractor, GestureClassifier, GestureModel, PipelineConfig};
use gesture_rt::{GestureRunner, RunnerCommand};
use gesture_simulation::{ArmbandConfig, ScriptedArmband};
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tracing::info;

/// Deterministic stand-in for a trained artifact: weights vary by class
/// and feature index so different segments can land on different labels
fn demo_model(feature_names: Vec<String>) -> GestureModel {
    let classes = GestureLabel::ALL.to_vec();
    let feature_count = feature_names.len();

    let weights = (0..classes.len())
        .map(|row| {
            (0..feature_count)
                .map(|col| ((row * 31 + col * 17) % 13) as f32 * 0.01 - 0.06)
                .collect()
        })
        .collect();

    GestureModel {
        classes,
        feature_names,
        weights,
        intercepts: vec![0.1, 0.0, 0.05, -0.05, 0.0],
        scaler_mean: None,
        scaler_scale: None,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let config = PipelineConfig::default();

    // Two gestures separated by rest, ~100 ms per phase at 500 Hz
    let armband = ScriptedArmband::from_envelopes(
        ArmbandConfig::default(),
        &[
            500.0, 500.0, 2500.0, 2500.0, 2500.0, 500.0, 500.0, 2500.0, 2500.0, 2500.0, 2500.0,
            500.0, 500.0,
        ],
        50,
    )?;

    let extractor = FeatureExtractor::new(config.features.clone());
    let model = demo_model(extractor.feature_names(config.emg_channels));
    let classifier = GestureClassifier::from_model(model)?;

    let mut runner = GestureRunner::with_classifier(config, armband, classifier)?;
    let shared = runner.shared_state();

    let (command_sender, command_receiver) = mpsc::channel(8);
    let runner_task = tokio::spawn(async move {
        let result = runner.run(command_receiver).await;
        (runner, result)
    });

    // Consumer: poll the shared record and act on each new label
    let consumer = tokio::spawn(async move {
        loop {
            if let Some(label) = shared.acknowledge() {
                info!(%label, "actuator received gesture");
            }
            sleep(Duration::from_millis(50)).await;
        }
    });

    sleep(Duration::from_secs(3)).await;
    command_sender.send(RunnerCommand::Stop).await?;
    consumer.abort();

    let (runner, result) = runner_task.await?;
    result?;
    let stats = runner.stats();
    info!(
        ticks = stats.ticks,
        frames = stats.frames_drained,
        labels = stats.labels_published,
        "session complete"
    );

    Ok(())
}
