//! Polling gesture runner
//!
//! Owns the whole pipeline: drains the sample source on a fixed tick,
//! feeds the segmentation machine, and on each closed segment runs
//! conditioning, feature extraction, and classification before
//! publishing to the shared gesture record. A tick failure is contained:
//! it is logged, the segmenter is reset, and polling continues.

use crate::segmentation::{Segmenter, SegmenterStats};
use gesture_core::{
    GestureError, GestureLabel, GestureResult, SampleSource, SegmentBuffer, SharedGestureState,
};
use gesture_processing::{
    FeatureExtractor, GestureClassifier, PipelineConfig, SignalConditioner,
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

/// Commands accepted while the runner loop is live
#[derive(Debug, Clone)]
pub enum RunnerCommand {
    Pause,
    Resume,
    Stop,
}

/// Counters exposed for logging and tests
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RunnerStats {
    pub ticks: u64,
    pub frames_drained: u64,
    pub labels_published: u64,
    pub tick_errors: u64,
}

/// Drives one sample source through segmentation and classification
pub struct GestureRunner<S: SampleSource> {
    config: PipelineConfig,
    source: S,
    segmenter: Segmenter,
    conditioner: SignalConditioner,
    extractor: FeatureExtractor,
    classifier: GestureClassifier,
    /// Rolling pre-gesture EMG window for filter-transient padding
    history: SegmentBuffer,
    shared: SharedGestureState,
    stats: RunnerStats,
}

impl<S: SampleSource> GestureRunner<S> {
    /// Build the full pipeline, loading the classifier artifact from
    /// the configured path. A missing or malformed model fails here,
    /// before any polling starts.
    pub fn new(config: PipelineConfig, source: S) -> GestureResult<Self> {
        let classifier = GestureClassifier::from_file(&config.model_path)?;
        Self::with_classifier(config, source, classifier)
    }

    /// Build the pipeline around an already-loaded classifier
    pub fn with_classifier(
        config: PipelineConfig,
        source: S,
        classifier: GestureClassifier,
    ) -> GestureResult<Self> {
        config.validate()?;
        if (source.sampling_rate() - config.sampling_rate).abs() > f32::EPSILON {
            return Err(GestureError::config(format!(
                "source samples at {} Hz, config expects {}",
                source.sampling_rate(),
                config.sampling_rate
            )));
        }

        let conditioner = SignalConditioner::new(config.conditioner.clone(), config.sampling_rate)?;
        let extractor = FeatureExtractor::new(config.features.clone());
        let expected = config.emg_channels * extractor.features_per_channel();
        if classifier.feature_count() != expected {
            return Err(GestureError::model(format!(
                "model expects {} features, pipeline produces {}",
                classifier.feature_count(),
                expected
            )));
        }

        Ok(GestureRunner {
            segmenter: Segmenter::new(
                config.emg_channels,
                config.inertial_threshold,
                config.min_segment_samples,
            ),
            conditioner,
            extractor,
            classifier,
            history: SegmentBuffer::new(config.emg_channels)?,
            shared: SharedGestureState::new(),
            stats: RunnerStats::default(),
            config,
            source,
        })
    }

    /// Handle the consumer side reads and acknowledges
    pub fn shared_state(&self) -> SharedGestureState {
        self.shared.clone()
    }

    pub fn stats(&self) -> RunnerStats {
        self.stats
    }

    pub fn segmenter_stats(&self) -> SegmenterStats {
        self.segmenter.stats()
    }

    /// One polling step: drain, segment, and classify if a gesture just
    /// ended. Synchronous so tests can step the pipeline without a
    /// runtime.
    pub fn tick(&mut self) -> GestureResult<Option<GestureLabel>> {
        self.stats.ticks += 1;

        if self.source.buffered_len() < self.config.poll_batch_size {
            return Ok(None);
        }
        let batch = self.source.drain()?;
        if batch.frame_count() == 0 {
            return Ok(None);
        }
        self.stats.frames_drained += batch.frame_count() as u64;

        let was_active = self.segmenter.is_active();
        let closed = self.segmenter.on_batch(&batch)?;
        if !was_active && self.segmenter.is_active() {
            debug!(
                peak = batch.peak_inertial_abs(),
                "movement detected, segment opened"
            );
        }

        let label = match closed {
            Some(segment) => Some(self.classify_segment(segment)?),
            None => None,
        };

        // Quiet frames extend the pre-gesture history; frames inside an
        // open segment do not, they already live in the segment.
        if !self.segmenter.is_active() {
            self.history.append_frames(&batch.emg)?;
            self.history.retain_last(self.config.conditioner.padding_samples);
        }

        Ok(label)
    }

    fn classify_segment(&mut self, segment: SegmentBuffer) -> GestureResult<GestureLabel> {
        debug!(
            segment_id = %segment.id,
            frames = segment.frame_count(),
            "conditioning closed segment"
        );

        let history = if self.history.is_empty() {
            None
        } else {
            Some(&self.history)
        };
        let channels = self.conditioner.condition(&segment, history)?;
        let features = self
            .extractor
            .feature_vector(&channels, self.config.sampling_rate)?;
        let label = self.classifier.classify(&features)?;

        self.shared.publish(label);
        self.stats.labels_published += 1;
        info!(
            segment_id = %segment.id,
            frames = segment.frame_count(),
            %label,
            "gesture classified"
        );
        Ok(label)
    }

    /// Poll the source on a fixed interval until `Stop` arrives or the
    /// command channel closes. Tick errors are logged and the segmenter
    /// reset; the loop keeps running.
    pub async fn run(&mut self, mut commands: mpsc::Receiver<RunnerCommand>) -> GestureResult<()> {
        let mut ticker = interval(Duration::from_millis(self.config.poll_interval_ms));
        let mut paused = false;

        info!(
            interval_ms = self.config.poll_interval_ms,
            threshold = self.config.inertial_threshold,
            "gesture runner started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if paused {
                        continue;
                    }
                    match self.tick() {
                        Ok(_) => {}
                        Err(e) => {
                            self.stats.tick_errors += 1;
                            self.segmenter.reset();
                            warn!(error = %e, "tick failed, segment dropped");
                        }
                    }
                }
                command = commands.recv() => {
                    match command {
                        Some(RunnerCommand::Pause) => {
                            paused = true;
                            info!("gesture runner paused");
                        }
                        Some(RunnerCommand::Resume) => {
                            paused = false;
                            info!("gesture runner resumed");
                        }
                        Some(RunnerCommand::Stop) | None => {
                            info!(
                                ticks = self.stats.ticks,
                                labels = self.stats.labels_published,
                                "gesture runner stopped"
                            );
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// Spawn a runner on the current tokio runtime, returning the shared
/// state handle and a command sender
pub fn start_runner<S: SampleSource + 'static>(
    config: PipelineConfig,
    source: S,
) -> GestureResult<(SharedGestureState, mpsc::Sender<RunnerCommand>)> {
    let mut runner = GestureRunner::new(config, source)?;
    let shared = runner.shared_state();
    let (command_sender, command_receiver) = mpsc::channel(32);

    tokio::spawn(async move {
        if let Err(e) = runner.run(command_receiver).await {
            warn!(error = %e, "gesture runner exited with error");
        }
    });

    Ok((shared, command_sender))
}
