//! Signal conditioner: gap repair, referencing, and the filter cascade
//!
//! Takes one closed gesture segment (frames x channels) and produces a
//! cleaned array of the same shape. Steps run in a fixed order: dropout
//! repair, optional average referencing, highpass -> notch -> lowpass,
//! optional normalization.

use crate::filters::IirCascade;
use gesture_core::{GestureError, GestureResult, SegmentBuffer};
use serde::{Deserialize, Serialize};

/// Post-filter per-channel normalization modes.
///
/// The recorded deployments disagree on whether and how to normalize, so
/// the choice is configuration rather than code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Normalization {
    /// No normalization (default)
    Off,
    /// (x - min) / (max - min) per channel
    MinMax,
    /// (x - mean) / std per channel
    ZScore,
}

/// Conditioner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionerConfig {
    /// Highpass cutoff for baseline drift removal (Hz)
    pub highpass_cutoff: f32,
    /// Notch center frequency for mains interference (Hz)
    pub notch_freq: f32,
    /// Notch quality factor
    pub notch_q: f32,
    /// Margin below Nyquist for the lowpass cutoff (Hz)
    pub lowpass_margin: f32,
    /// Butterworth order for the high/low-pass stages (even)
    pub filter_order: usize,
    /// Subtract the cross-channel mean at each time step before filtering
    pub average_reference: bool,
    /// Leading samples used to absorb filter startup transients
    pub padding_samples: usize,
    /// Post-filter normalization mode
    pub normalization: Normalization,
}

impl Default for ConditionerConfig {
    fn default() -> Self {
        ConditionerConfig {
            highpass_cutoff: 20.0,
            notch_freq: 50.0,
            notch_q: 30.0,
            lowpass_margin: 1.0,
            filter_order: 4,
            average_reference: false,
            padding_samples: 200,
            normalization: Normalization::Off,
        }
    }
}

impl ConditionerConfig {
    pub fn validate(&self, sampling_rate: f32) -> GestureResult<()> {
        let nyquist = sampling_rate / 2.0;
        if sampling_rate <= 0.0 {
            return Err(GestureError::config("sampling rate must be positive"));
        }
        if self.highpass_cutoff <= 0.0 || self.highpass_cutoff >= nyquist {
            return Err(GestureError::config(format!(
                "highpass cutoff {} Hz outside (0, {}) Hz",
                self.highpass_cutoff, nyquist
            )));
        }
        if self.notch_freq <= 0.0 || self.notch_freq >= nyquist {
            return Err(GestureError::config(format!(
                "notch frequency {} Hz outside (0, {}) Hz",
                self.notch_freq, nyquist
            )));
        }
        if self.notch_q <= 0.0 {
            return Err(GestureError::config("notch Q factor must be positive"));
        }
        if self.lowpass_margin <= 0.0 || self.lowpass_margin >= nyquist {
            return Err(GestureError::config(format!(
                "lowpass margin {} Hz outside (0, {}) Hz",
                self.lowpass_margin, nyquist
            )));
        }
        if self.filter_order == 0 || self.filter_order % 2 != 0 {
            return Err(GestureError::config("filter order must be a positive even number"));
        }
        Ok(())
    }
}

/// Turns a raw EMG segment into a cleaned, filtered array of the same shape
pub struct SignalConditioner {
    config: ConditionerConfig,
    sampling_rate: f32,
    highpass: IirCascade,
    notch: IirCascade,
    lowpass: IirCascade,
}

impl SignalConditioner {
    pub fn new(config: ConditionerConfig, sampling_rate: f32) -> GestureResult<Self> {
        config.validate(sampling_rate)?;

        let highpass = IirCascade::butterworth_highpass(
            config.highpass_cutoff,
            sampling_rate,
            config.filter_order,
        )?;
        let notch = IirCascade::notch(config.notch_freq, config.notch_q, sampling_rate)?;
        let lowpass = IirCascade::butterworth_lowpass(
            sampling_rate / 2.0 - config.lowpass_margin,
            sampling_rate,
            config.filter_order,
        )?;

        Ok(SignalConditioner {
            config,
            sampling_rate,
            highpass,
            notch,
            lowpass,
        })
    }

    pub fn sampling_rate(&self) -> f32 {
        self.sampling_rate
    }

    /// Condition a closed segment. `history` supplies pre-gesture frames
    /// that absorb filter startup transients; they are prepended before
    /// filtering and dropped from the output. With no (or short) history
    /// the leading edge is replicated instead. Output shape equals
    /// segment shape.
    pub fn condition(
        &self,
        segment: &SegmentBuffer,
        history: Option<&SegmentBuffer>,
    ) -> GestureResult<Vec<Vec<f32>>> {
        if segment.is_empty() {
            return Err(GestureError::shape("cannot condition an empty segment"));
        }
        if let Some(history) = history {
            if history.channel_count() != segment.channel_count() {
                return Err(GestureError::shape(format!(
                    "history has {} channels, segment has {}",
                    history.channel_count(),
                    segment.channel_count()
                )));
            }
        }

        let channels = segment.all_channels()?;
        let history_channels = match history {
            Some(h) if !h.is_empty() => Some(h.all_channels()?),
            _ => None,
        };

        let pad = self.config.padding_samples;
        let mut padded: Vec<Vec<f32>> = channels
            .iter()
            .enumerate()
            .map(|(ch, data)| {
                let mut out = Vec::with_capacity(pad + data.len());
                if let Some(history) = &history_channels {
                    let hist = &history[ch];
                    let take = hist.len().min(pad);
                    // Short history: replicate its oldest sample to fill
                    out.resize(pad - take, *hist.first().unwrap_or(&data[0]));
                    out.extend_from_slice(&hist[hist.len() - take..]);
                } else {
                    out.resize(pad, data[0]);
                }
                out.extend_from_slice(data);
                out
            })
            .collect();

        for channel in &mut padded {
            repair_dropouts(channel);
        }

        if self.config.average_reference {
            apply_average_reference(&mut padded);
        }

        for channel in &mut padded {
            self.highpass.apply(channel);
            self.notch.apply(channel);
            self.lowpass.apply(channel);
        }

        let mut cleaned: Vec<Vec<f32>> = padded
            .into_iter()
            .map(|mut channel| {
                channel.drain(0..pad);
                channel
            })
            .collect();

        match self.config.normalization {
            Normalization::Off => {}
            Normalization::MinMax => cleaned.iter_mut().for_each(|c| min_max_normalize(c)),
            Normalization::ZScore => cleaned.iter_mut().for_each(|c| z_score_normalize(c)),
        }

        Ok(cleaned)
    }
}

/// Repair sensor dropouts in one channel, in place.
///
/// The literal value 0.0 is the missing-data sentinel. Interior gaps are
/// linearly interpolated between the neighboring known values; leading
/// gaps are back-filled from the first known value and trailing gaps
/// carried forward from the last. An all-gap channel is left as zeros.
pub fn repair_dropouts(channel: &mut [f32]) {
    let (first_known, last_known) = match (
        channel.iter().position(|&v| v != 0.0),
        channel.iter().rposition(|&v| v != 0.0),
    ) {
        (Some(first), Some(last)) => (first, last),
        _ => return,
    };

    // Back-fill the leading gap: no earlier data to interpolate from
    let first_value = channel[first_known];
    for v in &mut channel[..first_known] {
        *v = first_value;
    }
    let last_value = channel[last_known];
    for v in &mut channel[last_known..] {
        *v = last_value;
    }

    // Interior gaps: linear interpolation across the time axis
    let mut prev_known = first_known;
    let mut idx = first_known + 1;
    while idx <= last_known {
        if channel[idx] != 0.0 {
            let gap = idx - prev_known;
            if gap > 1 {
                let start = channel[prev_known];
                let step = (channel[idx] - start) / gap as f32;
                for (offset, v) in channel[prev_known + 1..idx].iter_mut().enumerate() {
                    *v = start + step * (offset + 1) as f32;
                }
            }
            prev_known = idx;
        }
        idx += 1;
    }
}

/// Subtract the cross-channel mean from every channel at each time step
fn apply_average_reference(channels: &mut [Vec<f32>]) {
    if channels.len() < 2 {
        return;
    }
    let samples = channels[0].len();
    let count = channels.len() as f32;

    for t in 0..samples {
        let mean: f32 = channels.iter().map(|c| c[t]).sum::<f32>() / count;
        for channel in channels.iter_mut() {
            channel[t] -= mean;
        }
    }
}

fn min_max_normalize(channel: &mut [f32]) {
    let min = channel.iter().fold(f32::INFINITY, |a, &b| a.min(b));
    let max = channel.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let range = max - min;
    if range > 0.0 {
        for v in channel.iter_mut() {
            *v = (*v - min) / range;
        }
    } else {
        channel.fill(0.0);
    }
}

fn z_score_normalize(channel: &mut [f32]) {
    let n = channel.len() as f32;
    let mean = channel.iter().sum::<f32>() / n;
    let variance = channel.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
    let std = variance.sqrt();
    if std > 0.0 {
        for v in channel.iter_mut() {
            *v = (*v - mean) / std;
        }
    } else {
        channel.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn segment_from_channels(channels: &[Vec<f32>]) -> SegmentBuffer {
        let channel_count = channels.len();
        let frames = channels[0].len();
        let mut segment = SegmentBuffer::new(channel_count).unwrap();
        let mut interleaved = Vec::with_capacity(frames * channel_count);
        for t in 0..frames {
            for channel in channels {
                interleaved.push(channel[t]);
            }
        }
        segment.append_frames(&interleaved).unwrap();
        segment
    }

    #[test]
    fn test_interior_gap_interpolation_bound() {
        let mut channel = vec![4.0, 0.0, 0.0, 10.0];
        repair_dropouts(&mut channel);
        assert_eq!(channel, vec![4.0, 6.0, 8.0, 10.0]);
        // Repaired values lie between the neighboring non-gap values
        assert!(channel[1] >= 4.0 && channel[1] <= 10.0);
        assert!(channel[2] >= 4.0 && channel[2] <= 10.0);
    }

    #[test]
    fn test_leading_gap_back_filled() {
        let mut channel = vec![0.0, 0.0, 3.0, 5.0];
        repair_dropouts(&mut channel);
        assert_eq!(channel, vec![3.0, 3.0, 3.0, 5.0]);
    }

    #[test]
    fn test_trailing_gap_carried_forward() {
        let mut channel = vec![2.0, 7.0, 0.0, 0.0];
        repair_dropouts(&mut channel);
        assert_eq!(channel, vec![2.0, 7.0, 7.0, 7.0]);
    }

    #[test]
    fn test_all_gap_channel_stays_zero() {
        let mut channel = vec![0.0; 8];
        repair_dropouts(&mut channel);
        assert_eq!(channel, vec![0.0; 8]);
    }

    #[test]
    fn test_average_reference_removes_common_mode() {
        let mut channels = vec![vec![3.0, 5.0], vec![3.0, 5.0], vec![3.0, 5.0]];
        apply_average_reference(&mut channels);
        for channel in &channels {
            assert_eq!(channel, &vec![0.0, 0.0]);
        }
    }

    #[test]
    fn test_output_shape_matches_input() {
        let fs = 500.0;
        let channels: Vec<Vec<f32>> = (0..8)
            .map(|ch| {
                (0..300)
                    .map(|i| ((2.0 * PI * 80.0 * i as f32 / fs) + ch as f32).sin())
                    .collect()
            })
            .collect();
        let segment = segment_from_channels(&channels);

        let conditioner =
            SignalConditioner::new(ConditionerConfig::default(), fs).unwrap();
        let cleaned = conditioner.condition(&segment, None).unwrap();

        assert_eq!(cleaned.len(), 8);
        for channel in &cleaned {
            assert_eq!(channel.len(), 300);
            assert!(channel.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_history_padding_used_when_available() {
        let fs = 500.0;
        let tone: Vec<f32> = (0..400)
            .map(|i| (2.0 * PI * 80.0 * i as f32 / fs).sin() + 0.001)
            .collect();
        let history = segment_from_channels(&[tone[..200].to_vec()]);
        let segment = segment_from_channels(&[tone[200..].to_vec()]);

        let conditioner =
            SignalConditioner::new(ConditionerConfig::default(), fs).unwrap();

        let with_history = conditioner.condition(&segment, Some(&history)).unwrap();
        let without = conditioner.condition(&segment, None).unwrap();

        assert_eq!(with_history[0].len(), segment.frame_count());
        assert_eq!(without[0].len(), segment.frame_count());
        // Both runs settle to the same steady state once transients decay
        let tail_delta: f32 = with_history[0][150..]
            .iter()
            .zip(&without[0][150..])
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f32::max);
        assert!(tail_delta < 0.05, "steady-state mismatch {}", tail_delta);
    }

    #[test]
    fn test_history_channel_mismatch_rejected() {
        let fs = 500.0;
        let segment = segment_from_channels(&[vec![1.0; 50], vec![1.0; 50]]);
        let history = segment_from_channels(&[vec![1.0; 50]]);

        let conditioner =
            SignalConditioner::new(ConditionerConfig::default(), fs).unwrap();
        let err = conditioner.condition(&segment, Some(&history));
        assert!(matches!(err, Err(GestureError::InvalidShape { .. })));
    }

    #[test]
    fn test_empty_segment_rejected() {
        let conditioner =
            SignalConditioner::new(ConditionerConfig::default(), 500.0).unwrap();
        let segment = SegmentBuffer::new(8).unwrap();
        assert!(conditioner.condition(&segment, None).is_err());
    }

    #[test]
    fn test_min_max_normalization_bounds_output() {
        let fs = 500.0;
        let channels: Vec<Vec<f32>> = vec![(0..300)
            .map(|i| (2.0 * PI * 60.0 * i as f32 / fs).sin() * 50.0)
            .collect()];
        let segment = segment_from_channels(&channels);

        let config = ConditionerConfig {
            normalization: Normalization::MinMax,
            ..Default::default()
        };
        let conditioner = SignalConditioner::new(config, fs).unwrap();
        let cleaned = conditioner.condition(&segment, None).unwrap();

        for v in &cleaned[0] {
            assert!((0.0..=1.0).contains(v));
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ConditionerConfig {
            highpass_cutoff: 400.0, // beyond Nyquist at 500 Hz
            ..Default::default()
        };
        assert!(SignalConditioner::new(config, 500.0).is_err());

        let config = ConditionerConfig {
            filter_order: 3,
            ..Default::default()
        };
        assert!(SignalConditioner::new(config, 500.0).is_err());
    }
}
