//! IIR digital filters for EMG conditioning
//!
//! Butterworth high/low-pass filters built from cascaded biquad sections
//! plus a narrow notch for mains interference. Segments are filtered
//! offline and in full, so sections carry no state between calls.

use gesture_core::{GestureError, GestureResult};

/// Single second-order (biquad) filter section.
///
/// Difference equation:
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
#[derive(Debug, Clone, Copy)]
pub struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
}

impl Biquad {
    /// Second-order lowpass section via bilinear transform
    fn lowpass(cutoff: f32, fs: f32, q: f32) -> Self {
        let omega_c = 2.0 * std::f32::consts::PI * cutoff / fs;
        let k = (omega_c / 2.0).tan();
        let k2 = k * k;
        let norm = 1.0 / (k2 + k / q + 1.0);

        Biquad {
            b0: k2 * norm,
            b1: 2.0 * k2 * norm,
            b2: k2 * norm,
            a1: 2.0 * (k2 - 1.0) * norm,
            a2: (k2 - k / q + 1.0) * norm,
        }
    }

    /// Second-order highpass section via bilinear transform
    fn highpass(cutoff: f32, fs: f32, q: f32) -> Self {
        let omega_c = 2.0 * std::f32::consts::PI * cutoff / fs;
        let k = (omega_c / 2.0).tan();
        let k2 = k * k;
        let norm = 1.0 / (k2 + k / q + 1.0);

        Biquad {
            b0: norm,
            b1: -2.0 * norm,
            b2: norm,
            a1: 2.0 * (k2 - 1.0) * norm,
            a2: (k2 - k / q + 1.0) * norm,
        }
    }

    /// Notch section centered at `freq` with quality factor `q`
    fn notch(freq: f32, q: f32, fs: f32) -> Self {
        let omega = 2.0 * std::f32::consts::PI * freq / fs;
        let alpha = omega.sin() / (2.0 * q);
        let cos_omega = omega.cos();
        let a0 = 1.0 + alpha;

        Biquad {
            b0: 1.0 / a0,
            b1: -2.0 * cos_omega / a0,
            b2: 1.0 / a0,
            a1: -2.0 * cos_omega / a0,
            a2: (1.0 - alpha) / a0,
        }
    }

    /// Filter a whole channel in place, starting from zero state
    fn filter_inplace(&self, data: &mut [f32]) {
        let (mut x1, mut x2, mut y1, mut y2) = (0.0f32, 0.0f32, 0.0f32, 0.0f32);
        for sample in data.iter_mut() {
            let x = *sample;
            let y = self.b0 * x + self.b1 * x1 + self.b2 * x2 - self.a1 * y1 - self.a2 * y2;
            x2 = x1;
            x1 = x;
            y2 = y1;
            y1 = y;
            *sample = y;
        }
    }
}

/// Cascade of biquad sections applied in series
#[derive(Debug, Clone)]
pub struct IirCascade {
    sections: Vec<Biquad>,
}

impl IirCascade {
    /// Butterworth lowpass of the given (even) order
    pub fn butterworth_lowpass(cutoff: f32, fs: f32, order: usize) -> GestureResult<Self> {
        let qs = butterworth_section_qs(order)?;
        validate_cutoff(cutoff, fs)?;
        Ok(IirCascade {
            sections: qs.iter().map(|&q| Biquad::lowpass(cutoff, fs, q)).collect(),
        })
    }

    /// Butterworth highpass of the given (even) order
    pub fn butterworth_highpass(cutoff: f32, fs: f32, order: usize) -> GestureResult<Self> {
        let qs = butterworth_section_qs(order)?;
        validate_cutoff(cutoff, fs)?;
        Ok(IirCascade {
            sections: qs.iter().map(|&q| Biquad::highpass(cutoff, fs, q)).collect(),
        })
    }

    /// Single-section notch filter
    pub fn notch(freq: f32, q: f32, fs: f32) -> GestureResult<Self> {
        validate_cutoff(freq, fs)?;
        if q <= 0.0 {
            return Err(GestureError::config("notch Q factor must be positive"));
        }
        Ok(IirCascade {
            sections: vec![Biquad::notch(freq, q, fs)],
        })
    }

    /// Run the cascade over one channel, in place. Each call starts
    /// from zero filter state.
    pub fn apply(&self, data: &mut [f32]) {
        for section in &self.sections {
            section.filter_inplace(data);
        }
    }

    /// Number of biquad sections in the cascade
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }
}

/// Q values for the biquad sections of an even-order Butterworth filter.
///
/// For order n the k-th section pole pair gives
/// Q_k = 1 / (2 cos((2k + 1) * pi / (2n))).
fn butterworth_section_qs(order: usize) -> GestureResult<Vec<f32>> {
    if order == 0 || order % 2 != 0 {
        return Err(GestureError::config(format!(
            "Butterworth order must be a positive even number, got {}",
            order
        )));
    }

    let n = order as f32;
    Ok((0..order / 2)
        .map(|k| {
            let angle = (2 * k + 1) as f32 * std::f32::consts::PI / (2.0 * n);
            1.0 / (2.0 * angle.cos())
        })
        .collect())
}

fn validate_cutoff(cutoff: f32, fs: f32) -> GestureResult<()> {
    if fs <= 0.0 {
        return Err(GestureError::config("sampling rate must be positive"));
    }
    if cutoff <= 0.0 || cutoff >= fs / 2.0 {
        return Err(GestureError::config(format!(
            "cutoff {} Hz must lie strictly between 0 and Nyquist ({} Hz)",
            cutoff,
            fs / 2.0
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn tone(freq: f32, fs: f32, samples: usize) -> Vec<f32> {
        (0..samples)
            .map(|i| (2.0 * PI * freq * i as f32 / fs).sin())
            .collect()
    }

    fn rms(data: &[f32]) -> f32 {
        (data.iter().map(|x| x * x).sum::<f32>() / data.len() as f32).sqrt()
    }

    #[test]
    fn test_order_four_is_two_sections() {
        let cascade = IirCascade::butterworth_lowpass(200.0, 500.0, 4).unwrap();
        assert_eq!(cascade.section_count(), 2);
    }

    #[test]
    fn test_odd_order_rejected() {
        assert!(IirCascade::butterworth_highpass(20.0, 500.0, 3).is_err());
        assert!(IirCascade::butterworth_highpass(20.0, 500.0, 0).is_err());
    }

    #[test]
    fn test_cutoff_beyond_nyquist_rejected() {
        assert!(IirCascade::butterworth_lowpass(300.0, 500.0, 4).is_err());
        assert!(IirCascade::notch(250.0, 30.0, 500.0).is_err());
    }

    #[test]
    fn test_highpass_removes_drift_keeps_signal() {
        let fs = 500.0;
        // 2 Hz drift under a 100 Hz tone
        let mut data: Vec<f32> = tone(100.0, fs, 2000)
            .iter()
            .zip(tone(2.0, fs, 2000))
            .map(|(hi, lo)| hi + 2.0 * lo)
            .collect();

        let highpass = IirCascade::butterworth_highpass(20.0, fs, 4).unwrap();
        highpass.apply(&mut data);

        // Drift contributes rms ~1.41; after filtering the signal should
        // be dominated by the 100 Hz tone (rms ~0.707)
        let settled = &data[500..];
        assert!((rms(settled) - 0.707).abs() < 0.1);
    }

    #[test]
    fn test_notch_attenuates_center_frequency() {
        let fs = 500.0;
        let mut mains = tone(50.0, fs, 2000);
        let notch = IirCascade::notch(50.0, 30.0, fs).unwrap();
        notch.apply(&mut mains);

        let settled = rms(&mains[1000..]);
        assert!(settled < 0.1, "50 Hz tone rms after notch: {}", settled);

        // A 100 Hz tone passes mostly unchanged
        let mut signal = tone(100.0, fs, 2000);
        notch.apply(&mut signal);
        assert!((rms(&signal[1000..]) - 0.707).abs() < 0.1);
    }

    #[test]
    fn test_lowpass_attenuates_high_frequency() {
        let fs = 500.0;
        let mut data = tone(220.0, fs, 2000);
        let lowpass = IirCascade::butterworth_lowpass(100.0, fs, 4).unwrap();
        lowpass.apply(&mut data);
        assert!(rms(&data[500..]) < 0.1);
    }

    #[test]
    fn test_apply_is_repeatable() {
        let fs = 500.0;
        let cascade = IirCascade::butterworth_highpass(20.0, fs, 4).unwrap();

        let mut a = tone(60.0, fs, 512);
        let mut b = a.clone();
        cascade.apply(&mut a);
        cascade.apply(&mut b);
        assert_eq!(a, b);
    }
}
