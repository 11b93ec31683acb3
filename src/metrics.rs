//! # Evaluation Metrics Module
//!
//! Similarity measures for comparing generated waveforms against corpus
//! recordings: a Welch-style power spectral density estimate with a
//! distance over normalized spectra, and a band-limited dynamic time
//! warping distance for time-domain shape comparison.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Hann window of length `n`
pub fn hann_window(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let x = std::f64::consts::PI * i as f64 / n as f64;
            x.sin() * x.sin()
        })
        .collect()
}

/// Mean-periodogram PSD estimator over half-overlapping Hann windows
pub struct PsdEstimator {
    fft_size: usize,
    fft: Arc<dyn Fft<f64>>,
    window: Vec<f64>,
    scratch: Vec<Complex<f64>>,
}

impl PsdEstimator {
    /// `fft_size` should be a power of two
    pub fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        Self {
            fft_size,
            fft,
            window: hann_window(fft_size),
            scratch,
        }
    }

    /// Frequency of PSD bin `k` at the given sampling rate
    pub fn bin_frequency(&self, k: usize, sample_rate: f64) -> f64 {
        k as f64 * sample_rate / self.fft_size as f64
    }

    /// Power spectrum (one-sided, `fft_size / 2` bins).
    ///
    /// The signal mean is removed first so pulsatility dominates the
    /// spectrum rather than the DC offset; NaN samples contribute zero.
    /// Signals shorter than the FFT size are zero-padded into one frame.
    pub fn compute_psd(&mut self, samples: &[f64]) -> Vec<f64> {
        let half = self.fft_size / 2;
        let mut psd = vec![0.0; half];
        if samples.is_empty() {
            return psd;
        }

        let finite: Vec<f64> = samples.iter().copied().filter(|v| !v.is_nan()).collect();
        if finite.is_empty() {
            return psd;
        }
        let mean = finite.iter().sum::<f64>() / finite.len() as f64;

        let mut buffer = vec![Complex::new(0.0, 0.0); self.fft_size];
        let mut frames = 0usize;
        let hop = half.max(1);
        let mut start = 0;
        loop {
            let frame_len = self.fft_size.min(samples.len() - start);
            for (i, slot) in buffer.iter_mut().enumerate() {
                let value = if i < frame_len {
                    let v = samples[start + i];
                    if v.is_nan() {
                        0.0
                    } else {
                        v - mean
                    }
                } else {
                    0.0
                };
                *slot = Complex::new(value * self.window[i], 0.0);
            }
            self.fft.process_with_scratch(&mut buffer, &mut self.scratch);
            for (k, power) in psd.iter_mut().enumerate() {
                *power += buffer[k].norm_sqr();
            }
            frames += 1;

            start += hop;
            if start + self.fft_size > samples.len() {
                break;
            }
        }

        let norm = frames as f64 * self.fft_size as f64;
        for power in &mut psd {
            *power /= norm;
        }
        psd
    }
}

/// L2 distance between unit-power-normalized spectra of two signals.
///
/// 0.0 for spectrally identical signals; scale differences cancel out.
pub fn psd_distance(a: &[f64], b: &[f64], fft_size: usize) -> f64 {
    let mut estimator = PsdEstimator::new(fft_size);
    let psd_a = normalize(estimator.compute_psd(a));
    let psd_b = normalize(estimator.compute_psd(b));
    psd_a
        .iter()
        .zip(psd_b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

fn normalize(mut psd: Vec<f64>) -> Vec<f64> {
    let total: f64 = psd.iter().sum();
    if total > 0.0 {
        for v in &mut psd {
            *v /= total;
        }
    }
    psd
}

/// Dynamic time warping distance with a Sakoe-Chiba band.
///
/// `band` limits the warping window width (widened to at least the length
/// difference so the corner stays reachable); `None` means unconstrained.
/// Returns the square root of the accumulated squared sample costs.
pub fn dtw_distance(a: &[f64], b: &[f64], band: Option<usize>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return f64::INFINITY;
    }
    let n = a.len();
    let m = b.len();
    let band = band.unwrap_or(n.max(m)).max(n.abs_diff(m)).max(1);

    let mut prev = vec![f64::INFINITY; m + 1];
    let mut curr = vec![f64::INFINITY; m + 1];
    prev[0] = 0.0;

    for i in 1..=n {
        curr.fill(f64::INFINITY);
        let lo = i.saturating_sub(band).max(1);
        let hi = (i + band).min(m);
        for j in lo..=hi {
            let cost = (a[i - 1] - b[j - 1]).powi(2);
            let best = prev[j].min(prev[j - 1]).min(curr[j - 1]);
            curr[j] = cost + best;
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[m].sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, sample_rate: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * freq * i as f64 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_hann_window_edges() {
        let w = hann_window(8);
        assert!(w[0].abs() < 1e-12);
        assert!(w.iter().cloned().fold(f64::MIN, f64::max) <= 1.0);
    }

    #[test]
    fn test_psd_peak_at_signal_frequency() {
        let mut estimator = PsdEstimator::new(256);
        // 10 Hz sine at 100 Hz sampling -> peak near bin 10 * 256 / 100
        let psd = estimator.compute_psd(&sine(10.0, 100.0, 2048));
        let peak_bin = psd
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(k, _)| k)
            .unwrap();
        let peak_freq = estimator.bin_frequency(peak_bin, 100.0);
        assert!((peak_freq - 10.0).abs() < 1.0, "peak at {} Hz", peak_freq);
    }

    #[test]
    fn test_psd_handles_nan_and_short_input() {
        let mut estimator = PsdEstimator::new(256);
        let mut samples = sine(5.0, 100.0, 64);
        samples[10] = f64::NAN;
        let psd = estimator.compute_psd(&samples);
        assert_eq!(psd.len(), 128);
        assert!(psd.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_psd_distance_orders_similarity() {
        let base = sine(10.0, 100.0, 1024);
        let same = sine(10.0, 100.0, 1024);
        let other = sine(20.0, 100.0, 1024);
        let d_same = psd_distance(&base, &same, 256);
        let d_other = psd_distance(&base, &other, 256);
        assert!(d_same < 1e-9);
        assert!(d_other > d_same);
    }

    #[test]
    fn test_dtw_identical_is_zero() {
        let a = sine(1.0, 100.0, 200);
        assert!(dtw_distance(&a, &a, Some(10)) < 1e-12);
    }

    #[test]
    fn test_dtw_tolerates_small_shift() {
        let a = sine(1.0, 100.0, 200);
        let shifted: Vec<f64> = sine(1.0, 100.0, 205)[5..].to_vec();
        let different = sine(3.0, 100.0, 200);
        let d_shift = dtw_distance(&a, &shifted, Some(20));
        let d_diff = dtw_distance(&a, &different, Some(20));
        assert!(d_shift < d_diff);
    }

    #[test]
    fn test_dtw_empty_is_infinite() {
        assert!(dtw_distance(&[], &[1.0], None).is_infinite());
    }

    #[test]
    fn test_dtw_unequal_lengths_reach_corner() {
        let a = sine(1.0, 100.0, 50);
        let b = sine(1.0, 100.0, 120);
        assert!(dtw_distance(&a, &b, Some(1)).is_finite());
    }
}
