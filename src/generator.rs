//! # Signal Generation Module
//!
//! Frequency-domain synthesis of arterial and intracranial pressure
//! waveforms. The signal is produced in fixed 1000-sample windows at
//! 100 Hz: each window's spectrum is assembled from the pulse parameters
//! (baseline at DC, a fundamental at the pulse rate with decaying
//! harmonics, a slow respiratory component, per-window amplitude jitter)
//! and converted to the time domain with an inverse FFT; windows are
//! concatenated into one long signal.
//!
//! Anomalies are injected afterwards in the time domain; every injected
//! interval is reported back as a ground-truth annotation range so
//! generated recordings can be evaluated like annotated ones.
//!
//! Generation is deterministic for a given seed.

use crate::corpus::{SignalKind, MICROS_PER_SECOND};
use crate::error::GeneratorError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rustfft::{num_complex::Complex, FftPlanner};

/// Samples per synthesis window
pub const WINDOW_SIZE: usize = 1000;
/// Output sampling rate
pub const SAMPLE_RATE_HZ: f64 = 100.0;

// 0.1 Hz per spectrum bin
const FREQ_RESOLUTION_HZ: f64 = SAMPLE_RATE_HZ / WINDOW_SIZE as f64;

// Harmonic amplitudes relative to the pulse fundamental; the decay gives
// the waveform its systolic upstroke sharpness.
const HARMONIC_WEIGHTS: [f64; 6] = [1.0, 0.55, 0.32, 0.18, 0.09, 0.04];

const RESPIRATORY_RATE_HZ: f64 = 0.25;

// Beat-to-beat amplitude variability between windows
const WINDOW_JITTER_STD: f64 = 0.03;

/// Kinds of deliberate deviation that can be injected into a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnomalyKind {
    /// Pulsatility vanishes, the signal holds its local mean
    Flatline,
    /// Short transient excursion (measurement artifact)
    Spike,
    /// The baseline ramps away and back (drift artifact)
    BaselineDrift,
    /// Pulse amplitude shrinks while the mean holds (damping)
    AmplitudeDamping,
}

impl AnomalyKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            AnomalyKind::Flatline => "Flatline",
            AnomalyKind::Spike => "Spike artifact",
            AnomalyKind::BaselineDrift => "Baseline drift",
            AnomalyKind::AmplitudeDamping => "Amplitude damping",
        }
    }

    pub fn all() -> Vec<AnomalyKind> {
        vec![
            AnomalyKind::Flatline,
            AnomalyKind::Spike,
            AnomalyKind::BaselineDrift,
            AnomalyKind::AmplitudeDamping,
        ]
    }

    /// Default injection magnitude, in the unit the kind operates in
    pub fn default_magnitude(&self) -> f64 {
        match self {
            AnomalyKind::Flatline => 0.0,
            AnomalyKind::Spike => 60.0,
            AnomalyKind::BaselineDrift => 25.0,
            AnomalyKind::AmplitudeDamping => 0.8,
        }
    }
}

/// One anomaly to inject, positioned in seconds from the signal start
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalySpec {
    pub kind: AnomalyKind,
    pub start_s: f64,
    pub duration_s: f64,
    pub magnitude: f64,
}

/// Parameters for one synthesis run
#[derive(Debug, Clone)]
pub struct GeneratorParams {
    pub kind: SignalKind,
    pub pulse_rate_bpm: f64,
    /// Peak-to-trough pulsatility in mmHg
    pub pulse_pressure: f64,
    /// Mean pressure in mmHg
    pub baseline: f64,
    /// Number of 10-second windows to produce
    pub windows: usize,
    pub noise_std: f64,
    pub anomalies: Vec<AnomalySpec>,
    pub seed: u64,
}

impl GeneratorParams {
    /// Physiologically plausible defaults for a channel
    pub fn for_kind(kind: SignalKind) -> Self {
        match kind {
            SignalKind::Art => Self {
                kind,
                pulse_rate_bpm: 72.0,
                pulse_pressure: 40.0,
                baseline: 90.0,
                windows: 36,
                noise_std: 0.8,
                anomalies: Vec::new(),
                seed: 0,
            },
            SignalKind::Icp => Self {
                kind,
                pulse_rate_bpm: 72.0,
                pulse_pressure: 6.0,
                baseline: 12.0,
                windows: 36,
                noise_std: 0.4,
                anomalies: Vec::new(),
                seed: 0,
            },
        }
    }

    pub fn sample_count(&self) -> usize {
        self.windows * WINDOW_SIZE
    }

    pub fn duration_seconds(&self) -> f64 {
        self.sample_count() as f64 / SAMPLE_RATE_HZ
    }

    pub fn validate(&self) -> Result<(), GeneratorError> {
        if !(20.0..=250.0).contains(&self.pulse_rate_bpm) {
            return Err(GeneratorError::InvalidPulseRate(self.pulse_rate_bpm));
        }
        if self.pulse_pressure <= 0.0 {
            return Err(GeneratorError::InvalidPulsePressure(self.pulse_pressure));
        }
        if self.windows == 0 {
            return Err(GeneratorError::EmptyDuration);
        }
        let duration = self.duration_seconds();
        for anomaly in &self.anomalies {
            if anomaly.start_s < 0.0
                || anomaly.duration_s <= 0.0
                || anomaly.start_s + anomaly.duration_s > duration
            {
                return Err(GeneratorError::AnomalyOutOfRange {
                    start_s: anomaly.start_s,
                    duration_s: anomaly.duration_s,
                });
            }
        }
        Ok(())
    }
}

/// A synthesized signal plus its ground-truth anomaly intervals
#[derive(Debug, Clone)]
pub struct GeneratedSignal {
    pub kind: SignalKind,
    /// Unix microseconds of the first sample
    pub start_time: u64,
    pub sample_rate: f64,
    pub samples: Vec<f64>,
    /// Injected intervals as absolute `(start_µs, end_µs)`
    pub anomalies: Vec<(u64, u64)>,
}

impl GeneratedSignal {
    pub fn name(&self) -> &'static str {
        self.kind.dataset_name()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }
}

/// Place a Hermitian bin pair carrying `amplitude · cos(2πft + phase)`.
///
/// The inverse transform is left unnormalized, so each half-bin carries
/// amplitude/2 and no 1/N pass is needed afterwards.
fn set_harmonic(spectrum: &mut [Complex<f64>], bin: usize, amplitude: f64, phase: f64) {
    let n = spectrum.len();
    if bin == 0 || bin >= n / 2 {
        return;
    }
    let half = Complex::from_polar(amplitude / 2.0, phase);
    spectrum[bin] += half;
    spectrum[n - bin] += half.conj();
}

/// Synthesize a signal starting at `start_time` (Unix microseconds)
pub fn generate(
    params: &GeneratorParams,
    start_time: u64,
) -> Result<GeneratedSignal, GeneratorError> {
    params.validate()?;

    let mut rng = StdRng::seed_from_u64(params.seed);
    // Standard deviations are compile-time or clamped positive values
    let jitter = Normal::new(0.0, WINDOW_JITTER_STD).unwrap();
    let noise = Normal::new(0.0, params.noise_std.max(1e-12)).unwrap();
    let phase_dist = Normal::new(0.0, 0.4).unwrap();

    let mut planner = FftPlanner::new();
    let ifft = planner.plan_fft_inverse(WINDOW_SIZE);
    let mut scratch = vec![Complex::new(0.0, 0.0); ifft.get_inplace_scratch_len()];

    // The fundamental snaps to the bin grid so concatenated windows stay
    // phase-continuous at their boundaries.
    let f0 = params.pulse_rate_bpm / 60.0;
    let fundamental_bin = (f0 / FREQ_RESOLUTION_HZ).round().max(1.0) as usize;
    let respiratory_bin = (RESPIRATORY_RATE_HZ / FREQ_RESOLUTION_HZ).round().max(1.0) as usize;

    // Phases are drawn once per run; windows vary only in amplitude
    let phases: Vec<f64> = HARMONIC_WEIGHTS
        .iter()
        .enumerate()
        .map(|(h, _)| h as f64 * 0.9 + phase_dist.sample(&mut rng))
        .collect();
    let respiratory_phase = phase_dist.sample(&mut rng);

    let mut samples = Vec::with_capacity(params.sample_count());
    for _ in 0..params.windows {
        let window_gain = 1.0 + jitter.sample(&mut rng);
        let mut spectrum = vec![Complex::new(0.0, 0.0); WINDOW_SIZE];
        spectrum[0] = Complex::new(params.baseline, 0.0);

        for (h, weight) in HARMONIC_WEIGHTS.iter().enumerate() {
            let bin = fundamental_bin * (h + 1);
            let amplitude = params.pulse_pressure / 2.0 * weight * window_gain;
            set_harmonic(&mut spectrum, bin, amplitude, phases[h]);
        }
        set_harmonic(
            &mut spectrum,
            respiratory_bin,
            params.pulse_pressure * 0.05,
            respiratory_phase,
        );

        ifft.process_with_scratch(&mut spectrum, &mut scratch);
        samples.extend(spectrum.iter().map(|c| c.re));
    }

    if params.noise_std > 0.0 {
        for sample in samples.iter_mut() {
            *sample += noise.sample(&mut rng);
        }
    }

    let mut anomalies = Vec::with_capacity(params.anomalies.len());
    for spec in &params.anomalies {
        let (rel_start, rel_end) = inject_anomaly(&mut samples, SAMPLE_RATE_HZ, spec);
        anomalies.push((
            start_time + rel_start,
            start_time + rel_end,
        ));
    }

    Ok(GeneratedSignal {
        kind: params.kind,
        start_time,
        sample_rate: SAMPLE_RATE_HZ,
        samples,
        anomalies,
    })
}

/// Apply one anomaly in place; returns the affected `(start, end)` offsets
/// in microseconds relative to the signal start.
fn inject_anomaly(samples: &mut [f64], sample_rate: f64, spec: &AnomalySpec) -> (u64, u64) {
    let start = ((spec.start_s * sample_rate) as usize).min(samples.len());
    let end = (((spec.start_s + spec.duration_s) * sample_rate) as usize)
        .clamp(start, samples.len());
    let span = end - start;
    if span == 0 {
        return (0, 0);
    }

    let local_mean = samples[start..end].iter().sum::<f64>() / span as f64;

    match spec.kind {
        AnomalyKind::Flatline => {
            for sample in &mut samples[start..end] {
                *sample = local_mean;
            }
        }
        AnomalyKind::Spike => {
            // Triangular transient peaking at magnitude in the middle
            let mid = span as f64 / 2.0;
            for (i, sample) in samples[start..end].iter_mut().enumerate() {
                let distance = (i as f64 - mid).abs() / mid.max(1.0);
                *sample += spec.magnitude * (1.0 - distance);
            }
        }
        AnomalyKind::BaselineDrift => {
            // Slow linear drift up to magnitude, snapping back at the end
            for (i, sample) in samples[start..end].iter_mut().enumerate() {
                *sample += spec.magnitude * (i as f64 / span as f64);
            }
        }
        AnomalyKind::AmplitudeDamping => {
            let damping = spec.magnitude.clamp(0.0, 1.0);
            for sample in &mut samples[start..end] {
                *sample = local_mean + (*sample - local_mean) * (1.0 - damping);
            }
        }
    }

    let micros_per_sample = MICROS_PER_SECOND as f64 / sample_rate;
    (
        (start as f64 * micros_per_sample) as u64,
        (end as f64 * micros_per_sample) as u64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_params() -> GeneratorParams {
        GeneratorParams {
            windows: 3,
            seed: 42,
            ..GeneratorParams::for_kind(SignalKind::Art)
        }
    }

    #[test]
    fn test_generated_length_and_rate() {
        let signal = generate(&small_params(), 0).unwrap();
        assert_eq!(signal.samples.len(), 3 * WINDOW_SIZE);
        assert_eq!(signal.sample_rate, SAMPLE_RATE_HZ);
        assert_eq!(signal.name(), "art");
        assert!((signal.duration_seconds() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let a = generate(&small_params(), 0).unwrap();
        let b = generate(&small_params(), 0).unwrap();
        assert_eq!(a.samples, b.samples);

        let mut other = small_params();
        other.seed = 43;
        let c = generate(&other, 0).unwrap();
        assert_ne!(a.samples, c.samples);
    }

    #[test]
    fn test_mean_tracks_baseline() {
        let params = small_params();
        let signal = generate(&params, 0).unwrap();
        let mean = signal.samples.iter().sum::<f64>() / signal.samples.len() as f64;
        assert!((mean - params.baseline).abs() < 2.0, "mean was {}", mean);
    }

    #[test]
    fn test_pulsatility_in_plausible_band() {
        let params = small_params();
        let signal = generate(&params, 0).unwrap();
        let max = signal.samples.iter().cloned().fold(f64::MIN, f64::max);
        let min = signal.samples.iter().cloned().fold(f64::MAX, f64::min);
        let peak_to_trough = max - min;
        assert!(peak_to_trough > params.pulse_pressure * 0.4);
        assert!(peak_to_trough < params.pulse_pressure * 3.0);
    }

    #[test]
    fn test_validation() {
        let mut params = small_params();
        params.pulse_rate_bpm = 500.0;
        assert!(matches!(
            params.validate(),
            Err(GeneratorError::InvalidPulseRate(_))
        ));

        let mut params = small_params();
        params.windows = 0;
        assert_eq!(params.validate(), Err(GeneratorError::EmptyDuration));

        let mut params = small_params();
        params.anomalies.push(AnomalySpec {
            kind: AnomalyKind::Spike,
            start_s: 100.0,
            duration_s: 10.0,
            magnitude: 10.0,
        });
        assert!(matches!(
            params.validate(),
            Err(GeneratorError::AnomalyOutOfRange { .. })
        ));
    }

    #[test]
    fn test_flatline_removes_pulsatility() {
        let mut params = small_params();
        params.anomalies.push(AnomalySpec {
            kind: AnomalyKind::Flatline,
            start_s: 10.0,
            duration_s: 10.0,
            magnitude: 0.0,
        });
        let signal = generate(&params, 0).unwrap();

        let std_of = |range: std::ops::Range<usize>| {
            let slice = &signal.samples[range];
            let mean = slice.iter().sum::<f64>() / slice.len() as f64;
            (slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / slice.len() as f64).sqrt()
        };
        let flat_std = std_of(1000..2000);
        let live_std = std_of(0..1000);
        assert!(flat_std < live_std * 0.2, "{} vs {}", flat_std, live_std);
    }

    #[test]
    fn test_spike_raises_local_max() {
        let clean = generate(&small_params(), 0).unwrap();
        let mut params = small_params();
        params.anomalies.push(AnomalySpec {
            kind: AnomalyKind::Spike,
            start_s: 12.0,
            duration_s: 2.0,
            magnitude: 80.0,
        });
        let spiked = generate(&params, 0).unwrap();

        let max_in = |signal: &GeneratedSignal| {
            signal.samples[1200..1400]
                .iter()
                .cloned()
                .fold(f64::MIN, f64::max)
        };
        assert!(max_in(&spiked) > max_in(&clean) + 40.0);
    }

    #[test]
    fn test_anomaly_intervals_are_absolute() {
        let mut params = small_params();
        params.anomalies.push(AnomalySpec {
            kind: AnomalyKind::Flatline,
            start_s: 5.0,
            duration_s: 5.0,
            magnitude: 0.0,
        });
        let start_time = 1_700_000_000_000_000;
        let signal = generate(&params, start_time).unwrap();
        assert_eq!(signal.anomalies.len(), 1);
        assert_eq!(signal.anomalies[0].0, start_time + 5_000_000);
        assert_eq!(signal.anomalies[0].1, start_time + 10_000_000);
    }

    #[test]
    fn test_icp_profile_is_lower() {
        let art = GeneratorParams::for_kind(SignalKind::Art);
        let icp = GeneratorParams::for_kind(SignalKind::Icp);
        assert!(icp.baseline < art.baseline);
        assert!(icp.pulse_pressure < art.pulse_pressure);
    }
}
