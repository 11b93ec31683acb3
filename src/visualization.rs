//! # Visualization Helpers Module
//!
//! Pure data conditioning for the charts: value-axis ranges and waveform
//! decimation. Keeping these out of the chart widgets makes the rules
//! testable without a rendering backend.
//!
//! ## Key Functions
//! - `padded_value_range`: y-axis range with headroom for a chunk
//! - `decimate_min_max`: reduce a long signal to per-bin extremes for the
//!   overview chart without losing peaks

/// Value-axis range for a chunk: the data's min/max padded by 10 %.
///
/// Degenerate inputs get a fixed range: an empty or all-NaN chunk yields
/// (-1, 1), a flat chunk is padded by ±0.5 so the axis never collapses.
pub fn padded_value_range(samples: &[f64]) -> (f64, f64) {
    let mut min = f64::MAX;
    let mut max = f64::MIN;
    for &value in samples {
        if value.is_nan() {
            continue;
        }
        min = min.min(value);
        max = max.max(value);
    }
    if min > max {
        return (-1.0, 1.0);
    }

    let span = max - min;
    let padding = if span > 1e-6 { span * 0.1 } else { 0.5 };
    let (low, mut high) = (min - padding, max + padding);
    if low >= high {
        high = low + 1.0;
    }
    (low, high)
}

/// Reduce a signal to at most `target_bins` (min, max) pairs.
///
/// Each bin contributes its minimum and maximum as two points, so peaks
/// survive decimation. Returns `(time_s, value)` pairs ready for a line
/// series; NaN samples are skipped, fully-NaN bins are dropped.
pub fn decimate_min_max(
    samples: &[f64],
    sample_rate: f64,
    target_bins: usize,
) -> Vec<(f64, f64)> {
    if samples.is_empty() || sample_rate <= 0.0 || target_bins == 0 {
        return Vec::new();
    }

    if samples.len() <= target_bins {
        return samples
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .map(|(i, &v)| (i as f64 / sample_rate, v))
            .collect();
    }

    let bin_size = samples.len().div_ceil(target_bins);
    let mut out = Vec::with_capacity(target_bins * 2);
    for (bin, chunk) in samples.chunks(bin_size).enumerate() {
        let mut min = f64::MAX;
        let mut max = f64::MIN;
        let mut min_offset = 0;
        let mut max_offset = 0;
        for (i, &value) in chunk.iter().enumerate() {
            if value.is_nan() {
                continue;
            }
            if value < min {
                min = value;
                min_offset = i;
            }
            if value > max {
                max = value;
                max_offset = i;
            }
        }
        if min > max {
            continue;
        }

        let base = bin * bin_size;
        let mut pair = [
            (base + min_offset, min),
            (base + max_offset, max),
        ];
        // Keep the series time-ordered within the bin
        pair.sort_by_key(|(index, _)| *index);
        for (index, value) in pair {
            out.push((index as f64 / sample_rate, value));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_range_adds_headroom() {
        let (low, high) = padded_value_range(&[80.0, 120.0]);
        assert!((low - 76.0).abs() < 1e-9);
        assert!((high - 124.0).abs() < 1e-9);
    }

    #[test]
    fn test_padded_range_flat_signal() {
        let (low, high) = padded_value_range(&[50.0, 50.0, 50.0]);
        assert_eq!((low, high), (49.5, 50.5));
    }

    #[test]
    fn test_padded_range_degenerate_inputs() {
        assert_eq!(padded_value_range(&[]), (-1.0, 1.0));
        assert_eq!(padded_value_range(&[f64::NAN]), (-1.0, 1.0));
    }

    #[test]
    fn test_decimation_preserves_extremes() {
        let mut samples = vec![0.0; 10_000];
        samples[1234] = 99.0;
        samples[8765] = -99.0;
        let points = decimate_min_max(&samples, 100.0, 200);

        assert!(points.len() <= 400);
        let max = points.iter().map(|(_, v)| *v).fold(f64::MIN, f64::max);
        let min = points.iter().map(|(_, v)| *v).fold(f64::MAX, f64::min);
        assert_eq!(max, 99.0);
        assert_eq!(min, -99.0);
    }

    #[test]
    fn test_decimation_short_signal_passthrough() {
        let samples = vec![1.0, f64::NAN, 3.0];
        let points = decimate_min_max(&samples, 100.0, 100);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0], (0.0, 1.0));
    }

    #[test]
    fn test_decimation_times_are_monotonic() {
        let samples: Vec<f64> = (0..1000).map(|i| (i as f64 * 0.1).sin()).collect();
        let points = decimate_min_max(&samples, 100.0, 50);
        for pair in points.windows(2) {
            assert!(pair[0].0 <= pair[1].0);
        }
    }
}
