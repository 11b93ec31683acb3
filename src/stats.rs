//! # Signal Statistics Module
//!
//! Descriptive statistics for recorded and generated signals, and batch
//! statistics over a corpus directory serialized as pretty JSON.
//!
//! All statistics are computed over non-NaN samples only; a signal with
//! no usable samples yields `null` statistics rather than NaN in the
//! output JSON.

use crate::corpus::{scan_corpus_dir, summarize_signal_names, SignalFile, SignalKind};
use serde::Serialize;
use std::path::Path;

/// Plausibility band for arterial pressure samples, mmHg
pub const ART_THRESHOLD_MMHG: (f64, f64) = (0.0, 250.0);
/// Plausibility band for intracranial pressure samples, mmHg
pub const ICP_THRESHOLD_MMHG: (f64, f64) = (-5.0, 50.0);

pub fn threshold_for(kind: SignalKind) -> (f64, f64) {
    match kind {
        SignalKind::Art => ART_THRESHOLD_MMHG,
        SignalKind::Icp => ICP_THRESHOLD_MMHG,
    }
}

/// Per-signal statistics in the `statistics.json` shape
#[derive(Debug, Clone, Serialize)]
pub struct SignalStats {
    pub file: String,
    pub signal_type: String,
    pub sampling_rate: f64,
    pub length_samples: usize,
    pub duration: String,
    pub nan_percentage: f64,
    pub min_val: Option<f64>,
    pub max_val: Option<f64>,
    pub in_threshold_percentage: Option<f64>,
    pub mean: Option<f64>,
    pub std: Option<f64>,
}

/// Compact statistics for generated model output
#[derive(Debug, Clone, Serialize)]
pub struct ModelStats {
    pub file: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub nan_count: usize,
}

/// Format whole seconds the way a wall clock reads, `H:MM:SS`,
/// with a day prefix past 24 hours.
pub fn format_duration(total_seconds: u64) -> String {
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;
    if days > 0 {
        let plural = if days == 1 { "day" } else { "days" };
        format!("{} {}, {}:{:02}:{:02}", days, plural, hours, minutes, seconds)
    } else {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Compute full statistics for one signal
pub fn compute_stats(
    signal: &[f64],
    signal_type: &str,
    threshold: (f64, f64),
    sampling_rate: f64,
    file_stem: &str,
) -> SignalStats {
    let length_samples = signal.len();
    let duration_seconds = if sampling_rate > 0.0 {
        (length_samples as f64 / sampling_rate) as u64
    } else {
        0
    };

    let nan_count = signal.iter().filter(|v| v.is_nan()).count();
    let nan_percentage = if length_samples > 0 {
        nan_count as f64 / length_samples as f64 * 100.0
    } else {
        0.0
    };

    let clean: Vec<f64> = signal.iter().copied().filter(|v| !v.is_nan()).collect();
    let (min_val, max_val, mean, std, in_threshold_percentage) = if clean.is_empty() {
        (None, None, None, None, None)
    } else {
        let min = clean.iter().cloned().fold(f64::MAX, f64::min);
        let max = clean.iter().cloned().fold(f64::MIN, f64::max);
        let mean = clean.iter().sum::<f64>() / clean.len() as f64;
        let variance =
            clean.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / clean.len() as f64;
        let in_threshold = clean
            .iter()
            .filter(|v| **v >= threshold.0 && **v <= threshold.1)
            .count();
        (
            Some(min),
            Some(max),
            Some(mean),
            Some(variance.sqrt()),
            Some(in_threshold as f64 / clean.len() as f64 * 100.0),
        )
    };

    SignalStats {
        file: file_stem.to_string(),
        signal_type: signal_type.to_uppercase(),
        sampling_rate,
        length_samples,
        duration: format_duration(duration_seconds),
        nan_percentage,
        min_val,
        max_val,
        in_threshold_percentage,
        mean,
        std,
    }
}

/// Compute compact model-output statistics for one signal
pub fn compute_model_stats(signal: &[f64], file_stem: &str) -> ModelStats {
    let nan_count = signal.iter().filter(|v| v.is_nan()).count();
    let clean: Vec<f64> = signal.iter().copied().filter(|v| !v.is_nan()).collect();
    if clean.is_empty() {
        return ModelStats {
            file: file_stem.to_string(),
            min: None,
            max: None,
            mean: None,
            std: None,
            nan_count,
        };
    }
    let mean = clean.iter().sum::<f64>() / clean.len() as f64;
    let variance = clean.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / clean.len() as f64;
    ModelStats {
        file: file_stem.to_string(),
        min: Some(clean.iter().cloned().fold(f64::MAX, f64::min)),
        max: Some(clean.iter().cloned().fold(f64::MIN, f64::max)),
        mean: Some(mean),
        std: Some(variance.sqrt()),
        nan_count,
    }
}

/// Walk a corpus directory and compute statistics for every recording
/// carrying a signal of the given kind. Unreadable files are skipped.
pub fn corpus_statistics(dir: &Path, kind: SignalKind) -> Vec<SignalStats> {
    let mut files = Vec::new();
    for path in scan_corpus_dir(dir) {
        match SignalFile::open(&path) {
            Ok(file) => files.push(file),
            Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
        }
    }

    let summary = summarize_signal_names(&files);
    if !summary.consistent.is_empty() {
        log::info!("Signals present in every recording: {:?}", summary.consistent);
    }
    for (file_stem, extra) in &summary.outliers {
        log::warn!("{} carries extra signals: {:?}", file_stem, extra);
    }

    let mut all = Vec::new();
    for file in &files {
        let info = match file.signal_of_kind(kind) {
            Some(info) => info.clone(),
            None => continue,
        };
        match file.read_all(&info.name) {
            Ok(samples) => {
                log::debug!("Computing statistics for {}", file.file_stem());
                all.push(compute_stats(
                    &samples,
                    kind.dataset_name(),
                    threshold_for(kind),
                    info.index.frequency,
                    &file.file_stem(),
                ));
            }
            Err(e) => log::warn!(
                "Skipping signal '{}' of {}: {}",
                info.name,
                file.file_stem(),
                e
            ),
        }
    }
    all
}

/// Serialize statistics as pretty JSON
pub fn write_stats_json<T: Serialize>(stats: &[T], path: &Path) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, stats)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00:00");
        assert_eq!(format_duration(3661), "1:01:01");
        assert_eq!(format_duration(86_400 + 3_661), "1 day, 1:01:01");
        assert_eq!(format_duration(2 * 86_400), "2 days, 0:00:00");
    }

    #[test]
    fn test_compute_stats_basic() {
        let signal = vec![80.0, 100.0, 120.0, f64::NAN];
        let stats = compute_stats(&signal, "art", ART_THRESHOLD_MMHG, 100.0, "rec");
        assert_eq!(stats.signal_type, "ART");
        assert_eq!(stats.length_samples, 4);
        assert_eq!(stats.nan_percentage, 25.0);
        assert_eq!(stats.min_val, Some(80.0));
        assert_eq!(stats.max_val, Some(120.0));
        assert_eq!(stats.mean, Some(100.0));
        assert_eq!(stats.in_threshold_percentage, Some(100.0));
    }

    #[test]
    fn test_threshold_percentage_counts_outliers() {
        let signal = vec![100.0, 300.0, -10.0, 100.0];
        let stats = compute_stats(&signal, "art", ART_THRESHOLD_MMHG, 100.0, "rec");
        assert_eq!(stats.in_threshold_percentage, Some(50.0));
    }

    #[test]
    fn test_all_nan_signal_yields_null_stats() {
        let signal = vec![f64::NAN, f64::NAN];
        let stats = compute_stats(&signal, "icp", ICP_THRESHOLD_MMHG, 100.0, "rec");
        assert_eq!(stats.nan_percentage, 100.0);
        assert!(stats.min_val.is_none());
        assert!(stats.mean.is_none());
        assert!(stats.in_threshold_percentage.is_none());
    }

    #[test]
    fn test_model_stats() {
        let stats = compute_model_stats(&[1.0, 2.0, 3.0, f64::NAN], "gen");
        assert_eq!(stats.nan_count, 1);
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.max, Some(3.0));
        assert_eq!(stats.mean, Some(2.0));
    }

    #[test]
    fn test_write_stats_json_is_parseable() {
        use tempfile::tempdir;
        let dir = tempdir().unwrap();
        let path = dir.path().join("statistics.json");
        let stats = vec![compute_model_stats(&[1.0, 2.0], "gen")];
        write_stats_json(&stats, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed[0]["file"], "gen");
        assert_eq!(parsed[0]["nan_count"], 1);
    }

    #[test]
    fn test_kind_thresholds() {
        assert_eq!(threshold_for(SignalKind::Art), ART_THRESHOLD_MMHG);
        assert_eq!(threshold_for(SignalKind::Icp), ICP_THRESHOLD_MMHG);
    }

    #[test]
    fn test_corpus_statistics_walks_directory() {
        use tempfile::tempdir;
        let dir = tempdir().unwrap();
        crate::corpus::tests::write_test_recording(
            &dir.path().join("a.hdf5"),
            &[100.0, 110.0],
            0,
        );
        crate::corpus::tests::write_test_recording(
            &dir.path().join("b.hdf5"),
            &[90.0, 95.0, 99.0],
            0,
        );

        let stats = corpus_statistics(dir.path(), SignalKind::Art);
        assert_eq!(stats.len(), 2);
        assert!(stats.iter().any(|s| s.length_samples == 3));

        assert!(corpus_statistics(dir.path(), SignalKind::Icp).is_empty());
    }
}
