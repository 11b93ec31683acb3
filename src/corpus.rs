//! # Corpus Access Module
//!
//! Reading of arterial/intracranial pressure recordings stored as HDF5.
//! A recording keeps its waveforms in a `waves` group:
//!
//! ```text
//! waves/
//! ├── art              (dataset: f64 samples, -99999 marks missing data)
//! ├── art.index        (dataset: compound {startidx, starttime, length, frequency})
//! ├── art.quality      (dataset: compound {time, value})
//! └── icp, icp.index, icp.quality
//! ```
//!
//! Timestamps in the index are Unix microseconds. A dataset whose index
//! holds several rows describes several recorded stretches; they surface
//! as `art`, `art_0`, `art_1`, ... so each stretch can be addressed
//! individually.
//!
//! Files stay open for the lifetime of a `SignalFile` so chunked playback
//! can pull sample ranges without re-reading the whole recording.

use crate::error::CorpusError;
use chrono::{TimeZone, Utc};
use hdf5::File;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Sample value used by the corpus to mark missing data
pub const MISSING_SAMPLE_SENTINEL: f64 = -99999.0;

/// Corpus timestamps are Unix microseconds
pub const MICROS_PER_SECOND: u64 = 1_000_000;

/// The two physiological channels present in the corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// Arterial blood pressure
    Art,
    /// Intracranial pressure
    Icp,
}

impl SignalKind {
    /// Dataset name for this channel inside the `waves` group
    pub fn dataset_name(&self) -> &'static str {
        match self {
            SignalKind::Art => "art",
            SignalKind::Icp => "icp",
        }
    }

    /// Human-readable channel label
    pub fn display_name(&self) -> &'static str {
        match self {
            SignalKind::Art => "Arterial pressure",
            SignalKind::Icp => "Intracranial pressure",
        }
    }

    /// Get all channel kinds
    pub fn all() -> Vec<SignalKind> {
        vec![SignalKind::Art, SignalKind::Icp]
    }

    /// Parse a dataset name (ignoring any `_N` stretch suffix)
    pub fn from_name(name: &str) -> Option<SignalKind> {
        let base = name.split('_').next().unwrap_or(name);
        match base {
            "art" => Some(SignalKind::Art),
            "icp" => Some(SignalKind::Icp),
            _ => None,
        }
    }
}

/// One row of a signal's `.index` dataset
#[derive(hdf5::H5Type, Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct IndexEntry {
    pub startidx: i64,
    pub starttime: u64,
    pub length: i64,
    pub frequency: f64,
}

/// One row of a signal's `.quality` dataset
#[derive(hdf5::H5Type, Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct QualityEntry {
    pub time: u64,
    pub value: u32,
}

/// Metadata for one addressable signal stretch
#[derive(Debug, Clone)]
pub struct SignalInfo {
    /// Addressable name (`art`, `art_0`, ...)
    pub name: String,
    /// Underlying dataset inside `waves/`
    pub dataset: String,
    pub index: IndexEntry,
}

impl SignalInfo {
    pub fn sample_count(&self) -> usize {
        self.index.length.max(0) as usize
    }

    pub fn duration_seconds(&self) -> f64 {
        self.sample_count() as f64 / self.index.frequency
    }
}

/// An open HDF5 recording
pub struct SignalFile {
    path: PathBuf,
    file: File,
    signals: Vec<SignalInfo>,
}

impl SignalFile {
    /// Open a recording and read the index metadata for every signal.
    ///
    /// Sample data is not loaded here; use `read_all` or `read_samples`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| CorpusError::OpenFailed {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let waves = file
            .group("waves")
            .map_err(|_| CorpusError::MissingWaves(path.clone()))?;

        let member_names = waves.member_names().map_err(|e| CorpusError::Io {
            context: "Failed to list waves group".to_string(),
            reason: e.to_string(),
        })?;

        let mut signals = Vec::new();
        for name in member_names {
            // Index and quality datasets carry a dot; only bare names are waveforms
            if name.contains('.') {
                continue;
            }
            let entries = Self::read_index(&waves, &name)?;
            for (i, index) in entries.into_iter().enumerate() {
                let addressable = if i == 0 {
                    name.clone()
                } else {
                    format!("{}_{}", name, i - 1)
                };
                signals.push(SignalInfo {
                    name: addressable,
                    dataset: name.clone(),
                    index,
                });
            }
        }

        log::info!(
            "Opened recording {} with {} signal(s)",
            path.display(),
            signals.len()
        );

        Ok(Self {
            path,
            file,
            signals,
        })
    }

    /// Read a signal's index rows, falling back to an `index` attribute on
    /// the dataset when the `.index` dataset is absent.
    fn read_index(waves: &hdf5::Group, name: &str) -> Result<Vec<IndexEntry>, CorpusError> {
        if let Ok(dataset) = waves.dataset(&format!("{}.index", name)) {
            return dataset.read_raw::<IndexEntry>().map_err(|e| CorpusError::Io {
                context: format!("Failed to read index for '{}'", name),
                reason: e.to_string(),
            });
        }

        let dataset = waves.dataset(name).map_err(|e| CorpusError::Io {
            context: format!("Failed to open dataset '{}'", name),
            reason: e.to_string(),
        })?;
        if let Ok(attr) = dataset.attr("index") {
            return attr.read_raw::<IndexEntry>().map_err(|e| CorpusError::Io {
                context: format!("Failed to read index attribute for '{}'", name),
                reason: e.to_string(),
            });
        }

        Err(CorpusError::MissingIndex(name.to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base name of the recording without extension
    pub fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn signal_names(&self) -> Vec<String> {
        self.signals.iter().map(|s| s.name.clone()).collect()
    }

    pub fn signals(&self) -> &[SignalInfo] {
        &self.signals
    }

    pub fn signal(&self, name: &str) -> Result<&SignalInfo, CorpusError> {
        let name = name.to_lowercase();
        self.signals
            .iter()
            .find(|s| s.name == name)
            .ok_or(CorpusError::SignalNotFound(name))
    }

    /// First signal of the given kind, if any
    pub fn signal_of_kind(&self, kind: SignalKind) -> Option<&SignalInfo> {
        self.signals
            .iter()
            .find(|s| SignalKind::from_name(&s.dataset) == Some(kind))
    }

    /// Read the full sample data for a signal, sentinel replaced by NaN
    pub fn read_all(&self, name: &str) -> Result<Vec<f64>, CorpusError> {
        let info = self.signal(name)?.clone();
        self.read_samples(&info.name, 0, info.sample_count())
    }

    /// Read samples `start..end` of a signal stretch (indices relative to
    /// the stretch, clamped to its length), sentinel replaced by NaN.
    pub fn read_samples(
        &self,
        name: &str,
        start: usize,
        end: usize,
    ) -> Result<Vec<f64>, CorpusError> {
        let info = self.signal(name)?;
        let len = info.sample_count();
        let start = start.min(len);
        let end = end.clamp(start, len);
        if start == end {
            return Ok(Vec::new());
        }

        let offset = info.index.startidx.max(0) as usize;
        let dataset = self
            .file
            .group("waves")
            .and_then(|waves| waves.dataset(&info.dataset))
            .map_err(|e| CorpusError::Io {
                context: format!("Failed to open dataset '{}'", info.dataset),
                reason: e.to_string(),
            })?;

        let raw = dataset
            .read_slice_1d::<f64, _>(offset + start..offset + end)
            .map_err(|e| CorpusError::Io {
                context: format!("Failed to read samples of '{}'", info.name),
                reason: e.to_string(),
            })?;

        Ok(raw
            .iter()
            .map(|&v| {
                if v == MISSING_SAMPLE_SENTINEL {
                    f64::NAN
                } else {
                    v
                }
            })
            .collect())
    }

    /// Human-readable summary of the recording
    pub fn describe(&self) -> String {
        let mut out = vec![format!("Recording: {}", self.file_stem())];
        for info in &self.signals {
            out.push(format!(
                " Signal '{}': {:.1} Hz, start {}, {:.2}h ({} samples)",
                info.name,
                info.index.frequency,
                format_timestamp(info.index.starttime),
                info.duration_seconds() / 3600.0,
                info.sample_count(),
            ));
            if let Some(first) = self.quality(&info.dataset).first() {
                out.push(format!(
                    "   Quality marker at {}: {}",
                    format_timestamp(first.time),
                    first.value
                ));
            }
        }
        out.join("\n")
    }

    /// Quality rows of a signal's dataset; empty when absent
    fn quality(&self, dataset: &str) -> Vec<QualityEntry> {
        self.file
            .group("waves")
            .and_then(|waves| waves.dataset(&format!("{}.quality", dataset)))
            .and_then(|quality| quality.read_raw::<QualityEntry>())
            .unwrap_or_default()
    }
}

/// Format a Unix-microsecond timestamp as `dd/mm/yyyy HH:MM:SS.fff` (UTC)
pub fn format_timestamp(micros: u64) -> String {
    match Utc.timestamp_micros(micros as i64) {
        chrono::LocalResult::Single(dt) => dt.format("%d/%m/%Y %H:%M:%S%.3f").to_string(),
        _ => format!("{}us", micros),
    }
}

/// Recursively collect `.hdf5` files under a directory, sorted by path
pub fn scan_corpus_dir(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect_hdf5_files(dir, &mut files);
    files.sort();
    files
}

fn collect_hdf5_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Cannot read directory {}: {}", dir.display(), e);
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_hdf5_files(&path, out);
        } else if matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("hdf5") | Some("h5")
        ) {
            out.push(path);
        }
    }
}

/// Signal names shared by all recordings vs. names unique to some of them
#[derive(Debug, Default)]
pub struct CorpusSummary {
    pub consistent: Vec<String>,
    pub outliers: BTreeMap<String, Vec<String>>,
}

pub fn summarize_signal_names(files: &[SignalFile]) -> CorpusSummary {
    let mut summary = CorpusSummary::default();
    if files.is_empty() {
        return summary;
    }

    let mut consistent: Vec<String> = files[0].signal_names();
    for file in &files[1..] {
        let names = file.signal_names();
        consistent.retain(|n| names.contains(n));
    }
    consistent.sort();

    for file in files {
        let extra: Vec<String> = file
            .signal_names()
            .into_iter()
            .filter(|n| !consistent.contains(n))
            .collect();
        if !extra.is_empty() {
            summary.outliers.insert(file.file_stem(), extra);
        }
    }
    summary.consistent = consistent;
    summary
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::tempdir;

    pub(crate) fn write_test_recording(path: &Path, samples: &[f64], starttime: u64) {
        let file = File::create(path).unwrap();
        let waves = file.create_group("waves").unwrap();

        let ds = waves
            .new_dataset::<f64>()
            .shape(samples.len())
            .create("art")
            .unwrap();
        ds.write(samples).unwrap();

        let index = vec![IndexEntry {
            startidx: 0,
            starttime,
            length: samples.len() as i64,
            frequency: 100.0,
        }];
        waves
            .new_dataset::<IndexEntry>()
            .shape(1)
            .create("art.index")
            .unwrap()
            .write(&index)
            .unwrap();

        let quality = vec![QualityEntry {
            time: starttime,
            value: 0,
        }];
        waves
            .new_dataset::<QualityEntry>()
            .shape(1)
            .create("art.quality")
            .unwrap()
            .write(&quality)
            .unwrap();
    }

    #[test]
    fn test_open_lists_signals_without_index_members() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rec.hdf5");
        write_test_recording(&path, &[1.0, 2.0, 3.0, 4.0], 1_000_000);

        let file = SignalFile::open(&path).unwrap();
        assert_eq!(file.signal_names(), vec!["art".to_string()]);
        let info = file.signal("art").unwrap();
        assert_eq!(info.sample_count(), 4);
        assert_eq!(info.index.frequency, 100.0);
    }

    #[test]
    fn test_sentinel_becomes_nan() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rec.hdf5");
        write_test_recording(&path, &[1.0, MISSING_SAMPLE_SENTINEL, 3.0], 0);

        let file = SignalFile::open(&path).unwrap();
        let data = file.read_all("art").unwrap();
        assert_eq!(data.len(), 3);
        assert!(data[1].is_nan());
        assert_eq!(data[2], 3.0);
    }

    #[test]
    fn test_read_samples_is_clamped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rec.hdf5");
        write_test_recording(&path, &[1.0, 2.0, 3.0, 4.0], 0);

        let file = SignalFile::open(&path).unwrap();
        let chunk = file.read_samples("art", 2, 100).unwrap();
        assert_eq!(chunk, vec![3.0, 4.0]);
        assert!(file.read_samples("art", 10, 20).unwrap().is_empty());
    }

    #[test]
    fn test_signal_of_kind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rec.hdf5");
        write_test_recording(&path, &[1.0, 2.0], 0);

        let file = SignalFile::open(&path).unwrap();
        assert!(file.signal_of_kind(SignalKind::Art).is_some());
        assert!(file.signal_of_kind(SignalKind::Icp).is_none());
    }

    #[test]
    fn test_describe_lists_signals_and_quality() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rec.hdf5");
        write_test_recording(&path, &[1.0, 2.0], 1_000_000);

        let file = SignalFile::open(&path).unwrap();
        let description = file.describe();
        assert!(description.contains("Recording: rec"));
        assert!(description.contains("Signal 'art'"));
        assert!(description.contains("Quality marker"));
    }

    #[test]
    fn test_kind_from_name() {
        assert_eq!(SignalKind::from_name("art"), Some(SignalKind::Art));
        assert_eq!(SignalKind::from_name("icp_0"), Some(SignalKind::Icp));
        assert_eq!(SignalKind::from_name("ecg"), None);
    }

    #[test]
    fn test_scan_corpus_dir_recurses() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("dataset_0");
        std::fs::create_dir_all(&sub).unwrap();
        write_test_recording(&sub.join("a.hdf5"), &[1.0], 0);
        write_test_recording(&dir.path().join("b.h5"), &[1.0], 0);
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let files = scan_corpus_dir(dir.path());
        assert_eq!(files.len(), 2);
    }
}
