//! # Annotation Module
//!
//! ARTF annotation files and the segmentation they drive.
//!
//! An ARTF file is XML produced by the annotation tool: an `Info` element
//! naming the annotator and the HDF5 file it belongs to, a `Global` group
//! of artefact intervals applying to every signal, and per-signal
//! `SignalGroup` elements. Timestamps use `dd/mm/yyyy HH:MM:SS.fff` UTC.
//!
//! Signals are cut into fixed 10-second segments. A segment is anomalous
//! for an annotator when any of that annotator's artefact intervals
//! overlaps it. Segments from several annotators merge by their time
//! range, producing a consensus weight (fraction of annotators that
//! flagged the segment).

use crate::corpus::MICROS_PER_SECOND;
use crate::error::AnnotationError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Fixed segmentation granularity
pub const SEGMENT_SECONDS: u64 = 10;

const SEGMENT_MICROS: u64 = SEGMENT_SECONDS * MICROS_PER_SECOND;

/// Convert an ARTF timestamp to Unix microseconds
pub fn unix_from_dt(dt: &str) -> Result<u64, AnnotationError> {
    let naive = chrono::NaiveDateTime::parse_from_str(dt, "%d/%m/%Y %H:%M:%S%.f")
        .map_err(|_| AnnotationError::InvalidTimestamp(dt.to_string()))?;
    let micros = naive.and_utc().timestamp_micros();
    if micros < 0 {
        return Err(AnnotationError::InvalidTimestamp(dt.to_string()));
    }
    Ok(micros as u64)
}

// ---------------------------------------------------------------------------
// ARTF document model
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ArtfDocument {
    #[serde(rename = "Info")]
    pub info: ArtfInfo,
    #[serde(rename = "Global", default)]
    pub global: Option<ArtefactGroup>,
    #[serde(rename = "SignalGroup", default)]
    pub signal_groups: Vec<SignalGroup>,
}

#[derive(Debug, Deserialize)]
pub struct ArtfInfo {
    #[serde(rename = "@UserID")]
    pub user_id: String,
    #[serde(rename = "@HDF5Filename")]
    pub hdf5_filename: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ArtefactGroup {
    #[serde(rename = "Artefact", default)]
    pub artefacts: Vec<Artefact>,
}

#[derive(Debug, Deserialize)]
pub struct SignalGroup {
    #[serde(rename = "@Name")]
    pub name: String,
    #[serde(rename = "Artefact", default)]
    pub artefacts: Vec<Artefact>,
}

#[derive(Debug, Deserialize)]
pub struct Artefact {
    #[serde(rename = "@StartTime")]
    pub start_time: String,
    #[serde(rename = "@EndTime")]
    pub end_time: String,
}

/// Parse an ARTF file from disk
pub fn parse_artf(path: &Path) -> Result<ArtfDocument, AnnotationError> {
    let bytes = std::fs::read(path).map_err(AnnotationError::ReadFailed)?;
    // Annotation tools emit various single-byte encodings; lossy decoding
    // keeps the ASCII structure and timestamps intact either way.
    let text = String::from_utf8_lossy(&bytes);
    quick_xml::de::from_str(&text).map_err(AnnotationError::ParseFailed)
}

/// Global artefact intervals plus those of the matching signal group, in µs
pub fn artefact_intervals(
    doc: &ArtfDocument,
    signal_name: &str,
) -> Result<Vec<(u64, u64)>, AnnotationError> {
    let mut intervals = Vec::new();
    if let Some(global) = &doc.global {
        for artefact in &global.artefacts {
            intervals.push((
                unix_from_dt(&artefact.start_time)?,
                unix_from_dt(&artefact.end_time)?,
            ));
        }
    }
    let base = signal_name.split('_').next().unwrap_or(signal_name);
    for group in &doc.signal_groups {
        if group.name.eq_ignore_ascii_case(base) {
            for artefact in &group.artefacts {
                intervals.push((
                    unix_from_dt(&artefact.start_time)?,
                    unix_from_dt(&artefact.end_time)?,
                ));
            }
        }
    }
    Ok(intervals)
}

/// Reject an ARTF document that belongs to a different HDF5 file
pub fn verify_association(
    doc: &ArtfDocument,
    hdf5_file_name: &str,
) -> Result<(), AnnotationError> {
    let associated = Path::new(&doc.info.hdf5_filename)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    if associated == hdf5_file_name {
        Ok(())
    } else {
        Err(AnnotationError::FileMismatch {
            expected: hdf5_file_name.to_string(),
            found: associated,
        })
    }
}

/// Find ARTF files under `dir`, recursively.
///
/// Paths with `__`-prefixed components are skipped (working copies).
pub fn find_artf_files(dir: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    collect_artf_files(dir, &mut out);
    out.retain(|path| {
        !path
            .components()
            .any(|c| c.as_os_str().to_string_lossy().starts_with("__"))
    });
    out.sort();
    out
}

fn collect_artf_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_artf_files(&path, out);
        } else if path.extension().and_then(|e| e.to_str()) == Some("artf") {
            out.push(path);
        }
    }
}

// ---------------------------------------------------------------------------
// Segments
// ---------------------------------------------------------------------------

/// A 10-second stretch of a signal, possibly flagged as anomalous
#[derive(Debug, Clone)]
pub struct Segment {
    pub signal_name: String,
    pub anomalous: bool,
    /// Unix microseconds
    pub start_timestamp: u64,
    /// Unix microseconds
    pub end_timestamp: u64,
    pub data_file: String,
    pub patient_id: String,
    pub annotators: Vec<String>,
    pub frequency: f64,
    /// Sample values; empty until loaded from the recording
    pub data: Vec<f64>,
    /// Fraction of annotators marking this segment anomalous (0.0-1.0)
    pub weight: f64,
    /// Annotators who flagged this segment
    pub anomaly_annotations: Vec<String>,
}

impl Segment {
    /// Identity of a segment within one recording
    pub fn key(&self) -> (u64, u64) {
        (self.start_timestamp, self.end_timestamp)
    }

    /// Readable id used in export file names
    pub fn id(&self) -> String {
        format!("{}_{}", self.start_timestamp, self.end_timestamp)
    }

    pub fn duration_seconds(&self) -> f64 {
        (self.end_timestamp - self.start_timestamp) as f64 / MICROS_PER_SECOND as f64
    }

    /// Multi-line summary of the segment and its data, if loaded
    pub fn describe(&self) -> String {
        let mut lines = vec![
            format!("Signal: {}", self.signal_name),
            format!("Patient: {}", self.patient_id),
            format!("File: {}", self.data_file),
            format!("Annotators: {}", self.annotators.join(", ")),
            format!("Frequency: {} Hz", self.frequency),
            format!(
                "Range: {} - {} ({:.0}s)",
                crate::corpus::format_timestamp(self.start_timestamp),
                crate::corpus::format_timestamp(self.end_timestamp),
                self.duration_seconds()
            ),
            format!(
                "Anomalous: {} (weight {}, flagged by: {})",
                self.anomalous,
                self.weight,
                self.anomaly_annotations.join(", ")
            ),
        ];
        if !self.data.is_empty() {
            let clean: Vec<f64> = self.data.iter().copied().filter(|v| !v.is_nan()).collect();
            if !clean.is_empty() {
                let mean = clean.iter().sum::<f64>() / clean.len() as f64;
                lines.push(format!(
                    "Data: {} samples, mean {:.2}, {} NaN",
                    self.data.len(),
                    mean,
                    self.data.len() - clean.len()
                ));
            }
        }
        lines.join("\n")
    }
}

/// One annotator's split of a signal into good and anomalous segments
#[derive(Debug, Clone)]
pub struct Annotation {
    pub good_segments: Vec<Segment>,
    pub anomalies: Vec<Segment>,
    pub annotator: String,
}

/// Parse the patient id (`_NNN` in the file name), `Unknown` if absent
pub fn patient_id_from_path(path: &str) -> String {
    let bytes = path.as_bytes();
    let mut i = 0;
    while i + 3 < bytes.len() {
        if bytes[i] == b'_'
            && bytes[i + 1].is_ascii_digit()
            && bytes[i + 2].is_ascii_digit()
            && bytes[i + 3].is_ascii_digit()
        {
            return path[i + 1..i + 4].to_string();
        }
        i += 1;
    }
    "Unknown".to_string()
}

/// All annotations collected for one signal of one recording
#[derive(Debug, Clone)]
pub struct SignalAnnotations {
    signal_name: String,
    data_file: String,
    patient_id: String,
    starttime: u64,
    frequency: f64,
    sample_count: usize,
    annotations: Vec<Annotation>,
}

impl SignalAnnotations {
    pub fn new(
        signal_name: &str,
        data_file: &str,
        starttime: u64,
        frequency: f64,
        sample_count: usize,
    ) -> Self {
        Self {
            signal_name: signal_name.to_string(),
            data_file: data_file.to_string(),
            patient_id: patient_id_from_path(data_file),
            starttime,
            frequency,
            sample_count,
            annotations: Vec::new(),
        }
    }

    /// First sample's timestamp in Unix microseconds
    pub fn starttime(&self) -> u64 {
        self.starttime
    }

    pub fn annotated(&self) -> bool {
        !self.annotations.is_empty()
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    fn signal_end_time(&self) -> u64 {
        self.starttime + (self.sample_count as f64 / self.frequency * 1e6) as u64
    }

    /// Unique annotator name: repeated annotators get an `_N` suffix
    fn unique_annotator(&self, base: &str) -> String {
        let mut name = base.to_string();
        let mut index = 0;
        while self.annotations.iter().any(|a| a.annotator == name) {
            name = format!("{}_{}", base, index);
            index += 1;
        }
        name
    }

    /// Add one annotator's artefact intervals, segmenting the signal.
    ///
    /// Intervals outside the signal's time range are ignored. A segment is
    /// anomalous when any valid interval overlaps it.
    pub fn add_annotation(&mut self, intervals: &[(u64, u64)], annotator: Option<&str>) {
        let segment_samples = (self.frequency * SEGMENT_SECONDS as f64) as usize;
        if segment_samples == 0 {
            return;
        }
        let num_segments = self.sample_count / segment_samples;
        let annotator = self.unique_annotator(annotator.unwrap_or("Unknown"));

        let signal_end = self.signal_end_time();
        let valid: Vec<(u64, u64)> = intervals
            .iter()
            .copied()
            .filter(|(start, end)| *start >= self.starttime && *end <= signal_end)
            .collect();

        let mut good_segments = Vec::new();
        let mut anomalies = Vec::new();

        for i in 0..num_segments {
            let seg_start = self.starttime + i as u64 * SEGMENT_MICROS;
            let seg_end = seg_start + SEGMENT_MICROS;
            let anomalous = valid
                .iter()
                .any(|(a_start, a_end)| *a_start < seg_end && *a_end > seg_start);

            let segment = Segment {
                signal_name: self.signal_name.clone(),
                anomalous,
                start_timestamp: seg_start,
                end_timestamp: seg_end,
                data_file: self.data_file.clone(),
                patient_id: self.patient_id.clone(),
                annotators: vec![annotator.clone()],
                frequency: self.frequency,
                data: Vec::new(),
                weight: 0.0,
                anomaly_annotations: Vec::new(),
            };

            if anomalous {
                anomalies.push(segment);
            } else {
                good_segments.push(segment);
            }
        }

        self.annotations.push(Annotation {
            good_segments,
            anomalies,
            annotator,
        });
    }

    /// Merge all annotators' segments, computing consensus weights.
    ///
    /// Returns `(good, anomalous)`; a segment is anomalous when at least
    /// one annotator flagged it, its weight is the flagging fraction.
    pub fn extract(&self) -> Result<(Vec<Segment>, Vec<Segment>), AnnotationError> {
        if self.annotations.is_empty() {
            return Err(AnnotationError::NotAnnotated(self.signal_name.clone()));
        }

        let mut merged: BTreeMap<(u64, u64), Segment> = BTreeMap::new();
        for annotation in &self.annotations {
            for segment in annotation
                .good_segments
                .iter()
                .chain(annotation.anomalies.iter())
            {
                merged
                    .entry(segment.key())
                    .and_modify(|existing| {
                        existing.annotators.extend(segment.annotators.clone())
                    })
                    .or_insert_with(|| segment.clone());
            }
        }

        for segment in merged.values_mut() {
            let total = segment.annotators.len();
            let mut anomalous_count = 0;
            segment.anomaly_annotations.clear();
            for annotation in &self.annotations {
                if annotation.anomalies.iter().any(|s| s.key() == segment.key()) {
                    anomalous_count += 1;
                    segment.anomaly_annotations.push(annotation.annotator.clone());
                }
            }
            if total > 0 {
                segment.weight = (anomalous_count as f64 / total as f64 * 100.0).round() / 100.0;
                segment.anomalous = anomalous_count > 0;
            }
            if !segment.anomalous {
                segment.weight = 0.0;
            }
        }

        let (anomalous, good): (Vec<Segment>, Vec<Segment>) =
            merged.into_values().partition(|s| s.anomalous);
        Ok((good, anomalous))
    }

    /// Jaccard agreement between each pair of annotators.
    ///
    /// Diagonal is 1.0; with `include_good` both segment classes count,
    /// otherwise only anomalies.
    pub fn consensus_matrix(&self, include_good: bool) -> (Vec<String>, Vec<Vec<f64>>) {
        let mut annotators: Vec<String> = self
            .annotations
            .iter()
            .map(|a| a.annotator.clone())
            .collect();
        annotators.sort();

        let segment_keys = |annotator: &str, anomalies_only: bool| -> Vec<(u64, u64)> {
            self.annotations
                .iter()
                .filter(|a| a.annotator == annotator)
                .flat_map(|a| {
                    let anomaly_keys = a.anomalies.iter().map(Segment::key);
                    if anomalies_only {
                        anomaly_keys.collect::<Vec<_>>()
                    } else {
                        anomaly_keys
                            .chain(a.good_segments.iter().map(Segment::key))
                            .collect()
                    }
                })
                .collect()
        };

        let mut matrix = vec![vec![0.0; annotators.len()]; annotators.len()];
        for (i, annotator_i) in annotators.iter().enumerate() {
            for (j, annotator_j) in annotators.iter().enumerate() {
                if i == j {
                    matrix[i][j] = 1.0;
                    continue;
                }
                let anomalies_i = segment_keys(annotator_i, true);
                let anomalies_j = segment_keys(annotator_j, true);
                let mut intersection = anomalies_i
                    .iter()
                    .filter(|k| anomalies_j.contains(k))
                    .count();
                let mut total_i = anomalies_i.len();
                let mut total_j = anomalies_j.len();

                if include_good {
                    let good_i: Vec<_> = segment_keys(annotator_i, false);
                    let good_j: Vec<_> = segment_keys(annotator_j, false);
                    // Full sets already include anomalies; recompute over them
                    intersection = good_i.iter().filter(|k| good_j.contains(k)).count();
                    total_i = good_i.len();
                    total_j = good_j.len();
                }

                let union = total_i + total_j - intersection;
                matrix[i][j] = if union == 0 {
                    1.0
                } else {
                    intersection as f64 / union as f64
                };
            }
        }
        (annotators, matrix)
    }

    /// Number of segments each annotator flagged as anomalous
    pub fn annotated_anomalies(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for annotation in &self.annotations {
            *counts.entry(annotation.annotator.clone()).or_insert(0) +=
                annotation.anomalies.len();
        }
        counts
    }
}

/// Write segments to CSV, one file per segment.
///
/// File names follow `<signal>_<weight>_<start>_<end>.csv`; rows are
/// `timestamp_µs,value` with timestamps spread evenly over the segment.
pub fn export_segments_csv(
    segments: &[Segment],
    folder: &Path,
) -> std::io::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(folder)?;
    let mut written = Vec::new();
    for segment in segments {
        if segment.data.is_empty() {
            log::warn!(
                "Segment {} of '{}' has no loaded data, skipping export",
                segment.id(),
                segment.signal_name
            );
            continue;
        }
        let path = folder.join(format!(
            "{}_{}_{}.csv",
            segment.signal_name,
            segment.weight,
            segment.id()
        ));
        let mut file = std::fs::File::create(&path)?;
        let span = (segment.end_timestamp - segment.start_timestamp) as f64;
        let denom = (segment.data.len() - 1).max(1) as f64;
        for (i, value) in segment.data.iter().enumerate() {
            let timestamp = segment.start_timestamp as f64 + span * i as f64 / denom;
            writeln!(file, "{},{}", timestamp as u64, value)?;
        }
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTF_SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ICMRecordingArtefacts>
  <Info UserID="alice" HDF5Filename="TBI_001_v2.hdf5"/>
  <Global>
    <Artefact StartTime="01/01/2024 00:00:10.000" EndTime="01/01/2024 00:00:25.000"/>
  </Global>
  <SignalGroup Name="art">
    <Artefact StartTime="01/01/2024 00:01:00.000" EndTime="01/01/2024 00:01:05.000"/>
  </SignalGroup>
</ICMRecordingArtefacts>"#;

    fn base_micros() -> u64 {
        unix_from_dt("01/01/2024 00:00:00.000").unwrap()
    }

    #[test]
    fn test_unix_from_dt() {
        let micros = unix_from_dt("01/01/2024 00:00:01.500").unwrap();
        assert_eq!(micros - base_micros(), 1_500_000);
        assert!(unix_from_dt("not a date").is_err());
    }

    #[test]
    fn test_parse_artf_document() {
        let doc: ArtfDocument = quick_xml::de::from_str(ARTF_SAMPLE).unwrap();
        assert_eq!(doc.info.user_id, "alice");
        assert_eq!(doc.info.hdf5_filename, "TBI_001_v2.hdf5");
        assert_eq!(doc.global.as_ref().unwrap().artefacts.len(), 1);
        assert_eq!(doc.signal_groups.len(), 1);
        assert_eq!(doc.signal_groups[0].name, "art");
    }

    #[test]
    fn test_artefact_intervals_merges_global_and_signal() {
        let doc: ArtfDocument = quick_xml::de::from_str(ARTF_SAMPLE).unwrap();
        let art = artefact_intervals(&doc, "art").unwrap();
        assert_eq!(art.len(), 2);
        // Stretch-suffixed names resolve to their base signal group
        let art0 = artefact_intervals(&doc, "art_0").unwrap();
        assert_eq!(art0.len(), 2);
        let icp = artefact_intervals(&doc, "icp").unwrap();
        assert_eq!(icp.len(), 1);
    }

    #[test]
    fn test_verify_association() {
        let doc: ArtfDocument = quick_xml::de::from_str(ARTF_SAMPLE).unwrap();
        assert!(verify_association(&doc, "TBI_001_v2.hdf5").is_ok());
        assert!(matches!(
            verify_association(&doc, "TBI_999.hdf5"),
            Err(AnnotationError::FileMismatch { .. })
        ));
    }

    #[test]
    fn test_find_artf_files_skips_working_copies() {
        use tempfile::tempdir;
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.artf"), ARTF_SAMPLE).unwrap();
        let hidden = dir.path().join("__backup");
        std::fs::create_dir_all(&hidden).unwrap();
        std::fs::write(hidden.join("b.artf"), ARTF_SAMPLE).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let found = find_artf_files(dir.path());
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("a.artf"));
    }

    #[test]
    fn test_segment_describe_mentions_data() {
        let segment = Segment {
            signal_name: "art".to_string(),
            anomalous: true,
            start_timestamp: 0,
            end_timestamp: 10_000_000,
            data_file: "TBI_001_v2.hdf5".to_string(),
            patient_id: "001".to_string(),
            annotators: vec!["alice".to_string()],
            frequency: 100.0,
            data: vec![1.0, 3.0, f64::NAN],
            weight: 1.0,
            anomaly_annotations: vec!["alice".to_string()],
        };
        let description = segment.describe();
        assert!(description.contains("Patient: 001"));
        assert!(description.contains("3 samples"));
        assert!(description.contains("1 NaN"));
    }

    #[test]
    fn test_patient_id_from_path() {
        assert_eq!(patient_id_from_path("data/TBI_001_v2.hdf5"), "001");
        assert_eq!(patient_id_from_path("no-patient-here.hdf5"), "Unknown");
    }

    fn annotations_fixture() -> SignalAnnotations {
        // 60 s of signal at 100 Hz -> six 10 s segments
        SignalAnnotations::new("art", "data/TBI_001_v2.hdf5", base_micros(), 100.0, 6000)
    }

    #[test]
    fn test_segmentation_marks_overlaps() {
        let mut annotations = annotations_fixture();
        let start = base_micros();
        // Covers segments 1 and 2 (10-25 s); a contained artefact also counts
        annotations.add_annotation(
            &[(start + 10_000_000, start + 25_000_000)],
            Some("alice"),
        );
        let annotation = &annotations.annotations()[0];
        assert_eq!(annotation.anomalies.len(), 2);
        assert_eq!(annotation.good_segments.len(), 4);

        let mut contained = annotations_fixture();
        contained.add_annotation(&[(start + 32_000_000, start + 33_000_000)], Some("bob"));
        assert_eq!(contained.annotations()[0].anomalies.len(), 1);
    }

    #[test]
    fn test_out_of_range_intervals_ignored() {
        let mut annotations = annotations_fixture();
        let start = base_micros();
        annotations.add_annotation(&[(start.saturating_sub(20_000_000), start - 10_000_000)], None);
        assert!(annotations.annotations()[0].anomalies.is_empty());
    }

    #[test]
    fn test_extract_weights() {
        let mut annotations = annotations_fixture();
        let start = base_micros();
        // Alice flags segment 1; Bob flags segments 1 and 3
        annotations.add_annotation(&[(start + 10_000_000, start + 20_000_000)], Some("alice"));
        annotations.add_annotation(
            &[
                (start + 10_000_000, start + 20_000_000),
                (start + 30_000_000, start + 40_000_000),
            ],
            Some("bob"),
        );

        let (good, anomalous) = annotations.extract().unwrap();
        assert_eq!(good.len() + anomalous.len(), 6);
        assert_eq!(anomalous.len(), 2);

        let both = anomalous
            .iter()
            .find(|s| s.start_timestamp == start + 10_000_000)
            .unwrap();
        assert_eq!(both.weight, 1.0);
        assert_eq!(both.annotators.len(), 2);
        assert_eq!(both.anomaly_annotations.len(), 2);

        let bob_only = anomalous
            .iter()
            .find(|s| s.start_timestamp == start + 30_000_000)
            .unwrap();
        assert_eq!(bob_only.weight, 0.5);
        assert_eq!(bob_only.anomaly_annotations, vec!["bob".to_string()]);
    }

    #[test]
    fn test_extract_requires_annotations() {
        let annotations = annotations_fixture();
        assert!(annotations.extract().is_err());
    }

    #[test]
    fn test_duplicate_annotator_names_are_unique() {
        let mut annotations = annotations_fixture();
        annotations.add_annotation(&[], Some("alice"));
        annotations.add_annotation(&[], Some("alice"));
        let names: Vec<_> = annotations
            .annotations()
            .iter()
            .map(|a| a.annotator.clone())
            .collect();
        assert_eq!(names, vec!["alice".to_string(), "alice_0".to_string()]);
    }

    #[test]
    fn test_consensus_matrix() {
        let mut annotations = annotations_fixture();
        let start = base_micros();
        annotations.add_annotation(&[(start + 10_000_000, start + 20_000_000)], Some("alice"));
        annotations.add_annotation(&[(start + 10_000_000, start + 20_000_000)], Some("bob"));

        let (annotators, matrix) = annotations.consensus_matrix(true);
        assert_eq!(annotators, vec!["alice".to_string(), "bob".to_string()]);
        assert_eq!(matrix[0][0], 1.0);
        // Identical annotations agree fully
        assert!((matrix[0][1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_annotated_anomaly_counts() {
        let mut annotations = annotations_fixture();
        let start = base_micros();
        annotations.add_annotation(&[(start + 10_000_000, start + 30_000_000)], Some("alice"));
        let counts = annotations.annotated_anomalies();
        assert_eq!(counts.get("alice"), Some(&2));
    }

    #[test]
    fn test_export_segments_csv() {
        use tempfile::tempdir;
        let dir = tempdir().unwrap();
        let segment = Segment {
            signal_name: "art".to_string(),
            anomalous: true,
            start_timestamp: 0,
            end_timestamp: 1_000_000,
            data_file: "x.hdf5".to_string(),
            patient_id: "001".to_string(),
            annotators: vec!["alice".to_string()],
            frequency: 100.0,
            data: vec![1.0, 2.0, 3.0],
            weight: 1.0,
            anomaly_annotations: vec!["alice".to_string()],
        };
        let written = export_segments_csv(&[segment], dir.path()).unwrap();
        assert_eq!(written.len(), 1);
        let contents = std::fs::read_to_string(&written[0]).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("0,"));
        assert!(lines[2].starts_with("1000000,"));
    }
}
