//! # Engine Module
//!
//! The worker side of the application. All blocking work (HDF5 access,
//! annotation parsing, synthesis, statistics) runs on a dedicated thread
//! that owns the `SignalStore`; the UI sends `EngineCommand`s over an
//! mpsc channel and drains `EngineUpdate`s on its tick, so the render
//! loop never touches a file.
//!
//! The command loop wakes periodically to forward results from the
//! store's background export writer.

use crate::annotate::{self, SignalAnnotations};
use crate::corpus::{SignalInfo, SignalKind, MICROS_PER_SECOND};
use crate::generator::{generate, GeneratedSignal, GeneratorParams};
use crate::metrics::{dtw_distance, psd_distance};
use crate::stats::{compute_model_stats, corpus_statistics, write_stats_json, ModelStats};
use crate::store::{Chunk, SignalStore};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

/// Commands sent from the UI thread to the engine
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// Open a recording and auto-annotate it from sibling ARTF files
    LoadRecording(PathBuf),
    /// Read one playback chunk of the active source
    ReadChunk {
        signal: String,
        chunk_index: usize,
        chunk_seconds: u32,
    },
    /// Synthesize a signal and make it the active source
    Generate(GeneratorParams),
    /// Write every signal generated this session to an HDF5 file
    ExportGenerated { output_dir: PathBuf },
    /// Export the annotated segments of a signal as per-segment CSV files
    ExportSegments { signal: String, output_dir: PathBuf },
    /// Walk a corpus directory and write per-file statistics as JSON,
    /// one file per signal kind
    ComputeCorpusStats { dir: PathBuf, output_dir: PathBuf },
    /// Drop the active source
    CloseSource,
}

/// How many annotators flagged what in a freshly loaded recording
#[derive(Debug, Clone, Default)]
pub struct AnnotationSummary {
    /// Per-annotator anomalous-segment counts, summed over signals
    pub annotator_anomalies: Vec<(String, usize)>,
    /// Merged anomalous segments across all signals
    pub anomalous_segments: usize,
    /// Mean pairwise annotator agreement, when at least two annotated
    pub mean_consensus: Option<f64>,
}

impl AnnotationSummary {
    pub fn annotated(&self) -> bool {
        !self.annotator_anomalies.is_empty()
    }
}

/// How close a generated signal is to the recording it was modeled after
#[derive(Debug, Clone, Copy)]
pub struct SimilarityReport {
    pub psd_distance: f64,
    pub dtw_distance: f64,
}

/// Updates sent from the engine back to the UI thread
#[derive(Debug)]
pub enum EngineUpdate {
    RecordingLoaded {
        file_name: String,
        signals: Vec<SignalInfo>,
        annotation_summary: AnnotationSummary,
    },
    ChunkLoaded(Chunk),
    Generated {
        signal: GeneratedSignal,
        stats: ModelStats,
        /// Present when a recording with the same channel was loaded
        similarity: Option<SimilarityReport>,
    },
    ExportFinished(PathBuf),
    SegmentsExported {
        output_dir: PathBuf,
        count: usize,
    },
    StatsWritten {
        path: PathBuf,
        entries: usize,
    },
    Error(String),
}

/// Runs the engine loop on a dedicated thread.
///
/// A separate thread is used because corpus reads and synthesis are
/// blocking operations; the UI keeps rendering while they run.
pub struct Engine {
    command_rx: mpsc::Receiver<EngineCommand>,
    update_tx: mpsc::Sender<EngineUpdate>,
}

/// Engine-side state that lives across commands
struct EngineState {
    store: SignalStore,
    annotations: HashMap<String, SignalAnnotations>,
    generated: HashMap<SignalKind, GeneratedSignal>,
}

impl Engine {
    /// Returns the engine and the sender for issuing commands from the UI
    pub fn new(update_tx: mpsc::Sender<EngineUpdate>) -> (Self, mpsc::Sender<EngineCommand>) {
        let (command_tx, command_rx) = mpsc::channel();
        (
            Engine {
                command_rx,
                update_tx,
            },
            command_tx,
        )
    }

    /// Process commands until the command channel closes.
    ///
    /// The loop wakes every 200 ms to forward background export results
    /// even when no command arrives.
    pub fn run(self) {
        let mut state = EngineState {
            store: SignalStore::new(256),
            annotations: HashMap::new(),
            generated: HashMap::new(),
        };

        loop {
            match self.command_rx.recv_timeout(Duration::from_millis(200)) {
                Ok(command) => self.handle(command, &mut state),
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    log::info!("Engine: command channel closed, shutting down");
                    break;
                }
            }

            for result in state.store.poll_export_results() {
                let update = match result {
                    Ok(path) => EngineUpdate::ExportFinished(path),
                    Err(e) => EngineUpdate::Error(format!("Export failed: {}", e)),
                };
                let _ = self.update_tx.send(update);
            }
        }
    }

    fn send(&self, update: EngineUpdate) {
        if self.update_tx.send(update).is_err() {
            log::warn!("Engine: UI receiver dropped an update");
        }
    }

    fn fail(&self, message: String) {
        log::error!("{}", message);
        self.send(EngineUpdate::Error(message));
    }

    fn handle(&self, command: EngineCommand, state: &mut EngineState) {
        match command {
            EngineCommand::LoadRecording(path) => self.load_recording(path, state),
            EngineCommand::ReadChunk {
                signal,
                chunk_index,
                chunk_seconds,
            } => match state.store.chunk(&signal, chunk_index, chunk_seconds) {
                Ok(chunk) => self.send(EngineUpdate::ChunkLoaded(chunk)),
                Err(e) => self.fail(format!("Failed to read chunk {}: {}", chunk_index, e)),
            },
            EngineCommand::Generate(params) => self.generate_signal(params, state),
            EngineCommand::ExportGenerated { output_dir } => {
                let signals: Vec<GeneratedSignal> = state.generated.values().cloned().collect();
                if let Err(e) = state.store.export_generated(&output_dir, signals) {
                    self.fail(e);
                }
                // Completion surfaces through poll_export_results
            }
            EngineCommand::ExportSegments { signal, output_dir } => {
                self.export_segments(&signal, &output_dir, state)
            }
            EngineCommand::ComputeCorpusStats { dir, output_dir } => {
                if let Err(e) = std::fs::create_dir_all(&output_dir) {
                    return self.fail(format!("Failed to create output directory: {}", e));
                }
                for kind in SignalKind::all() {
                    let stats = corpus_statistics(&dir, kind);
                    if stats.is_empty() {
                        continue;
                    }
                    let output =
                        output_dir.join(format!("statistics-{}.json", kind.dataset_name()));
                    match write_stats_json(&stats, &output) {
                        Ok(()) => self.send(EngineUpdate::StatsWritten {
                            path: output,
                            entries: stats.len(),
                        }),
                        Err(e) => self.fail(format!("Failed to write statistics: {}", e)),
                    }
                }
            }
            EngineCommand::CloseSource => {
                state.store.close();
                state.annotations.clear();
            }
        }
    }

    fn load_recording(&self, path: PathBuf, state: &mut EngineState) {
        let signals = match state.store.open_recording(&path) {
            Ok(signals) => signals,
            Err(e) => return self.fail(e.to_string()),
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        state.annotations = Self::auto_annotate(&path, &file_name, &signals);
        let annotation_summary = Self::summarize_annotations(&state.annotations);

        self.send(EngineUpdate::RecordingLoaded {
            file_name,
            signals,
            annotation_summary,
        });
    }

    /// Apply every sibling ARTF file that references this recording
    fn auto_annotate(
        path: &std::path::Path,
        file_name: &str,
        signals: &[SignalInfo],
    ) -> HashMap<String, SignalAnnotations> {
        let mut annotations: HashMap<String, SignalAnnotations> = signals
            .iter()
            .map(|info| {
                (
                    info.name.clone(),
                    SignalAnnotations::new(
                        &info.name,
                        &path.to_string_lossy(),
                        info.index.starttime,
                        info.index.frequency,
                        info.sample_count(),
                    ),
                )
            })
            .collect();

        let search_dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        for artf_path in annotate::find_artf_files(search_dir) {
            let doc = match annotate::parse_artf(&artf_path) {
                Ok(doc) => doc,
                Err(e) => {
                    log::warn!("Skipping {}: {}", artf_path.display(), e);
                    continue;
                }
            };
            if let Err(e) = annotate::verify_association(&doc, file_name) {
                log::debug!("Skipping {}: {}", artf_path.display(), e);
                continue;
            }
            for info in signals {
                match annotate::artefact_intervals(&doc, &info.name) {
                    Ok(intervals) => {
                        if let Some(signal_annotations) = annotations.get_mut(&info.name) {
                            signal_annotations
                                .add_annotation(&intervals, Some(&doc.info.user_id));
                        }
                    }
                    Err(e) => log::warn!(
                        "Bad artefact timestamps in {}: {}",
                        artf_path.display(),
                        e
                    ),
                }
            }
            log::info!("Applied annotations from {}", artf_path.display());
        }

        annotations
    }

    fn summarize_annotations(
        annotations: &HashMap<String, SignalAnnotations>,
    ) -> AnnotationSummary {
        let mut summary = AnnotationSummary::default();
        let mut per_annotator: std::collections::BTreeMap<String, usize> =
            std::collections::BTreeMap::new();
        let mut consensus_values = Vec::new();

        for signal_annotations in annotations.values() {
            if !signal_annotations.annotated() {
                continue;
            }
            for (annotator, count) in signal_annotations.annotated_anomalies() {
                *per_annotator.entry(annotator).or_insert(0) += count;
            }
            if let Ok((_, anomalous)) = signal_annotations.extract() {
                summary.anomalous_segments += anomalous.len();
            }
            if signal_annotations.annotations().len() >= 2 {
                let (annotators, matrix) = signal_annotations.consensus_matrix(true);
                for i in 0..annotators.len() {
                    for j in 0..annotators.len() {
                        if i != j {
                            consensus_values.push(matrix[i][j]);
                        }
                    }
                }
            }
        }

        summary.annotator_anomalies = per_annotator.into_iter().collect();
        if !consensus_values.is_empty() {
            summary.mean_consensus =
                Some(consensus_values.iter().sum::<f64>() / consensus_values.len() as f64);
        }
        summary
    }

    fn generate_signal(&self, params: GeneratorParams, state: &mut EngineState) {
        // Rate the new signal against the open recording before the
        // store switches over to the generated source
        let reference = state
            .store
            .recording_samples_of_kind(params.kind, 6_000);

        let start_time = chrono::Utc::now().timestamp_micros().max(0) as u64;
        match generate(&params, start_time) {
            Ok(signal) => {
                let stats = compute_model_stats(&signal.samples, signal.name());
                let similarity = reference
                    .map(|reference| {
                        // DTW needs gap-free input; drop the NaN samples
                        reference
                            .into_iter()
                            .filter(|v| !v.is_nan())
                            .collect::<Vec<f64>>()
                    })
                    .filter(|reference| reference.len() >= 256)
                    .map(|reference| {
                        let span = 2_000.min(signal.samples.len()).min(reference.len());
                        SimilarityReport {
                            psd_distance: psd_distance(&signal.samples, &reference, 256),
                            dtw_distance: dtw_distance(
                                &signal.samples[..span],
                                &reference[..span],
                                Some(200),
                            ),
                        }
                    });

                state.generated.insert(signal.kind, signal.clone());
                state.store.set_generated(signal.clone());
                log::info!(
                    "Generated {} samples of '{}' ({} anomalies)",
                    signal.samples.len(),
                    signal.name(),
                    signal.anomalies.len()
                );
                self.send(EngineUpdate::Generated {
                    signal,
                    stats,
                    similarity,
                });
            }
            Err(e) => self.fail(format!("Generation failed: {}", e)),
        }
    }

    fn export_segments(&self, signal: &str, output_dir: &std::path::Path, state: &mut EngineState) {
        let signal_annotations = match state.annotations.get(signal) {
            Some(annotations) if annotations.annotated() => annotations,
            _ => return self.fail(format!("Signal '{}' has no annotations to export", signal)),
        };

        let (good, anomalous) = match signal_annotations.extract() {
            Ok(segments) => segments,
            Err(e) => return self.fail(e.to_string()),
        };

        let signal_start = signal_annotations.starttime();

        let mut segments: Vec<_> = good.into_iter().chain(anomalous).collect();
        for segment in &mut segments {
            // Segment timestamps are absolute; sample indices are relative
            // to the signal start from the recording index
            let rel_start =
                (segment.start_timestamp - signal_start) as f64 / MICROS_PER_SECOND as f64;
            let start_idx = (rel_start * segment.frequency) as usize;
            let end_idx = start_idx + (segment.duration_seconds() * segment.frequency) as usize;
            match state.store.samples(signal, start_idx, end_idx) {
                Ok(samples) => segment.data = samples,
                Err(e) => log::warn!("Could not load segment {}: {}", segment.id(), e),
            }
            if segment.anomalous {
                log::debug!("Exporting anomalous segment:\n{}", segment.describe());
            }
        }

        match annotate::export_segments_csv(&segments, output_dir) {
            Ok(written) => self.send(EngineUpdate::SegmentsExported {
                output_dir: output_dir.to_path_buf(),
                count: written.len(),
            }),
            Err(e) => self.fail(format!("Segment export failed: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_creation_accepts_commands() {
        let (update_tx, _update_rx) = mpsc::channel();
        let (_engine, command_tx) = Engine::new(update_tx);

        assert!(command_tx.send(EngineCommand::CloseSource).is_ok());
    }

    #[test]
    fn test_engine_load_and_chunk_round_trip() {
        use tempfile::tempdir;

        let dir = tempdir().unwrap();
        let path = dir.path().join("rec.hdf5");
        let samples: Vec<f64> = (0..1000).map(|i| i as f64).collect();
        crate::corpus::tests::write_test_recording(&path, &samples, 0);

        let (update_tx, update_rx) = mpsc::channel();
        let (engine, command_tx) = Engine::new(update_tx);
        let handle = std::thread::spawn(move || engine.run());

        command_tx
            .send(EngineCommand::LoadRecording(path))
            .unwrap();
        match update_rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            EngineUpdate::RecordingLoaded { signals, .. } => {
                assert_eq!(signals.len(), 1);
                assert_eq!(signals[0].name, "art");
            }
            other => panic!("unexpected update: {:?}", other),
        }

        command_tx
            .send(EngineCommand::ReadChunk {
                signal: "art".to_string(),
                chunk_index: 1,
                chunk_seconds: 5,
            })
            .unwrap();
        match update_rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            EngineUpdate::ChunkLoaded(chunk) => {
                assert_eq!(chunk.index, 1);
                assert_eq!(chunk.samples.len(), 500);
                assert_eq!(chunk.start_time_s, 5.0);
            }
            other => panic!("unexpected update: {:?}", other),
        }

        drop(command_tx);
        handle.join().unwrap();
    }

    #[test]
    fn test_engine_generate_reports_stats() {
        let (update_tx, update_rx) = mpsc::channel();
        let (engine, command_tx) = Engine::new(update_tx);
        let handle = std::thread::spawn(move || engine.run());

        let params = GeneratorParams {
            windows: 2,
            seed: 3,
            ..GeneratorParams::for_kind(SignalKind::Art)
        };
        command_tx.send(EngineCommand::Generate(params)).unwrap();

        match update_rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            EngineUpdate::Generated {
                signal,
                stats,
                similarity,
            } => {
                assert_eq!(signal.samples.len(), 2000);
                assert_eq!(stats.file, "art");
                assert!(stats.mean.is_some());
                // No recording loaded, nothing to compare against
                assert!(similarity.is_none());
            }
            other => panic!("unexpected update: {:?}", other),
        }

        drop(command_tx);
        handle.join().unwrap();
    }

    #[test]
    fn test_generation_rates_against_loaded_recording() {
        use tempfile::tempdir;

        let dir = tempdir().unwrap();
        let path = dir.path().join("rec.hdf5");
        let samples: Vec<f64> = (0..1000)
            .map(|i| 90.0 + 20.0 * (i as f64 * 0.075).sin())
            .collect();
        crate::corpus::tests::write_test_recording(&path, &samples, 0);

        let (update_tx, update_rx) = mpsc::channel();
        let (engine, command_tx) = Engine::new(update_tx);
        let handle = std::thread::spawn(move || engine.run());

        command_tx
            .send(EngineCommand::LoadRecording(path))
            .unwrap();
        assert!(matches!(
            update_rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            EngineUpdate::RecordingLoaded { .. }
        ));

        let params = GeneratorParams {
            windows: 1,
            seed: 9,
            ..GeneratorParams::for_kind(SignalKind::Art)
        };
        command_tx.send(EngineCommand::Generate(params)).unwrap();

        match update_rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            EngineUpdate::Generated { similarity, .. } => {
                let report = similarity.expect("similarity against loaded recording");
                assert!(report.psd_distance.is_finite());
                assert!(report.dtw_distance.is_finite());
            }
            other => panic!("unexpected update: {:?}", other),
        }

        drop(command_tx);
        handle.join().unwrap();
    }
}
