//! # Signal Store Module
//!
//! Owns the active signal source and serves it to the UI in chunks.
//! Provides transparent access whether the samples come from an open
//! corpus recording or from the generator.
//!
//! ## Architecture
//! - **SignalStore**: active source, chunk reads, export lifecycle
//! - **Chunk cache**: LRU over `(signal, start, end)` sample ranges with
//!   adjacent-chunk prefetch for smooth sequential playback
//! - **Writer Thread**: background thread for HDF5 export of generated
//!   signals, fed over a crossbeam channel so the engine never blocks on
//!   file writes
//!
//! ## Export File Structure
//! Generated signals are written in the corpus layout so every consumer
//! of corpus recordings can open them unchanged:
//!
//! ```text
//! generated_YYYYMMDD_HHMMSS.hdf5
//! └── waves
//!     ├── art            (dataset: f64)
//!     ├── art.index      (compound: startidx, starttime, length, frequency)
//!     └── art.quality    (compound: time, value)
//! ```

use crate::corpus::{IndexEntry, QualityEntry, SignalFile, SignalInfo};
use crate::error::CorpusError;
use crate::generator::GeneratedSignal;
use crossbeam_channel::{unbounded, Receiver, Sender};
use hdf5::File;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::thread;

/// Cache key for chunk reads (signal, start sample, end sample)
type ChunkKey = (String, usize, usize);

/// The signal source currently being played back
enum ActiveSource {
    Recording(SignalFile),
    Generated(GeneratedSignal),
}

/// One loaded chunk of the active signal
#[derive(Debug, Clone)]
pub struct Chunk {
    pub signal: String,
    pub index: usize,
    /// Seconds from the start of the signal
    pub start_time_s: f64,
    pub samples: Vec<f64>,
}

/// Export command sent to the writer thread
enum ExportCommand {
    Write {
        path: PathBuf,
        signals: Vec<GeneratedSignal>,
    },
    Stop,
}

/// Outcome of a background export
pub type ExportResult = Result<PathBuf, String>;

pub struct SignalStore {
    source: Option<ActiveSource>,
    cache: LruCache<ChunkKey, Vec<f64>>,
    export_tx: Sender<ExportCommand>,
    export_results: Receiver<ExportResult>,
    writer_thread: Option<thread::JoinHandle<()>>,
}

impl SignalStore {
    /// Create a store with the given chunk-cache capacity
    pub fn new(cache_entries: usize) -> Self {
        let (export_tx, export_rx) = unbounded();
        let (result_tx, export_results) = unbounded();

        let writer_thread = thread::spawn(move || {
            Self::writer_loop(export_rx, result_tx);
        });

        let capacity = NonZeroUsize::new(cache_entries.max(4)).unwrap();
        Self {
            source: None,
            cache: LruCache::new(capacity),
            export_tx,
            export_results,
            writer_thread: Some(writer_thread),
        }
    }

    /// Open a corpus recording and make it the active source
    pub fn open_recording(&mut self, path: &Path) -> Result<Vec<SignalInfo>, CorpusError> {
        let file = SignalFile::open(path)?;
        log::info!("{}", file.describe());
        let signals = file.signals().to_vec();
        self.cache.clear();
        self.source = Some(ActiveSource::Recording(file));
        Ok(signals)
    }

    /// Make a generated signal the active source
    pub fn set_generated(&mut self, signal: GeneratedSignal) {
        self.cache.clear();
        self.source = Some(ActiveSource::Generated(signal));
    }

    pub fn close(&mut self) {
        self.source = None;
        self.cache.clear();
    }

    /// Sampling rate and sample count of a signal in the active source
    pub fn signal_meta(&self, signal: &str) -> Option<(f64, usize)> {
        match self.source.as_ref()? {
            ActiveSource::Recording(file) => {
                let info = file.signal(signal).ok()?;
                Some((info.index.frequency, info.sample_count()))
            }
            ActiveSource::Generated(generated) => {
                if generated.name() == signal {
                    Some((generated.sample_rate, generated.samples.len()))
                } else {
                    None
                }
            }
        }
    }

    /// Read one playback chunk, serving from the cache when possible.
    ///
    /// File-backed reads prefetch the neighbouring chunks so sequential
    /// playback rarely waits on disk.
    pub fn chunk(
        &mut self,
        signal: &str,
        chunk_index: usize,
        chunk_seconds: u32,
    ) -> Result<Chunk, CorpusError> {
        let (sample_rate, sample_count) = self
            .signal_meta(signal)
            .ok_or_else(|| CorpusError::SignalNotFound(signal.to_string()))?;
        let points_per_chunk = (chunk_seconds as f64 * sample_rate) as usize;
        let start = (chunk_index * points_per_chunk).min(sample_count);
        let end = (start + points_per_chunk).min(sample_count);

        let samples = self.samples(signal, start, end)?;

        if matches!(self.source, Some(ActiveSource::Recording(_))) {
            self.prefetch(signal, chunk_index, points_per_chunk, sample_count);
        }

        Ok(Chunk {
            signal: signal.to_string(),
            index: chunk_index,
            start_time_s: start as f64 / sample_rate,
            samples,
        })
    }

    /// Read an arbitrary sample range of the active source (cached)
    pub fn samples(
        &mut self,
        signal: &str,
        start: usize,
        end: usize,
    ) -> Result<Vec<f64>, CorpusError> {
        let key = (signal.to_string(), start, end);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached.clone());
        }

        let samples = match self.source.as_ref() {
            Some(ActiveSource::Recording(file)) => file.read_samples(signal, start, end)?,
            Some(ActiveSource::Generated(generated)) => {
                generated.samples[start.min(generated.samples.len())
                    ..end.min(generated.samples.len())]
                    .to_vec()
            }
            None => return Err(CorpusError::SignalNotFound(signal.to_string())),
        };

        self.cache.put(key, samples.clone());
        Ok(samples)
    }

    /// First samples of a recording signal of the given kind, if the
    /// active source is a recording that carries one. Used as the
    /// reference when rating freshly generated output.
    pub fn recording_samples_of_kind(
        &mut self,
        kind: crate::corpus::SignalKind,
        max_samples: usize,
    ) -> Option<Vec<f64>> {
        let name = match self.source.as_ref()? {
            ActiveSource::Recording(file) => file.signal_of_kind(kind)?.name.clone(),
            ActiveSource::Generated(_) => return None,
        };
        self.samples(&name, 0, max_samples).ok()
    }

    fn prefetch(
        &mut self,
        signal: &str,
        chunk_index: usize,
        points_per_chunk: usize,
        sample_count: usize,
    ) {
        let neighbours = [chunk_index.wrapping_sub(1), chunk_index + 1];
        for &neighbour in &neighbours {
            if neighbour == usize::MAX {
                continue;
            }
            let start = neighbour * points_per_chunk;
            if start >= sample_count {
                continue;
            }
            let end = (start + points_per_chunk).min(sample_count);
            let key = (signal.to_string(), start, end);
            if self.cache.contains(&key) {
                continue;
            }
            if let Err(e) = self.samples(signal, start, end) {
                log::debug!("Prefetch of chunk {} failed: {}", neighbour, e);
            }
        }
    }

    /// Queue a background export of generated signals.
    ///
    /// Returns the path the writer thread will produce; completion (or
    /// failure) surfaces via `poll_export_results`.
    pub fn export_generated(
        &self,
        output_dir: &Path,
        signals: Vec<GeneratedSignal>,
    ) -> Result<PathBuf, String> {
        if signals.is_empty() {
            return Err("Nothing generated yet".to_string());
        }
        if !output_dir.exists() {
            std::fs::create_dir_all(output_dir)
                .map_err(|e| format!("Failed to create output directory: {}", e))?;
        }

        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = output_dir.join(format!("generated_{}.hdf5", timestamp));
        log::info!("Queueing export to {}", path.display());

        self.export_tx
            .send(ExportCommand::Write {
                path: path.clone(),
                signals,
            })
            .map_err(|e| format!("Failed to queue export: {}", e))?;
        Ok(path)
    }

    /// Drain finished export results without blocking
    pub fn poll_export_results(&self) -> Vec<ExportResult> {
        self.export_results.try_iter().collect()
    }

    /// Writer thread loop: performs queued exports off the engine thread
    fn writer_loop(command_rx: Receiver<ExportCommand>, result_tx: Sender<ExportResult>) {
        loop {
            match command_rx.recv() {
                Ok(ExportCommand::Write { path, signals }) => {
                    let result = write_generated_file(&path, &signals)
                        .map(|_| path.clone())
                        .map_err(|e| e.to_string());
                    match &result {
                        Ok(path) => log::info!("Export complete: {}", path.display()),
                        Err(e) => log::error!("Export failed: {}", e),
                    }
                    let _ = result_tx.send(result);
                }
                Ok(ExportCommand::Stop) => {
                    log::info!("Writer thread stopped");
                    break;
                }
                Err(_) => {
                    log::info!("Writer thread: command channel closed");
                    break;
                }
            }
        }
    }
}

impl Drop for SignalStore {
    fn drop(&mut self) {
        let _ = self.export_tx.send(ExportCommand::Stop);
        if let Some(handle) = self.writer_thread.take() {
            let _ = handle.join();
        }
    }
}

/// Write generated signals to an HDF5 file in the corpus layout
pub fn write_generated_file(
    path: &Path,
    signals: &[GeneratedSignal],
) -> Result<(), CorpusError> {
    let io_err = |context: &str, reason: String| CorpusError::Io {
        context: context.to_string(),
        reason,
    };

    let file = File::create(path).map_err(|e| CorpusError::OpenFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let waves = file
        .create_group("waves")
        .map_err(|e| io_err("Failed to create waves group", e.to_string()))?;

    for signal in signals {
        let name = signal.name();

        let dataset = waves
            .new_dataset::<f64>()
            .shape(signal.samples.len())
            .create(name)
            .map_err(|e| io_err("Failed to create signal dataset", e.to_string()))?;
        dataset
            .write(&signal.samples)
            .map_err(|e| io_err("Failed to write signal samples", e.to_string()))?;

        let index = vec![IndexEntry {
            startidx: 0,
            starttime: signal.start_time,
            length: signal.samples.len() as i64,
            frequency: signal.sample_rate,
        }];
        waves
            .new_dataset::<IndexEntry>()
            .shape(1)
            .create(format!("{}.index", name).as_str())
            .map_err(|e| io_err("Failed to create index dataset", e.to_string()))?
            .write(&index)
            .map_err(|e| io_err("Failed to write index dataset", e.to_string()))?;

        let quality = vec![QualityEntry {
            time: signal.start_time,
            value: 0,
        }];
        waves
            .new_dataset::<QualityEntry>()
            .shape(1)
            .create(format!("{}.quality", name).as_str())
            .map_err(|e| io_err("Failed to create quality dataset", e.to_string()))?
            .write(&quality)
            .map_err(|e| io_err("Failed to write quality dataset", e.to_string()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::SignalKind;
    use crate::generator::{generate, GeneratorParams};
    use tempfile::tempdir;

    fn generated_fixture() -> GeneratedSignal {
        let params = GeneratorParams {
            windows: 2,
            seed: 7,
            ..GeneratorParams::for_kind(SignalKind::Art)
        };
        generate(&params, 1_700_000_000_000_000).unwrap()
    }

    #[test]
    fn test_chunking_generated_signal() {
        let mut store = SignalStore::new(16);
        store.set_generated(generated_fixture());

        let (rate, count) = store.signal_meta("art").unwrap();
        assert_eq!(rate, 100.0);
        assert_eq!(count, 2000);

        let chunk = store.chunk("art", 0, 5).unwrap();
        assert_eq!(chunk.samples.len(), 500);
        assert_eq!(chunk.start_time_s, 0.0);

        let last = store.chunk("art", 3, 5).unwrap();
        assert_eq!(last.samples.len(), 500);
        assert_eq!(last.start_time_s, 15.0);

        let past_end = store.chunk("art", 9, 5).unwrap();
        assert!(past_end.samples.is_empty());
    }

    #[test]
    fn test_export_round_trip() {
        let dir = tempdir().unwrap();
        let generated = generated_fixture();
        let path = dir.path().join("generated_test.hdf5");
        write_generated_file(&path, &[generated.clone()]).unwrap();

        let file = SignalFile::open(&path).unwrap();
        assert_eq!(file.signal_names(), vec!["art".to_string()]);
        let info = file.signal("art").unwrap();
        assert_eq!(info.sample_count(), generated.samples.len());
        assert_eq!(info.index.starttime, generated.start_time);
        assert_eq!(info.index.frequency, 100.0);

        let samples = file.read_all("art").unwrap();
        assert_eq!(samples.len(), generated.samples.len());
        assert!((samples[0] - generated.samples[0]).abs() < 1e-12);
    }

    #[test]
    fn test_background_export_reports_result() {
        let dir = tempdir().unwrap();
        let store = SignalStore::new(4);
        let expected = store
            .export_generated(dir.path(), vec![generated_fixture()])
            .unwrap();

        // The writer thread owns the write; wait for its result
        let mut results = Vec::new();
        for _ in 0..50 {
            results = store.poll_export_results();
            if !results.is_empty() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].as_ref().unwrap(), &expected);
        assert!(expected.exists());
    }

    #[test]
    fn test_export_rejects_empty() {
        let dir = tempdir().unwrap();
        let store = SignalStore::new(4);
        assert!(store.export_generated(dir.path(), Vec::new()).is_err());
    }

    #[test]
    fn test_recording_chunks_and_prefetch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rec.hdf5");
        let samples: Vec<f64> = (0..1500).map(|i| i as f64).collect();
        crate::corpus::tests::write_test_recording(&path, &samples, 0);

        let mut store = SignalStore::new(16);
        let signals = store.open_recording(&path).unwrap();
        assert_eq!(signals.len(), 1);

        let chunk = store.chunk("art", 1, 5).unwrap();
        assert_eq!(chunk.samples.len(), 500);
        assert_eq!(chunk.samples[0], 500.0);
        assert_eq!(chunk.start_time_s, 5.0);

        // Neighbouring chunks were prefetched into the cache
        assert!(store.cache.contains(&("art".to_string(), 0, 500)));
        assert!(store.cache.contains(&("art".to_string(), 1000, 1500)));
    }

    #[test]
    fn test_no_source_errors() {
        let mut store = SignalStore::new(4);
        assert!(store.chunk("art", 0, 5).is_err());
        assert!(store.signal_meta("art").is_none());
    }
}
