//! # Playback Module
//!
//! Chunked animated playback of a signal. The signal is cut into chunks
//! of a configurable duration; each UI tick reveals a fixed number of
//! additional samples of the current chunk. When a chunk is fully
//! revealed the next one is requested (chunk loading is asynchronous, so
//! the engine advances only once the chunk arrives), and after the last
//! chunk playback reports completion and stops.
//!
//! The struct is pure state; it owns no samples and does no I/O, which
//! keeps every transition unit-testable.

/// Default samples revealed per animation tick.
/// At 100 Hz and a 100 ms tick this plays one second of data per second.
pub const DEFAULT_POINTS_PER_FRAME: usize = 10;

/// Default chunk duration in seconds
pub const DEFAULT_CHUNK_SECONDS: u32 = 5;

/// Outcome of one animation tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStep {
    /// Nothing to do (paused, idle, or waiting for a chunk to load)
    Idle,
    /// The current chunk now shows this many samples
    Revealed(usize),
    /// Current chunk fully shown; the next chunk must be loaded
    ChunkComplete { next_chunk: usize },
    /// The last chunk is fully shown; playback has stopped
    Finished,
}

#[derive(Debug, Clone)]
pub struct Playback {
    chunk_index: usize,
    total_chunks: usize,
    chunk_seconds: u32,
    points_per_frame: usize,
    frame: usize,
    playing: bool,
    /// Set between `ChunkComplete` and the chunk's arrival
    awaiting_chunk: bool,
}

impl Playback {
    pub fn new(chunk_seconds: u32, points_per_frame: usize) -> Self {
        Self {
            chunk_index: 0,
            total_chunks: 0,
            chunk_seconds,
            points_per_frame,
            frame: 0,
            playing: false,
            awaiting_chunk: false,
        }
    }

    /// Number of chunks a signal splits into (last chunk may be short)
    pub fn total_chunks_for(sample_count: usize, sample_rate: f64, chunk_seconds: u32) -> usize {
        let points_per_chunk = (chunk_seconds as f64 * sample_rate) as usize;
        if points_per_chunk == 0 {
            return 0;
        }
        sample_count.div_ceil(points_per_chunk)
    }

    /// Begin playing a freshly chunked signal from its first chunk.
    /// The first chunk still has to be delivered via `chunk_ready`.
    pub fn start(&mut self, total_chunks: usize) {
        self.chunk_index = 0;
        self.total_chunks = total_chunks;
        self.frame = 0;
        self.playing = total_chunks > 0;
        self.awaiting_chunk = total_chunks > 0;
    }

    /// The chunk requested earlier has been loaded; resume animation
    pub fn chunk_ready(&mut self, chunk_index: usize) {
        if chunk_index == self.chunk_index {
            self.frame = 0;
            self.awaiting_chunk = false;
        } else {
            log::debug!(
                "Ignoring stale chunk {} (current {})",
                chunk_index,
                self.chunk_index
            );
        }
    }

    /// Advance one tick against the currently loaded chunk length
    pub fn advance(&mut self, chunk_len: usize) -> PlaybackStep {
        if !self.playing || self.awaiting_chunk {
            return PlaybackStep::Idle;
        }

        self.frame += 1;
        let visible = (self.frame * self.points_per_frame).min(chunk_len);
        if visible < chunk_len {
            return PlaybackStep::Revealed(visible);
        }

        if self.chunk_index + 1 < self.total_chunks {
            self.chunk_index += 1;
            self.awaiting_chunk = true;
            PlaybackStep::ChunkComplete {
                next_chunk: self.chunk_index,
            }
        } else {
            self.playing = false;
            PlaybackStep::Finished
        }
    }

    /// Samples of the current chunk that should be visible right now
    pub fn visible_points(&self, chunk_len: usize) -> usize {
        (self.frame * self.points_per_frame).min(chunk_len)
    }

    pub fn toggle_pause(&mut self) {
        self.playing = !self.playing;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn reset(&mut self) {
        self.chunk_index = 0;
        self.total_chunks = 0;
        self.frame = 0;
        self.playing = false;
        self.awaiting_chunk = false;
    }

    pub fn chunk_index(&self) -> usize {
        self.chunk_index
    }

    pub fn total_chunks(&self) -> usize {
        self.total_chunks
    }

    pub fn chunk_seconds(&self) -> u32 {
        self.chunk_seconds
    }

    pub fn points_per_frame(&self) -> usize {
        self.points_per_frame
    }

    pub fn set_points_per_frame(&mut self, points_per_frame: usize) {
        self.points_per_frame = points_per_frame.max(1);
    }

    /// Returns true when the duration actually changed; the caller must
    /// re-chunk and restart in that case.
    pub fn set_chunk_seconds(&mut self, chunk_seconds: u32) -> bool {
        if chunk_seconds == self.chunk_seconds || chunk_seconds == 0 {
            return false;
        }
        self.chunk_seconds = chunk_seconds;
        true
    }

    /// Progress label, e.g. `chunk 2/12`
    pub fn progress_label(&self) -> String {
        if self.total_chunks == 0 {
            "no signal".to_string()
        } else {
            format!("chunk {}/{}", self.chunk_index + 1, self.total_chunks)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_chunks_rounds_up() {
        assert_eq!(Playback::total_chunks_for(1000, 100.0, 5), 2);
        assert_eq!(Playback::total_chunks_for(1001, 100.0, 5), 3);
        assert_eq!(Playback::total_chunks_for(0, 100.0, 5), 0);
    }

    #[test]
    fn test_reveal_then_chunk_complete_then_finish() {
        let mut playback = Playback::new(5, 10);
        playback.start(2);
        assert_eq!(playback.advance(30), PlaybackStep::Idle); // awaiting first chunk
        playback.chunk_ready(0);

        assert_eq!(playback.advance(30), PlaybackStep::Revealed(10));
        assert_eq!(playback.advance(30), PlaybackStep::Revealed(20));
        assert_eq!(
            playback.advance(30),
            PlaybackStep::ChunkComplete { next_chunk: 1 }
        );

        // Waiting for chunk 1 to arrive
        assert_eq!(playback.advance(30), PlaybackStep::Idle);
        playback.chunk_ready(1);

        assert_eq!(playback.advance(15), PlaybackStep::Revealed(10));
        assert_eq!(playback.advance(15), PlaybackStep::Finished);
        assert!(!playback.is_playing());
    }

    #[test]
    fn test_stale_chunk_is_ignored() {
        let mut playback = Playback::new(5, 10);
        playback.start(3);
        playback.chunk_ready(2);
        assert_eq!(playback.advance(30), PlaybackStep::Idle);
        playback.chunk_ready(0);
        assert_eq!(playback.advance(30), PlaybackStep::Revealed(10));
    }

    #[test]
    fn test_pause_holds_position() {
        let mut playback = Playback::new(5, 10);
        playback.start(1);
        playback.chunk_ready(0);
        playback.advance(100);
        playback.toggle_pause();
        assert_eq!(playback.advance(100), PlaybackStep::Idle);
        assert_eq!(playback.visible_points(100), 10);
        playback.toggle_pause();
        assert_eq!(playback.advance(100), PlaybackStep::Revealed(20));
    }

    #[test]
    fn test_empty_chunk_completes_immediately() {
        let mut playback = Playback::new(5, 10);
        playback.start(1);
        playback.chunk_ready(0);
        assert_eq!(playback.advance(0), PlaybackStep::Finished);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut playback = Playback::new(5, 10);
        playback.start(4);
        playback.chunk_ready(0);
        playback.advance(100);
        playback.reset();
        assert!(!playback.is_playing());
        assert_eq!(playback.total_chunks(), 0);
        assert_eq!(playback.progress_label(), "no signal");
    }

    #[test]
    fn test_chunk_seconds_change_signals_rechunk() {
        let mut playback = Playback::new(5, 10);
        assert!(!playback.set_chunk_seconds(5));
        assert!(playback.set_chunk_seconds(8));
        assert_eq!(playback.chunk_seconds(), 8);
    }
}
