use crate::body::BodyRegion;
use crate::charts::{OverviewChartType, SignalChartType, SpectrumChartType};
use crate::config::Config;
use crate::corpus::{scan_corpus_dir, SignalInfo, SignalKind};
use crate::engine::{AnnotationSummary, EngineCommand, EngineUpdate, SimilarityReport};
use crate::generator::{AnomalyKind, AnomalySpec, GeneratedSignal, GeneratorParams};
use crate::playback::{Playback, PlaybackStep};
use crate::stats::ModelStats;
use crate::store::Chunk;
use crate::ui::styles;
use iced::widget::{
    button, checkbox, column, container, row, scrollable, slider, text, text_input, Space,
};
use iced::{Element, Length, Subscription, Task};
use plotters_iced::ChartWidget;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};

/// Below this window width the main content stacks into one column
const STACKED_LAYOUT_MAX_WIDTH: f32 = 1024.0;

/// Feedback shown in the import panel
#[derive(Debug, Clone, PartialEq)]
pub enum UploadStatus {
    Waiting,
    Loading(String),
    Success(String),
    Failed(String),
}

/// Feedback shown in the info panel
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingStatus {
    Ready(String),
    Processing(String),
    Error(String),
}

/// What the engine's store is currently serving chunks from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    None,
    Recording,
    Generated,
}

/// Metadata of the recording the engine has open
struct LoadedRecording {
    file_name: String,
    signals: Vec<SignalInfo>,
    annotation_summary: AnnotationSummary,
}

// Iced Application State
pub struct Arteria {
    receiver: Receiver<EngineUpdate>,
    engine_sender: Sender<EngineCommand>,
    config: Config,
    window_width: f32,

    // Import panel
    path_input: String,
    upload_status: UploadStatus,
    awaiting_load: bool,
    available_recordings: Vec<PathBuf>,
    scanning: bool,

    // Active source and selection
    loaded: Option<LoadedRecording>,
    source: SourceKind,
    pub selected_region: Option<BodyRegion>,
    pub active_signal: Option<String>,
    pub active_sample_rate: f64,
    active_sample_count: usize,
    processing: ProcessingStatus,

    // Playback
    pub playback: Playback,
    pub current_chunk: Option<Chunk>,

    // Generator controls
    pulse_rate: f64,
    pulse_pressure: f64,
    baseline: f64,
    duration_windows: f64,
    enabled_anomalies: HashSet<AnomalyKind>,
    pub generated: Option<GeneratedSignal>,
    generated_stats: Option<ModelStats>,
    generated_similarity: Option<SimilarityReport>,
}

#[derive(Debug, Clone)]
pub enum Message {
    Tick,
    WindowResized(f32, f32),
    FileDropped(PathBuf),
    PathInputChanged(String),
    PathSubmitted,
    ScanCorpus,
    CorpusScanned(Vec<PathBuf>),
    SelectRecording(PathBuf),
    SelectRegion(BodyRegion),
    PointsPerFrameChanged(f64),
    ChunkSecondsChanged(f64),
    PulseRateChanged(f64),
    PulsePressureChanged(f64),
    BaselineChanged(f64),
    DurationWindowsChanged(f64),
    ToggleAnomaly(AnomalyKind, bool),
    GenerateRequested,
    TogglePlayback,
    ResetRequested,
    ExportGeneratedRequested,
    ExportSegmentsRequested,
    CorpusStatsRequested,
}

impl Arteria {
    pub fn new(
        receiver: Receiver<EngineUpdate>,
        engine_sender: Sender<EngineCommand>,
    ) -> (Self, Task<Message>) {
        let config = Config::load().unwrap_or_else(|e| {
            log::warn!("Using default configuration: {}", e);
            Config::default()
        });
        let defaults = GeneratorParams::for_kind(SignalKind::Art);
        let playback = Playback::new(config.chunk_seconds, config.points_per_frame);

        (
            Arteria {
                receiver,
                engine_sender,
                config,
                window_width: 1280.0,
                path_input: String::new(),
                upload_status: UploadStatus::Waiting,
                awaiting_load: false,
                available_recordings: Vec::new(),
                scanning: false,
                loaded: None,
                source: SourceKind::None,
                selected_region: None,
                active_signal: None,
                active_sample_rate: 100.0,
                active_sample_count: 0,
                processing: ProcessingStatus::Ready("Ready".to_string()),
                playback,
                current_chunk: None,
                pulse_rate: defaults.pulse_rate_bpm,
                pulse_pressure: defaults.pulse_pressure,
                baseline: defaults.baseline,
                duration_windows: defaults.windows as f64,
                enabled_anomalies: HashSet::new(),
                generated: None,
                generated_stats: None,
                generated_similarity: None,
            },
            Task::none(),
        )
    }

    fn send_engine(&self, command: EngineCommand) {
        if let Err(e) = self.engine_sender.send(command) {
            log::error!("Failed to reach engine thread: {}", e);
        }
    }

    /// Point playback at a signal of the active source, starting at chunk 0
    fn begin_playback(&mut self, signal: String, sample_rate: f64, sample_count: usize) {
        self.active_sample_rate = sample_rate;
        self.active_sample_count = sample_count;
        self.current_chunk = None;

        let total =
            Playback::total_chunks_for(sample_count, sample_rate, self.playback.chunk_seconds());
        self.playback.start(total);
        self.processing = ProcessingStatus::Processing(format!("Loading signal '{}'", signal));
        self.send_engine(EngineCommand::ReadChunk {
            signal: signal.clone(),
            chunk_index: 0,
            chunk_seconds: self.playback.chunk_seconds(),
        });
        self.active_signal = Some(signal);
    }

    fn request_load(&mut self, path: PathBuf) {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let supported = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("hdf5") | Some("h5")
        );
        if !supported {
            self.upload_status =
                UploadStatus::Failed(format!("'{}' is not a supported file type", file_name));
            return;
        }
        self.upload_status = UploadStatus::Loading(format!("Loading '{}'...", file_name));
        self.awaiting_load = true;
        self.send_engine(EngineCommand::LoadRecording(path));
    }

    fn apply_update(&mut self, update: EngineUpdate) {
        match update {
            EngineUpdate::RecordingLoaded {
                file_name,
                signals,
                annotation_summary,
            } => {
                self.awaiting_load = false;
                self.upload_status = UploadStatus::Success(format!(
                    "'{}' loaded. Select a body region.",
                    file_name
                ));
                self.loaded = Some(LoadedRecording {
                    file_name,
                    signals,
                    annotation_summary,
                });
                self.source = SourceKind::Recording;
                self.selected_region = None;
                self.active_signal = None;
                self.current_chunk = None;
                self.playback.reset();
                self.processing = ProcessingStatus::Ready("Select a body region".to_string());
            }
            EngineUpdate::ChunkLoaded(chunk) => {
                if self.active_signal.as_deref() == Some(chunk.signal.as_str()) {
                    self.playback.chunk_ready(chunk.index);
                    self.processing = ProcessingStatus::Processing(format!(
                        "Rendering {}",
                        self.playback.progress_label()
                    ));
                    self.current_chunk = Some(chunk);
                }
            }
            EngineUpdate::Generated {
                signal,
                stats,
                similarity,
            } => {
                self.generated_stats = Some(stats);
                self.generated_similarity = similarity;
                self.source = SourceKind::Generated;
                let name = signal.name().to_string();
                let sample_rate = signal.sample_rate;
                let sample_count = signal.samples.len();
                self.generated = Some(signal);
                self.begin_playback(name, sample_rate, sample_count);
            }
            EngineUpdate::ExportFinished(path) => {
                self.processing =
                    ProcessingStatus::Ready(format!("Exported {}", path.display()));
            }
            EngineUpdate::SegmentsExported { output_dir, count } => {
                self.processing = ProcessingStatus::Ready(format!(
                    "Exported {} segments to {}",
                    count,
                    output_dir.display()
                ));
            }
            EngineUpdate::StatsWritten { path, entries } => {
                self.processing = ProcessingStatus::Ready(format!(
                    "Wrote statistics for {} recordings to {}",
                    entries,
                    path.display()
                ));
            }
            EngineUpdate::Error(message) => {
                if self.awaiting_load {
                    self.awaiting_load = false;
                    self.upload_status = UploadStatus::Failed(message.clone());
                }
                self.processing = ProcessingStatus::Error(message);
            }
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => {
                // Process all pending engine updates without blocking
                while let Ok(update) = self.receiver.try_recv() {
                    self.apply_update(update);
                }

                if let Some(chunk) = &self.current_chunk {
                    match self.playback.advance(chunk.samples.len()) {
                        PlaybackStep::ChunkComplete { next_chunk } => {
                            if let Some(signal) = self.active_signal.clone() {
                                self.send_engine(EngineCommand::ReadChunk {
                                    signal,
                                    chunk_index: next_chunk,
                                    chunk_seconds: self.playback.chunk_seconds(),
                                });
                            }
                        }
                        PlaybackStep::Finished => {
                            self.processing =
                                ProcessingStatus::Ready("All chunks displayed".to_string());
                        }
                        _ => {}
                    }
                }
                Task::none()
            }
            Message::WindowResized(width, _height) => {
                self.window_width = width;
                Task::none()
            }
            Message::FileDropped(path) => {
                self.request_load(path);
                Task::none()
            }
            Message::PathInputChanged(value) => {
                self.path_input = value;
                Task::none()
            }
            Message::PathSubmitted => {
                if !self.path_input.trim().is_empty() {
                    let path = PathBuf::from(self.path_input.trim().to_string());
                    self.request_load(path);
                }
                Task::none()
            }
            Message::ScanCorpus => {
                self.scanning = true;
                let dir = self.config.data_dir.clone();
                Task::perform(
                    async move { scan_corpus_dir(&dir) },
                    Message::CorpusScanned,
                )
            }
            Message::CorpusScanned(files) => {
                self.scanning = false;
                if files.is_empty() {
                    self.upload_status = UploadStatus::Failed(format!(
                        "No recordings found under {}",
                        self.config.data_dir.display()
                    ));
                }
                self.available_recordings = files;
                Task::none()
            }
            Message::SelectRecording(path) => {
                self.request_load(path);
                Task::none()
            }
            Message::SelectRegion(region) => {
                self.selected_region = Some(region);
                let kind = region.preferred_kind();

                // Generator defaults follow the selected channel
                let defaults = GeneratorParams::for_kind(kind);
                self.pulse_rate = defaults.pulse_rate_bpm;
                self.pulse_pressure = defaults.pulse_pressure;
                self.baseline = defaults.baseline;

                match self.source {
                    SourceKind::Recording => {
                        let info = self.loaded.as_ref().and_then(|loaded| {
                            loaded
                                .signals
                                .iter()
                                .find(|s| SignalKind::from_name(&s.dataset) == Some(kind))
                                .or_else(|| loaded.signals.first())
                                .cloned()
                        });
                        match info {
                            Some(info) => {
                                let sample_count = info.sample_count();
                                self.begin_playback(
                                    info.name,
                                    info.index.frequency,
                                    sample_count,
                                );
                            }
                            None => {
                                self.processing = ProcessingStatus::Error(
                                    "The recording contains no signals".to_string(),
                                );
                            }
                        }
                    }
                    SourceKind::Generated => {
                        let playable = self.generated.as_ref().and_then(|generated| {
                            (generated.kind == kind).then(|| {
                                (
                                    generated.name().to_string(),
                                    generated.sample_rate,
                                    generated.samples.len(),
                                )
                            })
                        });
                        match playable {
                            Some((name, sample_rate, sample_count)) => {
                                self.begin_playback(name, sample_rate, sample_count);
                            }
                            None => {
                                self.processing = ProcessingStatus::Ready(format!(
                                    "Generate a {} signal for this region",
                                    kind.dataset_name()
                                ));
                            }
                        }
                    }
                    SourceKind::None => {
                        self.processing = ProcessingStatus::Ready(
                            "Load a recording or generate a signal".to_string(),
                        );
                    }
                }
                Task::none()
            }
            Message::PointsPerFrameChanged(value) => {
                self.playback.set_points_per_frame(value as usize);
                Task::none()
            }
            Message::ChunkSecondsChanged(value) => {
                if self.playback.set_chunk_seconds(value as u32) {
                    // Re-chunk the active signal from the start
                    if let Some(signal) = self.active_signal.clone() {
                        let total = Playback::total_chunks_for(
                            self.active_sample_count,
                            self.active_sample_rate,
                            self.playback.chunk_seconds(),
                        );
                        self.current_chunk = None;
                        self.playback.start(total);
                        self.send_engine(EngineCommand::ReadChunk {
                            signal,
                            chunk_index: 0,
                            chunk_seconds: self.playback.chunk_seconds(),
                        });
                    }
                }
                Task::none()
            }
            Message::PulseRateChanged(value) => {
                self.pulse_rate = value;
                Task::none()
            }
            Message::PulsePressureChanged(value) => {
                self.pulse_pressure = value;
                Task::none()
            }
            Message::BaselineChanged(value) => {
                self.baseline = value;
                Task::none()
            }
            Message::DurationWindowsChanged(value) => {
                self.duration_windows = value;
                Task::none()
            }
            Message::ToggleAnomaly(kind, enabled) => {
                if enabled {
                    self.enabled_anomalies.insert(kind);
                } else {
                    self.enabled_anomalies.remove(&kind);
                }
                Task::none()
            }
            Message::GenerateRequested => {
                let params = self.generator_params();
                self.processing = ProcessingStatus::Processing(format!(
                    "Generating {} signal...",
                    params.kind.dataset_name()
                ));
                self.send_engine(EngineCommand::Generate(params));
                Task::none()
            }
            Message::TogglePlayback => {
                self.playback.toggle_pause();
                Task::none()
            }
            Message::ResetRequested => {
                self.send_engine(EngineCommand::CloseSource);
                self.playback.reset();
                self.current_chunk = None;
                self.selected_region = None;
                self.active_signal = None;
                self.loaded = None;
                self.generated = None;
                self.generated_stats = None;
                self.generated_similarity = None;
                self.source = SourceKind::None;
                self.upload_status = UploadStatus::Waiting;
                self.processing = ProcessingStatus::Ready("Ready".to_string());
                Task::none()
            }
            Message::ExportGeneratedRequested => {
                self.processing =
                    ProcessingStatus::Processing("Exporting generated signals...".to_string());
                self.send_engine(EngineCommand::ExportGenerated {
                    output_dir: self.config.export_dir.clone(),
                });
                Task::none()
            }
            Message::ExportSegmentsRequested => {
                if let Some(signal) = self.active_signal.clone() {
                    self.processing =
                        ProcessingStatus::Processing("Exporting segments...".to_string());
                    self.send_engine(EngineCommand::ExportSegments {
                        signal,
                        output_dir: self.config.export_dir.join("segments"),
                    });
                }
                Task::none()
            }
            Message::CorpusStatsRequested => {
                self.processing =
                    ProcessingStatus::Processing("Computing corpus statistics...".to_string());
                self.send_engine(EngineCommand::ComputeCorpusStats {
                    dir: self.config.data_dir.clone(),
                    output_dir: self.config.export_dir.clone(),
                });
                Task::none()
            }
        }
    }

    /// Generator parameters assembled from the current control values.
    ///
    /// One anomaly per enabled kind, spread across the signal so they
    /// never overlap.
    fn generator_params(&self) -> GeneratorParams {
        let kind = self
            .selected_region
            .map(|r| r.preferred_kind())
            .unwrap_or(SignalKind::Art);
        let windows = (self.duration_windows as usize).max(1);
        let duration_s = (windows * 10) as f64;

        let mut anomalies = Vec::new();
        for (i, anomaly_kind) in AnomalyKind::all()
            .into_iter()
            .filter(|k| self.enabled_anomalies.contains(k))
            .enumerate()
        {
            let anomaly_duration = (duration_s * 0.08).clamp(2.0, 30.0);
            let start_s = duration_s * (0.15 + 0.2 * i as f64);
            if start_s + anomaly_duration < duration_s {
                anomalies.push(AnomalySpec {
                    kind: anomaly_kind,
                    start_s,
                    duration_s: anomaly_duration,
                    magnitude: anomaly_kind.default_magnitude(),
                });
            }
        }

        GeneratorParams {
            kind,
            pulse_rate_bpm: self.pulse_rate,
            pulse_pressure: self.pulse_pressure,
            baseline: self.baseline,
            windows,
            noise_std: GeneratorParams::for_kind(kind).noise_std,
            anomalies,
            seed: chrono::Utc::now().timestamp_micros().max(0) as u64,
        }
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let tick =
            iced::time::every(std::time::Duration::from_millis(100)).map(|_| Message::Tick);
        let events = iced::event::listen_with(|event, _status, _window| match event {
            iced::Event::Window(iced::window::Event::Resized(size)) => {
                Some(Message::WindowResized(size.width, size.height))
            }
            iced::Event::Window(iced::window::Event::FileDropped(path)) => {
                Some(Message::FileDropped(path))
            }
            _ => None,
        });
        Subscription::batch([tick, events])
    }

    pub fn view(&'_ self) -> Element<'_, Message> {
        let stacked = self.window_width <= STACKED_LAYOUT_MAX_WIDTH;

        let side_panel = column![self.create_model_section(), self.create_control_panel()]
            .spacing(20)
            .width(if stacked {
                Length::Fill
            } else {
                Length::Fixed(380.0)
            });

        let main_content: Element<'_, Message> = if stacked {
            column![side_panel, self.create_graph_section()]
                .spacing(20)
                .into()
        } else {
            row![side_panel, self.create_graph_section()]
                .spacing(20)
                .into()
        };

        let page = column![
            self.create_header(),
            self.create_import_panel(),
            main_content,
            self.create_footer(),
        ]
        .spacing(20)
        .padding(20);

        scrollable(page).width(Length::Fill).height(Length::Fill).into()
    }

    fn create_header(&self) -> Element<'_, Message> {
        container(
            column![
                text("Arteria").size(32),
                text("Interactive synthesis and analysis of arterial pressure signals").size(16),
            ]
            .spacing(5)
            .align_x(iced::alignment::Horizontal::Center)
            .width(Length::Fill),
        )
        .style(container::bordered_box)
        .padding(20)
        .width(Length::Fill)
        .into()
    }

    fn create_import_panel(&self) -> Element<'_, Message> {
        let input = text_input("Path to a .hdf5 recording", &self.path_input)
            .on_input(Message::PathInputChanged)
            .on_submit(Message::PathSubmitted)
            .padding(10);

        let load_button = button(text("Load"))
            .on_press(Message::PathSubmitted)
            .style(styles::control_button_style())
            .padding(10);

        let scan_button = button(text(if self.scanning {
            "Scanning..."
        } else {
            "Browse corpus"
        }))
        .on_press_maybe((!self.scanning).then_some(Message::ScanCorpus))
        .style(styles::control_button_style())
        .padding(10);

        let (status_message, is_error) = match &self.upload_status {
            UploadStatus::Waiting => ("Waiting for a recording".to_string(), false),
            UploadStatus::Loading(message) => (message.clone(), false),
            UploadStatus::Success(message) => (message.clone(), false),
            UploadStatus::Failed(message) => (message.clone(), true),
        };
        let status_line = text(status_message).size(14).color(styles::status_color(
            is_error,
            matches!(self.upload_status, UploadStatus::Loading(_)),
        ));

        let mut panel = column![
            row![input, load_button, scan_button].spacing(10),
            text("Drop an .hdf5 or .h5 recording anywhere in the window").size(13),
            status_line,
        ]
        .spacing(8);

        if !self.available_recordings.is_empty() {
            let entries = self.available_recordings.iter().map(|path| {
                let label = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string());
                button(text(label).size(13))
                    .on_press(Message::SelectRecording(path.clone()))
                    .style(styles::control_button_style())
                    .padding(6)
                    .into()
            });
            panel = panel.push(
                scrollable(column(entries).spacing(4)).height(Length::Fixed(110.0)),
            );
        }

        container(panel)
            .style(container::bordered_box)
            .padding(15)
            .width(Length::Fill)
            .into()
    }

    fn create_model_section(&self) -> Element<'_, Message> {
        let region_button = |region: BodyRegion| {
            button(text(region.display_name()).size(14))
                .on_press(Message::SelectRegion(region))
                .padding(12)
                .width(Length::Fill)
                .style(styles::body_region_style(
                    region,
                    self.selected_region == Some(region),
                ))
        };

        let figure = column![
            row![
                Space::with_width(Length::FillPortion(1)),
                region_button(BodyRegion::Head).width(Length::FillPortion(2)),
                Space::with_width(Length::FillPortion(1)),
            ]
            .spacing(6),
            row![
                region_button(BodyRegion::LeftArm),
                region_button(BodyRegion::Torso),
                region_button(BodyRegion::RightArm),
            ]
            .spacing(6),
            row![
                region_button(BodyRegion::LeftLeg),
                region_button(BodyRegion::RightLeg),
            ]
            .spacing(6),
        ]
        .spacing(6);

        let selected_name = self
            .selected_region
            .map(|r| r.display_name())
            .unwrap_or("None");
        let signal_name = match &self.active_signal {
            Some(name) => match SignalKind::from_name(name) {
                Some(kind) => format!("{} ({})", name, kind.display_name()),
                None => name.clone(),
            },
            None => "Waiting for selection".to_string(),
        };
        let (status_message, is_error, is_processing) = match &self.processing {
            ProcessingStatus::Ready(message) => (message.clone(), false, false),
            ProcessingStatus::Processing(message) => (message.clone(), false, true),
            ProcessingStatus::Error(message) => (message.clone(), true, false),
        };

        let mut info = column![
            text(format!("Selected region: {}", selected_name)).size(14),
            text(format!("Signal: {}", signal_name)).size(14),
            text(format!("Status: {}", status_message))
                .size(14)
                .color(styles::status_color(is_error, is_processing)),
        ]
        .spacing(4);

        if let Some(loaded) = &self.loaded {
            let summary = &loaded.annotation_summary;
            let annotation_line = if !summary.annotated() {
                format!("'{}': no annotations found", loaded.file_name)
            } else {
                let annotators = summary
                    .annotator_anomalies
                    .iter()
                    .map(|(name, count)| format!("{} ({})", name, count))
                    .collect::<Vec<_>>()
                    .join(", ");
                let consensus = summary
                    .mean_consensus
                    .map(|value| format!(", consensus {:.0}%", value * 100.0))
                    .unwrap_or_default();
                format!(
                    "{} anomalous segments, annotators: {}{}",
                    summary.anomalous_segments, annotators, consensus
                )
            };
            info = info.push(text(annotation_line).size(13));
        }

        container(
            column![text("Body model").size(20), figure, info]
                .spacing(12)
                .width(Length::Fill),
        )
        .style(container::bordered_box)
        .padding(15)
        .width(Length::Fill)
        .into()
    }

    fn create_control_panel(&self) -> Element<'_, Message> {
        fn control<'a>(
            label: String,
            control_slider: iced::widget::Slider<'a, f64, Message>,
        ) -> iced::widget::Column<'a, Message> {
            column![text(label).size(13), control_slider].spacing(4)
        }

        let anomaly_toggles = AnomalyKind::all().into_iter().map(|kind| {
            checkbox(kind.display_name(), self.enabled_anomalies.contains(&kind))
                .on_toggle(move |enabled| Message::ToggleAnomaly(kind, enabled))
                .size(16)
                .into()
        });

        let generate_button = button(text("Generate"))
            .on_press(Message::GenerateRequested)
            .style(styles::primary_button_style())
            .padding(10)
            .width(Length::Fill);

        let export_button = button(text("Export HDF5"))
            .on_press_maybe(
                self.generated
                    .is_some()
                    .then_some(Message::ExportGeneratedRequested),
            )
            .style(styles::control_button_style())
            .padding(10)
            .width(Length::Fill);

        let has_annotations = self
            .loaded
            .as_ref()
            .map(|l| l.annotation_summary.annotated())
            .unwrap_or(false);
        let segments_button = button(text("Export segments"))
            .on_press_maybe(
                (has_annotations && self.active_signal.is_some())
                    .then_some(Message::ExportSegmentsRequested),
            )
            .style(styles::control_button_style())
            .padding(10)
            .width(Length::Fill);

        let stats_button = button(text("Corpus stats"))
            .on_press(Message::CorpusStatsRequested)
            .style(styles::control_button_style())
            .padding(10)
            .width(Length::Fill);

        container(
            column![
                text("Controls").size(20),
                control(
                    format!("Animation speed: {} points/frame", self.playback.points_per_frame()),
                    slider(5.0..=50.0, self.playback.points_per_frame() as f64, Message::PointsPerFrameChanged)
                        .step(5.0),
                ),
                control(
                    format!("Chunk duration: {} s", self.playback.chunk_seconds()),
                    slider(2.0..=10.0, self.playback.chunk_seconds() as f64, Message::ChunkSecondsChanged)
                        .step(1.0),
                ),
                control(
                    format!("Pulse rate: {:.0} bpm", self.pulse_rate),
                    slider(40.0..=180.0, self.pulse_rate, Message::PulseRateChanged).step(1.0),
                ),
                control(
                    format!("Pulse pressure: {:.0} mmHg", self.pulse_pressure),
                    slider(10.0..=80.0, self.pulse_pressure, Message::PulsePressureChanged)
                        .step(1.0),
                ),
                control(
                    format!("Baseline: {:.0} mmHg", self.baseline),
                    slider(5.0..=150.0, self.baseline, Message::BaselineChanged).step(1.0),
                ),
                control(
                    format!("Duration: {:.0} min", self.duration_windows / 6.0),
                    slider(6.0..=90.0, self.duration_windows, Message::DurationWindowsChanged)
                        .step(6.0),
                ),
                text("Anomalies").size(13),
                column(anomaly_toggles).spacing(4),
                row![generate_button, export_button].spacing(8),
                row![segments_button, stats_button].spacing(8),
            ]
            .spacing(10)
            .width(Length::Fill),
        )
        .style(container::bordered_box)
        .padding(15)
        .width(Length::Fill)
        .into()
    }

    fn create_graph_section(&self) -> Element<'_, Message> {
        let playback_button = button(text(if self.playback.is_playing() {
            "Pause"
        } else {
            "Play"
        }))
        .on_press_maybe(self.active_signal.is_some().then_some(Message::TogglePlayback))
        .style(styles::control_button_style())
        .padding(10);

        let reset_button = button(text("Reset"))
            .on_press(Message::ResetRequested)
            .style(styles::danger_button_style())
            .padding(10);

        let header = row![
            text("Signal over time").size(20),
            Space::with_width(Length::Fill),
            playback_button,
            reset_button,
        ]
        .spacing(8);

        let signal_chart = ChartWidget::new(SignalChartType { state: self })
            .width(Length::Fill)
            .height(Length::Fixed(340.0));

        let spectrum_chart = ChartWidget::new(SpectrumChartType { state: self })
            .width(Length::Fill)
            .height(Length::Fixed(240.0));

        let overview_chart = ChartWidget::new(OverviewChartType { state: self })
            .width(Length::Fill)
            .height(Length::Fixed(240.0));

        let mut section = column![
            header,
            signal_chart,
            row![spectrum_chart, overview_chart].spacing(10),
        ]
        .spacing(10);

        if let Some(stats) = &self.generated_stats {
            let line = format!(
                "Generated '{}': mean {:.1}, std {:.1}, range {:.1} - {:.1} mmHg",
                stats.file,
                stats.mean.unwrap_or(f64::NAN),
                stats.std.unwrap_or(f64::NAN),
                stats.min.unwrap_or(f64::NAN),
                stats.max.unwrap_or(f64::NAN),
            );
            section = section.push(text(line).size(13));
        }
        if let Some(similarity) = &self.generated_similarity {
            let line = format!(
                "Against loaded recording: PSD distance {:.4}, DTW distance {:.1}",
                similarity.psd_distance, similarity.dtw_distance
            );
            section = section.push(text(line).size(13));
        }

        container(section.width(Length::Fill))
            .style(container::bordered_box)
            .padding(15)
            .width(Length::Fill)
            .into()
    }

    fn create_footer(&self) -> Element<'_, Message> {
        let about = column![
            text("About").size(16),
            text(
                "Desktop studio for visualizing and synthesizing physiological \
                 pressure signals from annotated HDF5 recordings."
            )
            .size(13),
        ]
        .spacing(5)
        .width(Length::FillPortion(1));

        let features = column![
            text("Features").size(16),
            text("• Drag & drop HDF5 import").size(13),
            text("• Interactive body model").size(13),
            text("• Animated chunked playback").size(13),
            text("• Frequency-domain synthesis with anomaly injection").size(13),
        ]
        .spacing(5)
        .width(Length::FillPortion(1));

        let stack = column![
            text("Technology").size(16),
            text("iced • plotters • HDF5 • rustfft").size(13),
        ]
        .spacing(5)
        .width(Length::FillPortion(1));

        container(
            column![
                row![about, features, stack].spacing(20),
                text("Arteria 0.1.0").size(12),
            ]
            .spacing(10)
            .align_x(iced::alignment::Horizontal::Center)
            .width(Length::Fill),
        )
        .style(container::bordered_box)
        .padding(15)
        .width(Length::Fill)
        .into()
    }
}
