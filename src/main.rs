// Hide console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod annotate;
mod app;
mod body;
mod charts;
mod config;
mod corpus;
mod engine;
mod error;
mod generator;
mod metrics;
mod playback;
mod stats;
mod store;
mod ui;
mod visualization;

use app::Arteria;
use engine::{Engine, EngineUpdate};
use iced::Theme;
use std::sync::mpsc;

fn main() -> iced::Result {
    // On Windows, force wgpu to use Vulkan backend instead of DirectX 12
    // This prevents "INVALID_SUBRESOURCE_STATE" errors with D3D12 resource state transitions
    #[cfg(target_os = "windows")]
    std::env::set_var("WGPU_BACKEND", "vulkan");

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Create a channel for communication between the engine thread and the UI thread
    let (sender, receiver) = mpsc::channel::<EngineUpdate>();

    // Create the engine that owns all blocking corpus/synthesis work
    let (engine, command_sender) = Engine::new(sender);

    // Spawn a thread to process engine commands
    std::thread::spawn(move || {
        engine.run();
    });

    iced::application(
        "Arteria: Arterial Pressure Signal Studio",
        Arteria::update,
        Arteria::view,
    )
    .subscription(Arteria::subscription)
    .theme(|_| Theme::Light)
    .window_size((1280.0, 860.0))
    .run_with(|| Arteria::new(receiver, command_sender))
}
