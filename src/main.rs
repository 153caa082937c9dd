//! Spotify Keychain Generator - Main Entry Point
//!
//! Starts the generator backend on its own thread and opens the window.

use spotify_keychain::{
    backend::GeneratorBackend,
    config::{self, AppState, GeneratorConfig},
    frontend::KeychainApp,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "spotify-keychain.log";

/// Log to stderr and, when the data directory is usable, to a daily file
fn init_logging() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,spotify_keychain=debug"));

    let file = config::log_dir().and_then(|dir| match std::fs::create_dir_all(&dir) {
        Ok(()) => Some(tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX)),
        Err(e) => {
            eprintln!("Could not create log directory {:?}: {}", dir, e);
            None
        }
    });

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    match file {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    }
}

fn main() -> eframe::Result<()> {
    let _log_guard = init_logging();

    tracing::info!("Starting Spotify Keychain Generator");

    // Load application state (last inputs, recent generations, preferences)
    let mut app_state = AppState::load_or_default();
    app_state.cleanup_missing_generations();

    let config = GeneratorConfig::load_or_default();

    let (backend, frontend_receiver) = match GeneratorBackend::new(config.clone()) {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!("Failed to start generator backend: {}", e);
            std::process::exit(1);
        }
    };

    let stop = backend.stop_handle();
    let backend_handle = std::thread::Builder::new()
        .name("generator".to_string())
        .spawn(move || backend.run());
    let backend_handle = match backend_handle {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!("Failed to spawn generator thread: {}", e);
            std::process::exit(1);
        }
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([600.0, 400.0])
            .with_min_inner_size([480.0, 320.0])
            .with_title("Spotify Keychain Generator"),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Spotify Keychain Generator",
        native_options,
        Box::new(|cc| {
            let mut style = (*cc.egui_ctx.style()).clone();
            style.visuals.window_shadow.offset = [0, 0];
            cc.egui_ctx.set_style(style);

            Ok(Box::new(KeychainApp::new(
                cc,
                frontend_receiver,
                config,
                app_state,
            )))
        }),
    );

    // Signal the backend to stop and wait for the current job to finish
    tracing::info!("Shutting down...");
    stop.store(false, std::sync::atomic::Ordering::SeqCst);
    if backend_handle.join().is_err() {
        tracing::warn!("Generator thread panicked");
    }

    result
}
