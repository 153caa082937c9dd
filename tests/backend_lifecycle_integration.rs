//! Integration tests for backend lifecycle
//!
//! These tests validate the complete backend workflow:
//! - Thread start and shutdown
//! - Generation jobs with progress reporting
//! - Base model scans and settings updates

mod common;

use common::{code_png, track_url, write_plate};
use spotify_keychain::backend::{BackendMessage, FrontendReceiver, GeneratorBackend};
use spotify_keychain::barcode::StaticCodeSource;
use spotify_keychain::config::GeneratorConfig;
use spotify_keychain::mesh::stl::load_stl;
use spotify_keychain::types::{GenerationRequest, GenerationStage};
use spotify_keychain::Generator;
use std::sync::atomic::Ordering;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const JOB_TIMEOUT: Duration = Duration::from_secs(10);

fn spawn_offline_backend(code: Vec<u8>) -> (JoinHandle<()>, FrontendReceiver) {
    let generator = Generator::new(
        GeneratorConfig::default(),
        Box::new(StaticCodeSource::new(code)),
    );
    let (backend, frontend) = GeneratorBackend::with_generator(generator);
    (thread::spawn(move || backend.run()), frontend)
}

/// Collect messages until a job finishes
fn wait_for_job(frontend: &FrontendReceiver) -> Vec<BackendMessage> {
    let mut messages = Vec::new();
    while let Some(msg) = frontend.recv_timeout(JOB_TIMEOUT) {
        let done = matches!(msg, BackendMessage::Completed(_) | BackendMessage::Failed(_));
        messages.push(msg);
        if done {
            break;
        }
    }
    messages
}

#[test]
fn test_backend_creation_and_shutdown() {
    let (handle, frontend) = spawn_offline_backend(Vec::new());

    // Give it a moment to initialize
    thread::sleep(common::test_timeout());

    frontend.shutdown();

    let result = handle.join();
    assert!(result.is_ok(), "Backend thread should exit cleanly");

    let last = frontend.drain().pop();
    assert!(matches!(last, Some(BackendMessage::Shutdown)));
}

#[test]
fn test_stop_handle_ends_idle_loop() {
    let generator = Generator::new(
        GeneratorConfig::default(),
        Box::new(StaticCodeSource::new(Vec::new())),
    );
    let (backend, frontend) = GeneratorBackend::with_generator(generator);
    let stop = backend.stop_handle();
    let handle = thread::spawn(move || backend.run());

    stop.store(false, Ordering::SeqCst);
    handle.join().unwrap();

    assert!(matches!(
        frontend.recv_timeout(JOB_TIMEOUT),
        Some(BackendMessage::Shutdown)
    ));
}

#[test]
fn test_generation_job_reports_progress_then_completes() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_plate(dir.path(), "plate.stl");
    let output = dir.path().join("model.stl");

    let (handle, frontend) = spawn_offline_backend(code_png());
    assert!(frontend.generate(GenerationRequest::new(
        track_url(),
        Some(base),
        output.clone()
    )));

    let messages = wait_for_job(&frontend);
    let stages: Vec<GenerationStage> = messages
        .iter()
        .filter_map(|msg| match msg {
            BackendMessage::Progress { stage, .. } => Some(*stage),
            _ => None,
        })
        .collect();

    assert_eq!(stages.first(), Some(&GenerationStage::ParsingUrl));
    assert_eq!(stages.last(), Some(&GenerationStage::Completed));
    assert!(stages.windows(2).all(|w| w[0] < w[1]));

    match messages.last() {
        Some(BackendMessage::Completed(summary)) => {
            assert_eq!(summary.bar_count(), 23);
            assert!(output.is_file());
        }
        other => panic!("Expected completion, got {:?}", other),
    }

    frontend.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_failed_job_keeps_backend_alive() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_plate(dir.path(), "plate.stl");

    let (handle, frontend) = spawn_offline_backend(code_png());

    frontend.generate(GenerationRequest::new(
        "https://example.com/not-spotify",
        Some(base.clone()),
        dir.path().join("bad.stl"),
    ));
    let first = wait_for_job(&frontend);
    assert!(matches!(first.last(), Some(BackendMessage::Failed(e)) if e.contains("Invalid Spotify link")));

    frontend.generate(GenerationRequest::new(
        track_url(),
        Some(base),
        dir.path().join("good.stl"),
    ));
    let second = wait_for_job(&frontend);
    assert!(matches!(second.last(), Some(BackendMessage::Completed(_))));

    frontend.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_refresh_models_lists_folder() {
    let dir = tempfile::tempdir().unwrap();
    write_plate(dir.path(), "b_plate.stl");
    write_plate(dir.path(), "A_plate.stl");
    std::fs::write(dir.path().join("notes.txt"), "not a model").unwrap();

    let (handle, frontend) = spawn_offline_backend(Vec::new());
    frontend.refresh_models(dir.path().to_path_buf());

    match frontend.recv_timeout(JOB_TIMEOUT) {
        Some(BackendMessage::ModelList(Ok(models))) => {
            let names: Vec<_> = models.iter().map(|m| m.name.as_str()).collect();
            assert_eq!(names, vec!["A_plate.stl", "b_plate.stl"]);
        }
        other => panic!("Expected model list, got {:?}", other),
    }

    frontend.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_updated_settings_apply_to_next_job() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_plate(dir.path(), "plate.stl");
    let output = dir.path().join("deep.stl");

    let (handle, frontend) = spawn_offline_backend(code_png());

    let mut config = GeneratorConfig::default();
    config.layout.depth = 6.0;
    frontend.update_config(config);
    frontend.generate(GenerationRequest::new(track_url(), Some(base), output.clone()));

    let messages = wait_for_job(&frontend);
    assert!(matches!(messages.last(), Some(BackendMessage::Completed(_))));

    let bounds = load_stl(&output).unwrap().bounds().unwrap();
    common::assert_float_eq(bounds.max.z, 6.0, 1e-4);

    frontend.shutdown();
    handle.join().unwrap();
}
