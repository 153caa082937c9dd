//! Backend Worker Thread Implementation
//!
//! The worker owns the [`Generator`] and handles commands one at a time, so
//! at most one generation runs at once. Requests queued while a job runs are
//! handled after it finishes.
//!
//! Every generation ends with exactly one [`BackendMessage::Completed`] or
//! [`BackendMessage::Failed`]; errors are reported by their display string.

use crate::backend::{BackendCommand, BackendMessage};
use crate::config::GeneratorConfig;
use crate::models::discover_base_models;
use crate::pipeline::Generator;
use crate::types::{GenerationRequest, GenerationStage};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How often the loop checks the running flag while idle
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Worker that processes commands from the UI
pub struct BackendWorker {
    generator: Generator,
    command_rx: Receiver<BackendCommand>,
    message_tx: Sender<BackendMessage>,
    running: Arc<AtomicBool>,
    /// Finished generations since start
    completed: usize,
    /// Failed generations since start
    failed: usize,
}

impl BackendWorker {
    /// Create a new backend worker
    pub fn new(
        generator: Generator,
        command_rx: Receiver<BackendCommand>,
        message_tx: Sender<BackendMessage>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            generator,
            command_rx,
            message_tx,
            running,
            completed: 0,
            failed: 0,
        }
    }

    /// Run the main worker loop
    pub fn run(&mut self) {
        tracing::info!(
            "Backend worker started (code source: {})",
            self.generator.source_name()
        );

        while self.running.load(Ordering::SeqCst) {
            match self.command_rx.recv_timeout(IDLE_POLL) {
                Ok(cmd) => self.handle_command(cmd),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    self.running.store(false, Ordering::SeqCst);
                }
            }
        }

        let _ = self.message_tx.send(BackendMessage::Shutdown);
        tracing::info!(
            "Backend worker stopped ({} completed, {} failed)",
            self.completed,
            self.failed
        );
    }

    /// Handle a single command
    fn handle_command(&mut self, cmd: BackendCommand) {
        match cmd {
            BackendCommand::Generate(request) => {
                self.generate(&request);
            }
            BackendCommand::RefreshModels(dir) => {
                self.refresh_models(&dir);
            }
            BackendCommand::UpdateConfig(config) => {
                self.update_config(config);
            }
            BackendCommand::Shutdown => {
                self.running.store(false, Ordering::SeqCst);
            }
        }
    }

    fn generate(&mut self, request: &GenerationRequest) {
        let message_tx = self.message_tx.clone();
        let mut on_progress = |stage: GenerationStage, message: &str| {
            tracing::info!("{}", message);
            let progress = BackendMessage::Progress {
                stage,
                message: message.to_string(),
            };
            if message_tx.try_send(progress).is_err() {
                tracing::debug!("Progress message dropped (queue full)");
            }
        };

        match self.generator.run(request, &mut on_progress) {
            Ok(summary) => {
                self.completed += 1;
                let _ = self.message_tx.send(BackendMessage::Completed(summary));
            }
            Err(e) => {
                self.failed += 1;
                tracing::error!("Generation failed: {}", e);
                let _ = self.message_tx.send(BackendMessage::Failed(e.to_string()));
            }
        }
    }

    fn refresh_models(&self, dir: &Path) {
        let result = discover_base_models(dir).map_err(|e| {
            tracing::warn!("Base model scan failed: {}", e);
            e.to_string()
        });
        let _ = self.message_tx.send(BackendMessage::ModelList(result));
    }

    fn update_config(&mut self, config: GeneratorConfig) {
        match self.generator.set_config(config) {
            Ok(()) => tracing::info!("Generator settings updated"),
            Err(e) => {
                tracing::error!("Failed to apply generator settings: {}", e);
                let _ = self
                    .message_tx
                    .send(BackendMessage::ConfigRejected(e.to_string()));
            }
        }
    }
}
