//! Backend module for keychain generation
//!
//! Downloads, CAD import and STL export are slow, so they run on a worker
//! thread to keep the UI responsive. The UI and the worker talk through
//! crossbeam channels.
//!
//! # Architecture
//!
//! - [`BackendCommand`] - Messages sent from UI to backend (generate, refresh, ...)
//! - [`BackendMessage`] - Messages sent from backend to UI (progress, results)
//! - [`FrontendReceiver`] - UI-side handle for sending commands and receiving messages
//! - [`GeneratorBackend`] - Backend entry point that runs the worker loop
//!
//! # Example
//!
//! ```ignore
//! use spotify_keychain::backend::{BackendMessage, GeneratorBackend};
//! use spotify_keychain::config::GeneratorConfig;
//!
//! let (backend, frontend) = GeneratorBackend::new(GeneratorConfig::default())?;
//! std::thread::spawn(move || backend.run());
//!
//! frontend.generate(request);
//! for msg in frontend.drain() {
//!     if let BackendMessage::Progress { stage, message } = msg {
//!         println!("{:.0}% {}", stage.progress() * 100.0, message);
//!     }
//! }
//! ```

pub mod worker;

pub use worker::BackendWorker;

use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::models::BaseModel;
use crate::pipeline::Generator;
use crate::types::{GenerationRequest, GenerationStage, GenerationSummary};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

/// Message sent from the UI to the backend
#[derive(Debug, Clone)]
pub enum BackendCommand {
    /// Run one generation request
    Generate(GenerationRequest),
    /// Rescan a base model folder
    RefreshModels(PathBuf),
    /// Replace the generator settings
    UpdateConfig(GeneratorConfig),
    /// Shutdown the backend
    Shutdown,
}

/// Message sent from the backend to the UI
#[derive(Debug, Clone)]
pub enum BackendMessage {
    /// A generation stage started
    Progress {
        stage: GenerationStage,
        message: String,
    },
    /// The model was written
    Completed(GenerationSummary),
    /// The request failed; carries the user-facing message
    Failed(String),
    /// New settings were refused; the previous ones stay active
    ConfigRejected(String),
    /// Result of a base model scan
    ModelList(std::result::Result<Vec<BaseModel>, String>),
    /// Backend is shutting down
    Shutdown,
}

/// Frontend receiver for backend messages
pub struct FrontendReceiver {
    /// Receiver for backend messages
    pub receiver: Receiver<BackendMessage>,
    /// Sender for commands to the backend
    pub command_sender: Sender<BackendCommand>,
}

impl FrontendReceiver {
    /// Try to receive a message without blocking
    pub fn try_recv(&self) -> Option<BackendMessage> {
        self.receiver.try_recv().ok()
    }

    /// Wait up to `timeout` for the next message
    pub fn recv_timeout(&self, timeout: Duration) -> Option<BackendMessage> {
        match self.receiver.recv_timeout(timeout) {
            Ok(msg) => Some(msg),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Receive all pending messages
    pub fn drain(&self) -> Vec<BackendMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.receiver.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Send a command to the backend
    pub fn send_command(&self, cmd: BackendCommand) -> bool {
        self.command_sender.send(cmd).is_ok()
    }

    /// Queue a generation request
    pub fn generate(&self, request: GenerationRequest) -> bool {
        self.send_command(BackendCommand::Generate(request))
    }

    /// Request a base model scan
    pub fn refresh_models(&self, dir: PathBuf) {
        let _ = self.command_sender.send(BackendCommand::RefreshModels(dir));
    }

    /// Push new generator settings
    pub fn update_config(&self, config: GeneratorConfig) {
        let _ = self.command_sender.send(BackendCommand::UpdateConfig(config));
    }

    /// Request shutdown
    pub fn shutdown(&self) {
        let _ = self.command_sender.send(BackendCommand::Shutdown);
    }
}

/// The generator backend that runs in a separate thread
pub struct GeneratorBackend {
    generator: Generator,
    /// Receiver for commands from the UI
    command_receiver: Receiver<BackendCommand>,
    /// Sender for messages to the UI
    message_sender: Sender<BackendMessage>,
    /// Running flag
    running: Arc<AtomicBool>,
}

impl GeneratorBackend {
    /// Create a backend that downloads codes over HTTP
    pub fn new(config: GeneratorConfig) -> Result<(Self, FrontendReceiver)> {
        Ok(Self::with_generator(Generator::with_http(config)?))
    }

    /// Create a backend around an existing generator
    pub fn with_generator(generator: Generator) -> (Self, FrontendReceiver) {
        let (cmd_tx, cmd_rx) = bounded(64);
        // Progress is a handful of messages per job; the UI drains every frame.
        let (msg_tx, msg_rx) = bounded(256);

        let backend = Self {
            generator,
            command_receiver: cmd_rx,
            message_sender: msg_tx,
            running: Arc::new(AtomicBool::new(true)),
        };

        let frontend = FrontendReceiver {
            receiver: msg_rx,
            command_sender: cmd_tx,
        };

        (backend, frontend)
    }

    /// Run the backend loop
    pub fn run(self) {
        let mut worker = BackendWorker::new(
            self.generator,
            self.command_receiver,
            self.message_sender,
            self.running,
        );
        worker.run();
    }

    /// Get a handle to stop the backend
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }
}
