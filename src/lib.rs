//! # Spotify Keychain Generator
//!
//! Turns a Spotify share link into a 3D-printable keychain: the Spotify Code
//! for the link is downloaded as an image, its bar heights are measured and
//! each bar is extruded as a rounded slot onto a base model, which is then
//! exported as STL.
//!
//! ## Architecture
//!
//! - **Backend**: Runs generation jobs on a worker thread
//! - **Frontend**: Renders the form using eframe/egui
//! - **Pipeline**: Link parsing, code download, bar scan, relief and export
//! - **Communication**: Crossbeam channels for thread-safe job and progress messages
//!
//! ## Configuration
//!
//! Application state (last inputs, recent generations, preferences) and the
//! generator settings are stored in the platform-appropriate data directory
//! under `spotify-keychain`:
//!
//! - **Linux**: `~/.local/share/spotify-keychain/`
//! - **macOS**: `~/Library/Application Support/spotify-keychain/`
//! - **Windows**: `%APPDATA%\spotify-keychain\`
//!
//! ## Example
//!
//! ```ignore
//! use spotify_keychain::{
//!     config::GeneratorConfig,
//!     pipeline::Generator,
//!     types::GenerationRequest,
//! };
//!
//! fn main() -> spotify_keychain::Result<()> {
//!     let generator = Generator::with_http(GeneratorConfig::load_or_default())?;
//!     let request = GenerationRequest::new(
//!         "https://open.spotify.com/track/4cOdK2wGLETKBW3PvgPWqT",
//!         Some("base_models/keychain.stl".into()),
//!         "model.stl",
//!     );
//!
//!     let summary = generator.run(&request, &mut |stage, message| {
//!         println!("[{:>3.0}%] {}", stage.progress() * 100.0, message);
//!     })?;
//!     println!("{} bars written to {}", summary.bar_count(), summary.output_path.display());
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod backend;
pub mod barcode;
pub mod config;
pub mod error;
pub mod frontend;
pub mod keychain;
pub mod link;
pub mod mesh;
pub mod models;
pub mod pipeline;
pub mod types;

// Re-export commonly used types
pub use app::KeychainApp;
pub use backend::{BackendCommand, BackendMessage, FrontendReceiver, GeneratorBackend};
pub use barcode::{CodeSource, HttpCodeSource, StaticCodeSource};
pub use config::{AppState, GeneratorConfig};
pub use error::{KeychainError, Result};
pub use mesh::IndexedMesh;
pub use models::{BaseModel, ModelFormat};
pub use pipeline::Generator;
pub use types::{GenerationRequest, GenerationStage, GenerationSummary, SpotifyLink};
