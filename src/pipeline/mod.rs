//! One generation request, start to finish
//!
//! [`Generator::run`] walks the stages of [`GenerationStage`] in order and
//! reports each one before it starts:
//!
//! ```text
//! ParsingUrl ──► Downloading ──► ProcessingImage ──► BuildingModel ──► Saving ──► Completed
//! ```
//!
//! The generator is synchronous. The backend worker owns it and turns the
//! progress callback into channel messages.

use std::path::Path;
use std::time::Instant;

use crate::barcode::{self, CodeSource, HttpCodeSource};
use crate::config::GeneratorConfig;
use crate::error::{KeychainError, Result, ResultExt};
use crate::keychain;
use crate::link::{parse_link, LinkTarget};
use crate::mesh::stl::save_stl;
use crate::models::load_base_model;
use crate::types::{GenerationRequest, GenerationStage, GenerationSummary, SpotifyLink};

/// Message shown when the URL field is empty
pub const MISSING_URL_MESSAGE: &str = "Please enter a Spotify URL";

/// Message shown when no base model is selected
pub const MISSING_MODEL_MESSAGE: &str = "Please select a base model";

/// Runs generation requests against one code source
pub struct Generator {
    config: GeneratorConfig,
    source: Box<dyn CodeSource>,
}

impl Generator {
    pub fn new(config: GeneratorConfig, source: Box<dyn CodeSource>) -> Self {
        Self { config, source }
    }

    /// Generator downloading codes over HTTP
    pub fn with_http(config: GeneratorConfig) -> Result<Self> {
        let source = HttpCodeSource::new(&config)?;
        Ok(Self::new(config, Box::new(source)))
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Replace the settings used by later runs
    pub fn set_config(&mut self, config: GeneratorConfig) -> Result<()> {
        self.source.reconfigure(&config)?;
        self.config = config;
        Ok(())
    }

    /// Name of the code source, for logs
    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Execute a request, calling `on_progress` as each stage begins
    pub fn run(
        &self,
        request: &GenerationRequest,
        on_progress: &mut dyn FnMut(GenerationStage, &str),
    ) -> Result<GenerationSummary> {
        let started = Instant::now();
        let base_model = validate(request)?;
        let config = self.config.for_base_model(base_model);

        on_progress(GenerationStage::ParsingUrl, GenerationStage::ParsingUrl.label());
        let link = self.resolve_link(&request.url)?;
        tracing::info!("Generating keychain for {}", link.uri());

        on_progress(GenerationStage::Downloading, GenerationStage::Downloading.label());
        let bytes = self
            .source
            .fetch(&link)
            .with_context(|| format!("Downloading code for {}", link.uri()))?;

        on_progress(
            GenerationStage::ProcessingImage,
            GenerationStage::ProcessingImage.label(),
        );
        let image = barcode::decode_code_image(&bytes)?;
        let bar_heights = barcode::extract_bar_heights(&image, &config.scan)?;
        tracing::info!("Found {} bars", bar_heights.len());

        on_progress(
            GenerationStage::BuildingModel,
            &format!("Generating 3D model ({} bars)...", bar_heights.len()),
        );
        let base = load_base_model(base_model)?;
        let model = keychain::compose_keychain(&base, &bar_heights, &config.layout)?;

        on_progress(GenerationStage::Saving, GenerationStage::Saving.label());
        ensure_parent_dir(&request.output_path)?;
        save_stl(&model, &request.output_path, config.export.stl_format)
            .with_context(|| format!("Saving {:?}", request.output_path))?;

        let summary = GenerationSummary {
            link,
            output_path: request.output_path.clone(),
            bar_heights,
            triangle_count: model.face_count(),
            elapsed: started.elapsed(),
        };

        tracing::info!(
            "Saved {:?} ({} triangles) in {:.2?}",
            summary.output_path,
            summary.triangle_count,
            summary.elapsed
        );
        on_progress(
            GenerationStage::Completed,
            &format!("Completed: {}", summary.output_file_name()),
        );

        Ok(summary)
    }

    fn resolve_link(&self, url: &str) -> Result<SpotifyLink> {
        match parse_link(url)? {
            LinkTarget::Direct(link) => Ok(link),
            LinkTarget::Short(short) => {
                tracing::debug!("Resolving short link {} via {}", short, self.source.name());
                self.source.resolve(&short)
            }
        }
    }
}

/// Reject requests that cannot start, returning the base model path
fn validate(request: &GenerationRequest) -> Result<&Path> {
    if request.url.trim().is_empty() {
        return Err(KeychainError::Validation(MISSING_URL_MESSAGE.to_string()));
    }
    request
        .base_model
        .as_deref()
        .ok_or_else(|| KeychainError::Validation(MISSING_MODEL_MESSAGE.to_string()))
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Creating output folder {:?}", parent))
        }
        _ => Ok(()),
    }
}
