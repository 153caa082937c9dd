//! Core data types for the keychain generator
//!
//! # Main Types
//!
//! - [`EntityKind`] - The kind of Spotify entity a link points at
//! - [`SpotifyLink`] - A (kind, id) pair identifying one entity
//! - [`GenerationRequest`] - Everything one generation run needs from the UI
//! - [`GenerationStage`] - Pipeline stages with their progress fraction
//! - [`GenerationSummary`] - What a successful run produced

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Kind of Spotify entity that a code can be generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Track,
    Album,
    Playlist,
    Artist,
    Episode,
    Show,
    User,
}

impl EntityKind {
    /// Path segment / URI component used by Spotify
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Track => "track",
            EntityKind::Album => "album",
            EntityKind::Playlist => "playlist",
            EntityKind::Artist => "artist",
            EntityKind::Episode => "episode",
            EntityKind::Show => "show",
            EntityKind::User => "user",
        }
    }

    /// Get all entity kinds
    pub fn all() -> &'static [EntityKind] {
        &[
            EntityKind::Track,
            EntityKind::Album,
            EntityKind::Playlist,
            EntityKind::Artist,
            EntityKind::Episode,
            EntityKind::Show,
            EntityKind::User,
        ]
    }

    /// Whether ids of this kind are 22-character base62 catalog ids
    pub fn has_catalog_id(&self) -> bool {
        !matches!(self, EntityKind::User)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

/// Identifier pair of a Spotify entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpotifyLink {
    pub kind: EntityKind,
    pub id: String,
}

impl SpotifyLink {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// The `spotify:<kind>:<id>` URI form
    pub fn uri(&self) -> String {
        format!("spotify:{}:{}", self.kind, self.id)
    }

    /// Canonical web URL for this entity
    pub fn web_url(&self) -> String {
        format!("https://open.spotify.com/{}/{}", self.kind, self.id)
    }
}

impl fmt::Display for SpotifyLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri())
    }
}

/// A single generation request submitted by the UI
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Raw text from the URL field
    pub url: String,
    /// Base model to extrude the relief onto
    pub base_model: Option<PathBuf>,
    /// Destination STL file
    pub output_path: PathBuf,
}

impl GenerationRequest {
    pub fn new(
        url: impl Into<String>,
        base_model: Option<PathBuf>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            url: url.into(),
            base_model,
            output_path: output_path.into(),
        }
    }
}

/// Stages of the generation pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GenerationStage {
    ParsingUrl,
    Downloading,
    ProcessingImage,
    BuildingModel,
    Saving,
    Completed,
}

impl GenerationStage {
    /// Progress fraction shown when this stage begins
    pub fn progress(&self) -> f32 {
        match self {
            GenerationStage::ParsingUrl => 0.1,
            GenerationStage::Downloading => 0.3,
            GenerationStage::ProcessingImage => 0.5,
            GenerationStage::BuildingModel => 0.7,
            GenerationStage::Saving => 0.9,
            GenerationStage::Completed => 1.0,
        }
    }

    /// Default status line for this stage
    pub fn label(&self) -> &'static str {
        match self {
            GenerationStage::ParsingUrl => "Parsing URL...",
            GenerationStage::Downloading => "Downloading Spotify code...",
            GenerationStage::ProcessingImage => "Processing image...",
            GenerationStage::BuildingModel => "Generating 3D model...",
            GenerationStage::Saving => "Saving STL file...",
            GenerationStage::Completed => "Completed",
        }
    }
}

/// Result of a successful generation run
#[derive(Debug, Clone)]
pub struct GenerationSummary {
    pub link: SpotifyLink,
    pub output_path: PathBuf,
    pub bar_heights: Vec<f64>,
    pub triangle_count: usize,
    pub elapsed: Duration,
}

impl GenerationSummary {
    pub fn bar_count(&self) -> usize {
        self.bar_heights.len()
    }

    /// File name of the exported model, for status lines
    pub fn output_file_name(&self) -> String {
        self.output_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.output_path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_round_trip() {
        for kind in EntityKind::all() {
            assert_eq!(kind.as_str().parse::<EntityKind>(), Ok(*kind));
        }
        assert_eq!("TRACK".parse::<EntityKind>(), Ok(EntityKind::Track));
        assert!("podcast".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_link_uri() {
        let link = SpotifyLink::new(EntityKind::Track, "4cOdK2wGLETKBW3PvgPWqT");
        assert_eq!(link.uri(), "spotify:track:4cOdK2wGLETKBW3PvgPWqT");
        assert_eq!(
            link.web_url(),
            "https://open.spotify.com/track/4cOdK2wGLETKBW3PvgPWqT"
        );
    }

    #[test]
    fn test_stage_progress_is_monotonic() {
        let stages = [
            GenerationStage::ParsingUrl,
            GenerationStage::Downloading,
            GenerationStage::ProcessingImage,
            GenerationStage::BuildingModel,
            GenerationStage::Saving,
            GenerationStage::Completed,
        ];
        for pair in stages.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].progress() < pair[1].progress());
        }
    }

    #[test]
    fn test_summary_file_name() {
        let summary = GenerationSummary {
            link: SpotifyLink::new(EntityKind::Album, "1DFixLWuPkv3KT3TnV35m3"),
            output_path: PathBuf::from("/tmp/out/model.stl"),
            bar_heights: vec![1.0, 2.0],
            triangle_count: 12,
            elapsed: Duration::from_millis(5),
        };
        assert_eq!(summary.output_file_name(), "model.stl");
        assert_eq!(summary.bar_count(), 2);
    }
}
