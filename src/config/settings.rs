//! Generator settings
//!
//! Everything that shapes a generated keychain: which code image is
//! requested, how its bars are scanned, and where the relief sits on the base
//! model. Settings are stored as TOML so they can be edited by hand.
//!
//! # Main Types
//!
//! - [`GeneratorConfig`] - Top-level settings persisted in `generator.toml`
//! - [`CodeStyle`] - Appearance of the requested code image
//! - [`ScanSettings`] - Crop region and thresholds for bar extraction
//! - [`ReliefLayout`] - Placement and size of the extruded bars
//! - [`NetworkSettings`] - HTTP client behavior
//! - [`ExportSettings`] - Output file format
//!
//! # Per-model layouts
//!
//! A base model may ship with a sibling `<stem>.toml` holding a partial
//! [`ReliefLayout`]. Keys it sets replace the defaults; everything else falls
//! back to the global layout.

use crate::error::{KeychainError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Generator settings filename inside the app data directory
pub const GENERATOR_CONFIG_FILE: &str = "generator.toml";

/// Service that renders Spotify codes
pub const DEFAULT_CODE_ENDPOINT: &str = "https://www.spotifycodes.com/downloadCode.php";

/// Default HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Top-level generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Code rendering endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub style: CodeStyle,

    #[serde(default)]
    pub scan: ScanSettings,

    #[serde(default)]
    pub layout: ReliefLayout,

    #[serde(default)]
    pub network: NetworkSettings,

    #[serde(default)]
    pub export: ExportSettings,
}

fn default_endpoint() -> String {
    DEFAULT_CODE_ENDPOINT.to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            style: CodeStyle::default(),
            scan: ScanSettings::default(),
            layout: ReliefLayout::default(),
            network: NetworkSettings::default(),
            export: ExportSettings::default(),
        }
    }
}

impl GeneratorConfig {
    /// Parse settings from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| KeychainError::Config(format!("Failed to parse generator config: {}", e)))
    }

    /// Serialize settings to TOML text
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| {
            KeychainError::Config(format!("Failed to serialize generator config: {}", e))
        })
    }

    /// Load settings from a TOML file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            KeychainError::Config(format!("Failed to read generator config {:?}: {}", path, e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Save settings to a TOML file, creating parent directories
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                KeychainError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }
        std::fs::write(path, self.to_toml_string()?).map_err(|e| {
            KeychainError::Config(format!("Failed to write generator config {:?}: {}", path, e))
        })
    }

    /// Load settings from the app data directory
    pub fn load() -> Result<Self> {
        let path = generator_config_path().ok_or_else(|| {
            KeychainError::Config("Could not determine generator config path".to_string())
        })?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(path)
    }

    /// Load settings, returning defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load generator config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save settings to the app data directory
    pub fn save(&self) -> Result<()> {
        let dir = super::ensure_app_data_dir()?;
        self.save_to(dir.join(GENERATOR_CONFIG_FILE))
    }

    /// Settings for one base model, applying its sibling layout file if present
    pub fn for_base_model(&self, model_path: &Path) -> Self {
        let mut config = self.clone();
        let override_path = layout_override_path(model_path);
        if !override_path.exists() {
            return config;
        }

        match std::fs::read_to_string(&override_path)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                toml::from_str::<ReliefLayoutOverride>(&content).map_err(|e| e.to_string())
            }) {
            Ok(layout) => {
                tracing::info!("Applying layout override from {:?}", override_path);
                config.layout = layout.apply(&self.layout);
            }
            Err(e) => {
                tracing::warn!("Ignoring layout override {:?}: {}", override_path, e);
            }
        }
        config
    }
}

/// Path to the generator settings file
pub fn generator_config_path() -> Option<PathBuf> {
    super::app_data_dir().map(|p| p.join(GENERATOR_CONFIG_FILE))
}

/// Sibling layout file for a base model (`keychain.step` -> `keychain.toml`)
pub fn layout_override_path(model_path: &Path) -> PathBuf {
    model_path.with_extension("toml")
}

// ==================== Code Style ====================

/// Appearance of the code image requested from the rendering service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeStyle {
    /// Image format (`jpeg`, `png`)
    #[serde(default = "default_format")]
    pub format: String,

    /// Background colour as six hex digits
    #[serde(default = "default_background")]
    pub background: String,

    /// Bar colour (`white` or `black`)
    #[serde(default = "default_bar_color")]
    pub bar_color: String,

    /// Image width in pixels
    #[serde(default = "default_size")]
    pub size: u32,
}

fn default_format() -> String {
    "jpeg".to_string()
}

fn default_background() -> String {
    "000000".to_string()
}

fn default_bar_color() -> String {
    "white".to_string()
}

fn default_size() -> u32 {
    640
}

impl Default for CodeStyle {
    fn default() -> Self {
        Self {
            format: default_format(),
            background: default_background(),
            bar_color: default_bar_color(),
            size: default_size(),
        }
    }
}

// ==================== Scan Settings ====================

/// Rectangle in image pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Scale every coordinate by `factor`, rounding to whole pixels
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |v: u32| (f64::from(v) * factor).round() as u32;
        Self {
            x: scale(self.x),
            y: scale(self.y),
            width: scale(self.width),
            height: scale(self.height),
        }
    }
}

/// Parameters of the bar-height scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Region holding the bars, measured at `reference_width`
    #[serde(default = "default_crop")]
    pub crop: CropRect,

    /// A pixel is lit when any RGB channel exceeds this value
    #[serde(default = "default_threshold")]
    pub threshold: u8,

    /// Pixels per height unit at `reference_width`
    #[serde(default = "default_scale_divisor")]
    pub scale_divisor: f64,

    /// Image width the crop and divisor were measured at
    #[serde(default = "default_reference_width")]
    pub reference_width: u32,
}

fn default_crop() -> CropRect {
    // Skips the logo on the left and the margin on the right of a 640px code.
    CropRect::new(160, 0, 640 - 31 - 160, 160)
}

fn default_threshold() -> u8 {
    20
}

fn default_scale_divisor() -> f64 {
    20.0
}

fn default_reference_width() -> u32 {
    640
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            crop: default_crop(),
            threshold: default_threshold(),
            scale_divisor: default_scale_divisor(),
            reference_width: default_reference_width(),
        }
    }
}

// ==================== Relief Layout ====================

/// Placement of the relief bars on the base model, in millimetres
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReliefLayout {
    /// X of the first bar's centre
    pub origin_x: f64,
    /// Y of every bar's centre
    pub origin_y: f64,
    /// Distance between neighbouring bar centres
    pub pitch: f64,
    /// Slot length per unit of bar height
    pub length_per_unit: f64,
    /// Slot width (arc diameter)
    pub slot_width: f64,
    /// Extrusion depth
    pub depth: f64,
    /// Plane the extrusion starts from
    pub base_z: f64,
    /// Segments per semicircular slot end
    pub arc_segments: usize,
}

impl Default for ReliefLayout {
    fn default() -> Self {
        Self {
            origin_x: 15.5,
            origin_y: 7.5,
            pitch: 1.88,
            length_per_unit: 9.0 / 5.0,
            slot_width: 1.0,
            depth: 4.0,
            base_z: 0.0,
            arc_segments: 16,
        }
    }
}

impl ReliefLayout {
    /// Centre of bar `index`
    pub fn bar_center(&self, index: usize) -> (f64, f64) {
        (self.origin_x + index as f64 * self.pitch, self.origin_y)
    }

    /// Slot length for a bar of the given height
    pub fn bar_length(&self, height: f64) -> f64 {
        self.length_per_unit * height
    }
}

/// Partial layout read from a per-model override file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReliefLayoutOverride {
    pub origin_x: Option<f64>,
    pub origin_y: Option<f64>,
    pub pitch: Option<f64>,
    pub length_per_unit: Option<f64>,
    pub slot_width: Option<f64>,
    pub depth: Option<f64>,
    pub base_z: Option<f64>,
    pub arc_segments: Option<usize>,
}

impl ReliefLayoutOverride {
    /// Merge onto a base layout
    pub fn apply(&self, base: &ReliefLayout) -> ReliefLayout {
        ReliefLayout {
            origin_x: self.origin_x.unwrap_or(base.origin_x),
            origin_y: self.origin_y.unwrap_or(base.origin_y),
            pitch: self.pitch.unwrap_or(base.pitch),
            length_per_unit: self.length_per_unit.unwrap_or(base.length_per_unit),
            slot_width: self.slot_width.unwrap_or(base.slot_width),
            depth: self.depth.unwrap_or(base.depth),
            base_z: self.base_z.unwrap_or(base.base_z),
            arc_segments: self.arc_segments.unwrap_or(base.arc_segments),
        }
    }
}

// ==================== Network / Export ====================

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    format!("spotify-keychain/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        }
    }
}

/// STL encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StlFormat {
    /// Compact little-endian encoding
    #[default]
    Binary,
    /// Human readable text
    Ascii,
}

impl std::fmt::Display for StlFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StlFormat::Binary => write!(f, "Binary"),
            StlFormat::Ascii => write!(f, "ASCII"),
        }
    }
}

/// Output settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ExportSettings {
    #[serde(default)]
    pub stl_format: StlFormat,
}
