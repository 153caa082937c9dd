//! Error handling for the keychain generator
//!
//! This module defines the error type shared by every stage of the
//! generation pipeline and a Result alias for use throughout the crate.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for keychain generation
#[derive(Error, Debug)]
pub enum KeychainError {
    /// The input could not be understood as a Spotify link
    #[error("Invalid Spotify link: {0}")]
    InvalidLink(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The code service answered with a non-success status
    #[error("Failed to download Spotify code (HTTP {status})")]
    Download { status: u16 },

    /// The downloaded bytes were not a decodable image
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// The scan found no bars in the code image
    #[error("No bars found in the Spotify code image")]
    NoBarsFound,

    /// The crop rectangle does not fit inside the image
    #[error("Crop region {width}x{height} at ({x}, {y}) exceeds image bounds")]
    CropOutOfBounds { x: u32, y: u32, width: u32, height: u32 },

    /// Errors while reading or writing mesh files
    #[error("Mesh error: {0}")]
    Mesh(String),

    /// The selected base model does not exist
    #[error("Base model not found: {}", path.display())]
    BaseModelNotFound { path: PathBuf },

    /// The base model has an extension we cannot load
    #[error("Unsupported base model format: .{extension}")]
    UnsupportedFormat { extension: String },

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// A request was rejected before any work started
    #[error("{0}")]
    Validation(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<KeychainError>,
    },
}

impl KeychainError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        KeychainError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a mesh error from any displayable cause
    pub fn mesh(message: impl Into<String>) -> Self {
        KeychainError::Mesh(message.into())
    }
}

/// Result type alias for keychain operations
pub type Result<T> = std::result::Result<T, KeychainError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| KeychainError::Io(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| KeychainError::Io(e).with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KeychainError::InvalidLink("not a url".to_string());
        assert_eq!(err.to_string(), "Invalid Spotify link: not a url");
    }

    #[test]
    fn test_error_with_context() {
        let err = KeychainError::NoBarsFound;
        let with_ctx = err.with_context("Processing image");
        assert!(with_ctx.to_string().starts_with("Processing image: "));
        assert!(with_ctx.to_string().contains("No bars found"));
    }

    #[test]
    fn test_download_error_shows_status() {
        let err = KeychainError::Download { status: 404 };
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_io_result_context() {
        let res: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = res.context("Saving STL").unwrap_err();
        assert!(err.to_string().contains("Saving STL"));
        assert!(err.to_string().contains("missing"));
    }
}
