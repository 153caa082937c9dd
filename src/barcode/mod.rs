//! Spotify Code download and decoding
//!
//! A Spotify Code is rendered by a public web service as an image: the
//! Spotify logo on the left followed by vertical bars of varying height. This
//! module builds the request URL, fetches the image through a [`CodeSource`],
//! and decodes it. Bar extraction lives in [`scan`].
//!
//! # Sources
//!
//! - [`HttpCodeSource`] - Blocking `reqwest` client against the code service
//! - [`StaticCodeSource`] - Serves fixed bytes (offline rendering and tests)

pub mod scan;

pub use scan::{extract_bar_heights, lit_run_length};

use crate::config::{CodeStyle, GeneratorConfig};
use crate::error::{KeychainError, Result};
use crate::link::{parse_link, LinkTarget};
use crate::types::SpotifyLink;
use image::RgbImage;
use std::time::Duration;

/// Build the download URL for a link's code image
pub fn code_image_url(endpoint: &str, style: &CodeStyle, link: &SpotifyLink) -> String {
    // The service takes one path-like parameter with '/' and ':' escaped.
    format!(
        "{}?uri={}%2F{}%2F{}%2F{}%2Fspotify%3A{}%3A{}",
        endpoint, style.format, style.background, style.bar_color, style.size, link.kind, link.id
    )
}

/// Decode downloaded bytes into an RGB image
pub fn decode_code_image(bytes: &[u8]) -> Result<RgbImage> {
    let image = image::load_from_memory(bytes)?;
    Ok(image.to_rgb8())
}

/// Where code images come from
pub trait CodeSource: Send {
    /// Fetch the encoded code image for a link
    fn fetch(&self, link: &SpotifyLink) -> Result<Vec<u8>>;

    /// Follow a short link to the entity it points at
    fn resolve(&self, short_url: &str) -> Result<SpotifyLink>;

    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Apply changed generator settings
    fn reconfigure(&mut self, _config: &GeneratorConfig) -> Result<()> {
        Ok(())
    }
}

/// Downloads codes from the rendering service
pub struct HttpCodeSource {
    client: reqwest::blocking::Client,
    endpoint: String,
    style: CodeStyle,
}

impl HttpCodeSource {
    /// Create a source from generator settings
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.network.timeout_secs))
            .user_agent(config.network.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            style: config.style.clone(),
        })
    }
}

impl CodeSource for HttpCodeSource {
    fn fetch(&self, link: &SpotifyLink) -> Result<Vec<u8>> {
        let url = code_image_url(&self.endpoint, &self.style, link);
        tracing::debug!("Requesting code image: {}", url);

        let response = self.client.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(KeychainError::Download {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes()?;
        tracing::debug!("Downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }

    fn resolve(&self, short_url: &str) -> Result<SpotifyLink> {
        let response = self.client.get(short_url).send()?;
        let final_url = response.url().to_string();
        tracing::debug!("Short link {} redirected to {}", short_url, final_url);

        if let Ok(LinkTarget::Direct(link)) = parse_link(&final_url) {
            return Ok(link);
        }

        // Some short links land on an HTML page that carries the target URL.
        let body = response.text()?;
        find_web_link(&body).ok_or_else(|| {
            KeychainError::InvalidLink(format!(
                "{} did not resolve to a Spotify entity",
                short_url
            ))
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }

    fn reconfigure(&mut self, config: &GeneratorConfig) -> Result<()> {
        *self = Self::new(config)?;
        Ok(())
    }
}

/// First `open.spotify.com` entity link in a text body
pub fn find_web_link(body: &str) -> Option<SpotifyLink> {
    const MARKER: &str = "https://open.spotify.com/";
    body.match_indices(MARKER).find_map(|(start, _)| {
        let candidate: String = body[start..]
            .chars()
            .take_while(|c| !c.is_whitespace() && !matches!(c, '"' | '\'' | '<' | '>'))
            .collect();
        match parse_link(&candidate) {
            Ok(LinkTarget::Direct(link)) => Some(link),
            _ => None,
        }
    })
}

/// Serves the same image for every link
#[derive(Debug, Clone)]
pub struct StaticCodeSource {
    bytes: Vec<u8>,
    resolved: Option<SpotifyLink>,
}

impl StaticCodeSource {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            resolved: None,
        }
    }

    /// Link returned for every short URL
    pub fn with_resolved(mut self, link: SpotifyLink) -> Self {
        self.resolved = Some(link);
        self
    }
}

impl CodeSource for StaticCodeSource {
    fn fetch(&self, _link: &SpotifyLink) -> Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }

    fn resolve(&self, short_url: &str) -> Result<SpotifyLink> {
        self.resolved.clone().ok_or_else(|| {
            KeychainError::InvalidLink(format!("{} cannot be resolved offline", short_url))
        })
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CODE_ENDPOINT;
    use crate::types::EntityKind;

    #[test]
    fn test_code_image_url() {
        let link = SpotifyLink::new(EntityKind::Track, "4cOdK2wGLETKBW3PvgPWqT");
        let url = code_image_url(DEFAULT_CODE_ENDPOINT, &CodeStyle::default(), &link);
        assert_eq!(
            url,
            "https://www.spotifycodes.com/downloadCode.php?uri=jpeg%2F000000%2Fwhite%2F640%2Fspotify%3Atrack%3A4cOdK2wGLETKBW3PvgPWqT"
        );
    }

    #[test]
    fn test_find_web_link_in_html() {
        let body = r#"<html><a href="https://open.spotify.com/album/1DFixLWuPkv3KT3TnV35m3?si=x">open</a></html>"#;
        let link = find_web_link(body).unwrap();
        assert_eq!(link, SpotifyLink::new(EntityKind::Album, "1DFixLWuPkv3KT3TnV35m3"));
        assert!(find_web_link("<html>nothing here</html>").is_none());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_code_image(b"definitely not an image"),
            Err(KeychainError::Image(_))
        ));
    }

    #[test]
    fn test_decode_png() {
        let img = RgbImage::from_pixel(4, 2, image::Rgb([255, 0, 0]));
        let mut png = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let decoded = decode_code_image(&png).unwrap();
        assert_eq!(decoded.dimensions(), (4, 2));
        assert_eq!(decoded.get_pixel(3, 1), &image::Rgb([255, 0, 0]));
    }

    #[test]
    fn test_static_source() {
        let link = SpotifyLink::new(EntityKind::Track, "4cOdK2wGLETKBW3PvgPWqT");
        let source = StaticCodeSource::new(vec![1, 2, 3]);
        assert_eq!(source.fetch(&link).unwrap(), vec![1, 2, 3]);
        assert!(source.resolve("https://spotify.link/x").is_err());

        let source = source.with_resolved(link.clone());
        assert_eq!(source.resolve("https://spotify.link/x").unwrap(), link);
    }
}
