//! Render options and the image provider seam.

use crate::media::{decode_data_url, detect_size};
use crate::{Error, ImageSize, Result};
use serde_json::Value;
use std::path::PathBuf;

/// Options that change how tags are laid out.
#[derive(Debug, Clone, Default)]
pub struct ImageOptions {
    /// Center `{%tag}` images that are alone in their paragraph or shape.
    pub centered: bool,
}

impl ImageOptions {
    /// Create options with the defaults (inline layout).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether lone inline tags are rendered centered.
    pub fn with_centered(mut self, centered: bool) -> Self {
        self.centered = centered;
        self
    }
}

/// Supplies image bytes and sizes for tag values.
pub trait ImageProvider: Send + Sync {
    /// Produce the image bytes for the value bound to `tag`.
    fn get_image(&self, tag: &str, value: &Value) -> Result<Vec<u8>>;

    /// Produce the rendered size, in pixels, of an image returned by
    /// [`get_image`](Self::get_image).
    fn get_size(&self, image: &[u8], tag: &str, value: &Value) -> Result<ImageSize>;
}

/// How [`ImageLoader`] sizes images.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizePolicy {
    /// Every image gets the same size.
    Fixed(ImageSize),
    /// Use the image's own pixel dimensions. SVG images have none and fail
    /// with [`Error::Image`]; they need [`SizePolicy::Fixed`].
    Detect,
    /// Use the image's own dimensions, scaled down to fit a square box.
    /// The box side must be finite and positive.
    FitWithin(f64),
}

impl Default for SizePolicy {
    fn default() -> Self {
        Self::Detect
    }
}

/// Stock provider: data URLs, byte arrays, or paths under a root directory.
#[derive(Debug, Clone, Default)]
pub struct ImageLoader {
    root: Option<PathBuf>,
    size: SizePolicy,
}

impl ImageLoader {
    /// Create a loader that only accepts data URLs and byte arrays.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve string values that are not data URLs against `root`.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Set the sizing policy.
    pub fn with_size_policy(mut self, size: SizePolicy) -> Self {
        self.size = size;
        self
    }

    fn invalid(tag: &str, reason: impl Into<String>) -> Error {
        Error::InvalidTagValue {
            tag: tag.to_string(),
            reason: reason.into(),
        }
    }
}

impl ImageProvider for ImageLoader {
    fn get_image(&self, tag: &str, value: &Value) -> Result<Vec<u8>> {
        match value {
            Value::String(s) => {
                if let Some(bytes) = decode_data_url(s)? {
                    return Ok(bytes);
                }
                let root = self
                    .root
                    .as_ref()
                    .ok_or_else(|| Self::invalid(tag, "expected a data URL; no image directory is configured"))?;
                let path = root.join(s);
                log::debug!("Loading image for '{}' from {}", tag, path.display());
                std::fs::read(&path).map_err(|e| Self::invalid(tag, format!("cannot read {}: {}", path.display(), e)))
            }
            Value::Array(items) => items
                .iter()
                .map(|v| {
                    v.as_u64()
                        .and_then(|n| u8::try_from(n).ok())
                        .ok_or_else(|| Self::invalid(tag, "byte arrays may only hold integers 0-255"))
                })
                .collect(),
            other => Err(Self::invalid(
                tag,
                format!("expected a path, data URL or byte array, got {}", other),
            )),
        }
    }

    fn get_size(&self, image: &[u8], _tag: &str, _value: &Value) -> Result<ImageSize> {
        match self.size {
            SizePolicy::Fixed(size) => Ok(size),
            SizePolicy::Detect => detect_size(image),
            SizePolicy::FitWithin(max_px) => detect_size(image)?.fit_within(max_px),
        }
    }
}
