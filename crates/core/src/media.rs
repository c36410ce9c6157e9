//! Image bytes: data URL decoding, format sniffing and size probing.

use crate::{Error, ImageSize, Result};
use base64::Engine;
use regex::Regex;
use std::io::Cursor;
use std::sync::LazyLock;

/// Regex for the data URL prefix of an embedded image.
static DATA_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^data:image/(png|jpg|jpeg|gif|svg|svg\+xml);base64,").unwrap());

/// File extension and MIME type of an image, as stored in the package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageKind {
    pub extension: &'static str,
    pub mime: &'static str,
}

impl ImageKind {
    pub const SVG: ImageKind = ImageKind {
        extension: "svg",
        mime: "image/svg+xml",
    };
}

/// Decode a `data:image/...;base64,` URL.
///
/// Returns `Ok(None)` when the string is not an image data URL at all, so the
/// caller can fall back to treating it as a path.
pub fn decode_data_url(url: &str) -> Result<Option<Vec<u8>>> {
    let Some(prefix) = DATA_URL_REGEX.find(url) else {
        return Ok(None);
    };

    let payload: String = url[prefix.end()..]
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map(Some)
        .map_err(|e| Error::Image(format!("invalid base64 in data URL: {}", e)))
}

/// Identify the image format from its leading bytes.
pub fn sniff_format(bytes: &[u8]) -> Result<ImageKind> {
    if looks_like_svg(bytes) {
        return Ok(ImageKind::SVG);
    }

    let format = image::guess_format(bytes)
        .map_err(|e| Error::Image(format!("unrecognized image format: {}", e)))?;

    let extension = format
        .extensions_str()
        .first()
        .copied()
        .ok_or_else(|| Error::Image(format!("no file extension known for {:?}", format)))?;

    Ok(ImageKind {
        extension,
        mime: format.to_mime_type(),
    })
}

/// Read the pixel dimensions from the image header without decoding pixels.
///
/// SVG has no intrinsic pixel size, so it is rejected; give SVG images a
/// fixed size instead.
pub fn detect_size(bytes: &[u8]) -> Result<ImageSize> {
    if looks_like_svg(bytes) {
        return Err(Error::Image(
            "SVG images have no pixel dimensions; use a fixed size".into(),
        ));
    }

    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| Error::Image(format!("failed to inspect image: {}", e)))?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| Error::Image(format!("failed to read image dimensions: {}", e)))?;

    ImageSize::new(f64::from(width), f64::from(height))
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(256)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start_matches('\u{feff}').trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}
