//! Domain types shared by the package backend and the front ends.

use crate::units::{max_of, pixels_to_emus};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// The kind of OOXML package being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentFormat {
    /// Word document (WordprocessingML).
    Docx,
    /// PowerPoint presentation (PresentationML).
    Pptx,
}

impl DocumentFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "docx" | "docm" | "dotx" => Some(Self::Docx),
            "pptx" | "pptm" | "potx" => Some(Self::Pptx),
            _ => None,
        }
    }

    /// Detect format from the part names of an unpacked package.
    pub fn from_part_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        for name in names {
            match name {
                "word/document.xml" => return Some(Self::Docx),
                "ppt/presentation.xml" => return Some(Self::Pptx),
                _ => {}
            }
        }
        None
    }

    /// Whether the bytes start with a ZIP local file header.
    pub fn looks_like_package(bytes: &[u8]) -> bool {
        bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04])
    }

    /// Directory holding media parts, e.g. `word/media/`.
    pub fn media_dir(self) -> &'static str {
        match self {
            Self::Docx => "word/media/",
            Self::Pptx => "ppt/media/",
        }
    }

    /// Lowercase extension for output file names.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Pptx => "pptx",
        }
    }
}

/// Where a rendered image sits relative to the surrounding text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Placement {
    /// Flows with the text of its paragraph.
    #[default]
    Inline,
    /// Takes a paragraph (or a shape's box) of its own, centered.
    Centered,
}

/// An image tag found in a text node: `{%name}` or `{%%name}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTag {
    /// Tag name, used as a dotted path into the template data.
    pub name: String,

    /// Written with a double percent sign.
    pub centered: bool,
}

impl ImageTag {
    pub fn new(name: impl Into<String>, centered: bool) -> Self {
        Self {
            name: name.into(),
            centered,
        }
    }

    /// The tag as it appears in the template.
    pub fn source(&self) -> String {
        if self.centered {
            format!("{{%%{}}}", self.name)
        } else {
            format!("{{%{}}}", self.name)
        }
    }
}

/// Rendered image dimensions in pixels.
///
/// Both sides are always finite and non-negative; the only ways to build one
/// are [`ImageSize::new`], [`ImageSize::parse`] and [`ImageSize::fit_within`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImageSize {
    width: f64,
    height: f64,
}

impl ImageSize {
    /// Create a size, rejecting negative or non-finite dimensions.
    pub fn new(width: f64, height: f64) -> Result<Self> {
        for (label, v) in [("width", width), ("height", height)] {
            if !v.is_finite() || v < 0.0 {
                return Err(Error::InvalidArgument(format!(
                    "image {} must be a finite, non-negative number of pixels, got {}",
                    label, v
                )));
            }
        }
        Ok(Self { width, height })
    }

    /// Parse a `WIDTHxHEIGHT` string such as `150x150`.
    pub fn parse(s: &str) -> Result<Self> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| Error::InvalidArgument(format!("expected WIDTHxHEIGHT, got '{}'", s)))?;

        let parse = |v: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|e| Error::InvalidArgument(format!("bad dimension '{}': {}", v, e)))
        };

        Self::new(parse(w)?, parse(h)?)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Length of the longer side.
    pub fn longest_side(&self) -> f64 {
        // Both sides are finite, so the slice is never empty and never NaN.
        max_of(&[self.width, self.height]).unwrap_or(self.width)
    }

    /// Scale down uniformly so that the longer side is at most `max_px`.
    pub fn fit_within(self, max_px: f64) -> Result<Self> {
        if !max_px.is_finite() || max_px <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "fit size must be a finite, positive number of pixels, got {}",
                max_px
            )));
        }

        let longest = self.longest_side();
        if longest <= max_px {
            return Ok(self);
        }
        let ratio = max_px / longest;
        Self::new(self.width * ratio, self.height * ratio)
    }

    /// DrawingML extent `(cx, cy)` in EMUs.
    pub fn to_emus(&self) -> (i64, i64) {
        (pixels_to_emus(self.width), pixels_to_emus(self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_extension("DOCX"), Some(DocumentFormat::Docx));
        assert_eq!(DocumentFormat::from_extension("pptx"), Some(DocumentFormat::Pptx));
        assert_eq!(DocumentFormat::from_extension("ppt"), None);
    }

    #[test]
    fn test_format_from_part_names() {
        let docx = ["[Content_Types].xml", "_rels/.rels", "word/document.xml"];
        assert_eq!(DocumentFormat::from_part_names(docx), Some(DocumentFormat::Docx));

        let pptx = ["[Content_Types].xml", "ppt/presentation.xml", "ppt/slides/slide1.xml"];
        assert_eq!(DocumentFormat::from_part_names(pptx), Some(DocumentFormat::Pptx));

        assert_eq!(DocumentFormat::from_part_names(["xl/workbook.xml"]), None);
    }

    #[test]
    fn test_image_tag_source() {
        assert_eq!(ImageTag::new("image", false).source(), "{%image}");
        assert_eq!(ImageTag::new("logo", true).source(), "{%%logo}");
    }

    #[test]
    fn test_image_size_validation() {
        assert!(ImageSize::new(150.0, 150.0).is_ok());
        assert!(ImageSize::new(0.0, 0.0).is_ok());
        assert!(matches!(ImageSize::new(-1.0, 10.0), Err(Error::InvalidArgument(_))));
        assert!(matches!(ImageSize::new(10.0, f64::NAN), Err(Error::InvalidArgument(_))));
        assert!(matches!(ImageSize::new(f64::INFINITY, 1.0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_image_size_parse() {
        let size = ImageSize::parse("150x100").unwrap();
        assert_eq!((size.width(), size.height()), (150.0, 100.0));
        assert!(ImageSize::parse("150").is_err());
        assert!(ImageSize::parse("ax10").is_err());
    }

    #[test]
    fn test_image_size_to_emus() {
        let size = ImageSize::new(150.0, 150.0).unwrap();
        assert_eq!(size.to_emus(), (1_428_750, 1_428_750));
    }

    #[test]
    fn test_fit_within_keeps_aspect_ratio() {
        let size = ImageSize::new(400.0, 200.0).unwrap().fit_within(100.0).unwrap();
        assert_eq!((size.width(), size.height()), (100.0, 50.0));

        let small = ImageSize::new(40.0, 20.0).unwrap();
        assert_eq!(small.fit_within(100.0).unwrap(), small);
        assert_eq!(small.longest_side(), 40.0);
    }

    #[test]
    fn test_fit_within_rejects_bad_limits() {
        let size = ImageSize::new(400.0, 200.0).unwrap();
        for max_px in [-5.0, 0.0, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(size.fit_within(max_px), Err(Error::InvalidArgument(_))),
                "{} was accepted",
                max_px
            );
        }
    }
}
