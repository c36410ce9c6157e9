//! Error types for image tag rendering.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rendering image tags into a template.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read an input file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The template is not a DOCX or PPTX package.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// A caller passed a value the operation cannot accept.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// ZIP archive error.
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing or writing error.
    #[error("XML error: {0}")]
    XmlError(String),

    /// A part the package needs is absent.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// Image bytes could not be decoded or identified.
    #[error("Image error: {0}")]
    Image(String),

    /// The data bound to a tag cannot be turned into an image.
    #[error("Invalid value for tag '{tag}': {reason}")]
    InvalidTagValue { tag: String, reason: String },
}
