//! Core units, domain types, image loading and options for rendering
//! image tags into Word and PowerPoint templates.

pub mod error;
pub mod media;
pub mod options;
pub mod types;
pub mod units;

pub use error::{Error, Result};
pub use media::{decode_data_url, detect_size, sniff_format, ImageKind};
pub use options::{ImageLoader, ImageOptions, ImageProvider, SizePolicy};
pub use types::{DocumentFormat, ImageSize, ImageTag, Placement};
pub use units::{max_of, pixels_to_emus};
