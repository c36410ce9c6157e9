//! OOXML (DOCX/PPTX) backend that replaces image tags with embedded pictures.
//!
//! Packages are unpacked into memory, the document, header, footer and slide
//! parts are rewritten with quick-xml, and the image bytes are stored as media
//! parts with their relationships and content types.

pub mod content_types;
pub mod docx;
pub mod drawing;
pub mod module;
pub mod package;
pub mod pptx;
pub mod rels;
pub mod tags;
mod xml;

#[cfg(test)]
mod fixtures;

pub use drawing::{ImageSink, Picture};
pub use module::{ImageModule, RenderStats};
pub use package::Package;
pub use rels::Relationships;
