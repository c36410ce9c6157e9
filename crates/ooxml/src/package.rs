//! OOXML package I/O: a ZIP archive held in memory as an ordered list of parts.

use docx_image_core::{DocumentFormat, Error, Result};
use std::io::{Cursor, Read, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Path of the package content types part.
pub const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";

/// A single file inside the package.
#[derive(Debug, Clone)]
pub struct Part {
    pub name: String,
    pub data: Vec<u8>,
}

/// An unpacked DOCX or PPTX package.
#[derive(Debug, Clone)]
pub struct Package {
    format: DocumentFormat,
    parts: Vec<Part>,
}

impl Package {
    /// Read a package from a ZIP reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut parts = Vec::with_capacity(archive.len());
        for idx in 0..archive.len() {
            let mut file = archive
                .by_index(idx)
                .map_err(|e| Error::ZipError(format!("Failed to open entry {}: {}", idx, e)))?;
            if file.is_dir() {
                continue;
            }

            let name = file.name().to_string();
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)
                .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", name, e)))?;
            parts.push(Part { name, data });
        }

        let format = DocumentFormat::from_part_names(parts.iter().map(|p| p.name.as_str()))
            .ok_or_else(|| {
                Error::UnsupportedFormat("package has neither word/document.xml nor ppt/presentation.xml".into())
            })?;

        log::debug!("Loaded {:?} package with {} parts", format, parts.len());
        Ok(Self { format, parts })
    }

    /// Read a package from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if !DocumentFormat::looks_like_package(bytes) {
            return Err(Error::UnsupportedFormat("not a ZIP archive".into()));
        }
        Self::from_reader(Cursor::new(bytes))
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    /// Names of all parts, in archive order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|p| p.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.parts.iter().find(|p| p.name == name).map(|p| p.data.as_slice())
    }

    /// Read a part as UTF-8 text.
    pub fn read_string(&self, name: &str) -> Result<String> {
        let data = self.get(name).ok_or_else(|| Error::MissingPart(name.to_string()))?;
        String::from_utf8(data.to_vec())
            .map_err(|e| Error::XmlError(format!("'{}' is not valid UTF-8: {}", name, e)))
    }

    /// Replace a part, or append it if it does not exist yet.
    pub fn set(&mut self, name: &str, data: Vec<u8>) {
        match self.parts.iter_mut().find(|p| p.name == name) {
            Some(part) => part.data = data,
            None => self.parts.push(Part {
                name: name.to_string(),
                data,
            }),
        }
    }

    /// Parts that may hold image tags, in rendering order.
    ///
    /// DOCX: the main document, then headers, then footers.
    /// PPTX: slides in slide number order.
    pub fn renderable_parts(&self) -> Vec<String> {
        match self.format {
            DocumentFormat::Docx => {
                let mut headers = self.parts_matching("word/header");
                let mut footers = self.parts_matching("word/footer");
                sort_by_part_number(&mut headers);
                sort_by_part_number(&mut footers);

                let mut parts = Vec::new();
                if self.contains("word/document.xml") {
                    parts.push("word/document.xml".to_string());
                }
                parts.extend(headers);
                parts.extend(footers);
                parts
            }
            DocumentFormat::Pptx => {
                let mut slides = self.parts_matching("ppt/slides/slide");
                sort_by_part_number(&mut slides);
                slides
            }
        }
    }

    fn parts_matching(&self, prefix: &str) -> Vec<String> {
        self.part_names()
            .filter(|n| n.starts_with(prefix) && n.ends_with(".xml") && !n[prefix.len()..].contains('/'))
            .map(str::to_string)
            .collect()
    }

    /// Write the package as a ZIP archive.
    pub fn write<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for part in &self.parts {
            zip.start_file(part.name.as_str(), options)
                .map_err(|e| Error::ZipError(format!("Failed to start '{}': {}", part.name, e)))?;
            zip.write_all(&part.data)?;
        }

        zip.finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))
    }

    /// Write the package to a byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.write(Cursor::new(Vec::new()))?.into_inner())
    }
}

/// Relationships part for a source part: `word/document.xml` gives
/// `word/_rels/document.xml.rels`.
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Relationship target of `to` as seen from the directory of `from`.
pub fn relative_target(from: &str, to: &str) -> String {
    let from_dir: Vec<&str> = match from.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    let to_parts: Vec<&str> = to.split('/').collect();

    let common = from_dir
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<&str> = vec![".."; from_dir.len() - common];
    segments.extend(&to_parts[common..]);
    segments.join("/")
}

/// Order numbered parts numerically, so `header2.xml` precedes `header10.xml`.
fn sort_by_part_number(names: &mut [String]) {
    names.sort_by(|a, b| (extract_part_number(a), a).cmp(&(extract_part_number(b), b)));
}

/// Extract a part number from a name like "slide3.xml" or "header12.xml".
fn extract_part_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}
