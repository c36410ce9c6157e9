//! The image module: resolves tags through an [`ImageProvider`] and stores
//! the resulting pictures in the package.

use crate::content_types::ensure_default;
use crate::drawing::{IdAllocator, ImageSink, Picture};
use crate::package::{rels_path_for, relative_target, Package, CONTENT_TYPES_PATH};
use crate::rels::{Relationships, IMAGE_REL_TYPE};
use crate::tags::{has_tags, lookup};
use crate::{docx, pptx};
use docx_image_core::{sniff_format, DocumentFormat, ImageKind, ImageOptions, ImageProvider, ImageTag, Result};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Counters from one render.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    /// Pictures written into the package.
    pub images_inserted: usize,
    /// Tags dropped because their value was missing or null.
    pub tags_removed: usize,
    /// Parts that held at least one tag.
    pub parts_rewritten: usize,
}

/// Replaces image tags in DOCX and PPTX packages.
#[derive(Debug, Clone)]
pub struct ImageModule<P> {
    provider: P,
    options: ImageOptions,
}

impl<P: ImageProvider> ImageModule<P> {
    /// Create a module with default options.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            options: ImageOptions::default(),
        }
    }

    /// Replace the layout options.
    pub fn with_options(mut self, options: ImageOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ImageOptions {
        &self.options
    }

    /// Render every image tag in the package against `data`.
    ///
    /// The package is only modified once every part has rendered; on error it
    /// is left as it was.
    pub fn render(&self, package: &mut Package, data: &Map<String, Value>) -> Result<RenderStats> {
        let format = package.format();
        let mut media_names: HashSet<String> = package
            .part_names()
            .filter(|n| n.starts_with(format.media_dir()))
            .map(str::to_string)
            .collect();
        let mut kinds: Vec<ImageKind> = Vec::new();
        let mut writes: Vec<(String, Vec<u8>)> = Vec::new();
        let mut stats = RenderStats::default();

        for part in package.renderable_parts() {
            let xml = package.read_string(&part)?;
            if !has_tags(&xml) {
                continue;
            }

            let rels_path = rels_path_for(&part);
            let rels = if package.contains(&rels_path) {
                Relationships::parse(&package.read_string(&rels_path)?)?
            } else {
                log::debug!("{} has no relationships part yet", part);
                Relationships::new()
            };

            let mut embedder = Embedder {
                provider: &self.provider,
                data,
                part: &part,
                format,
                media_names: &mut media_names,
                kinds: &mut kinds,
                rels,
                ids: IdAllocator::from_xml(&xml)?,
                media: Vec::new(),
                stats: RenderStats::default(),
            };

            let rewritten = match format {
                DocumentFormat::Docx => docx::rewrite(&xml, &mut embedder, &self.options)?,
                DocumentFormat::Pptx => pptx::rewrite(&xml, &mut embedder, &self.options)?,
            };
            let Embedder {
                rels,
                media,
                stats: part_stats,
                ..
            } = embedder;

            if !media.is_empty() {
                writes.push((rels_path, rels.to_xml()?.into_bytes()));
                writes.extend(media);
            }
            writes.push((part, rewritten.into_bytes()));

            stats.images_inserted += part_stats.images_inserted;
            stats.tags_removed += part_stats.tags_removed;
            stats.parts_rewritten += 1;
        }

        if !kinds.is_empty() {
            let mut content_types = package.read_string(CONTENT_TYPES_PATH)?;
            let mut changed = false;
            for kind in &kinds {
                if let Some(updated) = ensure_default(&content_types, kind.extension, kind.mime)? {
                    content_types = updated;
                    changed = true;
                }
            }
            if changed {
                writes.push((CONTENT_TYPES_PATH.to_string(), content_types.into_bytes()));
            }
        }

        for (name, bytes) in writes {
            package.set(&name, bytes);
        }

        log::debug!(
            "Rendered {} image(s), removed {} empty tag(s) across {} part(s)",
            stats.images_inserted,
            stats.tags_removed,
            stats.parts_rewritten
        );
        Ok(stats)
    }

    /// Render a package given as bytes and return the new package bytes.
    pub fn render_bytes(&self, bytes: &[u8], data: &Map<String, Value>) -> Result<(Vec<u8>, RenderStats)> {
        let mut package = Package::from_bytes(bytes)?;
        let stats = self.render(&mut package, data)?;
        Ok((package.to_bytes()?, stats))
    }
}

/// Per-part state while a part is rewritten.
struct Embedder<'a> {
    provider: &'a dyn ImageProvider,
    data: &'a Map<String, Value>,
    part: &'a str,
    format: DocumentFormat,
    media_names: &'a mut HashSet<String>,
    kinds: &'a mut Vec<ImageKind>,
    rels: Relationships,
    ids: IdAllocator,
    media: Vec<(String, Vec<u8>)>,
    stats: RenderStats,
}

impl Embedder<'_> {
    /// First unused `imageN.ext` in the media directory.
    fn reserve_media_name(&mut self, extension: &str) -> String {
        let mut n = self.media_names.len() + 1;
        loop {
            let name = format!("{}image{}.{}", self.format.media_dir(), n, extension);
            if self.media_names.insert(name.clone()) {
                return name;
            }
            n += 1;
        }
    }
}

impl ImageSink for Embedder<'_> {
    fn embed(&mut self, tag: &ImageTag) -> Result<Option<Picture>> {
        let Some(value) = lookup(self.data, &tag.name) else {
            self.stats.tags_removed += 1;
            return Ok(None);
        };

        let bytes = self.provider.get_image(&tag.name, value)?;
        let size = self.provider.get_size(&bytes, &tag.name, value)?;
        let kind = sniff_format(&bytes)?;

        let media_path = self.reserve_media_name(kind.extension);
        let rel_id = self
            .rels
            .add(IMAGE_REL_TYPE, &relative_target(self.part, &media_path));
        if !self.kinds.contains(&kind) {
            self.kinds.push(kind);
        }

        log::debug!(
            "'{}' -> {} ({}x{} px) as {} in {}",
            tag.name,
            media_path,
            size.width(),
            size.height(),
            rel_id,
            self.part
        );

        self.media.push((media_path, bytes));
        self.stats.images_inserted += 1;

        Ok(Some(Picture {
            rel_id,
            id: self.ids.next_id(),
            descr: tag.name.clone(),
            extent: size.to_emus(),
        }))
    }
}
