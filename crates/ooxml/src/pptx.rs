//! PresentationML rewriting: a shape whose text holds an image tag is
//! replaced by a picture occupying the shape's position. Elements are matched
//! by local name, so any namespace prefixes work.

use crate::drawing::{pptx_picture, ImageSink};
use crate::tags::{lone_tag, split_tags, strip_tags, Segment};
use crate::xml::{int_attr, local_name, text, xml_error};
use docx_image_core::{ImageOptions, ImageTag, Result};
use quick_xml::events::{BytesText, Event};
use quick_xml::{Reader, Writer};

const SHAPE: &[u8] = b"sp";
const SHAPE_PROPS: &[u8] = b"spPr";
const OFFSET: &[u8] = b"off";
const EXTENT: &[u8] = b"ext";
const TEXT: &[u8] = b"t";

type Events = Vec<Event<'static>>;

/// Position and size of a shape, in EMUs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Geometry {
    offset: (i64, i64),
    extent: Option<(i64, i64)>,
}

impl Geometry {
    /// Offset for a picture of the given extent.
    fn place(&self, picture: (i64, i64), centered: bool) -> (i64, i64) {
        match (centered, self.extent) {
            (true, Some((cx, cy))) => (
                self.offset.0 + (cx - picture.0) / 2,
                self.offset.1 + (cy - picture.1) / 2,
            ),
            _ => self.offset,
        }
    }
}

/// Rewrite a slide part.
pub fn rewrite(xml: &str, sink: &mut dyn ImageSink, options: &ImageOptions) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut out = Writer::new(Vec::new());
    let mut shape: Events = Vec::new();
    let mut depth = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| xml_error("Error parsing slide", e))?;

        let (opens, closes) = match &event {
            Event::Eof => break,
            Event::Start(e) => (local_name(e.name().as_ref()) == SHAPE, false),
            Event::End(e) => (false, local_name(e.name().as_ref()) == SHAPE),
            _ => (false, false),
        };

        if opens {
            depth += 1;
            shape.push(event.into_owned());
        } else if closes && depth > 0 {
            depth -= 1;
            shape.push(event.into_owned());
            if depth == 0 {
                render_shape(&mut out, std::mem::take(&mut shape), sink, options)?;
            }
        } else if depth > 0 {
            shape.push(event.into_owned());
        } else {
            write(&mut out, &event)?;
        }
    }

    String::from_utf8(out.into_inner()).map_err(|e| xml_error("Rewritten slide is not UTF-8", e))
}

fn render_shape(
    out: &mut Writer<Vec<u8>>,
    events: Events,
    sink: &mut dyn ImageSink,
    options: &ImageOptions,
) -> Result<()> {
    let content = shape_text(&events)?;
    let tags: Vec<ImageTag> = split_tags(&content)
        .into_iter()
        .filter_map(|s| match s {
            Segment::Tag(tag) => Some(tag),
            Segment::Text(_) => None,
        })
        .collect();

    let Some(tag) = tags.first() else {
        for event in &events {
            write(out, event)?;
        }
        return Ok(());
    };

    if tags.len() > 1 {
        log::warn!(
            "Shape holds {} image tags; only '{}' is rendered",
            tags.len(),
            tag.name
        );
    }

    match sink.embed(tag)? {
        Some(pic) => {
            let centered = tag.centered || (options.centered && lone_tag(&content).is_some());
            let offset = shape_geometry(&events).place(pic.extent, centered);
            write_raw(out, &pptx_picture(&pic, offset));
            Ok(())
        }
        None => {
            log::debug!("No value for '{}', dropping tag", tag.name);
            write_stripped(out, &events)
        }
    }
}

/// Concatenated text of every `a:t` in the shape.
fn shape_text(events: &[Event<'static>]) -> Result<String> {
    let mut content = String::new();
    let mut in_text = false;

    for event in events {
        match event {
            Event::Start(e) if local_name(e.name().as_ref()) == TEXT => in_text = true,
            Event::End(e) if local_name(e.name().as_ref()) == TEXT => in_text = false,
            Event::Text(e) if in_text => content.push_str(&text(e)?),
            _ => {}
        }
    }

    Ok(content)
}

/// Offset and extent from the shape's own transform, if it has one.
fn shape_geometry(events: &[Event<'static>]) -> Geometry {
    let mut geometry = Geometry::default();
    let mut in_props = false;
    let mut seen_offset = false;

    for event in events {
        match event {
            Event::Start(e) if local_name(e.name().as_ref()) == SHAPE_PROPS => in_props = true,
            Event::End(e) if local_name(e.name().as_ref()) == SHAPE_PROPS => break,
            Event::Start(e) | Event::Empty(e) if in_props => match local_name(e.name().as_ref()) {
                OFFSET if !seen_offset => {
                    geometry.offset = (int_attr(e, b"x").unwrap_or(0), int_attr(e, b"y").unwrap_or(0));
                    seen_offset = true;
                }
                EXTENT if geometry.extent.is_none() => {
                    if let (Some(cx), Some(cy)) = (int_attr(e, b"cx"), int_attr(e, b"cy")) {
                        geometry.extent = Some((cx, cy));
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }

    geometry
}

fn write_stripped(out: &mut Writer<Vec<u8>>, events: &[Event<'static>]) -> Result<()> {
    let mut in_text = false;

    for event in events {
        match event {
            Event::Start(e) if local_name(e.name().as_ref()) == TEXT => in_text = true,
            Event::End(e) if local_name(e.name().as_ref()) == TEXT => in_text = false,
            Event::Text(e) if in_text => {
                let stripped = strip_tags(&text(e)?);
                write(out, &Event::Text(BytesText::new(&stripped)))?;
                continue;
            }
            _ => {}
        }
        write(out, event)?;
    }

    Ok(())
}

fn write(out: &mut Writer<Vec<u8>>, event: &Event<'_>) -> Result<()> {
    out.write_event(event).map_err(|e| xml_error("Error writing slide", e))
}

fn write_raw(out: &mut Writer<Vec<u8>>, xml: &str) {
    out.get_mut().extend_from_slice(xml.as_bytes());
}
