//! WordprocessingML rewriting for the main document, headers and footers.
//!
//! Paragraphs are buffered one at a time. A paragraph whose whole text is a
//! single centered tag becomes a centered picture paragraph; otherwise every
//! `w:t` holding tags is split into text and drawing siblings in its run.
//! Elements are matched by local name under whatever prefix the part's root
//! element uses, and new markup is written with that same prefix.

use crate::drawing::{docx_inline, ImageSink, NullSink, Picture};
use crate::tags::{lone_tag, split_tags, Segment};
use crate::xml::{local_name, prefix_of, qualified, text, xml_error};
use docx_image_core::{ImageOptions, Result};
use quick_xml::escape::escape;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};

const PARAGRAPH: &[u8] = b"p";
const PARAGRAPH_PROPS: &[u8] = b"pPr";
const JUSTIFICATION: &[u8] = b"jc";
const TEXT: &[u8] = b"t";

/// Paragraph property children that follow `w:jc` in schema order.
const AFTER_JUSTIFICATION: &[&[u8]] = &[
    b"textDirection",
    b"textAlignment",
    b"textboxTightWrap",
    b"outlineLvl",
    b"divId",
    b"cnfStyle",
    b"rPr",
    b"sectPr",
    b"pPrChange",
];

type Events = Vec<Event<'static>>;

enum Boundary {
    Open,
    Close,
    Inside,
}

/// The prefix a part binds to WordprocessingML, taken from its root element.
#[derive(Debug)]
struct Word {
    prefix: String,
}

impl Default for Word {
    fn default() -> Self {
        Self { prefix: "w".into() }
    }
}

impl Word {
    fn from_root(name: QName<'_>) -> Self {
        Self {
            prefix: String::from_utf8_lossy(prefix_of(name.as_ref())).into_owned(),
        }
    }

    /// Whether `name` is the WordprocessingML element `local`.
    fn is(&self, name: QName<'_>, local: &[u8]) -> bool {
        let name = name.as_ref();
        prefix_of(name) == self.prefix.as_bytes() && local_name(name) == local
    }

    fn name(&self, local: &str) -> String {
        qualified(&self.prefix, local)
    }
}

/// Rewrite a document, header or footer part.
pub fn rewrite(xml: &str, sink: &mut dyn ImageSink, options: &ImageOptions) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut out = Writer::new(Vec::new());
    let fallback = Word::default();
    let mut word: Option<Word> = None;
    let mut paragraph: Events = Vec::new();
    let mut depth = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| xml_error("Error parsing document part", e))?;

        if word.is_none() {
            if let Event::Start(e) = &event {
                word = Some(Word::from_root(e.name()));
            }
        }
        let w = word.as_ref().unwrap_or(&fallback);

        let boundary = match &event {
            Event::Eof => break,
            Event::Start(e) if w.is(e.name(), PARAGRAPH) => Boundary::Open,
            Event::End(e) if w.is(e.name(), PARAGRAPH) => Boundary::Close,
            _ => Boundary::Inside,
        };

        match boundary {
            Boundary::Open => {
                depth += 1;
                paragraph.push(event.into_owned());
            }
            Boundary::Close if depth > 0 => {
                paragraph.push(event.into_owned());
                depth -= 1;
                if depth == 0 {
                    render_paragraph(&mut out, w, std::mem::take(&mut paragraph), sink, options)?;
                }
            }
            _ if depth > 0 => paragraph.push(event.into_owned()),
            _ => write(&mut out, &event)?,
        }
    }

    String::from_utf8(out.into_inner()).map_err(|e| xml_error("Rewritten part is not UTF-8", e))
}

fn render_paragraph(
    out: &mut Writer<Vec<u8>>,
    w: &Word,
    events: Events,
    sink: &mut dyn ImageSink,
    options: &ImageOptions,
) -> Result<()> {
    let content = paragraph_text(w, &events)?;

    if let Some(tag) = lone_tag(&content) {
        if tag.centered || options.centered {
            return match sink.embed(&tag)? {
                Some(pic) => write_centered(out, w, &events, &pic),
                None => {
                    log::debug!("No value for '{}', dropping tag", tag.name);
                    write_inline(out, w, &events, &mut NullSink)
                }
            };
        }
    }

    write_inline(out, w, &events, sink)
}

/// Concatenated text of every `w:t` in the paragraph.
fn paragraph_text(w: &Word, events: &[Event<'static>]) -> Result<String> {
    let mut content = String::new();
    let mut in_text = false;

    for event in events {
        match event {
            Event::Start(e) if w.is(e.name(), TEXT) => in_text = true,
            Event::End(e) if w.is(e.name(), TEXT) => in_text = false,
            Event::Text(e) if in_text => content.push_str(&text(e)?),
            _ => {}
        }
    }

    Ok(content)
}

fn write_inline(
    out: &mut Writer<Vec<u8>>,
    w: &Word,
    events: &[Event<'static>],
    sink: &mut dyn ImageSink,
) -> Result<()> {
    let mut i = 0;

    while i < events.len() {
        if let Event::Start(e) = &events[i] {
            if w.is(e.name(), TEXT) {
                if let Some(end) = find_end(w, events, i, TEXT) {
                    let mut content = String::new();
                    for event in &events[i + 1..end] {
                        if let Event::Text(t) = event {
                            content.push_str(&text(t)?);
                        }
                    }

                    let segments = split_tags(&content);
                    if segments.iter().any(|s| matches!(s, Segment::Tag(_))) {
                        write_segments(out, w, segments, sink)?;
                        i = end + 1;
                        continue;
                    }
                }
            }
        }

        write(out, &events[i])?;
        i += 1;
    }

    Ok(())
}

fn write_segments(
    out: &mut Writer<Vec<u8>>,
    w: &Word,
    segments: Vec<Segment<'_>>,
    sink: &mut dyn ImageSink,
) -> Result<()> {
    let t = w.name("t");
    for segment in segments {
        match segment {
            Segment::Text(piece) => {
                write_raw(out, &format!(r#"<{t} xml:space="preserve">{}</{t}>"#, escape(piece), t = t));
            }
            Segment::Tag(tag) => match sink.embed(&tag)? {
                Some(pic) => write_raw(out, &docx_inline(&pic, &w.prefix)),
                None => log::debug!("No value for '{}', dropping tag", tag.name),
            },
        }
    }
    Ok(())
}

/// Replace the paragraph body with one centered picture run, keeping the
/// paragraph's own properties apart from its justification.
fn write_centered(out: &mut Writer<Vec<u8>>, w: &Word, events: &[Event<'static>], pic: &Picture) -> Result<()> {
    let (Some(first), Some(last)) = (events.first(), events.last()) else {
        return Ok(());
    };
    write(out, first)?;

    let props_name = w.name("pPr");
    let val = w.name("val");
    let jc = w.name("jc");
    let justification = Event::Empty(BytesStart::new(jc.as_str()).with_attributes([(val.as_str(), "center")]));

    match events.get(1) {
        Some(Event::Start(props)) if w.is(props.name(), PARAGRAPH_PROPS) => {
            let end = find_end(w, events, 1, PARAGRAPH_PROPS).unwrap_or(events.len() - 1);
            write(out, &events[1])?;

            let mut depth = 0usize;
            let mut placed = false;
            for event in &events[2..end] {
                if depth == 0 {
                    if let Event::Start(e) | Event::Empty(e) = event {
                        let name = e.name();
                        if w.is(name, JUSTIFICATION) {
                            continue;
                        }
                        if !placed && AFTER_JUSTIFICATION.iter().any(|n| w.is(name, n)) {
                            write(out, &justification)?;
                            placed = true;
                        }
                    }
                }
                match event {
                    Event::Start(_) => depth += 1,
                    Event::End(_) => depth = depth.saturating_sub(1),
                    _ => {}
                }
                write(out, event)?;
            }
            if !placed {
                write(out, &justification)?;
            }
            write(out, &Event::End(BytesEnd::new(props_name.as_str())))?;
        }
        Some(Event::Empty(props)) if w.is(props.name(), PARAGRAPH_PROPS) => {
            write(out, &Event::Start(props.clone()))?;
            write(out, &justification)?;
            write(out, &Event::End(BytesEnd::new(props_name.as_str())))?;
        }
        _ => {
            write(out, &Event::Start(BytesStart::new(props_name.as_str())))?;
            write(out, &justification)?;
            write(out, &Event::End(BytesEnd::new(props_name.as_str())))?;
        }
    }

    write_raw(out, &format!("<{r}>{}</{r}>", docx_inline(pic, &w.prefix), r = w.name("r")));
    write(out, last)
}

/// Index of the end tag closing the element that starts at `start`.
fn find_end(w: &Word, events: &[Event<'static>], start: usize, local: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    for (i, event) in events.iter().enumerate().skip(start) {
        match event {
            Event::Start(e) if w.is(e.name(), local) => depth += 1,
            Event::End(e) if w.is(e.name(), local) => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn write(out: &mut Writer<Vec<u8>>, event: &Event<'_>) -> Result<()> {
    out.write_event(event)
        .map_err(|e| xml_error("Error writing document part", e))
}

fn write_raw(out: &mut Writer<Vec<u8>>, xml: &str) {
    out.get_mut().extend_from_slice(xml.as_bytes());
}
