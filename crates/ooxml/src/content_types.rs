//! `[Content_Types].xml`: make sure media extensions have a default type.

use crate::xml::{attr, xml_error};
use docx_image_core::Result;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

/// Add `<Default Extension="{extension}" ContentType="{content_type}"/>`
/// unless the extension is already declared.
///
/// Returns `None` when the part needs no change.
pub fn ensure_default(xml: &str, extension: &str, content_type: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut declared = false;
    let mut added = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| xml_error("Error parsing content types", e))?;

        match &event {
            Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"Default" => {
                if attr(e, b"Extension").is_some_and(|ext| ext.eq_ignore_ascii_case(extension)) {
                    declared = true;
                }
            }
            Event::End(e) if e.name().as_ref() == b"Types" && !declared => {
                let mut default = BytesStart::new("Default");
                default.push_attribute(("Extension", extension));
                default.push_attribute(("ContentType", content_type));
                writer
                    .write_event(Event::Empty(default))
                    .map_err(|e| xml_error("Error writing content types", e))?;
                added = true;
            }
            Event::Eof => break,
            _ => {}
        }

        writer
            .write_event(&event)
            .map_err(|e| xml_error("Error writing content types", e))?;
    }

    if declared || !added {
        return Ok(None);
    }

    log::debug!("Declared content type {} for .{}", content_type, extension);
    String::from_utf8(writer.into_inner())
        .map(Some)
        .map_err(|e| xml_error("Content types are not UTF-8", e))
}
