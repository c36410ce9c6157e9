//! DrawingML markup for embedded pictures, and drawing id allocation.

use crate::xml::{int_attr, local_name, qualified, xml_error};
use docx_image_core::{max_of, ImageTag, Result};
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";

/// A picture that has been stored in the package and can be referenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    /// Relationship id of the media part, from the source part's rels.
    pub rel_id: String,
    /// Drawing object id, unique within the part.
    pub id: u32,
    /// Alternative text; the tag name.
    pub descr: String,
    /// Extent `(cx, cy)` in EMUs.
    pub extent: (i64, i64),
}

/// Turns tags into stored pictures while a part is rewritten.
pub trait ImageSink {
    /// Store the image bound to `tag`. `None` means the tag has no value and
    /// is dropped from the output.
    fn embed(&mut self, tag: &ImageTag) -> Result<Option<Picture>>;
}

/// A sink for which no tag has a value.
pub struct NullSink;

impl ImageSink for NullSink {
    fn embed(&mut self, _tag: &ImageTag) -> Result<Option<Picture>> {
        Ok(None)
    }
}

/// Hands out drawing ids past the largest `docPr`/`cNvPr` id in a part.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut ids: Vec<u32> = Vec::new();
        let mut reader = Reader::from_str(xml);

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                    if matches!(local_name(e.name().as_ref()), b"docPr" | b"cNvPr") =>
                {
                    if let Some(id) = int_attr(e, b"id").and_then(|id| u32::try_from(id).ok()) {
                        ids.push(id);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(xml_error("Error scanning drawing ids", e)),
                _ => {}
            }
        }

        let next = max_of(&ids).map(|max| max.saturating_add(1)).unwrap_or(1);
        Ok(Self { next })
    }

    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id
    }
}

fn docx_graphic(pic: &Picture) -> String {
    let (cx, cy) = pic.extent;
    let descr = escape(&pic.descr);
    format!(
        concat!(
            r#"<a:graphic xmlns:a="{ns_a}"><a:graphicData uri="{ns_pic}">"#,
            r#"<pic:pic xmlns:pic="{ns_pic}">"#,
            r#"<pic:nvPicPr><pic:cNvPr id="0" name="{descr}"/><pic:cNvPicPr><a:picLocks noChangeAspect="1" noChangeArrowheads="1"/></pic:cNvPicPr></pic:nvPicPr>"#,
            r#"<pic:blipFill><a:blip r:embed="{rel_id}"/><a:srcRect/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            r#"<pic:spPr bwMode="auto"><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/><a:ln><a:noFill/></a:ln></pic:spPr>"#,
            r#"</pic:pic></a:graphicData></a:graphic>"#,
        ),
        ns_a = NS_A,
        ns_pic = NS_PIC,
        descr = descr,
        rel_id = escape(&pic.rel_id),
        cx = cx,
        cy = cy,
    )
}

/// `<w:drawing>` holding an inline picture, to be placed inside a `w:r`.
/// `prefix` is the one the part binds to WordprocessingML.
pub fn docx_inline(pic: &Picture, prefix: &str) -> String {
    let (cx, cy) = pic.extent;
    format!(
        concat!(
            r#"<{drawing}><wp:inline xmlns:wp="{ns_wp}" xmlns:r="{ns_r}" distT="0" distB="0" distL="0" distR="0">"#,
            r#"<wp:extent cx="{cx}" cy="{cy}"/><wp:effectExtent l="0" t="0" r="0" b="0"/>"#,
            r#"<wp:docPr id="{id}" name="Image {id}" descr="{descr}"/>"#,
            r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks xmlns:a="{ns_a}" noChangeAspect="1"/></wp:cNvGraphicFramePr>"#,
            "{graphic}",
            r#"</wp:inline></{drawing}>"#,
        ),
        drawing = qualified(prefix, "drawing"),
        ns_wp = NS_WP,
        ns_r = NS_R,
        ns_a = NS_A,
        cx = cx,
        cy = cy,
        id = pic.id,
        descr = escape(&pic.descr),
        graphic = docx_graphic(pic),
    )
}

/// `<p:pic>` replacing a shape on a slide, placed at `offset` (EMUs).
pub fn pptx_picture(pic: &Picture, offset: (i64, i64)) -> String {
    let (cx, cy) = pic.extent;
    let (x, y) = offset;
    format!(
        concat!(
            r#"<p:pic xmlns:p="{ns_p}" xmlns:a="{ns_a}" xmlns:r="{ns_r}">"#,
            r#"<p:nvPicPr><p:cNvPr id="{id}" name="Image {id}" descr="{descr}"/>"#,
            r#"<p:cNvPicPr><a:picLocks noChangeAspect="1" noChangeArrowheads="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#,
            r#"<p:blipFill><a:blip r:embed="{rel_id}"/><a:srcRect/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
            r#"<p:spPr bwMode="auto"><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/><a:ln><a:noFill/></a:ln></p:spPr></p:pic>"#,
        ),
        ns_p = NS_P,
        ns_a = NS_A,
        ns_r = NS_R,
        id = pic.id,
        descr = escape(&pic.descr),
        rel_id = escape(&pic.rel_id),
        x = x,
        y = y,
        cx = cx,
        cy = cy,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::name::ResolveResult;
    use quick_xml::NsReader;

    fn picture() -> Picture {
        Picture {
            rel_id: "rId4".into(),
            id: 7,
            descr: "a<b".into(),
            extent: (1_428_750, 952_500),
        }
    }

    #[test]
    fn test_id_allocator_starts_past_existing_ids() {
        let xml = r#"<w:document><wp:docPr id="3" name="x"/><pic:cNvPr id="12" name="y"/><p:cNvPr id="bogus"/></w:document>"#;
        let mut ids = IdAllocator::from_xml(xml).unwrap();
        assert_eq!(ids.next_id(), 13);
        assert_eq!(ids.next_id(), 14);
    }

    #[test]
    fn test_id_allocator_without_drawings() {
        let mut ids = IdAllocator::from_xml("<w:document><w:body/></w:document>").unwrap();
        assert_eq!(ids.next_id(), 1);
    }

    #[test]
    fn test_docx_inline() {
        let xml = docx_inline(&picture(), "w");

        assert!(xml.starts_with("<w:drawing><wp:inline "));
        assert!(xml.contains(r#"<wp:extent cx="1428750" cy="952500"/>"#));
        assert!(xml.contains(r#"<wp:docPr id="7" name="Image 7" descr="a&lt;b"/>"#));
        assert!(xml.contains(r#"<a:blip r:embed="rId4"/>"#));
        assert!(xml.ends_with("</wp:inline></w:drawing>"));

        let xml = docx_inline(&picture(), "x");
        assert!(xml.starts_with("<x:drawing>"));
        assert!(xml.ends_with("</x:drawing>"));
    }

    #[test]
    fn test_pptx_picture() {
        let xml = pptx_picture(&picture(), (100, 200));

        assert!(xml.starts_with("<p:pic xmlns:p="));
        assert!(xml.contains(r#"<p:nvPicPr><p:cNvPr id="7" name="Image 7""#));
        assert!(xml.contains(r#"<a:off x="100" y="200"/><a:ext cx="1428750" cy="952500"/>"#));
        assert!(xml.contains(r#"<a:blip r:embed="rId4"/>"#));
    }

    /// Parse `xml`, failing on malformed markup or an undeclared element prefix.
    fn assert_namespaces_resolve(xml: &str) {
        let mut reader = NsReader::from_str(xml);
        loop {
            match reader.read_resolved_event() {
                Ok((ResolveResult::Unknown(prefix), _)) => {
                    panic!("undeclared prefix '{}' in {}", String::from_utf8_lossy(&prefix), xml)
                }
                Ok((_, Event::Eof)) => break,
                Ok(_) => {}
                Err(e) => panic!("malformed fragment: {}", e),
            }
        }
    }

    #[test]
    fn test_fragments_declare_their_namespaces() {
        assert_namespaces_resolve(&pptx_picture(&picture(), (0, 0)));

        // Only the WordprocessingML prefix comes from the enclosing part.
        assert_namespaces_resolve(&format!(
            r#"<w:r xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">{}</w:r>"#,
            docx_inline(&picture(), "w")
        ));
    }
}
