//! Relationship parts (`*.rels`): parsing, id allocation and serialization.

use crate::xml::{attr, xml_error};
use docx_image_core::{max_of, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

/// Namespace of relationship parts.
pub const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Relationship type of an embedded image.
pub const IMAGE_REL_TYPE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

/// One `<Relationship>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub target_mode: Option<String>,
}

/// The relationships of a single source part.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    rels: Vec<Relationship>,
}

impl Relationships {
    /// An empty set, for parts that had no relationships part.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a relationships part.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut rels = Vec::new();
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.name().as_ref() == b"Relationship" => {
                    let (Some(id), Some(target)) = (attr(e, b"Id"), attr(e, b"Target")) else {
                        log::warn!("Skipping relationship without Id or Target");
                        continue;
                    };
                    rels.push(Relationship {
                        id,
                        target,
                        rel_type: attr(e, b"Type").unwrap_or_default(),
                        target_mode: attr(e, b"TargetMode"),
                    });
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(xml_error("Error parsing relationships", e)),
                _ => {}
            }
        }

        Ok(Self { rels })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    pub fn len(&self) -> usize {
        self.rels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|r| r.id == id)
    }

    /// Next free `rIdN`: one past the largest numeric `rId` in use, or the
    /// lowest unused number once the largest cannot be exceeded.
    pub fn next_id(&self) -> String {
        let numbers: Vec<u64> = self
            .rels
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId"))
            .filter_map(|n| n.parse().ok())
            .collect();

        let next = match max_of(&numbers) {
            Ok(max) => max.checked_add(1).unwrap_or_else(|| lowest_unused(&numbers)),
            Err(_) => 1,
        };
        format!("rId{}", next)
    }

    /// Add an internal relationship and return its id.
    pub fn add(&mut self, rel_type: &str, target: &str) -> String {
        let id = self.next_id();
        self.rels.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            target_mode: None,
        });
        id
    }

    /// Serialize as a complete relationships part.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        let write_err = |e| xml_error("Error writing relationships", e);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(write_err)?;
        writer
            .write_event(Event::Start(
                BytesStart::new("Relationships").with_attributes([("xmlns", RELATIONSHIPS_NS)]),
            ))
            .map_err(write_err)?;

        for rel in &self.rels {
            let mut el = BytesStart::new("Relationship");
            el.push_attribute(("Id", rel.id.as_str()));
            el.push_attribute(("Type", rel.rel_type.as_str()));
            el.push_attribute(("Target", rel.target.as_str()));
            if let Some(mode) = &rel.target_mode {
                el.push_attribute(("TargetMode", mode.as_str()));
            }
            writer.write_event(Event::Empty(el)).map_err(write_err)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("Relationships")))
            .map_err(write_err)?;

        String::from_utf8(writer.into_inner()).map_err(|e| xml_error("Relationships are not UTF-8", e))
    }
}

fn lowest_unused(numbers: &[u64]) -> u64 {
    let mut n = 1;
    while numbers.contains(&n) {
        n += 1;
    }
    n
}
