//! Image tag scanning: `{%name}` for inline images, `{%%name}` for centered ones.

use docx_image_core::ImageTag;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Regex matching an image tag. Group 1 is the percent signs, group 2 the name.
static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{(%%?)([^{}%]+)\}").unwrap());

/// A piece of a text node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Tag(ImageTag),
}

/// Split a text node into literal text and image tags, in order.
///
/// Empty text pieces are dropped. Tags with a blank name are left as text.
pub fn split_tags(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in TAG_REGEX.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let name = caps[2].trim();
        if name.is_empty() {
            continue;
        }

        if whole.start() > last {
            segments.push(Segment::Text(&text[last..whole.start()]));
        }
        segments.push(Segment::Tag(ImageTag::new(name, &caps[1] == "%%")));
        last = whole.end();
    }

    if last < text.len() {
        segments.push(Segment::Text(&text[last..]));
    }
    segments
}

/// Whether the text holds at least one image tag.
pub fn has_tags(text: &str) -> bool {
    split_tags(text).iter().any(|s| matches!(s, Segment::Tag(_)))
}

/// The tag, if the trimmed text is exactly one image tag and nothing else.
pub fn lone_tag(text: &str) -> Option<ImageTag> {
    match split_tags(text.trim()).as_slice() {
        [Segment::Tag(tag)] => Some(tag.clone()),
        _ => None,
    }
}

/// Text with every image tag removed.
pub fn strip_tags(text: &str) -> String {
    split_tags(text)
        .into_iter()
        .filter_map(|s| match s {
            Segment::Text(t) => Some(t),
            Segment::Tag(_) => None,
        })
        .collect()
}

/// Look up a dotted tag name in the template data.
///
/// Missing keys and JSON `null` both count as "no value".
pub fn lookup<'a>(data: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut value = data.get(parts.next()?)?;
    for key in parts {
        value = match value {
            Value::Object(map) => map.get(key)?,
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    (!value.is_null()).then_some(value)
}
