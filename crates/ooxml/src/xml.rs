//! Small quick-xml helpers shared by the part rewriters.

use docx_image_core::Error;
use quick_xml::events::{BytesStart, BytesText};

/// Extract the local name from a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// The prefix of a qualified name, empty when it has none.
pub(crate) fn prefix_of(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(pos) => &name[..pos],
        None => b"",
    }
}

/// `prefix:local`, or just `local` for the default namespace.
pub(crate) fn qualified(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}

/// Unescaped value of an attribute, if present.
pub(crate) fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| match a.unescape_value() {
            Ok(v) => v.into_owned(),
            Err(_) => String::from_utf8_lossy(&a.value).into_owned(),
        })
}

/// Parse an integer attribute, ignoring values that are not integers.
pub(crate) fn int_attr(e: &BytesStart<'_>, key: &[u8]) -> Option<i64> {
    attr(e, key).and_then(|v| v.trim().parse().ok())
}

/// Unescaped content of a text node.
pub(crate) fn text(e: &BytesText<'_>) -> Result<String, Error> {
    e.unescape()
        .map(|t| t.into_owned())
        .map_err(|err| Error::XmlError(format!("bad text node: {}", err)))
}

pub(crate) fn xml_error(context: &str, err: impl std::fmt::Display) -> Error {
    Error::XmlError(format!("{}: {}", context, err))
}
