//! Thin event layer over quick-xml shared by the JUnit and TestNG parsers.
//!
//! Self-closing elements are reported as an open immediately followed by a
//! close, so the format parsers only need to handle one shape of element.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::path::Path;

use crate::core::error::{Error, Result};

/// One structural XML event.
#[derive(Debug)]
pub(crate) enum XmlEvent {
    Open { name: String, attrs: Attrs },
    Close { name: String },
    Text(String),
}

/// Attributes of one element, in document order.
#[derive(Debug, Default, Clone)]
pub(crate) struct Attrs(Vec<(String, String)>);

impl Attrs {
    pub(crate) fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn string(&self, name: &str) -> Option<String> {
        self.get(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
    }

    pub(crate) fn u32(&self, name: &str) -> Option<u32> {
        self.get(name).and_then(|v| v.trim().parse().ok())
    }

    pub(crate) fn u64(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(|v| v.trim().parse().ok())
    }

    /// Durations are written as `1.234` or, by some producers, `1,234.5`.
    pub(crate) fn f64(&self, name: &str) -> Option<f64> {
        self.get(name)
            .and_then(|v| v.trim().replace(',', "").parse().ok())
    }

    pub(crate) fn bool(&self, name: &str) -> bool {
        self.get(name)
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn element_attrs(e: &BytesStart<'_>, path: &Path) -> Result<Attrs> {
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::parse(path, format!("bad attribute: {}", err)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| {
                Error::parse(path, format!("bad attribute value for '{}': {}", key, err))
            })?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(Attrs(attrs))
}

/// Walk an XML document, feeding structural events to `handle`.
///
/// Fails on malformed XML, on mismatched end tags and on a document that
/// ends with elements still open.
pub(crate) fn read_events<F>(content: &str, path: &Path, mut handle: F) -> Result<()>
where
    F: FnMut(XmlEvent) -> Result<()>,
{
    let mut reader = Reader::from_str(content);
    let mut depth = 0usize;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::parse(
                path,
                format!("malformed XML at byte {}: {}", reader.buffer_position(), e),
            )
        })?;

        match event {
            Event::Start(e) => {
                depth += 1;
                handle(XmlEvent::Open {
                    name: element_name(&e),
                    attrs: element_attrs(&e, path)?,
                })?;
            }
            Event::Empty(e) => {
                let name = element_name(&e);
                handle(XmlEvent::Open {
                    name: name.clone(),
                    attrs: element_attrs(&e, path)?,
                })?;
                handle(XmlEvent::Close { name })?;
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                handle(XmlEvent::Close {
                    name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                })?;
            }
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|err| Error::parse(path, format!("bad text content: {}", err)))?;
                if depth > 0 {
                    handle(XmlEvent::Text(text.into_owned()))?;
                }
            }
            Event::CData(e) => {
                if depth > 0 {
                    handle(XmlEvent::Text(String::from_utf8_lossy(&e.into_inner()).into_owned()))?;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth > 0 {
        return Err(Error::parse(
            path,
            format!("unexpected end of document with {} unclosed element(s)", depth),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(xml: &str) -> Result<Vec<String>> {
        let mut out = Vec::new();
        read_events(xml, Path::new("t.xml"), |ev| {
            out.push(match ev {
                XmlEvent::Open { name, attrs } => format!("open {} {:?}", name, attrs.get("a")),
                XmlEvent::Close { name } => format!("close {}", name),
                XmlEvent::Text(t) => format!("text {}", t.trim()),
            });
            Ok(())
        })?;
        Ok(out)
    }

    #[test]
    fn test_empty_element_is_open_then_close() {
        let events = collect(r#"<root><leaf a="1"/></root>"#).unwrap();
        assert_eq!(
            events,
            vec!["open root None", "open leaf Some(\"1\")", "close leaf", "close root"]
        );
    }

    #[test]
    fn test_text_and_cdata_are_unescaped() {
        let events = collect("<m>a &amp; b<![CDATA[<raw>]]></m>").unwrap();
        assert_eq!(events[1], "text a & b");
        assert_eq!(events[2], "text <raw>");
    }

    #[test]
    fn test_mismatched_end_tag_is_error() {
        let err = collect("<a><b></a>").unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_unclosed_document_is_error() {
        let err = collect("<a><b></b>").unwrap_err();
        assert!(err.to_string().contains("unclosed"));
    }

    #[test]
    fn test_attr_helpers() {
        let attrs = Attrs(vec![
            ("time".to_string(), "1,234.5".to_string()),
            ("n".to_string(), " 3 ".to_string()),
            ("flag".to_string(), "TRUE".to_string()),
            ("blank".to_string(), "  ".to_string()),
        ]);
        assert_eq!(attrs.f64("time"), Some(1234.5));
        assert_eq!(attrs.u32("n"), Some(3));
        assert!(attrs.bool("flag"));
        assert!(!attrs.bool("missing"));
        assert_eq!(attrs.string("blank"), None);
    }
}
