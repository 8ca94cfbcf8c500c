//! Sidecar XML reader.
//!
//! Builds a small element tree for the children of the root and keeps the
//! exact source text of each child so unknown elements can be written back
//! unchanged.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// Parse failures. Wrapped with the file path by [`super::NfoError`].
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("malformed XML at byte {position}: {message}")]
    Malformed { position: usize, message: String },

    #[error("no root element")]
    NoRoot,

    #[error("expected <{expected}> root, found <{found}>")]
    WrongRoot {
        expected: &'static str,
        found: String,
    },
}

/// A parsed element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Trimmed text of the first child with this name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.children
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.text.trim())
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// A direct child of the root with its source text.
#[derive(Debug, Clone)]
pub struct TopLevel {
    pub element: XmlElement,
    pub raw: String,
}

/// Normalize line endings and drop a UTF-8 BOM.
pub fn normalize(text: &str) -> String {
    text.strip_prefix('\u{feff}')
        .unwrap_or(text)
        .replace("\r\n", "\n")
}

fn element_from(e: &BytesStart<'_>) -> XmlElement {
    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let attributes = e
        .attributes()
        .flatten()
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr
                .unescape_value()
                .map(|v| v.to_string())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).to_string());
            (key, value)
        })
        .collect();
    XmlElement {
        name,
        attributes,
        ..Default::default()
    }
}

/// Parse normalized sidecar text. The root element must be `expected_root`.
pub fn parse(text: &str, expected_root: &'static str) -> Result<Vec<TopLevel>, ParseError> {
    let mut reader = Reader::from_str(text);
    // Whitespace is kept so byte positions map back to the source
    reader.config_mut().trim_text(false);

    let mut children = Vec::new();
    // Open elements below the root
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root_seen = false;
    let mut root_open = false;
    let mut child_start = 0usize;

    loop {
        let event = reader.read_event().map_err(|e| ParseError::Malformed {
            position: reader.buffer_position() as usize,
            message: e.to_string(),
        })?;
        let end = reader.buffer_position() as usize;

        match event {
            Event::Start(e) => {
                if !root_open {
                    if root_seen {
                        // Trailing content after the root is ignored
                        continue;
                    }
                    check_root(&e, expected_root)?;
                    root_seen = true;
                    root_open = true;
                    continue;
                }
                if stack.is_empty() {
                    // "<" + name/attributes + ">"
                    child_start = end - e.len() - 2;
                }
                stack.push(element_from(&e));
            }
            Event::Empty(e) => {
                if !root_open {
                    if !root_seen {
                        check_root(&e, expected_root)?;
                        root_seen = true;
                    }
                    continue;
                }
                let element = element_from(&e);
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => {
                        // "<" + name/attributes + "/>"
                        let start = end - e.len() - 3;
                        children.push(TopLevel {
                            element,
                            raw: text[start..end].to_string(),
                        });
                    }
                }
            }
            Event::End(_) => {
                if !root_open {
                    continue;
                }
                match stack.pop() {
                    Some(element) => match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => children.push(TopLevel {
                            element,
                            raw: text[child_start..end].to_string(),
                        }),
                    },
                    // Closing tag of the root
                    None => root_open = false,
                }
            }
            Event::Text(t) => {
                if let Some(current) = stack.last_mut() {
                    let unescaped = t.unescape().map_err(|e| ParseError::Malformed {
                        position: end,
                        message: e.to_string(),
                    })?;
                    current.text.push_str(&unescaped);
                }
            }
            Event::CData(c) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !root_seen {
        return Err(ParseError::NoRoot);
    }
    if root_open || !stack.is_empty() {
        return Err(ParseError::Malformed {
            position: text.len(),
            message: format!("unclosed <{expected_root}>"),
        });
    }
    Ok(children)
}

fn check_root(e: &BytesStart<'_>, expected: &'static str) -> Result<(), ParseError> {
    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
    if name == expected {
        Ok(())
    } else {
        Err(ParseError::WrongRoot {
            expected,
            found: name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<movie>
  <title>Alien &amp; Co</title>
  <uniqueid type="imdb" default="true">tt0078748</uniqueid>
  <futureField attr="1">x <b>bold</b></futureField>
  <empty/>
  <plot><![CDATA[In space <no one> can hear]]></plot>
</movie>
"#;

    #[test]
    fn test_parse_tree_and_raw() {
        let children = parse(SAMPLE, "movie").unwrap();
        let names: Vec<_> = children.iter().map(|c| c.element.name.as_str()).collect();
        assert_eq!(names, ["title", "uniqueid", "futureField", "empty", "plot"]);

        assert_eq!(children[0].element.text, "Alien & Co");
        assert_eq!(children[1].element.attribute("type"), Some("imdb"));
        assert_eq!(
            children[2].raw,
            r#"<futureField attr="1">x <b>bold</b></futureField>"#
        );
        assert_eq!(children[2].element.child_text("b"), Some("bold"));
        assert_eq!(children[3].raw, "<empty/>");
        assert_eq!(children[4].element.text, "In space <no one> can hear");
    }

    #[test]
    fn test_wrong_root() {
        let err = parse("<tvshow><title>x</title></tvshow>", "movie").unwrap_err();
        assert!(matches!(err, ParseError::WrongRoot { ref found, .. } if found == "tvshow"));
    }

    #[test]
    fn test_malformed() {
        assert!(parse("<movie><title>x</movie>", "movie").is_err());
        assert!(parse("<movie><title>x</title>", "movie").is_err());
        assert!(matches!(parse("", "movie"), Err(ParseError::NoRoot)));
        assert!(matches!(parse("just text", "movie"), Err(ParseError::NoRoot)));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("\u{feff}<a>\r\n</a>"), "<a>\n</a>");
    }
}
