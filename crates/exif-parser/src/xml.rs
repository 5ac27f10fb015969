use std::collections::BTreeMap;
use std::rc::Rc;

use exif_core::{ExifError, SourceLocation, SourceSpan};
use roxmltree::{Document, Node, NodeType};

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptDocument {
    pub root: Rc<ScriptElement>,
}

/// An immutable element of a parsed script. `children` holds element children
/// only; `inner_markup` is the raw source between the start and end tags.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptElement {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<Rc<ScriptElement>>,
    pub inner_markup: String,
    pub location: SourceSpan,
}

impl ScriptElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }
}

pub fn parse_script_document(source: &str) -> Result<ScriptDocument, ExifError> {
    let document = Document::parse(source)
        .map_err(|error| ExifError::new("XML_PARSE_ERROR", error.to_string()))?;

    let Some(root) = document.root().children().find(|node| node.is_element()) else {
        return Err(ExifError::new(
            "XML_PARSE_ERROR",
            "XML document must contain a root element.",
        ));
    };

    Ok(ScriptDocument {
        root: Rc::new(parse_element(&document, source, root)),
    })
}

fn parse_element(document: &Document<'_>, source: &str, node: Node<'_, '_>) -> ScriptElement {
    let mut attributes = BTreeMap::new();
    for attribute in node.attributes() {
        attributes.insert(attribute.name().to_string(), attribute.value().to_string());
    }

    let mut children = Vec::new();
    for child in node.children() {
        if child.node_type() == NodeType::Element {
            children.push(Rc::new(parse_element(document, source, child)));
        }
    }

    ScriptElement {
        name: node.tag_name().name().to_string(),
        attributes,
        children,
        inner_markup: inner_markup(source, node),
        location: node_span(document, node.range().start, node.range().end),
    }
}

fn inner_markup(source: &str, node: Node<'_, '_>) -> String {
    let (Some(first), Some(last)) = (node.first_child(), node.last_child()) else {
        return String::new();
    };
    source
        .get(first.range().start..last.range().end)
        .unwrap_or_default()
        .to_string()
}

fn node_span(document: &Document<'_>, start: usize, end: usize) -> SourceSpan {
    let start_pos = document.text_pos_at(start);
    let end_pos = document.text_pos_at(end);
    SourceSpan {
        start: SourceLocation {
            line: start_pos.row as usize,
            column: start_pos.col as usize,
        },
        end: SourceLocation {
            line: end_pos.row as usize,
            column: end_pos.col as usize,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_builds_element_tree_without_text_nodes() {
        let source = r#"<exif><block id="start"><title>Hi</title> loose text <text speaker="Ann">Hello</text></block></exif>"#;
        let document = parse_script_document(source).expect("xml should parse");
        assert_eq!(document.root.name, "exif");
        assert_eq!(document.root.children.len(), 1);

        let block = &document.root.children[0];
        assert_eq!(block.id(), Some("start"));
        assert_eq!(block.children.len(), 2);
        assert_eq!(block.children[0].name, "title");
        assert_eq!(block.children[1].attr("speaker"), Some("Ann"));
        assert_eq!(block.children[1].attr("missing"), None);
    }

    #[test]
    fn inner_markup_keeps_nested_markup_and_comments() {
        let source = "<exif><text>  Hello <b>there</b><!-- aside --> friend  </text><pause/></exif>";
        let document = parse_script_document(source).expect("xml should parse");
        let text = &document.root.children[0];
        assert_eq!(text.inner_markup, "  Hello <b>there</b><!-- aside --> friend  ");
        assert_eq!(text.children.len(), 1);
        assert_eq!(document.root.children[1].inner_markup, "");
    }

    #[test]
    fn locations_track_source_lines() {
        let source = "<exif>\n  <block id=\"a\">\n    <pause/>\n  </block>\n</exif>";
        let document = parse_script_document(source).expect("xml should parse");
        let block = &document.root.children[0];
        assert_eq!(block.location.start.line, 2);
        assert_eq!(block.children[0].location.start.line, 3);
    }

    #[test]
    fn parse_returns_error_for_invalid_xml() {
        let error = parse_script_document("<exif><block>").expect_err("invalid xml should fail");
        assert_eq!(error.code, "XML_PARSE_ERROR");
        assert!(error.is_load_failure());
    }
}
