//! Tolerant element tree builder
//!
//! Never fails: misnested and unclosed tags are repaired and each repair is
//! recorded as a warning.

use crate::error::Span;
use crate::renderer::Attrs;

use super::lexer::MarkupToken;
use super::validate::{line_at, LoweringWarning, WarningCategory};

/// HTML elements that never have content or a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Character data as written in the source
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: Attrs,
    pub children: Vec<Node>,
    /// Span of the start tag
    pub span: Span,
    pub raw: Option<String>,
}

impl Element {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key)
    }

    /// Child elements, skipping text
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    /// Concatenated text of the direct text children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.name.as_str())
    }
}

struct TreeBuilder<'a> {
    source: &'a str,
    roots: Vec<Node>,
    stack: Vec<Element>,
    warnings: &'a mut Vec<LoweringWarning>,
}

impl<'a> TreeBuilder<'a> {
    fn warn(&mut self, category: WarningCategory, offset: usize, message: String) {
        self.warnings.push(LoweringWarning {
            category,
            line: line_at(self.source, offset),
            message,
        });
    }

    fn attach(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    fn start(&mut self, name: String, attrs: Attrs, self_closing: bool, raw: Option<String>, span: Span) {
        let element = Element {
            name,
            attrs,
            children: vec![],
            span,
            raw,
        };
        if self_closing || element.is_void() {
            self.attach(Node::Element(element));
        } else {
            self.stack.push(element);
        }
    }

    fn end(&mut self, name: String, span: Span) {
        let Some(index) = self.stack.iter().rposition(|e| e.name == name) else {
            if !VOID_ELEMENTS.contains(&name.as_str()) {
                self.warn(
                    WarningCategory::Nesting,
                    span.start,
                    format!("closing tag </{}> has no matching start tag; ignored", name),
                );
            }
            return;
        };
        while self.stack.len() > index + 1 {
            if let Some(open) = self.stack.pop() {
                self.warn(
                    WarningCategory::Nesting,
                    span.start,
                    format!("<{}> closed implicitly by </{}>", open.name, name),
                );
                self.attach(Node::Element(open));
            }
        }
        if let Some(element) = self.stack.pop() {
            self.attach(Node::Element(element));
        }
    }

    fn text(&mut self, text: String, span: Span) {
        if self.stack.is_empty() {
            if !text.trim().is_empty() {
                self.warn(
                    WarningCategory::Structure,
                    span.start,
                    "text outside the root element ignored".to_string(),
                );
            }
            return;
        }
        self.attach(Node::Text(text));
    }

    fn finish(mut self) -> Vec<Node> {
        while let Some(open) = self.stack.pop() {
            self.warn(
                WarningCategory::Structure,
                open.span.start,
                format!("<{}> is never closed", open.name),
            );
            self.attach(Node::Element(open));
        }
        self.roots
    }
}

/// Build the element tree from lexed tokens, repairing what it can
pub fn build(
    source: &str,
    tokens: Vec<(MarkupToken, Span)>,
    warnings: &mut Vec<LoweringWarning>,
) -> Vec<Node> {
    let mut builder = TreeBuilder {
        source,
        roots: vec![],
        stack: vec![],
        warnings,
    };
    for (token, span) in tokens {
        match token {
            MarkupToken::StartTag(tag) => {
                builder.start(tag.name, tag.attrs, tag.self_closing, tag.raw, span)
            }
            MarkupToken::EndTag(name) => builder.end(name, span),
            MarkupToken::Text(text) => builder.text(text, span),
            MarkupToken::Comment | MarkupToken::Declaration => {}
        }
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lowering::lexer::lex;

    fn parse(source: &str) -> (Vec<Node>, Vec<LoweringWarning>) {
        let mut warnings = vec![];
        let tokens = lex(source).expect("Should lex");
        let nodes = build(source, tokens, &mut warnings);
        (nodes, warnings)
    }

    fn root(nodes: &[Node]) -> &Element {
        match nodes.first() {
            Some(Node::Element(element)) => element,
            other => panic!("Expected root element, got {:?}", other),
        }
    }

    #[test]
    fn test_well_formed_tree() {
        let (nodes, warnings) = parse("<mjml><mj-body><mj-section></mj-section></mj-body></mjml>");
        assert!(warnings.is_empty());
        let mjml = root(&nodes);
        assert_eq!(mjml.name, "mjml");
        let body = mjml.child("mj-body").expect("body");
        assert_eq!(body.elements().count(), 1);
    }

    #[test]
    fn test_implicit_close_is_repaired() {
        let (nodes, warnings) = parse("<mj-column><mj-text>Hi</mj-column>");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].category, WarningCategory::Nesting);
        assert!(warnings[0].message.contains("<mj-text> closed implicitly"));
        let column = root(&nodes);
        assert_eq!(column.child("mj-text").expect("text").text(), "Hi");
    }

    #[test]
    fn test_stray_end_tag_is_dropped() {
        let (nodes, warnings) = parse("<mjml></mj-section></mjml>");
        assert_eq!(nodes.len(), 1);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("</mj-section>"));
    }

    #[test]
    fn test_unclosed_elements_reported_with_line() {
        let (nodes, warnings) = parse("<mjml>\n  <mj-body>\n");
        assert_eq!(root(&nodes).child("mj-body").map(|b| b.name.as_str()), Some("mj-body"));
        let lines: Vec<usize> = warnings.iter().map(|w| w.line).collect();
        assert_eq!(lines, vec![2, 1]);
    }

    #[test]
    fn test_void_elements_need_no_close() {
        let (nodes, warnings) = parse("<mj-text>a<br>b</br></mj-text>");
        assert!(warnings.is_empty());
        assert_eq!(root(&nodes).children.len(), 3);
    }
}
