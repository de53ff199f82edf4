//! Soft validation of the element tree
//!
//! Checks element placement, attribute names and content models against the
//! dialect's element table. Problems are warnings; nothing here fails.

use std::fmt;

use super::tree::{Element, Node};

/// A recoverable problem found while lowering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoweringWarning {
    pub category: WarningCategory,
    /// 1-based source line
    pub line: usize,
    pub message: String,
}

impl fmt::Display for LoweringWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] line {}: {}", self.category, self.line, self.message)
    }
}

/// Category of lowering problem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningCategory {
    Attribute,
    Element,
    Nesting,
    Structure,
}

impl fmt::Display for WarningCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningCategory::Attribute => write!(f, "attribute"),
            WarningCategory::Element => write!(f, "element"),
            WarningCategory::Nesting => write!(f, "nesting"),
            WarningCategory::Structure => write!(f, "structure"),
        }
    }
}

/// 1-based line number of a byte offset
pub(super) fn line_at(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    source.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() + 1
}

/// What an element may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Content {
    /// Dialect elements only
    Container,
    /// Text and inline HTML
    Ending,
    Empty,
    /// Opaque body captured by the lexer
    Raw,
}

#[derive(Debug, Clone, Copy)]
pub(super) enum Allowed {
    Any,
    Only(&'static [&'static str]),
}

#[derive(Debug)]
pub(super) struct ElementRule {
    pub name: &'static str,
    /// Empty means any parent
    pub parents: &'static [&'static str],
    pub attributes: Allowed,
    pub content: Content,
}

const SECTION_ATTRS: &[&str] = &[
    "background-color",
    "background-url",
    "background-repeat",
    "background-size",
    "border",
    "border-radius",
    "css-class",
    "direction",
    "full-width",
    "text-align",
    "padding",
    "padding-top",
    "padding-bottom",
    "padding-left",
    "padding-right",
];

const RULES: &[ElementRule] = &[
    ElementRule {
        name: "mjml",
        parents: &[],
        attributes: Allowed::Only(&["lang", "dir", "owa"]),
        content: Content::Container,
    },
    ElementRule {
        name: "mj-head",
        parents: &["mjml"],
        attributes: Allowed::Only(&[]),
        content: Content::Container,
    },
    ElementRule {
        name: "mj-body",
        parents: &["mjml"],
        attributes: Allowed::Only(&["background-color", "width", "css-class"]),
        content: Content::Container,
    },
    ElementRule {
        name: "mj-title",
        parents: &["mj-head"],
        attributes: Allowed::Only(&[]),
        content: Content::Ending,
    },
    ElementRule {
        name: "mj-preview",
        parents: &["mj-head"],
        attributes: Allowed::Only(&[]),
        content: Content::Ending,
    },
    ElementRule {
        name: "mj-attributes",
        parents: &["mj-head"],
        attributes: Allowed::Only(&[]),
        content: Content::Container,
    },
    ElementRule {
        name: "mj-all",
        parents: &["mj-attributes"],
        attributes: Allowed::Any,
        content: Content::Empty,
    },
    ElementRule {
        name: "mj-class",
        parents: &["mj-attributes"],
        attributes: Allowed::Any,
        content: Content::Empty,
    },
    ElementRule {
        name: "mj-style",
        parents: &["mj-head"],
        attributes: Allowed::Only(&["inline"]),
        content: Content::Ending,
    },
    ElementRule {
        name: "mj-font",
        parents: &["mj-head"],
        attributes: Allowed::Only(&["name", "href"]),
        content: Content::Empty,
    },
    ElementRule {
        name: "mj-breakpoint",
        parents: &["mj-head"],
        attributes: Allowed::Only(&["width"]),
        content: Content::Empty,
    },
    ElementRule {
        name: "mj-wrapper",
        parents: &["mj-body"],
        attributes: Allowed::Only(SECTION_ATTRS),
        content: Content::Container,
    },
    ElementRule {
        name: "mj-section",
        parents: &["mj-body", "mj-wrapper"],
        attributes: Allowed::Only(SECTION_ATTRS),
        content: Content::Container,
    },
    ElementRule {
        name: "mj-group",
        parents: &["mj-section"],
        attributes: Allowed::Only(&[
            "width",
            "background-color",
            "css-class",
            "direction",
            "vertical-align",
        ]),
        content: Content::Container,
    },
    ElementRule {
        name: "mj-column",
        parents: &["mj-section", "mj-group"],
        attributes: Allowed::Only(&[
            "width",
            "background-color",
            "inner-background-color",
            "border",
            "border-radius",
            "css-class",
            "vertical-align",
            "padding",
            "padding-top",
            "padding-bottom",
            "padding-left",
            "padding-right",
        ]),
        content: Content::Container,
    },
    ElementRule {
        name: "mj-text",
        parents: &["mj-column"],
        attributes: Allowed::Only(&[
            "align",
            "color",
            "container-background-color",
            "css-class",
            "font-family",
            "font-size",
            "font-style",
            "font-weight",
            "height",
            "letter-spacing",
            "line-height",
            "text-decoration",
            "text-transform",
            "padding",
            "padding-top",
            "padding-bottom",
            "padding-left",
            "padding-right",
        ]),
        content: Content::Ending,
    },
    ElementRule {
        name: "mj-button",
        parents: &["mj-column"],
        attributes: Allowed::Only(&[
            "align",
            "background-color",
            "border",
            "border-radius",
            "color",
            "container-background-color",
            "css-class",
            "font-family",
            "font-size",
            "font-style",
            "font-weight",
            "height",
            "href",
            "inner-padding",
            "line-height",
            "rel",
            "target",
            "text-align",
            "text-decoration",
            "text-transform",
            "title",
            "vertical-align",
            "width",
            "padding",
            "padding-top",
            "padding-bottom",
            "padding-left",
            "padding-right",
        ]),
        content: Content::Ending,
    },
    ElementRule {
        name: "mj-image",
        parents: &["mj-column"],
        attributes: Allowed::Only(&[
            "align",
            "alt",
            "border",
            "border-radius",
            "container-background-color",
            "css-class",
            "height",
            "href",
            "rel",
            "src",
            "target",
            "title",
            "width",
            "padding",
            "padding-top",
            "padding-bottom",
            "padding-left",
            "padding-right",
        ]),
        content: Content::Empty,
    },
    ElementRule {
        name: "mj-divider",
        parents: &["mj-column"],
        attributes: Allowed::Only(&[
            "align",
            "border-color",
            "border-style",
            "border-width",
            "container-background-color",
            "css-class",
            "width",
            "padding",
            "padding-top",
            "padding-bottom",
            "padding-left",
            "padding-right",
        ]),
        content: Content::Empty,
    },
    ElementRule {
        name: "mj-spacer",
        parents: &["mj-column"],
        attributes: Allowed::Only(&[
            "container-background-color",
            "css-class",
            "height",
            "padding",
            "padding-top",
            "padding-bottom",
            "padding-left",
            "padding-right",
        ]),
        content: Content::Empty,
    },
    ElementRule {
        name: "mj-raw",
        parents: &[],
        attributes: Allowed::Only(&["position"]),
        content: Content::Raw,
    },
];

pub(super) fn rule(name: &str) -> Option<&'static ElementRule> {
    RULES.iter().find(|r| r.name == name)
}

/// Whether a known element may appear under `parent`
pub(super) fn allowed_in(name: &str, parent: &str) -> bool {
    rule(name).is_some_and(|r| r.parents.is_empty() || r.parents.contains(&parent))
}

/// Run all checks on a tree rooted at `mjml`
pub fn check(root: &Element, source: &str) -> Vec<LoweringWarning> {
    let mut checker = Checker {
        source,
        warnings: Vec::new(),
    };
    checker.element(root, None, false);
    checker.structure(root);
    checker.warnings
}

struct Checker<'a> {
    source: &'a str,
    warnings: Vec<LoweringWarning>,
}

impl Checker<'_> {
    fn warn(&mut self, category: WarningCategory, element: &Element, message: String) {
        self.warnings.push(LoweringWarning {
            category,
            line: line_at(self.source, element.span.start),
            message,
        });
    }

    fn element(&mut self, element: &Element, parent: Option<&str>, in_defaults: bool) {
        let Some(rule) = rule(&element.name) else {
            let message = match parent {
                Some(parent) => format!(
                    "unknown element <{}> inside <{}>; ignored",
                    element.name, parent
                ),
                None => format!("unknown element <{}>; ignored", element.name),
            };
            self.warn(WarningCategory::Element, element, message);
            return;
        };

        // inside mj-attributes, elements carry defaults and may appear under any parent
        if let Some(parent) = parent {
            if !in_defaults && !allowed_in(&element.name, parent) {
                self.warn(
                    WarningCategory::Nesting,
                    element,
                    format!(
                        "<{}> is not allowed inside <{}>; ignored",
                        element.name, parent
                    ),
                );
            }
        }

        if let Allowed::Only(allowed) = rule.attributes {
            for (key, _) in element.attrs.iter() {
                if !allowed.contains(&key) && key != "mj-class" {
                    self.warn(
                        WarningCategory::Attribute,
                        element,
                        format!("unknown attribute '{}' on <{}>", key, element.name),
                    );
                }
            }
        }

        match rule.content {
            Content::Container => {
                let defaults = element.name == "mj-attributes";
                for child in &element.children {
                    match child {
                        Node::Element(child) => {
                            self.element(child, Some(element.name.as_str()), defaults)
                        }
                        Node::Text(text) if !text.trim().is_empty() => self.warn(
                            WarningCategory::Structure,
                            element,
                            format!("text directly inside <{}> ignored", element.name),
                        ),
                        Node::Text(_) => {}
                    }
                }
            }
            Content::Empty => {
                let has_content = element.children.iter().any(|child| match child {
                    Node::Element(_) => true,
                    Node::Text(text) => !text.trim().is_empty(),
                });
                if has_content {
                    self.warn(
                        WarningCategory::Structure,
                        element,
                        format!("<{}> takes no content; content ignored", element.name),
                    );
                }
            }
            Content::Ending | Content::Raw => {}
        }
    }

    /// Document-level shape: one head at most, one body
    fn structure(&mut self, root: &Element) {
        for name in ["mj-head", "mj-body"] {
            for duplicate in root.elements().filter(|e| e.name == name).skip(1) {
                self.warn(
                    WarningCategory::Structure,
                    duplicate,
                    format!("duplicate <{}> ignored", name),
                );
            }
        }
        if let Some(body) = root.child("mj-body") {
            if body.elements().next().is_none() {
                self.warn(
                    WarningCategory::Structure,
                    body,
                    "<mj-body> has no content".to_string(),
                );
            }
        }
    }
}
