//! Table-based HTML emission
//!
//! Sections become centered tables, columns become inline-block divs and
//! content elements become table rows. Attribute values resolve in order:
//! the element itself, its `mj-class`, the `mj-attributes` default for its
//! tag, `mj-all`, then the built-in default.

use std::collections::HashMap;

use crate::renderer::{Attrs, MarkupBuilder, MarkupConfig};

use super::tree::{Element, Node};
use super::validate::allowed_in;

const DEFAULT_FONT: &str = "Ubuntu, Helvetica, Arial, sans-serif";
const DEFAULT_WIDTH: &str = "600px";
const CONTENT_PADDING: &str = "10px 25px";

const BASE_CSS: &[&str] = &[
    "#outlook a { padding: 0; }",
    "body { margin: 0; padding: 0; -webkit-text-size-adjust: 100%; -ms-text-size-adjust: 100%; }",
    "table, td { border-collapse: collapse; mso-table-lspace: 0pt; mso-table-rspace: 0pt; }",
    "img { border: 0; height: auto; line-height: 100%; outline: none; text-decoration: none; -ms-interpolation-mode: bicubic; }",
    "p { display: block; margin: 13px 0; }",
    "@media only screen and (max-width: 480px) { .mj-column { width: 100% !important; max-width: 100% !important; } }",
];

const PREHEADER_STYLE: &str =
    "display:none;font-size:1px;color:#ffffff;line-height:1px;max-height:0px;max-width:0px;opacity:0;overflow:hidden;";

/// Inline style declarations in insertion order
#[derive(Debug, Default)]
struct Style(Vec<(String, String)>);

impl Style {
    fn new() -> Self {
        Self::default()
    }

    fn set(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.push((key.to_string(), value.into()));
        self
    }

    fn set_opt(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.set(key, value),
            None => self,
        }
    }

    fn render(&self) -> String {
        self.0.iter().map(|(k, v)| format!("{}:{};", k, v)).collect()
    }
}

/// Attribute defaults collected from `mj-attributes`
#[derive(Debug, Default)]
struct Defaults {
    all: Attrs,
    tags: HashMap<String, Attrs>,
    classes: HashMap<String, Attrs>,
}

impl Defaults {
    fn from_head(head: Option<&Element>) -> Self {
        let mut defaults = Defaults::default();
        let sets = head
            .into_iter()
            .flat_map(|h| h.elements())
            .filter(|e| e.name == "mj-attributes")
            .flat_map(|a| a.elements());
        for set in sets {
            match set.name.as_str() {
                "mj-all" => extend(&mut defaults.all, &set.attrs),
                "mj-class" => {
                    if let Some(name) = set.attr("name") {
                        let class = defaults.classes.entry(name.to_string()).or_default();
                        for (key, value) in set.attrs.iter().filter(|(k, _)| *k != "name") {
                            class.push(key, value);
                        }
                    }
                }
                tag => extend(defaults.tags.entry(tag.to_string()).or_default(), &set.attrs),
            }
        }
        defaults
    }

    fn resolve<'a>(&'a self, element: &'a Element, key: &str) -> Option<&'a str> {
        element
            .attr(key)
            .or_else(|| {
                element.attr("mj-class").and_then(|names| {
                    names
                        .split_whitespace()
                        .find_map(|name| self.classes.get(name).and_then(|c| c.get(key)))
                })
            })
            .or_else(|| self.tags.get(&element.name).and_then(|t| t.get(key)))
            .or_else(|| self.all.get(key))
    }
}

fn extend(into: &mut Attrs, from: &Attrs) {
    for (key, value) in from.iter() {
        into.push(key, value);
    }
}

/// Serialize inline content (text and HTML children) as written
fn inner_html(children: &[Node]) -> String {
    let mut out = String::new();
    for child in children {
        match child {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                if let Some(raw) = &element.raw {
                    out.push_str(raw);
                    continue;
                }
                out.push_str(&format!("<{}{}", element.name, element.attrs.render()));
                if element.is_void() {
                    out.push_str(" />");
                } else {
                    out.push('>');
                    out.push_str(&inner_html(&element.children));
                    out.push_str(&format!("</{}>", element.name));
                }
            }
        }
    }
    out
}

/// Pixel count for an HTML `width` attribute ("150px" → "150")
fn pixels(value: &str) -> &str {
    value.trim().trim_end_matches("px")
}

struct Emitter {
    defaults: Defaults,
    out: MarkupBuilder,
    body_width: String,
}

impl Emitter {
    fn attr<'a>(&'a self, element: &'a Element, key: &str) -> Option<&'a str> {
        self.defaults.resolve(element, key)
    }

    fn attr_or<'a>(&'a self, element: &'a Element, key: &str, default: &'a str) -> &'a str {
        self.attr(element, key).unwrap_or(default)
    }

    fn padding(&self, element: &Element, style: Style, default: &str) -> Style {
        let mut style = style.set("padding", self.attr_or(element, "padding", default));
        for side in ["top", "right", "bottom", "left"] {
            let key = format!("padding-{}", side);
            style = style.set_opt(&key, self.attr(element, &key));
        }
        style
    }

    fn css_class(&self, attrs: Attrs, element: &Element) -> Attrs {
        attrs.set_opt("class", element.attr("css-class"))
    }

    fn head(&mut self, head: Option<&Element>) {
        let title = head
            .and_then(|h| h.child("mj-title"))
            .map(|t| inner_html(&t.children))
            .unwrap_or_default();

        self.out.open("head", &Attrs::new());
        self.out.empty("meta", &Attrs::new().set("charset", "utf-8"));
        self.out.empty(
            "meta",
            &Attrs::new()
                .set("name", "viewport")
                .set("content", "width=device-width, initial-scale=1.0"),
        );
        self.out.empty(
            "meta",
            &Attrs::new()
                .set("http-equiv", "X-UA-Compatible")
                .set("content", "IE=edge"),
        );
        self.out.empty(
            "meta",
            &Attrs::new().set("name", "color-scheme").set("content", "light"),
        );
        self.out.empty(
            "meta",
            &Attrs::new()
                .set("name", "supported-color-schemes")
                .set("content", "light"),
        );
        self.out.html("title", &Attrs::new(), title.trim());

        for font in head.into_iter().flat_map(|h| h.elements()).filter(|e| e.name == "mj-font") {
            if let Some(href) = font.attr("href") {
                self.out.empty(
                    "link",
                    &Attrs::new()
                        .set("href", href)
                        .set("rel", "stylesheet")
                        .set("type", "text/css"),
                );
            }
        }

        self.out.open("style", &Attrs::new().set("type", "text/css"));
        for rule in BASE_CSS {
            self.out.line(rule);
        }
        let styles = head
            .into_iter()
            .flat_map(|h| h.elements())
            .filter(|e| e.name == "mj-style");
        for style in styles {
            for line in style.text().lines().map(str::trim).filter(|l| !l.is_empty()) {
                self.out.line(line);
            }
        }
        self.out.close("style");
        self.out.close("head");
    }

    fn body(&mut self, body: &Element, preview: Option<&Element>) {
        let style = Style::new()
            .set("margin", "0")
            .set("padding", "0")
            .set_opt("background-color", self.attr(body, "background-color"));
        self.out.open("body", &Attrs::new().set("style", style.render()));

        if let Some(preview) = preview {
            let text = inner_html(&preview.children);
            if !text.trim().is_empty() {
                self.out.html(
                    "div",
                    &Attrs::new().set("style", PREHEADER_STYLE),
                    text.trim(),
                );
            }
        }

        let wrapper = Style::new()
            .set("margin", "0px auto")
            .set("max-width", self.body_width.clone())
            .set_opt("background-color", self.attr(body, "background-color"));
        let attrs = self.css_class(Attrs::new().set("style", wrapper.render()), body);
        self.out.open("div", &attrs);
        for child in body.elements() {
            if allowed_in(&child.name, "mj-body") {
                self.section_level(child);
            }
        }
        self.out.close("div");
        self.out.close("body");
    }

    fn section_level(&mut self, element: &Element) {
        match element.name.as_str() {
            "mj-section" => self.section(element),
            "mj-wrapper" => self.wrapper(element),
            "mj-raw" => self.raw(element),
            _ => {}
        }
    }

    /// Open the centered outer div, table and cell shared by sections and wrappers
    fn open_section_box(&mut self, element: &Element) {
        let background = self.attr(element, "background-color").map(str::to_string);
        let background = background.as_deref();
        let outer = Style::new()
            .set("margin", "0px auto")
            .set("max-width", self.body_width.clone())
            .set_opt("background", background)
            .set_opt("background-color", background)
            .set_opt("border-radius", self.attr(element, "border-radius"));
        let attrs = self.css_class(Attrs::new().set("style", outer.render()), element);
        self.out.open("div", &attrs);

        let table = Style::new()
            .set("width", "100%")
            .set_opt("background", background)
            .set_opt("background-color", background);
        self.out.open(
            "table",
            &Attrs::new()
                .set("align", "center")
                .set("border", "0")
                .set("cellpadding", "0")
                .set("cellspacing", "0")
                .set("role", "presentation")
                .set("style", table.render()),
        );
        self.out.open("tbody", &Attrs::new());
        self.out.open("tr", &Attrs::new());

        let cell = Style::new()
            .set("direction", self.attr_or(element, "direction", "ltr"))
            .set("font-size", "0px");
        let cell = self
            .padding(element, cell, "20px 0")
            .set_opt("border", self.attr(element, "border"))
            .set("text-align", self.attr_or(element, "text-align", "center"));
        self.out.open("td", &Attrs::new().set("style", cell.render()));
    }

    fn close_section_box(&mut self) {
        self.out.close("td");
        self.out.close("tr");
        self.out.close("tbody");
        self.out.close("table");
        self.out.close("div");
    }

    fn section(&mut self, section: &Element) {
        self.open_section_box(section);
        let columns: Vec<&Element> = section
            .elements()
            .filter(|e| allowed_in(&e.name, "mj-section"))
            .collect();
        let count = columns
            .iter()
            .filter(|e| e.name == "mj-column" || e.name == "mj-group")
            .count()
            .max(1);
        let share = format!("{}%", 100 / count);
        for child in columns {
            match child.name.as_str() {
                "mj-column" => self.column(child, &share),
                "mj-group" => self.group(child, &share),
                "mj-raw" => self.raw(child),
                _ => {}
            }
        }
        self.close_section_box();
    }

    fn wrapper(&mut self, wrapper: &Element) {
        self.open_section_box(wrapper);
        for child in wrapper.elements() {
            if allowed_in(&child.name, "mj-wrapper") {
                self.section_level(child);
            }
        }
        self.close_section_box();
    }

    fn group(&mut self, group: &Element, share: &str) {
        let width = self.attr_or(group, "width", share).to_string();
        let style = Style::new()
            .set("font-size", "0")
            .set("line-height", "0")
            .set("text-align", "left")
            .set("display", "inline-block")
            .set("width", "100%")
            .set("max-width", width)
            .set("direction", self.attr_or(group, "direction", "ltr"))
            .set("vertical-align", self.attr_or(group, "vertical-align", "top"))
            .set_opt("background-color", self.attr(group, "background-color"));
        self.out
            .open("div", &Attrs::new().set("class", "mj-column").set("style", style.render()));
        let columns: Vec<&Element> = group
            .elements()
            .filter(|e| allowed_in(&e.name, "mj-group"))
            .collect();
        let inner = format!("{}%", 100 / columns.len().max(1));
        for column in columns {
            self.column(column, &inner);
        }
        self.out.close("div");
    }

    fn column(&mut self, column: &Element, share: &str) {
        let width = self.attr_or(column, "width", share).to_string();
        let outer = Style::new()
            .set("font-size", "0px")
            .set("text-align", "left")
            .set("direction", "ltr")
            .set("display", "inline-block")
            .set("vertical-align", self.attr_or(column, "vertical-align", "top"))
            .set("width", "100%")
            .set("max-width", width);
        let class = match column.attr("css-class") {
            Some(extra) => format!("mj-column {}", extra),
            None => "mj-column".to_string(),
        };
        self.out.open(
            "div",
            &Attrs::new().set("class", class).set("style", outer.render()),
        );

        let table = Style::new()
            .set_opt("background-color", self.attr(column, "background-color"))
            .set_opt("border", self.attr(column, "border"))
            .set_opt("border-radius", self.attr(column, "border-radius"))
            .set("vertical-align", self.attr_or(column, "vertical-align", "top"));
        self.out.open(
            "table",
            &Attrs::new()
                .set("border", "0")
                .set("cellpadding", "0")
                .set("cellspacing", "0")
                .set("role", "presentation")
                .set("style", table.render())
                .set("width", "100%"),
        );
        self.out.open("tbody", &Attrs::new());
        for child in column.elements() {
            if !allowed_in(&child.name, "mj-column") {
                continue;
            }
            match child.name.as_str() {
                "mj-text" => self.text(child),
                "mj-button" => self.button(child),
                "mj-image" => self.image(child),
                "mj-divider" => self.divider(child),
                "mj-spacer" => self.spacer(child),
                "mj-raw" => {
                    self.out.open("tr", &Attrs::new());
                    self.out.open("td", &Attrs::new());
                    self.raw(child);
                    self.out.close("td");
                    self.out.close("tr");
                }
                _ => {}
            }
        }
        self.out.close("tbody");
        self.out.close("table");
        self.out.close("div");
    }

    /// Open a content row: `<tr><td align=.. style="padding..">`
    fn open_cell(&mut self, element: &Element, align: &str) {
        let style = Style::new().set("font-size", "0px");
        let style = self
            .padding(element, style, CONTENT_PADDING)
            .set_opt("background", self.attr(element, "container-background-color"))
            .set("word-break", "break-word");
        let attrs = self.css_class(
            Attrs::new().set("align", align).set("style", style.render()),
            element,
        );
        self.out.open("tr", &Attrs::new());
        self.out.open("td", &attrs);
    }

    fn close_cell(&mut self) {
        self.out.close("td");
        self.out.close("tr");
    }

    fn text(&mut self, text: &Element) {
        let align = self.attr_or(text, "align", "left").to_string();
        self.open_cell(text, &align);
        let style = Style::new()
            .set("font-family", self.attr_or(text, "font-family", DEFAULT_FONT))
            .set("font-size", self.attr_or(text, "font-size", "13px"))
            .set_opt("font-style", self.attr(text, "font-style"))
            .set_opt("font-weight", self.attr(text, "font-weight"))
            .set_opt("letter-spacing", self.attr(text, "letter-spacing"))
            .set("line-height", self.attr_or(text, "line-height", "1"))
            .set("text-align", align.clone())
            .set_opt("text-decoration", self.attr(text, "text-decoration"))
            .set_opt("text-transform", self.attr(text, "text-transform"))
            .set("color", self.attr_or(text, "color", "#000000"))
            .set_opt("height", self.attr(text, "height"));
        let inner = inner_html(&text.children);
        self.out
            .html("div", &Attrs::new().set("style", style.render()), inner.trim());
        self.close_cell();
    }

    fn button(&mut self, button: &Element) {
        let align = self.attr_or(button, "align", "center").to_string();
        let background = self.attr_or(button, "background-color", "#414141").to_string();
        let radius = self.attr_or(button, "border-radius", "3px").to_string();
        self.open_cell(button, &align);

        self.out.open(
            "table",
            &Attrs::new()
                .set("border", "0")
                .set("cellpadding", "0")
                .set("cellspacing", "0")
                .set("role", "presentation")
                .set("style", "border-collapse:separate;line-height:100%;")
                .set_opt("width", self.attr(button, "width")),
        );
        self.out.open("tbody", &Attrs::new());
        self.out.open("tr", &Attrs::new());
        let cell = Style::new()
            .set("border", self.attr_or(button, "border", "none"))
            .set("border-radius", radius.clone())
            .set("cursor", "auto")
            .set("background", background.clone());
        self.out.open(
            "td",
            &Attrs::new()
                .set("align", "center")
                .set("bgcolor", background.clone())
                .set("role", "presentation")
                .set("style", cell.render())
                .set("valign", self.attr_or(button, "vertical-align", "middle")),
        );

        let link = Style::new()
            .set("display", "inline-block")
            .set("background", background)
            .set("color", self.attr_or(button, "color", "#ffffff"))
            .set("font-family", self.attr_or(button, "font-family", DEFAULT_FONT))
            .set("font-size", self.attr_or(button, "font-size", "13px"))
            .set("font-weight", self.attr_or(button, "font-weight", "normal"))
            .set("line-height", self.attr_or(button, "line-height", "120%"))
            .set("margin", "0")
            .set(
                "text-decoration",
                self.attr_or(button, "text-decoration", "none"),
            )
            .set("text-transform", self.attr_or(button, "text-transform", "none"))
            .set("padding", self.attr_or(button, "inner-padding", "10px 25px"))
            .set("border-radius", radius);
        let inner = inner_html(&button.children);
        self.out.html(
            "a",
            &Attrs::new()
                .set("href", self.attr_or(button, "href", "#"))
                .set_opt("rel", self.attr(button, "rel"))
                .set("style", link.render())
                .set("target", self.attr_or(button, "target", "_blank")),
            inner.trim(),
        );

        self.out.close("td");
        self.out.close("tr");
        self.out.close("tbody");
        self.out.close("table");
        self.close_cell();
    }

    fn image(&mut self, image: &Element) {
        let align = self.attr_or(image, "align", "center").to_string();
        self.open_cell(image, &align);
        let width = self.attr(image, "width").map(str::to_string);

        let style = Style::new()
            .set("border", self.attr_or(image, "border", "0"))
            .set_opt("border-radius", self.attr(image, "border-radius"))
            .set("display", "block")
            .set("outline", "none")
            .set("text-decoration", "none")
            .set("height", self.attr_or(image, "height", "auto"))
            .set("width", "100%")
            .set_opt("max-width", width.as_deref());
        let img = Attrs::new()
            .set("src", self.attr_or(image, "src", ""))
            .set("alt", self.attr_or(image, "alt", ""))
            .set_opt("title", self.attr(image, "title"))
            .set_opt("width", width.as_deref().map(pixels))
            .set("style", style.render());

        match self.attr(image, "href").map(str::to_string) {
            Some(href) => {
                self.out.open(
                    "a",
                    &Attrs::new()
                        .set("href", href)
                        .set("target", self.attr_or(image, "target", "_blank")),
                );
                self.out.empty("img", &img);
                self.out.close("a");
            }
            None => self.out.empty("img", &img),
        }
        self.close_cell();
    }

    fn divider(&mut self, divider: &Element) {
        let align = self.attr_or(divider, "align", "center").to_string();
        self.open_cell(divider, &align);
        let border = format!(
            "{} {} {}",
            self.attr_or(divider, "border-style", "solid"),
            self.attr_or(divider, "border-width", "4px"),
            self.attr_or(divider, "border-color", "#000000")
        );
        let style = Style::new()
            .set("border-top", border)
            .set("font-size", "1px")
            .set("margin", "0px auto")
            .set("width", self.attr_or(divider, "width", "100%"));
        self.out
            .html("p", &Attrs::new().set("style", style.render()), "");
        self.close_cell();
    }

    fn spacer(&mut self, spacer: &Element) {
        let height = self.attr_or(spacer, "height", "20px").to_string();
        self.open_cell(spacer, "left");
        let style = Style::new()
            .set("height", height.clone())
            .set("line-height", height);
        self.out
            .html("div", &Attrs::new().set("style", style.render()), "&#8202;");
        self.close_cell();
    }

    fn raw(&mut self, raw: &Element) {
        if let Some(body) = &raw.raw {
            self.out.verbatim(body);
        }
    }
}

/// Emit the HTML document for a validated `mjml` root with a body
pub(super) fn emit(root: &Element, body: &Element, config: &MarkupConfig) -> String {
    let head = root.child("mj-head");
    let defaults = Defaults::from_head(head);
    let body_width = body.attr("width").unwrap_or(DEFAULT_WIDTH).to_string();
    let mut emitter = Emitter {
        defaults,
        out: MarkupBuilder::new(config, 0),
        body_width,
    };

    emitter.out.line("<!doctype html>");
    emitter.out.open(
        "html",
        &Attrs::new()
            .set("lang", root.attr("lang").unwrap_or("en"))
            .set("xmlns", "http://www.w3.org/1999/xhtml"),
    );
    emitter.head(head);
    emitter.body(body, head.and_then(|h| h.child("mj-preview")));
    emitter.out.close("html");
    emitter.out.finish()
}
