//! Line-oriented markup writer shared by the block compilers, the assembler
//! and the HTML lowering

use super::MarkupConfig;

/// Ordered attribute list; values are escaped when written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs(Vec<(String, String)>);

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// Add an attribute only when the value is present and non-empty
    pub fn set_opt(mut self, key: impl Into<String>, value: Option<&str>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.push(key, value);
        }
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// First value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as ` key="value"` pairs
    pub fn render(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!(r#" {}="{}""#, k, escape_xml(v)))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Build markup incrementally, one line per element
pub struct MarkupBuilder {
    config: MarkupConfig,
    lines: Vec<String>,
    indent: usize,
}

impl MarkupBuilder {
    /// Create a builder whose first line sits at `indent` levels
    pub fn new(config: &MarkupConfig, indent: usize) -> Self {
        Self {
            config: config.clone(),
            lines: vec![],
            indent,
        }
    }

    pub fn config(&self) -> &MarkupConfig {
        &self.config
    }

    fn indent_str(&self) -> String {
        if self.config.pretty_print {
            " ".repeat(self.indent * self.config.indent_width)
        } else {
            String::new()
        }
    }

    fn newline(&self) -> &str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    /// Add a verbatim line at the current indentation
    pub fn line(&mut self, raw: impl AsRef<str>) {
        let line = format!("{}{}", self.indent_str(), raw.as_ref());
        self.lines.push(line);
    }

    /// Start an element; children go one level deeper
    pub fn open(&mut self, tag: &str, attrs: &Attrs) {
        self.line(format!("<{}{}>", tag, attrs.render()));
        self.indent += 1;
    }

    /// Close an element opened with [`MarkupBuilder::open`]
    pub fn close(&mut self, tag: &str) {
        self.indent = self.indent.saturating_sub(1);
        self.line(format!("</{}>", tag));
    }

    /// Add a self-closing element
    pub fn empty(&mut self, tag: &str, attrs: &Attrs) {
        self.line(format!("<{}{} />", tag, attrs.render()));
    }

    /// Add an element whose content is escaped text
    pub fn text(&mut self, tag: &str, attrs: &Attrs, text: &str) {
        self.html(tag, attrs, &escape_xml(text));
    }

    /// Add an element whose content is already markup
    pub fn html(&mut self, tag: &str, attrs: &Attrs, inner: &str) {
        self.line(format!("<{}{}>{}</{}>", tag, attrs.render(), inner, tag));
    }

    /// Append the finished output of another builder as one entry
    ///
    /// Line breaks inside `markup` are kept as written; only the final line
    /// break is dropped, since [`finish`](Self::finish) adds its own.
    pub fn splice(&mut self, markup: &str) {
        let markup = markup.strip_suffix('\n').unwrap_or(markup);
        if !markup.is_empty() {
            self.lines.push(markup.to_string());
        }
    }

    /// Append markup exactly as given, without indentation
    pub fn verbatim(&mut self, markup: &str) {
        if !markup.is_empty() {
            self.lines.push(markup.to_string());
        }
    }

    /// Build the final markup string
    pub fn finish(self) -> String {
        let nl = self.newline();
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push_str(nl);
        }
        out
    }
}

/// Escape special XML characters
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Decode the five predefined entities and numeric character references
///
/// Unrecognized entities are kept as written.
pub fn unescape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').and_then(|semi| {
            let entity = &tail[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, semi))
        });
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
