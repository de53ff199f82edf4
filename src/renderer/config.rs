//! Configuration for markup output

/// Configuration options for intermediate and final markup
#[derive(Debug, Clone)]
pub struct MarkupConfig {
    /// Whether to format output with newlines and indentation
    pub pretty_print: bool,

    /// Spaces per nesting level when pretty-printing
    pub indent_width: usize,

    /// Prefix for CSS class names (e.g., "mf-" for "mf-hero-text")
    pub class_prefix: Option<String>,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            pretty_print: true,
            indent_width: 2,
            class_prefix: None,
        }
    }
}

impl MarkupConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to pretty-print output
    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    /// Set the indentation width
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    /// Set the CSS class prefix
    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = Some(prefix.into());
        self
    }

    /// Remove the CSS class prefix
    pub fn without_class_prefix(mut self) -> Self {
        self.class_prefix = None;
        self
    }

    /// A class name with the configured prefix applied
    pub fn class(&self, name: &str) -> String {
        format!("{}{}", self.class_prefix.as_deref().unwrap_or_default(), name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MarkupConfig::default();
        assert!(config.pretty_print);
        assert_eq!(config.indent_width, 2);
        assert_eq!(config.class_prefix, None);
        assert_eq!(config.class("hero-text"), "hero-text");
    }

    #[test]
    fn test_builder_pattern() {
        let config = MarkupConfig::new()
            .with_pretty_print(false)
            .with_indent_width(4)
            .with_class_prefix("mf-");

        assert!(!config.pretty_print);
        assert_eq!(config.indent_width, 4);
        assert_eq!(config.class("hero-text"), "mf-hero-text");
        assert_eq!(config.without_class_prefix().class_prefix, None);
    }
}
