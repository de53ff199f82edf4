//! Document envelope: head metadata and token-derived defaults around the body

use crate::compiler::Fragment;
use crate::document::Document;
use crate::tokens::DesignTokenSet;

use super::{Attrs, MarkupBuilder, MarkupConfig};

/// Nesting depth of block fragments (`mjml > mj-body > fragment`)
pub const BODY_INDENT: usize = 2;

/// Document-level metadata carried into the head
#[derive(Debug, Clone, Copy)]
pub struct Metadata<'a> {
    pub subject: &'a str,
    pub preheader: &'a str,
    pub locale: &'a str,
}

impl<'a> From<&'a Document> for Metadata<'a> {
    fn from(doc: &'a Document) -> Self {
        Self {
            subject: &doc.subject,
            preheader: &doc.preheader,
            locale: &doc.locale,
        }
    }
}

/// Wrap compiled fragments into a complete intermediate document
///
/// The head always precedes the body; fragments are emitted in slice order.
pub fn assemble(
    fragments: &[Fragment],
    metadata: &Metadata<'_>,
    tokens: &DesignTokenSet,
    config: &MarkupConfig,
) -> String {
    let mut builder = MarkupBuilder::new(config, 0);

    builder.open("mjml", &Attrs::new().set("lang", metadata.locale));
    add_head(&mut builder, metadata, tokens);

    builder.open(
        "mj-body",
        &Attrs::new()
            .set("background-color", &tokens.colors.background)
            .set("width", "600px"),
    );
    for fragment in fragments {
        builder.splice(fragment.as_str());
    }
    builder.close("mj-body");
    builder.close("mjml");

    builder.finish()
}

fn add_head(builder: &mut MarkupBuilder, metadata: &Metadata<'_>, tokens: &DesignTokenSet) {
    let colors = &tokens.colors;
    let body = &tokens.fonts.body;

    builder.open("mj-head", &Attrs::new());
    builder.text("mj-title", &Attrs::new(), metadata.subject);
    builder.text("mj-preview", &Attrs::new(), metadata.preheader);

    builder.open("mj-attributes", &Attrs::new());
    builder.empty("mj-all", &Attrs::new().set("font-family", &body.family));
    builder.empty(
        "mj-text",
        &Attrs::new()
            .set("font-size", &body.size)
            .set("font-weight", &body.weight)
            .set("line-height", &body.line_height)
            .set("color", &colors.text),
    );
    builder.empty(
        "mj-button",
        &Attrs::new()
            .set("background-color", &colors.primary)
            .set("color", &colors.on_primary)
            .set("border-radius", &tokens.radius.button),
    );
    builder.empty("mj-section", &Attrs::new().set("padding", &tokens.spacing.md));
    builder.close("mj-attributes");

    builder.open("mj-style", &Attrs::new());
    for rule in style_rules(tokens, builder.config()) {
        builder.line(rule);
    }
    builder.close("mj-style");

    builder.close("mj-head");
}

/// Reusable CSS rules referenced by `css-class` attributes in the fragments
pub fn style_rules(tokens: &DesignTokenSet, config: &MarkupConfig) -> Vec<String> {
    vec![
        format!(
            ".{} {{ text-align: center; padding: 0 {}; }}",
            config.class("hero-text"),
            tokens.spacing.md
        ),
        format!(
            ".{} {{ border: 1px solid #e2e8f0; border-radius: {}; margin-bottom: {}; }}",
            config.class("product-item"),
            tokens.radius.card,
            tokens.spacing.md
        ),
        format!(
            ".{} {{ border-radius: {}; }}",
            config.class("cta-button"),
            tokens.radius.button
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> Metadata<'static> {
        Metadata {
            subject: "Your cart",
            preheader: "Still thinking?",
            locale: "en",
        }
    }

    #[test]
    fn test_head_before_body() {
        let markup = assemble(
            &[],
            &metadata(),
            &DesignTokenSet::default(),
            &MarkupConfig::default(),
        );
        let head = markup.find("<mj-head>").expect("head");
        let body = markup.find("<mj-body").expect("body");
        assert!(head < body);
        assert!(markup.starts_with(r#"<mjml lang="en">"#));
        assert!(markup.trim_end().ends_with("</mjml>"));
    }

    #[test]
    fn test_metadata_is_escaped() {
        let meta = Metadata {
            subject: "Tom & Jerry <3",
            ..metadata()
        };
        let markup = assemble(
            &[],
            &meta,
            &DesignTokenSet::default(),
            &MarkupConfig::default(),
        );
        assert!(markup.contains("<mj-title>Tom &amp; Jerry &lt;3</mj-title>"));
        assert!(markup.contains("<mj-preview>Still thinking?</mj-preview>"));
    }

    #[test]
    fn test_token_defaults_in_head() {
        let tokens = DesignTokenSet::default();
        let markup = assemble(&[], &metadata(), &tokens, &MarkupConfig::default());
        assert!(markup.contains(r#"<mj-all font-family="Arial, sans-serif" />"#));
        assert!(markup.contains(r##"<mj-text font-size="16px" font-weight="400" line-height="1.5" color="#1e293b" />"##));
        assert!(markup.contains(r#"<mj-section padding="16px" />"#));
        assert!(markup.contains(r##"<mj-body background-color="#f8fafc" width="600px">"##));
    }

    #[test]
    fn test_fragments_spliced_in_order() {
        let fragments = vec![
            Fragment::new("    <mj-raw>first</mj-raw>\n".to_string()),
            Fragment::empty(),
            Fragment::new("    <mj-raw>second</mj-raw>\n".to_string()),
        ];
        let markup = assemble(
            &fragments,
            &metadata(),
            &DesignTokenSet::default(),
            &MarkupConfig::default(),
        );
        let first = markup.find("first").expect("first");
        let second = markup.find("second").expect("second");
        assert!(first < second);
        assert!(markup.contains("    <mj-raw>first</mj-raw>\n    <mj-raw>second</mj-raw>\n  </mj-body>"));
    }

    #[test]
    fn test_style_rules_use_spacing_and_prefix() {
        let config = MarkupConfig::new().with_class_prefix("mf-");
        let rules = style_rules(&DesignTokenSet::default(), &config);
        insta::assert_debug_snapshot!(rules, @r###"
        [
            ".mf-hero-text { text-align: center; padding: 0 16px; }",
            ".mf-product-item { border: 1px solid #e2e8f0; border-radius: 8px; margin-bottom: 16px; }",
            ".mf-cta-button { border-radius: 6px; }",
        ]
        "###);
    }
}
