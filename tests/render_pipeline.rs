//! End-to-end tests for the render pipeline

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mailforge::{
    render, render_json, render_with_config, ContentBlock, DirTokenStore, Document, FooterBlock,
    HeroBlock, LoweringError, MarkupConfig, MjmlLowerer, ProductListBlock, ProductRef,
    RenderConfig, RenderError,
};
use pretty_assertions::assert_eq;

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e))
}

fn fixture_dir(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn test_cart_abandon_scenario() {
    let result = render_json(&fixture("cart_abandon.json"), &RenderConfig::new())
        .expect("Should render");
    let mjml = &result.intermediate_markup;

    assert_eq!(result.tokens_version, "1.0.0");
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);

    assert_eq!(mjml.matches(">H</mj-text>").count(), 1);
    assert!(!mjml.contains("<mj-image"));
    // head default, heading, legal line and link line; no subcopy
    assert_eq!(mjml.matches("<mj-text").count(), 4);
    let hero_start = mjml.find(">H</mj-text>").expect("hero");
    let footer_start = mjml.find(">L</mj-text>").expect("footer");
    assert!(hero_start < footer_start);

    let footer = &mjml[footer_start..];
    let pu = footer.find(r#"href="pu""#).expect("preferences link");
    let uu = footer.find(r#"href="uu""#).expect("unsubscribe link");
    assert!(pu < uu);

    // the head carries an mj-section default; count only body sections
    let body = &mjml[mjml.find("<mj-body").expect("body")..];
    assert_eq!(body.matches("<mj-section").count(), 2);
    let sections: Vec<&str> = body.split("<mj-section").skip(1).collect();
    assert!(sections[0].contains(">H</mj-text>"));
    assert_eq!(sections.iter().filter(|s| s.contains(">L</mj-text>")).count(), 1);
    assert!(sections[1].contains(">L</mj-text>"));
}

#[test]
fn test_cart_abandon_snapshot() {
    let doc = Document::from_json(&fixture("cart_abandon.json")).expect("Should parse");
    let result = render(&doc).expect("Should render");
    let body: Vec<&str> = result
        .intermediate_markup
        .lines()
        .skip_while(|l| !l.contains("<mj-body"))
        .map(str::trim)
        .collect();
    insta::assert_snapshot!(body.join("\n"), @r###"
    <mj-body background-color="#f8fafc" width="600px">
    <mj-section background-color="#ffffff" padding="32px">
    <mj-column>
    <mj-text css-class="hero-text" font-family="Arial, sans-serif" font-size="24px" font-weight="700" line-height="1.2" color="#1e293b" padding-top="24px">H</mj-text>
    </mj-column>
    </mj-section>
    <mj-section background-color="#64748b" padding="24px">
    <mj-column>
    <mj-text align="center" color="#ffffff" font-size="12px">L</mj-text>
    <mj-text align="center" color="#ffffff" font-size="12px" padding-top="16px"><a href="pu" style="color:#ffffff;">Manage preferences</a> | <a href="uu" style="color:#ffffff;">Unsubscribe</a></mj-text>
    </mj-column>
    </mj-section>
    </mj-body>
    </mjml>
    "###);
}

#[test]
fn test_final_html_shape() {
    let result = render_json(&fixture("cart_abandon.json"), &RenderConfig::new())
        .expect("Should render");
    let html = &result.final_markup;

    assert!(html.starts_with("<!doctype html>"));
    assert!(html.contains(r#"<html lang="en""#));
    assert!(html.contains(r#"<meta charset="utf-8" />"#));
    assert!(html.contains("<title>S</title>"));
    assert!(html.contains(">P</div>"));
    assert!(html.contains(">H</div>"));
    assert!(html.contains(r#"<a href="pu""#));
    assert!(!html.contains("<mj-"));
}

#[test]
fn test_full_document_with_token_store() {
    let config = RenderConfig::new()
        .with_token_store(Arc::new(DirTokenStore::new(fixture_dir("tokens"))));
    let result = render_json(&fixture("order_confirmation.json"), &config).expect("Should render");
    let mjml = &result.intermediate_markup;

    assert_eq!(result.tokens_version, "2024.06");
    assert_eq!(
        result.warnings,
        vec!["unknown block type 'countdown' at position 2; block skipped".to_string()]
    );

    // stored override on top of the category's built-in blue
    assert!(mjml.contains(r##"background-color="#7c3aed""##));
    assert!(!mjml.contains("#2563eb"));
    assert!(mjml.contains(r#"font-size="30px""#));
    assert!(mjml.contains(r#"padding="40px""#));
    // untouched heading leaves survive the merge
    assert!(mjml.contains(r#"font-weight="700""#));

    assert!(mjml.starts_with(r#"<mjml lang="de">"#));
    assert!(mjml.contains("src=email&amp;step=track"));
    assert_eq!(mjml.matches(r#"css-class="product-item""#).count(), 2);
    assert_eq!(mjml.matches(r#"width="33%""#).count(), 3);
    assert!(!mjml.contains("Enamel Pin"));
    assert!(result.final_markup.contains(r#"<html lang="de""#));
}

#[test]
fn test_block_order_is_preserved() {
    let doc = Document::new("post_purchase")
        .with_block(ContentBlock::Footer(FooterBlock::new("legal first", "p", "u")))
        .with_block(ContentBlock::Items(ProductListBlock::new(
            "Bought",
            vec![ProductRef::new("A1", "Alpha", "$1")],
        )))
        .with_block(ContentBlock::Hero(HeroBlock::new("hero last")));
    let result = render(&doc).expect("Should render");
    let mjml = &result.intermediate_markup;

    let footer = mjml.find("legal first").expect("footer");
    let items = mjml.find("Alpha").expect("items");
    let hero = mjml.find("hero last").expect("hero");
    assert!(footer < items && items < hero);
}

#[test]
fn test_only_unknown_blocks_still_renders() {
    let doc = Document::new("cart_abandon")
        .with_block(ContentBlock::unknown("poll"))
        .with_block(ContentBlock::unknown("countdown"));
    let result = render(&doc).expect("Should render");

    assert_eq!(result.warnings.len(), 3);
    assert_eq!(
        result.warnings[..2],
        [
            "unknown block type 'poll' at position 0; block skipped".to_string(),
            "unknown block type 'countdown' at position 1; block skipped".to_string(),
        ]
    );
    assert!(result.warnings[2].starts_with("[structure]"));
    assert!(result.warnings[2].ends_with("<mj-body> has no content"));
    assert!(result.final_markup.contains("</html>"));
}

#[test]
fn test_null_fields_render_like_missing_ones() {
    let source = r#"{
        "category": "cart_abandon",
        "subject": null,
        "locale": null,
        "blocks": [
            {"type": "hero", "headline": "H", "imageUrl": null, "subcopy": null},
            {"type": "items", "title": null, "items": [
                {"sku": "A1", "name": "Mug", "price": "€9", "imageUrl": null, "url": null}
            ]},
            {"type": "footer", "legal": "L", "preferencesUrl": null, "unsubscribeUrl": "uu"}
        ]
    }"#;
    let result = render_json(source, &RenderConfig::new()).expect("Should render");
    let mjml = &result.intermediate_markup;

    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    assert!(mjml.contains(r#"<mjml lang="en">"#));
    assert!(mjml.contains("Mug"));
    assert!(!mjml.contains("<mj-image"));
    assert!(mjml.contains(r#"href="uu""#));
}

#[test]
fn test_missing_blocks_is_invalid_document() {
    let err = render_json(r#"{"category": "cart_abandon", "subject": "x"}"#, &RenderConfig::new())
        .expect_err("Should reject");
    assert!(err.is_client_error());
    assert!(err.to_string().starts_with("invalid document"));

    let err = render_json("{not json", &RenderConfig::new()).expect_err("Should reject");
    assert!(err.is_client_error());
}

#[test]
fn test_compact_markup() {
    let markup = MarkupConfig::new().with_pretty_print(false);
    let config = RenderConfig::new()
        .with_markup(markup.clone())
        .with_lowerer(Arc::new(MjmlLowerer::with_config(markup)));
    let result = render_json(&fixture("cart_abandon.json"), &config).expect("Should render");

    assert!(!result.intermediate_markup.contains('\n'));
    assert!(!result.final_markup.contains('\n'));
}

fn multiline_document() -> Document {
    Document::new("cart_abandon").with_block(ContentBlock::Hero(
        HeroBlock::new("Line one\nLine two").with_custom_html("<pre>a\n  b</pre>"),
    ))
}

#[test]
fn test_compact_markup_keeps_line_breaks_inside_content() {
    let markup = MarkupConfig::new().with_pretty_print(false);
    let config = RenderConfig::new()
        .with_markup(markup.clone())
        .with_lowerer(Arc::new(MjmlLowerer::with_config(markup)));
    let result = render_with_config(&multiline_document(), &config).expect("Should render");

    assert!(result.intermediate_markup.contains(">Line one\nLine two</mj-text>"));
    assert!(result.intermediate_markup.contains("<mj-raw><pre>a\n  b</pre></mj-raw>"));
    assert!(result.final_markup.contains("Line one\nLine two"));
    assert!(result.final_markup.contains("<pre>a\n  b</pre>"));
}

#[test]
fn test_pretty_markup_keeps_custom_html_verbatim() {
    let result = render(&multiline_document()).expect("Should render");

    assert!(result.intermediate_markup.contains("<pre>a\n  b</pre>"));
    assert!(result.final_markup.contains("\n<pre>a\n  b</pre>\n"));
}

#[test]
fn test_generous_deadline_succeeds() {
    let config = RenderConfig::new().with_deadline(Duration::from_secs(10));
    let doc = Document::from_json(&fixture("cart_abandon.json")).expect("Should parse");
    let with_deadline = render_with_config(&doc, &config).expect("Should render");
    let without = render(&doc).expect("Should render");
    assert_eq!(with_deadline, without);
}

#[test]
fn test_lowering_error_reports_against_markup() {
    #[derive(Debug)]
    struct Unclosed;

    impl mailforge::Lowerer for Unclosed {
        fn lower(&self, markup: &str) -> Result<mailforge::Lowered, LoweringError> {
            // drop the body so the built-in lowerer has nothing to render
            let head_only = markup
                .split("<mj-body")
                .next()
                .unwrap_or_default()
                .to_string()
                + "</mjml>";
            MjmlLowerer::new().lower(&head_only)
        }
    }

    let doc = Document::from_json(&fixture("cart_abandon.json")).expect("Should parse");
    let config = RenderConfig::new().with_lowerer(Arc::new(Unclosed));
    let err = render_with_config(&doc, &config).expect_err("Should fail");
    let RenderError::Lowering(lowering) = &err else {
        panic!("Expected lowering error, got {:?}", err);
    };
    assert!(matches!(lowering, LoweringError::MissingBody { .. }));
    assert!(!err.is_client_error());
}
