//! Integration tests for lowering hand-written markup

use mailforge::lowering::{lower_within, WarningCategory};
use mailforge::{Lowerer, LoweringError, MjmlLowerer};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

const WELCOME: &str = r##"<mjml lang="en">
  <mj-head>
    <mj-title>Welcome</mj-title>
    <mj-preview>Glad you are here</mj-preview>
    <mj-attributes>
      <mj-class name="muted" color="#64748b" />
    </mj-attributes>
    <mj-style>
      .promo { color: red; }
    </mj-style>
  </mj-head>
  <mj-body background-color="#f8fafc">
    <mj-section padding="16px">
      <mj-column>
        <mj-image src="https://cdn.example.com/logo.png" alt="Logo" width="120px" />
        <mj-text mj-class="muted">Hello <b>there</b></mj-text>
        <mj-divider border-color="#e2e8f0" />
        <mj-button href="https://example.com/start">Get started</mj-button>
        <mj-raw><p class="promo">SAVE20</p></mj-raw>
      </mj-column>
    </mj-section>
  </mj-body>
</mjml>
"##;

#[test]
fn test_well_formed_document() {
    let lowered = MjmlLowerer::new().lower(WELCOME).expect("Should lower");
    let html = &lowered.html;

    assert_eq!(lowered.warnings, Vec::<String>::new());
    assert!(html.contains("<title>Welcome</title>"));
    assert!(html.contains(">Glad you are here</div>"));
    assert!(html.contains(".promo { color: red; }"));
    assert!(html.contains(r#"src="https://cdn.example.com/logo.png""#));
    assert!(html.contains("Hello <b>there</b>"));
    assert!(html.contains("#64748b"));
    assert!(html.contains(r#"href="https://example.com/start""#));
    assert!(html.contains(r#"<p class="promo">SAVE20</p>"#));
}

#[test]
fn test_unknown_attribute_warns_but_renders() {
    let source = WELCOME.replace("<mj-divider ", "<mj-divider colour=\"red\" ");
    let lowered = MjmlLowerer::new().lower(&source).expect("Should lower");

    assert_eq!(
        lowered.warnings,
        vec!["[attribute] line 17: unknown attribute 'colour' on <mj-divider>".to_string()]
    );
    assert!(lowered.html.contains("Get started"));
}

#[test]
fn test_misplaced_element_is_dropped() {
    let source = WELCOME.replace(
        "<mj-section padding=\"16px\">",
        "<mj-section padding=\"16px\">\n      <mj-text>orphan</mj-text>",
    );
    let (html, warnings) = MjmlLowerer::new().lower_detailed(&source).expect("Should lower");

    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].category, WarningCategory::Nesting);
    assert_eq!(warnings[0].message, "<mj-text> is not allowed inside <mj-section>; ignored");
    assert!(!html.contains("orphan"));
}

#[test]
fn test_unknown_element_warns() {
    let source = WELCOME.replace("<mj-divider ", "<mj-carousel /><mj-divider ");
    let (_, warnings) = MjmlLowerer::new().lower_detailed(&source).expect("Should lower");

    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].category, WarningCategory::Element);
    assert!(warnings[0].message.starts_with("unknown element <mj-carousel>"));
}

#[test]
fn test_misnesting_is_repaired() {
    let source = WELCOME.replace("</mj-column>", "");
    let (html, warnings) = MjmlLowerer::new().lower_detailed(&source).expect("Should lower");

    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].category, WarningCategory::Nesting);
    assert!(warnings[0].message.contains("<mj-column> closed implicitly by </mj-section>"));
    assert!(html.contains("Get started"));
}

#[test]
fn test_missing_body_is_fatal() {
    let source = "<mjml>\n  <mj-head>\n    <mj-title>x</mj-title>\n  </mj-head>\n</mjml>\n";
    let err = MjmlLowerer::new().lower(source).expect_err("Should fail");
    assert_eq!(err, LoweringError::MissingBody { span: 0..6 });

    let report = err.format(source, "email.mjml");
    assert!(report.contains("document has no <mj-body>"));
    assert!(report.contains("email.mjml"));
}

#[test]
fn test_wrong_root_is_fatal() {
    let err = MjmlLowerer::new()
        .lower("<html><body>hi</body></html>")
        .expect_err("Should fail");
    assert_eq!(err.to_string(), "root element must be <mjml>, found <html>");
}

#[test]
fn test_blank_input_is_fatal() {
    assert_eq!(MjmlLowerer::new().lower("\n\n"), Err(LoweringError::Empty));
}

#[test]
fn test_deadline_wraps_builtin_lowerer() {
    let lowerer: Arc<dyn Lowerer> = Arc::new(MjmlLowerer::new());
    let direct = lowerer.lower(WELCOME).expect("Should lower");
    let bounded = lower_within(lowerer, WELCOME, Duration::from_secs(10))
        .expect("Should finish in time")
        .expect("Should lower");
    assert_eq!(bounded, direct);
}
