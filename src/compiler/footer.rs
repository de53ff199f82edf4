use crate::document::FooterBlock;
use crate::renderer::{Attrs, MarkupBuilder, MarkupConfig, BODY_INDENT};
use crate::tokens::DesignTokenSet;

use super::{link, Fragment};

pub(super) fn compile(
    footer: &FooterBlock,
    tokens: &DesignTokenSet,
    config: &MarkupConfig,
) -> Fragment {
    let colors = &tokens.colors;
    let link_style = format!("color:{};", colors.on_primary);
    let mut builder = MarkupBuilder::new(config, BODY_INDENT);

    builder.open(
        "mj-section",
        &Attrs::new()
            .set("background-color", &colors.secondary)
            .set("padding", &tokens.spacing.lg),
    );
    builder.open("mj-column", &Attrs::new());

    builder.text(
        "mj-text",
        &Attrs::new()
            .set("align", "center")
            .set("color", &colors.on_primary)
            .set("font-size", "12px"),
        &footer.legal,
    );

    let links = format!(
        "{} | {}",
        link(&footer.preferences_url, "Manage preferences", &link_style),
        link(&footer.unsubscribe_url, "Unsubscribe", &link_style)
    );
    builder.html(
        "mj-text",
        &Attrs::new()
            .set("align", "center")
            .set("color", &colors.on_primary)
            .set("font-size", "12px")
            .set("padding-top", &tokens.spacing.md),
        &links,
    );

    builder.close("mj-column");
    builder.close("mj-section");
    builder.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_footer_links_in_order() {
        let footer = FooterBlock::new(
            "© 2026 Acme Ltd",
            "https://acme.example/prefs",
            "https://acme.example/unsub?u=1&t=2",
        );
        let markup = compile(&footer, &DesignTokenSet::default(), &MarkupConfig::default());
        let markup = markup.as_str();

        assert_eq!(markup.matches("<mj-section").count(), 1);
        assert!(markup.contains(r##"background-color="#64748b""##));
        assert!(markup.contains("© 2026 Acme Ltd"));

        let prefs = markup.find("https://acme.example/prefs").expect("prefs link");
        let unsub = markup
            .find("https://acme.example/unsub?u=1&amp;t=2")
            .expect("unsubscribe link");
        assert!(prefs < unsub);
        assert!(markup.contains(r##"style="color:#ffffff;">Manage preferences</a> | <a"##));
    }
}
