use crate::document::HeroBlock;
use crate::renderer::{Attrs, MarkupBuilder, MarkupConfig, BODY_INDENT};
use crate::tokens::DesignTokenSet;

use super::{present, Fragment};

pub(super) fn compile(hero: &HeroBlock, tokens: &DesignTokenSet, config: &MarkupConfig) -> Fragment {
    let colors = &tokens.colors;
    let heading = &tokens.fonts.heading;
    let spacing = &tokens.spacing;
    let mut builder = MarkupBuilder::new(config, BODY_INDENT);

    builder.open(
        "mj-section",
        &Attrs::new()
            .set("background-color", &colors.surface)
            .set("padding", &spacing.xl),
    );
    builder.open("mj-column", &Attrs::new());

    if let Some(src) = present(&hero.image_url) {
        builder.empty(
            "mj-image",
            &Attrs::new()
                .set("src", src)
                .set("alt", &hero.headline)
                .set("width", "600px"),
        );
    }

    builder.text(
        "mj-text",
        &Attrs::new()
            .set("css-class", config.class("hero-text"))
            .set("font-family", &heading.family)
            .set("font-size", &heading.size)
            .set("font-weight", &heading.weight)
            .set("line-height", &heading.line_height)
            .set("color", &colors.text)
            .set("padding-top", &spacing.lg),
        &hero.headline,
    );

    if let Some(subcopy) = present(&hero.subcopy) {
        builder.text(
            "mj-text",
            &Attrs::new()
                .set("css-class", config.class("hero-text"))
                .set("color", &colors.text_secondary)
                .set("padding-top", &spacing.sm),
            subcopy,
        );
    }

    if let Some(html) = present(&hero.custom_html) {
        builder.html("mj-raw", &Attrs::new(), html);
    }

    if let Some(label) = present(&hero.cta_label) {
        builder.text(
            "mj-button",
            &Attrs::new()
                .set("css-class", config.class("cta-button"))
                .set("href", present(&hero.cta_url).unwrap_or("#"))
                .set("background-color", &colors.primary)
                .set("color", &colors.on_primary)
                .set("border-radius", &tokens.radius.button)
                .set("padding-top", &spacing.lg),
            label,
        );
    }

    builder.close("mj-column");
    builder.close("mj-section");
    builder.into()
}
