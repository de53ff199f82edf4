//! Item lists and recommendation grids

use crate::document::{ProductListBlock, ProductRef};
use crate::renderer::{escape_xml, Attrs, MarkupBuilder, MarkupConfig, BODY_INDENT};
use crate::tokens::DesignTokenSet;

use super::{link, Fragment};

/// Recommendation grids never grow past one row
const MAX_RECOMMENDATIONS: usize = 3;

/// One section per item: image column (30%) and detail column (70%)
pub(super) fn compile_items(
    list: &ProductListBlock,
    tokens: &DesignTokenSet,
    config: &MarkupConfig,
) -> Fragment {
    if list.items.is_empty() {
        return Fragment::empty();
    }
    let colors = &tokens.colors;
    let mut builder = MarkupBuilder::new(config, BODY_INDENT);
    title_section(&mut builder, &list.title, tokens);

    for item in &list.items {
        builder.open(
            "mj-section",
            &Attrs::new()
                .set("css-class", config.class("product-item"))
                .set("background-color", &colors.surface)
                .set("padding", &tokens.spacing.md),
        );

        builder.open("mj-column", &Attrs::new().set("width", "30%"));
        if !item.image_url.is_empty() {
            builder.empty("mj-image", &product_image(item));
        }
        builder.close("mj-column");

        builder.open("mj-column", &Attrs::new().set("width", "70%"));
        builder.html(
            "mj-text",
            &Attrs::new()
                .set("font-weight", "bold")
                .set("color", &colors.text),
            &product_name(item, tokens),
        );
        builder.text(
            "mj-text",
            &Attrs::new()
                .set("font-weight", "bold")
                .set("color", &colors.primary),
            &item.price,
        );
        builder.text(
            "mj-text",
            &Attrs::new()
                .set("font-size", "12px")
                .set("color", &colors.text_secondary),
            &format!("SKU: {}", item.sku),
        );
        builder.close("mj-column");

        builder.close("mj-section");
    }

    builder.into()
}

/// A single-row grid of the first few items
pub(super) fn compile_recommendations(
    list: &ProductListBlock,
    tokens: &DesignTokenSet,
    config: &MarkupConfig,
) -> Fragment {
    if list.items.is_empty() {
        return Fragment::empty();
    }
    let colors = &tokens.colors;
    let shown = &list.items[..list.items.len().min(MAX_RECOMMENDATIONS)];
    let width = format!("{}%", 100 / shown.len());

    let mut builder = MarkupBuilder::new(config, BODY_INDENT);
    title_section(&mut builder, &list.title, tokens);

    builder.open(
        "mj-section",
        &Attrs::new()
            .set("background-color", &colors.surface)
            .set("padding", &tokens.spacing.md),
    );
    for item in shown {
        builder.open("mj-column", &Attrs::new().set("width", &width));
        if !item.image_url.is_empty() {
            builder.empty("mj-image", &product_image(item));
        }
        builder.html(
            "mj-text",
            &Attrs::new()
                .set("font-weight", "bold")
                .set("color", &colors.text)
                .set("align", "center"),
            &product_name(item, tokens),
        );
        builder.text(
            "mj-text",
            &Attrs::new()
                .set("font-weight", "bold")
                .set("color", &colors.primary)
                .set("align", "center"),
            &item.price,
        );
        builder.close("mj-column");
    }
    builder.close("mj-section");

    builder.into()
}

fn title_section(builder: &mut MarkupBuilder, title: &str, tokens: &DesignTokenSet) {
    if title.is_empty() {
        return;
    }
    let heading = &tokens.fonts.heading;
    builder.open(
        "mj-section",
        &Attrs::new()
            .set("background-color", &tokens.colors.surface)
            .set("padding", &tokens.spacing.lg),
    );
    builder.open("mj-column", &Attrs::new());
    builder.text(
        "mj-text",
        &Attrs::new()
            .set("font-family", &heading.family)
            .set("font-size", &heading.size)
            .set("font-weight", &heading.weight)
            .set("color", &tokens.colors.text)
            .set("align", "center"),
        title,
    );
    builder.close("mj-column");
    builder.close("mj-section");
}

fn product_image(item: &ProductRef) -> Attrs {
    Attrs::new()
        .set("src", &item.image_url)
        .set("alt", &item.name)
        .set("width", "150px")
        .set_opt("href", Some(item.url.as_str()))
}

/// Product name as inner markup, linked when the item has a URL
fn product_name(item: &ProductRef, tokens: &DesignTokenSet) -> String {
    if item.url.is_empty() {
        return escape_xml(&item.name);
    }
    link(
        &item.url,
        &item.name,
        &format!("color:{};text-decoration:none;", tokens.colors.text),
    )
}
