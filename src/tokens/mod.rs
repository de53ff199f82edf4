//! Design tokens: the styling constants every block compiler draws from
//!
//! A [`DesignTokenSet`] is always complete: every leaf is a concrete `String`.
//! Partial data only exists as a [`TokenOverride`], whose leaves and groups are
//! all optional, and the only way back to a token set is [`Merge::merged`],
//! which starts from a complete set. A partially populated token set therefore
//! cannot reach the compilers.

mod resolver;
mod store;

use serde::Deserialize;

use crate::document::TemplateCategory;

pub use resolver::{resolve, ResolvedTokens, TokenResolver};
pub use store::{DirTokenStore, MemoryTokenStore, StoredTokens, TokenStore, TokenStoreError};

/// Version reported for the built-in token tables
pub const BUILTIN_TOKENS_VERSION: &str = "1.0.0";

/// Version reported when a configured token store could not supply the category
pub const FALLBACK_TOKENS_VERSION: &str = "builtin-fallback";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTokens {
    pub primary: String,
    pub on_primary: String,
    pub secondary: String,
    pub background: String,
    pub surface: String,
    pub text: String,
    pub text_secondary: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontToken {
    pub family: String,
    pub size: String,
    pub weight: String,
    pub line_height: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontTokens {
    pub heading: FontToken,
    pub body: FontToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpacingTokens {
    pub xs: String,
    pub sm: String,
    pub md: String,
    pub lg: String,
    pub xl: String,
    pub xxl: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadiusTokens {
    pub button: String,
    pub card: String,
}

/// The complete set of design tokens for one render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignTokenSet {
    pub colors: ColorTokens,
    pub fonts: FontTokens,
    pub spacing: SpacingTokens,
    pub radius: RadiusTokens,
}

impl DesignTokenSet {
    /// Every leaf as `(path, value)`, in declaration order
    pub fn leaves(&self) -> Vec<(&'static str, &str)> {
        let c = &self.colors;
        let h = &self.fonts.heading;
        let b = &self.fonts.body;
        let s = &self.spacing;
        let r = &self.radius;
        vec![
            ("colors.primary", c.primary.as_str()),
            ("colors.onPrimary", c.on_primary.as_str()),
            ("colors.secondary", c.secondary.as_str()),
            ("colors.background", c.background.as_str()),
            ("colors.surface", c.surface.as_str()),
            ("colors.text", c.text.as_str()),
            ("colors.textSecondary", c.text_secondary.as_str()),
            ("fonts.heading.family", h.family.as_str()),
            ("fonts.heading.size", h.size.as_str()),
            ("fonts.heading.weight", h.weight.as_str()),
            ("fonts.heading.lineHeight", h.line_height.as_str()),
            ("fonts.body.family", b.family.as_str()),
            ("fonts.body.size", b.size.as_str()),
            ("fonts.body.weight", b.weight.as_str()),
            ("fonts.body.lineHeight", b.line_height.as_str()),
            ("spacing.xs", s.xs.as_str()),
            ("spacing.sm", s.sm.as_str()),
            ("spacing.md", s.md.as_str()),
            ("spacing.lg", s.lg.as_str()),
            ("spacing.xl", s.xl.as_str()),
            ("spacing.xxl", s.xxl.as_str()),
            ("radius.button", r.button.as_str()),
            ("radius.card", r.card.as_str()),
        ]
    }
}

/// Base defaults shared by every category
impl Default for DesignTokenSet {
    fn default() -> Self {
        Self {
            colors: ColorTokens {
                primary: "#dc2626".to_string(),
                on_primary: "#ffffff".to_string(),
                secondary: "#64748b".to_string(),
                background: "#f8fafc".to_string(),
                surface: "#ffffff".to_string(),
                text: "#1e293b".to_string(),
                text_secondary: "#64748b".to_string(),
            },
            fonts: FontTokens {
                heading: FontToken {
                    family: "Arial, sans-serif".to_string(),
                    size: "24px".to_string(),
                    weight: "700".to_string(),
                    line_height: "1.2".to_string(),
                },
                body: FontToken {
                    family: "Arial, sans-serif".to_string(),
                    size: "16px".to_string(),
                    weight: "400".to_string(),
                    line_height: "1.5".to_string(),
                },
            },
            spacing: SpacingTokens {
                xs: "4px".to_string(),
                sm: "8px".to_string(),
                md: "16px".to_string(),
                lg: "24px".to_string(),
                xl: "32px".to_string(),
                xxl: "48px".to_string(),
            },
            radius: RadiusTokens {
                button: "6px".to_string(),
                card: "8px".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ColorOverride {
    pub primary: Option<String>,
    pub on_primary: Option<String>,
    pub secondary: Option<String>,
    pub background: Option<String>,
    pub surface: Option<String>,
    pub text: Option<String>,
    pub text_secondary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct FontOverride {
    pub family: Option<String>,
    pub size: Option<String>,
    pub weight: Option<String>,
    pub line_height: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontsOverride {
    pub heading: Option<FontOverride>,
    pub body: Option<FontOverride>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpacingOverride {
    pub xs: Option<String>,
    pub sm: Option<String>,
    pub md: Option<String>,
    pub lg: Option<String>,
    pub xl: Option<String>,
    pub xxl: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RadiusOverride {
    pub button: Option<String>,
    pub card: Option<String>,
}

/// A partial token set layered over a complete one
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenOverride {
    pub colors: Option<ColorOverride>,
    pub fonts: Option<FontsOverride>,
    pub spacing: Option<SpacingOverride>,
    pub radius: Option<RadiusOverride>,
}

impl TokenOverride {
    /// Override that only replaces the primary color
    pub fn primary(color: impl Into<String>) -> Self {
        Self {
            colors: Some(ColorOverride {
                primary: Some(color.into()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

/// Recursive merge of a partial override onto a complete value
///
/// Leaves present in the override win; absent or empty leaves and absent
/// groups keep the base value.
pub trait Merge: Sized {
    type Override;

    fn merged(&self, over: &Self::Override) -> Self;
}

/// An empty override leaf counts as absent
fn leaf(base: &str, over: &Option<String>) -> String {
    over.as_deref()
        .filter(|value| !value.is_empty())
        .unwrap_or(base)
        .to_string()
}

fn nested<T: Merge + Clone>(base: &T, over: &Option<T::Override>) -> T {
    match over {
        Some(over) => base.merged(over),
        None => base.clone(),
    }
}

impl Merge for ColorTokens {
    type Override = ColorOverride;

    fn merged(&self, over: &ColorOverride) -> Self {
        Self {
            primary: leaf(&self.primary, &over.primary),
            on_primary: leaf(&self.on_primary, &over.on_primary),
            secondary: leaf(&self.secondary, &over.secondary),
            background: leaf(&self.background, &over.background),
            surface: leaf(&self.surface, &over.surface),
            text: leaf(&self.text, &over.text),
            text_secondary: leaf(&self.text_secondary, &over.text_secondary),
        }
    }
}

impl Merge for FontToken {
    type Override = FontOverride;

    fn merged(&self, over: &FontOverride) -> Self {
        Self {
            family: leaf(&self.family, &over.family),
            size: leaf(&self.size, &over.size),
            weight: leaf(&self.weight, &over.weight),
            line_height: leaf(&self.line_height, &over.line_height),
        }
    }
}

impl Merge for FontTokens {
    type Override = FontsOverride;

    fn merged(&self, over: &FontsOverride) -> Self {
        Self {
            heading: nested(&self.heading, &over.heading),
            body: nested(&self.body, &over.body),
        }
    }
}

impl Merge for SpacingTokens {
    type Override = SpacingOverride;

    fn merged(&self, over: &SpacingOverride) -> Self {
        Self {
            xs: leaf(&self.xs, &over.xs),
            sm: leaf(&self.sm, &over.sm),
            md: leaf(&self.md, &over.md),
            lg: leaf(&self.lg, &over.lg),
            xl: leaf(&self.xl, &over.xl),
            xxl: leaf(&self.xxl, &over.xxl),
        }
    }
}

impl Merge for RadiusTokens {
    type Override = RadiusOverride;

    fn merged(&self, over: &RadiusOverride) -> Self {
        Self {
            button: leaf(&self.button, &over.button),
            card: leaf(&self.card, &over.card),
        }
    }
}

impl Merge for DesignTokenSet {
    type Override = TokenOverride;

    fn merged(&self, over: &TokenOverride) -> Self {
        Self {
            colors: nested(&self.colors, &over.colors),
            fonts: nested(&self.fonts, &over.fonts),
            spacing: nested(&self.spacing, &over.spacing),
            radius: nested(&self.radius, &over.radius),
        }
    }
}

/// Built-in per-category override
pub fn builtin_override(category: TemplateCategory) -> TokenOverride {
    match category {
        TemplateCategory::CartAbandon => TokenOverride::primary("#dc2626"),
        TemplateCategory::PostPurchase => TokenOverride::primary("#16a34a"),
        TemplateCategory::OrderConfirmation => TokenOverride::primary("#2563eb"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_base_set_has_no_blank_leaves() {
        let base = DesignTokenSet::default();
        for (path, value) in base.leaves() {
            assert!(!value.is_empty(), "{} is blank", path);
        }
        assert_eq!(base.leaves().len(), 23);
    }

    #[test]
    fn test_empty_override_is_identity() {
        let base = DesignTokenSet::default();
        assert_eq!(base.merged(&TokenOverride::default()), base);
    }

    #[test]
    fn test_partial_group_keeps_siblings() {
        let base = DesignTokenSet::default();
        let merged = base.merged(&TokenOverride::primary("#000000"));

        assert_eq!(merged.colors.primary, "#000000");
        assert_eq!(merged.colors.secondary, base.colors.secondary);
        for ((path, a), (_, b)) in merged.leaves().into_iter().zip(base.leaves()) {
            if path != "colors.primary" {
                assert_eq!(a, b, "{} changed", path);
            }
        }
    }

    #[test]
    fn test_deep_font_override() {
        let base = DesignTokenSet::default();
        let over = TokenOverride {
            fonts: Some(FontsOverride {
                heading: Some(FontOverride {
                    size: Some("30px".to_string()),
                    ..Default::default()
                }),
                body: None,
            }),
            ..Default::default()
        };
        let merged = base.merged(&over);
        assert_eq!(merged.fonts.heading.size, "30px");
        assert_eq!(merged.fonts.heading.family, base.fonts.heading.family);
        assert_eq!(merged.fonts.heading.weight, "700");
        assert_eq!(merged.fonts.body, base.fonts.body);
    }

    #[test]
    fn test_override_from_toml() {
        let over: TokenOverride = toml::from_str(
            r##"
[colors]
onPrimary = "#111111"

[spacing]
xxl = "64px"
"##,
        )
        .expect("Should parse");
        let merged = DesignTokenSet::default().merged(&over);
        assert_eq!(merged.colors.on_primary, "#111111");
        assert_eq!(merged.spacing.xxl, "64px");
        assert_eq!(merged.spacing.xl, "32px");
    }

    #[test]
    fn test_empty_leaf_keeps_base_value() {
        let over: TokenOverride =
            toml::from_str("[colors]\nprimary = \"\"\n[fonts.heading]\nsize = \"\"")
                .expect("Should parse");
        let base = DesignTokenSet::default();
        let merged = base.merged(&over);
        assert_eq!(merged, base);
    }

    #[test]
    fn test_override_rejects_unknown_keys() {
        let result: Result<TokenOverride, _> = toml::from_str("[colors]\nprimry = \"#fff\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_builtin_overrides_only_touch_primary() {
        let base = DesignTokenSet::default();
        for category in TemplateCategory::ALL {
            let merged = base.merged(&builtin_override(category));
            let changed: Vec<_> = merged
                .leaves()
                .into_iter()
                .zip(base.leaves())
                .filter(|((_, a), (_, b))| a != b)
                .map(|((path, _), _)| path)
                .collect();
            assert!(changed.is_empty() || changed == vec!["colors.primary"]);
        }
    }
}
