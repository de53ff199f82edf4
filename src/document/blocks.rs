//! Content block variants and their JSON form

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Read a field whose JSON `null` means the same as leaving it out
pub(super) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A product referenced by an items or recommendations block
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductRef {
    #[serde(deserialize_with = "null_as_default")]
    pub sku: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Display price, already formatted for the document locale
    #[serde(deserialize_with = "null_as_default")]
    pub price: String,
    #[serde(deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
}

impl ProductRef {
    pub fn new(sku: impl Into<String>, name: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            price: price.into(),
            ..Default::default()
        }
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = url.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// Opening section: headline, optional image, subcopy, custom markup and CTA
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeroBlock {
    #[serde(deserialize_with = "null_as_default")]
    pub headline: String,
    pub subcopy: Option<String>,
    pub image_url: Option<String>,
    /// Inserted verbatim; never parsed or sanitized by the compiler
    pub custom_html: Option<String>,
    pub cta_label: Option<String>,
    pub cta_url: Option<String>,
}

impl HeroBlock {
    pub fn new(headline: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            ..Default::default()
        }
    }

    pub fn with_subcopy(mut self, subcopy: impl Into<String>) -> Self {
        self.subcopy = Some(subcopy.into());
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_cta(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        self.cta_label = Some(label.into());
        self.cta_url = Some(url.into());
        self
    }

    pub fn with_custom_html(mut self, html: impl Into<String>) -> Self {
        self.custom_html = Some(html.into());
        self
    }
}

/// Titled list of products, shared by the items and recommendations variants
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProductListBlock {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub items: Vec<ProductRef>,
}

impl ProductListBlock {
    pub fn new(title: impl Into<String>, items: Vec<ProductRef>) -> Self {
        Self {
            title: title.into(),
            items,
        }
    }
}

/// Closing section with legal copy and subscription links
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FooterBlock {
    #[serde(deserialize_with = "null_as_default")]
    pub legal: String,
    #[serde(deserialize_with = "null_as_default")]
    pub preferences_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub unsubscribe_url: String,
}

impl FooterBlock {
    pub fn new(
        legal: impl Into<String>,
        preferences_url: impl Into<String>,
        unsubscribe_url: impl Into<String>,
    ) -> Self {
        Self {
            legal: legal.into(),
            preferences_url: preferences_url.into(),
            unsubscribe_url: unsubscribe_url.into(),
        }
    }
}

/// One structural unit of an email, keyed by its `type` tag
///
/// Tags this version does not know about deserialize into [`ContentBlock::Unknown`]
/// so that documents from newer producers still render.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawBlock")]
pub enum ContentBlock {
    Hero(HeroBlock),
    Items(ProductListBlock),
    Recommendations(ProductListBlock),
    Footer(FooterBlock),
    Unknown {
        kind: String,
        fields: Map<String, Value>,
    },
}

impl ContentBlock {
    /// The block's type tag as it appears in the document
    pub fn kind(&self) -> &str {
        match self {
            ContentBlock::Hero(_) => "hero",
            ContentBlock::Items(_) => "items",
            ContentBlock::Recommendations(_) => "recommendations",
            ContentBlock::Footer(_) => "footer",
            ContentBlock::Unknown { kind, .. } => kind,
        }
    }

    pub fn unknown(kind: impl Into<String>) -> Self {
        ContentBlock::Unknown {
            kind: kind.into(),
            fields: Map::new(),
        }
    }
}

#[derive(Deserialize)]
struct RawBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl TryFrom<RawBlock> for ContentBlock {
    type Error = serde_json::Error;

    fn try_from(raw: RawBlock) -> Result<Self, Self::Error> {
        let block = match raw.kind.as_str() {
            "hero" => ContentBlock::Hero(serde_json::from_value(Value::Object(raw.fields))?),
            "items" => ContentBlock::Items(serde_json::from_value(Value::Object(raw.fields))?),
            "recommendations" => {
                ContentBlock::Recommendations(serde_json::from_value(Value::Object(raw.fields))?)
            }
            "footer" => ContentBlock::Footer(serde_json::from_value(Value::Object(raw.fields))?),
            _ => ContentBlock::Unknown {
                kind: raw.kind,
                fields: raw.fields,
            },
        };
        Ok(block)
    }
}
