//! Structured email content as supplied by the content producer
//!
//! A [`Document`] is read-only input to the renderer: the pipeline never
//! mutates it and keeps no reference to it after a render call returns.

mod blocks;

use std::fmt;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

pub use blocks::{ContentBlock, FooterBlock, HeroBlock, ProductListBlock, ProductRef};

use blocks::null_as_default;

/// Errors that reject a document before it enters the pipeline
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },
}

/// Email template families with their own token overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateCategory {
    CartAbandon,
    PostPurchase,
    OrderConfirmation,
}

impl TemplateCategory {
    pub const ALL: [TemplateCategory; 3] = [
        TemplateCategory::CartAbandon,
        TemplateCategory::PostPurchase,
        TemplateCategory::OrderConfirmation,
    ];

    /// Look up a category by its wire name (`cart_abandon`, ...)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateCategory::CartAbandon => "cart_abandon",
            TemplateCategory::PostPurchase => "post_purchase",
            TemplateCategory::OrderConfirmation => "order_confirmation",
        }
    }
}

impl fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete email document
///
/// `category` is kept as the raw name so that documents naming a category this
/// version does not know still render (with base tokens).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default = "default_locale", deserialize_with = "null_as_default_locale")]
    pub locale: String,
    #[serde(alias = "templateType", deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub preheader: String,
    /// Sections in vertical output order
    pub blocks: Vec<ContentBlock>,
}

fn default_locale() -> String {
    "en".to_string()
}

fn null_as_default_locale<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_locale))
}

impl Document {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            locale: default_locale(),
            category: category.into(),
            subject: String::new(),
            preheader: String::new(),
            blocks: vec![],
        }
    }

    /// Parse and validate a document from its JSON form
    pub fn from_json(source: &str) -> Result<Self, DocumentError> {
        let document: Document = serde_json::from_str(source)?;
        document.validate()?;
        Ok(document)
    }

    /// Check the top-level fields the pipeline cannot do without
    pub fn validate(&self) -> Result<(), DocumentError> {
        if self.category.trim().is_empty() {
            return Err(DocumentError::MissingField { field: "category" });
        }
        Ok(())
    }

    /// The known category, if the document names one
    pub fn template_category(&self) -> Option<TemplateCategory> {
        TemplateCategory::from_name(&self.category)
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn with_preheader(mut self, preheader: impl Into<String>) -> Self {
        self.preheader = preheader.into();
        self
    }

    pub fn with_block(mut self, block: ContentBlock) -> Self {
        self.blocks.push(block);
        self
    }
}
