//! Persisted per-category token overrides
//!
//! Token files are TOML, one per category, named after the category
//! (`cart_abandon.toml`, ...):
//!
//! ```toml
//! version = "2.3.0"
//!
//! [colors]
//! primary = "#7c3aed"
//!
//! [fonts.heading]
//! size = "28px"
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::document::TemplateCategory;

use super::{ColorOverride, FontsOverride, RadiusOverride, SpacingOverride, TokenOverride};

/// Errors that can occur when reading a token store
#[derive(Error, Debug)]
pub enum TokenStoreError {
    #[error("failed to read token file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse token file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("token store unavailable: {0}")]
    Unavailable(String),
}

/// An override as persisted, with the version it was published under
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredTokens {
    pub overrides: TokenOverride,
    pub version: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TokenFile {
    version: Option<String>,
    colors: Option<ColorOverride>,
    fonts: Option<FontsOverride>,
    spacing: Option<SpacingOverride>,
    radius: Option<RadiusOverride>,
}

impl StoredTokens {
    pub fn new(overrides: TokenOverride, version: impl Into<String>) -> Self {
        Self {
            overrides,
            version: Some(version.into()),
        }
    }

    /// Parse a token file
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        let file: TokenFile = toml::from_str(content)?;
        Ok(Self {
            overrides: TokenOverride {
                colors: file.colors,
                fonts: file.fonts,
                spacing: file.spacing,
                radius: file.radius,
            },
            version: file.version,
        })
    }
}

/// Keyed lookup of persisted overrides
///
/// `Ok(None)` means the store has no entry for the category. Errors are never
/// fatal to a render; the resolver falls back to built-in tokens.
pub trait TokenStore: Send + Sync + fmt::Debug {
    fn load(&self, category: TemplateCategory) -> Result<Option<StoredTokens>, TokenStoreError>;
}

/// Token files in a directory, one `<category>.toml` per category
#[derive(Debug, Clone)]
pub struct DirTokenStore {
    root: PathBuf,
}

impl DirTokenStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, category: TemplateCategory) -> PathBuf {
        self.root.join(format!("{}.toml", category.as_str()))
    }
}

impl TokenStore for DirTokenStore {
    fn load(&self, category: TemplateCategory) -> Result<Option<StoredTokens>, TokenStoreError> {
        if !self.root.is_dir() {
            return Err(TokenStoreError::Unavailable(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }
        let path = self.path_for(category);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path).map_err(|source| TokenStoreError::Io {
            path: path.clone(),
            source,
        })?;
        StoredTokens::from_toml(&content)
            .map(Some)
            .map_err(|source| TokenStoreError::Parse { path, source })
    }
}

/// In-process store, for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    entries: HashMap<TemplateCategory, StoredTokens>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, category: TemplateCategory, tokens: StoredTokens) -> Self {
        self.entries.insert(category, tokens);
        self
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self, category: TemplateCategory) -> Result<Option<StoredTokens>, TokenStoreError> {
        Ok(self.entries.get(&category).cloned())
    }
}
