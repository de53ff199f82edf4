//! Category to token-set resolution

use std::sync::Arc;

use tracing::{debug, warn};

use crate::document::TemplateCategory;

use super::{
    builtin_override, DesignTokenSet, Merge, TokenStore, BUILTIN_TOKENS_VERSION,
    FALLBACK_TOKENS_VERSION,
};

/// Built-in tokens for a category: base defaults with the category override applied
pub fn resolve(category: TemplateCategory) -> DesignTokenSet {
    DesignTokenSet::default().merged(&builtin_override(category))
}

/// Tokens for one render, with the version they came from
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTokens {
    pub tokens: DesignTokenSet,
    pub version: String,
    /// Recovered problems (unknown category, unreadable store)
    pub warnings: Vec<String>,
}

impl ResolvedTokens {
    fn builtin(tokens: DesignTokenSet, version: &str) -> Self {
        Self {
            tokens,
            version: version.to_string(),
            warnings: vec![],
        }
    }
}

/// Resolves categories against built-in tables and an optional persisted store
///
/// Resolution never fails. Stored overrides cascade on top of the built-in
/// category override, which cascades on top of the base defaults.
#[derive(Debug, Clone, Default)]
pub struct TokenResolver {
    store: Option<Arc<dyn TokenStore>>,
}

impl TokenResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: Arc<dyn TokenStore>) -> Self {
        Self { store: Some(store) }
    }

    pub fn resolve(&self, category: &str) -> ResolvedTokens {
        let Some(known) = TemplateCategory::from_name(category) else {
            warn!(category, "unknown template category, using base tokens");
            let mut resolved =
                ResolvedTokens::builtin(DesignTokenSet::default(), BUILTIN_TOKENS_VERSION);
            resolved.warnings.push(format!(
                "unknown template category '{}'; using base tokens",
                category
            ));
            return resolved;
        };

        let builtin = resolve(known);
        let Some(store) = &self.store else {
            return ResolvedTokens::builtin(builtin, BUILTIN_TOKENS_VERSION);
        };

        match store.load(known) {
            Ok(Some(stored)) => {
                let version = stored
                    .version
                    .unwrap_or_else(|| BUILTIN_TOKENS_VERSION.to_string());
                debug!(%known, %version, "loaded stored token override");
                ResolvedTokens {
                    tokens: builtin.merged(&stored.overrides),
                    version,
                    warnings: vec![],
                }
            }
            Ok(None) => {
                debug!(%known, "no stored tokens, using built-in tables");
                ResolvedTokens::builtin(builtin, FALLBACK_TOKENS_VERSION)
            }
            Err(e) => {
                warn!(%known, error = %e, "token store failed, using built-in tables");
                let mut resolved = ResolvedTokens::builtin(builtin, FALLBACK_TOKENS_VERSION);
                resolved
                    .warnings
                    .push(format!("token store unavailable for '{}': {}", known, e));
                resolved
            }
        }
    }
}
