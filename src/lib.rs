//! Mailforge - structured email documents to client-safe HTML
//!
//! A [`Document`] is rendered in four steps: resolve design tokens for its
//! category, compile each content block to intermediate markup, assemble the
//! blocks into one document, then lower that document to table-based HTML.
//!
//! # Example
//!
//! ```rust
//! use mailforge::{render, ContentBlock, Document, HeroBlock};
//!
//! let doc = Document::new("cart_abandon")
//!     .with_subject("You left something behind")
//!     .with_block(ContentBlock::Hero(HeroBlock::new("Still thinking it over?")));
//!
//! let result = render(&doc).unwrap();
//! assert!(result.intermediate_markup.contains("<mj-section"));
//! assert!(result.final_markup.contains("Still thinking it over?"));
//! ```

pub mod compiler;
pub mod document;
pub mod error;
pub mod lowering;
pub mod renderer;
pub mod tokens;

pub use compiler::{compile_block, compile_blocks, CompiledBlocks, Fragment};
pub use document::{
    ContentBlock, Document, DocumentError, FooterBlock, HeroBlock, ProductListBlock, ProductRef,
    TemplateCategory,
};
pub use error::LoweringError;
pub use lowering::{Lowered, Lowerer, LoweringWarning, MjmlLowerer};
pub use renderer::{assemble, MarkupConfig, Metadata};
pub use tokens::{
    DesignTokenSet, DirTokenStore, MemoryTokenStore, ResolvedTokens, StoredTokens, TokenOverride,
    TokenResolver, TokenStore, TokenStoreError,
};

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Errors that end a render; recoverable problems are warnings instead
#[derive(Debug, Error)]
pub enum RenderError {
    /// The document was rejected before entering the pipeline
    #[error("invalid document: {0}")]
    InvalidDocument(#[from] DocumentError),

    /// The lowering step could not produce usable output
    #[error("{0}")]
    Lowering(#[from] LoweringError),

    /// The lowering step did not answer within the configured deadline
    #[error("lowering did not finish within {}ms", .0.as_millis())]
    Timeout(Duration),
}

impl RenderError {
    /// Whether the caller sent bad input, as opposed to a failure on our side
    pub fn is_client_error(&self) -> bool {
        matches!(self, RenderError::InvalidDocument(_))
    }
}

/// Configuration for the complete render pipeline
///
/// Cheap to clone and safe to share between threads; nothing in it is mutated
/// by a render.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Intermediate markup formatting
    pub markup: MarkupConfig,
    /// Final compilation step
    pub lowerer: Arc<dyn Lowerer>,
    /// Persisted token overrides, if any
    pub token_store: Option<Arc<dyn TokenStore>>,
    /// Upper bound on the lowering call
    pub deadline: Option<Duration>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            markup: MarkupConfig::default(),
            lowerer: Arc::new(MjmlLowerer::new()),
            token_store: None,
            deadline: None,
        }
    }
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the intermediate markup configuration
    ///
    /// This does not change how the lowerer formats its own output.
    pub fn with_markup(mut self, config: MarkupConfig) -> Self {
        self.markup = config;
        self
    }

    /// Replace the lowering step
    pub fn with_lowerer(mut self, lowerer: Arc<dyn Lowerer>) -> Self {
        self.lowerer = lowerer;
        self
    }

    /// Read token overrides from a store
    pub fn with_token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    /// Fail with [`RenderError::Timeout`] if lowering takes longer than `deadline`
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Output of a successful render
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResult {
    pub intermediate_markup: String,
    pub final_markup: String,
    /// Token, block and lowering warnings, in that order
    pub warnings: Vec<String>,
    pub tokens_version: String,
}

/// A document assembled into intermediate markup, not yet lowered
#[derive(Debug, Clone, PartialEq)]
pub struct Composed {
    pub intermediate_markup: String,
    pub tokens_version: String,
    pub warnings: Vec<String>,
}

impl Composed {
    /// Run the lowering step and finish the render
    pub fn lower(self, config: &RenderConfig) -> Result<RenderResult, RenderError> {
        let lowered = match config.deadline {
            Some(deadline) => {
                lowering::lower_within(config.lowerer.clone(), &self.intermediate_markup, deadline)
                    .ok_or(RenderError::Timeout(deadline))??
            }
            None => config.lowerer.lower(&self.intermediate_markup)?,
        };
        debug!(warnings = lowered.warnings.len(), "lowering finished");

        let mut warnings = self.warnings;
        warnings.extend(lowered.warnings);
        Ok(RenderResult {
            intermediate_markup: self.intermediate_markup,
            final_markup: lowered.html,
            warnings,
            tokens_version: self.tokens_version,
        })
    }
}

/// Resolve tokens, compile blocks and assemble, stopping short of lowering
pub fn compose(document: &Document, config: &RenderConfig) -> Result<Composed, RenderError> {
    document.validate()?;

    let resolver = match &config.token_store {
        Some(store) => TokenResolver::with_store(store.clone()),
        None => TokenResolver::new(),
    };
    let resolved = resolver.resolve(&document.category);
    debug!(category = %document.category, version = %resolved.version, "resolved tokens");

    let compiled = compile_blocks(&document.blocks, &resolved.tokens, &config.markup);
    debug!(
        fragments = compiled.fragments.len(),
        skipped = compiled.warnings.len(),
        "compiled blocks"
    );

    let intermediate_markup = assemble(
        &compiled.fragments,
        &Metadata::from(document),
        &resolved.tokens,
        &config.markup,
    );

    let mut warnings = resolved.warnings;
    warnings.extend(compiled.warnings);
    Ok(Composed {
        intermediate_markup,
        tokens_version: resolved.version,
        warnings,
    })
}

/// Render a document with default configuration
pub fn render(document: &Document) -> Result<RenderResult, RenderError> {
    render_with_config(document, &RenderConfig::default())
}

/// Render a document with custom configuration
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use mailforge::{render_with_config, Document, MarkupConfig, RenderConfig};
///
/// let config = RenderConfig::new()
///     .with_markup(MarkupConfig::new().with_class_prefix("mf-"))
///     .with_deadline(Duration::from_secs(5));
///
/// let result = render_with_config(&Document::new("post_purchase"), &config).unwrap();
/// assert_eq!(result.tokens_version, "1.0.0");
/// assert!(result.intermediate_markup.contains(".mf-hero-text"));
/// ```
pub fn render_with_config(
    document: &Document,
    config: &RenderConfig,
) -> Result<RenderResult, RenderError> {
    compose(document, config)?.lower(config)
}

/// Parse a JSON document and render it
pub fn render_json(source: &str, config: &RenderConfig) -> Result<RenderResult, RenderError> {
    let document = Document::from_json(source)?;
    render_with_config(&document, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[derive(Debug)]
    struct FailingLowerer;

    impl Lowerer for FailingLowerer {
        fn lower(&self, _: &str) -> Result<Lowered, LoweringError> {
            Err(LoweringError::external("compiler exited with status 2"))
        }
    }

    #[derive(Debug)]
    struct WarningLowerer;

    impl Lowerer for WarningLowerer {
        fn lower(&self, markup: &str) -> Result<Lowered, LoweringError> {
            Ok(Lowered {
                html: markup.to_string(),
                warnings: vec!["lowering warning".to_string()],
            })
        }
    }

    #[derive(Debug)]
    struct StalledLowerer;

    impl Lowerer for StalledLowerer {
        fn lower(&self, _: &str) -> Result<Lowered, LoweringError> {
            thread::sleep(Duration::from_millis(500));
            Ok(Lowered::default())
        }
    }

    fn document() -> Document {
        Document::new("cart_abandon")
            .with_subject("S")
            .with_preheader("P")
            .with_block(ContentBlock::Hero(HeroBlock::new("H")))
    }

    #[test]
    fn test_render_default_config() {
        let result = render(&document()).unwrap();
        assert_eq!(result.tokens_version, "1.0.0");
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
        assert!(result.intermediate_markup.contains("<mj-title>S</mj-title>"));
        assert!(result.final_markup.contains("<title>S</title>"));
    }

    #[test]
    fn test_warnings_keep_pipeline_order() {
        let doc = Document::new("welcome").with_block(ContentBlock::unknown("countdown"));
        let config = RenderConfig::new().with_lowerer(Arc::new(WarningLowerer));
        let result = render_with_config(&doc, &config).unwrap();
        assert_eq!(result.warnings.len(), 3);
        assert!(result.warnings[0].starts_with("unknown template category 'welcome'"));
        assert_eq!(
            result.warnings[1],
            "unknown block type 'countdown' at position 0; block skipped"
        );
        assert_eq!(result.warnings[2], "lowering warning");
    }

    #[test]
    fn test_lowering_failure_is_fatal() {
        let config = RenderConfig::new().with_lowerer(Arc::new(FailingLowerer));
        let err = render_with_config(&document(), &config).unwrap_err();
        assert!(matches!(err, RenderError::Lowering(LoweringError::External { .. })));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_deadline_elapses() {
        let config = RenderConfig::new()
            .with_lowerer(Arc::new(StalledLowerer))
            .with_deadline(Duration::from_millis(20));
        let err = render_with_config(&document(), &config).unwrap_err();
        assert!(matches!(err, RenderError::Timeout(d) if d == Duration::from_millis(20)));
        assert_eq!(err.to_string(), "lowering did not finish within 20ms");
    }

    #[test]
    fn test_invalid_document_is_client_error() {
        let err = render_json(r#"{"category": "cart_abandon"}"#, &RenderConfig::new()).unwrap_err();
        assert!(err.is_client_error());
        let err = render(&Document::new("")).unwrap_err();
        assert!(matches!(err, RenderError::InvalidDocument(DocumentError::MissingField { .. })));
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = render(&document()).unwrap();
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["tokensVersion"], "1.0.0");
        assert!(value["intermediateMarkup"].is_string());
        assert!(value["finalMarkup"].is_string());
        assert!(value["warnings"].is_array());
    }

    #[test]
    fn test_compose_then_lower() {
        let config = RenderConfig::new();
        let composed = compose(&document(), &config).unwrap();
        assert!(composed.intermediate_markup.starts_with("<mjml"));
        let result = composed.clone().lower(&config).unwrap();
        assert_eq!(result.intermediate_markup, composed.intermediate_markup);
    }
}
