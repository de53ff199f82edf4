//! Lowering of intermediate markup to client-safe HTML
//!
//! The pipeline only depends on the [`Lowerer`] trait. [`MjmlLowerer`] is the
//! built-in implementation: lex, build a tolerant tree, validate, then emit
//! table-based HTML.

mod html;
pub mod lexer;
pub mod tree;
pub mod validate;

use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::error::LoweringError;
use crate::renderer::MarkupConfig;

pub use tree::{Element, Node};
pub use validate::{LoweringWarning, WarningCategory};

/// Final markup plus the soft problems found on the way
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lowered {
    pub html: String,
    pub warnings: Vec<String>,
}

/// Compiles intermediate markup into final HTML
///
/// Tolerable problems belong in [`Lowered::warnings`]; an `Err` means no
/// usable output exists.
pub trait Lowerer: Send + Sync + fmt::Debug {
    fn lower(&self, markup: &str) -> Result<Lowered, LoweringError>;
}

/// Built-in lowerer for the MJML dialect the assembler produces
#[derive(Debug, Clone, Default)]
pub struct MjmlLowerer {
    config: MarkupConfig,
}

impl MjmlLowerer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `config` for the emitted HTML (pretty printing, indentation)
    pub fn with_config(config: MarkupConfig) -> Self {
        Self { config }
    }

    /// Lower with structured warnings
    pub fn lower_detailed(
        &self,
        markup: &str,
    ) -> Result<(String, Vec<LoweringWarning>), LoweringError> {
        if markup.trim().is_empty() {
            return Err(LoweringError::Empty);
        }
        let tokens = lexer::lex(markup)?;
        let mut warnings = Vec::new();
        let nodes = tree::build(markup, tokens, &mut warnings);

        let mut roots = nodes.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        });
        let Some(root) = roots.next() else {
            return Err(LoweringError::MissingRoot {
                found: None,
                span: 0..markup.len(),
            });
        };
        if root.name != "mjml" {
            return Err(LoweringError::MissingRoot {
                found: Some(root.name.clone()),
                span: root.span.clone(),
            });
        }
        for extra in roots {
            warnings.push(LoweringWarning {
                category: WarningCategory::Structure,
                line: validate::line_at(markup, extra.span.start),
                message: format!("<{}> after the root element ignored", extra.name),
            });
        }
        let Some(body) = root.child("mj-body") else {
            return Err(LoweringError::MissingBody {
                span: root.span.clone(),
            });
        };

        warnings.extend(validate::check(root, markup));
        let html = html::emit(root, body, &self.config);
        debug!(warnings = warnings.len(), bytes = html.len(), "lowered markup");
        Ok((html, warnings))
    }
}

impl Lowerer for MjmlLowerer {
    fn lower(&self, markup: &str) -> Result<Lowered, LoweringError> {
        let (html, warnings) = self.lower_detailed(markup)?;
        Ok(Lowered {
            html,
            warnings: warnings.iter().map(ToString::to_string).collect(),
        })
    }
}

/// Run `lowerer` on a worker thread and wait at most `deadline`
///
/// Returns `None` when the deadline passes first. The worker is left to
/// finish on its own and its result is dropped.
pub fn lower_within(
    lowerer: Arc<dyn Lowerer>,
    markup: &str,
    deadline: Duration,
) -> Option<Result<Lowered, LoweringError>> {
    let (tx, rx) = mpsc::channel();
    let markup = markup.to_string();
    let spawned = thread::Builder::new()
        .name("mailforge-lower".to_string())
        .spawn(move || {
            // the receiver is gone once the deadline has passed
            let _ = tx.send(lowerer.lower(&markup));
        });
    if let Err(e) = spawned {
        return Some(Err(LoweringError::external(format!(
            "could not start lowering worker: {}",
            e
        ))));
    }

    match rx.recv_timeout(deadline) {
        Ok(result) => Some(result),
        Err(RecvTimeoutError::Timeout) => None,
        Err(RecvTimeoutError::Disconnected) => Some(Err(LoweringError::Interrupted)),
    }
}
