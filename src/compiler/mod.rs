//! Content blocks to intermediate markup fragments
//!
//! Each variant has its own compiler; [`compile_blocks`] walks a document's
//! blocks in order and collects the fragments the assembler concatenates.

mod footer;
mod hero;
mod products;

use tracing::{debug, warn};

use crate::document::ContentBlock;
use crate::renderer::{escape_xml, MarkupBuilder, MarkupConfig};
use crate::tokens::DesignTokenSet;

/// Compiled markup for one block, already indented for the body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    markup: String,
}

impl Fragment {
    pub fn new(markup: String) -> Self {
        Self { markup }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.markup.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.markup
    }

    pub fn into_string(self) -> String {
        self.markup
    }
}

impl From<MarkupBuilder> for Fragment {
    fn from(builder: MarkupBuilder) -> Self {
        Self::new(builder.finish())
    }
}

/// Fragments in document order plus the blocks that were skipped
#[derive(Debug, Clone, Default)]
pub struct CompiledBlocks {
    pub fragments: Vec<Fragment>,
    pub warnings: Vec<String>,
}

/// Compile a single block; unknown variants yield an empty fragment
pub fn compile_block(
    block: &ContentBlock,
    tokens: &DesignTokenSet,
    config: &MarkupConfig,
) -> Fragment {
    match block {
        ContentBlock::Hero(hero) => hero::compile(hero, tokens, config),
        ContentBlock::Items(list) => products::compile_items(list, tokens, config),
        ContentBlock::Recommendations(list) => {
            products::compile_recommendations(list, tokens, config)
        }
        ContentBlock::Footer(footer) => footer::compile(footer, tokens, config),
        ContentBlock::Unknown { .. } => Fragment::empty(),
    }
}

/// Compile every block in order, recording a warning for each unknown type
pub fn compile_blocks(
    blocks: &[ContentBlock],
    tokens: &DesignTokenSet,
    config: &MarkupConfig,
) -> CompiledBlocks {
    let mut compiled = CompiledBlocks::default();
    for (position, block) in blocks.iter().enumerate() {
        if let ContentBlock::Unknown { kind, .. } = block {
            warn!(kind = %kind, position, "skipping unknown block type");
            compiled.warnings.push(format!(
                "unknown block type '{}' at position {}; block skipped",
                kind, position
            ));
            continue;
        }
        debug!(kind = block.kind(), position, "compiling block");
        compiled.fragments.push(compile_block(block, tokens, config));
    }
    compiled
}

/// An optional document field, treating empty strings as absent
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Inline link used by product names and footer links
fn link(href: &str, label: &str, style: &str) -> String {
    format!(
        r#"<a href="{}" style="{}">{}</a>"#,
        escape_xml(href),
        escape_xml(style),
        escape_xml(label)
    )
}
