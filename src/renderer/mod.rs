//! Intermediate markup writer and document assembler
//!
//! Block compilers produce fragments with [`MarkupBuilder`]; [`assemble`]
//! wraps them in the head/body envelope.

mod assemble;
pub mod config;
pub mod markup;

pub use assemble::{assemble, style_rules, Metadata, BODY_INDENT};
pub use config::MarkupConfig;
pub use markup::{escape_xml, unescape_xml, Attrs, MarkupBuilder};
