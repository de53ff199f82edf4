//! Error types for lowering intermediate markup

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Hard lowering failures; everything recoverable is a warning instead
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoweringError {
    #[error("nothing to lower: markup is empty")]
    Empty,

    #[error("malformed markup at {span:?}: {message}")]
    Lex { span: Span, message: String },

    #[error("root element must be <mjml>, found {}", describe_found(.found))]
    MissingRoot { found: Option<String>, span: Span },

    #[error("document has no <mj-body>")]
    MissingBody { span: Span },

    #[error("lowering stopped without producing a result")]
    Interrupted,

    #[error("lowering failed: {message}")]
    External { message: String },
}

fn describe_found(found: &Option<String>) -> String {
    match found {
        Some(name) => format!("<{}>", name),
        None => "no element".to_string(),
    }
}

impl LoweringError {
    pub fn lex(span: Span, message: impl Into<String>) -> Self {
        LoweringError::Lex {
            span,
            message: message.into(),
        }
    }

    pub fn external(message: impl Into<String>) -> Self {
        LoweringError::External {
            message: message.into(),
        }
    }

    /// Source location of the failure, if it has one
    pub fn span(&self) -> Option<Span> {
        match self {
            LoweringError::Lex { span, .. }
            | LoweringError::MissingRoot { span, .. }
            | LoweringError::MissingBody { span } => Some(span.clone()),
            LoweringError::Empty | LoweringError::Interrupted | LoweringError::External { .. } => {
                None
            }
        }
    }

    fn label(&self) -> String {
        match self {
            LoweringError::Lex { message, .. } => message.clone(),
            LoweringError::MissingRoot { .. } => "expected <mjml> here".to_string(),
            LoweringError::MissingBody { .. } => "<mj-body> must appear inside this element".to_string(),
            other => other.to_string(),
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let Some(span) = self.span() else {
            return format!("Error: {}\n", self);
        };
        let end = span.end.min(source.len());
        let span = span.start.min(end)..end;

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(self.to_string())
            .with_label(
                Label::new((filename, span))
                    .with_message(self.label())
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);
        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => format!("Error: {}\n", self),
        }
    }
}
