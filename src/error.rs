//! Error taxonomy for a compilation run.
//!
//! Fatal errors (`Input`, `Emitter`) end a format's compilation and surface as
//! `success = false` on the [`CompileResult`](crate::pipeline::CompileResult).
//! Everything else is recovered and downgraded to a [`Warning`].

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompileError {
    #[error("invalid input: {0}")]
    Input(String),

    #[error("section '{section_id}' skipped: {reason}")]
    SectionRender { section_id: String, reason: String },

    #[error("image '{reference}' omitted: {reason}")]
    ResourceFetch { reference: String, reason: String },

    #[error("content exceeds {max_pages} pages; {dropped_items} item(s) truncated")]
    PaginationOverflow {
        max_pages: usize,
        dropped_items: usize,
    },

    #[error("{format} emitter failed: {reason}")]
    Emitter { format: String, reason: String },
}

impl CompileError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, CompileError::Input(_) | CompileError::Emitter { .. })
    }

    /// Downgrade a recoverable error into a warning. Fatal errors are kept as
    /// warnings of kind `Fatal` so callers never lose the message.
    pub fn into_warning(self) -> Warning {
        let kind = match &self {
            CompileError::SectionRender { .. } => WarningKind::SectionSkipped,
            CompileError::ResourceFetch { .. } => WarningKind::ImageOmitted,
            CompileError::PaginationOverflow { .. } => WarningKind::PagesTruncated,
            CompileError::Input(_) | CompileError::Emitter { .. } => WarningKind::Fatal,
        };
        Warning {
            kind,
            message: self.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    SectionSkipped,
    ImageOmitted,
    PagesTruncated,
    Fatal,
}

/// A non-fatal problem recorded during compilation (partial success).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}
