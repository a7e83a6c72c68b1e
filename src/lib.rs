//! # profile-forge – one canonical content model, eight output formats
//!
//! This crate compiles a person's profile plus a configured template into
//! PDF, DOCX, PPTX, HTML, Markdown, XLSX, JSON or plain text. The pipeline
//! stages are:
//!
//! 1. **Policy** – resolve per-field visibility, order and masking ([`policy`])
//! 2. **Render** – turn each section into content nodes ([`sections`], [`richtext`])
//! 3. **Zone** – place sections into the layout's columns ([`zones`], [`layout`])
//! 4. **Paginate** – distribute sections over pages ([`pagination`])
//! 5. **Emit** – serialize the pages in the requested format ([`emit`])
//!
//! [`pipeline::compile`] runs all of them for one format and
//! [`pipeline::compile_all`] for several.

pub mod content;
pub mod emit;
pub mod error;
pub mod fonts;
pub mod images;
pub mod layout;
pub mod layout_config;
pub mod model;
pub mod pagination;
pub mod pipeline;
pub mod policy;
pub mod richtext;
pub mod sections;
pub mod style;
pub mod templates;
pub mod zones;

// Re-exports for convenience
pub use emit::OutputFormat;
pub use error::{CompileError, Warning, WarningKind};
pub use pipeline::{compile, compile_all, CompileOptions, CompileRequest, CompileResult};
