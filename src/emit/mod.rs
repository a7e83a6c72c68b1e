//! Backend emitters – one pure serializer per output format.
//!
//! Every emitter consumes the same paginated [`Document`] and the same
//! [`StyleTokens`]; none of them hides, masks or reorders content.

pub mod docx;
pub mod html;
pub mod json;
pub mod markdown;
pub mod ooxml;
pub mod pdf;
pub mod pptx;
pub mod text;
pub mod xlsx;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::content::SectionItem;
use crate::images::ResolvedImage;
use crate::layout::PageGeometry;
use crate::layout_config::{LayoutType, Zone};
use crate::model::SectionType;
use crate::pagination::{Page, PlacedSection};
use crate::style::StyleTokens;

// ---------------------------------------------------------------------------
// Format catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Pdf,
    Docx,
    Pptx,
    Html,
    Markdown,
    Xlsx,
    Json,
    Text,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 8] = [
        OutputFormat::Pdf,
        OutputFormat::Docx,
        OutputFormat::Pptx,
        OutputFormat::Html,
        OutputFormat::Markdown,
        OutputFormat::Xlsx,
        OutputFormat::Json,
        OutputFormat::Text,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Docx => "docx",
            OutputFormat::Pptx => "pptx",
            OutputFormat::Html => "html",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Json => "json",
            OutputFormat::Text => "text",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "application/pdf",
            OutputFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            OutputFormat::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            OutputFormat::Html => "text/html; charset=utf-8",
            OutputFormat::Markdown => "text/markdown; charset=utf-8",
            OutputFormat::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            OutputFormat::Json => "application/json",
            OutputFormat::Text => "text/plain; charset=utf-8",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Text => "txt",
            other => other.id(),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "docx" | "word" | "doc" => Ok(OutputFormat::Docx),
            "pptx" | "ppt" | "powerpoint" | "slides" => Ok(OutputFormat::Pptx),
            "html" | "htm" => Ok(OutputFormat::Html),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "xlsx" | "excel" | "xls" => Ok(OutputFormat::Xlsx),
            "json" => Ok(OutputFormat::Json),
            "text" | "txt" | "plain" => Ok(OutputFormat::Text),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Message(String),
}

// ---------------------------------------------------------------------------
// Emitter input
// ---------------------------------------------------------------------------

/// The paginated document every emitter serializes.
#[derive(Debug, Clone)]
pub struct Document {
    pub title: String,
    pub layout_type: LayoutType,
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
    /// The resolved profile photo, when it was fetched successfully.
    pub image: Option<ResolvedImage>,
}

/// A section with all its chunks merged back together, for formats that
/// ignore pages and columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatSection {
    pub id: String,
    pub section_type: SectionType,
    pub display_order: i32,
    pub zone: Zone,
    pub title: Option<String>,
    pub items: Vec<SectionItem>,
}

impl Document {
    /// Zones in the layout's left-to-right column order.
    pub fn zone_order(&self) -> Vec<Zone> {
        self.layout_type.zones()
    }

    /// The page's zones in column order, each with its placements.
    pub fn page_zones<'a>(&self, page: &'a Page) -> Vec<(Zone, &'a [PlacedSection])> {
        self.zone_order()
            .into_iter()
            .map(|zone| {
                let placed = page.zones.get(&zone).map(|v| v.as_slice()).unwrap_or(&[]);
                (zone, placed)
            })
            .collect()
    }

    /// Sections in display order, continuation chunks folded into their
    /// first occurrence.
    pub fn flat_sections(&self) -> Vec<FlatSection> {
        let mut flat: Vec<FlatSection> = Vec::new();
        for page in &self.pages {
            for (zone, placed) in &page.zones {
                for chunk in placed {
                    match flat.iter_mut().find(|s| s.id == chunk.section_id) {
                        Some(existing) => existing.items.extend(chunk.items.iter().cloned()),
                        None => flat.push(FlatSection {
                            id: chunk.section_id.clone(),
                            section_type: chunk.section_type,
                            display_order: chunk.display_order,
                            zone: *zone,
                            title: chunk.title.clone(),
                            items: chunk.items.clone(),
                        }),
                    }
                }
            }
        }
        flat.sort_by_key(|s| s.display_order);
        flat
    }

    /// The photo to embed for an `Image` node, if it was resolved.
    pub fn image_for(&self, src: &str) -> Option<&ResolvedImage> {
        self.image.as_ref().filter(|img| img.reference == src)
    }
}

/// Serialize `doc` in `format`.
pub fn emit(format: OutputFormat, doc: &Document, tokens: &StyleTokens) -> Result<Vec<u8>, EmitError> {
    let bytes = match format {
        OutputFormat::Pdf => pdf::render_pdf(doc, tokens)?,
        OutputFormat::Docx => docx::render_docx(doc, tokens)?,
        OutputFormat::Pptx => pptx::render_pptx(doc, tokens)?,
        OutputFormat::Html => html::render_html(doc, tokens).into_bytes(),
        OutputFormat::Markdown => markdown::render_markdown(doc).into_bytes(),
        OutputFormat::Xlsx => xlsx::render_xlsx(doc)?,
        OutputFormat::Json => json::render_json(doc, tokens)?,
        OutputFormat::Text => text::render_text(doc).into_bytes(),
    };
    log::debug!("{format} emitter produced {} bytes", bytes.len());
    Ok(bytes)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_catalog() {
        for format in OutputFormat::ALL {
            assert_eq!(format.id().parse::<OutputFormat>().unwrap(), format);
            assert!(!format.mime_type().is_empty());
        }
        assert_eq!("MD".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("excel".parse::<OutputFormat>().unwrap(), OutputFormat::Xlsx);
        assert_eq!(OutputFormat::Text.extension(), "txt");
        assert!("odt".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn flat_sections_merge_chunks() {
        let mut doc = test_support::sample_document(LayoutType::SingleColumn);
        let mut cont = doc.pages[0].zones[&Zone::Main][1].clone();
        cont.title = Some("Experience (cont.)".into());
        cont.continued = true;
        doc.pages[1].zones.get_mut(&Zone::Main).unwrap().insert(0, cont);

        let flat = doc.flat_sections();
        let ids: Vec<_> = flat.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["general", "exp", "skills"]);
        assert_eq!(flat[1].items.len(), 2);
        assert_eq!(flat[1].title.as_deref(), Some("Experience"));
    }

    #[test]
    fn every_format_emits_bytes() {
        let doc = test_support::sample_document(LayoutType::Sidebar);
        let tokens = StyleTokens::default();
        for format in OutputFormat::ALL {
            let bytes = emit(format, &doc, &tokens).unwrap();
            assert!(!bytes.is_empty(), "{format} produced no output");
        }
    }
}
