//! JSON emitter – the canonical content as data.
//!
//! Sections are flattened in display order; `pages` records which section
//! chunks landed on which page so consumers can rebuild the layout.

use serde::Serialize;

use super::{Document, EmitError, FlatSection};
use crate::layout_config::{LayoutType, Zone};
use crate::style::StyleTokens;

#[derive(Serialize)]
struct JsonDocument<'a> {
    title: &'a str,
    layout: LayoutType,
    page_count: usize,
    page: PageInfo,
    style: StyleSummary,
    sections: Vec<FlatSection>,
    pages: Vec<PageEntry>,
}

#[derive(Serialize)]
struct PageInfo {
    width: f32,
    height: f32,
    margin: f32,
}

#[derive(Serialize)]
struct StyleSummary {
    primary: String,
    text: String,
    accent: String,
    heading_font: String,
    body_font: String,
    body_size: f32,
}

#[derive(Serialize)]
struct PageEntry {
    index: usize,
    zones: Vec<ZoneEntry>,
}

#[derive(Serialize)]
struct ZoneEntry {
    zone: Zone,
    sections: Vec<ChunkEntry>,
}

#[derive(Serialize)]
struct ChunkEntry {
    id: String,
    items: usize,
    continued: bool,
}

pub fn render_json(doc: &Document, tokens: &StyleTokens) -> Result<Vec<u8>, EmitError> {
    let pages = doc
        .pages
        .iter()
        .map(|page| PageEntry {
            index: page.index,
            zones: doc
                .page_zones(page)
                .into_iter()
                .map(|(zone, placed)| ZoneEntry {
                    zone,
                    sections: placed
                        .iter()
                        .map(|p| ChunkEntry {
                            id: p.section_id.clone(),
                            items: p.items.len(),
                            continued: p.continued,
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    let out = JsonDocument {
        title: &doc.title,
        layout: doc.layout_type,
        page_count: doc.pages.len(),
        page: PageInfo {
            width: doc.geometry.page_width,
            height: doc.geometry.page_height,
            margin: doc.geometry.margin,
        },
        style: StyleSummary {
            primary: tokens.primary.css(),
            text: tokens.text.css(),
            accent: tokens.accent.css(),
            heading_font: tokens.heading_font.clone(),
            body_font: tokens.body_font.clone(),
            body_size: tokens.body_size,
        },
        sections: doc.flat_sections(),
        pages,
    };
    let mut bytes = serde_json::to_vec_pretty(&out)?;
    bytes.push(b'\n');
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::test_support::sample_document;

    #[test]
    fn sections_and_pages_are_recorded() {
        let doc = sample_document(LayoutType::Sidebar);
        let bytes = render_json(&doc, &StyleTokens::default()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["title"], "Ada Lovelace");
        assert_eq!(value["page_count"], 2);
        assert_eq!(value["layout"], "sidebar");
        let sections = value["sections"].as_array().unwrap();
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[1]["id"], "exp");
        assert_eq!(sections[1]["items"][0]["nodes"][0]["kind"], "subtitle");
        assert_eq!(value["pages"][1]["zones"][0]["zone"], "sidebar");
    }
}
