//! DOCX emitter – WordprocessingML written straight into an OPC package.
//!
//! Pages end with hard page breaks. A page with more than one zone becomes a
//! one-row table whose cells follow the column geometry. Image pixels are
//! not embedded.

use super::ooxml::{self, escape_xml, Package, XML_DECL};
use super::{Document, EmitError};
use crate::content::ContentNode;
use crate::layout_config::Zone;
use crate::pagination::PlacedSection;
use crate::richtext::{Block, Run};
use crate::style::{StyleTokens, TextRole, TextStyle};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Points to twentieths of a point.
fn twips(pt: f32) -> i64 {
    (pt * 20.0).round() as i64
}

/// Points to half-points (`w:sz`).
fn half_points(pt: f32) -> i64 {
    (pt * 2.0).round() as i64
}

pub fn render_docx(doc: &Document, tokens: &StyleTokens) -> Result<Vec<u8>, EmitError> {
    let mut pkg = Package::new();
    pkg.add("[Content_Types].xml", &content_types())?;
    pkg.add("_rels/.rels", &ooxml::package_rels(ooxml::OFFICE_DOCUMENT_REL, "word/document.xml"))?;
    pkg.add("docProps/core.xml", &ooxml::core_properties(&doc.title))?;
    pkg.add("docProps/app.xml", &ooxml::app_properties())?;
    pkg.add("word/_rels/document.xml.rels", DOCUMENT_RELS)?;
    pkg.add("word/styles.xml", &styles(tokens))?;
    pkg.add("word/document.xml", &document_xml(doc, tokens))?;
    pkg.finish()
}

fn content_types() -> String {
    format!(
        r#"{XML_DECL}
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>{}</Types>"#,
        ooxml::PROPERTY_OVERRIDES
    )
}

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

fn styles(tokens: &StyleTokens) -> String {
    format!(
        r#"{XML_DECL}
<w:styles xmlns:w="{W_NS}"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:cs="{font}"/><w:sz w:val="{sz}"/><w:color w:val="{color}"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="0" w:line="{line}" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style></w:styles>"#,
        font = escape_xml(&tokens.body_font),
        sz = half_points(tokens.body_size),
        color = tokens.text.hex(),
        // 240ths of a line
        line = (tokens.line_height * 240.0).round() as i64,
    )
}

fn document_xml(doc: &Document, tokens: &StyleTokens) -> String {
    let mut body = String::new();
    for (i, page) in doc.pages.iter().enumerate() {
        if i > 0 {
            body.push_str(r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#);
        }
        let zones = doc.page_zones(page);
        if zones.len() == 1 {
            let (zone, placed) = zones[0];
            body.push_str(&zone_paragraphs(placed, tokens, zone));
        } else {
            body.push_str(&zone_table(doc, &zones, tokens));
        }
    }

    let g = &doc.geometry;
    let orient = if g.page_width > g.page_height {
        r#" w:orient="landscape""#
    } else {
        ""
    };
    let margin = twips(g.margin);
    format!(
        r#"{XML_DECL}
<w:document xmlns:w="{W_NS}"><w:body>{body}<w:sectPr><w:pgSz w:w="{w}" w:h="{h}"{orient}/><w:pgMar w:top="{margin}" w:right="{margin}" w:bottom="{margin}" w:left="{margin}" w:header="0" w:footer="0" w:gutter="0"/></w:sectPr></w:body></w:document>"#,
        w = twips(g.page_width),
        h = twips(g.page_height),
    )
}

/// One-row table with a cell per zone column.
fn zone_table(doc: &Document, zones: &[(Zone, &[PlacedSection])], tokens: &StyleTokens) -> String {
    let mut grid = String::new();
    let mut cells = String::new();
    for (zone, placed) in zones {
        let width = doc
            .geometry
            .column(*zone)
            .map(|c| c.width)
            .unwrap_or(doc.geometry.content_width);
        grid.push_str(&format!(r#"<w:gridCol w:w="{}"/>"#, twips(width)));

        let treatment = tokens.zone(*zone);
        let shading = treatment
            .background
            .map(|bg| format!(r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#, bg.hex()))
            .unwrap_or_default();
        let pad = twips(treatment.padding);
        let mut content = zone_paragraphs(placed, tokens, *zone);
        if content.is_empty() {
            // A cell must hold at least one paragraph.
            content.push_str("<w:p/>");
        }
        cells.push_str(&format!(
            r#"<w:tc><w:tcPr><w:tcW w:w="{w}" w:type="dxa"/>{shading}<w:tcMar><w:top w:w="{pad}" w:type="dxa"/><w:left w:w="{pad}" w:type="dxa"/><w:bottom w:w="{pad}" w:type="dxa"/><w:right w:w="{pad}" w:type="dxa"/></w:tcMar></w:tcPr>{content}</w:tc>"#,
            w = twips(width),
        ));
    }
    format!(
        r#"<w:tbl><w:tblPr><w:tblW w:w="{}" w:type="dxa"/><w:tblLayout w:type="fixed"/></w:tblPr><w:tblGrid>{grid}</w:tblGrid><w:tr>{cells}</w:tr></w:tbl>"#,
        twips(doc.geometry.content_width)
    )
}

fn zone_paragraphs(placed: &[PlacedSection], tokens: &StyleTokens, zone: Zone) -> String {
    let mut out = String::new();
    for (i, section) in placed.iter().enumerate() {
        let gap = if i > 0 { twips(tokens.section_gap) } else { 0 };
        if let Some(title) = &section.title {
            let style = tokens.text_style(TextRole::Title, zone);
            out.push_str(&format!(
                r#"<w:p><w:pPr><w:spacing w:before="{gap}" w:after="120"/><w:pBdr><w:bottom w:val="single" w:sz="6" w:space="1" w:color="{}"/></w:pBdr></w:pPr>{}</w:p>"#,
                style.color.hex(),
                run(title, &style, false)
            ));
        }
        for item in &section.items {
            for node in &item.nodes {
                out.push_str(&node_xml(node, tokens, zone));
            }
            out.push_str(&format!(
                r#"<w:p><w:pPr><w:spacing w:after="{}"/></w:pPr></w:p>"#,
                twips(tokens.item_gap)
            ));
        }
    }
    out
}

fn node_xml(node: &ContentNode, tokens: &StyleTokens, zone: Zone) -> String {
    let para = |runs: String| format!("<w:p>{runs}</w:p>");
    match node {
        ContentNode::Title { text } => para(run(text, &tokens.text_style(TextRole::Title, zone), false)),
        ContentNode::Headline { text } => {
            para(run(text, &tokens.text_style(TextRole::Headline, zone), false))
        }
        ContentNode::Subtitle { text, emphasis } => {
            let mut style = tokens.text_style(TextRole::Subtitle, zone);
            style.bold = *emphasis;
            para(run(text, &style, false))
        }
        ContentNode::KeyValueLine { parts } => {
            para(run(&parts.join(" | "), &tokens.text_style(TextRole::Body, zone), false))
        }
        ContentNode::TagGroup { tags } => {
            para(run(&tags.join(" \u{00B7} "), &tokens.text_style(TextRole::Tag, zone), false))
        }
        ContentNode::Paragraph { blocks } => blocks
            .iter()
            .map(|b| block_xml(b, &tokens.text_style(TextRole::Body, zone)))
            .collect(),
        ContentNode::Image { .. } => String::new(),
    }
}

fn block_xml(block: &Block, base: &TextStyle) -> String {
    let runs: String = block.runs().iter().map(|r| styled_run(r, base)).collect();
    match block {
        Block::Paragraph { .. } => format!("<w:p>{runs}</w:p>"),
        Block::ListItem { marker, .. } => format!(
            r#"<w:p><w:pPr><w:ind w:left="360" w:hanging="240"/></w:pPr>{}{runs}</w:p>"#,
            run(&format!("{} ", marker.label()), base, false)
        ),
    }
}

fn styled_run(r: &Run, base: &TextStyle) -> String {
    if r.is_line_break() {
        return "<w:r><w:br/></w:r>".to_string();
    }
    let style = TextStyle {
        bold: base.bold || r.bold,
        italic: base.italic || r.italic,
        ..base.clone()
    };
    run(&r.text, &style, r.underline)
}

fn run(text: &str, style: &TextStyle, underline: bool) -> String {
    let mut props = format!(
        r#"<w:rFonts w:ascii="{f}" w:hAnsi="{f}" w:cs="{f}"/>"#,
        f = escape_xml(&style.font)
    );
    if style.bold {
        props.push_str("<w:b/>");
    }
    if style.italic {
        props.push_str("<w:i/>");
    }
    if underline {
        props.push_str(r#"<w:u w:val="single"/>"#);
    }
    props.push_str(&format!(
        r#"<w:color w:val="{}"/><w:sz w:val="{}"/>"#,
        style.color.hex(),
        half_points(style.size)
    ));
    format!(
        r#"<w:r><w:rPr>{props}</w:rPr><w:t xml:space="preserve">{}</w:t></w:r>"#,
        escape_xml(text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::test_support::sample_document;
    use crate::layout_config::LayoutType;

    #[test]
    fn produces_zip_package() {
        let doc = sample_document(LayoutType::SingleColumn);
        let bytes = render_docx(&doc, &StyleTokens::default()).unwrap();
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn pages_are_separated_by_hard_breaks() {
        let doc = sample_document(LayoutType::SingleColumn);
        let xml = document_xml(&doc, &StyleTokens::default());
        assert_eq!(xml.matches(r#"<w:br w:type="page"/>"#).count(), 1);
        assert!(xml.contains("Analyst &amp; Writer"));
        assert!(xml.contains("<w:b/>"));
        assert!(!xml.contains("<w:tbl>"));
    }

    #[test]
    fn multi_zone_pages_become_tables() {
        let doc = sample_document(LayoutType::Sidebar);
        let xml = document_xml(&doc, &StyleTokens::default());
        assert!(xml.contains("<w:tbl>"));
        // Sidebar cell is shaded.
        assert!(xml.contains(r#"w:fill="1A365D""#));
    }

    #[test]
    fn half_point_sizes() {
        assert_eq!(half_points(10.5), 21);
        assert_eq!(twips(40.0), 800);
    }
}
