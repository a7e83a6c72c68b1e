//! PPTX emitter – one slide per page, one text box per zone column.
//!
//! Slides are sized to the page geometry, so columns keep their positions.
//! Zone backgrounds are painted as filled rectangles behind the text box.
//! Image pixels are not embedded.

use super::ooxml::{self, escape_xml, Package, XML_DECL};
use super::{Document, EmitError};
use crate::content::ContentNode;
use crate::layout_config::Zone;
use crate::pagination::PlacedSection;
use crate::richtext::Block;
use crate::style::{StyleTokens, TextRole, TextStyle};

const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const P_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Points to English Metric Units.
fn emu(pt: f32) -> i64 {
    (pt * 12_700.0).round() as i64
}

/// Points to hundredths of a point (`a:rPr/@sz`).
fn centipoints(pt: f32) -> i64 {
    (pt * 100.0).round() as i64
}

pub fn render_pptx(doc: &Document, tokens: &StyleTokens) -> Result<Vec<u8>, EmitError> {
    // Always at least one slide.
    let slide_count = doc.pages.len().max(1);

    let mut pkg = Package::new();
    pkg.add("[Content_Types].xml", &content_types(slide_count))?;
    pkg.add("_rels/.rels", &ooxml::package_rels(ooxml::OFFICE_DOCUMENT_REL, "ppt/presentation.xml"))?;
    pkg.add("docProps/core.xml", &ooxml::core_properties(&doc.title))?;
    pkg.add("docProps/app.xml", &ooxml::app_properties())?;
    pkg.add("ppt/presentation.xml", &presentation(doc, slide_count))?;
    pkg.add("ppt/_rels/presentation.xml.rels", &presentation_rels(slide_count))?;
    pkg.add("ppt/slideMasters/slideMaster1.xml", &slide_master())?;
    pkg.add("ppt/slideMasters/_rels/slideMaster1.xml.rels", &master_rels())?;
    pkg.add("ppt/slideLayouts/slideLayout1.xml", &slide_layout())?;
    pkg.add("ppt/slideLayouts/_rels/slideLayout1.xml.rels", &layout_rels())?;
    pkg.add("ppt/theme/theme1.xml", &theme(tokens))?;

    for n in 1..=slide_count {
        let xml = match doc.pages.get(n - 1) {
            Some(page) => slide(doc, &doc.page_zones(page), tokens),
            None => slide(doc, &[], tokens),
        };
        pkg.add(&format!("ppt/slides/slide{n}.xml"), &xml)?;
        pkg.add(&format!("ppt/slides/_rels/slide{n}.xml.rels"), &slide_rels())?;
    }
    pkg.finish()
}

fn content_types(slides: usize) -> String {
    let slide_overrides: String = (1..=slides)
        .map(|n| {
            format!(
                r#"<Override PartName="/ppt/slides/slide{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
            )
        })
        .collect();
    format!(
        r#"{XML_DECL}
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>{slide_overrides}{}</Types>"#,
        ooxml::PROPERTY_OVERRIDES
    )
}

fn presentation(doc: &Document, slides: usize) -> String {
    let ids: String = (1..=slides)
        .map(|n| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + n, n + 1))
        .collect();
    format!(
        r#"{XML_DECL}
<p:presentation xmlns:a="{A_NS}" xmlns:r="{R_NS}" xmlns:p="{P_NS}"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{ids}</p:sldIdLst><p:sldSz cx="{cx}" cy="{cy}"/><p:notesSz cx="{cy}" cy="{cx}"/></p:presentation>"#,
        cx = emu(doc.geometry.page_width),
        cy = emu(doc.geometry.page_height),
    )
}

fn presentation_rels(slides: usize) -> String {
    let mut rels = format!(
        r#"<Relationship Id="rId1" Type="{REL_NS}/slideMaster" Target="slideMasters/slideMaster1.xml"/>"#
    );
    for n in 1..=slides {
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="{REL_NS}/slide" Target="slides/slide{n}.xml"/>"#,
            n + 1
        ));
    }
    rels.push_str(&format!(
        r#"<Relationship Id="rId{}" Type="{REL_NS}/theme" Target="theme/theme1.xml"/>"#,
        slides + 2
    ));
    relationships(&rels)
}

fn relationships(inner: &str) -> String {
    format!(
        r#"{XML_DECL}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{inner}</Relationships>"#
    )
}

fn master_rels() -> String {
    relationships(&format!(
        r#"<Relationship Id="rId1" Type="{REL_NS}/slideLayout" Target="../slideLayouts/slideLayout1.xml"/><Relationship Id="rId2" Type="{REL_NS}/theme" Target="../theme/theme1.xml"/>"#
    ))
}

fn layout_rels() -> String {
    relationships(&format!(
        r#"<Relationship Id="rId1" Type="{REL_NS}/slideMaster" Target="../slideMasters/slideMaster1.xml"/>"#
    ))
}

fn slide_rels() -> String {
    relationships(&format!(
        r#"<Relationship Id="rId1" Type="{REL_NS}/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>"#
    ))
}

const EMPTY_TREE: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#;

fn slide_master() -> String {
    format!(
        r#"{XML_DECL}
<p:sldMaster xmlns:a="{A_NS}" xmlns:r="{R_NS}" xmlns:p="{P_NS}"><p:cSld><p:spTree>{EMPTY_TREE}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#
    )
}

fn slide_layout() -> String {
    format!(
        r#"{XML_DECL}
<p:sldLayout xmlns:a="{A_NS}" xmlns:r="{R_NS}" xmlns:p="{P_NS}" type="blank" preserve="1"><p:cSld name="Blank"><p:spTree>{EMPTY_TREE}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#
    )
}

fn theme(tokens: &StyleTokens) -> String {
    let font = escape_xml(&tokens.body_font);
    let heading = escape_xml(&tokens.heading_font);
    let fill = |c: &str| format!(r#"<a:solidFill><a:srgbClr val="{c}"/></a:solidFill>"#);
    let line = r#"<a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#;
    format!(
        r#"{XML_DECL}
<a:theme xmlns:a="{A_NS}" name="Profile"><a:themeElements><a:clrScheme name="Profile"><a:dk1><a:srgbClr val="{text}"/></a:dk1><a:lt1><a:srgbClr val="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="{primary}"/></a:dk2><a:lt2><a:srgbClr val="F4F6F8"/></a:lt2><a:accent1><a:srgbClr val="{accent}"/></a:accent1><a:accent2><a:srgbClr val="{primary}"/></a:accent2><a:accent3><a:srgbClr val="{muted}"/></a:accent3><a:accent4><a:srgbClr val="{accent}"/></a:accent4><a:accent5><a:srgbClr val="{primary}"/></a:accent5><a:accent6><a:srgbClr val="{muted}"/></a:accent6><a:hlink><a:srgbClr val="{accent}"/></a:hlink><a:folHlink><a:srgbClr val="{muted}"/></a:folHlink></a:clrScheme><a:fontScheme name="Profile"><a:majorFont><a:latin typeface="{heading}"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="{font}"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Profile"><a:fillStyleLst>{f1}{f1}{f1}</a:fillStyleLst><a:lnStyleLst>{line}{line}{line}</a:lnStyleLst><a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst><a:bgFillStyleLst>{f1}{f1}{f1}</a:bgFillStyleLst></a:fmtScheme></a:themeElements></a:theme>"#,
        text = tokens.text.hex(),
        primary = tokens.primary.hex(),
        accent = tokens.accent.hex(),
        muted = tokens.muted.hex(),
        f1 = fill("FFFFFF"),
    )
}

fn slide(doc: &Document, zones: &[(Zone, &[PlacedSection])], tokens: &StyleTokens) -> String {
    let g = &doc.geometry;
    let top = g.margin;
    let height = g.content_height;
    let mut shapes = String::new();
    let mut next_id = 2;

    for (zone, placed) in zones {
        let Some(column) = g.column(*zone) else {
            continue;
        };
        let treatment = tokens.zone(*zone);
        if let Some(bg) = treatment.background {
            shapes.push_str(&format!(
                r#"<p:sp><p:nvSpPr><p:cNvPr id="{next_id}" name="{name} background"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:solidFill><a:srgbClr val="{fill}"/></a:solidFill><a:ln><a:noFill/></a:ln></p:spPr></p:sp>"#,
                name = zone.as_str(),
                x = emu(column.x),
                y = emu(top),
                cx = emu(column.width),
                cy = emu(height),
                fill = bg.hex(),
            ));
            next_id += 1;
        }

        let mut paragraphs = zone_paragraphs(placed, tokens, *zone);
        if paragraphs.is_empty() {
            paragraphs.push_str(r#"<a:p><a:endParaRPr lang="en-US"/></a:p>"#);
        }
        let inset = emu(treatment.padding);
        shapes.push_str(&format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{next_id}" name="{name}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr><p:txBody><a:bodyPr wrap="square" lIns="{inset}" tIns="{inset}" rIns="{inset}" bIns="{inset}" anchor="t"><a:normAutofit/></a:bodyPr><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#,
            name = zone.as_str(),
            x = emu(column.x),
            y = emu(top),
            cx = emu(column.width),
            cy = emu(height),
        ));
        next_id += 1;
    }

    format!(
        r#"{XML_DECL}
<p:sld xmlns:a="{A_NS}" xmlns:r="{R_NS}" xmlns:p="{P_NS}"><p:cSld><p:spTree>{EMPTY_TREE}{shapes}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#
    )
}

fn zone_paragraphs(placed: &[PlacedSection], tokens: &StyleTokens, zone: Zone) -> String {
    let mut out = String::new();
    for (i, section) in placed.iter().enumerate() {
        let before = if i > 0 { centipoints(tokens.section_gap) } else { 0 };
        if let Some(title) = &section.title {
            out.push_str(&format!(
                r#"<a:p><a:pPr><a:spcBef><a:spcPts val="{before}"/></a:spcBef></a:pPr>{}</a:p>"#,
                run(title, &tokens.text_style(TextRole::Title, zone), false)
            ));
        }
        for item in &section.items {
            for node in &item.nodes {
                out.push_str(&node_xml(node, tokens, zone));
            }
        }
    }
    out
}

fn node_xml(node: &ContentNode, tokens: &StyleTokens, zone: Zone) -> String {
    let para = |runs: String| format!("<a:p>{runs}</a:p>");
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
        ContentNode::Paragraph { blocks } => {
            let base = tokens.text_style(TextRole::Body, zone);
            blocks.iter().map(|b| block_xml(b, &base)).collect()
        }
        ContentNode::Image { .. } => String::new(),
    }
}

fn block_xml(block: &Block, base: &TextStyle) -> String {
    let mut runs = String::new();
    if let Block::ListItem { marker, .. } = block {
        runs.push_str(&run(&format!("{} ", marker.label()), base, false));
    }
    for r in block.runs() {
        if r.is_line_break() {
            runs.push_str("<a:br/>");
            continue;
        }
        let style = TextStyle {
            bold: base.bold || r.bold,
            italic: base.italic || r.italic,
            ..base.clone()
        };
        runs.push_str(&run(&r.text, &style, r.underline));
    }
    match block {
        Block::Paragraph { .. } => format!("<a:p>{runs}</a:p>"),
        Block::ListItem { .. } => format!(r#"<a:p><a:pPr marL="228600"/>{runs}</a:p>"#),
    }
}

fn run(text: &str, style: &TextStyle, underline: bool) -> String {
    format!(
        r#"<a:r><a:rPr lang="en-US" sz="{sz}" b="{b}" i="{i}"{u} dirty="0"><a:solidFill><a:srgbClr val="{color}"/></a:solidFill><a:latin typeface="{font}"/></a:rPr><a:t>{text}</a:t></a:r>"#,
        sz = centipoints(style.size),
        b = u8::from(style.bold),
        i = u8::from(style.italic),
        u = if underline { r#" u="sng""# } else { "" },
        color = style.color.hex(),
        font = escape_xml(&style.font),
        text = escape_xml(text),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::test_support::sample_document;
    use crate::layout_config::LayoutType;

    #[test]
    fn one_slide_per_page() {
        let doc = sample_document(LayoutType::SingleColumn);
        let xml = content_types(doc.pages.len());
        assert!(xml.contains("/ppt/slides/slide2.xml"));
        assert!(!xml.contains("/ppt/slides/slide3.xml"));
        let bytes = render_pptx(&doc, &StyleTokens::default()).unwrap();
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn sidebar_gets_background_shape() {
        let doc = sample_document(LayoutType::Sidebar);
        let xml = slide(&doc, &doc.page_zones(&doc.pages[0]), &StyleTokens::default());
        assert!(xml.contains("sidebar background"));
        assert!(xml.contains("Ada Lovelace"));
        // 2 × base font = 21pt headline
        assert!(xml.contains(r#"sz="2100""#));
    }

    #[test]
    fn unit_conversions() {
        assert_eq!(emu(1.0), 12_700);
        assert_eq!(centipoints(10.5), 1050);
    }
}
