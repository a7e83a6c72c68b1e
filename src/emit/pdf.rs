//! PDF emitter – draws the paginated document with `printpdf` (v0.8
//! ops-based API) and the builtin Helvetica faces.
//!
//! Every node advances the cursor by exactly what [`HeightEstimator`]
//! predicted, so content placed on a page by pagination always fits it.

use printpdf::{
    BuiltinFont, Color, Line, LinePoint, Mm, Op, PaintMode, PdfDocument, PdfPage, PdfSaveOptions,
    Point, Polygon, PolygonRing, Pt, RawImage, Rgb, TextItem, WindingOrder, XObjectId,
    XObjectTransform,
};

use super::{Document, EmitError};
use crate::content::ContentNode;
use crate::fonts::{wrap_runs, FontManager};
use crate::layout::ColumnBox;
use crate::layout_config::Zone;
use crate::pagination::{HeightEstimator, PlacedSection, IMAGE_HEIGHT, LIST_INDENT, TITLE_RULE_GAP};
use crate::richtext::Block;
use crate::style::{self, StyleTokens, TextRole, TextStyle};

const PT_TO_MM: f32 = 0.352778;
/// Baseline offset from the top of a line box, as a share of the font size.
const ASCENT: f32 = 0.75;

/// The photo registered as an XObject.
struct EmbeddedImage {
    reference: String,
    xobj_id: XObjectId,
    px_width: u32,
    px_height: u32,
}

pub fn render_pdf(doc: &Document, tokens: &StyleTokens) -> Result<Vec<u8>, EmitError> {
    let g = &doc.geometry;
    let page_w = Mm(g.page_width * PT_TO_MM);
    let page_h = Mm(g.page_height * PT_TO_MM);

    let mut pdf = PdfDocument::new(&doc.title);

    let mut warnings = Vec::new();
    let image = match &doc.image {
        Some(img) => match RawImage::decode_from_bytes(&img.bytes, &mut warnings) {
            Ok(raw) => Some(EmbeddedImage {
                reference: img.reference.clone(),
                xobj_id: pdf.add_image(&raw),
                px_width: img.width_px,
                px_height: img.height_px,
            }),
            Err(e) => {
                log::warn!("Skipping profile photo, PDF encode error: {e}");
                None
            }
        },
        None => None,
    };

    let fonts = FontManager::new();
    let estimator = HeightEstimator::new(tokens, &fonts);
    let mut pages = Vec::new();
    for page in &doc.pages {
        let mut canvas = Canvas {
            ops: Vec::new(),
            page_height: g.page_height,
            tokens,
            fonts: &fonts,
            estimator: &estimator,
            image: image.as_ref(),
        };
        for (zone, placed) in doc.page_zones(page) {
            let Some(column) = g.column(zone) else {
                continue;
            };
            canvas.zone(*column, g.margin, g.content_height, placed);
        }
        pages.push(PdfPage::new(page_w, page_h, canvas.ops));
    }

    // Ensure at least one page.
    if pages.is_empty() {
        pages.push(PdfPage::new(page_w, page_h, Vec::new()));
    }

    pdf.with_pages(pages);
    let bytes = pdf.save(&PdfSaveOptions::default(), &mut warnings);
    if bytes.is_empty() {
        return Err(EmitError::Message("printpdf produced an empty document".into()));
    }
    Ok(bytes)
}

/// Draw state for one page. Coordinates passed in are top-left based; the
/// conversion to PDF's bottom-left origin happens at the op level.
struct Canvas<'a> {
    ops: Vec<Op>,
    page_height: f32,
    tokens: &'a StyleTokens,
    fonts: &'a FontManager,
    estimator: &'a HeightEstimator<'a>,
    image: Option<&'a EmbeddedImage>,
}

impl Canvas<'_> {
    fn zone(&mut self, column: ColumnBox, top: f32, height: f32, placed: &[PlacedSection]) {
        let treatment = self.tokens.zone(column.zone);
        if let Some(bg) = treatment.background {
            self.fill_rect(column.x, top, column.width, height, bg);
        }

        let x = column.content_x();
        let width = column.content_width();
        let mut y = top + column.padding;
        for (i, section) in placed.iter().enumerate() {
            if i > 0 {
                y += self.estimator.section_gap();
            }
            if let Some(title) = &section.title {
                self.title(title, x, y, width, column.zone);
                y += self.estimator.title_height();
            }
            for item in &section.items {
                for node in &item.nodes {
                    self.node(node, x, y, width, column.zone);
                    y += self.estimator.node_height(node, width);
                }
                y += self.tokens.item_gap;
            }
        }
    }

    fn title(&mut self, text: &str, x: f32, y: f32, width: f32, zone: Zone) {
        let style = self.tokens.text_style(TextRole::Title, zone);
        self.text(text, x, y, &style, style.bold, style.italic);
        let rule_y = y + self.tokens.line_advance(style.size) + TITLE_RULE_GAP / 2.0;
        self.line(x, rule_y, x + width, rule_y, 0.75, style.color);
    }

    fn node(&mut self, node: &ContentNode, x: f32, y: f32, width: f32, zone: Zone) {
        match node {
            ContentNode::Title { text } => self.title(text, x, y, width, zone),
            ContentNode::Headline { text } => {
                let style = self.tokens.text_style(TextRole::Headline, zone);
                self.wrapped(text, x, y, width, &style, true);
            }
            ContentNode::Subtitle { text, emphasis } => {
                let style = self.tokens.text_style(TextRole::Subtitle, zone);
                self.wrapped(text, x, y, width, &style, *emphasis);
            }
            ContentNode::KeyValueLine { parts } => {
                let style = self.tokens.text_style(TextRole::Body, zone);
                self.wrapped(&parts.join(" | "), x, y, width, &style, false);
            }
            ContentNode::TagGroup { tags } => self.tags(tags, x, y, width, zone),
            ContentNode::Paragraph { blocks } => self.blocks(blocks, x, y, width, zone),
            ContentNode::Image { src, .. } => self.photo(src, x, y, width),
        }
    }

    fn wrapped(&mut self, text: &str, x: f32, y: f32, width: f32, style: &TextStyle, bold: bool) {
        let advance = self.tokens.line_advance(style.size);
        let lines = self
            .fonts
            .wrap_text(text, style.size, bold, &self.tokens.body_font, width);
        for (i, line) in lines.iter().enumerate() {
            self.text(line, x, y + i as f32 * advance, style, bold, false);
        }
    }

    /// Tags flow like words, two spaces apart.
    fn tags(&mut self, tags: &[String], x: f32, y: f32, width: f32, zone: Zone) {
        let style = self.tokens.text_style(TextRole::Tag, zone);
        let advance = self.tokens.line_advance(style.size);
        let (mut dx, mut line) = (0.0f32, 0usize);
        for tag in tags {
            let w = self
                .fonts
                .text_width(&format!("{tag}  "), style.size, false, false, &self.tokens.body_font);
            if dx > 0.0 && dx + w > width {
                line += 1;
                dx = 0.0;
            }
            self.text(tag, x + dx, y + line as f32 * advance, &style, false, false);
            dx += w;
        }
    }

    fn blocks(&mut self, blocks: &[Block], x: f32, y: f32, width: f32, zone: Zone) {
        let style = self.tokens.text_style(TextRole::Body, zone);
        let advance = self.tokens.line_advance(style.size);
        let mut top = y;
        for block in blocks {
            let (text_x, text_width) = match block {
                Block::Paragraph { .. } => (x, width),
                Block::ListItem { marker, .. } => {
                    self.text(&marker.label(), x, top, &style, false, false);
                    (x + LIST_INDENT, (width - LIST_INDENT).max(1.0))
                }
            };
            let lines = wrap_runs(block.runs(), style.size, &self.tokens.body_font, text_width, self.fonts);
            for (i, segments) in lines.iter().enumerate() {
                let line_top = top + i as f32 * advance;
                for seg in segments {
                    let seg_x = text_x + seg.x;
                    self.text(&seg.text, seg_x, line_top, &style, seg.bold, seg.italic);
                    if seg.underline {
                        let uy = line_top + style.size * ASCENT + style.size * 0.1;
                        self.line(seg_x, uy, seg_x + seg.width, uy, 0.5, style.color);
                    }
                }
            }
            top += self.estimator.block_lines(block, width) as f32 * advance;
        }
    }

    fn photo(&mut self, src: &str, x: f32, y: f32, width: f32) {
        let Some(img) = self.image.filter(|img| img.reference == src) else {
            return;
        };
        let aspect = if img.px_height > 0 {
            img.px_width as f32 / img.px_height as f32
        } else {
            1.0
        };
        let height = IMAGE_HEIGHT;
        let draw_w = (height * aspect).min(width);
        // At dpi=72 printpdf renders 1 px = 1 pt, so scale = desired_pt / px.
        let scale_x = if img.px_width > 0 { draw_w / img.px_width as f32 } else { 1.0 };
        let scale_y = if img.px_height > 0 { height / img.px_height as f32 } else { 1.0 };
        self.ops.push(Op::UseXobject {
            id: img.xobj_id.clone(),
            transform: XObjectTransform {
                translate_x: Some(Pt(x)),
                translate_y: Some(Pt(self.page_height - y - height)),
                dpi: Some(72.0),
                scale_x: Some(scale_x),
                scale_y: Some(scale_y),
                rotate: None,
            },
        });
    }

    // -- primitives ---------------------------------------------------------

    /// Write one line of text whose line box starts at `top`.
    fn text(&mut self, text: &str, x: f32, top: f32, style: &TextStyle, bold: bool, italic: bool) {
        if text.trim().is_empty() {
            return;
        }
        let font = builtin_font(bold, italic);
        let baseline = self.page_height - top - style.size * ASCENT;
        self.ops.push(Op::StartTextSection);
        self.ops.push(Op::SetTextCursor {
            pos: Point {
                x: Pt(x),
                y: Pt(baseline),
            },
        });
        self.ops.push(Op::SetFontSizeBuiltinFont {
            size: Pt(style.size),
            font,
        });
        self.ops.push(Op::SetFillColor { col: pdf_color(style.color) });
        self.ops.push(Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(to_winlatin(text))],
            font,
        });
        self.ops.push(Op::EndTextSection);
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, thickness: f32, color: style::Color) {
        self.ops.push(Op::SetOutlineThickness { pt: Pt(thickness) });
        self.ops.push(Op::SetOutlineColor { col: pdf_color(color) });
        self.ops.push(Op::DrawLine {
            line: Line {
                points: vec![
                    self.point(x1, y1),
                    self.point(x2, y2),
                ],
                is_closed: false,
            },
        });
    }

    fn fill_rect(&mut self, x: f32, top: f32, width: f32, height: f32, color: style::Color) {
        self.ops.push(Op::SetFillColor { col: pdf_color(color) });
        self.ops.push(Op::DrawPolygon {
            polygon: Polygon {
                rings: vec![PolygonRing {
                    points: vec![
                        self.point(x, top + height),
                        self.point(x + width, top + height),
                        self.point(x + width, top),
                        self.point(x, top),
                    ],
                }],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            },
        });
    }

    fn point(&self, x: f32, top: f32) -> LinePoint {
        LinePoint {
            p: Point {
                x: Pt(x),
                y: Pt(self.page_height - top),
            },
            bezier: false,
        }
    }
}

fn builtin_font(bold: bool, italic: bool) -> BuiltinFont {
    match (bold, italic) {
        (true, true) => BuiltinFont::HelveticaBoldOblique,
        (true, false) => BuiltinFont::HelveticaBold,
        (false, true) => BuiltinFont::HelveticaOblique,
        (false, false) => BuiltinFont::Helvetica,
    }
}

fn pdf_color(c: style::Color) -> Color {
    Color::Rgb(Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
        icc_profile: None,
    })
}

/// Convert a UTF-8 string to raw Windows-1252 bytes then wrap in a String so
/// printpdf writes the bytes unchanged into the PDF stream (builtin fonts use
/// WinAnsiEncoding, so each glyph is one byte 0x00–0xFF).
fn to_winlatin(s: &str) -> String {
    let bytes: Vec<u8> = s
        .chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80, // euro
            '\u{201A}' => 0x82, // single low-9 quote
            '\u{201E}' => 0x84, // double low-9 quote
            '\u{2026}' => 0x85, // ellipsis
            '\u{2018}' => 0x91, // left single quote
            '\u{2019}' => 0x92, // right single quote
            '\u{201C}' => 0x93, // left double quote
            '\u{201D}' => 0x94, // right double quote
            '\u{2022}' => 0x95, // bullet
            '\u{2013}' => 0x96, // en-dash
            '\u{2014}' => 0x97, // em-dash
            '\u{2122}' => 0x99, // trademark
            '\u{00A0}' => 0x20, // non-breaking space -> space
            c if (c as u32) < 256 => c as u8,
            _ => b'?',
        })
        .collect();
    // SAFETY: intentionally non-UTF-8 for 0x80-0x9F range; printpdf passes
    // these bytes straight to the PDF stream, decoded by WinAnsiEncoding.
    #[allow(unsafe_code)]
    unsafe {
        String::from_utf8_unchecked(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::test_support::sample_document;
    use crate::images::ResolvedImage;
    use crate::layout_config::LayoutType;

    const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

    #[test]
    fn renders_pdf_magic() {
        let doc = sample_document(LayoutType::Sidebar);
        let bytes = render_pdf(&doc, &StyleTokens::default()).unwrap();
        assert!(bytes.len() > 100, "PDF should have content");
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn empty_document_still_has_a_page() {
        let mut doc = sample_document(LayoutType::SingleColumn);
        doc.pages.clear();
        let bytes = render_pdf(&doc, &StyleTokens::default()).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn embeds_resolved_photo() {
        use base64::Engine as _;
        let mut doc = sample_document(LayoutType::SingleColumn);
        let reference = format!("data:image/png;base64,{PNG_1X1}");
        let bytes = base64::engine::general_purpose::STANDARD.decode(PNG_1X1).unwrap();
        doc.image = Some(ResolvedImage::decode(&reference, bytes).unwrap());
        doc.pages[0]
            .zones
            .get_mut(&Zone::Main)
            .unwrap()[0]
            .items[0]
            .nodes
            .insert(0, ContentNode::Image { src: reference, alt: "Ada".into() });
        let bytes = render_pdf(&doc, &StyleTokens::default()).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn winlatin_maps_typographic_characters() {
        let s = to_winlatin("\u{2022} caf\u{e9} \u{2013} \u{4e2d}");
        assert_eq!(s.as_bytes(), &[0x95, b' ', b'c', b'a', b'f', 0xE9, b' ', 0x96, b' ', b'?']);
    }
}
