//! HTML emitter – a self-contained page with inline CSS built from the style
//! tokens. Zones are flex columns; pages are separated by a rule that also
//! forces a print page break.

use std::fmt::Write as _;

use super::ooxml::escape_xml as escape;
use super::Document;
use crate::content::ContentNode;
use crate::layout_config::Zone;
use crate::pagination::PlacedSection;
use crate::richtext::{Block, ListKind, Run};
use crate::style::{StyleTokens, TextRole};

pub fn render_html(doc: &Document, tokens: &StyleTokens) -> String {
    let mut body = String::new();
    for (i, page) in doc.pages.iter().enumerate() {
        if i > 0 {
            body.push_str("<hr class=\"page-separator\">\n");
        }
        let _ = writeln!(body, "<section class=\"page\" data-page=\"{}\">", i + 1);
        body.push_str("<div class=\"columns\">\n");
        for (zone, placed) in doc.page_zones(page) {
            let basis = doc
                .geometry
                .column(zone)
                .map(|c| c.width / doc.geometry.content_width * 100.0)
                .unwrap_or(100.0);
            let _ = writeln!(
                body,
                "<div class=\"zone zone-{}\" style=\"flex: 0 0 {basis:.2}%\">",
                zone.as_str()
            );
            body.push_str(&zone_html(doc, placed));
            body.push_str("</div>\n");
        }
        body.push_str("</div>\n</section>\n");
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>\n{css}</style>\n</head>\n<body>\n<main class=\"document layout-{layout}\">\n{body}</main>\n</body>\n</html>\n",
        title = escape(&doc.title),
        css = stylesheet(doc, tokens),
        layout = doc.layout_type.as_str(),
    )
}

fn stylesheet(doc: &Document, tokens: &StyleTokens) -> String {
    let g = &doc.geometry;
    let mut css = String::new();
    let _ = writeln!(
        css,
        "body {{ margin: 0; background: #ffffff; color: {}; font-family: '{}', Helvetica, Arial, sans-serif; font-size: {}pt; line-height: {}; }}",
        tokens.text.css(),
        tokens.body_font,
        tokens.body_size,
        tokens.line_height
    );
    let _ = writeln!(
        css,
        ".document {{ max-width: {}pt; margin: 0 auto; padding: {}pt; }}",
        g.content_width, g.margin
    );
    let gap = (g.content_width - g.columns.iter().map(|c| c.width).sum::<f32>()).max(0.0);
    let _ = writeln!(css, ".columns {{ display: flex; gap: {gap:.1}pt; align-items: stretch; }}");
    css.push_str(".zone { box-sizing: border-box; min-width: 0; }\n");
    for zone in doc.zone_order() {
        let treatment = tokens.zone(zone);
        let mut rule = format!("padding: {}pt;", treatment.padding);
        if let Some(bg) = treatment.background {
            let _ = write!(rule, " background: {};", bg.css());
        }
        if let Some(color) = treatment.text_color {
            let _ = write!(rule, " color: {};", color.css());
        }
        let _ = writeln!(css, ".zone-{} {{ {rule} }}", zone.as_str());
    }

    for (selector, role) in [
        (".headline", TextRole::Headline),
        (".section-title", TextRole::Title),
        (".subtitle", TextRole::Subtitle),
        (".tag", TextRole::Tag),
    ] {
        let style = tokens.text_style(role, Zone::Main);
        let _ = writeln!(
            css,
            "{selector} {{ font-size: {}pt; font-weight: {}; margin: 0; }}",
            style.size,
            if style.bold { "bold" } else { "normal" }
        );
    }
    let _ = writeln!(
        css,
        ".zone-main .headline, .zone-main .section-title, .zone-secondary .headline, .zone-secondary .section-title {{ color: {}; }}",
        tokens.primary.css()
    );
    let _ = writeln!(
        css,
        ".section-title {{ border-bottom: 1px solid currentColor; margin-bottom: 6pt; }}\n.section + .section {{ margin-top: {}pt; }}\n.item {{ margin-bottom: {}pt; }}",
        tokens.section_gap, tokens.item_gap
    );
    css.push_str(".subtitle { font-weight: normal; }\n.subtitle.emphasis { font-weight: bold; }\n");
    let _ = writeln!(
        css,
        ".tags {{ list-style: none; padding: 0; margin: 0; display: flex; flex-wrap: wrap; gap: 4pt; }}\n.zone-main .tag, .zone-secondary .tag {{ color: {}; }}",
        tokens.accent.css()
    );
    css.push_str(".profile-photo { width: 72pt; height: 72pt; object-fit: cover; border-radius: 50%; }\n");
    css.push_str(".page-separator { border: 0; border-top: 1px dashed #c0c4c8; margin: 24pt 0; page-break-after: always; break-after: page; }\n");
    css
}

fn zone_html(doc: &Document, placed: &[PlacedSection]) -> String {
    let mut out = String::new();
    for section in placed {
        let _ = writeln!(
            out,
            "<div class=\"section section-{}\" data-section=\"{}\">",
            section.section_type,
            escape(&section.section_id)
        );
        if let Some(title) = &section.title {
            let _ = writeln!(out, "<h2 class=\"section-title\">{}</h2>", escape(title));
        }
        for item in &section.items {
            out.push_str("<div class=\"item\">\n");
            for node in &item.nodes {
                out.push_str(&node_html(doc, node));
            }
            out.push_str("</div>\n");
        }
        out.push_str("</div>\n");
    }
    out
}

fn node_html(doc: &Document, node: &ContentNode) -> String {
    match node {
        ContentNode::Title { text } => format!("<h2 class=\"section-title\">{}</h2>\n", escape(text)),
        ContentNode::Headline { text } => format!("<h1 class=\"headline\">{}</h1>\n", escape(text)),
        ContentNode::Subtitle { text, emphasis } => format!(
            "<p class=\"subtitle{}\">{}</p>\n",
            if *emphasis { " emphasis" } else { "" },
            escape(text)
        ),
        ContentNode::KeyValueLine { parts } => {
            let joined: Vec<String> = parts.iter().map(|p| escape(p)).collect();
            format!(
                "<p class=\"contact\">{}</p>\n",
                joined.join(" <span class=\"sep\">|</span> ")
            )
        }
        ContentNode::TagGroup { tags } => {
            let items: String = tags
                .iter()
                .map(|t| format!("<li class=\"tag\">{}</li>", escape(t)))
                .collect();
            format!("<ul class=\"tags\">{items}</ul>\n")
        }
        ContentNode::Paragraph { blocks } => blocks_html(blocks),
        ContentNode::Image { src, alt } => match doc.image_for(src) {
            Some(image) => format!(
                "<img class=\"profile-photo\" src=\"{}\" alt=\"{}\">\n",
                image.data_uri(),
                escape(alt)
            ),
            None => String::new(),
        },
    }
}

/// Paragraphs stay `<p>`; consecutive list items of one kind share a list.
fn blocks_html(blocks: &[Block]) -> String {
    let mut out = String::new();
    let mut open: Option<ListKind> = None;
    for block in blocks {
        let kind = match block {
            Block::ListItem { kind, .. } => Some(*kind),
            Block::Paragraph { .. } => None,
        };
        if open != kind {
            if let Some(k) = open {
                out.push_str(list_tag(k, true));
            }
            if let Some(k) = kind {
                out.push_str(list_tag(k, false));
            }
            open = kind;
        }
        let runs = runs_html(block.runs());
        match block {
            Block::Paragraph { .. } => {
                let _ = writeln!(out, "<p>{runs}</p>");
            }
            Block::ListItem { .. } => {
                let _ = writeln!(out, "<li>{runs}</li>");
            }
        }
    }
    if let Some(k) = open {
        out.push_str(list_tag(k, true));
    }
    out
}

fn list_tag(kind: ListKind, close: bool) -> &'static str {
    match (kind, close) {
        (ListKind::Ordered, false) => "<ol>\n",
        (ListKind::Ordered, true) => "</ol>\n",
        (ListKind::Unordered, false) => "<ul>\n",
        (ListKind::Unordered, true) => "</ul>\n",
    }
}

fn runs_html(runs: &[Run]) -> String {
    let mut out = String::new();
    for run in runs {
        if run.is_line_break() {
            out.push_str("<br>");
            continue;
        }
        let mut text = escape(&run.text);
        if run.underline {
            text = format!("<u>{text}</u>");
        }
        if run.italic {
            text = format!("<em>{text}</em>");
        }
        if run.bold {
            text = format!("<strong>{text}</strong>");
        }
        out.push_str(&text);
    }
    out
}
