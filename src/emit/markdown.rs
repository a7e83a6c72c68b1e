//! Markdown emitter. Zones are written one after another in column order;
//! pages are separated by a thematic break.

use super::Document;
use crate::content::ContentNode;
use crate::richtext::{Block, Run};

pub fn render_markdown(doc: &Document) -> String {
    let mut out = String::new();
    for (i, page) in doc.pages.iter().enumerate() {
        if i > 0 {
            out.push_str("---\n\n");
        }
        for (_, placed) in doc.page_zones(page) {
            for section in placed {
                if let Some(title) = &section.title {
                    out.push_str(&format!("## {}\n\n", escape_md(title)));
                }
                for item in &section.items {
                    for node in &item.nodes {
                        out.push_str(&node_md(node));
                    }
                }
            }
        }
    }
    out
}

fn node_md(node: &ContentNode) -> String {
    match node {
        ContentNode::Headline { text } => format!("# {}\n\n", escape_md(text)),
        ContentNode::Title { text } => format!("## {}\n\n", escape_md(text)),
        ContentNode::Subtitle { text, emphasis: true } => format!("**{}**\n\n", escape_md(text)),
        ContentNode::Subtitle { text, .. } => format!("{}\n\n", escape_md(text)),
        ContentNode::KeyValueLine { parts } => {
            let parts: Vec<String> = parts.iter().map(|p| escape_md(p)).collect();
            format!("{}\n\n", parts.join(" | "))
        }
        ContentNode::TagGroup { tags } => {
            let tags: Vec<String> = tags.iter().map(|t| escape_md(t)).collect();
            format!("{}\n\n", tags.join(", "))
        }
        ContentNode::Paragraph { blocks } => blocks_md(blocks),
        ContentNode::Image { src, alt } => format!("![{}]({src})\n\n", escape_md(alt)),
    }
}

fn blocks_md(blocks: &[Block]) -> String {
    let mut out = String::new();
    let mut in_list = false;
    for block in blocks {
        match block {
            Block::Paragraph { runs } => {
                if in_list {
                    out.push('\n');
                    in_list = false;
                }
                out.push_str(&runs_md(runs));
                out.push_str("\n\n");
            }
            Block::ListItem { runs, marker, .. } => {
                let bullet = match marker {
                    crate::richtext::ListMarker::Ordinal(n) => format!("{n}."),
                    crate::richtext::ListMarker::Bullet => "-".to_string(),
                };
                out.push_str(&format!("{bullet} {}\n", runs_md(runs)));
                in_list = true;
            }
        }
    }
    if in_list {
        out.push('\n');
    }
    out
}

fn runs_md(runs: &[Run]) -> String {
    let mut out = String::new();
    for run in runs {
        if run.is_line_break() {
            out.push_str("  \n");
            continue;
        }
        // Markers hug the text; surrounding spaces stay outside.
        let trimmed = run.text.trim();
        if trimmed.is_empty() {
            out.push_str(&run.text);
            continue;
        }
        let lead = &run.text[..run.text.len() - run.text.trim_start().len()];
        let tail = &run.text[run.text.trim_end().len()..];
        let mut text = escape_md(trimmed);
        if run.underline {
            text = format!("<u>{text}</u>");
        }
        if run.italic {
            text = format!("*{text}*");
        }
        if run.bold {
            text = format!("**{text}**");
        }
        out.push_str(lead);
        out.push_str(&text);
        out.push_str(tail);
    }
    out
}

/// Backslash-escape characters that would otherwise start markup.
fn escape_md(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '_' | '`' | '[' | ']' | '#' | '<' | '>') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::test_support::sample_document;
    use crate::layout_config::LayoutType;
    use crate::richtext;

    #[test]
    fn headline_titles_and_page_breaks() {
        let md = render_markdown(&sample_document(LayoutType::SingleColumn));
        assert!(md.starts_with("# Ada Lovelace\n\n"));
        assert!(md.contains("## Experience\n\n"));
        assert!(md.contains("**Analyst & Writer**"));
        assert!(md.contains("Notes on the **Engine**"));
        assert!(md.contains("- Bernoulli\n"));
        assert_eq!(md.matches("---\n").count(), 1);
    }

    #[test]
    fn inline_formatting_keeps_spaces_outside_markers() {
        let blocks = richtext::parse("<p>a <em>b </em>c</p>");
        assert_eq!(blocks_md(&blocks), "a *b* c\n\n");
    }

    #[test]
    fn markup_characters_are_escaped() {
        assert_eq!(escape_md("C# *and* [x]"), "C\\# \\*and\\* \\[x\\]");
    }
}
