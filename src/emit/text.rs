//! Plain-text emitter.

use super::Document;
use crate::content::ContentNode;
use crate::richtext::Block;

pub fn render_text(doc: &Document) -> String {
    let mut lines: Vec<String> = Vec::new();
    let paged = doc.pages.len() > 1;
    for (i, page) in doc.pages.iter().enumerate() {
        if paged {
            if i > 0 {
                lines.push(String::new());
            }
            lines.push(format!("=== Page {} ===", i + 1));
            lines.push(String::new());
        }
        for (_, placed) in doc.page_zones(page) {
            for section in placed {
                if let Some(title) = &section.title {
                    let title = title.to_uppercase();
                    lines.push("-".repeat(title.chars().count()));
                    lines.push(title);
                    lines.push(String::new());
                }
                for item in &section.items {
                    for node in &item.nodes {
                        push_node(&mut lines, node);
                    }
                    lines.push(String::new());
                }
            }
        }
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn push_node(lines: &mut Vec<String>, node: &ContentNode) {
    match node {
        ContentNode::Headline { text } => {
            lines.push(text.to_uppercase());
            lines.push("=".repeat(text.chars().count()));
        }
        ContentNode::Paragraph { blocks } => {
            for block in blocks {
                let text = block.plain_text();
                match block {
                    Block::Paragraph { .. } => lines.extend(text.lines().map(str::to_string)),
                    Block::ListItem { marker, .. } => {
                        let mut it = text.lines();
                        lines.push(format!("  {} {}", marker.label(), it.next().unwrap_or("")));
                        lines.extend(it.map(|l| format!("    {l}")));
                    }
                }
            }
        }
        ContentNode::Image { .. } => {}
        other => lines.push(other.plain_text()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::test_support::sample_document;
    use crate::layout_config::LayoutType;

    #[test]
    fn titles_are_uppercased_and_pages_marked() {
        let text = render_text(&sample_document(LayoutType::SingleColumn));
        assert!(text.starts_with("=== Page 1 ===\n\nADA LOVELACE\n"));
        assert!(text.contains("EXPERIENCE\n"));
        assert!(text.contains("=== Page 2 ==="));
        assert!(text.contains("  \u{2022} Bernoulli"));
        assert!(text.contains("Mathematics (9/10), Poetry"));
        assert!(text.ends_with("Poetry\n"));
    }
}
