//! Rich-text parser – converts the small, safe HTML subset used in free-text
//! profile fields into backend-neutral [`Block`]s of styled [`Run`]s.
//!
//! Supported markup:
//! - Blocks: `p`, `ul`, `ol`, `li`
//! - Inline: `strong`/`b`, `em`/`i`, `u`, `br`
//!
//! Unknown tags are stripped (their text is kept), entities are decoded and
//! whitespace is collapsed. Every backend consumes the same block sequence.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// An explicit line break inside a block (from `<br>`).
    pub fn line_break() -> Self {
        Self::plain("\n")
    }

    pub fn is_line_break(&self) -> bool {
        self.text == "\n"
    }

    fn same_format(&self, fmt: Format) -> bool {
        self.bold == fmt.bold && self.italic == fmt.italic && self.underline == fmt.underline
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Ordered,
    Unordered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListMarker {
    /// 1-based position within an ordered list.
    Ordinal(usize),
    Bullet,
}

impl ListMarker {
    pub fn label(&self) -> String {
        match self {
            ListMarker::Ordinal(n) => format!("{n}."),
            ListMarker::Bullet => "\u{2022}".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum Block {
    Paragraph {
        runs: Vec<Run>,
    },
    ListItem {
        runs: Vec<Run>,
        marker: ListMarker,
        kind: ListKind,
    },
}

impl Block {
    pub fn runs(&self) -> &[Run] {
        match self {
            Block::Paragraph { runs } | Block::ListItem { runs, .. } => runs,
        }
    }

    /// Concatenated run text; line breaks stay as `\n`.
    pub fn plain_text(&self) -> String {
        self.runs().iter().map(|r| r.text.as_str()).collect()
    }
}

/// Join every block's text, one block per line, list items prefixed with
/// their marker.
pub fn plain_text(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(|b| match b {
            Block::Paragraph { .. } => b.plain_text(),
            Block::ListItem { marker, .. } => format!("{} {}", marker.label(), b.plain_text()),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse a rich-text field into blocks. Empty or whitespace-only input yields
/// an empty vector.
pub fn parse(html: &str) -> Vec<Block> {
    let mut builder = BlockBuilder::default();
    for token in Scanner::new(html).tokens() {
        builder.feed(token);
    }
    builder.finish()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open(String),
    Close(String),
    Text(String),
}

struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn tokens(mut self) -> Vec<Token> {
        let mut out = Vec::new();
        while !self.eof() {
            if self.starts_with("<!--") {
                self.skip_past("-->");
            } else if self.starts_with("<") && self.tag_follows() {
                if let Some(tok) = self.parse_tag() {
                    out.push(tok);
                }
            } else {
                out.push(self.parse_text());
            }
        }
        out
    }

    /// A `<` only opens a tag when followed by a letter or `/letter`;
    /// otherwise it is literal text ("a < b").
    fn tag_follows(&self) -> bool {
        let rest = &self.input[self.pos + 1..];
        let rest = rest.strip_prefix('/').unwrap_or(rest);
        rest.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
    }

    fn parse_tag(&mut self) -> Option<Token> {
        self.advance(1); // '<'
        let closing = self.starts_with("/");
        if closing {
            self.advance(1);
        }
        let start = self.pos;
        while !self.eof() && self.current_char().is_ascii_alphanumeric() {
            self.advance(1);
        }
        let name = self.input[start..self.pos].to_ascii_lowercase();
        // Attributes are irrelevant to the subset; skip to the end of the tag,
        // respecting quoted values that may contain '>'.
        let mut quote: Option<char> = None;
        while !self.eof() {
            let c = self.current_char();
            match quote {
                Some(q) if c == q => quote = None,
                Some(_) => {}
                None if c == '"' || c == '\'' => quote = Some(c),
                None if c == '>' => break,
                None => {}
            }
            self.advance(1);
        }
        if !self.eof() {
            self.advance(1); // '>'
        }
        if name.is_empty() {
            return None;
        }
        Some(if closing {
            Token::Close(name)
        } else {
            Token::Open(name)
        })
    }

    fn parse_text(&mut self) -> Token {
        let start = self.pos;
        self.advance(1);
        while !self.eof() && !(self.starts_with("<") && (self.tag_follows() || self.starts_with("<!--"))) {
            self.advance(1);
        }
        Token::Text(decode_entities(&self.input[start..self.pos]))
    }

    fn skip_past(&mut self, end: &str) {
        match self.input[self.pos..].find(end) {
            Some(idx) => self.pos += idx + end.len(),
            None => self.pos = self.input.len(),
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current_char(&self) -> char {
        self.input[self.pos..].chars().next().unwrap_or('\0')
    }

    fn advance(&mut self, n: usize) {
        for _ in 0..n {
            if let Some(c) = self.input[self.pos..].chars().next() {
                self.pos += c.len_utf8();
            }
        }
    }
}

/// Single-pass entity decoding, so `&amp;lt;` yields `&lt;` rather than `<`.
fn decode_entities(s: &str) -> String {
    const ENTITIES: [(&str, &str); 7] = [
        ("&nbsp;", " "),
        ("&amp;", "&"),
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&quot;", "\""),
        ("&#39;", "'"),
        ("&apos;", "'"),
    ];
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];
        match ENTITIES.iter().find(|(ent, _)| rest.starts_with(ent)) {
            Some((ent, rep)) => {
                out.push_str(rep);
                rest = &rest[ent.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

// ---------------------------------------------------------------------------
// Block assembly
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Bold,
    Italic,
    Underline,
}

impl Style {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "strong" | "b" => Some(Style::Bold),
            "em" | "i" => Some(Style::Italic),
            "u" => Some(Style::Underline),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Format {
    bold: bool,
    italic: bool,
    underline: bool,
}

struct OpenList {
    kind: ListKind,
    next_ordinal: usize,
}

#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<Block>,
    runs: Vec<Run>,
    /// Open formatting tags, innermost last. Closing a tag removes its most
    /// recent occurrence, so overlapping markup (`<b><i></b></i>`) composes.
    styles: Vec<Style>,
    lists: Vec<OpenList>,
    /// Marker of the `<li>` currently collecting runs.
    item: Option<(ListMarker, ListKind)>,
}

impl BlockBuilder {
    fn feed(&mut self, token: Token) {
        match token {
            Token::Text(text) => self.push_text(&text),
            Token::Open(tag) => match tag.as_str() {
                "p" => self.flush(),
                "br" => self.runs.push(Run::line_break()),
                "ul" | "ol" => {
                    self.flush();
                    let kind = if tag == "ol" {
                        ListKind::Ordered
                    } else {
                        ListKind::Unordered
                    };
                    self.lists.push(OpenList {
                        kind,
                        next_ordinal: 1,
                    });
                }
                "li" => {
                    self.flush();
                    let (kind, marker) = match self.lists.last_mut() {
                        Some(list) if list.kind == ListKind::Ordered => {
                            let n = list.next_ordinal;
                            list.next_ordinal += 1;
                            (ListKind::Ordered, ListMarker::Ordinal(n))
                        }
                        _ => (ListKind::Unordered, ListMarker::Bullet),
                    };
                    self.item = Some((marker, kind));
                }
                other => {
                    if let Some(style) = Style::from_tag(other) {
                        self.styles.push(style);
                    }
                }
            },
            Token::Close(tag) => match tag.as_str() {
                "p" => self.flush(),
                "li" => {
                    self.flush();
                    self.item = None;
                }
                "ul" | "ol" => {
                    self.flush();
                    self.item = None;
                    self.lists.pop();
                }
                other => {
                    if let Some(style) = Style::from_tag(other) {
                        if let Some(idx) = self.styles.iter().rposition(|s| *s == style) {
                            self.styles.remove(idx);
                        }
                    }
                }
            },
        }
    }

    fn format(&self) -> Format {
        let mut f = Format::default();
        for s in &self.styles {
            match s {
                Style::Bold => f.bold = true,
                Style::Italic => f.italic = true,
                Style::Underline => f.underline = true,
            }
        }
        f
    }

    fn push_text(&mut self, raw: &str) {
        let mut text = collapse_whitespace(raw);
        let prev_ends_with_space = self
            .runs
            .last()
            .map(|r| r.is_line_break() || r.text.ends_with(' '))
            .unwrap_or(true);
        if prev_ends_with_space {
            text = text.trim_start().to_string();
        }
        if text.is_empty() {
            return;
        }
        let fmt = self.format();
        if let Some(last) = self.runs.last_mut() {
            if !last.is_line_break() && last.same_format(fmt) {
                last.text.push_str(&text);
                return;
            }
        }
        self.runs.push(Run {
            text,
            bold: fmt.bold,
            italic: fmt.italic,
            underline: fmt.underline,
        });
    }

    /// Close the block being collected, if it has any visible text. An open
    /// `<li>` keeps its marker until some text claims it, so `<li><p>` still
    /// yields a list item.
    fn flush(&mut self) {
        let runs = trim_runs(std::mem::take(&mut self.runs));
        if runs.is_empty() {
            return;
        }
        self.blocks.push(match self.item.take() {
            Some((marker, kind)) => Block::ListItem { runs, marker, kind },
            None => Block::Paragraph { runs },
        });
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush();
        self.blocks
    }
}

fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_space = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Trim whitespace at the block edges and around line breaks, dropping runs
/// that end up empty and any leading/trailing line breaks.
fn trim_runs(mut runs: Vec<Run>) -> Vec<Run> {
    for i in 0..runs.len() {
        if runs[i].is_line_break() {
            continue;
        }
        let at_start = i == 0 || runs[i - 1].is_line_break();
        let at_end = i + 1 == runs.len() || runs[i + 1].is_line_break();
        if at_start {
            runs[i].text = runs[i].text.trim_start().to_string();
        }
        if at_end {
            runs[i].text = runs[i].text.trim_end().to_string();
        }
    }
    runs.retain(|r| !r.text.is_empty());
    while runs.first().is_some_and(Run::is_line_break) {
        runs.remove(0);
    }
    while runs.last().is_some_and(Run::is_line_break) {
        runs.pop();
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraph_with_bold_run() {
        let blocks = parse("<p>Hello <strong>World</strong></p>");
        assert_eq!(blocks.len(), 1);
        let runs = blocks[0].runs();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "Hello ");
        assert!(!runs[0].bold);
        assert_eq!(runs[1].text, "World");
        assert!(runs[1].bold);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(parse("").is_empty());
        assert!(parse("   <p> </p>  ").is_empty());
    }

    #[test]
    fn lists_are_numbered_and_tagged() {
        let blocks = parse("<p>Intro</p><ol><li>One</li><li>Two</li></ol><ul><li>Dot</li></ul>");
        assert_eq!(blocks.len(), 4);
        assert!(matches!(blocks[0], Block::Paragraph { .. }));
        assert!(matches!(
            blocks[1],
            Block::ListItem {
                marker: ListMarker::Ordinal(1),
                kind: ListKind::Ordered,
                ..
            }
        ));
        assert!(matches!(
            blocks[2],
            Block::ListItem {
                marker: ListMarker::Ordinal(2),
                ..
            }
        ));
        assert!(matches!(
            blocks[3],
            Block::ListItem {
                marker: ListMarker::Bullet,
                kind: ListKind::Unordered,
                ..
            }
        ));
    }

    #[test]
    fn paragraphs_inside_list_items_stay_list_items() {
        let blocks = parse("<ol><li><p>One</p></li><li><p>Two</p></li></ol><p>After</p>");
        assert_eq!(blocks.len(), 3);
        assert!(matches!(
            blocks[0],
            Block::ListItem {
                marker: ListMarker::Ordinal(1),
                kind: ListKind::Ordered,
                ..
            }
        ));
        assert!(matches!(
            blocks[1],
            Block::ListItem {
                marker: ListMarker::Ordinal(2),
                ..
            }
        ));
        assert_eq!(blocks[1].plain_text(), "Two");
        assert!(matches!(blocks[2], Block::Paragraph { .. }));
    }

    #[test]
    fn empty_list_item_does_not_leak_its_marker() {
        let blocks = parse("<ul><li></li></ul><p>Plain</p>");
        assert_eq!(blocks.len(), 1);
        assert!(matches!(blocks[0], Block::Paragraph { .. }));
    }

    #[test]
    fn br_becomes_line_break_run() {
        let blocks = parse("<p>Line one<br>Line two<br/></p>");
        assert_eq!(blocks.len(), 1);
        let runs = blocks[0].runs();
        assert_eq!(runs.len(), 3);
        assert!(runs[1].is_line_break());
        assert_eq!(runs[2].text, "Line two");
    }

    #[test]
    fn nested_and_overlapping_formatting() {
        let blocks = parse("<p><b>bold <i>both</b> italic</i></p>");
        let runs = blocks[0].runs();
        assert_eq!(runs.len(), 3);
        assert!(runs[0].bold && !runs[0].italic);
        assert!(runs[1].bold && runs[1].italic);
        assert!(!runs[2].bold && runs[2].italic);
        assert_eq!(runs[2].text, " italic");
    }

    #[test]
    fn entities_and_unknown_tags() {
        let blocks = parse("<div><span class=\"x\">Tom &amp; Jerry &lt;3&nbsp;&quot;hi&quot; &#39;yo&#39;</span></div>");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].plain_text(), "Tom & Jerry <3 \"hi\" 'yo'");
    }

    #[test]
    fn entity_decoding_is_single_pass() {
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn whitespace_is_collapsed_across_runs() {
        let blocks = parse("  Plain   text \n <u> underlined </u>  end ");
        assert_eq!(blocks[0].plain_text(), "Plain text underlined end");
        assert!(blocks[0].runs()[1].underline);
    }

    #[test]
    fn literal_angle_bracket_is_text() {
        let blocks = parse("a < b and c > d");
        assert_eq!(blocks[0].plain_text(), "a < b and c > d");
    }

    #[test]
    fn plain_text_prefixes_markers() {
        let blocks = parse("<ul><li>A</li></ul><ol><li>B</li></ol>");
        assert_eq!(plain_text(&blocks), "\u{2022} A\n1. B");
    }
}
