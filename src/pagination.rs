//! Pagination – distributes zone-assigned sections over pages.
//!
//! Handles:
//! - per-zone height accounting against the zone's usable column height
//! - splitting a section between items, with a continuation title
//! - orphan avoidance (a title never ends a page without its first item)
//! - `page_break` sections as document-wide barriers
//! - the page ceiling, past which items are counted and dropped

use std::collections::BTreeMap;

use crate::content::{ContentNode, RenderedSection, SectionItem};
use crate::fonts::{wrap_runs, FontManager};
use crate::layout::PageGeometry;
use crate::layout_config::Zone;
use crate::model::SectionType;
use crate::richtext::Block;
use crate::style::StyleTokens;

pub const DEFAULT_MAX_PAGES: usize = 20;
/// Space below a section title for its rule line.
pub const TITLE_RULE_GAP: f32 = 6.0;
pub const IMAGE_HEIGHT: f32 = 72.0;
/// Indent of list-item text after its marker.
pub const LIST_INDENT: f32 = 14.0;

// ---------------------------------------------------------------------------
// Height estimation
// ---------------------------------------------------------------------------

/// Format-agnostic height estimates. The PDF emitter draws with the same
/// metrics, so what fits here fits on the page.
pub struct HeightEstimator<'a> {
    tokens: &'a StyleTokens,
    fonts: &'a FontManager,
}

impl<'a> HeightEstimator<'a> {
    pub fn new(tokens: &'a StyleTokens, fonts: &'a FontManager) -> Self {
        Self { tokens, fonts }
    }

    pub fn title_height(&self) -> f32 {
        self.tokens.line_advance(self.tokens.title_size) + TITLE_RULE_GAP
    }

    fn text_lines(&self, text: &str, size: f32, bold: bool, width: f32) -> usize {
        self.fonts
            .wrap_text(text, size, bold, &self.tokens.body_font, width)
            .len()
            .max(1)
    }

    /// Wrapped lines of each block, list items narrowed by the marker indent.
    pub fn block_lines(&self, block: &Block, width: f32) -> usize {
        let width = match block {
            Block::Paragraph { .. } => width,
            Block::ListItem { .. } => (width - LIST_INDENT).max(1.0),
        };
        wrap_runs(block.runs(), self.tokens.body_size, &self.tokens.body_font, width, self.fonts)
            .len()
            .max(1)
    }

    /// Tag chips wrap like words, each two characters wider than its text.
    pub fn tag_lines(&self, tags: &[String], width: f32) -> usize {
        let size = self.tokens.body_size * 0.9;
        let mut lines = 1;
        let mut x = 0.0;
        for tag in tags {
            let w = self
                .fonts
                .text_width(&format!("{tag}  "), size, false, false, &self.tokens.body_font);
            if x > 0.0 && x + w > width {
                lines += 1;
                x = 0.0;
            }
            x += w;
        }
        lines
    }

    pub fn node_height(&self, node: &ContentNode, width: f32) -> f32 {
        let t = self.tokens;
        match node {
            ContentNode::Title { .. } => self.title_height(),
            ContentNode::Headline { text } => {
                self.text_lines(text, t.headline_size, true, width) as f32 * t.line_advance(t.headline_size)
            }
            ContentNode::Subtitle { text, emphasis } => {
                self.text_lines(text, t.subtitle_size, *emphasis, width) as f32
                    * t.line_advance(t.subtitle_size)
            }
            ContentNode::KeyValueLine { parts } => {
                self.text_lines(&parts.join(" | "), t.body_size, false, width) as f32
                    * t.line_advance(t.body_size)
            }
            ContentNode::Paragraph { blocks } => {
                let lines: usize = blocks.iter().map(|b| self.block_lines(b, width)).sum();
                lines as f32 * t.line_advance(t.body_size)
            }
            ContentNode::TagGroup { tags } => {
                self.tag_lines(tags, width) as f32 * t.line_advance(t.body_size * 0.9)
            }
            ContentNode::Image { .. } => IMAGE_HEIGHT,
        }
    }

    /// Item height including the gap that follows it.
    pub fn item_height(&self, item: &SectionItem, width: f32) -> f32 {
        item.nodes.iter().map(|n| self.node_height(n, width)).sum::<f32>() + self.tokens.item_gap
    }

    pub fn section_gap(&self) -> f32 {
        self.tokens.section_gap
    }
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// A section, or a run of its items, placed on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedSection {
    pub section_id: String,
    pub section_type: SectionType,
    pub display_order: i32,
    /// The section title on the first chunk, a continuation title afterwards.
    pub title: Option<String>,
    pub items: Vec<SectionItem>,
    /// Not the section's first chunk.
    pub continued: bool,
    /// Carries only some of the section's items.
    pub partial: bool,
}

impl PlacedSection {
    pub fn nodes(&self) -> Vec<ContentNode> {
        let title = self.title.iter().map(|text| ContentNode::Title { text: text.clone() });
        title
            .chain(self.items.iter().flat_map(|i| i.nodes.iter().cloned()))
            .collect()
    }
}

/// The items of a split section that landed on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialSection {
    pub items: Vec<SectionItem>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub index: usize,
    /// Only zones with content on this page have an entry.
    pub zones: BTreeMap<Zone, Vec<PlacedSection>>,
}

impl Page {
    fn new(index: usize) -> Self {
        Self {
            index,
            zones: BTreeMap::new(),
        }
    }

    /// Every placement on the page, zone by zone.
    pub fn placed(&self) -> impl Iterator<Item = &PlacedSection> {
        self.zones.values().flatten()
    }

    /// Sections that appear whole on this page.
    pub fn sections(&self) -> Vec<&PlacedSection> {
        self.placed().filter(|s| !s.partial).collect()
    }

    /// Chunks of split sections, keyed by section id.
    pub fn partial_sections(&self) -> BTreeMap<String, PartialSection> {
        self.placed()
            .filter(|s| s.partial)
            .map(|s| {
                (
                    s.section_id.clone(),
                    PartialSection {
                        items: s.items.clone(),
                        title: s.title.clone(),
                    },
                )
            })
            .collect()
    }

    pub fn item_count(&self) -> usize {
        self.placed().map(|s| s.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.values().all(|z| z.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncation {
    pub max_pages: usize,
    pub dropped_items: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pagination {
    pub pages: Vec<Page>,
    pub truncated: Option<Truncation>,
}

pub fn continuation_title(title: &str) -> String {
    format!("{title} (cont.)")
}

// ---------------------------------------------------------------------------
// Distribution
// ---------------------------------------------------------------------------

/// Distribute zone-assigned sections over pages.
///
/// Each zone paginates on its own, but `page_break` sections split the
/// document into segments: every segment starts on the page after the
/// furthest page any zone reached in the previous one. A segment with no
/// content adds no page, so consecutive breaks coalesce.
pub fn distribute(
    sections_by_zone: BTreeMap<Zone, Vec<RenderedSection>>,
    estimator: &HeightEstimator<'_>,
    geometry: &PageGeometry,
    max_pages: usize,
) -> Pagination {
    let max_pages = max_pages.max(1);

    let mut breaks: Vec<usize> = sections_by_zone
        .values()
        .flatten()
        .filter(|s| s.is_page_break())
        .map(|s| s.position)
        .collect();
    breaks.sort_unstable();
    breaks.dedup();

    // segment -> zone -> sections
    let mut segments: Vec<BTreeMap<Zone, Vec<RenderedSection>>> = vec![BTreeMap::new(); breaks.len() + 1];
    for (zone, sections) in sections_by_zone {
        for section in sections.into_iter().filter(|s| !s.is_page_break()) {
            let segment = breaks.iter().filter(|&&b| b < section.position).count();
            segments[segment].entry(zone).or_default().push(section);
        }
    }

    let mut layout = PageSink {
        pages: Vec::new(),
        max_pages,
        dropped: 0,
    };
    let mut start = 0;
    for segment in segments {
        let mut last: Option<usize> = None;
        for (zone, sections) in segment {
            let zone_last = layout.flow_zone(zone, sections, start, estimator, geometry);
            last = last.max(zone_last);
        }
        if let Some(last) = last {
            start = last + 1;
        }
    }

    let truncated = (layout.dropped > 0).then(|| {
        log::warn!(
            "Pagination stopped at {max_pages} pages; {} item(s) dropped",
            layout.dropped
        );
        Truncation {
            max_pages,
            dropped_items: layout.dropped,
        }
    });
    log::debug!("Distributed content over {} page(s)", layout.pages.len());
    Pagination {
        pages: layout.pages,
        truncated,
    }
}

struct PageSink {
    pages: Vec<Page>,
    max_pages: usize,
    dropped: usize,
}

impl PageSink {
    fn place(&mut self, page: usize, zone: Zone, placed: PlacedSection) {
        while self.pages.len() <= page {
            let index = self.pages.len();
            self.pages.push(Page::new(index));
        }
        self.pages[page].zones.entry(zone).or_default().push(placed);
    }

    /// Flow one zone's sections from page `start`. Returns the last page
    /// that received content, if any.
    fn flow_zone(
        &mut self,
        zone: Zone,
        sections: Vec<RenderedSection>,
        start: usize,
        estimator: &HeightEstimator<'_>,
        geometry: &PageGeometry,
    ) -> Option<usize> {
        let limit = geometry.zone_height(zone);
        let width = geometry.zone_width(zone);
        let mut page = start;
        let mut y = 0.0f32;
        let mut last = None;

        for section in sections {
            if page >= self.max_pages {
                self.dropped += section.items.len();
                continue;
            }
            if y > 0.0 {
                y += estimator.section_gap();
            }
            let title_height = if section.title.is_some() {
                estimator.title_height()
            } else {
                0.0
            };
            let heights: Vec<f32> = section
                .items
                .iter()
                .map(|item| estimator.item_height(item, width))
                .collect();
            let total = section.items.len();

            let mut items = section.items.into_iter();
            let mut next = 0;
            let mut first_chunk = true;
            loop {
                // Title plus at least the first item must fit, unless the page is fresh.
                let lead = title_height + heights.get(next).copied().unwrap_or(0.0);
                if y > 0.0 && y + lead > limit {
                    page += 1;
                    y = 0.0;
                }
                if page >= self.max_pages {
                    self.dropped += total - next;
                    break;
                }

                y += title_height;
                let mut take = 0;
                while next + take < total && (take == 0 || y + heights[next + take] <= limit) {
                    y += heights[next + take];
                    take += 1;
                }

                let chunk: Vec<SectionItem> = items.by_ref().take(take).collect();
                let done = next + take >= total;
                let title = match (&section.title, first_chunk) {
                    (Some(t), true) => Some(t.clone()),
                    (Some(t), false) => Some(continuation_title(t)),
                    (None, _) => None,
                };
                self.place(
                    page,
                    zone,
                    PlacedSection {
                        section_id: section.id.clone(),
                        section_type: section.section_type,
                        display_order: section.display_order,
                        title,
                        items: chunk,
                        continued: !first_chunk,
                        partial: !(first_chunk && done),
                    },
                );
                last = Some(page);

                if done {
                    break;
                }
                next += take;
                first_chunk = false;
                page += 1;
                y = 0.0;
            }
        }
        last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{compute_geometry, A4_HEIGHT, A4_WIDTH};
    use crate::layout_config::LayoutConfig;

    fn item(text: &str) -> SectionItem {
        SectionItem::new(vec![ContentNode::subtitle(text)])
    }

    fn section(id: &str, section_type: SectionType, order: i32, items: usize) -> RenderedSection {
        RenderedSection {
            id: id.to_string(),
            section_type,
            display_order: order,
            position: order.max(0) as usize,
            placement: None,
            title: (section_type != SectionType::PageBreak).then(|| id.to_string()),
            items: (0..items).map(|i| item(&format!("{id}-{i}"))).collect(),
        }
    }

    fn run(zones: BTreeMap<Zone, Vec<RenderedSection>>, max_pages: usize) -> Pagination {
        let tokens = StyleTokens::default();
        let fonts = FontManager::new();
        let estimator = HeightEstimator::new(&tokens, &fonts);
        let geometry = compute_geometry(&LayoutConfig::default(), A4_WIDTH, A4_HEIGHT);
        distribute(zones, &estimator, &geometry, max_pages)
    }

    fn main_only(sections: Vec<RenderedSection>) -> BTreeMap<Zone, Vec<RenderedSection>> {
        BTreeMap::from([(Zone::Main, sections)])
    }

    fn count_items(p: &Pagination) -> usize {
        p.pages
            .iter()
            .map(|page| {
                page.sections().iter().map(|s| s.items.len()).sum::<usize>()
                    + page.partial_sections().values().map(|s| s.items.len()).sum::<usize>()
            })
            .sum()
    }

    #[test]
    fn single_page() {
        let p = run(main_only(vec![section("exp", SectionType::Experience, 1, 3)]), 20);
        assert_eq!(p.pages.len(), 1);
        assert_eq!(p.pages[0].sections().len(), 1);
        assert!(p.truncated.is_none());
    }

    #[test]
    fn long_section_splits_with_continuation_title() {
        let p = run(main_only(vec![section("exp", SectionType::Experience, 1, 120)]), 20);
        assert!(p.pages.len() > 1);
        let first = p.pages[0].partial_sections();
        let second = p.pages[1].partial_sections();
        assert_eq!(first["exp"].title.as_deref(), Some("exp"));
        assert_eq!(second["exp"].title.as_deref(), Some("exp (cont.)"));
        assert_eq!(count_items(&p), 120);
    }

    #[test]
    fn page_break_forces_new_page() {
        let p = run(
            main_only(vec![
                section("exp", SectionType::Experience, 1, 1),
                section("pb", SectionType::PageBreak, 2, 0),
                section("edu", SectionType::Education, 3, 1),
            ]),
            20,
        );
        assert_eq!(p.pages.len(), 2);
        assert_eq!(p.pages[0].sections()[0].section_id, "exp");
        assert_eq!(p.pages[1].sections()[0].section_id, "edu");
    }

    #[test]
    fn redundant_breaks_coalesce() {
        let p = run(
            main_only(vec![
                section("pb0", SectionType::PageBreak, 0, 0),
                section("exp", SectionType::Experience, 1, 1),
                section("pb1", SectionType::PageBreak, 2, 0),
                section("pb2", SectionType::PageBreak, 3, 0),
                section("edu", SectionType::Education, 4, 1),
            ]),
            20,
        );
        assert_eq!(p.pages.len(), 2);
    }

    #[test]
    fn break_is_a_barrier_across_zones() {
        let zones = BTreeMap::from([
            (
                Zone::Main,
                vec![
                    section("exp", SectionType::Experience, 1, 1),
                    section("pb", SectionType::PageBreak, 2, 0),
                ],
            ),
            (Zone::Secondary, vec![section("skills", SectionType::TechnicalSkills, 3, 1)]),
        ]);
        let p = run(zones, 20);
        assert_eq!(p.pages.len(), 2);
        assert!(p.pages[0].zones.get(&Zone::Secondary).is_none());
        assert_eq!(p.pages[1].zones[&Zone::Secondary].len(), 1);
    }

    #[test]
    fn overflow_is_truncated_and_counted() {
        let p = run(main_only(vec![section("exp", SectionType::Experience, 1, 500)]), 2);
        assert_eq!(p.pages.len(), 2);
        let t = p.truncated.unwrap();
        assert_eq!(t.max_pages, 2);
        assert_eq!(count_items(&p) + t.dropped_items, 500);
    }
}
