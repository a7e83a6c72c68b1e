//! Page geometry – uses Taffy to solve the column row of a layout type into
//! concrete zone boxes on the page.

use taffy::prelude::*;

use crate::layout_config::{ColumnBasis, LayoutConfig, PageOrientation, Zone, ZoneTreatment};

/// A4 portrait, in points.
pub const A4_WIDTH: f32 = 595.28;
pub const A4_HEIGHT: f32 = 841.89;

/// One zone column in page coordinates (origin top-left, points).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnBox {
    pub zone: Zone,
    pub x: f32,
    pub width: f32,
    /// Inner padding applied on every side of the column's content.
    pub padding: f32,
}

impl ColumnBox {
    pub fn content_x(&self) -> f32 {
        self.x + self.padding
    }

    pub fn content_width(&self) -> f32 {
        (self.width - 2.0 * self.padding).max(1.0)
    }
}

/// Resolved page and column geometry for one compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub content_width: f32,
    pub content_height: f32,
    pub columns: Vec<ColumnBox>,
}

impl PageGeometry {
    pub fn column(&self, zone: Zone) -> Option<&ColumnBox> {
        self.columns.iter().find(|c| c.zone == zone)
    }

    /// Usable vertical space inside `zone`'s column.
    pub fn zone_height(&self, zone: Zone) -> f32 {
        let padding = self.column(zone).map(|c| c.padding).unwrap_or(0.0);
        (self.content_height - 2.0 * padding).max(1.0)
    }

    /// Usable text width inside `zone`'s column.
    pub fn zone_width(&self, zone: Zone) -> f32 {
        self.column(zone)
            .map(|c| c.content_width())
            .unwrap_or(self.content_width)
    }
}

/// Solve the column row for `config` on a `page_width` × `page_height` sheet
/// (given portrait; landscape swaps the two).
pub fn compute_geometry(config: &LayoutConfig, page_width: f32, page_height: f32) -> PageGeometry {
    let (page_width, page_height) = match config.orientation {
        PageOrientation::Portrait => (page_width, page_height),
        PageOrientation::Landscape => (page_height, page_width),
    };
    let margin = config.margin.clamp(0.0, page_width.min(page_height) / 4.0);
    let content_width = page_width - 2.0 * margin;
    let content_height = page_height - 2.0 * margin;
    let gap = config.spacing.column_gap.max(0.0);
    let specs = config.layout_type.columns();

    let spans = match solve_columns(specs.iter().map(|c| c.basis), content_width, content_height, gap) {
        Ok(spans) => spans,
        Err(e) => {
            log::warn!("Column layout failed ({e}); splitting columns evenly");
            even_split(specs.len(), content_width, gap)
        }
    };

    let columns = specs
        .iter()
        .zip(spans)
        .map(|(spec, (x, width))| ColumnBox {
            zone: spec.zone,
            x: margin + x,
            width,
            padding: ZoneTreatment::for_zone(spec.zone, &config.colors).padding,
        })
        .collect();

    PageGeometry {
        page_width,
        page_height,
        margin,
        content_width,
        content_height,
        columns,
    }
}

/// Run a flex row through Taffy and return `(x, width)` per column,
/// relative to the content box.
fn solve_columns(
    bases: impl Iterator<Item = ColumnBasis>,
    content_width: f32,
    content_height: f32,
    gap: f32,
) -> Result<Vec<(f32, f32)>, taffy::TaffyError> {
    let mut taffy: TaffyTree<()> = TaffyTree::new();
    // Columns are measured in points; whole-point rounding loses width.
    taffy.disable_rounding();

    let mut children = Vec::new();
    for basis in bases {
        let style = match basis {
            ColumnBasis::Fraction(f) => Style {
                flex_basis: taffy::Dimension::Percent(f),
                flex_grow: 0.0,
                flex_shrink: 0.0,
                ..Default::default()
            },
            ColumnBasis::Grow => Style {
                flex_basis: taffy::Dimension::Length(0.0),
                flex_grow: 1.0,
                min_size: Size {
                    width: taffy::Dimension::Length(0.0),
                    height: taffy::Dimension::Auto,
                },
                ..Default::default()
            },
        };
        children.push(taffy.new_leaf(style)?);
    }

    let root_style = Style {
        display: taffy::Display::Flex,
        flex_direction: taffy::FlexDirection::Row,
        align_items: Some(taffy::AlignItems::Stretch),
        size: Size {
            width: taffy::Dimension::Length(content_width),
            height: taffy::Dimension::Length(content_height),
        },
        gap: Size {
            width: LengthPercentage::Length(gap),
            height: LengthPercentage::Length(0.0),
        },
        ..Default::default()
    };
    let root = taffy.new_with_children(root_style, &children)?;

    taffy.compute_layout(
        root,
        Size {
            width: AvailableSpace::Definite(content_width),
            height: AvailableSpace::Definite(content_height),
        },
    )?;

    children
        .iter()
        .map(|&child| {
            let layout = taffy.layout(child)?;
            Ok((layout.location.x, layout.size.width))
        })
        .collect()
}

fn even_split(count: usize, content_width: f32, gap: f32) -> Vec<(f32, f32)> {
    let count = count.max(1);
    let width = (content_width - gap * (count - 1) as f32) / count as f32;
    (0..count)
        .map(|i| (i as f32 * (width + gap), width))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout_config::LayoutType;

    fn config(layout_type: LayoutType) -> LayoutConfig {
        LayoutConfig {
            layout_type,
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn single_column_spans_content_width() {
        let g = compute_geometry(&config(LayoutType::SingleColumn), A4_WIDTH, A4_HEIGHT);
        assert_eq!(g.columns.len(), 1);
        let main = g.column(Zone::Main).unwrap();
        assert!((main.width - g.content_width).abs() < 0.5);
        assert!((main.x - g.margin).abs() < 0.5);
    }

    #[test]
    fn two_columns_split_evenly() {
        let g = compute_geometry(&config(LayoutType::TwoColumn), A4_WIDTH, A4_HEIGHT);
        let main = g.column(Zone::Main).unwrap();
        let secondary = g.column(Zone::Secondary).unwrap();
        assert!((main.width - secondary.width).abs() < 0.01);
        assert!(secondary.x > main.x + main.width);
    }

    #[test]
    fn columns_fill_the_content_box_exactly() {
        for layout_type in [LayoutType::TwoColumn, LayoutType::Sidebar] {
            let cfg = config(layout_type);
            let g = compute_geometry(&cfg, A4_WIDTH, A4_HEIGHT);
            let widths: f32 = g.columns.iter().map(|c| c.width).sum();
            let gaps = cfg.spacing.column_gap * (g.columns.len() - 1) as f32;
            assert!((widths + gaps - g.content_width).abs() < 0.01, "{layout_type:?}");
        }
    }

    #[test]
    fn sidebar_is_narrow_and_first() {
        let g = compute_geometry(&config(LayoutType::Sidebar), A4_WIDTH, A4_HEIGHT);
        assert_eq!(g.columns[0].zone, Zone::Sidebar);
        let sidebar = g.column(Zone::Sidebar).unwrap();
        let main = g.column(Zone::Main).unwrap();
        assert!(sidebar.width < main.width);
        assert!((sidebar.width - g.content_width * 0.32).abs() < 1.0);
        assert!(sidebar.padding > 0.0);
    }

    #[test]
    fn landscape_swaps_dimensions() {
        let mut cfg = config(LayoutType::SingleColumn);
        cfg.orientation = PageOrientation::Landscape;
        let g = compute_geometry(&cfg, A4_WIDTH, A4_HEIGHT);
        assert_eq!(g.page_width, A4_HEIGHT);
        assert_eq!(g.page_height, A4_WIDTH);
    }

    #[test]
    fn even_split_fallback() {
        let spans = even_split(2, 100.0, 10.0);
        assert_eq!(spans, vec![(0.0, 45.0), (55.0, 45.0)]);
    }
}
