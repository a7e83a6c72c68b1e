//! Zone assignment – maps each rendered section onto a zone of the active
//! layout.

use std::collections::BTreeMap;

use crate::content::RenderedSection;
use crate::layout_config::{LayoutType, Zone};
use crate::model::Placement;

/// Total mapping from `(layout, placement)` to a zone the layout exposes.
pub fn resolve_zone(layout: LayoutType, placement: Option<Placement>) -> Zone {
    match placement {
        Some(Placement::Sidebar) if layout.has_zone(Zone::Sidebar) => Zone::Sidebar,
        Some(Placement::Sidebar) if layout.has_zone(Zone::Secondary) => Zone::Secondary,
        _ => Zone::Main,
    }
}

/// Group sections by zone, each list ordered by `display_order`.
///
/// Sections that share an order keep their input order.
pub fn assign_zones(layout: LayoutType, sections: Vec<RenderedSection>) -> BTreeMap<Zone, Vec<RenderedSection>> {
    let mut by_zone: BTreeMap<Zone, Vec<RenderedSection>> = BTreeMap::new();
    for section in sections {
        let zone = resolve_zone(layout, section.placement);
        by_zone.entry(zone).or_default().push(section);
    }
    for list in by_zone.values_mut() {
        list.sort_by_key(|s| s.display_order);
    }
    by_zone
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SectionType;

    fn section(id: &str, order: i32, placement: Option<Placement>) -> RenderedSection {
        RenderedSection {
            id: id.to_string(),
            section_type: SectionType::Experience,
            display_order: order,
            position: order.max(0) as usize,
            placement,
            title: Some("Experience".into()),
            items: Vec::new(),
        }
    }

    #[test]
    fn sidebar_placement_follows_layout() {
        let sidebar = Some(Placement::Sidebar);
        assert_eq!(resolve_zone(LayoutType::Sidebar, sidebar), Zone::Sidebar);
        assert_eq!(resolve_zone(LayoutType::TwoColumn, sidebar), Zone::Secondary);
        assert_eq!(resolve_zone(LayoutType::SingleColumn, sidebar), Zone::Main);
    }

    #[test]
    fn main_unknown_and_absent_go_to_main() {
        for layout in [LayoutType::SingleColumn, LayoutType::TwoColumn, LayoutType::Sidebar] {
            assert_eq!(resolve_zone(layout, None), Zone::Main);
            assert_eq!(resolve_zone(layout, Some(Placement::Main)), Zone::Main);
            assert_eq!(resolve_zone(layout, Some(Placement::Other)), Zone::Main);
        }
    }

    #[test]
    fn zones_preserve_display_order() {
        let sections = vec![
            section("c", 3, None),
            section("s", 2, Some(Placement::Sidebar)),
            section("a", 1, None),
        ];
        let zones = assign_zones(LayoutType::Sidebar, sections);
        let main: Vec<_> = zones[&Zone::Main].iter().map(|s| s.id.as_str()).collect();
        assert_eq!(main, vec!["a", "c"]);
        assert_eq!(zones[&Zone::Sidebar].len(), 1);
        assert!(!zones.contains_key(&Zone::Secondary));
    }
}
