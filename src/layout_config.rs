//! Layout configuration – the user-facing page/layout settings plus the
//! static catalog that maps each layout type to its columns and zones.

use serde::{Deserialize, Serialize};

use crate::style::Color;

/// A named layout region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Main,
    Secondary,
    Sidebar,
}

impl Zone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Main => "main",
            Zone::Secondary => "secondary",
            Zone::Sidebar => "sidebar",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutType {
    TwoColumn,
    Sidebar,
    /// Also the target of any unrecognised layout name.
    #[default]
    #[serde(other)]
    SingleColumn,
}

/// How a column claims horizontal space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnBasis {
    /// Fixed share of the content width.
    Fraction(f32),
    /// Takes what is left, shared with other growing columns.
    Grow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpec {
    pub zone: Zone,
    pub basis: ColumnBasis,
}

const SINGLE_COLUMN: [ColumnSpec; 1] = [ColumnSpec {
    zone: Zone::Main,
    basis: ColumnBasis::Grow,
}];

const TWO_COLUMN: [ColumnSpec; 2] = [
    ColumnSpec {
        zone: Zone::Main,
        basis: ColumnBasis::Grow,
    },
    ColumnSpec {
        zone: Zone::Secondary,
        basis: ColumnBasis::Grow,
    },
];

const SIDEBAR: [ColumnSpec; 2] = [
    ColumnSpec {
        zone: Zone::Sidebar,
        basis: ColumnBasis::Fraction(0.32),
    },
    ColumnSpec {
        zone: Zone::Main,
        basis: ColumnBasis::Grow,
    },
];

impl LayoutType {
    /// Columns left to right.
    pub fn columns(&self) -> &'static [ColumnSpec] {
        match self {
            LayoutType::SingleColumn => &SINGLE_COLUMN,
            LayoutType::TwoColumn => &TWO_COLUMN,
            LayoutType::Sidebar => &SIDEBAR,
        }
    }

    pub fn zones(&self) -> Vec<Zone> {
        self.columns().iter().map(|c| c.zone).collect()
    }

    pub fn has_zone(&self, zone: Zone) -> bool {
        self.columns().iter().any(|c| c.zone == zone)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutType::SingleColumn => "single-column",
            LayoutType::TwoColumn => "two-column",
            LayoutType::Sidebar => "sidebar",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageOrientation {
    #[default]
    Portrait,
    Landscape,
}

// ---------------------------------------------------------------------------
// User configuration
// ---------------------------------------------------------------------------

/// Page and typography settings chosen in the template builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    pub layout_type: LayoutType,
    pub orientation: PageOrientation,
    /// Page margin in points.
    pub margin: f32,
    pub base_font_size: f32,
    pub colors: ColorPalette,
    pub fonts: FontChoice,
    pub spacing: Spacing,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            layout_type: LayoutType::SingleColumn,
            orientation: PageOrientation::Portrait,
            margin: 40.0,
            base_font_size: 10.5,
            colors: ColorPalette::default(),
            fonts: FontChoice::default(),
            spacing: Spacing::default(),
        }
    }
}

/// Hex colours (`#rrggbb` or `#rgb`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColorPalette {
    pub primary: String,
    pub text: String,
    pub muted: String,
    pub accent: String,
    pub sidebar_background: String,
    pub sidebar_text: String,
    pub secondary_background: String,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            primary: "#1a365d".to_string(),
            text: "#1f2933".to_string(),
            muted: "#52606d".to_string(),
            accent: "#2b6cb0".to_string(),
            sidebar_background: "#1a365d".to_string(),
            sidebar_text: "#ffffff".to_string(),
            secondary_background: "#f4f6f8".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontChoice {
    pub heading: String,
    pub body: String,
}

impl Default for FontChoice {
    fn default() -> Self {
        Self {
            heading: "Helvetica".to_string(),
            body: "Helvetica".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Spacing {
    /// Gap after each section, in points.
    pub section: f32,
    /// Gap after each item inside a section, in points.
    pub item: f32,
    /// Line height as a multiple of the font size.
    pub line_height: f32,
    /// Gap between columns, in points.
    pub column_gap: f32,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            section: 12.0,
            item: 6.0,
            line_height: 1.35,
            column_gap: 16.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Zone treatment
// ---------------------------------------------------------------------------

/// Visual treatment of a zone: contrast background, text colour, padding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneTreatment {
    pub background: Option<Color>,
    pub text_color: Option<Color>,
    pub padding: f32,
}

impl ZoneTreatment {
    pub fn for_zone(zone: Zone, palette: &ColorPalette) -> Self {
        match zone {
            Zone::Main => Self {
                background: None,
                text_color: None,
                padding: 0.0,
            },
            Zone::Secondary => Self {
                background: Color::from_hex(&palette.secondary_background),
                text_color: None,
                padding: 8.0,
            },
            Zone::Sidebar => Self {
                background: Color::from_hex(&palette.sidebar_background),
                text_color: Color::from_hex(&palette.sidebar_text),
                padding: 12.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_zones() {
        assert_eq!(LayoutType::SingleColumn.zones(), vec![Zone::Main]);
        assert_eq!(LayoutType::TwoColumn.zones(), vec![Zone::Main, Zone::Secondary]);
        assert_eq!(LayoutType::Sidebar.zones(), vec![Zone::Sidebar, Zone::Main]);
    }

    #[test]
    fn unknown_layout_type_is_single_column() {
        let cfg: LayoutConfig = serde_json::from_str(r#"{"layoutType": "magazine"}"#).unwrap();
        assert_eq!(cfg.layout_type, LayoutType::SingleColumn);
        let cfg: LayoutConfig = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(cfg.layout_type, LayoutType::SingleColumn);
        let cfg: LayoutConfig =
            serde_json::from_str(r#"{"layoutType": "sidebar", "orientation": "landscape"}"#)
                .unwrap();
        assert_eq!(cfg.layout_type, LayoutType::Sidebar);
        assert_eq!(cfg.orientation, PageOrientation::Landscape);
    }

    #[test]
    fn sidebar_zone_is_contrasted() {
        let t = ZoneTreatment::for_zone(Zone::Sidebar, &ColorPalette::default());
        assert!(t.background.is_some());
        assert_eq!(t.text_color, Some(Color::WHITE));
        assert_eq!(ZoneTreatment::for_zone(Zone::Main, &ColorPalette::default()).background, None);
    }
}
