//! Style tokens – the resolved colours, sizes and spacing every emitter
//! applies to the node kinds it renders.

use crate::layout_config::{LayoutConfig, Zone, ZoneTreatment};

/// RGBA colour (0.0 – 1.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);
        match hex.len() {
            6 => Some(Self {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
                a: 1.0,
            }),
            3 => Some(Self {
                r: channel(hex[0..1].repeat(2).as_str())?,
                g: channel(hex[1..2].repeat(2).as_str())?,
                b: channel(hex[2..3].repeat(2).as_str())?,
                a: 1.0,
            }),
            _ => None,
        }
    }

    /// Uppercase `RRGGBB` without the leading `#` (the OOXML convention).
    pub fn hex(&self) -> String {
        let [r, g, b] = self.rgb8();
        format!("{r:02X}{g:02X}{b:02X}")
    }

    /// `#rrggbb` for CSS.
    pub fn css(&self) -> String {
        format!("#{}", self.hex().to_ascii_lowercase())
    }

    pub fn rgb8(&self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }
}

/// The content node kinds that carry text styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    Headline,
    Title,
    Subtitle,
    Body,
    Tag,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
    pub color: Color,
    pub font: String,
}

/// Resolved design tokens for one compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleTokens {
    pub primary: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub headline_size: f32,
    pub title_size: f32,
    pub subtitle_size: f32,
    pub body_size: f32,
    /// Multiple of the font size.
    pub line_height: f32,
    pub section_gap: f32,
    pub item_gap: f32,
    pub heading_font: String,
    pub body_font: String,
    main: ZoneTreatment,
    secondary: ZoneTreatment,
    sidebar: ZoneTreatment,
}

impl StyleTokens {
    pub fn from_layout(layout: &LayoutConfig) -> Self {
        let base = if layout.base_font_size > 0.0 {
            layout.base_font_size
        } else {
            LayoutConfig::default().base_font_size
        };
        let colors = &layout.colors;
        let pick = |hex: &str, fallback: Color| {
            Color::from_hex(hex).unwrap_or_else(|| {
                log::warn!("Ignoring invalid colour {hex:?}");
                fallback
            })
        };
        Self {
            primary: pick(&colors.primary, Color::BLACK),
            text: pick(&colors.text, Color::BLACK),
            muted: pick(&colors.muted, Color::BLACK),
            accent: pick(&colors.accent, Color::BLACK),
            headline_size: base * 2.0,
            title_size: base * 1.5,
            subtitle_size: base,
            body_size: base,
            line_height: layout.spacing.line_height.max(1.0),
            section_gap: layout.spacing.section.max(0.0),
            item_gap: layout.spacing.item.max(0.0),
            heading_font: layout.fonts.heading.clone(),
            body_font: layout.fonts.body.clone(),
            main: ZoneTreatment::for_zone(Zone::Main, colors),
            secondary: ZoneTreatment::for_zone(Zone::Secondary, colors),
            sidebar: ZoneTreatment::for_zone(Zone::Sidebar, colors),
        }
    }

    pub fn zone(&self, zone: Zone) -> ZoneTreatment {
        match zone {
            Zone::Main => self.main,
            Zone::Secondary => self.secondary,
            Zone::Sidebar => self.sidebar,
        }
    }

    /// Text style for `role`; a zone's text colour overrides the palette.
    pub fn text_style(&self, role: TextRole, zone: Zone) -> TextStyle {
        let (size, bold, italic, color, font) = match role {
            TextRole::Headline => (self.headline_size, true, false, self.primary, &self.heading_font),
            TextRole::Title => (self.title_size, true, false, self.primary, &self.heading_font),
            TextRole::Subtitle => (self.subtitle_size, true, false, self.text, &self.body_font),
            TextRole::Body => (self.body_size, false, false, self.text, &self.body_font),
            TextRole::Tag => (self.body_size * 0.9, false, false, self.accent, &self.body_font),
        };
        TextStyle {
            size,
            bold,
            italic,
            color: self.zone(zone).text_color.unwrap_or(color),
            font: font.clone(),
        }
    }

    /// Line advance for `size`.
    pub fn line_advance(&self, size: f32) -> f32 {
        size * self.line_height
    }
}

impl Default for StyleTokens {
    fn default() -> Self {
        Self::from_layout(&LayoutConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_colours() {
        let c = Color::from_hex("#ff0000").unwrap();
        assert_eq!(c.hex(), "FF0000");
        assert_eq!(Color::from_hex("#0f0").unwrap().css(), "#00ff00");
        assert!(Color::from_hex("not-a-colour").is_none());
    }

    #[test]
    fn tokens_scale_with_base_font() {
        let mut layout = LayoutConfig::default();
        layout.base_font_size = 12.0;
        let t = StyleTokens::from_layout(&layout);
        assert_eq!(t.body_size, 12.0);
        assert_eq!(t.title_size, 18.0);
        assert!(t.text_style(TextRole::Title, Zone::Main).bold);
    }

    #[test]
    fn sidebar_overrides_text_colour() {
        let t = StyleTokens::default();
        assert_eq!(t.text_style(TextRole::Body, Zone::Sidebar).color, Color::WHITE);
        assert_eq!(t.text_style(TextRole::Body, Zone::Main).color, t.text);
    }
}
