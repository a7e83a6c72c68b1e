//! Input model: the profile being rendered and the template that configures
//! it. Everything here is read-only for the duration of a compilation run.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Biographical, professional and project data for one person.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub designation: Option<String>,
    /// Free text; may carry the rich-text HTML subset.
    pub biography: Option<String>,
    /// Photo reference (data URI, or a URL when remote images are enabled).
    pub image: Option<String>,
    pub experiences: Vec<Experience>,
    pub education: Vec<Education>,
    pub projects: Vec<Project>,
    pub technical_skills: Vec<Skill>,
    pub specialized_skills: Vec<Skill>,
    pub trainings: Vec<Training>,
    pub achievements: Vec<Achievement>,
    pub references: Vec<Reference>,
}

impl Profile {
    /// "First Last", or whichever half is present.
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.first_name, &self.last_name]
            .into_iter()
            .filter_map(|p| non_blank(p.as_deref()))
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub company_name: Option<String>,
    pub designation: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub grade: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub name: Option<String>,
    pub role: Option<String>,
    pub description: Option<String>,
    pub technologies: Vec<String>,
    pub url: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Skill {
    pub name: Option<String>,
    /// 0..=10 when present.
    pub proficiency: Option<i32>,
    /// Lower sorts first.
    pub priority: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Training {
    pub title: Option<String>,
    pub provider: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Achievement {
    pub name: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Reference {
    pub id: String,
    pub name: Option<String>,
    pub designation: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    General,
    Experience,
    Education,
    Projects,
    TechnicalSkills,
    SpecializedSkills,
    Training,
    Achievements,
    References,
    PageBreak,
}

impl SectionType {
    pub const ALL: [SectionType; 10] = [
        SectionType::General,
        SectionType::Experience,
        SectionType::Education,
        SectionType::Projects,
        SectionType::TechnicalSkills,
        SectionType::SpecializedSkills,
        SectionType::Training,
        SectionType::Achievements,
        SectionType::References,
        SectionType::PageBreak,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::General => "general",
            SectionType::Experience => "experience",
            SectionType::Education => "education",
            SectionType::Projects => "projects",
            SectionType::TechnicalSkills => "technical_skills",
            SectionType::SpecializedSkills => "specialized_skills",
            SectionType::Training => "training",
            SectionType::Achievements => "achievements",
            SectionType::References => "references",
            SectionType::PageBreak => "page_break",
        }
    }

    /// Heading used when the template does not override it.
    pub fn default_label(&self) -> &'static str {
        match self {
            SectionType::General => "Profile",
            SectionType::Experience => "Experience",
            SectionType::Education => "Education",
            SectionType::Projects => "Projects",
            SectionType::TechnicalSkills => "Technical Skills",
            SectionType::SpecializedSkills => "Specialized Skills",
            SectionType::Training => "Training",
            SectionType::Achievements => "Achievements",
            SectionType::References => "References",
            SectionType::PageBreak => "",
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a section asks to be placed. Anything unrecognised reads as
/// [`Placement::Other`] and lands in the main zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    #[default]
    Main,
    Sidebar,
    #[serde(other)]
    Other,
}

/// One configured content block of the template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSection {
    pub id: String,
    pub section_type: SectionType,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub is_required: bool,
    /// Heading override; falls back to [`SectionType::default_label`].
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub styling_config: StylingConfig,
}

impl TemplateSection {
    pub fn new(id: impl Into<String>, section_type: SectionType, display_order: i32) -> Self {
        Self {
            id: id.into(),
            section_type,
            display_order,
            is_required: false,
            display_name: None,
            styling_config: StylingConfig::default(),
        }
    }

    pub fn heading(&self) -> String {
        match self.display_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.section_type.default_label().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StylingConfig {
    pub display_style: Option<String>,
    pub layout_placement: Option<Placement>,
    pub projects_to_view: Option<u32>,
    pub max_skills_count: Option<u32>,
    pub selected_references: BTreeSet<String>,
    pub fields: Vec<FieldConfig>,
}

/// Section-scoped override of one field's disclosure policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub field: String,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub masked: bool,
    #[serde(default)]
    pub mask_value: Option<String>,
    /// 1-based, unique within a section.
    #[serde(default)]
    pub order: i32,
}

impl FieldConfig {
    pub fn new(field: &str, label: &str, order: i32) -> Self {
        Self {
            field: field.to_string(),
            label: label.to_string(),
            enabled: true,
            masked: false,
            mask_value: None,
            order,
        }
    }
}

/// Template-scoped field policy; loses to a [`FieldConfig`] on the section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMapping {
    pub original_field_name: String,
    pub section_type: SectionType,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub is_masked: bool,
    #[serde(default)]
    pub mask_value: Option<String>,
    #[serde(default)]
    pub field_order: i32,
    #[serde(default)]
    pub visibility_rules: Option<VisibilityRules>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityRules {
    pub visible: Option<bool>,
}

fn default_true() -> bool {
    true
}

/// Trimmed value, or `None` when missing or blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_joins_present_parts() {
        let mut p = Profile {
            first_name: Some("Ada".into()),
            last_name: Some("  ".into()),
            ..Profile::default()
        };
        assert_eq!(p.full_name().as_deref(), Some("Ada"));
        p.last_name = Some("Lovelace".into());
        assert_eq!(p.full_name().as_deref(), Some("Ada Lovelace"));
        assert_eq!(Profile::default().full_name(), None);
    }

    #[test]
    fn unknown_placement_deserialises_as_other() {
        let cfg: StylingConfig =
            serde_json::from_str(r#"{"layout_placement": "footer"}"#).unwrap();
        assert_eq!(cfg.layout_placement, Some(Placement::Other));
    }

    #[test]
    fn section_heading_prefers_override() {
        let mut s = TemplateSection::new("s1", SectionType::Experience, 1);
        assert_eq!(s.heading(), "Experience");
        s.display_name = Some("Work History".into());
        assert_eq!(s.heading(), "Work History");
    }

    #[test]
    fn field_config_defaults_to_enabled() {
        let f: FieldConfig = serde_json::from_str(r#"{"field": "email"}"#).unwrap();
        assert!(f.enabled);
        assert!(!f.masked);
    }
}
