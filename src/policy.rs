//! Field policy resolver – decides, per field and per section instance,
//! whether a value is shown, where it sorts, and how it is masked.
//!
//! Precedence (first match wins):
//! 1. the section's own [`FieldConfig`] entry,
//! 2. the template's [`FieldMapping`] for `(field, section_type)`,
//! 3. visible, unmasked, order 0.
//!
//! Every backend goes through this module; no emitter masks or hides values
//! on its own.

use std::collections::HashMap;

use crate::model::{FieldConfig, FieldMapping, SectionType, TemplateSection};

pub const MASK_SUFFIX: &str = "***";

/// How a visible value is disguised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mask {
    /// Replace with a fixed string.
    Literal(String),
    /// Keep the first three characters, then `***`.
    Redact,
}

impl Mask {
    fn from_parts(masked: bool, mask_value: Option<&str>) -> Option<Self> {
        if !masked {
            return None;
        }
        Some(match mask_value {
            Some(v) if !v.is_empty() => Mask::Literal(v.to_string()),
            _ => Mask::Redact,
        })
    }

    /// Mask a raw value. Missing values stay missing.
    pub fn apply(&self, raw: Option<&str>) -> Option<String> {
        let raw = raw?;
        Some(match self {
            Mask::Literal(v) => v.clone(),
            Mask::Redact => default_mask(raw),
        })
    }
}

/// Strings longer than three characters keep their first three, everything
/// else becomes `***`. Idempotent: `default_mask(default_mask(x)) == default_mask(x)`.
pub fn default_mask(raw: &str) -> String {
    if raw.chars().count() > 3 {
        let head: String = raw.chars().take(3).collect();
        format!("{head}{MASK_SUFFIX}")
    } else {
        MASK_SUFFIX.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecision {
    pub visible: bool,
    pub order: i32,
    pub mask: Option<Mask>,
}

impl Default for FieldDecision {
    fn default() -> Self {
        Self {
            visible: true,
            order: 0,
            mask: None,
        }
    }
}

impl FieldDecision {
    fn hidden() -> Self {
        Self {
            visible: false,
            ..Self::default()
        }
    }

    /// The value as it should appear in output, or `None` when the field is
    /// hidden or the value is missing.
    pub fn render(&self, raw: Option<&str>) -> Option<String> {
        if !self.visible {
            return None;
        }
        match &self.mask {
            Some(mask) => mask.apply(raw),
            None => raw.map(str::to_string),
        }
    }
}

/// Resolve one field's policy within one section instance.
pub fn resolve(
    field_name: &str,
    section_type: SectionType,
    section_fields: &[FieldConfig],
    template_mappings: &[FieldMapping],
) -> FieldDecision {
    if let Some(entry) = section_fields.iter().find(|f| f.field == field_name) {
        return FieldDecision {
            visible: entry.enabled,
            order: entry.order,
            mask: Mask::from_parts(entry.masked, entry.mask_value.as_deref()),
        };
    }

    if let Some(mapping) = template_mappings
        .iter()
        .find(|m| m.original_field_name == field_name && m.section_type == section_type)
    {
        let visible = mapping
            .visibility_rules
            .as_ref()
            .and_then(|r| r.visible)
            .unwrap_or(true);
        return FieldDecision {
            visible,
            order: mapping.field_order,
            mask: Mask::from_parts(mapping.is_masked, mapping.mask_value.as_deref()),
        };
    }

    FieldDecision::default()
}

// ---------------------------------------------------------------------------
// Default field sets
// ---------------------------------------------------------------------------

/// Field set used by sections that configure no fields of their own.
/// Supplied by the host at construction time; [`DefaultFieldTable::builtin`]
/// is the stock table.
#[derive(Debug, Clone)]
pub struct DefaultFieldTable {
    fields: HashMap<SectionType, Vec<FieldConfig>>,
}

impl DefaultFieldTable {
    pub fn new(fields: HashMap<SectionType, Vec<FieldConfig>>) -> Self {
        Self { fields }
    }

    pub fn builtin() -> Self {
        let fields = SectionType::ALL
            .iter()
            .map(|ty| {
                let configs = builtin_fields(*ty)
                    .iter()
                    .enumerate()
                    .map(|(i, (field, label))| FieldConfig::new(field, label, i as i32 + 1))
                    .collect();
                (*ty, configs)
            })
            .collect();
        Self { fields }
    }

    pub fn fields_for(&self, section_type: SectionType) -> &[FieldConfig] {
        self.fields
            .get(&section_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl Default for DefaultFieldTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_fields(section_type: SectionType) -> &'static [(&'static str, &'static str)] {
    match section_type {
        SectionType::General => &[
            ("profile_image", "Photo"),
            ("first_name", "First Name"),
            ("last_name", "Last Name"),
            ("designation", "Designation"),
            ("email", "Email"),
            ("phone", "Phone"),
            ("location", "Location"),
            ("biography", "Biography"),
        ],
        SectionType::Experience => &[
            ("designation", "Designation"),
            ("company_name", "Company"),
            ("location", "Location"),
            ("start_date", "Start Date"),
            ("end_date", "End Date"),
            ("description", "Description"),
        ],
        SectionType::Education => &[
            ("degree", "Degree"),
            ("institution", "Institution"),
            ("start_date", "Start Date"),
            ("end_date", "End Date"),
            ("grade", "Grade"),
            ("description", "Description"),
        ],
        SectionType::Projects => &[
            ("name", "Project"),
            ("role", "Role"),
            ("start_date", "Start Date"),
            ("end_date", "End Date"),
            ("description", "Description"),
            ("technologies", "Technologies"),
            ("url", "Link"),
        ],
        SectionType::TechnicalSkills | SectionType::SpecializedSkills => {
            &[("name", "Skill"), ("proficiency", "Proficiency")]
        }
        SectionType::Training => &[
            ("title", "Title"),
            ("provider", "Provider"),
            ("date", "Date"),
            ("description", "Description"),
        ],
        SectionType::Achievements => &[
            ("name", "Achievement"),
            ("date", "Date"),
            ("description", "Description"),
        ],
        SectionType::References => &[
            ("name", "Name"),
            ("designation", "Designation"),
            ("company", "Company"),
            ("email", "Email"),
            ("phone", "Phone"),
        ],
        SectionType::PageBreak => &[],
    }
}

// ---------------------------------------------------------------------------
// Per-section policy
// ---------------------------------------------------------------------------

/// All field decisions for one section instance, resolved once up front.
#[derive(Debug, Clone)]
pub struct FieldPolicy {
    decisions: HashMap<String, FieldDecision>,
    /// Position in the effective field list, for tie-breaking equal orders.
    positions: HashMap<String, usize>,
}

impl FieldPolicy {
    /// Build the policy from the section's effective field list: its own
    /// `fields` when non-empty, otherwise the default set for its type.
    /// Fields outside the effective list are hidden.
    pub fn for_section(
        section: &TemplateSection,
        mappings: &[FieldMapping],
        defaults: &DefaultFieldTable,
    ) -> Self {
        let own = &section.styling_config.fields;
        let effective: &[FieldConfig] = if own.is_empty() {
            defaults.fields_for(section.section_type)
        } else {
            own
        };

        let mut decisions = HashMap::new();
        let mut positions = HashMap::new();
        for (pos, entry) in effective.iter().enumerate() {
            let decision = resolve(&entry.field, section.section_type, own, mappings);
            decisions.insert(entry.field.clone(), decision);
            positions.entry(entry.field.clone()).or_insert(pos);
        }
        Self {
            decisions,
            positions,
        }
    }

    pub fn decision(&self, field: &str) -> FieldDecision {
        self.decisions
            .get(field)
            .cloned()
            .unwrap_or_else(FieldDecision::hidden)
    }

    pub fn is_visible(&self, field: &str) -> bool {
        self.decisions.get(field).is_some_and(|d| d.visible)
    }

    /// Visible, masked, non-blank value of `field`.
    pub fn value(&self, field: &str, raw: Option<&str>) -> Option<String> {
        self.value_with(field, raw, str::to_string)
    }

    /// Like [`value`](Self::value) but formats unmasked values with `format`.
    /// Masks always operate on the raw value.
    pub fn value_with(
        &self,
        field: &str,
        raw: Option<&str>,
        format: impl Fn(&str) -> String,
    ) -> Option<String> {
        let raw = crate::model::non_blank(raw)?;
        let decision = self.decisions.get(field)?;
        if !decision.visible {
            return None;
        }
        let rendered = match &decision.mask {
            Some(mask) => mask.apply(Some(raw)),
            None => Some(format(raw)),
        };
        rendered.filter(|v| !v.is_empty())
    }

    /// Sort key: explicit order first, then position in the field list.
    pub fn rank(&self, field: &str) -> (i32, usize) {
        let pos = self.positions.get(field).copied().unwrap_or(usize::MAX);
        let order = match self.decisions.get(field) {
            Some(d) if d.order > 0 => d.order,
            _ => i32::try_from(pos.saturating_add(1)).unwrap_or(i32::MAX),
        };
        (order, pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VisibilityRules;

    fn mapping(field: &str, visible: Option<bool>, masked: bool) -> FieldMapping {
        FieldMapping {
            original_field_name: field.to_string(),
            section_type: SectionType::General,
            display_name: field.to_string(),
            is_masked: masked,
            mask_value: None,
            field_order: 7,
            visibility_rules: Some(VisibilityRules { visible }),
        }
    }

    #[test]
    fn default_mask_scenarios() {
        assert_eq!(default_mask("secret-value"), "sec***");
        assert_eq!(default_mask("abc"), "***");
        assert_eq!(default_mask("ab"), "***");
        assert_eq!(default_mask("héllo"), "hél***");
    }

    #[test]
    fn masking_missing_value_is_noop() {
        assert_eq!(Mask::Redact.apply(None), None);
        assert_eq!(Mask::Literal("hidden".into()).apply(None), None);
    }

    #[test]
    fn section_entry_beats_template_mapping() {
        let mut entry = FieldConfig::new("email", "Email", 2);
        entry.enabled = true;
        let d = resolve(
            "email",
            SectionType::General,
            &[entry],
            &[mapping("email", Some(false), true)],
        );
        assert!(d.visible);
        assert_eq!(d.order, 2);
        assert_eq!(d.mask, None);
    }

    #[test]
    fn template_mapping_applies_when_section_silent() {
        let d = resolve(
            "phone",
            SectionType::General,
            &[],
            &[mapping("phone", None, true)],
        );
        assert!(d.visible);
        assert_eq!(d.order, 7);
        assert_eq!(d.mask, Some(Mask::Redact));

        let hidden = resolve(
            "phone",
            SectionType::General,
            &[],
            &[mapping("phone", Some(false), false)],
        );
        assert!(!hidden.visible);
    }

    #[test]
    fn mapping_for_other_section_type_is_ignored() {
        let mut m = mapping("phone", Some(false), false);
        m.section_type = SectionType::References;
        let d = resolve("phone", SectionType::General, &[], &[m]);
        assert_eq!(d, FieldDecision::default());
    }

    #[test]
    fn literal_mask_value_wins_over_redaction() {
        let mut entry = FieldConfig::new("phone", "Phone", 1);
        entry.masked = true;
        entry.mask_value = Some("on request".into());
        let d = resolve("phone", SectionType::General, &[entry], &[]);
        assert_eq!(d.render(Some("+1 555 0100")).as_deref(), Some("on request"));
    }

    #[test]
    fn policy_hides_fields_outside_effective_list() {
        let mut section = TemplateSection::new("g", SectionType::General, 1);
        section.styling_config.fields = vec![FieldConfig::new("email", "Email", 1)];
        let policy = FieldPolicy::for_section(&section, &[], &DefaultFieldTable::builtin());
        assert!(policy.is_visible("email"));
        assert!(!policy.is_visible("phone"));
        assert_eq!(policy.value("phone", Some("123")), None);
    }

    #[test]
    fn policy_uses_defaults_when_section_has_no_fields() {
        let section = TemplateSection::new("e", SectionType::Experience, 1);
        let policy = FieldPolicy::for_section(&section, &[], &DefaultFieldTable::builtin());
        assert!(policy.is_visible("company_name"));
        assert!(policy.rank("designation") < policy.rank("company_name"));
    }

    #[test]
    fn value_with_formats_only_unmasked_values() {
        let mut section = TemplateSection::new("e", SectionType::Experience, 1);
        let mut start = FieldConfig::new("start_date", "Start", 1);
        start.masked = true;
        section.styling_config.fields = vec![start, FieldConfig::new("end_date", "End", 2)];
        let policy = FieldPolicy::for_section(&section, &[], &DefaultFieldTable::builtin());
        let fmt = |s: &str| format!("<{s}>");
        assert_eq!(
            policy.value_with("start_date", Some("2020-01-01"), fmt).as_deref(),
            Some("202***")
        );
        assert_eq!(
            policy.value_with("end_date", Some("2021"), fmt).as_deref(),
            Some("<2021>")
        );
    }
}
