//! Canonical section renderers – one per section type, each turning a slice
//! of the profile plus the section's [`FieldPolicy`] into content nodes.
//!
//! Renderers never look at the output format. Hidden fields contribute no
//! node at all, masked fields arrive already masked, and nodes inside an item
//! follow the policy's field order.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate};

use crate::content::{ContentNode, RenderedSection, SectionItem};
use crate::error::CompileError;
use crate::model::{
    non_blank, Achievement, Education, Experience, Profile, Project, Reference, SectionType, Skill,
    TemplateSection, Training,
};
use crate::policy::FieldPolicy;
use crate::richtext;

pub const DEFAULT_MAX_SKILLS: usize = 10;
/// Accepted range for `projects_to_view` and `max_skills_count`.
pub const COUNT_LIMITS: std::ops::RangeInclusive<u32> = 1..=50;
pub const PRESENT: &str = "Present";

/// Render one configured section against the profile.
///
/// Malformed section data (out-of-range counts, proficiency outside 0..=10,
/// an end date before its start date) is reported as
/// [`CompileError::SectionRender`]; the caller skips the section.
pub fn render_section(
    section: &TemplateSection,
    profile: &Profile,
    policy: &FieldPolicy,
) -> Result<RenderedSection, CompileError> {
    let fail = |reason: String| CompileError::SectionRender {
        section_id: section.id.clone(),
        reason,
    };
    let cfg = &section.styling_config;
    for (name, value) in [
        ("projects_to_view", cfg.projects_to_view),
        ("max_skills_count", cfg.max_skills_count),
    ] {
        if let Some(v) = value {
            if !COUNT_LIMITS.contains(&v) {
                return Err(fail(format!(
                    "{name} must be between {} and {}, got {v}",
                    COUNT_LIMITS.start(),
                    COUNT_LIMITS.end()
                )));
            }
        }
    }

    let items = match section.section_type {
        SectionType::General => vec![general(profile, policy)],
        SectionType::Experience => entries(&profile.experiences, |e| experience(e, policy)).map_err(fail)?,
        SectionType::Education => entries(&profile.education, |e| education(e, policy)).map_err(fail)?,
        SectionType::Projects => entries(&profile.projects, |p| project(p, policy)).map_err(fail)?,
        SectionType::TechnicalSkills => {
            vec![skills(&profile.technical_skills, cfg.max_skills_count, policy).map_err(fail)?]
        }
        SectionType::SpecializedSkills => {
            vec![skills(&profile.specialized_skills, cfg.max_skills_count, policy).map_err(fail)?]
        }
        SectionType::Training => entries(&profile.trainings, |t| Ok(training(t, policy))).map_err(fail)?,
        SectionType::Achievements => {
            entries(&profile.achievements, |a| Ok(achievement(a, policy))).map_err(fail)?
        }
        SectionType::References => {
            let selected: Vec<&Reference> = profile
                .references
                .iter()
                .filter(|r| cfg.selected_references.contains(&r.id))
                .collect();
            entries(&selected, |r| Ok(reference(r, policy))).map_err(fail)?
        }
        SectionType::PageBreak => Vec::new(),
    };

    let title = match section.section_type {
        SectionType::General | SectionType::PageBreak => None,
        _ => Some(section.heading()),
    };

    Ok(RenderedSection {
        id: section.id.clone(),
        section_type: section.section_type,
        display_order: section.display_order,
        position: 0,
        placement: cfg.layout_placement,
        title,
        items: items.into_iter().filter(|i| !i.is_empty()).collect(),
    })
}

/// Render each entry in order, tagging failures with the entry's position.
fn entries<T>(
    list: &[T],
    render: impl Fn(&T) -> Result<SectionItem, String>,
) -> Result<Vec<SectionItem>, String> {
    list.iter()
        .enumerate()
        .map(|(i, entry)| render(entry).map_err(|e| format!("entry {}: {e}", i + 1)))
        .collect()
}

// ---------------------------------------------------------------------------
// Node ordering
// ---------------------------------------------------------------------------

/// Collects nodes keyed by the rank of the field(s) they came from.
struct Slots<'a> {
    policy: &'a FieldPolicy,
    nodes: Vec<((i32, usize), ContentNode)>,
}

impl<'a> Slots<'a> {
    fn new(policy: &'a FieldPolicy) -> Self {
        Self {
            policy,
            nodes: Vec::new(),
        }
    }

    /// Add a node that draws on `fields`; it sorts at the earliest of them.
    fn push(&mut self, fields: &[&str], node: Option<ContentNode>) {
        let Some(node) = node else { return };
        let rank = fields
            .iter()
            .map(|f| self.policy.rank(f))
            .min()
            .unwrap_or((i32::MAX, usize::MAX));
        self.nodes.push((rank, node));
    }

    fn finish(mut self) -> SectionItem {
        self.nodes.sort_by_key(|(rank, _)| *rank);
        SectionItem::new(self.nodes.into_iter().map(|(_, n)| n).collect())
    }
}

fn paragraph(text: Option<String>) -> Option<ContentNode> {
    let blocks = richtext::parse(&text?);
    (!blocks.is_empty()).then_some(ContentNode::Paragraph { blocks })
}

/// Join the present parts with `sep`, or `None` when nothing is present.
fn joined(parts: &[Option<String>], sep: &str) -> Option<String> {
    let present: Vec<&str> = parts.iter().filter_map(|p| p.as_deref()).collect();
    (!present.is_empty()).then(|| present.join(sep))
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Parse the date shapes profiles carry: full dates, year-month, and
/// RFC 3339 timestamps.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        let sep = if fmt.contains('/') { '/' } else { '-' };
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{raw}{sep}01"), fmt) {
            return Some(date);
        }
    }
    None
}

/// `Mon YYYY`, or the raw text when it is not a recognisable date.
pub fn format_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(date) => date.format("%b %Y").to_string(),
        None => raw.trim().to_string(),
    }
}

fn check_date_order(start: Option<&str>, end: Option<&str>) -> Result<(), String> {
    let start = non_blank(start).and_then(parse_date);
    let end = non_blank(end).and_then(parse_date);
    match (start, end) {
        (Some(s), Some(e)) if e < s => Err(format!("end date {e} precedes start date {s}")),
        _ => Ok(()),
    }
}

/// `"{start} - {end}"`, a lone side, or `None` when both are absent.
/// A current entry ends with "Present" while `end_date` is visible.
fn date_range(
    policy: &FieldPolicy,
    start: Option<&str>,
    end: Option<&str>,
    current: bool,
) -> Option<String> {
    let start = policy.value_with("start_date", start, format_date);
    let end = if current && policy.is_visible("end_date") {
        Some(PRESENT.to_string())
    } else {
        policy.value_with("end_date", end, format_date)
    };
    match (start, end) {
        (Some(s), Some(e)) => Some(format!("{s} - {e}")),
        (side, None) | (None, side) => side,
    }
}

// ---------------------------------------------------------------------------
// Per-type renderers
// ---------------------------------------------------------------------------

fn general(profile: &Profile, policy: &FieldPolicy) -> SectionItem {
    let mut slots = Slots::new(policy);

    let image = policy
        .decision("profile_image")
        .render(non_blank(profile.image.as_deref()));
    // A masked photo reference is not an image.
    let image = image.filter(|_| policy.decision("profile_image").mask.is_none());
    slots.push(
        &["profile_image"],
        image.map(|src| ContentNode::Image {
            src,
            alt: profile.full_name().unwrap_or_else(|| "Profile photo".to_string()),
        }),
    );

    let name = joined(
        &[
            policy.value("first_name", profile.first_name.as_deref()),
            policy.value("last_name", profile.last_name.as_deref()),
        ],
        " ",
    );
    slots.push(&["first_name", "last_name"], name.map(|text| ContentNode::Headline { text }));
    slots.push(
        &["designation"],
        policy
            .value("designation", profile.designation.as_deref())
            .map(ContentNode::subtitle),
    );
    let contact = [
        policy.value("email", profile.email.as_deref()),
        policy.value("phone", profile.phone.as_deref()),
        policy.value("location", profile.location.as_deref()),
    ];
    let parts: Vec<String> = contact.into_iter().flatten().collect();
    slots.push(
        &["email", "phone", "location"],
        (!parts.is_empty()).then_some(ContentNode::KeyValueLine { parts }),
    );
    slots.push(
        &["biography"],
        paragraph(policy.value("biography", profile.biography.as_deref())),
    );
    slots.finish()
}

fn experience(e: &Experience, policy: &FieldPolicy) -> Result<SectionItem, String> {
    if !e.is_current {
        check_date_order(e.start_date.as_deref(), e.end_date.as_deref())?;
    }
    let mut slots = Slots::new(policy);
    slots.push(
        &["designation"],
        policy
            .value("designation", e.designation.as_deref())
            .map(ContentNode::emphasized),
    );
    let employer = joined(
        &[
            policy.value("company_name", e.company_name.as_deref()),
            policy.value("location", e.location.as_deref()),
        ],
        ", ",
    );
    slots.push(&["company_name", "location"], employer.map(ContentNode::subtitle));
    slots.push(
        &["start_date", "end_date"],
        date_range(policy, e.start_date.as_deref(), e.end_date.as_deref(), e.is_current)
            .map(ContentNode::subtitle),
    );
    slots.push(
        &["description"],
        paragraph(policy.value("description", e.description.as_deref())),
    );
    Ok(slots.finish())
}

fn education(e: &Education, policy: &FieldPolicy) -> Result<SectionItem, String> {
    check_date_order(e.start_date.as_deref(), e.end_date.as_deref())?;
    let mut slots = Slots::new(policy);
    slots.push(
        &["degree"],
        policy.value("degree", e.degree.as_deref()).map(ContentNode::emphasized),
    );
    slots.push(
        &["institution"],
        policy
            .value("institution", e.institution.as_deref())
            .map(ContentNode::subtitle),
    );
    slots.push(
        &["start_date", "end_date"],
        date_range(policy, e.start_date.as_deref(), e.end_date.as_deref(), false)
            .map(ContentNode::subtitle),
    );
    slots.push(
        &["grade"],
        policy
            .value_with("grade", e.grade.as_deref(), |g| format!("Grade: {g}"))
            .map(ContentNode::subtitle),
    );
    slots.push(
        &["description"],
        paragraph(policy.value("description", e.description.as_deref())),
    );
    Ok(slots.finish())
}

fn project(p: &Project, policy: &FieldPolicy) -> Result<SectionItem, String> {
    check_date_order(p.start_date.as_deref(), p.end_date.as_deref())?;
    let mut slots = Slots::new(policy);
    slots.push(
        &["name"],
        policy.value("name", p.name.as_deref()).map(ContentNode::emphasized),
    );
    slots.push(
        &["role"],
        policy.value("role", p.role.as_deref()).map(ContentNode::subtitle),
    );
    slots.push(
        &["start_date", "end_date"],
        date_range(policy, p.start_date.as_deref(), p.end_date.as_deref(), false)
            .map(ContentNode::subtitle),
    );
    slots.push(
        &["description"],
        paragraph(policy.value("description", p.description.as_deref())),
    );
    let tags: Vec<String> = p
        .technologies
        .iter()
        .filter_map(|t| policy.value("technologies", Some(t.as_str())))
        .collect();
    slots.push(
        &["technologies"],
        (!tags.is_empty()).then_some(ContentNode::TagGroup { tags }),
    );
    slots.push(
        &["url"],
        policy.value("url", p.url.as_deref()).map(ContentNode::subtitle),
    );
    Ok(slots.finish())
}

/// Order projects by `display_order` (unset last), then newest start date,
/// and keep at most `limit`. The renderer itself keeps the order it is given;
/// [`crate::pipeline::prepare`] applies this before rendering.
pub fn select_projects(projects: &[Project], limit: Option<u32>) -> Vec<Project> {
    let mut sorted: Vec<&Project> = projects.iter().collect();
    sorted.sort_by(|a, b| {
        let by_order = match (a.display_order, b.display_order) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_order.then_with(|| {
            let start = |p: &Project| non_blank(p.start_date.as_deref()).and_then(parse_date);
            // Newest first; undated last.
            match (start(a), start(b)) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        })
    });
    let limit = limit.map(|l| l as usize).unwrap_or(usize::MAX);
    sorted.into_iter().take(limit).cloned().collect()
}

fn skills(list: &[Skill], max: Option<u32>, policy: &FieldPolicy) -> Result<SectionItem, String> {
    if let Some((i, skill)) = list
        .iter()
        .enumerate()
        .find(|(_, s)| s.proficiency.is_some_and(|p| !(0..=10).contains(&p)))
    {
        return Err(format!(
            "skill {} has proficiency {} outside 0..=10",
            i + 1,
            skill.proficiency.unwrap_or_default()
        ));
    }

    let mut sorted: Vec<&Skill> = list.iter().collect();
    // Stable: equal priorities keep input order, unset priorities go last.
    sorted.sort_by_key(|s| s.priority.unwrap_or(i32::MAX));
    let cap = max.map(|m| m as usize).unwrap_or(DEFAULT_MAX_SKILLS);

    // Entries with no visible name do not count against the cap.
    let tags: Vec<String> = sorted
        .into_iter()
        .filter_map(|s| {
            let name = policy.value("name", s.name.as_deref())?;
            let proficiency = s
                .proficiency
                .and_then(|p| policy.value("proficiency", Some(p.to_string().as_str())));
            Some(match proficiency {
                Some(p) => format!("{name} ({p}/10)"),
                None => name,
            })
        })
        .take(cap)
        .collect();

    let mut slots = Slots::new(policy);
    slots.push(
        &["name", "proficiency"],
        (!tags.is_empty()).then_some(ContentNode::TagGroup { tags }),
    );
    Ok(slots.finish())
}

fn training(t: &Training, policy: &FieldPolicy) -> SectionItem {
    let mut slots = Slots::new(policy);
    slots.push(
        &["title"],
        policy.value("title", t.title.as_deref()).map(ContentNode::emphasized),
    );
    slots.push(
        &["provider"],
        policy.value("provider", t.provider.as_deref()).map(ContentNode::subtitle),
    );
    slots.push(
        &["date"],
        policy
            .value_with("date", t.date.as_deref(), format_date)
            .map(ContentNode::subtitle),
    );
    slots.push(
        &["description"],
        paragraph(policy.value("description", t.description.as_deref())),
    );
    slots.finish()
}

fn achievement(a: &Achievement, policy: &FieldPolicy) -> SectionItem {
    let mut slots = Slots::new(policy);
    slots.push(
        &["name"],
        policy.value("name", a.name.as_deref()).map(ContentNode::emphasized),
    );
    slots.push(
        &["date"],
        policy
            .value_with("date", a.date.as_deref(), format_date)
            .map(ContentNode::subtitle),
    );
    slots.push(
        &["description"],
        paragraph(policy.value("description", a.description.as_deref())),
    );
    slots.finish()
}

fn reference(r: &Reference, policy: &FieldPolicy) -> SectionItem {
    let mut slots = Slots::new(policy);
    slots.push(
        &["name"],
        policy.value("name", r.name.as_deref()).map(ContentNode::emphasized),
    );
    let position = joined(
        &[
            policy.value("designation", r.designation.as_deref()),
            policy.value("company", r.company.as_deref()),
        ],
        ", ",
    );
    slots.push(&["designation", "company"], position.map(ContentNode::subtitle));
    let parts: Vec<String> = [
        policy.value("email", r.email.as_deref()),
        policy.value("phone", r.phone.as_deref()),
    ]
    .into_iter()
    .flatten()
    .collect();
    slots.push(
        &["email", "phone"],
        (!parts.is_empty()).then_some(ContentNode::KeyValueLine { parts }),
    );
    slots.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldConfig;
    use crate::policy::DefaultFieldTable;

    fn render(section: &TemplateSection, profile: &Profile) -> Result<RenderedSection, CompileError> {
        let policy = FieldPolicy::for_section(section, &[], &DefaultFieldTable::builtin());
        render_section(section, profile, &policy)
    }

    fn texts(section: &RenderedSection) -> Vec<String> {
        section.nodes().iter().map(|n| n.plain_text()).collect()
    }

    #[test]
    fn general_has_no_title() {
        let profile = Profile {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            email: Some("ada@example.com".into()),
            ..Profile::default()
        };
        let out = render(&TemplateSection::new("g", SectionType::General, 1), &profile).unwrap();
        assert!(out.title.is_none());
        assert!(!out.nodes().iter().any(|n| matches!(n, ContentNode::Title { .. })));
        assert!(out
            .nodes()
            .contains(&ContentNode::Headline { text: "Ada Lovelace".into() }));
    }

    #[test]
    fn other_sections_lead_with_title() {
        let profile = Profile {
            achievements: vec![Achievement {
                name: Some("Award".into()),
                ..Achievement::default()
            }],
            ..Profile::default()
        };
        let mut section = TemplateSection::new("a", SectionType::Achievements, 1);
        section.display_name = Some("Honours".into());
        let out = render(&section, &profile).unwrap();
        assert_eq!(out.nodes()[0], ContentNode::Title { text: "Honours".into() });
    }

    #[test]
    fn date_ranges() {
        let mut exp = Experience {
            designation: Some("Engineer".into()),
            start_date: Some("2020-01-15".into()),
            end_date: Some("2022-03-01".into()),
            ..Experience::default()
        };
        let section = TemplateSection::new("e", SectionType::Experience, 1);
        let profile = |e: &Experience| Profile {
            experiences: vec![e.clone()],
            ..Profile::default()
        };
        assert!(texts(&render(&section, &profile(&exp)).unwrap()).contains(&"Jan 2020 - Mar 2022".to_string()));

        exp.is_current = true;
        assert!(texts(&render(&section, &profile(&exp)).unwrap()).contains(&"Jan 2020 - Present".to_string()));

        exp.is_current = false;
        exp.start_date = None;
        assert!(texts(&render(&section, &profile(&exp)).unwrap()).contains(&"Mar 2022".to_string()));

        exp.end_date = None;
        let out = render(&section, &profile(&exp)).unwrap();
        assert_eq!(out.items[0].nodes.len(), 1);
    }

    #[test]
    fn inverted_dates_fail_the_section() {
        let profile = Profile {
            education: vec![Education {
                degree: Some("BSc".into()),
                start_date: Some("2020-01-01".into()),
                end_date: Some("2019-01-01".into()),
                ..Education::default()
            }],
            ..Profile::default()
        };
        let err = render(&TemplateSection::new("ed", SectionType::Education, 1), &profile).unwrap_err();
        assert!(matches!(err, CompileError::SectionRender { ref section_id, .. } if section_id == "ed"));
    }

    #[test]
    fn skills_cap_and_priority_order() {
        let list: Vec<Skill> = (0..15)
            .map(|i| Skill {
                name: Some(format!("skill{i}")),
                proficiency: Some(7),
                priority: Some(15 - i),
            })
            .collect();
        let profile = Profile {
            technical_skills: list,
            ..Profile::default()
        };
        let mut section = TemplateSection::new("s", SectionType::TechnicalSkills, 1);
        section.styling_config.max_skills_count = Some(10);
        let out = render(&section, &profile).unwrap();
        let ContentNode::TagGroup { tags } = &out.items[0].nodes[0] else {
            panic!("expected tags");
        };
        assert_eq!(tags.len(), 10);
        assert_eq!(tags[0], "skill14 (7/10)");
        assert_eq!(tags[9], "skill5 (7/10)");
    }

    #[test]
    fn nameless_skills_do_not_use_up_the_cap() {
        let mut list: Vec<Skill> = (1..=4)
            .map(|i| Skill {
                name: Some(format!("skill{i}")),
                proficiency: None,
                priority: Some(i),
            })
            .collect();
        list.push(Skill {
            name: Some("  ".into()),
            proficiency: Some(5),
            priority: Some(0),
        });
        list.push(Skill {
            name: None,
            proficiency: None,
            priority: Some(0),
        });
        let profile = Profile {
            technical_skills: list,
            ..Profile::default()
        };
        let mut section = TemplateSection::new("s", SectionType::TechnicalSkills, 1);
        section.styling_config.max_skills_count = Some(3);
        let out = render(&section, &profile).unwrap();
        let ContentNode::TagGroup { tags } = &out.items[0].nodes[0] else {
            panic!("expected tags");
        };
        assert_eq!(tags, &["skill1", "skill2", "skill3"]);
    }

    #[test]
    fn skill_without_proficiency_is_bare() {
        let profile = Profile {
            specialized_skills: vec![Skill {
                name: Some("Welding".into()),
                ..Skill::default()
            }],
            ..Profile::default()
        };
        let out = render(&TemplateSection::new("s", SectionType::SpecializedSkills, 1), &profile).unwrap();
        assert_eq!(out.items[0].nodes[0], ContentNode::TagGroup { tags: vec!["Welding".into()] });
    }

    #[test]
    fn out_of_range_values_fail() {
        let profile = Profile {
            technical_skills: vec![Skill {
                name: Some("Rust".into()),
                proficiency: Some(11),
                priority: None,
            }],
            ..Profile::default()
        };
        assert!(render(&TemplateSection::new("s", SectionType::TechnicalSkills, 1), &profile).is_err());

        let mut section = TemplateSection::new("p", SectionType::Projects, 1);
        section.styling_config.projects_to_view = Some(0);
        assert!(render(&section, &Profile::default()).is_err());
    }

    #[test]
    fn references_are_filtered_by_selection() {
        let refs = ["r1", "r2", "r3"].map(|id| Reference {
            id: id.into(),
            name: Some(format!("Person {id}")),
            ..Reference::default()
        });
        let profile = Profile {
            references: refs.to_vec(),
            ..Profile::default()
        };
        let mut section = TemplateSection::new("r", SectionType::References, 1);
        assert!(render(&section, &profile).unwrap().items.is_empty());

        section.styling_config.selected_references = ["r2".to_string()].into_iter().collect();
        let out = render(&section, &profile).unwrap();
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.items[0].nodes[0].plain_text(), "Person r2");
    }

    #[test]
    fn projects_are_ordered_and_capped() {
        let project = |name: &str, order: Option<i32>, start: &str| Project {
            name: Some(name.into()),
            display_order: order,
            start_date: Some(start.into()),
            ..Project::default()
        };
        let list = vec![
            project("old", None, "2018-01-01"),
            project("new", None, "2023-01-01"),
            project("pinned", Some(1), "2010-01-01"),
        ];
        let names: Vec<_> = select_projects(&list, None)
            .into_iter()
            .filter_map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["pinned", "new", "old"]);
        assert_eq!(select_projects(&list, Some(2)).len(), 2);
    }

    #[test]
    fn disabled_fields_emit_nothing_and_order_is_respected() {
        let profile = Profile {
            trainings: vec![Training {
                title: Some("Course".into()),
                provider: Some("Academy".into()),
                date: Some("2021-06".into()),
                description: None,
            }],
            ..Profile::default()
        };
        let mut section = TemplateSection::new("t", SectionType::Training, 1);
        let mut provider = FieldConfig::new("provider", "Provider", 1);
        provider.masked = true;
        let mut date = FieldConfig::new("date", "Date", 2);
        date.enabled = false;
        section.styling_config.fields = vec![FieldConfig::new("title", "Title", 3), provider, date];
        let out = render(&section, &profile).unwrap();
        let nodes: Vec<String> = out.items[0].nodes.iter().map(|n| n.plain_text()).collect();
        assert_eq!(nodes, vec!["Aca***", "Course"]);
    }

    #[test]
    fn date_formats() {
        assert_eq!(format_date("2021-06"), "Jun 2021");
        assert_eq!(format_date("2021-06-30T10:00:00Z"), "Jun 2021");
        assert_eq!(format_date("Spring 2020"), "Spring 2020");
    }

    #[test]
    fn page_break_is_empty_and_untitled() {
        let out = render(&TemplateSection::new("pb", SectionType::PageBreak, 2), &Profile::default()).unwrap();
        assert!(out.title.is_none());
        assert!(out.items.is_empty());
        assert!(out.is_page_break());
    }
}
